use crate::card::{SiteCard, REPO_LINK_LABEL, REPO_LINK_TITLE};
use crate::favicon::{FaviconSource, IconLoader};
use crate::models::ViewMode;
use crate::{Error, Result};
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Markdown,
    Html,
}

impl ExportFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "md" | "markdown" => Some(ExportFormat::Markdown),
            "html" | "htm" => Some(ExportFormat::Html),
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_extension(s)
            .ok_or_else(|| format!("unknown format '{}' (use json, md or html)", s))
    }
}

/// Cards ready for export, each paired with the icon it should show
pub struct Directory {
    pub owner: String,
    pub view_mode: ViewMode,
    /// Size of the whole collection; `entries` may be a filtered subset
    pub total: usize,
    pub entries: Vec<(SiteCard, FaviconSource)>,
}

impl Directory {
    /// Point every card at its primary favicon without probing
    pub fn unresolved(owner: &str, view_mode: ViewMode, cards: Vec<SiteCard>) -> Self {
        let entries: Vec<(SiteCard, FaviconSource)> = cards
            .into_iter()
            .map(|card| {
                let icon = card.favicon.current();
                (card, icon)
            })
            .collect();

        Self {
            owner: owner.to_string(),
            view_mode,
            total: entries.len(),
            entries,
        }
    }

    /// Run every card's fallback chain concurrently
    pub async fn resolve<L>(
        owner: &str,
        view_mode: ViewMode,
        cards: Vec<SiteCard>,
        loader: &L,
    ) -> Self
    where
        L: IconLoader + ?Sized,
    {
        let icons = futures::future::join_all(
            cards.iter().map(|card| card.favicon.clone().resolve(loader)),
        )
        .await;

        Self {
            owner: owner.to_string(),
            view_mode,
            total: cards.len(),
            entries: cards.into_iter().zip(icons).collect(),
        }
    }

    /// Record the size of the collection the entries were filtered from
    pub fn with_total(mut self, total: usize) -> Self {
        self.total = total;
        self
    }

    /// `total`, or `shown/total` when the entries are a subset
    pub fn count_label(&self) -> String {
        if self.entries.len() == self.total {
            self.total.to_string()
        } else {
            format!("{}/{}", self.entries.len(), self.total)
        }
    }
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    #[serde(flatten)]
    card: &'a SiteCard,
    favicon: &'a str,
}

/// Exporter for the site directory
pub struct Exporter;

impl Exporter {
    /// Export to a file, picking the format from its extension
    pub fn export_to_file<P: AsRef<Path>>(directory: &Directory, path: P) -> Result<()> {
        let path = path.as_ref();

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ExportFormat::from_extension)
            .ok_or_else(|| {
                Error::ExportError(
                    "Could not determine export format from extension. Use .json, .md, or .html"
                        .to_string(),
                )
            })?;

        Self::export_to_file_with_format(directory, path, format)
    }

    pub fn export_to_file_with_format<P: AsRef<Path>>(
        directory: &Directory,
        path: P,
        format: ExportFormat,
    ) -> Result<()> {
        let content = Self::render(directory, format)?;

        let mut file = File::create(path)
            .map_err(|e| Error::ExportError(format!("Failed to create file: {}", e)))?;

        file.write_all(content.as_bytes())
            .map_err(|e| Error::ExportError(format!("Failed to write file: {}", e)))?;

        Ok(())
    }

    pub fn render(directory: &Directory, format: ExportFormat) -> Result<String> {
        match format {
            ExportFormat::Json => Self::to_json(directory),
            ExportFormat::Markdown => Ok(Self::to_markdown(directory)),
            ExportFormat::Html => Ok(Self::to_html(directory)),
        }
    }

    pub fn to_json(directory: &Directory) -> Result<String> {
        let entries: Vec<JsonEntry> = directory
            .entries
            .iter()
            .map(|(card, icon)| JsonEntry {
                card,
                favicon: icon.as_src(),
            })
            .collect();

        Ok(serde_json::to_string_pretty(&entries)?)
    }

    pub fn to_markdown(directory: &Directory) -> String {
        let mut output = String::new();

        output.push_str(&format!("# {} on GitHub Pages\n\n", directory.owner));
        output.push_str(&format!("Sites: {}\n\n", directory.count_label()));
        output.push_str("---\n\n");

        for (card, _) in &directory.entries {
            output.push_str(&format!("## [{}]({})\n\n", card.title, card.site_url));
            output.push_str(&format!("{}\n\n", card.description));
            output.push_str(&format!(
                "{} · [{}]({}) · {} · {}\n\n",
                card.updated,
                REPO_LINK_LABEL,
                card.repo_url,
                card.language,
                card.stars_label()
            ));
        }

        output
    }

    /// A standalone page with one list item per site.
    ///
    /// The repository link sits beside the card link rather than inside it,
    /// so following it never triggers the card's own navigation.
    pub fn to_html(directory: &Directory) -> String {
        let mut output = String::new();
        let list_class = match directory.view_mode {
            ViewMode::List => "sites-list",
            ViewMode::Tiles => "sites-list sites-list--tiles",
        };

        output.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        output.push_str(&format!(
            "<title>{} – GitHub Pages</title>\n",
            escape_html(&directory.owner)
        ));
        output.push_str("</head>\n<body>\n");
        output.push_str(&format!(
            "<p class=\"repo-count\">{}</p>\n",
            directory.count_label()
        ));
        output.push_str(&format!("<ul class=\"{}\">\n", list_class));

        for (card, icon) in &directory.entries {
            output.push_str("<li class=\"site-item\">\n");
            output.push_str(&format!(
                "<a class=\"site-link\" href=\"{}\">\n",
                escape_html(&card.site_url)
            ));
            output.push_str(&format!(
                "<div class=\"site-icon\"><img class=\"site-favicon\" alt=\"\" loading=\"lazy\" referrerpolicy=\"no-referrer\" src=\"{}\"></div>\n",
                escape_html(icon.as_src())
            ));
            output.push_str("<div class=\"site-content\">\n");
            output.push_str(&format!(
                "<div class=\"site-title\">{}</div>\n",
                escape_html(&card.title)
            ));
            output.push_str(&format!(
                "<div class=\"site-desc\">{}</div>\n",
                escape_html(&card.description)
            ));
            output.push_str("</div>\n</a>\n");

            output.push_str("<div class=\"site-meta\">");
            output.push_str(&format!("<span>{}</span>", escape_html(&card.updated)));
            output.push_str(&format!(
                "<a class=\"repo-link\" href=\"{}\" title=\"{}\" target=\"_blank\" rel=\"noopener\">{}</a>",
                escape_html(&card.repo_url),
                REPO_LINK_TITLE,
                REPO_LINK_LABEL
            ));
            output.push_str(&format!("<span>{}</span>", escape_html(&card.language)));
            output.push_str(&format!("<span>{}</span>", card.stars_label()));
            output.push_str("</div>\n</li>\n");
        }

        output.push_str("</ul>\n</body>\n</html>\n");
        output
    }
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
