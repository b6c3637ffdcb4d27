use crate::favicon::FaviconResolver;
use crate::models::RepositoryRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt::Write;
use tracing::debug;

pub const NO_DESCRIPTION: &str = "No description.";
pub const NO_LANGUAGE: &str = "-";
pub const NO_DATE: &str = "-";
/// Used when the configured pattern cannot be rendered
pub const FALLBACK_DATE_FORMAT: &str = "%Y-%m-%d";
pub const REPO_LINK_LABEL: &str = "GitHub";
pub const REPO_LINK_TITLE: &str = "Open the repository on GitHub";

/// Everything a presentation layer needs to draw one site card
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteCard {
    /// Where the card itself navigates
    pub site_url: String,
    pub title: String,
    pub description: String,
    pub updated: String,
    pub language: String,
    pub stars: u64,
    /// Target of the repository link affordance
    pub repo_url: String,
    #[serde(skip)]
    pub favicon: FaviconResolver,
}

/// The two things a card can open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardTarget {
    #[default]
    Site,
    RepositoryLink,
}

impl CardTarget {
    pub fn toggled(self) -> Self {
        match self {
            CardTarget::Site => CardTarget::RepositoryLink,
            CardTarget::RepositoryLink => CardTarget::Site,
        }
    }
}

impl SiteCard {
    pub fn from_record(record: &RepositoryRecord, owner: &str, date_format: &str) -> Self {
        let site_url = site_url(record, owner);
        let favicon = FaviconResolver::new(&site_url);

        let description = match record.description.as_deref() {
            Some(desc) if !desc.trim().is_empty() => desc.to_string(),
            _ => NO_DESCRIPTION.to_string(),
        };

        let language = match record.language.as_deref() {
            Some(lang) if !lang.is_empty() => lang.to_string(),
            _ => NO_LANGUAGE.to_string(),
        };

        let updated = record
            .updated()
            .map(|dt| format_date(&dt, date_format))
            .unwrap_or_else(|| NO_DATE.to_string());

        Self {
            site_url,
            title: record.name.clone(),
            description,
            updated,
            language,
            stars: record.stargazers_count,
            repo_url: record.html_url.clone(),
            favicon,
        }
    }

    pub fn stars_label(&self) -> String {
        format!("★ {}", self.stars)
    }

    /// Metadata row in display order: date, repository link, language, stars
    pub fn meta_row(&self) -> [String; 4] {
        [
            self.updated.clone(),
            REPO_LINK_LABEL.to_string(),
            self.language.clone(),
            self.stars_label(),
        ]
    }

    /// The one URL an activation opens.
    ///
    /// Activating the repository link never falls through to the card's
    /// own navigation.
    pub fn activate(&self, target: CardTarget) -> &str {
        match target {
            CardTarget::Site => &self.site_url,
            CardTarget::RepositoryLink => &self.repo_url,
        }
    }
}

/// Render `dt` with a strftime pattern, falling back to ISO dates when the
/// pattern has specifiers chrono cannot render
pub fn format_date(dt: &DateTime<Utc>, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", dt.format(pattern)).is_ok() {
        return out;
    }

    debug!("Unusable date format {:?}, using {}", pattern, FALLBACK_DATE_FORMAT);
    dt.format(FALLBACK_DATE_FORMAT).to_string()
}

/// Homepage when set, otherwise the conventional project page URL
pub fn site_url(record: &RepositoryRecord, owner: &str) -> String {
    match record.homepage.as_deref() {
        Some(homepage) if !homepage.trim().is_empty() => homepage.to_string(),
        _ => format!(
            "https://{}.github.io/{}/",
            owner.to_lowercase(),
            record.name
        ),
    }
}
