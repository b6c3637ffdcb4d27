use chrono::{DateTime, NaiveDate, Utc};
use pagedir_api::GitHubRepo;
use serde::{Deserialize, Serialize};

/// One repository as the directory sees it
///
/// Timestamps stay as the raw strings the API sent; they are parsed on
/// demand so a malformed value only affects ordering, never loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    /// Empty when the API left it out
    pub name: String,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub html_url: String,
    pub has_pages: bool,
    pub language: Option<String>,
    pub stargazers_count: u64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl RepositoryRecord {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created_at.as_deref().and_then(parse_timestamp)
    }

    pub fn updated(&self) -> Option<DateTime<Utc>> {
        self.updated_at.as_deref().and_then(parse_timestamp)
    }

    /// Description with absent treated as empty
    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }

    /// True for the owner's `<owner>.github.io` profile site
    pub fn is_root_site_of(&self, owner: &str) -> bool {
        self.name.to_lowercase() == format!("{}.github.io", owner.to_lowercase())
    }
}

impl From<GitHubRepo> for RepositoryRecord {
    fn from(gh: GitHubRepo) -> Self {
        Self {
            name: gh.name.unwrap_or_default(),
            description: gh.description,
            homepage: gh.homepage,
            html_url: gh.html_url.unwrap_or_default(),
            has_pages: gh.has_pages.unwrap_or(false),
            language: gh.language,
            stargazers_count: gh.stargazers_count.unwrap_or(0),
            created_at: gh.created_at,
            updated_at: gh.updated_at,
        }
    }
}

/// Accepts RFC 3339 (what GitHub sends), a bare date, or a bare year
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    }

    if raw.len() == 4 {
        if let Ok(year) = raw.parse::<i32>() {
            return NaiveDate::from_ymd_opt(year, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(|dt| dt.and_utc());
        }
    }

    None
}

/// Order in which cards are listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Newest repository first
    #[default]
    CreatedDescending,
    /// By name, A to Z
    AlphabeticalAscending,
}

impl SortMode {
    /// Value written to the preference store
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::CreatedDescending => "created",
            SortMode::AlphabeticalAscending => "alpha",
        }
    }

    /// Anything but the exact alphabetical marker means the default
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("alpha") => SortMode::AlphabeticalAscending,
            _ => SortMode::CreatedDescending,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortMode::CreatedDescending => SortMode::AlphabeticalAscending,
            SortMode::AlphabeticalAscending => SortMode::CreatedDescending,
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "created" => Ok(SortMode::CreatedDescending),
            "alpha" | "name" => Ok(SortMode::AlphabeticalAscending),
            other => Err(format!("unknown sort mode '{}' (use created or alpha)", other)),
        }
    }
}

/// Card layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewMode {
    #[default]
    List,
    Tiles,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::List => "list",
            ViewMode::Tiles => "tiles",
        }
    }

    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("tiles") => ViewMode::Tiles,
            _ => ViewMode::List,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ViewMode::List => ViewMode::Tiles,
            ViewMode::Tiles => ViewMode::List,
        }
    }
}

impl std::fmt::Display for ViewMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ViewMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "list" => Ok(ViewMode::List),
            "tiles" | "tile" => Ok(ViewMode::Tiles),
            other => Err(format!("unknown view mode '{}' (use list or tiles)", other)),
        }
    }
}
