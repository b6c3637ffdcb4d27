// Core directory logic: filtering, sorting, favicon fallback, view state
pub mod card;
pub mod config;
pub mod controller;
pub mod directory;
pub mod error;
pub mod export;
pub mod favicon;
pub mod models;
pub mod preferences;
pub mod providers;
pub mod source;

pub use card::{CardTarget, SiteCard};
pub use config::Config;
pub use controller::{LoadState, StatusKind, StatusMessage, ToggleLabel, ViewController};
pub use error::Error;
pub use export::{ExportFormat, Exporter};
pub use favicon::{FaviconResolver, FaviconSource, FaviconState, IconLoader};
pub use models::{RepositoryRecord, SortMode, ViewMode};
pub use preferences::{PreferenceBackend, Preferences};
pub use source::RepositorySource;

/// Result type alias because typing Result<T, Error> everywhere is tedious
pub type Result<T> = std::result::Result<T, Error>;
