// Provider implementations for repository sources
pub mod github;

pub use github::GitHubSource;
