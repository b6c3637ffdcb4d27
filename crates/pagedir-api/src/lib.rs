// HTTP collaborators: the GitHub repository listing and favicon probing
pub mod favicon;
pub mod github;

pub use favicon::{FaviconProbe, ProbeError};
pub use github::{GitHubClient, GitHubError, GitHubRepo};
