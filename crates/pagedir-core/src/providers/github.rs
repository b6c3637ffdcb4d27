// GitHub provider - bridges the API client with the RepositorySource trait
use async_trait::async_trait;
use pagedir_api::GitHubClient;

use crate::{models::RepositoryRecord, source::RepositorySource, Result};

/// Wrapper around GitHubClient that implements RepositorySource
pub struct GitHubSource {
    client: GitHubClient,
}

impl GitHubSource {
    pub fn new(client: GitHubClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RepositorySource for GitHubSource {
    async fn list_repositories(&self, owner: &str) -> Result<Vec<RepositoryRecord>> {
        let repos = self.client.list_user_repos(owner).await?;
        Ok(repos.into_iter().map(RepositoryRecord::from).collect())
    }
}
