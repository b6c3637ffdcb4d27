use crate::{models::RepositoryRecord, Result};

#[cfg(test)]
use mockall::automock;

/// Where the repository collection comes from
///
/// The controller calls this exactly once per session. Implementations make
/// a single attempt; transport and status failures come back as errors.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait RepositorySource: Send + Sync {
    async fn list_repositories(&self, owner: &str) -> Result<Vec<RepositoryRecord>>;
}
