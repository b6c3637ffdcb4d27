use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GITHUB_API_BASE: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("pagedir/", env!("CARGO_PKG_VERSION"));

/// GitHub caps `per_page` at 100, which is also the only page we ever ask for.
pub const MAX_PER_PAGE: u32 = 100;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("User not found: {0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    ParseError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GitHubError>;

/// One entry of `GET /users/{owner}/repos`.
///
/// Only the fields the directory reads are modelled, and every one of them
/// is optional: the response is not validated beyond these guards.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub name: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<String>,
    pub html_url: Option<String>,
    pub has_pages: Option<bool>,
    pub language: Option<String>,
    pub stargazers_count: Option<u64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

/// Client for the repository listing endpoint.
///
/// Makes a single attempt per call. Failures are reported to the caller,
/// never retried here.
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    per_page: u32,
}

impl GitHubClient {
    pub fn new() -> Result<Self> {
        Self::with_base_url(GITHUB_API_BASE.to_string())
    }

    /// For GitHub Enterprise or a local stand-in
    pub fn with_base_url(base_url: String) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::USER_AGENT,
            reqwest::header::HeaderValue::from_static(USER_AGENT),
        );
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/vnd.github+json"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            per_page: MAX_PER_PAGE,
        })
    }

    /// Page size for the listing, clamped to what the API accepts
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page.clamp(1, MAX_PER_PAGE);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn repos_url(&self, owner: &str) -> String {
        format!(
            "{}/users/{}/repos",
            self.base_url,
            urlencoding::encode(owner)
        )
    }

    /// List the owner's own repositories (first page only)
    pub async fn list_user_repos(&self, owner: &str) -> Result<Vec<GitHubRepo>> {
        let url = self.repos_url(owner);
        debug!("Fetching repositories from {}", url);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("per_page", self.per_page.to_string().as_str()),
                ("type", "owner"),
            ])
            .send()
            .await?;

        let status = response.status();
        let remaining = response
            .headers()
            .get("x-ratelimit-remaining")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        if let Err(e) = check_status(status.as_u16(), remaining.as_deref(), owner) {
            if let GitHubError::RequestFailed(_) = e {
                let body = response.text().await.unwrap_or_default();
                return Err(GitHubError::RequestFailed(format!(
                    "Status {}: {}",
                    status, body
                )));
            }
            return Err(e);
        }

        let body = response.text().await?;
        parse_repos(&body)
    }
}

/// Map a listing response status onto the error the caller sees.
///
/// `rate_limit_remaining` is the raw `x-ratelimit-remaining` header; a 403
/// only counts as rate limiting when it says nothing is left.
pub fn check_status(status: u16, rate_limit_remaining: Option<&str>, owner: &str) -> Result<()> {
    let exhausted = rate_limit_remaining.map(|v| v.trim() == "0").unwrap_or(false);

    match status {
        200..=299 => Ok(()),
        404 => Err(GitHubError::NotFound(owner.to_string())),
        429 => Err(GitHubError::RateLimitExceeded),
        403 if exhausted => Err(GitHubError::RateLimitExceeded),
        other => Err(GitHubError::RequestFailed(format!("Status {}", other))),
    }
}

/// Decode a listing body
pub fn parse_repos(body: &str) -> Result<Vec<GitHubRepo>> {
    let repos: Vec<GitHubRepo> = serde_json::from_str(body)?;
    debug!("Decoded {} repositories", repos.len());
    Ok(repos)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repos_url_encodes_owner() {
        let client = GitHubClient::new().unwrap();
        assert_eq!(
            client.repos_url("Mkpb321"),
            "https://api.github.com/users/Mkpb321/repos"
        );
        assert_eq!(
            client.repos_url("a b"),
            "https://api.github.com/users/a%20b/repos"
        );
    }

    #[test]
    fn test_base_url_trailing_slash_is_dropped() {
        let client = GitHubClient::with_base_url("http://localhost:8080/".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.repos_url("octo"),
            "http://localhost:8080/users/octo/repos"
        );
    }

    #[test]
    fn test_per_page_is_clamped() {
        let client = GitHubClient::new().unwrap().with_per_page(500);
        assert_eq!(client.per_page, 100);
        let client = GitHubClient::new().unwrap().with_per_page(0);
        assert_eq!(client.per_page, 1);
    }

    #[test]
    fn test_parse_repos_tolerates_missing_fields() {
        let body = r#"[
            {"name": "site", "has_pages": true, "stargazers_count": 3,
             "html_url": "https://github.com/o/site", "homepage": null,
             "created_at": "2023-01-01T10:00:00Z", "updated_at": "2024-02-03T00:00:00Z",
             "language": "HTML", "description": "My site", "fork": false},
            {"name": "bare"}
        ]"#;

        let repos = parse_repos(body).unwrap();
        assert_eq!(repos.len(), 2);
        assert_eq!(repos[0].name.as_deref(), Some("site"));
        assert_eq!(repos[0].has_pages, Some(true));
        assert_eq!(repos[0].stargazers_count, Some(3));
        assert!(repos[0].homepage.is_none());
        assert!(repos[1].has_pages.is_none());
        assert!(repos[1].created_at.is_none());
    }

    #[test]
    fn test_check_status_mapping() {
        assert!(check_status(200, None, "octo").is_ok());
        assert!(matches!(
            check_status(404, None, "octo"),
            Err(GitHubError::NotFound(owner)) if owner == "octo"
        ));
        assert!(matches!(
            check_status(429, None, "octo"),
            Err(GitHubError::RateLimitExceeded)
        ));
        assert!(matches!(
            check_status(403, Some("0"), "octo"),
            Err(GitHubError::RateLimitExceeded)
        ));
        // Forbidden for other reasons is a plain failure
        assert!(matches!(
            check_status(403, Some("42"), "octo"),
            Err(GitHubError::RequestFailed(_))
        ));
        assert!(matches!(
            check_status(403, None, "octo"),
            Err(GitHubError::RequestFailed(_))
        ));
        assert!(matches!(
            check_status(500, None, "octo"),
            Err(GitHubError::RequestFailed(msg)) if msg == "Status 500"
        ));
    }

    #[test]
    fn test_parse_repos_rejects_non_array() {
        let err = parse_repos(r#"{"message": "Not Found"}"#).unwrap_err();
        assert!(matches!(err, GitHubError::ParseError(_)));
    }
}
