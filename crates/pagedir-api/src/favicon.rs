// Favicon probing - the terminal stand-in for an <img> load/error event
use thiserror::Error;
use tracing::trace;

#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Status {0}")]
    Status(u16),

    #[error("Not an image: {0}")]
    NotAnImage(String),

    #[error("Empty response")]
    Empty,

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Issues one GET per icon candidate.
///
/// A probe succeeds only when a browser would have rendered the image:
/// a 2xx status, a body, and a content type that is not text (GitHub Pages
/// answers unknown paths with an HTML 404 page).
#[derive(Clone)]
pub struct FaviconProbe {
    client: reqwest::Client,
}

impl FaviconProbe {
    pub fn new() -> Result<Self, ProbeError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pagedir/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }

    pub async fn probe(&self, url: &str) -> Result<(), ProbeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await?;
        let outcome = check_icon_response(status, content_type.as_deref(), body.len());
        trace!("favicon probe {} -> {:?}", url, outcome);
        outcome
    }
}

/// Decide whether a response counts as a loaded icon
pub fn check_icon_response(
    status: u16,
    content_type: Option<&str>,
    body_len: usize,
) -> Result<(), ProbeError> {
    if !(200..300).contains(&status) {
        return Err(ProbeError::Status(status));
    }

    if let Some(ct) = content_type {
        if ct.trim().to_ascii_lowercase().starts_with("text/") {
            return Err(ProbeError::NotAnImage(ct.to_string()));
        }
    }

    if body_len == 0 {
        return Err(ProbeError::Empty);
    }

    Ok(())
}
