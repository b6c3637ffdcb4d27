use async_trait::async_trait;
use pagedir_api::FaviconProbe;

#[cfg(test)]
use mockall::automock;

/// Built-in icon used once both remote candidates have failed
pub const DEFAULT_FAVICON: &str = "data:image/svg+xml;utf8,\
<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 32 32'>\
<rect width='32' height='32' rx='6' fill='%23020617'/>\
<circle cx='16' cy='16' r='9' fill='%236366f1'/></svg>";

/// Attempts to load one icon URL. `true` means the icon is usable.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait IconLoader: Send + Sync {
    async fn load(&self, url: &str) -> bool;
}

#[async_trait]
impl IconLoader for FaviconProbe {
    async fn load(&self, url: &str) -> bool {
        self.probe(url).await.is_ok()
    }
}

/// Where the fallback chain currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaviconState {
    TryingPrimary,
    TryingSecondary,
    /// Terminal; failures are no longer handled
    Default,
}

/// What a card should display
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FaviconSource {
    Remote(String),
    Default,
}

impl FaviconSource {
    /// Usable as an `<img src>`
    pub fn as_src(&self) -> &str {
        match self {
            FaviconSource::Remote(url) => url,
            FaviconSource::Default => DEFAULT_FAVICON,
        }
    }

    pub fn is_default(&self) -> bool {
        matches!(self, FaviconSource::Default)
    }
}

/// Per-card favicon state machine: primary, then secondary, then default.
///
/// Transitions happen only on load failures. Each card owns its own
/// resolver, so a stale one finishing late cannot disturb a newer card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaviconResolver {
    primary: String,
    secondary: String,
    state: FaviconState,
    secondary_attempted: bool,
}

impl FaviconResolver {
    pub fn new(site_url: &str) -> Self {
        let base = site_url.strip_suffix('/').unwrap_or(site_url);
        Self {
            primary: format!("{}/favicon.ico", base),
            secondary: format!("{}/icon/favicon.ico", base),
            state: FaviconState::TryingPrimary,
            secondary_attempted: false,
        }
    }

    pub fn primary_url(&self) -> &str {
        &self.primary
    }

    pub fn secondary_url(&self) -> &str {
        &self.secondary
    }

    pub fn state(&self) -> FaviconState {
        self.state
    }

    /// The source currently being attempted, or the default once settled
    pub fn current(&self) -> FaviconSource {
        match self.state {
            FaviconState::TryingPrimary => FaviconSource::Remote(self.primary.clone()),
            FaviconState::TryingSecondary => FaviconSource::Remote(self.secondary.clone()),
            FaviconState::Default => FaviconSource::Default,
        }
    }

    /// Feed a load failure into the machine
    pub fn on_load_failure(&mut self) -> FaviconState {
        self.state = match self.state {
            FaviconState::TryingPrimary if !self.secondary_attempted => {
                self.secondary_attempted = true;
                FaviconState::TryingSecondary
            }
            FaviconState::TryingPrimary | FaviconState::TryingSecondary => FaviconState::Default,
            FaviconState::Default => FaviconState::Default,
        };
        self.state
    }

    /// Drive the chain to completion with `loader`.
    ///
    /// At most two loads are attempted; the default icon is never loaded.
    pub async fn resolve<L>(mut self, loader: &L) -> FaviconSource
    where
        L: IconLoader + ?Sized,
    {
        loop {
            let url = match self.current() {
                FaviconSource::Remote(url) => url,
                FaviconSource::Default => return FaviconSource::Default,
            };

            if loader.load(&url).await {
                return FaviconSource::Remote(url);
            }

            self.on_load_failure();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::Sequence;

    const SITE: &str = "https://mkpb321.github.io/demo/";
    const PRIMARY: &str = "https://mkpb321.github.io/demo/favicon.ico";
    const SECONDARY: &str = "https://mkpb321.github.io/demo/icon/favicon.ico";

    #[test]
    fn test_candidate_urls_trim_one_slash() {
        let resolver = FaviconResolver::new(SITE);
        assert_eq!(resolver.primary_url(), PRIMARY);
        assert_eq!(resolver.secondary_url(), SECONDARY);

        let bare = FaviconResolver::new("https://example.org");
        assert_eq!(bare.primary_url(), "https://example.org/favicon.ico");
    }

    #[test]
    fn test_state_machine_is_terminal_at_default() {
        let mut resolver = FaviconResolver::new(SITE);
        assert_eq!(resolver.state(), FaviconState::TryingPrimary);
        assert_eq!(resolver.on_load_failure(), FaviconState::TryingSecondary);
        assert_eq!(resolver.current(), FaviconSource::Remote(SECONDARY.to_string()));
        assert_eq!(resolver.on_load_failure(), FaviconState::Default);
        assert_eq!(resolver.on_load_failure(), FaviconState::Default);
        assert!(resolver.current().is_default());
        assert_eq!(resolver.current().as_src(), DEFAULT_FAVICON);
    }

    #[tokio::test]
    async fn test_primary_success_stops_immediately() {
        let mut loader = MockIconLoader::new();
        loader
            .expect_load()
            .withf(|url: &str| url == PRIMARY)
            .times(1)
            .returning(|_| true);

        let source = FaviconResolver::new(SITE).resolve(&loader).await;
        assert_eq!(source, FaviconSource::Remote(PRIMARY.to_string()));
    }

    #[tokio::test]
    async fn test_secondary_used_after_primary_fails() {
        let mut seq = Sequence::new();
        let mut loader = MockIconLoader::new();
        loader
            .expect_load()
            .withf(|url: &str| url == PRIMARY)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| false);
        loader
            .expect_load()
            .withf(|url: &str| url == SECONDARY)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| true);

        let source = FaviconResolver::new(SITE).resolve(&loader).await;
        assert_eq!(source, FaviconSource::Remote(SECONDARY.to_string()));
    }

    #[tokio::test]
    async fn test_two_failures_fall_back_to_default() {
        let mut loader = MockIconLoader::new();
        loader.expect_load().times(2).returning(|_| false);

        let source = FaviconResolver::new(SITE).resolve(&loader).await;
        assert_eq!(source, FaviconSource::Default);
    }
}
