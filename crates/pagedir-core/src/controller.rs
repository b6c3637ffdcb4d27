// View state and the transitions user input drives through it
use crate::card::SiteCard;
use crate::directory;
use crate::models::{RepositoryRecord, SortMode, ViewMode};
use crate::preferences::Preferences;
use crate::source::RepositorySource;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    LoadedEmpty,
    Loaded,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Error,
}

/// Message shown in the status slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusMessage {
    Loading,
    NoSites,
    NoMatches,
    LoadFailed,
}

impl StatusMessage {
    pub fn text(&self) -> &'static str {
        match self {
            StatusMessage::Loading => "Loading…",
            StatusMessage::NoSites => "No sites found.",
            StatusMessage::NoMatches => "No matches.",
            StatusMessage::LoadFailed => "Failed to load.",
        }
    }

    pub fn kind(&self) -> StatusKind {
        match self {
            StatusMessage::LoadFailed => StatusKind::Error,
            _ => StatusKind::Info,
        }
    }
}

impl std::fmt::Display for StatusMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Text and pressed state for a toggle control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToggleLabel {
    pub text: &'static str,
    /// Set when the non-default mode is active
    pub pressed: bool,
}

/// Owns the fetched collection and the three view settings.
///
/// The collection is replaced wholesale by a load and never mutated
/// afterwards; everything the UI shows is derived from it on demand.
pub struct ViewController {
    owner: String,
    date_format: String,
    repos: Vec<RepositoryRecord>,
    query: String,
    sort_mode: SortMode,
    view_mode: ViewMode,
    state: LoadState,
    status: Option<StatusMessage>,
    prefs: Preferences,
}

impl ViewController {
    /// Modes start from whatever the preference store remembers
    pub fn new(owner: impl Into<String>, prefs: Preferences) -> Self {
        let sort_mode = prefs.sort_mode();
        let view_mode = prefs.view_mode();

        Self {
            owner: owner.into(),
            date_format: "%Y-%m-%d".to_string(),
            repos: Vec::new(),
            query: String::new(),
            sort_mode,
            view_mode,
            state: LoadState::Idle,
            status: None,
            prefs,
        }
    }

    pub fn with_date_format(mut self, date_format: impl Into<String>) -> Self {
        self.date_format = date_format.into();
        self
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn status(&self) -> Option<StatusMessage> {
        self.status
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn sort_mode(&self) -> SortMode {
        self.sort_mode
    }

    pub fn view_mode(&self) -> ViewMode {
        self.view_mode
    }

    /// The whole qualifying collection, in fetch order
    pub fn repositories(&self) -> &[RepositoryRecord] {
        &self.repos
    }

    /// Number of qualifying sites, regardless of the search query
    pub fn count(&self) -> usize {
        self.repos.len()
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, LoadState::Loaded | LoadState::LoadedEmpty)
    }

    pub fn begin_load(&mut self) {
        self.state = LoadState::Loading;
        self.status = Some(StatusMessage::Loading);
    }

    /// Apply the outcome of the one fetch
    pub fn finish_load(&mut self, result: crate::Result<Vec<RepositoryRecord>>) {
        match result {
            Ok(repos) => {
                let fetched = repos.len();
                self.repos = select_pages_repos(repos, &self.owner);
                info!(
                    "Loaded {} of {} repositories for {}",
                    self.repos.len(),
                    fetched,
                    self.owner
                );

                if self.repos.is_empty() {
                    self.state = LoadState::LoadedEmpty;
                    self.status = Some(StatusMessage::NoSites);
                } else {
                    self.state = LoadState::Loaded;
                    self.refresh_status();
                }
            }
            Err(e) => {
                error!("Failed to load repositories for {}: {}", self.owner, e);
                self.repos = Vec::new();
                self.state = LoadState::Error;
                self.status = Some(StatusMessage::LoadFailed);
            }
        }
    }

    /// Fetch once from `source`. Later calls are ignored.
    pub async fn load(&mut self, source: &dyn RepositorySource) {
        if self.state != LoadState::Idle {
            warn!("Repositories already requested; ignoring repeated load");
            return;
        }

        self.begin_load();
        let result = source.list_repositories(&self.owner).await;
        self.finish_load(result);
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        if self.state == LoadState::Loaded {
            self.refresh_status();
        }
    }

    pub fn toggle_sort(&mut self) -> SortMode {
        self.sort_mode = self.sort_mode.toggled();
        self.prefs.set_sort_mode(self.sort_mode);
        if self.state == LoadState::Loaded {
            self.refresh_status();
        }
        self.sort_mode
    }

    /// Layout only; the visible set does not change
    pub fn toggle_view(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.toggled();
        self.prefs.set_view_mode(self.view_mode);
        self.view_mode
    }

    pub fn sort_label(&self) -> ToggleLabel {
        match self.sort_mode {
            SortMode::CreatedDescending => ToggleLabel {
                text: "Sort: Created",
                pressed: false,
            },
            SortMode::AlphabeticalAscending => ToggleLabel {
                text: "Sort: A–Z",
                pressed: true,
            },
        }
    }

    pub fn view_label(&self) -> ToggleLabel {
        match self.view_mode {
            ViewMode::List => ToggleLabel {
                text: "View: List",
                pressed: false,
            },
            ViewMode::Tiles => ToggleLabel {
                text: "View: Tiles",
                pressed: true,
            },
        }
    }

    /// Filtered and sorted records; empty until a load succeeded
    pub fn visible(&self) -> Vec<&RepositoryRecord> {
        if !self.is_loaded() {
            return Vec::new();
        }
        directory::arrange(&self.repos, &self.query, self.sort_mode)
    }

    pub fn cards(&self) -> Vec<SiteCard> {
        self.visible()
            .into_iter()
            .map(|repo| SiteCard::from_record(repo, &self.owner, &self.date_format))
            .collect()
    }

    fn refresh_status(&mut self) {
        let searching = !self.query.trim().is_empty();
        self.status = if searching && self.visible().is_empty() {
            Some(StatusMessage::NoMatches)
        } else {
            None
        };
    }
}

/// Keep Pages-enabled, named repositories other than the owner's root site
pub fn select_pages_repos(repos: Vec<RepositoryRecord>, owner: &str) -> Vec<RepositoryRecord> {
    repos
        .into_iter()
        .filter(|repo| repo.has_pages && !repo.name.is_empty() && !repo.is_root_site_of(owner))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockRepositorySource;
    use crate::Error;
    use pagedir_cache::PreferenceDb;

    fn repo(name: &str, has_pages: bool, created: &str) -> RepositoryRecord {
        RepositoryRecord {
            name: name.to_string(),
            description: None,
            homepage: None,
            html_url: format!("https://github.com/Mkpb321/{}", name),
            has_pages,
            language: Some("HTML".to_string()),
            stargazers_count: 1,
            created_at: Some(created.to_string()),
            updated_at: Some(created.to_string()),
        }
    }

    fn controller() -> ViewController {
        ViewController::new("Mkpb321", Preferences::unavailable())
    }

    fn loaded(repos: Vec<RepositoryRecord>) -> ViewController {
        let mut vc = controller();
        vc.begin_load();
        vc.finish_load(Ok(repos));
        vc
    }

    fn visible_names(vc: &ViewController) -> Vec<String> {
        vc.visible().iter().map(|r| r.name.clone()).collect()
    }

    #[test]
    fn test_begin_load_shows_loading() {
        let mut vc = controller();
        assert_eq!(vc.state(), LoadState::Idle);
        vc.begin_load();
        assert_eq!(vc.state(), LoadState::Loading);
        assert_eq!(vc.status(), Some(StatusMessage::Loading));
        assert!(vc.visible().is_empty());
    }

    #[test]
    fn test_empty_result_is_informational() {
        let vc = loaded(vec![repo("private-notes", false, "2023-01-01")]);
        assert_eq!(vc.state(), LoadState::LoadedEmpty);
        assert_eq!(vc.status(), Some(StatusMessage::NoSites));
        assert_eq!(vc.status().map(|s| s.kind()), Some(StatusKind::Info));
        assert_eq!(vc.count(), 0);
        assert!(vc.cards().is_empty());
    }

    #[test]
    fn test_failure_is_terminal_error() {
        let mut vc = controller();
        vc.begin_load();
        vc.finish_load(Err(Error::ApiError("Status 500".to_string())));
        assert_eq!(vc.state(), LoadState::Error);
        assert_eq!(vc.status(), Some(StatusMessage::LoadFailed));
        assert_eq!(vc.status().map(|s| s.kind()), Some(StatusKind::Error));

        vc.set_query("a");
        assert_eq!(vc.status(), Some(StatusMessage::LoadFailed));
        assert!(vc.visible().is_empty());
    }

    #[test]
    fn test_no_matches_keeps_count() {
        let mut vc = loaded(vec![
            repo("a", true, "2023-01-01"),
            repo("b", true, "2023-02-01"),
        ]);
        assert_eq!(vc.status(), None);

        vc.set_query("zz");
        assert!(vc.visible().is_empty());
        assert_eq!(vc.status(), Some(StatusMessage::NoMatches));
        assert_eq!(vc.count(), 2);

        vc.set_query("");
        assert_eq!(vc.status(), None);
        assert_eq!(visible_names(&vc), vec!["b", "a"]);
    }

    #[test]
    fn test_toggles_persist_and_relabel() {
        let db = PreferenceDb::in_memory().unwrap();
        let mut vc = ViewController::new("Mkpb321", Preferences::new(Box::new(db)));
        assert_eq!(vc.sort_label().text, "Sort: Created");
        assert!(!vc.view_label().pressed);

        assert_eq!(vc.toggle_sort(), SortMode::AlphabeticalAscending);
        assert_eq!(vc.toggle_view(), ViewMode::Tiles);
        assert_eq!(vc.sort_label().text, "Sort: A–Z");
        assert!(vc.sort_label().pressed);
        assert_eq!(vc.view_label().text, "View: Tiles");
        assert_eq!(vc.prefs.sort_mode(), SortMode::AlphabeticalAscending);
        assert_eq!(vc.prefs.view_mode(), ViewMode::Tiles);
    }

    #[test]
    fn test_view_toggle_keeps_visible_set() {
        let mut vc = loaded(vec![
            repo("Alpha", true, "2023-01-01"),
            repo("beta", true, "2024-01-01"),
        ]);
        let before = visible_names(&vc);
        vc.toggle_view();
        assert_eq!(visible_names(&vc), before);

        vc.toggle_sort();
        assert_eq!(visible_names(&vc), vec!["Alpha", "beta"]);
    }

    #[test]
    fn test_stored_preferences_apply_at_start() {
        let db = PreferenceDb::in_memory().unwrap();
        db.set("sort_mode", "alpha").unwrap();
        db.set("view_mode", "tiles").unwrap();

        let vc = ViewController::new("Mkpb321", Preferences::new(Box::new(db)));
        assert_eq!(vc.sort_mode(), SortMode::AlphabeticalAscending);
        assert_eq!(vc.view_mode(), ViewMode::Tiles);
    }

    #[tokio::test]
    async fn test_load_fetches_exactly_once() {
        let mut source = MockRepositorySource::new();
        source
            .expect_list_repositories()
            .withf(|owner: &str| owner == "Mkpb321")
            .times(1)
            .returning(|_| Ok(vec![repo("a", true, "2023-01-01")]));

        let mut vc = controller();
        vc.load(&source).await;
        vc.load(&source).await;
        assert_eq!(vc.state(), LoadState::Loaded);
        assert_eq!(vc.count(), 1);
    }

    #[test]
    fn test_select_pages_repos_skips_unnamed_and_root() {
        let repos = vec![
            repo("", true, "2023-01-01"),
            repo("mkpb321.github.io", true, "2023-01-01"),
            repo("site", true, "2023-01-01"),
            repo("lib", false, "2023-01-01"),
        ];
        let kept = select_pages_repos(repos, "Mkpb321");
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].name, "site");
    }
}
