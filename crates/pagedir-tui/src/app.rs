// TUI application state and event handling
use pagedir_core::card::site_url;
use pagedir_core::{CardTarget, FaviconResolver, FaviconSource, SiteCard, ViewController};
use ratatui::widgets::ListState;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,    // Navigating cards
    Searching, // Typing in search box
}

/// What the icon slot of a card currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaviconStatus {
    Pending,
    Found,
    Default,
}

impl FaviconStatus {
    pub fn glyph(&self) -> &'static str {
        match self {
            FaviconStatus::Pending => "◌",
            FaviconStatus::Found => "◆",
            FaviconStatus::Default => "●",
        }
    }
}

pub struct App {
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub controller: ViewController,
    /// Cards for the current query and sort, rebuilt by `refresh`
    pub cards: Vec<SiteCard>,
    pub selected_index: usize,
    pub list_state: ListState,
    /// Which part of the selected card Enter/Space activates
    pub focus: CardTarget,
    /// Resolved icons keyed by site URL
    pub favicons: HashMap<String, FaviconSource>,
    requested_favicons: HashSet<String>,
    pub error_message: Option<String>,
}

impl App {
    pub fn new(controller: ViewController) -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));

        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            controller,
            cards: Vec::new(),
            selected_index: 0,
            list_state,
            focus: CardTarget::Site,
            favicons: HashMap::new(),
            requested_favicons: HashSet::new(),
            error_message: None,
        }
    }

    /// Re-derive cards from the controller and keep the selection in range
    pub fn refresh(&mut self) {
        self.cards = self.controller.cards();
        if self.selected_index >= self.cards.len() {
            self.selected_index = self.cards.len().saturating_sub(1);
        }
        self.list_state.select(Some(self.selected_index));
    }

    pub fn search_input(&self) -> &str {
        self.controller.query()
    }

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Searching;
    }

    pub fn enter_normal_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn push_search_char(&mut self, c: char) {
        let mut query = self.controller.query().to_string();
        query.push(c);
        self.set_query(query);
    }

    pub fn pop_search_char(&mut self) {
        let mut query = self.controller.query().to_string();
        query.pop();
        self.set_query(query);
    }

    pub fn clear_search(&mut self) {
        self.set_query(String::new());
    }

    fn set_query(&mut self, query: String) {
        self.controller.set_query(query);
        self.selected_index = 0;
        self.focus = CardTarget::Site;
        self.refresh();
    }

    pub fn toggle_sort(&mut self) {
        self.controller.toggle_sort();
        self.refresh();
    }

    /// Only the layout changes, so the cards are left as they are
    pub fn toggle_view(&mut self) {
        self.controller.toggle_view();
    }

    pub fn next_card(&mut self) {
        if !self.cards.is_empty() {
            self.selected_index = (self.selected_index + 1).min(self.cards.len() - 1);
            self.list_state.select(Some(self.selected_index));
            self.focus = CardTarget::Site;
        }
    }

    pub fn previous_card(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
            self.list_state.select(Some(self.selected_index));
            self.focus = CardTarget::Site;
        }
    }

    pub fn selected_card(&self) -> Option<&SiteCard> {
        self.cards.get(self.selected_index)
    }

    pub fn toggle_focus(&mut self) {
        self.focus = self.focus.toggled();
    }

    /// URL for the focused target of the selected card
    pub fn activate(&self) -> Option<String> {
        self.selected_card()
            .map(|card| card.activate(self.focus).to_string())
    }

    pub fn activate_repository_link(&self) -> Option<String> {
        self.selected_card()
            .map(|card| card.activate(CardTarget::RepositoryLink).to_string())
    }

    /// Resolvers for every loaded site that has not been scheduled yet
    pub fn take_pending_favicons(&mut self) -> Vec<(String, FaviconResolver)> {
        let owner = self.controller.owner().to_string();
        let mut pending = Vec::new();

        for repo in self.controller.repositories() {
            let url = site_url(repo, &owner);
            if self.requested_favicons.insert(url.clone()) {
                let resolver = FaviconResolver::new(&url);
                pending.push((url, resolver));
            }
        }

        pending
    }

    pub fn set_favicon(&mut self, site_url: String, source: FaviconSource) {
        self.favicons.insert(site_url, source);
    }

    pub fn favicon_status(&self, card: &SiteCard) -> FaviconStatus {
        match self.favicons.get(&card.site_url) {
            None => FaviconStatus::Pending,
            Some(FaviconSource::Remote(_)) => FaviconStatus::Found,
            Some(FaviconSource::Default) => FaviconStatus::Default,
        }
    }

    /// Count shown in the header: total, or shown/total while searching
    pub fn count_label(&self) -> String {
        let total = self.controller.count();
        if self.controller.query().trim().is_empty() || !self.controller.is_loaded() {
            total.to_string()
        } else {
            format!("{}/{}", self.cards.len(), total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagedir_core::{Preferences, RepositoryRecord, StatusMessage, ViewMode};

    fn record(name: &str, created: &str) -> RepositoryRecord {
        RepositoryRecord {
            name: name.to_string(),
            description: None,
            homepage: None,
            html_url: format!("https://github.com/octo/{}", name),
            has_pages: true,
            language: None,
            stargazers_count: 0,
            created_at: Some(created.to_string()),
            updated_at: None,
        }
    }

    fn loaded_app() -> App {
        let mut controller = ViewController::new("octo", Preferences::unavailable());
        controller.begin_load();
        controller.finish_load(Ok(vec![
            record("alpha", "2022-01-01"),
            record("beta", "2024-01-01"),
            record("gamma", "2023-01-01"),
        ]));
        let mut app = App::new(controller);
        app.refresh();
        app
    }

    #[test]
    fn test_typing_filters_live() {
        let mut app = loaded_app();
        assert_eq!(app.cards.len(), 3);

        app.push_search_char('m');
        app.push_search_char('m');
        assert_eq!(app.search_input(), "mm");
        assert_eq!(app.cards.len(), 1);
        assert_eq!(app.count_label(), "1/3");

        app.push_search_char('x');
        assert!(app.cards.is_empty());
        assert_eq!(app.controller.status(), Some(StatusMessage::NoMatches));

        app.clear_search();
        assert_eq!(app.cards.len(), 3);
        assert_eq!(app.count_label(), "3");
    }

    #[test]
    fn test_selection_stays_in_bounds() {
        let mut app = loaded_app();
        app.next_card();
        app.next_card();
        app.next_card();
        assert_eq!(app.selected_index, 2);

        app.push_search_char('b');
        assert_eq!(app.selected_index, 0);
        app.previous_card();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_repo_link_focus_opens_only_repository() {
        let mut app = loaded_app();
        assert_eq!(app.activate().as_deref(), Some("https://octo.github.io/beta/"));

        app.toggle_focus();
        assert_eq!(app.activate().as_deref(), Some("https://github.com/octo/beta"));

        // Moving resets focus to the card itself
        app.next_card();
        assert_eq!(app.focus, CardTarget::Site);
        assert_eq!(
            app.activate_repository_link().as_deref(),
            Some("https://github.com/octo/gamma")
        );
    }

    #[test]
    fn test_view_toggle_keeps_cards() {
        let mut app = loaded_app();
        let before = app.cards.clone();
        app.toggle_view();
        assert_eq!(app.controller.view_mode(), ViewMode::Tiles);
        assert_eq!(app.cards, before);
    }

    #[test]
    fn test_favicons_scheduled_once() {
        let mut app = loaded_app();
        let first = app.take_pending_favicons();
        assert_eq!(first.len(), 3);
        assert!(app.take_pending_favicons().is_empty());

        let card = app.cards[0].clone();
        assert_eq!(app.favicon_status(&card), FaviconStatus::Pending);
        app.set_favicon(card.site_url.clone(), FaviconSource::Default);
        assert_eq!(app.favicon_status(&card), FaviconStatus::Default);
    }
}
