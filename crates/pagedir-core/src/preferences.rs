use crate::models::{SortMode, ViewMode};
use pagedir_cache::{PreferenceDb, StoreError};
use tracing::debug;

#[cfg(test)]
use mockall::automock;

pub const SORT_KEY: &str = "sort_mode";
pub const VIEW_KEY: &str = "view_mode";

/// Raw string storage behind [`Preferences`]
#[cfg_attr(test, automock)]
pub trait PreferenceBackend {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl PreferenceBackend for PreferenceDb {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        PreferenceDb::get(self, key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        PreferenceDb::set(self, key, value)
    }
}

/// Sort and view preferences that never fail.
///
/// Reads fall back to the defaults on any fault, writes are best-effort.
/// An unavailable store behaves like an empty one that forgets writes.
pub struct Preferences {
    backend: Option<Box<dyn PreferenceBackend>>,
}

impl Preferences {
    pub fn new(backend: Box<dyn PreferenceBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn unavailable() -> Self {
        Self { backend: None }
    }

    /// Open the SQLite store, or fall back to an unavailable one
    pub fn open_or_unavailable<P: AsRef<std::path::Path>>(path: P) -> Self {
        match PreferenceDb::open(path.as_ref()) {
            Ok(db) => Self::new(Box::new(db)),
            Err(e) => {
                debug!("Preference store unavailable: {}", e);
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.backend.is_some()
    }

    fn read(&self, key: &str) -> Option<String> {
        let backend = self.backend.as_ref()?;
        match backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                debug!("Ignoring preference read failure for {}: {}", key, e);
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.set(key, value) {
                debug!("Ignoring preference write failure for {}: {}", key, e);
            }
        }
    }

    pub fn sort_mode(&self) -> SortMode {
        SortMode::from_stored(self.read(SORT_KEY).as_deref())
    }

    pub fn view_mode(&self) -> ViewMode {
        ViewMode::from_stored(self.read(VIEW_KEY).as_deref())
    }

    pub fn set_sort_mode(&self, mode: SortMode) {
        self.write(SORT_KEY, mode.as_str());
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.write(VIEW_KEY, mode.as_str());
    }
}
