// SQLite-backed key-value storage for user preferences
// Survives between sessions; nothing else is persisted

pub mod preferences;

pub use preferences::{PreferenceDb, StoreError};
