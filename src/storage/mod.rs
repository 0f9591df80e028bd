//!  Storage is organized through [key_value::KeyValueStore].
//!  The basic idea is:
//!   - Every collection lives under a single logical key.
//!   - Values are JSON documents, rewritten whole after each change.
//!   - [key_value::FileStore] keeps one `<key>.json` file per key in a directory.

pub mod entities;
pub mod key_value;

/// Logical keys of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    Projects,
    TimeEntries,
    ActiveEntry,
    UserSettings,
}

impl StoreKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKey::Projects => "projects",
            StoreKey::TimeEntries => "timeEntries",
            StoreKey::ActiveEntry => "activeEntry",
            StoreKey::UserSettings => "userSettings",
        }
    }
}
