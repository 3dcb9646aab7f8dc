//! Browser-local key/value persistence. Everything durable goes through
//! the [`KeyValueStore`] trait: the lesson aggregate, bookmarks, session
//! position, chat transcripts, and settings. The store is a cache, not a
//! database of record: every operation is best-effort, failed reads are
//! treated as absent, and failed writes are logged and swallowed.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

/// The durable key layout. Reset clears the learning keys and sweeps the
/// chat prefix; `CREDENTIAL` and `DISPLAY_LANGUAGE` survive.
pub mod keys {
    use lesson_utils::DisplayLanguage;

    pub const LEARNING_DATA: &str = "learning-data";
    pub const SESSION_STATE: &str = "session-state";
    pub const BOOKMARKS: &str = "bookmarks";
    pub const CREDENTIAL: &str = "credential";
    pub const DISPLAY_LANGUAGE: &str = "display-language";
    pub const CHAT_HISTORY_PREFIX: &str = "chat-history:";

    pub fn chat_history(lesson_number: u32, language: DisplayLanguage) -> String {
        format!("{CHAT_HISTORY_PREFIX}{lesson_number}:{language}")
    }
}

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
    fn keys(&self) -> Vec<String>;
}

/// In-memory store backing native builds and tests. Clones share the
/// same backing map, so a test can hand a clone to the engine and still
/// inspect what was written.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }

    fn keys(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

/// `window.localStorage` behind the same contract. Storage being
/// unavailable (disabled, private mode quota, detached worker) degrades
/// to an empty store rather than an error.
#[cfg(target_arch = "wasm32")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

#[cfg(target_arch = "wasm32")]
impl BrowserStorage {
    pub fn new() -> Self {
        BrowserStorage
    }

    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|window| window.local_storage().ok().flatten())
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        let Some(storage) = Self::storage() else {
            log::warn!("local storage unavailable, dropping write for {key}");
            return;
        };
        if let Err(e) = storage.set_item(key, value) {
            log::warn!("local storage write for {key} failed: {e:?}");
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage()
            && let Err(e) = storage.remove_item(key)
        {
            log::warn!("local storage remove for {key} failed: {e:?}");
        }
    }

    fn keys(&self) -> Vec<String> {
        let Some(storage) = Self::storage() else {
            return Vec::new();
        };
        let length = storage.length().unwrap_or(0);
        (0..length)
            .filter_map(|i| storage.key(i).ok().flatten())
            .collect()
    }
}
