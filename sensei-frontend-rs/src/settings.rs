//! User settings: display language and the generation-backend
//! credential. Explicitly constructed and injected rather than ambient;
//! each value lives under its own key and survives a session reset.

use lesson_utils::DisplayLanguage;

use crate::store::{KeyValueStore, keys};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Settings {
    pub display_language: DisplayLanguage,
    pub credential: Option<String>,
}

impl Settings {
    pub fn restore(store: &dyn KeyValueStore) -> Self {
        let display_language = match store.get(keys::DISPLAY_LANGUAGE) {
            Some(code) => match code.parse() {
                Ok(language) => language,
                Err(e) => {
                    log::warn!("ignoring unknown display language {code:?}: {e}");
                    DisplayLanguage::default()
                }
            },
            None => DisplayLanguage::default(),
        };
        let credential = store.get(keys::CREDENTIAL).filter(|value| !value.is_empty());
        Self {
            display_language,
            credential,
        }
    }

    pub fn set_display_language(&mut self, store: &dyn KeyValueStore, language: DisplayLanguage) {
        self.display_language = language;
        store.set(keys::DISPLAY_LANGUAGE, &language.to_string());
    }

    /// Store a new credential. Only an explicit save replaces the old
    /// one; failed verification elsewhere never clears it.
    pub fn set_credential(&mut self, store: &dyn KeyValueStore, credential: String) {
        store.set(keys::CREDENTIAL, &credential);
        self.credential = Some(credential);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn defaults_when_nothing_is_stored() {
        let store = MemoryStore::default();
        let settings = Settings::restore(&store);
        assert_eq!(settings.display_language, DisplayLanguage::Indonesian);
        assert_eq!(settings.credential, None);
    }

    #[test]
    fn values_round_trip_under_their_own_keys() {
        let store = MemoryStore::default();
        let mut settings = Settings::restore(&store);
        settings.set_display_language(&store, DisplayLanguage::Japanese);
        settings.set_credential(&store, "api-key-123".to_string());

        assert_eq!(store.get(keys::DISPLAY_LANGUAGE).as_deref(), Some("ja"));
        assert_eq!(store.get(keys::CREDENTIAL).as_deref(), Some("api-key-123"));

        let restored = Settings::restore(&store);
        assert_eq!(restored.display_language, DisplayLanguage::Japanese);
        assert_eq!(restored.credential.as_deref(), Some("api-key-123"));
    }

    #[test]
    fn unknown_language_codes_fall_back_to_the_default() {
        let store = MemoryStore::default();
        store.set(keys::DISPLAY_LANGUAGE, "xx");
        let settings = Settings::restore(&store);
        assert_eq!(settings.display_language, DisplayLanguage::Indonesian);
    }
}
