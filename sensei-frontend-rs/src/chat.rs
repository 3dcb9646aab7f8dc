//! Chat transcript persistence. The tutor's content logic lives in the
//! generation backend; this module only stores transcripts per
//! (lesson, display language) and recognizes the navigation sentinel.

use lesson_utils::ChatMessage;
use lesson_utils::DisplayLanguage;
use lesson_utils::generate::NEXT_LESSON_SENTINEL;

use crate::store::{KeyValueStore, keys};

pub fn load_transcript(
    store: &dyn KeyValueStore,
    lesson_number: u32,
    language: DisplayLanguage,
) -> Vec<ChatMessage> {
    let key = keys::chat_history(lesson_number, language);
    let Some(raw) = store.get(&key) else {
        return Vec::new();
    };
    match serde_json::from_str(&raw) {
        Ok(transcript) => transcript,
        Err(e) => {
            log::warn!("discarding unparseable chat transcript for {key}: {e}");
            store.remove(&key);
            Vec::new()
        }
    }
}

pub fn save_transcript(
    store: &dyn KeyValueStore,
    lesson_number: u32,
    language: DisplayLanguage,
    transcript: &[ChatMessage],
) {
    let key = keys::chat_history(lesson_number, language);
    match serde_json::to_string(transcript) {
        Ok(raw) => store.set(&key, &raw),
        Err(e) => log::error!("failed to serialize chat transcript for {key}: {e}"),
    }
}

/// Remove every per-lesson transcript, whatever lesson or language it
/// belongs to. Part of the coordinated reset sweep.
pub fn clear_transcripts(store: &dyn KeyValueStore) {
    for key in store.keys() {
        if key.starts_with(keys::CHAT_HISTORY_PREFIX) {
            store.remove(&key);
        }
    }
}

/// A reply consisting of the sentinel is a "go to the next lesson"
/// command and must never be appended to the transcript.
pub fn is_next_lesson_command(reply: &str) -> bool {
    reply.trim() == NEXT_LESSON_SENTINEL
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use lesson_utils::ChatRole;

    fn message(role: ChatRole, content: &str) -> ChatMessage {
        ChatMessage {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn transcripts_round_trip_per_lesson_and_language() {
        let store = MemoryStore::default();
        let transcript = vec![
            message(ChatRole::User, "what does は do?"),
            message(ChatRole::Model, "it marks the topic"),
        ];
        save_transcript(&store, 2, DisplayLanguage::English, &transcript);

        assert_eq!(
            load_transcript(&store, 2, DisplayLanguage::English),
            transcript
        );
        // Different language, different transcript.
        assert!(load_transcript(&store, 2, DisplayLanguage::Indonesian).is_empty());
        assert!(load_transcript(&store, 3, DisplayLanguage::English).is_empty());
    }

    #[test]
    fn malformed_transcripts_fall_back_to_empty() {
        let store = MemoryStore::default();
        let key = keys::chat_history(1, DisplayLanguage::Indonesian);
        store.set(&key, "not json");
        assert!(load_transcript(&store, 1, DisplayLanguage::Indonesian).is_empty());
        assert_eq!(store.get(&key), None);
    }

    #[test]
    fn clearing_removes_only_chat_keys() {
        let store = MemoryStore::default();
        save_transcript(&store, 1, DisplayLanguage::Indonesian, &[]);
        save_transcript(&store, 9, DisplayLanguage::Japanese, &[]);
        store.set("unrelated", "kept");

        clear_transcripts(&store);

        assert_eq!(store.keys(), vec!["unrelated".to_string()]);
    }

    #[test]
    fn sentinel_detection_trims_whitespace() {
        assert!(is_next_lesson_command(NEXT_LESSON_SENTINEL));
        assert!(is_next_lesson_command(&format!(
            " {NEXT_LESSON_SENTINEL}\n"
        )));
        assert!(!is_next_lesson_command("please continue"));
    }
}
