//! Ownership of the persisted [`LearningData`] aggregate: restore with
//! fail-safe validation, whole-blob save, incremental merge of newly
//! generated lessons, and the coordinated reset sweep.

use lesson_utils::{LearningData, Lesson, LessonIndexItem};

use crate::chat;
use crate::store::{KeyValueStore, keys};

/// Restore the aggregate. A blob that fails to parse or fails shape
/// validation is deleted and reported as absent; a parse error never
/// reaches the caller.
pub fn load(store: &dyn KeyValueStore) -> Option<LearningData> {
    let raw = store.get(keys::LEARNING_DATA)?;
    let data: LearningData = match serde_json::from_str(&raw) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("discarding unparseable learning data: {e}");
            store.remove(keys::LEARNING_DATA);
            return None;
        }
    };
    if !data.is_consistent() {
        log::warn!("discarding learning data that fails shape validation");
        store.remove(keys::LEARNING_DATA);
        return None;
    }
    Some(data)
}

pub fn save(store: &dyn KeyValueStore, data: &LearningData) {
    match serde_json::to_string(data) {
        Ok(raw) => store.set(keys::LEARNING_DATA, &raw),
        Err(e) => log::error!("failed to serialize learning data: {e}"),
    }
}

/// Append newly generated lessons and re-sort ascending by lesson
/// number. Callers compute the missing set first, so an incoming number
/// that already exists means a generator or caller bug; such lessons are
/// dropped with a diagnostic rather than stored twice.
pub fn merge_lessons(mut data: LearningData, new_lessons: Vec<Lesson>) -> LearningData {
    let mut present = data.lesson_numbers();
    for lesson in new_lessons {
        if !present.insert(lesson.number) {
            log::warn!("ignoring duplicate lesson {} from the generator", lesson.number);
            continue;
        }
        data.lessons.push(lesson);
    }
    data.lessons.sort_by_key(|lesson| lesson.number);
    data
}

/// The next unit of "load more" work: index entries not yet generated,
/// in index (document) order, at most `batch_size` of them.
pub fn missing_lesson_refs(data: &LearningData, batch_size: usize) -> Vec<LessonIndexItem> {
    let present = data.lesson_numbers();
    data.lesson_index
        .iter()
        .filter(|item| !present.contains(&item.number))
        .take(batch_size)
        .cloned()
        .collect()
}

/// Wipe the aggregate and everything derived from it: session position,
/// bookmarks, and every chat transcript. Settings are kept.
pub fn reset(store: &dyn KeyValueStore) {
    store.remove(keys::LEARNING_DATA);
    store.remove(keys::SESSION_STATE);
    store.remove(keys::BOOKMARKS);
    chat::clear_transcripts(store);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use lesson_utils::{QUIZ_QUESTIONS, QuizItem};

    fn lesson(number: u32) -> Lesson {
        Lesson {
            number,
            title: format!("Lesson {number}"),
            summary: "summary".to_string(),
            vocabulary: vec![],
            grammar: vec![],
            quiz: (0..QUIZ_QUESTIONS)
                .map(|_| QuizItem {
                    question: "?".to_string(),
                    choices: ["a", "b", "c", "d"].map(str::to_string).to_vec(),
                    correct_choice: "a".to_string(),
                })
                .collect(),
        }
    }

    fn data(generated: &[u32], indexed: &[u32]) -> LearningData {
        LearningData {
            lessons: generated.iter().map(|n| lesson(*n)).collect(),
            lesson_index: indexed
                .iter()
                .map(|n| LessonIndexItem {
                    number: *n,
                    title: format!("Lesson {n}"),
                })
                .collect(),
        }
    }

    #[test]
    fn missing_refs_preserve_index_order_and_batch_size() {
        let index: Vec<u32> = (1..=20).collect();
        let data = data(&[1, 2, 3, 4, 5], &index);

        let missing = missing_lesson_refs(&data, 5);
        let numbers: Vec<u32> = missing.iter().map(|item| item.number).collect();
        assert_eq!(numbers, vec![6, 7, 8, 9, 10]);

        let all = missing_lesson_refs(&data, usize::MAX);
        assert_eq!(all.len(), 15);
        let present = data.lesson_numbers();
        for item in &all {
            assert!(!present.contains(&item.number));
        }
    }

    #[test]
    fn missing_refs_skip_non_contiguous_gaps() {
        let data = data(&[1, 4], &[1, 2, 3, 4, 5]);
        let numbers: Vec<u32> = missing_lesson_refs(&data, 10)
            .iter()
            .map(|item| item.number)
            .collect();
        assert_eq!(numbers, vec![2, 3, 5]);
    }

    #[test]
    fn merge_sorts_ascending_regardless_of_input_order() {
        let base = data(&[1, 5], &[1, 2, 3, 4, 5]);
        let merged = merge_lessons(base, vec![lesson(4), lesson(2), lesson(3)]);
        let numbers: Vec<u32> = merged.lessons.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn merge_drops_duplicate_lesson_numbers() {
        let base = data(&[1, 2], &[1, 2, 3]);
        let merged = merge_lessons(base, vec![lesson(2), lesson(3), lesson(3)]);
        let numbers: Vec<u32> = merged.lessons.iter().map(|l| l.number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn load_round_trips_through_the_store() {
        let store = MemoryStore::default();
        let original = data(&[1, 2], &[1, 2, 3]);
        save(&store, &original);
        assert_eq!(load(&store), Some(original));
    }

    #[test]
    fn load_drops_malformed_blobs_silently() {
        let store = MemoryStore::default();
        store.set(keys::LEARNING_DATA, "{ not json");
        assert_eq!(load(&store), None);
        assert_eq!(store.get(keys::LEARNING_DATA), None);
    }

    #[test]
    fn load_drops_blobs_that_fail_shape_validation() {
        let store = MemoryStore::default();
        // lesson 9 is not covered by the index
        let bad = data(&[9], &[1, 2]);
        store.set(keys::LEARNING_DATA, &serde_json::to_string(&bad).unwrap());
        assert_eq!(load(&store), None);
        assert_eq!(store.get(keys::LEARNING_DATA), None);
    }

    #[test]
    fn reset_sweeps_learning_keys_and_chat_transcripts_only() {
        let store = MemoryStore::default();
        save(&store, &data(&[1], &[1]));
        store.set(keys::SESSION_STATE, "{}");
        store.set(keys::BOOKMARKS, "[]");
        store.set("chat-history:1:id", "[]");
        store.set("chat-history:2:en", "[]");
        store.set(keys::CREDENTIAL, "secret");
        store.set(keys::DISPLAY_LANGUAGE, "en");

        reset(&store);

        assert_eq!(load(&store), None);
        assert_eq!(store.get(keys::SESSION_STATE), None);
        assert_eq!(store.get(keys::BOOKMARKS), None);
        assert!(
            !store
                .keys()
                .iter()
                .any(|key| key.starts_with(keys::CHAT_HISTORY_PREFIX))
        );
        assert_eq!(store.get(keys::CREDENTIAL).as_deref(), Some("secret"));
        assert_eq!(store.get(keys::DISPLAY_LANGUAGE).as_deref(), Some("en"));
    }
}
