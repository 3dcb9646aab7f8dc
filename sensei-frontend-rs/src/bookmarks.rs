//! Bookmarked vocabulary and grammar entries. A bookmark is a typed
//! composite key (lesson number, category, position within the lesson),
//! not a reference to the item itself; resolution re-scans the loaded
//! aggregate, so bookmarks pointing at not-yet-loaded or vanished
//! lessons simply resolve to nothing.

use std::collections::BTreeSet;

use lesson_utils::{GrammarPoint, LearningData, VocabularyItem};

use crate::store::{KeyValueStore, keys};

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    parse_display::Display,
    parse_display::FromStr,
)]
pub enum BookmarkCategory {
    #[display("vocabulary")]
    Vocabulary,
    #[display("grammar")]
    Grammar,
}

/// Identity of one bookmarkable entry. Two identical words in different
/// lessons (or positions) are distinct keys. Persisted in the opaque
/// string form `lesson-{n}-{category}-{i}`.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    parse_display::Display,
    parse_display::FromStr,
)]
#[display("lesson-{lesson}-{category}-{index}")]
pub struct BookmarkKey {
    pub lesson: u32,
    pub category: BookmarkCategory,
    pub index: usize,
}

impl BookmarkKey {
    pub fn vocabulary(lesson: u32, index: usize) -> Self {
        Self {
            lesson,
            category: BookmarkCategory::Vocabulary,
            index,
        }
    }

    pub fn grammar(lesson: u32, index: usize) -> Self {
        Self {
            lesson,
            category: BookmarkCategory::Grammar,
            index,
        }
    }
}

impl serde::Serialize for BookmarkKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> serde::Deserialize<'de> for BookmarkKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = <String as serde::Deserialize>::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A grammar bookmark resolved back to its lesson context.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkedGrammar {
    pub lesson_number: u32,
    pub lesson_title: String,
    pub point: GrammarPoint,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct BookmarkSet {
    entries: BTreeSet<BookmarkKey>,
}

impl BookmarkSet {
    /// Restore from the store; a malformed blob is deleted and treated
    /// as an empty set.
    pub fn restore(store: &dyn KeyValueStore) -> Self {
        let Some(raw) = store.get(keys::BOOKMARKS) else {
            return Self::default();
        };
        match serde_json::from_str::<Vec<BookmarkKey>>(&raw) {
            Ok(list) => Self {
                entries: list.into_iter().collect(),
            },
            Err(e) => {
                log::warn!("discarding unparseable bookmarks: {e}");
                store.remove(keys::BOOKMARKS);
                Self::default()
            }
        }
    }

    /// Serialized as an array of key strings; order carries no meaning.
    pub fn persist(&self, store: &dyn KeyValueStore) {
        let list: Vec<BookmarkKey> = self.entries.iter().copied().collect();
        match serde_json::to_string(&list) {
            Ok(raw) => store.set(keys::BOOKMARKS, &raw),
            Err(e) => log::error!("failed to serialize bookmarks: {e}"),
        }
    }

    /// Add if absent, remove if present. Returns whether the key is
    /// present afterwards.
    pub fn toggle(&mut self, key: BookmarkKey) -> bool {
        if self.entries.remove(&key) {
            false
        } else {
            self.entries.insert(key);
            true
        }
    }

    pub fn contains(&self, key: &BookmarkKey) -> bool {
        self.entries.contains(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All bookmarked vocabulary, in lesson-then-item order.
    pub fn resolve_vocabulary(&self, data: &LearningData) -> Vec<VocabularyItem> {
        let mut items = Vec::new();
        for lesson in &data.lessons {
            for (index, item) in lesson.vocabulary.iter().enumerate() {
                if self.contains(&BookmarkKey::vocabulary(lesson.number, index)) {
                    items.push(item.clone());
                }
            }
        }
        items
    }

    /// All bookmarked grammar points with their lesson context, in
    /// lesson-then-item order.
    pub fn resolve_grammar(&self, data: &LearningData) -> Vec<BookmarkedGrammar> {
        let mut points = Vec::new();
        for lesson in &data.lessons {
            for (index, point) in lesson.grammar.iter().enumerate() {
                if self.contains(&BookmarkKey::grammar(lesson.number, index)) {
                    points.push(BookmarkedGrammar {
                        lesson_number: lesson.number,
                        lesson_title: lesson.title.clone(),
                        point: point.clone(),
                    });
                }
            }
        }
        points
    }
}
