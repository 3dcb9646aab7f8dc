//! Where the user is: active lesson, topic tab, and top-level view.
//! Restored at startup and validated against the currently loaded data,
//! persisted on every change.

use lesson_utils::Topic;

use crate::store::{KeyValueStore, keys};

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub enum View {
    #[default]
    Lesson,
    Bookmarks,
    Practice,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Index into `LearningData::lessons`, not a lesson number.
    #[serde(rename = "activeIndex")]
    pub active_lesson_index: usize,
    pub active_topic: Topic,
    pub current_view: View,
}

impl SessionState {
    /// Restore the stored state. A stored lesson index outside the
    /// current data is stale (a prior, larger dataset) and falls back to
    /// 0; topic and view are kept as stored.
    pub fn restore(store: &dyn KeyValueStore, lesson_count: usize) -> Self {
        let Some(raw) = store.get(keys::SESSION_STATE) else {
            return Self::default();
        };
        let mut state: SessionState = match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(e) => {
                log::warn!("discarding unparseable session state: {e}");
                store.remove(keys::SESSION_STATE);
                return Self::default();
            }
        };
        if state.active_lesson_index >= lesson_count {
            state.active_lesson_index = 0;
        }
        state
    }

    pub fn persist(&self, store: &dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(raw) => store.set(keys::SESSION_STATE, &raw),
            Err(e) => log::error!("failed to serialize session state: {e}"),
        }
    }

    /// Advance to the next lesson, resetting the topic tab. No-op at the
    /// last lesson; never wraps.
    pub fn go_to_next(&mut self, lesson_count: usize) -> bool {
        if self.active_lesson_index + 1 >= lesson_count {
            return false;
        }
        self.active_lesson_index += 1;
        self.active_topic = Topic::Summary;
        true
    }

    /// Step back one lesson, resetting the topic tab. No-op at the first.
    pub fn go_to_previous(&mut self) -> bool {
        if self.active_lesson_index == 0 {
            return false;
        }
        self.active_lesson_index -= 1;
        self.active_topic = Topic::Summary;
        true
    }
}
