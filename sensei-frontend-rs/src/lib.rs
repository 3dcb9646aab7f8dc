#![deny(clippy::string_slice)]

//! Client-side session engine for the textbook study app. Everything
//! durable lives in browser-local storage; the generation backend turns
//! source material into structured lessons and tutor replies, and this
//! crate owns the state in between: the lesson aggregate, bookmarks and
//! flashcard practice, the per-lesson quiz, full-text search, and
//! session navigation. Compiled to WASM, the [`Sensei`] object is the
//! single entry point the UI talks to.

mod bookmarks;
mod chat;
mod generate;
mod practice;
mod quiz;
mod repository;
mod search;
mod session;
mod settings;
mod store;
mod utils;

pub use bookmarks::{BookmarkCategory, BookmarkKey, BookmarkSet, BookmarkedGrammar};
pub use generate::{GenerateError, RequestError};
pub use practice::{
    CardOutcome, MIN_PRACTICE_ITEMS, PracticeCard, PracticeProgress, PracticeQuestionKind,
    PracticeSession,
};
pub use quiz::QuizSession;
pub use search::{SearchCategory, SearchHit};
pub use session::{SessionState, View};
pub use store::{KeyValueStore, MemoryStore};

use std::cell::{Cell, RefCell};
use std::sync::LazyLock;

use lesson_utils::generate::{ChatRequest, SourceDocument};
use lesson_utils::{
    ChatMessage, ChatRole, DisplayLanguage, LearningData, Lesson, Topic, VocabularyItem,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use wasm_bindgen::prelude::*;

/// How many lessons one "load more" round asks the backend for.
const LESSON_BATCH: usize = 5;

static LOGGER: LazyLock<()> = LazyLock::new(|| {
    utils::set_panic_hook();
    #[cfg(target_arch = "wasm32")]
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("Logging initialized");
});

/// Clears an in-flight latch when dropped, whatever path the operation
/// takes. One operation of each kind at a time; acquiring a held latch
/// fails instead of queueing.
struct BusyGuard<'a> {
    flag: &'a Cell<bool>,
}

impl<'a> BusyGuard<'a> {
    fn acquire(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.get() {
            return None;
        }
        flag.set(true);
        Some(Self { flag })
    }
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.flag.set(false);
    }
}

/// One sidebar row: a loaded lesson projected for display/filtering.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct LessonListEntry {
    pub index: usize,
    pub number: u32,
    pub title: String,
}

/// What came back from one tutor turn. `reply` is absent when the turn
/// was a navigation command or arrived stale.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ChatOutcome {
    pub reply: Option<String>,
    pub advanced: bool,
    pub at_last_lesson: bool,
    pub discarded: bool,
}

#[wasm_bindgen]
pub struct Sensei {
    store: Box<dyn KeyValueStore>,
    data: RefCell<Option<LearningData>>,
    bookmarks: RefCell<BookmarkSet>,
    session: RefCell<SessionState>,
    quiz: RefCell<QuizSession>,
    practice: RefCell<Option<PracticeSession>>,
    settings: RefCell<settings::Settings>,
    rng: RefCell<ChaCha8Rng>,
    // Bumped on reset; async completions from before the bump are stale
    // and must be discarded, not applied.
    epoch: Cell<u64>,
    analyzing: Cell<bool>,
    extending: Cell<bool>,
    chatting: Cell<bool>,
}

impl Sensei {
    /// Build the engine over any store implementation. Native embeddings
    /// and tests come in here; the browser constructor below picks
    /// `localStorage`.
    pub fn with_store(store: Box<dyn KeyValueStore>, seed: u64) -> Self {
        let data = repository::load(&*store);
        let lesson_count = data.as_ref().map_or(0, |data| data.lessons.len());
        let session = SessionState::restore(&*store, lesson_count);
        let bookmarks = BookmarkSet::restore(&*store);
        let settings = settings::Settings::restore(&*store);
        Self {
            store,
            data: RefCell::new(data),
            bookmarks: RefCell::new(bookmarks),
            session: RefCell::new(session),
            quiz: RefCell::new(QuizSession::new()),
            practice: RefCell::new(None),
            settings: RefCell::new(settings),
            rng: RefCell::new(ChaCha8Rng::seed_from_u64(seed)),
            epoch: Cell::new(0),
            analyzing: Cell::new(false),
            extending: Cell::new(false),
            chatting: Cell::new(false),
        }
    }

    /// Adopt a freshly generated aggregate, replacing whatever was
    /// loaded. Standalone text sessions pass `persist = false` and stay
    /// temporary.
    pub fn apply_learning_data(&self, data: LearningData, persist: bool) {
        if persist {
            repository::save(&*self.store, &data);
        }
        *self.data.borrow_mut() = Some(data);
        let session = SessionState::default();
        session.persist(&*self.store);
        *self.session.borrow_mut() = session;
        *self.quiz.borrow_mut() = QuizSession::new();
        *self.practice.borrow_mut() = None;
    }

    /// Merge a generated batch into the aggregate and persist. Returns
    /// how many lessons were actually added.
    pub fn apply_new_lessons(&self, lessons: Vec<Lesson>) -> usize {
        let mut slot = self.data.borrow_mut();
        let Some(data) = slot.take() else {
            return 0;
        };
        let before = data.lessons.len();
        let merged = repository::merge_lessons(data, lessons);
        let added = merged.lessons.len() - before;
        repository::save(&*self.store, &merged);
        *slot = Some(merged);
        added
    }

    fn settings_snapshot(&self) -> (DisplayLanguage, Option<String>) {
        let settings = self.settings.borrow();
        (settings.display_language, settings.credential.clone())
    }

    fn active_lesson_number(&self) -> Option<u32> {
        let data = self.data.borrow();
        let session = self.session.borrow();
        data.as_ref()?
            .lessons
            .get(session.active_lesson_index)
            .map(|lesson| lesson.number)
    }

    // Lesson switches invalidate the per-lesson quiz sheet.
    fn reset_quiz(&self) {
        *self.quiz.borrow_mut() = QuizSession::new();
    }
}

#[cfg_attr(target_arch = "wasm32", wasm_bindgen)]
impl Sensei {
    /// Build the engine against browser-local storage, restoring any
    /// previous session. `seed` feeds the practice shuffler; pass
    /// something that varies per page load.
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen(constructor))]
    pub fn new(seed: u64) -> Sensei {
        LazyLock::force(&LOGGER);

        #[cfg(target_arch = "wasm32")]
        let store: Box<dyn KeyValueStore> = Box::new(store::BrowserStorage::new());
        #[cfg(not(target_arch = "wasm32"))]
        let store: Box<dyn KeyValueStore> = Box::new(store::MemoryStore::default());

        Self::with_store(store, seed)
    }

    // =======
    // learning data
    // =======

    pub fn has_data(&self) -> bool {
        self.data.borrow().is_some()
    }

    pub fn learning_data(&self) -> Option<LearningData> {
        self.data.borrow().clone()
    }

    pub fn lesson_count(&self) -> usize {
        self.data
            .borrow()
            .as_ref()
            .map_or(0, |data| data.lessons.len())
    }

    pub fn has_more_lessons(&self) -> bool {
        self.data
            .borrow()
            .as_ref()
            .is_some_and(LearningData::has_more_lessons)
    }

    pub fn active_lesson(&self) -> Option<Lesson> {
        let data = self.data.borrow();
        let session = self.session.borrow();
        data.as_ref()?
            .lessons
            .get(session.active_lesson_index)
            .cloned()
    }

    /// Sidebar projection: loaded lessons whose title or number matches
    /// the filter (case-insensitive); a blank filter lists everything.
    pub fn filter_lessons(&self, filter: String) -> Vec<LessonListEntry> {
        let data = self.data.borrow();
        let Some(data) = data.as_ref() else {
            return Vec::new();
        };
        let needle = filter.trim().to_lowercase();
        data.lessons
            .iter()
            .enumerate()
            .filter(|(_, lesson)| {
                needle.is_empty()
                    || lesson.title.to_lowercase().contains(&needle)
                    || lesson.number.to_string().contains(&needle)
            })
            .map(|(index, lesson)| LessonListEntry {
                index,
                number: lesson.number,
                title: lesson.title.clone(),
            })
            .collect()
    }

    /// Wipe the learning session: aggregate, session position,
    /// bookmarks, every chat transcript. Settings survive. Any async
    /// completion still in flight becomes stale.
    pub fn reset(&self) {
        repository::reset(&*self.store);
        *self.data.borrow_mut() = None;
        *self.bookmarks.borrow_mut() = BookmarkSet::default();
        *self.session.borrow_mut() = SessionState::default();
        *self.quiz.borrow_mut() = QuizSession::new();
        *self.practice.borrow_mut() = None;
        self.epoch.set(self.epoch.get() + 1);
        log::info!("learning session reset");
    }

    // =======
    // navigation
    // =======

    pub fn session_state(&self) -> SessionState {
        self.session.borrow().clone()
    }

    pub fn set_active_topic(&self, topic: Topic) {
        let mut session = self.session.borrow_mut();
        session.active_topic = topic;
        session.persist(&*self.store);
    }

    pub fn set_view(&self, view: View) {
        let mut session = self.session.borrow_mut();
        session.current_view = view;
        session.persist(&*self.store);
    }

    pub fn go_to_next_lesson(&self) -> bool {
        let lesson_count = self.lesson_count();
        let moved = {
            let mut session = self.session.borrow_mut();
            let moved = session.go_to_next(lesson_count);
            if moved {
                session.persist(&*self.store);
            }
            moved
        };
        if moved {
            self.reset_quiz();
        }
        moved
    }

    pub fn go_to_previous_lesson(&self) -> bool {
        let moved = {
            let mut session = self.session.borrow_mut();
            let moved = session.go_to_previous();
            if moved {
                session.persist(&*self.store);
            }
            moved
        };
        if moved {
            self.reset_quiz();
        }
        moved
    }

    /// Direct jump from the sidebar. Out-of-range indices are refused.
    pub fn go_to_lesson(&self, lesson_index: usize) -> bool {
        if lesson_index >= self.lesson_count() {
            return false;
        }
        let changed = {
            let mut session = self.session.borrow_mut();
            let changed = session.active_lesson_index != lesson_index;
            session.active_lesson_index = lesson_index;
            session.active_topic = Topic::Summary;
            session.current_view = View::Lesson;
            session.persist(&*self.store);
            changed
        };
        if changed {
            self.reset_quiz();
        }
        true
    }

    /// Jump from a search hit: activate its lesson, open its category
    /// tab, return to the lesson view.
    pub fn go_to_search_hit(&self, lesson_index: usize, category: SearchCategory) -> bool {
        if !self.go_to_lesson(lesson_index) {
            return false;
        }
        let topic = match category {
            SearchCategory::Summary => Topic::Summary,
            SearchCategory::Vocabulary => Topic::Vocabulary,
            SearchCategory::Grammar => Topic::Grammar,
        };
        self.set_active_topic(topic);
        true
    }

    // =======
    // search
    // =======

    pub fn search(&self, query: String) -> Vec<SearchHit> {
        let data = self.data.borrow();
        match data.as_ref() {
            Some(data) => search::search(data, &query),
            None => Vec::new(),
        }
    }

    // =======
    // bookmarks
    // =======

    pub fn toggle_vocabulary_bookmark(&self, lesson_number: u32, index: usize) -> bool {
        let mut bookmarks = self.bookmarks.borrow_mut();
        let now_present = bookmarks.toggle(BookmarkKey::vocabulary(lesson_number, index));
        bookmarks.persist(&*self.store);
        now_present
    }

    pub fn toggle_grammar_bookmark(&self, lesson_number: u32, index: usize) -> bool {
        let mut bookmarks = self.bookmarks.borrow_mut();
        let now_present = bookmarks.toggle(BookmarkKey::grammar(lesson_number, index));
        bookmarks.persist(&*self.store);
        now_present
    }

    pub fn is_vocabulary_bookmarked(&self, lesson_number: u32, index: usize) -> bool {
        self.bookmarks
            .borrow()
            .contains(&BookmarkKey::vocabulary(lesson_number, index))
    }

    pub fn is_grammar_bookmarked(&self, lesson_number: u32, index: usize) -> bool {
        self.bookmarks
            .borrow()
            .contains(&BookmarkKey::grammar(lesson_number, index))
    }

    pub fn bookmarked_vocabulary(&self) -> Vec<VocabularyItem> {
        let data = self.data.borrow();
        match data.as_ref() {
            Some(data) => self.bookmarks.borrow().resolve_vocabulary(data),
            None => Vec::new(),
        }
    }

    pub fn bookmarked_grammar(&self) -> Vec<BookmarkedGrammar> {
        let data = self.data.borrow();
        match data.as_ref() {
            Some(data) => self.bookmarks.borrow().resolve_grammar(data),
            None => Vec::new(),
        }
    }

    /// Whether the practice affordance should be enabled: at least
    /// [`MIN_PRACTICE_ITEMS`] bookmarked vocabulary items resolve.
    pub fn can_start_practice(&self) -> bool {
        self.bookmarked_vocabulary().len() >= MIN_PRACTICE_ITEMS
    }

    // =======
    // flashcard practice
    // =======

    /// Build a fresh practice session from the bookmarked vocabulary and
    /// switch to the practice view. Refused while the precondition is
    /// unmet. Calling again restarts with a new shuffle.
    pub fn start_practice(&self) -> bool {
        let vocabulary = self.bookmarked_vocabulary();
        let Some(session) = PracticeSession::start(&vocabulary, &mut *self.rng.borrow_mut())
        else {
            return false;
        };
        *self.practice.borrow_mut() = Some(session);
        let mut state = self.session.borrow_mut();
        state.current_view = View::Practice;
        state.persist(&*self.store);
        true
    }

    pub fn practice_card(&self) -> Option<PracticeCard> {
        self.practice
            .borrow()
            .as_ref()
            .and_then(|session| session.current_card().cloned())
    }

    pub fn answer_practice_card(&self, selected: String) {
        if let Some(session) = self.practice.borrow_mut().as_mut() {
            session.answer(&selected);
        }
    }

    pub fn advance_practice(&self) {
        if let Some(session) = self.practice.borrow_mut().as_mut() {
            session.advance();
        }
    }

    pub fn practice_progress(&self) -> Option<PracticeProgress> {
        self.practice
            .borrow()
            .as_ref()
            .map(PracticeSession::progress)
    }

    /// Leave practice and return to the bookmarks view.
    pub fn exit_practice(&self) {
        *self.practice.borrow_mut() = None;
        let mut state = self.session.borrow_mut();
        state.current_view = View::Bookmarks;
        state.persist(&*self.store);
    }

    // =======
    // lesson quiz
    // =======

    pub fn select_quiz_answer(&self, question_index: usize, choice: String) -> bool {
        self.quiz.borrow_mut().select_answer(question_index, choice)
    }

    pub fn quiz_selected_answer(&self, question_index: usize) -> Option<String> {
        self.quiz
            .borrow()
            .selected(question_index)
            .map(str::to_string)
    }

    pub fn submit_quiz(&self) -> bool {
        self.quiz.borrow_mut().submit()
    }

    pub fn quiz_submitted(&self) -> bool {
        self.quiz.borrow().is_submitted()
    }

    pub fn quiz_score(&self) -> usize {
        let data = self.data.borrow();
        let session = self.session.borrow();
        let Some(lesson) = data
            .as_ref()
            .and_then(|data| data.lessons.get(session.active_lesson_index))
        else {
            return 0;
        };
        self.quiz.borrow().score(&lesson.quiz)
    }

    pub fn retry_quiz(&self) {
        self.quiz.borrow_mut().retry();
    }

    // =======
    // settings
    // =======

    pub fn display_language(&self) -> DisplayLanguage {
        self.settings.borrow().display_language
    }

    pub fn set_display_language(&self, language: DisplayLanguage) {
        self.settings
            .borrow_mut()
            .set_display_language(&*self.store, language);
    }

    pub fn has_credential(&self) -> bool {
        self.settings.borrow().credential.is_some()
    }

    pub fn set_credential(&self, credential: String) {
        self.settings
            .borrow_mut()
            .set_credential(&*self.store, credential);
    }

    /// Ask the backend whether a credential is usable. Does not store
    /// anything; a rejected key leaves the saved one untouched.
    pub async fn verify_credential(&self, credential: String) -> bool {
        generate::verify_credential(&credential).await
    }

    // =======
    // chat tutor
    // =======

    pub fn is_chat_busy(&self) -> bool {
        self.chatting.get()
    }

    /// Transcript for the active lesson in the current display language.
    pub fn chat_transcript(&self) -> Vec<ChatMessage> {
        let Some(lesson_number) = self.active_lesson_number() else {
            return Vec::new();
        };
        let language = self.settings.borrow().display_language;
        chat::load_transcript(&*self.store, lesson_number, language)
    }

    /// One tutor turn: append the user message, fetch a reply, append
    /// it. A reply equal to the navigation sentinel advances to the next
    /// lesson instead of being displayed. Replies that arrive after a
    /// reset or a lesson switch are discarded.
    pub async fn send_chat_message(&self, message: String) -> Result<ChatOutcome, JsValue> {
        let Some(_busy) = BusyGuard::acquire(&self.chatting) else {
            return Err(js_error("a tutor reply is already in flight"));
        };
        let trimmed = message.trim().to_string();
        if trimmed.is_empty() {
            return Err(js_error("empty message"));
        }
        let Some(lesson) = self.active_lesson() else {
            return Err(js_error("no active lesson"));
        };
        let (language, credential) = self.settings_snapshot();
        let lesson_number = lesson.number;

        let mut transcript = chat::load_transcript(&*self.store, lesson_number, language);
        transcript.push(ChatMessage {
            role: ChatRole::User,
            content: trimmed.clone(),
        });
        chat::save_transcript(&*self.store, lesson_number, language, &transcript);

        let request = ChatRequest {
            lesson,
            transcript,
            message: trimmed,
            topic: self.session.borrow().active_topic,
            language,
        };

        let epoch = self.epoch.get();
        let result = generate::chat_reply(&request, credential.as_ref()).await;
        if self.epoch.get() != epoch || self.active_lesson_number() != Some(lesson_number) {
            log::info!("discarding stale tutor reply for lesson {lesson_number}");
            return Ok(ChatOutcome {
                reply: None,
                advanced: false,
                at_last_lesson: false,
                discarded: true,
            });
        }
        let reply = match result {
            Ok(reply) => reply,
            Err(e) => {
                log::warn!("tutor reply failed: {e}");
                return Err(js_error(&e.to_string()));
            }
        };

        if chat::is_next_lesson_command(&reply) {
            let advanced = self.go_to_next_lesson();
            return Ok(ChatOutcome {
                reply: None,
                advanced,
                at_last_lesson: !advanced,
                discarded: false,
            });
        }

        let mut transcript = chat::load_transcript(&*self.store, lesson_number, language);
        transcript.push(ChatMessage {
            role: ChatRole::Model,
            content: reply.clone(),
        });
        chat::save_transcript(&*self.store, lesson_number, language, &transcript);
        Ok(ChatOutcome {
            reply: Some(reply),
            advanced: false,
            at_last_lesson: false,
            discarded: false,
        })
    }

    // =======
    // generation
    // =======

    pub fn is_analyzing(&self) -> bool {
        self.analyzing.get()
    }

    pub fn is_extending(&self) -> bool {
        self.extending.get()
    }

    /// Analyze a source document into the initial aggregate (first
    /// lessons + full index) and adopt it. One analysis at a time.
    pub async fn analyze_document(&self, document: SourceDocument) -> Result<(), JsValue> {
        let Some(_busy) = BusyGuard::acquire(&self.analyzing) else {
            return Err(js_error("an analysis is already in flight"));
        };
        let (language, credential) = self.settings_snapshot();
        let epoch = self.epoch.get();
        let result = generate::analyze_document(&document, language, credential.as_ref()).await;
        if self.epoch.get() != epoch {
            log::info!("discarding stale document analysis");
            return Ok(());
        }
        match result {
            Ok(data) => {
                self.apply_learning_data(data, true);
                Ok(())
            }
            Err(e) => {
                log::warn!("document analysis failed: {e}");
                Err(js_error(&e.to_string()))
            }
        }
    }

    /// Analyze pasted text into a standalone one-lesson session. Not
    /// persisted; "load more" stays unavailable for it.
    pub async fn analyze_text(&self, text: String) -> Result<(), JsValue> {
        let Some(_busy) = BusyGuard::acquire(&self.analyzing) else {
            return Err(js_error("an analysis is already in flight"));
        };
        let (language, credential) = self.settings_snapshot();
        let epoch = self.epoch.get();
        let result = generate::analyze_text(&text, language, credential.as_ref()).await;
        if self.epoch.get() != epoch {
            log::info!("discarding stale text analysis");
            return Ok(());
        }
        match result {
            Ok(lesson) => {
                self.apply_learning_data(LearningData::standalone(lesson), false);
                Ok(())
            }
            Err(e) => {
                log::warn!("text analysis failed: {e}");
                Err(js_error(&e.to_string()))
            }
        }
    }

    /// Fetch the next batch of not-yet-generated lessons and merge them
    /// in. Returns how many lessons were added; 0 when the index is
    /// exhausted.
    pub async fn load_more_lessons(&self, document: SourceDocument) -> Result<usize, JsValue> {
        let Some(_busy) = BusyGuard::acquire(&self.extending) else {
            return Err(js_error("a load-more request is already in flight"));
        };
        let refs = {
            let data = self.data.borrow();
            let Some(data) = data.as_ref() else {
                return Err(js_error("no learning data loaded"));
            };
            repository::missing_lesson_refs(data, LESSON_BATCH)
        };
        if refs.is_empty() {
            return Ok(0);
        }
        let (language, credential) = self.settings_snapshot();
        let epoch = self.epoch.get();
        let result =
            generate::generate_lessons(&document, &refs, language, credential.as_ref()).await;
        if self.epoch.get() != epoch {
            log::info!("discarding stale lesson batch");
            return Ok(0);
        }
        match result {
            Ok(lessons) => Ok(self.apply_new_lessons(lessons)),
            Err(e) => {
                log::warn!("loading additional lessons failed: {e}");
                Err(js_error(&e.to_string()))
            }
        }
    }
}

fn js_error(message: &str) -> JsValue {
    JsValue::from_str(message)
}
