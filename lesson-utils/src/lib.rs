//! Shared vocabulary for the study app: the lesson data model produced by
//! the generation backend, chat message types, and the small enums both
//! sides of the wire agree on. The frontend engine and the backend's
//! structured-output schema are generated from these same definitions.

pub mod generate;

use std::collections::BTreeSet;

/// Number of quiz questions every fully generated lesson carries.
pub const QUIZ_QUESTIONS: usize = 5;

/// Number of answer choices per quiz question.
pub const QUIZ_CHOICES: usize = 4;

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyItem {
    /// The word in the studied script (kanji/kana where applicable).
    pub script: String,
    pub romaji: String,
    pub translation: String,
}

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct GrammarExample {
    pub script: String,
    pub translation: String,
}

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct GrammarPoint {
    pub pattern: String,
    pub explanation: String,
    pub examples: Vec<GrammarExample>,
}

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct QuizItem {
    pub question: String,
    /// Exactly [`QUIZ_CHOICES`] entries; `correct_choice` is one of them.
    pub choices: Vec<String>,
    pub correct_choice: String,
}

impl QuizItem {
    pub fn is_well_formed(&self) -> bool {
        self.choices.len() == QUIZ_CHOICES && self.choices.contains(&self.correct_choice)
    }
}

/// One teachable unit: summary, vocabulary, grammar, and a fixed quiz.
/// Immutable once generated; a lesson number is never re-fetched.
#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub number: u32,
    pub title: String,
    pub summary: String,
    pub vocabulary: Vec<VocabularyItem>,
    pub grammar: Vec<GrammarPoint>,
    pub quiz: Vec<QuizItem>,
}

impl Lesson {
    pub fn quiz_is_well_formed(&self) -> bool {
        self.quiz.len() == QUIZ_QUESTIONS && self.quiz.iter().all(QuizItem::is_well_formed)
    }
}

/// Forward reference to a lesson that exists in the source document but
/// has not been generated yet.
#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct LessonIndexItem {
    pub number: u32,
    pub title: String,
}

/// The root aggregate: fully generated lessons plus the complete table of
/// contents. `lessons` is ordered by ascending lesson number and every
/// number in it also appears in `lesson_index`.
#[derive(
    Clone, Debug, serde::Serialize, serde::Deserialize, PartialEq, tsify::Tsify, schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct LearningData {
    pub lessons: Vec<Lesson>,
    pub lesson_index: Vec<LessonIndexItem>,
}

impl LearningData {
    /// Wrap a single lesson produced from raw text. The index covers only
    /// that lesson, so there is never anything more to load.
    pub fn standalone(lesson: Lesson) -> Self {
        let index_entry = LessonIndexItem {
            number: lesson.number,
            title: lesson.title.clone(),
        };
        Self {
            lessons: vec![lesson],
            lesson_index: vec![index_entry],
        }
    }

    pub fn lesson_numbers(&self) -> BTreeSet<u32> {
        self.lessons.iter().map(|lesson| lesson.number).collect()
    }

    pub fn has_more_lessons(&self) -> bool {
        self.lessons.len() < self.lesson_index.len()
    }

    /// Shape check used when restoring a persisted aggregate: every
    /// generated lesson must be covered by the index and carry a
    /// well-formed quiz block.
    pub fn is_consistent(&self) -> bool {
        let indexed: BTreeSet<u32> = self.lesson_index.iter().map(|item| item.number).collect();
        self.lessons
            .iter()
            .all(|lesson| indexed.contains(&lesson.number) && lesson.quiz_is_well_formed())
    }
}

#[derive(
    Copy,
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

#[derive(
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

/// Language the generated content and tutor replies are written in.
#[derive(
    Copy,
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    tsify::Tsify,
    schemars::JsonSchema,
    parse_display::Display,
    parse_display::FromStr,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum DisplayLanguage {
    #[serde(rename = "id")]
    #[display("id")]
    Indonesian,
    #[serde(rename = "en")]
    #[display("en")]
    English,
    #[serde(rename = "ja")]
    #[display("ja")]
    Japanese,
}

impl Default for DisplayLanguage {
    fn default() -> Self {
        DisplayLanguage::Indonesian
    }
}

pub const DISPLAY_LANGUAGES: [DisplayLanguage; 3] = [
    DisplayLanguage::Indonesian,
    DisplayLanguage::English,
    DisplayLanguage::Japanese,
];

/// The topic tabs of a lesson. Shared because the chat tutor is told
/// which tab the user is looking at.
#[derive(
    Copy,
    Clone,
    Debug,
    serde::Serialize,
    serde::Deserialize,
    PartialEq,
    Eq,
    Hash,
    Ord,
    PartialOrd,
    Default,
    tsify::Tsify,
    schemars::JsonSchema,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub enum Topic {
    #[default]
    Summary,
    Vocabulary,
    Grammar,
    Quiz,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz_item(answer: &str) -> QuizItem {
        QuizItem {
            question: "?".to_string(),
            choices: vec![
                answer.to_string(),
                "b".to_string(),
                "c".to_string(),
                "d".to_string(),
            ],
            correct_choice: answer.to_string(),
        }
    }

    fn lesson(number: u32) -> Lesson {
        Lesson {
            number,
            title: format!("Lesson {number}"),
            summary: "summary".to_string(),
            vocabulary: vec![],
            grammar: vec![],
            quiz: (0..QUIZ_QUESTIONS).map(|_| quiz_item("a")).collect(),
        }
    }

    #[test]
    fn wire_names_are_camel_case() {
        let data = LearningData {
            lessons: vec![],
            lesson_index: vec![LessonIndexItem {
                number: 1,
                title: "Intro".to_string(),
            }],
        };
        let json = serde_json::to_value(&data).unwrap();
        assert!(json.get("lessonIndex").is_some());
        assert!(json.get("lessons").is_some());

        let quiz = serde_json::to_value(quiz_item("a")).unwrap();
        assert!(quiz.get("correctChoice").is_some());
    }

    #[test]
    fn standalone_index_covers_only_itself() {
        let data = LearningData::standalone(lesson(1));
        assert_eq!(data.lesson_index.len(), 1);
        assert_eq!(data.lesson_index[0].number, 1);
        assert!(!data.has_more_lessons());
        assert!(data.is_consistent());
    }

    #[test]
    fn consistency_rejects_unindexed_lessons() {
        let data = LearningData {
            lessons: vec![lesson(7)],
            lesson_index: vec![LessonIndexItem {
                number: 1,
                title: "Intro".to_string(),
            }],
        };
        assert!(!data.is_consistent());
    }

    #[test]
    fn consistency_rejects_malformed_quiz() {
        let mut bad = lesson(1);
        bad.quiz[0].correct_choice = "not a choice".to_string();
        let data = LearningData {
            lessons: vec![bad],
            lesson_index: vec![LessonIndexItem {
                number: 1,
                title: "Intro".to_string(),
            }],
        };
        assert!(!data.is_consistent());
    }

    #[test]
    fn display_language_codes_round_trip() {
        for language in DISPLAY_LANGUAGES {
            let code = language.to_string();
            assert_eq!(code.parse::<DisplayLanguage>().unwrap(), language);
        }
        assert_eq!(DisplayLanguage::default().to_string(), "id");
    }
}
