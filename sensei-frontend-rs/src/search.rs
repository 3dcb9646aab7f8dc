//! On-the-fly full-text search over the loaded lessons. No index is
//! maintained; every call is a fresh deduplicating scan in document
//! order. Matching is case-insensitive substring containment.

use std::collections::HashSet;

use lesson_utils::LearningData;

const SUMMARY_PREVIEW_CHARS: usize = 150;
const GRAMMAR_PREVIEW_CHARS: usize = 100;

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    serde::Serialize,
    serde::Deserialize,
    tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub enum SearchCategory {
    Summary,
    Vocabulary,
    Grammar,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub category: SearchCategory,
    /// Index into `LearningData::lessons`, not the lesson number.
    pub lesson_index: usize,
    pub lesson_number: u32,
    pub lesson_title: String,
    pub preview: String,
}

/// Scan every loaded lesson for the query. A blank query means search is
/// inactive and yields nothing. Result order is lesson document order,
/// then summary, vocabulary in list order, grammar in list order; at
/// most one hit per (lesson, category, entity).
pub fn search(data: &LearningData, query: &str) -> Vec<SearchHit> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let mut hits = Vec::new();
    let mut seen: HashSet<(usize, SearchCategory, String)> = HashSet::new();

    for (lesson_index, lesson) in data.lessons.iter().enumerate() {
        if contains(&lesson.title, &needle) || contains(&lesson.summary, &needle) {
            push_unique(
                &mut hits,
                &mut seen,
                (lesson_index, SearchCategory::Summary, String::new()),
                SearchHit {
                    category: SearchCategory::Summary,
                    lesson_index,
                    lesson_number: lesson.number,
                    lesson_title: lesson.title.clone(),
                    preview: preview(&lesson.summary, SUMMARY_PREVIEW_CHARS),
                },
            );
        }

        for item in &lesson.vocabulary {
            let haystack = format!("{} {} {}", item.script, item.romaji, item.translation);
            if contains(&haystack, &needle) {
                push_unique(
                    &mut hits,
                    &mut seen,
                    (lesson_index, SearchCategory::Vocabulary, item.script.clone()),
                    SearchHit {
                        category: SearchCategory::Vocabulary,
                        lesson_index,
                        lesson_number: lesson.number,
                        lesson_title: lesson.title.clone(),
                        preview: format!(
                            "{} ({}) - {}",
                            item.script, item.romaji, item.translation
                        ),
                    },
                );
            }
        }

        for point in &lesson.grammar {
            let haystack = format!("{} {}", point.pattern, point.explanation);
            if contains(&haystack, &needle) {
                push_unique(
                    &mut hits,
                    &mut seen,
                    (lesson_index, SearchCategory::Grammar, point.pattern.clone()),
                    SearchHit {
                        category: SearchCategory::Grammar,
                        lesson_index,
                        lesson_number: lesson.number,
                        lesson_title: lesson.title.clone(),
                        preview: format!(
                            "{}: {}",
                            point.pattern,
                            preview(&point.explanation, GRAMMAR_PREVIEW_CHARS)
                        ),
                    },
                );
            }
        }
    }

    hits
}

fn contains(haystack: &str, lowercase_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowercase_needle)
}

fn push_unique(
    hits: &mut Vec<SearchHit>,
    seen: &mut HashSet<(usize, SearchCategory, String)>,
    key: (usize, SearchCategory, String),
    hit: SearchHit,
) {
    if seen.insert(key) {
        hits.push(hit);
    }
}

// Char-based so multi-byte text never splits mid-character.
fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars).collect();
    truncated.push_str("...");
    truncated
}
