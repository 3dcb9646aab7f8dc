//! Flashcard practice built from bookmarked vocabulary: a shuffled
//! multiple-choice session with per-card question types and distractors
//! drawn from the other bookmarked items. All randomness comes from the
//! injected RNG, so a fixed seed reproduces a session exactly.

use std::collections::BTreeMap;

use lesson_utils::VocabularyItem;
use rand::Rng;
use rand::seq::SliceRandom;

/// Fewer bookmarked items than this and the entry point stays disabled;
/// there would not be enough material for distractors.
pub const MIN_PRACTICE_ITEMS: usize = 4;

const DISTRACTORS_PER_CARD: usize = 3;

#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    tsify::Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub enum PracticeQuestionKind {
    ScriptToTranslation,
    TranslationToScript,
    ScriptToRomaji,
}

const QUESTION_KINDS: [PracticeQuestionKind; 3] = [
    PracticeQuestionKind::ScriptToTranslation,
    PracticeQuestionKind::TranslationToScript,
    PracticeQuestionKind::ScriptToRomaji,
];

impl PracticeQuestionKind {
    fn prompt(&self, item: &VocabularyItem) -> String {
        match self {
            PracticeQuestionKind::ScriptToTranslation | PracticeQuestionKind::ScriptToRomaji => {
                item.script.clone()
            }
            PracticeQuestionKind::TranslationToScript => item.translation.clone(),
        }
    }

    /// The answer field; the same projection supplies the correct
    /// answer and every distractor.
    fn answer(&self, item: &VocabularyItem) -> String {
        match self {
            PracticeQuestionKind::ScriptToTranslation => item.translation.clone(),
            PracticeQuestionKind::TranslationToScript => item.script.clone(),
            PracticeQuestionKind::ScriptToRomaji => item.romaji.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct PracticeCard {
    pub question: String,
    /// Usually 4 options (1 correct + 3 distractors), already shuffled.
    /// Items sharing a script form can under-supply distractors; the
    /// card then carries fewer options rather than padding or dropping.
    pub options: Vec<String>,
    pub correct_answer: String,
    pub kind: PracticeQuestionKind,
    pub source: VocabularyItem,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct CardOutcome {
    pub selected: String,
    pub correct: bool,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize, tsify::Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
#[serde(rename_all = "camelCase")]
pub struct PracticeProgress {
    pub current_index: usize,
    pub total: usize,
    pub card_answered: bool,
    pub correct: usize,
    pub complete: bool,
}

/// Ephemeral: never persisted, rebuilt from bookmarks on every start.
#[derive(Clone, Debug)]
pub struct PracticeSession {
    cards: Vec<PracticeCard>,
    current_index: usize,
    outcomes: BTreeMap<usize, CardOutcome>,
    card_answered: bool,
}

impl PracticeSession {
    /// Build a session over the given vocabulary, one card per item in
    /// shuffled order. Refuses (returns `None`) below
    /// [`MIN_PRACTICE_ITEMS`].
    pub fn start(vocabulary: &[VocabularyItem], rng: &mut impl Rng) -> Option<Self> {
        if vocabulary.len() < MIN_PRACTICE_ITEMS {
            return None;
        }
        let mut pool: Vec<VocabularyItem> = vocabulary.to_vec();
        pool.shuffle(rng);
        let cards = pool
            .iter()
            .map(|item| build_card(item, &pool, rng))
            .collect();
        Some(Self {
            cards,
            current_index: 0,
            outcomes: BTreeMap::new(),
            card_answered: false,
        })
    }

    pub fn cards(&self) -> &[PracticeCard] {
        &self.cards
    }

    pub fn current_card(&self) -> Option<&PracticeCard> {
        self.cards.get(self.current_index)
    }

    /// Record the selection for the current card. Already-answered cards
    /// ignore further answers; answering never auto-advances.
    pub fn answer(&mut self, selected: &str) {
        if self.card_answered {
            return;
        }
        let Some(card) = self.cards.get(self.current_index) else {
            return;
        };
        let correct = selected == card.correct_answer;
        self.outcomes.insert(
            self.current_index,
            CardOutcome {
                selected: selected.to_string(),
                correct,
            },
        );
        self.card_answered = true;
    }

    /// Move to the next card, clearing the answered flag. Advancing past
    /// the last card completes the session.
    pub fn advance(&mut self) {
        if self.current_index < self.cards.len() {
            self.current_index += 1;
            self.card_answered = false;
        }
    }

    pub fn is_complete(&self) -> bool {
        self.current_index >= self.cards.len()
    }

    pub fn outcome(&self, card_index: usize) -> Option<&CardOutcome> {
        self.outcomes.get(&card_index)
    }

    pub fn correct_count(&self) -> usize {
        self.outcomes.values().filter(|o| o.correct).count()
    }

    pub fn progress(&self) -> PracticeProgress {
        PracticeProgress {
            current_index: self.current_index,
            total: self.cards.len(),
            card_answered: self.card_answered,
            correct: self.correct_count(),
            complete: self.is_complete(),
        }
    }
}

fn build_card(
    item: &VocabularyItem,
    pool: &[VocabularyItem],
    rng: &mut impl Rng,
) -> PracticeCard {
    let kind = QUESTION_KINDS[rng.gen_range(0..QUESTION_KINDS.len())];
    let correct_answer = kind.answer(item);

    let mut others: Vec<&VocabularyItem> = pool
        .iter()
        .filter(|other| other.script != item.script)
        .collect();
    others.shuffle(rng);

    let mut options: Vec<String> = others
        .iter()
        .take(DISTRACTORS_PER_CARD)
        .map(|other| kind.answer(other))
        .collect();
    options.push(correct_answer.clone());
    options.shuffle(rng);

    PracticeCard {
        question: kind.prompt(item),
        options,
        correct_answer,
        kind,
        source: item.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn vocab(script: &str, romaji: &str, translation: &str) -> VocabularyItem {
        VocabularyItem {
            script: script.to_string(),
            romaji: romaji.to_string(),
            translation: translation.to_string(),
        }
    }

    fn four_items() -> Vec<VocabularyItem> {
        vec![
            vocab("犬", "inu", "dog"),
            vocab("猫", "neko", "cat"),
            vocab("鳥", "tori", "bird"),
            vocab("魚", "sakana", "fish"),
        ]
    }

    #[test]
    fn refuses_below_four_items() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let items = four_items();
        assert!(PracticeSession::start(&items[..3], &mut rng).is_none());
        assert!(PracticeSession::start(&items, &mut rng).is_some());
    }

    #[test]
    fn four_items_yield_four_cards_with_four_options_each() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let session = PracticeSession::start(&four_items(), &mut rng).unwrap();

        assert_eq!(session.cards().len(), 4);
        for card in session.cards() {
            assert_eq!(card.options.len(), 4);
            assert_eq!(
                card.options
                    .iter()
                    .filter(|option| **option == card.correct_answer)
                    .count(),
                1
            );
            // distractors project through the same field as the answer
            assert_eq!(card.correct_answer, card.kind.answer(&card.source));
        }
    }

    #[test]
    fn question_and_answer_derive_from_the_kind() {
        let item = vocab("犬", "inu", "dog");
        assert_eq!(PracticeQuestionKind::ScriptToTranslation.prompt(&item), "犬");
        assert_eq!(
            PracticeQuestionKind::ScriptToTranslation.answer(&item),
            "dog"
        );
        assert_eq!(
            PracticeQuestionKind::TranslationToScript.prompt(&item),
            "dog"
        );
        assert_eq!(PracticeQuestionKind::TranslationToScript.answer(&item), "犬");
        assert_eq!(PracticeQuestionKind::ScriptToRomaji.answer(&item), "inu");
    }

    #[test]
    fn same_seed_reproduces_the_session() {
        let items = four_items();
        let mut a = ChaCha8Rng::seed_from_u64(99);
        let mut b = ChaCha8Rng::seed_from_u64(99);
        let first = PracticeSession::start(&items, &mut a).unwrap();
        let second = PracticeSession::start(&items, &mut b).unwrap();
        assert_eq!(first.cards(), second.cards());
    }

    #[test]
    fn duplicate_script_forms_under_supply_distractors() {
        let items = vec![
            vocab("犬", "inu", "dog"),
            vocab("犬", "inu", "hound"),
            vocab("猫", "neko", "cat"),
            vocab("鳥", "tori", "bird"),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let session = PracticeSession::start(&items, &mut rng).unwrap();

        for card in session.cards() {
            // a "犬" card only has two other script forms to draw from
            assert!(card.options.len() >= 3);
            assert!(card.options.len() <= 4);
            assert!(card.options.contains(&card.correct_answer));
        }
        assert!(
            session
                .cards()
                .iter()
                .any(|card| card.options.len() == 3),
            "cards for duplicated scripts should carry fewer options"
        );
    }

    #[test]
    fn answering_twice_keeps_the_first_outcome() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut session = PracticeSession::start(&four_items(), &mut rng).unwrap();
        let correct = session.current_card().unwrap().correct_answer.clone();

        session.answer("definitely wrong");
        session.answer(&correct);

        let outcome = session.outcome(0).unwrap();
        assert_eq!(outcome.selected, "definitely wrong");
        assert!(!outcome.correct);
    }

    #[test]
    fn advancing_through_all_cards_completes_with_a_score() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut session = PracticeSession::start(&four_items(), &mut rng).unwrap();

        let mut expected_correct = 0;
        for index in 0..session.cards().len() {
            let card = session.current_card().unwrap().clone();
            // answer the first two correctly, the rest wrongly
            if index < 2 {
                session.answer(&card.correct_answer);
                expected_correct += 1;
            } else {
                let wrong = card
                    .options
                    .iter()
                    .find(|option| **option != card.correct_answer)
                    .unwrap()
                    .clone();
                session.answer(&wrong);
            }
            assert!(session.progress().card_answered);
            session.advance();
        }

        assert!(session.is_complete());
        assert_eq!(session.correct_count(), expected_correct);
        assert!(session.current_card().is_none());
    }
}
