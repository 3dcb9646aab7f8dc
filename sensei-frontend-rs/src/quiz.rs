//! Per-lesson quiz state machine: pick answers freely, submit once all
//! five are chosen, score, retry with the same questions. Reset whenever
//! the active lesson changes.

use std::collections::BTreeMap;

use lesson_utils::{QUIZ_QUESTIONS, QuizItem};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct QuizSession {
    answers: BTreeMap<usize, String>,
    submitted: bool,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the selection for one question. Rejected
    /// after submission and for out-of-range questions.
    pub fn select_answer(&mut self, question_index: usize, choice: String) -> bool {
        if self.submitted || question_index >= QUIZ_QUESTIONS {
            return false;
        }
        self.answers.insert(question_index, choice);
        true
    }

    pub fn selected(&self, question_index: usize) -> Option<&str> {
        self.answers.get(&question_index).map(String::as_str)
    }

    pub fn answered_count(&self) -> usize {
        self.answers.len()
    }

    pub fn all_answered(&self) -> bool {
        self.answers.len() == QUIZ_QUESTIONS
    }

    /// Transition to the completed state. Rejected (state unchanged)
    /// unless every question has a selection.
    pub fn submit(&mut self) -> bool {
        if self.submitted || !self.all_answered() {
            return false;
        }
        self.submitted = true;
        true
    }

    pub fn is_submitted(&self) -> bool {
        self.submitted
    }

    pub fn score(&self, quiz: &[QuizItem]) -> usize {
        quiz.iter()
            .enumerate()
            .filter(|(index, item)| self.selected(*index) == Some(item.correct_choice.as_str()))
            .count()
    }

    /// Back to a blank, unsubmitted sheet; the quiz content is reused.
    pub fn retry(&mut self) {
        self.answers.clear();
        self.submitted = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz() -> Vec<QuizItem> {
        (0..QUIZ_QUESTIONS)
            .map(|i| QuizItem {
                question: format!("q{i}"),
                choices: ["a", "b", "c", "d"].map(str::to_string).to_vec(),
                correct_choice: "a".to_string(),
            })
            .collect()
    }

    #[test]
    fn submit_requires_every_question_answered() {
        let mut session = QuizSession::new();
        for i in 0..QUIZ_QUESTIONS - 1 {
            assert!(session.select_answer(i, "a".to_string()));
        }
        assert!(!session.submit());
        assert!(!session.is_submitted());

        session.select_answer(QUIZ_QUESTIONS - 1, "b".to_string());
        assert!(session.submit());
        assert!(session.is_submitted());
    }

    #[test]
    fn selections_overwrite_until_submission() {
        let mut session = QuizSession::new();
        session.select_answer(0, "a".to_string());
        session.select_answer(0, "d".to_string());
        assert_eq!(session.selected(0), Some("d"));
        assert_eq!(session.answered_count(), 1);

        for i in 1..QUIZ_QUESTIONS {
            session.select_answer(i, "a".to_string());
        }
        session.submit();
        assert!(!session.select_answer(0, "a".to_string()));
        assert_eq!(session.selected(0), Some("d"));
    }

    #[test]
    fn out_of_range_questions_are_rejected() {
        let mut session = QuizSession::new();
        assert!(!session.select_answer(QUIZ_QUESTIONS, "a".to_string()));
        assert_eq!(session.answered_count(), 0);
    }

    #[test]
    fn three_correct_answers_score_three_of_five() {
        let quiz = quiz();
        let mut session = QuizSession::new();
        session.select_answer(0, "a".to_string());
        session.select_answer(1, "a".to_string());
        session.select_answer(2, "a".to_string());
        session.select_answer(3, "b".to_string());
        session.select_answer(4, "c".to_string());
        assert!(session.submit());
        assert_eq!(session.score(&quiz), 3);
    }

    #[test]
    fn retry_clears_to_a_blank_unsubmitted_sheet() {
        let quiz = quiz();
        let mut session = QuizSession::new();
        for i in 0..QUIZ_QUESTIONS {
            session.select_answer(i, "a".to_string());
        }
        session.submit();
        assert_eq!(session.score(&quiz), 5);

        session.retry();
        assert!(!session.is_submitted());
        assert_eq!(session.answered_count(), 0);
        assert_eq!(session.score(&quiz), 0);
        // and the sheet accepts answers again
        assert!(session.select_answer(0, "b".to_string()));
    }
}
