use thiserror::Error;

use crate::model::{Quiz, QuizQuestion, Score};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Transitions the runner refused. The runner is unchanged when one is returned.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizRunError {
    #[error("quiz has no questions")]
    EmptyQuiz,

    #[error("option {index} is out of range ({options} options)")]
    OptionOutOfRange { index: usize, options: usize },

    #[error("answer already submitted for this question")]
    SelectionLocked,

    #[error("no option selected")]
    NoSelection,

    #[error("no answer feedback is showing")]
    NotInFeedback,

    #[error("quiz already finished")]
    AlreadyFinished,
}

//
// ─── STATES ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Waiting for the user to pick and submit an option.
    Answering { index: usize },
    /// Answer submitted; showing whether it was right plus the explanation.
    Feedback { index: usize, correct: bool },
    Finished { score: Score },
}

/// Final tally of a finished quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub score: Score,
    pub correct: usize,
    pub total: usize,
    pub passed: bool,
    pub passing_score: Score,
    pub diamonds_reward: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Next { index: usize },
    Finished(QuizResult),
}

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Walks a user through a quiz one question at a time.
#[derive(Debug, Clone)]
pub struct QuizRunner {
    quiz: Quiz,
    phase: QuizPhase,
    selections: Vec<Option<usize>>,
    correct: usize,
}

impl QuizRunner {
    /// # Errors
    ///
    /// Returns `QuizRunError::EmptyQuiz` if the quiz has no questions.
    pub fn new(quiz: Quiz) -> Result<Self, QuizRunError> {
        let total = quiz.questions().len();
        if total == 0 {
            return Err(QuizRunError::EmptyQuiz);
        }
        Ok(Self {
            quiz,
            phase: QuizPhase::Answering { index: 0 },
            selections: vec![None; total],
            correct: 0,
        })
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.selections.len()
    }

    /// Number of correct answers submitted so far.
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct
    }

    /// Index of the question on screen, `None` once finished.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        match self.phase {
            QuizPhase::Answering { index } | QuizPhase::Feedback { index, .. } => Some(index),
            QuizPhase::Finished { .. } => None,
        }
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.current_index()
            .and_then(|index| self.quiz.questions().get(index))
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.current_index()
            .and_then(|index| self.selections.get(index).copied().flatten())
    }

    #[must_use]
    pub fn is_showing_feedback(&self) -> bool {
        matches!(self.phase, QuizPhase::Feedback { .. })
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self.phase, QuizPhase::Finished { .. })
    }

    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index()
            .is_some_and(|index| index + 1 == self.total_questions())
    }

    /// Whether the submitted answer was right, while feedback is showing.
    #[must_use]
    pub fn last_answer_correct(&self) -> Option<bool> {
        match self.phase {
            QuizPhase::Feedback { correct, .. } => Some(correct),
            _ => None,
        }
    }

    /// Result once finished.
    #[must_use]
    pub fn result(&self) -> Option<QuizResult> {
        match self.phase {
            QuizPhase::Finished { score } => Some(self.tally(score)),
            _ => None,
        }
    }

    /// Pick (or change) the option for the current question.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::SelectionLocked` once feedback is showing,
    /// `QuizRunError::AlreadyFinished` after the last question, or
    /// `QuizRunError::OptionOutOfRange` for an invalid option.
    pub fn select_option(&mut self, option: usize) -> Result<(), QuizRunError> {
        let index = match self.phase {
            QuizPhase::Answering { index } => index,
            QuizPhase::Feedback { .. } => return Err(QuizRunError::SelectionLocked),
            QuizPhase::Finished { .. } => return Err(QuizRunError::AlreadyFinished),
        };
        let options = self.quiz.questions()[index].options().len();
        if option >= options {
            return Err(QuizRunError::OptionOutOfRange {
                index: option,
                options,
            });
        }
        self.selections[index] = Some(option);
        Ok(())
    }

    /// Lock in the selected option and show feedback. Returns whether it was correct.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::NoSelection` if nothing is selected,
    /// `QuizRunError::SelectionLocked` if already submitted, or
    /// `QuizRunError::AlreadyFinished`.
    pub fn submit_answer(&mut self) -> Result<bool, QuizRunError> {
        let index = match self.phase {
            QuizPhase::Answering { index } => index,
            QuizPhase::Feedback { .. } => return Err(QuizRunError::SelectionLocked),
            QuizPhase::Finished { .. } => return Err(QuizRunError::AlreadyFinished),
        };
        let selected = self.selections[index].ok_or(QuizRunError::NoSelection)?;
        let correct = self.quiz.questions()[index].is_correct(selected);
        if correct {
            self.correct += 1;
        }
        self.phase = QuizPhase::Feedback { index, correct };
        Ok(correct)
    }

    /// Move past the feedback screen to the next question or the result.
    ///
    /// # Errors
    ///
    /// Returns `QuizRunError::NotInFeedback` unless feedback is showing.
    pub fn advance(&mut self) -> Result<Advance, QuizRunError> {
        let QuizPhase::Feedback { index, .. } = self.phase else {
            return Err(match self.phase {
                QuizPhase::Finished { .. } => QuizRunError::AlreadyFinished,
                _ => QuizRunError::NotInFeedback,
            });
        };

        let next = index + 1;
        if next < self.total_questions() {
            self.phase = QuizPhase::Answering { index: next };
            return Ok(Advance::Next { index: next });
        }

        let score = Score::from_ratio(self.correct, self.total_questions())
            .map_err(|_| QuizRunError::EmptyQuiz)?;
        self.phase = QuizPhase::Finished { score };
        Ok(Advance::Finished(self.tally(score)))
    }

    fn tally(&self, score: Score) -> QuizResult {
        let passing_score = self.quiz.passing_score();
        QuizResult {
            score,
            correct: self.correct,
            total: self.total_questions(),
            passed: score.passes(passing_score),
            passing_score,
            diamonds_reward: self.quiz.diamonds_reward(),
        }
    }
}
