use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::model::ids::{QuestionId, QuizId};
use crate::model::score::Score;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizError {
    #[error("quiz {quiz} has no questions")]
    NoQuestions { quiz: QuizId },

    #[error("quiz title cannot be empty")]
    EmptyTitle,

    #[error("question {question} has empty text")]
    EmptyQuestion { question: QuestionId },

    #[error("question {question} has no options")]
    NoOptions { question: QuestionId },

    #[error("question {question}: correct answer {index} is outside {options} options")]
    CorrectAnswerOutOfRange {
        question: QuestionId,
        index: usize,
        options: usize,
    },

    #[error("question id {question} appears more than once")]
    DuplicateQuestion { question: QuestionId },
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    id: QuestionId,
    question: String,
    options: Vec<String>,
    correct_answer: usize,
    explanation: String,
}

impl QuizQuestion {
    /// # Errors
    ///
    /// Returns `QuizError` if the text is blank, there are no options, or
    /// `correct_answer` does not index into `options`.
    pub fn new(
        id: QuestionId,
        question: impl Into<String>,
        options: Vec<String>,
        correct_answer: usize,
        explanation: impl Into<String>,
    ) -> Result<Self, QuizError> {
        let question = Self {
            id,
            question: question.into(),
            options,
            correct_answer,
            explanation: explanation.into(),
        };
        question.validate()?;
        Ok(question)
    }

    /// Check the invariants that deserialization cannot enforce on its own.
    ///
    /// # Errors
    ///
    /// See [`QuizQuestion::new`].
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.question.trim().is_empty() {
            return Err(QuizError::EmptyQuestion {
                question: self.id.clone(),
            });
        }
        if self.options.is_empty() {
            return Err(QuizError::NoOptions {
                question: self.id.clone(),
            });
        }
        if self.correct_answer >= self.options.len() {
            return Err(QuizError::CorrectAnswerOutOfRange {
                question: self.id.clone(),
                index: self.correct_answer,
                options: self.options.len(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.question
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> usize {
        self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn is_correct(&self, option: usize) -> bool {
        option == self.correct_answer
    }
}

//
// ─── QUIZ ──────────────────────────────────────────────────────────────────────
//

/// Ordered set of questions with a passing threshold and a diamond reward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    id: QuizId,
    title: String,
    description: String,
    questions: Vec<QuizQuestion>,
    passing_score: Score,
    diamonds_reward: u32,
}

impl Quiz {
    /// # Errors
    ///
    /// Returns `QuizError::NoQuestions` for an empty question list, or the first
    /// question-level error found.
    pub fn new(
        id: QuizId,
        title: impl Into<String>,
        description: impl Into<String>,
        questions: Vec<QuizQuestion>,
        passing_score: Score,
        diamonds_reward: u32,
    ) -> Result<Self, QuizError> {
        let quiz = Self {
            id,
            title: title.into(),
            description: description.into(),
            questions,
            passing_score,
            diamonds_reward,
        };
        quiz.validate()?;
        Ok(quiz)
    }

    /// # Errors
    ///
    /// See [`Quiz::new`].
    pub fn validate(&self) -> Result<(), QuizError> {
        if self.title.trim().is_empty() {
            return Err(QuizError::EmptyTitle);
        }
        if self.questions.is_empty() {
            return Err(QuizError::NoQuestions {
                quiz: self.id.clone(),
            });
        }
        let mut seen = HashSet::with_capacity(self.questions.len());
        for question in &self.questions {
            question.validate()?;
            if !seen.insert(question.id().as_str()) {
                return Err(QuizError::DuplicateQuestion {
                    question: question.id().clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &QuizId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    #[must_use]
    pub fn passing_score(&self) -> Score {
        self.passing_score
    }

    #[must_use]
    pub fn diamonds_reward(&self) -> u32 {
        self.diamonds_reward
    }
}
