use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;
use url::Url;

use crate::model::ids::{CourseId, ModuleId};
use crate::model::quiz::{Quiz, QuizError};
use crate::model::score::{Score, completion_percent};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course {course} has an empty name")]
    EmptyName { course: CourseId },

    #[error("module {module} has an empty title")]
    EmptyModuleTitle { module: ModuleId },

    #[error("module id {module} appears more than once in course {course}")]
    DuplicateModule { course: CourseId, module: ModuleId },

    #[error("module {module} has an invalid quiz: {source}")]
    InvalidQuiz {
        module: ModuleId,
        #[source]
        source: QuizError,
    },

    #[error("course {course} progress {progress} is above 100")]
    ProgressOutOfRange { course: CourseId, progress: u8 },
}

//
// ─── LEVEL ─────────────────────────────────────────────────────────────────────
//

/// Difficulty level shown on course cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Beginner,
    Intermediate,
    Advanced,
}

impl Level {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Beginner => "beginner",
            Level::Intermediate => "intermediate",
            Level::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ─── MODULE ────────────────────────────────────────────────────────────────────
//

/// A lesson plus its quiz.
///
/// `completed` and `score` mirror `UserProgress` and are only written by
/// [`crate::game::GameState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    id: ModuleId,
    title: String,
    description: String,
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    video_url: Option<Url>,
    quiz: Quiz,
    #[serde(default)]
    completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    score: Option<Score>,
}

impl Module {
    /// # Errors
    ///
    /// Returns `CourseError` if the title is blank or the quiz is malformed.
    pub fn new(
        id: ModuleId,
        title: impl Into<String>,
        description: impl Into<String>,
        content: impl Into<String>,
        video_url: Option<Url>,
        quiz: Quiz,
    ) -> Result<Self, CourseError> {
        let module = Self {
            id,
            title: title.into(),
            description: description.into(),
            content: content.into(),
            video_url,
            quiz,
            completed: false,
            score: None,
        };
        module.validate()?;
        Ok(module)
    }

    /// # Errors
    ///
    /// See [`Module::new`].
    pub fn validate(&self) -> Result<(), CourseError> {
        if self.title.trim().is_empty() {
            return Err(CourseError::EmptyModuleTitle {
                module: self.id.clone(),
            });
        }
        self.quiz
            .validate()
            .map_err(|source| CourseError::InvalidQuiz {
                module: self.id.clone(),
                source,
            })
    }

    #[must_use]
    pub fn id(&self) -> &ModuleId {
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
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn video_url(&self) -> Option<&Url> {
        self.video_url.as_ref()
    }

    #[must_use]
    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    #[must_use]
    pub fn score(&self) -> Option<Score> {
        self.score
    }

    pub(crate) fn mark_completed(&mut self, score: Score) {
        self.completed = true;
        self.score = Some(score);
    }

    /// True if the module carries no per-user state.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        !self.completed && self.score.is_none()
    }
}

//
// ─── COURSE ────────────────────────────────────────────────────────────────────
//

/// Top-level learning unit with an unlock cost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    id: CourseId,
    name: String,
    icon: String,
    level: Level,
    required_diamonds: u32,
    modules: Vec<Module>,
    #[serde(default)]
    unlocked: bool,
    #[serde(default)]
    progress: u8,
    color: String,
}

impl Course {
    /// # Errors
    ///
    /// Returns `CourseError` if the name is blank, module ids repeat, or any
    /// module is invalid.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: CourseId,
        name: impl Into<String>,
        icon: impl Into<String>,
        level: Level,
        required_diamonds: u32,
        modules: Vec<Module>,
        unlocked: bool,
        color: impl Into<String>,
    ) -> Result<Self, CourseError> {
        let course = Self {
            id,
            name: name.into(),
            icon: icon.into(),
            level,
            required_diamonds,
            modules,
            unlocked,
            progress: 0,
            color: color.into(),
        };
        course.validate()?;
        Ok(course)
    }

    /// # Errors
    ///
    /// See [`Course::new`].
    pub fn validate(&self) -> Result<(), CourseError> {
        if self.name.trim().is_empty() {
            return Err(CourseError::EmptyName {
                course: self.id.clone(),
            });
        }
        if self.progress > 100 {
            return Err(CourseError::ProgressOutOfRange {
                course: self.id.clone(),
                progress: self.progress,
            });
        }
        let mut seen = HashSet::with_capacity(self.modules.len());
        for module in &self.modules {
            module.validate()?;
            if !seen.insert(module.id().as_str()) {
                return Err(CourseError::DuplicateModule {
                    course: self.id.clone(),
                    module: module.id().clone(),
                });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn id(&self) -> &CourseId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    #[must_use]
    pub fn required_diamonds(&self) -> u32 {
        self.required_diamonds
    }

    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    #[must_use]
    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id() == module_id)
    }

    #[must_use]
    pub fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    /// Stored completion percentage.
    #[must_use]
    pub fn progress(&self) -> u8 {
        self.progress
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.modules.iter().filter(|m| m.is_completed()).count()
    }

    /// Completion percentage computed from module flags, independent of the
    /// stored `progress` value.
    #[must_use]
    pub fn computed_progress(&self) -> u8 {
        completion_percent(self.completed_count(), self.modules.len())
    }

    pub(crate) fn module_mut(&mut self, module_id: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.id() == module_id)
    }

    pub(crate) fn mark_unlocked(&mut self) {
        self.unlocked = true;
    }

    pub(crate) fn refresh_progress(&mut self) -> u8 {
        self.progress = self.computed_progress();
        self.progress
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ids::{QuestionId, QuizId};
    use crate::model::quiz::QuizQuestion;

    fn quiz(id: &str) -> Quiz {
        let question = QuizQuestion::new(
            QuestionId::new("q1").unwrap(),
            "2 + 2?",
            vec!["3".into(), "4".into()],
            1,
            "Arithmetic.",
        )
        .unwrap();
        Quiz::new(
            QuizId::new(id).unwrap(),
            "Quiz",
            "",
            vec![question],
            Score::new(70).unwrap(),
            5,
        )
        .unwrap()
    }

    fn module(id: &str) -> Module {
        Module::new(
            ModuleId::new(id).unwrap(),
            "Lesson",
            "",
            "Body",
            None,
            quiz(&format!("{id}-quiz")),
        )
        .unwrap()
    }

    #[test]
    fn duplicate_module_ids_are_rejected() {
        let err = Course::new(
            CourseId::new("c").unwrap(),
            "C",
            "*",
            Level::Beginner,
            0,
            vec![module("m1"), module("m1")],
            true,
            "gray",
        )
        .unwrap_err();
        assert!(matches!(err, CourseError::DuplicateModule { .. }));
    }

    #[test]
    fn computed_progress_counts_completed_modules() {
        let mut course = Course::new(
            CourseId::new("c").unwrap(),
            "C",
            "*",
            Level::Beginner,
            0,
            (1..=5).map(|i| module(&format!("m{i}"))).collect(),
            true,
            "gray",
        )
        .unwrap();
        course.module_mut("m1").unwrap().mark_completed(Score::PERFECT);
        course.module_mut("m2").unwrap().mark_completed(Score::ZERO);
        assert_eq!(course.progress(), 0);
        assert_eq!(course.refresh_progress(), 40);
        assert_eq!(course.progress(), 40);
    }

    #[test]
    fn empty_course_has_zero_progress() {
        let mut course = Course::new(
            CourseId::new("java").unwrap(),
            "Java",
            "*",
            Level::Intermediate,
            30,
            Vec::new(),
            false,
            "red",
        )
        .unwrap();
        assert_eq!(course.refresh_progress(), 0);
    }

    #[test]
    fn level_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&Level::Advanced).unwrap(),
            "\"advanced\""
        );
    }

    #[test]
    fn video_url_must_be_absolute() {
        let raw = r#"{
            "id": "m1", "title": "T", "description": "", "content": "",
            "videoUrl": "not a url",
            "quiz": {"id": "q", "title": "Q", "description": "", "questions": [],
                     "passingScore": 70, "diamondsReward": 5}
        }"#;
        assert!(serde_json::from_str::<Module>(raw).is_err());
    }
}
