//! Static course content and the defaults a new user starts from.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

use crate::game::GameState;
use crate::model::{Course, CourseError, CourseId, UserProgress};

const BUILTIN_CATALOG: &str = include_str!("../catalog/courses.json");

/// Malformed catalog content. Fatal at startup.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("catalog has no courses")]
    Empty,

    #[error("course id {0} appears more than once in the catalog")]
    DuplicateCourse(CourseId),

    #[error("course {course} is invalid: {source}")]
    InvalidCourse {
        course: CourseId,
        #[source]
        source: CourseError,
    },

    #[error("course {0} carries user progress; catalog entries must be pristine")]
    NotPristine(CourseId),
}

/// Validated catalog of courses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    starting_diamonds: u32,
    courses: Vec<Course>,
}

impl Catalog {
    /// Load the catalog bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError` if the bundled content fails validation.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    /// Parse and validate a catalog document.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::Parse` for malformed JSON, or a validation error
    /// such as a quiz with no questions or an out-of-range correct answer.
    pub fn from_json(raw: &str) -> Result<Self, CatalogError> {
        let catalog: Self = serde_json::from_str(raw)?;
        catalog.validate()?;
        Ok(catalog)
    }

    /// # Errors
    ///
    /// See [`Catalog::from_json`].
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.courses.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::with_capacity(self.courses.len());
        for course in &self.courses {
            if !seen.insert(course.id().as_str()) {
                return Err(CatalogError::DuplicateCourse(course.id().clone()));
            }
            course
                .validate()
                .map_err(|source| CatalogError::InvalidCourse {
                    course: course.id().clone(),
                    source,
                })?;
            if course.progress() != 0 || !course.modules().iter().all(|m| m.is_pristine()) {
                return Err(CatalogError::NotPristine(course.id().clone()));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn starting_diamonds(&self) -> u32 {
        self.starting_diamonds
    }

    #[must_use]
    pub fn courses(&self) -> &[Course] {
        &self.courses
    }

    /// Progress for a brand-new user: starting balance and the courses that
    /// are open from the start.
    #[must_use]
    pub fn initial_progress(&self) -> UserProgress {
        let unlocked = self
            .courses
            .iter()
            .filter(|c| c.is_unlocked())
            .map(|c| c.id().clone())
            .collect();
        UserProgress::new(self.starting_diamonds, unlocked)
    }

    #[must_use]
    pub fn initial_state(&self) -> GameState {
        GameState::assemble(self.courses.clone(), self.initial_progress())
    }
}
