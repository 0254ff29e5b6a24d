use thiserror::Error;

/// Navigation the screens refuse.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ViewError {
    #[error("unknown course: {0}")]
    UnknownCourse(String),
    #[error("unknown module {module} in course {course}")]
    UnknownModule { course: String, module: String },
    #[error("course {0} is locked")]
    CourseLocked(String),
}

impl ViewError {
    /// Short text for the user.
    #[must_use]
    pub fn message(&self) -> &'static str {
        match self {
            ViewError::UnknownCourse(_) | ViewError::UnknownModule { .. } => {
                "That page does not exist."
            }
            ViewError::CourseLocked(_) => "Unlock this course with diamonds first.",
        }
    }
}
