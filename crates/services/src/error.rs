//! Shared error types for the services crate.

use thiserror::Error;

use hack_core::{CatalogError, QuizRunError, RewardError};
use storage::sqlite::SqliteInitError;

/// Errors emitted by `ProgressStore` mutations.
///
/// Persistence failures never show up here: they are logged and the
/// in-memory state stays authoritative.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ProgressStoreError {
    #[error(transparent)]
    Reward(#[from] RewardError),
}

/// Errors emitted while starting or applying a quiz attempt.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizFlowError {
    #[error("unknown course: {0}")]
    UnknownCourse(String),
    #[error("unknown module {module} in course {course}")]
    UnknownModule { course: String, module: String },
    #[error("course {0} is locked")]
    CourseLocked(String),
    #[error("quiz is not finished yet")]
    NotFinished,
    #[error("quiz result was already applied")]
    AlreadyApplied,
    #[error(transparent)]
    Run(#[from] QuizRunError),
    #[error(transparent)]
    Store(#[from] ProgressStoreError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error("cannot read catalog {path}: {source}")]
    CatalogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}
