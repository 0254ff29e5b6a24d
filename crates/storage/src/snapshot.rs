use chrono::{DateTime, Utc};
use hack_core::model::{Course, UserProgress};
use hack_core::{ConsistencyError, GameState};
use serde::{Deserialize, Serialize};

use crate::repository::StorageError;

/// Key under which the progress document is stored.
pub const PROGRESS_KEY: &str = "learnHackProgress";

/// Persisted shape of the user's state.
///
/// Mirrors `GameState` plus the save time so the domain layer stays free of
/// storage concerns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    pub user_progress: UserProgress,
    pub courses: Vec<Course>,
    pub last_saved: DateTime<Utc>,
}

impl ProgressSnapshot {
    #[must_use]
    pub fn from_state(state: &GameState, saved_at: DateTime<Utc>) -> Self {
        Self {
            user_progress: state.progress().clone(),
            courses: state.courses().to_vec(),
            last_saved: saved_at,
        }
    }

    /// Convert back into a domain `GameState`.
    ///
    /// # Errors
    ///
    /// Returns `ConsistencyError` if the stored courses and progress disagree.
    pub fn into_state(self) -> Result<GameState, ConsistencyError> {
        GameState::from_parts(self.courses, self.user_progress)
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` if encoding fails.
    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Serialization(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns `StorageError::Serialization` for malformed or schema-mismatched documents.
    pub fn from_json(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw).map_err(|e| StorageError::Serialization(e.to_string()))
    }
}
