use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use hack_core::model::Score;
use hack_core::{Catalog, CourseUnlock, GameState, ModuleCompletion};
use storage::repository::BlobRepository;
use storage::snapshot::{PROGRESS_KEY, ProgressSnapshot};

use crate::Clock;
use crate::error::ProgressStoreError;

/// What `ProgressStore::load` found in storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// A saved document replaced the in-memory state.
    Restored { last_saved: DateTime<Utc> },
    /// Nothing was saved yet.
    Missing,
    /// Storage failed or the document was unreadable; state left as it was.
    Rejected,
}

/// Whether a write to storage went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Failed,
}

/// Owns the user's game state and keeps storage in step with it.
///
/// Every successful mutation is saved before the method returns. Storage
/// failures are logged and never undo an in-memory change.
pub struct ProgressStore {
    catalog: Catalog,
    state: GameState,
    blobs: Arc<dyn BlobRepository>,
    clock: Clock,
    last_saved: Option<DateTime<Utc>>,
}

impl ProgressStore {
    /// Start from the catalog defaults. Call `load` to pick up saved progress.
    #[must_use]
    pub fn new(catalog: Catalog, blobs: Arc<dyn BlobRepository>, clock: Clock) -> Self {
        let state = catalog.initial_state();
        Self {
            catalog,
            state,
            blobs,
            clock,
            last_saved: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> &GameState {
        &self.state
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Time of the last successful save or restore.
    #[must_use]
    pub fn last_saved(&self) -> Option<DateTime<Utc>> {
        self.last_saved
    }

    /// Replace the in-memory state with the saved document, if there is a
    /// usable one.
    pub async fn load(&mut self) -> LoadOutcome {
        let raw = match self.blobs.read(PROGRESS_KEY).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no saved progress; starting from defaults");
                return LoadOutcome::Missing;
            }
            Err(err) => {
                warn!(error = %err, "failed to read saved progress; keeping current state");
                return LoadOutcome::Rejected;
            }
        };

        let snapshot = match ProgressSnapshot::from_json(&raw) {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "saved progress is unreadable; keeping current state");
                return LoadOutcome::Rejected;
            }
        };

        let last_saved = snapshot.last_saved;
        match snapshot.into_state() {
            Ok(state) => {
                self.state = state;
                self.last_saved = Some(last_saved);
                info!(%last_saved, diamonds = self.state.diamonds(), "restored saved progress");
                LoadOutcome::Restored { last_saved }
            }
            Err(err) => {
                warn!(error = %err, "saved progress is inconsistent; keeping current state");
                LoadOutcome::Rejected
            }
        }
    }

    /// Write the current state under the progress key.
    pub async fn save(&mut self) -> SaveOutcome {
        let now = self.clock.now();
        let raw = match ProgressSnapshot::from_state(&self.state, now).to_json() {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "failed to encode progress");
                return SaveOutcome::Failed;
            }
        };

        match self.blobs.write(PROGRESS_KEY, &raw).await {
            Ok(()) => {
                self.last_saved = Some(now);
                debug!(bytes = raw.len(), "progress saved");
                SaveOutcome::Saved
            }
            Err(err) => {
                warn!(error = %err, "failed to save progress; keeping in-memory state");
                SaveOutcome::Failed
            }
        }
    }

    /// Go back to catalog defaults and drop the saved document.
    ///
    /// Returns `SaveOutcome::Saved` when the stored key was removed.
    pub async fn reset(&mut self) -> SaveOutcome {
        self.state = self.catalog.initial_state();
        self.last_saved = None;
        info!("progress reset to defaults");

        match self.blobs.remove(PROGRESS_KEY).await {
            Ok(()) => SaveOutcome::Saved,
            Err(err) => {
                warn!(error = %err, "failed to clear saved progress");
                SaveOutcome::Failed
            }
        }
    }

    /// # Errors
    ///
    /// Returns `ProgressStoreError::Reward` if the balance would overflow.
    pub async fn add_diamonds(&mut self, amount: u32) -> Result<u32, ProgressStoreError> {
        let balance = self.state.add_diamonds(amount)?;
        if amount > 0 {
            self.save().await;
        }
        Ok(balance)
    }

    /// # Errors
    ///
    /// Returns `ProgressStoreError::Reward` if the balance does not cover `amount`.
    pub async fn spend_diamonds(&mut self, amount: u32) -> Result<u32, ProgressStoreError> {
        let balance = self.state.spend_diamonds(amount)?;
        if amount > 0 {
            self.save().await;
        }
        Ok(balance)
    }

    /// # Errors
    ///
    /// Returns `ProgressStoreError::Reward` for unknown, already unlocked or
    /// unaffordable courses.
    pub async fn unlock_course(
        &mut self,
        course_id: &str,
    ) -> Result<CourseUnlock, ProgressStoreError> {
        let unlock = self.state.unlock_course(course_id)?;
        info!(course = %unlock.course_id, spent = unlock.spent, balance = unlock.balance, "course unlocked");
        self.save().await;
        Ok(unlock)
    }

    /// # Errors
    ///
    /// Returns `ProgressStoreError::Reward` for unknown ids or a reward that
    /// cannot be credited.
    pub async fn complete_module(
        &mut self,
        course_id: &str,
        module_id: &str,
        score: Score,
    ) -> Result<ModuleCompletion, ProgressStoreError> {
        let completion = self.state.complete_module(course_id, module_id, score)?;
        info!(
            course = %completion.course_id,
            module = %completion.module_id,
            score = completion.score.value(),
            passed = completion.passed,
            diamonds = completion.diamonds_awarded,
            "module completed"
        );
        self.save().await;
        Ok(completion)
    }

    /// # Errors
    ///
    /// Returns `ProgressStoreError::Reward` for an unknown course.
    pub async fn update_course_progress(&mut self, course_id: &str) -> Result<u8, ProgressStoreError> {
        let before = self.state.course(course_id).map(|c| c.progress());
        let progress = self.state.update_course_progress(course_id)?;
        if before != Some(progress) {
            self.save().await;
        }
        Ok(progress)
    }
}
