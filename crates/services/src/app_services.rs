use std::path::Path;

use hack_core::Catalog;
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::progress_store::{LoadOutcome, ProgressStore};

/// Assembles the progress store and loads whatever was saved before.
pub struct AppServices {
    store: ProgressStore,
    load_outcome: LoadOutcome,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Sqlite` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        catalog: Catalog,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::with_storage(storage, clock, catalog).await)
    }

    /// Build services over a throwaway in-memory store.
    pub async fn in_memory(clock: Clock, catalog: Catalog) -> Self {
        Self::with_storage(Storage::in_memory(), clock, catalog).await
    }

    pub async fn with_storage(storage: Storage, clock: Clock, catalog: Catalog) -> Self {
        let mut store = ProgressStore::new(catalog, storage.blobs, clock);
        let load_outcome = store.load().await;
        Self {
            store,
            load_outcome,
        }
    }

    /// Read the catalog from `path`, or fall back to the bundled one.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::CatalogFile` if the file cannot be read and
    /// `AppServicesError::Catalog` if its content is invalid.
    pub fn load_catalog(path: Option<&Path>) -> Result<Catalog, AppServicesError> {
        let Some(path) = path else {
            return Ok(Catalog::builtin()?);
        };
        let raw = std::fs::read_to_string(path).map_err(|source| AppServicesError::CatalogFile {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Catalog::from_json(&raw)?)
    }

    #[must_use]
    pub fn load_outcome(&self) -> LoadOutcome {
        self.load_outcome
    }

    #[must_use]
    pub fn store(&self) -> &ProgressStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ProgressStore {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> ProgressStore {
        self.store
    }
}
