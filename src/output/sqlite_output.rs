//! SQLite snapshot renderer
//!
//! This module provides a renderer that persists the full page model of the
//! current run to the SQLite storage backend.

use crate::output::traits::{OutputError, OutputResult, ReportContext, ReportRenderer};
use crate::storage::{SqliteStorage, Storage};
use std::path::Path;

/// Renderer replacing the run's stored snapshot on every render
pub struct SqliteSnapshotRenderer {
    storage: SqliteStorage,
    run_id: i64,
}

impl SqliteSnapshotRenderer {
    /// Creates a renderer writing snapshots for `run_id`
    ///
    /// # Arguments
    ///
    /// * `storage` - The storage backend to use
    /// * `run_id` - The current run ID
    pub fn new(storage: SqliteStorage, run_id: i64) -> Self {
        Self { storage, run_id }
    }

    /// Opens its own connection to the database at `path`
    pub fn open(path: &Path, run_id: i64) -> OutputResult<Self> {
        let storage =
            SqliteStorage::new(path).map_err(|e| OutputError::Storage(e.to_string()))?;
        Ok(Self::new(storage, run_id))
    }

    pub fn run_id(&self) -> i64 {
        self.run_id
    }

    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }
}

impl ReportRenderer for SqliteSnapshotRenderer {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn render(&mut self, ctx: &ReportContext<'_>) -> OutputResult<()> {
        let pages = ctx.snapshot();

        self.storage
            .save_snapshot(self.run_id, &pages)
            .map_err(|e| OutputError::Storage(e.to_string()))?;

        Ok(())
    }
}
