//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::storage::{PageSnapshot, RunRecord, RunStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Run not found: {0}")]
    RunNotFound(i64),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// A run owns at most one snapshot; saving a new snapshot replaces the
/// previous one.
pub trait Storage {
    // ===== Run Management =====

    /// Creates a new monitoring run
    ///
    /// # Arguments
    ///
    /// * `config_hash` - Hash of the configuration file
    ///
    /// # Returns
    ///
    /// The ID of the newly created run
    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64>;

    /// Gets a run by ID
    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord>;

    /// Gets the most recent run
    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>>;

    /// Sets the final status of a run and stamps its finish time
    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()>;

    // ===== Snapshots =====

    /// Replaces the snapshot of a run
    ///
    /// Pages are stored in the given order. The replacement is atomic: a
    /// failure leaves the previous snapshot in place.
    fn save_snapshot(&mut self, run_id: i64, pages: &[PageSnapshot]) -> StorageResult<()>;

    /// Loads the snapshot of a run, pages in the order they were saved
    fn load_snapshot(&self, run_id: i64) -> StorageResult<Vec<PageSnapshot>>;

    // ===== Statistics =====

    /// Number of pages in a run's snapshot
    fn count_pages(&self, run_id: i64) -> StorageResult<u64>;

    /// Number of link entries in a run's snapshot
    fn count_links(&self, run_id: i64) -> StorageResult<u64>;

    /// Number of version history entries in a run's snapshot
    fn count_versions(&self, run_id: i64) -> StorageResult<u64>;
}
