//! Storage module for persisting monitoring runs
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Run tracking (start, finish, status)
//! - Page snapshots: current version, rank, tier, links and version history

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};

use crate::crawler::{PageId, VersionRecord};
use crate::state::PriorityTier;
use std::path::Path;

/// Initializes or opens a storage database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStorage)` - Successfully initialized storage
/// * `Err(StorageError)` - Failed to initialize storage
pub fn open_storage(path: &Path) -> StorageResult<SqliteStorage> {
    SqliteStorage::new(path)
}

/// Represents a monitoring run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub last_snapshot_at: Option<String>,
    pub config_hash: String,
    pub status: RunStatus,
}

/// Status of a monitoring run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Interrupted,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Interrupted => "interrupted",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "interrupted" => Some(Self::Interrupted),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// State of one page at the time of a snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    pub page_id: PageId,
    pub current_version: Option<String>,
    pub rank: f64,
    pub tier: Option<PriorityTier>,
    /// Outgoing links in document order
    pub outgoing: Vec<PageId>,
    /// Version history, oldest first
    pub history: Vec<VersionRecord>,
    /// Version changes seen after the first observation
    pub changes_observed: u32,
}
