//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::crawler::{PageId, VersionRecord};
use crate::state::PriorityTier;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::storage::{PageSnapshot, RunRecord, RunStatus};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::collections::HashMap;
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, last_snapshot_at, config_hash, status";

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    fn require_run(&self, run_id: i64) -> StorageResult<()> {
        let exists: Option<i64> = self
            .conn
            .query_row("SELECT id FROM runs WHERE id = ?1", params![run_id], |row| {
                row.get(0)
            })
            .optional()?;

        exists.map(|_| ()).ok_or(StorageError::RunNotFound(run_id))
    }

    fn count_rows(&self, table: &str, run_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE run_id = ?1", table),
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        last_snapshot_at: row.get(3)?,
        config_hash: row.get(4)?,
        status: RunStatus::from_db_string(&row.get::<_, String>(5)?)
            .unwrap_or(RunStatus::Running),
    })
}

impl Storage for SqliteStorage {
    // ===== Run Management =====

    fn create_run(&mut self, config_hash: &str) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, status) VALUES (?1, ?2, ?3)",
            params![now, config_hash, RunStatus::Running.to_db_string()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_run(&self, run_id: i64) -> StorageResult<RunRecord> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM runs WHERE id = ?1", RUN_COLUMNS),
                params![run_id],
                run_from_row,
            )
            .optional()?
            .ok_or(StorageError::RunNotFound(run_id))
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let run = self
            .conn
            .query_row(
                &format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS),
                [],
                run_from_row,
            )
            .optional()?;

        Ok(run)
    }

    fn finish_run(&mut self, run_id: i64, status: RunStatus) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2 WHERE id = ?3",
            params![status.to_db_string(), now, run_id],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }

    // ===== Snapshots =====

    fn save_snapshot(&mut self, run_id: i64, pages: &[PageSnapshot]) -> StorageResult<()> {
        self.require_run(run_id)?;

        let tx = self.conn.transaction()?;

        for table in ["pages", "links", "versions"] {
            tx.execute(
                &format!("DELETE FROM {} WHERE run_id = ?1", table),
                params![run_id],
            )?;
        }

        {
            let mut insert_page = tx.prepare(
                "INSERT INTO pages
                    (run_id, page_id, position, current_version, rank, tier, changes_observed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            )?;
            let mut insert_link = tx.prepare(
                "INSERT INTO links (run_id, from_page, position, to_page) VALUES (?1, ?2, ?3, ?4)",
            )?;
            let mut insert_version = tx.prepare(
                "INSERT INTO versions (run_id, page_id, position, version_id, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;

            for (position, page) in pages.iter().enumerate() {
                insert_page.execute(params![
                    run_id,
                    page.page_id,
                    position as i64,
                    page.current_version,
                    page.rank,
                    page.tier.map(|t| t.to_db_string()),
                    page.changes_observed,
                ])?;

                for (link_position, target) in page.outgoing.iter().enumerate() {
                    insert_link.execute(params![
                        run_id,
                        page.page_id,
                        link_position as i64,
                        target
                    ])?;
                }

                for (version_position, record) in page.history.iter().enumerate() {
                    insert_version.execute(params![
                        run_id,
                        page.page_id,
                        version_position as i64,
                        record.version_id,
                        record.timestamp
                    ])?;
                }
            }
        }

        tx.execute(
            "UPDATE runs SET last_snapshot_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), run_id],
        )?;

        tx.commit()?;

        tracing::debug!("Saved snapshot of {} pages for run {}", pages.len(), run_id);
        Ok(())
    }

    fn load_snapshot(&self, run_id: i64) -> StorageResult<Vec<PageSnapshot>> {
        self.require_run(run_id)?;

        let mut links: HashMap<PageId, Vec<PageId>> = HashMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT from_page, to_page FROM links
             WHERE run_id = ?1 ORDER BY from_page, position",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (from, to) = row?;
            links.entry(from).or_default().push(to);
        }

        let mut history: HashMap<PageId, Vec<VersionRecord>> = HashMap::new();
        let mut stmt = self.conn.prepare(
            "SELECT page_id, version_id, timestamp FROM versions
             WHERE run_id = ?1 ORDER BY page_id, position",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                VersionRecord::new(row.get::<_, String>(1)?, row.get::<_, String>(2)?),
            ))
        })?;
        for row in rows {
            let (page_id, record) = row?;
            history.entry(page_id).or_default().push(record);
        }

        let mut stmt = self.conn.prepare(
            "SELECT page_id, current_version, rank, tier, changes_observed
             FROM pages WHERE run_id = ?1 ORDER BY position",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<String>>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, Option<String>>(3)?,
                row.get::<_, u32>(4)?,
            ))
        })?;

        let mut pages = Vec::new();
        for row in rows {
            let (page_id, current_version, rank, tier, changes_observed) = row?;

            let tier = match tier {
                Some(s) => Some(PriorityTier::from_db_string(&s).ok_or_else(|| {
                    StorageError::Serialization(format!(
                        "Unknown tier '{}' for page {}",
                        s, page_id
                    ))
                })?),
                None => None,
            };

            pages.push(PageSnapshot {
                outgoing: links.remove(&page_id).unwrap_or_default(),
                history: history.remove(&page_id).unwrap_or_default(),
                page_id,
                current_version,
                rank,
                tier,
                changes_observed,
            });
        }

        Ok(pages)
    }

    // ===== Statistics =====

    fn count_pages(&self, run_id: i64) -> StorageResult<u64> {
        self.count_rows("pages", run_id)
    }

    fn count_links(&self, run_id: i64) -> StorageResult<u64> {
        self.count_rows("links", run_id)
    }

    fn count_versions(&self, run_id: i64) -> StorageResult<u64> {
        self.count_rows("versions", run_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(
        page_id: &str,
        rank: f64,
        tier: Option<PriorityTier>,
        links: &[&str],
    ) -> PageSnapshot {
        PageSnapshot {
            page_id: page_id.to_string(),
            current_version: Some("v2".to_string()),
            rank,
            tier,
            outgoing: links.iter().map(|l| l.to_string()).collect(),
            history: vec![VersionRecord::new("v1", "t1"), VersionRecord::new("v2", "t2")],
            changes_observed: 1,
        }
    }

    #[test]
    fn test_create_in_memory() {
        let storage = SqliteStorage::new_in_memory();
        assert!(storage.is_ok());
    }

    #[test]
    fn test_create_and_get_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc123").unwrap();

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.config_hash, "abc123");
        assert_eq!(run.status, RunStatus::Running);
        assert!(run.finished_at.is_none());
        assert!(run.last_snapshot_at.is_none());
    }

    #[test]
    fn test_get_missing_run() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.get_run(42),
            Err(StorageError::RunNotFound(42))
        ));
    }

    #[test]
    fn test_latest_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        assert!(storage.get_latest_run().unwrap().is_none());

        storage.create_run("first").unwrap();
        let second = storage.create_run("second").unwrap();

        let latest = storage.get_latest_run().unwrap().unwrap();
        assert_eq!(latest.id, second);
        assert_eq!(latest.config_hash, "second");
    }

    #[test]
    fn test_finish_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc").unwrap();

        storage.finish_run(run_id, RunStatus::Completed).unwrap();

        let run = storage.get_run(run_id).unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        assert!(run.finished_at.is_some());
        assert!(storage.finish_run(999, RunStatus::Failed).is_err());
    }

    #[test]
    fn test_snapshot_preserves_order_and_content() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc").unwrap();

        let pages = vec![
            snapshot("zeta", 0.5, Some(PriorityTier::High), &["alpha", "alpha", "gone"]),
            snapshot("alpha", 0.3, Some(PriorityTier::Low), &[]),
            snapshot("mid", 0.2, None, &["zeta"]),
        ];
        storage.save_snapshot(run_id, &pages).unwrap();

        let loaded = storage.load_snapshot(run_id).unwrap();
        assert_eq!(loaded, pages);
        assert!(storage.get_run(run_id).unwrap().last_snapshot_at.is_some());
    }

    #[test]
    fn test_snapshot_is_replaced() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let run_id = storage.create_run("abc").unwrap();

        storage
            .save_snapshot(
                run_id,
                &[snapshot("a", 0.5, None, &["b"]), snapshot("b", 0.5, None, &["a"])],
            )
            .unwrap();
        storage
            .save_snapshot(run_id, &[snapshot("a", 1.0, None, &[])])
            .unwrap();

        assert_eq!(storage.count_pages(run_id).unwrap(), 1);
        assert_eq!(storage.count_links(run_id).unwrap(), 0);
        assert_eq!(storage.count_versions(run_id).unwrap(), 2);
    }

    #[test]
    fn test_snapshots_are_scoped_per_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let first = storage.create_run("abc").unwrap();
        let second = storage.create_run("abc").unwrap();

        storage
            .save_snapshot(first, &[snapshot("a", 1.0, None, &["a"])])
            .unwrap();

        assert_eq!(storage.count_pages(first).unwrap(), 1);
        assert_eq!(storage.count_links(first).unwrap(), 1);
        assert_eq!(storage.count_pages(second).unwrap(), 0);
        assert!(storage.load_snapshot(second).unwrap().is_empty());
    }

    #[test]
    fn test_snapshot_for_missing_run() {
        let mut storage = SqliteStorage::new_in_memory().unwrap();
        let result = storage.save_snapshot(7, &[snapshot("a", 1.0, None, &[])]);
        assert!(matches!(result, Err(StorageError::RunNotFound(7))));
    }

    #[test]
    fn test_file_backed_storage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pagewatch.db");

        let run_id = {
            let mut storage = SqliteStorage::new(&path).unwrap();
            let run_id = storage.create_run("abc").unwrap();
            storage
                .save_snapshot(run_id, &[snapshot("a", 1.0, Some(PriorityTier::Medium), &[])])
                .unwrap();
            run_id
        };

        let storage = SqliteStorage::new(&path).unwrap();
        let loaded = storage.load_snapshot(run_id).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].tier, Some(PriorityTier::Medium));
    }
}
