//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Pagewatch database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track monitoring runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    last_snapshot_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- Latest snapshot of every page, per run
CREATE TABLE IF NOT EXISTS pages (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    page_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    current_version TEXT,
    rank REAL NOT NULL,
    tier TEXT,
    changes_observed INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (run_id, page_id)
);

CREATE INDEX IF NOT EXISTS idx_pages_run_position ON pages(run_id, position);

-- Outgoing links in document order (duplicates allowed)
CREATE TABLE IF NOT EXISTS links (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    from_page TEXT NOT NULL,
    position INTEGER NOT NULL,
    to_page TEXT NOT NULL,
    PRIMARY KEY (run_id, from_page, position)
);

CREATE INDEX IF NOT EXISTS idx_links_to ON links(run_id, to_page);

-- Version history, oldest first
CREATE TABLE IF NOT EXISTS versions (
    run_id INTEGER NOT NULL REFERENCES runs(id),
    page_id TEXT NOT NULL,
    position INTEGER NOT NULL,
    version_id TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    PRIMARY KEY (run_id, page_id, position)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
