use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, StoreError};

pub const SCHEMA_VERSION: i64 = 1;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;
    // Checkpoint every ~400KB instead of the default ~4MB — keeps WAL files small
    conn.pragma_update(None, "wal_autocheckpoint", 100)?;

    // Force-checkpoint any stale WAL data into the main DB on startup.
    // Errors are non-fatal — in-memory DBs and fresh files legitimately fail this.
    if conn
        .execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")
        .is_ok()
    {
        tracing::info!("startup WAL checkpoint complete");
    }

    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS memories (
            id            TEXT PRIMARY KEY,
            content       TEXT NOT NULL,
            emotion       TEXT NOT NULL DEFAULT 'neutral',
            timestamp     REAL NOT NULL,
            resonance     REAL NOT NULL,
            access_count  INTEGER NOT NULL DEFAULT 0,
            last_accessed REAL NOT NULL,
            metadata      TEXT NOT NULL DEFAULT '{}'
        );

        CREATE TABLE IF NOT EXISTS connections (
            memory_id    TEXT NOT NULL REFERENCES memories(id),
            connected_id TEXT NOT NULL REFERENCES memories(id),
            strength     REAL NOT NULL,
            kind         TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS tokens (
            token     TEXT NOT NULL,
            memory_id TEXT NOT NULL REFERENCES memories(id)
        );

        CREATE INDEX IF NOT EXISTS idx_mem_emotion ON memories(emotion);
        CREATE INDEX IF NOT EXISTS idx_mem_timestamp ON memories(timestamp);
        CREATE INDEX IF NOT EXISTS idx_conn_from ON connections(memory_id);
        CREATE INDEX IF NOT EXISTS idx_tok_token ON tokens(token);
        CREATE INDEX IF NOT EXISTS idx_tok_memory ON tokens(memory_id);
        ",
    )?;

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let value: Option<String> = conn
        .query_row(
            "SELECT value FROM metadata WHERE key = 'schema_version'",
            [],
            |row| row.get(0),
        )
        .optional()?;
    value
        .map(|v| {
            v.parse::<i64>()
                .map_err(|e| StoreError::InvalidData(format!("corrupt schema version '{v}': {e}")))
        })
        .transpose()
}
