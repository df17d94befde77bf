use rusqlite::Connection;

use crate::Result;

/// Schema version (increment when changing table definitions).
pub const SCHEMA_VERSION: i32 = 1;

/// Events are append-only, so the schema carries no soft-delete or
/// backfill columns. `span_id` is denormalized onto every row (rather than
/// requiring a join back into the payload) purely so `events_for_span` can
/// use a plain secondary index.
pub fn init_schema(conn: &Connection) -> Result<()> {
    let current_version: i32 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;

    if current_version != 0 && current_version != SCHEMA_VERSION {
        drop_all_tables(conn)?;
    }

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            event_id TEXT PRIMARY KEY,
            trace_id TEXT NOT NULL,
            seq INTEGER NOT NULL,
            span_id TEXT,
            event_type TEXT NOT NULL,
            timestamp TEXT NOT NULL,
            schema_version INTEGER NOT NULL,
            payload TEXT NOT NULL,
            UNIQUE(trace_id, seq)
        );

        CREATE INDEX IF NOT EXISTS idx_events_span ON events(trace_id, span_id);
        CREATE INDEX IF NOT EXISTS idx_events_type ON events(trace_id, event_type);

        CREATE TABLE IF NOT EXISTS artifacts (
            artifact_hash TEXT PRIMARY KEY,
            byte_len INTEGER NOT NULL,
            artifact_type TEXT NOT NULL,
            content_type TEXT NOT NULL,
            storage_path TEXT NOT NULL,
            metadata TEXT NOT NULL
        );
        "#,
    )?;

    conn.execute(&format!("PRAGMA user_version = {}", SCHEMA_VERSION), [])?;

    Ok(())
}

fn drop_all_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        DROP TABLE IF EXISTS events;
        DROP TABLE IF EXISTS artifacts;
        "#,
    )?;
    Ok(())
}
