use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use tracevault_types::{EventType, TraceEvent, TraceId};

use crate::schema::init_schema;
use crate::{Error, Result};

const BUSY_TIMEOUT_MS: u64 = 5_000;
const MAX_APPEND_RETRIES: u32 = 5;

/// Sidecar metadata row for a stored artifact. Bytes live on disk; this row
/// is the `(artifact_hash -> artifact_type, content_type, byte_len,
/// metadata)` lookup the artifact store needs without touching the
/// filesystem.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ArtifactRecord {
    pub artifact_hash: String,
    pub byte_len: u64,
    pub artifact_type: String,
    pub content_type: String,
    pub storage_path: String,
    pub metadata: serde_json::Value,
}

/// The append-only event log. Wraps a single pooled `rusqlite::Connection`
/// behind a mutex: every append is a short transaction, and busy-timeout
/// plus a bounded internal retry loop hide transient SQLITE_BUSY contention
/// from callers, matching the "one writer, short transactions" discipline
/// the design notes call for.
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(db_path: &std::path::Path) -> Result<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Assigns `seq = 1 + max(seq where trace_id = ...)` inside a single
    /// short transaction and inserts the row. Retries on `SQLITE_BUSY` with
    /// a bounded exponential backoff before surfacing `StorageBusy`.
    pub fn append(&self, event: &TraceEvent) -> Result<u64> {
        let payload = serde_json::to_string(&event.payload)
            .map_err(|e| Error::Query(format!("failed to serialize payload: {e}")))?;
        let span_id = span_id_of(event);
        let event_type = format!("{:?}", event.event_type());

        let mut backoff_ms = 5u64;
        for attempt in 0..MAX_APPEND_RETRIES {
            let conn = self.conn.lock().expect("event log mutex poisoned");
            let tx = conn.unchecked_transaction()?;

            let next_seq: i64 = tx.query_row(
                "SELECT COALESCE(MAX(seq), -1) + 1 FROM events WHERE trace_id = ?1",
                params![event.trace_id.as_str()],
                |row| row.get(0),
            )?;

            let insert = tx.execute(
                r#"
                INSERT INTO events
                    (event_id, trace_id, seq, span_id, event_type, timestamp, schema_version, payload)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
                params![
                    &event.event_id,
                    event.trace_id.as_str(),
                    next_seq,
                    span_id,
                    event_type,
                    event.timestamp.to_rfc3339(),
                    event.schema_version,
                    payload,
                ],
            );

            match insert {
                Ok(_) => {
                    tx.commit()?;
                    return Ok(next_seq as u64);
                }
                Err(rusqlite::Error::SqliteFailure(e, _))
                    if e.code == rusqlite::ErrorCode::DatabaseBusy
                        && attempt + 1 < MAX_APPEND_RETRIES =>
                {
                    drop(tx);
                    drop(conn);
                    thread::sleep(Duration::from_millis(backoff_ms));
                    backoff_ms *= 2;
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(Error::StorageBusy)
    }

    /// All events for a trace, in `seq` order. `since_seq` and `event_type`
    /// are optional filters.
    pub fn query(
        &self,
        trace_id: &TraceId,
        since_seq: Option<u64>,
        event_type: Option<EventType>,
    ) -> Result<Vec<TraceEvent>> {
        let conn = self.conn.lock().expect("event log mutex poisoned");
        let mut sql = String::from(
            "SELECT event_id, trace_id, seq, timestamp, schema_version, payload FROM events WHERE trace_id = ?1",
        );
        if since_seq.is_some() {
            sql.push_str(" AND seq >= ?2");
        }
        if event_type.is_some() {
            sql.push_str(if since_seq.is_some() { " AND event_type = ?3" } else { " AND event_type = ?2" });
        }
        sql.push_str(" ORDER BY seq ASC");

        let mut stmt = conn.prepare(&sql)?;
        let type_str = event_type.map(|t| format!("{:?}", t));

        let rows: Vec<TraceEvent> = match (since_seq, type_str) {
            (Some(since), Some(ty)) => stmt
                .query_map(params![trace_id.as_str(), since as i64, ty], row_to_event)?
                .collect::<rusqlite::Result<_>>()?,
            (Some(since), None) => stmt
                .query_map(params![trace_id.as_str(), since as i64], row_to_event)?
                .collect::<rusqlite::Result<_>>()?,
            (None, Some(ty)) => stmt
                .query_map(params![trace_id.as_str(), ty], row_to_event)?
                .collect::<rusqlite::Result<_>>()?,
            (None, None) => stmt
                .query_map(params![trace_id.as_str()], row_to_event)?
                .collect::<rusqlite::Result<_>>()?,
        };

        rows.into_iter().map(|r| Ok(r)).collect()
    }

    /// Events touching a specific span, in `seq` order. Uses the
    /// `(trace_id, span_id)` secondary index.
    pub fn events_for_span(&self, trace_id: &TraceId, span_id: &str) -> Result<Vec<TraceEvent>> {
        let conn = self.conn.lock().expect("event log mutex poisoned");
        let mut stmt = conn.prepare(
            r#"
            SELECT event_id, trace_id, seq, timestamp, schema_version, payload
            FROM events
            WHERE trace_id = ?1 AND span_id = ?2
            ORDER BY seq ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![trace_id.as_str(), span_id], row_to_event)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// All span_start seq numbers for a trace's spans, used by
    /// `get_trace_spans` to order spans by when they opened.
    pub fn span_ids_in_order(&self, trace_id: &TraceId) -> Result<Vec<String>> {
        let conn = self.conn.lock().expect("event log mutex poisoned");
        let mut stmt = conn.prepare(
            r#"
            SELECT span_id FROM events
            WHERE trace_id = ?1 AND event_type = 'SpanStart'
            ORDER BY seq ASC
            "#,
        )?;
        let rows = stmt
            .query_map(params![trace_id.as_str()], |row| row.get::<_, Option<String>>(0))?
            .filter_map(|r| r.transpose())
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn insert_or_get_artifact(&self, record: &ArtifactRecord) -> Result<ArtifactRecord> {
        let conn = self.conn.lock().expect("event log mutex poisoned");
        let metadata = record.metadata.to_string();
        conn.execute(
            r#"
            INSERT INTO artifacts
                (artifact_hash, byte_len, artifact_type, content_type, storage_path, metadata)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            ON CONFLICT(artifact_hash) DO NOTHING
            "#,
            params![
                &record.artifact_hash,
                record.byte_len as i64,
                &record.artifact_type,
                &record.content_type,
                &record.storage_path,
                metadata,
            ],
        )?;

        row_to_artifact(&conn, &record.artifact_hash)?
            .ok_or_else(|| Error::Query("artifact row missing after insert".into()))
    }

    pub fn get_artifact(&self, artifact_hash: &str) -> Result<Option<ArtifactRecord>> {
        let conn = self.conn.lock().expect("event log mutex poisoned");
        row_to_artifact(&conn, artifact_hash)
    }

    pub fn vacuum(&self) -> Result<()> {
        let conn = self.conn.lock().expect("event log mutex poisoned");
        conn.execute("VACUUM", [])?;
        Ok(())
    }
}

fn row_to_artifact(conn: &Connection, artifact_hash: &str) -> Result<Option<ArtifactRecord>> {
    conn.query_row(
        r#"
        SELECT artifact_hash, byte_len, artifact_type, content_type, storage_path, metadata
        FROM artifacts WHERE artifact_hash = ?1
        "#,
        params![artifact_hash],
        |row| {
            let byte_len: i64 = row.get(1)?;
            let metadata_str: String = row.get(5)?;
            Ok(ArtifactRecord {
                artifact_hash: row.get(0)?,
                byte_len: byte_len as u64,
                artifact_type: row.get(2)?,
                content_type: row.get(3)?,
                storage_path: row.get(4)?,
                metadata: serde_json::from_str(&metadata_str).unwrap_or(serde_json::Value::Null),
            })
        },
    )
    .optional()
    .map_err(Error::from)
}

fn span_id_of(event: &TraceEvent) -> Option<String> {
    use tracevault_types::EventPayload::*;
    match &event.payload {
        SpanStart { span_id, .. } => Some(span_id.as_str().to_string()),
        SpanEnd { span_id, .. } => Some(span_id.as_str().to_string()),
        SpanLink { from_span_id, .. } => Some(from_span_id.as_str().to_string()),
        Provenance { subject_span_id, .. } => Some(subject_span_id.as_str().to_string()),
        ArtifactRef { span_id, .. } => span_id.as_ref().map(|s| s.as_str().to_string()),
    }
}

fn row_to_event(row: &rusqlite::Row) -> rusqlite::Result<TraceEvent> {
    let trace_id: String = row.get(1)?;
    let timestamp: String = row.get(3)?;
    let schema_version: u32 = row.get(4)?;
    let payload_str: String = row.get(5)?;

    let timestamp: DateTime<Utc> = timestamp
        .parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e)))?;
    let payload = serde_json::from_str(&payload_str)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(TraceEvent {
        event_id: row.get(0)?,
        trace_id: TraceId::new(trace_id),
        seq: row.get::<_, i64>(2)? as u64,
        timestamp,
        schema_version,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracevault_types::{Attributes, EventPayload, SpanId, SpanKind};

    fn span_start_event(trace_id: &TraceId, span_id: &SpanId, name: &str) -> TraceEvent {
        TraceEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            trace_id: trace_id.clone(),
            seq: 0,
            timestamp: Utc::now(),
            schema_version: tracevault_types::SCHEMA_VERSION,
            payload: EventPayload::SpanStart {
                span_id: span_id.clone(),
                parent_span_id: None,
                kind: SpanKind::AgentTurn,
                name: name.to_string(),
                actor_id: "manager".to_string(),
                attributes: Attributes::new(),
                tool_provenance: None,
            },
        }
    }

    #[test]
    fn append_assigns_monotonic_seq() {
        let db = Database::open_in_memory().unwrap();
        let trace_id = TraceId::generate();
        let span_a = SpanId::generate();
        let span_b = SpanId::generate();

        let seq1 = db
            .append(&span_start_event(&trace_id, &span_a, "a"))
            .unwrap();
        let seq2 = db
            .append(&span_start_event(&trace_id, &span_b, "b"))
            .unwrap();

        assert_eq!(seq1, 0);
        assert_eq!(seq2, 1);
    }

    #[test]
    fn query_returns_events_in_seq_order() {
        let db = Database::open_in_memory().unwrap();
        let trace_id = TraceId::generate();
        for i in 0..5 {
            let span = SpanId::generate();
            db.append(&span_start_event(&trace_id, &span, &format!("s{i}")))
                .unwrap();
        }

        let events = db.query(&trace_id, None, None).unwrap();
        assert_eq!(events.len(), 5);
        for pair in events.windows(2) {
            assert!(pair[0].seq < pair[1].seq);
        }
    }

    #[test]
    fn events_for_span_uses_span_index() {
        let db = Database::open_in_memory().unwrap();
        let trace_id = TraceId::generate();
        let span = SpanId::generate();
        db.append(&span_start_event(&trace_id, &span, "target"))
            .unwrap();
        let other = SpanId::generate();
        db.append(&span_start_event(&trace_id, &other, "other"))
            .unwrap();

        let events = db.events_for_span(&trace_id, span.as_str()).unwrap();
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn artifact_insert_is_idempotent_on_conflict() {
        let db = Database::open_in_memory().unwrap();
        let record = ArtifactRecord {
            artifact_hash: "abc".into(),
            byte_len: 5,
            artifact_type: "note".into(),
            content_type: "text/plain".into(),
            storage_path: "ab/abc".into(),
            metadata: serde_json::json!({}),
        };

        let first = db.insert_or_get_artifact(&record).unwrap();
        let mut conflicting = record.clone();
        conflicting.artifact_type = "different".into();
        let second = db.insert_or_get_artifact(&conflicting).unwrap();

        assert_eq!(first.artifact_type, second.artifact_type);
        assert_eq!(second.artifact_type, "note");
    }
}
