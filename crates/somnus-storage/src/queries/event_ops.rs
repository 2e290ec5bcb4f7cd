//! Episodic event ingestion, lookback query and consolidation marking.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use somnus_core::errors::SomnusResult;
use somnus_core::models::{ConsolidationState, EpisodicEvent, EventType};

use super::{fmt_ts, parse_json, parse_label, parse_ts};
use crate::to_storage_err;

const TABLE: &str = "events";

const SELECT_COLUMNS: &str = "SELECT id, project_id, content, event_type, context, timestamp,
        importance, consolidation_state FROM events";

/// Insert or replace an event.
pub fn insert_event(conn: &Connection, event: &EpisodicEvent) -> SomnusResult<()> {
    let context = serde_json::to_string(&event.context)?;
    conn.execute(
        "INSERT OR REPLACE INTO events (
            id, project_id, content, event_type, context, timestamp, importance,
            consolidation_state
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            event.id,
            event.project_id,
            event.content,
            event.event_type.as_str(),
            context,
            fmt_ts(&event.timestamp),
            event.importance,
            event.consolidation_state.as_str(),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert_event: {e}")))?;
    Ok(())
}

pub fn get_event(conn: &Connection, id: &str) -> SomnusResult<Option<EpisodicEvent>> {
    let raw = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            read_row,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawEvent::into_event).transpose()
}

/// Unconsolidated events of a project with `timestamp >= cutoff`, ordered by
/// `(timestamp, id)`.
pub fn unconsolidated_since(
    conn: &Connection,
    project_id: &str,
    cutoff: DateTime<Utc>,
) -> SomnusResult<Vec<EpisodicEvent>> {
    let mut stmt = conn
        .prepare(&format!(
            "{SELECT_COLUMNS}
             WHERE project_id = ?1 AND consolidation_state = 'unconsolidated'
               AND timestamp >= ?2
             ORDER BY timestamp, id"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![project_id, fmt_ts(&cutoff)], read_row)
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut events = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| to_storage_err(e.to_string()))?;
        events.push(raw.into_event()?);
    }
    Ok(events)
}

/// Flip events to consolidated in one transaction. Returns rows changed.
pub fn mark_consolidated(conn: &Connection, ids: &[String]) -> SomnusResult<usize> {
    let tx = conn
        .unchecked_transaction()
        .map_err(|e| to_storage_err(format!("mark_consolidated begin: {e}")))?;
    let mut changed = 0;
    for id in ids {
        changed += tx
            .execute(
                "UPDATE events SET consolidation_state = 'consolidated'
                 WHERE id = ?1 AND consolidation_state = 'unconsolidated'",
                params![id],
            )
            .map_err(|e| to_storage_err(e.to_string()))?;
    }
    tx.commit()
        .map_err(|e| to_storage_err(format!("mark_consolidated commit: {e}")))?;
    Ok(changed)
}

struct RawEvent {
    id: String,
    project_id: String,
    content: String,
    event_type: String,
    context: String,
    timestamp: String,
    importance: f64,
    consolidation_state: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEvent> {
    Ok(RawEvent {
        id: row.get(0)?,
        project_id: row.get(1)?,
        content: row.get(2)?,
        event_type: row.get(3)?,
        context: row.get(4)?,
        timestamp: row.get(5)?,
        importance: row.get(6)?,
        consolidation_state: row.get(7)?,
    })
}

impl RawEvent {
    fn into_event(self) -> SomnusResult<EpisodicEvent> {
        Ok(EpisodicEvent {
            event_type: parse_label(TABLE, &self.event_type, EventType::parse)?,
            context: parse_json(TABLE, &self.context)?,
            timestamp: parse_ts(TABLE, &self.timestamp)?,
            consolidation_state: parse_label(
                TABLE,
                &self.consolidation_state,
                ConsolidationState::parse,
            )?,
            id: self.id,
            project_id: self.project_id,
            content: self.content,
            importance: self.importance,
        })
    }
}
