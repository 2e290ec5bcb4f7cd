//! Pending content updates, applied when a memory's labile window closes.

use rusqlite::{params, Connection, OptionalExtension};

use somnus_core::errors::SomnusResult;
use somnus_core::models::PendingUpdate;

use super::{fmt_ts, parse_json, parse_ts};
use crate::to_storage_err;

const TABLE: &str = "pending_updates";

/// Queue an update, folding it into any update already queued for the memory.
pub fn queue_update(conn: &Connection, update: &PendingUpdate) -> SomnusResult<()> {
    let merged = match get_pending(conn, &update.memory_id)? {
        Some(mut existing) => {
            existing.merge(update.clone());
            existing
        }
        None => update.clone(),
    };
    let sources = serde_json::to_string(&merged.source_event_ids)?;
    conn.execute(
        "INSERT OR REPLACE INTO pending_updates (
            memory_id, content, source_event_ids, quality_score, evidence_quality, queued_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            merged.memory_id,
            merged.content,
            sources,
            merged.quality_score,
            merged.evidence_quality,
            fmt_ts(&merged.queued_at),
        ],
    )
    .map_err(|e| to_storage_err(format!("queue_update: {e}")))?;
    Ok(())
}

pub fn get_pending(conn: &Connection, memory_id: &str) -> SomnusResult<Option<PendingUpdate>> {
    let raw = conn
        .query_row(
            "SELECT memory_id, content, source_event_ids, quality_score, evidence_quality,
                    queued_at
             FROM pending_updates WHERE memory_id = ?1",
            params![memory_id],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, f64>(3)?,
                    row.get::<_, f64>(4)?,
                    row.get::<_, String>(5)?,
                ))
            },
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    match raw {
        Some((memory_id, content, sources, quality_score, evidence_quality, queued_at)) => {
            Ok(Some(PendingUpdate {
                memory_id,
                content,
                source_event_ids: parse_json(TABLE, &sources)?,
                quality_score,
                evidence_quality,
                queued_at: parse_ts(TABLE, &queued_at)?,
            }))
        }
        None => Ok(None),
    }
}

pub fn clear_pending(conn: &Connection, memory_id: &str) -> SomnusResult<()> {
    conn.execute(
        "DELETE FROM pending_updates WHERE memory_id = ?1",
        params![memory_id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
