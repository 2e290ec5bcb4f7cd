//! Contradiction records.

use rusqlite::{params, Connection, OptionalExtension};

use somnus_core::errors::{SomnusResult, StorageError};
use somnus_core::models::{Contradiction, ContradictionStatus, ContradictionType, Resolution};

use super::{fmt_ts, parse_label, parse_opt_ts, parse_ts};
use crate::to_storage_err;

const TABLE: &str = "contradictions";

const SELECT_COLUMNS: &str = "SELECT id, project_id, memory_id_a, memory_id_b,
        contradiction_type, severity, recommended_resolution, status, description,
        detected_at, resolved_at, resolution_applied
     FROM contradictions";

pub fn insert_contradiction(conn: &Connection, c: &Contradiction) -> SomnusResult<()> {
    conn.execute(
        "INSERT INTO contradictions (
            id, project_id, memory_id_a, memory_id_b, contradiction_type, severity,
            recommended_resolution, status, description, detected_at, resolved_at,
            resolution_applied
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            c.id,
            c.project_id,
            c.memory_id_a,
            c.memory_id_b,
            c.contradiction_type.as_str(),
            c.severity,
            c.recommended_resolution.as_str(),
            c.status.as_str(),
            c.description,
            fmt_ts(&c.detected_at),
            c.resolved_at.as_ref().map(fmt_ts),
            c.resolution_applied.map(Resolution::as_str),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert_contradiction: {e}")))?;
    Ok(())
}

/// Update the mutable fields of a recorded contradiction.
pub fn update_contradiction(conn: &Connection, c: &Contradiction) -> SomnusResult<()> {
    let rows = conn
        .execute(
            "UPDATE contradictions SET
                severity = ?2, recommended_resolution = ?3, status = ?4, description = ?5,
                resolved_at = ?6, resolution_applied = ?7
             WHERE id = ?1",
            params![
                c.id,
                c.severity,
                c.recommended_resolution.as_str(),
                c.status.as_str(),
                c.description,
                c.resolved_at.as_ref().map(fmt_ts),
                c.resolution_applied.map(Resolution::as_str),
            ],
        )
        .map_err(|e| to_storage_err(format!("update_contradiction: {e}")))?;
    if rows == 0 {
        return Err(StorageError::NotFound {
            entity: "contradiction",
            id: c.id.clone(),
        }
        .into());
    }
    Ok(())
}

/// The contradiction recorded for `(a, b)` in either order.
pub fn find_pair(conn: &Connection, a: &str, b: &str) -> SomnusResult<Option<Contradiction>> {
    let raw = conn
        .query_row(
            &format!(
                "{SELECT_COLUMNS}
                 WHERE (memory_id_a = ?1 AND memory_id_b = ?2)
                    OR (memory_id_a = ?2 AND memory_id_b = ?1)
                 ORDER BY detected_at LIMIT 1"
            ),
            params![a, b],
            read_row,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawContradiction::into_contradiction).transpose()
}

pub fn list_by_status(
    conn: &Connection,
    project_id: &str,
    status: ContradictionStatus,
) -> SomnusResult<Vec<Contradiction>> {
    let mut stmt = conn
        .prepare(&format!(
            "{SELECT_COLUMNS} WHERE project_id = ?1 AND status = ?2 ORDER BY detected_at, id"
        ))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![project_id, status.as_str()], read_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut out = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| to_storage_err(e.to_string()))?;
        out.push(raw.into_contradiction()?);
    }
    Ok(out)
}

struct RawContradiction {
    id: String,
    project_id: String,
    memory_id_a: String,
    memory_id_b: String,
    contradiction_type: String,
    severity: f64,
    recommended_resolution: String,
    status: String,
    description: String,
    detected_at: String,
    resolved_at: Option<String>,
    resolution_applied: Option<String>,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawContradiction> {
    Ok(RawContradiction {
        id: row.get(0)?,
        project_id: row.get(1)?,
        memory_id_a: row.get(2)?,
        memory_id_b: row.get(3)?,
        contradiction_type: row.get(4)?,
        severity: row.get(5)?,
        recommended_resolution: row.get(6)?,
        status: row.get(7)?,
        description: row.get(8)?,
        detected_at: row.get(9)?,
        resolved_at: row.get(10)?,
        resolution_applied: row.get(11)?,
    })
}

impl RawContradiction {
    fn into_contradiction(self) -> SomnusResult<Contradiction> {
        Ok(Contradiction {
            contradiction_type: parse_label(
                TABLE,
                &self.contradiction_type,
                ContradictionType::parse,
            )?,
            recommended_resolution: parse_label(
                TABLE,
                &self.recommended_resolution,
                Resolution::parse,
            )?,
            status: parse_label(TABLE, &self.status, ContradictionStatus::parse)?,
            detected_at: parse_ts(TABLE, &self.detected_at)?,
            resolved_at: parse_opt_ts(TABLE, self.resolved_at)?,
            resolution_applied: self
                .resolution_applied
                .as_deref()
                .map(|raw| parse_label(TABLE, raw, Resolution::parse))
                .transpose()?,
            id: self.id,
            project_id: self.project_id,
            memory_id_a: self.memory_id_a,
            memory_id_b: self.memory_id_b,
            severity: self.severity,
            description: self.description,
        })
    }
}
