//! Semantic memory insert, lookup and version compare-and-swap.

use rusqlite::{params, Connection, OptionalExtension};

use somnus_core::errors::SomnusResult;
use somnus_core::models::{EvidenceType, LifecycleState, PatternType, SemanticMemory};

use super::{fmt_ts, parse_json, parse_label, parse_opt_ts, parse_ts};
use crate::to_storage_err;

const TABLE: &str = "memories";

const SELECT_COLUMNS: &str = "SELECT id, project_id, content, embedding, quality_score,
        evidence_type, evidence_quality, source_event_ids, pattern_type, lifecycle_state,
        version, last_retrieved_at, labile_until, superseded_by, content_hash, created_at
     FROM memories";

pub fn insert_memory(conn: &Connection, memory: &SemanticMemory) -> SomnusResult<()> {
    let embedding = memory
        .embedding
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let sources = serde_json::to_string(&memory.source_event_ids)?;

    conn.execute(
        "INSERT INTO memories (
            id, project_id, content, embedding, quality_score, evidence_type,
            evidence_quality, source_event_ids, pattern_type, lifecycle_state, version,
            last_retrieved_at, labile_until, superseded_by, content_hash, created_at
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
        params![
            memory.id,
            memory.project_id,
            memory.content,
            embedding,
            memory.quality_score,
            memory.evidence_type.as_str(),
            memory.evidence_quality,
            sources,
            memory.pattern_type.as_str(),
            memory.lifecycle_state.as_str(),
            memory.version as i64,
            memory.last_retrieved_at.as_ref().map(fmt_ts),
            memory.labile_until.as_ref().map(fmt_ts),
            memory.superseded_by,
            memory.content_hash,
            fmt_ts(&memory.created_at),
        ],
    )
    .map_err(|e| to_storage_err(format!("insert_memory: {e}")))?;
    Ok(())
}

pub fn get_memory(conn: &Connection, id: &str) -> SomnusResult<Option<SemanticMemory>> {
    let raw = conn
        .query_row(
            &format!("{SELECT_COLUMNS} WHERE id = ?1"),
            params![id],
            read_row,
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    raw.map(RawMemory::into_memory).transpose()
}

/// Non-superseded memories of a project, oldest first.
pub fn list_active(conn: &Connection, project_id: &str) -> SomnusResult<Vec<SemanticMemory>> {
    query_memories(
        conn,
        &format!(
            "{SELECT_COLUMNS} WHERE project_id = ?1 AND lifecycle_state != 'superseded'
             ORDER BY created_at, id"
        ),
        params![project_id],
    )
}

pub fn list_by_state(
    conn: &Connection,
    project_id: &str,
    state: LifecycleState,
) -> SomnusResult<Vec<SemanticMemory>> {
    query_memories(
        conn,
        &format!(
            "{SELECT_COLUMNS} WHERE project_id = ?1 AND lifecycle_state = ?2
             ORDER BY created_at, id"
        ),
        params![project_id, state.as_str()],
    )
}

/// Overwrite the row only if the stored version is `expected_version` and the
/// row is not superseded. Returns whether the write happened.
pub fn compare_and_swap(
    conn: &Connection,
    memory: &SemanticMemory,
    expected_version: u64,
) -> SomnusResult<bool> {
    let embedding = memory
        .embedding
        .as_ref()
        .map(serde_json::to_string)
        .transpose()?;
    let sources = serde_json::to_string(&memory.source_event_ids)?;

    let rows = conn
        .execute(
            "UPDATE memories SET
                content = ?3, embedding = ?4, quality_score = ?5, evidence_type = ?6,
                evidence_quality = ?7, source_event_ids = ?8, pattern_type = ?9,
                lifecycle_state = ?10, version = ?11, last_retrieved_at = ?12,
                labile_until = ?13, superseded_by = ?14, content_hash = ?15
             WHERE id = ?1 AND version = ?2 AND lifecycle_state != 'superseded'",
            params![
                memory.id,
                expected_version as i64,
                memory.content,
                embedding,
                memory.quality_score,
                memory.evidence_type.as_str(),
                memory.evidence_quality,
                sources,
                memory.pattern_type.as_str(),
                memory.lifecycle_state.as_str(),
                memory.version as i64,
                memory.last_retrieved_at.as_ref().map(fmt_ts),
                memory.labile_until.as_ref().map(fmt_ts),
                memory.superseded_by,
                memory.content_hash,
            ],
        )
        .map_err(|e| to_storage_err(format!("compare_and_swap: {e}")))?;
    Ok(rows == 1)
}

fn query_memories(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> SomnusResult<Vec<SemanticMemory>> {
    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params, read_row)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut memories = Vec::new();
    for row in rows {
        let raw = row.map_err(|e| to_storage_err(e.to_string()))?;
        memories.push(raw.into_memory()?);
    }
    Ok(memories)
}

struct RawMemory {
    id: String,
    project_id: String,
    content: String,
    embedding: Option<String>,
    quality_score: f64,
    evidence_type: String,
    evidence_quality: f64,
    source_event_ids: String,
    pattern_type: String,
    lifecycle_state: String,
    version: i64,
    last_retrieved_at: Option<String>,
    labile_until: Option<String>,
    superseded_by: Option<String>,
    content_hash: String,
    created_at: String,
}

fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawMemory> {
    Ok(RawMemory {
        id: row.get(0)?,
        project_id: row.get(1)?,
        content: row.get(2)?,
        embedding: row.get(3)?,
        quality_score: row.get(4)?,
        evidence_type: row.get(5)?,
        evidence_quality: row.get(6)?,
        source_event_ids: row.get(7)?,
        pattern_type: row.get(8)?,
        lifecycle_state: row.get(9)?,
        version: row.get(10)?,
        last_retrieved_at: row.get(11)?,
        labile_until: row.get(12)?,
        superseded_by: row.get(13)?,
        content_hash: row.get(14)?,
        created_at: row.get(15)?,
    })
}

impl RawMemory {
    fn into_memory(self) -> SomnusResult<SemanticMemory> {
        Ok(SemanticMemory {
            embedding: self
                .embedding
                .as_deref()
                .map(|raw| parse_json(TABLE, raw))
                .transpose()?,
            evidence_type: parse_label(TABLE, &self.evidence_type, EvidenceType::parse)?,
            source_event_ids: parse_json(TABLE, &self.source_event_ids)?,
            pattern_type: parse_label(TABLE, &self.pattern_type, PatternType::parse)?,
            lifecycle_state: parse_label(TABLE, &self.lifecycle_state, LifecycleState::parse)?,
            version: self.version.max(0) as u64,
            last_retrieved_at: parse_opt_ts(TABLE, self.last_retrieved_at)?,
            labile_until: parse_opt_ts(TABLE, self.labile_until)?,
            created_at: parse_ts(TABLE, &self.created_at)?,
            id: self.id,
            project_id: self.project_id,
            content: self.content,
            quality_score: self.quality_score,
            evidence_quality: self.evidence_quality,
            superseded_by: self.superseded_by,
            content_hash: self.content_hash,
        })
    }
}
