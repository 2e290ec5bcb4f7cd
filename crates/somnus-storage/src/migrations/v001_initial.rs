//! v001: events, memories, pending_updates, contradictions, schema_version.

pub const MIGRATION_SQL: &str = "
CREATE TABLE IF NOT EXISTS schema_version (
    version     INTEGER PRIMARY KEY,
    applied_at  TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);

CREATE TABLE IF NOT EXISTS events (
    id                   TEXT PRIMARY KEY,
    project_id           TEXT NOT NULL,
    content              TEXT NOT NULL,
    event_type           TEXT NOT NULL,
    context              TEXT NOT NULL DEFAULT '{}',
    timestamp            TEXT NOT NULL,
    importance           REAL NOT NULL DEFAULT 0.5,
    consolidation_state  TEXT NOT NULL DEFAULT 'unconsolidated'
);

CREATE INDEX IF NOT EXISTS idx_events_pending
    ON events(project_id, consolidation_state, timestamp);

CREATE TABLE IF NOT EXISTS memories (
    id                 TEXT PRIMARY KEY,
    project_id         TEXT NOT NULL,
    content            TEXT NOT NULL,
    embedding          TEXT,
    quality_score      REAL NOT NULL,
    evidence_type      TEXT NOT NULL,
    evidence_quality   REAL NOT NULL,
    source_event_ids   TEXT NOT NULL,
    pattern_type       TEXT NOT NULL,
    lifecycle_state    TEXT NOT NULL,
    version            INTEGER NOT NULL,
    last_retrieved_at  TEXT,
    labile_until       TEXT,
    superseded_by      TEXT,
    content_hash       TEXT NOT NULL,
    created_at         TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_memories_project_state
    ON memories(project_id, lifecycle_state);
CREATE INDEX IF NOT EXISTS idx_memories_content_hash ON memories(content_hash);

CREATE TABLE IF NOT EXISTS pending_updates (
    memory_id          TEXT PRIMARY KEY,
    content            TEXT NOT NULL,
    source_event_ids   TEXT NOT NULL,
    quality_score      REAL NOT NULL,
    evidence_quality   REAL NOT NULL,
    queued_at          TEXT NOT NULL,
    FOREIGN KEY (memory_id) REFERENCES memories(id) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS contradictions (
    id                      TEXT PRIMARY KEY,
    project_id              TEXT NOT NULL,
    memory_id_a             TEXT NOT NULL,
    memory_id_b             TEXT NOT NULL,
    contradiction_type      TEXT NOT NULL,
    severity                REAL NOT NULL,
    recommended_resolution  TEXT NOT NULL,
    status                  TEXT NOT NULL,
    description             TEXT NOT NULL DEFAULT '',
    detected_at             TEXT NOT NULL,
    resolved_at             TEXT,
    resolution_applied      TEXT
);

CREATE INDEX IF NOT EXISTS idx_contradictions_status
    ON contradictions(project_id, status);
CREATE INDEX IF NOT EXISTS idx_contradictions_pair
    ON contradictions(memory_id_a, memory_id_b);
";
