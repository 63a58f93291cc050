use serde::{Deserialize, Serialize};

/// A session header as stored in the backend: which program (and which
/// version of its rules) this history was recorded against, plus the
/// athlete's config. Payloads are canonical JSON values so the storage
/// layer never re-interprets engine types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: String,
    pub program_id: String,
    pub program_version: u32,
    pub config: serde_json::Value,
    pub version: i64,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub created_at: String,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub updated_at: String,
}

/// One logged outcome, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub id: String,
    pub session_id: String,
    pub workout_index: u32,
    pub slot_id: String,
    pub outcome: serde_json::Value,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub logged_at: String,
}

/// One undo-stack entry. `previous_outcome: None` records that the target
/// had not been attempted before the overwrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UndoRecord {
    pub id: String,
    pub session_id: String,
    pub workout_index: u32,
    pub slot_id: String,
    pub previous_outcome: Option<serde_json::Value>,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub recorded_at: String,
}

/// A cached materialized schedule, written after a replay so read-only
/// clients can render without re-running the engine. Always derivable;
/// never authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleSnapshotRecord {
    pub id: String,
    pub session_id: String,
    pub rows: serde_json::Value,
    /// ISO 8601 / RFC 3339 timestamp string.
    pub generated_at: String,
}
