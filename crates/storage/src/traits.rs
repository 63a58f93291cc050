use async_trait::async_trait;

use crate::error::StorageError;
use crate::record::{OutcomeRecord, ScheduleSnapshotRecord, SessionRecord, UndoRecord};

/// The storage trait for Cadence persistence backends.
///
/// The engine itself never calls this: persistence is an external
/// collaborator, asynchronous from the engine's perspective. A backend
/// provides durable, transactional storage for session headers, the
/// append-only outcome log, the undo stack, and cached schedule
/// snapshots.
///
/// ## Snapshot Semantics
///
/// All mutating operations take `&mut Self::Snapshot`, a type representing
/// an in-progress transaction:
///
/// 1. `begin_snapshot()` — start a transaction
/// 2. Call mutating methods with `&mut snapshot`
/// 3. `commit_snapshot(snapshot)` — commit and consume,
///    OR `abort_snapshot(snapshot)` — roll back and consume
///
/// A `Snapshot` dropped without committing MUST be rolled back by the
/// backend (drop semantics on the underlying transaction).
///
/// ## OCC Conflict Detection
///
/// `update_session` is conditional on `version = expected_version`. If no
/// row matches, the method returns `StorageError::ConcurrentConflict`.
#[async_trait]
pub trait ProgramStorage: Send + Sync + 'static {
    /// The snapshot (transaction) type used by this backend.
    type Snapshot: Send;

    // ── Snapshot lifecycle ────────────────────────────────────────────

    async fn begin_snapshot(&self) -> Result<Self::Snapshot, StorageError>;

    async fn commit_snapshot(&self, snapshot: Self::Snapshot) -> Result<(), StorageError>;

    async fn abort_snapshot(&self, snapshot: Self::Snapshot) -> Result<(), StorageError>;

    // ── Session operations (within snapshot) ──────────────────────────

    /// Create a new session at version 0.
    ///
    /// Returns `Err(StorageError::AlreadyExists)` if the id is taken.
    async fn create_session(
        &self,
        snapshot: &mut Self::Snapshot,
        record: SessionRecord,
    ) -> Result<(), StorageError>;

    /// Apply a version-validated update to a session header (config edit,
    /// reset). Returns the new version number on success.
    async fn update_session(
        &self,
        snapshot: &mut Self::Snapshot,
        record: SessionRecord,
        expected_version: i64,
    ) -> Result<i64, StorageError>;

    /// Append an outcome record. The log is append-only: overwrites are
    /// recorded as a new outcome plus an undo record in the same snapshot.
    async fn insert_outcome(
        &self,
        snapshot: &mut Self::Snapshot,
        record: OutcomeRecord,
    ) -> Result<(), StorageError>;

    /// Remove an outcome (undo restoring a never-attempted state).
    async fn delete_outcome(
        &self,
        snapshot: &mut Self::Snapshot,
        session_id: &str,
        workout_index: u32,
        slot_id: &str,
    ) -> Result<(), StorageError>;

    /// Push an undo record.
    async fn insert_undo(
        &self,
        snapshot: &mut Self::Snapshot,
        record: UndoRecord,
    ) -> Result<(), StorageError>;

    /// Remove an undo record by id (popped, or evicted past the bound).
    async fn delete_undo(
        &self,
        snapshot: &mut Self::Snapshot,
        session_id: &str,
        undo_id: &str,
    ) -> Result<(), StorageError>;

    /// Replace the cached schedule snapshot for a session.
    async fn save_schedule_snapshot(
        &self,
        snapshot: &mut Self::Snapshot,
        record: ScheduleSnapshotRecord,
    ) -> Result<(), StorageError>;

    // ── Query operations (outside snapshot) ───────────────────────────

    /// Read a session header.
    ///
    /// Returns `Err(StorageError::SessionNotFound)` if it does not exist.
    async fn get_session(&self, session_id: &str) -> Result<SessionRecord, StorageError>;

    /// List a session's outcomes in (workout index, slot id) order.
    async fn list_outcomes(&self, session_id: &str) -> Result<Vec<OutcomeRecord>, StorageError>;

    /// List a session's undo stack, oldest first.
    async fn list_undo(&self, session_id: &str) -> Result<Vec<UndoRecord>, StorageError>;

    /// Read the latest cached schedule snapshot, if any.
    async fn get_schedule_snapshot(
        &self,
        session_id: &str,
    ) -> Result<Option<ScheduleSnapshotRecord>, StorageError>;
}
