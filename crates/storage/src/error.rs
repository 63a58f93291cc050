/// All errors that can be returned by a ProgramStorage implementation.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// No session record with the given id.
    #[error("session not found: {session_id}")]
    SessionNotFound { session_id: String },

    /// A session record with this id already exists.
    #[error("session already exists: {session_id}")]
    AlreadyExists { session_id: String },

    /// Optimistic concurrency conflict — another writer moved the session
    /// past the expected version.
    #[error("concurrent conflict on session {session_id}: expected version {expected_version}")]
    ConcurrentConflict {
        session_id: String,
        expected_version: i64,
    },

    /// A backend-specific storage error (DB connection, serialization, etc.).
    #[error("storage backend error: {0}")]
    Backend(String),
}
