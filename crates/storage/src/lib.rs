mod error;
mod record;
mod traits;

pub use error::StorageError;
pub use record::{OutcomeRecord, ScheduleSnapshotRecord, SessionRecord, UndoRecord};
pub use traits::ProgramStorage;
