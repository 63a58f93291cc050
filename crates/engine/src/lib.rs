//! cadence-engine: the progression engine.
//!
//! Consumes a validated program definition, a typed config and an
//! append-only outcome log, and materializes the full schedule of
//! prescribed weights deterministically. Edits (a new result, a config
//! change, an undo) are handled by re-running replay from scratch over
//! the full inputs -- there is no incremental-patch code path.
//!
//! # Public API
//!
//! - [`validate_config()`] -- raw input to typed [`Config`], atomic
//! - [`replay()`] -- (definition, config, log) to materialized rows
//! - [`mark_changed()`] -- derived diff against a previous snapshot
//! - [`Session`] -- result log + bounded undo stack + mutation entry
//!   points ([`Session::log_outcome`], [`Session::undo_last`],
//!   [`Session::undo_specific`], [`Session::reset_all`],
//!   [`Session::update_config`])

pub mod config;
pub mod replay;
pub mod rounding;
pub mod session;
pub mod slot;
pub mod types;

pub use config::{validate_config, WEIGHT_CEILING};
pub use replay::{mark_changed, replay};
pub use session::{Session, UndoEntry, UNDO_LIMIT};
pub use types::{
    Config, ConfigError, ConfigValue, FieldErrors, LiftResult, Outcome, OutcomeLog, PrescribedSet,
    SessionError, SlotRow, WorkoutRow,
};

// ──────────────────────────────────────────────
// Integration tests
// ──────────────────────────────────────────────
