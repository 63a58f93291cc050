//! cadence-core: program definition model and load-time validation.
//!
//! A program definition is the declarative description of a training
//! program — ordered days of slots, user-configurable inputs, cycle
//! metadata — serialized as canonical camelCase JSON. This crate owns the
//! model types and the validation pass that catches dangling references,
//! duplicate ids and ill-formed progression rules before the engine ever
//! replays anything.
//!
//! # Public API
//!
//! - [`ProgramDefinition`] and its parts ([`Day`], [`Slot`],
//!   [`Progression`], [`RuleAction`], [`ConfigField`])
//! - [`validate_definition()`] — the load-time validation pass
//! - [`DefinitionError`] — per-construct validation error record

pub mod definition;
pub mod error;
pub mod validate;

pub use definition::{
    ChoiceOption, ConfigField, Day, Prescription, PrescriptionLadder, ProgramDefinition,
    Progression, Role, RuleAction, Slot, Stage, StageLadder, TrainingMaxRef, WeightRef,
    FORMAT_VERSION,
};
pub use error::DefinitionError;
pub use validate::validate_definition;
