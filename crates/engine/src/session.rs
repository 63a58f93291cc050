//! The session: result log, bounded undo stack, and the mutation entry
//! points that own them.
//!
//! All mutation is serialized through one `Session` owner. Every accepted
//! edit re-runs full replay and re-derives the changed flags against the
//! previous snapshot; there is no incremental-patch path to keep
//! consistent. A rejected edit mutates nothing.

use cadence_core::ProgramDefinition;

use crate::replay::{mark_changed, replay};
use crate::types::{Config, Outcome, OutcomeLog, SessionError, WorkoutRow};

/// Maximum retained undo entries; logging past the bound evicts the
/// oldest.
pub const UNDO_LIMIT: usize = 64;

/// One overwritten outcome, restorable by undo. `previous: None` records
/// that the target had not been attempted before the edit.
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub workout_index: u32,
    pub slot_id: String,
    pub previous: Option<Outcome>,
}

/// Owner of the (config, outcome log, undo stack) triple for one athlete's
/// run of a program. The definition is validated before a session is ever
/// created.
#[derive(Debug, Clone)]
pub struct Session {
    definition: ProgramDefinition,
    config: Config,
    outcomes: OutcomeLog,
    undo: Vec<UndoEntry>,
    rows: Vec<WorkoutRow>,
}

impl Session {
    /// Seed a fresh session: empty log, empty undo stack, initial replay.
    pub fn generate(definition: ProgramDefinition, config: Config) -> Self {
        let rows = replay(&definition, &config, &OutcomeLog::new());
        Session {
            definition,
            config,
            outcomes: OutcomeLog::new(),
            undo: Vec::new(),
            rows,
        }
    }

    /// Rebuild a session from persisted parts (log and undo stack come
    /// back from a storage backend).
    pub fn resume(
        definition: ProgramDefinition,
        config: Config,
        outcomes: OutcomeLog,
        undo: Vec<UndoEntry>,
    ) -> Self {
        let rows = replay(&definition, &config, &outcomes);
        Session {
            definition,
            config,
            outcomes,
            undo,
            rows,
        }
    }

    pub fn definition(&self) -> &ProgramDefinition {
        &self.definition
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn outcomes(&self) -> &OutcomeLog {
        &self.outcomes
    }

    pub fn undo_entries(&self) -> &[UndoEntry] {
        &self.undo
    }

    /// The latest materialized schedule.
    pub fn rows(&self) -> &[WorkoutRow] {
        &self.rows
    }

    /// Replace the config. Historical outcomes stay; projected weights
    /// re-derive from the new values and are flagged where they moved.
    pub fn update_config(&mut self, config: Config) {
        self.config = config;
        self.rerun();
    }

    /// Log an outcome for a slot occurrence. The previous outcome (possibly
    /// "never attempted") is pushed onto the undo stack.
    pub fn log_outcome(
        &mut self,
        workout_index: u32,
        slot_id: &str,
        outcome: Outcome,
    ) -> Result<(), SessionError> {
        self.check_target(workout_index, slot_id)?;

        let previous = self.outcomes.set(workout_index, slot_id, outcome);
        self.undo.push(UndoEntry {
            workout_index,
            slot_id: slot_id.to_string(),
            previous,
        });
        if self.undo.len() > UNDO_LIMIT {
            self.undo.remove(0);
        }
        self.rerun();
        Ok(())
    }

    /// Undo the most recent edit.
    pub fn undo_last(&mut self) -> Result<(), SessionError> {
        let entry = self.undo.pop().ok_or(SessionError::EmptyUndoStack)?;
        self.outcomes
            .restore(entry.workout_index, &entry.slot_id, entry.previous);
        self.rerun();
        Ok(())
    }

    /// Undo the most recent edit of a specific target, removing its entry
    /// from the middle of the stack without disturbing unrelated entries.
    pub fn undo_specific(&mut self, workout_index: u32, slot_id: &str) -> Result<(), SessionError> {
        let position = self
            .undo
            .iter()
            .rposition(|e| e.workout_index == workout_index && e.slot_id == slot_id)
            .ok_or_else(|| SessionError::NoUndoEntry {
                workout_index,
                slot_id: slot_id.to_string(),
            })?;
        let entry = self.undo.remove(position);
        self.outcomes
            .restore(entry.workout_index, &entry.slot_id, entry.previous);
        self.rerun();
        Ok(())
    }

    /// Clear the outcome log and undo stack, returning the program to its
    /// seeded-from-config state.
    pub fn reset_all(&mut self) {
        self.outcomes.clear();
        self.undo.clear();
        self.rerun();
    }

    /// An edit may only target a slot that actually occurs at the given
    /// workout index.
    fn check_target(&self, workout_index: u32, slot_id: &str) -> Result<(), SessionError> {
        let in_day = workout_index < self.definition.workouts_per_cycle
            && !self.definition.days.is_empty()
            && self
                .definition
                .day_for(workout_index)
                .slots
                .iter()
                .any(|s| s.id == slot_id);
        if in_day {
            Ok(())
        } else {
            Err(SessionError::UnknownTarget {
                workout_index,
                slot_id: slot_id.to_string(),
            })
        }
    }

    fn rerun(&mut self) {
        let mut next = replay(&self.definition, &self.config, &self.outcomes);
        mark_changed(&self.rows, &mut next);
        self.rows = next;
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
