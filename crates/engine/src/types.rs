//! Runtime types for the progression engine.
//!
//! These are DISTINCT from the cadence-core definition types: the engine
//! consumes a validated `ProgramDefinition` plus a typed `Config` and an
//! `OutcomeLog`, and produces materialized `WorkoutRow`s. All weights are
//! `rust_decimal::Decimal` -- never `f64` -- and all maps are `BTreeMap`
//! so iteration order, and with it replay output, is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use cadence_core::Role;

// ──────────────────────────────────────────────
// Config
// ──────────────────────────────────────────────

/// A typed, validated config value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigValue {
    /// Stored unrounded; rounding is applied per-use because different
    /// slots referencing the same key round to different increments.
    Weight { value: Decimal },
    Choice { value: String },
}

/// The athlete's configuration record. Produced only by
/// [`crate::validate_config`]; never assembled field-by-field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub values: BTreeMap<String, ConfigValue>,
}

impl Config {
    pub fn new() -> Self {
        Config {
            values: BTreeMap::new(),
        }
    }

    pub fn weight(&self, key: &str) -> Option<Decimal> {
        match self.values.get(key) {
            Some(ConfigValue::Weight { value }) => Some(*value),
            _ => None,
        }
    }

    pub fn choice(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(ConfigValue::Choice { value }) => Some(value),
            _ => None,
        }
    }

    /// All weight entries, in key order. Seeds the replay engine's shared
    /// reference values.
    pub fn weights(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.values.iter().filter_map(|(k, v)| match v {
            ConfigValue::Weight { value } => Some((k.as_str(), *value)),
            ConfigValue::Choice { .. } => None,
        })
    }
}

/// Why a single raw config field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigError {
    Missing,
    NotANumber { value: String },
    BelowMin { min: String },
    AboveCeiling { ceiling: String },
    UnknownOption { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing => write!(f, "value is required"),
            ConfigError::NotANumber { value } => {
                write!(f, "'{}' is not a number", value)
            }
            ConfigError::BelowMin { min } => write!(f, "below the minimum of {}", min),
            ConfigError::AboveCeiling { ceiling } => {
                write!(f, "above the ceiling of {}", ceiling)
            }
            ConfigError::UnknownOption { value } => {
                write!(f, "'{}' is not one of the declared options", value)
            }
        }
    }
}

/// Field-indexed validation errors. Either the whole config is accepted or
/// none of it: a non-empty map rejects the submission atomically.
pub type FieldErrors = BTreeMap<String, ConfigError>;

// ──────────────────────────────────────────────
// Outcomes
// ──────────────────────────────────────────────

/// The logged result of an attempted slot occurrence. Absence from the log
/// means "not yet attempted", which is distinct from a fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiftResult {
    Success,
    Fail,
}

/// One logged outcome for a (workout, slot) occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub result: LiftResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amrap_reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl Outcome {
    pub fn success() -> Self {
        Outcome {
            result: LiftResult::Success,
            amrap_reps: None,
            rpe: None,
            note: None,
        }
    }

    pub fn fail() -> Self {
        Outcome {
            result: LiftResult::Fail,
            amrap_reps: None,
            rpe: None,
            note: None,
        }
    }

    pub fn with_amrap(mut self, reps: u32) -> Self {
        self.amrap_reps = Some(reps);
        self
    }
}

/// Append-only record of logged outcomes keyed by (workout index, slot id).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutcomeLog {
    entries: BTreeMap<(u32, String), Outcome>,
}

impl OutcomeLog {
    pub fn new() -> Self {
        OutcomeLog {
            entries: BTreeMap::new(),
        }
    }

    pub fn get(&self, workout_index: u32, slot_id: &str) -> Option<&Outcome> {
        self.entries.get(&(workout_index, slot_id.to_string()))
    }

    /// Write an outcome, returning the previous one if any.
    pub fn set(&mut self, workout_index: u32, slot_id: &str, outcome: Outcome) -> Option<Outcome> {
        self.entries
            .insert((workout_index, slot_id.to_string()), outcome)
    }

    /// Remove an outcome, returning it if present.
    pub fn remove(&mut self, workout_index: u32, slot_id: &str) -> Option<Outcome> {
        self.entries.remove(&(workout_index, slot_id.to_string()))
    }

    /// Restore a previous state: `Some` writes, `None` removes.
    pub fn restore(&mut self, workout_index: u32, slot_id: &str, previous: Option<Outcome>) {
        match previous {
            Some(outcome) => {
                self.set(workout_index, slot_id, outcome);
            }
            None => {
                self.remove(workout_index, slot_id);
            }
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in (workout, slot) order.
    pub fn entries(&self) -> impl Iterator<Item = (u32, &str, &Outcome)> {
        self.entries
            .iter()
            .map(|((w, s), o)| (*w, s.as_str(), o))
    }
}

// ──────────────────────────────────────────────
// Materialized output
// ──────────────────────────────────────────────

/// One fully materialized workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkoutRow {
    pub index: u32,
    pub day_name: String,
    pub slots: Vec<SlotRow>,
}

/// One materialized slot occurrence within a workout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotRow {
    pub slot_id: String,
    pub exercise_name: String,
    pub tier: String,
    pub role: Role,
    /// Always an exact multiple of the slot's increment. `None` for GPP
    /// and unresolved rows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<Decimal>,
    pub stage: u32,
    pub sets: u32,
    pub reps: u32,
    pub is_amrap: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<LiftResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amrap_reps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rpe: Option<Decimal>,
    /// Set by [`crate::mark_changed`] when this occurrence's weight moved
    /// relative to the previous replay snapshot. Display hint only.
    pub is_changed: bool,
    /// This occurrence's state was produced by a deload.
    pub is_deload: bool,
    pub is_gpp: bool,
    /// Full warm-up ladder for prescription slots; the last entry is the
    /// working set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescriptions: Option<Vec<PrescribedSet>>,
    /// A definition/config mismatch for this slot; the rest of the
    /// schedule still renders.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unresolved: Option<String>,
}

/// One materialized entry of a prescription ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescribedSet {
    pub percent: Decimal,
    pub weight: Decimal,
    pub reps: u32,
    pub sets: u32,
}

// ──────────────────────────────────────────────
// Session errors
// ──────────────────────────────────────────────

/// Rejections from session mutation entry points. A rejected edit mutates
/// nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The (workout index, slot id) target does not exist in the program.
    UnknownTarget { workout_index: u32, slot_id: String },
    /// Undo requested with an empty undo stack.
    EmptyUndoStack,
    /// No undo entry recorded for the given target.
    NoUndoEntry { workout_index: u32, slot_id: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::UnknownTarget {
                workout_index,
                slot_id,
            } => write!(
                f,
                "no slot '{}' at workout {} in this program",
                slot_id, workout_index
            ),
            SessionError::EmptyUndoStack => write!(f, "nothing to undo"),
            SessionError::NoUndoEntry {
                workout_index,
                slot_id,
            } => write!(
                f,
                "no undo entry for slot '{}' at workout {}",
                slot_id, workout_index
            ),
        }
    }
}

impl std::error::Error for SessionError {}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn config_weight_lookup() {
        let mut config = Config::new();
        config.values.insert(
            "squat_start".to_string(),
            ConfigValue::Weight { value: dec("62.5") },
        );
        config.values.insert(
            "units".to_string(),
            ConfigValue::Choice {
                value: "kg".to_string(),
            },
        );
        assert_eq!(config.weight("squat_start"), Some(dec("62.5")));
        assert_eq!(config.weight("units"), None);
        assert_eq!(config.choice("units"), Some("kg"));
        let weights: Vec<_> = config.weights().collect();
        assert_eq!(weights, vec![("squat_start", dec("62.5"))]);
    }

    #[test]
    fn outcome_log_set_returns_previous() {
        let mut log = OutcomeLog::new();
        assert_eq!(log.set(0, "a_squat", Outcome::success()), None);
        let prev = log.set(0, "a_squat", Outcome::fail());
        assert_eq!(prev, Some(Outcome::success()));
        assert_eq!(log.get(0, "a_squat"), Some(&Outcome::fail()));
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn outcome_log_restore_none_removes() {
        let mut log = OutcomeLog::new();
        log.set(3, "b_press", Outcome::success().with_amrap(7));
        log.restore(3, "b_press", None);
        assert!(log.is_empty());
    }

    #[test]
    fn outcome_serde_shape() {
        let outcome = Outcome::success().with_amrap(8);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["result"], "success");
        assert_eq!(json["amrapReps"], 8);
        assert!(json.get("rpe").is_none());
    }

    #[test]
    fn session_error_display() {
        let err = SessionError::UnknownTarget {
            workout_index: 9,
            slot_id: "nope".to_string(),
        };
        assert_eq!(err.to_string(), "no slot 'nope' at workout 9 in this program");
    }
}
