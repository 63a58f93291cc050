//! Program definition model.
//!
//! A `ProgramDefinition` is the immutable, declarative description of a
//! training program: ordered days of slots, the config fields the athlete
//! fills in at generate time, and global cycle metadata. Definitions are
//! authored once, identified by a stable `id`, and carry an integer
//! `version` so a later revision of a program's rules never silently
//! reinterprets history recorded against an earlier one.
//!
//! The canonical serialization is camelCase JSON via serde; all decimal
//! values (weights, percentages, increments) serialize as strings.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Canonical format version written into serialized session records.
pub const FORMAT_VERSION: &str = "1.0";

// ──────────────────────────────────────────────
// Program / day
// ──────────────────────────────────────────────

/// A complete training program definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgramDefinition {
    pub id: String,
    pub name: String,
    pub version: u32,
    pub cycle_length_weeks: u32,
    pub workouts_per_cycle: u32,
    pub workouts_per_week: u32,
    pub inputs: Vec<ConfigField>,
    pub days: Vec<Day>,
}

impl ProgramDefinition {
    /// Parse a definition from canonical JSON.
    pub fn from_json(src: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(src)
    }

    /// The day used by the n-th materialized workout. Days repeat
    /// cyclically; callers guarantee `days` is non-empty (enforced by
    /// definition validation).
    pub fn day_for(&self, workout_index: u32) -> &Day {
        &self.days[workout_index as usize % self.days.len()]
    }

    /// Iterate every slot of every day in program order.
    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.days.iter().flat_map(|d| d.slots.iter())
    }

    /// Look up a slot by id anywhere in the program.
    pub fn slot(&self, slot_id: &str) -> Option<&Slot> {
        self.slots().find(|s| s.id == slot_id)
    }
}

/// One day template. Workout `n` uses `days[n % days.len()]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    pub name: String,
    pub slots: Vec<Slot>,
}

// ──────────────────────────────────────────────
// Config fields
// ──────────────────────────────────────────────

/// A user-configurable input declared by the program: the only source of
/// "starting" numeric state external to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConfigField {
    /// A numeric weight input (starting weight, training max, 1RM).
    /// Stored unrounded; rounding is applied per-use by each slot.
    #[serde(rename_all = "camelCase")]
    Weight {
        key: String,
        label: String,
        min: Decimal,
        step: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        group: Option<String>,
    },
    /// A choice among declared options (e.g. a program variant).
    #[serde(rename_all = "camelCase")]
    Choice {
        key: String,
        label: String,
        options: Vec<ChoiceOption>,
    },
}

impl ConfigField {
    pub fn key(&self) -> &str {
        match self {
            ConfigField::Weight { key, .. } => key,
            ConfigField::Choice { key, .. } => key,
        }
    }

    pub fn is_weight(&self) -> bool {
        matches!(self, ConfigField::Weight { .. })
    }
}

/// One selectable option of a choice field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceOption {
    pub label: String,
    pub value: String,
}

// ──────────────────────────────────────────────
// Slots
// ──────────────────────────────────────────────

/// Classification of a slot within its day. Drives which slots may write
/// shared reference values and which display RPE; `tier` remains a free
/// label with no engine semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Primary,
    Secondary,
    Accessory,
}

impl Role {
    /// Whether rows for this role surface RPE in the materialized output.
    pub fn displays_rpe(&self) -> bool {
        matches!(self, Role::Primary | Role::Secondary)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Role::Primary => "primary",
            Role::Secondary => "secondary",
            Role::Accessory => "accessory",
        })
    }
}

/// The unit of progression: one prescribed exercise occurrence within a
/// day, carrying exactly one progression mode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,
    pub exercise_id: String,
    pub exercise_name: String,
    pub tier: String,
    pub role: Role,
    /// Weight increment this slot rounds to (plate math). Unrounded config
    /// values are rounded per-use against this, never at storage time.
    #[serde(default = "default_rounding")]
    pub rounding: Decimal,
    pub progression: Progression,
}

fn default_rounding() -> Decimal {
    Decimal::new(25, 1) // 2.5
}

/// A slot's progression mode. Closed union: a slot is a stage ladder, a
/// prescription ladder, or a GPP (pass/fail only) entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Progression {
    StageLadder(StageLadder),
    PrescriptionLadder(PrescriptionLadder),
    Gpp,
}

/// Stage-ladder progression: an ordered rep/set ladder walked by a per-slot
/// state machine keyed on logged outcomes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StageLadder {
    /// Ordered, at least one entry (enforced by definition validation).
    pub stages: Vec<Stage>,
    /// Config entry seeding the slot's tracked weight at workout 0.
    pub start_weight: WeightRef,
    /// When present, the slot's working weight is a percentage of this
    /// shared training max instead of its own tracked weight.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_max: Option<TrainingMaxRef>,
    pub on_success: RuleAction,
    pub on_mid_stage_fail: RuleAction,
    pub on_final_stage_fail: RuleAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_final_stage_success: Option<RuleAction>,
    /// Applied when an occurrence has no logged result yet. Defaults to
    /// `no_change` so future projections stay stable until logged.
    #[serde(default)]
    pub on_undefined: RuleAction,
}

impl StageLadder {
    /// The key this ladder writes when an `update_tm` action fires: the
    /// declared training max when present, otherwise the start-weight key.
    pub fn write_key(&self) -> &str {
        match &self.training_max {
            Some(tm) => &tm.key,
            None => &self.start_weight.key,
        }
    }

    /// Whether any transition rule of this ladder is `update_tm`.
    pub fn writes_reference(&self) -> bool {
        self.rules().any(|r| matches!(r, RuleAction::UpdateTm { .. }))
    }

    /// Iterate all transition rules, including the optional one.
    pub fn rules(&self) -> impl Iterator<Item = &RuleAction> {
        [
            Some(&self.on_success),
            Some(&self.on_mid_stage_fail),
            Some(&self.on_final_stage_fail),
            self.on_final_stage_success.as_ref(),
            Some(&self.on_undefined),
        ]
        .into_iter()
        .flatten()
    }
}

/// One rung of a stage ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub sets: u32,
    pub reps: u32,
    /// Last set is "as many reps as possible"; the logged rep count can
    /// gate training-max updates.
    #[serde(default)]
    pub amrap: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps_max: Option<u32>,
}

/// Names the config entry a slot's tracked weight is seeded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeightRef {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiplier: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Decimal>,
}

/// Names the shared training max a slot's working weight derives from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingMaxRef {
    pub key: String,
    pub percent: Decimal,
}

/// Prescription-ladder progression: a fixed percent ladder over a shared
/// reference value. Stateless; the last entry is the working set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrescriptionLadder {
    /// Config key holding the reference 1RM / training max.
    pub percent_of: String,
    /// Ordered; earlier entries are warm-ups, the last is the working set.
    pub prescriptions: Vec<Prescription>,
}

/// One entry of a prescription ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prescription {
    pub percent: Decimal,
    pub reps: u32,
    pub sets: u32,
}

// ──────────────────────────────────────────────
// Transition rules
// ──────────────────────────────────────────────

/// A transition rule action. Closed enum: the interpreter matches
/// exhaustively, so a new action kind is a compile-time exercise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleAction {
    /// Carry `(weight, stage)` forward unchanged.
    NoChange,
    /// Move to the next stage, weight unchanged. Capped at the final stage.
    AdvanceStage,
    /// Add a fixed increment to the tracked weight.
    #[serde(rename_all = "camelCase")]
    AddWeight { amount: Decimal },
    /// Add a fixed increment and reset to stage 0.
    #[serde(rename_all = "camelCase")]
    AddWeightResetStage { amount: Decimal },
    /// Write `amount` into the slot's declared reference key. When
    /// `min_amrap_reps` is set, applies only if the materialized stage is
    /// AMRAP and the logged rep count meets the threshold.
    #[serde(rename_all = "camelCase")]
    UpdateTm {
        amount: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min_amrap_reps: Option<u32>,
    },
    /// Multiplicative reduction of the tracked weight; resets to stage 0.
    #[serde(rename_all = "camelCase")]
    DeloadPercent { percent: Decimal },
}

impl Default for RuleAction {
    fn default() -> Self {
        RuleAction::NoChange
    }
}

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

    const MINIMAL: &str = r#"{
        "id": "lp_a",
        "name": "Linear A",
        "version": 1,
        "cycleLengthWeeks": 4,
        "workoutsPerCycle": 12,
        "workoutsPerWeek": 3,
        "inputs": [
            { "kind": "weight", "key": "squat_start", "label": "Squat start",
              "min": "20", "step": "2.5" },
            { "kind": "choice", "key": "unit", "label": "Unit",
              "options": [ { "label": "kg", "value": "kg" } ] }
        ],
        "days": [
            { "name": "A", "slots": [
                { "id": "a_squat", "exerciseId": "squat",
                  "exerciseName": "Back Squat", "tier": "T1",
                  "role": "primary",
                  "progression": {
                      "mode": "stage_ladder",
                      "stages": [ { "sets": 5, "reps": 3 },
                                  { "sets": 6, "reps": 2 },
                                  { "sets": 10, "reps": 1, "amrap": true } ],
                      "startWeight": { "key": "squat_start" },
                      "onSuccess": { "type": "add_weight", "amount": "5" },
                      "onMidStageFail": { "type": "advance_stage" },
                      "onFinalStageFail": { "type": "deload_percent", "percent": "10" }
                  } }
            ] }
        ]
    }"#;

    #[test]
    fn parse_minimal_definition() {
        let def = ProgramDefinition::from_json(MINIMAL).unwrap();
        assert_eq!(def.id, "lp_a");
        assert_eq!(def.version, 1);
        assert_eq!(def.days.len(), 1);
        let slot = def.slot("a_squat").unwrap();
        assert_eq!(slot.role, Role::Primary);
        // Default increment applies when omitted.
        assert_eq!(slot.rounding, dec("2.5"));
        match &slot.progression {
            Progression::StageLadder(ladder) => {
                assert_eq!(ladder.stages.len(), 3);
                assert!(ladder.stages[2].amrap);
                // Omitted onUndefined defaults to no_change.
                assert_eq!(ladder.on_undefined, RuleAction::NoChange);
                assert_eq!(
                    ladder.on_success,
                    RuleAction::AddWeight { amount: dec("5") }
                );
                assert_eq!(ladder.write_key(), "squat_start");
            }
            other => panic!("expected stage ladder, got {:?}", other),
        }
    }

    #[test]
    fn parse_prescription_ladder_slot() {
        let src = r#"{
            "id": "comp_bench", "exerciseId": "bench",
            "exerciseName": "Bench Press", "tier": "T1", "role": "primary",
            "progression": {
                "mode": "prescription_ladder",
                "percentOf": "bench1rm",
                "prescriptions": [
                    { "percent": "50", "reps": 5, "sets": 1 },
                    { "percent": "75", "reps": 3, "sets": 4 }
                ]
            }
        }"#;
        let slot: Slot = serde_json::from_str(src).unwrap();
        match &slot.progression {
            Progression::PrescriptionLadder(p) => {
                assert_eq!(p.percent_of, "bench1rm");
                assert_eq!(p.prescriptions.last().unwrap().sets, 4);
            }
            other => panic!("expected prescription ladder, got {:?}", other),
        }
    }

    #[test]
    fn parse_gpp_slot() {
        let src = r#"{
            "id": "cond", "exerciseId": "carry", "exerciseName": "Carries",
            "tier": "GPP", "role": "accessory",
            "progression": { "mode": "gpp" }
        }"#;
        let slot: Slot = serde_json::from_str(src).unwrap();
        assert_eq!(slot.progression, Progression::Gpp);
    }

    #[test]
    fn rule_action_round_trips() {
        let actions = vec![
            RuleAction::NoChange,
            RuleAction::AdvanceStage,
            RuleAction::AddWeight { amount: dec("2.5") },
            RuleAction::AddWeightResetStage { amount: dec("5") },
            RuleAction::UpdateTm {
                amount: dec("5"),
                min_amrap_reps: Some(3),
            },
            RuleAction::DeloadPercent { percent: dec("10") },
        ];
        for action in actions {
            let json = serde_json::to_string(&action).unwrap();
            let back: RuleAction = serde_json::from_str(&json).unwrap();
            assert_eq!(back, action);
        }
    }

    #[test]
    fn update_tm_tag_shape() {
        let json = serde_json::to_value(RuleAction::UpdateTm {
            amount: dec("2.5"),
            min_amrap_reps: Some(5),
        })
        .unwrap();
        assert_eq!(json["type"], "update_tm");
        assert_eq!(json["amount"], "2.5");
        assert_eq!(json["minAmrapReps"], 5);
    }

    #[test]
    fn day_for_wraps_cyclically() {
        let mut def = ProgramDefinition::from_json(MINIMAL).unwrap();
        def.days.push(Day {
            name: "B".to_string(),
            slots: vec![],
        });
        assert_eq!(def.day_for(0).name, "A");
        assert_eq!(def.day_for(1).name, "B");
        assert_eq!(def.day_for(4).name, "A");
    }

    #[test]
    fn write_key_prefers_training_max() {
        let ladder = StageLadder {
            stages: vec![Stage {
                sets: 3,
                reps: 5,
                amrap: false,
                reps_max: None,
            }],
            start_weight: WeightRef {
                key: "press_start".to_string(),
                multiplier: None,
                offset: None,
            },
            training_max: Some(TrainingMaxRef {
                key: "press_tm".to_string(),
                percent: dec("85"),
            }),
            on_success: RuleAction::NoChange,
            on_mid_stage_fail: RuleAction::NoChange,
            on_final_stage_fail: RuleAction::NoChange,
            on_final_stage_success: None,
            on_undefined: RuleAction::NoChange,
        };
        assert_eq!(ladder.write_key(), "press_tm");
        assert!(!ladder.writes_reference());
    }
}
