//! The stage-ladder slot state machine.
//!
//! State carried across a slot's occurrences is `(weight, stage)`, seeded
//! from config at workout 0. Each occurrence materializes its prescription
//! BEFORE its own outcome is consulted, then transitions for the next
//! occurrence AFTER: success applies the success rule, a mid-stage fail
//! advances down the ladder, a final-stage fail applies the final rule
//! (commonly a deload back to stage 0), and an unlogged occurrence carries
//! state forward unchanged so projections stay stable until actually
//! logged.
//!
//! Training-max-backed slots carry no weight of their own: their working
//! weight derives from a shared reference value each occurrence, and the
//! only way they move weight is an `update_tm` write against that
//! reference, applied by the replay engine at the workout boundary.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use cadence_core::{RuleAction, Stage, StageLadder};

use crate::rounding::{apply_deload, percent_of, round_to_increment};
use crate::types::{LiftResult, Outcome};

/// Shared reference values (training maxes, 1RMs), keyed by config key.
/// Seeded from config weights; mutated only by reference writes.
pub type RefValues = BTreeMap<String, Decimal>;

/// Per-slot state carried between occurrences.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotState {
    /// Tracked weight, unrounded. Unused for training-max-backed slots.
    pub weight: Decimal,
    pub stage: usize,
    /// The last transition was a deload; surfaces as `isDeload` on the
    /// occurrence materialized from this state.
    pub deloaded: bool,
}

/// A deferred write against a shared reference value. Applied by the
/// replay engine after all of the workout's slots have materialized, so
/// the write is visible from the next workout onward.
#[derive(Debug, Clone, PartialEq)]
pub struct RefWrite {
    pub key: String,
    pub delta: Decimal,
}

/// Seed a ladder's state from the shared reference values.
///
/// Fails with the unresolved key when the config is missing the entry the
/// definition names -- reported per slot by the replay engine, never
/// aborting the rest of the program.
pub fn seed_state(ladder: &StageLadder, refs: &RefValues) -> Result<SlotState, String> {
    if let Some(tm) = &ladder.training_max {
        if !refs.contains_key(&tm.key) {
            return Err(format!("training max '{}' not present in config", tm.key));
        }
        return Ok(SlotState {
            weight: Decimal::ZERO,
            stage: 0,
            deloaded: false,
        });
    }

    let base = refs
        .get(&ladder.start_weight.key)
        .copied()
        .ok_or_else(|| {
            format!(
                "start weight '{}' not present in config",
                ladder.start_weight.key
            )
        })?;
    let multiplier = ladder.start_weight.multiplier.unwrap_or(Decimal::ONE);
    let offset = ladder.start_weight.offset.unwrap_or(Decimal::ZERO);
    Ok(SlotState {
        weight: base * multiplier + offset,
        stage: 0,
        deloaded: false,
    })
}

/// The stage materialized for the current occurrence. A stage index past
/// the end clamps to the final stage.
pub fn current_stage<'a>(ladder: &'a StageLadder, state: &SlotState) -> &'a Stage {
    let idx = state.stage.min(ladder.stages.len() - 1);
    &ladder.stages[idx]
}

/// The working weight for the current occurrence, rounded to the slot's
/// increment. `None` when a training-max-backed slot's reference has gone
/// missing from the config.
pub fn working_weight(
    ladder: &StageLadder,
    state: &SlotState,
    refs: &RefValues,
    increment: Decimal,
) -> Option<Decimal> {
    let raw = match &ladder.training_max {
        Some(tm) => percent_of(*refs.get(&tm.key)?, tm.percent),
        None => state.weight,
    };
    Some(round_to_increment(raw, increment))
}

/// Transition the slot's state for the next occurrence, given this
/// occurrence's logged outcome (or `None` when not yet attempted).
///
/// Returns the next state plus an optional deferred reference write.
pub fn transition(
    ladder: &StageLadder,
    state: &SlotState,
    outcome: Option<&Outcome>,
) -> (SlotState, Option<RefWrite>) {
    let is_final = state.stage + 1 >= ladder.stages.len();
    let rule = match outcome.map(|o| o.result) {
        None => &ladder.on_undefined,
        Some(LiftResult::Success) if is_final => ladder
            .on_final_stage_success
            .as_ref()
            .unwrap_or(&ladder.on_success),
        Some(LiftResult::Success) => &ladder.on_success,
        Some(LiftResult::Fail) if is_final => &ladder.on_final_stage_fail,
        Some(LiftResult::Fail) => &ladder.on_mid_stage_fail,
    };
    apply_action(ladder, state, rule, outcome)
}

/// The exhaustive action interpreter. Adding a new action kind is a
/// compile-time exercise: every arm must be handled here.
fn apply_action(
    ladder: &StageLadder,
    state: &SlotState,
    action: &RuleAction,
    outcome: Option<&Outcome>,
) -> (SlotState, Option<RefWrite>) {
    let carried = SlotState {
        deloaded: false,
        ..state.clone()
    };
    match action {
        RuleAction::NoChange => (carried, None),
        RuleAction::AdvanceStage => (
            SlotState {
                stage: (state.stage + 1).min(ladder.stages.len() - 1),
                ..carried
            },
            None,
        ),
        RuleAction::AddWeight { amount } => (
            SlotState {
                weight: state.weight + *amount,
                ..carried
            },
            None,
        ),
        RuleAction::AddWeightResetStage { amount } => (
            SlotState {
                weight: state.weight + *amount,
                stage: 0,
                ..carried
            },
            None,
        ),
        RuleAction::UpdateTm {
            amount,
            min_amrap_reps,
        } => {
            // The ladder restarts on the updated reference; the write
            // itself is gated on the AMRAP rep count when a threshold is
            // declared.
            let next = SlotState { stage: 0, ..carried };
            let gate_passed = match min_amrap_reps {
                None => true,
                Some(min) => {
                    current_stage(ladder, state).amrap
                        && outcome
                            .and_then(|o| o.amrap_reps)
                            .is_some_and(|reps| reps >= *min)
                }
            };
            let write = gate_passed.then(|| RefWrite {
                key: ladder.write_key().to_string(),
                delta: *amount,
            });
            (next, write)
        }
        RuleAction::DeloadPercent { percent } => (
            SlotState {
                weight: apply_deload(state.weight, *percent),
                stage: 0,
                deloaded: true,
            },
            None,
        ),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{TrainingMaxRef, WeightRef};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn stage(sets: u32, reps: u32, amrap: bool) -> Stage {
        Stage {
            sets,
            reps,
            amrap,
            reps_max: None,
        }
    }

    fn ladder() -> StageLadder {
        StageLadder {
            stages: vec![stage(5, 3, false), stage(6, 2, false), stage(10, 1, true)],
            start_weight: WeightRef {
                key: "squat_start".to_string(),
                multiplier: None,
                offset: None,
            },
            training_max: None,
            on_success: RuleAction::AddWeight { amount: dec("5") },
            on_mid_stage_fail: RuleAction::AdvanceStage,
            on_final_stage_fail: RuleAction::DeloadPercent { percent: dec("10") },
            on_final_stage_success: None,
            on_undefined: RuleAction::NoChange,
        }
    }

    fn refs(pairs: &[(&str, &str)]) -> RefValues {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), dec(v)))
            .collect()
    }

    #[test]
    fn seeds_from_start_weight() {
        let state = seed_state(&ladder(), &refs(&[("squat_start", "60")])).unwrap();
        assert_eq!(state.weight, dec("60"));
        assert_eq!(state.stage, 0);
    }

    #[test]
    fn seeds_with_multiplier_and_offset() {
        let mut l = ladder();
        l.start_weight.multiplier = Some(dec("0.85"));
        l.start_weight.offset = Some(dec("-2.5"));
        let state = seed_state(&l, &refs(&[("squat_start", "100")])).unwrap();
        assert_eq!(state.weight, dec("82.5"));
    }

    #[test]
    fn seed_reports_missing_key() {
        let err = seed_state(&ladder(), &refs(&[])).unwrap_err();
        assert!(err.contains("squat_start"));
    }

    #[test]
    fn fail_walks_down_the_ladder_then_deloads() {
        let l = ladder();
        let mut state = seed_state(&l, &refs(&[("squat_start", "60")])).unwrap();
        let fail = Outcome::fail();

        // Stage 0 -> 1 -> 2, weight untouched.
        for expected_stage in [1usize, 2] {
            let (next, write) = transition(&l, &state, Some(&fail));
            assert_eq!(next.stage, expected_stage);
            assert_eq!(next.weight, dec("60"));
            assert!(write.is_none());
            state = next;
        }

        // Final-stage fail: 10% deload, back to stage 0.
        let (next, write) = transition(&l, &state, Some(&fail));
        assert!(write.is_none());
        assert_eq!(next.stage, 0);
        assert_eq!(next.weight, dec("54.0"));
        assert!(next.deloaded);
    }

    #[test]
    fn success_adds_weight_and_keeps_stage() {
        let l = ladder();
        let state = seed_state(&l, &refs(&[("squat_start", "60")])).unwrap();
        let (next, write) = transition(&l, &state, Some(&Outcome::success()));
        assert_eq!(next.weight, dec("65"));
        assert_eq!(next.stage, 0);
        assert!(write.is_none());
    }

    #[test]
    fn undefined_outcome_carries_state_forward() {
        let l = ladder();
        let state = SlotState {
            weight: dec("72.5"),
            stage: 1,
            deloaded: false,
        };
        let (next, write) = transition(&l, &state, None);
        assert_eq!(next, state);
        assert!(write.is_none());
    }

    #[test]
    fn deloaded_flag_clears_on_next_transition() {
        let l = ladder();
        let state = SlotState {
            weight: dec("54"),
            stage: 0,
            deloaded: true,
        };
        let (next, _) = transition(&l, &state, None);
        assert!(!next.deloaded);
    }

    fn tm_ladder() -> StageLadder {
        StageLadder {
            stages: vec![stage(5, 5, false), stage(5, 3, true)],
            start_weight: WeightRef {
                key: "press_tm".to_string(),
                multiplier: None,
                offset: None,
            },
            training_max: Some(TrainingMaxRef {
                key: "press_tm".to_string(),
                percent: dec("85"),
            }),
            on_success: RuleAction::NoChange,
            on_mid_stage_fail: RuleAction::AdvanceStage,
            on_final_stage_fail: RuleAction::UpdateTm {
                amount: dec("-5"),
                min_amrap_reps: None,
            },
            on_final_stage_success: Some(RuleAction::UpdateTm {
                amount: dec("2.5"),
                min_amrap_reps: Some(5),
            }),
            on_undefined: RuleAction::NoChange,
        }
    }

    #[test]
    fn tm_backed_weight_derives_from_reference() {
        let l = tm_ladder();
        let state = seed_state(&l, &refs(&[("press_tm", "60")])).unwrap();
        // 60 × 85% = 51, rounded to 1.25 -> 51.25.
        let w = working_weight(&l, &state, &refs(&[("press_tm", "60")]), dec("1.25"));
        assert_eq!(w, Some(dec("51.25")));
    }

    #[test]
    fn update_tm_gate_passes_at_threshold() {
        let l = tm_ladder();
        let state = SlotState {
            weight: Decimal::ZERO,
            stage: 1,
            deloaded: false,
        };
        let outcome = Outcome::success().with_amrap(5);
        let (next, write) = transition(&l, &state, Some(&outcome));
        assert_eq!(next.stage, 0);
        assert_eq!(
            write,
            Some(RefWrite {
                key: "press_tm".to_string(),
                delta: dec("2.5"),
            })
        );
    }

    #[test]
    fn update_tm_gate_blocks_below_threshold() {
        let l = tm_ladder();
        let state = SlotState {
            weight: Decimal::ZERO,
            stage: 1,
            deloaded: false,
        };
        let outcome = Outcome::success().with_amrap(4);
        let (next, write) = transition(&l, &state, Some(&outcome));
        // The ladder still restarts, but the reference does not move.
        assert_eq!(next.stage, 0);
        assert!(write.is_none());
    }

    #[test]
    fn update_tm_without_gate_is_unconditional() {
        let l = tm_ladder();
        let state = SlotState {
            weight: Decimal::ZERO,
            stage: 1,
            deloaded: false,
        };
        let (_, write) = transition(&l, &state, Some(&Outcome::fail()));
        assert_eq!(
            write,
            Some(RefWrite {
                key: "press_tm".to_string(),
                delta: dec("-5"),
            })
        );
    }

    #[test]
    fn advance_stage_caps_at_final() {
        let l = ladder();
        let state = SlotState {
            weight: dec("60"),
            stage: 2,
            deloaded: false,
        };
        let (next, _) = apply_action(&l, &state, &RuleAction::AdvanceStage, None);
        assert_eq!(next.stage, 2);
    }
}
