//! Full-program replay.
//!
//! `replay` walks workouts `0..workoutsPerCycle`, expanding each day's
//! slots into materialized rows. It is a pure function of (definition,
//! config, outcome log): no state survives between calls, which is what
//! makes undo and config edits safe -- every edit is handled by re-running
//! replay from scratch, never by patching forward.
//!
//! Invariant: within a workout index, ALL slots materialize from the
//! current state (reads) before ANY transition applies (writes). A shared
//! reference written at workout k is therefore visible from workout k+1
//! onward for every slot reading that key, regardless of slot order
//! within the day.

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use cadence_core::{ProgramDefinition, Progression, Slot};

use crate::rounding::{percent_of, round_to_increment};
use crate::slot::{self, RefValues, RefWrite, SlotState};
use crate::types::{Config, Outcome, OutcomeLog, PrescribedSet, SlotRow, WorkoutRow};

/// Materialize the full schedule. Pure and deterministic: same inputs,
/// same output, independent of prior calls.
pub fn replay(def: &ProgramDefinition, config: &Config, outcomes: &OutcomeLog) -> Vec<WorkoutRow> {
    // A day-less program is a definition error caught at load; render
    // nothing rather than divide by zero on the day cycle.
    if def.days.is_empty() {
        return Vec::new();
    }

    let mut refs: RefValues = config
        .weights()
        .map(|(k, v)| (k.to_string(), v))
        .collect();

    // Seed every stage-ladder slot's state up front, from the initial
    // reference values. A slot whose reference is missing materializes as
    // unresolved at every occurrence; the rest of the program renders.
    let mut states: BTreeMap<&str, Result<SlotState, String>> = BTreeMap::new();
    for s in def.slots() {
        if let Progression::StageLadder(ladder) = &s.progression {
            states.insert(s.id.as_str(), slot::seed_state(ladder, &refs));
        }
    }

    let mut rows = Vec::with_capacity(def.workouts_per_cycle as usize);
    for index in 0..def.workouts_per_cycle {
        let day = def.day_for(index);

        // Phase 1: materialize every slot from the current state.
        let mut slot_rows = Vec::with_capacity(day.slots.len());
        for s in &day.slots {
            let outcome = outcomes.get(index, &s.id);
            slot_rows.push(materialize_slot(s, &states, &refs, outcome));
        }

        // Phase 2: transition every slot, deferring reference writes to
        // the workout boundary.
        let mut writes: Vec<RefWrite> = Vec::new();
        for s in &day.slots {
            if let Progression::StageLadder(ladder) = &s.progression {
                if let Some(Ok(state)) = states.get(s.id.as_str()) {
                    let outcome = outcomes.get(index, &s.id);
                    let (next, write) = slot::transition(ladder, state, outcome);
                    states.insert(s.id.as_str(), Ok(next));
                    writes.extend(write);
                }
            }
        }
        for write in writes {
            if let Some(value) = refs.get_mut(&write.key) {
                *value += write.delta;
            }
        }

        rows.push(WorkoutRow {
            index,
            day_name: day.name.clone(),
            slots: slot_rows,
        });
    }

    rows
}

fn materialize_slot(
    s: &Slot,
    states: &BTreeMap<&str, Result<SlotState, String>>,
    refs: &RefValues,
    outcome: Option<&Outcome>,
) -> SlotRow {
    let mut row = base_row(s, outcome);

    match &s.progression {
        Progression::Gpp => {
            row.is_gpp = true;
        }
        Progression::StageLadder(ladder) => match states.get(s.id.as_str()) {
            Some(Ok(state)) => {
                let stage = slot::current_stage(ladder, state);
                row.weight = slot::working_weight(ladder, state, refs, s.rounding);
                row.stage = state.stage.min(ladder.stages.len() - 1) as u32;
                row.sets = stage.sets;
                row.reps = stage.reps;
                row.is_amrap = stage.amrap;
                row.reps_max = stage.reps_max;
                row.is_deload = state.deloaded;
                if row.weight.is_none() {
                    row.unresolved = Some(format!(
                        "training max '{}' not present in config",
                        ladder.write_key()
                    ));
                }
            }
            Some(Err(message)) => {
                row.unresolved = Some(message.clone());
            }
            None => {}
        },
        Progression::PrescriptionLadder(ladder) => match refs.get(&ladder.percent_of) {
            Some(reference) => {
                let sets: Vec<PrescribedSet> = ladder
                    .prescriptions
                    .iter()
                    .map(|p| PrescribedSet {
                        percent: p.percent,
                        weight: round_to_increment(
                            percent_of(*reference, p.percent),
                            s.rounding,
                        ),
                        reps: p.reps,
                        sets: p.sets,
                    })
                    .collect();
                // The last entry is the working set; earlier entries are
                // warm-ups, rendered but not separately logged.
                if let Some(working) = sets.last() {
                    row.weight = Some(working.weight);
                    row.sets = working.sets;
                    row.reps = working.reps;
                }
                row.prescriptions = Some(sets);
            }
            None => {
                row.unresolved = Some(format!(
                    "reference '{}' not present in config",
                    ladder.percent_of
                ));
            }
        },
    }

    row
}

fn base_row(s: &Slot, outcome: Option<&Outcome>) -> SlotRow {
    SlotRow {
        slot_id: s.id.clone(),
        exercise_name: s.exercise_name.clone(),
        tier: s.tier.clone(),
        role: s.role,
        weight: None,
        stage: 0,
        sets: 0,
        reps: 0,
        is_amrap: false,
        reps_max: None,
        result: outcome.map(|o| o.result),
        amrap_reps: outcome.and_then(|o| o.amrap_reps),
        rpe: outcome.and_then(|o| o.rpe),
        is_changed: false,
        is_deload: false,
        is_gpp: false,
        prescriptions: None,
        unresolved: None,
    }
}

/// Mark rows whose computed weight moved relative to the previous replay
/// snapshot. A derived diff, not engine state: `replay` itself has no
/// memory of prior calls.
pub fn mark_changed(previous: &[WorkoutRow], current: &mut [WorkoutRow]) {
    let mut prior: BTreeMap<(u32, &str), Option<Decimal>> = BTreeMap::new();
    for row in previous {
        for s in &row.slots {
            prior.insert((row.index, s.slot_id.as_str()), s.weight);
        }
    }
    for row in current.iter_mut() {
        for s in row.slots.iter_mut() {
            if let Some(previous_weight) = prior.get(&(row.index, s.slot_id.as_str())) {
                s.is_changed = *previous_weight != s.weight;
            }
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
