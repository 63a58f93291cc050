//! Load-time definition validation.
//!
//! Every slot must have a well-defined weight-producing rule before replay
//! ever runs: a start-weight/training-max chain into declared weight
//! fields, a percent-of chain into a declared weight field, or GPP mode.
//! Dangling or wrongly-typed references, duplicate ids, empty ladders and
//! ill-formed rules are all reported here, per construct, and never
//! surface as replay-time failures.

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::definition::{
    ConfigField, ProgramDefinition, Progression, Role, RuleAction, Slot, StageLadder,
};
use crate::error::DefinitionError;

/// Validate a program definition. Returns every problem found; an empty
/// vec means the definition is safe to replay.
pub fn validate_definition(def: &ProgramDefinition) -> Vec<DefinitionError> {
    let mut errors = Vec::new();

    if def.workouts_per_cycle == 0 {
        errors.push(DefinitionError::program("workoutsPerCycle must be at least 1"));
    }
    if def.days.is_empty() {
        errors.push(DefinitionError::program("program has no days"));
    }

    let weight_keys = check_inputs(def, &mut errors);

    let mut seen_slots = BTreeSet::new();
    for slot in def.slots() {
        if !seen_slots.insert(slot.id.as_str()) {
            errors.push(DefinitionError::new(
                Some(&slot.id),
                None,
                format!("duplicate slot id '{}'", slot.id),
            ));
        }
        check_slot(slot, &weight_keys, &mut errors);
    }

    errors
}

/// Check config field declarations; returns the set of declared weight
/// keys for reference resolution.
fn check_inputs<'a>(
    def: &'a ProgramDefinition,
    errors: &mut Vec<DefinitionError>,
) -> BTreeSet<&'a str> {
    let mut all_keys = BTreeSet::new();
    let mut weight_keys = BTreeSet::new();

    for field in &def.inputs {
        if !all_keys.insert(field.key()) {
            errors.push(DefinitionError::new(
                None,
                Some(field.key()),
                format!("duplicate config key '{}'", field.key()),
            ));
        }
        match field {
            ConfigField::Weight { key, min, step, .. } => {
                weight_keys.insert(key.as_str());
                if *step <= Decimal::ZERO {
                    errors.push(DefinitionError::new(
                        None,
                        Some(key),
                        "weight field step must be positive",
                    ));
                }
                if *min < Decimal::ZERO {
                    errors.push(DefinitionError::new(
                        None,
                        Some(key),
                        "weight field min must not be negative",
                    ));
                }
            }
            ConfigField::Choice { key, options, .. } => {
                if options.is_empty() {
                    errors.push(DefinitionError::new(
                        None,
                        Some(key),
                        "choice field has no options",
                    ));
                }
            }
        }
    }

    weight_keys
}

fn check_slot(slot: &Slot, weight_keys: &BTreeSet<&str>, errors: &mut Vec<DefinitionError>) {
    if slot.rounding <= Decimal::ZERO {
        errors.push(DefinitionError::slot(
            &slot.id,
            "rounding",
            "rounding increment must be positive",
        ));
    }

    match &slot.progression {
        Progression::StageLadder(ladder) => check_stage_ladder(slot, ladder, weight_keys, errors),
        Progression::PrescriptionLadder(ladder) => {
            if ladder.prescriptions.is_empty() {
                errors.push(DefinitionError::slot(
                    &slot.id,
                    "prescriptions",
                    "prescription ladder has no entries",
                ));
            }
            if !weight_keys.contains(ladder.percent_of.as_str()) {
                errors.push(DefinitionError::slot(
                    &slot.id,
                    "percentOf",
                    format!(
                        "'{}' does not resolve to a declared weight field",
                        ladder.percent_of
                    ),
                ));
            }
            for (i, p) in ladder.prescriptions.iter().enumerate() {
                if p.percent <= Decimal::ZERO || p.sets == 0 || p.reps == 0 {
                    errors.push(DefinitionError::slot(
                        &slot.id,
                        "prescriptions",
                        format!("prescription {} must have positive percent, sets and reps", i),
                    ));
                }
            }
        }
        Progression::Gpp => {}
    }
}

fn check_stage_ladder(
    slot: &Slot,
    ladder: &StageLadder,
    weight_keys: &BTreeSet<&str>,
    errors: &mut Vec<DefinitionError>,
) {
    if ladder.stages.is_empty() {
        errors.push(DefinitionError::slot(
            &slot.id,
            "stages",
            "stage ladder has no stages",
        ));
    }
    for (i, stage) in ladder.stages.iter().enumerate() {
        if stage.sets == 0 || stage.reps == 0 {
            errors.push(DefinitionError::slot(
                &slot.id,
                "stages",
                format!("stage {} must have positive sets and reps", i),
            ));
        }
        if let Some(reps_max) = stage.reps_max {
            if reps_max < stage.reps {
                errors.push(DefinitionError::slot(
                    &slot.id,
                    "stages",
                    format!("stage {} repsMax is below reps", i),
                ));
            }
        }
    }

    if !weight_keys.contains(ladder.start_weight.key.as_str()) {
        errors.push(DefinitionError::slot(
            &slot.id,
            "startWeight",
            format!(
                "'{}' does not resolve to a declared weight field",
                ladder.start_weight.key
            ),
        ));
    }

    if let Some(tm) = &ladder.training_max {
        if !weight_keys.contains(tm.key.as_str()) {
            errors.push(DefinitionError::slot(
                &slot.id,
                "trainingMax",
                format!("'{}' does not resolve to a declared weight field", tm.key),
            ));
        }
        if tm.percent <= Decimal::ZERO {
            errors.push(DefinitionError::slot(
                &slot.id,
                "trainingMax",
                "training max percent must be positive",
            ));
        }
        // A TM-backed slot's only weight state is the shared reference;
        // only update_tm may move shared state.
        for rule in ladder.rules() {
            if matches!(
                rule,
                RuleAction::AddWeight { .. }
                    | RuleAction::AddWeightResetStage { .. }
                    | RuleAction::DeloadPercent { .. }
            ) {
                errors.push(DefinitionError::slot(
                    &slot.id,
                    "progression",
                    "weight-mutating action other than update_tm on a training-max-backed slot",
                ));
                break;
            }
        }
    }

    let has_amrap = ladder.stages.iter().any(|s| s.amrap);
    for rule in ladder.rules() {
        match rule {
            RuleAction::UpdateTm { min_amrap_reps, .. } => {
                if slot.role != Role::Primary {
                    errors.push(DefinitionError::slot(
                        &slot.id,
                        "progression",
                        "update_tm requires a primary-role slot",
                    ));
                }
                if min_amrap_reps.is_some() && !has_amrap {
                    errors.push(DefinitionError::slot(
                        &slot.id,
                        "progression",
                        "update_tm gated on AMRAP reps but no stage is AMRAP",
                    ));
                }
            }
            RuleAction::DeloadPercent { percent } => {
                if *percent <= Decimal::ZERO || *percent >= Decimal::ONE_HUNDRED {
                    errors.push(DefinitionError::slot(
                        &slot.id,
                        "progression",
                        "deload percent must be between 0 and 100 exclusive",
                    ));
                }
            }
            RuleAction::AddWeight { amount } | RuleAction::AddWeightResetStage { amount } => {
                if *amount <= Decimal::ZERO {
                    errors.push(DefinitionError::slot(
                        &slot.id,
                        "progression",
                        "add_weight amount must be positive",
                    ));
                }
            }
            RuleAction::NoChange | RuleAction::AdvanceStage | RuleAction::UpdateTm { .. } => {}
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
