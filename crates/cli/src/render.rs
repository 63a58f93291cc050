//! Plain-text rendering of a materialized schedule.

use cadence_engine::{LiftResult, SlotRow, WorkoutRow};

/// Render the full schedule, one block per workout.
pub fn render_rows(rows: &[WorkoutRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!("#{} {}\n", row.index, row.day_name));
        for slot in &row.slots {
            out.push_str(&format!("  {}\n", render_slot(slot)));
        }
    }
    out
}

fn render_slot(slot: &SlotRow) -> String {
    let mut line = format!("{:<24} {:<4} {:<9}", slot.exercise_name, slot.tier, slot.role);

    if let Some(message) = &slot.unresolved {
        line.push_str(&format!(" !unresolved: {}", message));
        return line;
    }

    if slot.is_gpp {
        line.push_str(" gpp");
    } else if let Some(weight) = slot.weight {
        line.push_str(&format!(" {:>7}", weight.to_string()));
        line.push_str(&format!(" {}x{}", slot.sets, slot.reps));
        if let Some(reps_max) = slot.reps_max {
            line.push_str(&format!("-{}", reps_max));
        }
        if slot.is_amrap {
            line.push('+');
        }
        line.push_str(&format!("  stage {}", slot.stage));
    }

    match slot.result {
        Some(LiftResult::Success) => line.push_str("  [ok]"),
        Some(LiftResult::Fail) => line.push_str("  [failed]"),
        None => {}
    }
    if let Some(reps) = slot.amrap_reps {
        line.push_str(&format!(" amrap={}", reps));
    }
    if let Some(rpe) = slot.rpe {
        if slot.role.displays_rpe() {
            line.push_str(&format!(" rpe={}", rpe));
        }
    }
    if slot.is_deload {
        line.push_str("  (deload)");
    }
    if slot.is_changed {
        line.push_str("  *");
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::Role;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn slot_row() -> SlotRow {
        SlotRow {
            slot_id: "a_squat".to_string(),
            exercise_name: "Back Squat".to_string(),
            tier: "T1".to_string(),
            role: Role::Primary,
            weight: Some(Decimal::from_str("62.5").unwrap()),
            stage: 1,
            sets: 6,
            reps: 2,
            is_amrap: false,
            reps_max: None,
            result: Some(LiftResult::Fail),
            amrap_reps: None,
            rpe: None,
            is_changed: true,
            is_deload: false,
            is_gpp: false,
            prescriptions: None,
            unresolved: None,
        }
    }

    #[test]
    fn renders_a_ladder_row() {
        let line = render_slot(&slot_row());
        assert!(line.contains("Back Squat"));
        assert!(line.contains("62.5"));
        assert!(line.contains("6x2"));
        assert!(line.contains("stage 1"));
        assert!(line.contains("[failed]"));
        assert!(line.ends_with('*'));
    }

    #[test]
    fn rpe_shows_only_for_displaying_roles() {
        let mut slot = slot_row();
        slot.rpe = Some(Decimal::from_str("8.5").unwrap());
        assert!(render_slot(&slot).contains("rpe=8.5"));

        slot.role = Role::Accessory;
        assert!(!render_slot(&slot).contains("rpe="));
    }

    #[test]
    fn renders_unresolved_row() {
        let mut slot = slot_row();
        slot.weight = None;
        slot.unresolved = Some("reference 'x' not present in config".to_string());
        let line = render_slot(&slot);
        assert!(line.contains("!unresolved"));
        assert!(!line.contains("stage"));
    }

    #[test]
    fn renders_workout_header() {
        let rows = vec![WorkoutRow {
            index: 3,
            day_name: "Day B".to_string(),
            slots: vec![slot_row()],
        }];
        let text = render_rows(&rows);
        assert!(text.starts_with("#3 Day B\n"));
    }
}
