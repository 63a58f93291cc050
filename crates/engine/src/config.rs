//! Config assembly from raw user input.
//!
//! Walks the program's declared input fields and coerces the raw string
//! values into a typed `Config`. Atomic: every field is checked, every
//! problem is collected into a field-indexed error map, and either the
//! whole config is accepted or none of it. Extra keys not declared by the
//! program are silently ignored.

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;

use cadence_core::ConfigField;

use crate::types::{Config, ConfigError, ConfigValue, FieldErrors};

/// Hard ceiling for any weight input. Values above this are rejected as
/// absurd regardless of the field's declared minimum.
pub const WEIGHT_CEILING: Decimal = Decimal::from_parts(700, 0, 0, false, 0);

/// Validate raw user input against the program's declared input fields.
///
/// Weight fields must parse as decimals, be at or above the field's `min`
/// and at or below [`WEIGHT_CEILING`]; they are stored unrounded. Choice
/// fields must match one of the declared option values.
pub fn validate_config(
    fields: &[ConfigField],
    raw: &BTreeMap<String, String>,
) -> Result<Config, FieldErrors> {
    let mut config = Config::new();
    let mut errors = FieldErrors::new();

    for field in fields {
        let key = field.key();
        let Some(input) = raw.get(key) else {
            errors.insert(key.to_string(), ConfigError::Missing);
            continue;
        };

        match field {
            ConfigField::Weight { min, .. } => match Decimal::from_str(input.trim()) {
                Ok(value) => {
                    if value < *min {
                        errors.insert(
                            key.to_string(),
                            ConfigError::BelowMin {
                                min: min.to_string(),
                            },
                        );
                    } else if value > WEIGHT_CEILING {
                        errors.insert(
                            key.to_string(),
                            ConfigError::AboveCeiling {
                                ceiling: WEIGHT_CEILING.to_string(),
                            },
                        );
                    } else {
                        config
                            .values
                            .insert(key.to_string(), ConfigValue::Weight { value });
                    }
                }
                Err(_) => {
                    errors.insert(
                        key.to_string(),
                        ConfigError::NotANumber {
                            value: input.clone(),
                        },
                    );
                }
            },
            ConfigField::Choice { options, .. } => {
                if options.iter().any(|o| o.value == *input) {
                    config.values.insert(
                        key.to_string(),
                        ConfigValue::Choice {
                            value: input.clone(),
                        },
                    );
                } else {
                    errors.insert(
                        key.to_string(),
                        ConfigError::UnknownOption {
                            value: input.clone(),
                        },
                    );
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(config)
    } else {
        Err(errors)
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
