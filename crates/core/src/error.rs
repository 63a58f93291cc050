use serde::{Deserialize, Serialize};

/// A definition error: a structural or reference problem found while
/// loading a program definition. Collected per construct rather than
/// short-circuited, so one bad slot never hides the rest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DefinitionError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slot_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub message: String,
}

impl DefinitionError {
    pub fn new(
        slot_id: Option<&str>,
        field: Option<&str>,
        message: impl Into<String>,
    ) -> Self {
        DefinitionError {
            slot_id: slot_id.map(str::to_owned),
            field: field.map(str::to_owned),
            message: message.into(),
        }
    }

    /// A program-level error not tied to any slot.
    pub fn program(message: impl Into<String>) -> Self {
        DefinitionError::new(None, None, message)
    }

    /// An error on a specific slot field.
    pub fn slot(slot_id: &str, field: &str, message: impl Into<String>) -> Self {
        DefinitionError::new(Some(slot_id), Some(field), message)
    }
}

impl std::fmt::Display for DefinitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.slot_id, &self.field) {
            (Some(slot), Some(field)) => {
                write!(f, "slot '{}' field '{}': {}", slot, field, self.message)
            }
            (Some(slot), None) => write!(f, "slot '{}': {}", slot, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}
