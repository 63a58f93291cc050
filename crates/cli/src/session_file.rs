//! The CLI's file-backed session: one self-contained JSON document
//! holding the definition, the validated config, the outcome log and the
//! undo stack. Loaded into an engine `Session`, saved back after every
//! accepted mutation. A richer deployment would sit behind the
//! cadence-storage backend trait instead; the document shapes here mirror
//! those records.

use std::path::Path;

use serde::{Deserialize, Serialize};

use cadence_core::{ProgramDefinition, FORMAT_VERSION};
use cadence_engine::{Config, Outcome, OutcomeLog, Session, UndoEntry};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionFile {
    pub format_version: String,
    pub definition: ProgramDefinition,
    pub config: Config,
    #[serde(default)]
    pub outcomes: Vec<OutcomeEntry>,
    #[serde(default)]
    pub undo: Vec<UndoFileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutcomeEntry {
    pub workout_index: u32,
    pub slot_id: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoFileEntry {
    pub workout_index: u32,
    pub slot_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<Outcome>,
}

impl SessionFile {
    pub fn load(path: &Path) -> Result<SessionFile, String> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| format!("error reading session '{}': {}", path.display(), e))?;
        serde_json::from_str(&src)
            .map_err(|e| format!("error parsing session '{}': {}", path.display(), e))
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let pretty = serde_json::to_string_pretty(self)
            .map_err(|e| format!("serialization error: {}", e))?;
        std::fs::write(path, pretty + "\n")
            .map_err(|e| format!("error writing session '{}': {}", path.display(), e))
    }

    /// Rebuild the engine session. Replay runs as part of resume.
    pub fn into_session(self) -> Session {
        let mut log = OutcomeLog::new();
        for entry in self.outcomes {
            log.set(entry.workout_index, &entry.slot_id, entry.outcome);
        }
        let undo = self
            .undo
            .into_iter()
            .map(|e| UndoEntry {
                workout_index: e.workout_index,
                slot_id: e.slot_id,
                previous: e.previous,
            })
            .collect();
        Session::resume(self.definition, self.config, log, undo)
    }

    /// Capture the session's persistent parts back into document form.
    pub fn from_session(session: &Session) -> SessionFile {
        SessionFile {
            format_version: FORMAT_VERSION.to_string(),
            definition: session.definition().clone(),
            config: session.config().clone(),
            outcomes: session
                .outcomes()
                .entries()
                .map(|(workout_index, slot_id, outcome)| OutcomeEntry {
                    workout_index,
                    slot_id: slot_id.to_string(),
                    outcome: outcome.clone(),
                })
                .collect(),
            undo: session
                .undo_entries()
                .iter()
                .map(|e| UndoFileEntry {
                    workout_index: e.workout_index,
                    slot_id: e.slot_id.clone(),
                    previous: e.previous.clone(),
                })
                .collect(),
        }
    }
}
