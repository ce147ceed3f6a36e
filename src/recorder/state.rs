use chrono::Local;
use serde::{Deserialize, Serialize};

use super::duration::worked_duration;
use super::ledger::{AppendOutcome, CheckpointLedger, CheckpointRecord};
use super::phase::CheckpointPhase;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The two presentation variants the shell can render. Behavior is
/// identical in both; this only rides along in the snapshot.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum RecorderLayout {
    #[default]
    Classic,
    Compact,
}

/// Everything the shell needs to render the recorder after a mutation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderSnapshot {
    pub phase: CheckpointPhase,
    pub next_label: Option<String>,
    pub checkpoints: Vec<CheckpointRecord>,
    pub camera_active: bool,
    pub visible_photo: Option<usize>,
    pub worked_duration: String,
    pub current_date: String,
    pub layout: RecorderLayout,
}

/// In-memory recorder state: the checkpoint ledger plus display-only
/// state (photo visibility, layout). Created fresh at setup, discarded
/// on exit — nothing here persists.
#[derive(Debug)]
pub struct RecorderState {
    ledger: CheckpointLedger,
    visible_photo: Option<usize>,
    layout: RecorderLayout,
}

impl RecorderState {
    pub fn new(layout: RecorderLayout) -> Self {
        Self {
            ledger: CheckpointLedger::new(),
            visible_photo: None,
            layout,
        }
    }

    pub fn phase(&self) -> CheckpointPhase {
        CheckpointPhase::from_count(self.ledger.len())
    }

    pub fn ledger(&self) -> &CheckpointLedger {
        &self.ledger
    }

    /// Appends a checkpoint stamped by the caller. The caller decides
    /// what to do with the outcome (close the session, raise the limit
    /// notice); this only mutates the ledger.
    pub fn record_checkpoint(&mut self, timestamp: String, photo: Option<String>) -> AppendOutcome {
        self.ledger.append(timestamp, photo)
    }

    /// Toggles which record's photo is expanded. Same index hides it,
    /// a different in-range index switches to it, out-of-range is a no-op.
    pub fn toggle_photo(&mut self, index: usize) {
        if index >= self.ledger.len() {
            return;
        }
        self.visible_photo = if self.visible_photo == Some(index) {
            None
        } else {
            Some(index)
        };
    }

    pub fn set_layout(&mut self, layout: RecorderLayout) {
        self.layout = layout;
    }

    pub fn snapshot(&self, camera_active: bool) -> RecorderSnapshot {
        let phase = self.phase();
        RecorderSnapshot {
            phase,
            next_label: phase.expected_label().map(str::to_owned),
            checkpoints: self.ledger.records().to_vec(),
            camera_active,
            visible_photo: self.visible_photo,
            worked_duration: worked_duration(&self.ledger),
            current_date: Local::now().format(DATE_FORMAT).to_string(),
            layout: self.layout,
        }
    }
}
