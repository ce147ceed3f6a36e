use serde::{Deserialize, Serialize};

use super::phase::{label_for_index, CHECKPOINT_CAPACITY};

/// One recorded checkpoint: when it happened, the photo taken at that
/// moment (absent when capture produced no image), and the positional
/// label it was assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckpointRecord {
    pub timestamp: String,
    pub photo: Option<String>,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppendOutcome {
    Recorded { index: usize, label: &'static str },
    LimitReached,
}

/// Append-only record of today's checkpoints, capped at four for the
/// lifetime of the mounted recorder. Append is the only mutator; there
/// is no remove or edit.
#[derive(Debug, Default)]
pub struct CheckpointLedger {
    records: Vec<CheckpointRecord>,
}

impl CheckpointLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.records.len() >= CHECKPOINT_CAPACITY
    }

    pub fn records(&self) -> &[CheckpointRecord] {
        &self.records
    }

    pub fn append(&mut self, timestamp: String, photo: Option<String>) -> AppendOutcome {
        if self.is_full() {
            return AppendOutcome::LimitReached;
        }

        let index = self.records.len();
        let label = label_for_index(index);
        self.records.push(CheckpointRecord {
            timestamp,
            photo,
            label: label.to_string(),
        });

        AppendOutcome::Recorded { index, label }
    }
}
