//! Index-keyed accumulation of synthesis outcomes.
//!
//! Workers record outcomes in whatever order they complete; the map is keyed
//! by segment index so arrival order never matters. One write per index:
//! a second write for the same index is a scheduler bug, not an input fault.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;

use crate::tts::types::AudioData;

/// Per-segment result of a synthesis attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisOutcome {
    pub index: usize,
    pub status: OutcomeStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeStatus {
    Success(AudioData),
    Failure(String),
}

/// Counts reported to the caller once the pool has drained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub failed_indices: BTreeSet<usize>,
}

/// Gathers outcomes from concurrent workers, keyed by segment index.
pub struct OutcomeCollector {
    total: usize,
    outcomes: Mutex<BTreeMap<usize, OutcomeStatus>>,
}

impl OutcomeCollector {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            outcomes: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn record_success(&self, index: usize, audio: AudioData) {
        self.record(index, OutcomeStatus::Success(audio));
    }

    pub fn record_failure(&self, index: usize, reason: String) {
        self.record(index, OutcomeStatus::Failure(reason));
    }

    fn record(&self, index: usize, status: OutcomeStatus) {
        let mut outcomes = self.outcomes.lock().unwrap();
        let previous = outcomes.insert(index, status);
        assert!(
            previous.is_none(),
            "bug: outcome for segment {index} recorded twice"
        );
    }

    pub fn contains(&self, index: usize) -> bool {
        self.outcomes.lock().unwrap().contains_key(&index)
    }

    pub fn len(&self) -> usize {
        self.outcomes.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True once every expected index has an outcome.
    pub fn is_complete(&self) -> bool {
        self.len() == self.total
    }

    pub fn summary(&self) -> RunSummary {
        let outcomes = self.outcomes.lock().unwrap();
        let failed_indices: BTreeSet<usize> = outcomes
            .iter()
            .filter(|(_, status)| matches!(status, OutcomeStatus::Failure(_)))
            .map(|(&index, _)| index)
            .collect();

        RunSummary {
            total: self.total,
            succeeded: outcomes.len() - failed_indices.len(),
            failed: failed_indices.len(),
            failed_indices,
        }
    }

    /// Consume the collector, yielding every outcome. Ascending index order
    /// falls out of the map, but the assembler re-sorts and must not rely on
    /// it.
    pub fn into_outcomes(self) -> Vec<SynthesisOutcome> {
        self.outcomes
            .into_inner()
            .unwrap()
            .into_iter()
            .map(|(index, status)| SynthesisOutcome { index, status })
            .collect()
    }
}
