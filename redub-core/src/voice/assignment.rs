//! Speaker-to-voice assignment.
//!
//! Every speaker label appearing in the segment list must have an entry in
//! the assignment table. Resolution runs for the whole list before any
//! synthesis call is dispatched, so a missing entry is a configuration fault
//! discovered up front, never mid-flight.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::segment::source::Segment;

/// Mapping from speaker identifier to synthesis voice identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceAssignment {
    voices: HashMap<String, String>,
}

impl VoiceAssignment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn assign(&mut self, speaker: impl Into<String>, voice: impl Into<String>) {
        self.voices.insert(speaker.into(), voice.into());
    }

    pub fn voice_for(&self, speaker: &str) -> Option<&str> {
        self.voices.get(speaker).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.voices.is_empty()
    }
}

impl FromIterator<(String, String)> for VoiceAssignment {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            voices: iter.into_iter().collect(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("no voice assigned for speaker '{speaker}' (first used by segment {index})")]
    UnassignedSpeaker { speaker: String, index: usize },

    #[error("max_workers must be at least 1")]
    InvalidWorkerCount,
}

/// A segment paired with the voice that will render it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSegment {
    pub segment: Segment,
    pub voice: String,
}

/// Resolve a voice for every segment.
///
/// Fails on the first speaker without an entry. Resolution is pure: the same
/// segments and table always produce the same pairs in the same order.
pub fn resolve(
    segments: &[Segment],
    voices: &VoiceAssignment,
) -> Result<Vec<ResolvedSegment>, ConfigurationError> {
    segments
        .iter()
        .map(|segment| {
            let voice = voices.voice_for(&segment.speaker).ok_or_else(|| {
                ConfigurationError::UnassignedSpeaker {
                    speaker: segment.speaker.clone(),
                    index: segment.index,
                }
            })?;
            Ok(ResolvedSegment {
                segment: segment.clone(),
                voice: voice.to_string(),
            })
        })
        .collect()
}
