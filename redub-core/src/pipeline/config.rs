//! Pipeline configuration.
//!
//! Constructed once per run and passed explicitly to every component; there
//! is no global mutable state.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::voice::assignment::{ConfigurationError, VoiceAssignment};

pub const DEFAULT_MAX_WORKERS: usize = 3;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(60);

/// Container encoding for the assembled track.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutputEncoding {
    #[default]
    Wav,
    Pcm,
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Upper bound on concurrently outstanding synthesis calls.
    pub max_workers: usize,
    pub voices: VoiceAssignment,
    pub output_path: PathBuf,
    pub output_encoding: OutputEncoding,
    /// Per-call timeout; an elapsed timeout counts as a retryable failure.
    pub synthesis_timeout: Duration,
    /// Retries per segment for retryable failures before it is marked failed.
    pub max_retries: u32,
    /// Parent directory for the intermediate working directory. Defaults to
    /// the system temp directory.
    pub workdir_root: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(voices: VoiceAssignment, output_path: impl Into<PathBuf>) -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            voices,
            output_path: output_path.into(),
            output_encoding: OutputEncoding::default(),
            synthesis_timeout: DEFAULT_SYNTHESIS_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            workdir_root: None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.max_workers == 0 {
            return Err(ConfigurationError::InvalidWorkerCount);
        }
        Ok(())
    }
}
