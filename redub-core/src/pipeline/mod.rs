//! The synthesis-and-reassembly pipeline.
//!
//! Data flows segment source → voice resolver → worker pool → collector →
//! ordered assembler, with the working directory cleaned up on every exit
//! path. Per-segment synthesis failures are recovered locally and surface in
//! the run summary; everything else aborts the run as a typed fatal error.

pub mod assembler;
pub mod collector;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod workdir;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use crate::segment::source::{self, RawSegment};
use crate::tts::provider::TextToSpeech;
use crate::voice::assignment;

use collector::RunSummary;
use config::PipelineConfig;
use error::PipelineError;
use scheduler::{Scheduler, StopHandle};
use workdir::Workdir;

/// Result of a completed run: where the track landed and what got into it.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub output_path: PathBuf,
    pub summary: RunSummary,
}

pub struct Pipeline {
    provider: Arc<dyn TextToSpeech>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Validates the configuration up front; a bad worker count never gets
    /// as far as dispatch.
    pub fn new(
        provider: Arc<dyn TextToSpeech>,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self { provider, config })
    }

    pub async fn run(&self, raw: Vec<RawSegment>) -> Result<RunReport, PipelineError> {
        self.run_with_stop(raw, &StopHandle::new()).await
    }

    /// Run the pipeline; `stop` lets the caller abandon the run between
    /// dispatches.
    pub async fn run_with_stop(
        &self,
        raw: Vec<RawSegment>,
        stop: &StopHandle,
    ) -> Result<RunReport, PipelineError> {
        let segments = source::load_segments(raw)?;
        // Fail fast on configuration before any synthesis call is issued.
        let resolved = assignment::resolve(&segments, &self.config.voices)?;

        info!(
            segments = segments.len(),
            max_workers = self.config.max_workers,
            provider = self.provider.name(),
            "starting synthesis pool"
        );

        let workdir =
            Workdir::create(self.config.workdir_root.as_deref()).map_err(PipelineError::Workdir)?;

        let scheduler = Scheduler::new(Arc::clone(&self.provider), &self.config);
        let collector = match scheduler.run(resolved, &workdir, stop).await {
            Ok(collector) => collector,
            Err(error) => {
                workdir.close();
                return Err(error);
            }
        };

        let summary = collector.summary();
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "synthesis pool drained"
        );

        let written = assembler::assemble(collector.into_outcomes()).and_then(|track| {
            assembler::write_track(&track, &self.config.output_path, self.config.output_encoding)?;
            Ok(track)
        });

        // Intermediate artifacts go away before the run reports anything,
        // success or failure.
        workdir.close();

        let track = written.map_err(PipelineError::Assembly)?;

        info!(
            path = %self.config.output_path.display(),
            segments = track.segment_indices.len(),
            duration_secs = track.audio.duration_secs(),
            "wrote assembled track"
        );

        Ok(RunReport {
            output_path: self.config.output_path.clone(),
            summary,
        })
    }
}
