//! Bounded-concurrency dispatch of synthesis tasks.
//!
//! Segments are dispatched in input order to a pool capped at `max_workers`
//! in-flight synthesis calls; completion order is unconstrained. A worker
//! holds its permit for the whole attempt, retries and backoff included.
//! Every dispatched index ends up with exactly one outcome in the collector.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{sleep, timeout};
use tracing::{debug, warn};

use crate::pipeline::collector::OutcomeCollector;
use crate::pipeline::config::PipelineConfig;
use crate::pipeline::error::PipelineError;
use crate::pipeline::workdir::Workdir;
use crate::tts::error::SynthesisError;
use crate::tts::provider::TextToSpeech;
use crate::tts::types::AudioData;
use crate::voice::assignment::ResolvedSegment;

pub const INITIAL_BACKOFF_MS: u64 = 250;
pub const MAX_BACKOFF_MS: u64 = 2_000;
pub const BACKOFF_MULTIPLIER: f64 = 2.0;

/// Requests early stop of a running pool.
///
/// Once stopped, no new tasks are dispatched; in-flight tasks drain, their
/// outcomes are discarded, and the run fails with [`PipelineError::Aborted`].
#[derive(Clone, Default)]
pub struct StopHandle {
    stopped: Arc<AtomicBool>,
}

impl StopHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stop(&self) {
        self.stopped.store(true, Ordering::SeqCst);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::SeqCst)
    }
}

pub struct Scheduler {
    provider: Arc<dyn TextToSpeech>,
    max_workers: usize,
    call_timeout: Duration,
    max_retries: u32,
}

impl Scheduler {
    pub fn new(provider: Arc<dyn TextToSpeech>, config: &PipelineConfig) -> Self {
        Self {
            provider,
            max_workers: config.max_workers,
            call_timeout: config.synthesis_timeout,
            max_retries: config.max_retries,
        }
    }

    /// Run every resolved segment through the pool and return the filled
    /// collector.
    pub async fn run(
        &self,
        segments: Vec<ResolvedSegment>,
        workdir: &Workdir,
        stop: &StopHandle,
    ) -> Result<OutcomeCollector, PipelineError> {
        let total = segments.len();
        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let collector = Arc::new(OutcomeCollector::new(total));
        let mut tasks = JoinSet::new();
        let mut dispatched = Vec::with_capacity(total);
        let mut aborted = false;

        for resolved in segments {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break, // semaphore closed
            };

            // Re-check after the (possibly long) permit wait.
            if stop.is_stopped() {
                aborted = true;
                break;
            }

            let index = resolved.segment.index;
            dispatched.push(index);

            let worker = Worker {
                provider: Arc::clone(&self.provider),
                collector: Arc::clone(&collector),
                artifact_path: workdir.artifact_path(index),
                call_timeout: self.call_timeout,
                max_retries: self.max_retries,
            };

            tasks.spawn(async move {
                let _permit = permit; // held until the attempt resolves
                worker.synthesize_segment(resolved).await;
            });
        }

        // In-flight tasks are allowed to finish even on abort.
        while let Some(joined) = tasks.join_next().await {
            if let Err(error) = joined {
                warn!(%error, "synthesis worker terminated abnormally");
            }
        }

        if aborted || stop.is_stopped() {
            return Err(PipelineError::Aborted);
        }

        // A worker that panicked never recorded its outcome; no index may be
        // silently dropped.
        for index in dispatched {
            if !collector.contains(index) {
                collector.record_failure(
                    index,
                    "synthesis worker terminated abnormally".to_string(),
                );
            }
        }

        let collector = Arc::into_inner(collector)
            .expect("all workers joined, no other collector handles remain");
        Ok(collector)
    }
}

struct Worker {
    provider: Arc<dyn TextToSpeech>,
    collector: Arc<OutcomeCollector>,
    artifact_path: PathBuf,
    call_timeout: Duration,
    max_retries: u32,
}

impl Worker {
    async fn synthesize_segment(&self, resolved: ResolvedSegment) {
        let index = resolved.segment.index;
        debug!(index, voice = %resolved.voice, "synthesis started");

        match self.synthesize_with_retry(&resolved).await {
            Ok(audio) => {
                if let Err(error) = tokio::fs::write(&self.artifact_path, &audio.pcm_data).await {
                    warn!(index, %error, "failed to persist segment artifact");
                }
                debug!(index, frames = audio.frames(), "synthesis completed");
                self.collector.record_success(index, audio);
            }
            Err(error) => {
                warn!(index, %error, "segment synthesis failed");
                self.collector.record_failure(index, error.to_string());
            }
        }
    }

    async fn synthesize_with_retry(
        &self,
        resolved: &ResolvedSegment,
    ) -> Result<AudioData, SynthesisError> {
        let mut attempt = 0;
        loop {
            let error = match self.attempt_synthesis(resolved).await {
                Ok(audio) => return Ok(audio),
                Err(error) => error,
            };

            if !should_retry(&error, attempt, self.max_retries) {
                return Err(error);
            }

            let backoff_ms = calculate_backoff(
                attempt,
                INITIAL_BACKOFF_MS,
                MAX_BACKOFF_MS,
                BACKOFF_MULTIPLIER,
            );

            warn!(
                index = resolved.segment.index,
                attempt = attempt + 1,
                max_retries = self.max_retries,
                backoff_ms,
                error = %error,
                "Synthesis failed, retrying after backoff"
            );

            sleep(Duration::from_millis(backoff_ms)).await;
            attempt += 1;
        }
    }

    async fn attempt_synthesis(
        &self,
        resolved: &ResolvedSegment,
    ) -> Result<AudioData, SynthesisError> {
        let call = self
            .provider
            .synthesize(&resolved.segment.text, &resolved.voice);

        match timeout(self.call_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SynthesisError::Retryable(anyhow!(
                "synthesis call exceeded {:?} timeout",
                self.call_timeout
            ))),
        }
    }
}

fn should_retry(error: &SynthesisError, attempt: u32, max_retries: u32) -> bool {
    matches!(error, SynthesisError::Retryable(_)) && attempt < max_retries
}

fn calculate_backoff(attempt: u32, initial_ms: u64, max_ms: u64, multiplier: f64) -> u64 {
    let base_backoff = initial_ms as f64 * multiplier.powi(attempt as i32);
    base_backoff.min(max_ms as f64) as u64
}
