//! Mock synthesizer for testing the pipeline without a network.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;

use super::error::SynthesisError;
use super::provider::TextToSpeech;
use super::types::AudioData;

pub const STUB_SAMPLE_RATE: u32 = 16_000;
/// Every stub payload is 100 ms long: frame count is deterministic so tests
/// can assert on total assembled duration.
pub const STUB_FRAMES: usize = 1_600;

/// Mock behavior for the mock synthesizer
#[derive(Debug, Clone, Default)]
pub enum MockBehavior {
    /// Return a deterministic stub payload for every call
    #[default]
    Success,
    /// Return a retryable error N times, then succeed
    RetryableErrorThenSuccess { remaining_errors: usize },
    /// Always return a retryable error
    AlwaysRetryableError,
    /// Always return a terminal error
    AlwaysTerminalError,
    /// Fail terminally for any text containing the needle, succeed otherwise
    FailMatching { needle: String },
}

/// A synthesize call as the mock observed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRequest {
    pub text: String,
    pub voice: String,
}

/// Mock TTS provider for testing.
///
/// Tracks call counts, captured requests, and the peak number of concurrent
/// in-flight calls so tests can verify the scheduler's concurrency bound.
/// Per-text latencies let tests scramble completion order deterministically.
#[derive(Clone)]
pub struct MockSynthesizer {
    behavior: Arc<Mutex<MockBehavior>>,
    call_count: Arc<Mutex<usize>>,
    captured_requests: Arc<Mutex<Vec<CapturedRequest>>>,
    latencies: Arc<Mutex<HashMap<String, Duration>>>,
    in_flight: Arc<AtomicUsize>,
    peak_in_flight: Arc<AtomicUsize>,
}

impl MockSynthesizer {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Arc::new(Mutex::new(behavior)),
            call_count: Arc::new(Mutex::new(0)),
            captured_requests: Arc::new(Mutex::new(Vec::new())),
            latencies: Arc::new(Mutex::new(HashMap::new())),
            in_flight: Arc::new(AtomicUsize::new(0)),
            peak_in_flight: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Delay calls for this exact text before producing a result.
    pub fn set_latency(&self, text: &str, latency: Duration) {
        self.latencies.lock().unwrap().insert(text.to_string(), latency);
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.captured_requests.lock().unwrap().clone()
    }

    /// Highest number of synthesize calls that were in flight at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Deterministic fixed-duration payload. Every sample carries a tag
    /// derived from the text so tests can recognize segments in the
    /// assembled track.
    pub fn stub_payload(text: &str) -> AudioData {
        let tag = text
            .bytes()
            .fold(0u16, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u16))
            as i16;

        let mut pcm_data = Vec::with_capacity(STUB_FRAMES * 2);
        for _ in 0..STUB_FRAMES {
            pcm_data.extend_from_slice(&tag.to_le_bytes());
        }

        AudioData {
            pcm_data,
            sample_rate: STUB_SAMPLE_RATE,
            channels: 1,
        }
    }
}

/// Decrements the in-flight gauge even when a timed-out call is dropped
/// mid-await.
struct InFlightGuard {
    in_flight: Arc<AtomicUsize>,
}

impl InFlightGuard {
    fn enter(mock: &MockSynthesizer) -> Self {
        let current = mock.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        mock.peak_in_flight.fetch_max(current, Ordering::SeqCst);
        Self {
            in_flight: Arc::clone(&mock.in_flight),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl TextToSpeech for MockSynthesizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioData, SynthesisError> {
        {
            let mut requests = self.captured_requests.lock().unwrap();
            requests.push(CapturedRequest {
                text: text.to_string(),
                voice: voice.to_string(),
            });
        }

        {
            let mut count = self.call_count.lock().unwrap();
            *count += 1;
        }

        let _guard = InFlightGuard::enter(self);

        let latency = self.latencies.lock().unwrap().get(text).copied();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let effective = self.behavior.lock().unwrap().clone();
        match effective {
            MockBehavior::Success => Ok(Self::stub_payload(text)),
            MockBehavior::RetryableErrorThenSuccess { remaining_errors } => {
                if remaining_errors > 0 {
                    self.set_behavior(MockBehavior::RetryableErrorThenSuccess {
                        remaining_errors: remaining_errors - 1,
                    });
                    Err(SynthesisError::Retryable(anyhow!(
                        "mock retryable error (remaining: {})",
                        remaining_errors - 1
                    )))
                } else {
                    Ok(Self::stub_payload(text))
                }
            }
            MockBehavior::AlwaysRetryableError => Err(SynthesisError::Retryable(anyhow!(
                "mock retryable error (always fails)"
            ))),
            MockBehavior::AlwaysTerminalError => {
                Err(SynthesisError::Terminal(anyhow!("mock terminal error")))
            }
            MockBehavior::FailMatching { needle } => {
                if text.contains(&needle) {
                    Err(SynthesisError::Terminal(anyhow!(
                        "mock failure for text matching '{needle}'"
                    )))
                } else {
                    Ok(Self::stub_payload(text))
                }
            }
        }
    }
}
