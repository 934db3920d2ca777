use async_trait::async_trait;

use super::error::SynthesisError;
use super::types::AudioData;

/// Trait for text-to-speech providers.
///
/// One call per segment, no batching. Implementations are stateless and
/// idempotent: a call may be retried, carries no ordering responsibility,
/// and must not assume anything about concurrent peers.
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Provider name for logs and error reports
    fn name(&self) -> &'static str;

    /// Synthesize text to speech audio using the given voice
    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioData, SynthesisError>;
}
