//! OpenAI text-to-speech implementation

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::error::SynthesisError;
use super::provider::TextToSpeech;
use super::types::AudioData;

/// The speech endpoint returns 24 kHz mono PCM when `response_format` is pcm.
const OUTPUT_SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Clone)]
pub struct OpenAiTtsConfig {
    pub api_key: String,
    pub model: String,
}

impl OpenAiTtsConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model: "tts-1".to_string(),
        }
    }
}

pub struct OpenAiTts {
    config: OpenAiTtsConfig,
    client: Client,
}

impl OpenAiTts {
    pub fn new(config: OpenAiTtsConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
struct SpeechRequest {
    model: String,
    voice: String,
    input: String,
    response_format: &'static str,
}

#[async_trait]
impl TextToSpeech for OpenAiTts {
    fn name(&self) -> &'static str {
        "openai"
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioData, SynthesisError> {
        let request_body = SpeechRequest {
            model: self.config.model.clone(),
            voice: voice.to_string(),
            input: text.to_string(),
            response_format: "pcm",
        };

        let response = self
            .client
            .post("https://api.openai.com/v1/audio/speech")
            .bearer_auth(&self.config.api_key)
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status, &body));
        }

        let bytes = response.bytes().await?.to_vec();

        Ok(AudioData {
            pcm_data: bytes,
            sample_rate: OUTPUT_SAMPLE_RATE,
            channels: 1,
        })
    }
}

fn api_error(status: StatusCode, body: &str) -> SynthesisError {
    let cause = anyhow!("OpenAI API error {status}: {body}");
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        SynthesisError::Retryable(cause)
    } else {
        SynthesisError::Terminal(cause)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_exhaustion_is_retryable_but_bad_requests_are_not() {
        assert!(matches!(
            api_error(StatusCode::TOO_MANY_REQUESTS, "quota"),
            SynthesisError::Retryable(_)
        ));
        assert!(matches!(
            api_error(StatusCode::BAD_REQUEST, "unknown voice"),
            SynthesisError::Terminal(_)
        ));
    }
}
