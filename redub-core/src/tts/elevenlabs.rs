//! ElevenLabs text-to-speech implementation

use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;

use super::error::SynthesisError;
use super::provider::TextToSpeech;
use super::types::AudioData;

/// The stream endpoint returns raw 16 kHz mono PCM with this output format.
const OUTPUT_SAMPLE_RATE: u32 = 16_000;

#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    pub api_key: String,
    pub model_id: String,
}

impl ElevenLabsConfig {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            model_id: "eleven_multilingual_v2".to_string(),
        }
    }
}

pub struct ElevenLabs {
    config: ElevenLabsConfig,
    client: Client,
}

impl ElevenLabs {
    pub fn new(config: ElevenLabsConfig) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }
}

#[derive(Serialize)]
struct SynthesizeRequest {
    text: String,
    model_id: String,
}

#[async_trait]
impl TextToSpeech for ElevenLabs {
    fn name(&self) -> &'static str {
        "elevenlabs"
    }

    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioData, SynthesisError> {
        let url = format!(
            "https://api.elevenlabs.io/v1/text-to-speech/{voice}/stream?output_format=pcm_16000"
        );

        let request_body = SynthesizeRequest {
            text: text.to_string(),
            model_id: self.config.model_id.clone(),
        };

        let response = self
            .client
            .post(&url)
            .header("xi-api-key", &self.config.api_key)
            .header("Content-Type", "application/json")
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
    let cause = anyhow!("ElevenLabs API error {status}: {body}");
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
    fn throttling_and_server_errors_are_retryable() {
        assert!(matches!(
            api_error(StatusCode::TOO_MANY_REQUESTS, "slow down"),
            SynthesisError::Retryable(_)
        ));
        assert!(matches!(
            api_error(StatusCode::BAD_GATEWAY, ""),
            SynthesisError::Retryable(_)
        ));
        assert!(matches!(
            api_error(StatusCode::UNAUTHORIZED, "bad key"),
            SynthesisError::Terminal(_)
        ));
    }
}
