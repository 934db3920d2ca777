//! Job configuration for the redub CLI.
//!
//! A TOML file selects the synthesis provider and maps every speaker label
//! that can appear in the input to a voice identifier:
//!
//! ```toml
//! [provider]
//! type = "openai"
//!
//! [voices]
//! SPEAKER_00 = "alloy"
//! SPEAKER_01 = "onyx"
//! ```
//!
//! API keys are never stored in the file; they come from the provider's
//! environment variable.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use redub_core::voice::assignment::VoiceAssignment;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ProviderConfig {
    #[serde(rename = "openai")]
    OpenAi {
        #[serde(default = "default_openai_model")]
        model: String,
    },
    #[serde(rename = "elevenlabs")]
    ElevenLabs {
        #[serde(default = "default_elevenlabs_model")]
        model_id: String,
    },
}

fn default_openai_model() -> String {
    "tts-1".to_string()
}

fn default_elevenlabs_model() -> String {
    "eleven_multilingual_v2".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    pub provider: ProviderConfig,

    /// Speaker label -> voice identifier.
    pub voices: HashMap<String, String>,
}

impl JobConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path:?}"))?;
        let config: JobConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {path:?}"))?;
        Ok(config)
    }

    /// Environment variable holding the provider's API key.
    pub fn api_key_env(&self) -> &'static str {
        match self.provider {
            ProviderConfig::OpenAi { .. } => "OPENAI_API_KEY",
            ProviderConfig::ElevenLabs { .. } => "ELEVENLABS_API_KEY",
        }
    }

    pub fn voice_assignment(&self) -> VoiceAssignment {
        self.voices
            .iter()
            .map(|(speaker, voice)| (speaker.clone(), voice.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_an_openai_job() {
        let config: JobConfig = toml::from_str(
            r#"
            [provider]
            type = "openai"

            [voices]
            SPEAKER_00 = "alloy"
            SPEAKER_01 = "onyx"
            "#,
        )
        .unwrap();

        assert!(matches!(config.provider, ProviderConfig::OpenAi { ref model } if model == "tts-1"));
        assert_eq!(config.api_key_env(), "OPENAI_API_KEY");
        assert_eq!(
            config.voice_assignment().voice_for("SPEAKER_01"),
            Some("onyx")
        );
    }

    #[test]
    fn parses_an_elevenlabs_job_with_model_override() {
        let config: JobConfig = toml::from_str(
            r#"
            [provider]
            type = "elevenlabs"
            model_id = "eleven_turbo_v2"

            [voices]
            HOST = "G3hRJZ8nXEfgXIpKdanG"
            "#,
        )
        .unwrap();

        assert!(
            matches!(config.provider, ProviderConfig::ElevenLabs { ref model_id } if model_id == "eleven_turbo_v2")
        );
        assert_eq!(config.api_key_env(), "ELEVENLABS_API_KEY");
    }
}
