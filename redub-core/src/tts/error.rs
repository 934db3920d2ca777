use anyhow::anyhow;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SynthesisError {
    #[error("Retryable error: {0}")]
    Retryable(anyhow::Error),

    #[error("Terminal error: {0}")]
    Terminal(anyhow::Error),
}

impl From<reqwest::Error> for SynthesisError {
    fn from(source: reqwest::Error) -> Self {
        if source.is_timeout() || source.is_connect() {
            Self::Retryable(anyhow!(source))
        } else {
            Self::Terminal(anyhow!(source))
        }
    }
}
