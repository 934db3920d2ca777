pub mod elevenlabs;
pub mod error;
pub mod mock;
pub mod openai;
pub mod provider;
pub mod types;

pub use error::SynthesisError;
pub use provider::TextToSpeech;
pub use types::AudioData;
