pub mod pipeline;
pub mod segment;
pub mod tts;
pub mod voice;

// Public library API - if you are using redub as a library, I will aim to
// keep these types more stable (but everything is public so go nuts).
pub use pipeline::collector::RunSummary;
pub use pipeline::config::{OutputEncoding, PipelineConfig};
pub use pipeline::error::PipelineError;
pub use pipeline::scheduler::StopHandle;
pub use pipeline::{Pipeline, RunReport};
pub use segment::source::Segment;
pub use tts::provider::TextToSpeech;
pub use voice::assignment::VoiceAssignment;
