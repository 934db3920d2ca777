pub mod assignment;

pub use assignment::{ConfigurationError, ResolvedSegment, VoiceAssignment};
