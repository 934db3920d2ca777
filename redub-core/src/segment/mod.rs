pub mod source;

pub use source::{LoadError, RawSegment, Segment};
