//! Loads and validates the ordered segment list.
//!
//! The upstream translation step produces a JSON document whose array order
//! is the authoritative sequence. Each entry becomes a [`Segment`] carrying
//! its list position as `index`; everything downstream treats segments as
//! read-only.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One unit of attributed text with a fixed position in the overall sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub speaker: String,
    pub text: String,
}

/// Segment document produced by the upstream translation step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentDocument {
    pub translated_segments: Vec<RawSegment>,
}

/// A segment entry as it appears on the wire, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSegment {
    pub speaker: String,
    pub text: String,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to parse segment document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("segment list is empty")]
    Empty,

    #[error("segment {index} has an empty text field")]
    EmptyText { index: usize },

    #[error("segment {index} has an empty speaker field")]
    EmptySpeaker { index: usize },
}

/// Parse a JSON segment document into its raw entry list.
pub fn parse_document(json: &str) -> Result<Vec<RawSegment>, LoadError> {
    let document: SegmentDocument = serde_json::from_str(json)?;
    Ok(document.translated_segments)
}

/// Validate raw entries and assign each its list position as `index`.
///
/// An empty job produces no meaningful output and is rejected rather than
/// silently succeeding.
pub fn load_segments(raw: Vec<RawSegment>) -> Result<Vec<Segment>, LoadError> {
    if raw.is_empty() {
        return Err(LoadError::Empty);
    }

    let mut segments = Vec::with_capacity(raw.len());
    for (index, entry) in raw.into_iter().enumerate() {
        if entry.text.trim().is_empty() {
            return Err(LoadError::EmptyText { index });
        }
        if entry.speaker.trim().is_empty() {
            return Err(LoadError::EmptySpeaker { index });
        }
        segments.push(Segment {
            index,
            speaker: entry.speaker,
            text: entry.text,
        });
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(speaker: &str, text: &str) -> RawSegment {
        RawSegment {
            speaker: speaker.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn assigns_dense_indices_in_list_order() {
        let segments = load_segments(vec![
            raw("SPEAKER_00", "first"),
            raw("SPEAKER_01", "second"),
            raw("SPEAKER_00", "third"),
        ])
        .unwrap();

        let indices: Vec<usize> = segments.iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![0, 1, 2]);
        assert_eq!(segments[1].speaker, "SPEAKER_01");
        assert_eq!(segments[2].text, "third");
    }

    #[test]
    fn rejects_empty_list() {
        let result = load_segments(Vec::new());
        assert!(matches!(result, Err(LoadError::Empty)));
    }

    #[test]
    fn rejects_blank_text_naming_the_entry() {
        let result = load_segments(vec![raw("SPEAKER_00", "ok"), raw("SPEAKER_01", "   ")]);
        assert!(matches!(result, Err(LoadError::EmptyText { index: 1 })));
    }

    #[test]
    fn rejects_blank_speaker_naming_the_entry() {
        let result = load_segments(vec![raw("", "hello")]);
        assert!(matches!(result, Err(LoadError::EmptySpeaker { index: 0 })));
    }

    #[test]
    fn parses_the_wire_document() {
        let json = r#"{
            "translated_segments": [
                {"speaker": "SPEAKER_00", "text": "hola"},
                {"speaker": "SPEAKER_01", "text": "buenos dias"}
            ]
        }"#;

        let raw = parse_document(json).unwrap();
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[0].text, "hola");
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        let result = parse_document(r#"{"translated_segments": "not a list"}"#);
        assert!(matches!(result, Err(LoadError::Parse(_))));
    }
}
