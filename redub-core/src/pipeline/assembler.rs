//! Orders successful outcomes and concatenates them into one track.
//!
//! Sorting by segment index is the step that undoes the pool's arbitrary
//! completion order; the index is the sole sort key. Failed segments are
//! omitted from the track, never silence-padded.

use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavSpec, WavWriter};
use thiserror::Error;
use tracing::debug;

use crate::pipeline::collector::{OutcomeStatus, SynthesisOutcome};
use crate::pipeline::config::OutputEncoding;
use crate::tts::types::AudioData;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("no segments were synthesized successfully")]
    NoSuccessfulSegments,

    #[error(
        "segment {index} has sample format {found_rate} Hz/{found_channels}ch, \
         track is {expected_rate} Hz/{expected_channels}ch"
    )]
    FormatMismatch {
        index: usize,
        expected_rate: u32,
        expected_channels: u16,
        found_rate: u32,
        found_channels: u16,
    },

    #[error("failed to encode assembled track: {0}")]
    Encode(#[from] hound::Error),

    #[error("failed to write assembled track: {0}")]
    Io(#[from] std::io::Error),
}

/// The order-correct concatenation of all successful segment audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledTrack {
    pub audio: AudioData,
    /// Indices of the segments present in the track, ascending.
    pub segment_indices: Vec<usize>,
}

/// Concatenate successful payloads by ascending segment index.
///
/// All payloads must share one sample rate and channel count; a mismatch is
/// an explicit failure rather than a silently corrupt track. Zero successes
/// fail too, since an empty output file is not success.
pub fn assemble(mut outcomes: Vec<SynthesisOutcome>) -> Result<AssembledTrack, AssemblyError> {
    outcomes.sort_by_key(|outcome| outcome.index);

    let mut segment_indices = Vec::new();
    let mut pcm_data = Vec::new();
    let mut format: Option<(u32, u16)> = None;

    for outcome in outcomes {
        let audio = match outcome.status {
            OutcomeStatus::Success(audio) => audio,
            OutcomeStatus::Failure(_) => continue,
        };

        match format {
            None => format = Some((audio.sample_rate, audio.channels)),
            Some((expected_rate, expected_channels)) => {
                if audio.sample_rate != expected_rate || audio.channels != expected_channels {
                    return Err(AssemblyError::FormatMismatch {
                        index: outcome.index,
                        expected_rate,
                        expected_channels,
                        found_rate: audio.sample_rate,
                        found_channels: audio.channels,
                    });
                }
            }
        }

        segment_indices.push(outcome.index);
        pcm_data.extend_from_slice(&audio.pcm_data);
    }

    let Some((sample_rate, channels)) = format else {
        return Err(AssemblyError::NoSuccessfulSegments);
    };

    debug!(
        segments = segment_indices.len(),
        bytes = pcm_data.len(),
        "assembled track"
    );

    Ok(AssembledTrack {
        audio: AudioData {
            pcm_data,
            sample_rate,
            channels,
        },
        segment_indices,
    })
}

/// Write the track to `output_path`.
///
/// The track is staged through a temporary sibling and renamed into place so
/// a failed write never leaves a partial file at the destination.
pub fn write_track(
    track: &AssembledTrack,
    output_path: &Path,
    encoding: OutputEncoding,
) -> Result<(), AssemblyError> {
    let staging = staging_path(output_path);

    let written = match encoding {
        OutputEncoding::Wav => write_wav(&track.audio, &staging),
        OutputEncoding::Pcm => {
            std::fs::write(&staging, &track.audio.pcm_data).map_err(AssemblyError::Io)
        }
    };

    if let Err(error) = written {
        let _ = std::fs::remove_file(&staging);
        return Err(error);
    }

    std::fs::rename(&staging, output_path)?;
    Ok(())
}

fn staging_path(output_path: &Path) -> PathBuf {
    let mut staged = output_path.as_os_str().to_os_string();
    staged.push(".partial");
    PathBuf::from(staged)
}

fn write_wav(audio: &AudioData, path: &Path) -> Result<(), AssemblyError> {
    let spec = WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for chunk in audio.pcm_data.chunks_exact(2) {
        writer.write_sample(i16::from_le_bytes([chunk[0], chunk[1]]))?;
    }
    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use tempfile::TempDir;

    fn success(index: usize, byte: u8) -> SynthesisOutcome {
        SynthesisOutcome {
            index,
            status: OutcomeStatus::Success(AudioData {
                pcm_data: vec![byte; 4],
                sample_rate: 16_000,
                channels: 1,
            }),
        }
    }

    fn failure(index: usize) -> SynthesisOutcome {
        SynthesisOutcome {
            index,
            status: OutcomeStatus::Failure("synthesis failed".to_string()),
        }
    }

    #[test]
    fn concatenates_in_ascending_index_order_regardless_of_arrival() {
        let track = assemble(vec![success(2, 0xCC), success(0, 0xAA), success(1, 0xBB)]).unwrap();

        assert_eq!(track.segment_indices, vec![0, 1, 2]);
        let expected: Vec<u8> = [0xAA, 0xBB, 0xCC]
            .iter()
            .flat_map(|&b| vec![b; 4])
            .collect();
        assert_eq!(track.audio.pcm_data, expected);
    }

    #[test]
    fn failed_segments_are_omitted_not_padded() {
        let track = assemble(vec![success(0, 0xAA), failure(1), success(2, 0xCC)]).unwrap();

        assert_eq!(track.segment_indices, vec![0, 2]);
        let expected: Vec<u8> = [0xAA, 0xCC].iter().flat_map(|&b| vec![b; 4]).collect();
        assert_eq!(track.audio.pcm_data, expected);
    }

    #[test]
    fn zero_successes_is_an_error() {
        let result = assemble(vec![failure(0), failure(1)]);
        assert!(matches!(result, Err(AssemblyError::NoSuccessfulSegments)));
    }

    #[test]
    fn mismatched_sample_rate_fails_naming_the_segment() {
        let odd_one_out = SynthesisOutcome {
            index: 1,
            status: OutcomeStatus::Success(AudioData {
                pcm_data: vec![0; 4],
                sample_rate: 24_000,
                channels: 1,
            }),
        };

        let result = assemble(vec![success(0, 0xAA), odd_one_out]);
        match result {
            Err(AssemblyError::FormatMismatch {
                index,
                expected_rate,
                found_rate,
                ..
            }) => {
                assert_eq!(index, 1);
                assert_eq!(expected_rate, 16_000);
                assert_eq!(found_rate, 24_000);
            }
            other => panic!("expected FormatMismatch, got {other:?}"),
        }
    }

    #[test]
    fn wav_output_round_trips_samples_in_order() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("track.wav");

        let track = assemble(vec![success(0, 0x01), success(1, 0x02)]).unwrap();
        write_track(&track, &output, OutputEncoding::Wav).unwrap();

        let reader = hound::WavReader::open(&output).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.channels, 1);

        let samples: Vec<i16> = reader.into_samples::<i16>().map(|s| s.unwrap()).collect();
        let expected: Vec<i16> = track
            .audio
            .pcm_data
            .chunks_exact(2)
            .map(|c| i16::from_le_bytes([c[0], c[1]]))
            .collect();
        assert_eq!(samples, expected);
    }

    #[test]
    fn pcm_output_is_the_raw_payload() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("track.pcm");

        let track = assemble(vec![success(0, 0x7F)]).unwrap();
        write_track(&track, &output, OutputEncoding::Pcm).unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), track.audio.pcm_data);
    }

    #[test]
    fn no_staging_file_is_left_beside_the_output() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("track.wav");

        let track = assemble(vec![success(0, 0x01)]).unwrap();
        write_track(&track, &output, OutputEncoding::Wav).unwrap();

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("track.wav")]);
    }
}
