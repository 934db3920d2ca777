use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;

use redub_core::pipeline::config::PipelineConfig;
use redub_core::pipeline::Pipeline;
use redub_core::segment::source::RawSegment;
use redub_core::tts::mock::{MockBehavior, MockSynthesizer};
use redub_core::voice::assignment::VoiceAssignment;

/// Shared setup for pipeline integration tests: a mock provider, a scratch
/// directory holding the output path, and a dedicated workdir root so tests
/// can observe that intermediate artifacts are gone after a run.
pub struct Fixture {
    pub mock: MockSynthesizer,
    pub output_path: PathBuf,
    pub workdir_root: PathBuf,
    scratch: TempDir,
}

impl Fixture {
    #[allow(dead_code)]
    pub fn new() -> Self {
        Self::with_behavior(MockBehavior::Success)
    }

    pub fn with_behavior(behavior: MockBehavior) -> Self {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let scratch = TempDir::new().unwrap();
        let output_path = scratch.path().join("track.wav");
        let workdir_root = scratch.path().join("work");
        std::fs::create_dir_all(&workdir_root).unwrap();

        Self {
            mock: MockSynthesizer::new(behavior),
            output_path,
            workdir_root,
            scratch,
        }
    }

    pub fn pipeline(&self) -> Pipeline {
        self.pipeline_with(|_| {})
    }

    pub fn pipeline_with(&self, tweak: impl FnOnce(&mut PipelineConfig)) -> Pipeline {
        let mut config = PipelineConfig::new(two_speaker_voices(), &self.output_path);
        config.workdir_root = Some(self.workdir_root.clone());
        tweak(&mut config);
        Pipeline::new(Arc::new(self.mock.clone()), config).unwrap()
    }

    #[allow(dead_code)]
    pub fn scratch_path(&self) -> &Path {
        self.scratch.path()
    }

    /// True when no intermediate working directory is left under the root.
    pub fn workdir_root_is_empty(&self) -> bool {
        std::fs::read_dir(&self.workdir_root).unwrap().next().is_none()
    }

    /// Samples of the written output track.
    pub fn output_samples(&self) -> Vec<i16> {
        let reader = hound::WavReader::open(&self.output_path).unwrap();
        reader.into_samples::<i16>().map(|s| s.unwrap()).collect()
    }
}

pub fn two_speaker_voices() -> VoiceAssignment {
    let mut voices = VoiceAssignment::new();
    voices.assign("SPEAKER_00", "alloy");
    voices.assign("SPEAKER_01", "onyx");
    voices
}

/// Raw segments alternating between the two known speakers, with the text
/// "segment <i>" the mock derives its payload tags from.
pub fn segments(count: usize) -> Vec<RawSegment> {
    (0..count)
        .map(|i| RawSegment {
            speaker: if i % 2 == 0 {
                "SPEAKER_00".to_string()
            } else {
                "SPEAKER_01".to_string()
            },
            text: format!("segment {i}"),
        })
        .collect()
}

/// The samples the assembled track should contain for the given segment
/// texts, in order.
#[allow(dead_code)]
pub fn expected_samples(texts: &[&str]) -> Vec<i16> {
    texts
        .iter()
        .flat_map(|text| {
            MockSynthesizer::stub_payload(text)
                .pcm_data
                .chunks_exact(2)
                .map(|c| i16::from_le_bytes([c[0], c[1]]))
                .collect::<Vec<i16>>()
        })
        .collect()
}
