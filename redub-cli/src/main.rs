use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod config;

use redub_core::pipeline::config::{OutputEncoding, PipelineConfig, DEFAULT_MAX_WORKERS};
use redub_core::pipeline::Pipeline;
use redub_core::segment::source;
use redub_core::tts::elevenlabs::{ElevenLabs, ElevenLabsConfig};
use redub_core::tts::openai::{OpenAiTts, OpenAiTtsConfig};
use redub_core::tts::provider::TextToSpeech;

use crate::config::{JobConfig, ProviderConfig};

#[derive(Parser, Debug)]
#[command(name = "redub")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Redub - parallel speech synthesis with ordered reassembly")]
struct Args {
    /// Translated segment document (JSON)
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Destination path for the assembled track
    #[arg(long, value_name = "FILE")]
    output: PathBuf,

    /// Job configuration: provider and voice assignment (TOML)
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// Maximum number of concurrent synthesis calls
    #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
    max_workers: usize,

    /// Encoding of the assembled track
    #[arg(long, value_enum, default_value = "wav")]
    encoding: EncodingArg,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum EncodingArg {
    Wav,
    Pcm,
}

impl From<EncodingArg> for OutputEncoding {
    fn from(encoding: EncodingArg) -> Self {
        match encoding {
            EncodingArg::Wav => OutputEncoding::Wav,
            EncodingArg::Pcm => OutputEncoding::Pcm,
        }
    }
}

fn main() -> Result<()> {
    setup_tracing();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main())
}

async fn async_main() -> Result<()> {
    let args = Args::parse();

    let job = JobConfig::load(&args.config)?;
    let api_key = require_api_key(&job)?;
    let provider = build_provider(&job, api_key);

    let contents = std::fs::read_to_string(&args.input)
        .with_context(|| format!("Failed to read input file: {:?}", args.input))?;
    let raw = source::parse_document(&contents)?;

    info!(
        input = ?args.input,
        segments = raw.len(),
        max_workers = args.max_workers,
        "starting redub run"
    );

    let mut pipeline_config = PipelineConfig::new(job.voice_assignment(), &args.output);
    pipeline_config.max_workers = args.max_workers;
    pipeline_config.output_encoding = args.encoding.into();

    let pipeline = Pipeline::new(provider, pipeline_config)?;
    let report = pipeline.run(raw).await?;

    println!("Wrote {}", report.output_path.display());
    println!(
        "Segments: {} succeeded, {} failed (of {})",
        report.summary.succeeded, report.summary.failed, report.summary.total
    );
    if !report.summary.failed_indices.is_empty() {
        let indices: Vec<String> = report
            .summary
            .failed_indices
            .iter()
            .map(|index| index.to_string())
            .collect();
        println!("Failed segment indices: {}", indices.join(", "));
    }

    Ok(())
}

fn require_api_key(job: &JobConfig) -> Result<String> {
    let var = job.api_key_env();
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => Ok(key),
        _ => bail!("Missing required environment variable: {var}"),
    }
}

fn build_provider(job: &JobConfig, api_key: String) -> Arc<dyn TextToSpeech> {
    match &job.provider {
        ProviderConfig::OpenAi { model } => {
            let mut config = OpenAiTtsConfig::new(api_key);
            config.model = model.clone();
            Arc::new(OpenAiTts::new(config))
        }
        ProviderConfig::ElevenLabs { model_id } => {
            let mut config = ElevenLabsConfig::new(api_key);
            config.model_id = model_id.clone();
            Arc::new(ElevenLabs::new(config))
        }
    }
}

fn setup_tracing() {
    use tracing_subscriber::fmt;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
}
