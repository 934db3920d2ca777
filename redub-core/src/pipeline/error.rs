use thiserror::Error;

use crate::pipeline::assembler::AssemblyError;
use crate::segment::source::LoadError;
use crate::voice::assignment::ConfigurationError;

/// Fatal pipeline faults. Per-segment synthesis failures are not errors at
/// this level; they surface through the run summary instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    #[error("run aborted before completion")]
    Aborted,

    #[error("failed to create working directory: {0}")]
    Workdir(#[source] std::io::Error),
}
