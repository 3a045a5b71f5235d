use std::path::PathBuf;
use thiserror::Error;

/// Failures surfaced by the clustering pipeline.
///
/// Precondition failures (`EngineUnavailable`, `InputTooLarge`) are raised before
/// any stage runs. `StageFailed` is terminal for the run; nothing is retried.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("{engine} not found in your PATH ({source})")]
    EngineUnavailable {
        engine: String,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "{path} is {size} bytes; files of 4 GB or larger need a 64-bit clustering engine"
    )]
    InputTooLarge { path: PathBuf, size: u64 },

    #[error("stage '{stage}' failed: {reason}")]
    StageFailed { stage: String, reason: String },

    #[error("invalid request for stage '{stage}': {reason}")]
    InvalidRequest { stage: String, reason: String },

    #[error("{}:{line}: {detail}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        detail: String,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(path: impl Into<PathBuf>, line: usize, detail: impl Into<String>) -> Self {
        PipelineError::Parse {
            path: path.into(),
            line,
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
