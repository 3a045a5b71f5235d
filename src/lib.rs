pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod otu;
pub mod pipeline;
pub mod types;
pub mod utils;

pub use error::{PipelineError, Result};
pub use pipeline::{Pipeline, PipelineOptions, PipelineReport};
