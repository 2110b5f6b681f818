use crate::download::Failure;
use itertools::Itertools;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KemonoDlError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Configuration validation failed: {details}")]
    ConfigValidation { details: String },

    #[error("Invalid command line arguments: {details}")]
    CliArgumentValidation { details: String },

    #[error("Failed to open log file {path}: {source}")]
    LogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(
        "None of the {} post URLs could be resolved:\n{}",
        .failures.len(),
        failure_lines(.failures)
    )]
    NoPostsResolved { failures: Vec<Failure> },

    #[error("Unexpected error: {0}")]
    Unexpected(#[from] eyre::Report),
}

fn failure_lines(failures: &[Failure]) -> String {
    failures.iter().map(|failure| format!("  {failure}")).join("\n")
}
