use std::path::PathBuf;
use std::time::Duration;

use hyper::StatusCode;
use thiserror::Error;

/// Failures that abort a refresh run before the output file is written.
#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Invalid URI: {0}")]
    InvalidUri(String),
    #[error("Network Error: could not fetch JSON. {0}")]
    Network(String),
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),
    #[error("HTTP Error: upstream answered {status}")]
    Http { status: StatusCode },
    #[error("Response body is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Target key '{key}' not found in source JSON")]
    MissingKey { key: String },
    #[error("Target key '{key}' does not hold a string value")]
    NotAString { key: String },
    #[error("failed to write `{path}`: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl UpdateError {
    pub fn is_schema(&self) -> bool {
        matches!(self, Self::MissingKey { .. } | Self::NotAString { .. })
    }
}

/// Working-tree inspection failures. Logged, never fatal on their own.
#[derive(Debug, Error)]
pub enum VcsError {
    #[error("git could not be spawned: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("`{root}` is not a git working tree")]
    NotAWorkTree { root: PathBuf },
    #[error("git {command} failed: {stderr}")]
    Command { command: &'static str, stderr: String },
}
