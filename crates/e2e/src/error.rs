//! Error types for E2E testing

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum E2eError {
    #[error(
        "Unexpected exit code for `{command}`: expected {expected}, got {actual}\n\
         --- stdout ---\n{stdout}\n--- stderr ---\n{stderr}"
    )]
    UnexpectedExitCode {
        command: String,
        expected: i32,
        actual: i32,
        stdout: String,
        stderr: String,
    },

    #[error("Missing expected text in {stream} of `{command}`: {expected:?}\n--- actual ---\n{excerpt}")]
    MissingExpectedText {
        command: String,
        stream: &'static str,
        expected: String,
        excerpt: String,
    },

    #[error("Unexpected text in {stream} of `{command}`: {unexpected:?}\n--- actual ---\n{excerpt}")]
    UnexpectedText {
        command: String,
        stream: &'static str,
        unexpected: String,
        excerpt: String,
    },

    /// Observed system state (backend inventory, cluster resources) does not
    /// match yet.
    #[error("Unexpected state for {check}: {detail}")]
    UnexpectedState { check: &'static str, detail: String },

    #[error("Invalid poll configuration: {0}")]
    InvalidPollConfig(String),

    #[error("{message}: not ready after {attempts} attempt(s) in {elapsed:?}; last reason: {reason}")]
    PollTimeout {
        message: String,
        attempts: u32,
        elapsed: Duration,
        reason: String,
    },

    #[error("Fatal: {0}")]
    Fatal(String),

    #[error("Failed to spawn `{command}`: {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command `{command}` did not finish within {timeout:?}")]
    CommandTimeout { command: String, timeout: Duration },

    #[error("Step failed: {step} - {source}")]
    StepFailed {
        step: String,
        #[source]
        source: Box<E2eError>,
    },

    #[error("Test spec parse error: {0}")]
    SpecParse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Backend returned {status} for {url}")]
    Backend { url: String, status: u16 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl E2eError {
    /// Whether this is an assertion failure on output, exit code or observed
    /// state, as opposed to an infrastructure or programming error.
    pub fn is_assertion(&self) -> bool {
        match self {
            E2eError::UnexpectedExitCode { .. }
            | E2eError::MissingExpectedText { .. }
            | E2eError::UnexpectedText { .. }
            | E2eError::UnexpectedState { .. } => true,
            E2eError::StepFailed { source, .. } => source.is_assertion(),
            _ => false,
        }
    }
}

pub type E2eResult<T> = Result<T, E2eError>;
