//! Harness configuration

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};
use crate::poll::PollOptions;

/// Where the CLI and backend live and how long to wait for them
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Path to the CLI binary under test
    pub cli_binary: PathBuf,

    /// Base URL of the backend inventory API
    pub backend_url: String,

    /// Namespace the platform components are deployed to
    pub backend_namespace: String,

    /// Per-request HTTP timeout
    pub http_timeout_secs: u64,

    /// Kill commands running longer than this (None = no limit)
    pub command_timeout_secs: Option<u64>,

    /// Default wait between poll attempts
    pub poll_interval_ms: u64,

    /// Default total poll budget
    pub poll_timeout_secs: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            cli_binary: PathBuf::from("../bin/everest"),
            backend_url: "http://127.0.0.1:8080".to_string(),
            backend_namespace: "percona-everest".to_string(),
            http_timeout_secs: 10,
            command_timeout_secs: None,
            poll_interval_ms: 1000,
            poll_timeout_secs: 240,
        }
    }
}

impl HarnessConfig {
    /// Load configuration from a YAML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> E2eResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_yaml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Override fields from `E2E_*` environment variables.
    pub fn apply_env(self) -> E2eResult<Self> {
        self.apply_vars(|key| std::env::var(key).ok())
    }

    fn apply_vars<F>(mut self, lookup: F) -> E2eResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(binary) = lookup("E2E_CLI_BINARY") {
            self.cli_binary = PathBuf::from(binary);
        }
        if let Some(url) = lookup("E2E_BACKEND_URL") {
            self.backend_url = url;
        }
        if let Some(namespace) = lookup("E2E_BACKEND_NAMESPACE") {
            self.backend_namespace = namespace;
        }
        if let Some(secs) = lookup("E2E_COMMAND_TIMEOUT_SECS") {
            let secs = secs.parse::<u64>().map_err(|e| {
                E2eError::Config(format!("E2E_COMMAND_TIMEOUT_SECS={secs:?}: {e}"))
            })?;
            self.command_timeout_secs = Some(secs);
        }
        Ok(self)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn command_timeout(&self) -> Option<Duration> {
        self.command_timeout_secs.map(Duration::from_secs)
    }

    /// Poll options using the configured default interval and budget.
    pub fn default_poll_options(&self, message: impl Into<String>) -> PollOptions {
        PollOptions::fixed(
            Duration::from_millis(self.poll_interval_ms),
            Duration::from_secs(self.poll_timeout_secs),
            message,
        )
    }
}

/// Configuration for the spec runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub harness: HarnessConfig,
    pub specs_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Number of specs executed concurrently
    pub parallelism: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            harness: HarnessConfig::default(),
            specs_dir: PathBuf::from("specs"),
            output_dir: PathBuf::from("test-results"),
            parallelism: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = HarnessConfig::from_yaml(
            r#"
backend_url: http://10.0.0.5:8080
poll_timeout_secs: 30
"#,
        )
        .unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.5:8080");
        assert_eq!(config.poll_timeout_secs, 30);
        assert_eq!(config.backend_namespace, "percona-everest");
        assert_eq!(config.poll_interval_ms, 1000);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = HarnessConfig::load(Path::new("/nonexistent/e2e.yaml")).unwrap();
        assert_eq!(config.cli_binary, PathBuf::from("../bin/everest"));
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("E2E_CLI_BINARY", "/usr/local/bin/everest"),
            ("E2E_COMMAND_TIMEOUT_SECS", "90"),
        ]
        .into_iter()
        .collect();

        let config = HarnessConfig::default()
            .apply_vars(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.cli_binary, PathBuf::from("/usr/local/bin/everest"));
        assert_eq!(config.command_timeout(), Some(Duration::from_secs(90)));
        assert_eq!(config.backend_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_timeout_env_rejected() {
        let err = HarnessConfig::default()
            .apply_vars(|key| (key == "E2E_COMMAND_TIMEOUT_SECS").then(|| "soon".to_string()))
            .unwrap_err();
        assert!(matches!(err, E2eError::Config(_)));
    }

    #[test]
    fn test_default_poll_options() {
        let options = HarnessConfig::default().default_poll_options("dbengines");
        assert_eq!(options.intervals, vec![Duration::from_secs(1)]);
        assert_eq!(options.timeout, Duration::from_secs(240));
        assert!(options.validate().is_ok());
    }
}
