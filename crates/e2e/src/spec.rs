//! Declarative YAML check specifications

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{E2eError, E2eResult};
use crate::invocation::InvocationResult;
use crate::poll::PollOptions;

/// A complete check specification parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSpec {
    /// Unique name for this test
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering tests
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<TestStep>,
}

/// A single step in a test
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum TestStep {
    /// Run a command once and check its outcome
    Run {
        #[serde(flatten)]
        command: CommandSpec,
        #[serde(default)]
        expect: Expectation,
    },

    /// Re-run a command until its outcome matches
    Poll {
        #[serde(flatten)]
        command: CommandSpec,
        #[serde(default)]
        expect: Expectation,
        #[serde(default = "default_intervals")]
        intervals_ms: Vec<u64>,
        #[serde(default = "default_poll_timeout")]
        timeout_ms: u64,
        #[serde(default)]
        message: Option<String>,
    },

    /// Log a message (for debugging)
    Log { message: String },
}

fn default_intervals() -> Vec<u64> {
    vec![1000]
}

fn default_poll_timeout() -> u64 {
    60_000
}

/// What to run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Command line; may contain `{kubernetes_id}` and `{cluster_name}`
    pub command: String,

    /// Prefix the command with the CLI binary
    #[serde(default)]
    pub tool: bool,

    /// Append `--skip-wizard` (implies `tool`)
    #[serde(default)]
    pub skip_wizard: bool,
}

/// Checks applied to an [`InvocationResult`], in field order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Expectation {
    /// Require exit code 0
    pub success: bool,
    pub exit_code: Option<i32>,
    pub out_contains: Vec<String>,
    pub out_err_contains: Vec<String>,
    pub out_contains_normalized: Vec<String>,
    pub out_err_contains_normalized: Vec<String>,
    pub out_not_contains: Vec<String>,
}

impl Expectation {
    pub fn verify(&self, out: &InvocationResult) -> E2eResult<()> {
        if self.success {
            out.assert_success()?;
        }
        if let Some(code) = self.exit_code {
            out.exit_code_equals(code)?;
        }
        out.out_contains(&self.out_contains)?;
        out.out_err_contains(&self.out_err_contains)?;
        out.out_contains_normalized_many(&self.out_contains_normalized)?;
        out.out_err_contains_normalized_many(&self.out_err_contains_normalized)?;
        out.out_not_contains(&self.out_not_contains)?;
        Ok(())
    }
}

impl TestStep {
    /// Short name used in logs and results
    pub fn name(&self) -> String {
        match self {
            TestStep::Run { command, .. } => format!("run:{}", command.command),
            TestStep::Poll { command, .. } => format!("poll:{}", command.command),
            TestStep::Log { message } => {
                format!("log:{}", message.chars().take(30).collect::<String>())
            }
        }
    }
}

/// Build poll options from a spec step's millisecond fields.
pub fn poll_options(intervals_ms: &[u64], timeout_ms: u64, message: &str) -> E2eResult<PollOptions> {
    PollOptions::new(
        intervals_ms.iter().copied().map(Duration::from_millis).collect(),
        Duration::from_millis(timeout_ms),
        message,
    )
}

impl TestSpec {
    /// Parse a test spec from YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a test spec from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| E2eError::SpecParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all test specs from a directory
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        let mut paths: Vec<_> = walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
            .map(|e| e.into_path())
            .collect();
        paths.sort();

        for path in paths {
            specs.push(Self::from_file(&path)?);
        }

        Ok(specs)
    }

    /// Filter specs by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs.iter().filter(|s| s.tags.iter().any(|t| t == tag)).collect()
    }
}
