//! Main test runner that executes declarative check specs against the CLI

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::cli::SKIP_WIZARD_FLAG;
use crate::config::RunnerConfig;
use crate::context::ScenarioContext;
use crate::error::{E2eError, E2eResult};
use crate::exec::{CommandRunner, OutputMode, ShellRunner};
use crate::poll::{poll, PollOutcome};
use crate::spec::{poll_options, CommandSpec, Expectation, TestSpec, TestStep};
use crate::steps::{record_step, StepResult};

/// Result of running a single test
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,
    pub error: Option<String>,
}

/// Result of running all tests
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSuiteResult {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub duration_ms: u64,
    pub results: Vec<TestResult>,
}

/// Main E2E test runner
pub struct TestRunner {
    config: RunnerConfig,
    runner: Arc<dyn CommandRunner>,
}

impl TestRunner {
    /// Create a new test runner with default configuration
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// Create a test runner executing commands through `sh -c`
    pub fn with_config(config: RunnerConfig) -> Self {
        let shell = ShellRunner {
            timeout: config.harness.command_timeout(),
        };
        Self::with_command_runner(config, Arc::new(shell))
    }

    /// Create a test runner with a custom process-execution capability
    pub fn with_command_runner(config: RunnerConfig, runner: Arc<dyn CommandRunner>) -> Self {
        Self { config, runner }
    }

    /// Run all tests in the specs directory
    pub async fn run_all(&self) -> E2eResult<TestSuiteResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        Ok(self.run_specs(&specs).await)
    }

    /// Run tests matching a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<TestSuiteResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        let filtered: Vec<TestSpec> = TestSpec::filter_by_tag(&specs, tag)
            .into_iter()
            .cloned()
            .collect();
        Ok(self.run_specs(&filtered).await)
    }

    /// Run a specific test by name
    pub async fn run_test(&self, name: &str) -> E2eResult<TestResult> {
        let specs = TestSpec::load_all(&self.config.specs_dir)?;
        let spec = specs
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SpecParse(format!("Test not found: {}", name)))?;

        Ok(self.run_spec(&spec).await)
    }

    /// Run a list of test specs, up to `parallelism` at a time
    pub async fn run_specs(&self, specs: &[TestSpec]) -> TestSuiteResult {
        let started_at = Utc::now();
        let start = Instant::now();

        info!(
            "Running {} test(s) with parallelism {}...",
            specs.len(),
            self.config.parallelism
        );

        let results: Vec<TestResult> = stream::iter(specs)
            .map(|spec| self.run_spec(spec))
            .buffered(self.config.parallelism.max(1))
            .collect()
            .await;

        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        let skipped = 0;
        let duration_ms = start.elapsed().as_millis() as u64;

        info!("");
        info!(
            "Test Results: {} passed, {} failed, {} skipped ({} ms)",
            passed, failed, skipped, duration_ms
        );

        TestSuiteResult {
            started_at,
            total: specs.len(),
            passed,
            failed,
            skipped,
            duration_ms,
            results,
        }
    }

    /// Run a single test spec with its own scenario context
    pub async fn run_spec(&self, spec: &TestSpec) -> TestResult {
        let start = Instant::now();
        debug!("Running test: {}", spec.name);

        let mut step_results = Vec::new();
        let mut test_error: Option<String> = None;

        match ScenarioContext::new(self.config.harness.clone(), self.runner.clone()) {
            Ok(mut ctx) => {
                for step in &spec.steps {
                    let result = record_step(step.name(), self.execute_step(&mut ctx, step)).await;
                    let failed = !result.success;
                    if failed {
                        test_error = result.error.clone();
                    }
                    step_results.push(result);
                    if failed {
                        break; // Stop on first failure
                    }
                }
            }
            Err(e) => test_error = Some(e.to_string()),
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        let success = test_error.is_none();

        if success {
            info!("✓ {} ({} ms)", spec.name, duration_ms);
        } else {
            error!(
                "✗ {} - {}",
                spec.name,
                test_error.as_deref().unwrap_or("unknown error")
            );
        }

        TestResult {
            name: spec.name.clone(),
            success,
            duration_ms,
            steps: step_results,
            error: test_error,
        }
    }

    async fn execute_step(&self, ctx: &mut ScenarioContext, step: &TestStep) -> E2eResult<()> {
        match step {
            TestStep::Run { command, expect } => {
                let line = self.command_line(ctx, command).await?;
                let out = self.runner.run(&line, OutputMode::Echo).await?;
                expect.verify(&out)
            }
            TestStep::Poll {
                command,
                expect,
                intervals_ms,
                timeout_ms,
                message,
            } => {
                let line = self.command_line(ctx, command).await?;
                let message = message
                    .clone()
                    .unwrap_or_else(|| format!("waiting for `{}`", line));
                let options = poll_options(intervals_ms, *timeout_ms, &message)?;

                let line = line.as_str();
                poll(&options, move || self.check_once(line, expect)).await?;
                Ok(())
            }
            TestStep::Log { message } => {
                info!("[TEST LOG] {}", message);
                Ok(())
            }
        }
    }

    async fn check_once(&self, line: &str, expect: &Expectation) -> PollOutcome {
        match self.runner.run(line, OutputMode::Silent).await {
            Ok(out) => PollOutcome::from_check(expect.verify(&out)),
            Err(e) => PollOutcome::Fatal(e),
        }
    }

    async fn command_line(&self, ctx: &mut ScenarioContext, spec: &CommandSpec) -> E2eResult<String> {
        let rendered = ctx.render(&spec.command).await?;
        Ok(if spec.skip_wizard {
            format!("{} {}", ctx.cli.tool_command(&rendered), SKIP_WIZARD_FLAG)
        } else if spec.tool {
            ctx.cli.tool_command(&rendered)
        } else {
            rendered
        })
    }

    /// Write test results to JSON file
    pub fn write_results(&self, results: &TestSuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

impl Default for TestRunner {
    fn default() -> Self {
        Self::new()
    }
}

/// Summarize a single result as a suite, e.g. when running one test by name
impl From<TestResult> for TestSuiteResult {
    fn from(result: TestResult) -> Self {
        TestSuiteResult {
            started_at: Utc::now(),
            total: 1,
            passed: usize::from(result.success),
            failed: usize::from(!result.success),
            skipped: 0,
            duration_ms: result.duration_ms,
            results: vec![result],
        }
    }
}

