//! Process execution - running shell command lines and capturing their output

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, info, trace};

use crate::error::{E2eError, E2eResult};
use crate::invocation::InvocationResult;

/// How much of a command's output ends up in the logs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Log stdout/stderr at info level
    #[default]
    Echo,
    /// Only trace-level logging; for commands with huge output
    Silent,
}

/// Capability to run a command line to completion
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command_line: &str, mode: OutputMode) -> E2eResult<InvocationResult>;
}

/// Runs command lines through `sh -c`
#[derive(Debug, Clone, Default)]
pub struct ShellRunner {
    /// Kill the command if it runs longer than this
    pub timeout: Option<Duration>,
}

impl ShellRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Command lines are executed as a single line; embedded line breaks are
/// dropped so multi-line string literals can be used in scenarios.
pub fn flatten_command_line(command_line: &str) -> String {
    command_line.replace(['\r', '\n'], "")
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command_line: &str, mode: OutputMode) -> E2eResult<InvocationResult> {
        let line = flatten_command_line(command_line);
        debug!("Running: {}", line);

        let child = Command::new("sh")
            .arg("-c")
            .arg(&line)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| E2eError::CommandSpawn {
                command: line.clone(),
                source,
            })?;

        let output = match self.timeout {
            // Dropping the wait future on expiry kills the child
            Some(limit) => timeout(limit, child.wait_with_output())
                .await
                .map_err(|_| E2eError::CommandTimeout {
                    command: line.clone(),
                    timeout: limit,
                })??,
            None => child.wait_with_output().await?,
        };

        // A child killed by a signal has no exit code
        let exit_code = output.status.code().unwrap_or(-1);
        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        match mode {
            OutputMode::Echo => {
                info!("`{}` exited with {}", line, exit_code);
                if !stdout.is_empty() {
                    info!("Out: {}", stdout.trim_end());
                }
                if !stderr.is_empty() {
                    info!("Error: {}", stderr.trim_end());
                }
            }
            OutputMode::Silent => {
                debug!("`{}` exited with {}", line, exit_code);
                trace!("Out: {}", stdout);
                trace!("Error: {}", stderr);
            }
        }

        Ok(InvocationResult::new(command_line, exit_code, stdout, stderr))
    }
}
