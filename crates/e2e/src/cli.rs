//! Helper for running shell commands and the CLI binary under test

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::E2eResult;
use crate::exec::{CommandRunner, OutputMode, ShellRunner};
use crate::invocation::InvocationResult;
use crate::steps::step;

/// Flag that bypasses the interactive installation wizard
pub const SKIP_WIZARD_FLAG: &str = "--skip-wizard";

/// Runs commands through a [`CommandRunner`] and wraps the outcome into an
/// [`InvocationResult`].
#[derive(Clone)]
pub struct CliHelper {
    runner: Arc<dyn CommandRunner>,
    binary: PathBuf,
}

impl std::fmt::Debug for CliHelper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CliHelper")
            .field("binary", &self.binary)
            .finish_non_exhaustive()
    }
}

impl CliHelper {
    pub fn new(runner: Arc<dyn CommandRunner>, binary: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            binary: binary.into(),
        }
    }

    /// Helper backed by a plain [`ShellRunner`]
    pub fn shell(binary: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(ShellRunner::new()), binary)
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Full command line invoking the CLI binary with `args`
    pub fn tool_command(&self, args: &str) -> String {
        format!("{} {}", self.binary.display(), args)
    }

    /// Run `command` with its output echoed to the log.
    pub async fn execute(&self, command: &str) -> E2eResult<InvocationResult> {
        self.runner.run(command, OutputMode::Echo).await
    }

    /// Same as [`execute`](Self::execute), reported as a named step.
    pub async fn exec(&self, command: &str) -> E2eResult<InvocationResult> {
        step(&format!("Run \"{}\" command", command), self.execute(command)).await
    }

    /// Run `command` without logging its output.
    pub async fn exec_silent(&self, command: &str) -> E2eResult<InvocationResult> {
        self.runner.run(command, OutputMode::Silent).await
    }

    /// Run the CLI binary with `args`, output not logged.
    pub async fn tool_exec_silent(&self, args: &str) -> E2eResult<InvocationResult> {
        let command = self.tool_command(args);
        step(
            &format!("Run CLI \"{}\" command", args),
            self.runner.run(&command, OutputMode::Silent),
        )
        .await
    }

    /// Run the CLI binary with `args` and `--skip-wizard` appended.
    pub async fn tool_exec_skip_wizard(&self, args: &str) -> E2eResult<InvocationResult> {
        let command = format!("{} {}", self.tool_command(args), SKIP_WIZARD_FLAG);
        step(
            &format!("Run \"{}\" command with {}", args, SKIP_WIZARD_FLAG),
            self.runner.run(&command, OutputMode::Echo),
        )
        .await
    }
}
