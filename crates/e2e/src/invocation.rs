//! Captured outcome of one external command and the assertions over it

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{E2eError, E2eResult};
use crate::normalize::normalize;

/// Maximum number of characters of output quoted in an assertion failure
const EXCERPT_LIMIT: usize = 2000;

const STDOUT: &str = "stdout";
const COMBINED: &str = "stdout+stderr";

/// Immutable record of a finished process: command line, exit code and both
/// captured streams.
///
/// Every assertion returns an [`E2eResult`], so a failed check propagates with
/// `?` and aborts the surrounding step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvocationResult {
    command: String,
    exit_code: i32,
    stdout: String,
    stderr: String,
}

impl InvocationResult {
    pub fn new(
        command: impl Into<String>,
        exit_code: i32,
        stdout: impl Into<String>,
        stderr: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            exit_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    /// stdout followed by stderr
    pub fn combined_output(&self) -> String {
        let mut combined = String::with_capacity(self.stdout.len() + self.stderr.len());
        combined.push_str(&self.stdout);
        combined.push_str(&self.stderr);
        combined
    }

    /// Deserialize stdout as JSON (e.g. output of `--json` or `-o json`)
    pub fn json<T: DeserializeOwned>(&self) -> E2eResult<T> {
        serde_json::from_str(&self.stdout).map_err(E2eError::from)
    }

    pub fn assert_success(&self) -> E2eResult<()> {
        self.exit_code_equals(0)
    }

    pub fn exit_code_equals(&self, expected: i32) -> E2eResult<()> {
        if self.exit_code == expected {
            return Ok(());
        }
        Err(E2eError::UnexpectedExitCode {
            command: self.command.clone(),
            expected,
            actual: self.exit_code,
            stdout: excerpt(&self.stdout),
            stderr: excerpt(&self.stderr),
        })
    }

    /// Every needle must be a literal substring of stdout.
    pub fn out_contains<I, S>(&self, needles: I) -> E2eResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.require_all(STDOUT, &self.stdout, needles, |needle| needle.to_owned())
    }

    /// Every needle must be a literal substring of stdout + stderr.
    pub fn out_err_contains<I, S>(&self, needles: I) -> E2eResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let combined = self.combined_output();
        self.require_all(COMBINED, &combined, needles, |needle| needle.to_owned())
    }

    /// Like [`out_contains`](Self::out_contains) with stdout and every
    /// needle normalized first.
    pub fn out_contains_normalized_many<I, S>(&self, needles: I) -> E2eResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let haystack = normalize(&self.stdout);
        self.require_all(STDOUT, &haystack, needles, normalize)
    }

    /// Like [`out_err_contains`](Self::out_err_contains) with the combined
    /// output and every needle normalized first.
    pub fn out_err_contains_normalized_many<I, S>(&self, needles: I) -> E2eResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let haystack = normalize(&self.combined_output());
        self.require_all(COMBINED, &haystack, needles, normalize)
    }

    /// No needle may occur literally in stdout.
    pub fn out_not_contains<I, S>(&self, needles: I) -> E2eResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.forbid_all(STDOUT, &self.stdout, needles)
    }

    /// No needle may occur literally in stdout + stderr.
    pub fn out_err_not_contains<I, S>(&self, needles: I) -> E2eResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let combined = self.combined_output();
        self.forbid_all(COMBINED, &combined, needles)
    }

    fn require_all<I, S, F>(
        &self,
        stream: &'static str,
        haystack: &str,
        needles: I,
        prepare: F,
    ) -> E2eResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> String,
    {
        for needle in needles {
            let needle = needle.as_ref();
            if !haystack.contains(prepare(needle).as_str()) {
                return Err(E2eError::MissingExpectedText {
                    command: self.command.clone(),
                    stream,
                    expected: needle.to_owned(),
                    excerpt: excerpt(haystack),
                });
            }
        }
        Ok(())
    }

    fn forbid_all<I, S>(&self, stream: &'static str, haystack: &str, needles: I) -> E2eResult<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for needle in needles {
            let needle = needle.as_ref();
            if haystack.contains(needle) {
                return Err(E2eError::UnexpectedText {
                    command: self.command.clone(),
                    stream,
                    unexpected: needle.to_owned(),
                    excerpt: excerpt(haystack),
                });
            }
        }
        Ok(())
    }
}

/// Truncate `text` to [`EXCERPT_LIMIT`] characters for failure messages.
fn excerpt(text: &str) -> String {
    match text.char_indices().nth(EXCERPT_LIMIT) {
        Some((cut, _)) => format!("{}… ({} more bytes)", &text[..cut], text.len() - cut),
        None => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(EXCERPT_LIMIT + 10);
        let cut = excerpt(&long);
        assert!(cut.starts_with(&"é".repeat(EXCERPT_LIMIT)));
        assert!(cut.ends_with("(20 more bytes)"));
        assert_eq!(excerpt("short"), "short");
    }

    #[test]
    fn test_combined_output_is_stdout_then_stderr() {
        let result = InvocationResult::new("cmd", 0, "out", "err");
        assert_eq!(result.combined_output(), "outerr");
    }

    #[test]
    fn test_failure_message_names_needle_and_command() {
        let result = InvocationResult::new("everest list versions", 0, "pxc", "");
        let err = result.out_contains(["psmdb"]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("everest list versions"));
        assert!(message.contains("\"psmdb\""));
        assert!(message.contains("pxc"));
    }
}
