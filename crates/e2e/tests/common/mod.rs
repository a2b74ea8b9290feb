//! Shared fakes for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use everest_cli_e2e::{CommandRunner, E2eResult, InvocationResult, OutputMode};

/// Canned reply for one invocation: exit code, stdout, stderr
pub type Reply = (i32, &'static str, &'static str);

/// Replays canned replies in order and records every command line it saw.
/// The last reply repeats once the script is exhausted.
pub struct ScriptedRunner {
    replies: Mutex<VecDeque<Reply>>,
    last: Mutex<Option<Reply>>,
    seen: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            last: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, command_line: &str, _mode: OutputMode) -> E2eResult<InvocationResult> {
        self.seen.lock().unwrap().push(command_line.to_string());

        let mut last = self.last.lock().unwrap();
        let reply = match self.replies.lock().unwrap().pop_front() {
            Some(reply) => {
                *last = Some(reply);
                reply
            }
            None => last.unwrap_or((127, "", "sh: no scripted reply")),
        };

        let (code, stdout, stderr) = reply;
        Ok(InvocationResult::new(command_line, code, stdout, stderr))
    }
}
