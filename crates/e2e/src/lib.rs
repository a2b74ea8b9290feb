//! Everest CLI E2E Test Framework
//!
//! This crate drives the Everest CLI against a live, eventually consistent
//! cluster backend:
//! - Captures every command run as an immutable [`InvocationResult`]
//! - Asserts on exit codes and on output, raw or whitespace/ANSI-normalized
//! - Polls slowly converging cluster state without fixed sleeps
//! - Runs declarative YAML check specs and writes JSON results
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── run_spec(spec: TestSpec) -> TestResult               │
//! │    └── ScenarioContext (per spec)                           │
//! │          ├── CliHelper -> CommandRunner -> InvocationResult │
//! │          └── BackendClient (GET /v1/kubernetes)             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  poll(options, predicate) -> PollReport                     │
//! │    predicate: () -> Success | NotYetReady(reason) | Fatal   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestSpec (YAML)                                            │
//! │    ├── name, description, tags                              │
//! │    └── steps: [Step]                                        │
//! │          ├── run  { command, tool?, skip_wizard?, expect }  │
//! │          ├── poll { ..., intervals_ms, timeout_ms }         │
//! │          └── log  { message }                               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod backend;
pub mod cli;
pub mod config;
pub mod context;
pub mod error;
pub mod exec;
pub mod invocation;
pub mod kubernetes;
pub mod normalize;
pub mod poll;
pub mod runner;
pub mod spec;
pub mod steps;

pub use cli::CliHelper;
pub use context::ScenarioContext;
pub use error::{E2eError, E2eResult};
pub use exec::{CommandRunner, OutputMode, ShellRunner};
pub use invocation::InvocationResult;
pub use normalize::normalize;
pub use poll::{poll, PollOptions, PollOutcome, PollReport};
pub use runner::TestRunner;
pub use spec::{TestSpec, TestStep};
