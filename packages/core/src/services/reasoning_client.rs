//! External Reasoning Client
//!
//! Runs the external reasoning tool (by default the `claude` CLI in print
//! mode) as a child process and turns its output into `GraphSuggestions`.
//!
//! # Process Handling
//!
//! - The prompt is passed as a single argv element; no shell is involved
//! - stdout and stderr are collected until the child exits or the timeout fires
//! - The child is spawned with `kill_on_drop`, so it is killed both on timeout
//!   and when the caller drops the invocation future
//! - Only the direct child is killed; processes the tool spawns on its own are
//!   left to the tool
//! - A non-zero exit is an error only when stdout is empty
//!
//! # Examples
//!
//! ```rust,no_run
//! use vicoo_core::services::{CliReasoningClient, ReasoningClient, ReasoningOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CliReasoningClient::from_env();
//!     let suggestions = client
//!         .invoke("Extract concepts from: ...", &ReasoningOptions::default())
//!         .await?;
//!     println!("{} nodes", suggestions.nodes.len());
//!     Ok(())
//! }
//! ```

use crate::models::GraphSuggestions;
use crate::services::error::ReasoningError;
use crate::services::output_parser::parse_reasoning_output;
use async_trait::async_trait;
use serde::Serialize;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use std::time::{Duration, Instant};
use tokio::process::Command;

/// Default reasoning executable, resolved through `PATH`
pub const DEFAULT_REASONING_PROGRAM: &str = "claude";

/// Arguments placed before the prompt: print mode, JSON output, end of options
pub const DEFAULT_REASONING_ARGS: &[&str] = &["-p", "--output-format", "json", "--"];

/// Default wall-clock limit for one invocation
pub const DEFAULT_REASONING_TIMEOUT: Duration = Duration::from_secs(5 * 60);

/// Wall-clock limit for the `--version` availability probe
pub const STATUS_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Environment variable naming the reasoning executable
pub const REASONING_TOOL_ENV: &str = "REASONING_TOOL";

/// Environment variable holding whitespace-separated leading arguments
pub const REASONING_TOOL_ARGS_ENV: &str = "REASONING_TOOL_ARGS";

/// Environment variable overriding the invocation timeout (seconds)
pub const REASONING_TIMEOUT_ENV: &str = "REASONING_TIMEOUT_SECS";

/// Per-invocation options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningOptions {
    /// Working directory of the child; inherits the current one when `None`
    pub working_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for ReasoningOptions {
    fn default() -> Self {
        Self {
            working_dir: None,
            timeout: DEFAULT_REASONING_TIMEOUT,
        }
    }
}

impl ReasoningOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Read the timeout from `REASONING_TIMEOUT_SECS` (default 5 minutes)
    pub fn from_env() -> Self {
        let timeout = std::env::var(REASONING_TIMEOUT_ENV)
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_REASONING_TIMEOUT);
        Self::default().with_timeout(timeout)
    }
}

/// Sends a prompt to a reasoning backend and returns structured suggestions
#[async_trait]
pub trait ReasoningClient: Send + Sync {
    /// Run one prompt to completion
    ///
    /// # Errors
    ///
    /// - `ReasoningError::Spawn` / `ToolFailed` - the tool could not run or failed
    /// - `ReasoningError::Timeout` - no result within `options.timeout`
    /// - `ReasoningError::Parse` - the output held malformed JSON
    async fn invoke(
        &self,
        prompt: &str,
        options: &ReasoningOptions,
    ) -> Result<GraphSuggestions, ReasoningError>;
}

/// Command line of the reasoning tool, minus the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasoningCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl Default for ReasoningCommand {
    fn default() -> Self {
        Self {
            program: DEFAULT_REASONING_PROGRAM.to_string(),
            args: DEFAULT_REASONING_ARGS.iter().map(|a| a.to_string()).collect(),
        }
    }
}

impl ReasoningCommand {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Read `REASONING_TOOL` and `REASONING_TOOL_ARGS`
    ///
    /// Arguments default to the `claude` print-mode arguments only when the
    /// program is also the default.
    pub fn from_env() -> Self {
        let program = std::env::var(REASONING_TOOL_ENV)
            .ok()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty());
        let args = std::env::var(REASONING_TOOL_ARGS_ENV).ok();

        match (program, args) {
            (None, None) => Self::default(),
            (program, args) => {
                let program = program.unwrap_or_else(|| DEFAULT_REASONING_PROGRAM.to_string());
                let args = match args {
                    Some(args) => args.split_whitespace().map(str::to_string).collect(),
                    None if program == DEFAULT_REASONING_PROGRAM => Self::default().args,
                    None => Vec::new(),
                };
                Self { program, args }
            }
        }
    }
}

/// Availability of the reasoning tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReasoningToolStatus {
    pub available: bool,
    pub version: Option<String>,
    pub message: String,
}

/// `ReasoningClient` backed by a local CLI
#[derive(Debug, Clone, Default)]
pub struct CliReasoningClient {
    command: ReasoningCommand,
}

impl CliReasoningClient {
    pub fn new(command: ReasoningCommand) -> Self {
        Self { command }
    }

    /// Client configured from `REASONING_TOOL` / `REASONING_TOOL_ARGS`
    pub fn from_env() -> Self {
        Self::new(ReasoningCommand::from_env())
    }

    pub fn command(&self) -> &ReasoningCommand {
        &self.command
    }

    /// Spawn the tool with `args` and wait for it, killing it on timeout
    async fn run<I, S>(
        &self,
        args: I,
        working_dir: Option<&PathBuf>,
        timeout: Duration,
    ) -> Result<Output, ReasoningError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<std::ffi::OsStr>,
    {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(args)
            .env("FORCE_COLOR", "0")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }

        let child = cmd
            .spawn()
            .map_err(|e| ReasoningError::spawn(&self.command.program, e))?;

        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(|e| ReasoningError::spawn(&self.command.program, e)),
            // Dropping the wait future drops the child, which kills it
            Err(_) => Err(ReasoningError::timeout(timeout)),
        }
    }

    /// Probe the tool with `--version`
    ///
    /// Never fails: an unavailable tool is reported in the returned status.
    pub async fn status(&self) -> ReasoningToolStatus {
        match self
            .run(["--version"], None, STATUS_PROBE_TIMEOUT)
            .await
        {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
                ReasoningToolStatus {
                    available: true,
                    message: format!("{} is available", self.command.program),
                    version: (!version.is_empty()).then_some(version),
                }
            }
            Ok(output) => ReasoningToolStatus {
                available: false,
                version: None,
                message: format!(
                    "{} --version exited with {}: {}",
                    self.command.program,
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            },
            Err(e) => ReasoningToolStatus {
                available: false,
                version: None,
                message: e.to_string(),
            },
        }
    }
}

#[async_trait]
impl ReasoningClient for CliReasoningClient {
    async fn invoke(
        &self,
        prompt: &str,
        options: &ReasoningOptions,
    ) -> Result<GraphSuggestions, ReasoningError> {
        tracing::info!(
            "Invoking reasoning tool '{}' ({} prompt chars, timeout {:?})",
            self.command.program,
            prompt.chars().count(),
            options.timeout
        );
        let started = Instant::now();

        let args = self
            .command
            .args
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(prompt));

        let output = match self
            .run(args, options.working_dir.as_ref(), options.timeout)
            .await
        {
            Ok(output) => output,
            Err(e) => {
                tracing::error!("Reasoning tool failed: {}", e);
                return Err(e);
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            tracing::debug!("Reasoning tool stderr: {}", stderr.trim());
        }

        if !output.status.success() {
            if stdout.is_empty() {
                let err = ReasoningError::tool_failed(output.status.code(), stderr.trim());
                tracing::error!("{}", err);
                return Err(err);
            }
            tracing::warn!(
                "Reasoning tool exited with {} but produced output; parsing it",
                output.status
            );
        }

        let suggestions = parse_reasoning_output(&stdout)?;
        tracing::info!(
            "Reasoning tool returned {} nodes and {} links in {:?}",
            suggestions.nodes.len(),
            suggestions.links.len(),
            started.elapsed()
        );
        Ok(suggestions)
    }
}
