// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Subprocess execution for the git command-line tool.
//!
//! All git interaction goes through [`ProcessRunner`]: it spawns `git` in a
//! fixed working directory, captures stdout/stderr, and normalizes stdout
//! into a clean sequence of non-empty lines. Callers that expect structured
//! multi-line output (commit bodies) read the raw stdout instead.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::GitError;

/// Whether an observer is being told about a command before or after it ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandPhase {
    /// The command is about to be spawned
    Before,
    /// The command has exited
    After,
}

/// Notification emitted around every git invocation
#[derive(Debug, Clone)]
pub struct CommandEvent {
    /// Before or after execution
    pub phase: CommandPhase,
    /// Directory the command runs in
    pub working_dir: PathBuf,
    /// The full command line, e.g. `git log --pretty=format:%H`
    pub command: String,
}

/// Callback receiving [`CommandEvent`] notifications.
///
/// Observers are best-effort: they must not block or fail, and nothing is
/// retried on their behalf.
pub type CommandObserver = Box<dyn Fn(&CommandEvent) + Send + Sync>;

/// Captured output of one git invocation
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Raw standard output, line endings untouched
    pub stdout: String,
    /// Raw standard error
    pub stderr: String,
    /// Exit code, -1 when terminated by a signal
    pub exit_code: i32,
    /// Normalized stdout: CR/LF runs collapsed, empty lines dropped
    pub lines: Vec<String>,
}

impl CommandOutput {
    /// The first normalized line, if any.
    #[must_use]
    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    /// The last normalized line, if any.
    #[must_use]
    pub fn last_line(&self) -> Option<&str> {
        self.lines.last().map(String::as_str)
    }
}

/// Normalizes raw tool output into an ordered sequence of non-empty lines.
///
/// Any run of `\r` and `\n` characters acts as a single delimiter, so CRLF
/// output and accidental blank lines collapse away.
#[must_use]
pub fn split_lines(text: &str) -> Vec<String> {
    text.split(['\r', '\n'])
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Runs `git` subcommands in a fixed working directory.
pub struct ProcessRunner {
    working_dir: PathBuf,
    observer: Option<CommandObserver>,
}

impl ProcessRunner {
    /// Creates a runner rooted at the given directory.
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            observer: None,
        }
    }

    /// Attaches a command observer.
    #[must_use]
    pub fn with_observer(mut self, observer: CommandObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// The directory commands run in.
    #[must_use]
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    fn notify(&self, phase: CommandPhase, command: &str) {
        if let Some(ref observer) = self.observer {
            observer(&CommandEvent {
                phase,
                working_dir: self.working_dir.clone(),
                command: command.to_string(),
            });
        }
    }

    /// Runs a git command, treating any exit status as success.
    ///
    /// Use this for queries where a non-zero exit is an expected outcome
    /// (e.g. `show-ref --tags` in a repository without tags). Callers decide
    /// what an empty result means.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::Launch`] if the git executable cannot be spawned.
    pub fn run_unchecked(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let command_line = format!("git {}", args.join(" "));
        self.notify(CommandPhase::Before, &command_line);
        let output = Command::new("git")
            .args(args)
            .current_dir(&self.working_dir)
            .output()?;
        self.notify(CommandPhase::After, &command_line);

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code().unwrap_or(-1);
        debug!(command = %command_line, exit_code, "git command finished");
        let lines = split_lines(&stdout);
        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
            lines,
        })
    }

    /// Runs a git command, failing on non-zero exit.
    ///
    /// # Errors
    ///
    /// Returns [`GitError::CommandFailed`] with the exit code and captured
    /// stderr, or [`GitError::Launch`] if git cannot be spawned.
    pub fn run(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let output = self.run_unchecked(args)?;
        if output.exit_code != 0 {
            return Err(GitError::CommandFailed {
                command: args.first().unwrap_or(&"").to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            });
        }
        Ok(output)
    }
}
