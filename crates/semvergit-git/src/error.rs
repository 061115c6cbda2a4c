// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! Error types for semvergit-git

use thiserror::Error;

/// Errors that can occur while driving the git command-line tool
#[derive(Debug, Error)]
pub enum GitError {
    /// The directory is not inside a git working tree
    #[error("not a git repository: {path}")]
    NotARepository {
        /// The directory that was probed
        path: String,
    },

    /// The git executable could not be launched
    #[error("failed to launch git: {0}")]
    Launch(#[from] std::io::Error),

    /// git exited with a non-zero status
    #[error("git {command} failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        /// The subcommand that failed (first argument)
        command: String,
        /// Exit code reported by git, -1 when killed by a signal
        exit_code: i32,
        /// Captured standard error text
        stderr: String,
    },

    /// Structured record output could not be parsed
    #[error("malformed record output: {0}")]
    MalformedRecord(String),

    /// A timestamp field could not be parsed as ISO 8601
    #[error("invalid timestamp {text:?}: {source}")]
    InvalidTimestamp {
        /// The text that failed to parse
        text: String,
        /// The underlying parse error
        source: chrono::ParseError,
    },
}
