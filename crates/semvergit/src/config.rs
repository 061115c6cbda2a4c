//! Configuration for the semvergit command line.
//!
//! All context is explicit: the repository path and data directory are
//! threaded through configuration rather than read from process-global
//! state.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Directory under the repository root holding semvergit data.
pub const DATA_DIR_NAME: &str = ".semvergit";

/// semvergit - semantic versions and changelogs from git history
#[derive(Parser, Debug, Clone)]
#[command(name = "semvergit")]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Path to the git repository
    ///
    /// Defaults to the current working directory.
    #[arg(short, long, env = "SEMVERGIT_REPO")]
    pub repo: Option<PathBuf>,

    /// History store backend
    #[arg(long, env = "SEMVERGIT_STORE", value_enum, default_value_t = StoreBackend::Sqlite)]
    pub store: StoreBackend,

    /// Data directory for the history store
    ///
    /// Defaults to `.semvergit` under the repository root.
    #[arg(long, env = "SEMVERGIT_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value = "false")]
    pub verbose: bool,

    /// Quiet mode - suppress info-level logs
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

/// Selectable history store backends
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// Relational SQLite database
    Sqlite,
    /// Flat JSON documents
    Json,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Sync repository history into the store and partition it into versions
    Sync,
    /// Derive and print the next version
    Next,
    /// Render the changelog to CHANGELOG.md (or a custom path)
    Changelog {
        /// Output path, defaulting to CHANGELOG.md in the repository
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print commit statistics for the unreleased next version
    Stats,
    /// Finalize a release: commit, tag, and push, each gated on its flag
    Release {
        /// Conventional commit type for the release commit
        #[arg(long = "type", default_value = "chore")]
        commit_type: String,

        /// Optional scope for the release commit
        #[arg(long)]
        scope: Option<String>,

        /// Summary line for the release commit
        #[arg(long)]
        summary: String,

        /// Optional longer description
        #[arg(long)]
        description: Option<String>,

        /// Optional breaking-change notice
        #[arg(long)]
        breaking_change: Option<String>,

        /// Issue references, space or comma separated
        #[arg(long)]
        refs: Option<String>,

        /// Stage and commit the working tree
        #[arg(long)]
        commit: bool,

        /// Create the annotated version tag (requires --commit)
        #[arg(long)]
        tag: bool,

        /// Push the commit and tag upstream (requires --tag)
        #[arg(long)]
        push: bool,
    },
}

impl Config {
    /// The repository path, defaulting to the current directory.
    #[must_use]
    pub fn repo_path(&self) -> PathBuf {
        self.repo
            .clone()
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// The data directory, defaulting to `.semvergit` under the repository.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| self.repo_path().join(DATA_DIR_NAME))
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the repository path does not exist or the data
    /// directory cannot be created.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let repo = self.repo_path();
        if !repo.exists() {
            return Err(ConfigError::RepoNotFound(repo));
        }
        if !repo.is_dir() {
            return Err(ConfigError::RepoNotDirectory(repo));
        }
        let data_dir = self.data_dir();
        if !data_dir.exists() {
            std::fs::create_dir_all(&data_dir)
                .map_err(|error| ConfigError::DataDirCreateFailed(data_dir, error))?;
        }
        Ok(())
    }

    /// Get the log level based on verbose/quiet flags
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        if self.verbose {
            tracing::Level::DEBUG
        } else if self.quiet {
            tracing::Level::WARN
        } else {
            tracing::Level::INFO
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Repository path not found
    #[error("repository path not found: {0}")]
    RepoNotFound(PathBuf),

    /// Repository path is not a directory
    #[error("repository path is not a directory: {0}")]
    RepoNotDirectory(PathBuf),

    /// Failed to create the data directory
    #[error("failed to create data directory {0}: {1}")]
    DataDirCreateFailed(PathBuf, std::io::Error),
}
