// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! semvergit-conventional: Conventional Commit and semantic-version parsing
//!
//! This library crate provides the pure text-processing half of semvergit:
//! classifying free-form commit messages under the Conventional Commits
//! convention and parsing/bumping `v{major}.{minor}.{patch}` version names.
//! It performs no I/O and never talks to git.

#![warn(missing_docs)]

//! # Example
//!
//! ```
//! use semvergit_conventional::{CommitType, ConventionalCommit};
//!
//! let cc = ConventionalCommit::parse("feat(api): add endpoint", "").expect("classified");
//! assert_eq!(cc.commit_type, CommitType::Feat);
//! assert_eq!(cc.scope.as_deref(), Some("api"));
//! assert_eq!(cc.summary.as_deref(), Some("add endpoint"));
//! ```

pub mod commit_type;
pub mod conventional;
pub mod semver;

pub use commit_type::CommitType;
pub use conventional::ConventionalCommit;
pub use semver::{Component, SemanticVersion, SemverError};
