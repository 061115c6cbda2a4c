//! semvergit library
//!
//! Semantic-version derivation and changelog generation from git history:
//! syncs commits and tags into a local store, partitions history into
//! versions, derives the next version from Conventional Commit
//! classifications, and renders a Markdown changelog. This module exports
//! the core functionality for use in integration tests and as a library.

pub mod changelog;
pub mod config;
pub mod orchestrator;
pub mod store;
pub mod version;
