// Copyright (c) 2026 - present BDM Software
// SPDX-License-Identifier: MIT

//! semvergit: semantic versions and changelogs from git history

use std::io::{self, Write};

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use semvergit::config::{Command, Config, StoreBackend};
use semvergit::orchestrator::Orchestrator;
use semvergit::store::{HistoryStore, JsonStore, SqliteStore};
use semvergit::version::{STAT_BREAKING_CHANGE, STAT_NON_CONVENTIONAL};
use semvergit_conventional::{CommitType, ConventionalCommit};
use semvergit_git::Git;

fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .with_writer(io::stderr)
        .init();

    config.validate().context("invalid configuration")?;

    let repo = config.repo_path();
    let git = Git::open(&repo).with_context(|| format!("opening {}", repo.display()))?;
    let store = open_store(&config)?;
    let mut orchestrator = Orchestrator::new(git, store)
        .with_status(Box::new(|status| eprintln!("{status}")));

    match config.command.clone() {
        Command::Sync => {
            let stats = orchestrator.sync()?;
            println!(
                "synced: {} new tags, {} new commits, {} versions",
                stats.tags_added, stats.commits_added, stats.versions_recorded
            );
        }
        Command::Next => {
            orchestrator.sync()?;
            let next = orchestrator.derive_next()?;
            println!("{}", next.name);
        }
        Command::Changelog { output } => {
            orchestrator.sync()?;
            orchestrator.derive_next()?;
            let path = output.unwrap_or_else(|| repo.join("CHANGELOG.md"));
            orchestrator.write_changelog(&path)?;
            println!("wrote {}", path.display());
        }
        Command::Stats => {
            orchestrator.sync()?;
            orchestrator.derive_next()?;
            let stats = orchestrator
                .next_version_stats()
                .context("no next version derived")?;
            for key in [STAT_BREAKING_CHANGE, STAT_NON_CONVENTIONAL] {
                println!("{key}: {}", stats.get(key).copied().unwrap_or_default());
            }
            for commit_type in CommitType::ALL {
                let key = commit_type.as_str();
                println!("{key}: {}", stats.get(key).copied().unwrap_or_default());
            }
        }
        Command::Release {
            commit_type,
            scope,
            summary,
            description,
            breaking_change,
            refs,
            commit,
            tag,
            push,
        } => {
            if tag && !commit {
                bail!("--tag requires --commit");
            }
            if push && !tag {
                bail!("--push requires --tag");
            }

            orchestrator.sync()?;
            let next = orchestrator.derive_next()?.clone();
            info!(version = %next.name, "derived next version");
            orchestrator.write_changelog(&repo.join("CHANGELOG.md"))?;

            let mut message = ConventionalCommit {
                commit_type: commit_type.parse().unwrap_or(CommitType::Invalid),
                scope,
                summary: Some(summary),
                description,
                breaking_change,
                ..Default::default()
            };
            if let Some(refs) = refs.as_deref() {
                message.set_references(refs);
            }

            if !commit {
                println!(
                    "next version {} - re-run with --commit to finalize",
                    next.name
                );
                return Ok(());
            }
            if !confirm(&format!("commit as \"{}\"?", message.subject()))? {
                bail!("aborted before commit");
            }
            let release_commit = orchestrator.commit_release(&message)?;
            println!("committed {}", release_commit.short_sha());

            if !tag {
                return Ok(());
            }
            if !confirm(&format!("tag {}?", next.name))? {
                bail!("aborted before tag");
            }
            let created = orchestrator.tag_release()?;
            println!("tagged {}", created.name);

            if !push {
                return Ok(());
            }
            if !confirm("push commit and tag?")? {
                bail!("aborted before push");
            }
            orchestrator.push_release()?;
            println!("pushed {}", next.name);
        }
    }
    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<Box<dyn HistoryStore>> {
    let data_dir = config.data_dir();
    Ok(match config.store {
        StoreBackend::Sqlite => Box::new(
            SqliteStore::open(&data_dir.join("history.db")).context("opening SQLite store")?,
        ),
        StoreBackend::Json => {
            Box::new(JsonStore::open(data_dir.join("data")).context("opening JSON store")?)
        }
    })
}

/// Asks the operator for confirmation on stdin.
fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
