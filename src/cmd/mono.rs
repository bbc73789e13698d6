// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mono command implementation for gmash.

use std::path::Path;

use anyhow::{Context, bail};
use tokio_util::sync::CancellationToken;

use crate::cli::mono::{
    CloneArgs, ListArgs, MonoArgs, MonoSubcommand, PullArgs, PushArgs, RemoveArgs, SubtreeArgs,
};
use crate::config::Config;
use crate::error::Result;
use crate::git::ShellBackend;
use crate::mono::clone::clone_monorepo;
use crate::mono::list::{list_subtrees, render_json, render_table};
use crate::mono::pull::{pull_all, pull_subtree};
use crate::mono::push::{push_all, push_subtree};
use crate::mono::remove::remove_subtree;
use crate::mono::subtree::add_subtree;
use crate::mono::{
    BatchReport, CloneOptions, Monorepo, PullOptions, PullOutcome, PushOptions, PushOutcome,
    RemoveOptions, SubtreeOptions,
};

/// Main handler for the mono command.
///
/// `cwd` is where the repository is discovered and where `clone` puts its
/// destination.
///
/// # Errors
///
/// Returns the failing guard or git step with context, or a summary error
/// when a batch had failures.
pub async fn run_mono_command(
    args: &MonoArgs,
    config: &Config,
    cwd: &Path,
    cancel: &CancellationToken,
) -> Result<()> {
    let open = || -> Result<Monorepo> { Ok(Monorepo::discover(cwd, config, cancel.clone())?) };
    match &args.subcommand {
        MonoSubcommand::Subtree(sub) => run_subtree(sub, &open()?).await,
        MonoSubcommand::Remove(rm) => run_remove(rm, &open()?).await,
        MonoSubcommand::Pull(pull) => run_pull(pull, &open()?).await,
        MonoSubcommand::Push(push) => run_push(push, &open()?).await,
        MonoSubcommand::List(list) => run_list(list, &open()?),
        MonoSubcommand::Clone(clone) => {
            let git = ShellBackend::new(&config.tools.git, cwd, cancel.clone());
            run_clone(clone, &git, config).await
        }
    }
}

async fn run_subtree(args: &SubtreeArgs, repo: &Monorepo) -> Result<()> {
    let branch = args.branch.clone().or_else(|| {
        args.new_repo
            .then(|| repo.config().mono.default_branch.clone())
    });
    let opts = SubtreeOptions::builder()
        .maybe_prefix(args.prefix.clone())
        .maybe_remote(args.remote.clone())
        .maybe_url(args.url.clone())
        .maybe_branch(branch)
        .squash(args.squash)
        .new_repo(args.new_repo)
        .maybe_name(args.name.clone())
        .maybe_owner(args.owner.clone())
        .build();

    let record = add_subtree(repo, &opts)
        .await
        .context("mono subtree failed")?;
    println!(
        "Tracked {} ({}) at {}",
        record.remote, record.url, record.prefix
    );
    Ok(())
}

async fn run_remove(args: &RemoveArgs, repo: &Monorepo) -> Result<()> {
    let opts = RemoveOptions::builder()
        .maybe_remote(args.remote.clone())
        .maybe_prefix(args.prefix.clone())
        .keep_remote(args.keep_remote)
        .build();

    let record = remove_subtree(repo, &opts)
        .await
        .context("mono remove failed")?;
    println!("Removed {} at {}", record.remote, record.prefix);
    Ok(())
}

fn finish_batch(action: &str, report: &BatchReport) -> Result<()> {
    println!("{report}");
    if !report.is_success() {
        bail!("{action} failed for {} subtree(s)", report.failed.len());
    }
    Ok(())
}

async fn run_pull(args: &PullArgs, repo: &Monorepo) -> Result<()> {
    if args.all {
        let report = pull_all(repo).await.context("mono pull --all failed")?;
        return finish_batch("pull", &report);
    }

    let opts = PullOptions::builder()
        .maybe_remote(args.remote.clone())
        .maybe_branch(args.branch.clone())
        .maybe_prefix(args.prefix.clone())
        .build();
    let outcome = pull_subtree(repo, &opts)
        .await
        .context("mono pull failed")?;
    let remote = args.remote.as_deref().unwrap_or_default();
    match outcome {
        PullOutcome::Updated => println!("Updated {remote}"),
        PullOutcome::UpToDate => println!("{remote} is already up to date"),
    }
    Ok(())
}

async fn run_push(args: &PushArgs, repo: &Monorepo) -> Result<()> {
    if args.all {
        let report = push_all(repo, args.pull_request)
            .await
            .context("mono push --all failed")?;
        return finish_batch("push", &report);
    }

    let opts = PushOptions::builder()
        .maybe_remote(args.remote.clone())
        .maybe_prefix(args.prefix.clone())
        .maybe_branch(args.branch.clone())
        .maybe_temp_branch(args.temp_branch.clone())
        .maybe_temp_dir(args.temp_dir.clone())
        .pull_request(args.pull_request)
        .maybe_squash(args.squash_mode())
        .build();
    let outcome = push_subtree(repo, &opts)
        .await
        .context("mono push failed")?;
    let remote = args.remote.as_deref().unwrap_or_default();
    match outcome {
        PushOutcome::AlreadySynced => println!("{remote} is already in sync"),
        PushOutcome::Pulled => println!("Pulled {remote}; nothing to push"),
        PushOutcome::Synced => println!("Synced {remote}"),
        PushOutcome::PullRequest { branch, url } => {
            println!("Merge conflicted; pushed {branch} and opened {url}");
        }
    }
    Ok(())
}

async fn run_clone(args: &CloneArgs, git: &ShellBackend, config: &Config) -> Result<()> {
    let opts = CloneOptions::builder()
        .url(args.url.clone())
        .maybe_directory(args.directory.clone())
        .maybe_branch(args.branch.clone())
        .fetch(args.fetch)
        .build();

    let report = clone_monorepo(git, config, &opts)
        .await
        .with_context(|| format!("mono clone {} failed", args.url))?;
    println!("Cloned into {}", report.path.display());
    for remote in &report.added {
        println!("  added   {remote}");
    }
    for (name, reason) in &report.skipped {
        println!("  skipped {name}: {reason}");
    }
    for (name, reason) in &report.failed {
        println!("  failed  {name}: {reason}");
    }
    if !report.failed.is_empty() {
        bail!("failed to restore {} remote(s)", report.failed.len());
    }
    Ok(())
}

fn run_list(args: &ListArgs, repo: &Monorepo) -> Result<()> {
    let records = list_subtrees(repo).context("mono list failed")?;
    if args.json {
        println!("{}", render_json(&records)?);
    } else if records.is_empty() {
        println!("No subtrees recorded");
    } else {
        println!("{}", render_table(&records));
    }
    Ok(())
}
