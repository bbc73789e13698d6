// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `mono subtree`: register an external repository under a prefix.
//!
//! ```text
//! guards (in order)            effects
//! 1. inside repo               a. gh repo create        (--new only)
//! 2. clean tree                b. push-access probe -> owned
//! 3. required args             c. git remote add -f
//! 4. prefix / remote shape     d. git subtree add [--squash]
//! 5. remote alias unused       e. write <remote>.conf
//! 6. url not bound             f. git add + commit the record
//! 7. prefix empty or absent
//! 8. prefix not ignored
//! 9. url reachable             (skipped with --new)
//! 10. no record yet
//! ```

use bon::Builder;
use tracing::{info, warn};

use crate::error::GmashResult;
use crate::github::{RepoSlug, canonical_url};
use crate::mono::store::SubtreeRecord;
use crate::mono::{Monorepo, guard, track_message};

/// Arguments of `mono subtree`.
#[derive(Debug, Clone, Default, Builder)]
pub struct SubtreeOptions {
    #[builder(into)]
    pub prefix: Option<String>,
    #[builder(into)]
    pub remote: Option<String>,
    /// Ignored with `new_repo`; the canonical URL of the new repo is used.
    #[builder(into)]
    pub url: Option<String>,
    #[builder(into)]
    pub branch: Option<String>,
    #[builder(default)]
    pub squash: bool,
    /// Create `owner/name` on GitHub first.
    #[builder(default)]
    pub new_repo: bool,
    #[builder(into)]
    pub name: Option<String>,
    #[builder(into)]
    pub owner: Option<String>,
}

/// Validated arguments, in the form the effects need them.
struct Plan {
    prefix: String,
    remote: String,
    branch: String,
    /// `Some` when a repository has to be created first.
    create: Option<RepoSlug>,
    url: String,
}

async fn preflight(repo: &Monorepo, opts: &SubtreeOptions) -> GmashResult<Plan> {
    let git = repo.git();
    guard::assert_working_tree_clean(git).await?;

    let prefix = guard::assert_required_arg(opts.prefix.as_deref(), "prefix")?;
    let remote = guard::assert_required_arg(opts.remote.as_deref(), "remote")?;
    let given_url = if opts.new_repo {
        None
    } else {
        Some(guard::assert_required_arg(opts.url.as_deref(), "url")?)
    };
    let branch = guard::assert_required_arg(opts.branch.as_deref(), "branch")?;
    let (url, create) = match given_url {
        Some(url) => (url.to_string(), None),
        None => {
            let name = guard::assert_required_arg(opts.name.as_deref(), "name")?;
            let owner = guard::assert_required_arg(opts.owner.as_deref(), "owner")?;
            if opts.url.is_some() {
                warn!("ignoring url, --new uses the url of the created repository");
            }
            let slug = RepoSlug::new(owner, name);
            (canonical_url(repo.gh().host(), &slug), Some(slug))
        }
    };

    let prefix = guard::assert_prefix_valid(prefix)?;
    guard::assert_remote_name_valid(remote)?;
    guard::assert_remote_unused(git, remote).await?;
    guard::assert_remote_url_unused(git, &url).await?;
    guard::assert_directory_empty_or_nonexistent(repo.root(), &prefix)?;
    guard::assert_path_not_gitignored(git, &prefix).await?;
    if create.is_none() {
        guard::assert_remote_url_accessible(git, &url).await?;
    }
    guard::assert_metadata_absent(repo.store(), remote)?;

    Ok(Plan {
        prefix,
        remote: remote.to_string(),
        branch: branch.to_string(),
        create,
        url,
    })
}

/// Register a subtree and commit its metadata record.
///
/// Nothing is modified unless every guard passes.
///
/// # Errors
///
/// Returns the first failing guard, or the `GitError`/`GithubError` of a
/// failed effect.
pub async fn add_subtree(repo: &Monorepo, opts: &SubtreeOptions) -> GmashResult<SubtreeRecord> {
    let plan = preflight(repo, opts).await?;
    let git = repo.git();

    if let Some(slug) = &plan.create {
        let url = guard::create_new_github_repo(
            repo.gh(),
            &slug.name,
            &slug.owner,
            repo.config().github.visibility,
        )
        .await?;
        info!(%slug, url, "created repository");
    }
    let owned = guard::check_repo_access(repo.gh(), &plan.url).await;

    git.add_remote(&plan.remote, &plan.url, true).await?;
    let add_message = format!(
        "gmash: add {} ({}) at {}",
        plan.url, plan.branch, plan.prefix
    );
    git.subtree_add(&plan.prefix, &plan.url, &plan.branch, opts.squash, &add_message)
        .await?;

    let record = SubtreeRecord::new(
        &plan.url,
        &plan.remote,
        &plan.branch,
        &plan.prefix,
        opts.squash,
        owned,
    );
    repo.store().save(&record)?;
    let relative = repo.store().relative_path(&plan.remote);
    git.add(&[&relative]).await?;
    git.commit(&track_message(&plan.remote, &plan.prefix, &plan.url, &relative))
        .await?;

    info!(
        remote = %plan.remote,
        prefix = %plan.prefix,
        squash = opts.squash,
        owned,
        "subtree registered"
    );
    Ok(record)
}
