// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for the `mono` workflows.
//!
//! Every test builds a throwaway monorepo plus bare upstream repositories on
//! disk and drives the library API against them with the real `git`.

use gmash::config::Config;
use gmash::error::{GitError, GuardError};
use gmash::git::ShellBackend;
use gmash::mono::clone::clone_monorepo;
use gmash::mono::pull::{pull_all, pull_subtree};
use gmash::mono::push::{push_all, push_subtree};
use gmash::mono::remove::remove_subtree;
use gmash::mono::store::confwrite;
use gmash::mono::subtree::add_subtree;
use gmash::mono::{
    CloneOptions, Monorepo, PullOptions, PullOutcome, PushOptions, PushOutcome, RemoveOptions,
    SubtreeOptions,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Run git with a fixed identity and return trimmed stdout.
fn git(cwd: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn commit_file(repo: &Path, file: &str, content: &str, message: &str) {
    let path = repo.join(file);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    git(repo, &["add", "--all"]);
    git(repo, &["commit", "-q", "-m", message]);
}

/// A bare upstream on `main` plus a working clone used to publish changes.
struct Upstream {
    bare: PathBuf,
    work: PathBuf,
}

impl Upstream {
    fn create(base: &Path, name: &str) -> Self {
        let bare = base.join(format!("{name}.git"));
        let work = base.join(format!("{name}-work"));
        git(base, &["init", "-q", "--bare", "-b", "main", bare.to_str().unwrap()]);
        git(base, &["clone", "-q", bare.to_str().unwrap(), work.to_str().unwrap()]);
        git(&work, &["symbolic-ref", "HEAD", "refs/heads/main"]);
        commit_file(&work, "lib.txt", "lib\n", "initial");
        git(&work, &["push", "-q", "origin", "main"]);
        Self { bare, work }
    }

    fn url(&self) -> &str {
        self.bare.to_str().unwrap()
    }

    fn change(&self, file: &str, content: &str) {
        git(&self.work, &["pull", "-q", "--ff-only", "origin", "main"]);
        commit_file(&self.work, file, content, "upstream change");
        git(&self.work, &["push", "-q", "origin", "main"]);
    }

    /// Content of `file` at the tip of the bare repository.
    fn show(&self, file: &str) -> String {
        git(&self.bare, &["show", &format!("main:{file}")])
    }

    fn branches(&self) -> String {
        git(&self.bare, &["branch", "--format=%(refname:short)"])
    }
}

fn test_config() -> Config {
    let mut config = Config::default();
    config.tools.gh = PathBuf::from("gmash_missing_gh_12345");
    config
}

fn init_mono(path: &Path) -> Monorepo {
    fs::create_dir_all(path).unwrap();
    git(path, &["init", "-q", "-b", "main"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test"]);
    commit_file(path, "README.md", "mono\n", "initial");
    Monorepo::discover(path, &test_config(), CancellationToken::new()).unwrap()
}

/// A monorepo cloned from a bare `mono.git`, so its `main` has an upstream.
fn init_published_mono(base: &Path, config: &Config) -> (PathBuf, Monorepo) {
    let bare = base.join("mono.git");
    let root = base.join("mono");
    git(base, &["init", "-q", "--bare", "-b", "main", bare.to_str().unwrap()]);
    git(base, &["clone", "-q", bare.to_str().unwrap(), root.to_str().unwrap()]);
    git(&root, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    git(&root, &["config", "user.email", "test@example.com"]);
    git(&root, &["config", "user.name", "Test"]);
    commit_file(&root, "README.md", "mono\n", "initial");
    git(&root, &["push", "-q", "-u", "origin", "main"]);
    let repo = Monorepo::discover(&root, config, CancellationToken::new()).unwrap();
    (bare, repo)
}

fn worktree_count(repo: &Path) -> usize {
    git(repo, &["worktree", "list", "--porcelain"])
        .lines()
        .filter(|line| line.starts_with("worktree "))
        .count()
}

fn sync_branches(repo: &Path) -> String {
    git(repo, &["branch", "--list", "gmash-sync*"])
}

async fn track(repo: &Monorepo, upstream: &Upstream, remote: &str, squash: bool) {
    let opts = SubtreeOptions::builder()
        .prefix(format!("libs/{remote}"))
        .remote(remote)
        .url(upstream.url())
        .branch("main")
        .squash(squash)
        .build();
    add_subtree(repo, &opts).await.unwrap();
}

fn push_opts(remote: &str) -> PushOptions {
    PushOptions::builder().remote(remote).build()
}

fn pull_opts(remote: &str) -> PullOptions {
    PullOptions::builder().remote(remote).build()
}

#[tokio::test]
async fn test_subtree_lifecycle() {
    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let root = temp.path().join("mono");
    let repo = init_mono(&root);

    track(&repo, &upstream, "lib", false).await;
    assert_eq!(fs::read_to_string(root.join("libs/lib/lib.txt")).unwrap(), "lib\n");
    assert!(root.join(".gmash/subtree/lib.conf").is_file());
    assert_eq!(git(&root, &["status", "--porcelain"]), "");
    assert!(git(&root, &["log", "-1", "--format=%s"]).starts_with("gmash: track subtree lib"));

    let head = git(&root, &["rev-parse", "HEAD"]);
    let outcome = push_subtree(&repo, &push_opts("lib")).await.unwrap();
    assert_eq!(outcome, PushOutcome::AlreadySynced);
    assert_eq!(git(&root, &["rev-parse", "HEAD"]), head);
    assert_eq!(worktree_count(&root), 1);

    commit_file(&root, "libs/lib/lib.txt", "lib\nlocal\n", "local change");
    let outcome = push_subtree(&repo, &push_opts("lib")).await.unwrap();
    assert_eq!(outcome, PushOutcome::Synced);
    assert_eq!(upstream.show("lib.txt"), "lib\nlocal");
    assert_eq!(upstream.branches(), "main");
    assert_eq!(sync_branches(&root), "");
    assert_eq!(worktree_count(&root), 1);
    assert_eq!(git(&root, &["status", "--porcelain"]), "");

    let outcome = push_subtree(&repo, &push_opts("lib")).await.unwrap();
    assert_eq!(outcome, PushOutcome::AlreadySynced);

    upstream.change("new.txt", "new\n");
    let outcome = pull_subtree(&repo, &pull_opts("lib")).await.unwrap();
    assert_eq!(outcome, PullOutcome::Updated);
    assert!(root.join("libs/lib/new.txt").is_file());
    let outcome = pull_subtree(&repo, &pull_opts("lib")).await.unwrap();
    assert_eq!(outcome, PullOutcome::UpToDate);

    let remove = RemoveOptions::builder().remote("lib").build();
    let record = remove_subtree(&repo, &remove).await.unwrap();
    assert_eq!(record.prefix, "libs/lib");
    assert!(!root.join("libs/lib").exists());
    assert!(!root.join(".gmash/subtree/lib.conf").exists());
    assert!(!git(&root, &["remote"]).lines().any(|r| r == "lib"));
    assert_eq!(git(&root, &["status", "--porcelain"]), "");

    let err = remove_subtree(&repo, &remove).await.unwrap_err();
    assert!(matches!(
        err.as_guard(),
        Some(GuardError::MetadataMissing { .. })
    ));
}

#[tokio::test]
async fn test_squash_subtree_syncs_twice() {
    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let root = temp.path().join("mono");
    let repo = init_mono(&root);

    track(&repo, &upstream, "lib", true).await;
    assert!(repo.store().load("lib").unwrap().squash);

    commit_file(&root, "libs/lib/one.txt", "one\n", "first local change");
    let outcome = push_subtree(&repo, &push_opts("lib")).await.unwrap();
    assert_eq!(outcome, PushOutcome::Synced);
    assert_eq!(upstream.show("one.txt"), "one");

    commit_file(&root, "libs/lib/two.txt", "two\n", "second local change");
    let outcome = push_subtree(&repo, &push_opts("lib")).await.unwrap();
    assert_eq!(outcome, PushOutcome::Synced);
    assert_eq!(upstream.show("two.txt"), "two");
    assert_eq!(worktree_count(&root), 1);
    assert_eq!(sync_branches(&root), "");
}

#[tokio::test]
async fn test_squash_request_does_not_override_record() {
    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let root = temp.path().join("mono");
    let repo = init_mono(&root);

    track(&repo, &upstream, "lib", false).await;
    commit_file(&root, "libs/lib/lib.txt", "changed\n", "local change");

    let opts = PushOptions::builder().remote("lib").squash(true).build();
    let outcome = push_subtree(&repo, &opts).await.unwrap();
    assert_eq!(outcome, PushOutcome::Synced);
    assert_eq!(upstream.show("lib.txt"), "changed");
}

#[tokio::test]
async fn test_push_after_upstream_change_only_pulls() {
    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let root = temp.path().join("mono");
    let repo = init_mono(&root);

    track(&repo, &upstream, "lib", false).await;
    upstream.change("new.txt", "new\n");

    let outcome = push_subtree(&repo, &push_opts("lib")).await.unwrap();
    assert_eq!(outcome, PushOutcome::Pulled);
    assert!(root.join("libs/lib/new.txt").is_file());
    assert_eq!(worktree_count(&root), 1);
}

#[tokio::test]
async fn test_guards_run_before_any_change() {
    let temp = temp_dir();
    let root = temp.path().join("mono");
    let repo = init_mono(&root);
    commit_file(&root, "libs/lib/existing.txt", "x\n", "occupy prefix");
    let head = git(&root, &["rev-parse", "HEAD"]);

    let opts = SubtreeOptions::builder()
        .prefix("libs/lib")
        .remote("lib")
        .url(temp.path().join("missing.git").to_str().unwrap())
        .branch("main")
        .build();
    let err = add_subtree(&repo, &opts).await.unwrap_err();

    assert!(matches!(err.as_guard(), Some(GuardError::PathNotEmpty { .. })));
    assert_eq!(git(&root, &["remote"]), "");
    assert_eq!(git(&root, &["rev-parse", "HEAD"]), head);
    assert!(!root.join(".gmash").exists());
}

#[tokio::test]
async fn test_dirty_tree_blocks_push() {
    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let root = temp.path().join("mono");
    let repo = init_mono(&root);
    track(&repo, &upstream, "lib", false).await;

    fs::write(root.join("README.md"), "dirty\n").unwrap();
    let err = push_subtree(&repo, &push_opts("lib")).await.unwrap_err();
    assert!(matches!(err.as_guard(), Some(GuardError::DirtyWorkingTree)));
}

#[cfg(unix)]
#[tokio::test]
async fn test_rejected_push_cleans_up() {
    use std::os::unix::fs::PermissionsExt;

    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let root = temp.path().join("mono");
    let repo = init_mono(&root);
    track(&repo, &upstream, "lib", false).await;

    let hook = upstream.bare.join("hooks/pre-receive");
    fs::write(&hook, "#!/bin/sh\nexit 1\n").unwrap();
    fs::set_permissions(&hook, fs::Permissions::from_mode(0o755)).unwrap();

    commit_file(&root, "libs/lib/lib.txt", "rejected\n", "local change");
    let head = git(&root, &["rev-parse", "HEAD"]);
    let err = push_subtree(&repo, &push_opts("lib")).await.unwrap_err();

    assert!(matches!(err.as_git(), Some(GitError::CommandFailed { .. })));
    assert_eq!(worktree_count(&root), 1);
    assert_eq!(sync_branches(&root), "");
    assert_eq!(git(&root, &["rev-parse", "HEAD"]), head);
    assert_eq!(upstream.show("lib.txt"), "lib");
}

#[tokio::test]
async fn test_pull_conflict_is_aborted() {
    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let root = temp.path().join("mono");
    let repo = init_mono(&root);
    track(&repo, &upstream, "lib", false).await;

    commit_file(&root, "libs/lib/lib.txt", "mono side\n", "local change");
    upstream.change("lib.txt", "upstream side\n");
    let head = git(&root, &["rev-parse", "HEAD"]);

    let err = pull_subtree(&repo, &pull_opts("lib")).await.unwrap_err();
    assert!(matches!(
        err.as_git(),
        Some(GitError::MergeConflict { into, .. }) if into == "libs/lib"
    ));
    assert!(!root.join(".git/MERGE_HEAD").exists());
    assert_eq!(git(&root, &["status", "--porcelain"]), "");
    assert_eq!(git(&root, &["rev-parse", "HEAD"]), head);
}

#[cfg(unix)]
#[tokio::test]
async fn test_conflict_opens_pull_request() {
    use std::os::unix::fs::PermissionsExt;

    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let root = temp.path().join("mono");
    init_mono(&root);

    let gh = temp.path().join("gh-stub");
    fs::write(&gh, "#!/bin/sh\necho https://github.com/org/lib/pull/7\n").unwrap();
    fs::set_permissions(&gh, fs::Permissions::from_mode(0o755)).unwrap();
    let mut config = test_config();
    config.tools.gh = gh;
    let repo = Monorepo::discover(&root, &config, CancellationToken::new()).unwrap();
    track(&repo, &upstream, "lib", false).await;

    // git talks to the local bare repository, gh to the recorded github url
    confwrite(
        &root.join(".gmash/subtree/lib.conf"),
        "url",
        "https://github.com/org/lib.git",
    )
    .unwrap();
    git(&root, &["commit", "-q", "-am", "record github url"]);
    commit_file(&root, "libs/lib/lib.txt", "mono side\n", "local change");
    upstream.change("lib.txt", "upstream side\n");
    let head = git(&root, &["rev-parse", "HEAD"]);

    let opts = PushOptions::builder()
        .remote("lib")
        .temp_branch("gmash-pr-lib")
        .build();
    let err = push_subtree(&repo, &opts).await.unwrap_err();
    assert!(matches!(err.as_git(), Some(GitError::MergeConflict { .. })));
    assert!(!upstream.branches().lines().any(|b| b == "gmash-pr-lib"));

    let opts = PushOptions::builder()
        .remote("lib")
        .temp_branch("gmash-pr-lib")
        .pull_request(true)
        .build();
    let outcome = push_subtree(&repo, &opts).await.unwrap();
    assert_eq!(
        outcome,
        PushOutcome::PullRequest {
            branch: "gmash-pr-lib".to_string(),
            url: "https://github.com/org/lib/pull/7".to_string(),
        }
    );
    assert!(upstream.branches().lines().any(|b| b == "gmash-pr-lib"));
    assert_eq!(upstream.show("lib.txt"), "upstream side");
    assert_eq!(worktree_count(&root), 1);
    assert_eq!(git(&root, &["branch", "--list", "gmash-pr-lib"]), "");
    assert_eq!(git(&root, &["rev-parse", "HEAD"]), head);
    assert_eq!(git(&root, &["status", "--porcelain"]), "");
}

#[tokio::test]
async fn test_push_publishes_monorepo_branch() {
    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let (bare, repo) = init_published_mono(temp.path(), &test_config());
    let root = repo.root().to_path_buf();
    track(&repo, &upstream, "lib", false).await;

    commit_file(&root, "libs/lib/lib.txt", "lib\nlocal\n", "local change");
    let outcome = push_subtree(&repo, &push_opts("lib")).await.unwrap();
    assert_eq!(outcome, PushOutcome::Synced);
    assert_eq!(
        git(&bare, &["rev-parse", "main"]),
        git(&root, &["rev-parse", "HEAD"])
    );

    upstream.change("new.txt", "new\n");
    let outcome = push_subtree(&repo, &push_opts("lib")).await.unwrap();
    assert_eq!(outcome, PushOutcome::Pulled);
    assert!(root.join("libs/lib/new.txt").is_file());
    assert_eq!(
        git(&bare, &["rev-parse", "main"]),
        git(&root, &["rev-parse", "HEAD"])
    );
}

#[tokio::test]
async fn test_publish_can_be_disabled() {
    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let mut config = test_config();
    config.mono.publish = false;
    let (bare, repo) = init_published_mono(temp.path(), &config);
    let root = repo.root().to_path_buf();
    let published = git(&bare, &["rev-parse", "main"]);
    track(&repo, &upstream, "lib", false).await;

    commit_file(&root, "libs/lib/lib.txt", "lib\nlocal\n", "local change");
    let outcome = push_subtree(&repo, &push_opts("lib")).await.unwrap();
    assert_eq!(outcome, PushOutcome::Synced);
    assert_eq!(upstream.show("lib.txt"), "lib\nlocal");
    assert_eq!(git(&bare, &["rev-parse", "main"]), published);
    assert_ne!(published, git(&root, &["rev-parse", "HEAD"]));
}

#[tokio::test]
async fn test_pull_with_explicit_target_ignores_broken_record() {
    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let root = temp.path().join("mono");
    let repo = init_mono(&root);
    track(&repo, &upstream, "lib", false).await;

    let record = root.join(".gmash/subtree/lib.conf");
    let without_branch: String = fs::read_to_string(&record)
        .unwrap()
        .lines()
        .filter(|line| !line.starts_with("branch="))
        .map(|line| format!("{line}\n"))
        .collect();
    commit_file(&root, ".gmash/subtree/lib.conf", &without_branch, "break record");
    upstream.change("new.txt", "new\n");

    let err = pull_subtree(&repo, &pull_opts("lib")).await.unwrap_err();
    assert!(err.as_metadata().is_some());

    let opts = PullOptions::builder()
        .remote("lib")
        .branch("main")
        .prefix("libs/lib")
        .build();
    let outcome = pull_subtree(&repo, &opts).await.unwrap();
    assert_eq!(outcome, PullOutcome::Updated);
    assert!(root.join("libs/lib/new.txt").is_file());
}

#[tokio::test]
async fn test_batches_continue_past_failures() {
    let temp = temp_dir();
    let alpha = Upstream::create(temp.path(), "alpha");
    let gamma = Upstream::create(temp.path(), "gamma");
    let root = temp.path().join("mono");
    let repo = init_mono(&root);

    track(&repo, &alpha, "alpha", false).await;
    track(&repo, &gamma, "gamma", false).await;
    commit_file(
        &root,
        ".gmash/subtree/beta.conf",
        "url=/srv/beta.git\nremote=beta\nprefix=libs/beta\n",
        "corrupt record",
    );
    git(&root, &["remote", "remove", "gamma"]);
    alpha.change("new.txt", "new\n");

    let report = pull_all(&repo).await.unwrap();
    assert_eq!(report.succeeded, ["alpha"]);
    assert!(report.unchanged.is_empty());
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].0, "beta");
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "gamma");
    assert!(!report.is_success());

    let report = push_all(&repo, false).await.unwrap();
    assert_eq!(report.unchanged, ["alpha"]);
    assert!(report.succeeded.is_empty());
    assert_eq!(report.skipped[0].0, "beta");
    assert_eq!(report.failed[0].0, "gamma");
    assert!(report.failed[0].1.contains("gamma"));
    assert_eq!(worktree_count(&root), 1);
}

#[tokio::test]
async fn test_clone_restores_remotes() {
    let temp = temp_dir();
    let upstream = Upstream::create(temp.path(), "lib");
    let root = temp.path().join("mono");
    let repo = init_mono(&root);
    track(&repo, &upstream, "lib", true).await;

    let git = ShellBackend::new("git", temp.path(), CancellationToken::new());
    let opts = CloneOptions::builder()
        .url(root.to_str().unwrap())
        .directory(temp.path().join("copy"))
        .build();
    let report = clone_monorepo(&git, &test_config(), &opts).await.unwrap();

    let copy = temp.path().join("copy");
    assert_eq!(report.path, copy);
    assert_eq!(report.added, ["lib"]);
    assert!(report.skipped.is_empty());
    assert!(report.failed.is_empty());
    assert_eq!(git_remote_url(&copy, "lib"), upstream.url());
    assert!(copy.join("libs/lib/lib.txt").is_file());

    let err = clone_monorepo(&git, &test_config(), &opts).await.unwrap_err();
    assert!(matches!(err.as_guard(), Some(GuardError::PathExists { .. })));
}

fn git_remote_url(repo: &Path, remote: &str) -> String {
    git(repo, &["remote", "get-url", remote])
}
