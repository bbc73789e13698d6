// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::*;
use crate::error::GuardError;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::git::ShellBackend;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

fn run_git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn init_repo(path: &Path) -> ShellBackend {
    run_git(path, &["init", "--quiet", "-b", "main"]);
    run_git(path, &["config", "user.email", "test@example.com"]);
    run_git(path, &["config", "user.name", "Test"]);
    std::fs::write(path.join("README.md"), "readme\n").expect("write readme");
    run_git(path, &["add", "."]);
    run_git(path, &["commit", "-q", "-m", "initial"]);
    ShellBackend::new("git", path, CancellationToken::new())
}

fn record() -> SubtreeRecord {
    SubtreeRecord::new(
        "https://github.com/org/lib.git",
        "lib",
        "main",
        "libs/lib",
        true,
        false,
    )
}

#[test]
fn test_temp_branch_name() {
    insta::assert_snapshot!(temp_branch_name("gmash-sync", "lib", 4242), @"gmash-sync-lib-4242");
}

#[test]
fn test_resolve_plan_uses_record_defaults() {
    let opts = PushOptions::builder().remote("lib").build();
    let plan = resolve_plan(&opts, &record(), "gmash-sync", 7);

    assert_eq!(
        plan,
        PushPlan {
            remote: "lib".into(),
            branch: "main".into(),
            prefix: "libs/lib".into(),
            squash: true,
            temp_branch: "gmash-sync-lib-7".into(),
            url: "https://github.com/org/lib.git".into(),
        }
    );
}

#[test]
fn test_resolve_plan_explicit_options_win_except_squash() {
    let opts = PushOptions::builder()
        .remote("lib")
        .branch("develop")
        .prefix("vendor/lib")
        .temp_branch("my-tmp")
        .squash(false)
        .build();
    let plan = resolve_plan(&opts, &record(), "gmash-sync", 7);

    assert_eq!(plan.branch, "develop");
    assert_eq!(plan.prefix, "vendor/lib");
    assert_eq!(plan.temp_branch, "my-tmp");
    assert!(plan.squash, "recorded squash mode wins");
}

#[test]
fn test_resolve_plan_ignores_blank_options() {
    let opts = PushOptions::builder()
        .remote("lib")
        .branch("  ")
        .temp_branch("")
        .build();
    let plan = resolve_plan(&opts, &record(), "sync", 1);
    assert_eq!(plan.branch, "main");
    assert_eq!(plan.temp_branch, "sync-lib-1");
}

#[test]
fn test_outcome_changed() {
    assert!(!PushOutcome::AlreadySynced.changed());
    assert!(PushOutcome::Pulled.changed());
    assert!(PushOutcome::Synced.changed());
    assert!(
        PushOutcome::PullRequest {
            branch: "tmp".into(),
            url: "https://github.com/org/lib/pull/1".into(),
        }
        .changed()
    );
}

#[tokio::test]
async fn test_sync_worktree_release_cleans_up() {
    let temp = temp_dir();
    let git = init_repo(temp.path());
    let scratch = temp_dir();
    let path = scratch.path().join("wt");

    let worktree = SyncWorktree::acquire(&git, path.clone(), None, "gmash-sync-test")
        .await
        .unwrap();
    assert!(path.join("README.md").exists());
    assert_eq!(git.worktrees().await.unwrap().len(), 2);

    assert_eq!(worktree.path(), path.as_path());
    run_git(&path, &["checkout", "-q", "-b", "gmash-sync-test"]);
    assert!(git.branch_exists("gmash-sync-test").await.unwrap());

    worktree.release().await;
    assert!(!path.exists());
    assert_eq!(git.worktrees().await.unwrap().len(), 1);
    assert!(!git.branch_exists("gmash-sync-test").await.unwrap());
}

#[tokio::test]
async fn test_sync_worktree_drop_cleans_up() {
    let temp = temp_dir();
    let git = init_repo(temp.path());
    let scratch = temp_dir();
    let path = scratch.path().join("wt");

    {
        let _worktree = SyncWorktree::acquire(&git, path.clone(), None, "gmash-sync-drop")
            .await
            .unwrap();
        run_git(&path, &["checkout", "-q", "-b", "gmash-sync-drop"]);
    }

    assert_eq!(git.worktrees().await.unwrap().len(), 1);
    assert!(!git.branch_exists("gmash-sync-drop").await.unwrap());
}

#[tokio::test]
async fn test_sync_worktree_owns_temp_dir() {
    let temp = temp_dir();
    let git = init_repo(temp.path());
    let dir = tempfile::Builder::new()
        .prefix("gmash-sync-")
        .tempdir()
        .unwrap();
    let root = dir.path().to_path_buf();

    let worktree = SyncWorktree::acquire(&git, root.join("worktree"), Some(dir), "tmp-owned")
        .await
        .unwrap();
    worktree.release().await;
    assert!(!root.exists());
}

#[tokio::test]
async fn test_existing_temp_branch_is_rejected() {
    let temp = temp_dir();
    let git = init_repo(temp.path());
    run_git(temp.path(), &["branch", "taken"]);
    let scratch = temp_dir();

    let err = SyncWorktree::acquire(&git, scratch.path().join("wt"), None, "taken")
        .await
        .unwrap_err();
    assert!(matches!(
        err.as_guard(),
        Some(GuardError::TempBranchExists { .. })
    ));
    assert_eq!(git.worktrees().await.unwrap().len(), 1);
}
