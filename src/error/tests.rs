// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{GitError, GmashError, GmashResult, GuardError, MetadataError};

#[test]
fn test_guard_error_display() {
    let err: GmashError = GuardError::PathNotEmpty {
        path: "libs/foo".to_string(),
    }
    .into();
    insta::assert_snapshot!(err.to_string(), @"path 'libs/foo' exists and is not empty");
}

#[test]
fn test_missing_argument_display() {
    let err = GuardError::MissingArgument("--remote".to_string());
    insta::assert_snapshot!(err.to_string(), @"missing required argument: --remote");
}

#[test]
fn test_metadata_error_display() {
    let err: GmashError = MetadataError::MissingKey {
        path: ".gmash/subtree/foo.conf".to_string(),
        key: "branch".to_string(),
    }
    .into();
    insta::assert_snapshot!(
        err.to_string(),
        @"metadata error: '.gmash/subtree/foo.conf' is missing required key 'branch'"
    );
}

#[test]
fn test_accessors() {
    let guard: GmashError = GuardError::DirtyWorkingTree.into();
    assert!(matches!(guard.as_guard(), Some(GuardError::DirtyWorkingTree)));
    assert!(guard.as_git().is_none());

    let interrupted: GmashError = GitError::Interrupted {
        command: "git fetch".to_string(),
    }
    .into();
    assert!(interrupted.is_interrupted());
    assert!(interrupted.as_metadata().is_none());
}

#[test]
fn test_gmash_error_size() {
    // Box<str> variant (Other) are 16 bytes (fat pointer: ptr + len)
    // With discriminant + alignment = 24 bytes
    let size = std::mem::size_of::<GmashError>();
    assert!(size <= 24, "GmashError is {size} bytes, expected <= 24");
}

#[test]
fn test_gmash_result_size() {
    let size = std::mem::size_of::<GmashResult<()>>();
    assert!(size <= 24, "GmashResult<()> is {size} bytes, expected <= 24");
}
