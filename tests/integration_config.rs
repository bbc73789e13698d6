// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Integration tests for configuration loading.
//!
//! Tests the Config module with realistic TOML configurations.

use gmash::config::types::Visibility;
use gmash::config::{Config, REPO_CONFIG_FILE};
use std::fs;
use std::path::PathBuf;

// =============================================================================
// Loading from TOML strings
// =============================================================================

#[test]
fn config_defaults_listing() {
    let config = Config::default();
    insta::assert_snapshot!(config.format_options().join("\n"), @r"
    github.host             = github.com
    github.visibility       = private
    mono.default_branch     = main
    mono.metadata_dir       = .gmash/subtree
    mono.publish            = true
    mono.temp_branch_prefix = gmash-sync
    tools.gh                = gh
    tools.git               = git
    ");
}

#[test]
fn config_parse_full() {
    let toml = r#"
[mono]
metadata_dir = "tools/subtrees"
temp_branch_prefix = "sync"
default_branch = "trunk"
publish = false

[tools]
git = "/usr/local/bin/git"
gh = "/opt/gh/bin/gh"

[github]
visibility = "internal"
host = "github.example.com"
"#;
    let config = Config::parse(toml).unwrap();

    assert_eq!(config.mono.metadata_dir, "tools/subtrees");
    assert_eq!(config.mono.temp_branch_prefix, "sync");
    assert_eq!(config.mono.default_branch, "trunk");
    assert!(!config.mono.publish);
    assert_eq!(config.tools.git, PathBuf::from("/usr/local/bin/git"));
    assert_eq!(config.tools.gh, PathBuf::from("/opt/gh/bin/gh"));
    assert_eq!(config.github.visibility, Visibility::Internal);
    assert_eq!(config.github.host, "github.example.com");
}

#[test]
fn config_rejects_escaping_metadata_dir() {
    let err = Config::parse("[mono]\nmetadata_dir = \"../outside\"\n").unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"invalid value for 'metadata_dir' in section '[mono]': must be a relative path inside the repository");
}

#[test]
fn config_rejects_bad_temp_branch_prefix() {
    assert!(Config::parse("[mono]\ntemp_branch_prefix = \"has space\"\n").is_err());
    assert!(Config::parse("[mono]\ntemp_branch_prefix = \"\"\n").is_err());
}

// =============================================================================
// Layering
// =============================================================================

#[test]
fn config_layers_in_order() {
    let temp = tempfile::tempdir().unwrap();
    let repo_file = temp.path().join(REPO_CONFIG_FILE);
    fs::create_dir_all(repo_file.parent().unwrap()).unwrap();
    fs::write(
        &repo_file,
        "[mono]\ndefault_branch = \"develop\"\npublish = false\n\n[github]\nvisibility = \"public\"\n",
    )
    .unwrap();

    let first = temp.path().join("first.toml");
    fs::write(&first, "[github]\nvisibility = \"internal\"\n").unwrap();
    let second = temp.path().join("second.toml");
    fs::write(&second, "[github]\nvisibility = \"private\"\nhost = \"ghe.local\"\n").unwrap();

    let config = Config::load(
        Some(temp.path()),
        &[first, second],
        &["mono.publish=true".to_string(), "github.host=override.local".to_string()],
    )
    .unwrap();

    assert_eq!(config.mono.default_branch, "develop");
    assert!(config.mono.publish);
    assert_eq!(config.github.visibility, Visibility::Private);
    assert_eq!(config.github.host, "override.local");
}

#[test]
fn config_repo_file_must_be_valid() {
    let temp = tempfile::tempdir().unwrap();
    let repo_file = temp.path().join(REPO_CONFIG_FILE);
    fs::create_dir_all(repo_file.parent().unwrap()).unwrap();
    fs::write(&repo_file, "[mono]\nunknown_key = 1\n").unwrap();

    assert!(Config::load(Some(temp.path()), &[], &[]).is_err());
}
