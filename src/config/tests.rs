// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::types::Visibility;
use super::loader::ConfigSource;
use super::{Config, REPO_CONFIG_FILE};
use std::path::PathBuf;
use tempfile::TempDir;

fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

#[test]
fn test_default_config() {
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
fn test_parse_partial_toml_keeps_defaults() {
    let config = Config::parse(
        r#"
        [mono]
        publish = false

        [github]
        visibility = "internal"
        "#,
    )
    .unwrap();

    assert!(!config.mono.publish);
    assert_eq!(config.mono.metadata_dir, ".gmash/subtree");
    assert_eq!(config.github.visibility, Visibility::Internal);
    assert_eq!(config.tools.git, PathBuf::from("git"));
}

#[test]
fn test_unknown_keys_are_rejected() {
    assert!(Config::parse("[mono]\npublsh = false\n").is_err());
    assert!(Config::parse("[gist]\nenabled = true\n").is_err());
}

#[test]
fn test_invalid_values_are_rejected() {
    assert!(Config::parse("[github]\nvisibility = \"secret\"\n").is_err());
    assert!(Config::parse("[mono]\nmetadata_dir = \"/abs\"\n").is_err());
    assert!(Config::parse("[mono]\nmetadata_dir = \"../out\"\n").is_err());
    assert!(Config::parse("[mono]\ntemp_branch_prefix = \"a b\"\n").is_err());
    assert!(Config::parse("[mono]\ndefault_branch = \"\"\n").is_err());
}

#[test]
fn test_overrides_beat_files() {
    let config = Config::builder()
        .inline("[mono]\ntemp_branch_prefix = \"from-file\"\n")
        .overrides(["mono.temp_branch_prefix=from-cli", "mono.publish=false"])
        .unwrap()
        .build()
        .unwrap();

    assert_eq!(config.mono.temp_branch_prefix, "from-cli");
    assert!(!config.mono.publish);
}

#[test]
fn test_overrides_reject_malformed() {
    let err = Config::builder().overrides(["novalue"]).err().unwrap();
    insta::assert_snapshot!(err.to_string(), @"failed to parse config: override 'novalue' is not of the form key=value");
    assert!(Config::builder().overrides(["=x"]).is_err());
}

#[test]
fn test_load_layers_repo_file_and_explicit_files() {
    let temp = temp_dir();
    let repo_file = temp.path().join(REPO_CONFIG_FILE);
    std::fs::create_dir_all(repo_file.parent().unwrap()).unwrap();
    std::fs::write(
        &repo_file,
        "[mono]\ndefault_branch = \"trunk\"\ntemp_branch_prefix = \"repo\"\n",
    )
    .unwrap();
    let extra = temp.path().join("extra.toml");
    std::fs::write(&extra, "[mono]\ntemp_branch_prefix = \"extra\"\n").unwrap();

    let config = Config::load(
        Some(temp.path()),
        &[extra],
        &["github.host=ghe.example.com".to_string()],
    )
    .unwrap();

    assert_eq!(config.mono.default_branch, "trunk");
    assert_eq!(config.mono.temp_branch_prefix, "extra");
    assert_eq!(config.github.host, "ghe.example.com");
}

#[test]
fn test_load_without_repo_file() {
    let temp = temp_dir();
    let config = Config::load(Some(temp.path()), &[], &[]).unwrap();
    assert_eq!(config.mono.temp_branch_prefix, "gmash-sync");
}

#[test]
fn test_missing_explicit_file_fails() {
    let temp = temp_dir();
    let missing = temp.path().join("missing.toml");
    assert!(Config::load(None, &[missing], &[]).is_err());
}

#[test]
fn test_loader_tracks_files() {
    let temp = temp_dir();
    let file = temp.path().join("a.toml");
    std::fs::write(&file, "").unwrap();

    let loader = Config::builder()
        .file(&file)
        .repo_file(temp.path().join("absent.toml"))
        .inline("");
    assert_eq!(loader.sources().len(), 2);
    assert_eq!(loader.sources()[0], ConfigSource::File(file));
    assert_eq!(loader.sources()[1].to_string(), "inline");
}

#[test]
fn test_visibility_flag_and_parse() {
    assert_eq!("PUBLIC".parse::<Visibility>().unwrap(), Visibility::Public);
    assert_eq!(Visibility::Internal.as_flag(), "--internal");
    assert!("secret".parse::<Visibility>().is_err());
}
