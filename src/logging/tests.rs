// gmash: monorepo subtree toolbox
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::{LogConfig, LogLevel};

#[test]
fn test_verbosity_levels() {
    let levels: Vec<u8> = (0..5).map(|n| LogLevel::from_verbosity(n).as_u8()).collect();
    assert_eq!(levels, vec![2, 3, 4, 5, 5]);
}

#[test]
fn test_log_level_range() {
    assert!(LogLevel::new(6).is_ok());
    assert!(LogLevel::new(7).is_err());
    assert_eq!(LogLevel::from_u8(9), None);
    assert_eq!(LogLevel::try_from(3).ok(), Some(LogLevel::INFO));
}

#[test]
fn test_filter_strings_scope_to_crate() {
    insta::assert_snapshot!(LogLevel::INFO.to_filter_string(), @"off,gmash=info");
    insta::assert_snapshot!(LogLevel::WARN.to_filter_string(), @"warn");
    insta::assert_snapshot!(LogLevel::DUMP.to_filter_string(), @"trace");
}

#[test]
fn test_default_config_is_quiet() {
    let config = LogConfig::default();
    assert_eq!(config.console_level(), LogLevel::WARN);
    assert_eq!(config.file_level(), LogLevel::TRACE);
    assert!(config.log_file().is_none());
}

#[test]
fn test_builder_sets_file() {
    let config = LogConfig::builder()
        .with_console_level(LogLevel::SILENT)
        .maybe_with_log_file(Some("logs/gmash.log".to_string()))
        .build();
    assert_eq!(config.console_level(), LogLevel::SILENT);
    assert_eq!(config.log_file(), Some("logs/gmash.log"));
}
