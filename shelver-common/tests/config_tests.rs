//! Configuration loading and API key resolution tests
//!
//! Tests that touch SHELVER_ACOUSTID_KEY or RUST_LOG are marked #[serial]
//! so they never observe each other's environment.

use serial_test::serial;
use shelver_common::config::{
    config_file_path, resolve_acoustid_api_key, LoggingConfig, TomlConfig, ACOUSTID_KEY_ENV,
};
use shelver_common::logging::filter_directive;
use shelver_common::Error;
use std::env;
use std::fs;
use tempfile::TempDir;

fn toml_with_key(key: &str) -> TomlConfig {
    TomlConfig {
        acoustid_api_key: Some(key.to_string()),
        ..TomlConfig::default()
    }
}

#[test]
fn test_load_explicit_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(
        &path,
        "acoustid_api_key = \"from-file\"\nacceptance_threshold = 0.75\n",
    )
    .unwrap();

    let located = config_file_path(Some(path.as_path())).unwrap();
    assert_eq!(located.as_deref(), Some(path.as_path()));

    let config = TomlConfig::load(located.as_deref()).unwrap();
    assert_eq!(config.acoustid_api_key.as_deref(), Some("from-file"));
    assert_eq!(config.acceptance_threshold, Some(0.75));
}

#[test]
fn test_load_missing_explicit_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("absent.toml");

    let result = config_file_path(Some(path.as_path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_load_without_file_uses_defaults() {
    let config = TomlConfig::load(None).unwrap();
    assert!(config.acoustid_api_key.is_none());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_load_malformed_config_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[logging\nlevel = ").unwrap();

    let result = TomlConfig::load(Some(path.as_path()));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_cli_key_takes_priority() {
    env::set_var(ACOUSTID_KEY_ENV, "env-key");
    let key = resolve_acoustid_api_key(Some("cli-key"), &toml_with_key("toml-key"));
    env::remove_var(ACOUSTID_KEY_ENV);

    assert_eq!(key.as_deref(), Some("cli-key"));
}

#[test]
#[serial]
fn test_env_key_beats_toml() {
    env::set_var(ACOUSTID_KEY_ENV, "env-key");
    let key = resolve_acoustid_api_key(None, &toml_with_key("toml-key"));
    env::remove_var(ACOUSTID_KEY_ENV);

    assert_eq!(key.as_deref(), Some("env-key"));
}

#[test]
#[serial]
fn test_toml_key_used_as_last_resort() {
    env::remove_var(ACOUSTID_KEY_ENV);
    let key = resolve_acoustid_api_key(None, &toml_with_key("toml-key"));
    assert_eq!(key.as_deref(), Some("toml-key"));
}

#[test]
#[serial]
fn test_blank_keys_are_ignored() {
    env::set_var(ACOUSTID_KEY_ENV, "   ");
    let key = resolve_acoustid_api_key(Some(""), &toml_with_key(" "));
    env::remove_var(ACOUSTID_KEY_ENV);

    assert!(key.is_none());
}

#[test]
#[serial]
fn test_no_key_anywhere() {
    env::remove_var(ACOUSTID_KEY_ENV);
    assert!(resolve_acoustid_api_key(None, &TomlConfig::default()).is_none());
}

#[test]
#[serial]
fn test_filter_directive_priority() {
    let config = LoggingConfig {
        level: "warn".to_string(),
        file: None,
    };

    env::remove_var("RUST_LOG");
    assert_eq!(filter_directive(&config, false), "warn");

    env::set_var("RUST_LOG", "shelver=trace");
    assert_eq!(filter_directive(&config, false), "shelver=trace");
    assert_eq!(filter_directive(&config, true), "debug");
    env::remove_var("RUST_LOG");
}
