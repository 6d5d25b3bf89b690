//! Integration tests for configuration resolution and graceful degradation
//!
//! Uses serial_test to prevent ENV variable races: tests touching
//! METAHUB_CONFIG run sequentially.

use metahub_common::config::{
    load_config, read_toml_config, resolve_config_path, write_toml_config, LoggingConfig,
    TomlConfig, CONFIG_ENV_VAR,
};
use metahub_common::MetadataSettings;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
#[serial]
fn test_cli_argument_wins_over_environment() {
    env::set_var(CONFIG_ENV_VAR, "/from/env.toml");

    let cli = PathBuf::from("/from/cli.toml");
    let resolved = resolve_config_path(Some(&cli), CONFIG_ENV_VAR);

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(cli));
}

#[test]
#[serial]
fn test_environment_used_without_cli_argument() {
    env::set_var(CONFIG_ENV_VAR, "/from/env.toml");

    let resolved = resolve_config_path(None, CONFIG_ENV_VAR);

    env::remove_var(CONFIG_ENV_VAR);
    assert_eq!(resolved, Some(PathBuf::from("/from/env.toml")));
}

#[test]
#[serial]
fn test_missing_file_degrades_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("absent.toml");

    let config = load_config(Some(&missing)).unwrap();

    assert_eq!(config, TomlConfig::default());
}

#[test]
#[serial]
fn test_unparseable_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "[metadata\nsave_rating = ").unwrap();

    assert!(load_config(Some(&path)).is_err());
}

#[test]
fn test_atomic_write_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let target = temp_dir.path().join("nested").join("metahub.toml");

    let config = TomlConfig {
        metadata: MetadataSettings {
            save_tags: false,
            photographer: Some("A. Person".to_string()),
            ..MetadataSettings::default()
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
    };

    write_toml_config(&config, &target).unwrap();

    assert!(target.exists());
    assert!(!target.with_extension("toml.tmp").exists());
    assert_eq!(read_toml_config(&target).unwrap(), config);
}
