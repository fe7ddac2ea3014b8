//! Configuration resolution tests
//!
//! Tests:
//! - Explicit config file is parsed
//! - Missing explicit file is an error
//! - Priority order for data folder (CLI → ENV → TOML → default)
//! - Environment override of the server base URL
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.

use credits_common::config::{
    resolve_data_folder, TomlConfig, BASE_URL_ENV, CONFIG_ENV, DATA_FOLDER_ENV,
};
use credits_common::Error;
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_config(dir: &TempDir, content: &str) -> PathBuf {
    let path = dir.path().join("config.toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
#[serial]
fn test_load_explicit_file() {
    env::remove_var(BASE_URL_ENV);
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        r#"
        [musicbrainz]
        base_url = "https://beta.musicbrainz.org"
        rate_limit_ms = 1500

        [storage]
        data_folder = "/tmp/credits-notice-toml"

        [logging]
        level = "debug"
        "#,
    );

    let config = TomlConfig::load(Some(&path)).unwrap();

    assert_eq!(config.musicbrainz.base_url, "https://beta.musicbrainz.org");
    assert_eq!(config.musicbrainz.rate_limit_ms, 1500);
    assert_eq!(config.logging.level, "debug");
    assert_eq!(
        config.storage.data_folder,
        Some(PathBuf::from("/tmp/credits-notice-toml"))
    );
}

#[test]
#[serial]
fn test_missing_explicit_file_is_error() {
    let result = TomlConfig::load(Some(Path::new("/nonexistent/credits-notice.toml")));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
#[serial]
fn test_config_env_var_names_file() {
    env::remove_var(BASE_URL_ENV);
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[logging]\nlevel = \"warn\"\n");
    env::set_var(CONFIG_ENV, &path);

    let config = TomlConfig::load(None).unwrap();
    assert_eq!(config.logging.level, "warn");

    env::remove_var(CONFIG_ENV);
}

#[test]
#[serial]
fn test_base_url_env_override() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "[musicbrainz]\nbase_url = \"https://from-toml\"\n");
    env::set_var(BASE_URL_ENV, "http://127.0.0.1:5000");

    let config = TomlConfig::load(Some(&path)).unwrap();
    assert_eq!(config.musicbrainz.base_url, "http://127.0.0.1:5000");

    env::remove_var(BASE_URL_ENV);
}

#[test]
#[serial]
fn test_data_folder_priority() {
    let mut config = TomlConfig::default();
    config.storage.data_folder = Some(PathBuf::from("/tmp/from-toml"));

    // CLI beats everything
    env::set_var(DATA_FOLDER_ENV, "/tmp/from-env");
    assert_eq!(
        resolve_data_folder(Some(Path::new("/tmp/from-cli")), &config),
        PathBuf::from("/tmp/from-cli")
    );

    // ENV beats TOML
    assert_eq!(resolve_data_folder(None, &config), PathBuf::from("/tmp/from-env"));

    // TOML beats default
    env::remove_var(DATA_FOLDER_ENV);
    assert_eq!(resolve_data_folder(None, &config), PathBuf::from("/tmp/from-toml"));

    // Compiled default
    let defaults = TomlConfig::default();
    let folder = resolve_data_folder(None, &defaults);
    assert!(!folder.as_os_str().is_empty());
}
