//! Configuration loading and root folder resolution
//!
//! Tests that touch FATI_ROOT_FOLDER or FATI_ROOT are marked #[serial] so
//! they never run in parallel with each other.

use fati_common::config::{
    load_toml_config, parse_toml_config, CompiledDefaults, RootFolderInitializer,
    RootFolderResolver, TomlConfig, DATABASE_FILE_NAME, ROOT_ENV, ROOT_FOLDER_ENV,
};
use fati_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;

fn clear_root_env() {
    env::remove_var(ROOT_FOLDER_ENV);
    env::remove_var(ROOT_ENV);
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert_eq!(defaults.log_level, "info");
    assert!(defaults.log_file.is_none());
    assert!(defaults.root_folder.to_string_lossy().contains("fati"));
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    clear_root_env();

    let root = RootFolderResolver::new(None, &TomlConfig::default()).resolve();
    assert_eq!(root, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_cli_argument_wins() {
    env::set_var(ROOT_FOLDER_ENV, "/tmp/fati-from-env");

    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/fati-from-toml")),
        ..Default::default()
    };
    let root = RootFolderResolver::new(Some(PathBuf::from("/tmp/fati-from-cli")), &toml).resolve();
    assert_eq!(root, PathBuf::from("/tmp/fati-from-cli"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_env_priority() {
    clear_root_env();
    env::set_var(ROOT_ENV, "/tmp/fati-alt");
    let root = RootFolderResolver::new(None, &TomlConfig::default()).resolve();
    assert_eq!(root, PathBuf::from("/tmp/fati-alt"));

    // FATI_ROOT_FOLDER outranks FATI_ROOT
    env::set_var(ROOT_FOLDER_ENV, "/tmp/fati-primary");
    let root = RootFolderResolver::new(None, &TomlConfig::default()).resolve();
    assert_eq!(root, PathBuf::from("/tmp/fati-primary"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_env_outranks_toml() {
    clear_root_env();
    let toml = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/fati-from-toml")),
        ..Default::default()
    };

    let root = RootFolderResolver::new(None, &toml).resolve();
    assert_eq!(root, PathBuf::from("/tmp/fati-from-toml"));

    env::set_var(ROOT_FOLDER_ENV, "/tmp/fati-from-env");
    let root = RootFolderResolver::new(None, &toml).resolve();
    assert_eq!(root, PathBuf::from("/tmp/fati-from-env"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_ignores_blank_env() {
    clear_root_env();
    env::set_var(ROOT_FOLDER_ENV, "   ");
    let root = RootFolderResolver::new(None, &TomlConfig::default()).resolve();
    assert_eq!(root, CompiledDefaults::for_current_platform().root_folder);
    clear_root_env();
}

#[test]
fn test_parse_full_toml() {
    let config = parse_toml_config(
        r#"
        root_folder = "/srv/fati"

        [logging]
        level = "debug"
        file = "/var/log/fati.log"

        [import]
        health_json = "/data/sante.json"
        education_json = "/data/education.json"
        geo_dir = "/data/geo"
        "#,
    )
    .unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/fati")));
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.file, Some(PathBuf::from("/var/log/fati.log")));
    assert_eq!(config.import.health_json, Some(PathBuf::from("/data/sante.json")));
    assert_eq!(config.import.education_json, Some(PathBuf::from("/data/education.json")));
    assert_eq!(config.import.geo_dir, Some(PathBuf::from("/data/geo")));
}

#[test]
fn test_parse_empty_toml_uses_defaults() {
    let config = parse_toml_config("").unwrap();
    assert_eq!(config, TomlConfig::default());
    assert_eq!(config.logging.level, "info");
}

#[test]
fn test_parse_invalid_toml_is_config_error() {
    let result = parse_toml_config("root_folder = [");
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_load_explicit_missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    let result = load_toml_config(Some(&dir.path().join("absent.toml")));
    assert!(matches!(result, Err(Error::Config(_))));
}

#[test]
fn test_load_explicit_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[logging]\nlevel = \"warn\"\n").unwrap();

    let config = load_toml_config(Some(&path)).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert!(config.root_folder.is_none());
}

#[test]
fn test_initializer_creates_directory() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("nested").join("fati");

    let initializer = RootFolderInitializer::new(root.clone());
    initializer.ensure_directory_exists().unwrap();
    // Idempotent
    initializer.ensure_directory_exists().unwrap();

    assert!(root.is_dir());
    assert_eq!(initializer.database_path(), root.join(DATABASE_FILE_NAME));
    assert!(!initializer.database_exists());

    std::fs::write(initializer.database_path(), b"").unwrap();
    assert!(initializer.database_exists());
}
