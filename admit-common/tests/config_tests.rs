//! Configuration resolution tests
//!
//! Tests that touch process environment variables are marked #[serial]
//! so they do not race each other.

use admit_common::config::{
    default_root_folder, resolve_root_folder, resolve_secret, RootFolder, TomlConfig,
};
use serial_test::serial;
use std::env;
use std::path::{Path, PathBuf};

const TEST_ENV: &str = "ADMIT_TEST_ROOT_FOLDER";
const TEST_SECRET_ENV: &str = "ADMIT_TEST_SECRET";

#[test]
#[serial]
fn test_cli_argument_wins() {
    env::set_var(TEST_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some("/from/toml".to_string()),
        ..Default::default()
    };

    let resolved = resolve_root_folder(Some(Path::new("/from/cli")), TEST_ENV, &toml);
    assert_eq!(resolved, PathBuf::from("/from/cli"));

    env::remove_var(TEST_ENV);
}

#[test]
#[serial]
fn test_env_beats_toml() {
    env::set_var(TEST_ENV, "/from/env");
    let toml = TomlConfig {
        root_folder: Some("/from/toml".to_string()),
        ..Default::default()
    };

    assert_eq!(
        resolve_root_folder(None, TEST_ENV, &toml),
        PathBuf::from("/from/env")
    );

    env::remove_var(TEST_ENV);
}

#[test]
#[serial]
fn test_toml_then_default() {
    env::remove_var(TEST_ENV);

    let toml = TomlConfig {
        root_folder: Some("/from/toml".to_string()),
        ..Default::default()
    };
    assert_eq!(
        resolve_root_folder(None, TEST_ENV, &toml),
        PathBuf::from("/from/toml")
    );

    assert_eq!(
        resolve_root_folder(None, TEST_ENV, &TomlConfig::default()),
        default_root_folder()
    );
}

#[test]
#[serial]
fn test_blank_env_is_ignored() {
    env::set_var(TEST_ENV, "   ");
    assert_eq!(
        resolve_root_folder(None, TEST_ENV, &TomlConfig::default()),
        default_root_folder()
    );
    env::remove_var(TEST_ENV);
}

#[test]
#[serial]
fn test_secret_resolution_order() {
    env::remove_var(TEST_SECRET_ENV);
    assert_eq!(resolve_secret("Test secret", TEST_SECRET_ENV, None), None);
    assert_eq!(
        resolve_secret("Test secret", TEST_SECRET_ENV, Some("from-toml")),
        Some("from-toml".to_string())
    );
    assert_eq!(resolve_secret("Test secret", TEST_SECRET_ENV, Some("  ")), None);

    env::set_var(TEST_SECRET_ENV, "from-env");
    assert_eq!(
        resolve_secret("Test secret", TEST_SECRET_ENV, Some("from-toml")),
        Some("from-env".to_string())
    );
    env::remove_var(TEST_SECRET_ENV);
}

#[test]
fn test_load_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/admit"
anthropic_api_key = "sk-ant-test"
feedback_model = "claude-test"
"#,
    )
    .unwrap();

    let config = TomlConfig::load(&path).unwrap();
    assert_eq!(config.root_folder.as_deref(), Some("/srv/admit"));
    assert_eq!(config.anthropic_api_key.as_deref(), Some("sk-ant-test"));
    assert_eq!(config.feedback_model.as_deref(), Some("claude-test"));
}

#[test]
fn test_invalid_config_degrades_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "root_folder = [not valid").unwrap();

    assert!(TomlConfig::load(&path).is_err());
    assert_eq!(TomlConfig::load_or_default(Some(&path)), TomlConfig::default());

    let missing = dir.path().join("missing.toml");
    assert_eq!(
        TomlConfig::load_or_default(Some(&missing)),
        TomlConfig::default()
    );
}

#[test]
fn test_root_folder_creates_audio_dir() {
    let dir = tempfile::tempdir().unwrap();
    let root = RootFolder::new(dir.path().join("nested").join("root"));

    root.ensure_directory_exists().unwrap();

    assert!(root.path().is_dir());
    assert!(root.audio_dir().is_dir());
}
