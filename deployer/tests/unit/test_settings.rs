//! Settings loading and lookup tests

use std::fs;

use branchdeploy::errors::DeployError;
use branchdeploy::filesys::file::File;
use branchdeploy::storage::layout::{StorageLayout, SETTINGS_FILE_NAME};
use branchdeploy::storage::settings::Settings;
use tempfile::TempDir;

const SETTINGS_JSON: &str = r#"{
    "namespace": "acme",
    "domain": "example.com",
    "collaborators": ["dev@acme.io"],
    "addons": ["heroku-postgresql"],
    "env_vars": {"RAILS_ENV": "review"},
    "platform": {"api_key": "file-key"},
    "tracker": {"project_id": "99", "delivered_state": "accepted"},
    "code_host": {"repository": "acme/web", "base_branch": "main"},
    "wait": {"poll_interval_secs": 2, "max_wait_secs": 120}
}"#;

#[tokio::test]
async fn test_load_settings_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    fs::write(&path, SETTINGS_JSON).unwrap();

    let settings = Settings::load(&File::new(&path)).await.unwrap();

    assert_eq!(settings.namespace, "acme");
    assert_eq!(settings.domain.as_deref(), Some("example.com"));
    assert_eq!(settings.addons, vec!["heroku-postgresql".to_string()]);
    assert_eq!(settings.env_vars.get("RAILS_ENV").map(String::as_str), Some("review"));
    assert_eq!(settings.tracker.delivered_state, "accepted");
    assert_eq!(settings.code_host.base_branch, "main");
    assert_eq!(settings.wait.poll_interval_secs, 2);
    assert_eq!(settings.wait.max_wait_secs, 120);
    assert!(settings.platform.api_key.is_some());
    // Untouched sections keep their defaults
    assert_eq!(settings.git.canonical_remote, "origin");
    assert_eq!(settings.database.migrate_command, "rake db:migrate");
}

#[tokio::test]
async fn test_missing_settings_file() {
    let dir = TempDir::new().unwrap();
    let file = File::new(dir.path().join("absent.json"));

    let err = Settings::load(&file).await.unwrap_err();

    assert!(matches!(err, DeployError::ConfigError(ref msg) if msg.contains("absent.json")));
}

#[tokio::test]
async fn test_malformed_settings_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    fs::write(&path, "{ \"namespace\": ").unwrap();

    let err = Settings::load(&File::new(&path)).await.unwrap_err();

    assert!(matches!(err, DeployError::ConfigError(_)));
}

#[tokio::test]
async fn test_invalid_namespace_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    fs::write(&path, r#"{"namespace": "Acme Corp", "platform": {"api_key": "k"}}"#).unwrap();

    let err = Settings::load(&File::new(&path)).await.unwrap_err();

    assert!(matches!(err, DeployError::ConfigError(ref msg) if msg.contains("Acme Corp")));
}

#[tokio::test]
async fn test_repo_settings_win_over_user_settings() {
    let work = TempDir::new().unwrap();
    let user = TempDir::new().unwrap();
    let layout = StorageLayout::new(work.path(), Some(user.path().to_path_buf()));

    let user_file = user.path().join("branchdeploy").join("settings.json");
    fs::create_dir_all(user_file.parent().unwrap()).unwrap();
    fs::write(&user_file, "{}").unwrap();

    // Only the user file exists
    assert_eq!(layout.settings_file().await.path(), user_file.as_path());

    fs::write(work.path().join(SETTINGS_FILE_NAME), "{}").unwrap();
    assert_eq!(
        layout.settings_file().await.path(),
        work.path().join(SETTINGS_FILE_NAME).as_path()
    );
}

#[tokio::test]
async fn test_settings_file_falls_back_to_repo_path() {
    let work = TempDir::new().unwrap();
    let layout = StorageLayout::new(work.path(), None);

    let file = layout.settings_file().await;

    assert_eq!(file.path(), work.path().join(SETTINGS_FILE_NAME).as_path());
    assert!(!file.exists().await);
}

#[tokio::test]
async fn test_settings_without_platform_key_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(SETTINGS_FILE_NAME);
    fs::write(&path, r#"{"namespace": "acme"}"#).unwrap();

    let mut settings = Settings::load(&File::new(&path)).await.unwrap();
    assert_eq!(settings.namespace, "acme");

    // Only deploy and undeploy need the key
    settings.platform.api_key = None;
    let err = settings.require_platform_key().unwrap_err();
    assert!(matches!(err, DeployError::ConfigError(ref msg) if msg.contains("HEROKU_API_KEY")));
}
