//! TOML configuration loading tests

use clap::Parser;
use modlife::app::cli::args::Args;
use modlife::app::cli::config::{AppConfig, ConfigError, Settings};
use std::fs;
use tempfile::TempDir;

#[tokio::test]
async fn test_load_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("modlife.toml");
    fs::write(
        &config_path,
        r#"
log-level = "warn"
log-format = "json"
color = false

[modules]
disabled = ["Heartbeat", "Stats"]
"#,
    )
    .unwrap();

    let config = AppConfig::load(Some(&config_path)).await.unwrap();

    assert_eq!(config.log_level.as_deref(), Some("warn"));
    assert_eq!(config.log_format.as_deref(), Some("json"));
    assert_eq!(config.color, Some(false));
    assert_eq!(config.modules.disabled, vec!["Heartbeat", "Stats"]);
}

#[tokio::test]
async fn test_cli_overrides_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("modlife.toml");
    fs::write(
        &config_path,
        "log-level = \"warn\"\n[modules]\ndisabled = [\"Stats\"]\n",
    )
    .unwrap();
    let args = Args::try_parse_from([
        "modlife",
        "--config-file",
        config_path.to_str().unwrap(),
        "--log-level",
        "trace",
        "--disable",
        "Heartbeat",
    ])
    .unwrap();

    let config = AppConfig::load(args.config_file.as_deref()).await.unwrap();
    let settings = Settings::resolve(&args, &config, false);

    assert_eq!(settings.log_level, "trace");
    assert_eq!(settings.disabled, vec!["Stats", "Heartbeat"]);
}

#[tokio::test]
async fn test_malformed_config_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("modlife.toml");
    fs::write(&config_path, "[modules\ndisabled = 3\n").unwrap();

    let result = AppConfig::load(Some(&config_path)).await;

    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[tokio::test]
async fn test_wrong_value_type_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("modlife.toml");
    fs::write(&config_path, "color = \"sometimes\"\n").unwrap();

    let result = AppConfig::load(Some(&config_path)).await;

    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[tokio::test]
async fn test_missing_config_file_is_error() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("absent.toml");

    let error = AppConfig::load(Some(&config_path)).await.unwrap_err();

    assert!(matches!(error, ConfigError::NotFound { .. }));
    assert!(error.to_string().contains("absent.toml"));
}
