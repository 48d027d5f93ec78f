//! CLI argument parsing tests

use clap::Parser;
use modlife::app::cli::args::Args;
use modlife::app::cli::config::{AppConfig, Settings};
use std::path::PathBuf;

#[test]
fn test_all_options() {
    let args = Args::try_parse_from([
        "modlife",
        "--config-file",
        "/etc/modlife.toml",
        "--log-level",
        "warn",
        "--log-format",
        "ext",
        "--log-file",
        "/tmp/modlife.log",
        "--color",
        "--disable",
        "Stats",
        "--check",
    ])
    .unwrap();

    assert_eq!(args.config_file, Some(PathBuf::from("/etc/modlife.toml")));
    assert_eq!(args.log_level.as_deref(), Some("warn"));
    assert_eq!(args.log_format.as_deref(), Some("ext"));
    assert_eq!(args.log_file, Some(PathBuf::from("/tmp/modlife.log")));
    assert_eq!(args.color_override(), Some(true));
    assert_eq!(args.disabled_modules(), vec!["Stats"]);
    assert!(args.check);
}

#[test]
fn test_invalid_log_level_rejected() {
    assert!(Args::try_parse_from(["modlife", "--log-level", "loud"]).is_err());
}

#[test]
fn test_settings_from_cli_only() {
    let args = Args::try_parse_from(["modlife", "-l", "debug", "-d", "Heartbeat,Clock"]).unwrap();

    let settings = Settings::resolve(&args, &AppConfig::default(), false);

    assert_eq!(settings.log_level, "debug");
    assert!(settings.is_disabled("clock"));
    assert!(settings.is_disabled("Heartbeat"));
    assert!(!settings.is_disabled("Stats"));
}
