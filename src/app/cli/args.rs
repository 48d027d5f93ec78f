//! Command-line arguments of the host binary

use clap::{ArgAction, Parser};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone, Default)]
#[command(name = "modlife")]
#[command(about = "Host that brings modules up in dependency order and tears them down safely")]
#[command(version)]
#[command(after_help = " * can be specified multiple times or as a comma-separated list")]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE")]
    pub config_file: Option<PathBuf>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"])]
    pub log_level: Option<String>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"])]
    pub log_format: Option<String>,

    /// Log file path (use 'none' to disable file logging)
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Force colored output (overrides TTY detection)
    #[arg(long = "color", conflicts_with = "no_color")]
    pub color: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Modules not to register*
    #[arg(short = 'd', long = "disable", value_name = "NAMES", action = ArgAction::Append)]
    pub disable: Vec<String>,

    /// Bring all modules up, tear them down again and exit
    #[arg(long = "check")]
    pub check: bool,
}

impl Args {
    /// Colour preference given on the command line, if any
    pub fn color_override(&self) -> Option<bool> {
        match (self.color, self.no_color) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }

    /// Disabled module names, split on commas, trimmed and deduplicated
    pub fn disabled_modules(&self) -> Vec<String> {
        split_names(&self.disable)
    }
}

/// Flatten comma-separated name lists, dropping blanks and duplicates
///
/// Names compare case-insensitively; the first spelling is kept.
pub fn split_names(values: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in values.iter().flat_map(|v| v.split(',')).map(str::trim) {
        if !name.is_empty() && !names.iter().any(|n| n.eq_ignore_ascii_case(name)) {
            names.push(name.to_string());
        }
    }
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["modlife"]).unwrap();
        assert!(args.config_file.is_none());
        assert!(!args.check);
        assert_eq!(args.color_override(), None);
        assert!(args.disabled_modules().is_empty());
    }

    #[test]
    fn test_disable_accepts_lists_and_repeats() {
        let args = Args::try_parse_from([
            "modlife",
            "--disable",
            "Heartbeat, Stats",
            "-d",
            "stats",
            "--disable=Clock",
        ])
        .unwrap();
        assert_eq!(args.disabled_modules(), vec!["Heartbeat", "Stats", "Clock"]);
    }

    #[test]
    fn test_color_flags_conflict() {
        assert!(Args::try_parse_from(["modlife", "--color", "--no-color"]).is_err());
        let args = Args::try_parse_from(["modlife", "--no-color"]).unwrap();
        assert_eq!(args.color_override(), Some(false));
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        assert!(Args::try_parse_from(["modlife", "--log-format", "xml"]).is_err());
        let args = Args::try_parse_from(["modlife", "-o", "json", "-l", "debug"]).unwrap();
        assert_eq!(args.log_format.as_deref(), Some("json"));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
    }
}
