//! CLI Integration Tests
//!
//! Tests are organized by functionality:
//! - `cli::argument_parsing` - command-line parsing and settings resolution
//! - `cli::toml_config` - configuration file loading and merging
//! - `cli::host_run` - check-mode runs of the host with the demo modules

mod cli;
