//! CLI Integration Test Modules

pub mod argument_parsing;
pub mod host_run;
pub mod toml_config;
