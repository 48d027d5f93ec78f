//! Application startup
//!
//! Loads configuration, starts logging, registers the demo modules and runs
//! them from bring-up until a shutdown signal (or straight through with
//! `--check`) before tearing everything down.

use crate::app::cli::args::Args;
use crate::app::cli::config::{AppConfig, Settings};
use crate::app::demo::{register_demo_modules, DEFAULT_HEARTBEAT_INTERVAL};
use crate::core::logging::init_logging;
use crate::core::shutdown::ShutdownCoordinator;
use crate::core::version;
use crate::module::api::{log_module_error_with_context, ModuleError, ModuleManager};
use log::{info, warn};
use std::io::IsTerminal;
use std::process::ExitCode;

/// What happened during one host run
#[derive(Debug, Default)]
pub struct RunReport {
    pub registered: Vec<String>,
    pub start_failures: Vec<ModuleError>,
    pub stop_failures: Vec<ModuleError>,
}

impl RunReport {
    pub fn is_clean(&self) -> bool {
        self.start_failures.is_empty() && self.stop_failures.is_empty()
    }

    /// Failures only fail the process in check mode
    pub fn failed(&self, check: bool) -> bool {
        check && !self.is_clean()
    }

    pub fn exit_code(&self, check: bool) -> ExitCode {
        if self.failed(check) {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

/// Entry point of the binary
pub async fn run(args: Args) -> ExitCode {
    let config = match AppConfig::load(args.config_file.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let settings = Settings::resolve(&args, &config, std::io::stderr().is_terminal());

    let log_file = settings.log_file.as_ref().map(|p| p.to_string_lossy());
    if let Err(e) = init_logging(
        Some(settings.log_level.as_str()),
        Some(settings.log_format.as_str()),
        log_file.as_deref(),
        settings.color,
    ) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }
    info!("{}", version::summary());

    let coordinator = ShutdownCoordinator::new();
    coordinator.install_signal_handlers();

    match host(&settings, &coordinator).await {
        Ok(report) => report.exit_code(settings.check),
        Err(e) => {
            log_module_error_with_context(&e, "Registering modules");
            ExitCode::FAILURE
        }
    }
}

/// Register, bring up, wait, and tear down the modules
///
/// Without `check` this waits for `coordinator` to signal shutdown between
/// bring-up and tear-down.
pub async fn host(
    settings: &Settings,
    coordinator: &ShutdownCoordinator,
) -> Result<RunReport, ModuleError> {
    let manager = ModuleManager::new();
    let registered = register_demo_modules(&manager, DEFAULT_HEARTBEAT_INTERVAL, |name| {
        settings.is_disabled(name)
    })?;
    info!("Registered modules: {}", registered.join(", "));

    let start_failures = manager.start_all().await;
    if !start_failures.is_empty() {
        warn!(
            "{} module failure(s) during start-up, {} module(s) running",
            start_failures.len(),
            manager.len()
        );
    }

    if !settings.check {
        info!("Running {} module(s), waiting for shutdown signal", manager.len());
        coordinator.wait().await;
    }

    let stop_failures = manager.stop_all().await;
    info!("All modules stopped");

    Ok(RunReport {
        registered,
        start_failures,
        stop_failures,
    })
}
