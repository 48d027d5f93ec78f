//! Check-mode host runs with the demo modules

use clap::Parser;
use modlife::app::cli::args::Args;
use modlife::app::cli::config::{AppConfig, Settings};
use modlife::app::startup::host;
use modlife::core::shutdown::ShutdownCoordinator;
use modlife::module::api::ModuleError;

fn check_settings(extra: &[&str]) -> Settings {
    let mut argv = vec!["modlife", "--check"];
    argv.extend_from_slice(extra);
    let args = Args::try_parse_from(argv).unwrap();
    Settings::resolve(&args, &AppConfig::default(), false)
}

#[tokio::test]
async fn test_check_run_starts_and_stops_everything() {
    let report = host(&check_settings(&[]), &ShutdownCoordinator::new())
        .await
        .unwrap();

    assert_eq!(report.registered.len(), 4);
    assert!(report.is_clean(), "{:?}", report);
}

#[tokio::test]
async fn test_disabling_provider_prunes_dependent() {
    let report = host(&check_settings(&["--disable", "EventLog"]), &ShutdownCoordinator::new())
        .await
        .unwrap();

    assert!(!report.registered.contains(&"EventLog".to_string()));
    assert!(report.failed(true));
    assert!(matches!(
        report.start_failures.as_slice(),
        [ModuleError::DependencyMissing { module, .. }] if module == "Stats"
    ));
}
