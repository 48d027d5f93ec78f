use clap::Parser;
use modlife::app::cli::args::Args;
use modlife::app::startup;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    startup::run(Args::parse()).await
}
