use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use trace_autogen::app::{self, Cli};
use trace_autogen::session_logger::log_startup;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    log_startup(&format!(
        "trace {} starting in {}",
        env!("CARGO_PKG_VERSION"),
        cli.working_dir
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| ".".to_string())
    ));

    app::run(cli).await
}
