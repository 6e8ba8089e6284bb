mod analyzer_client;
mod app;
mod cli;
mod config;
mod controller;
mod errors;
mod models;
mod progress;
mod session;
mod view;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analyzer_client::HttpAnalyzer;
use crate::cli::Cli;
use crate::config::ClientConfig;
use crate::progress::StdRandom;
use crate::session::Session;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = ClientConfig::from_env()?.with_endpoint(cli.endpoint.clone());

    // Logs go to stderr so stdout stays clean for the report (and --json).
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting resume client v{}", env!("CARGO_PKG_VERSION"));

    let analyzer = HttpAnalyzer::from_config(&config)?;
    info!(
        "Analyzer endpoint: {} (timeout {}s)",
        analyzer.url(),
        config.request_timeout.as_secs()
    );

    let mut session = Session::new(
        Arc::new(analyzer),
        Box::new(StdRandom::from_entropy()),
        config.progress,
    );

    let cancel = async {
        if tokio::signal::ctrl_c().await.is_err() {
            // No signal handler available; never cancel.
            std::future::pending::<()>().await;
        }
    };

    let outcome = app::run(&mut session, &cli, cancel, &mut std::io::stdout()).await?;
    Ok(outcome.exit_code())
}
