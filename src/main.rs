mod cli;
mod config;
mod engine;
mod error;
mod reconciler;
mod runner;
mod tracker;
mod ui;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};
use config::SweepConfig;
use error::SweepError;
use runner::SweepRunner;
use tracker::JiraClient;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = SweepConfig::load()?;

    if config.base_url.is_empty() {
        return Err(SweepError::MissingBaseUrl.into());
    }
    if config.token.is_empty() {
        return Err(SweepError::MissingToken.into());
    }

    let client = JiraClient::with_retry(
        config.base_url.clone(),
        config.token.clone(),
        config.transport_retries,
        Duration::from_millis(config.retry_delay_ms),
    );

    // Ctrl-C requests a stop; the runner honors it between items so an
    // in-flight reopen cycle always restores before the run ends.
    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    let page_size = cli.page_size.unwrap_or(config.page_size);
    let runner = SweepRunner::new(
        &client,
        &config,
        page_size,
        cli.max_results,
        cancel,
        cli.verbose,
    );

    match cli.command {
        Command::Run { query, value } => {
            runner.run(&query, &value).await?;
        }
        Command::Scan { query, value } => {
            runner.scan(&query, &value).await?;
        }
    }

    Ok(())
}
