mod cli;
mod fetch;
mod json_rpc_client;
mod mine;
mod telemetry;

use crate::cli::{
    Cli,
    Commands,
};
use anyhow::{
    Context,
    Result,
};
use clap::Parser;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{
    info,
    warn,
};

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing()?;
    let cli = Cli::parse();

    // Signals stop mining; rows already started are written with what they found.
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = shutdown_signal().await {
            warn!("Error setting up signal handler: {}", e);
        } else {
            info!("Shutdown signal received, stopping search...");
            signal_cancel.cancel();
        }
    });

    let result = async {
        match &cli.command {
            Commands::Mine(mine) => {
                mine.run(&cli.args, cancel.clone()).await?;
            }
            Commands::Fetch(fetch) => {
                fetch.run(&cli.args).await?;
            }
        }
        Ok::<_, anyhow::Error>(())
    }
    .await;

    if let Err(err) = result {
        if cli.args.json_output() {
            eprintln!(
                "{}",
                json!({
                    "status": "error",
                    "error": {
                        "message": format!("{err:#}"),
                    }
                })
            );
            std::process::exit(1);
        } else {
            return Err(err);
        }
    }

    Ok(())
}

/// Wait for SIGTERM or SIGINT (Ctrl+C)
async fn shutdown_signal() -> Result<()> {
    use tokio::signal;

    #[cfg(unix)]
    {
        let mut sigterm = signal::unix::signal(signal::unix::SignalKind::terminate())
            .context("failed to install SIGTERM handler")?;
        let mut sigint = signal::unix::signal(signal::unix::SignalKind::interrupt())
            .context("failed to install SIGINT handler")?;

        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM");
            }
            _ = sigint.recv() => {
                info!("Received SIGINT");
            }
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .context("failed to listen for ctrl-c")?;
        info!("Received Ctrl+C");
    }

    Ok(())
}
