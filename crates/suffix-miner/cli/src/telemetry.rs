//! Tracing subscriber setup for the binary.

use anyhow::{
    Context,
    Result,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVE: &str = "info";

/// Install a stderr fmt subscriber filtered by `RUST_LOG` (default `info`).
/// Alloy's transport crates are capped at `warn` so `fetch` output stays readable.
pub fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE))
        .add_directive(
            "alloy_rpc_client=warn"
                .parse()
                .context("invalid directive")?,
        )
        .add_directive("alloy_transport=warn".parse().context("invalid directive")?);

    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to initialize tracing subscriber")?;
    Ok(())
}
