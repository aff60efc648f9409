//! Pixel relay: feeds newline-delimited storefront pixel messages through
//! the pixel listener and prints every forwarded analytics call as JSON.
//!
//! Calls go to stdout, logs go to stderr.

mod output;
mod relay;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use pixel_core::config::PixelConfig;
use pixel_web_sdk::{PixelListener, StaticHost};
use tokio::io::BufReader;
use tracing::info;

use crate::output::JsonLinesClient;

#[derive(Parser, Debug)]
#[command(name = "pixel-relay")]
#[command(about = "Normalize storefront pixel events into identify/track calls")]
#[command(version)]
struct Cli {
    /// TOML config file (environment variables still override it)
    #[arg(long, env = "STOREFRONT_PIXEL_CONFIG")]
    config: Option<PathBuf>,

    /// Read messages from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,

    /// Run as a host without a DOM-like context (listener disabled)
    #[arg(long, default_value_t = false)]
    headless: bool,

    /// Pretty-print forwarded calls
    #[arg(long, default_value_t = false)]
    pretty: bool,

    /// Stop at the first message that fails
    #[arg(long, default_value_t = false)]
    fail_fast: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixel_relay=info,pixel_web_sdk=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = PixelConfig::load(cli.config.as_deref())
        .with_context(|| format!("loading config from {:?}", cli.config))?;

    // Apply CLI overrides
    if cli.headless {
        config.host.can_use_dom = false;
    }
    if cli.pretty {
        config.relay.pretty = true;
    }
    if cli.fail_fast {
        config.relay.fail_fast = true;
    }

    info!(
        can_use_dom = config.host.can_use_dom,
        pretty = config.relay.pretty,
        fail_fast = config.relay.fail_fast,
        "Configuration loaded"
    );

    let client = Arc::new(JsonLinesClient::new(std::io::stdout(), config.relay.pretty));
    let listener = PixelListener::register(&StaticHost::from(&config.host), client);

    let summary = match &cli.input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            relay::relay(BufReader::new(file), listener.as_ref(), config.relay.fail_fast).await?
        }
        None => {
            relay::relay(
                BufReader::new(tokio::io::stdin()),
                listener.as_ref(),
                config.relay.fail_fast,
            )
            .await?
        }
    };

    if let Some(listener) = &listener {
        for stats in listener.all_stats() {
            info!(
                event_name = %stats.event_name,
                forwarded = stats.forwarded,
                ignored = stats.ignored,
                failed = stats.failed,
                "event totals"
            );
        }
    }

    if summary.failed > 0 {
        tracing::warn!(failed = summary.failed, "some messages could not be normalized");
    }

    Ok(())
}
