//! cue-bridge: stage display → OSC bridge, entry point.
//!
//! Connects to a presentation tool's stage display WebSocket, follows the
//! slide text of the active layout, and republishes it as OSC messages over
//! UDP to a lighting / VJ application.
//!
//! # Usage
//!
//! ```text
//! cue-bridge --host 192.168.1.20 --port 50001 --password stage \
//!            --osc-host 192.168.1.30 --osc-port 7000 \
//!            --group-a /layers/3/text,/layers/3/connect \
//!            --group-b /layers/4/text,/layers/4/connect \
//!            --next-text-delay-ms 500
//!
//! cue-bridge --config config.json
//! ```
//!
//! # Configuration sources
//!
//! Flags override environment variables (`CUE_*`), which override the config
//! file given with `--config`.  See `infrastructure::config_file` for the
//! file format.
//!
//! | Variable                   | Default           | Description                        |
//! |----------------------------|-------------------|------------------------------------|
//! | `CUE_HOST` / `CUE_PORT`    | required          | Stage display endpoint             |
//! | `CUE_PASSWORD`             | empty             | Stage display password             |
//! | `CUE_PATH`                 | `/stagedisplay`   | WebSocket path                     |
//! | `CUE_OSC_HOST` / `_PORT`   | required          | OSC receiver                       |
//! | `CUE_OSC_BIND`             | `0.0.0.0:57121`   | Local OSC socket                   |
//! | `CUE_GROUP_A` / `_B`       | A required        | Comma-separated OSC addresses      |
//! | `CUE_NEXT_TEXT_DELAY_MS`   | `0` (off)         | Pre-load delay of the next text    |
//! | `CUE_SECONDARY_DELAY_MS`   | `0` (off)         | Trigger delay after a text change  |
//! | `CUE_RECONNECT_SECS`       | `5`               | Reconnect polling interval         |
//!
//! `RUST_LOG`, when set, replaces the log filter built from `--debug`,
//! `--debug-rx` and `--debug-tx`.

use std::path::PathBuf;

use anyhow::Context;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cue_bridge::domain::{BridgeConfig, LogToggles};
use cue_bridge::infrastructure::{load_file_config, run_bridge, ConfigError, FileConfig};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Stage display to OSC bridge.
///
/// Every option may also come from a `CUE_*` environment variable or the
/// config file.
#[derive(Debug, Parser)]
#[command(
    name = "cue-bridge",
    about = "Republishes presentation stage display text as OSC messages",
    version
)]
struct Cli {
    /// TOML config file, or JSON when the name ends in `.json`.
    #[arg(long, env = "CUE_CONFIG")]
    config: Option<PathBuf>,

    /// Host of the presentation tool.
    #[arg(long, env = "CUE_HOST")]
    host: Option<String>,

    /// Stage display port of the presentation tool.
    #[arg(long, env = "CUE_PORT")]
    port: Option<u16>,

    /// Stage display password.
    #[arg(long, env = "CUE_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// WebSocket path of the stage display endpoint.
    #[arg(long, env = "CUE_PATH")]
    path: Option<String>,

    /// Host of the OSC receiver.
    #[arg(long, env = "CUE_OSC_HOST")]
    osc_host: Option<String>,

    /// UDP port of the OSC receiver.
    #[arg(long, env = "CUE_OSC_PORT")]
    osc_port: Option<u16>,

    /// Local `ip:port` of the OSC socket.
    #[arg(long, env = "CUE_OSC_BIND")]
    osc_bind: Option<String>,

    /// Group A addresses: the text address first, then trigger addresses.
    #[arg(long, env = "CUE_GROUP_A", value_delimiter = ',')]
    group_a: Vec<String>,

    /// Group B addresses; when set, slides alternate between A and B.
    #[arg(long, env = "CUE_GROUP_B", value_delimiter = ',')]
    group_b: Vec<String>,

    /// Delay before the next slide's text is pre-loaded into the idle group.
    #[arg(long, env = "CUE_NEXT_TEXT_DELAY_MS")]
    next_text_delay_ms: Option<u64>,

    /// Delay before trigger pulses when the text changed.
    #[arg(long, env = "CUE_SECONDARY_DELAY_MS")]
    secondary_delay_ms: Option<u64>,

    /// Seconds between reconnect checks.
    #[arg(long, env = "CUE_RECONNECT_SECS")]
    reconnect_secs: Option<u64>,

    /// Debug logging for the whole bridge.
    #[arg(long, env = "CUE_DEBUG")]
    debug: bool,

    /// Log every inbound stage display message.
    #[arg(long, env = "CUE_DEBUG_RX")]
    debug_rx: bool,

    /// Log every outbound request and OSC message.
    #[arg(long, env = "CUE_DEBUG_TX")]
    debug_tx: bool,
}

impl Cli {
    /// The settings given on the command line, as overrides for the file.
    ///
    /// Boolean flags can only switch a toggle on.
    fn overrides(&self) -> FileConfig {
        FileConfig {
            host: self.host.clone(),
            port: self.port,
            password: self.password.clone(),
            path: self.path.clone(),
            osc_host: self.osc_host.clone(),
            osc_port: self.osc_port,
            osc_bind: self.osc_bind.clone(),
            group_a: non_empty(&self.group_a),
            group_b: non_empty(&self.group_b),
            next_text_delay_ms: self.next_text_delay_ms,
            secondary_delay_ms: self.secondary_delay_ms,
            reconnect_secs: self.reconnect_secs,
            debug: self.debug.then_some(true),
            debug_rx: self.debug_rx.then_some(true),
            debug_tx: self.debug_tx.then_some(true),
        }
    }

    /// Loads the config file, if any, and merges the flags over it.
    fn load_config(&self) -> Result<BridgeConfig, ConfigError> {
        let file = match &self.config {
            Some(path) => load_file_config(path)?,
            None => FileConfig::default(),
        };
        file.merge(self.overrides()).into_bridge_config()
    }
}

fn non_empty(values: &[String]) -> Option<Vec<String>> {
    (!values.is_empty()).then(|| values.to_vec())
}

/// `info` plus whatever the toggles switch on.
fn log_filter(toggles: &LogToggles) -> String {
    std::iter::once("info".to_string())
        .chain(toggles.filter_directives())
        .collect::<Vec<_>>()
        .join(",")
}

/// Resolves on Ctrl+C.  If the handler cannot be installed it never resolves.
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("received Ctrl+C, shutting down"),
        Err(e) => {
            error!("failed to listen for Ctrl+C signal: {e}");
            std::future::pending::<()>().await;
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(ConfigError::Missing(setting)) => Cli::command()
            .error(
                ErrorKind::MissingRequiredArgument,
                format!(
                    "missing required setting `{setting}` (pass --{}, or set it in the config file)",
                    setting.replace('_', "-")
                ),
            )
            .exit(),
        Err(e) => return Err(e).context("invalid configuration"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_filter(&config.logging))),
        )
        .init();

    info!("cue-bridge starting");
    run_bridge(config, shutdown_signal()).await?;
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
