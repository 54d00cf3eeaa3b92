//! ripmate-tui — terminal front-end for the ripmate download server.

mod action;
mod app;
mod component;
mod event;
mod picker;
mod screens;
mod theme;
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use ripmate_api::{ApiClient, TransportConfig};

use crate::app::App;

#[derive(Debug, Parser)]
#[command(name = "ripmate-tui", version, about = "TUI for the ripmate download server")]
struct Cli {
    /// Backend base URL (overrides the config file).
    #[arg(short, long, env = "RIPMATE_SERVER")]
    server: Option<String>,

    /// Log file path.
    #[arg(long, default_value = "/tmp/ripmate-tui.log")]
    log_file: PathBuf,

    /// Increase log verbosity (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// File-based tracing: stdout belongs to the TUI, so logs go to a file.
/// The returned guard must stay alive for the non-blocking writer to flush.
fn setup_tracing(cli: &Cli) -> Result<WorkerGuard> {
    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "ripmate_tui={level},ripmate_core={level},ripmate_api={level}"
        ))
    });

    let dir = cli.log_file.parent().unwrap_or_else(|| ".".as_ref());
    let file = cli
        .log_file
        .file_name()
        .unwrap_or_else(|| "ripmate-tui.log".as_ref());
    let appender = tracing_appender::rolling::never(dir, file);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = setup_tracing(&cli)?;
    tui::install_hooks()?;

    let mut config = ripmate_config::load_config_or_default();
    if let Some(server) = cli.server.clone() {
        config.server = server;
    }

    let base_url = config.server_url()?;
    info!(server = %base_url, "starting ripmate-tui");

    let transport = TransportConfig {
        timeout: config.timeout_duration(),
    };
    let api = Arc::new(ApiClient::new(base_url, &transport)?);

    let mut app = App::new(api);
    app.run().await
}
