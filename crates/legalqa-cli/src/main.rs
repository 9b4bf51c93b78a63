//! Legal QA CLI - ask legal questions and manage the authenticated workspace.
//!
//! Anonymous users can ask questions; signing in unlocks document and URL
//! ingestion, usage monitoring and drift comparison.

mod app;
mod cli;
mod render;

use std::io;

use anyhow::Result;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use cli::{parse_args, Command};
use legalqa_core::Config;

/// Log file prefix inside the configured log directory
const LOG_FILE_PREFIX: &str = "legalqa.log";

/// Initialize the tracing subscriber for logging.
///
/// The returned guard must stay alive for file logs to be flushed.
fn init_tracing() -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let log_dir = Config::load().ok().and_then(|c| c.log_dir);
    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (
                Some(fmt::layer().with_writer(writer).with_ansi(false)),
                Some(guard),
            )
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(file_layer)
        .with(filter)
        .init();

    guard
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let _log_guard = init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let invocation = parse_args(&args)?;
    if invocation.command == Command::Help {
        print!("{}", cli::USAGE);
        return Ok(());
    }

    info!("Legal QA client starting");

    let mut app = App::new(invocation.ephemeral)?;
    app.start().await;
    app.run(invocation.command).await
}
