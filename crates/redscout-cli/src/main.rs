mod client;
mod discover;
mod signals;

use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Parser)]
#[command(name = "redscout")]
#[command(about = "Reddit audience discovery and buying-signal scanner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Discover communities matching free-text audience queries.
    Discover(discover::DiscoverArgs),
    /// Scan subreddits for keyword buying signals.
    Signals(signals::SignalsArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let cancel = cancel_on_ctrl_c();

    match cli.command {
        Commands::Discover(args) => discover::run(args, cancel).await,
        Commands::Signals(args) => signals::run(args, cancel).await,
    }
}

/// Wires ctrl-c to an advisory cancellation token. The running scan stops at
/// its next checkpoint and reports what it gathered so far.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("interrupt received; finishing current step and stopping");
            handle.cancel();
        }
    });
    cancel
}
