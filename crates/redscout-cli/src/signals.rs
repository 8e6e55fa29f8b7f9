use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tokio_util::sync::CancellationToken;

use redscout_core::{builtin_presets, load_presets, resolve_preset};
use redscout_engine::{
    run_signal_scan, signals_csv, ScanProgress, ScanStatus, SignalScanParams, TimeWindow,
};

#[derive(Debug, Args)]
pub struct SignalsArgs {
    /// Subreddit to scan (with or without the `r/` prefix); repeatable.
    #[arg(long = "subreddit", value_name = "NAME", required = true)]
    pub subreddits: Vec<String>,

    /// Keyword to match in post titles, bodies, and comments; repeatable.
    #[arg(long = "keyword", value_name = "TEXT", required = true)]
    pub keywords: Vec<String>,

    /// Recency window for the top-post listing.
    #[arg(long, default_value = "month")]
    pub window: TimeWindow,

    /// Scan-intensity preset (fast, standard, deep, or one from the presets
    /// file). Explicit limits below override its values.
    #[arg(long, default_value = "standard")]
    pub preset: String,

    /// Posts fetched per subreddit; overrides the preset.
    #[arg(long)]
    pub post_limit: Option<u32>,

    /// Comments fetched per post; overrides the preset.
    #[arg(long)]
    pub comment_limit: Option<u32>,

    /// Write the signals as CSV to this path.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

pub async fn run(args: SignalsArgs, cancel: CancellationToken) -> anyhow::Result<()> {
    let config = redscout_core::load_app_config()?;

    let presets = load_presets(&config.presets_path).unwrap_or_else(|e| {
        tracing::debug!(reason = %e, "presets file not loaded; using built-ins");
        builtin_presets()
    });
    let preset = resolve_preset(&presets, &args.preset)
        .with_context(|| format!("unknown preset '{}'", args.preset))?;

    let params = SignalScanParams {
        subreddits: args.subreddits,
        keywords: args.keywords,
        window: args.window,
        post_limit: args.post_limit.unwrap_or(preset.post_limit),
        comment_limit: args.comment_limit.unwrap_or(preset.comment_limit),
    }
    .validated()?;

    let client = crate::client::app_client(&config).await?;
    let report = run_signal_scan(&client, &params, &cancel, &ScanProgress::new()).await;

    if report.status == ScanStatus::Cancelled {
        println!("scan cancelled; showing partial results\n");
    }

    if report.signals.is_empty() {
        println!("no signals found");
    } else {
        for signal in &report.signals {
            println!(
                "r/{} [{}] {} (u/{})\n  {}\n  {}\n",
                signal.subreddit,
                signal.kind.label(),
                signal.matched,
                signal.author,
                signal.text,
                signal.permalink
            );
        }
        println!("{} signals found", report.signals.len());
    }

    for skip in &report.skipped {
        println!("skipped r/{}: {}", skip.subreddit, skip.reason);
    }

    if let Some(path) = args.csv {
        let bytes = signals_csv(&report.signals)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("wrote {} signals to {}", report.signals.len(), path.display());
    }

    Ok(())
}
