use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use tokio_util::sync::CancellationToken;

use redscout_engine::{
    communities_csv, run_discovery, DiscoveryParams, ScanProgress, ScanStatus,
};

#[derive(Debug, Args)]
pub struct DiscoverArgs {
    /// Audience search query; repeat for multiple queries.
    #[arg(long = "query", value_name = "TEXT", required = true)]
    pub queries: Vec<String>,

    /// Communities fetched per direct name search.
    #[arg(long, default_value_t = 10)]
    pub direct_limit: u32,

    /// Posts fetched per platform-wide search.
    #[arg(long, default_value_t = 25)]
    pub post_limit: u32,

    /// Comments checked per matching post; 0 skips the comment sweep.
    #[arg(long, default_value_t = 20)]
    pub comment_limit: u32,

    /// Write the ranked communities as CSV to this path.
    #[arg(long, value_name = "PATH")]
    pub csv: Option<PathBuf>,
}

pub async fn run(args: DiscoverArgs, cancel: CancellationToken) -> anyhow::Result<()> {
    let config = redscout_core::load_app_config()?;
    let params = DiscoveryParams {
        queries: args.queries,
        direct_limit: args.direct_limit,
        post_limit: args.post_limit,
        comment_limit: args.comment_limit,
    }
    .validated()?;

    let client = crate::client::app_client(&config).await?;
    let report = run_discovery(&client, &params, &cancel, &ScanProgress::new()).await;

    if report.status == ScanStatus::Cancelled {
        println!("scan cancelled; showing partial results\n");
    }

    if report.communities.is_empty() {
        println!("no communities found");
    } else {
        println!("{:>5}  {:>12}  {:<28}  FOUND VIA", "SCORE", "MEMBERS", "COMMUNITY");
        for community in &report.communities {
            println!(
                "{:>5}  {:>12}  {:<28}  {}",
                community.relevance_score(),
                community.members,
                format!("r/{}", community.name),
                community.found_via_label()
            );
        }
    }

    if let Some(path) = args.csv {
        let bytes = communities_csv(&report.communities)?;
        std::fs::write(&path, bytes)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("\nwrote {} communities to {}", report.communities.len(), path.display());
    }

    Ok(())
}
