//! Scan-aggregation engine for redscout.
//!
//! Issues bounded, sequential read queries against the Reddit client, merges
//! community matches keyed by name with provenance-weighted scoring, scans
//! subreddits for keyword buying signals, and supports advisory mid-flight
//! cancellation with partial-result handling. Presentation layers (server,
//! CLI) drive it through [`run_discovery`] and [`run_signal_scan`].

pub mod aggregate;
pub mod cache;
pub mod discover;
pub mod export;
pub mod session;
pub mod signals;
pub mod types;

pub use aggregate::Aggregator;
pub use cache::DiscoveryCache;
pub use discover::run_discovery;
pub use export::{communities_csv, signals_csv};
pub use session::{ScanHandle, ScanProgress, ScanSlot, ScanSlotBusy};
pub use signals::run_signal_scan;
pub use types::{
    CommunityRecord, DiscoveryParams, DiscoveryReport, ParamsError, Provenance, ScanStatus,
    SignalKind, SignalRecord, SignalReport, SignalScanParams, SkippedSubreddit, TimeWindow,
};
