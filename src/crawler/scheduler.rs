//! Monitoring scheduler
//!
//! The [`Monitor`] drives the whole pipeline: discovery, the initial rank
//! computation and report, then the tiered polling loop. Everything runs on
//! one task; sweeps, fetches within a sweep, and report regeneration never
//! overlap.
//!
//! # State machine
//!
//! ```text
//! Idle --start()--> Running --cancel--> ShuttingDown --> Stopped
//!   \--(no start page / empty graph / cancel)-----------> Stopped
//! ```

use crate::config::{Config, DiscoveryConfig, MonitorConfig, RankConfig};
use crate::crawler::discovery::Crawler;
use crate::crawler::{PageId, PageSource};
use crate::output::{ReportContext, ReportRenderer};
use crate::rank::{classify, compute_ranks, RankTable};
use crate::state::{PriorityTier, TierAssignment};
use crate::PagewatchError;
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Number of pages listed in the shutdown summary
const SUMMARY_PAGES: usize = 10;

/// Lifecycle state of the monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    Idle,
    Running,
    ShuttingDown,
    Stopped,
}

/// Result of one tier sweep
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepReport {
    pub tier: PriorityTier,
    pub pages_checked: usize,
    pub updates_found: usize,
}

/// Work done during one tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Sweeps run this tick, highest priority first
    pub sweeps: Vec<SweepReport>,

    /// Whether ranks were recomputed and reports rendered
    pub report_regenerated: bool,
}

impl TickReport {
    pub fn swept_tiers(&self) -> Vec<PriorityTier> {
        self.sweeps.iter().map(|s| s.tier).collect()
    }
}

/// Polling timer of one tier
#[derive(Debug, Clone)]
struct TierTimer {
    tier: PriorityTier,
    interval: Duration,
    last_sweep: Option<Instant>,
}

impl TierTimer {
    fn new(tier: PriorityTier, interval: Duration) -> Self {
        Self {
            tier,
            interval,
            last_sweep: None,
        }
    }

    /// A tier that was never swept is always due
    fn is_due(&self, now: Instant) -> bool {
        match self.last_sweep {
            Some(last) => now.duration_since(last) >= self.interval,
            None => true,
        }
    }
}

/// Rank-driven page monitor
pub struct Monitor<S> {
    crawler: Crawler<S>,
    renderers: Vec<Box<dyn ReportRenderer>>,
    base_url: String,
    rank: RankConfig,
    discovery: DiscoveryConfig,
    monitor: MonitorConfig,
    state: MonitorState,
    ranks: RankTable,
    tiers: TierAssignment,
    timers: [TierTimer; 3],
    last_report: Instant,
}

impl<S: PageSource> Monitor<S> {
    /// Creates an idle monitor
    ///
    /// # Arguments
    ///
    /// * `source` - Where pages are fetched from
    /// * `config` - The validated configuration
    pub fn new(source: S, config: &Config) -> Self {
        let monitor = config.monitor.clone();
        let timers = [
            TierTimer::new(
                PriorityTier::High,
                Duration::from_millis(monitor.high_interval_ms),
            ),
            TierTimer::new(
                PriorityTier::Medium,
                Duration::from_millis(monitor.medium_interval_ms),
            ),
            TierTimer::new(
                PriorityTier::Low,
                Duration::from_millis(monitor.low_interval_ms),
            ),
        ];

        Self {
            crawler: Crawler::new(source),
            renderers: Vec::new(),
            base_url: config.server.base_url.clone(),
            rank: config.rank,
            discovery: config.discovery.clone(),
            monitor,
            state: MonitorState::Idle,
            ranks: RankTable::new(),
            tiers: TierAssignment::new(),
            timers,
            last_report: Instant::now(),
        }
    }

    /// Registers a renderer invoked on every report regeneration
    pub fn add_renderer(&mut self, renderer: Box<dyn ReportRenderer>) {
        self.renderers.push(renderer);
    }

    /// Discovers the collection and prepares the monitoring loop
    ///
    /// On success the monitor is `Running`: ranks are computed, tiers are
    /// assigned and reports have been rendered once. Cancelling `token`
    /// stops discovery at its next frontier pop and skips the rest.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - The monitor is running
    /// * `Err(PagewatchError::NoStartPage)` - No start page could be found
    /// * `Err(PagewatchError::EmptyGraph)` - Discovery visited no page
    /// * `Err(PagewatchError::Cancelled)` - `token` was cancelled first
    pub async fn start(&mut self, token: &CancellationToken) -> Result<(), PagewatchError> {
        if self.state != MonitorState::Idle {
            tracing::warn!("Monitor already started (state {:?})", self.state);
            return Ok(());
        }

        tracing::info!("=== Pipeline started ===");

        if token.is_cancelled() {
            return Err(self.cancel_startup());
        }

        let Some(start) = self.crawler.source().find_start_page().await else {
            tracing::error!("Could not find a start page, stopping");
            self.state = MonitorState::Stopped;
            return Err(PagewatchError::NoStartPage {
                base_url: self.base_url.clone(),
            });
        };

        let stats = self
            .crawler
            .discover_from(&start, self.discovery.max_pages, token)
            .await;
        if stats.cancelled {
            return Err(self.cancel_startup());
        }

        if self.crawler.graph().is_empty() {
            tracing::error!("No pages were discovered, stopping");
            self.state = MonitorState::Stopped;
            return Err(PagewatchError::EmptyGraph { start });
        }
        tracing::info!(
            "Discovered graph with {} pages",
            self.crawler.graph().len()
        );

        self.recompute_ranks();
        self.tiers = classify(self.crawler.visited(), &self.ranks);
        self.render_reports();

        self.last_report = Instant::now();
        self.state = MonitorState::Running;
        tracing::info!("=== Entering priority monitoring mode ===");

        Ok(())
    }

    /// Runs one scheduler tick
    ///
    /// Due tiers are swept in priority order, then reports are regenerated
    /// if the report interval has elapsed. Does nothing unless `Running`.
    pub async fn tick(&mut self) -> TickReport {
        let mut report = TickReport::default();
        if self.state != MonitorState::Running {
            return report;
        }

        let now = Instant::now();

        for i in 0..self.timers.len() {
            if !self.timers[i].is_due(now) {
                continue;
            }

            let tier = self.timers[i].tier;
            report.sweeps.push(self.sweep(tier).await);
            // Stamped with the tick start, not the sweep end, so a tier stays
            // on the tick grid even when its sweep is slow
            self.timers[i].last_sweep = Some(now);
        }

        if now.duration_since(self.last_report) >= self.monitor.report_interval() {
            tracing::info!("Regenerating reports with fresh ranks");
            self.recompute_ranks();
            if self.monitor.reclassify_on_report {
                self.tiers = classify(self.crawler.visited(), &self.ranks);
            }
            self.render_reports();
            self.last_report = Instant::now();
            report.report_regenerated = true;
        }

        report
    }

    /// Re-fetches every page of a tier
    async fn sweep(&mut self, tier: PriorityTier) -> SweepReport {
        let pages: Vec<PageId> = self.tiers.pages(tier).to_vec();
        tracing::debug!("Starting {} tier sweep over {} pages", tier, pages.len());

        let updates_found = self.crawler.monitor_pages(&pages).await;

        tracing::info!(
            "Sweep of {} tier finished: {} pages checked, {} updates found",
            tier,
            pages.len(),
            updates_found
        );

        SweepReport {
            tier,
            pages_checked: pages.len(),
            updates_found,
        }
    }

    /// Runs the monitoring loop until `token` is cancelled, then shuts down
    ///
    /// Cancellation is checked before each tick; a tick already in progress
    /// completes first.
    pub async fn run(&mut self, token: &CancellationToken) {
        if self.state != MonitorState::Running {
            tracing::warn!("Monitor is not running (state {:?})", self.state);
            return;
        }

        let mut ticker = tokio::time::interval(self.monitor.tick());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {
                    if token.is_cancelled() {
                        break;
                    }
                    self.tick().await;
                }
            }
        }

        tracing::info!("=== Monitoring stopped by request ===");
        self.shutdown();
    }

    /// Final rank computation and report, then `Stopped`
    ///
    /// Runs regardless of remaining timer budgets. Idempotent once stopped.
    pub fn shutdown(&mut self) {
        if self.state == MonitorState::Stopped {
            return;
        }

        self.state = MonitorState::ShuttingDown;
        tracing::info!("Generating final ranks and reports");
        self.recompute_ranks();
        self.render_reports();
        self.log_summary();
        self.state = MonitorState::Stopped;
    }

    fn cancel_startup(&mut self) -> PagewatchError {
        tracing::warn!("Startup cancelled, stopping");
        self.state = MonitorState::Stopped;
        PagewatchError::Cancelled
    }

    fn recompute_ranks(&mut self) {
        self.ranks = compute_ranks(self.crawler.graph(), &self.rank).ranks;
    }

    fn render_reports(&mut self) {
        let ctx = ReportContext {
            graph: self.crawler.graph(),
            ranks: &self.ranks,
            versions: self.crawler.versions(),
            tiers: &self.tiers,
        };

        for renderer in self.renderers.iter_mut() {
            match renderer.render(&ctx) {
                Ok(()) => tracing::debug!("Rendered {} report", renderer.name()),
                Err(e) => tracing::error!("Failed to render {} report: {}", renderer.name(), e),
            }
        }
    }

    fn log_summary(&self) {
        let versions = self.crawler.versions();

        tracing::info!("Final report:");
        tracing::info!("Total pages discovered: {}", self.crawler.visited().len());
        tracing::info!(
            "Versions tracked per page (top {} most active):",
            SUMMARY_PAGES
        );
        for (page_id, count) in versions.most_versioned(SUMMARY_PAGES) {
            tracing::info!("  Page {:<15}: {} versions", page_id, count);
        }
        if versions.len() > SUMMARY_PAGES {
            tracing::info!("  ... and {} more pages", versions.len() - SUMMARY_PAGES);
        }
    }

    pub fn state(&self) -> MonitorState {
        self.state
    }

    pub fn ranks(&self) -> &RankTable {
        &self.ranks
    }

    pub fn tiers(&self) -> &TierAssignment {
        &self.tiers
    }

    pub fn crawler(&self) -> &Crawler<S> {
        &self.crawler
    }
}
