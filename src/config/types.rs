use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Pagewatch
///
/// Every section and key is optional; missing values fall back to the defaults
/// below, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub rank: RankConfig,
    pub discovery: DiscoveryConfig,
    pub monitor: MonitorConfig,
    pub output: OutputConfig,
}

/// Page collection server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Root URL of the page collection; page `id` lives at `<base-url>/<id>`
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Timeout applied to every page request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            request_timeout_secs: 5,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Rank computation parameters
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RankConfig {
    /// Probability of following a link instead of jumping to a random page
    #[serde(rename = "damping-factor")]
    pub damping_factor: f64,

    /// Upper bound on rank iterations
    #[serde(rename = "max-iterations")]
    pub max_iterations: u32,

    /// Per-page convergence tolerance; the run stops once the total rank
    /// movement drops below `tolerance * N`
    pub tolerance: f64,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.85,
            max_iterations: 100,
            tolerance: 1.0e-6,
        }
    }
}

/// Breadth-first discovery configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Maximum number of pages fetched during discovery
    #[serde(rename = "max-pages")]
    pub max_pages: usize,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self { max_pages: 5000 }
    }
}

/// Monitoring scheduler configuration (all values in milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Scheduler tick length
    #[serde(rename = "tick-ms")]
    pub tick_ms: u64,

    /// Sweep interval for high priority pages
    #[serde(rename = "high-interval-ms")]
    pub high_interval_ms: u64,

    /// Sweep interval for medium priority pages
    #[serde(rename = "medium-interval-ms")]
    pub medium_interval_ms: u64,

    /// Sweep interval for low priority pages
    #[serde(rename = "low-interval-ms")]
    pub low_interval_ms: u64,

    /// Interval between rank recomputation + report regeneration
    #[serde(rename = "report-interval-ms")]
    pub report_interval_ms: u64,

    /// Re-partition the tiers every time ranks are recomputed
    #[serde(rename = "reclassify-on-report")]
    pub reclassify_on_report: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_ms: 1000,
            high_interval_ms: 1000,
            medium_interval_ms: 2000,
            low_interval_ms: 3000,
            report_interval_ms: 5000,
            reclassify_on_report: false,
        }
    }
}

impl MonitorConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_millis(self.report_interval_ms)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite snapshot database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the markdown dashboard
    #[serde(rename = "summary-path")]
    pub summary_path: String,

    /// Path to the Graphviz DOT rendering of the page graph
    #[serde(rename = "graph-path")]
    pub graph_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./pagewatch.db".to_string(),
            summary_path: "./dashboard.md".to_string(),
            graph_path: "./graph.dot".to_string(),
        }
    }
}
