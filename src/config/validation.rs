use crate::config::types::{
    Config, DiscoveryConfig, MonitorConfig, OutputConfig, RankConfig, ServerConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_rank_config(&config.rank)?;
    validate_discovery_config(&config.discovery)?;
    validate_monitor_config(&config.monitor)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates the page collection server settings
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    Ok(())
}

/// Validates rank computation parameters
fn validate_rank_config(config: &RankConfig) -> Result<(), ConfigError> {
    // Written as a negated range check so NaN is rejected as well
    if !(config.damping_factor > 0.0 && config.damping_factor < 1.0) {
        return Err(ConfigError::Validation(format!(
            "damping_factor must be strictly between 0 and 1, got {}",
            config.damping_factor
        )));
    }

    if config.max_iterations < 1 {
        return Err(ConfigError::Validation(
            "max_iterations must be >= 1".to_string(),
        ));
    }

    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(ConfigError::Validation(format!(
            "tolerance must be a positive finite number, got {}",
            config.tolerance
        )));
    }

    Ok(())
}

fn validate_discovery_config(config: &DiscoveryConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(
            "max_pages must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Validates the scheduler timings
///
/// Tier intervals must be strictly ordered: high < medium < low.
fn validate_monitor_config(config: &MonitorConfig) -> Result<(), ConfigError> {
    if config.tick_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "tick_ms must be >= 10ms, got {}ms",
            config.tick_ms
        )));
    }

    if config.high_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "high_interval_ms must be > 0".to_string(),
        ));
    }

    if config.high_interval_ms >= config.medium_interval_ms
        || config.medium_interval_ms >= config.low_interval_ms
    {
        return Err(ConfigError::Validation(format!(
            "tier intervals must satisfy high < medium < low, got {}ms / {}ms / {}ms",
            config.high_interval_ms, config.medium_interval_ms, config.low_interval_ms
        )));
    }

    if config.report_interval_ms == 0 {
        return Err(ConfigError::Validation(
            "report_interval_ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    if config.graph_path.is_empty() {
        return Err(ConfigError::Validation(
            "graph_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}
