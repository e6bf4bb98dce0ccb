use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// Keys missing from the file keep their defaults.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is recorded with every monitoring run so stored snapshots can be
/// traced back to the settings that produced them.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_content(&content))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[server]
base-url = "http://127.0.0.1:8080"
request-timeout-secs = 2

[rank]
damping-factor = 0.9
max-iterations = 50
tolerance = 1.0e-8

[discovery]
max-pages = 200

[monitor]
tick-ms = 500
high-interval-ms = 500
medium-interval-ms = 1500
low-interval-ms = 4000
report-interval-ms = 10000
reclassify-on-report = true

[output]
database-path = "./test.db"
summary-path = "./dashboard.md"
graph-path = "./out/graph.dot"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.server.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.server.request_timeout_secs, 2);
        assert_eq!(config.rank.damping_factor, 0.9);
        assert_eq!(config.rank.max_iterations, 50);
        assert_eq!(config.discovery.max_pages, 200);
        assert_eq!(config.monitor.low_interval_ms, 4000);
        assert!(config.monitor.reclassify_on_report);
        assert_eq!(config.output.graph_path, "./out/graph.dot");
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.server.base_url, "http://localhost:3000");
        assert_eq!(config.rank.damping_factor, 0.85);
        assert_eq!(config.rank.max_iterations, 100);
        assert_eq!(config.rank.tolerance, 1.0e-6);
        assert_eq!(config.discovery.max_pages, 5000);
        assert_eq!(config.monitor.high_interval_ms, 1000);
        assert_eq!(config.monitor.medium_interval_ms, 2000);
        assert_eq!(config.monitor.low_interval_ms, 3000);
        assert_eq!(config.monitor.report_interval_ms, 5000);
        assert!(!config.monitor.reclassify_on_report);
        assert_eq!(config.output.graph_path, "./graph.dot");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let file = create_temp_config("[rank]\ndamping-factor = 0.5\n");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.rank.damping_factor, 0.5);
        assert_eq!(config.rank.max_iterations, 100);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/pagewatch.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[rank]\ndamping-factor = 1.0\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
