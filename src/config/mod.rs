//! Configuration for the listing aggregation pipeline

mod http;
mod logging;
mod sweep;

pub use http::HttpConfig;
pub use logging::{LogFormat, LogLevel, LoggingConfig};
pub use sweep::{SourceOverride, SweepConfig};

use crate::types::SourceId;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default user agent for all HTTP requests. A plain bot identity gets the
/// French boards' consent walls instead of result markup, so this presents as
/// a desktop browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Main configuration for an aggregation run
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Sweep configuration (terms, locations, per-source tuning)
    #[serde(default)]
    pub sweep: SweepConfig,
    /// HTTP client configuration
    #[serde(default)]
    pub http: HttpConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the starter configuration file: every default spelled out,
    /// with comments describing what each knob does.
    pub fn starter_toml() -> String {
        let defaults = Config::default();
        format!(
            r#"# StageMatch configuration
# Every key is optional; a missing key keeps the default shown here.

[sweep]
# Query terms crossed with every location on each run; terms like
# "alternance" request apprenticeships, the rest internships
terms = ["stage", "alternance"]
# Cities fed to each board's location filter
locations = ["Paris", "Lyon", "Marseille", "Toulouse", "Bordeaux", "Lille", "Nantes", "Strasbourg"]
# Source workers allowed to fetch at the same time
max_concurrent_sources = {}

# Per-source tuning, keyed by source id. Uncomment to slow a board down,
# cap its page depth, or skip it entirely.
#
# [sweep.sources.indeed]
# delay_ms = 8000
# max_pages = 1
#
# [sweep.sources.linkedin]
# enabled = false

[http]
user_agent = "{}"
accept_language = "{}"
# Whole-request timeout; expiry abandons the page chain, not the run
request_timeout_secs = {}
connect_timeout_secs = {}
max_redirects = {}

[logging]
# "text" or "json"
format = "{}"
# "trace", "debug", "info", "warn" or "error"; each -v raises it one step
level = "{}"
"#,
            defaults.sweep.max_concurrent_sources,
            defaults.http.user_agent,
            defaults.http.accept_language,
            defaults.http.request_timeout_secs,
            defaults.http.connect_timeout_secs,
            defaults.http.max_redirects,
            defaults.logging.format.as_str(),
            defaults.logging.level.as_str(),
        )
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass rather than playing whack-a-mole.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Sweep validation
        if self.sweep.terms.is_empty() {
            errors.push("sweep terms must not be empty".to_string());
        }
        if self.sweep.terms.iter().any(|t| t.trim().is_empty()) {
            errors.push("sweep terms must not contain blank entries".to_string());
        }
        if self.sweep.locations.is_empty() {
            errors.push("sweep locations must not be empty".to_string());
        }
        if self.sweep.locations.iter().any(|l| l.trim().is_empty()) {
            errors.push("sweep locations must not contain blank entries".to_string());
        }
        if self.sweep.max_concurrent_sources == 0 {
            errors.push("max_concurrent_sources must be positive".to_string());
        }
        if SourceId::ALL.iter().all(|s| !self.sweep.is_enabled(*s)) {
            errors.push("at least one source must be enabled".to_string());
        }
        for (source, tuning) in &self.sweep.sources {
            if let Some(delay) = tuning.delay_ms {
                if delay < 100 {
                    errors.push(format!(
                        "sources.{}: delay_ms must be >= 100 to stay polite, got {}",
                        source, delay
                    ));
                }
            }
            if let Some(pages) = tuning.max_pages {
                if pages == 0 {
                    errors.push(format!("sources.{}: max_pages must be positive", source));
                } else if pages > 20 {
                    errors.push(format!(
                        "sources.{}: max_pages must be <= 20, got {}",
                        source, pages
                    ));
                }
            }
        }

        // HTTP validation
        if self.http.user_agent.trim().is_empty() {
            errors.push("http user_agent must not be empty".to_string());
        }
        if self.http.accept_language.trim().is_empty() {
            errors.push("http accept_language must not be empty".to_string());
        }
        if self.http.request_timeout_secs == 0 {
            errors.push("request_timeout_secs must be positive".to_string());
        }
        if self.http.request_timeout_secs > 300 {
            errors.push("request_timeout_secs must be <= 300".to_string());
        }
        if self.http.connect_timeout_secs == 0 {
            errors.push("connect_timeout_secs must be positive".to_string());
        }
        if self.http.max_redirects > 10 {
            errors.push("max_redirects must be <= 10".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config::default()
    }

    // ========================================================================
    // Config::validate - happy path
    // ========================================================================

    #[test]
    fn default_config_passes_validation() {
        let cfg = valid_config();
        assert!(cfg.validate().is_ok(), "default config should be valid");
    }

    // ========================================================================
    // Config::validate - sweep errors
    // ========================================================================

    #[test]
    fn validate_rejects_empty_terms() {
        let mut cfg = valid_config();
        cfg.sweep.terms.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("sweep terms must not be empty"));
    }

    #[test]
    fn validate_rejects_blank_term() {
        let mut cfg = valid_config();
        cfg.sweep.terms.push("   ".to_string());
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("blank entries"));
    }

    #[test]
    fn validate_rejects_empty_locations() {
        let mut cfg = valid_config();
        cfg.sweep.locations.clear();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("sweep locations must not be empty"));
    }

    #[test]
    fn validate_rejects_zero_concurrency() {
        let mut cfg = valid_config();
        cfg.sweep.max_concurrent_sources = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_concurrent_sources must be positive"));
    }

    #[test]
    fn validate_rejects_all_sources_disabled() {
        let mut cfg = valid_config();
        for source in SourceId::ALL {
            cfg.sweep.sources.insert(
                source,
                SourceOverride {
                    enabled: false,
                    ..Default::default()
                },
            );
        }
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("at least one source must be enabled"));
    }

    #[test]
    fn validate_rejects_impolite_delay_override() {
        let mut cfg = valid_config();
        cfg.sweep.sources.insert(
            SourceId::Indeed,
            SourceOverride {
                delay_ms: Some(10),
                ..Default::default()
            },
        );
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("delay_ms must be >= 100"));
    }

    #[test]
    fn validate_rejects_zero_max_pages_override() {
        let mut cfg = valid_config();
        cfg.sweep.sources.insert(
            SourceId::Wttj,
            SourceOverride {
                max_pages: Some(0),
                ..Default::default()
            },
        );
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_pages must be positive"));
    }

    // ========================================================================
    // Config::validate - http errors
    // ========================================================================

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut cfg = valid_config();
        cfg.http.user_agent = String::new();
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("user_agent must not be empty"));
    }

    #[test]
    fn validate_rejects_zero_request_timeout() {
        let mut cfg = valid_config();
        cfg.http.request_timeout_secs = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs must be positive"));
    }

    #[test]
    fn validate_rejects_excessive_request_timeout() {
        let mut cfg = valid_config();
        cfg.http.request_timeout_secs = 600;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs must be <= 300"));
    }

    // ========================================================================
    // Config::validate - multiple errors collected
    // ========================================================================

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = valid_config();
        cfg.sweep.terms.clear();
        cfg.http.user_agent = String::new();
        cfg.http.request_timeout_secs = 0;
        let err = cfg.validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sweep terms must not be empty"));
        assert!(msg.contains("user_agent must not be empty"));
        assert!(msg.contains("request_timeout_secs must be positive"));
    }

    // ========================================================================
    // Config::load - file handling
    // ========================================================================

    #[test]
    fn load_missing_file_reports_path() {
        let err = Config::load(Path::new("/nonexistent/stagematch.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
        assert!(err.to_string().contains("/nonexistent/stagematch.toml"));
    }

    #[test]
    fn load_parses_valid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stagematch.toml");
        std::fs::write(
            &path,
            r#"
                [sweep]
                terms = ["stage"]
                locations = ["Paris", "Lyon"]

                [http]
                request_timeout_secs = 45

                [logging]
                level = "debug"
            "#,
        )
        .unwrap();

        let cfg = Config::load(&path).unwrap();
        assert_eq!(cfg.sweep.terms, vec!["stage"]);
        assert_eq!(cfg.sweep.locations.len(), 2);
        assert_eq!(cfg.http.request_timeout_secs, 45);
        assert_eq!(cfg.logging.level, LogLevel::Debug);
        // Untouched sections keep their defaults
        assert_eq!(cfg.sweep.max_concurrent_sources, 4);
    }

    #[test]
    fn load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "sweep = \"not a table\"").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn load_rejects_file_failing_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        std::fs::write(&path, "[sweep]\nterms = []\n").unwrap();
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Configuration validation failed"));
    }

    // ========================================================================
    // Serialization - init writes a loadable file
    // ========================================================================

    #[test]
    fn default_config_roundtrips_through_toml() {
        let cfg = Config::default();
        let rendered = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&rendered).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.sweep.terms, cfg.sweep.terms);
        assert_eq!(parsed.http.user_agent, cfg.http.user_agent);
    }
}
