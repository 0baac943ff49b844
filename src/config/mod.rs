//! Engine configuration: layout geometry, validation limits, and logging,
//! loaded from environment variables with defaults for every knob.

use std::env;

/// Application configuration.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Layout geometry.
    pub layout: LayoutConfig,
    /// Field-level validation limits.
    pub limits: LimitsConfig,
    /// Logging configuration (used by the CLI binary).
    pub logging: LoggingConfig,
}

/// Layout geometry: fixed spacing constants and the rendered node size.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Minimum space between adjacent ranks.
    pub rank_separation: f64,
    /// Space between adjacent nodes within a rank.
    pub node_separation: f64,
    /// Rendered node width.
    pub node_width: f64,
    /// Rendered node height.
    pub node_height: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            rank_separation: 100.0,
            node_separation: 50.0,
            node_width: 180.0,
            node_height: 90.0,
        }
    }
}

/// Field-level validation limits applied at the engine boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct LimitsConfig {
    /// Maximum node label length, in characters.
    pub max_label_length: usize,
    /// Maximum notes length, in characters.
    pub max_notes_length: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_label_length: 200,
            max_notes_length: 10_000,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set.
    pub level: String,
    /// Log output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    /// Human-readable output.
    Pretty,
    /// Newline-delimited JSON.
    Json,
}

impl Config {
    /// Load configuration from environment variables. Every variable has a
    /// default; unparsable values fall back rather than failing.
    pub fn from_env() -> Self {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let layout = LayoutConfig {
            rank_separation: env_f64("LAYOUT_RANK_SEPARATION", 100.0),
            node_separation: env_f64("LAYOUT_NODE_SEPARATION", 50.0),
            node_width: env_f64("LAYOUT_NODE_WIDTH", 180.0),
            node_height: env_f64("LAYOUT_NODE_HEIGHT", 90.0),
        };

        let limits = LimitsConfig {
            max_label_length: env_usize("MAX_LABEL_LENGTH", 200),
            max_notes_length: env_usize("MAX_NOTES_LENGTH", 10_000),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        Self {
            layout,
            limits,
            logging,
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_defaults() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.rank_separation, 100.0);
        assert_eq!(layout.node_separation, 50.0);
        assert_eq!(layout.node_width, 180.0);
        assert_eq!(layout.node_height, 90.0);
    }

    #[test]
    fn test_limits_defaults() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.max_label_length, 200);
        assert_eq!(limits.max_notes_length, 10_000);
    }

    #[test]
    fn test_logging_defaults() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.level, "info");
        assert_eq!(logging.format, LogFormat::Pretty);
    }
}
