//! ==============================================================================
//! config.rs - Runtime Configuration Loader
//! ==============================================================================
//!
//! purpose:
//!     defines the schema for `garden.toml`.
//!     loads configuration from file or falls back to defaults.
//!
//! structure:
//!     - ServerConfig: Where the HTTP API listens.
//!     - LoggingConfig: Default log filter and per-request tracing.
//!     - SeedConfig: Whether demo measurements are loaded at startup.
//!
//! ==============================================================================

use serde::Deserialize;
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind_addr: "0.0.0.0:3000".to_string() }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default = "default_true")]
    pub log_requests: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), log_requests: true }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct SeedConfig {
    pub enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_true() -> bool {
    true
}

impl ServiceConfig {
    /// Load configuration from file
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| anyhow::anyhow!("Failed to read config file: {}", e))?;

        Self::parse(&content)
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        toml::from_str(content).map_err(|e| anyhow::anyhow!("Failed to parse config: {}", e))
    }

    /// Load with default fallback
    pub fn load_or_default() -> Self {
        let paths = [
            std::path::PathBuf::from("config").join("garden.toml"),
            std::path::PathBuf::from("..").join("config").join("garden.toml"),
        ];

        for path in &paths {
            if path.exists() {
                match Self::load(path) {
                    Ok(config) => {
                        println!("[CONFIG] Loaded from {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        println!("[CONFIG] Warning: Failed to load {}: {}", path.display(), e);
                    }
                }
            }
        }

        println!("[CONFIG] Warning: No config file found - using defaults");
        Self::default()
    }

    /// Print configuration summary
    pub fn print_summary(&self) {
        println!("┌─────────────────────────────────────────┐");
        println!("│         GARDEN HOST CONFIGURATION       │");
        println!("├─────────────────────────────────────────┤");
        println!("│ Bind: {}", self.server.bind_addr);
        println!("│ Log Level: {}", self.logging.level);
        println!("│ Request Logging: {}", self.logging.log_requests);
        println!("│ Demo Seed: {}", self.seed.enabled);
        println!("└─────────────────────────────────────────┘");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.server.bind_addr, "0.0.0.0:3000");
        assert_eq!(config.logging.level, "info");
        assert!(config.seed.enabled);
    }

    #[test]
    fn test_parse_full_file() {
        let config = ServiceConfig::parse(
            r#"
            [server]
            bind_addr = "127.0.0.1:8080"

            [logging]
            level = "debug"
            log_requests = false

            [seed]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(config.server.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.logging.level, "debug");
        assert!(!config.logging.log_requests);
        assert!(!config.seed.enabled);
    }

    #[test]
    fn test_missing_sections_fall_back() {
        let config = ServiceConfig::parse("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.server, ServerConfig::default());
        assert!(config.logging.log_requests);
        assert!(config.seed.enabled);
    }

    #[test]
    fn test_parse_error_is_reported() {
        assert!(ServiceConfig::parse("[server]\nbind_addr = 3000").is_err());
        assert!(ServiceConfig::load("/definitely/not/here.toml").is_err());
    }
}
