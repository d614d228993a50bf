use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::portal::DEFAULT_PORTAL_URL;
use crate::shops::SimulatedShopBackend;
use crate::verification::VerificationOutcome;

/// Main configuration structure for the panel monitor
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PanelMonitorConfig {
    /// Simulated backend timings and outcomes
    pub simulation: SimulationConfig,
    /// External service portal
    pub portal: PortalConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
    /// Where the shop collection comes from
    pub shops: ShopSourceConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SimulationConfig {
    /// Delay before an "enable service" action completes
    pub enable_service_delay_ms: u64,
    /// Delay before an inline shop connection check completes
    pub verify_connection_delay_ms: u64,
    /// Delay before a plugin instance's verification completes
    pub verification_delay_ms: u64,
    /// Outcome reported by the simulated verification probe
    pub verification_outcome: VerificationOutcome,
    /// Make every simulated shop action fail
    pub shop_backend_fails: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PortalConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON lines instead of human-readable logs
    pub json_logs: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ShopSourceConfig {
    /// TOML or JSON shop file; the built-in demo shops are used when unset
    pub path: Option<PathBuf>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enable_service_delay_ms: 1200,
            verify_connection_delay_ms: 1500,
            verification_delay_ms: 1500,
            verification_outcome: VerificationOutcome::Success,
            shop_backend_fails: false,
        }
    }
}

impl Default for PanelMonitorConfig {
    fn default() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            portal: PortalConfig {
                url: DEFAULT_PORTAL_URL.to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
            shops: ShopSourceConfig::default(),
        }
    }
}

impl SimulationConfig {
    pub fn verification_delay(&self) -> Duration {
        Duration::from_millis(self.verification_delay_ms)
    }

    pub fn shop_backend(&self) -> SimulatedShopBackend {
        let backend = SimulatedShopBackend::new(
            Duration::from_millis(self.enable_service_delay_ms),
            Duration::from_millis(self.verify_connection_delay_ms),
        );
        if self.shop_backend_fails {
            backend.failing()
        } else {
            backend
        }
    }
}

impl PanelMonitorConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (panel-monitor.toml)
    /// 3. Environment variables (prefixed with PANEL_MONITOR__)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("panel-monitor.toml"))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let defaults = Config::try_from(&PanelMonitorConfig::default())?;
        let mut builder = Config::builder().add_source(defaults);

        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("PANEL_MONITOR")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config: PanelMonitorConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load `.env` from the working directory if it exists.
    ///
    /// Must run before the first `config()` call for its variables to count.
    pub fn load_env_file() -> Result<bool> {
        Self::load_env_file_from(Path::new(".env"))
    }

    /// Returns whether a file was loaded. A missing file is not an error; a
    /// malformed one is.
    pub fn load_env_file_from(path: &Path) -> Result<bool> {
        if !path.exists() {
            return Ok(false);
        }
        dotenvy::from_path(path)
            .with_context(|| format!("Failed to load environment from {}", path.display()))?;
        Ok(true)
    }
}

/// Global configuration instance
static CONFIG: std::sync::LazyLock<Result<PanelMonitorConfig, anyhow::Error>> =
    std::sync::LazyLock::new(PanelMonitorConfig::load);

/// Get the global configuration
pub fn config() -> Result<&'static PanelMonitorConfig> {
    CONFIG
        .as_ref()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_match_prototype_timings() {
        let config = PanelMonitorConfig::default();
        assert_eq!(config.simulation.enable_service_delay_ms, 1200);
        assert_eq!(config.simulation.verify_connection_delay_ms, 1500);
        assert_eq!(config.simulation.verification_delay(), Duration::from_millis(1500));
        assert_eq!(config.portal.url, DEFAULT_PORTAL_URL);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("panel-monitor.toml");
        std::fs::write(
            &path,
            r#"
[simulation]
verification_outcome = "failure"
enable_service_delay_ms = 50

[portal]
url = "https://portal.example"
"#,
        )
        .unwrap();

        let config = PanelMonitorConfig::load_from(&path).unwrap();
        assert_eq!(config.simulation.verification_outcome, VerificationOutcome::Failure);
        assert_eq!(config.simulation.enable_service_delay_ms, 50);
        assert_eq!(config.simulation.verify_connection_delay_ms, 1500);
        assert_eq!(config.portal.url, "https://portal.example");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_missing_env_file_is_skipped() {
        let dir = TempDir::new().unwrap();
        let loaded = PanelMonitorConfig::load_env_file_from(&dir.path().join(".env")).unwrap();
        assert!(!loaded);
    }

    #[test]
    fn test_malformed_env_file_is_reported() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".env");
        std::fs::write(&path, "PANEL_MONITOR_TEST_BROKEN='unterminated\n").unwrap();

        let err = PanelMonitorConfig::load_env_file_from(&path).unwrap_err();
        assert!(err.to_string().contains(".env"));
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saved.toml");

        let mut config = PanelMonitorConfig::default();
        config.simulation.shop_backend_fails = true;
        config.save_to_file(&path).unwrap();

        let reloaded = PanelMonitorConfig::load_from(&path).unwrap();
        assert!(reloaded.simulation.shop_backend_fails);
    }
}
