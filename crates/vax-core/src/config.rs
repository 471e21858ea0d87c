use crate::eligibility::DoseWindow;
use crate::error::{Result, VaxError};
use crate::paths;
use crate::types::InvalidReset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

impl ConfigWarning {
    fn error(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: WarnLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    24680
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecondDoseConfig {
    /// Dose value that requires the first-dose date before continuing.
    #[serde(default = "default_trigger_dose")]
    pub trigger_dose: String,
    #[serde(default = "default_min_weeks")]
    pub min_weeks: i64,
    #[serde(default = "default_max_weeks")]
    pub max_weeks: i64,
}

fn default_trigger_dose() -> String {
    "2".to_string()
}

fn default_min_weeks() -> i64 {
    DoseWindow::default().min_weeks
}

fn default_max_weeks() -> i64 {
    DoseWindow::default().max_weeks
}

impl Default for SecondDoseConfig {
    fn default() -> Self {
        Self {
            trigger_dose: default_trigger_dose(),
            min_weeks: default_min_weeks(),
            max_weeks: default_max_weeks(),
        }
    }
}

impl SecondDoseConfig {
    pub fn window(&self) -> DoseWindow {
        DoseWindow {
            min_weeks: self.min_weeks,
            max_weeks: self.max_weeks,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_max_invalid")]
    pub max_invalid: u32,
    #[serde(default)]
    pub invalid_reset: InvalidReset,
    #[serde(default)]
    pub second_dose: SecondDoseConfig,
}

fn default_max_invalid() -> u32 {
    3
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_invalid: default_max_invalid(),
            invalid_reset: InvalidReset::default(),
            second_dose: SecondDoseConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// CatalogConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Relative paths resolve against `.vax/`.
    #[serde(default = "default_catalog_path")]
    pub path: PathBuf,
}

fn default_catalog_path() -> PathBuf {
    PathBuf::from(paths::DEFAULT_CATALOG_FILE)
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: default_catalog_path(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub catalog: CatalogConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            server: ServerConfig::default(),
            session: SessionConfig::default(),
            catalog: CatalogConfig::default(),
        }
    }
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Err(VaxError::NotInitialized);
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like `load`, but an uninitialized root yields the defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(VaxError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::write_atomic(&path, data.as_bytes())
    }

    pub fn catalog_path(&self, root: &Path) -> PathBuf {
        paths::catalog_path(root, &self.catalog.path)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut found = Vec::new();
        let dose = &self.session.second_dose;

        if self.session.max_invalid == 0 {
            found.push(ConfigWarning::error("session.max_invalid must be at least 1"));
        }
        if dose.trigger_dose.trim().is_empty() {
            found.push(ConfigWarning::error("session.second_dose.trigger_dose is empty"));
        }
        if dose.min_weeks < 0 {
            found.push(ConfigWarning::error(format!(
                "session.second_dose.min_weeks is negative ({})",
                dose.min_weeks
            )));
        }
        if dose.min_weeks > dose.max_weeks {
            found.push(ConfigWarning::error(format!(
                "session.second_dose window is inverted: min_weeks {} > max_weeks {}",
                dose.min_weeks, dose.max_weeks
            )));
        }
        if self.server.host.trim().is_empty() {
            found.push(ConfigWarning::error("server.host is empty"));
        }
        if self.server.port == 0 {
            found.push(ConfigWarning::warning(
                "server.port is 0: the OS will pick a port on every start",
            ));
        }
        if self.catalog.path.as_os_str().is_empty() {
            found.push(ConfigWarning::error("catalog.path is empty"));
        }

        found
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let mut cfg = Config::default();
        cfg.server.port = 4000;
        cfg.session.invalid_reset = InvalidReset::PerStep;
        cfg.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.server.port, 4000);
        assert_eq!(loaded.session.invalid_reset, InvalidReset::PerStep);
        assert_eq!(loaded.session.max_invalid, 3);
    }

    #[test]
    fn config_not_initialized() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            Config::load(dir.path()),
            Err(VaxError::NotInitialized)
        ));
        let cfg = Config::load_or_default(dir.path()).unwrap();
        assert_eq!(cfg.server.addr(), "127.0.0.1:24680");
    }

    #[test]
    fn partial_yaml_fills_defaults() {
        let cfg: Config = serde_yaml::from_str("session:\n  max_invalid: 5\n").unwrap();
        assert_eq!(cfg.session.max_invalid, 5);
        assert_eq!(cfg.session.second_dose.trigger_dose, "2");
        assert_eq!(cfg.catalog.path, PathBuf::from("catalog.yaml"));
    }

    #[test]
    fn default_config_is_clean() {
        assert!(Config::default().validate().is_empty());
    }

    #[test]
    fn validate_flags_bad_session_settings() {
        let mut cfg = Config::default();
        cfg.session.max_invalid = 0;
        cfg.session.second_dose.min_weeks = 10;
        cfg.server.port = 0;
        let warnings = cfg.validate();
        let errors = warnings
            .iter()
            .filter(|w| w.level == WarnLevel::Error)
            .count();
        assert_eq!(errors, 2);
        assert!(warnings.iter().any(|w| w.message.contains("port is 0")));
    }
}
