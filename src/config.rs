/// Service configuration loading from runbox.json
use crate::limits::LimitPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors, surfaced at the service boundary
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Isolation runtime and interpreter settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Container engine binary
    pub engine: String,
    /// Interpreter image for isolated runs
    pub image: String,
    /// uid:gid the payload runs as inside the container
    pub user: String,
    /// Size cap for the writable /tmp scratch area, in megabytes
    pub tmpfs_size_mb: u64,
    /// Interpreter used by the unsandboxed fallback path
    pub fallback_interpreter: String,
    /// Deadline for the runtime availability probe, in seconds
    pub probe_timeout_secs: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: "docker".to_string(),
            image: "python:3.11-slim".to_string(),
            user: "1000:1000".to_string(),
            tmpfs_size_mb: 64,
            fallback_interpreter: "python3".to_string(),
            probe_timeout_secs: 3,
        }
    }
}

/// Full runbox.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Ceilings for caller-supplied budgets
    pub limits: LimitPolicy,
    /// Isolation runtime settings
    pub runtime: RuntimeConfig,
    /// Base directory for per-request staging areas
    pub staging_dir: Option<PathBuf>,
    /// Catalog registry persistence path
    pub registry_path: Option<PathBuf>,
}

impl ServiceConfig {
    /// Load configuration from a JSON file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> std::result::Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Load ./runbox.json when present, defaults otherwise
    pub fn load_default() -> std::result::Result<Self, ConfigError> {
        let path = Path::new("runbox.json");
        if path.exists() {
            Self::load_from_file(path)
        } else {
            log::debug!("runbox.json not found, using built-in defaults");
            Ok(Self::default())
        }
    }

    /// Base directory under which staging areas are created
    pub fn staging_base(&self) -> PathBuf {
        self.staging_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("runbox"))
    }

    /// Persistence path for the server catalog
    pub fn registry_file(&self) -> PathBuf {
        self.registry_path
            .clone()
            .unwrap_or_else(|| PathBuf::from("runbox_registry.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.runtime.engine, "docker");
        assert_eq!(config.runtime.image, "python:3.11-slim");
        assert_eq!(config.runtime.user, "1000:1000");
        assert_eq!(config.limits.max_timeout_secs, 60);
        assert!(config.staging_base().ends_with("runbox"));
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let config: ServiceConfig =
            serde_json::from_str(r#"{"runtime": {"engine": "podman"}}"#).unwrap();
        assert_eq!(config.runtime.engine, "podman");
        assert_eq!(config.runtime.image, "python:3.11-slim");
        assert_eq!(config.limits.max_memory_mb, 512);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runbox.json");
        std::fs::write(&path, r#"{"limits": {"max_timeout_secs": 120}}"#).unwrap();

        let config = ServiceConfig::load_from_file(&path).unwrap();
        assert_eq!(config.limits.max_timeout_secs, 120);

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ServiceConfig::load_from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
