//! # Environment Configuration
//!
//! TOML-based configuration for locating and bootstrapping the native engine.

use crate::error::{BarrierError, Result};
use crate::units::DEFAULT_DISTANCE_SCALE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Native environment configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Bundled engine resources, used when no installation is detected
    #[serde(default = "default_resources_path")]
    pub resources_path: PathBuf,

    /// Environment variable set by an installed engine's setup script
    #[serde(default = "default_installation_env_var")]
    pub installation_env_var: String,

    /// Check that the bundled resources are complete before starting
    #[serde(default = "default_true")]
    pub verify_resources: bool,

    /// Subdirectories that must exist under `resources_path`
    #[serde(default = "default_required_subdirs")]
    pub required_subdirs: Vec<String>,

    /// Host-to-native distance factor
    #[serde(default = "default_distance_scale")]
    pub distance_scale: f64,

    /// Log every native allocation and release at debug level
    #[serde(default)]
    pub log_allocations: bool,
}

fn default_resources_path() -> PathBuf { PathBuf::from("ThirdParty/native/Resources") }
fn default_installation_env_var() -> String { "NATIVE_ENGINE_DIR".to_string() }
fn default_true() -> bool { true }
fn default_distance_scale() -> f64 { DEFAULT_DISTANCE_SCALE }

fn default_required_subdirs() -> Vec<String> {
    vec![
        "bin".to_string(),
        "data".to_string(),
        "cfg".to_string(),
        "plugins".to_string(),
    ]
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            resources_path: default_resources_path(),
            installation_env_var: default_installation_env_var(),
            verify_resources: true,
            required_subdirs: default_required_subdirs(),
            distance_scale: default_distance_scale(),
            log_allocations: false,
        }
    }
}

impl EnvironmentConfig {
    /// Load from TOML file or return default
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse environment config: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read environment config: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save to TOML file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Config for tests and tools that run without engine resources
    pub fn headless() -> Self {
        Self {
            verify_resources: false,
            ..Self::default()
        }
    }

    /// Use a different resources directory
    pub fn with_resources_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.resources_path = path.into();
        self
    }

    /// Use a different installation environment variable
    pub fn with_installation_env_var(mut self, name: &str) -> Self {
        self.installation_env_var = name.to_string();
        self
    }

    /// Use a different host-to-native distance factor
    pub fn with_distance_scale(mut self, distance_scale: f64) -> Self {
        self.distance_scale = distance_scale;
        self
    }

    /// Reject values the environment cannot run with
    pub fn validate(&self) -> Result<()> {
        if !self.distance_scale.is_finite() || self.distance_scale <= 0.0 {
            return Err(BarrierError::Config(format!(
                "distance_scale must be a positive number, got {}",
                self.distance_scale
            )));
        }
        Ok(())
    }

    /// Required subdirectories missing under `resources_path`
    pub fn missing_subdirs(&self) -> Vec<String> {
        self.required_subdirs
            .iter()
            .filter(|subdir| !self.resources_path.join(subdir.as_str()).is_dir())
            .cloned()
            .collect()
    }
}
