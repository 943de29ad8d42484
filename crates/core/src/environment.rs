//! # Native Environment
//!
//! Process-wide engine context. Constructed once at startup with
//! [`NativeEnvironment::init`], shared as `Arc<NativeEnvironment>` and torn
//! down with [`NativeEnvironment::shutdown`].
//!
//! ## Table of Contents
//! 1. NativeEnvironment - Context, registry ownership, thread affinity
//! 2. Resource discovery

use crate::config::EnvironmentConfig;
use crate::error::{BarrierError, Result};
use crate::registry::NativeRegistry;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::ThreadId;
use tracing::{debug, error, info, warn};

// ============================================================================
// 1. NativeEnvironment
// ============================================================================

/// Engine context owning the native registry
pub struct NativeEnvironment {
    config: EnvironmentConfig,
    registry: NativeRegistry,
    /// Thread that created the context; all barrier calls belong here
    owner_thread: ThreadId,
    /// Installation found through the configured environment variable
    installation: Option<PathBuf>,
    active: AtomicBool,
}

impl NativeEnvironment {
    /// Locate engine resources and start the context on the calling thread
    pub fn init(config: EnvironmentConfig) -> Result<Arc<Self>> {
        if let Err(e) = config.validate() {
            error!("Invalid native environment configuration: {}", e);
            return Err(e);
        }

        let installation = detect_installation(&config.installation_env_var);

        match &installation {
            Some(path) => {
                info!(
                    "Native engine installation detected through {}: {}",
                    config.installation_env_var,
                    path.display()
                );
            }
            None if config.verify_resources => {
                let missing = config.missing_subdirs();
                if !missing.is_empty() {
                    let message = format!(
                        "Native engine resources at {} are incomplete, missing: {}",
                        config.resources_path.display(),
                        missing.join(", ")
                    );
                    error!("{}", message);
                    return Err(BarrierError::Environment(message));
                }
                info!(
                    "Using bundled native engine resources at {}",
                    config.resources_path.display()
                );
            }
            None => {
                debug!("Native engine resource verification disabled");
            }
        }

        Ok(Arc::new(Self::with_installation(config, installation)))
    }

    /// Context without resource discovery, for tests and tools
    pub fn headless() -> Arc<Self> {
        Arc::new(Self::with_installation(EnvironmentConfig::headless(), None))
    }

    fn with_installation(config: EnvironmentConfig, installation: Option<PathBuf>) -> Self {
        Self {
            config,
            registry: NativeRegistry::new(),
            owner_thread: std::thread::current().id(),
            installation,
            active: AtomicBool::new(true),
        }
    }

    /// Engine-side object registry
    pub fn registry(&self) -> &NativeRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EnvironmentConfig {
        &self.config
    }

    /// Host-to-native distance factor
    pub fn distance_scale(&self) -> f64 {
        self.config.distance_scale
    }

    /// Installation directory, if one was detected
    pub fn installation(&self) -> Option<&Path> {
        self.installation.as_deref()
    }

    /// Directory the engine loads its resources from
    pub fn resources_path(&self) -> &Path {
        self.installation
            .as_deref()
            .unwrap_or(self.config.resources_path.as_path())
    }

    /// False once `shutdown` has run
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    pub fn is_owner_thread(&self) -> bool {
        std::thread::current().id() == self.owner_thread
    }

    /// Debug-assert that the caller runs on the thread owning the context
    pub fn assert_owner_thread(&self) {
        debug_assert!(
            self.is_owner_thread(),
            "Native engine accessed from {:?}, owned by {:?}",
            std::thread::current().id(),
            self.owner_thread
        );
    }

    /// Drop every engine-side reference and mark the context inactive.
    /// Calling it again does nothing.
    pub fn shutdown(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            debug!("Native environment already shut down");
            return;
        }

        let unpinned = self.registry.clear_pins();
        self.registry.prune();
        let remaining = self.registry.live_count();
        if remaining > 0 {
            warn!(
                "Native environment shut down with {} native objects still held by barriers",
                remaining
            );
        }
        info!("Native environment shut down, released {} engine references", unpinned);
    }
}

impl Drop for NativeEnvironment {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// ============================================================================
// 2. Resource Discovery
// ============================================================================

/// First non-empty entry of a path-list environment variable
fn detect_installation(env_var: &str) -> Option<PathBuf> {
    let value = std::env::var_os(env_var)?;
    std::env::split_paths(&value).find(|path| !path.as_os_str().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_is_active() {
        let env = NativeEnvironment::headless();
        assert!(env.is_active());
        assert!(env.is_owner_thread());
        assert!(env.installation().is_none());
        env.assert_owner_thread();
    }

    #[test]
    fn test_init_fails_on_incomplete_resources() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("bin")).unwrap();

        let config = EnvironmentConfig::default()
            .with_resources_path(dir.path())
            .with_installation_env_var("BARRIER_TEST_UNSET_INSTALLATION");

        let result = NativeEnvironment::init(config);
        assert!(matches!(result, Err(BarrierError::Environment(_))));
    }

    #[test]
    fn test_init_rejects_non_positive_distance_scale() {
        let zero = EnvironmentConfig::headless().with_distance_scale(0.0);
        assert!(matches!(NativeEnvironment::init(zero), Err(BarrierError::Config(_))));

        let negative = EnvironmentConfig::headless().with_distance_scale(-1.0);
        assert!(matches!(NativeEnvironment::init(negative), Err(BarrierError::Config(_))));

        let env = NativeEnvironment::init(EnvironmentConfig::headless().with_distance_scale(0.001)).unwrap();
        assert!((env.distance_scale() - 0.001).abs() < 1e-15);
    }

    #[test]
    fn test_init_with_complete_resources() {
        let dir = tempfile::tempdir().unwrap();
        for subdir in ["bin", "data", "cfg", "plugins"] {
            std::fs::create_dir(dir.path().join(subdir)).unwrap();
        }

        let config = EnvironmentConfig::default()
            .with_resources_path(dir.path())
            .with_installation_env_var("BARRIER_TEST_UNSET_INSTALLATION");

        let env = NativeEnvironment::init(config).unwrap();
        assert_eq!(env.resources_path(), dir.path());
    }

    #[test]
    fn test_init_prefers_installation() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("BARRIER_TEST_INSTALLATION", dir.path());

        let config = EnvironmentConfig::default()
            .with_resources_path("/does/not/exist")
            .with_installation_env_var("BARRIER_TEST_INSTALLATION");

        let env = NativeEnvironment::init(config).unwrap();
        assert_eq!(env.installation(), Some(dir.path()));
        assert_eq!(env.resources_path(), dir.path());
    }

    #[test]
    fn test_shutdown_releases_pins() {
        let env = NativeEnvironment::headless();
        let address = {
            let handle = env.registry().register(7_u32);
            env.registry().increment_ref_count(handle.address()).unwrap();
            handle.address()
        };
        assert!(env.registry().is_live(address));

        env.shutdown();
        assert!(!env.is_active());
        assert!(!env.registry().is_live(address));

        env.shutdown();
        assert!(!env.is_active());
    }

    #[test]
    fn test_other_thread_is_not_owner() {
        let env = NativeEnvironment::headless();
        let env_clone = Arc::clone(&env);
        let owner = std::thread::spawn(move || env_clone.is_owner_thread())
            .join()
            .unwrap();
        assert!(!owner);
    }
}
