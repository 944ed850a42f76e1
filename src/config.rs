//! Engine configuration
//!
//! Configuration is read from the environment once per process:
//!
//! - `MATRIXKIT_DISABLE_SIMD`: disable the CPU-SIMD provider (any value)
//! - `MATRIXKIT_NATIVE_LIB`: path of the native runtime library
//! - `MATRIXKIT_PARALLEL_THRESHOLD`: element count above which the CPU-naive
//!   provider splits work across threads (`rayon` feature only)
//!
//! Providers capture the configuration when they are constructed, so changing
//! the environment later in the process has no effect.

use std::path::PathBuf;
use std::sync::OnceLock;

/// Environment variable disabling the SIMD provider
pub const ENV_DISABLE_SIMD: &str = "MATRIXKIT_DISABLE_SIMD";
/// Environment variable naming the native runtime library
pub const ENV_NATIVE_LIB: &str = "MATRIXKIT_NATIVE_LIB";
/// Environment variable overriding the parallel threshold
pub const ENV_PARALLEL_THRESHOLD: &str = "MATRIXKIT_PARALLEL_THRESHOLD";

/// Default element count above which parallel kernels are used
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 1000;

/// Runtime configuration shared by the providers
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Whether the CPU-SIMD provider may report itself available
    pub simd_enabled: bool,
    /// Explicit path of the native runtime library
    pub native_library: Option<PathBuf>,
    /// Element count above which parallel kernels are used
    pub parallel_threshold: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            simd_enabled: true,
            native_library: None,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EngineConfig {
    /// Build a configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup
    ///
    /// Unparseable values are ignored and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if lookup(ENV_DISABLE_SIMD).is_some() {
            config.simd_enabled = false;
        }

        if let Some(path) = lookup(ENV_NATIVE_LIB).filter(|p| !p.is_empty()) {
            config.native_library = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup(ENV_PARALLEL_THRESHOLD) {
            match raw.trim().parse::<usize>() {
                Ok(threshold) => config.parallel_threshold = threshold,
                Err(_) => log::warn!(
                    "ignoring {}={:?}: not an unsigned integer",
                    ENV_PARALLEL_THRESHOLD,
                    raw
                ),
            }
        }

        config
    }

    /// Process-wide configuration, read from the environment on first use
    pub fn global() -> &'static EngineConfig {
        static CONFIG: OnceLock<EngineConfig> = OnceLock::new();
        CONFIG.get_or_init(Self::from_env)
    }

    /// Disable SIMD kernels
    pub fn without_simd(mut self) -> Self {
        self.simd_enabled = false;
        self
    }

    /// Use the given native runtime library
    pub fn with_native_library(mut self, path: impl Into<PathBuf>) -> Self {
        self.native_library = Some(path.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::from_lookup(|_| None);
        assert_eq!(config, EngineConfig::default());
        assert!(config.simd_enabled);
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }

    #[test]
    fn test_env_overrides() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            (ENV_DISABLE_SIMD, "1"),
            (ENV_NATIVE_LIB, "/opt/lib/libmk.so"),
            (ENV_PARALLEL_THRESHOLD, "4096"),
        ]));
        assert!(!config.simd_enabled);
        assert_eq!(
            config.native_library,
            Some(PathBuf::from("/opt/lib/libmk.so"))
        );
        assert_eq!(config.parallel_threshold, 4096);
    }

    #[test]
    fn test_bad_threshold_keeps_default() {
        let config = EngineConfig::from_lookup(lookup_from(&[(ENV_PARALLEL_THRESHOLD, "lots")]));
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
    }
}
