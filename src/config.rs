//! Process-wide settings
//!
//! The return model and the benchmark rebasing policy are chosen here once and
//! passed explicitly into every calculation, so two views in the same run can
//! never disagree about how returns are computed.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::TrackerError;
use crate::pricing::{BenchmarkPreset, DEFAULT_BENCHMARKS};
use crate::reports::{FlowWeight, RebasePolicy, Window};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Share of a period's net flow counted in the capital base (0.5 is
    /// Simple Dietz, 1.0 counts the whole flow)
    pub flow_weight: FlowWeight,
    pub rebase_policy: RebasePolicy,
    pub default_window: Window,
    pub benchmarks: Vec<BenchmarkPreset>,
    /// Names or tickers compared when `performance` gets no `--benchmark`
    pub default_benchmarks: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            flow_weight: FlowWeight::SIMPLE_DIETZ,
            rebase_policy: RebasePolicy::SharedAnchor,
            default_window: Window::All,
            benchmarks: DEFAULT_BENCHMARKS.clone(),
            default_benchmarks: vec!["^TWII".to_string()],
        }
    }
}

impl Config {
    /// Config file location: $NETWORTH_CONFIG, else <config dir>/networth/config.toml
    pub fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("NETWORTH_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dir_spec::config_home().map(|dir| dir.join("networth").join("config.toml"))
    }

    /// Load from the default location, falling back to defaults when there is
    /// no file
    pub fn load() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                debug!("No config file found; using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        info!("Loading config from {:?}", path);
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml_str(&text).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Config =
            toml::from_str(text).map_err(|e| TrackerError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), TrackerError> {
        for key in &self.default_benchmarks {
            if self.find_benchmark(key).is_none() {
                return Err(TrackerError::ConfigError(format!(
                    "default benchmark '{}' is not in the benchmarks list",
                    key
                )));
            }
        }
        Ok(())
    }

    pub fn find_benchmark(&self, key: &str) -> Option<&BenchmarkPreset> {
        self.benchmarks.iter().find(|b| b.matches(key))
    }

    /// Resolve requested benchmark names/tickers.
    ///
    /// No request means the configured defaults; `none` means no benchmarks.
    /// A ticker that is not a preset is used as-is under its own name.
    pub fn resolve_benchmarks(&self, requested: &[String]) -> Vec<BenchmarkPreset> {
        let keys: &[String] = if requested.is_empty() {
            &self.default_benchmarks
        } else {
            requested
        };

        if keys.iter().any(|k| k.eq_ignore_ascii_case("none")) {
            return Vec::new();
        }

        let mut resolved: Vec<BenchmarkPreset> = Vec::new();
        for key in keys {
            let preset = self
                .find_benchmark(key)
                .cloned()
                .unwrap_or_else(|| BenchmarkPreset::new(key.as_str(), key.as_str()));
            if !resolved.iter().any(|b| b.ticker == preset.ticker) {
                resolved.push(preset);
            }
        }
        resolved
    }
}
