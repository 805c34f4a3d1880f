//! Configuration file loading.
//!
//! Resolution order:
//! 1) `$CREDIBILITY_CONFIG_PATH` (must exist when set)
//! 2) `config/credibility.toml`
//! 3) built-in defaults
//!
//! Every section and key is optional; missing keys take their defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use tracing::{info, warn};

use crate::aggregator::{Aggregator, EvaluationSettings};
use crate::parse::ParserSettings;
use crate::registry::{RegistryError, SignalRegistry, WeightRule};
use crate::signals::default_registry_with;

pub const ENV_CONFIG_PATH: &str = "CREDIBILITY_CONFIG_PATH";
pub const DEFAULT_CONFIG_PATH: &str = "config/credibility.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CredibilityConfig {
    pub evaluation: EvaluationSettings,
    pub parser: ParserSettings,
    /// Per-signal weight rule overrides, keyed by signal name.
    pub weights: BTreeMap<String, WeightRule>,
}

impl CredibilityConfig {
    /// Load using env var + fallbacks (see module docs).
    pub fn load() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let path = PathBuf::from(p);
            if !path.exists() {
                return Err(anyhow!(
                    "{ENV_CONFIG_PATH} points to non-existent path {}",
                    path.display()
                ));
            }
            return Self::load_from(&path);
        }
        let default = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default.exists() {
            return Self::load_from(&default);
        }
        info!("no config file found, using defaults");
        Ok(Self::default())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let cfg = Self::from_toml_str(&content)
            .with_context(|| format!("parsing config at {}", path.display()))?;
        info!(path = %path.display(), overrides = cfg.weights.len(), "loaded config");
        Ok(cfg)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: Self = toml::from_str(s).context("invalid credibility toml")?;
        cfg.sanitize();
        Ok(cfg)
    }

    /// Zero timeouts and an empty user agent fall back to defaults.
    fn sanitize(&mut self) {
        let eval_defaults = EvaluationSettings::default();
        if self.evaluation.evaluator_timeout_ms == 0 {
            warn!("evaluator_timeout_ms must be > 0, using default");
            self.evaluation.evaluator_timeout_ms = eval_defaults.evaluator_timeout_ms;
        }

        let parser_defaults = ParserSettings::default();
        if self.parser.user_agent.trim().is_empty() {
            self.parser.user_agent = parser_defaults.user_agent;
        }
        if self.parser.connect_timeout_secs == 0 {
            warn!("connect_timeout_secs must be > 0, using default");
            self.parser.connect_timeout_secs = parser_defaults.connect_timeout_secs;
        }
        if self.parser.timeout_secs == 0 {
            warn!("timeout_secs must be > 0, using default");
            self.parser.timeout_secs = parser_defaults.timeout_secs;
        }
    }

    /// Built-in signals with this config's weight overrides applied.
    pub fn registry(&self) -> Result<SignalRegistry, RegistryError> {
        default_registry_with(&self.weights)
    }

    pub fn aggregator(&self) -> Result<Aggregator> {
        let registry = self.registry().context("building signal registry")?;
        Ok(Aggregator::new(registry, self.evaluation))
    }
}
