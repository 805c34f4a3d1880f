//! Signal registry: the ordered list of `(name, evaluator, weight)` triples that
//! take part in scoring.
//!
//! The registry is assembled once at startup and shared read-only afterwards.
//! Evaluators and weight functions only ever see the page (and, for weights, the
//! signal's own sub-score), so signals can run in any order or in parallel.

pub mod weights;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::page::PageData;
use crate::telemetry::TelemetrySink;

pub use weights::{Band, WeightCurve, WeightRule};

/// Maps a validated page to a sub-score in `[0, 1]` (1 = more credible).
///
/// Returning a value outside `[0, 1]`, an `Err`, or panicking are all treated as
/// defects by the aggregator and fail the whole evaluation.
pub trait Evaluator: Send + Sync {
    fn evaluate(&self, page: &PageData, telemetry: &dyn TelemetrySink) -> anyhow::Result<f64>;
}

impl<F> Evaluator for F
where
    F: Fn(&PageData, &dyn TelemetrySink) -> anyhow::Result<f64> + Send + Sync,
{
    fn evaluate(&self, page: &PageData, telemetry: &dyn TelemetrySink) -> anyhow::Result<f64> {
        self(page, telemetry)
    }
}

/// Weight for one sub-score; must be finite and `>= 0`. Zero excludes the signal
/// from this evaluation.
pub trait WeightFn: Send + Sync {
    fn weight(&self, score: f64, page: &PageData) -> f64;
}

impl<F> WeightFn for F
where
    F: Fn(f64, &PageData) -> f64 + Send + Sync,
{
    fn weight(&self, score: f64, page: &PageData) -> f64 {
        self(score, page)
    }
}

/// One named signal.
#[derive(Clone)]
pub struct SignalDefinition {
    name: String,
    evaluator: Arc<dyn Evaluator>,
    weight: Arc<dyn WeightFn>,
    /// Set when the weight comes from a declarative rule.
    rule: Option<WeightRule>,
}

impl SignalDefinition {
    pub fn new(
        name: impl Into<String>,
        evaluator: impl Evaluator + 'static,
        weight: impl WeightFn + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            evaluator: Arc::new(evaluator),
            weight: Arc::new(weight),
            rule: None,
        }
    }

    /// Signal weighted by a declarative rule. Its gates survive later overrides.
    pub fn from_rule(
        name: impl Into<String>,
        evaluator: impl Evaluator + 'static,
        rule: WeightRule,
    ) -> Self {
        Self {
            name: name.into(),
            evaluator: Arc::new(evaluator),
            weight: Arc::new(rule.clone()),
            rule: Some(rule),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluator(&self) -> Arc<dyn Evaluator> {
        Arc::clone(&self.evaluator)
    }

    pub fn weight_fn(&self) -> Arc<dyn WeightFn> {
        Arc::clone(&self.weight)
    }

    pub fn rule(&self) -> Option<&WeightRule> {
        self.rule.as_ref()
    }

    /// Replace the weight function, keeping name and evaluator.
    pub fn with_weight(mut self, weight: impl WeightFn + 'static) -> Self {
        self.weight = Arc::new(weight);
        self.rule = None;
        self
    }
}

impl fmt::Debug for SignalDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalDefinition")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Configuration errors; all of them surface at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("signal name must not be empty")]
    EmptyName,
    #[error("duplicate signal: {0}")]
    DuplicateSignal(String),
    #[error("weight override for unknown signal: {0}")]
    UnknownSignal(String),
    #[error("weight rule for {0} can yield a negative or non-finite weight")]
    MalformedWeight(String),
}

/// Insertion-ordered set of signals with unique names.
#[derive(Debug, Clone, Default)]
pub struct SignalRegistry {
    signals: Vec<SignalDefinition>,
    index: HashMap<String, usize>,
}

impl SignalRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, signal: SignalDefinition) -> Result<&mut Self, RegistryError> {
        if signal.name.trim().is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if self.index.contains_key(&signal.name) {
            return Err(RegistryError::DuplicateSignal(signal.name));
        }
        self.index.insert(signal.name.clone(), self.signals.len());
        self.signals.push(signal);
        Ok(self)
    }

    /// Builder-style `register`.
    pub fn with(mut self, signal: SignalDefinition) -> Result<Self, RegistryError> {
        self.register(signal)?;
        Ok(self)
    }

    /// Swap in a declarative weight rule for an already registered signal.
    /// Headline/host gates of the signal's current rule stay in force.
    pub fn override_weight(&mut self, name: &str, mut rule: WeightRule) -> Result<(), RegistryError> {
        if !rule.curve.is_well_formed() {
            return Err(RegistryError::MalformedWeight(name.to_string()));
        }
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| RegistryError::UnknownSignal(name.to_string()))?;
        let signal = &mut self.signals[idx];
        if let Some(current) = &signal.rule {
            if (current.requires_headline && !rule.requires_headline)
                || (current.requires_host && !rule.requires_host)
            {
                debug!(signal = name, "weight override inherits built-in gates");
            }
            rule.requires_headline |= current.requires_headline;
            rule.requires_host |= current.requires_host;
        }
        signal.weight = Arc::new(rule.clone());
        signal.rule = Some(rule);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&SignalDefinition> {
        self.index.get(name).map(|&i| &self.signals[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &SignalDefinition> {
        self.signals.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.signals.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }
}
