//! # Aggregator
//! Runs one evaluation: ParseCheck → Evaluate (fan-out) → ValidateScores → Combine.
//!
//! Every signal runs on the blocking pool under its own deadline. Results land in
//! one slot per signal and are folded in registry order, so the final score is
//! bit-for-bit reproducible for identical input.
//!
//! Failure ladder:
//! - the page never passed ParseCheck → [`EvaluationError::Parse`], sentinel `-1`
//! - an evaluator failed, panicked, timed out, or produced an out-of-range score,
//!   a weight was negative/non-finite, or all weights were zero
//!   → [`EvaluationError::Scoring`], sentinel `-2`
//!
//! No partial score is ever returned.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tokio::task::JoinError;
use tracing::{debug, error, info, warn};

use crate::page::{
    check_parsed, PageData, ParseFailure, ParseLimits, DEFAULT_MIN_TEXT_LENGTH,
    DEFAULT_MIN_WORD_FLOOR,
};
use crate::registry::SignalRegistry;
use crate::telemetry::{NoopTelemetry, TelemetrySink};

pub const PARSE_FAILURE_SENTINEL: f64 = -1.0;
pub const SCORING_FAILURE_SENTINEL: f64 = -2.0;
/// Per-evaluation deadline shared by all signals. A signal that misses it fails
/// the evaluation, but its blocking task is detached rather than stopped and keeps
/// a blocking-pool thread until the evaluator returns on its own.
pub const DEFAULT_EVALUATOR_TIMEOUT_MS: u64 = 10_000;

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "credibility_evaluations_total",
            "Evaluations by outcome (ok, parse_failure, scoring_failure)."
        );
        describe_counter!(
            "credibility_signal_failures_total",
            "Evaluator errors, panics, timeouts and rejected scores or weights per signal."
        );
        describe_histogram!(
            "credibility_evaluation_ms",
            "Wall time of one evaluation in milliseconds."
        );
    });
}

/// `[evaluation]` section of the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EvaluationSettings {
    pub min_text_length: usize,
    pub min_word_floor: usize,
    pub evaluator_timeout_ms: u64,
}

impl Default for EvaluationSettings {
    fn default() -> Self {
        Self {
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
            min_word_floor: DEFAULT_MIN_WORD_FLOOR,
            evaluator_timeout_ms: DEFAULT_EVALUATOR_TIMEOUT_MS,
        }
    }
}

impl EvaluationSettings {
    pub fn limits(&self) -> ParseLimits {
        ParseLimits {
            min_text_length: self.min_text_length,
            min_word_floor: self.min_word_floor,
        }
    }

    pub fn evaluator_timeout(&self) -> Duration {
        Duration::from_millis(self.evaluator_timeout_ms)
    }
}

/// Insertion-ordered `name → value` list. Serializes as a JSON object in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreSet(Vec<(String, f64)>);

impl ScoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.0.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(n, v)| (n.as_str(), *v))
    }

    pub fn names(&self) -> Vec<&str> {
        self.0.iter().map(|(n, _)| n.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for ScoreSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Successful evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPage {
    pub url: String,
    pub score: f64,
    pub sub_scores: ScoreSet,
    pub weights: ScoreSet,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScoringError {
    #[error("evaluator {signal} failed: {message}")]
    EvaluatorFailed { signal: String, message: String },
    #[error("evaluator {signal} panicked")]
    EvaluatorPanicked { signal: String },
    #[error("evaluator {signal} timed out after {timeout_ms} ms")]
    TimedOut { signal: String, timeout_ms: u64 },
    #[error("sub-score of {signal} outside [0, 1]: {value}")]
    OutOfRange { signal: String, value: f64 },
    #[error("weight of {signal} is negative or not finite: {value}")]
    InvalidWeight { signal: String, value: f64 },
    #[error("score set has {got} entries, registry has {expected}")]
    Incomplete { got: usize, expected: usize },
    #[error("total weight is zero")]
    ZeroTotalWeight,
}

impl ScoringError {
    /// Signal blamed for the failure, if any.
    pub fn signal(&self) -> Option<&str> {
        match self {
            Self::EvaluatorFailed { signal, .. }
            | Self::EvaluatorPanicked { signal }
            | Self::TimedOut { signal, .. }
            | Self::OutOfRange { signal, .. }
            | Self::InvalidWeight { signal, .. } => Some(signal),
            Self::Incomplete { .. } | Self::ZeroTotalWeight => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
    #[error("parse failure: {0}")]
    Parse(#[from] ParseFailure),
    #[error("scoring failure: {0}")]
    Scoring(#[from] ScoringError),
}

impl EvaluationError {
    pub fn sentinel(&self) -> f64 {
        match self {
            Self::Parse(_) => PARSE_FAILURE_SENTINEL,
            Self::Scoring(_) => SCORING_FAILURE_SENTINEL,
        }
    }

    pub fn outcome(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse_failure",
            Self::Scoring(_) => "scoring_failure",
        }
    }
}

/// Caller convention: the score in `[0, 1]`, `-1` for parse and `-2` for scoring failures.
pub fn sentinel_score(result: &Result<ScoredPage, EvaluationError>) -> f64 {
    match result {
        Ok(scored) => scored.score,
        Err(e) => e.sentinel(),
    }
}

/// Raw outcome of one signal task.
type SlotResult = Result<(f64, f64), ScoringError>;

#[derive(Clone)]
pub struct Aggregator {
    registry: Arc<SignalRegistry>,
    settings: EvaluationSettings,
    telemetry: Arc<dyn TelemetrySink>,
}

impl fmt::Debug for Aggregator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Aggregator")
            .field("signals", &self.registry.names())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Aggregator {
    pub fn new(registry: SignalRegistry, settings: EvaluationSettings) -> Self {
        Self {
            registry: Arc::new(registry),
            settings,
            telemetry: Arc::new(NoopTelemetry),
        }
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    pub fn registry(&self) -> &SignalRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EvaluationSettings {
        &self.settings
    }

    /// Full evaluation of one (possibly absent) parser result.
    pub async fn evaluate(&self, page: Option<PageData>) -> Result<ScoredPage, EvaluationError> {
        ensure_metrics_described();
        let t0 = Instant::now();
        let url = page.as_ref().map(|p| p.url.clone()).unwrap_or_default();

        let result = self.run(page).await;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("credibility_evaluation_ms").record(ms);
        let outcome = match &result {
            Ok(scored) => {
                info!(target: "evaluation", url = %scored.url, score = scored.score, ms, "evaluation finished");
                "ok"
            }
            Err(e @ EvaluationError::Parse(_)) => {
                warn!(target: "evaluation", url = %url, error = %e, "page could not be parsed");
                e.outcome()
            }
            Err(e @ EvaluationError::Scoring(_)) => {
                error!(target: "evaluation", url = %url, error = %e, "scoring failed");
                e.outcome()
            }
        };
        counter!("credibility_evaluations_total", "outcome" => outcome).increment(1);
        result
    }

    async fn run(&self, page: Option<PageData>) -> Result<ScoredPage, EvaluationError> {
        // ParseCheck
        check_parsed(page.as_ref(), &self.settings.limits())?;
        let Some(page) = page else {
            return Err(ParseFailure::Absent.into());
        };
        let page = Arc::new(page);

        // Evaluate
        let slots = self.fan_out(&page).await;
        if slots.len() != self.registry.len() {
            error!(target: "evaluation", url = %page.url, got = slots.len(), expected = self.registry.len(), "missing signal slots");
            return Err(ScoringError::Incomplete {
                got: slots.len(),
                expected: self.registry.len(),
            }
            .into());
        }

        // ValidateScores + Combine, in registry order
        let mut sub_scores = ScoreSet::new();
        let mut weights = ScoreSet::new();
        let mut weighted_sum = 0.0;
        let mut weight_total = 0.0;

        for (signal, slot) in self.registry.iter().zip(slots) {
            let name = signal.name();
            let (score, weight) = slot?;
            let invalid = if !(0.0..=1.0).contains(&score) {
                Some(ScoringError::OutOfRange {
                    signal: name.to_string(),
                    value: score,
                })
            } else if !weight.is_finite() || weight < 0.0 {
                Some(ScoringError::InvalidWeight {
                    signal: name.to_string(),
                    value: weight,
                })
            } else {
                None
            };
            if let Some(e) = invalid {
                error!(target: "evaluation", url = %page.url, signal = name, error = %e, "signal rejected");
                counter!("credibility_signal_failures_total", "signal" => name.to_string())
                    .increment(1);
                return Err(e.into());
            }
            debug!(target: "evaluation", url = %page.url, signal = name, score, weight, "sub-score");
            self.telemetry
                .record(&page.url, &format!("score_{name}"), score);
            sub_scores.push(name, score);
            weights.push(name, weight);
            weighted_sum += score * weight;
            weight_total += weight;
        }

        if weight_total == 0.0 {
            return Err(ScoringError::ZeroTotalWeight.into());
        }

        let score = (weighted_sum / weight_total).clamp(0.0, 1.0);
        self.telemetry.record(&page.url, "credibility_score", score);
        Ok(ScoredPage {
            url: page.url.clone(),
            score,
            sub_scores,
            weights,
        })
    }

    /// One blocking task per signal, all started before any is awaited.
    /// Slots come back in registry order.
    async fn fan_out(&self, page: &Arc<PageData>) -> Vec<SlotResult> {
        let timeout = self.settings.evaluator_timeout();
        let deadline = tokio::time::Instant::now() + timeout;

        let handles: Vec<_> = self
            .registry
            .iter()
            .map(|signal| {
                let page = Arc::clone(page);
                let evaluator = signal.evaluator();
                let weight_fn = signal.weight_fn();
                let telemetry = Arc::clone(&self.telemetry);
                tokio::task::spawn_blocking(move || -> anyhow::Result<(f64, f64)> {
                    let score = evaluator.evaluate(&page, telemetry.as_ref())?;
                    let weight = weight_fn.weight(score, &page);
                    Ok((score, weight))
                })
            })
            .collect();

        let mut slots = Vec::with_capacity(handles.len());
        for (signal, handle) in self.registry.iter().zip(handles) {
            let name = signal.name();
            let slot = match tokio::time::timeout_at(deadline, handle).await {
                Ok(Ok(Ok(pair))) => Ok(pair),
                Ok(Ok(Err(e))) => Err(ScoringError::EvaluatorFailed {
                    signal: name.to_string(),
                    message: format!("{e:#}"),
                }),
                Ok(Err(join)) => Err(join_failure(name, join)),
                Err(_) => Err(ScoringError::TimedOut {
                    signal: name.to_string(),
                    timeout_ms: timeout.as_millis() as u64,
                }),
            };
            if let Err(e) = &slot {
                error!(target: "evaluation", url = %page.url, signal = name, error = %e, "signal failed");
                counter!("credibility_signal_failures_total", "signal" => name.to_string())
                    .increment(1);
            }
            slots.push(slot);
        }
        slots
    }
}

fn join_failure(name: &str, join: JoinError) -> ScoringError {
    if join.is_panic() {
        ScoringError::EvaluatorPanicked {
            signal: name.to_string(),
        }
    } else {
        ScoringError::EvaluatorFailed {
            signal: name.to_string(),
            message: join.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::SignalDefinition;

    fn page() -> PageData {
        PageData::new(
            "https://example.org/a",
            "<html></html>",
            "Headline",
            "The council approved the budget on Monday after a long debate in the chamber.",
            vec![],
        )
    }

    fn fixed(name: &str, score: f64, weight: f64) -> SignalDefinition {
        SignalDefinition::new(
            name,
            move |_: &PageData, _: &dyn TelemetrySink| -> anyhow::Result<f64> { Ok(score) },
            move |_: f64, _: &PageData| weight,
        )
    }

    fn aggregator(signals: Vec<SignalDefinition>) -> Aggregator {
        let mut reg = SignalRegistry::new();
        for s in signals {
            reg.register(s).unwrap();
        }
        Aggregator::new(reg, EvaluationSettings::default())
    }

    #[test]
    fn sentinels() {
        assert_eq!(EvaluationError::from(ParseFailure::Absent).sentinel(), -1.0);
        assert_eq!(EvaluationError::from(ScoringError::ZeroTotalWeight).sentinel(), -2.0);
    }

    #[test]
    fn score_set_serializes_in_order() {
        let mut s = ScoreSet::new();
        s.push("z", 0.5);
        s.push("a", 1.0);
        assert_eq!(serde_json::to_string(&s).unwrap(), r#"{"z":0.5,"a":1.0}"#);
        assert_eq!(s.get("a"), Some(1.0));
    }

    #[tokio::test]
    async fn weighted_average() {
        let agg = aggregator(vec![fixed("a", 0.2, 1.0), fixed("b", 0.8, 1.0)]);
        let scored = agg.evaluate(Some(page())).await.unwrap();
        assert!((scored.score - 0.5).abs() < 1e-12);
        assert_eq!(scored.sub_scores.names(), vec!["a", "b"]);
        assert_eq!(scored.weights.get("b"), Some(1.0));
    }

    #[tokio::test]
    async fn negative_weight_is_scoring_failure() {
        let agg = aggregator(vec![fixed("a", 0.2, -1.0)]);
        let err = agg.evaluate(Some(page())).await.unwrap_err();
        assert!(matches!(
            err,
            EvaluationError::Scoring(ScoringError::InvalidWeight { .. })
        ));
    }

    #[tokio::test]
    async fn absent_page_is_parse_failure() {
        let agg = aggregator(vec![fixed("a", 0.2, 1.0)]);
        let r = agg.evaluate(None).await;
        assert_eq!(sentinel_score(&r), -1.0);
    }
}
