//! telemetry.rs: optional sink for per-page diagnostic measurements.
//!
//! Evaluators may report intermediate values (e.g. "exclamations per sentence")
//! here for offline analysis. Nothing in the scoring path reads them back.

use std::collections::BTreeMap;
use std::sync::Mutex;

/// Receives `(url, field, value)` triples.
pub trait TelemetrySink: Send + Sync {
    fn record(&self, url: &str, field: &str, value: f64);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl TelemetrySink for NoopTelemetry {
    fn record(&self, _url: &str, _field: &str, _value: f64) {}
}

/// In-memory table of measurements: url → ordered (field, value) list.
/// Recording a field twice for the same url overwrites the earlier value in place.
#[derive(Debug, Default)]
pub struct StatsCollector {
    inner: Mutex<BTreeMap<String, Vec<(String, f64)>>>,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, url: &str, field: &str) -> Option<f64> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard
            .get(url)
            .and_then(|row| row.iter().find(|(f, _)| f == field))
            .map(|(_, v)| *v)
    }

    /// Copy of all fields recorded for one url, in recording order.
    pub fn row(&self, url: &str) -> Vec<(String, f64)> {
        let guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        guard.get(url).cloned().unwrap_or_default()
    }

    pub fn snapshot(&self) -> BTreeMap<String, Vec<(String, f64)>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn urls(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn clear(&self) {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl TelemetrySink for StatsCollector {
    fn record(&self, url: &str, field: &str, value: f64) {
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let row = guard.entry(url.to_string()).or_default();
        match row.iter_mut().find(|(f, _)| f == field) {
            Some(slot) => slot.1 = value,
            None => row.push((field.to_string(), value)),
        }
    }
}
