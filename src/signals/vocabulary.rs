//! Vocabulary: profanity and emotionally loaded words.

use std::collections::{BTreeMap, HashMap};

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::{ratio, rescale};
use crate::page::PageData;
use crate::telemetry::TelemetrySink;

/// Profanity occurrences at which the score reaches 0.
pub const MAX_PROFANITY: f64 = 3.0;
/// Scales average emotion intensity per word before mapping.
pub const EMOTION_INTENSITY_MULTIPLIER: f64 = 2.0;

/// One entry per line; entries may span several words.
static PROFANITY_LIST: &str = include_str!("../../data/profanity.txt");

static PROFANITY: Lazy<Regex> = Lazy::new(|| {
    let alternatives: Vec<String> = PROFANITY_LIST
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(regex::escape)
        .collect();
    Regex::new(&format!(r"\b(?:{})\b", alternatives.join("|"))).expect("profanity regex")
});

/// word → emotion → intensity in `(0, 1]`.
static EMOTIONS: Lazy<HashMap<String, BTreeMap<String, f64>>> = Lazy::new(|| {
    let raw = include_str!("../../data/emotion_intensity.json");
    serde_json::from_str(raw).expect("valid emotion intensity lexicon")
});

/// Profanity count over headline and text, linear from 0 hits (1.0) to
/// [`MAX_PROFANITY`] hits (0.0).
pub fn evaluate_profanity(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let fulltext = format!("{} {}", page.headline, page.text).to_lowercase();

    let mut matches: BTreeMap<&str, usize> = BTreeMap::new();
    for m in PROFANITY.find_iter(&fulltext) {
        *matches.entry(m.as_str()).or_default() += 1;
    }
    let total: usize = matches.values().sum();
    if total > 0 {
        info!(target: "signals", url = %page.url, matches = ?matches, "profanity");
    }
    telemetry.record(&page.url, "profanity", total as f64);

    Ok(rescale(total as f64, MAX_PROFANITY, 0.0))
}

#[derive(Debug, Default, Clone, Copy)]
struct EmotionTally {
    count: usize,
    intensity: f64,
}

/// Summed emotion intensity per text word; 1.0 for neutral wording, 0.0 once the
/// average word carries 1/[`EMOTION_INTENSITY_MULTIPLIER`] intensity.
pub fn evaluate_emotional_words(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let mut per_emotion: BTreeMap<&str, EmotionTally> = BTreeMap::new();

    for word in &page.text_words {
        let Some(emotions) = EMOTIONS.get(word.to_lowercase().as_str()) else {
            continue;
        };
        for (emotion, &intensity) in emotions {
            if intensity > 0.0 {
                let tally = per_emotion.entry(emotion.as_str()).or_default();
                tally.count += 1;
                tally.intensity += intensity;
            }
        }
    }

    let total_intensity: f64 = per_emotion.values().map(|t| t.intensity).sum();
    let total_count: usize = per_emotion.values().map(|t| t.count).sum();
    let per_word = ratio(total_intensity, page.text_words.len() as f64);

    debug!(
        target: "signals",
        url = %page.url,
        words = total_count,
        intensity = total_intensity,
        per_word,
        "emotionality"
    );
    for (emotion, tally) in &per_emotion {
        telemetry.record(&page.url, &format!("{emotion}_word_count"), tally.count as f64);
        telemetry.record(&page.url, &format!("{emotion}_intensity"), tally.intensity);
    }

    Ok(rescale(per_word * EMOTION_INTENSITY_MULTIPLIER, 1.0, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::{NoopTelemetry, StatsCollector};

    fn page(headline: &str, text: &str) -> PageData {
        PageData::new("https://example.org/a", "<p></p>", headline, text, vec![])
    }

    #[test]
    fn lexicons_load() {
        assert!(EMOTIONS.len() > 50);
        assert!(PROFANITY.is_match("what the fuck"));
        assert!(!PROFANITY.is_match("scrapbook classic"));
    }

    #[test]
    fn profanity_scales_to_zero() {
        let stats = StatsCollector::new();
        let p = page("Damn", "This is shit. Total bullshit, honestly.");
        assert_eq!(evaluate_profanity(&p, &stats).unwrap(), 0.0);
        assert_eq!(stats.get(&p.url, "profanity"), Some(3.0));

        let p = page("Budget", "The shitty plan was approved on Monday by the council.");
        let s = evaluate_profanity(&p, &NoopTelemetry).unwrap();
        assert!((s - 2.0 / 3.0).abs() < 1e-9, "{s}");

        let p = page("Budget", "The council approved the plan.");
        assert_eq!(evaluate_profanity(&p, &NoopTelemetry).unwrap(), 1.0);
    }

    #[test]
    fn emotional_wording_scores_lower() {
        let calm = page("", "The committee published its quarterly report on regional rail services today.");
        assert_eq!(evaluate_emotional_words(&calm, &NoopTelemetry).unwrap(), 1.0);

        let loaded = page("", "Horror and terror: a shocking massacre, a devastating tragedy of violence.");
        let s = evaluate_emotional_words(&loaded, &NoopTelemetry).unwrap();
        assert_eq!(s, 0.0);
    }
}
