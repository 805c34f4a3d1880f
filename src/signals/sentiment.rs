//! Lexicon-based sentiment: polarity of text and headline, subjectivity of text.

use std::collections::HashMap;

use anyhow::Result;
use once_cell::sync::Lazy;
use tracing::debug;

use super::rescale;
use crate::page::PageData;
use crate::telemetry::TelemetrySink;

/// Compound polarity mapped to 0 at the lower and 1 at the upper limit.
pub const POLARITY_LIMITS_TEXT: (f64, f64) = (-0.5, 0.75);
/// Headline negativity share: 0 (best) to 1 (worst).
pub const POLARITY_LIMITS_TITLE: (f64, f64) = (0.0, 1.0);
/// Mean subjectivity: the upper limit scores 0, the lower one scores 1.
pub const SUBJECTIVITY_LIMITS: (f64, f64) = (0.4, 0.7);

/// Compound normalisation constant (approximate max expected sum).
const NORMALIZATION_ALPHA: f64 = 15.0;

static LEXICON: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let raw = include_str!("../../data/sentiment_lexicon.json");
    serde_json::from_str::<HashMap<String, i32>>(raw).expect("valid sentiment lexicon")
});

static SUBJECTIVITY: Lazy<HashMap<String, f64>> = Lazy::new(|| {
    let raw = include_str!("../../data/subjectivity_lexicon.json");
    serde_json::from_str::<HashMap<String, f64>>(raw).expect("valid subjectivity lexicon")
});

/// Valence totals for one passage.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Polarity {
    /// Sum of (negation-adjusted) valences.
    pub sum: i32,
    pub positive: f64,
    pub negative: f64,
    pub neutral_tokens: usize,
}

impl Polarity {
    /// Sum squashed into `(-1, 1)`.
    pub fn compound(&self) -> f64 {
        let s = self.sum as f64;
        s / (s * s + NORMALIZATION_ALPHA).sqrt()
    }

    /// Share of negative intensity among all tokens.
    pub fn negative_share(&self) -> f64 {
        let total = self.positive + self.negative + self.neutral_tokens as f64;
        if total > 0.0 {
            self.negative / total
        } else {
            0.0
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SentimentAnalyzer;

impl SentimentAnalyzer {
    pub fn new() -> Self {
        Self
    }

    #[inline]
    fn word_score(&self, w: &str) -> i32 {
        *LEXICON.get(w).unwrap_or(&0)
    }

    /// Negation: a negator within the previous 1..=3 tokens flips a word's valence.
    pub fn polarity(&self, text: &str) -> Polarity {
        let tokens: Vec<String> = tokenize(text).collect();
        let mut out = Polarity::default();

        for i in 0..tokens.len() {
            let base = self.word_score(&tokens[i]);
            if base == 0 {
                out.neutral_tokens += 1;
                continue;
            }
            let negated = (1..=3).any(|k| i >= k && is_negator(&tokens[i - k]));
            let adj = if negated { -base } else { base };
            out.sum += adj;
            if adj > 0 {
                out.positive += adj as f64;
            } else {
                out.negative += adj.unsigned_abs() as f64;
            }
        }
        out
    }

    /// Mean subjectivity over words found in the subjectivity lexicon; 0 with no hits.
    pub fn subjectivity(&self, text: &str) -> f64 {
        let (sum, hits) = tokenize(text)
            .filter_map(|t| SUBJECTIVITY.get(&t).copied())
            .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
        if hits == 0 {
            0.0
        } else {
            sum / hits as f64
        }
    }
}

/// Lowercase alphanumeric tokens; apostrophes stay inside words ("isn't").
fn tokenize(s: &str) -> impl Iterator<Item = String> + '_ {
    s.split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '\u{2019}'))
        .map(|t| t.trim_matches(['\'', '\u{2019}']))
        .filter(|t| !t.is_empty())
        .map(|t| t.replace('\u{2019}', "'").to_lowercase())
}

fn is_negator(tok: &str) -> bool {
    matches!(
        tok,
        "not"
            | "no"
            | "never"
            | "isn't"
            | "wasn't"
            | "aren't"
            | "won't"
            | "can't"
            | "cannot"
            | "don't"
            | "doesn't"
            | "didn't"
            | "without"
    )
}

/// Text compound polarity; negative text scores low.
pub fn evaluate_polarity_text(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let polarity = SentimentAnalyzer::new().polarity(&page.text);
    let compound = polarity.compound();
    debug!(target: "signals", url = %page.url, ?polarity, compound, "text polarity");
    telemetry.record(&page.url, "sentiment_text_compound", compound);
    telemetry.record(&page.url, "negativity_text", polarity.negative_share());

    let (worst, best) = POLARITY_LIMITS_TEXT;
    Ok(rescale(compound, worst, best))
}

/// 1 minus the headline's negative share; an empty headline scores 0.
pub fn evaluate_polarity_title(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    if !page.has_headline() {
        telemetry.record(&page.url, "negativity_title", -10.0);
        return Ok(0.0);
    }
    let polarity = SentimentAnalyzer::new().polarity(&page.headline);
    let negativity = polarity.negative_share();
    debug!(target: "signals", url = %page.url, ?polarity, negativity, "title polarity");
    telemetry.record(&page.url, "negativity_title", negativity);

    let (best, worst) = POLARITY_LIMITS_TITLE;
    Ok(rescale(negativity, worst, best))
}

/// Objective wording scores 1, strongly opinionated wording 0.
pub fn evaluate_subjectivity(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let subjectivity = SentimentAnalyzer::new().subjectivity(&page.text);
    debug!(target: "signals", url = %page.url, subjectivity, "subjectivity");
    telemetry.record(&page.url, "subjectivity", subjectivity);

    let (best, worst) = SUBJECTIVITY_LIMITS;
    Ok(rescale(subjectivity, worst, best))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::NoopTelemetry;

    fn page(headline: &str, text: &str) -> PageData {
        PageData::new("https://example.org/a", "<p></p>", headline, text, vec![])
    }

    #[test]
    fn lexicons_load() {
        assert!(LEXICON.len() > 100);
        assert!(SUBJECTIVITY.len() > 50);
    }

    #[test]
    fn negation_flips_valence() {
        let a = SentimentAnalyzer::new();
        assert!(a.polarity("This is good").sum > 0);
        assert!(a.polarity("This is not good").sum < 0);
        assert!(a.polarity("It wasn't really that good").sum < 0);
        assert!(a.polarity("It isn\u{2019}t good").sum < 0);
    }

    #[test]
    fn compound_is_bounded() {
        let p = Polarity { sum: 400, ..Polarity::default() };
        assert!(p.compound() < 1.0 && p.compound() > 0.99);
        assert_eq!(Polarity::default().compound(), 0.0);
    }

    #[test]
    fn text_polarity_direction() {
        let good = page("", "The recovery was a great success and residents were happy and grateful.");
        let bad = page("", "The attack was a horrible tragedy, a terrible disaster and a shocking crime.");
        let g = evaluate_polarity_text(&good, &NoopTelemetry).unwrap();
        let b = evaluate_polarity_text(&bad, &NoopTelemetry).unwrap();
        assert_eq!(g, 1.0);
        assert_eq!(b, 0.0);
    }

    #[test]
    fn title_negativity() {
        let p = page("Council approves new library", "Text.");
        assert_eq!(evaluate_polarity_title(&p, &NoopTelemetry).unwrap(), 1.0);
        let p = page("Horrible tragedy", "Text.");
        assert_eq!(evaluate_polarity_title(&p, &NoopTelemetry).unwrap(), 0.0);
        let p = page("", "Text.");
        assert_eq!(evaluate_polarity_title(&p, &NoopTelemetry).unwrap(), 0.0);
    }

    #[test]
    fn subjectivity_direction() {
        let objective = page("", "The federal agency published its annual report on national rail services.");
        let opinion = page("", "Honestly, this is the most awesome, totally incredible and absolutely perfect idea.");
        assert_eq!(evaluate_subjectivity(&objective, &NoopTelemetry).unwrap(), 1.0);
        assert_eq!(evaluate_subjectivity(&opinion, &NoopTelemetry).unwrap(), 0.0);
    }
}
