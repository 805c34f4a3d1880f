//! Clickbait detection on the headline.
//!
//! A feature-weighted heuristic classifier: each feature adds (or removes)
//! points and a headline at or above [`CLICKBAIT_THRESHOLD`] is clickbait.

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use crate::page::PageData;
use crate::telemetry::TelemetrySink;

pub const CLICKBAIT_THRESHOLD: f64 = 1.5;

const QUESTION_STARTERS: &[&str] = &[
    "who", "what", "where", "why", "when", "whose", "whom", "would", "will", "how", "which",
    "should", "could", "did", "do",
];

/// Stock phrases of curiosity-gap headlines.
const BAIT_PHRASES: &[&str] = &[
    "you won't believe",
    "you wont believe",
    "will blow your mind",
    "what happened next",
    "this is why",
    "here's why",
    "heres why",
    "you need to",
    "things you",
    "reasons why",
    "can't stop",
    "goes viral",
    "jaw-dropping",
    "jaw dropping",
    "before you die",
    "will make you",
    "you should",
    "we can't even",
    "the internet is",
    "you'll never",
    "this one",
    "ways to",
    "most amazing",
    "mind-blowing",
    "what happens when",
];

/// Intensifiers typical for bait; each hit counts once.
const BAIT_WORDS: &[&str] = &[
    "shocking", "insane", "epic", "omg", "wtf", "literally", "unbelievable", "amazing",
    "hilarious", "adorable", "genius", "awesome",
];

static LEADING_NUMBER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[1-9]\d*\b").expect("leading number regex"));
static SHOUTED: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{3,}\b").expect("shouting regex"));

/// Points per feature, for logging and tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClickbaitFeatures {
    pub question: bool,
    pub exclamation: bool,
    pub starts_with_number: bool,
    pub second_person: bool,
    pub shouting: bool,
    pub phrase_hits: usize,
    pub word_hits: usize,
    pub word_count: usize,
}

impl ClickbaitFeatures {
    pub fn extract(headline: &str) -> Self {
        let cleaned = headline
            .replace(['\u{2019}', '\u{2018}'], "'")
            .to_lowercase();
        let words: Vec<&str> = cleaned
            .split(|c: char| !(c.is_alphanumeric() || c == '\'' || c == '-'))
            .filter(|w| !w.is_empty())
            .collect();
        let first = words.first().copied().unwrap_or_default();

        Self {
            question: cleaned.contains('?') || QUESTION_STARTERS.contains(&first),
            exclamation: cleaned.contains('!'),
            starts_with_number: LEADING_NUMBER.is_match(headline.trim_start()),
            second_person: words.iter().any(|w| matches!(*w, "you" | "your" | "you're" | "you'll")),
            shouting: SHOUTED.find_iter(headline).count() >= 2,
            phrase_hits: BAIT_PHRASES.iter().filter(|p| cleaned.contains(*p)).count(),
            word_hits: BAIT_WORDS.iter().filter(|b| words.contains(*b)).count(),
            word_count: words.len(),
        }
    }

    pub fn points(&self) -> f64 {
        let mut points = 0.0;
        if self.starts_with_number {
            points += 1.0;
        }
        if self.question {
            points += 0.75;
        }
        if self.exclamation {
            points += 0.75;
        }
        if self.second_person {
            points += 0.5;
        }
        if self.shouting {
            points += 0.5;
        }
        points += 1.5 * self.phrase_hits as f64;
        points += 0.75 * self.word_hits as f64;
        // long descriptive headlines read like news
        if self.word_count > 14 {
            points -= 0.5;
        }
        points
    }
}

pub fn is_clickbait(headline: &str) -> bool {
    ClickbaitFeatures::extract(headline).points() >= CLICKBAIT_THRESHOLD
}

/// 0 if the headline is clickbait, 1 otherwise (including an empty headline).
pub fn evaluate_clickbait(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    if !page.has_headline() {
        return Ok(1.0);
    }
    let features = ClickbaitFeatures::extract(&page.headline);
    let points = features.points();
    debug!(target: "signals", url = %page.url, ?features, points, "clickbait features");
    telemetry.record(&page.url, "clickbait_points", points);
    Ok(if points >= CLICKBAIT_THRESHOLD { 0.0 } else { 1.0 })
}
