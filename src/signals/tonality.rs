//! Tonality: punctuation and capitalisation habits of headline and body.

use std::collections::BTreeMap;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::{ratio, rescale};
use crate::page::PageData;
use crate::telemetry::TelemetrySink;

/// Question marks per sentence at which the text score reaches 0.
pub const QUESTIONS_LIMIT: f64 = 0.15;
/// Exclamation marks per sentence at which the text score reaches 0.
pub const EXCLAMATIONS_LIMIT: f64 = 0.05;
/// All-caps words in the headline at which the score reaches 0.
pub const ALL_CAPS_MAX_TITLE: f64 = 2.0;
/// All-caps words in the body at which the score reaches 0.
pub const ALL_CAPS_MAX_TEXT: f64 = 10.0;

static ALL_CAPS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]+\b").expect("all-caps regex"));

fn per_sentence(page: &PageData, mark: char) -> f64 {
    let count = page.text.matches(mark).count() as f64;
    ratio(count, page.text_sentences.len() as f64)
}

pub fn evaluate_questions_text(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let per = per_sentence(page, '?');
    debug!(target: "signals", url = %page.url, per_sentence = per, "question marks");
    telemetry.record(&page.url, "questions_text_per_sentence", per);
    Ok(rescale(per, QUESTIONS_LIMIT, 0.0))
}

/// 0 if the headline contains a question mark, else 1.
pub fn evaluate_questions_title(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let n = page.headline.matches('?').count();
    telemetry.record(&page.url, "questions_title", n as f64);
    Ok(if n > 0 { 0.0 } else { 1.0 })
}

pub fn evaluate_exclamations_text(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let per = per_sentence(page, '!');
    debug!(target: "signals", url = %page.url, per_sentence = per, "exclamation marks");
    telemetry.record(&page.url, "exclamations_text_per_sentence", per);
    Ok(rescale(per, EXCLAMATIONS_LIMIT, 0.0))
}

/// 0 if the headline contains an exclamation mark, else 1.
pub fn evaluate_exclamations_title(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let n = page.headline.matches('!').count();
    telemetry.record(&page.url, "exclamations_title", n as f64);
    Ok(if n > 0 { 0.0 } else { 1.0 })
}

/// Empty headlines count as fully capitalised.
fn headline_fully_capitalised(headline: &str) -> bool {
    headline.to_uppercase() == headline
}

/// All-caps words (>= 2 letters) seen in headline and text.
///
/// A word that occurs more than once across headline and text is taken for an
/// acronym and marked `false` in both tallies; only `true` entries are shouting.
struct CapsTally<'a> {
    headline: BTreeMap<&'a str, bool>,
    text: BTreeMap<&'a str, bool>,
}

impl<'a> CapsTally<'a> {
    fn collect(page: &'a PageData) -> Self {
        let mut headline = BTreeMap::new();
        let mut text = BTreeMap::new();

        if !headline_fully_capitalised(&page.headline) {
            for m in ALL_CAPS.find_iter(&page.headline) {
                let word = m.as_str();
                if word.len() < 2 {
                    continue;
                }
                let seen = headline.contains_key(word);
                headline.insert(word, !seen);
            }
        }

        for m in ALL_CAPS.find_iter(&page.text) {
            let word = m.as_str();
            if word.len() < 2 {
                continue;
            }
            if headline.contains_key(word) || text.contains_key(word) {
                headline.insert(word, false);
                text.insert(word, false);
            } else {
                text.insert(word, true);
            }
        }

        Self { headline, text }
    }

    fn shouted(map: &BTreeMap<&'a str, bool>) -> Vec<&'a str> {
        map.iter().filter(|(_, &v)| v).map(|(&w, _)| w).collect()
    }
}

pub fn evaluate_all_caps_text(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let tally = CapsTally::collect(page);
    let words = CapsTally::shouted(&tally.text);
    if !words.is_empty() {
        info!(target: "signals", url = %page.url, words = ?words, "all-caps words in text");
    }
    telemetry.record(&page.url, "all_caps_text", words.len() as f64);
    Ok(rescale(words.len() as f64, ALL_CAPS_MAX_TEXT, 0.0))
}

/// A fully capitalised (or empty) headline scores 1 and is recorded as -1.
pub fn evaluate_all_caps_title(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    if headline_fully_capitalised(&page.headline) {
        telemetry.record(&page.url, "all_caps_title", -1.0);
        return Ok(1.0);
    }
    let tally = CapsTally::collect(page);
    let words = CapsTally::shouted(&tally.headline);
    if !words.is_empty() {
        info!(target: "signals", url = %page.url, words = ?words, "all-caps words in title");
    }
    telemetry.record(&page.url, "all_caps_title", words.len() as f64);
    Ok(rescale(words.len() as f64, ALL_CAPS_MAX_TITLE, 0.0))
}
