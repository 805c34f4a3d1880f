//! # Built-in Signals
//!
//! Each submodule implements one or more evaluators with the signature
//! `fn(&PageData, &dyn TelemetrySink) -> anyhow::Result<f64>`.
//!
//! Conventions shared by every evaluator:
//! - 1.0 means "more credible along this dimension", 0.0 means "less credible".
//! - Raw measurements (ratios, counts) are mapped with [`rescale`] between a
//!   documented worst-case and best-case limit and clamped to `[0, 1]`.
//! - Degenerate input (no headline, no sentences) yields a fixed neutral value,
//!   never an error.
//!
//! [`default_registry`] wires all of them, in a fixed order, together with their
//! default weight rules.

pub mod authors;
pub mod clickbait;
pub mod grammar;
pub mod links;
pub mod readability;
pub mod sentiment;
pub mod tonality;
pub mod url;
pub mod vocabulary;

use std::collections::BTreeMap;

use crate::registry::{RegistryError, SignalDefinition, SignalRegistry, WeightCurve, WeightRule};

pub const AUTHORS: &str = "authors";
pub const URL_DOMAIN_ENDING: &str = "url_domain_ending";
pub const GRAMMAR_SPELLING: &str = "grammar_spelling";
pub const QUESTIONS_TEXT: &str = "tonality_questions_text";
pub const QUESTIONS_TITLE: &str = "tonality_questions_title";
pub const EXCLAMATIONS_TEXT: &str = "tonality_exclamations_text";
pub const EXCLAMATIONS_TITLE: &str = "tonality_exclamations_title";
pub const ALL_CAPS_TEXT: &str = "tonality_all_caps_text";
pub const ALL_CAPS_TITLE: &str = "tonality_all_caps_title";
pub const READABILITY_GRADES: &str = "readability_grades";
pub const READABILITY_TEXT_LENGTHS: &str = "readability_text_lengths";
pub const PROFANITY: &str = "vocabulary_profanity";
pub const EMOTIONAL_WORDS: &str = "vocabulary_emotional_words";
pub const CLICKBAIT: &str = "clickbait";
pub const LINKS_EXTERNAL: &str = "links_external";
pub const POLARITY_TEXT: &str = "sentiment_polarity_text";
pub const POLARITY_TITLE: &str = "sentiment_polarity_title";
pub const SUBJECTIVITY: &str = "sentiment_subjectivity";

/// Clamped linear map: `worst` → 0.0, `best` → 1.0.
///
/// Works in either direction (`best < worst` for "less is better" ratios).
/// NaN input and a degenerate range map to 0.0.
pub fn rescale(value: f64, worst: f64, best: f64) -> f64 {
    let span = best - worst;
    if value.is_nan() || span == 0.0 || !span.is_finite() {
        return 0.0;
    }
    ((value - worst) / span).clamp(0.0, 1.0)
}

/// Ratio with a zero-safe denominator.
pub(crate) fn ratio(num: f64, den: f64) -> f64 {
    if den > 0.0 {
        num / den
    } else {
        0.0
    }
}

fn rule(curve: WeightCurve) -> WeightRule {
    WeightRule::new(curve)
}

/// All built-in signals with their default weight rules, in evaluation order.
pub fn builtin_signals() -> Vec<SignalDefinition> {
    // penalise bad tonality harder than rewarding good tonality
    let exclamations = || WeightCurve::above(&[(0.8, 0.2), (0.0, 0.3)], 0.45);
    let questions = || WeightCurve::above(&[(0.0, 0.2)], 0.3);
    let all_caps = || WeightCurve::above(&[(0.8, 0.0)], 0.3);

    vec![
        SignalDefinition::from_rule(
            AUTHORS,
            authors::evaluate_authors,
            rule(WeightCurve::constant(0.3)),
        ),
        SignalDefinition::from_rule(
            URL_DOMAIN_ENDING,
            url::evaluate_domain_ending,
            rule(WeightCurve::at_points(&[1.0], 0.2, 0.0)).host_only(),
        ),
        SignalDefinition::from_rule(
            GRAMMAR_SPELLING,
            grammar::evaluate_grammar_spelling,
            rule(WeightCurve::above(&[(0.8, 0.3)], 0.45)),
        ),
        SignalDefinition::from_rule(
            QUESTIONS_TEXT,
            tonality::evaluate_questions_text,
            rule(questions()),
        ),
        SignalDefinition::from_rule(
            QUESTIONS_TITLE,
            tonality::evaluate_questions_title,
            rule(questions()).headline_only(),
        ),
        SignalDefinition::from_rule(
            EXCLAMATIONS_TEXT,
            tonality::evaluate_exclamations_text,
            rule(exclamations()),
        ),
        SignalDefinition::from_rule(
            EXCLAMATIONS_TITLE,
            tonality::evaluate_exclamations_title,
            rule(exclamations()).headline_only(),
        ),
        SignalDefinition::from_rule(
            ALL_CAPS_TEXT,
            tonality::evaluate_all_caps_text,
            rule(all_caps()),
        ),
        SignalDefinition::from_rule(
            ALL_CAPS_TITLE,
            tonality::evaluate_all_caps_title,
            rule(all_caps()).headline_only(),
        ),
        SignalDefinition::from_rule(
            READABILITY_GRADES,
            readability::evaluate_readability_grades,
            rule(WeightCurve::constant(0.8)),
        ),
        SignalDefinition::from_rule(
            READABILITY_TEXT_LENGTHS,
            readability::evaluate_text_lengths,
            rule(WeightCurve::constant(0.6)),
        ),
        SignalDefinition::from_rule(
            PROFANITY,
            vocabulary::evaluate_profanity,
            rule(WeightCurve::at_points(&[1.0], 0.0, 1.0)),
        ),
        SignalDefinition::from_rule(
            EMOTIONAL_WORDS,
            vocabulary::evaluate_emotional_words,
            rule(WeightCurve::constant(0.6)),
        ),
        SignalDefinition::from_rule(
            CLICKBAIT,
            clickbait::evaluate_clickbait,
            rule(WeightCurve::above(&[(0.0, 0.3)], 0.8)).headline_only(),
        ),
        SignalDefinition::from_rule(
            LINKS_EXTERNAL,
            links::evaluate_links_external,
            rule(WeightCurve::at_points(&[0.0, 1.0], 0.3, 0.0)),
        ),
        SignalDefinition::from_rule(
            POLARITY_TEXT,
            sentiment::evaluate_polarity_text,
            rule(WeightCurve::constant(0.8)),
        ),
        SignalDefinition::from_rule(
            POLARITY_TITLE,
            sentiment::evaluate_polarity_title,
            rule(WeightCurve::constant(0.5)).headline_only(),
        ),
        SignalDefinition::from_rule(
            SUBJECTIVITY,
            sentiment::evaluate_subjectivity,
            rule(WeightCurve::constant(0.4)),
        ),
    ]
}

/// Registry of all built-in signals with default weights.
pub fn default_registry() -> Result<SignalRegistry, RegistryError> {
    default_registry_with(&BTreeMap::new())
}

/// Registry of all built-in signals, with weight rules replaced by `overrides`.
/// An override naming an unknown signal is a configuration error. Headline and
/// host gates of the built-in rules survive any override.
pub fn default_registry_with(
    overrides: &BTreeMap<String, WeightRule>,
) -> Result<SignalRegistry, RegistryError> {
    let mut registry = SignalRegistry::new();
    for signal in builtin_signals() {
        registry.register(signal)?;
    }
    for (name, rule) in overrides {
        registry.override_weight(name, rule.clone())?;
    }
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageData;

    #[test]
    fn rescale_both_directions() {
        assert_eq!(rescale(0.0, 0.15, 0.0), 1.0);
        assert_eq!(rescale(0.3, 0.15, 0.0), 0.0);
        assert!((rescale(0.075, 0.15, 0.0) - 0.5).abs() < 1e-12);
        assert!((rescale(0.125, -0.5, 0.75) - 0.5).abs() < 1e-12);
        assert_eq!(rescale(5.0, 0.0, 1.0), 1.0);
        assert_eq!(rescale(f64::NAN, 0.0, 1.0), 0.0);
        assert_eq!(rescale(1.0, 2.0, 2.0), 0.0);
    }

    #[test]
    fn default_registry_has_all_signals_in_order() {
        let reg = default_registry().unwrap();
        assert_eq!(reg.len(), 18);
        let names = reg.names();
        assert_eq!(names.first(), Some(&AUTHORS));
        assert_eq!(names.last(), Some(&SUBJECTIVITY));
    }

    #[test]
    fn unknown_override_fails_fast() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            "no_such_signal".to_string(),
            WeightRule::new(WeightCurve::constant(1.0)),
        );
        let err = default_registry_with(&overrides).unwrap_err();
        assert_eq!(err, RegistryError::UnknownSignal("no_such_signal".into()));
    }

    #[test]
    fn override_cannot_lift_headline_gate() {
        let mut overrides = BTreeMap::new();
        overrides.insert(
            POLARITY_TITLE.to_string(),
            WeightRule::new(WeightCurve::constant(2.0)),
        );
        let reg = default_registry_with(&overrides).unwrap();
        let weight = reg.get(POLARITY_TITLE).unwrap().weight_fn();

        let bare = PageData::new("https://example.org/a", "<p/>", "", "Some text.", vec![]);
        let titled = PageData::new("https://example.org/a", "<p/>", "Calm title", "Some text.", vec![]);
        assert_eq!(weight.weight(0.5, &bare), 0.0);
        assert_eq!(weight.weight(0.5, &titled), 2.0);
    }
}
