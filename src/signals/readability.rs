//! Readability grades and text-length measures.
//!
//! Higher text complexity counts as more credible, with the best score reached
//! around an 11th-grade reading level.

use anyhow::Result;
use tracing::{debug, info};

use super::{ratio, rescale};
use crate::page::PageData;
use crate::telemetry::TelemetrySink;

pub const WORDS_TEXT_LOWER: f64 = 300.0;
pub const WORDS_TEXT_UPPER: f64 = 900.0;
pub const WLENGTH_TEXT_LOWER: f64 = 4.0;
pub const WLENGTH_TEXT_UPPER: f64 = 8.0;

/// Raw counts a readability formula needs.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextCounts {
    pub sentences: f64,
    pub words: f64,
    pub syllables: f64,
    /// Letters and digits inside words.
    pub characters: f64,
    /// Words with three or more syllables.
    pub polysyllables: f64,
}

impl TextCounts {
    pub fn from_sentences(sentences: &[String]) -> Self {
        let mut counts = Self {
            sentences: sentences.len() as f64,
            ..Self::default()
        };
        for sentence in sentences {
            for word in sentence
                .split(|c: char| !(c.is_alphanumeric() || c == '\''))
                .filter(|w| w.chars().any(char::is_alphabetic))
            {
                let syl = syllables(word);
                counts.words += 1.0;
                counts.syllables += syl as f64;
                counts.characters += word.chars().filter(|c| c.is_alphanumeric()).count() as f64;
                if syl >= 3 {
                    counts.polysyllables += 1.0;
                }
            }
        }
        counts
    }

    fn words_per_sentence(&self) -> f64 {
        ratio(self.words, self.sentences)
    }

    fn syllables_per_word(&self) -> f64 {
        ratio(self.syllables, self.words)
    }
}

/// The six standard grade formulas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grades {
    pub flesch_kincaid: f64,
    pub flesch_reading_ease: f64,
    pub gunning_fog: f64,
    pub smog: f64,
    pub ari: f64,
    pub coleman_liau: f64,
}

impl Grades {
    pub fn compute(c: &TextCounts) -> Self {
        let wps = c.words_per_sentence();
        let spw = c.syllables_per_word();
        let letters_per_100 = ratio(c.characters, c.words) * 100.0;
        let sentences_per_100 = ratio(c.sentences, c.words) * 100.0;
        Self {
            flesch_kincaid: 0.39 * wps + 11.8 * spw - 15.59,
            flesch_reading_ease: 206.835 - 1.015 * wps - 84.6 * spw,
            gunning_fog: 0.4 * (wps + 100.0 * ratio(c.polysyllables, c.words)),
            smog: 1.043 * (c.polysyllables * ratio(30.0, c.sentences)).sqrt() + 3.1291,
            ari: 4.71 * ratio(c.characters, c.words) + 0.5 * wps - 21.43,
            coleman_liau: 0.0588 * letters_per_100 - 0.296 * sentences_per_100 - 15.8,
        }
    }

    /// Each grade mapped to `[0, 1]` complexity, 1 = complex.
    pub fn complexity(&self) -> [f64; 6] {
        [
            (11.0 - self.flesch_kincaid) / 10.0,
            1.0 - (100.0 - self.flesch_reading_ease) / 50.0,
            (11.0 - self.gunning_fog) / 10.0,
            (16.0 - self.smog) / 11.0,
            (11.0 - self.ari) / 10.0,
            (11.0 - self.coleman_liau) / 10.0,
        ]
        .map(|ease| 1.0 - ease.clamp(0.0, 1.0))
    }
}

/// Vowel-group syllable estimate; never below 1.
pub fn syllables(word: &str) -> usize {
    let w: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();
    if w.is_empty() {
        return 0;
    }
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');
    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &w {
        let v = is_vowel(c);
        if v && !prev_vowel {
            count += 1;
        }
        prev_vowel = v;
    }
    let n = w.len();
    // silent trailing e, but not "-le" as in "table"
    if n > 2 && w[n - 1] == 'e' && !is_vowel(w[n - 2]) && !(w[n - 2] == 'l' && !is_vowel(w[n - 3])) {
        count -= 1;
    }
    count.max(1)
}

/// Lower median of the six complexity-mapped grades.
pub fn evaluate_readability_grades(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let counts = TextCounts::from_sentences(&page.text_sentences);
    if counts.words == 0.0 || counts.sentences == 0.0 {
        return Ok(0.5);
    }
    let grades = Grades::compute(&counts);
    debug!(target: "signals", url = %page.url, ?grades, "readability grades");

    for (field, value) in [
        ("read_text_flesch_kincaid", grades.flesch_kincaid),
        ("read_text_flesch_read_ease", grades.flesch_reading_ease),
        ("read_text_gunning_fog", grades.gunning_fog),
        ("read_text_smog", grades.smog),
        ("read_text_ari", grades.ari),
        ("read_text_coleman_liau", grades.coleman_liau),
    ] {
        telemetry.record(&page.url, field, value);
    }

    let mut scores = grades.complexity();
    scores.sort_by(|a, b| a.total_cmp(b));
    info!(target: "signals", url = %page.url, ?scores, "readability scores");
    Ok(scores[2])
}

/// Mean of a word-count score and a mean-word-length score; longer is better.
pub fn evaluate_text_lengths(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let words: Vec<&String> = page
        .text_words
        .iter()
        .filter(|w| w.chars().any(char::is_alphanumeric))
        .collect();
    let count = words.len() as f64;
    let mean_len = ratio(
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64,
        count,
    );

    telemetry.record(&page.url, "word_count_text", count);
    telemetry.record(&page.url, "word_length_text", mean_len);
    debug!(target: "signals", url = %page.url, count, mean_len, "text lengths");

    let count_score = rescale(count, WORDS_TEXT_LOWER, WORDS_TEXT_UPPER);
    let length_score = rescale(mean_len, WLENGTH_TEXT_LOWER, WLENGTH_TEXT_UPPER);
    Ok((count_score + length_score) / 2.0)
}
