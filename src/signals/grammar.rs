//! Grammar and spelling.
//!
//! A small rule-based proofreader. Every rule match is one error; the error
//! count is scaled by word count and mapped linearly onto `[0, 1]`.
//!
//! Rules:
//! - repeated word ("the the")
//! - sentence starting with a lowercase letter (after a full stop that is not an abbreviation)
//! - standalone lowercase "i"
//! - missing space after `,` `;` or a sentence-ending period
//! - whitespace before `,` `;` `:` `!` `?`
//! - doubled separators (`,,` `;;` `::`)
//! - article mismatch ("a apple", "an car")
//! - common misspellings, penalised once per distinct word

use std::collections::HashSet;

use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use super::rescale;
use crate::page::PageData;
use crate::parse::tokenize::{word_tokenize, ABBREVIATIONS};
use crate::telemetry::TelemetrySink;

/// Errors per word at which the score reaches 0.
pub const ERROR_LIMIT: f64 = 0.2;

static MISSING_SPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[a-z][,;][A-Za-z]|[a-z]{2}\.[A-Z][a-z]").expect("missing-space regex")
});
static SPACE_BEFORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\w[ \t]+[,;:!?]").expect("space-before regex"));
static DOUBLED: Lazy<Regex> = Lazy::new(|| Regex::new(r",,|;;|::").expect("doubled regex"));
static LOWER_START: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([a-z]{2,})[.!?][ \t]+[a-z]").expect("sentence-start regex"));
static LOWER_I: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|\s)i(?:\s|'[a-z])").expect("lowercase-i regex"));

/// Frequent misspellings; the value is never used for correction.
const MISSPELLINGS: &[&str] = &[
    "accomodate", "acheive", "adress", "alot", "arguement", "begining", "beleive",
    "calender", "commited", "definately", "definatly", "enviroment", "existance",
    "foward", "goverment", "happend", "independant", "neccessary", "noticable",
    "occured", "occurence", "persue", "posession", "publically", "recieve",
    "reccomend", "seperate", "succesful", "teh", "thier", "tommorow", "truely",
    "untill", "wich", "wierd", "whitch",
];

/// Words allowed to appear twice in a row.
const REPEAT_OK: &[&str] = &["had", "that", "is", "bye", "very"];

/// Vowel-initial words that take "a".
const A_BEFORE_VOWEL: &[&str] = &["uni", "use", "usu", "uti", "eu", "one", "once", "ur"];
/// Consonant-initial words that take "an".
const AN_BEFORE_CONSONANT: &[&str] = &["hour", "honest", "honor", "honour", "heir"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    RepeatedWord,
    LowercaseSentenceStart,
    LowercaseI,
    MissingSpace,
    SpaceBeforePunctuation,
    DoubledPunctuation,
    ArticleMismatch,
    Spelling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    pub kind: IssueKind,
    pub excerpt: String,
}

impl Issue {
    fn new(kind: IssueKind, excerpt: impl Into<String>) -> Self {
        Self {
            kind,
            excerpt: excerpt.into(),
        }
    }
}

/// Collects issues over several passages; a misspelt word is reported once.
#[derive(Debug, Default)]
pub struct Proofreader {
    issues: Vec<Issue>,
    unknown_words: HashSet<String>,
}

impl Proofreader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Word-level rules only. Used for headlines, which are not sentences.
    pub fn check_words(&mut self, passage: &str) {
        let words: Vec<String> = word_tokenize(passage);
        let lower: Vec<String> = words.iter().map(|w| w.to_lowercase()).collect();

        for pair in lower.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a == b && a.chars().all(char::is_alphabetic) && !REPEAT_OK.contains(&a.as_str()) {
                self.issues
                    .push(Issue::new(IssueKind::RepeatedWord, format!("{a} {b}")));
            }
        }

        for (i, pair) in lower.windows(2).enumerate() {
            let next_raw = &words[i + 1];
            // acronyms follow pronunciation, skip them
            if next_raw.len() > 1 && next_raw.chars().all(|c| c.is_ascii_uppercase()) {
                continue;
            }
            if article_mismatch(&pair[0], &pair[1]) {
                self.issues.push(Issue::new(
                    IssueKind::ArticleMismatch,
                    format!("{} {}", pair[0], pair[1]),
                ));
            }
        }

        for w in &lower {
            if MISSPELLINGS.contains(&w.as_str()) && self.unknown_words.insert(w.clone()) {
                self.issues.push(Issue::new(IssueKind::Spelling, w.clone()));
            }
        }
    }

    /// All rules.
    pub fn check_text(&mut self, passage: &str) {
        self.check_words(passage);

        let first = passage.chars().find(|c| c.is_alphanumeric());
        if first.map_or(false, char::is_lowercase) {
            let excerpt: String = passage.chars().take(24).collect();
            self.issues
                .push(Issue::new(IssueKind::LowercaseSentenceStart, excerpt));
        }
        for caps in LOWER_START.captures_iter(passage) {
            if !ABBREVIATIONS.contains(&&caps[1]) {
                self.issues
                    .push(Issue::new(IssueKind::LowercaseSentenceStart, &caps[0]));
            }
        }

        let regex_rules: [(&Regex, IssueKind); 4] = [
            (&*LOWER_I, IssueKind::LowercaseI),
            (&*MISSING_SPACE, IssueKind::MissingSpace),
            (&*SPACE_BEFORE, IssueKind::SpaceBeforePunctuation),
            (&*DOUBLED, IssueKind::DoubledPunctuation),
        ];
        for (re, kind) in regex_rules {
            for m in re.find_iter(passage) {
                self.issues.push(Issue::new(kind.clone(), m.as_str().trim()));
            }
        }
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}

fn article_mismatch(article: &str, next: &str) -> bool {
    let Some(initial) = next.chars().next() else {
        return false;
    };
    if !initial.is_alphabetic() {
        return false;
    }
    let vowel = matches!(initial, 'a' | 'e' | 'i' | 'o' | 'u');
    match article {
        "a" => vowel && !A_BEFORE_VOWEL.iter().any(|p| next.starts_with(p)),
        "an" => !vowel && !AN_BEFORE_CONSONANT.iter().any(|p| next.starts_with(p)),
        _ => false,
    }
}

/// Word count over headline and text; standalone punctuation does not count.
fn word_count(page: &PageData) -> usize {
    let count = |s: &str| {
        s.split_whitespace()
            .filter(|t| t.chars().any(char::is_alphanumeric))
            .count()
    };
    count(&page.headline) + count(&page.text)
}

pub fn evaluate_grammar_spelling(page: &PageData, telemetry: &dyn TelemetrySink) -> Result<f64> {
    let mut proofreader = Proofreader::new();
    if page.has_headline() {
        proofreader.check_words(&page.headline);
    }
    proofreader.check_text(&page.text);

    let errors = proofreader.issues().len();
    let words = word_count(page);
    for issue in proofreader.issues() {
        debug!(target: "signals", url = %page.url, kind = ?issue.kind, excerpt = %issue.excerpt, "language issue");
    }

    let per_word = if words == 0 {
        0.0
    } else {
        errors as f64 / words as f64
    };
    info!(target: "signals", url = %page.url, errors, words, per_word, "grammar/spelling");
    telemetry.record(&page.url, "grammar_spelling_errors", errors as f64);

    Ok(rescale(per_word, ERROR_LIMIT, 0.0))
}
