//! # Page Data
//! The immutable record every signal evaluator reads.
//!
//! A `PageData` is built once per evaluation by a parser and then only borrowed.
//! `check_parsed` is the gate between the parser and the signal registry: pages
//! that fail it never reach an evaluator.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::parse::tokenize::{sent_tokenize, word_tokenize};

/// Body text shorter than this (in characters) counts as unparseable.
pub const DEFAULT_MIN_TEXT_LENGTH: usize = 50;
/// The word count must be strictly above this floor.
pub const DEFAULT_MIN_WORD_FLOOR: usize = 5;

/// Parsed representation of one web page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageData {
    pub url: String,
    pub html: String,
    /// May be empty; headline-dependent signals are zero-weighted then.
    pub headline: String,
    pub text: String,
    pub authors: Vec<String>,
    pub text_sentences: Vec<String>,
    pub text_words: Vec<String>,
}

impl PageData {
    /// Build a page and derive sentence/word tokens from `text`.
    pub fn new(
        url: impl Into<String>,
        html: impl Into<String>,
        headline: impl Into<String>,
        text: impl Into<String>,
        authors: Vec<String>,
    ) -> Self {
        let text = text.into();
        let text_sentences = sent_tokenize(&text);
        let text_words = word_tokenize(&text);
        Self {
            url: url.into(),
            html: html.into(),
            headline: headline.into(),
            text,
            authors,
            text_sentences,
            text_words,
        }
    }

    /// Build a page from tokens produced elsewhere.
    pub fn with_tokens(
        url: impl Into<String>,
        html: impl Into<String>,
        headline: impl Into<String>,
        text: impl Into<String>,
        authors: Vec<String>,
        text_sentences: Vec<String>,
        text_words: Vec<String>,
    ) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            headline: headline.into(),
            text: text.into(),
            authors,
            text_sentences,
            text_words,
        }
    }

    pub fn has_headline(&self) -> bool {
        !self.headline.trim().is_empty()
    }

    /// URL host without a leading `www.`; `None` if the URL has no resolvable host.
    pub fn host(&self) -> Option<String> {
        host_of(&self.url)
    }
}

/// Host of an absolute URL, lowercased, without a leading `www.`.
pub fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_ascii_lowercase();
    let host = host.strip_prefix("www.").map(str::to_string).unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host)
    }
}

/// Minimum structural requirements a page has to meet to be scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseLimits {
    pub min_text_length: usize,
    pub min_word_floor: usize,
}

impl Default for ParseLimits {
    fn default() -> Self {
        Self {
            min_text_length: DEFAULT_MIN_TEXT_LENGTH,
            min_word_floor: DEFAULT_MIN_WORD_FLOOR,
        }
    }
}

/// Why a page never reached the signal registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseFailure {
    #[error("not a valid http(s) address: {0}")]
    InvalidUrl(String),
    #[error("no page data returned by parser")]
    Absent,
    #[error("page has no url")]
    MissingUrl,
    #[error("page has no html")]
    MissingHtml,
    #[error("text too short: {len} chars (min {min})")]
    TextTooShort { len: usize, min: usize },
    #[error("text could not be split into sentences")]
    NoSentences,
    #[error("too few words: {count} (must exceed {floor})")]
    TooFewWords { count: usize, floor: usize },
}

/// ParseCheck: validate a parser result before any evaluator sees it.
pub fn check_parsed(page: Option<&PageData>, limits: &ParseLimits) -> Result<(), ParseFailure> {
    let page = page.ok_or(ParseFailure::Absent)?;

    if page.url.trim().is_empty() {
        return Err(ParseFailure::MissingUrl);
    }
    if page.html.trim().is_empty() {
        return Err(ParseFailure::MissingHtml);
    }

    let len = page.text.chars().count();
    if len < limits.min_text_length {
        return Err(ParseFailure::TextTooShort {
            len,
            min: limits.min_text_length,
        });
    }
    if page.text_sentences.is_empty() {
        return Err(ParseFailure::NoSentences);
    }
    if page.text_words.len() <= limits.min_word_floor {
        return Err(ParseFailure::TooFewWords {
            count: page.text_words.len(),
            floor: limits.min_word_floor,
        });
    }
    Ok(())
}
