//! HTML → [`PageData`] extraction.
//!
//! Headline from `og:title` (falling back to `<title>`), body text from `<p>`
//! blocks that look like prose, authors from meta tags and JSON-LD.

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, error, info};

use super::clean_text;
use crate::page::{PageData, DEFAULT_MIN_WORD_FLOOR};

/// Paragraphs longer than this are always kept.
const LONG_PARAGRAPH: usize = 125;
/// Paragraphs longer than this are kept when they end with punctuation.
const SHORT_PARAGRAPH: usize = 40;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static css selector")
}

static OG_TITLE: Lazy<Selector> = Lazy::new(|| selector(r#"meta[property="og:title"]"#));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| selector("p"));
static META_AUTHOR: Lazy<Selector> =
    Lazy::new(|| selector(r#"meta[name="author"], meta[property="article:author"]"#));
static LD_JSON: Lazy<Selector> =
    Lazy::new(|| selector(r#"script[type="application/ld+json"]"#));

/// True if any of `. ! ? :` occurs within the last three characters.
pub fn has_ending_punctuation(text: &str) -> bool {
    text.chars()
        .rev()
        .take(3)
        .any(|c| matches!(c, '.' | '!' | '?' | ':'))
}

fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}

pub fn extract_headline(doc: &Html) -> String {
    doc.select(&OG_TITLE)
        .filter_map(|m| m.value().attr("content"))
        .map(clean_text)
        .find(|t| !t.is_empty())
        .or_else(|| doc.select(&TITLE).map(element_text).find(|t| !t.is_empty()))
        .unwrap_or_default()
}

/// Prose paragraphs joined by `\n`; empty if none qualify.
pub fn extract_text(doc: &Html, headline: &str) -> String {
    let mut paragraphs: Vec<String> = doc
        .select(&PARAGRAPH)
        .map(element_text)
        .filter(|p| !p.is_empty())
        .collect();

    if let Some(first) = paragraphs.first_mut() {
        if !headline.is_empty() {
            if let Some(rest) = first.strip_prefix(headline) {
                *first = rest.trim().to_string();
            }
        }
        // sub-titles often lack a full stop
        if !first.is_empty() && !has_ending_punctuation(first) {
            first.push('.');
        }
    }

    paragraphs
        .into_iter()
        .filter(|p| {
            let len = p.chars().count();
            len > LONG_PARAGRAPH || (len > SHORT_PARAGRAPH && has_ending_punctuation(p))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Author names from meta tags, then JSON-LD `author` entries. Duplicates dropped.
pub fn extract_authors(doc: &Html) -> Vec<String> {
    let mut authors: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        let name = clean_text(name);
        if !name.is_empty() && !authors.contains(&name) {
            authors.push(name);
        }
    };

    for meta in doc.select(&META_AUTHOR) {
        if let Some(content) = meta.value().attr("content") {
            push(content);
        }
    }

    for script in doc.select(&LD_JSON) {
        let raw: String = script.text().collect();
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => {
                for name in ld_json_authors(&value) {
                    push(name);
                }
            }
            Err(e) => debug!(target: "parsing", error = %e, "skipping malformed ld+json"),
        }
    }
    authors
}

/// `author.name` values of an ld+json object, an array of objects, or an `@graph`.
fn ld_json_authors(value: &Value) -> Vec<&str> {
    let mut out = Vec::new();
    match value {
        Value::Array(items) => {
            for item in items {
                out.extend(ld_json_authors(item));
            }
        }
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                out.extend(ld_json_authors(graph));
            }
            match map.get("author") {
                Some(Value::Object(author)) => {
                    out.extend(author.get("name").and_then(Value::as_str));
                }
                Some(Value::Array(list)) => {
                    for author in list {
                        match author {
                            Value::Object(a) => out.extend(a.get("name").and_then(Value::as_str)),
                            Value::String(s) => out.push(s.as_str()),
                            _ => {}
                        }
                    }
                }
                Some(Value::String(s)) => out.push(s.as_str()),
                _ => {}
            }
        }
        _ => {}
    }
    out
}

/// Full extraction for one fetched page.
pub fn page_from_html(url: &str, html: &str) -> Option<PageData> {
    if html.trim().is_empty() {
        error!(target: "parsing", url, "could not parse webpage html");
        return None;
    }
    let doc = Html::parse_document(html);
    let headline = extract_headline(&doc);
    let text = extract_text(&doc, &headline);
    if text.is_empty() {
        error!(target: "parsing", url, "could not parse webpage text");
        return None;
    }
    let authors = extract_authors(&doc);

    let page = PageData::new(url, html, headline, text, authors);
    if page.text_sentences.is_empty() || page.text_words.len() <= DEFAULT_MIN_WORD_FLOOR {
        error!(target: "parsing", url, "could not tokenize text");
        return None;
    }

    info!(
        target: "parsing",
        url,
        headline = %page.headline,
        authors = ?page.authors,
        chars = page.text.chars().count(),
        sentences = page.text_sentences.len(),
        "parsed page"
    );
    Some(page)
}
