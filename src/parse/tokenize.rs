//! Word and sentence tokenization for article text.
//!
//! Both tokenizers are deterministic and dependency-light (regex only); they are
//! good enough for ratio-style signals (words per sentence, marks per sentence),
//! not for linguistic analysis.

use once_cell::sync::Lazy;
use regex::Regex;

/// Abbreviations that keep their trailing full stop and never end a sentence.
pub(crate) const ABBREVIATIONS: &[&str] = &[
    "mr", "ms", "mrs", "vs", "etc", "dr", "prof", "rev", "pres", "inc", "est", "dept", "st",
    "blvd", "jr", "sr", "gen", "gov", "sen", "rep", "corp", "ltd", "co",
];

static RE_WORDS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"(?i)\b(?:Mr|Ms|Mrs|vs|etc|Dr|Prof|Rev|Pres|Inc|Est|Dept|St|Blvd)\.", // common abbreviations
        r"|\b\d\d:\d\d(?::\d\d)?\b",                                          // time
        r"|\b(?:\w\.){2,}",                                                   // initialisms (U.S.)
        r"|\p{Sc}?\d+(?:[.,]\d+)*(?:\p{Sc}|\b)",                              // numbers / money
        r"|\b\w+(?:[-']\w+)*\b",                                              // words incl. hyphen/apostrophe
    ))
    .expect("word tokenizer regex")
});

/// Map typographic apostrophes to `'`.
fn normalize_apostrophes(text: &str) -> String {
    text.replace(
        ['\u{2039}', '\u{203A}', '\u{2019}', '\u{201A}', '\u{2018}', '\u{201B}', '\u{275B}', '\u{275C}'],
        "'",
    )
}

/// Map typographic double quotes to `"`.
fn normalize_quotes(text: &str) -> String {
    normalize_apostrophes(text).replace(
        ['\u{201C}', '\u{201F}', '\u{201E}', '\u{201D}', '\u{00AB}', '\u{00BB}', '\u{275D}', '\u{275E}', '\u{FF02}'],
        "\"",
    )
}

/// Tokenizes text into words. Keeps full stops with abbreviations and initialisms.
pub fn word_tokenize(text: &str) -> Vec<String> {
    let text = normalize_apostrophes(text);
    RE_WORDS
        .find_iter(&text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Tokenizes text into sentences.
///
/// Newlines always end a sentence. Inside a line, a run of `.`/`!`/`?` (plus closing
/// quotes or brackets) ends a sentence when followed by whitespace and something that
/// can start one, unless the full stop belongs to a known abbreviation or an initial.
pub fn sent_tokenize(text: &str) -> Vec<String> {
    let text = normalize_quotes(text);
    let mut out = Vec::new();
    for line in text.split('\n') {
        split_line(line, &mut out);
    }
    out
}

fn split_line(line: &str, out: &mut Vec<String>) {
    let chars: Vec<(usize, char)> = line.char_indices().collect();
    let mut start = 0usize;
    let mut i = 0usize;

    while i < chars.len() {
        let (pos, c) = chars[i];
        if !matches!(c, '.' | '!' | '?') {
            i += 1;
            continue;
        }

        // consume the whole terminator run, e.g. `?!` or `."`
        let mut j = i + 1;
        while j < chars.len() && matches!(chars[j].1, '.' | '!' | '?' | '"' | '\'' | ')' | ']') {
            j += 1;
        }
        if j >= chars.len() {
            break;
        }
        if !chars[j].1.is_whitespace() {
            i = j;
            continue;
        }

        let mut k = j;
        while k < chars.len() && chars[k].1.is_whitespace() {
            k += 1;
        }
        let starts_next = k < chars.len() && can_start_sentence(chars[k].1);
        let abbreviated = c == '.' && ends_with_abbreviation(&line[start..pos]);

        if starts_next && !abbreviated {
            push_trimmed(out, &line[start..chars[j].0]);
            start = chars[k].0;
            i = k;
        } else {
            i = j;
        }
    }

    push_trimmed(out, &line[start..]);
}

fn can_start_sentence(c: char) -> bool {
    c.is_uppercase() || c.is_ascii_digit() || matches!(c, '"' | '\'' | '(' | '[')
}

fn ends_with_abbreviation(prefix: &str) -> bool {
    let Some(last) = prefix.split_whitespace().last() else {
        return false;
    };
    let last = last.trim_start_matches(['"', '\'', '(', '[']);

    // single initial like the "J" in "J. Smith"
    let mut letters = last.chars();
    if let (Some(first), None) = (letters.next(), letters.next()) {
        if first.is_uppercase() {
            return true;
        }
    }
    // dotted initialism like "U.S"
    if last.contains('.') {
        return true;
    }
    ABBREVIATIONS.contains(&last.to_ascii_lowercase().as_str())
}

fn push_trimmed(out: &mut Vec<String>, s: &str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
}
