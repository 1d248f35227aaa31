//! Sentence segmentation and word tokenization.
//!
//! Sentences are returned as trimmed slices of the input so that anything
//! selected later is verbatim source text. Word tokens are lowercased owned
//! strings produced lazily from a regex scan; calling [`words`] again simply
//! restarts the scan.

use super::stopwords::is_stop_word;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Words (letters/digits, with internal apostrophes or hyphens kept together)
/// or single punctuation characters.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’\-][\p{L}\p{N}]+)*|[^\s\p{L}\p{N}]")
        .expect("token regex is valid")
});

/// A blank line, possibly containing horizontal whitespace.
static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[^\S\n]*\n").expect("paragraph regex is valid"));

/// Lowercased words that are followed by a period without ending a sentence.
static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "rev", "gen", "gov", "sen",
        "rep", "pres", "lt", "col", "sgt", "capt", "cmdr", "adm", "hon", "vs", "etc", "e.g",
        "i.e", "u.s", "u.k", "u.n", "u.s.a", "inc", "ltd", "co", "corp", "jan", "feb", "mar",
        "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec", "fig", "approx",
        "dept", "est", "a.m", "p.m", "ph.d", "d.c",
    ]
    .into_iter()
    .collect()
});

/// Abbreviations only when a number follows ("No. 5", "Vol. 2").
static NUMBER_ABBREVIATIONS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["no", "nos", "vol"].into_iter().collect());

/// Contractions and possessives split off the end of a word, as in
/// "biden's" -> "biden" + "'s" and "don't" -> "do" + "n't".
const CLITICS: [&str; 14] = [
    "n't", "n’t", "'s", "’s", "'re", "’re", "'ve", "’ve", "'ll", "’ll", "'d", "’d", "'m", "’m",
];

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | '”' | '’' | ')' | ']')
}

/// Split `text` into sentences in reading order.
///
/// A blank line always ends a sentence. Within a paragraph a run of `.`, `!`
/// or `?` (plus any closing quotes or brackets) ends a sentence when it is
/// followed by whitespace or end of input, the next word does not start in
/// lowercase, and a period does not close an abbreviation or an initial.
///
/// A single capital letter is read as an initial ("J. Smith") unless it is
/// the pronoun `I`, or the next word is a common sentence opener or is also
/// written in lowercase somewhere in `text`.
pub fn sentences(text: &str) -> Vec<&str> {
    let lowercase_words: HashSet<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.starts_with(char::is_lowercase))
        .collect();

    let mut out = Vec::new();
    let mut start = 0;
    for brk in PARAGRAPH_BREAK.find_iter(text) {
        split_paragraph(&text[start..brk.start()], &lowercase_words, &mut out);
        start = brk.end();
    }
    split_paragraph(&text[start..], &lowercase_words, &mut out);
    out
}

fn split_paragraph<'a>(para: &'a str, lowercase_words: &HashSet<&str>, out: &mut Vec<&'a str>) {
    let mut start = 0;
    let mut chars = para.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if !is_terminator(c) {
            continue;
        }

        let mut end = pos + c.len_utf8();
        while let Some(&(p, next)) = chars.peek() {
            if is_terminator(next) || is_closer(next) {
                end = p + next.len_utf8();
                chars.next();
            } else {
                break;
            }
        }

        let rest = &para[end..];
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            continue;
        }
        if c == '.' && !period_ends_sentence(&para[start..pos], rest, lowercase_words) {
            continue;
        }
        if rest.trim_start().starts_with(char::is_lowercase) {
            continue;
        }

        push_trimmed(out, &para[start..end]);
        start = end;
    }
    push_trimmed(out, &para[start..]);
}

fn period_ends_sentence(before: &str, after: &str, lowercase_words: &HashSet<&str>) -> bool {
    let word = before
        .rsplit(char::is_whitespace)
        .next()
        .unwrap_or("")
        .trim_start_matches(|c: char| !c.is_alphanumeric());
    if word.is_empty() {
        return true;
    }

    let next = next_word(after);
    let lower = word.to_lowercase();
    if NUMBER_ABBREVIATIONS.contains(lower.as_str()) {
        return !next.starts_with(|c: char| c.is_ascii_digit());
    }
    if is_initial(word) {
        return word == "I" || next.is_empty() || opens_sentence(next, lowercase_words);
    }

    !ABBREVIATIONS.contains(lower.as_str())
}

fn is_initial(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(first), None) if first.is_uppercase())
}

/// First word of `text`, skipping leading whitespace, quotes and brackets.
fn next_word(text: &str) -> &str {
    let text = text.trim_start_matches(|c: char| !c.is_alphanumeric());
    let end = text
        .find(|c: char| !c.is_alphanumeric())
        .unwrap_or(text.len());
    &text[..end]
}

/// Whether a capitalized `word` after an initial more likely starts a new
/// sentence than continues a name.
fn opens_sentence(word: &str, lowercase_words: &HashSet<&str>) -> bool {
    // single letters are further initials ("J. A. Smith")
    if word.chars().nth(1).is_none() {
        return false;
    }
    let lower = word.to_lowercase();
    is_stop_word(&lower) || lowercase_words.contains(lower.as_str())
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, s: &'a str) {
    let s = s.trim();
    if !s.is_empty() {
        out.push(s);
    }
}

/// Lazily yield the lowercased word and punctuation tokens of `text`.
///
/// A trailing clitic becomes its own token, so `Biden's` yields `biden` and
/// `'s`. Hyphenated words stay whole.
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    TOKEN_RE.find_iter(text).flat_map(|m| {
        let (word, clitic) = split_clitic(m.as_str().to_lowercase());
        std::iter::once(word).chain(clitic)
    })
}

fn split_clitic(mut token: String) -> (String, Option<String>) {
    let cut = CLITICS
        .iter()
        .find_map(|clitic| token.strip_suffix(clitic))
        .filter(|stem| stem.ends_with(char::is_alphanumeric))
        .map(str::len);
    match cut {
        Some(cut) => {
            let clitic = token.split_off(cut);
            (token, Some(clitic))
        }
        None => (token, None),
    }
}

/// A token made only of letters and digits.
pub fn is_alphanumeric(token: &str) -> bool {
    !token.is_empty() && token.chars().all(char::is_alphanumeric)
}

/// An alphanumeric token that is not a stop word.
pub fn is_informative(token: &str) -> bool {
    is_alphanumeric(token) && !is_stop_word(token)
}

/// Lazily yield only the informative tokens of `text`.
pub fn informative_words(text: &str) -> impl Iterator<Item = String> + '_ {
    words(text).filter(|w| is_informative(w))
}
