//! Genre token normalization and display ordering

use std::cmp::Ordering;
use std::collections::HashSet;

use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

/// Trim and lowercase every token, dropping empties and repeats while
/// keeping first-seen order.
pub fn normalize_tokens<I, S>(tokens: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    tokens
        .into_iter()
        .map(|token| token.as_ref().trim().to_lowercase())
        .filter(|token| !token.is_empty())
        .filter(|token| seen.insert(token.clone()))
        .collect()
}

/// Split a comma separated genre list into normalized tokens.
pub fn split_csv(csv: &str) -> Vec<String> {
    normalize_tokens(csv.split(','))
}

/// Distinct genres ready for display: deduplicated ignoring case, sorted
/// ignoring case and diacritics, first letter uppercased.
pub fn display_genres<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut tokens = normalize_tokens(raw);
    tokens.sort_by(|a, b| collate(a, b));
    tokens.iter().map(|token| capitalize(token)).collect()
}

/// Base-sensitivity comparison: "ação" and "acao" share a primary key and
/// sort next to each other. Ties fall back to the raw token so the order is
/// total.
pub fn collate(a: &str, b: &str) -> Ordering {
    primary_key(a)
        .cmp(&primary_key(b))
        .then_with(|| a.cmp(b))
}

fn primary_key(token: &str) -> String {
    token
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Uppercase the first character, keep the rest.
pub fn capitalize(token: &str) -> String {
    let mut chars = token.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
