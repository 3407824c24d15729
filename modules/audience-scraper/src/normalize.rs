// Count normalization: "1.7M" → 1_700_000, "5,800" → 5_800, "" → None.

use std::sync::LazyLock;

use regex::Regex;

use crate::types::NOT_AVAILABLE;

/// First count-looking token in free text, with an optional magnitude letter
/// that is not the start of a word ("12K members" → "12", "K").
static COUNT_TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d[\d,]*(?:\.\d+)?)\s?([kKmMbB])?(?:[^A-Za-z]|$)").expect("valid regex")
});

/// Convert a human-formatted count into an integer.
///
/// Keeps only digits, `.`, `,`, `k` and `m` (case-insensitive), applies a
/// trailing `k`/`m` multiplier, drops thousands separators and floors the
/// result. When letters from surrounding words spoil that ("12K members"),
/// the leading count token is parsed instead. Anything that does not parse
/// yields `None`, never zero.
pub fn normalize(raw: &str) -> Option<u64> {
    normalize_literal(raw).or_else(|| count_token(raw).and_then(|t| normalize_literal(&t)))
}

fn normalize_literal(raw: &str) -> Option<u64> {
    let mut cleaned: String = raw
        .to_lowercase()
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | 'k' | 'm' | ','))
        .collect();

    let exponent = if cleaned.ends_with('m') {
        cleaned.pop();
        6
    } else if cleaned.ends_with('k') {
        cleaned.pop();
        3
    } else {
        0
    };

    let number = cleaned.replace(',', "");
    scale_decimal(&number, exponent)
}

/// Normalize scraped metric text: the `N/A` sentinel stays absent, otherwise
/// the first count token is isolated so surrounding words cannot leak stray
/// `k`/`m` letters into the suffix.
pub fn normalize_metric(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() || raw == NOT_AVAILABLE {
        return None;
    }
    let token = count_token(raw)?;
    normalize_literal(&token)
}

/// Extract the leading count token ("1.2K" from "1.2K likes").
/// Magnitudes we do not understand (billions) yield `None` instead of a
/// silently truncated number.
pub fn count_token(text: &str) -> Option<String> {
    let caps = COUNT_TOKEN_RE.captures(text)?;
    let number = caps.get(1)?.as_str();
    match caps.get(2).map(|m| m.as_str()) {
        Some("b") | Some("B") => None,
        Some(suffix) => Some(format!("{number}{suffix}")),
        None => Some(number.to_string()),
    }
}

/// Shift the decimal point `exponent` places right and truncate, working on
/// the digit string so "4.35" × 10^6 is exactly 4_350_000.
fn scale_decimal(number: &str, exponent: usize) -> Option<u64> {
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !is_digits(int_part) || !is_digits(frac_part) {
        return None;
    }

    let mut digits = String::with_capacity(int_part.len() + exponent);
    digits.push_str(int_part);
    digits.extend(frac_part.chars().chain(std::iter::repeat('0')).take(exponent));

    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(0);
    }
    digits.parse().ok()
}
