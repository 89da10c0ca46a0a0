//! Facility name composition from the surviving line pool.

use std::collections::HashSet;

use super::patterns::{NUMERIC_LINE, URL_OR_HANDLE};

/// Words marking a line as business detail rather than a name
/// fragment. ASCII entries are lowercase; matching lowercases the
/// line.
pub const INFO_KEYWORDS: &[&str] = &[
    "定休日",
    "駐車場",
    "クレジット",
    "カード可",
    "禁煙",
    "喫煙",
    "ランチ",
    "ディナー",
    "モーニング",
    "テイクアウト",
    "営業中",
    "準備中",
    "メニュー",
    "クーポン",
    "予約",
    "fax",
    "wi-fi",
    "wifi",
];

/// Whether a line can contribute to the facility name.
pub fn is_name_fragment(line: &str) -> bool {
    if line.chars().count() <= 1 {
        return false;
    }
    if NUMERIC_LINE.is_match(line) || URL_OR_HANDLE.is_match(line) {
        return false;
    }
    let lowered = line.to_lowercase();
    !INFO_KEYWORDS.iter().any(|keyword| lowered.contains(keyword))
}

/// Join the first `max_lines` surviving unclaimed lines with single
/// spaces. Signage splits brand and branch onto separate lines, so a
/// name is usually a concatenation of fragments.
pub fn compose_name(
    lines: &[String],
    used: &HashSet<usize>,
    max_lines: usize,
) -> Option<String> {
    let mut parts: Vec<&str> = Vec::new();
    for (idx, line) in lines.iter().enumerate() {
        if used.contains(&idx) || !is_name_fragment(line) {
            continue;
        }
        parts.push(line.as_str());
        if parts.len() == max_lines {
            break;
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}
