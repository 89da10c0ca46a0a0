//! Phone number extraction from signage lines.

use std::collections::HashSet;

use super::patterns::{PHONE_GENERIC, PHONE_LABELED, PHONE_LEADING_ZERO};
use super::{FieldPass, LineMatch};

/// Phone number pass.
///
/// Labeled lines win over bare shapes regardless of line order, so
/// the whole pool is scanned once per pattern tier.
pub struct PhonePass;

impl FieldPass for PhonePass {
    fn field(&self) -> &'static str {
        "phone_number"
    }

    fn scan(&self, lines: &[String], used: &HashSet<usize>) -> Option<LineMatch> {
        let tiers: [fn(&str) -> Option<String>; 3] =
            [labeled_phone, leading_zero_phone, generic_phone];

        for tier in tiers {
            for (idx, line) in lines.iter().enumerate() {
                if used.contains(&idx) {
                    continue;
                }
                if let Some(value) = tier(line) {
                    return Some(LineMatch::single(value, idx));
                }
            }
        }
        None
    }
}

/// Extract a phone number from a single line, trying the labeled
/// pattern before the bare shapes.
pub fn match_phone(line: &str) -> Option<String> {
    labeled_phone(line)
        .or_else(|| leading_zero_phone(line))
        .or_else(|| generic_phone(line))
}

fn labeled_phone(line: &str) -> Option<String> {
    PHONE_LABELED
        .captures(line)
        .map(|caps| normalize_phone(caps[1].trim()))
}

fn leading_zero_phone(line: &str) -> Option<String> {
    PHONE_LEADING_ZERO
        .captures(line)
        .map(|caps| normalize_phone(caps[1].trim()))
}

fn generic_phone(line: &str) -> Option<String> {
    PHONE_GENERIC
        .captures(line)
        .map(|caps| normalize_phone(caps[1].trim()))
}

/// Map full-width digits, parens and dash variants to ASCII and drop
/// stray whitespace OCR leaves inside the number.
fn normalize_phone(raw: &str) -> String {
    raw.chars()
        .filter_map(|c| match c {
            '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32),
            '（' => Some('('),
            '）' => Some(')'),
            'ー' | '−' | '‐' | '―' => Some('-'),
            c if c.is_whitespace() => None,
            c => Some(c),
        })
        .collect()
}
