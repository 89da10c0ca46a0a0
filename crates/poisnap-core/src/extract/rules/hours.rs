//! Business hours extraction.

use std::collections::HashSet;

use super::patterns::{HOURS_BARE, HOURS_LABELED, TIME_TOKEN};
use super::{FieldPass, LineMatch};

/// Business hours pass.
pub struct HoursPass;

impl FieldPass for HoursPass {
    fn field(&self) -> &'static str {
        "business_hours"
    }

    fn scan(&self, lines: &[String], used: &HashSet<usize>) -> Option<LineMatch> {
        for (idx, line) in lines.iter().enumerate() {
            if used.contains(&idx) {
                continue;
            }
            if let Some(value) = match_hours(line) {
                return Some(LineMatch::single(value, idx));
            }
        }
        None
    }
}

/// Extract an opening-hours value from a single line.
///
/// A label with no time after it ("営業中", "準備中") is status
/// signage, not hours, so labeled matches also require a time token
/// somewhere in the line.
pub fn match_hours(line: &str) -> Option<String> {
    if let Some(caps) = HOURS_LABELED.captures(line) {
        if TIME_TOKEN.is_match(line) {
            let rest = caps[1].trim();
            let value = if rest.is_empty() { line.trim() } else { rest };
            return Some(value.to_string());
        }
    }
    if HOURS_BARE.is_match(line) {
        return Some(line.trim().to_string());
    }
    None
}
