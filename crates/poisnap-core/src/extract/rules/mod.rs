//! Rule-based field extraction for Japanese POI signage text.

pub mod address;
pub mod category;
pub mod hours;
pub mod name;
pub mod patterns;
pub mod phone;
pub mod price;

pub use address::{is_continuation, AddressPass};
pub use category::{detect_category, CATEGORY_TABLE};
pub use hours::{match_hours, HoursPass};
pub use name::{is_name_fragment, INFO_KEYWORDS};
pub use phone::{match_phone, PhonePass};
pub use price::PricePass;

use std::collections::HashSet;

use crate::models::PoiCandidate;

/// One successful field match: the value and the line indices it
/// claims from the shared pool.
#[derive(Debug, Clone)]
pub struct LineMatch {
    /// Extracted value.
    pub value: String,
    /// Claimed line indices.
    pub lines: Vec<usize>,
}

impl LineMatch {
    pub fn single(value: String, idx: usize) -> Self {
        Self {
            value,
            lines: vec![idx],
        }
    }
}

/// Trait for ordered line-consuming passes.
///
/// Each pass sees the indices claimed by the passes before it and
/// must skip them, so a line feeds at most one field.
pub trait FieldPass {
    /// Candidate field this pass fills.
    fn field(&self) -> &'static str;

    /// Scan the unclaimed lines for the field.
    fn scan(&self, lines: &[String], used: &HashSet<usize>) -> Option<LineMatch>;
}

/// Rule-based extractor over OCR text.
///
/// Deterministic: the same text yields an identical candidate on
/// every call. Passes run phone, address, hours, price, then the
/// whole-text category scan, then name composition from whatever
/// lines survived.
#[derive(Debug, Clone)]
pub struct RuleExtractor {
    name_max_lines: usize,
}

impl RuleExtractor {
    pub fn new() -> Self {
        Self { name_max_lines: 3 }
    }

    /// Cap on how many surviving lines the name may join.
    pub fn with_name_max_lines(mut self, max: usize) -> Self {
        self.name_max_lines = max;
        self
    }

    pub fn extract(&self, text: &str) -> PoiCandidate {
        let lines = normalize_lines(text);
        let mut used: HashSet<usize> = HashSet::new();
        let mut candidate = PoiCandidate::empty();

        candidate.phone_number = run_pass(&PhonePass, &lines, &mut used);
        candidate.address = run_pass(&AddressPass, &lines, &mut used);
        candidate.business_hours = run_pass(&HoursPass, &lines, &mut used);
        candidate.price_range = run_pass(&PricePass, &lines, &mut used);

        // Category scans the raw text, claimed lines included.
        candidate.category = category::detect_category(text);
        candidate.name = name::compose_name(&lines, &used, self.name_max_lines);

        candidate.normalized().scored()
    }
}

impl Default for RuleExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn run_pass(pass: &dyn FieldPass, lines: &[String], used: &mut HashSet<usize>) -> Option<String> {
    let matched = pass.scan(lines, used)?;
    tracing::debug!(field = pass.field(), value = %matched.value, "rule pass matched");
    for idx in matched.lines {
        used.insert(idx);
    }
    Some(matched.value)
}

/// Split on line breaks, trim, drop empties.
pub fn normalize_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_extract_name_and_labeled_phone() {
        let text = "アパ社長カレー\n横浜ベイタワー店\nTEL 045-123-4567";
        let candidate = RuleExtractor::new().extract(text);

        assert_eq!(
            candidate.name.as_deref(),
            Some("アパ社長カレー 横浜ベイタワー店")
        );
        assert_eq!(candidate.phone_number.as_deref(), Some("045-123-4567"));
        assert_eq!(candidate.category.as_deref(), Some("カレー"));
        assert!(candidate.has_valid_data());
    }

    #[test]
    fn test_extract_absorbs_address_continuation() {
        let text = "東京都港区\n六本木1-2-3\nカフェ ABC";
        let candidate = RuleExtractor::new().extract(text);

        assert_eq!(candidate.address.as_deref(), Some("東京都港区六本木1-2-3"));
        assert_eq!(candidate.category.as_deref(), Some("カフェ"));
        assert_eq!(candidate.name.as_deref(), Some("カフェ ABC"));
    }

    #[test]
    fn test_extract_is_deterministic() {
        let text = "ラーメン二郎 三田本店\n営業時間 11:00〜20:00\n東京都港区三田2-16-4";
        let first = RuleExtractor::new().extract(text);
        let second = RuleExtractor::new().extract(text);

        assert_eq!(first, second);
    }

    #[test]
    fn test_category_scans_lines_claimed_by_other_passes() {
        // The only category keyword sits inside the phone line. The
        // category pass still sees it because it reads the raw text,
        // not the surviving line pool.
        let text = "TEL 045-123-4567 カレーの予約はこちら";
        let candidate = RuleExtractor::new().extract(text);

        assert_eq!(candidate.phone_number.as_deref(), Some("045-123-4567"));
        assert_eq!(candidate.category.as_deref(), Some("カレー"));
        assert_eq!(candidate.name, None);
    }

    #[test]
    fn test_phone_only_text_has_no_valid_data() {
        let candidate = RuleExtractor::new().extract("TEL 045-123-4567");

        assert_eq!(candidate.phone_number.as_deref(), Some("045-123-4567"));
        assert_eq!(candidate.name, None);
        assert!(!candidate.has_valid_data());
        assert!((candidate.confidence - 1.0 / 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_empty_text_yields_empty_candidate() {
        let candidate = RuleExtractor::new().extract("");

        assert!(candidate.is_empty());
        assert_eq!(candidate.confidence, 0.0);
    }

    #[test]
    fn test_name_max_lines_caps_joined_fragments() {
        let text = "鮨処\nやまもと\n別館\n離れ";
        let capped = RuleExtractor::new().with_name_max_lines(2).extract(text);

        assert_eq!(capped.name.as_deref(), Some("鮨処 やまもと"));
    }

    #[test]
    fn test_full_signage_extraction() {
        let text = "博多もつ鍋 やま中\n本店\n住所：福岡県福岡市博多区1-2-3\n営業時間 17:00〜23:00\n予算 ¥4,000〜¥6,000\n定休日 日曜\nTEL 092-123-4567";
        let candidate = RuleExtractor::new().extract(text);

        assert_eq!(candidate.name.as_deref(), Some("博多もつ鍋 やま中 本店"));
        assert_eq!(
            candidate.address.as_deref(),
            Some("福岡県福岡市博多区1-2-3")
        );
        assert_eq!(candidate.business_hours.as_deref(), Some("17:00〜23:00"));
        assert_eq!(candidate.price_range.as_deref(), Some("¥4,000〜¥6,000"));
        assert_eq!(candidate.phone_number.as_deref(), Some("092-123-4567"));
        assert_eq!(candidate.confidence, 1.0);
    }
}
