//! Parsing of model completions into candidates.

use serde::Deserialize;

use super::rules::patterns::{ADDRESS_LABELED, NAME_LABELED, PHONE_LABELED};
use crate::models::PoiCandidate;

/// Confidence when a reply came back but could not be parsed at all.
/// Non-zero so it stays distinguishable from "no backend ran".
pub const UNPARSED_CONFIDENCE: f32 = 0.1;

/// Confidence assigned by the labeled plain-text fallback.
pub const FALLBACK_CONFIDENCE: f32 = 0.3;

/// Wire shape of a model reply. Unknown keys are ignored, missing
/// keys read as null.
#[derive(Debug, Deserialize)]
struct WireCandidate {
    name: Option<String>,
    address: Option<String>,
    phone: Option<String>,
    hours: Option<String>,
    category: Option<String>,
    #[serde(rename = "priceRange")]
    price_range: Option<String>,
}

/// Parser for model completions.
///
/// Completions are intended to be a single JSON object but arrive
/// wrapped in Markdown fencing, padded with prose, or occasionally
/// mangled. `parse` never fails; the worst input yields an empty
/// candidate with [`UNPARSED_CONFIDENCE`].
#[derive(Debug, Clone)]
pub struct ResponseParser {
    plain_text_fallback: bool,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            plain_text_fallback: true,
        }
    }

    /// Enable or disable the labeled plain-text fallback for replies
    /// that are not JSON at all.
    pub fn with_plain_text_fallback(mut self, enabled: bool) -> Self {
        self.plain_text_fallback = enabled;
        self
    }

    pub fn parse(&self, raw: &str) -> PoiCandidate {
        let body = extract_json_body(raw);
        match serde_json::from_str::<WireCandidate>(&body) {
            Ok(wire) => PoiCandidate {
                name: wire.name,
                address: wire.address,
                phone_number: wire.phone,
                business_hours: wire.hours,
                category: wire.category,
                price_range: wire.price_range,
                confidence: 0.0,
            }
            .normalized()
            .scored(),
            Err(err) => {
                tracing::debug!(error = %err, "model reply is not decodable JSON");
                if self.plain_text_fallback {
                    if let Some(candidate) = parse_labeled_lines(raw) {
                        return candidate;
                    }
                }
                let mut empty = PoiCandidate::empty();
                empty.confidence = UNPARSED_CONFIDENCE;
                empty
            }
        }
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Peel Markdown fencing, then slice from the first `{` to the last
/// `}` to shed prose on either side.
fn extract_json_body(raw: &str) -> String {
    let segment = if raw.contains("```json") {
        raw.split("```json")
            .nth(1)
            .and_then(|rest| rest.split("```").next())
            .unwrap_or(raw)
    } else if raw.contains("```") {
        raw.split("```").nth(1).unwrap_or(raw)
    } else {
        raw
    };

    match (segment.find('{'), segment.rfind('}')) {
        (Some(start), Some(end)) if start < end => segment[start..=end].trim().to_string(),
        _ => segment.trim().to_string(),
    }
}

/// Degraded extraction over labeled reply lines (施設名/住所/電話).
/// Only ever fills name, address and phone.
fn parse_labeled_lines(raw: &str) -> Option<PoiCandidate> {
    let mut candidate = PoiCandidate::empty();

    for line in raw.lines() {
        let line = line.trim();
        if candidate.name.is_none() {
            if let Some(caps) = NAME_LABELED.captures(line) {
                candidate.name = Some(caps[1].trim().to_string());
                continue;
            }
        }
        if candidate.address.is_none() {
            if let Some(caps) = ADDRESS_LABELED.captures(line) {
                candidate.address = Some(caps[1].trim().to_string());
                continue;
            }
        }
        if candidate.phone_number.is_none() {
            if let Some(caps) = PHONE_LABELED.captures(line) {
                candidate.phone_number = Some(caps[1].trim().to_string());
            }
        }
    }

    let candidate = candidate.normalized();
    if candidate.is_empty() {
        return None;
    }
    Some(PoiCandidate {
        confidence: FALLBACK_CONFIDENCE,
        ..candidate
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_fenced_json() {
        let raw = "```json\n{\"name\":\"ラーメン花月\",\"address\":\"東京都新宿区1-2-3\",\"phone\":\"03-1234-5678\",\"hours\":\"11:00〜23:00\",\"category\":\"ラーメン\",\"priceRange\":\"¥800〜¥1,200\"}\n```";
        let candidate = ResponseParser::new().parse(raw);

        assert_eq!(candidate.name.as_deref(), Some("ラーメン花月"));
        assert_eq!(candidate.address.as_deref(), Some("東京都新宿区1-2-3"));
        assert_eq!(candidate.phone_number.as_deref(), Some("03-1234-5678"));
        assert_eq!(candidate.business_hours.as_deref(), Some("11:00〜23:00"));
        assert_eq!(candidate.category.as_deref(), Some("ラーメン"));
        assert_eq!(candidate.price_range.as_deref(), Some("¥800〜¥1,200"));
        assert_eq!(candidate.confidence, 1.0);
    }

    #[test]
    fn test_parse_unlabeled_fence() {
        let raw = "```\n{\"name\":\"喫茶ロマン\"}\n```";
        let candidate = ResponseParser::new().parse(raw);

        assert_eq!(candidate.name.as_deref(), Some("喫茶ロマン"));
    }

    #[test]
    fn test_parse_slices_past_surrounding_prose() {
        let raw = "抽出結果は以下の通りです。\n{\"name\": \"鮨やまもと\", \"address\": null}\n以上です。";
        let candidate = ResponseParser::new().parse(raw);

        assert_eq!(candidate.name.as_deref(), Some("鮨やまもと"));
        assert_eq!(candidate.address, None);
    }

    #[test]
    fn test_empty_strings_normalize_to_null() {
        let raw = "{\"name\":\"鮨やまもと\",\"address\":\"\",\"phone\":\"  \"}";
        let candidate = ResponseParser::new().parse(raw);

        assert_eq!(candidate.name.as_deref(), Some("鮨やまもと"));
        assert_eq!(candidate.address, None);
        assert_eq!(candidate.phone_number, None);
        assert!((candidate.confidence - 1.0 / 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let raw = "{\"name\":\"喫茶ロマン\",\"rating\":\"4.2\"}";
        let candidate = ResponseParser::new().parse(raw);

        assert_eq!(candidate.name.as_deref(), Some("喫茶ロマン"));
    }

    #[test]
    fn test_plain_text_fallback() {
        let raw = "施設名: 博多もつ鍋やま中\n住所: 福岡県福岡市博多区1-2-3\n電話: 092-123-4567\nカテゴリ: 鍋";
        let candidate = ResponseParser::new().parse(raw);

        assert_eq!(candidate.name.as_deref(), Some("博多もつ鍋やま中"));
        assert_eq!(
            candidate.address.as_deref(),
            Some("福岡県福岡市博多区1-2-3")
        );
        assert_eq!(candidate.phone_number.as_deref(), Some("092-123-4567"));
        assert_eq!(candidate.category, None);
        assert_eq!(candidate.confidence, FALLBACK_CONFIDENCE);
    }

    #[test]
    fn test_garbage_yields_low_confidence_empty() {
        let candidate = ResponseParser::new().parse("モデルの読み込みに失敗しました");

        assert!(candidate.is_empty());
        assert_eq!(candidate.confidence, UNPARSED_CONFIDENCE);
    }

    #[test]
    fn test_fallback_disabled() {
        let candidate = ResponseParser::new()
            .with_plain_text_fallback(false)
            .parse("施設名: 博多もつ鍋やま中");

        assert!(candidate.is_empty());
        assert_eq!(candidate.confidence, UNPARSED_CONFIDENCE);
    }

    #[test]
    fn test_malformed_never_exceeds_fallback_confidence() {
        let inputs = [
            "{\"name\": \"未閉じ",
            "```json\nnot json\n```",
            "電話: 045-123-4567",
            "",
        ];
        for raw in inputs {
            let candidate = ResponseParser::new().parse(raw);
            assert!(candidate.confidence <= FALLBACK_CONFIDENCE, "input: {raw}");
        }
    }
}
