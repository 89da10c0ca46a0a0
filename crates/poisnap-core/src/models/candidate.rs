//! Extraction candidate record.

use serde::{Deserialize, Serialize};

/// One extraction attempt's output: the six POI fields plus a completeness
/// confidence.
///
/// Candidates are ephemeral values; every pipeline stage (rules, response
/// parsing, merge) produces a fresh one rather than mutating in place.
/// Confidence is the fraction of the six fields that are populated, before
/// any backend-specific bonus.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PoiCandidate {
    /// Facility name, possibly brand + branch fragments joined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Street address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Phone number, full-width punctuation normalized to ASCII.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Business hours as written on the signage.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_hours: Option<String>,

    /// Category label from the keyword table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Price range as written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,

    /// Completeness score in [0.0, 1.0].
    pub confidence: f32,
}

fn is_filled(field: &Option<String>) -> bool {
    field.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl PoiCandidate {
    /// Number of extractable fields.
    pub const FIELD_COUNT: usize = 6;

    /// A candidate with no fields and zero confidence.
    pub fn empty() -> Self {
        Self::default()
    }

    fn field_values(&self) -> [&Option<String>; Self::FIELD_COUNT] {
        [
            &self.name,
            &self.address,
            &self.phone_number,
            &self.business_hours,
            &self.category,
            &self.price_range,
        ]
    }

    /// Count of populated fields, empty strings excluded.
    pub fn filled_field_count(&self) -> usize {
        self.field_values().iter().filter(|f| is_filled(f)).count()
    }

    /// Whether this candidate clears the minimum bar for usability:
    /// a name or an address. No other field qualifies a candidate.
    pub fn has_valid_data(&self) -> bool {
        is_filled(&self.name) || is_filled(&self.address)
    }

    /// Whether every field is absent.
    pub fn is_empty(&self) -> bool {
        self.filled_field_count() == 0
    }

    /// Collapse empty and whitespace-only strings to `None` across all
    /// six fields, so downstream validity and confidence checks never
    /// mistake an empty string for data.
    pub fn normalized(mut self) -> Self {
        for field in [
            &mut self.name,
            &mut self.address,
            &mut self.phone_number,
            &mut self.business_hours,
            &mut self.category,
            &mut self.price_range,
        ] {
            if field.as_deref().is_some_and(|v| v.trim().is_empty()) {
                *field = None;
            }
        }
        self
    }

    /// Recompute confidence as populated fields over six.
    pub fn scored(mut self) -> Self {
        self.confidence = self.filled_field_count() as f32 / Self::FIELD_COUNT as f32;
        self
    }

    /// Add a fixed trust bonus, capped at 1.0.
    pub fn with_bonus(mut self, bonus: f32) -> Self {
        self.confidence = (self.confidence + bonus).min(1.0);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_data_requires_name_or_address() {
        let candidate = PoiCandidate {
            phone_number: Some("045-123-4567".to_string()),
            category: Some("カフェ".to_string()),
            ..Default::default()
        };
        assert!(!candidate.has_valid_data());

        let candidate = PoiCandidate {
            address: Some("東京都港区六本木1-2-3".to_string()),
            ..Default::default()
        };
        assert!(candidate.has_valid_data());
    }

    #[test]
    fn test_empty_string_does_not_count_as_data() {
        let candidate = PoiCandidate {
            name: Some(String::new()),
            address: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!candidate.has_valid_data());
        assert_eq!(candidate.filled_field_count(), 0);

        let normalized = candidate.normalized();
        assert_eq!(normalized.name, None);
        assert_eq!(normalized.address, None);
    }

    #[test]
    fn test_scored_is_filled_fraction() {
        let candidate = PoiCandidate {
            name: Some("アパ社長カレー".to_string()),
            phone_number: Some("045-123-4567".to_string()),
            ..Default::default()
        }
        .scored();

        assert!((candidate.confidence - 2.0 / 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_bonus_caps_at_one() {
        let candidate = PoiCandidate {
            confidence: 0.9,
            ..Default::default()
        }
        .with_bonus(0.2);
        assert_eq!(candidate.confidence, 1.0);

        let candidate = PoiCandidate {
            confidence: 0.5,
            ..Default::default()
        }
        .with_bonus(0.2);
        assert!((candidate.confidence - 0.7).abs() < f32::EPSILON);
    }

    #[test]
    fn test_wire_keys_are_camel_case() {
        let candidate = PoiCandidate {
            phone_number: Some("045-123-4567".to_string()),
            business_hours: Some("11:00〜22:00".to_string()),
            price_range: Some("¥1,000〜¥2,000".to_string()),
            ..Default::default()
        };

        let json = serde_json::to_string(&candidate).unwrap();
        assert!(json.contains("phoneNumber"));
        assert!(json.contains("businessHours"));
        assert!(json.contains("priceRange"));
    }
}
