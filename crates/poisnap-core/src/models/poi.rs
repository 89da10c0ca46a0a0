//! Persisted POI record shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::candidate::PoiCandidate;

/// Visit status of a saved place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VisitStatus {
    /// Saved but not yet visited.
    WantToVisit,
    /// Visited at least once.
    Visited,
    /// Marked as a favorite.
    Favorite,
}

impl Default for VisitStatus {
    fn default() -> Self {
        Self::WantToVisit
    }
}

impl VisitStatus {
    /// Parse a visit status from its wire form.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            "wantToVisit" => Some(Self::WantToVisit),
            "visited" => Some(Self::Visited),
            "favorite" => Some(Self::Favorite),
            _ => None,
        }
    }

    /// Wire form of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WantToVisit => "wantToVisit",
            Self::Visited => "visited",
            Self::Favorite => "favorite",
        }
    }
}

/// A place as handed to the persistence collaborator.
///
/// The extraction core only ever creates these: it fills the six extracted
/// fields and the default visit status, and never touches the identifier,
/// status, or location of an existing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiRecord {
    /// Stable identifier.
    pub id: Uuid,

    /// Facility name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Street address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,

    /// Phone number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,

    /// Business hours.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_hours: Option<String>,

    /// Category label.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    /// Price range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,

    /// Visit status, owned by the storage layer after creation.
    #[serde(default)]
    pub visit_status: VisitStatus,

    /// Latitude, when the capture carried a location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,

    /// Longitude, when the capture carried a location.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,

    /// Free-text note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// Creation timestamp.
    pub created_at: DateTime<Utc>,

    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

impl PoiRecord {
    /// Build a fresh record from an extraction candidate.
    ///
    /// Copies exactly the six extracted fields; everything else gets its
    /// creation default.
    pub fn from_candidate(candidate: &PoiCandidate) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: candidate.name.clone(),
            address: candidate.address.clone(),
            phone_number: candidate.phone_number.clone(),
            business_hours: candidate.business_hours.clone(),
            category: candidate.category.clone(),
            price_range: candidate.price_range.clone(),
            visit_status: VisitStatus::default(),
            latitude: None,
            longitude: None,
            note: None,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_candidate_copies_fields_and_defaults_status() {
        let candidate = PoiCandidate {
            name: Some("ラーメン一蘭 本店".to_string()),
            address: Some("神奈川県横浜市西区1-1".to_string()),
            phone_number: Some("045-123-4567".to_string()),
            ..Default::default()
        };

        let record = PoiRecord::from_candidate(&candidate);

        assert_eq!(record.name, candidate.name);
        assert_eq!(record.address, candidate.address);
        assert_eq!(record.phone_number, candidate.phone_number);
        assert_eq!(record.visit_status, VisitStatus::WantToVisit);
        assert_eq!(record.note, None);
    }

    #[test]
    fn test_visit_status_wire_form() {
        assert_eq!(VisitStatus::from_str("wantToVisit"), Some(VisitStatus::WantToVisit));
        assert_eq!(VisitStatus::from_str("favorite"), Some(VisitStatus::Favorite));
        assert_eq!(VisitStatus::from_str("unknown"), None);
        assert_eq!(VisitStatus::Visited.as_str(), "visited");

        let json = serde_json::to_string(&VisitStatus::WantToVisit).unwrap();
        assert_eq!(json, "\"wantToVisit\"");
    }
}
