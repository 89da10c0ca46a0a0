//! Merging of rule-based and model-based candidates.

use crate::models::PoiCandidate;

/// Field-wise coalesce of the two extraction paths. The model value
/// wins every field it filled; rule values plug the holes. The
/// merged confidence is the max of the two, never a blend.
pub fn merge_candidates(rule: &PoiCandidate, model: &PoiCandidate) -> PoiCandidate {
    PoiCandidate {
        name: pick(&model.name, &rule.name),
        address: pick(&model.address, &rule.address),
        phone_number: pick(&model.phone_number, &rule.phone_number),
        business_hours: pick(&model.business_hours, &rule.business_hours),
        category: pick(&model.category, &rule.category),
        price_range: pick(&model.price_range, &rule.price_range),
        confidence: model.confidence.max(rule.confidence),
    }
}

fn pick(model: &Option<String>, rule: &Option<String>) -> Option<String> {
    model.clone().or_else(|| rule.clone())
}
