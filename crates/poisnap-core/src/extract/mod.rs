//! Extraction of POI fields from OCR text and model replies.

pub mod merge;
pub mod prompt;
pub mod response;
pub mod rules;

pub use merge::merge_candidates;
pub use response::ResponseParser;
pub use rules::RuleExtractor;
