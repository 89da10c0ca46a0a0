//! Data models for the extraction pipeline.

pub mod candidate;
pub mod config;
pub mod poi;

pub use candidate::PoiCandidate;
pub use config::PoisnapConfig;
pub use poi::{PoiRecord, VisitStatus};
