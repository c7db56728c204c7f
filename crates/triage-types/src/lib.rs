//! Shared data contracts for the triage pipeline
//!
//! The analysis step, the annotation renderer and the report composer
//! exchange these plain values and nothing else.

pub mod error;
pub mod record;
pub mod region;

pub use error::TypesError;
pub use record::{Confidence, FindingRecord, ReportMetadata};
pub use region::{HighlightStyle, Region, RegionFault};
