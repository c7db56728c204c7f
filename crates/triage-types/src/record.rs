//! Finding Record and report metadata

use crate::error::TypesError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Integer percentage in `0..=100`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Confidence(u8);

impl Confidence {
    pub fn new(percent: u32) -> Result<Self, TypesError> {
        if percent > 100 {
            return Err(TypesError::ConfidenceOutOfRange(percent));
        }
        Ok(Self(percent as u8))
    }

    pub fn percent(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for Confidence {
    type Error = TypesError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Confidence> for u32 {
    fn from(value: Confidence) -> Self {
        value.0 as u32
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Result of one analysis request.
///
/// Built once by whoever ran the analysis and read-only afterwards. Images
/// are kept encoded (PNG, JPEG, ...) and decoded by the consumer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FindingRecord {
    pub confidence: Confidence,
    /// Ordered by clinical priority; consumers must keep the order
    pub summary_findings: Vec<String>,
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_image: Option<Vec<u8>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl FindingRecord {
    pub fn new(
        confidence: Confidence,
        summary_findings: Vec<String>,
        narrative: impl Into<String>,
    ) -> Self {
        Self {
            confidence,
            summary_findings,
            narrative: narrative.into(),
            source_image: None,
            annotated_image: None,
            subject_id: None,
            date: None,
        }
    }

    pub fn with_source_image(mut self, bytes: Vec<u8>) -> Self {
        self.source_image = Some(bytes);
        self
    }

    pub fn with_annotated_image(mut self, bytes: Vec<u8>) -> Self {
        self.annotated_image = Some(bytes);
        self
    }

    pub fn with_subject_id(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    /// False when there are no findings and the narrative is blank
    pub fn has_content(&self) -> bool {
        !self.summary_findings.is_empty() || !self.narrative.trim().is_empty()
    }
}

/// Caller-supplied report header fields
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Shown verbatim; never sampled from the clock by the composer
    pub generated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
}

impl ReportMetadata {
    pub fn new(generated_at: impl Into<String>) -> Self {
        Self {
            generated_at: generated_at.into(),
            subject_id: None,
            image_type: None,
        }
    }

    pub fn with_subject_id(mut self, subject_id: impl Into<String>) -> Self {
        self.subject_id = Some(subject_id.into());
        self
    }

    pub fn with_image_type(mut self, image_type: impl Into<String>) -> Self {
        self.image_type = Some(image_type.into());
        self
    }
}
