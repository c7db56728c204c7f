//! Record manifests: the JSON a caller hands to `triage report`
//!
//! Image paths are resolved against the manifest's own directory so a
//! manifest can travel alongside its scans.

use annotation_core::{annotate, AnnotateOptions};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use triage_types::{Confidence, FindingRecord, Region, ReportMetadata};

/// Regions reported by the simulated detector
pub const SIMULATED_REGIONS: [Region; 2] = [
    Region {
        x: 0.30,
        y: 0.25,
        width: 0.15,
        height: 0.15,
    },
    Region {
        x: 0.28,
        y: 0.42,
        width: 0.12,
        height: 0.10,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordManifest {
    pub confidence: Confidence,
    #[serde(default)]
    pub findings: Vec<String>,
    #[serde(default)]
    pub narrative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_image: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_image: Option<PathBuf>,
    /// Regions to highlight when no annotated image is supplied
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub regions: Vec<Region>,
    /// Use the simulated detector's regions instead of `regions`
    #[serde(default)]
    pub preset: bool,
}

impl RecordManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read record manifest: {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse record manifest: {}", path.display()))
    }

    /// The regions that apply, preset taking priority
    pub fn effective_regions(&self) -> &[Region] {
        if self.preset {
            &SIMULATED_REGIONS
        } else {
            &self.regions
        }
    }

    /// Load referenced images and build the Finding Record
    ///
    /// When regions apply and no annotated image is named, the source image is
    /// annotated in memory.
    pub fn into_record(
        self,
        base_dir: &Path,
        options: &AnnotateOptions,
    ) -> anyhow::Result<FindingRecord> {
        let source = self
            .source_image
            .as_deref()
            .map(|path| read_image(base_dir, path))
            .transpose()?;

        let annotated = match (&self.annotated_image, &source) {
            (Some(path), _) => Some(read_image(base_dir, path)?),
            (None, Some(bytes)) if !self.effective_regions().is_empty() => {
                let regions = self.effective_regions();
                tracing::info!(regions = regions.len(), "annotating source image");
                Some(annotate(bytes, regions, options).context("Failed to annotate source image")?)
            }
            (None, None) if !self.effective_regions().is_empty() => {
                tracing::warn!("regions given without a source image; skipping annotation");
                None
            }
            _ => None,
        };

        let mut record = FindingRecord::new(self.confidence, self.findings, self.narrative);
        record.source_image = source;
        record.annotated_image = annotated;
        record.subject_id = self.subject_id;
        record.date = self.date;
        Ok(record)
    }

    pub fn metadata(&self, generated_at: &str) -> ReportMetadata {
        let mut meta = ReportMetadata::new(generated_at);
        meta.subject_id = self.subject_id.clone();
        meta.image_type = self.image_type.clone();
        meta
    }
}

fn read_image(base_dir: &Path, path: &Path) -> anyhow::Result<Vec<u8>> {
    let resolved = base_dir.join(path);
    fs::read(&resolved).with_context(|| format!("Failed to read image: {}", resolved.display()))
}
