//! Triage report composition
//!
//! Turns a Finding Record into a paginated PDF in three stages:
//! - `blocks::assemble`: record to semantic blocks
//! - `layout::paginate`: blocks to positioned elements on pages
//! - `pdf::render`: pages to PDF bytes
//!
//! Every stage is a pure function of its inputs. The generation timestamp is
//! supplied by the caller, so identical inputs give identical bytes.

pub mod blocks;
pub mod config;
pub mod error;
pub mod layout;
pub mod measure;
pub mod pdf;
pub mod style;

pub use blocks::{assemble, Block, BlockKind, ImageSlot, RasterImage, SlotContent};
pub use config::{ComposerConfig, ImageBoxConfig, PageGeometry, ReportText};
pub use error::ReportError;
pub use layout::{paginate, Element, Layout, Page, Rect};
pub use measure::{wrap_text, Helvetica, TextMeasure};
pub use style::{ColorRole, FontWeight, TextStyle, Theme, Typography};

use triage_types::{FindingRecord, ReportMetadata};

/// Report composer with a fixed configuration and text metrics
pub struct ReportComposer {
    config: ComposerConfig,
    measure: Box<dyn TextMeasure>,
}

impl Default for ReportComposer {
    fn default() -> Self {
        Self::new(ComposerConfig::default())
    }
}

impl ReportComposer {
    pub fn new(config: ComposerConfig) -> Self {
        Self {
            config,
            measure: Box::new(Helvetica),
        }
    }

    /// Swap the text metrics, e.g. for fixed-width test metrics
    pub fn with_measure(mut self, measure: impl TextMeasure + 'static) -> Self {
        self.measure = Box::new(measure);
        self
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    pub fn assemble(
        &self,
        record: &FindingRecord,
        meta: &ReportMetadata,
    ) -> Result<Vec<Block>, ReportError> {
        assemble(record, meta, &self.config)
    }

    pub fn layout<'a>(&self, blocks: &'a [Block]) -> Layout<'a> {
        paginate(blocks, &self.config, self.measure.as_ref())
    }

    /// Compose the full report and serialize it to PDF
    pub fn compose(
        &self,
        record: &FindingRecord,
        meta: &ReportMetadata,
    ) -> Result<Vec<u8>, ReportError> {
        let blocks = self.assemble(record, meta)?;
        let layout = self.layout(&blocks);
        let info = pdf::DocumentInfo {
            title: self.config.text.title.clone(),
            generated_at: meta.generated_at.clone(),
            subject_id: meta.subject_id.clone().or_else(|| record.subject_id.clone()),
        };
        let bytes = pdf::render(
            &layout,
            &self.config.theme,
            &info,
            self.config.image_compression,
        )?;

        tracing::debug!(
            pages = layout.page_count(),
            bytes = bytes.len(),
            findings = record.summary_findings.len(),
            "composed report"
        );
        Ok(bytes)
    }
}

/// Compose a report with the default configuration
pub fn compose(record: &FindingRecord, meta: &ReportMetadata) -> Result<Vec<u8>, ReportError> {
    ReportComposer::default().compose(record, meta)
}
