//! Block assembly: Finding Record in, ordered semantic blocks out
//!
//! Nothing here knows about pages. Blocks keep their content and a semantic
//! style; the layout pass decides where they land.

use crate::config::ComposerConfig;
use crate::error::ReportError;
use crate::style::TextStyle;
use triage_types::{FindingRecord, ReportMetadata};

/// Decoded image ready for embedding, RGB8 with no alpha
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterImage {
    /// Decode an encoded image, flattening transparency onto white
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        let rgba = image::load_from_memory(bytes)?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            let a = a as u32;
            for c in [r, g, b] {
                rgb.push(((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8);
            }
        }
        Ok(Self { width, height, rgb })
    }
}

/// Scale `(width, height)` to fit a `box_size` square, keeping the aspect ratio.
///
/// The longer side becomes exactly `box_size`.
pub fn fit_within(width: u32, height: u32, box_size: f64) -> (f64, f64) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }
    let (w, h) = (width as f64, height as f64);
    if width >= height {
        (box_size, box_size * h / w)
    } else {
        (box_size * w / h, box_size)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContent {
    Raster(RasterImage),
    /// Explanation shown in a framed box instead of the image
    Placeholder(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    pub caption: String,
    pub content: SlotContent,
}

impl ImageSlot {
    fn from_bytes(caption: &str, bytes: Option<&[u8]>, config: &ComposerConfig) -> Self {
        let content = match bytes {
            None => SlotContent::Placeholder(config.text.missing_image.clone()),
            Some(bytes) => match RasterImage::decode(bytes) {
                Ok(raster) => SlotContent::Raster(raster),
                Err(err) => {
                    tracing::warn!(caption, error = %err, "image could not be decoded, using placeholder");
                    SlotContent::Placeholder(config.text.unreadable_image.clone())
                }
            },
        };
        Self {
            caption: caption.to_string(),
            content,
        }
    }

    /// Display size inside a `box_size` square
    pub fn display_size(&self, box_size: f64) -> (f64, f64) {
        match &self.content {
            SlotContent::Raster(raster) => fit_within(raster.width, raster.height, box_size),
            SlotContent::Placeholder(_) => (box_size, box_size),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Title,
    Subtitle,
    KeyValue,
    ImagePair,
    NumberedList,
    Paragraph,
    Footer,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title {
        text: String,
        style: TextStyle,
    },
    Subtitle {
        text: String,
        style: TextStyle,
    },
    KeyValue {
        entries: Vec<(String, String)>,
        style: TextStyle,
    },
    ImagePair {
        left: ImageSlot,
        right: ImageSlot,
        caption_style: TextStyle,
        note_style: TextStyle,
        /// Square each image is fitted into
        box_size: f64,
        gutter: f64,
    },
    NumberedList {
        heading: String,
        heading_style: TextStyle,
        items: Vec<String>,
        style: TextStyle,
    },
    Paragraph {
        heading: String,
        heading_style: TextStyle,
        text: String,
        style: TextStyle,
    },
    Footer {
        text: String,
        style: TextStyle,
    },
}

impl Block {
    pub fn kind(&self) -> BlockKind {
        match self {
            Block::Title { .. } => BlockKind::Title,
            Block::Subtitle { .. } => BlockKind::Subtitle,
            Block::KeyValue { .. } => BlockKind::KeyValue,
            Block::ImagePair { .. } => BlockKind::ImagePair,
            Block::NumberedList { .. } => BlockKind::NumberedList,
            Block::Paragraph { .. } => BlockKind::Paragraph,
            Block::Footer { .. } => BlockKind::Footer,
        }
    }

    /// Text blocks paginate per line; everything else moves as a unit
    pub fn splits_across_pages(&self) -> bool {
        matches!(self, Block::NumberedList { .. } | Block::Paragraph { .. })
    }
}

/// Map a Finding Record onto the report's block sequence
pub fn assemble(
    record: &FindingRecord,
    meta: &ReportMetadata,
    config: &ComposerConfig,
) -> Result<Vec<Block>, ReportError> {
    if !record.has_content() {
        return Err(ReportError::EmptyRecord);
    }

    let typo = &config.typography;
    let text = &config.text;
    let mut blocks = vec![
        Block::Title {
            text: text.title.clone(),
            style: typo.title(),
        },
        Block::Subtitle {
            text: format!("Generated: {}", meta.generated_at),
            style: typo.subtitle(),
        },
    ];

    let subject = meta.subject_id.as_ref().or(record.subject_id.as_ref());
    let details: Vec<(String, String)> = [
        ("Subject ID", subject),
        ("Study Date", record.date.as_ref()),
        ("Image Type", meta.image_type.as_ref()),
    ]
    .into_iter()
    .filter_map(|(key, value)| value.map(|v| (key.to_string(), v.clone())))
    .collect();
    if !details.is_empty() {
        blocks.push(Block::KeyValue {
            entries: details,
            style: typo.metadata(),
        });
    }

    blocks.push(Block::KeyValue {
        entries: vec![(
            "Confidence Score".to_string(),
            record.confidence.to_string(),
        )],
        style: typo.key_value(),
    });

    // Shrink the boxes only when two of them cannot sit side by side
    let gutter = config.images.gutter;
    let available = (config.page.content_width() - gutter) / 2.0;
    let box_size = config.images.box_size.min(available).max(0.0);
    blocks.push(Block::ImagePair {
        left: ImageSlot::from_bytes(
            &text.original_caption,
            record.source_image.as_deref(),
            config,
        ),
        right: ImageSlot::from_bytes(
            &text.annotated_caption,
            record.annotated_image.as_deref(),
            config,
        ),
        caption_style: typo.section(),
        note_style: typo.footer(),
        box_size,
        gutter,
    });

    if !record.summary_findings.is_empty() {
        blocks.push(Block::NumberedList {
            heading: text.findings_heading.clone(),
            heading_style: typo.section(),
            items: record.summary_findings.clone(),
            style: typo.body(),
        });
    }

    let narrative = record.narrative.trim();
    if !narrative.is_empty() {
        blocks.push(Block::Paragraph {
            heading: text.narrative_heading.clone(),
            heading_style: typo.section(),
            text: narrative.to_string(),
            style: typo.body(),
        });
    }

    blocks.push(Block::Footer {
        text: text.disclaimer.clone(),
        style: typo.footer(),
    });

    Ok(blocks)
}
