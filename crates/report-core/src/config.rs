//! Composer configuration
//!
//! Every section deserializes with `#[serde(default)]`, so a config file only
//! needs to name what it overrides. Lengths are millimetres.

use crate::style::{Theme, Typography};
use serde::{Deserialize, Serialize};

/// Page size and margins
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    /// Distance from the bottom edge to the footer baseline
    pub footer_offset: f64,
}

impl Default for PageGeometry {
    /// A4 portrait
    fn default() -> Self {
        Self {
            width: 210.0,
            height: 297.0,
            margin_top: 15.0,
            margin_bottom: 20.0,
            margin_left: 20.0,
            margin_right: 20.0,
            footer_offset: 10.0,
        }
    }
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self::default()
    }

    pub fn letter() -> Self {
        Self {
            width: 215.9,
            height: 279.4,
            ..Self::default()
        }
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn content_width(&self) -> f64 {
        (self.width - self.margin_left - self.margin_right).max(0.0)
    }

    pub fn content_top(&self) -> f64 {
        self.margin_top
    }

    pub fn content_bottom(&self) -> f64 {
        (self.height - self.margin_bottom).max(self.margin_top)
    }

    pub fn content_height(&self) -> f64 {
        self.content_bottom() - self.content_top()
    }
}

/// Image pair placement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageBoxConfig {
    /// Side of the square each image is fitted into
    pub box_size: f64,
    /// Horizontal gap between the two boxes
    pub gutter: f64,
}

impl Default for ImageBoxConfig {
    fn default() -> Self {
        Self {
            box_size: 80.0,
            gutter: 10.0,
        }
    }
}

/// Fixed strings printed in the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportText {
    pub title: String,
    pub disclaimer: String,
    pub original_caption: String,
    pub annotated_caption: String,
    pub findings_heading: String,
    pub narrative_heading: String,
    pub missing_image: String,
    pub unreadable_image: String,
}

impl Default for ReportText {
    fn default() -> Self {
        Self {
            title: "Medical Imaging Analysis Report".to_string(),
            disclaimer: "This report is AI-generated and should be reviewed by a qualified medical professional.".to_string(),
            original_caption: "Original Image".to_string(),
            annotated_caption: "Analysis Result".to_string(),
            findings_heading: "Key Findings:".to_string(),
            narrative_heading: "Detailed Analysis:".to_string(),
            missing_image: "No image was supplied for this report.".to_string(),
            unreadable_image: "The supplied image could not be decoded.".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComposerConfig {
    pub page: PageGeometry,
    pub images: ImageBoxConfig,
    pub typography: Typography,
    pub theme: Theme,
    pub text: ReportText,
    /// Vertical space after each block
    pub block_gap: f64,
    /// Zlib level (0-9) for embedded image streams
    pub image_compression: u32,
}

impl Default for ComposerConfig {
    fn default() -> Self {
        Self {
            page: PageGeometry::default(),
            images: ImageBoxConfig::default(),
            typography: Typography::default(),
            theme: Theme::default(),
            text: ReportText::default(),
            block_gap: 4.0,
            image_compression: 6,
        }
    }
}
