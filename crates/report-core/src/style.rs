//! Semantic text styling
//!
//! Blocks carry roles, not colours. The PDF writer resolves roles through a
//! [`Theme`] at the very end.

use serde::{Deserialize, Serialize};

/// Millimetres per PDF point
pub const PT_TO_MM: f64 = 25.4 / 72.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorRole {
    Heading,
    #[default]
    Body,
    Muted,
    Accent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    /// Font size in points
    pub size: f64,
    pub weight: FontWeight,
    pub role: ColorRole,
}

impl TextStyle {
    pub fn new(size: f64, role: ColorRole) -> Self {
        Self {
            size,
            weight: FontWeight::Regular,
            role,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    /// Vertical advance of one line in millimetres
    pub fn line_height(&self, spacing: f64) -> f64 {
        self.size * PT_TO_MM * spacing
    }
}

/// Font sizes (points) per block kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Typography {
    pub title: f64,
    pub subtitle: f64,
    pub key_value: f64,
    pub section: f64,
    pub body: f64,
    pub footer: f64,
    /// Line advance as a multiple of the font size
    pub line_spacing: f64,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            title: 20.0,
            subtitle: 10.0,
            key_value: 12.0,
            section: 14.0,
            body: 11.0,
            footer: 8.0,
            line_spacing: 1.5,
        }
    }
}

impl Typography {
    pub fn title(&self) -> TextStyle {
        TextStyle::new(self.title, ColorRole::Accent).bold()
    }

    pub fn subtitle(&self) -> TextStyle {
        TextStyle::new(self.subtitle, ColorRole::Muted)
    }

    pub fn key_value(&self) -> TextStyle {
        TextStyle::new(self.key_value, ColorRole::Body)
    }

    pub fn metadata(&self) -> TextStyle {
        TextStyle::new(self.subtitle, ColorRole::Muted)
    }

    pub fn section(&self) -> TextStyle {
        TextStyle::new(self.section, ColorRole::Heading).bold()
    }

    pub fn body(&self) -> TextStyle {
        TextStyle::new(self.body, ColorRole::Body)
    }

    pub fn footer(&self) -> TextStyle {
        TextStyle::new(self.footer, ColorRole::Muted)
    }
}

/// RGB colours (0-255) for each role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub heading: [u8; 3],
    pub body: [u8; 3],
    pub muted: [u8; 3],
    pub accent: [u8; 3],
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            heading: [33, 33, 33],
            body: [0, 0, 0],
            muted: [120, 120, 120],
            accent: [0, 150, 136],
        }
    }
}

impl Theme {
    pub fn color(&self, role: ColorRole) -> [u8; 3] {
        match role {
            ColorRole::Heading => self.heading,
            ColorRole::Body => self.body,
            ColorRole::Muted => self.muted,
            ColorRole::Accent => self.accent,
        }
    }

    /// Colour as PDF `rg` operands in `0..=1`
    pub fn rgb_f32(&self, role: ColorRole) -> (f32, f32, f32) {
        let [r, g, b] = self.color(role);
        (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}
