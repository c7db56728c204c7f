//! Regions of interest in fractional image coordinates

use serde::{Deserialize, Serialize};
use std::fmt;

/// Slack allowed on the `x + width <= 1` style checks
const BOUND_EPSILON: f64 = 1e-9;

/// A rectangle relative to the image size.
///
/// All four components live in `[0, 1]`; `x + width` and `y + height` must
/// not pass the far edge. The renderer resolves them against the actual
/// pixel dimensions, so the same region works at any resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Which rule a malformed region breaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegionFault {
    /// A component is NaN or infinite
    NonFinite,
    /// A component is outside `[0, 1]`
    OutOfUnitRange,
    /// The rectangle extends past the right or bottom edge
    ExceedsBounds,
}

impl fmt::Display for RegionFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionFault::NonFinite => write!(f, "component is not a finite number"),
            RegionFault::OutOfUnitRange => write!(f, "component outside [0, 1]"),
            RegionFault::ExceedsBounds => write!(f, "rectangle extends past the image edge"),
        }
    }
}

impl Region {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    fn components(&self) -> [f64; 4] {
        [self.x, self.y, self.width, self.height]
    }

    /// Validate the region against the unit square
    pub fn check(&self) -> Result<(), RegionFault> {
        let parts = self.components();
        if parts.iter().any(|v| !v.is_finite()) {
            return Err(RegionFault::NonFinite);
        }
        if parts
            .iter()
            .any(|v| *v < -BOUND_EPSILON || *v > 1.0 + BOUND_EPSILON)
        {
            return Err(RegionFault::OutOfUnitRange);
        }
        if self.x + self.width > 1.0 + BOUND_EPSILON || self.y + self.height > 1.0 + BOUND_EPSILON
        {
            return Err(RegionFault::ExceedsBounds);
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.check().is_ok()
    }

    /// Intersect with the unit square.
    ///
    /// Returns `None` for non-finite regions, which have no meaningful
    /// intersection. A region entirely outside the square clips to zero area.
    pub fn clipped(&self) -> Option<Region> {
        if self.components().iter().any(|v| !v.is_finite()) {
            return None;
        }
        let x0 = self.x.clamp(0.0, 1.0);
        let y0 = self.y.clamp(0.0, 1.0);
        let x1 = (self.x + self.width.max(0.0)).clamp(0.0, 1.0);
        let y1 = (self.y + self.height.max(0.0)).clamp(0.0, 1.0);
        Some(Region {
            x: x0,
            y: y0,
            width: (x1 - x0).max(0.0),
            height: (y1 - y0).max(0.0),
        })
    }
}

/// Flat translucent fill used to highlight a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    /// Opacity in `[0, 1]`
    pub alpha: f32,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            red: 255,
            green: 0,
            blue: 0,
            alpha: 0.4,
        }
    }
}

impl HighlightStyle {
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red,
            green,
            blue,
            ..Self::default()
        }
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    /// Alpha clamped to `[0, 1]`; NaN counts as fully transparent
    pub fn effective_alpha(&self) -> f32 {
        if self.alpha.is_nan() {
            0.0
        } else {
            self.alpha.clamp(0.0, 1.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_image_region_is_well_formed() {
        assert_eq!(Region::new(0.0, 0.0, 1.0, 1.0).check(), Ok(()));
    }

    #[test]
    fn test_region_past_edge_is_rejected() {
        let region = Region::new(0.9, 0.9, 0.3, 0.3);
        assert_eq!(region.check(), Err(RegionFault::ExceedsBounds));
    }

    #[test]
    fn test_negative_component_is_out_of_range() {
        let region = Region::new(-0.1, 0.2, 0.3, 0.3);
        assert_eq!(region.check(), Err(RegionFault::OutOfUnitRange));
    }

    #[test]
    fn test_nan_is_non_finite() {
        let region = Region::new(f64::NAN, 0.2, 0.3, 0.3);
        assert_eq!(region.check(), Err(RegionFault::NonFinite));
        assert!(region.clipped().is_none());
    }

    #[test]
    fn test_float_noise_at_edge_is_tolerated() {
        // 0.7 + 0.3 is 1.0000000000000002 in binary floating point
        let region = Region::new(0.7, 0.7, 0.3, 0.3);
        assert!(region.is_well_formed());
    }

    #[test]
    fn test_clipping_trims_to_unit_square() {
        let clipped = Region::new(0.9, 0.9, 0.3, 0.3).clipped().unwrap();
        assert!((clipped.x - 0.9).abs() < 1e-12);
        assert!((clipped.width - 0.1).abs() < 1e-12);
        assert!((clipped.height - 0.1).abs() < 1e-12);
        assert!(clipped.is_well_formed());
    }

    #[test]
    fn test_clipping_region_outside_gives_zero_area() {
        let clipped = Region::new(1.5, 0.0, 0.5, 0.5).clipped().unwrap();
        assert_eq!(clipped.width, 0.0);
    }

    #[test]
    fn test_default_highlight_is_translucent_red() {
        let style = HighlightStyle::default();
        assert_eq!((style.red, style.green, style.blue), (255, 0, 0));
        assert!((style.alpha - 0.4).abs() < f32::EPSILON);
    }

    #[test]
    fn test_highlight_partial_json_uses_defaults() {
        let style: HighlightStyle = serde_json::from_str(r#"{"blue":200}"#).unwrap();
        assert_eq!(style.red, 255);
        assert_eq!(style.blue, 200);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: clipping any finite region yields a well-formed region
        #[test]
        fn clipped_regions_are_well_formed(
            x in -2.0f64..2.0,
            y in -2.0f64..2.0,
            w in -1.0f64..3.0,
            h in -1.0f64..3.0,
        ) {
            let clipped = Region::new(x, y, w, h).clipped().unwrap();
            prop_assert!(clipped.is_well_formed(), "{:?}", clipped);
        }

        /// Property: clipping leaves well-formed regions unchanged
        #[test]
        fn clipping_is_identity_inside(
            x in 0.0f64..0.5,
            y in 0.0f64..0.5,
            w in 0.0f64..0.5,
            h in 0.0f64..0.5,
        ) {
            let region = Region::new(x, y, w, h);
            let clipped = region.clipped().unwrap();
            prop_assert!((clipped.x - x).abs() < 1e-12);
            prop_assert!((clipped.width - w).abs() < 1e-12);
            prop_assert!((clipped.height - h).abs() < 1e-12);
        }
    }
}
