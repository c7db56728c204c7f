//! Region-of-interest highlighting for scan images
//!
//! Takes an encoded raster image plus fractional regions and returns a new
//! image with each region painted over by a flat translucent colour.
//!
//! - `annotate`: encoded bytes in, PNG bytes out
//! - `annotate_rgba`: pixel buffer in, pixel buffer out

pub mod error;
pub mod overlay;

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};
use triage_types::{HighlightStyle, Region};

pub use error::AnnotateError;
pub use overlay::{resolve, PixelRect};

/// How regions are painted
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotateOptions {
    pub style: HighlightStyle,
    /// Trim out-of-range regions to the image instead of rejecting them
    pub clip_out_of_bounds: bool,
}

impl AnnotateOptions {
    pub fn with_style(mut self, style: HighlightStyle) -> Self {
        self.style = style;
        self
    }

    pub fn clipping(mut self, clip: bool) -> Self {
        self.clip_out_of_bounds = clip;
        self
    }
}

/// Decode encoded image bytes into 8-bit RGBA pixels.
///
/// Grayscale, palette and 16-bit inputs are converted, so 16-bit precision
/// is lost here.
pub fn decode(bytes: &[u8]) -> Result<RgbaImage, AnnotateError> {
    let image =
        image::load_from_memory(bytes).map_err(|e| AnnotateError::ImageDecode(e.to_string()))?;
    Ok(image.to_rgba8())
}

/// Encode RGBA pixels as PNG with fixed settings so output is reproducible
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, AnnotateError> {
    let mut output = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut output, CompressionType::Default, FilterType::Adaptive);
    encoder
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| AnnotateError::Encode(e.to_string()))?;
    Ok(output)
}

/// Validate every region and map it to pixels.
///
/// Fails on the first malformed region, before anything is painted.
fn resolve_all(
    regions: &[Region],
    width: u32,
    height: u32,
    clip: bool,
) -> Result<Vec<PixelRect>, AnnotateError> {
    regions
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let usable = match region.check() {
                Ok(()) => *region,
                Err(fault) => {
                    let clipped = if clip { region.clipped() } else { None };
                    match clipped {
                        Some(clipped) => {
                            tracing::debug!(index, ?region, ?clipped, "clipped region");
                            clipped
                        }
                        None => {
                            return Err(AnnotateError::InvalidRegion {
                                index,
                                region: *region,
                                fault,
                            })
                        }
                    }
                }
            };
            Ok(resolve(&usable, width, height))
        })
        .collect()
}

/// Paint regions onto a copy of `image`
pub fn annotate_rgba(
    image: &RgbaImage,
    regions: &[Region],
    options: &AnnotateOptions,
) -> Result<RgbaImage, AnnotateError> {
    let rects = resolve_all(
        regions,
        image.width(),
        image.height(),
        options.clip_out_of_bounds,
    )?;

    let mut annotated = image.clone();
    for rect in rects.iter().filter(|r| !r.is_empty()) {
        overlay::fill_rect(&mut annotated, *rect, &options.style);
    }

    tracing::debug!(
        width = image.width(),
        height = image.height(),
        regions = rects.len(),
        "annotated image"
    );
    Ok(annotated)
}

/// Decode `image`, highlight `regions` and return the result as PNG bytes.
///
/// The output always has the input's pixel dimensions and is always 8-bit
/// RGBA PNG. With no regions the pixels come back unchanged as seen through
/// [`decode`]; a 16-bit or grayscale input is returned in its 8-bit RGBA form.
pub fn annotate(
    image: &[u8],
    regions: &[Region],
    options: &AnnotateOptions,
) -> Result<Vec<u8>, AnnotateError> {
    let pixels = decode(image)?;
    let annotated = annotate_rgba(&pixels, regions, options)?;
    encode_png(&annotated)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use image::Rgba;
    use proptest::prelude::*;

    fn region_inside() -> impl Strategy<Value = Region> {
        (0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0, 0.0f64..1.0)
            .prop_map(|(x, y, fw, fh)| Region::new(x, y, (1.0 - x) * fw, (1.0 - y) * fh))
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: well-formed regions never change the image size
        #[test]
        fn dimensions_are_preserved(
            width in 1u32..48,
            height in 1u32..48,
            regions in prop::collection::vec(region_inside(), 0..6),
        ) {
            let base = RgbaImage::from_pixel(width, height, Rgba([10, 20, 30, 255]));
            let out = annotate_rgba(&base, &regions, &AnnotateOptions::default()).unwrap();
            prop_assert_eq!(out.dimensions(), (width, height));
        }

        /// Property: identical inputs encode to identical bytes
        #[test]
        fn encoding_is_deterministic(
            regions in prop::collection::vec(region_inside(), 1..4),
        ) {
            let base = RgbaImage::from_fn(24, 24, |x, y| Rgba([x as u8 * 8, y as u8 * 8, 77, 255]));
            let first = encode_png(&annotate_rgba(&base, &regions, &AnnotateOptions::default()).unwrap()).unwrap();
            let second = encode_png(&annotate_rgba(&base, &regions, &AnnotateOptions::default()).unwrap()).unwrap();
            prop_assert_eq!(first, second);
        }

        /// Property: pixels outside every region are untouched
        #[test]
        fn pixels_outside_regions_untouched(region in region_inside()) {
            let base = RgbaImage::from_pixel(20, 20, Rgba([10, 20, 30, 255]));
            let out = annotate_rgba(&base, &[region], &AnnotateOptions::default()).unwrap();
            let rect = resolve(&region, 20, 20);
            for (x, y, pixel) in out.enumerate_pixels() {
                if !rect.contains(x, y) {
                    prop_assert_eq!(pixel, base.get_pixel(x, y));
                }
            }
        }
    }
}
