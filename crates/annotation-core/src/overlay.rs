//! Region resolution and translucent rectangle fills

use image::RgbaImage;
use triage_types::{HighlightStyle, Region};

/// Absorbs float noise such as `0.1 + 0.2` before rounding to pixel edges
const EDGE_EPSILON: f64 = 1e-7;

/// Half-open pixel rectangle `[x0, x1) x [y0, y1)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }
}

fn resolve_span(start: f64, len: f64, dim: u32) -> (u32, u32) {
    let d = dim as f64;
    let lo = (start * d + EDGE_EPSILON).floor().clamp(0.0, d) as u32;
    let hi = ((start + len) * d - EDGE_EPSILON).ceil().clamp(0.0, d) as u32;
    (lo, hi.max(lo))
}

/// Map a fractional region onto pixels.
///
/// Any pixel the rectangle touches is covered, and the result never leaves
/// the image, so callers validate the region first.
pub fn resolve(region: &Region, width: u32, height: u32) -> PixelRect {
    let (x0, x1) = resolve_span(region.x, region.width, width);
    let (y0, y1) = resolve_span(region.y, region.height, height);
    PixelRect { x0, y0, x1, y1 }
}

/// Porter-Duff source-over of a flat colour onto one RGBA pixel
#[inline]
fn over(src: [u8; 4], paint: [f32; 3], alpha: f32) -> [u8; 4] {
    let src_alpha = src[3] as f32 / 255.0;
    let kept = src_alpha * (1.0 - alpha);
    let out_alpha = alpha + kept;
    if out_alpha <= 0.0 {
        return src;
    }

    let to_u8 = |v: f32| v.round().clamp(0.0, 255.0) as u8;
    let mut out = [0u8; 4];
    for (value, (&src_c, &paint_c)) in out.iter_mut().zip(src.iter().zip(paint.iter())) {
        *value = to_u8((paint_c * alpha + src_c as f32 * kept) / out_alpha);
    }
    out[3] = to_u8(out_alpha * 255.0);
    out
}

/// Alpha-over fill of `rect` with the style colour
pub fn fill_rect(image: &mut RgbaImage, rect: PixelRect, style: &HighlightStyle) {
    let alpha = style.effective_alpha();
    let paint = [style.red as f32, style.green as f32, style.blue as f32];

    for y in rect.y0..rect.y1 {
        for x in rect.x0..rect.x1 {
            let pixel = image.get_pixel_mut(x, y);
            pixel.0 = over(pixel.0, paint, alpha);
        }
    }
}
