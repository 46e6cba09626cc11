use snaplab_common::frame::{PixelBuffer, Region};

use crate::color::store;

const GREEN: [u8; 3] = [0, 255, 0];
const BLACK: [u8; 3] = [0, 0, 0];
const RED: [u8; 3] = [255, 0, 0];
const YELLOW: [u8; 3] = [255, 255, 0];

const OUTLINE_FILL_OPACITY: f64 = 0.1;
const OUTLINE_STROKE: i64 = 2;
const PLACEHOLDER_OPACITY: f64 = 0.7;

/// Position and size of the "no regions" badge.
const BADGE: (i64, i64, i64, i64) = (5, 5, 100, 30);

/// Source-over blend of an opaque `color` at `opacity` onto one pixel.
fn blend(dst: &mut [u8], color: [u8; 3], opacity: f64) {
    for c in 0..3 {
        dst[c] = store(color[c] as f64 * opacity + dst[c] as f64 * (1.0 - opacity));
    }
}

/// Blend `color` over the rectangle `[x0, x1) x [y0, y1)`, clipped to the
/// buffer. Only RGB changes; alpha stays that of the base.
fn fill_rect(buf: &mut PixelBuffer, rect: (i64, i64, i64, i64), color: [u8; 3], opacity: f64) {
    let (x0, y0, x1, y1) = rect;
    let x0 = x0.max(0);
    let y0 = y0.max(0);
    let x1 = x1.min(buf.width() as i64);
    let y1 = y1.min(buf.height() as i64);
    if x0 >= x1 || y0 >= y1 {
        return;
    }
    let width = buf.width() as usize;
    let data = buf.as_bytes_mut();
    for y in y0..y1 {
        for x in x0..x1 {
            let i = (y as usize * width + x as usize) * 4;
            blend(&mut data[i..i + 3], color, opacity);
        }
    }
}

/// Draw one detection box: a faint green fill plus a 2 px green border
/// centred on the box edge, so it extends one pixel outside the box.
pub fn draw_outline(buf: &mut PixelBuffer, region: &Region) {
    if !region.is_finite() {
        return;
    }
    let x = region.x.floor() as i64;
    let y = region.y.floor() as i64;
    let w = region.width.floor() as i64;
    let h = region.height.floor() as i64;
    if w <= 0 || h <= 0 {
        return;
    }

    // Casts saturate, so far-off edges stay far off instead of wrapping.
    let x1 = (region.x.floor() + region.width.floor()) as i64;
    let y1 = (region.y.floor() + region.height.floor()) as i64;
    fill_rect(buf, (x, y, x1, y1), GREEN, OUTLINE_FILL_OPACITY);

    let half = OUTLINE_STROKE / 2;
    let (ox0, oy0) = (x.saturating_sub(half), y.saturating_sub(half));
    let (ox1, oy1) = (x1.saturating_add(half), y1.saturating_add(half));
    let (ix0, iy0) = (x.saturating_add(half), y.saturating_add(half));
    let (ix1, iy1) = (x1.saturating_sub(half), y1.saturating_sub(half));
    // Four bands: top, bottom, then the left and right sides between them.
    fill_rect(buf, (ox0, oy0, ox1, iy0), GREEN, 1.0);
    fill_rect(buf, (ox0, iy1.max(iy0), ox1, oy1), GREEN, 1.0);
    fill_rect(buf, (ox0, iy0, ix0, iy1), GREEN, 1.0);
    fill_rect(buf, (ix1.max(ix0), iy0, ox1, iy1), GREEN, 1.0);
}

/// What the region slot shows when there are no region results to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    /// Detector still loading.
    Loading,
    /// Detector failed for this frame.
    Error,
    /// Detector ran and found nothing.
    NoRegions,
}

impl Placeholder {
    pub fn render(self, base: &PixelBuffer) -> PixelBuffer {
        let mut out = base.clone();
        let full = (0, 0, base.width() as i64, base.height() as i64);
        match self {
            Placeholder::Loading => fill_rect(&mut out, full, BLACK, PLACEHOLDER_OPACITY),
            Placeholder::Error => fill_rect(&mut out, full, RED, PLACEHOLDER_OPACITY),
            Placeholder::NoRegions => {
                let (x, y, w, h) = BADGE;
                fill_rect(&mut out, (x, y, x + w, y + h), YELLOW, PLACEHOLDER_OPACITY);
            }
        }
        out
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Placeholder::Loading => "loading",
            Placeholder::Error => "error",
            Placeholder::NoRegions => "no-regions",
        }
    }
}
