use snaplab_common::frame::{Bounds, PixelBuffer, Region};

use super::overlay::draw_outline;
use super::RegionMode;
use crate::color::{luminance, store};
use crate::filter::colorspace::hsv_false_color;

/// Box blur radius: a 7x7 neighbourhood.
pub const BLUR_RADIUS: i64 = 3;
/// Pixelation block edge length.
pub const BLOCK_SIZE: u32 = 5;

/// Render `regions` onto a copy of `base` with the given mode.
///
/// Regions are applied in detector order, so where two overlap the later
/// one wins. Coordinates are floored and clipped to the buffer; regions
/// entirely outside it are skipped.
pub fn apply_regions(base: &PixelBuffer, regions: &[Region], mode: RegionMode) -> PixelBuffer {
    let mut out = base.clone();
    let (width, height) = (base.width(), base.height());

    if mode == RegionMode::Outline {
        for region in regions {
            draw_outline(&mut out, region);
        }
        return out;
    }

    for region in regions {
        let Some(bounds) = region.clip(width, height) else {
            continue;
        };
        match mode {
            RegionMode::Grayscale => grayscale_region(&mut out, bounds),
            RegionMode::Blur => blur_region(&mut out, bounds),
            RegionMode::Hsv => hsv_region(&mut out, bounds),
            RegionMode::Pixelate => {
                let origin = (region.x.floor() as i64, region.y.floor() as i64);
                pixelate_region(&mut out, bounds, origin);
            }
            RegionMode::Outline => {}
        }
    }

    out
}

/// Apply `f` to the RGB of every pixel inside `bounds`, in place.
fn map_bounds<F>(buf: &mut PixelBuffer, bounds: Bounds, mut f: F)
where
    F: FnMut(u8, u8, u8) -> [u8; 3],
{
    let width = buf.width() as usize;
    let data = buf.as_bytes_mut();
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            let i = (y as usize * width + x as usize) * 4;
            let [r, g, b] = f(data[i], data[i + 1], data[i + 2]);
            data[i] = r;
            data[i + 1] = g;
            data[i + 2] = b;
        }
    }
}

/// Plain luminance grayscale, no brightness boost.
pub fn grayscale_region(buf: &mut PixelBuffer, bounds: Bounds) {
    map_bounds(buf, bounds, |r, g, b| {
        let gray = store(luminance(r, g, b));
        [gray, gray, gray]
    });
}

pub fn hsv_region(buf: &mut PixelBuffer, bounds: Bounds) {
    map_bounds(buf, bounds, hsv_false_color);
}

/// Box blur over the region. Only samples inside the clipped region count
/// toward a pixel's mean, so the kernel shrinks at the region edges. Reads
/// come from a snapshot of the region taken before any pixel is written.
pub fn blur_region(buf: &mut PixelBuffer, bounds: Bounds) {
    let region_w = bounds.width() as usize;
    let region_h = bounds.height() as usize;

    let mut snapshot = Vec::with_capacity(region_w * region_h * 3);
    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            if let Some([r, g, b, _]) = buf.pixel(x, y) {
                snapshot.extend_from_slice(&[r, g, b]);
            }
        }
    }

    for y in bounds.y0..bounds.y1 {
        for x in bounds.x0..bounds.x1 {
            let mut sum = [0u32; 3];
            let mut count = 0u32;
            for by in y as i64 - BLUR_RADIUS..=y as i64 + BLUR_RADIUS {
                for bx in x as i64 - BLUR_RADIUS..=x as i64 + BLUR_RADIUS {
                    if !bounds.contains(bx, by) {
                        continue;
                    }
                    let local = (by as usize - bounds.y0 as usize) * region_w
                        + (bx as usize - bounds.x0 as usize);
                    let s = &snapshot[local * 3..local * 3 + 3];
                    sum[0] += s[0] as u32;
                    sum[1] += s[1] as u32;
                    sum[2] += s[2] as u32;
                    count += 1;
                }
            }
            // The centre pixel is always inside, so count >= 1.
            let n = count as f64;
            if let Some([_, _, _, a]) = buf.pixel(x, y) {
                buf.set_pixel(
                    x,
                    y,
                    [
                        store(sum[0] as f64 / n),
                        store(sum[1] as f64 / n),
                        store(sum[2] as f64 / n),
                        a,
                    ],
                );
            }
        }
    }
}

/// Grayscale the region, then replace every `BLOCK_SIZE` square (grid
/// anchored at the unclipped region origin) with its mean intensity.
pub fn pixelate_region(buf: &mut PixelBuffer, bounds: Bounds, origin: (i64, i64)) {
    grayscale_region(buf, bounds);

    let step = BLOCK_SIZE as i64;
    // Start of the grid block containing the clipped corner. The origin may
    // have saturated for far-off regions, hence the saturating distance.
    let (x0, y0) = (bounds.x0 as i64, bounds.y0 as i64);
    let first_x = x0 - x0.saturating_sub(origin.0).rem_euclid(step);
    let first_y = y0 - y0.saturating_sub(origin.1).rem_euclid(step);

    let mut block_y = first_y;
    while block_y < bounds.y1 as i64 {
        let mut block_x = first_x;
        while block_x < bounds.x1 as i64 {
            let block = Bounds {
                x0: block_x.max(bounds.x0 as i64) as u32,
                y0: block_y.max(bounds.y0 as i64) as u32,
                x1: (block_x + step).min(bounds.x1 as i64) as u32,
                y1: (block_y + step).min(bounds.y1 as i64) as u32,
            };
            fill_block_mean(buf, block);
            block_x += step;
        }
        block_y += step;
    }
}

fn fill_block_mean(buf: &mut PixelBuffer, block: Bounds) {
    let mut total = 0u32;
    let mut count = 0u32;
    for y in block.y0..block.y1 {
        for x in block.x0..block.x1 {
            if let Some([intensity, _, _, _]) = buf.pixel(x, y) {
                total += intensity as u32;
                count += 1;
            }
        }
    }
    if count == 0 {
        return;
    }
    let mean = store(total as f64 / count as f64);
    map_bounds(buf, block, |_, _, _| [mean, mean, mean]);
}
