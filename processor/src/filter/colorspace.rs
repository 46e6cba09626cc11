use snaplab_common::frame::PixelBuffer;

use super::traits::PixelFilter;
use crate::color::{clamp_channel, rgb_to_hsv, rgb_to_lab, round_half_up, store};

/// Encode HSV as RGB: hue -> red, saturation -> green, value -> blue.
pub fn hsv_false_color(r: u8, g: u8, b: u8) -> [u8; 3] {
    let hsv = rgb_to_hsv(r, g, b);
    [
        store(round_half_up(hsv.h / 360.0 * 255.0)),
        store(round_half_up(hsv.s / 100.0 * 255.0)),
        store(round_half_up(hsv.v / 100.0 * 255.0)),
    ]
}

/// Encode CIE Lab as RGB: L -> red, a -> green, b -> blue.
///
/// a and b are shifted by 128 without a prior clamp; the mapped value is
/// clamped to the channel range first and rounded afterwards.
pub fn lab_false_color(r: u8, g: u8, b: u8) -> [u8; 3] {
    let lab = rgb_to_lab(r, g, b);
    let red = clamp_channel(lab.l / 100.0 * 255.0);
    let green = clamp_channel((lab.a + 128.0) / 256.0 * 255.0);
    let blue = clamp_channel((lab.b + 128.0) / 256.0 * 255.0);
    [
        store(round_half_up(red)),
        store(round_half_up(green)),
        store(round_half_up(blue)),
    ]
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HsvFalseColor;

impl PixelFilter for HsvFalseColor {
    fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        source.map_rgb(hsv_false_color)
    }

    fn name(&self) -> &str {
        "hsv"
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LabFalseColor;

impl PixelFilter for LabFalseColor {
    fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        source.map_rgb(lab_false_color)
    }

    fn name(&self) -> &str {
        "lab"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hsv_encoding_of_primaries() {
        assert_eq!(hsv_false_color(255, 0, 0), [0, 255, 255]);
        assert_eq!(hsv_false_color(0, 0, 0), [0, 0, 0]);
        assert_eq!(hsv_false_color(255, 255, 255), [0, 0, 255]);
        // 120 / 360 * 255 = 85
        assert_eq!(hsv_false_color(0, 255, 0), [85, 255, 255]);
        // 240 / 360 * 255 = 170
        assert_eq!(hsv_false_color(0, 0, 255), [170, 255, 255]);
    }

    #[test]
    fn hsv_encoding_rounds_half_up() {
        // Hue 60 maps to exactly 42.5 and hue 12 to exactly 8.5; a
        // half-to-even store would give 42 and 8.
        assert_eq!(hsv_false_color(5, 5, 0), [43, 255, 5]);
        assert_eq!(hsv_false_color(25, 5, 0), [9, 255, 25]);
    }

    #[test]
    fn lab_encoding_of_white_and_black() {
        // The sRGB matrix rows put white a hair off neutral (a slightly
        // negative, b slightly positive), so 127.5 splits both ways.
        assert_eq!(lab_false_color(255, 255, 255), [255, 127, 128]);
        assert_eq!(lab_false_color(0, 0, 0), [0, 128, 128]);
    }

    #[test]
    fn lab_encoding_of_red() {
        // L 53.24, a 80.09, b 67.20
        assert_eq!(lab_false_color(255, 0, 0), [136, 207, 194]);
    }

    #[test]
    fn filters_preserve_alpha() {
        let src = PixelBuffer::filled(3, 2, [12, 200, 90, 33]);
        assert!(HsvFalseColor.apply(&src).pixels().all(|px| px[3] == 33));
        assert!(LabFalseColor.apply(&src).pixels().all(|px| px[3] == 33));
    }
}
