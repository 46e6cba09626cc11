use snaplab_common::frame::PixelBuffer;

use super::basic::Channel;
use super::traits::PixelFilter;
use crate::color::luminance;

const ON: u8 = 255;
const OFF: u8 = 0;

#[inline]
fn binarize(value: f64, threshold: u8) -> [u8; 3] {
    // Strictly greater: a value equal to the threshold is off.
    let bit = if value > threshold as f64 { ON } else { OFF };
    [bit, bit, bit]
}

/// Binarizes one raw channel of the source.
#[derive(Debug, Clone, Copy)]
pub struct ChannelThreshold {
    pub channel: Channel,
    pub threshold: u8,
}

impl ChannelThreshold {
    pub fn new(channel: Channel, threshold: u8) -> Self {
        Self { channel, threshold }
    }
}

impl PixelFilter for ChannelThreshold {
    fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        let idx = self.channel.index();
        source.map_rgb(|r, g, b| binarize([r, g, b][idx] as f64, self.threshold))
    }

    fn name(&self) -> &str {
        match self.channel {
            Channel::Red => "red-threshold",
            Channel::Green => "green-threshold",
            Channel::Blue => "blue-threshold",
        }
    }
}

/// Binarizes the luminance of the source's RGB.
///
/// The pipeline feeds this an already false-colored buffer (HSV or Lab), so
/// it thresholds the brightness of the encoding, not of the scene. Alpha comes
/// from that source buffer.
#[derive(Debug, Clone, Copy)]
pub struct LuminanceThreshold {
    pub threshold: u8,
}

impl LuminanceThreshold {
    pub fn new(threshold: u8) -> Self {
        Self { threshold }
    }
}

impl PixelFilter for LuminanceThreshold {
    fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        source.map_rgb(|r, g, b| binarize(luminance(r, g, b), self.threshold))
    }

    fn name(&self) -> &str {
        "luminance-threshold"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::colorspace::HsvFalseColor;

    #[test]
    fn channel_threshold_is_strict() {
        let filter = ChannelThreshold::new(Channel::Red, 127);
        let above = PixelBuffer::filled(1, 1, [200, 0, 0, 180]);
        let equal = PixelBuffer::filled(1, 1, [127, 255, 255, 180]);
        assert_eq!(filter.apply(&above).pixel(0, 0), Some([255, 255, 255, 180]));
        assert_eq!(filter.apply(&equal).pixel(0, 0), Some([0, 0, 0, 180]));
    }

    #[test]
    fn channel_threshold_reads_selected_channel_only() {
        let src = PixelBuffer::filled(2, 2, [0, 90, 10, 255]);
        let green = ChannelThreshold::new(Channel::Green, 50).apply(&src);
        let blue = ChannelThreshold::new(Channel::Blue, 50).apply(&src);
        assert!(green.pixels().all(|px| px == [255, 255, 255, 255]));
        assert!(blue.pixels().all(|px| px == [0, 0, 0, 255]));
    }

    #[test]
    fn extreme_thresholds() {
        let src = PixelBuffer::filled(1, 1, [255, 0, 0, 255]);
        // Nothing exceeds 255.
        let out = ChannelThreshold::new(Channel::Red, 255).apply(&src);
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 255]));
        // 0 is not above 0.
        let out = ChannelThreshold::new(Channel::Green, 0).apply(&src);
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn luminance_threshold_uses_source_alpha() {
        let src = PixelBuffer::filled(1, 1, [200, 200, 200, 42]);
        let out = LuminanceThreshold::new(100).apply(&src);
        assert_eq!(out.pixel(0, 0), Some([255, 255, 255, 42]));
        let out = LuminanceThreshold::new(200).apply(&src);
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 42]));
    }

    #[test]
    fn luminance_threshold_sees_the_false_color_encoding() {
        // Pure red encodes to HSV (0, 255, 255): luminance 178.8 while the
        // true luminance of red is only 76.2.
        let base = PixelBuffer::filled(1, 1, [255, 0, 0, 255]);
        let hsv = HsvFalseColor.apply(&base);
        let out = LuminanceThreshold::new(150).apply(&hsv);
        assert_eq!(out.pixel(0, 0), Some([255, 255, 255, 255]));
        let out = LuminanceThreshold::new(150).apply(&base);
        assert_eq!(out.pixel(0, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn recompute_is_idempotent() {
        let src = PixelBuffer::from_raw(
            2,
            2,
            vec![
                10, 200, 30, 255, 130, 127, 128, 100, 255, 255, 255, 0, 0, 0, 0, 255,
            ],
        )
        .unwrap();
        let filter = ChannelThreshold::new(Channel::Green, 127);
        assert_eq!(filter.apply(&src), filter.apply(&src));
        let filter = LuminanceThreshold::new(127);
        assert_eq!(filter.apply(&src), filter.apply(&src));
    }
}
