use rand::Rng;
use snaplab_common::frame::PixelBuffer;

use super::traits::PixelFilter;
use crate::color::{clamp_channel, contrast_curve, luminance, round_half_up, store, ContrastFactor};

/// One of the three color channels of an RGBA sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Red,
    Green,
    Blue,
}

impl Channel {
    /// Byte offset of this channel inside an RGBA sample.
    pub fn index(self) -> usize {
        match self {
            Channel::Red => 0,
            Channel::Green => 1,
            Channel::Blue => 2,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Channel::Red => "red",
            Channel::Green => "green",
            Channel::Blue => "blue",
        }
    }
}

/// Luminance grayscale with a multiplicative brightness boost.
#[derive(Debug, Clone, Copy)]
pub struct Grayscale {
    pub boost: f64,
}

impl Grayscale {
    pub const DEFAULT_BOOST: f64 = 1.2;

    pub fn new(boost: f64) -> Self {
        Self { boost }
    }
}

impl Default for Grayscale {
    fn default() -> Self {
        Self::new(Self::DEFAULT_BOOST)
    }
}

impl PixelFilter for Grayscale {
    fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        source.map_rgb(|r, g, b| {
            let gray = store(luminance(r, g, b) * self.boost);
            [gray, gray, gray]
        })
    }

    fn name(&self) -> &str {
        "grayscale"
    }
}

/// Per-pixel noise added by the X-ray filter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Noise {
    /// Uniform noise in `[-width/2, width/2)`.
    Uniform { width: f64 },
    /// A constant offset; `Fixed(0.0)` makes the filter deterministic.
    Fixed(f64),
}

impl Noise {
    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        match *self {
            Noise::Uniform { width } => (rng.gen::<f64>() - 0.5) * width,
            Noise::Fixed(offset) => offset,
        }
    }
}

/// Simulated radiograph: contrast-enhanced, inverted luminance with grain
/// and a cold blue tint.
#[derive(Debug, Clone, Copy)]
pub struct XRay {
    pub contrast: ContrastFactor,
    pub noise: Noise,
}

impl XRay {
    const TINT: [f64; 3] = [0.7, 0.8, 1.0];

    pub fn new(contrast: ContrastFactor, noise: Noise) -> Self {
        Self { contrast, noise }
    }

    /// Tinted output for one pixel given its noise sample.
    fn shade(&self, r: u8, g: u8, b: u8, noise: f64) -> [u8; 3] {
        let gray = contrast_curve(luminance(r, g, b), self.contrast);
        let inverted = 255.0 - gray;
        let noisy = clamp_channel(inverted + noise);
        [
            store(round_half_up(noisy * Self::TINT[0])),
            store(round_half_up(noisy * Self::TINT[1])),
            store(noisy * Self::TINT[2]),
        ]
    }
}

impl PixelFilter for XRay {
    fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        let mut rng = rand::thread_rng();
        source.map_rgb(|r, g, b| {
            let noise = self.noise.sample(&mut rng);
            self.shade(r, g, b, noise)
        })
    }

    fn name(&self) -> &str {
        "xray"
    }
}

/// Keeps a single channel's raw value and zeroes the other two.
#[derive(Debug, Clone, Copy)]
pub struct ChannelIsolation {
    pub channel: Channel,
}

impl ChannelIsolation {
    pub fn new(channel: Channel) -> Self {
        Self { channel }
    }
}

impl PixelFilter for ChannelIsolation {
    fn apply(&self, source: &PixelBuffer) -> PixelBuffer {
        let keep = self.channel.index();
        source.map_rgb(|r, g, b| {
            let mut out = [0u8; 3];
            out[keep] = [r, g, b][keep];
            out
        })
    }

    fn name(&self) -> &str {
        match self.channel {
            Channel::Red => "red-channel",
            Channel::Green => "green-channel",
            Channel::Blue => "blue-channel",
        }
    }
}
