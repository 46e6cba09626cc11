pub mod basic;
pub mod colorspace;
pub mod threshold;
pub mod traits;

pub use basic::{Channel, ChannelIsolation, Grayscale, Noise, XRay};
pub use colorspace::{HsvFalseColor, LabFalseColor};
pub use threshold::{ChannelThreshold, LuminanceThreshold};
pub use traits::PixelFilter;
