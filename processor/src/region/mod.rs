pub mod effects;
pub mod overlay;

use std::fmt;
use std::str::FromStr;

pub use effects::{apply_regions, BLOCK_SIZE, BLUR_RADIUS};

/// How detected regions are rendered into the region slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegionMode {
    /// Translucent box with a green border over the untouched frame.
    #[default]
    Outline,
    Grayscale,
    Blur,
    Hsv,
    Pixelate,
}

impl RegionMode {
    /// Keyboard shortcut mapping: '1'..'4' select an effect, '5' goes back
    /// to outlines.
    pub fn from_key(key: char) -> Option<Self> {
        match key {
            '1' => Some(RegionMode::Grayscale),
            '2' => Some(RegionMode::Blur),
            '3' => Some(RegionMode::Hsv),
            '4' => Some(RegionMode::Pixelate),
            '5' => Some(RegionMode::Outline),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RegionMode::Outline => "outline",
            RegionMode::Grayscale => "grayscale",
            RegionMode::Blur => "blur",
            RegionMode::Hsv => "hsv",
            RegionMode::Pixelate => "pixelate",
        }
    }
}

impl fmt::Display for RegionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown region mode '{0}'")]
pub struct UnknownRegionMode(pub String);

impl FromStr for RegionMode {
    type Err = UnknownRegionMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "outline" => Ok(RegionMode::Outline),
            "grayscale" => Ok(RegionMode::Grayscale),
            "blur" => Ok(RegionMode::Blur),
            "hsv" => Ok(RegionMode::Hsv),
            "pixelate" => Ok(RegionMode::Pixelate),
            other => Err(UnknownRegionMode(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_bindings() {
        assert_eq!(RegionMode::from_key('1'), Some(RegionMode::Grayscale));
        assert_eq!(RegionMode::from_key('4'), Some(RegionMode::Pixelate));
        assert_eq!(RegionMode::from_key('5'), Some(RegionMode::Outline));
        assert_eq!(RegionMode::from_key('6'), None);
    }

    #[test]
    fn parse_and_display_agree() {
        for mode in [
            RegionMode::Outline,
            RegionMode::Grayscale,
            RegionMode::Blur,
            RegionMode::Hsv,
            RegionMode::Pixelate,
        ] {
            assert_eq!(mode.to_string().parse::<RegionMode>().unwrap(), mode);
        }
        assert!("sepia".parse::<RegionMode>().is_err());
    }
}
