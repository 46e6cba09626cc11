use snaplab_common::config::{EffectsConfig, ThresholdConfig};
use tracing::debug;

use crate::filter::Channel;
use crate::region::{RegionMode, UnknownRegionMode};

/// Identifies one threshold control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ThresholdKey {
    Channel(Channel),
    /// Luminance threshold over the HSV false-color slot.
    Hsv,
    /// Luminance threshold over the Lab false-color slot.
    Lab,
}

impl ThresholdKey {
    pub fn name(self) -> &'static str {
        match self {
            ThresholdKey::Channel(c) => c.name(),
            ThresholdKey::Hsv => "hsv",
            ThresholdKey::Lab => "lab",
        }
    }
}

/// Supplies user-controlled parameters, synchronously and on demand.
pub trait ParameterSource {
    fn threshold(&self, key: ThresholdKey) -> u8;
    fn region_mode(&self) -> RegionMode;
}

/// The control panel: one slider per threshold plus the region mode keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControlPanel {
    red: u8,
    green: u8,
    blue: u8,
    hsv: u8,
    lab: u8,
    mode: RegionMode,
}

impl ControlPanel {
    pub const DEFAULT_THRESHOLD: u8 = 127;

    pub fn from_config(
        thresholds: &ThresholdConfig,
        effects: &EffectsConfig,
    ) -> Result<Self, UnknownRegionMode> {
        Ok(Self {
            red: thresholds.red,
            green: thresholds.green,
            blue: thresholds.blue,
            hsv: thresholds.hsv,
            lab: thresholds.lab,
            mode: effects.region_mode.parse()?,
        })
    }

    pub fn set_threshold(&mut self, key: ThresholdKey, value: u8) {
        let slot = match key {
            ThresholdKey::Channel(Channel::Red) => &mut self.red,
            ThresholdKey::Channel(Channel::Green) => &mut self.green,
            ThresholdKey::Channel(Channel::Blue) => &mut self.blue,
            ThresholdKey::Hsv => &mut self.hsv,
            ThresholdKey::Lab => &mut self.lab,
        };
        *slot = value;
        debug!(threshold = key.name(), value, "threshold changed");
    }

    pub fn set_region_mode(&mut self, mode: RegionMode) {
        self.mode = mode;
    }

    /// Apply a mode key press. Returns the new mode, or `None` for keys
    /// that are not bound.
    pub fn press_key(&mut self, key: char) -> Option<RegionMode> {
        let mode = RegionMode::from_key(key)?;
        self.mode = mode;
        debug!(key = %key, mode = %mode, "region mode key");
        Some(mode)
    }
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            red: Self::DEFAULT_THRESHOLD,
            green: Self::DEFAULT_THRESHOLD,
            blue: Self::DEFAULT_THRESHOLD,
            hsv: Self::DEFAULT_THRESHOLD,
            lab: Self::DEFAULT_THRESHOLD,
            mode: RegionMode::default(),
        }
    }
}

impl ParameterSource for ControlPanel {
    fn threshold(&self, key: ThresholdKey) -> u8 {
        match key {
            ThresholdKey::Channel(Channel::Red) => self.red,
            ThresholdKey::Channel(Channel::Green) => self.green,
            ThresholdKey::Channel(Channel::Blue) => self.blue,
            ThresholdKey::Hsv => self.hsv,
            ThresholdKey::Lab => self.lab,
        }
    }

    fn region_mode(&self) -> RegionMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_config_defaults() {
        let from_config =
            ControlPanel::from_config(&ThresholdConfig::default(), &EffectsConfig::default())
                .unwrap();
        assert_eq!(from_config, ControlPanel::default());
        assert_eq!(from_config.region_mode(), RegionMode::Outline);
    }

    #[test]
    fn thresholds_are_independent() {
        let mut panel = ControlPanel::default();
        panel.set_threshold(ThresholdKey::Channel(Channel::Green), 10);
        panel.set_threshold(ThresholdKey::Lab, 250);
        assert_eq!(panel.threshold(ThresholdKey::Channel(Channel::Green)), 10);
        assert_eq!(panel.threshold(ThresholdKey::Lab), 250);
        assert_eq!(panel.threshold(ThresholdKey::Channel(Channel::Red)), 127);
        assert_eq!(panel.threshold(ThresholdKey::Hsv), 127);
    }

    #[test]
    fn mode_keys() {
        let mut panel = ControlPanel::default();
        assert_eq!(panel.press_key('4'), Some(RegionMode::Pixelate));
        assert_eq!(panel.press_key('x'), None);
        assert_eq!(panel.region_mode(), RegionMode::Pixelate);
        panel.press_key('5');
        assert_eq!(panel.region_mode(), RegionMode::Outline);
    }

    #[test]
    fn bad_mode_in_config_is_rejected() {
        let effects = EffectsConfig {
            region_mode: "swirl".into(),
            ..EffectsConfig::default()
        };
        assert!(ControlPanel::from_config(&ThresholdConfig::default(), &effects).is_err());
    }
}
