use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub detector: DetectorConfig,
    #[serde(default)]
    pub effects: EffectsConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CaptureConfig {
    /// "file" or "http".
    #[serde(default = "default_capture_source")]
    pub source: String,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    #[serde(default = "default_min_confidence")]
    pub min_confidence: f32,
    /// When false the detector reports "model not ready" for every frame.
    #[serde(default = "default_ready")]
    pub ready: bool,
    #[serde(default)]
    pub regions: Vec<RegionConfig>,
}

/// A fixed detection fed to the config-driven detector.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionConfig {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default = "default_region_confidence")]
    pub confidence: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EffectsConfig {
    #[serde(default = "default_brightness_boost")]
    pub brightness_boost: f64,
    #[serde(default = "default_xray_contrast")]
    pub xray_contrast: f64,
    /// Full width of the uniform noise interval added by the X-ray filter.
    #[serde(default = "default_xray_noise")]
    pub xray_noise: f64,
    /// "outline", "grayscale", "blur", "hsv" or "pixelate".
    #[serde(default = "default_region_mode")]
    pub region_mode: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdConfig {
    #[serde(default = "default_threshold")]
    pub red: u8,
    #[serde(default = "default_threshold")]
    pub green: u8,
    #[serde(default = "default_threshold")]
    pub blue: u8,
    #[serde(default = "default_threshold")]
    pub hsv: u8,
    #[serde(default = "default_threshold")]
    pub lab: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            source: default_capture_source(),
            path: None,
            url: None,
            width: default_width(),
            height: default_height(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            min_confidence: default_min_confidence(),
            ready: default_ready(),
            regions: Vec::new(),
        }
    }
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            brightness_boost: default_brightness_boost(),
            xray_contrast: default_xray_contrast(),
            xray_noise: default_xray_noise(),
            region_mode: default_region_mode(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            red: default_threshold(),
            green: default_threshold(),
            blue: default_threshold(),
            hsv: default_threshold(),
            lab: default_threshold(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const REGION_MODES: [&str; 5] = ["outline", "grayscale", "blur", "hsv", "pixelate"];
const CAPTURE_SOURCES: [&str; 2] = ["file", "http"];

impl Config {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFile(path.display().to_string(), e))?;
        let config = Self::parse(&content)?;
        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capture.width == 0 || self.capture.height == 0 {
            return Err(ConfigError::Invalid(format!(
                "capture size must be non-zero, got {}x{}",
                self.capture.width, self.capture.height
            )));
        }
        if !CAPTURE_SOURCES.contains(&self.capture.source.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown capture source '{}', expected 'file' or 'http'",
                self.capture.source
            )));
        }
        if self.effects.xray_contrast.is_nan() || self.effects.xray_contrast <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "xray_contrast must be > 0, got {}",
                self.effects.xray_contrast
            )));
        }
        if self.effects.xray_noise.is_nan() || self.effects.xray_noise < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "xray_noise must be >= 0, got {}",
                self.effects.xray_noise
            )));
        }
        if !REGION_MODES.contains(&self.effects.region_mode.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "unknown region_mode '{}'",
                self.effects.region_mode
            )));
        }
        if !(0.0..=1.0).contains(&self.detector.min_confidence) {
            return Err(ConfigError::Invalid(format!(
                "min_confidence must be within [0, 1], got {}",
                self.detector.min_confidence
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {0}: {1}")]
    ReadFile(String, std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// Default value functions
fn default_capture_source() -> String {
    "file".into()
}
fn default_width() -> u32 {
    160
}
fn default_height() -> u32 {
    120
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_min_confidence() -> f32 {
    0.5
}
fn default_ready() -> bool {
    true
}
fn default_region_confidence() -> f32 {
    1.0
}
fn default_brightness_boost() -> f64 {
    1.2
}
fn default_xray_contrast() -> f64 {
    1.5
}
fn default_xray_noise() -> f64 {
    8.0
}
fn default_region_mode() -> String {
    "outline".into()
}
fn default_threshold() -> u8 {
    127
}
fn default_log_level() -> String {
    "info".into()
}
