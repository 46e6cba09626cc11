use std::collections::HashMap;
use std::time::Instant;

use snaplab_common::config::EffectsConfig;
use snaplab_common::frame::{CapturedFrame, PixelBuffer, Region};
use tracing::{debug, info, warn};

use super::layout::{EffectKind, EffectSpec, Layout, Stage};
use crate::color::{ColorError, ContrastFactor};
use crate::detector::{DetectorError, RegionDetector};
use crate::filter::{
    ChannelIsolation, ChannelThreshold, Grayscale, HsvFalseColor, LabFalseColor,
    LuminanceThreshold, Noise, PixelFilter, XRay,
};
use crate::params::{ControlPanel, ParameterSource, ThresholdKey};
use crate::region::{apply_regions, RegionMode};
use crate::region::overlay::Placeholder;
use crate::sink::{DisplaySink, SLOT_NAMES};

/// Fixed parameters of the full-frame filters.
#[derive(Debug, Clone, Copy)]
pub struct EffectSettings {
    pub brightness_boost: f64,
    pub contrast: ContrastFactor,
    pub noise: Noise,
}

impl EffectSettings {
    pub fn from_config(config: &EffectsConfig) -> Result<Self, ColorError> {
        Ok(Self {
            brightness_boost: config.brightness_boost,
            contrast: ContrastFactor::new(config.xray_contrast)?,
            noise: Noise::Uniform {
                width: config.xray_noise,
            },
        })
    }
}

impl Default for EffectSettings {
    fn default() -> Self {
        Self {
            brightness_boost: Grayscale::DEFAULT_BOOST,
            contrast: ContrastFactor::XRAY,
            noise: Noise::Uniform { width: 8.0 },
        }
    }
}

/// Detector outcome for the current frame.
#[derive(Debug, Clone, PartialEq)]
enum RegionState {
    /// Detection started but has not reported back.
    Pending,
    /// Model still loading.
    NotReady,
    Failed(String),
    /// Detection finished; possibly with no regions.
    Found(Vec<Region>),
}

/// Everything derived from one captured frame. Replaced wholesale on the
/// next capture.
struct FrameContext {
    frame: CapturedFrame,
    /// Latest output per slot, for effects that read other effects.
    outputs: HashMap<&'static str, PixelBuffer>,
    regions: RegionState,
}

/// Handed to the caller while detection for a frame is in flight.
#[derive(Debug, Clone)]
pub struct DetectionTicket {
    pub seq: u64,
    pub buffer: PixelBuffer,
}

/// Runs the effect layout over captured frames and routes results to a
/// display sink.
///
/// Holds at most one frame. Without a frame every operation is a no-op.
pub struct Session<S> {
    layout: Layout,
    settings: EffectSettings,
    sink: S,
    current: Option<FrameContext>,
}

impl<S: DisplaySink> Session<S> {
    pub fn new(layout: Layout, settings: EffectSettings, sink: S) -> Self {
        Self {
            layout,
            settings,
            sink,
            current: None,
        }
    }

    pub fn has_frame(&self) -> bool {
        self.current.is_some()
    }

    pub fn current_seq(&self) -> Option<u64> {
        self.current.as_ref().map(|c| c.frame.seq)
    }

    /// Latest buffer produced for `slot` from the current frame.
    pub fn output(&self, slot: &str) -> Option<&PixelBuffer> {
        self.current.as_ref().and_then(|c| c.outputs.get(slot))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Capture, filter, detect, render regions.
    pub async fn process<D, P>(&mut self, frame: CapturedFrame, detector: &D, params: &P)
    where
        D: RegionDetector,
        P: ParameterSource,
    {
        if !self.load_frame(frame, params) {
            return;
        }
        let Some(ticket) = self.begin_detection() else {
            return;
        };
        let started = Instant::now();
        let result = detector.detect(&ticket.buffer).await;
        debug!(
            seq = ticket.seq,
            detector = detector.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "detection finished"
        );
        self.complete_detection(ticket.seq, result, params);
    }

    /// Make `frame` current and render every effect that does not need
    /// regions. The region slot shows the loading placeholder until
    /// [`Session::complete_detection`] runs.
    ///
    /// Returns `false` if `frame` is not newer than the current one.
    pub fn load_frame<P: ParameterSource>(&mut self, frame: CapturedFrame, params: &P) -> bool {
        if let Some(seq) = self.current_seq() {
            if frame.seq <= seq {
                warn!(seq = frame.seq, current = seq, "ignoring out-of-order frame");
                return false;
            }
        }

        let started = Instant::now();
        info!(
            seq = frame.seq,
            label = %frame.label(),
            width = frame.buffer.width(),
            height = frame.buffer.height(),
            "new frame"
        );

        for slot in SLOT_NAMES {
            self.sink.render(slot, &frame.buffer);
        }
        self.current = Some(FrameContext {
            frame,
            outputs: HashMap::new(),
            regions: RegionState::Pending,
        });

        for stage in [
            Stage::FullFrame,
            Stage::ChannelThreshold,
            Stage::DerivedThreshold,
            Stage::Regions,
        ] {
            let specs: Vec<EffectSpec> = self.layout.in_stage(stage).copied().collect();
            for spec in specs {
                self.run_effect(&spec, params);
            }
        }

        debug!(
            seq = self.current_seq(),
            elapsed_us = started.elapsed().as_micros() as u64,
            "frame effects rendered"
        );
        true
    }

    /// Start detection for the current frame.
    pub fn begin_detection(&self) -> Option<DetectionTicket> {
        self.current.as_ref().map(|c| DetectionTicket {
            seq: c.frame.seq,
            buffer: c.frame.buffer.clone(),
        })
    }

    /// Deliver a detector result for frame `seq` and render the region slot.
    ///
    /// Results for anything but the current frame are discarded. Returns
    /// whether the result was applied.
    pub fn complete_detection<P: ParameterSource>(
        &mut self,
        seq: u64,
        result: Result<Vec<Region>, DetectorError>,
        params: &P,
    ) -> bool {
        let Some(ctx) = self.current.as_mut() else {
            debug!(seq, "detection result without a frame, ignored");
            return false;
        };
        if ctx.frame.seq != seq {
            warn!(seq, current = ctx.frame.seq, "discarding stale detection result");
            return false;
        }

        ctx.regions = match result {
            Ok(regions) => {
                info!(seq, regions = regions.len(), "regions detected");
                RegionState::Found(regions)
            }
            Err(DetectorError::NotReady) => {
                warn!(seq, "region detector not ready");
                RegionState::NotReady
            }
            Err(DetectorError::Failed(reason)) => {
                warn!(seq, error = %reason, "region detection failed");
                RegionState::Failed(reason)
            }
        };
        self.render_regions(params);
        true
    }

    /// Re-render the slots driven by threshold `key` with its current value.
    /// Returns the number of slots updated.
    pub fn set_threshold<P: ParameterSource>(&mut self, key: ThresholdKey, params: &P) -> usize {
        if self.current.is_none() {
            return 0;
        }
        let specs: Vec<EffectSpec> = self.layout.driven_by(key).copied().collect();
        for spec in &specs {
            self.run_effect(spec, params);
        }
        debug!(
            threshold = key.name(),
            value = params.threshold(key),
            slots = specs.len(),
            "threshold recomputed"
        );
        specs.len()
    }

    /// Re-render the region slot in the current mode from the cached
    /// regions, without running the detector again. Ignored unless regions
    /// were found for the current frame.
    pub fn set_region_mode<P: ParameterSource>(&mut self, params: &P) -> bool {
        if !self.has_cached_regions() {
            debug!(mode = %params.region_mode(), "no cached regions, mode change not rendered");
            return false;
        }
        self.render_regions(params);
        true
    }

    /// Apply a region-mode key to `panel` and re-render the region slot.
    ///
    /// Without cached regions for the current frame the key is ignored and
    /// the panel keeps its mode. Returns the new mode, or `None` when the
    /// key was ignored or is not bound.
    pub fn press_mode_key(&mut self, key: char, panel: &mut ControlPanel) -> Option<RegionMode> {
        if !self.has_cached_regions() {
            debug!(key = %key, "no cached regions, mode key ignored");
            return None;
        }
        let mode = panel.press_key(key)?;
        self.render_regions(panel);
        Some(mode)
    }

    fn has_cached_regions(&self) -> bool {
        matches!(
            self.current.as_ref().map(|c| &c.regions),
            Some(RegionState::Found(regions)) if !regions.is_empty()
        )
    }

    fn render_regions<P: ParameterSource>(&mut self, params: &P) {
        let specs: Vec<EffectSpec> = self.layout.in_stage(Stage::Regions).copied().collect();
        for spec in specs {
            self.run_effect(&spec, params);
        }
    }

    fn run_effect<P: ParameterSource>(&mut self, spec: &EffectSpec, params: &P) {
        let Some(ctx) = self.current.as_mut() else {
            return;
        };
        let started = Instant::now();
        let Some(out) = render_effect(&self.settings, ctx, spec, params) else {
            return;
        };
        debug!(
            effect = spec.name,
            slot = spec.slot,
            elapsed_us = started.elapsed().as_micros() as u64,
            "effect rendered"
        );
        self.sink.render(spec.slot, &out);
        ctx.outputs.insert(spec.slot, out);
    }
}

fn render_effect<P: ParameterSource>(
    settings: &EffectSettings,
    ctx: &FrameContext,
    spec: &EffectSpec,
    params: &P,
) -> Option<PixelBuffer> {
    let base = &ctx.frame.buffer;
    let out = match spec.kind {
        EffectKind::Original => base.clone(),
        EffectKind::Grayscale => Grayscale::new(settings.brightness_boost).apply(base),
        EffectKind::XRay => XRay::new(settings.contrast, settings.noise).apply(base),
        EffectKind::Isolate(channel) => ChannelIsolation::new(channel).apply(base),
        EffectKind::HsvFalseColor => HsvFalseColor.apply(base),
        EffectKind::LabFalseColor => LabFalseColor.apply(base),
        EffectKind::ChannelThreshold(channel) => {
            let threshold = params.threshold(ThresholdKey::Channel(channel));
            ChannelThreshold::new(channel, threshold).apply(base)
        }
        EffectKind::DerivedThreshold { key, source } => {
            let Some(src) = ctx.outputs.get(source) else {
                warn!(effect = spec.name, source, "source slot not rendered, skipping");
                return None;
            };
            LuminanceThreshold::new(params.threshold(key)).apply(src)
        }
        EffectKind::Regions => match &ctx.regions {
            RegionState::Pending | RegionState::NotReady => Placeholder::Loading.render(base),
            RegionState::Failed(_) => Placeholder::Error.render(base),
            RegionState::Found(regions) if regions.is_empty() => {
                Placeholder::NoRegions.render(base)
            }
            RegionState::Found(regions) => apply_regions(base, regions, params.region_mode()),
        },
    };
    Some(out)
}
