use std::collections::HashSet;

use crate::filter::Channel;
use crate::params::ThresholdKey;

/// What an effect computes. Full-frame kinds read the base buffer; derived
/// thresholds read the output of an earlier effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Original,
    Grayscale,
    XRay,
    Isolate(Channel),
    HsvFalseColor,
    LabFalseColor,
    ChannelThreshold(Channel),
    DerivedThreshold {
        key: ThresholdKey,
        source: &'static str,
    },
    Regions,
}

/// Execution stage; a layout runs its effects in non-decreasing stage order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    FullFrame,
    ChannelThreshold,
    DerivedThreshold,
    Regions,
}

impl EffectKind {
    pub fn stage(self) -> Stage {
        match self {
            EffectKind::Original
            | EffectKind::Grayscale
            | EffectKind::XRay
            | EffectKind::Isolate(_)
            | EffectKind::HsvFalseColor
            | EffectKind::LabFalseColor => Stage::FullFrame,
            EffectKind::ChannelThreshold(_) => Stage::ChannelThreshold,
            EffectKind::DerivedThreshold { .. } => Stage::DerivedThreshold,
            EffectKind::Regions => Stage::Regions,
        }
    }

    /// The threshold control driving this effect, if any.
    pub fn threshold_key(self) -> Option<ThresholdKey> {
        match self {
            EffectKind::ChannelThreshold(c) => Some(ThresholdKey::Channel(c)),
            EffectKind::DerivedThreshold { key, .. } => Some(key),
            _ => None,
        }
    }
}

/// One logical effect routed to one display slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectSpec {
    pub name: &'static str,
    pub slot: &'static str,
    pub kind: EffectKind,
}

impl EffectSpec {
    pub const fn new(name: &'static str, slot: &'static str, kind: EffectKind) -> Self {
        Self { name, slot, kind }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum LayoutError {
    #[error("slot '{0}' is assigned to more than one effect")]
    DuplicateSlot(&'static str),
    #[error("effect '{effect}' runs before an earlier stage")]
    OutOfOrder { effect: &'static str },
    #[error("effect '{effect}' reads slot '{source_slot}' which no earlier full-frame effect writes")]
    MissingSource {
        effect: &'static str,
        source_slot: &'static str,
    },
    #[error("more than one region effect")]
    MultipleRegionEffects,
}

/// A validated, ordered list of effects.
#[derive(Debug, Clone)]
pub struct Layout {
    effects: Vec<EffectSpec>,
}

impl Layout {
    pub fn new(effects: Vec<EffectSpec>) -> Result<Self, LayoutError> {
        let mut slots = HashSet::new();
        let mut full_frame_slots = HashSet::new();
        let mut last_stage = Stage::FullFrame;
        let mut region_effects = 0;

        for effect in &effects {
            if !slots.insert(effect.slot) {
                return Err(LayoutError::DuplicateSlot(effect.slot));
            }
            let stage = effect.kind.stage();
            if stage < last_stage {
                return Err(LayoutError::OutOfOrder {
                    effect: effect.name,
                });
            }
            last_stage = stage;

            match effect.kind {
                EffectKind::DerivedThreshold { source, .. } => {
                    if !full_frame_slots.contains(source) {
                        return Err(LayoutError::MissingSource {
                            effect: effect.name,
                            source_slot: source,
                        });
                    }
                }
                EffectKind::Regions => region_effects += 1,
                _ => {}
            }
            if stage == Stage::FullFrame {
                full_frame_slots.insert(effect.slot);
            }
        }

        if region_effects > 1 {
            return Err(LayoutError::MultipleRegionEffects);
        }
        Ok(Self { effects })
    }

    /// The fifteen-slot reference layout.
    pub fn reference() -> Self {
        Self {
            effects: REFERENCE.to_vec(),
        }
    }

    pub fn effects(&self) -> &[EffectSpec] {
        &self.effects
    }

    pub fn in_stage(&self, stage: Stage) -> impl Iterator<Item = &EffectSpec> {
        self.effects.iter().filter(move |e| e.kind.stage() == stage)
    }

    /// Effects whose output depends on the given threshold control.
    pub fn driven_by(&self, key: ThresholdKey) -> impl Iterator<Item = &EffectSpec> {
        self.effects
            .iter()
            .filter(move |e| e.kind.threshold_key() == Some(key))
    }

    pub fn region_slot(&self) -> Option<&'static str> {
        self.effects
            .iter()
            .find(|e| e.kind == EffectKind::Regions)
            .map(|e| e.slot)
    }

    pub fn slots(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.effects.iter().map(|e| e.slot)
    }
}

const REFERENCE: [EffectSpec; 14] = [
    EffectSpec::new("original", "slot1", EffectKind::Original),
    EffectSpec::new("grayscale", "slot2", EffectKind::Grayscale),
    EffectSpec::new("xray", "slot3", EffectKind::XRay),
    EffectSpec::new("red", "slot4", EffectKind::Isolate(Channel::Red)),
    EffectSpec::new("green", "slot5", EffectKind::Isolate(Channel::Green)),
    EffectSpec::new("blue", "slot6", EffectKind::Isolate(Channel::Blue)),
    EffectSpec::new("hsv", "slot11", EffectKind::HsvFalseColor),
    EffectSpec::new("lab", "slot12", EffectKind::LabFalseColor),
    EffectSpec::new("red-threshold", "slot7", EffectKind::ChannelThreshold(Channel::Red)),
    EffectSpec::new("green-threshold", "slot8", EffectKind::ChannelThreshold(Channel::Green)),
    EffectSpec::new("blue-threshold", "slot9", EffectKind::ChannelThreshold(Channel::Blue)),
    EffectSpec::new(
        "hsv-threshold",
        "slot14",
        EffectKind::DerivedThreshold {
            key: ThresholdKey::Hsv,
            source: "slot11",
        },
    ),
    EffectSpec::new(
        "lab-threshold",
        "slot15",
        EffectKind::DerivedThreshold {
            key: ThresholdKey::Lab,
            source: "slot12",
        },
    ),
    EffectSpec::new("regions", "slot13", EffectKind::Regions),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_layout_is_valid() {
        let layout = Layout::new(REFERENCE.to_vec()).unwrap();
        assert_eq!(layout.effects().len(), 14);
        assert_eq!(layout.region_slot(), Some("slot13"));
        // slot10 has no effect of its own.
        assert!(!layout.slots().any(|s| s == "slot10"));
    }

    #[test]
    fn stages_run_in_order() {
        let layout = Layout::reference();
        let stages: Vec<Stage> = layout.effects().iter().map(|e| e.kind.stage()).collect();
        let mut sorted = stages.clone();
        sorted.sort();
        assert_eq!(stages, sorted);
    }

    #[test]
    fn derived_threshold_needs_earlier_source() {
        let effects = vec![
            EffectSpec::new(
                "hsv-threshold",
                "slot14",
                EffectKind::DerivedThreshold {
                    key: ThresholdKey::Hsv,
                    source: "slot11",
                },
            ),
            EffectSpec::new("hsv", "slot11", EffectKind::HsvFalseColor),
        ];
        // The source slot is only written after the threshold runs.
        assert!(Layout::new(effects).is_err());

        let effects = vec![EffectSpec::new(
            "hsv-threshold",
            "slot14",
            EffectKind::DerivedThreshold {
                key: ThresholdKey::Hsv,
                source: "slot11",
            },
        )];
        assert_eq!(
            Layout::new(effects).unwrap_err(),
            LayoutError::MissingSource {
                effect: "hsv-threshold",
                source_slot: "slot11"
            }
        );
    }

    #[test]
    fn duplicate_slots_rejected() {
        let effects = vec![
            EffectSpec::new("grayscale", "slot2", EffectKind::Grayscale),
            EffectSpec::new("xray", "slot2", EffectKind::XRay),
        ];
        assert_eq!(
            Layout::new(effects).unwrap_err(),
            LayoutError::DuplicateSlot("slot2")
        );
    }

    #[test]
    fn threshold_keys_route_to_single_slots() {
        let layout = Layout::reference();
        let slots: Vec<_> = layout.driven_by(ThresholdKey::Lab).map(|e| e.slot).collect();
        assert_eq!(slots, vec!["slot15"]);
        let slots: Vec<_> = layout
            .driven_by(ThresholdKey::Channel(Channel::Blue))
            .map(|e| e.slot)
            .collect();
        assert_eq!(slots, vec!["slot9"]);
    }
}
