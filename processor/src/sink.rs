use std::collections::BTreeMap;

use serde::Serialize;
use snaplab_common::frame::PixelBuffer;
use tracing::debug;

/// Receives rendered buffers by slot name.
pub trait DisplaySink {
    /// Show `buffer` in `slot`. Unknown slots are ignored.
    fn render(&mut self, slot: &str, buffer: &PixelBuffer);
}

/// Slot names of the reference layout, "slot1" through "slot15".
pub const SLOT_NAMES: [&str; 15] = [
    "slot1", "slot2", "slot3", "slot4", "slot5", "slot6", "slot7", "slot8", "slot9", "slot10",
    "slot11", "slot12", "slot13", "slot14", "slot15",
];

/// In-memory display surface holding the latest buffer per slot.
#[derive(Debug, Clone)]
pub struct SlotBoard {
    slots: BTreeMap<&'static str, Option<PixelBuffer>>,
    writes: u64,
}

impl SlotBoard {
    pub fn new() -> Self {
        Self::with_slots(&SLOT_NAMES)
    }

    pub fn with_slots(names: &[&'static str]) -> Self {
        Self {
            slots: names.iter().map(|&n| (n, None)).collect(),
            writes: 0,
        }
    }

    pub fn get(&self, slot: &str) -> Option<&PixelBuffer> {
        self.slots.get(slot).and_then(|b| b.as_ref())
    }

    pub fn has_slot(&self, slot: &str) -> bool {
        self.slots.contains_key(slot)
    }

    /// Total number of accepted writes.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// One summary per filled slot, in layout order.
    pub fn summaries(&self) -> Vec<SlotSummary> {
        let mut out: Vec<SlotSummary> = self
            .slots
            .iter()
            .filter_map(|(name, buf)| buf.as_ref().map(|b| SlotSummary::of(name, b)))
            .collect();
        out.sort_by_key(|s| slot_number(&s.slot));
        out
    }
}

impl Default for SlotBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplaySink for SlotBoard {
    fn render(&mut self, slot: &str, buffer: &PixelBuffer) {
        match self.slots.get_mut(slot) {
            Some(entry) => {
                *entry = Some(buffer.clone());
                self.writes += 1;
            }
            None => debug!(slot, "render to unknown slot ignored"),
        }
    }
}

fn slot_number(name: &str) -> u32 {
    name.trim_start_matches("slot").parse().unwrap_or(u32::MAX)
}

/// Compact description of a rendered slot for logs and reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotSummary {
    pub slot: String,
    pub width: u32,
    pub height: u32,
    pub mean_rgb: [f64; 3],
    /// Share of pixels whose RGB is pure white, useful for threshold slots.
    pub white_fraction: f64,
}

impl SlotSummary {
    pub fn of(slot: &str, buffer: &PixelBuffer) -> Self {
        let mut sums = [0u64; 3];
        let mut white = 0usize;
        for px in buffer.pixels() {
            sums[0] += px[0] as u64;
            sums[1] += px[1] as u64;
            sums[2] += px[2] as u64;
            if px[..3] == [255, 255, 255] {
                white += 1;
            }
        }
        let n = buffer.pixel_count().max(1) as f64;
        Self {
            slot: slot.to_string(),
            width: buffer.width(),
            height: buffer.height(),
            mean_rgb: [sums[0] as f64 / n, sums[1] as f64 / n, sums[2] as f64 / n],
            white_fraction: white as f64 / n,
        }
    }
}
