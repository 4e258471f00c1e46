use std::collections::VecDeque;

use egui::Pos2;
use image::RgbaImage;

use crate::util::time;

/// Full copy of the main surface at one commit point
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySnapshot {
    image: RgbaImage,
    coordinates: Option<Pos2>,
    taken_at_ms: u64,
}

impl HistorySnapshot {
    pub fn new(image: RgbaImage, coordinates: Option<Pos2>) -> Self {
        Self {
            image,
            coordinates,
            taken_at_ms: time::timestamp_millis(),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Pointer position when the snapshot was taken
    pub fn coordinates(&self) -> Option<Pos2> {
        self.coordinates
    }

    pub fn taken_at_ms(&self) -> u64 {
        self.taken_at_ms
    }
}

/// Bounded stack of main-surface snapshots.
///
/// The bottom entry is the baseline undo returns to; when the depth is exceeded the oldest
/// entry falls off and the next one becomes the baseline.
#[derive(Debug, Clone)]
pub struct History {
    snapshots: VecDeque<HistorySnapshot>,
    depth: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DEPTH)
    }
}

impl History {
    pub const DEFAULT_DEPTH: usize = 50;

    /// `depth` counts the baseline, so anything below 2 is raised to 2
    pub fn new(depth: usize) -> Self {
        let depth = depth.max(2);
        Self {
            snapshots: VecDeque::with_capacity(depth),
            depth,
        }
    }

    pub fn push(&mut self, snapshot: HistorySnapshot) {
        if self.snapshots.len() == self.depth {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    /// Snapshots `image` and pushes it
    pub fn push_image(&mut self, image: &RgbaImage, coordinates: Option<Pos2>) {
        self.push(HistorySnapshot::new(image.clone(), coordinates));
    }

    /// Drops the latest snapshot and returns the one to restore.
    ///
    /// `None` (and nothing dropped) when only the baseline is left.
    pub fn undo(&mut self) -> Option<&HistorySnapshot> {
        if !self.can_undo() {
            return None;
        }
        self.snapshots.pop_back();
        self.snapshots.back()
    }

    pub fn can_undo(&self) -> bool {
        self.snapshots.len() >= 2
    }

    pub fn latest(&self) -> Option<&HistorySnapshot> {
        self.snapshots.back()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}
