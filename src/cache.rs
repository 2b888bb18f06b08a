//! Per-player frame cache.
//!
//! **Why**: Smooth playback needs decoded frames in RAM. One cache per open
//! player, populated incrementally by the loader, read by the scheduler and
//! renderer. It never shrinks during a session and is dropped wholesale when
//! the player closes.
//!
//! A slot is *settled* once its fetch finished, successfully or not. Failed
//! fetches stay settled-but-absent; the renderer's hold-last-frame behavior
//! is their only visible consequence.

use std::sync::Arc;

use crate::frame::Raster;

/// State of one frame slot.
#[derive(Debug, Clone, Default)]
pub enum FrameSlot {
    /// Fetch not yet settled.
    #[default]
    Pending,
    /// Fetched and decoded.
    Loaded(Arc<Raster>),
    /// Fetch or decode failed; never retried within the session.
    Absent,
}

/// Frame-index → decoded raster mapping with a settle counter.
#[derive(Debug)]
pub struct FrameCache {
    slots: Vec<FrameSlot>,
    settled: usize,
    loaded: usize,
}

impl FrameCache {
    pub fn new(frame_count: usize) -> Self {
        Self {
            slots: vec![FrameSlot::Pending; frame_count],
            settled: 0,
            loaded: 0,
        }
    }

    /// Record a settled fetch. `Some` marks the slot loaded, `None` marks it
    /// absent. Out-of-range or already-settled slots are ignored; the loader
    /// settles each index at most once.
    pub fn settle(&mut self, index: usize, raster: Option<Arc<Raster>>) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        if !matches!(slot, FrameSlot::Pending) {
            return;
        }

        *slot = match raster {
            Some(raster) => {
                self.loaded += 1;
                FrameSlot::Loaded(raster)
            }
            None => FrameSlot::Absent,
        };
        self.settled += 1;
    }

    /// Raster at `index`, if loaded.
    pub fn get(&self, index: usize) -> Option<&Arc<Raster>> {
        match self.slots.get(index) {
            Some(FrameSlot::Loaded(raster)) => Some(raster),
            _ => None,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.slots.len()
    }

    /// Slots whose fetch has finished, successfully or not.
    pub fn settled_count(&self) -> usize {
        self.settled
    }

    /// Slots holding an actual raster.
    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    pub fn is_complete(&self) -> bool {
        self.settled == self.slots.len()
    }

    /// Load progress as a rounded percentage of settled slots.
    pub fn progress_percent(&self) -> u8 {
        if self.slots.is_empty() {
            return 100;
        }
        (self.settled as f64 / self.slots.len() as f64 * 100.0).round() as u8
    }

    /// Total decoded bytes held.
    pub fn mem(&self) -> usize {
        self.slots
            .iter()
            .map(|s| match s {
                FrameSlot::Loaded(r) => r.mem(),
                _ => 0,
            })
            .sum()
    }
}
