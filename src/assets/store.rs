use crate::assets::decode::FrameImage;
use crate::foundation::core::{FrameCount, FrameIndex};
use crate::foundation::error::ScrubResult;

/// Load state of one frame slot.
#[derive(Clone, Debug)]
pub enum FrameSlot {
    /// Load still in flight.
    Pending,
    /// Decoded successfully.
    Loaded(FrameImage),
    /// Fetch or decode failed; the slot stays empty for the lifetime of the store.
    Missing,
}

/// Frame sequence being filled by a preload.
///
/// Every slot settles exactly once, either loaded or missing. The store is ready when all `N`
/// slots have settled, regardless of how many failed; failures are absorbed here and never
/// surface to the caller.
#[derive(Clone, Debug)]
pub struct FrameStore {
    count: FrameCount,
    slots: Vec<FrameSlot>,
    settled: u32,
    loaded: u32,
}

impl FrameStore {
    /// Empty store with `count` pending slots.
    pub fn new(count: FrameCount) -> Self {
        Self {
            count,
            slots: vec![FrameSlot::Pending; count.get() as usize],
            settled: 0,
            loaded: 0,
        }
    }

    /// Number of frames in the sequence.
    pub fn count(&self) -> FrameCount {
        self.count
    }

    /// Record the outcome of loading `index`.
    ///
    /// Returns `false` when the index is out of range or already settled; the first outcome wins.
    pub fn settle(&mut self, index: FrameIndex, outcome: ScrubResult<FrameImage>) -> bool {
        let Some(slot) = self.slots.get_mut(index.as_usize()) else {
            tracing::warn!(index = index.0, "ignoring frame outside sequence");
            return false;
        };
        if !matches!(slot, FrameSlot::Pending) {
            return false;
        }

        *slot = match outcome {
            Ok(img) => {
                self.loaded += 1;
                FrameSlot::Loaded(img)
            }
            Err(err) => {
                tracing::warn!(index = index.0, error = %err, "frame failed to load");
                FrameSlot::Missing
            }
        };
        self.settled += 1;
        true
    }

    /// `true` once every slot has settled.
    pub fn is_ready(&self) -> bool {
        self.settled == self.count.get()
    }

    /// Loaded frame at `index`, if any.
    pub fn get(&self, index: FrameIndex) -> Option<&FrameImage> {
        match self.slots.get(index.as_usize())? {
            FrameSlot::Loaded(img) => Some(img),
            FrameSlot::Pending | FrameSlot::Missing => None,
        }
    }

    /// Slot state at `index`.
    pub fn slot(&self, index: FrameIndex) -> Option<&FrameSlot> {
        self.slots.get(index.as_usize())
    }

    /// Number of settled slots (loaded or missing).
    pub fn settled_count(&self) -> u32 {
        self.settled
    }

    /// Number of successfully decoded frames.
    pub fn loaded_count(&self) -> u32 {
        self.loaded
    }

    /// Freeze the store once ready. Returns the store unchanged while loads are still pending.
    pub fn into_ready(self) -> Result<ReadyFrames, FrameStore> {
        if !self.is_ready() {
            return Err(self);
        }

        let mut failed = Vec::new();
        let frames = self
            .slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                FrameSlot::Loaded(img) => Some(img),
                FrameSlot::Pending | FrameSlot::Missing => {
                    failed.push(FrameIndex(i as u32));
                    None
                }
            })
            .collect();

        Ok(ReadyFrames {
            count: self.count,
            frames,
            failed,
        })
    }
}

/// Fully settled, read-only frame sequence.
///
/// Only [`FrameStore::into_ready`] builds one, so holding a `ReadyFrames` proves preload finished.
/// Timeline construction takes this type, which keeps scrubbing from ever starting early.
#[derive(Clone, Debug)]
pub struct ReadyFrames {
    count: FrameCount,
    frames: Vec<Option<FrameImage>>,
    failed: Vec<FrameIndex>,
}

impl ReadyFrames {
    /// Number of frames in the sequence (loaded or not).
    pub fn count(&self) -> FrameCount {
        self.count
    }

    /// Loaded frame at `index`; `None` for failed or out-of-range indices.
    pub fn get(&self, index: FrameIndex) -> Option<&FrameImage> {
        self.frames.get(index.as_usize())?.as_ref()
    }

    /// Number of frames that decoded successfully.
    pub fn loaded_count(&self) -> u32 {
        self.count.get() - self.failed.len() as u32
    }

    /// Indices that failed to load, ascending.
    pub fn failed(&self) -> &[FrameIndex] {
        &self.failed
    }

    /// `true` when not a single frame resolved.
    pub fn all_failed(&self) -> bool {
        self.failed.len() == self.count.get() as usize
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
