use crate::animation::tracks::AuxFrame;
use crate::foundation::core::FrameIndex;

/// Handle returned by [`Timeline::subscribe`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

/// One progress sample, shared by every effect driven on a tick.
#[derive(Clone, Copy, Debug)]
pub struct Tick<'a> {
    /// Progress in `[0, 1]`.
    pub progress: f64,
    /// Frame index mapped from `progress`.
    pub index: FrameIndex,
    /// Auxiliary element styles sampled from `progress`.
    pub aux: &'a AuxFrame,
}

type Callback = Box<dyn FnMut(&Tick<'_>)>;

/// A single progress value driving an ordered list of dependent effects.
///
/// Subscribers run once per tick, in registration order, all with the same [`Tick`]. There are no
/// independent timers; whoever owns the timeline decides when a tick happens.
pub struct Timeline {
    progress: f64,
    ticks: u64,
    next_id: u64,
    subscribers: Vec<(SubscriberId, Callback)>,
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    /// Timeline at progress 0 with no subscribers.
    pub fn new() -> Self {
        Self {
            progress: 0.0,
            ticks: 0,
            next_id: 0,
            subscribers: Vec::new(),
        }
    }

    /// Progress of the most recent tick.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Number of ticks dispatched so far.
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Register `f` to run on every subsequent tick.
    pub fn subscribe(&mut self, f: impl FnMut(&Tick<'_>) + 'static) -> SubscriberId {
        let id = SubscriberId(self.next_id);
        self.next_id += 1;
        self.subscribers.push((id, Box::new(f)));
        id
    }

    /// Remove a subscriber. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() != before
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Drop every subscriber.
    pub fn clear(&mut self) {
        self.subscribers.clear();
    }

    pub(crate) fn advance(&mut self, tick: &Tick<'_>) {
        self.progress = tick.progress;
        self.ticks += 1;
        for (_, f) in &mut self.subscribers {
            f(tick);
        }
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("progress", &self.progress)
            .field("ticks", &self.ticks)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/timeline.rs"]
mod tests;
