use std::sync::Arc;

use crate::animation::tracks::{AuxFrame, AuxTimeline};
use crate::assets::store::ReadyFrames;
use crate::foundation::core::{FrameIndex, Rect, Viewport};
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::render::presenter::CanvasPresenter;
use crate::timeline::geometry::{PinGeometry, RangePosition, ScrollRange};
use crate::timeline::progress::index_for;
use crate::timeline::timeline::{Tick, Timeline};

const SNAP_EPSILON: f64 = 1e-4;

/// Which pin boundary a section left through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Boundary {
    /// Scrolled back above the start; progress holds at 0.
    Start,
    /// Scrolled past the end; progress holds at 1.
    End,
}

/// Pin state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PinState {
    /// The start boundary has not been reached yet.
    Unattached,
    /// Region is pinned and progress follows the scroll offset.
    Pinned,
    /// Region is unpinned after leaving through `boundary`.
    Released {
        /// Boundary that was crossed.
        boundary: Boundary,
    },
}

/// Pin transition reported to the host, which fixes or unfixes the region accordingly.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PinChange {
    /// Region became pinned.
    Pinned,
    /// Region was released through a boundary.
    Released(Boundary),
}

/// Smoothing between the scroll-derived target progress and the displayed progress.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Scrub {
    lag_secs: f64,
}

impl Scrub {
    /// Displayed progress equals the target on every scroll sample.
    pub fn immediate() -> Self {
        Self { lag_secs: 0.0 }
    }

    /// Displayed progress catches up exponentially; `lag_secs` is the time constant.
    pub fn lagged(lag_secs: f64) -> ScrubResult<Self> {
        if !lag_secs.is_finite() || lag_secs < 0.0 {
            return Err(ScrubError::validation("scrub lag must be finite and >= 0"));
        }
        Ok(Self { lag_secs })
    }

    /// Time constant in seconds (0 = immediate).
    pub fn lag_secs(self) -> f64 {
        self.lag_secs
    }

    /// `true` when there is no smoothing.
    pub fn is_immediate(self) -> bool {
        self.lag_secs == 0.0
    }

    fn step(self, current: f64, target: f64, dt_secs: f64) -> f64 {
        if self.is_immediate() {
            return target;
        }
        if !dt_secs.is_finite() || dt_secs <= 0.0 {
            return current;
        }
        let alpha = 1.0 - (-dt_secs / self.lag_secs).exp();
        let next = current + (target - current) * alpha;
        if (target - next).abs() < SNAP_EPSILON {
            target
        } else {
            next
        }
    }
}

impl Default for Scrub {
    fn default() -> Self {
        Self::immediate()
    }
}

/// Layout and smoothing inputs for [`ScrollTimelineController::attach`].
#[derive(Clone, Copy, Debug)]
pub struct ControllerOpts {
    /// Pin geometry of the section.
    pub geometry: PinGeometry,
    /// Viewport at attach time.
    pub viewport: Viewport,
    /// Progress smoothing.
    pub scrub: Scrub,
}

/// Drives one pinned section from scroll offsets.
///
/// The target progress is a pure function of the latest scroll offset and the pin range, so
/// scrolling back to an offset always restores the same frame. Every progress change is dispatched
/// as a single tick: the frame index is mapped, the presenter draws, auxiliary tracks are sampled,
/// and timeline subscribers run, all from the same sample.
///
/// Construction needs [`ReadyFrames`], which only exists once preload has fully settled.
#[derive(Debug)]
pub struct ScrollTimelineController {
    frames: Arc<ReadyFrames>,
    presenter: CanvasPresenter,
    aux: AuxTimeline,
    aux_frame: AuxFrame,
    timeline: Timeline,

    geometry: PinGeometry,
    viewport: Viewport,
    range: ScrollRange,
    scrub: Scrub,

    state: PinState,
    offset: f64,
    target: f64,
    progress: f64,
    index: FrameIndex,
    dispatched: bool,
}

impl ScrollTimelineController {
    /// Attach at scroll `offset` and present the frame for it.
    ///
    /// Subscribers already registered on `timeline` receive the initial tick. The first sample is
    /// applied without smoothing so the canvas never starts blank.
    pub fn attach(
        frames: Arc<ReadyFrames>,
        presenter: CanvasPresenter,
        aux: AuxTimeline,
        timeline: Timeline,
        opts: ControllerOpts,
        offset: f64,
    ) -> ScrubResult<Self> {
        let range = opts.geometry.resolve(opts.viewport)?;
        let mut ctl = Self {
            frames,
            presenter,
            aux,
            aux_frame: AuxFrame::default(),
            timeline,
            geometry: opts.geometry,
            viewport: opts.viewport,
            range,
            scrub: opts.scrub,
            state: PinState::Unattached,
            offset,
            target: 0.0,
            progress: 0.0,
            index: FrameIndex(0),
            dispatched: false,
        };

        ctl.update_pin_state(offset);
        ctl.target = range.progress_at(offset);
        ctl.set_progress(ctl.target);
        tracing::debug!(
            start = range.start,
            end = range.end,
            state = ?ctl.state,
            "scroll timeline attached"
        );
        Ok(ctl)
    }

    /// Feed a new scroll offset.
    ///
    /// Updates the pin state and target progress. With immediate scrub the tick is dispatched now;
    /// otherwise [`ScrollTimelineController::tick`] catches up on following animation frames.
    pub fn scroll_to(&mut self, offset: f64) -> Option<PinChange> {
        self.offset = offset;
        let change = self.update_pin_state(offset);
        self.target = self.range.progress_at(offset);
        if self.scrub.is_immediate() {
            self.set_progress(self.target);
        }
        change
    }

    /// Advance smoothing by `dt_secs`. Returns `true` when a tick was dispatched.
    pub fn tick(&mut self, dt_secs: f64) -> bool {
        if !self.needs_tick() {
            return false;
        }
        let next = self.scrub.step(self.progress, self.target, dt_secs);
        self.set_progress(next)
    }

    /// `true` while displayed progress lags behind the target.
    pub fn needs_tick(&self) -> bool {
        self.progress != self.target
    }

    /// Jump displayed progress to the target.
    pub fn settle(&mut self) -> bool {
        self.set_progress(self.target)
    }

    /// Recompute the pin range for a new viewport.
    ///
    /// The pin state follows the new range right away and any transition is returned. Progress and
    /// the frame on the canvas stay as they are until the next scroll sample.
    pub fn resize(&mut self, viewport: Viewport) -> ScrubResult<Option<PinChange>> {
        let range = self.geometry.resolve(viewport)?;
        tracing::debug!(
            old_start = self.range.start,
            old_end = self.range.end,
            start = range.start,
            end = range.end,
            "pin range recomputed"
        );
        self.viewport = viewport;
        self.range = range;
        Ok(self.update_pin_state(self.offset))
    }

    /// Current pin state.
    pub fn state(&self) -> PinState {
        self.state
    }

    /// Displayed progress.
    pub fn progress(&self) -> f64 {
        self.progress
    }

    /// Progress implied by the latest scroll offset.
    pub fn target_progress(&self) -> f64 {
        self.target
    }

    /// Frame index of the displayed progress.
    pub fn frame_index(&self) -> FrameIndex {
        self.index
    }

    /// Latest scroll offset.
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Current pin range.
    pub fn range(&self) -> ScrollRange {
        self.range
    }

    /// Auxiliary styles of the latest tick.
    pub fn aux_frame(&self) -> &AuxFrame {
        &self.aux_frame
    }

    /// Frames being scrubbed.
    pub fn frames(&self) -> &ReadyFrames {
        &self.frames
    }

    /// Presenter owning the canvas.
    pub fn presenter(&self) -> &CanvasPresenter {
        &self.presenter
    }

    /// Timeline for registering extra subscribers.
    pub fn timeline_mut(&mut self) -> &mut Timeline {
        &mut self.timeline
    }

    /// Read-only timeline access.
    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Canvas placement for the current viewport.
    pub fn display_rect(&self) -> Option<Rect> {
        self.presenter.display_rect(self.viewport)
    }

    /// Release the pin and drop subscribers, handing the presenter back to the caller.
    pub fn detach(mut self) -> CanvasPresenter {
        if self.state == PinState::Pinned {
            tracing::debug!("releasing pin on detach");
        }
        self.timeline.clear();
        self.presenter
    }

    fn update_pin_state(&mut self, offset: f64) -> Option<PinChange> {
        let next = match (self.range.locate(offset), self.state) {
            (RangePosition::Before, PinState::Unattached) => PinState::Unattached,
            (RangePosition::Before, _) => PinState::Released {
                boundary: Boundary::Start,
            },
            (RangePosition::Inside, _) => PinState::Pinned,
            (RangePosition::After, _) => PinState::Released {
                boundary: Boundary::End,
            },
        };
        if next == self.state {
            return None;
        }

        self.state = next;
        let change = match next {
            PinState::Pinned => PinChange::Pinned,
            PinState::Released { boundary } => PinChange::Released(boundary),
            PinState::Unattached => return None,
        };
        tracing::debug!(?change, offset, "pin state changed");
        Some(change)
    }

    fn set_progress(&mut self, progress: f64) -> bool {
        if self.dispatched && progress == self.progress {
            return false;
        }
        self.progress = progress;
        self.dispatch();
        true
    }

    fn dispatch(&mut self) {
        let index = index_for(self.progress, self.frames.count());
        self.index = index;
        self.presenter.present(index, self.frames.get(index));
        self.aux.sample_into(self.progress, &mut self.aux_frame);

        let tick = Tick {
            progress: self.progress,
            index,
            aux: &self.aux_frame,
        };
        self.timeline.advance(&tick);
        self.dispatched = true;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/controller.rs"]
mod tests;
