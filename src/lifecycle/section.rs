use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::animation::tracks::{AuxFrame, AuxTimeline};
use crate::assets::preload::Preload;
use crate::assets::source::FrameSource;
use crate::assets::store::FrameStore;
use crate::config::SectionConfig;
use crate::foundation::core::{FrameIndex, Rect, Viewport};
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::render::presenter::{CanvasPresenter, PresentStats};
use crate::render::surface::FrameRGBA;
use crate::timeline::controller::{ControllerOpts, PinChange, PinState, ScrollTimelineController};
use crate::timeline::timeline::Timeline;

/// Coarse lifecycle notifications for the host UI.
///
/// Per-tick state never crosses this boundary; hosts read the canvas and styles when they paint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleEvent {
    /// Every frame settled and scrubbing is live.
    Ready {
        /// Frames decoded successfully.
        loaded: u32,
        /// Frames that failed and will never be drawn.
        failed: u32,
    },
    /// Not a single frame loaded; the canvas stays at its cleared state.
    AllFramesFailed {
        /// Frames attempted.
        count: u32,
    },
}

enum Phase {
    Loading {
        store: FrameStore,
        preload: Preload,
        presenter: CanvasPresenter,
        aux: AuxTimeline,
        timeline: Timeline,
    },
    Active(Box<ScrollTimelineController>),
    Unmounted,
}

/// Owns one scroll-pinned frame-scrub section from mount to unmount.
///
/// Mounting starts the preload. Scroll and resize input is accepted right away, but the timeline
/// controller is only built once every frame has settled, so the canvas is never drawn from a
/// partially loaded sequence. Unmounting (or dropping the section) cancels outstanding loads,
/// releases the pin, drops subscribers, closes the canvas and stops animation-frame requests;
/// every later call is a no-op.
pub struct ScrubSection {
    opts: ControllerOpts,
    offset: f64,
    phase: Phase,
    closed_stats: PresentStats,
}

impl ScrubSection {
    /// Validate `cfg`, open the canvas and start loading frames from `source`.
    #[tracing::instrument(skip(cfg, source), fields(frames = cfg.frames.count))]
    pub fn mount(
        cfg: &SectionConfig,
        source: Arc<dyn FrameSource>,
        viewport: Viewport,
        offset: f64,
    ) -> ScrubResult<Self> {
        cfg.validate()?;
        let count = cfg.frame_count()?;
        let template = cfg.template()?;
        let opts = cfg.controller_opts(viewport)?;
        opts.geometry.resolve(viewport)?;

        let presenter = CanvasPresenter::open(cfg.canvas, cfg.missing_frame)?;
        let aux = cfg.aux_timeline()?;
        let preload = Preload::spawn(source, &template, count, cfg.preload_opts())?;

        tracing::debug!("section mounted; preloading");
        Ok(Self {
            opts,
            offset,
            phase: Phase::Loading {
                store: FrameStore::new(count),
                preload,
                presenter,
                aux,
                timeline: Timeline::new(),
            },
            closed_stats: PresentStats::default(),
        })
    }

    /// Absorb settled frame loads without blocking; activates the section once all have settled.
    pub fn pump(&mut self) -> ScrubResult<Vec<LifecycleEvent>> {
        let Phase::Loading { store, preload, .. } = &mut self.phase else {
            return Ok(Vec::new());
        };
        while let Some(msg) = preload.try_next() {
            store.settle(msg.index, msg.outcome);
        }
        if store.is_ready() {
            return self.activate();
        }
        Ok(Vec::new())
    }

    /// Block until every frame has settled or `timeout` elapses.
    ///
    /// Returns the events of activation, or an empty list if the section was already active.
    pub fn wait_ready(&mut self, timeout: Duration) -> ScrubResult<Vec<LifecycleEvent>> {
        let deadline = Instant::now() + timeout;
        loop {
            let Phase::Loading { store, preload, .. } = &mut self.phase else {
                if matches!(self.phase, Phase::Unmounted) {
                    return Err(ScrubError::lifecycle("section is unmounted"));
                }
                return Ok(Vec::new());
            };

            while let Some(msg) = preload.try_next() {
                store.settle(msg.index, msg.outcome);
            }
            if store.is_ready() {
                return self.activate();
            }

            let now = Instant::now();
            if now >= deadline {
                return Err(ScrubError::lifecycle(format!(
                    "timed out waiting for frames ({}/{} settled)",
                    store.settled_count(),
                    store.count().get()
                )));
            }
            match preload.next_timeout(deadline - now) {
                Some(msg) => {
                    store.settle(msg.index, msg.outcome);
                }
                None if preload.is_finished() => {
                    while let Some(msg) = preload.try_next() {
                        store.settle(msg.index, msg.outcome);
                    }
                    if !store.is_ready() {
                        return Err(ScrubError::lifecycle(
                            "preload stopped before every frame settled",
                        ));
                    }
                }
                None => {}
            }
        }
    }

    fn activate(&mut self) -> ScrubResult<Vec<LifecycleEvent>> {
        let phase = std::mem::replace(&mut self.phase, Phase::Unmounted);
        let Phase::Loading {
            store,
            preload,
            presenter,
            aux,
            timeline,
        } = phase
        else {
            self.phase = phase;
            return Ok(Vec::new());
        };

        let frames = match store.into_ready() {
            Ok(frames) => Arc::new(frames),
            Err(store) => {
                self.phase = Phase::Loading {
                    store,
                    preload,
                    presenter,
                    aux,
                    timeline,
                };
                return Ok(Vec::new());
            }
        };
        drop(preload);

        let count = frames.count().get();
        let loaded = frames.loaded_count();
        let mut events = vec![LifecycleEvent::Ready {
            loaded,
            failed: count - loaded,
        }];
        if frames.all_failed() {
            tracing::warn!(count, "no frame loaded; canvas stays blank");
            events.push(LifecycleEvent::AllFramesFailed { count });
        } else {
            tracing::info!(loaded, failed = count - loaded, "frame sequence ready");
        }

        let ctl = ScrollTimelineController::attach(
            frames,
            presenter,
            aux,
            timeline,
            self.opts,
            self.offset,
        )?;
        self.phase = Phase::Active(Box::new(ctl));
        Ok(events)
    }

    /// Feed a scroll offset. Before activation the latest offset is remembered for attach time.
    pub fn on_scroll(&mut self, offset: f64) -> Option<PinChange> {
        match &mut self.phase {
            Phase::Loading { .. } => {
                self.offset = offset;
                None
            }
            Phase::Active(ctl) => {
                self.offset = offset;
                ctl.scroll_to(offset)
            }
            Phase::Unmounted => None,
        }
    }

    /// Apply a viewport change: the pin range is recomputed, the presented frame is kept.
    ///
    /// Returns the pin transition caused by the new range, if any.
    pub fn on_resize(&mut self, viewport: Viewport) -> ScrubResult<Option<PinChange>> {
        match &mut self.phase {
            Phase::Loading { .. } => {
                self.opts.geometry.resolve(viewport)?;
                self.opts.viewport = viewport;
                Ok(None)
            }
            Phase::Active(ctl) => {
                let change = ctl.resize(viewport)?;
                self.opts.viewport = viewport;
                Ok(change)
            }
            Phase::Unmounted => Ok(None),
        }
    }

    /// Animation-frame callback. Returns `true` when a tick was dispatched.
    pub fn on_animation_frame(&mut self, dt_secs: f64) -> bool {
        match &mut self.phase {
            Phase::Active(ctl) => ctl.tick(dt_secs),
            Phase::Loading { .. } | Phase::Unmounted => false,
        }
    }

    /// `true` while the host should keep requesting animation frames.
    pub fn wants_animation_frame(&self) -> bool {
        match &self.phase {
            Phase::Active(ctl) => ctl.needs_tick(),
            Phase::Loading { .. } | Phase::Unmounted => false,
        }
    }

    /// Tear the section down. Returns `false` if it was already unmounted.
    pub fn unmount(&mut self) -> bool {
        let phase = std::mem::replace(&mut self.phase, Phase::Unmounted);
        let mut presenter = match phase {
            Phase::Loading {
                preload, presenter, ..
            } => {
                preload.cancel();
                drop(preload);
                presenter
            }
            Phase::Active(ctl) => (*ctl).detach(),
            Phase::Unmounted => return false,
        };
        self.closed_stats = presenter.close();
        tracing::debug!("section unmounted");
        true
    }

    /// `true` until [`ScrubSection::unmount`].
    pub fn is_mounted(&self) -> bool {
        !matches!(self.phase, Phase::Unmounted)
    }

    /// `true` once scrubbing is live.
    pub fn is_ready(&self) -> bool {
        matches!(self.phase, Phase::Active(_))
    }

    /// Settled and total frame counts while loading; `None` otherwise.
    pub fn load_progress(&self) -> Option<(u32, u32)> {
        match &self.phase {
            Phase::Loading { store, .. } => Some((store.settled_count(), store.count().get())),
            Phase::Active(_) | Phase::Unmounted => None,
        }
    }

    /// Active controller, once ready.
    pub fn controller(&self) -> Option<&ScrollTimelineController> {
        match &self.phase {
            Phase::Active(ctl) => Some(&**ctl),
            Phase::Loading { .. } | Phase::Unmounted => None,
        }
    }

    /// Timeline for registering subscribers, before or after activation.
    pub fn timeline_mut(&mut self) -> Option<&mut Timeline> {
        match &mut self.phase {
            Phase::Loading { timeline, .. } => Some(timeline),
            Phase::Active(ctl) => Some(ctl.timeline_mut()),
            Phase::Unmounted => None,
        }
    }

    fn presenter(&self) -> Option<&CanvasPresenter> {
        match &self.phase {
            Phase::Loading { presenter, .. } => Some(presenter),
            Phase::Active(ctl) => Some(ctl.presenter()),
            Phase::Unmounted => None,
        }
    }

    /// Copy of the canvas; `None` after unmount.
    pub fn snapshot(&self) -> Option<FrameRGBA> {
        self.presenter()?.snapshot()
    }

    /// Presentation counters, preserved across unmount.
    pub fn present_stats(&self) -> PresentStats {
        self.presenter()
            .map(CanvasPresenter::stats)
            .unwrap_or(self.closed_stats)
    }

    /// Canvas placement inside the current viewport.
    pub fn display_rect(&self) -> Option<Rect> {
        self.presenter()?.display_rect(self.opts.viewport)
    }

    /// Frame index on the canvas, once ready.
    pub fn frame_index(&self) -> Option<FrameIndex> {
        self.controller().map(ScrollTimelineController::frame_index)
    }

    /// Displayed progress, once ready.
    pub fn progress(&self) -> Option<f64> {
        self.controller().map(ScrollTimelineController::progress)
    }

    /// Pin state, once ready.
    pub fn pin_state(&self) -> Option<PinState> {
        self.controller().map(ScrollTimelineController::state)
    }

    /// Auxiliary styles of the latest tick, once ready.
    pub fn aux_frame(&self) -> Option<&AuxFrame> {
        self.controller().map(ScrollTimelineController::aux_frame)
    }
}

impl Drop for ScrubSection {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl std::fmt::Debug for ScrubSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let phase = match &self.phase {
            Phase::Loading { .. } => "loading",
            Phase::Active(_) => "active",
            Phase::Unmounted => "unmounted",
        };
        f.debug_struct("ScrubSection")
            .field("phase", &phase)
            .field("offset", &self.offset)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/lifecycle/section.rs"]
mod tests;
