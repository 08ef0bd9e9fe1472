//! scrubreel renders image sequences scrubbed by scroll position.
//!
//! A pinned page section shows a canvas whose content follows how far the reader has scrolled
//! through it, like dragging a video seek bar. Around it, auxiliary element animations (parallax
//! headings, fades, blur) ride the same progress value so canvas and text stay in lockstep.
//!
//! # Pipeline overview
//!
//! 1. **Preload**: `FrameSource + FramePathTemplate -> FrameStore` (parallel fetch and decode,
//!    failures absorbed per frame)
//! 2. **Gate**: `FrameStore -> ReadyFrames` once every frame has settled
//! 3. **Map**: `scroll offset -> progress -> FrameIndex` via the pin range and [`index_for`]
//! 4. **Present**: `CanvasPresenter` overwrites its fixed-resolution surface with the frame, while
//!    `AuxTimeline` and [`Timeline`] subscribers consume the same tick
//!
//! [`ScrubSection`] ties the stages together and owns teardown.
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic**: the frame for a scroll offset depends on that offset only, so scrubbing
//!   backwards retraces the same frames.
//! - **Single owner**: the canvas surface is mutated by the presenter alone.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod animation;
mod assets;
mod config;
mod foundation;
mod lifecycle;
mod render;
mod timeline;

pub use animation::ease::Ease;
pub use animation::tracks::{AuxFrame, AuxProperty, AuxTimeline, AuxTrack, ElementStyle};
pub use assets::decode::{FrameImage, decode_frame};
pub use assets::preload::{FrameLoaded, Preload, PreloadOpts};
#[cfg(feature = "http")]
pub use assets::source::HttpFrameSource;
pub use assets::source::{FrameSource, FsFrameSource, MemoryFrameSource};
pub use assets::store::{FrameSlot, FrameStore, ReadyFrames};
pub use assets::template::{FramePathTemplate, normalize_rel_path};
pub use config::{FramesConfig, PreloadConfig, SectionConfig};
pub use foundation::core::{Canvas, FrameCount, FrameIndex, Rect, Rgba8Premul, Vec2, Viewport};
pub use foundation::error::{ScrubError, ScrubResult};
pub use lifecycle::pool::shared_decode_pool;
pub use lifecycle::section::{LifecycleEvent, ScrubSection};
pub use render::presenter::{CanvasPresenter, MissingFrame, PresentStats, Presented};
pub use render::surface::FrameRGBA;
pub use timeline::controller::{
    Boundary, ControllerOpts, PinChange, PinState, ScrollTimelineController, Scrub,
};
pub use timeline::geometry::{PinGeometry, RangePosition, ScrollDistance, ScrollRange};
pub use timeline::progress::index_for;
pub use timeline::timeline::{SubscriberId, Tick, Timeline};
