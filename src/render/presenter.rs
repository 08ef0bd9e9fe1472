use crate::assets::decode::FrameImage;
use crate::foundation::core::{Canvas, FrameIndex, Rect, Rgba8Premul, Viewport};
use crate::foundation::error::ScrubResult;
use crate::render::surface::{FrameRGBA, Surface};

/// What the presenter does when asked to show a frame that never loaded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFrame {
    /// Skip the draw and keep whatever is on the surface.
    #[default]
    Retain,
    /// Fill the surface with a straight-alpha RGBA8 colour.
    Placeholder([u8; 4]),
}

/// Result of one presentation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Presented {
    /// The surface now shows the requested frame.
    Drawn,
    /// The requested index is already on the surface.
    Unchanged,
    /// The frame is missing and the previous content was kept.
    Retained,
    /// The frame is missing and the placeholder was drawn.
    Placeholder,
    /// The presenter is closed; nothing was touched.
    Closed,
}

/// Presentation counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PresentStats {
    /// Frames blitted onto the surface.
    pub draws: u64,
    /// Requests for missing frames that kept the previous content.
    pub retained: u64,
    /// Placeholder fills.
    pub placeholders: u64,
}

/// Sole owner of a section's drawing surface.
///
/// The surface has a fixed resolution chosen at [`CanvasPresenter::open`]. Each draw replaces the
/// whole surface; nothing accumulates between frames. After [`CanvasPresenter::close`] the surface
/// is released and every further request is a no-op.
#[derive(Debug)]
pub struct CanvasPresenter {
    surface: Option<Surface>,
    missing: MissingFrame,
    last_index: Option<FrameIndex>,
    stats: PresentStats,
}

impl CanvasPresenter {
    /// Allocate a surface of `canvas` size, cleared to transparent.
    pub fn open(canvas: Canvas, missing: MissingFrame) -> ScrubResult<Self> {
        canvas.validate()?;
        Ok(Self {
            surface: Some(Surface::new(canvas, Rgba8Premul::transparent())),
            missing,
            last_index: None,
            stats: PresentStats::default(),
        })
    }

    /// Replace the surface with `frame`, or apply the missing-frame policy for `None`.
    pub fn draw(&mut self, frame: Option<&FrameImage>) -> Presented {
        let Some(surface) = self.surface.as_mut() else {
            return Presented::Closed;
        };

        if let Some(frame) = frame
            && surface.blit(frame)
        {
            self.stats.draws += 1;
            return Presented::Drawn;
        }

        match self.missing {
            MissingFrame::Retain => {
                self.stats.retained += 1;
                Presented::Retained
            }
            MissingFrame::Placeholder([r, g, b, a]) => {
                surface.clear(Rgba8Premul::from_straight_rgba(r, g, b, a));
                self.stats.placeholders += 1;
                Presented::Placeholder
            }
        }
    }

    /// Show frame `index`, skipping the blit when it is already on the surface.
    pub fn present(&mut self, index: FrameIndex, frame: Option<&FrameImage>) -> Presented {
        if self.surface.is_none() {
            return Presented::Closed;
        }
        if self.last_index == Some(index) {
            return Presented::Unchanged;
        }

        let out = self.draw(frame);
        match out {
            Presented::Drawn | Presented::Placeholder => {
                self.last_index = Some(index);
                tracing::trace!(index = index.0, ?out, "presented frame");
            }
            Presented::Retained => {
                tracing::trace!(index = index.0, "frame missing; keeping previous content");
            }
            Presented::Unchanged | Presented::Closed => {}
        }
        out
    }

    /// Index currently shown, if any frame (or placeholder) has been presented.
    pub fn last_index(&self) -> Option<FrameIndex> {
        self.last_index
    }

    /// Surface resolution, or `None` once closed.
    pub fn canvas(&self) -> Option<Canvas> {
        self.surface.as_ref().map(Surface::canvas)
    }

    /// Copy of the current surface, or `None` once closed.
    pub fn snapshot(&self) -> Option<FrameRGBA> {
        self.surface.as_ref().map(Surface::snapshot)
    }

    /// Presentation counters.
    pub fn stats(&self) -> PresentStats {
        self.stats
    }

    /// `true` until [`CanvasPresenter::close`].
    pub fn is_open(&self) -> bool {
        self.surface.is_some()
    }

    /// Where the surface lands inside `viewport` when scaled to cover it, centred.
    ///
    /// Depends on the viewport only, so hosts recompute it on resize while the surface itself keeps
    /// its resolution.
    pub fn display_rect(&self, viewport: Viewport) -> Option<Rect> {
        let canvas = self.canvas()?;
        Some(cover_rect(canvas, viewport))
    }

    /// Release the surface. Idempotent.
    pub fn close(&mut self) -> PresentStats {
        if self.surface.take().is_some() {
            tracing::debug!(draws = self.stats.draws, "canvas presenter closed");
        }
        self.stats
    }
}

pub(crate) fn cover_rect(canvas: Canvas, viewport: Viewport) -> Rect {
    let cw = f64::from(canvas.width);
    let ch = f64::from(canvas.height);
    let scale = (viewport.width / cw).max(viewport.height / ch);
    let w = cw * scale;
    let h = ch * scale;
    let x = (viewport.width - w) / 2.0;
    let y = (viewport.height - h) / 2.0;
    Rect::new(x, y, x + w, y + h)
}

#[cfg(test)]
#[path = "../../tests/unit/render/presenter.rs"]
mod tests;
