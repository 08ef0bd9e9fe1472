use crate::foundation::core::Viewport;
use crate::foundation::error::{ScrubError, ScrubResult};
use crate::foundation::math::clamp01;

/// Scroll distance a pinned section consumes.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScrollDistance {
    /// Absolute pixels.
    Pixels(f64),
    /// Multiples of the viewport height (`3.0` = "300%").
    Viewport(f64),
}

impl ScrollDistance {
    /// Distance in pixels for `viewport`.
    pub fn resolve(self, viewport: Viewport) -> f64 {
        match self {
            Self::Pixels(px) => px,
            Self::Viewport(k) => k * viewport.height,
        }
    }

    fn raw(self) -> f64 {
        match self {
            Self::Pixels(v) | Self::Viewport(v) => v,
        }
    }
}

/// Absolute scroll offsets `[start, end]` over which a section is pinned.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct ScrollRange {
    /// Offset where pinning begins (progress 0).
    pub start: f64,
    /// Offset where pinning ends (progress 1).
    pub end: f64,
}

impl ScrollRange {
    /// Create a validated range (`start <= end`, both finite).
    pub fn new(start: f64, end: f64) -> ScrubResult<Self> {
        if !start.is_finite() || !end.is_finite() {
            return Err(ScrubError::validation("scroll range bounds must be finite"));
        }
        if start > end {
            return Err(ScrubError::validation("scroll range start must be <= end"));
        }
        Ok(Self { start, end })
    }

    /// Scroll distance covered by the range.
    pub fn len(self) -> f64 {
        self.end - self.start
    }

    /// `true` for a zero-length range.
    pub fn is_empty(self) -> bool {
        self.len() <= 0.0
    }

    /// Progress at scroll `offset`.
    ///
    /// A pure function of the offset: linear inside the range, clamped to 0 before it and 1 after.
    /// A zero-length range steps from 0 to 1 at `start`.
    pub fn progress_at(self, offset: f64) -> f64 {
        if offset.is_nan() {
            return 0.0;
        }
        if self.is_empty() {
            return if offset < self.start { 0.0 } else { 1.0 };
        }
        clamp01((offset - self.start) / self.len())
    }

    /// Where `offset` falls relative to the range.
    pub fn locate(self, offset: f64) -> RangePosition {
        if offset.is_nan() || offset < self.start {
            RangePosition::Before
        } else if offset > self.end {
            RangePosition::After
        } else {
            RangePosition::Inside
        }
    }
}

/// Position of a scroll offset relative to a [`ScrollRange`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RangePosition {
    /// Above the start boundary.
    Before,
    /// Within `[start, end]`.
    Inside,
    /// Past the end boundary.
    After,
}

/// Layout inputs that determine a section's pin range.
///
/// `trigger_top` is the document offset of the section's top edge. Pinning starts when that edge
/// reaches `anchor` (fraction of the viewport height, 0 = top) and lasts for `distance`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PinGeometry {
    /// Document offset of the trigger element's top edge, in pixels.
    pub trigger_top: f64,
    /// Viewport anchor in `[0, 1]`.
    #[serde(default)]
    pub anchor: f64,
    /// Scroll distance consumed while pinned.
    pub distance: ScrollDistance,
}

impl PinGeometry {
    /// Reject non-finite or out-of-range inputs.
    pub fn validate(&self) -> ScrubResult<()> {
        if !self.trigger_top.is_finite() {
            return Err(ScrubError::validation("pin trigger_top must be finite"));
        }
        if !self.anchor.is_finite() || !(0.0..=1.0).contains(&self.anchor) {
            return Err(ScrubError::validation("pin anchor must be within [0, 1]"));
        }
        let d = self.distance.raw();
        if !d.is_finite() || d < 0.0 {
            return Err(ScrubError::validation("pin distance must be finite and >= 0"));
        }
        Ok(())
    }

    /// Pin range for `viewport`. Recomputed whenever the viewport changes.
    pub fn resolve(&self, viewport: Viewport) -> ScrubResult<ScrollRange> {
        self.validate()?;
        let start = self.trigger_top - self.anchor * viewport.height;
        ScrollRange::new(start, start + self.distance.resolve(viewport))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/geometry.rs"]
mod tests;
