use crate::foundation::error::{ScrubError, ScrubResult};

pub use kurbo::{Rect, Vec2};

/// 0-based index into a frame sequence.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct FrameIndex(pub u32);

impl FrameIndex {
    /// Index as `usize`, for slot lookups.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// Number of frames in a sequence. Always at least one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct FrameCount(u32);

impl FrameCount {
    /// Create a validated frame count (`n >= 1`).
    pub fn new(n: u32) -> ScrubResult<Self> {
        if n == 0 {
            return Err(ScrubError::validation("frame count must be >= 1"));
        }
        Ok(Self(n))
    }

    /// Raw count.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Last valid index, `N - 1`.
    pub fn last(self) -> FrameIndex {
        FrameIndex(self.0 - 1)
    }

    /// Iterate all indices in order.
    pub fn indices(self) -> impl DoubleEndedIterator<Item = FrameIndex> + ExactSizeIterator {
        (0..self.0).map(FrameIndex)
    }
}

/// Fixed drawing-surface resolution in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Reject zero-sized surfaces.
    pub fn validate(self) -> ScrubResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ScrubError::validation("canvas width/height must be > 0"));
        }
        Ok(())
    }

    /// Size of one premultiplied RGBA8 buffer at this resolution.
    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// Host viewport in CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Viewport {
    /// Viewport width.
    pub width: f64,
    /// Viewport height.
    pub height: f64,
}

impl Viewport {
    /// Create a validated viewport (finite, > 0).
    pub fn new(width: f64, height: f64) -> ScrubResult<Self> {
        if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
            return Err(ScrubError::validation("viewport width/height must be finite and > 0"));
        }
        Ok(Self { width, height })
    }
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        use crate::foundation::math::mul_div255_u8;

        Self {
            r: mul_div255_u8(u16::from(r), u16::from(a)),
            g: mul_div255_u8(u16::from(g), u16::from(a)),
            b: mul_div255_u8(u16::from(b), u16::from(a)),
            a,
        }
    }

    /// Channels in `[r, g, b, a]` order.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
