use crate::assets::decode::FrameImage;
use crate::foundation::core::{Canvas, Rgba8Premul};

/// A canvas readback as RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameRGBA {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether the `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameRGBA {
    /// Pixel at `(x, y)`; `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Convert to straight alpha (for PNG output). A no-op when already straight.
    pub fn into_straight(mut self) -> Self {
        if !self.premultiplied {
            return self;
        }
        for px in self.data.chunks_exact_mut(4) {
            let a = u32::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in &mut px[..3] {
                *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        self.premultiplied = false;
        self
    }
}

/// Fixed-resolution premultiplied RGBA8 drawing surface.
///
/// The resolution is set at construction and never follows the size of what is drawn.
#[derive(Clone, Debug)]
pub(crate) struct Surface {
    canvas: Canvas,
    data: Vec<u8>,
}

impl Surface {
    pub(crate) fn new(canvas: Canvas, clear: Rgba8Premul) -> Self {
        let mut s = Self {
            canvas,
            data: vec![0; canvas.byte_len()],
        };
        s.clear(clear);
        s
    }

    pub(crate) fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub(crate) fn clear(&mut self, rgba: Rgba8Premul) {
        let px = rgba.to_array();
        for dst in self.data.chunks_exact_mut(4) {
            dst.copy_from_slice(&px);
        }
    }

    /// Overwrite every pixel with `frame`.
    ///
    /// Frames are expected to match the canvas size and are copied as-is; any other size is
    /// stretched with nearest-neighbour sampling to cover the whole surface. Returns `false`, and
    /// leaves the surface untouched, for an empty frame or one whose buffer does not match its size.
    pub(crate) fn blit(&mut self, frame: &FrameImage) -> bool {
        let Canvas { width, height } = self.canvas;
        let expected = (frame.width as usize) * (frame.height as usize) * 4;
        if expected == 0 || frame.rgba8_premul.len() != expected {
            return false;
        }
        if frame.width == width && frame.height == height {
            self.data.copy_from_slice(frame.rgba8_premul.as_slice());
            return true;
        }

        let src = frame.rgba8_premul.as_slice();
        let (sw, sh) = (frame.width as u64, frame.height as u64);
        let (dw, dh) = (u64::from(width), u64::from(height));
        for y in 0..dh {
            let sy = (y * sh / dh) as usize;
            let row = &mut self.data[(y * dw * 4) as usize..((y + 1) * dw * 4) as usize];
            for (x, dst) in row.chunks_exact_mut(4).enumerate() {
                let sx = (x as u64 * sw / dw) as usize;
                let si = (sy * sw as usize + sx) * 4;
                dst.copy_from_slice(&src[si..si + 4]);
            }
        }
        true
    }

    pub(crate) fn snapshot(&self) -> FrameRGBA {
        FrameRGBA {
            width: self.canvas.width,
            height: self.canvas.height,
            data: self.data.clone(),
            premultiplied: true,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
