use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::ScrubResult;

/// Decoded raster frame in premultiplied RGBA8 form.
///
/// Pixel data sits behind an `Arc` so the frame store can hand out cheap clones.
#[derive(Clone, Debug)]
pub struct FrameImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixel bytes in row-major premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

impl FrameImage {
    /// Build a frame from already-premultiplied RGBA8 bytes.
    pub fn from_premul(width: u32, height: u32, rgba8_premul: Vec<u8>) -> ScrubResult<Self> {
        let expected = (width as usize) * (height as usize) * 4;
        if rgba8_premul.len() != expected {
            return Err(crate::ScrubError::validation(format!(
                "frame buffer is {} bytes, expected {expected} for {width}x{height}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            width,
            height,
            rgba8_premul: Arc::new(rgba8_premul),
        })
    }

    /// Premultiplied pixel at `(x, y)`; `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.rgba8_premul.get(i..i + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }
}

/// Decode encoded image bytes and convert to premultiplied RGBA8.
pub fn decode_frame(bytes: &[u8]) -> ScrubResult<FrameImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode frame image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(FrameImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    use crate::foundation::math::mul_div255_u8;

    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        if a == 255 {
            continue;
        }
        px[0] = mul_div255_u8(u16::from(px[0]), a);
        px[1] = mul_div255_u8(u16::from(px[1]), a);
        px[2] = mul_div255_u8(u16::from(px[2]), a);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
