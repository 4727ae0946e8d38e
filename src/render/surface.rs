use std::io::Cursor;

use anyhow::Context;

use crate::foundation::core::{Canvas, Rgba8Premul, unpremultiply_rgba8_in_place};
use crate::foundation::error::{SafezoneError, SafezoneResult};
use crate::render::cpu::{clear_pixmap, dim_u16};

/// An addressable drawing surface.
///
/// Pixel dimensions are authoritative for mask geometry; any on-screen scaling is the host's
/// business (see [`crate::VideoOverlayLayout`]). Pixels are stored premultiplied.
pub struct RenderTarget {
    canvas: Canvas,
    pixmap: vello_cpu::Pixmap,
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("canvas", &self.canvas)
            .finish_non_exhaustive()
    }
}

impl RenderTarget {
    /// Allocate a transparent surface. Each side must be non-zero and fit in a `u16`.
    pub fn new(canvas: Canvas) -> SafezoneResult<Self> {
        let canvas = Canvas::new(canvas.width, canvas.height)?;
        let w = dim_u16(canvas.width, "surface width")?;
        let h = dim_u16(canvas.height, "surface height")?;
        Ok(Self {
            canvas,
            pixmap: vello_cpu::Pixmap::new(w, h),
        })
    }

    /// Reallocate when the dimensions change. Resizing discards the contents.
    pub fn resize(&mut self, canvas: Canvas) -> SafezoneResult<()> {
        if canvas != self.canvas {
            *self = Self::new(canvas)?;
        }
        Ok(())
    }

    /// Current pixel dimensions.
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.canvas.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.canvas.height
    }

    /// Reset every pixel to transparent.
    pub fn clear(&mut self) {
        clear_pixmap(&mut self.pixmap);
    }

    /// Row-major premultiplied RGBA8 bytes.
    pub fn data_premul(&self) -> &[u8] {
        self.pixmap.data_as_u8_slice()
    }

    /// Premultiplied pixel at `(x, y)`, or `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba8Premul> {
        if x >= self.canvas.width || y >= self.canvas.height {
            return None;
        }
        let i = (y as usize * self.canvas.width as usize + x as usize) * 4;
        let px = &self.data_premul()[i..i + 4];
        Some(Rgba8Premul {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        })
    }

    /// Number of pixels with any coverage.
    pub fn covered_pixels(&self) -> u64 {
        self.data_premul()
            .chunks_exact(4)
            .filter(|px| px[3] != 0)
            .count() as u64
    }

    /// Covered pixels over total pixels.
    pub fn coverage_ratio(&self) -> f64 {
        self.covered_pixels() as f64 / self.canvas.area() as f64
    }

    /// Copy of the pixels with alpha divided back out.
    pub fn to_rgba8_straight(&self) -> Vec<u8> {
        let mut out = self.data_premul().to_vec();
        unpremultiply_rgba8_in_place(&mut out);
        out
    }

    /// Encode the surface as a straight-alpha PNG.
    pub fn encode_png(&self) -> SafezoneResult<Vec<u8>> {
        let img = image::RgbaImage::from_raw(
            self.canvas.width,
            self.canvas.height,
            self.to_rgba8_straight(),
        )
        .ok_or_else(|| SafezoneError::render("surface buffer does not match its dimensions"))?;

        let mut buf = Vec::new();
        image::DynamicImage::ImageRgba8(img)
            .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
            .context("encode png")?;
        Ok(buf)
    }

    pub(crate) fn pixmap_mut(&mut self) -> &mut vello_cpu::Pixmap {
        &mut self.pixmap
    }

    pub(crate) fn dims_u16(&self) -> (u16, u16) {
        (self.pixmap.width(), self.pixmap.height())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
