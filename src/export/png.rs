use std::path::Path;

use anyhow::Context;
use base64::Engine as _;

use crate::foundation::color::MaskStyle;
use crate::foundation::core::Affine;
use crate::foundation::error::{SafezoneError, SafezoneResult};
use crate::format::model::FormatSpec;
use crate::render::compositor::fill_mask;
use crate::render::surface::RenderTarget;

/// A rasterized mask ready for download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskExport {
    pub width: u32,
    pub height: u32,
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
}

impl MaskExport {
    /// `data:image/png;base64,...` for browser-style download sinks.
    pub fn data_uri(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> SafezoneResult<()> {
        let path = path.as_ref();
        std::fs::write(path, &self.png)
            .with_context(|| format!("write mask png '{}'", path.display()))?;
        Ok(())
    }
}

/// Renders masks offscreen, independent of any on-screen surface.
///
/// The offscreen context is reused across exports of the same size.
#[derive(Default)]
pub struct Exporter {
    ctx: Option<vello_cpu::RenderContext>,
}

impl std::fmt::Debug for Exporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Exporter").finish_non_exhaustive()
    }
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render the mask of `spec` at `scale` and encode it as PNG.
    ///
    /// The surface is `round(width * scale) x round(height * scale)`. Geometry is resolved in the
    /// format's native space and scaled by a uniform transform, so both safe zones and danger
    /// zones keep their proportions. Only the mask is drawn; the background stays transparent.
    #[tracing::instrument(level = "debug", skip(self, spec, style), fields(width = spec.width, height = spec.height))]
    pub fn export(
        &mut self,
        spec: &FormatSpec,
        style: &MaskStyle,
        scale: f64,
    ) -> SafezoneResult<MaskExport> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(SafezoneError::validation(format!(
                "export scale must be a positive number (got {scale})"
            )));
        }
        spec.validate()?;
        style.validate()?;

        let canvas = spec.canvas().scaled(scale);
        let mut target = RenderTarget::new(canvas)?;
        let (w, h) = target.dims_u16();

        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == w && ctx.height() == h => ctx,
            _ => vello_cpu::RenderContext::new(w, h),
        };
        ctx.reset();
        fill_mask(
            &mut ctx,
            spec,
            f64::from(spec.width),
            f64::from(spec.height),
            Affine::scale(scale),
            style,
        );
        ctx.flush();
        ctx.render_to_pixmap(target.pixmap_mut());
        self.ctx = Some(ctx);

        let png = target.encode_png()?;
        tracing::debug!(
            width = canvas.width,
            height = canvas.height,
            bytes = png.len(),
            "mask exported"
        );
        Ok(MaskExport {
            width: canvas.width,
            height: canvas.height,
            png,
        })
    }
}

/// `{platform}_{format}_mask.png`, with each whitespace character in the format name replaced by
/// a hyphen.
pub fn export_file_name(platform: &str, format: &str) -> String {
    let format: String = format
        .chars()
        .map(|c| if c.is_whitespace() { '-' } else { c })
        .collect();
    format!("{platform}_{format}_mask.png")
}

#[cfg(test)]
#[path = "../../tests/unit/export/png.rs"]
mod tests;
