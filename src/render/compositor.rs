use std::sync::Arc;

use crate::foundation::color::MaskStyle;
use crate::foundation::core::{Affine, Rect};
use crate::foundation::error::SafezoneResult;
use crate::format::model::FormatSpec;
use crate::geometry::region::MaskRegion;
use crate::geometry::resolve::resolve_mask_rects;
use crate::media::visual::{Bitmap, Visual};
use crate::render::cpu::{
    affine_to_cpu, bezpath_to_cpu, image_paint, premul_bytes_to_pixmap, rect_to_cpu,
};
use crate::render::placeholder::{PlaceholderStyle, PlaceholderText};
use crate::render::surface::RenderTarget;

/// Draws one full frame of the tool: background (visual or empty state) plus the mask.
///
/// Every call starts from a cleared target, so repeated calls with the same inputs produce the
/// same pixels. The `vello_cpu` context, the last decoded bitmap's paint and the placeholder
/// text layer are kept between calls.
pub struct Compositor {
    placeholder: PlaceholderStyle,
    ctx: Option<vello_cpu::RenderContext>,
    text: PlaceholderText,
    bitmap: Option<(Arc<Bitmap>, vello_cpu::Image)>,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("placeholder", &self.placeholder)
            .finish_non_exhaustive()
    }
}

impl Default for Compositor {
    fn default() -> Self {
        Self::new(PlaceholderStyle::default())
    }
}

impl Compositor {
    /// A compositor drawing the empty state with `placeholder`.
    pub fn new(placeholder: PlaceholderStyle) -> Self {
        Self {
            placeholder,
            ctx: None,
            text: PlaceholderText::default(),
            bitmap: None,
        }
    }

    /// Render `visual` (or the empty state) and the mask for `spec` onto `target`.
    ///
    /// - No visual: placeholder background plus centered label.
    /// - Image: stretched to exactly the target size; aspect ratio is not preserved.
    /// - Video: only the mask. The host overlays the video element (see
    ///   [`crate::VideoOverlayLayout`]); frames never enter the pixel buffer.
    ///
    /// `spec = None` draws the background without a mask. Geometry resolves against the target
    /// size.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            width = target.width(),
            height = target.height(),
            visual = ?visual.map(Visual::kind),
        )
    )]
    pub fn composite(
        &mut self,
        target: &mut RenderTarget,
        visual: Option<&Visual>,
        spec: Option<&FormatSpec>,
        style: &MaskStyle,
    ) -> SafezoneResult<()> {
        style.validate()?;
        target.clear();

        let canvas = target.canvas();
        let bounds = canvas.bounds();
        let layer = match visual {
            None => Background::Placeholder(self.text.layer(&self.placeholder, canvas)?),
            Some(Visual::Image(bitmap)) => Background::Image {
                paint: self.bitmap_paint(bitmap)?,
                width: f64::from(bitmap.width),
                height: f64::from(bitmap.height),
            },
            Some(Visual::Video(_)) => Background::None,
        };
        let background = self.placeholder.background;

        self.with_ctx_mut(target, |ctx| {
            match layer {
                Background::None => {}
                Background::Placeholder(text) => {
                    ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
                    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                        background.r,
                        background.g,
                        background.b,
                        255,
                    ));
                    ctx.fill_rect(&rect_to_cpu(bounds));
                    if let Some(text) = text {
                        ctx.set_paint(text);
                        ctx.fill_rect(&rect_to_cpu(bounds));
                    }
                }
                Background::Image {
                    paint,
                    width,
                    height,
                } => {
                    let stretch =
                        Affine::scale_non_uniform(bounds.width() / width, bounds.height() / height);
                    ctx.set_transform(affine_to_cpu(stretch));
                    ctx.set_paint(paint);
                    ctx.fill_rect(&rect_to_cpu(Rect::new(0.0, 0.0, width, height)));
                }
            }

            if let Some(spec) = spec {
                fill_mask(ctx, spec, bounds.width(), bounds.height(), Affine::IDENTITY, style);
            }
            Ok(())
        })
    }

    /// One tick of the video loop: clear and redraw the mask alone.
    pub fn draw_mask_only(
        &mut self,
        target: &mut RenderTarget,
        spec: Option<&FormatSpec>,
        style: &MaskStyle,
    ) -> SafezoneResult<()> {
        style.validate()?;
        target.clear();
        let bounds = target.canvas().bounds();
        self.with_ctx_mut(target, |ctx| {
            if let Some(spec) = spec {
                fill_mask(ctx, spec, bounds.width(), bounds.height(), Affine::IDENTITY, style);
            }
            Ok(())
        })
    }

    fn bitmap_paint(&mut self, bitmap: &Arc<Bitmap>) -> SafezoneResult<vello_cpu::Image> {
        if let Some((cached, paint)) = &self.bitmap
            && Arc::ptr_eq(cached, bitmap)
        {
            return Ok(paint.clone());
        }
        let pixmap = premul_bytes_to_pixmap(&bitmap.rgba8_premul, bitmap.width, bitmap.height)?;
        let paint = image_paint(pixmap);
        self.bitmap = Some((Arc::clone(bitmap), paint.clone()));
        Ok(paint)
    }

    /// Run `f` on a reset context sized to `target`, then rasterize into it.
    fn with_ctx_mut(
        &mut self,
        target: &mut RenderTarget,
        f: impl FnOnce(&mut vello_cpu::RenderContext) -> SafezoneResult<()>,
    ) -> SafezoneResult<()> {
        let (width, height) = target.dims_u16();
        let mut ctx = match self.ctx.take() {
            Some(ctx) if ctx.width() == width && ctx.height() == height => ctx,
            _ => vello_cpu::RenderContext::new(width, height),
        };
        ctx.reset();
        f(&mut ctx)?;
        ctx.flush();
        ctx.render_to_pixmap(target.pixmap_mut());
        self.ctx = Some(ctx);
        Ok(())
    }
}

enum Background {
    None,
    Placeholder(Option<vello_cpu::Image>),
    Image {
        paint: vello_cpu::Image,
        width: f64,
        height: f64,
    },
}

/// Resolve `spec` against `width x height`, build the union region and fill it once.
///
/// `transform` maps the resolved coordinates onto the surface.
pub(crate) fn fill_mask(
    ctx: &mut vello_cpu::RenderContext,
    spec: &FormatSpec,
    width: f64,
    height: f64,
    transform: Affine,
    style: &MaskStyle,
) {
    let region = MaskRegion::from_rects(&resolve_mask_rects(spec, width, height));
    if region.is_empty() {
        return;
    }
    let [r, g, b, a] = style.fill_rgba8();
    ctx.set_transform(affine_to_cpu(transform));
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(r, g, b, a));
    ctx.fill_path(&bezpath_to_cpu(&region.to_path()));
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
