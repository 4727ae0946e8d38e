use std::rc::Rc;

use crate::entitlement::{DailyQuota, Entitlement, authorize_upload};
use crate::export::png::{Exporter, MaskExport, export_file_name};
use crate::foundation::color::MaskStyle;
use crate::foundation::core::Canvas;
use crate::foundation::error::{SafezoneError, SafezoneResult};
use crate::format::catalog::CatalogSnapshot;
use crate::format::model::{FormatKey, FormatSpec};
use crate::media::blob::{BlobHandle, BlobStore};
use crate::media::loader::MediaLoader;
use crate::media::validate::Upload;
use crate::media::visual::{MediaKind, Visual};
use crate::render::compositor::Compositor;
use crate::render::overlay::{OverlayStacking, ScreenBox, VideoOverlayLayout};
use crate::render::surface::RenderTarget;
use crate::session::frame_loop::{FrameRequestId, FrameScheduler, MaskAnimation};

/// What the canvas is sized to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A catalog format; masked with its geometry.
    Catalog(FormatKey),
    /// A campaign creative with its own size; background only.
    Custom { label: String, canvas: Canvas },
}

/// Identifies one decode. Only the most recently issued ticket may install its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Rendered,
    /// The selected format is not in the catalog; the target was left as it was.
    SkippedUnknownFormat,
    NothingSelected,
}

/// Render context of one open tool instance.
///
/// Holds the selection, the single active visual, the mask style and the video loop. Input
/// events map onto the transition methods, which return whether the canvas needs a redraw; the
/// host then calls [`PreviewSession::render`]. Every blob handle the session installs is revoked
/// exactly once, at the latest when the session is dropped.
pub struct PreviewSession {
    catalog: CatalogSnapshot,
    selection: Option<Selection>,
    visual: Option<Visual>,
    style: MaskStyle,
    decode_generation: u64,
    animation: MaskAnimation,
    scheduler: Rc<dyn FrameScheduler>,
    blobs: Rc<dyn BlobStore>,
}

impl std::fmt::Debug for PreviewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PreviewSession")
            .field("selection", &self.selection)
            .field("visual", &self.visual)
            .field("style", &self.style)
            .field("decode_generation", &self.decode_generation)
            .field("animation", &self.animation)
            .finish_non_exhaustive()
    }
}

impl PreviewSession {
    pub fn new(
        catalog: CatalogSnapshot,
        scheduler: Rc<dyn FrameScheduler>,
        blobs: Rc<dyn BlobStore>,
    ) -> Self {
        Self {
            catalog,
            selection: None,
            visual: None,
            style: MaskStyle::default(),
            decode_generation: 0,
            animation: MaskAnimation::new(),
            scheduler,
            blobs,
        }
    }

    pub fn with_style(mut self, style: MaskStyle) -> Self {
        self.style = style;
        self
    }

    pub fn catalog(&self) -> &CatalogSnapshot {
        &self.catalog
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn visual(&self) -> Option<&Visual> {
        self.visual.as_ref()
    }

    pub fn style(&self) -> &MaskStyle {
        &self.style
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_running()
    }

    /// Spec of the selected catalog format, if it exists.
    pub fn current_spec(&self) -> Option<&FormatSpec> {
        match &self.selection {
            Some(Selection::Catalog(key)) => self.catalog.get_key(key),
            _ => None,
        }
    }

    /// Select `platform` and its first format.
    pub fn select_platform(&mut self, platform: &str) -> bool {
        let Some(format) = self.catalog.first_format(platform) else {
            tracing::warn!(platform, "platform has no formats");
            return false;
        };
        let key = FormatKey::new(platform, format);
        self.on_format_changed(key)
    }

    /// Switch format within the tool. The loaded visual stays and is stretched to the new size.
    pub fn on_format_changed(&mut self, key: FormatKey) -> bool {
        tracing::debug!(format = %key, "format changed");
        self.selection = Some(Selection::Catalog(key));
        true
    }

    pub fn set_custom_canvas(&mut self, label: impl Into<String>, canvas: Canvas) -> bool {
        self.selection = Some(Selection::Custom {
            label: label.into(),
            canvas,
        });
        true
    }

    /// Open a different creative: drops the visual and invalidates any decode in flight.
    pub fn open_creative(&mut self, selection: Selection) -> bool {
        self.decode_generation += 1;
        self.release_visual();
        self.selection = Some(selection);
        true
    }

    pub fn on_style_changed(&mut self, style: MaskStyle) -> SafezoneResult<bool> {
        style.validate()?;
        self.style = style;
        Ok(true)
    }

    /// Start a decode. Any ticket issued earlier becomes stale.
    pub fn begin_decode(&mut self) -> DecodeTicket {
        self.decode_generation += 1;
        DecodeTicket(self.decode_generation)
    }

    /// Install a decoded visual.
    ///
    /// A stale ticket drops `visual` (revoking its blob) and leaves the session untouched.
    /// Otherwise the previous visual is released first: its loop stopped, its blob revoked.
    pub fn on_visual_changed(&mut self, ticket: DecodeTicket, visual: Visual) -> bool {
        if ticket.0 != self.decode_generation {
            tracing::debug!(
                ticket = ticket.0,
                current = self.decode_generation,
                "stale decode dropped"
            );
            self.release(visual);
            return false;
        }

        self.release_visual();
        let is_video = visual.is_video();
        tracing::debug!(kind = ?visual.kind(), "visual installed");
        self.visual = Some(visual);
        if is_video {
            self.animation.start(self.scheduler.as_ref());
        }
        true
    }

    /// A decode failed. The previous visual stays; nothing needs redrawing.
    pub fn on_decode_failed(&mut self, ticket: DecodeTicket, error: &SafezoneError) -> bool {
        if ticket.0 == self.decode_generation {
            tracing::warn!(%error, "decode failed");
        }
        false
    }

    /// The host could not play the installed video: back to the empty state.
    pub fn on_video_failed(&mut self, handle: &BlobHandle) -> bool {
        if self.visual.as_ref().and_then(Visual::video_handle) != Some(handle) {
            return false;
        }
        tracing::warn!(%handle, "video failed to load");
        self.release_visual();
        true
    }

    /// Remove the visual ("clear uploads").
    pub fn clear(&mut self) -> bool {
        self.decode_generation += 1;
        self.release_visual();
        true
    }

    /// Tear down: stop the loop and release the visual. Safe to call more than once.
    pub fn close(&mut self) {
        self.decode_generation += 1;
        self.animation.stop(self.scheduler.as_ref());
        self.release_visual();
    }

    /// Full redraw of the current state onto `target`.
    ///
    /// The target is resized to the selection first. An unknown format leaves it untouched.
    pub fn render(
        &self,
        compositor: &mut Compositor,
        target: &mut RenderTarget,
    ) -> SafezoneResult<RenderOutcome> {
        let (canvas, spec) = match self.drawable() {
            Ok(drawable) => drawable,
            Err(outcome) => return Ok(outcome),
        };
        target.resize(canvas)?;
        compositor.composite(target, self.visual.as_ref(), spec, &self.style)?;
        Ok(RenderOutcome::Rendered)
    }

    /// Run one fired frame callback of the video loop.
    ///
    /// Like [`PreviewSession::render`], the target is first resized to the selection, so a format
    /// change between frames is picked up by the next tick. Returns `false` for callbacks that
    /// are not the outstanding request, which includes every callback arriving after the loop
    /// was stopped. While the selected format is unknown the loop keeps running without drawing.
    pub fn on_animation_frame(
        &mut self,
        id: FrameRequestId,
        compositor: &mut Compositor,
        target: &mut RenderTarget,
    ) -> SafezoneResult<bool> {
        if !self.animation.accept(id) {
            return Ok(false);
        }
        if !self.visual.as_ref().is_some_and(Visual::is_video) {
            return Ok(false);
        }
        self.animation.request_next(self.scheduler.as_ref());
        let Ok((canvas, spec)) = self.drawable() else {
            return Ok(false);
        };
        target.resize(canvas)?;
        compositor.draw_mask_only(target, spec, &self.style)?;
        Ok(true)
    }

    /// Where the host should put the video element, if a video is loaded.
    pub fn video_layout(
        &self,
        rendered: ScreenBox,
        stacking: OverlayStacking,
    ) -> Option<VideoOverlayLayout> {
        self.visual
            .as_ref()
            .filter(|v| v.is_video())
            .map(|_| VideoOverlayLayout::for_canvas(rendered, stacking))
    }

    /// Export the selected format's mask with the live style. Returns the download file name.
    pub fn export_mask(
        &self,
        exporter: &mut Exporter,
        scale: f64,
    ) -> SafezoneResult<(String, MaskExport)> {
        let Some(Selection::Catalog(key)) = &self.selection else {
            return Err(SafezoneError::validation("No format selected"));
        };
        let spec = self
            .catalog
            .get_key(key)
            .ok_or_else(|| SafezoneError::catalog(format!("unknown format {key}")))?;
        let export = exporter.export(spec, &self.style, scale)?;
        Ok((export_file_name(&key.platform, &key.format), export))
    }

    /// Gate, validate and load an upload, then install it.
    ///
    /// Every failure leaves the current visual as it was. A free user's upload is counted once
    /// it has loaded.
    pub fn load_upload(
        &mut self,
        loader: &MediaLoader,
        upload: Option<&Upload>,
        kind: MediaKind,
        entitlement: &dyn Entitlement,
        quota: &mut dyn DailyQuota,
    ) -> SafezoneResult<bool> {
        authorize_upload(entitlement, quota, kind)?;
        loader.validate(upload, kind)?;
        let Some(upload) = upload else {
            return Err(SafezoneError::validation("No file selected"));
        };

        let ticket = self.begin_decode();
        let visual = match loader.load(upload, kind) {
            Ok(visual) => visual,
            Err(e) => {
                self.on_decode_failed(ticket, &e);
                return Err(e);
            }
        };
        if !entitlement.is_entitled() {
            quota.increment();
        }
        Ok(self.on_visual_changed(ticket, visual))
    }

    /// Canvas and mask spec of the selection, or why nothing can be drawn.
    fn drawable(&self) -> Result<(Canvas, Option<&FormatSpec>), RenderOutcome> {
        match &self.selection {
            None => Err(RenderOutcome::NothingSelected),
            Some(Selection::Custom { canvas, .. }) => Ok((*canvas, None)),
            Some(Selection::Catalog(key)) => match self.catalog.get_key(key) {
                Some(spec) => Ok((spec.canvas(), Some(spec))),
                None => {
                    tracing::debug!(format = %key, "unknown format, render skipped");
                    Err(RenderOutcome::SkippedUnknownFormat)
                }
            },
        }
    }

    fn release_visual(&mut self) {
        if let Some(old) = self.visual.take() {
            if old.is_video() {
                self.animation.stop(self.scheduler.as_ref());
            }
            self.release(old);
        }
    }

    fn release(&self, visual: Visual) {
        if let Visual::Video(stream) = visual {
            tracing::debug!(handle = %stream.handle, "video released");
            self.blobs.revoke(&stream.handle);
        }
    }
}

impl Drop for PreviewSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/preview.rs"]
mod tests;
