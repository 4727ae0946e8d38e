//! Safezone renders platform safe-zone masks over ad creatives.
//!
//! Given a format's canvas size and its safe-zone margins or danger-zone rectangles, the crate
//! resolves the unsafe area, fills it as one compound region over the loaded image (or over
//! nothing, when a video plays underneath), and exports the mask as PNG at any scale.
//!
//! - Load a [`CatalogSnapshot`] from a [`FormatCatalog`]
//! - Drive a [`PreviewSession`] from UI events and draw it with a [`Compositor`]
//! - Export with an [`Exporter`]
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod export;
pub(crate) mod format;
pub(crate) mod geometry;
pub(crate) mod media;
pub(crate) mod render;
pub(crate) mod session;

pub mod config;
pub mod entitlement;

pub use crate::foundation::color::{HexColor, MaskStyle};
pub use crate::foundation::core::{Affine, BezPath, Canvas, Point, Rect, Rgba8Premul};
pub use crate::foundation::error::{SafezoneError, SafezoneResult};

pub use crate::config::ToolConfig;
pub use crate::export::png::{Exporter, MaskExport, export_file_name};
pub use crate::format::catalog::{
    CatalogEntry, CatalogSnapshot, FormatCatalog, FormatRecord, JsonFileCatalog, StaticCatalog,
};
pub use crate::format::model::{FormatKey, FormatSpec, MaskGeometry, SafeZone, ZoneRect};
pub use crate::geometry::region::MaskRegion;
pub use crate::geometry::resolve::{resolve_mask_rects, safe_zone_bands};
pub use crate::media::blob::{BlobHandle, BlobStore, InMemoryBlobStore};
pub use crate::media::decode::decode_image;
pub use crate::media::loader::MediaLoader;
pub use crate::media::validate::{
    ImageSignature, Upload, UploadMeta, UploadPolicy, sniff_image_signature, validate,
    verify_image_content,
};
pub use crate::media::visual::{Bitmap, MediaKind, VideoStream, Visual};
pub use crate::render::compositor::Compositor;
pub use crate::render::overlay::{OverlayStacking, ScreenBox, VideoOverlayLayout};
pub use crate::render::placeholder::PlaceholderStyle;
pub use crate::render::surface::RenderTarget;
pub use crate::session::frame_loop::{
    FrameRequestId, FrameScheduler, ManualFrameScheduler, MaskAnimation,
};
pub use crate::session::preview::{DecodeTicket, PreviewSession, RenderOutcome, Selection};
