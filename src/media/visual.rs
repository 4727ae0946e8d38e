use std::sync::Arc;

use crate::media::blob::BlobHandle;

/// A decoded image, premultiplied RGBA8.
#[derive(Debug, Clone, PartialEq)]
pub struct Bitmap {
    pub width: u32,
    pub height: u32,
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// A playing video, backed by a revocable blob handle the host streams from.
///
/// Frames never enter the canvas pixel buffer; the host overlays the video element and the
/// canvas only carries the mask.
#[derive(Debug, PartialEq, Eq)]
pub struct VideoStream {
    pub handle: BlobHandle,
    pub file_name: String,
    pub content_type: String,
}

/// The currently loaded creative.
#[derive(Debug)]
pub enum Visual {
    Image(Arc<Bitmap>),
    Video(VideoStream),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl Visual {
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Image(_) => MediaKind::Image,
            Self::Video(_) => MediaKind::Video,
        }
    }

    pub fn is_video(&self) -> bool {
        matches!(self, Self::Video(_))
    }

    pub fn video_handle(&self) -> Option<&BlobHandle> {
        match self {
            Self::Video(v) => Some(&v.handle),
            Self::Image(_) => None,
        }
    }
}
