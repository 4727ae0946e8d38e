use std::rc::Rc;
use std::sync::Arc;

use crate::foundation::error::SafezoneResult;
use crate::media::blob::BlobStore;
use crate::media::decode::decode_image;
use crate::media::validate::{Upload, UploadPolicy, validate, verify_image_content};
use crate::media::visual::{MediaKind, VideoStream, Visual};

/// Turns uploads into [`Visual`]s.
///
/// Images are validated, sniffed and decoded here. Videos are validated and handed to the blob
/// store; their frames are decoded by the host.
pub struct MediaLoader {
    image_policy: UploadPolicy,
    video_policy: UploadPolicy,
    blobs: Rc<dyn BlobStore>,
}

impl std::fmt::Debug for MediaLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaLoader")
            .field("image_policy", &self.image_policy)
            .field("video_policy", &self.video_policy)
            .finish_non_exhaustive()
    }
}

impl MediaLoader {
    pub fn new(image_policy: UploadPolicy, video_policy: UploadPolicy, blobs: Rc<dyn BlobStore>) -> Self {
        Self {
            image_policy,
            video_policy,
            blobs,
        }
    }

    pub fn with_default_policies(blobs: Rc<dyn BlobStore>) -> Self {
        Self::new(UploadPolicy::images(), UploadPolicy::videos(), blobs)
    }

    pub fn policy(&self, kind: MediaKind) -> &UploadPolicy {
        match kind {
            MediaKind::Image => &self.image_policy,
            MediaKind::Video => &self.video_policy,
        }
    }

    /// Metadata checks only; cheap and synchronous.
    pub fn validate(&self, upload: Option<&Upload>, kind: MediaKind) -> SafezoneResult<()> {
        validate(upload.map(Upload::meta), self.policy(kind))
    }

    /// Full load: validation, then for images the signature check and decode, for videos a blob.
    pub fn load(&self, upload: &Upload, kind: MediaKind) -> SafezoneResult<Visual> {
        self.validate(Some(upload), kind)?;
        match kind {
            MediaKind::Image => self.decode_image(upload),
            MediaKind::Video => self.install_video(upload),
        }
    }

    fn decode_image(&self, upload: &Upload) -> SafezoneResult<Visual> {
        verify_image_content(&upload.content_type, &upload.bytes)?;
        let bitmap = decode_image(&upload.bytes)?;
        tracing::debug!(
            file = %upload.name,
            width = bitmap.width,
            height = bitmap.height,
            "image decoded"
        );
        Ok(Visual::Image(Arc::new(bitmap)))
    }

    fn install_video(&self, upload: &Upload) -> SafezoneResult<Visual> {
        let handle = self
            .blobs
            .create(Arc::clone(&upload.bytes), &upload.content_type)?;
        Ok(Visual::Video(VideoStream {
            handle,
            file_name: upload.name.clone(),
            content_type: upload.content_type.clone(),
        }))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/loader.rs"]
mod tests;
