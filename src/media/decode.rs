use std::sync::Arc;

use crate::foundation::core::premultiply_rgba8_in_place;
use crate::foundation::error::{SafezoneError, SafezoneResult};
use crate::media::visual::Bitmap;

/// Largest side the render surface can hold.
const MAX_SIDE: u32 = u16::MAX as u32;

/// Decode an encoded image into a premultiplied bitmap.
///
/// Corrupt data, and images with a side the compositor cannot draw, are a
/// [`SafezoneError::Decode`], distinct from validation failures.
pub fn decode_image(bytes: &[u8]) -> SafezoneResult<Bitmap> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| SafezoneError::decode(format!("Failed to load image: {e}")))?;
    let (width, height) = (dyn_img.width(), dyn_img.height());
    if width == 0 || height == 0 {
        return Err(SafezoneError::decode("Failed to load image: empty image"));
    }
    if width > MAX_SIDE || height > MAX_SIDE {
        return Err(SafezoneError::decode(format!(
            "Failed to load image: {width}x{height} exceeds {MAX_SIDE} pixels per side"
        )));
    }
    let rgba = dyn_img.to_rgba8();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(Bitmap {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/media/decode.rs"]
mod tests;
