use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::foundation::error::{SafezoneError, SafezoneResult};

/// An uploaded file as handed over by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub name: String,
    /// Declared MIME type, e.g. `image/png`.
    pub content_type: String,
    pub bytes: Arc<Vec<u8>>,
}

impl Upload {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content_type: content_type.into(),
            bytes: Arc::new(bytes),
        }
    }

    pub fn meta(&self) -> UploadMeta<'_> {
        UploadMeta {
            name: &self.name,
            content_type: &self.content_type,
            size: self.bytes.len() as u64,
        }
    }
}

/// What validation looks at: name, declared type and size. No content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadMeta<'a> {
    pub name: &'a str,
    pub content_type: &'a str,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPolicy {
    pub allowed_types: Vec<String>,
    pub max_size_bytes: u64,
}

impl UploadPolicy {
    pub fn images() -> Self {
        Self {
            allowed_types: ["image/jpeg", "image/jpg", "image/png", "image/webp"]
                .map(String::from)
                .to_vec(),
            max_size_bytes: 10 * 1024 * 1024,
        }
    }

    pub fn videos() -> Self {
        Self {
            allowed_types: ["video/mp4", "video/webm"].map(String::from).to_vec(),
            max_size_bytes: 100 * 1024 * 1024,
        }
    }
}

/// Check an upload's metadata against `policy`.
///
/// Errors are [`SafezoneError::Validation`] carrying a user-facing reason. Validation keeps no
/// state, so a rejected file never blocks the next attempt.
pub fn validate(file: Option<UploadMeta<'_>>, policy: &UploadPolicy) -> SafezoneResult<()> {
    let Some(file) = file else {
        return Err(SafezoneError::validation("No file selected"));
    };

    if !policy.allowed_types.iter().any(|t| t == file.content_type) {
        return Err(SafezoneError::validation(format!(
            "Invalid file type. Allowed types: {}",
            policy.allowed_types.join(", ")
        )));
    }

    if file.size > policy.max_size_bytes {
        let max_mb = policy.max_size_bytes as f64 / (1024.0 * 1024.0);
        return Err(SafezoneError::validation(format!(
            "File too large. Maximum size: {max_mb:.1}MB"
        )));
    }

    if file.name.chars().any(is_unsafe_filename_char) {
        return Err(SafezoneError::validation(
            "Filename contains invalid characters",
        ));
    }

    if file.name.contains("..") || file.name.starts_with('.') {
        return Err(SafezoneError::validation("Invalid filename format"));
    }

    Ok(())
}

fn is_unsafe_filename_char(c: char) -> bool {
    matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*') || ('\0'..='\x1f').contains(&c)
}

/// Image container recognized from its leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSignature {
    Jpeg,
    Png,
    Webp,
}

const SIGNATURES: [([u8; 4], ImageSignature); 5] = [
    ([0xff, 0xd8, 0xff, 0xe0], ImageSignature::Jpeg),
    ([0xff, 0xd8, 0xff, 0xe1], ImageSignature::Jpeg),
    ([0xff, 0xd8, 0xff, 0xe2], ImageSignature::Jpeg),
    ([0x89, 0x50, 0x4e, 0x47], ImageSignature::Png),
    // "RIFF"
    ([0x52, 0x49, 0x46, 0x46], ImageSignature::Webp),
];

impl ImageSignature {
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    fn matches_declared(self, declared: &str) -> bool {
        match self {
            Self::Jpeg => declared == "image/jpeg" || declared == "image/jpg",
            Self::Png | Self::Webp => declared == self.content_type(),
        }
    }
}

/// Match the first four bytes against the known JPEG/PNG/WebP headers.
pub fn sniff_image_signature(bytes: &[u8]) -> Option<ImageSignature> {
    let head: [u8; 4] = bytes.get(..4)?.try_into().ok()?;
    SIGNATURES
        .iter()
        .find(|(sig, _)| *sig == head)
        .map(|&(_, kind)| kind)
}

/// Refuse content whose header is unknown or contradicts the declared type.
pub fn verify_image_content(declared: &str, bytes: &[u8]) -> SafezoneResult<ImageSignature> {
    match sniff_image_signature(bytes) {
        Some(sig) if sig.matches_declared(declared) => Ok(sig),
        _ => Err(SafezoneError::validation(
            "File content does not match file type",
        )),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/media/validate.rs"]
mod tests;
