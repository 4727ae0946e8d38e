//! Tool defaults: mask style, empty-state look, upload policies and free-tier limits.

use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::foundation::color::{HexColor, MaskStyle};
use crate::foundation::error::{SafezoneError, SafezoneResult};
use crate::media::validate::UploadPolicy;
use crate::render::placeholder::PlaceholderStyle;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub mask: MaskStyle,
    pub placeholder: PlaceholderStyle,
    pub image_policy: UploadPolicy,
    pub video_policy: UploadPolicy,
    pub free_download_limit: u32,
    pub free_upload_limit: u32,
    /// Export scale for users without a paid plan.
    pub preview_scale: f64,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            mask: MaskStyle::default(),
            placeholder: PlaceholderStyle::default(),
            image_policy: UploadPolicy::images(),
            video_policy: UploadPolicy::videos(),
            free_download_limit: 3,
            free_upload_limit: 3,
            preview_scale: 0.5,
        }
    }
}

impl ToolConfig {
    pub fn from_json(json: &str) -> SafezoneResult<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> SafezoneResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&json)
    }

    pub fn validate(&self) -> SafezoneResult<()> {
        self.mask.validate()?;
        if !self.preview_scale.is_finite() || self.preview_scale <= 0.0 {
            return Err(SafezoneError::validation(format!(
                "preview_scale must be > 0 (got {})",
                self.preview_scale
            )));
        }
        Ok(())
    }

    /// Apply `SAFEZONE_*` overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Apply overrides from `lookup`. Values that do not parse or are out of range are ignored
    /// with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("SAFEZONE_MASK_COLOR") {
            match HexColor::parse(&v) {
                Ok(c) => self.mask.color = c,
                Err(e) => tracing::warn!(value = %v, %e, "ignoring SAFEZONE_MASK_COLOR"),
            }
        }
        if let Some(v) = lookup("SAFEZONE_MASK_OPACITY") {
            match v.trim().parse::<f64>() {
                Ok(op) if (0.0..=1.0).contains(&op) => self.mask.opacity = op,
                _ => tracing::warn!(value = %v, "ignoring SAFEZONE_MASK_OPACITY"),
            }
        }
        if let Some(n) = parse_positive::<u64>(&lookup, "SAFEZONE_MAX_IMAGE_BYTES") {
            self.image_policy.max_size_bytes = n;
        }
        if let Some(n) = parse_positive::<u64>(&lookup, "SAFEZONE_MAX_VIDEO_BYTES") {
            self.video_policy.max_size_bytes = n;
        }
        if let Some(v) = lookup("SAFEZONE_PREVIEW_SCALE") {
            match v.trim().parse::<f64>() {
                Ok(s) if s.is_finite() && s > 0.0 => self.preview_scale = s,
                _ => tracing::warn!(value = %v, "ignoring SAFEZONE_PREVIEW_SCALE"),
            }
        }
    }
}

fn parse_positive<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let v = lookup(name)?;
    match v.trim().parse::<T>() {
        Ok(n) if n > T::default() => Some(n),
        _ => {
            tracing::warn!(value = %v, "ignoring {name}");
            None
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
