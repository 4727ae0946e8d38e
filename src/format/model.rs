use serde::{Deserialize, Serialize};

use crate::foundation::core::Canvas;
use crate::foundation::error::{SafezoneError, SafezoneResult};

/// Margins of the centered safe box, in pixels.
///
/// Everything outside the box is masked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SafeZone {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

/// Axis-aligned rectangle in a format's pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ZoneRect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The box this rectangle covers, normalized so that `x0 <= x1` and `y0 <= y1`.
    pub fn to_kurbo(self) -> kurbo::Rect {
        kurbo::Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }

    pub fn area(self) -> f64 {
        (self.width * self.height).abs()
    }
}

/// One platform/format combination: canvas size plus mask geometry.
///
/// Read-only to the renderer and immutable for the duration of a render.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatSpec {
    pub width: u32,
    pub height: u32,
    #[serde(default, alias = "safe_zone", skip_serializing_if = "Option::is_none")]
    pub safe_zone: Option<SafeZone>,
    #[serde(default, alias = "danger_zones", skip_serializing_if = "Option::is_none")]
    pub danger_zones: Option<Vec<ZoneRect>>,
}

/// Which geometry a [`FormatSpec`] masks with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaskGeometry<'a> {
    /// Explicit rectangles; takes precedence over any safe zone.
    DangerZones(&'a [ZoneRect]),
    SafeZone(SafeZone),
    None,
}

impl FormatSpec {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            safe_zone: None,
            danger_zones: None,
        }
    }

    pub fn with_safe_zone(mut self, safe_zone: SafeZone) -> Self {
        self.safe_zone = Some(safe_zone);
        self
    }

    pub fn with_danger_zones(mut self, zones: Vec<ZoneRect>) -> Self {
        self.danger_zones = Some(zones);
        self
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn geometry(&self) -> MaskGeometry<'_> {
        match (&self.danger_zones, self.safe_zone) {
            (Some(zones), _) => MaskGeometry::DangerZones(zones),
            (None, Some(sz)) => MaskGeometry::SafeZone(sz),
            (None, None) => MaskGeometry::None,
        }
    }

    /// `true` when either geometry is declared, even if it resolves to nothing.
    pub fn has_mask_geometry(&self) -> bool {
        !matches!(self.geometry(), MaskGeometry::None)
    }

    pub fn validate(&self) -> SafezoneResult<()> {
        Canvas::new(self.width, self.height)?;

        if let Some(sz) = self.safe_zone {
            if sz.top > self.height || sz.bottom > self.height {
                return Err(SafezoneError::validation(format!(
                    "safe zone top/bottom ({}/{}) exceed height {}",
                    sz.top, sz.bottom, self.height
                )));
            }
            if sz.left > self.width || sz.right > self.width {
                return Err(SafezoneError::validation(format!(
                    "safe zone left/right ({}/{}) exceed width {}",
                    sz.left, sz.right, self.width
                )));
            }
        }

        for (i, z) in self.danger_zones.iter().flatten().enumerate() {
            let finite = [z.x, z.y, z.width, z.height].iter().all(|v| v.is_finite());
            if !finite {
                return Err(SafezoneError::validation(format!(
                    "danger zone {i} has non-finite coordinates"
                )));
            }
            if z.width < 0.0 || z.height < 0.0 {
                return Err(SafezoneError::validation(format!(
                    "danger zone {i} has negative size"
                )));
            }
        }
        Ok(())
    }
}

/// Catalog key: platform name plus format name, e.g. `("Instagram", "Story (9:16)")`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FormatKey {
    pub platform: String,
    pub format: String,
}

impl FormatKey {
    pub fn new(platform: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            format: format.into(),
        }
    }
}

impl std::fmt::Display for FormatKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} / {}", self.platform, self.format)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/format/model.rs"]
mod tests;
