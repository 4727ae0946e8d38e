use serde::{Deserialize, Serialize};

/// The canvas's on-screen bounding box in CSS pixels, as measured by the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Whether the video element sits behind the canvas (mask on top) or above it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayStacking {
    #[default]
    VideoBehindCanvas,
    VideoAboveCanvas,
}

/// How the host should size and place the video element so its frames line up with the mask.
///
/// The size always comes from the canvas's *rendered* box, never from its logical pixel size,
/// and the video is stretched (`object-fit: fill`) exactly like image visuals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VideoOverlayLayout {
    pub width_px: f64,
    pub height_px: f64,
    /// Center of the rendered canvas box; the element is translated by half its size.
    pub center_x: f64,
    pub center_y: f64,
    pub stacking: OverlayStacking,
}

impl VideoOverlayLayout {
    pub fn for_canvas(rendered: ScreenBox, stacking: OverlayStacking) -> Self {
        Self {
            width_px: rendered.width.max(0.0),
            height_px: rendered.height.max(0.0),
            center_x: rendered.x + rendered.width / 2.0,
            center_y: rendered.y + rendered.height / 2.0,
            stacking,
        }
    }

    /// Inline CSS for a video element positioned relative to the canvas's container.
    pub fn css(&self) -> String {
        let z = match self.stacking {
            OverlayStacking::VideoBehindCanvas => 0,
            OverlayStacking::VideoAboveCanvas => 2,
        };
        format!(
            "position: absolute; top: 50%; left: 50%; transform: translate(-50%, -50%); \
             width: {}px; height: {}px; object-fit: fill; z-index: {z};",
            self.width_px, self.height_px
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/overlay.rs"]
mod tests;
