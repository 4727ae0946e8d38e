use crate::format::model::{FormatSpec, MaskGeometry, SafeZone, ZoneRect};

/// Rectangles to mask for `spec` on a `target_width x target_height` surface.
///
/// - Danger zones are returned unchanged. They are pixel-absolute in the format's native space
///   and are not rescaled to the target.
/// - A safe zone becomes four bands (top, right, bottom, left) tiling the target minus the box
///   `[left, top]..[target_width - right, target_height - bottom]`. Bands may be degenerate
///   (zero width or height) when a margin is 0.
/// - No geometry resolves to an empty list.
pub fn resolve_mask_rects(spec: &FormatSpec, target_width: f64, target_height: f64) -> Vec<ZoneRect> {
    match spec.geometry() {
        MaskGeometry::DangerZones(zones) => zones.to_vec(),
        MaskGeometry::SafeZone(sz) => safe_zone_bands(sz, target_width, target_height).to_vec(),
        MaskGeometry::None => Vec::new(),
    }
}

/// The four complement bands of a safe zone, in top/right/bottom/left order.
pub fn safe_zone_bands(sz: SafeZone, width: f64, height: f64) -> [ZoneRect; 4] {
    let top = f64::from(sz.top);
    let right = f64::from(sz.right);
    let bottom = f64::from(sz.bottom);
    let left = f64::from(sz.left);
    let middle = height - top - bottom;

    [
        ZoneRect::new(0.0, 0.0, width, top),
        ZoneRect::new(width - right, top, right, middle),
        ZoneRect::new(0.0, height - bottom, width, bottom),
        ZoneRect::new(0.0, top, left, middle),
    ]
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/resolve.rs"]
mod tests;
