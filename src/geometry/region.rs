use kurbo::{BezPath, Rect};

use crate::format::model::ZoneRect;

/// The union of a set of mask rectangles, stored as disjoint boxes.
///
/// Overlapping inputs are merged before anything is filled, so the compound path covers every
/// point of the union exactly once and a single fill shades it uniformly under either fill rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaskRegion {
    boxes: Vec<Rect>,
}

impl MaskRegion {
    /// A region covering nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build the union of `rects`. Zero-area rectangles contribute nothing.
    pub fn from_rects(rects: &[ZoneRect]) -> Self {
        let inputs: Vec<Rect> = rects
            .iter()
            .map(|r| r.to_kurbo())
            .filter(|r| r.width() > 0.0 && r.height() > 0.0)
            .collect();
        if inputs.is_empty() {
            return Self::empty();
        }

        let xs = sorted_edges(inputs.iter().flat_map(|r| [r.x0, r.x1]));
        let ys = sorted_edges(inputs.iter().flat_map(|r| [r.y0, r.y1]));

        // Sweep the horizontal bands between consecutive y edges. Each band is a set of covered
        // x runs; a run that continues unchanged into the next band keeps growing downwards.
        let mut boxes = Vec::new();
        let mut open: Vec<(f64, f64, f64)> = Vec::new();
        for band in ys.windows(2) {
            let (y0, y1) = (band[0], band[1]);
            let runs = covered_runs(&inputs, &xs, y0, y1);

            let mut next = Vec::with_capacity(runs.len());
            for &(x0, x1, start) in &open {
                if runs.contains(&(x0, x1)) {
                    next.push((x0, x1, start));
                } else {
                    boxes.push(Rect::new(x0, start, x1, y0));
                }
            }
            for &(x0, x1) in &runs {
                if !open.iter().any(|&(a, b, _)| a == x0 && b == x1) {
                    next.push((x0, x1, y0));
                }
            }
            open = next;
        }
        if let Some(&bottom) = ys.last() {
            for (x0, x1, start) in open {
                boxes.push(Rect::new(x0, start, x1, bottom));
            }
        }

        boxes.sort_by(|a, b| a.y0.total_cmp(&b.y0).then(a.x0.total_cmp(&b.x0)));
        Self { boxes }
    }

    /// Disjoint boxes, sorted top to bottom then left to right.
    pub fn boxes(&self) -> &[Rect] {
        &self.boxes
    }

    /// `true` when nothing would be filled.
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }

    /// Area of the union.
    pub fn area(&self) -> f64 {
        self.boxes.iter().map(|r| r.area()).sum()
    }

    /// Whether `(x, y)` lies in the region. Box edges are half-open.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.boxes
            .iter()
            .any(|r| x >= r.x0 && x < r.x1 && y >= r.y0 && y < r.y1)
    }

    /// One closed, clockwise subpath per box. An empty region yields an empty path.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for r in &self.boxes {
            path.move_to((r.x0, r.y0));
            path.line_to((r.x1, r.y0));
            path.line_to((r.x1, r.y1));
            path.line_to((r.x0, r.y1));
            path.close_path();
        }
        path
    }
}

fn sorted_edges(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(f64::total_cmp);
    v.dedup();
    v
}

fn covered_runs(inputs: &[Rect], xs: &[f64], y0: f64, y1: f64) -> Vec<(f64, f64)> {
    let mut runs: Vec<(f64, f64)> = Vec::new();
    for cell in xs.windows(2) {
        let (x0, x1) = (cell[0], cell[1]);
        let covered = inputs
            .iter()
            .any(|r| r.x0 <= x0 && x1 <= r.x1 && r.y0 <= y0 && y1 <= r.y1);
        if !covered {
            continue;
        }
        match runs.last_mut() {
            Some(last) if last.1 == x0 => last.1 = x1,
            _ => runs.push((x0, x1)),
        }
    }
    runs
}

#[cfg(test)]
#[path = "../../tests/unit/geometry/region.rs"]
mod tests;
