//! Redaction rectangle geometry

use imageproc::rect::Rect;

use super::classifier::PiiCategory;
use crate::vision::Quad;

/// Axis-aligned rectangle to paint over, in image pixels (inclusive corners)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedactionRect {
    pub top_left: (i32, i32),
    pub bottom_right: (i32, i32),
}

impl RedactionRect {
    /// Drawable rect covering both corners, clipped to a canvas of the given
    /// size. `None` when nothing of the rectangle lies on the canvas.
    ///
    /// Corners are reordered if the OCR quad was reported flipped.
    pub fn to_rect(&self, width: u32, height: u32) -> Option<Rect> {
        let (left, w) = clip_span(self.top_left.0, self.bottom_right.0, width)?;
        let (top, h) = clip_span(self.top_left.1, self.bottom_right.1, height)?;
        Some(Rect::at(left, top).of_size(w, h))
    }
}

/// Clip the inclusive span between `a` and `b` to `[0, limit)`, returning its
/// start and length
fn clip_span(a: i32, b: i32, limit: u32) -> Option<(i32, u32)> {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    let lo = i64::from(lo).max(0);
    let hi = i64::from(hi).min(i64::from(limit) - 1);
    if lo > hi {
        return None;
    }
    let start = i32::try_from(lo).ok()?;
    let len = u32::try_from(hi - lo + 1).ok()?;
    Some((start, len))
}

/// Computes blackout rectangles from OCR boxes
#[derive(Debug, Clone, Copy)]
pub struct RedactionGeometry {
    /// Rightward widening of patient headers, as a multiple of the header width
    pub expansion_factor: f32,
}

impl Default for RedactionGeometry {
    fn default() -> Self {
        Self {
            expansion_factor: 2.5,
        }
    }
}

impl RedactionGeometry {
    pub fn new(expansion_factor: f32) -> Self {
        Self { expansion_factor }
    }

    /// Rectangle for one detection.
    ///
    /// Uses the quad's diagonal corners (points 0 and 2). Patient headers are
    /// widened to the right so the handwritten value beside them is covered.
    /// The result is clamped to `[0, image_width]` horizontally only.
    pub fn compute_rect(&self, quad: &Quad, category: PiiCategory, image_width: u32) -> RedactionRect {
        let mut left = quad[0].0 as i32;
        let top = quad[0].1 as i32;
        let mut right = quad[2].0 as i32;
        let bottom = quad[2].1 as i32;

        let max_x = i32::try_from(image_width).unwrap_or(i32::MAX);

        if category == PiiCategory::PatientInfo {
            let box_width = (right - left).max(0);
            let grow = (box_width as f32 * self.expansion_factor).round() as i32;
            right = right.saturating_add(grow.max(0)).min(max_x);
        }

        left = left.clamp(0, max_x);
        right = right.clamp(0, max_x);

        RedactionRect {
            top_left: (left, top),
            bottom_right: (right, bottom),
        }
    }
}
