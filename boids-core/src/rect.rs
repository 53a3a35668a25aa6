//! Axis-aligned rectangles in screen coordinates (y grows downwards).

use serde::{Deserialize, Serialize};

/// One of the four quadrants of a subdivided [`Rect`].
///
/// The discriminant is the child slot used by the quadtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quadrant {
    TopRight = 0,
    TopLeft = 1,
    BottomLeft = 2,
    BottomRight = 3,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopRight,
        Quadrant::TopLeft,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Represents an axis-aligned bounding box given by its top-left corner and size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    /// Creates a new Rect.
    ///
    /// # Panics
    ///
    /// Panics if the rectangle is degenerate (non-positive or non-finite size).
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        assert!(
            w.is_finite() && h.is_finite() && w > 0.0 && h > 0.0,
            "degenerate rectangle: {w} x {h}"
        );
        Self { x, y, w, h }
    }

    /// Rectangle anchored at the origin, as used for the world bounds.
    pub fn from_size(w: f64, h: f64) -> Self {
        Self::new(0.0, 0.0, w, h)
    }

    /// Vertical dividing line (x coordinate of the center).
    #[inline]
    pub fn vertical_midpoint(&self) -> f64 {
        self.x + self.w / 2.0
    }

    /// Horizontal dividing line (y coordinate of the center).
    #[inline]
    pub fn horizontal_midpoint(&self) -> f64 {
        self.y + self.h / 2.0
    }

    /// Half-open containment test, `[x, x+w) × [y, y+h)`.
    #[inline]
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px < self.x + self.w && py >= self.y && py < self.y + self.h
    }

    /// Classifies a point against the midpoints of this rectangle.
    ///
    /// Returns `None` when the point lies exactly on either dividing line.
    /// Points outside the rectangle are still classified by the comparison.
    #[inline]
    pub fn quadrant_of(&self, px: f64, py: f64) -> Option<Quadrant> {
        let vmid = self.vertical_midpoint();
        let hmid = self.horizontal_midpoint();

        let top = py < hmid;
        let bottom = py > hmid;
        let left = px < vmid;
        let right = px > vmid;

        match (top, bottom, left, right) {
            (true, _, _, true) => Some(Quadrant::TopRight),
            (true, _, true, _) => Some(Quadrant::TopLeft),
            (_, true, true, _) => Some(Quadrant::BottomLeft),
            (_, true, _, true) => Some(Quadrant::BottomRight),
            _ => None,
        }
    }

    /// Subdivides this Rect into four equal quadrants, ordered by [`Quadrant::index`].
    pub fn subdivide(&self) -> [Rect; 4] {
        let half_w = self.w / 2.0;
        let half_h = self.h / 2.0;
        let vmid = self.vertical_midpoint();
        let hmid = self.horizontal_midpoint();
        [
            Rect::new(vmid, self.y, half_w, half_h),   // top-right
            Rect::new(self.x, self.y, half_w, half_h), // top-left
            Rect::new(self.x, hmid, half_w, half_h),   // bottom-left
            Rect::new(vmid, hmid, half_w, half_h),     // bottom-right
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrants_follow_screen_convention() {
        let r = Rect::from_size(100.0, 100.0);
        assert_eq!(r.quadrant_of(75.0, 25.0), Some(Quadrant::TopRight));
        assert_eq!(r.quadrant_of(25.0, 25.0), Some(Quadrant::TopLeft));
        assert_eq!(r.quadrant_of(25.0, 75.0), Some(Quadrant::BottomLeft));
        assert_eq!(r.quadrant_of(75.0, 75.0), Some(Quadrant::BottomRight));
    }

    #[test]
    fn midpoint_has_no_quadrant() {
        let r = Rect::from_size(100.0, 100.0);
        assert_eq!(r.quadrant_of(50.0, 10.0), None);
        assert_eq!(r.quadrant_of(10.0, 50.0), None);
        assert_eq!(r.quadrant_of(50.0, 50.0), None);
    }

    #[test]
    fn subdivide_matches_quadrant_of() {
        let r = Rect::new(10.0, 20.0, 40.0, 60.0);
        let parts = r.subdivide();
        for q in Quadrant::ALL {
            let part = parts[q.index()];
            let (cx, cy) = (part.vertical_midpoint(), part.horizontal_midpoint());
            assert!(part.contains(cx, cy));
            assert_eq!(r.quadrant_of(cx, cy), Some(q));
        }
    }

    #[test]
    #[should_panic(expected = "degenerate rectangle")]
    fn zero_width_is_rejected() {
        let _ = Rect::new(0.0, 0.0, 0.0, 10.0);
    }
}
