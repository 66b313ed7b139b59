//! Rectangular selections in source-buffer coordinates.

use serde::Serialize;

/// A normalized, half-open rectangle in source pixel space.
///
/// `x1 <= x2` and `y1 <= y2` always hold; `x2`/`y2` are exclusive, so the
/// region from `(10, 10)` to `(60, 40)` covers 50x30 pixels. Coordinates may
/// lie outside the buffer; transforms intersect with the bounds themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Region {
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
}

impl Region {
    /// Build a region from two corners in any order.
    pub fn new(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Build a region spanning a drag from `start` to `end`.
    pub fn from_points(start: (i64, i64), end: (i64, i64)) -> Self {
        Self::new(start.0, start.1, end.0, end.1)
    }

    #[inline]
    pub fn x1(&self) -> i64 {
        self.x1
    }

    #[inline]
    pub fn y1(&self) -> i64 {
        self.y1
    }

    #[inline]
    pub fn x2(&self) -> i64 {
        self.x2
    }

    #[inline]
    pub fn y2(&self) -> i64 {
        self.y2
    }

    #[inline]
    pub fn width(&self) -> u64 {
        self.x2.abs_diff(self.x1)
    }

    #[inline]
    pub fn height(&self) -> u64 {
        self.y2.abs_diff(self.y1)
    }

    /// True when the region covers no pixels.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Intersect with the bounds of a `width` x `height` buffer.
    ///
    /// Returns `None` when the intersection has zero width or height.
    pub fn clip(&self, width: u32, height: u32) -> Option<Region> {
        let clipped = Region {
            x1: self.x1.clamp(0, width as i64),
            y1: self.y1.clamp(0, height as i64),
            x2: self.x2.clamp(0, width as i64),
            y2: self.y2.clamp(0, height as i64),
        };
        (!clipped.is_empty()).then_some(clipped)
    }

    /// True when the pixel at `(x, y)` lies inside the region.
    #[inline]
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.x1 && x < self.x2 && y >= self.y1 && y < self.y2
    }
}
