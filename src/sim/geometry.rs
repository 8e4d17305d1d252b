//! Axis-aligned rectangles in screen space (y points down)

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Rectangle stored as centre + size
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub center: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    /// Build from edges; swapped edges are normalised
    pub fn from_edges(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        let (left, right) = (left.min(right), left.max(right));
        let (top, bottom) = (top.min(bottom), top.max(bottom));
        Self {
            center: Vec2::new((left + right) * 0.5, (top + bottom) * 0.5),
            size: Vec2::new(right - left, bottom - top),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.center.x - self.size.x * 0.5
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.center.x + self.size.x * 0.5
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.center.y - self.size.y * 0.5
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.center.y + self.size.y * 0.5
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    /// Overlap test; touching edges count as overlapping
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() <= other.right()
            && other.left() <= self.right()
            && self.top() <= other.bottom()
            && other.top() <= self.bottom()
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.left()
            && point.x <= self.right()
            && point.y >= self.top()
            && point.y <= self.bottom()
    }

    /// Closest point inside the rect to `point`
    pub fn clamp_point(&self, point: Vec2) -> Vec2 {
        Vec2::new(
            point.x.clamp(self.left(), self.right()),
            point.y.clamp(self.top(), self.bottom()),
        )
    }

    pub fn is_finite(&self) -> bool {
        self.center.is_finite() && self.size.is_finite()
    }
}
