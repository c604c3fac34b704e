use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle on the ground plane.
///
/// Containment is inclusive on every edge, for spawn areas and exclusion
/// zones alike.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    min: Vec2,
    max: Vec2,
}

impl Rect {
    /// Rectangle spanning two corners given in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self::new(Vec2::new(x0, y0), Vec2::new(x1, y1))
    }

    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub fn max(&self) -> Vec2 {
        self.max
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    pub fn area(&self) -> f32 {
        let s = self.size();
        s.x * s.y
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// True when `self` lies entirely inside `other`.
    pub fn is_within(&self, other: &Rect) -> bool {
        other.contains(self.min) && other.contains(self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_are_normalized() {
        let r = Rect::from_corners(19.0, -5.0, -19.0, -19.0);
        assert_eq!(r.min(), Vec2::new(-19.0, -19.0));
        assert_eq!(r.max(), Vec2::new(19.0, -5.0));
        assert_eq!(r.area(), 38.0 * 14.0);
    }

    #[test]
    fn edges_are_inclusive() {
        let r = Rect::from_corners(-7.0, -7.0, 7.0, 7.0);
        assert!(r.contains(Vec2::new(7.0, -7.0)));
        assert!(r.contains(Vec2::ZERO));
        assert!(!r.contains(Vec2::new(7.01, 0.0)));
    }

    #[test]
    fn within() {
        let outer = Rect::from_corners(-18.0, -18.0, 18.0, 18.0);
        assert!(Rect::from_corners(-7.0, -7.0, 7.0, 7.0).is_within(&outer));
        assert!(!Rect::from_corners(-19.0, -19.0, 19.0, 19.0).is_within(&outer));
    }
}
