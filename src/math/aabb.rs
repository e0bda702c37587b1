//! Axis-aligned rectangles.

use std::fmt;

use cgmath::{BaseNum, Point2, Vector2};

#[inline]
fn min<S: PartialOrd + Copy>(lhs: S, rhs: S) -> S {
    if lhs < rhs {
        lhs
    } else {
        rhs
    }
}

#[inline]
fn max<S: PartialOrd + Copy>(lhs: S, rhs: S) -> S {
    if lhs > rhs {
        lhs
    } else {
        rhs
    }
}

/// A two-dimensional AABB, aka a rectangle.
#[derive(Copy, Clone, PartialEq)]
pub struct Aabb2<S> {
    /// Minimum point of the AABB.
    pub min: Point2<S>,
    /// Maximum point of the AABB.
    pub max: Point2<S>,
}

impl<S: BaseNum> Aabb2<S> {
    #[inline]
    pub fn zero() -> Self {
        Aabb2 {
            min: Point2::new(S::zero(), S::zero()),
            max: Point2::new(S::zero(), S::zero()),
        }
    }

    /// Construct a new axis-aligned bounding box from two corner points.
    #[inline]
    pub fn new(p1: Point2<S>, p2: Point2<S>) -> Self {
        Aabb2 {
            min: Point2::new(min(p1.x, p2.x), min(p1.y, p2.y)),
            max: Point2::new(max(p1.x, p2.x), max(p1.y, p2.y)),
        }
    }

    /// Construct from the top-left corner and a size.
    #[inline]
    pub fn with_size(position: Point2<S>, size: Vector2<S>) -> Self {
        Aabb2::new(position, position + size)
    }

    #[inline]
    pub fn dim(&self) -> Vector2<S> {
        self.max - self.min
    }

    #[inline]
    pub fn width(&self) -> S {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn height(&self) -> S {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }

    /// Returns true if `p` lies inside, boundaries included.
    #[inline]
    pub fn contains(&self, p: Point2<S>) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Returns the overlapping area. Disjoint rectangles yield an empty box
    /// located at the clamped corner.
    pub fn intersect(&self, rhs: &Self) -> Self {
        let lo = Point2::new(max(self.min.x, rhs.min.x), max(self.min.y, rhs.min.y));
        let hi = Point2::new(min(self.max.x, rhs.max.x), min(self.max.y, rhs.max.y));
        Aabb2 {
            min: lo,
            max: Point2::new(max(lo.x, hi.x), max(lo.y, hi.y)),
        }
    }

    #[inline]
    pub fn translate(&self, delta: Vector2<S>) -> Self {
        Aabb2 {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

impl<S: BaseNum> fmt::Debug for Aabb2<S> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "[{:?} - {:?}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersect() {
        let a = Aabb2::new(Point2::new(0, 0), Point2::new(10, 10));
        let b = Aabb2::with_size(Point2::new(5, 5), Vector2::new(10, 10));
        let c = a.intersect(&b);
        assert_eq!(c, Aabb2::new(Point2::new(5, 5), Point2::new(10, 10)));

        let d = Aabb2::new(Point2::new(20, 20), Point2::new(30, 30));
        assert!(a.intersect(&d).is_empty());
    }

    #[test]
    fn contains() {
        let a = Aabb2::new(Point2::new(10.0, 0.0), Point2::new(0.0, 10.0));
        assert!(a.contains(Point2::new(0.0, 0.0)));
        assert!(a.contains(Point2::new(10.0, 5.0)));
        assert!(!a.contains(Point2::new(10.5, 5.0)));
        assert_eq!(a.translate(Vector2::new(1.0, 1.0)).min, Point2::new(1.0, 1.0));
    }
}
