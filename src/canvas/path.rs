//! Polyline accumulation for filled shapes and stroked contours.
//!
//! Curves are flattened on the fly into `TESSELLATION_SEGMENTS` uniform steps
//! of their parameter. Every path is a list of points plus a table of
//! sub-paths, each a contiguous range of those points.

use crate::math::{Color, InnerSpace, Matrix4, Vector2};
use crate::video::prelude::TextureHandle;

/// Number of segments a quadratic or cubic curve is flattened into.
pub const TESSELLATION_SEGMENTS: usize = 30;

/// A point type that can be interpolated along a segment.
pub trait PathPoint: Copy {
    fn position(&self) -> Vector2<f32>;

    /// The point at `t` between `self` and `rhs`, placed at `position`.
    fn interpolate(&self, rhs: &Self, t: f32, position: Vector2<f32>) -> Self;
}

impl PathPoint for Vector2<f32> {
    #[inline]
    fn position(&self) -> Vector2<f32> {
        *self
    }

    #[inline]
    fn interpolate(&self, _: &Self, _: f32, position: Vector2<f32>) -> Self {
        position
    }
}

/// Width and color of a stroke at one point of a contour.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Stroke {
    pub size: f32,
    pub color: Color,
}

impl Stroke {
    pub fn new(size: f32, color: Color) -> Self {
        Stroke { size, color }
    }

    pub fn lerp(&self, rhs: &Stroke, t: f32) -> Stroke {
        Stroke {
            size: (1.0 - t) * self.size + t * rhs.size,
            color: self.color.lerp(rhs.color, t),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ContourPoint {
    pub position: Vector2<f32>,
    pub stroke: Stroke,
}

impl ContourPoint {
    pub fn new(position: Vector2<f32>, stroke: Stroke) -> Self {
        ContourPoint { position, stroke }
    }
}

impl PathPoint for ContourPoint {
    #[inline]
    fn position(&self) -> Vector2<f32> {
        self.position
    }

    fn interpolate(&self, rhs: &Self, t: f32, position: Vector2<f32>) -> Self {
        ContourPoint {
            position,
            stroke: self.stroke.lerp(&rhs.stroke, t),
        }
    }
}

/// A contiguous range of points forming one figure.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SubPath {
    pub offset: usize,
    pub count: usize,
}

#[derive(Debug, Clone)]
pub struct Path<P: PathPoint> {
    points: Vec<P>,
    subs: Vec<SubPath>,
}

impl<P: PathPoint> Default for Path<P> {
    fn default() -> Self {
        Path {
            points: Vec::new(),
            subs: Vec::new(),
        }
    }
}

impl<P: PathPoint> Path<P> {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.subs.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[inline]
    pub fn points(&self) -> &[P] {
        &self.points
    }

    #[inline]
    pub fn sub_paths(&self) -> &[SubPath] {
        &self.subs
    }

    /// The points of sub-path `index`.
    pub fn sub_points(&self, index: usize) -> &[P] {
        match self.subs.get(index) {
            Some(v) => &self.points[v.offset..v.offset + v.count],
            None => &[],
        }
    }

    /// Starts a new sub-path at `p`.
    pub fn move_to(&mut self, p: P) {
        self.subs.push(SubPath {
            offset: self.points.len(),
            count: 1,
        });

        self.points.push(p);
    }

    /// Appends `p` to the current sub-path. Without one, `p` starts a new
    /// sub-path.
    pub fn line_to(&mut self, p: P) {
        match self.subs.last_mut() {
            Some(sub) => {
                sub.count += 1;
                self.points.push(p);
            }
            None => self.move_to(p),
        }
    }

    /// Flattens a quadratic curve from the current point to `end`.
    pub fn quad_to(&mut self, control: Vector2<f32>, end: P) {
        let start = match self.current() {
            Some(v) => v,
            None => return self.move_to(end),
        };

        let s = start.position();
        let e = end.position();
        for i in 1..=TESSELLATION_SEGMENTS {
            let t = i as f32 / TESSELLATION_SEGMENTS as f32;
            let alpha = (1.0 - t) * (1.0 - t);
            let beta = t * t;
            let p = control + (s - control) * alpha + (e - control) * beta;
            self.line_to(start.interpolate(&end, t, p));
        }
    }

    /// Flattens a cubic curve from the current point to `end`.
    pub fn cube_to(&mut self, c1: Vector2<f32>, c2: Vector2<f32>, end: P) {
        let start = match self.current() {
            Some(v) => v,
            None => return self.move_to(end),
        };

        let s = start.position();
        let e = end.position();
        for i in 1..=TESSELLATION_SEGMENTS {
            let t = i as f32 / TESSELLATION_SEGMENTS as f32;
            let u = 1.0 - t;
            let alpha = u * u * u;
            let beta = 3.0 * u * u * t;
            let gamma = 3.0 * u * t * t;
            let delta = t * t * t;
            let p = s * alpha + c1 * beta + c2 * gamma + e * delta;
            self.line_to(start.interpolate(&end, t, p));
        }
    }

    /// Appends a copy of the first point of the current sub-path.
    pub fn close_loop(&mut self) {
        if let Some(&sub) = self.subs.last() {
            let first = self.points[sub.offset];
            self.line_to(first);
        }
    }

    fn current(&self) -> Option<P> {
        self.subs.last().and_then(|_| self.points.last().cloned())
    }
}

/// The fill rule of a shape.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FillMode {
    /// Every sub-shape is drawn as a single fan; only correct for convex ones.
    None,
    /// Pixels with a non-zero winding count are painted.
    NonZero,
    /// Pixels with an odd winding count are painted.
    Odd,
}

/// An image sampled by a fill. `transform` maps canvas coordinates to texture
/// coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ImageFill {
    pub texture: TextureHandle,
    pub transform: Matrix4<f32>,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fill {
    pub color: Color,
    pub image: Option<ImageFill>,
    pub mode: FillMode,
}

impl Fill {
    pub fn new(color: Color, mode: FillMode) -> Self {
        Fill {
            color,
            image: None,
            mode,
        }
    }
}

impl Default for Fill {
    fn default() -> Self {
        Fill::new(Color::WHITE, FillMode::None)
    }
}

/// A filled compound path.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    pub path: Path<Vector2<f32>>,
    pub fill: Fill,
}

impl Shape {
    pub fn new(fill: Fill) -> Self {
        Shape {
            path: Path::new(),
            fill,
        }
    }
}

/// A stroked compound path.
pub type Contour = Path<ContourPoint>;

/// Offsets every point of a sub-contour sideways by half its stroke size,
/// joining segments with miters. The result is a triangle strip of
/// `2 * points.len()` vertices alternating between the left and right side.
pub fn stroke_outline(points: &[ContourPoint]) -> Vec<(Vector2<f32>, Color)> {
    // Miters longer than this many half-widths are clamped.
    const MITER_LIMIT: f32 = 4.0;

    let mut out = Vec::with_capacity(points.len() * 2);
    if points.len() < 2 {
        return out;
    }

    let normal = |a: Vector2<f32>, b: Vector2<f32>| -> Option<Vector2<f32>> {
        let d = b - a;
        if d.magnitude2() <= ::std::f32::EPSILON {
            None
        } else {
            let d = d.normalize();
            Some(Vector2::new(-d.y, d.x))
        }
    };

    let closed = points.len() > 2 && points[0].position == points[points.len() - 1].position;
    let n = points.len();

    for i in 0..n {
        let p = points[i].position;
        let prev = if i > 0 {
            normal(points[i - 1].position, p)
        } else if closed {
            normal(points[n - 2].position, p)
        } else {
            None
        };

        let next = if i + 1 < n {
            normal(p, points[i + 1].position)
        } else if closed {
            normal(p, points[1].position)
        } else {
            None
        };

        let half = points[i].stroke.size * 0.5;
        let offset = match (prev, next) {
            (Some(a), Some(b)) => {
                let m = a + b;
                if m.magnitude2() <= ::std::f32::EPSILON {
                    b * half
                } else {
                    let m = m.normalize();
                    let len = (half / m.dot(b).max(1.0 / MITER_LIMIT)).min(half * MITER_LIMIT);
                    m * len
                }
            }
            (Some(a), None) => a * half,
            (None, Some(b)) => b * half,
            (None, None) => Vector2::new(0.0, 0.0),
        };

        let color = points[i].stroke.color;
        out.push((p + offset, color));
        out.push((p - offset, color));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32) -> Vector2<f32> {
        Vector2::new(x, y)
    }

    #[test]
    fn curves_append_thirty_points() {
        let mut path = Path::<Vector2<f32>>::new();
        path.move_to(v(0.0, 0.0));
        path.quad_to(v(5.0, 10.0), v(10.0, 0.0));
        assert_eq!(path.points().len(), 1 + TESSELLATION_SEGMENTS);

        path.cube_to(v(12.0, 5.0), v(18.0, 5.0), v(20.0, 0.0));
        assert_eq!(path.points().len(), 1 + 2 * TESSELLATION_SEGMENTS);
        assert_eq!(path.sub_paths().len(), 1);
        assert_eq!(path.points().last(), Some(&v(20.0, 0.0)));
    }

    #[test]
    fn quad_midpoint() {
        let mut path = Path::<Vector2<f32>>::new();
        path.move_to(v(0.0, 0.0));
        path.quad_to(v(5.0, 10.0), v(10.0, 0.0));

        // t = 1/2
        let p = path.points()[TESSELLATION_SEGMENTS / 2];
        assert_ulps_eq!(p.x, 5.0);
        assert_ulps_eq!(p.y, 5.0);
    }

    #[test]
    fn close_loop_returns_to_start() {
        let mut path = Path::<Vector2<f32>>::new();
        path.move_to(v(1.0, 1.0));
        path.line_to(v(4.0, 1.0));
        path.cube_to(v(5.0, 2.0), v(5.0, 3.0), v(4.0, 4.0));
        path.close_loop();

        let sub = path.sub_points(0);
        assert_eq!(sub.first(), sub.last());

        path.move_to(v(10.0, 10.0));
        path.line_to(v(12.0, 10.0));
        path.close_loop();
        assert_eq!(path.sub_paths()[1], SubPath { offset: 33, count: 3 });
        assert_eq!(path.sub_points(1)[2], v(10.0, 10.0));
    }

    #[test]
    fn line_without_move_starts_a_sub_path() {
        let mut path = Path::<Vector2<f32>>::new();
        path.line_to(v(3.0, 3.0));
        path.line_to(v(4.0, 3.0));
        assert_eq!(path.sub_paths(), &[SubPath { offset: 0, count: 2 }]);
    }

    #[test]
    fn stroke_interpolates_along_curves() {
        let a = Stroke::new(2.0, Color::BLACK);
        let b = Stroke::new(4.0, Color::WHITE);

        let mut contour = Contour::new();
        contour.move_to(ContourPoint::new(v(0.0, 0.0), a));
        contour.quad_to(v(5.0, 5.0), ContourPoint::new(v(10.0, 0.0), b));

        let mid = contour.points()[TESSELLATION_SEGMENTS / 2].stroke;
        assert_ulps_eq!(mid.size, 3.0);
        assert_ulps_eq!(mid.color.r, 0.5);
        assert_eq!(contour.points().last().map(|p| p.stroke), Some(b));
    }

    #[test]
    fn straight_stroke_is_offset_by_half_width() {
        let s = Stroke::new(2.0, Color::RED);
        let points = [
            ContourPoint::new(v(0.0, 0.0), s),
            ContourPoint::new(v(10.0, 0.0), s),
        ];

        let outline = stroke_outline(&points);
        assert_eq!(outline.len(), 4);
        assert_ulps_eq!(outline[0].0.y, 1.0);
        assert_ulps_eq!(outline[1].0.y, -1.0);
        assert_ulps_eq!(outline[2].0.x, 10.0);
    }

    #[test]
    fn right_angle_miter() {
        let s = Stroke::new(2.0, Color::RED);
        let points = [
            ContourPoint::new(v(0.0, 0.0), s),
            ContourPoint::new(v(10.0, 0.0), s),
            ContourPoint::new(v(10.0, 10.0), s),
        ];

        let outline = stroke_outline(&points);
        let corner = outline[2].0;
        assert_relative_eq!(corner.x, 9.0, epsilon = 1e-5);
        assert_relative_eq!(corner.y, 1.0, epsilon = 1e-5);
    }
}
