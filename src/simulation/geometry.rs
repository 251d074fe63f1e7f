//! Geometric primitives for sight lines and ball contact.
//!
//! Everything here works in arena units: the arena is the unit square and
//! angles are returned in radians.

use geo::algorithm::Distance;
use geo::{Euclidean, Line};

/// A position in the arena.
pub type Point = geo::Point<f64>;

/// Absolute tolerance for degenerate segments and on-segment checks.
pub const EPSILON: f64 = 1e-7;

/// Euclidean distance between two points.
#[inline]
pub fn distance(p1: Point, p2: Point) -> f64 {
    Euclidean.distance(p1, p2)
}

/// A line segment with its length cached.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    line: Line<f64>,
    length: f64,
}

impl Segment {
    /// Creates a segment from `start` to `end`.
    pub fn new(start: Point, end: Point) -> Self {
        Self {
            line: Line::new(start, end),
            length: distance(start, end),
        }
    }

    /// Start point of the segment.
    pub fn start(&self) -> Point {
        self.line.start_point()
    }

    /// End point of the segment.
    pub fn end(&self) -> Point {
        self.line.end_point()
    }

    /// Length of the segment.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Direction of the segment, `atan2(dy, dx)` in radians.
    pub fn angle(&self) -> f64 {
        self.line.dy().atan2(self.line.dx())
    }

    /// Checks whether `p` lies on the segment.
    ///
    /// A point is on the segment when its distances to both endpoints add up
    /// to the segment length within [`EPSILON`].
    pub fn contains_point(&self, p: Point) -> bool {
        let sum = distance(self.start(), p) + distance(self.end(), p);
        (sum - self.length).abs() < EPSILON
    }

    /// Checks whether the segment touches the circle at `center` with `radius`.
    ///
    /// Substitutes `start + t * (end - start)` into the circle equation and
    /// keeps a root only if the resulting point lies on the segment. A
    /// zero-length segment never intersects.
    pub fn intersects_circle(&self, center: Point, radius: f64) -> bool {
        let dx = self.line.dx();
        let dy = self.line.dy();
        let x_diff = self.start().x() - center.x();
        let y_diff = self.start().y() - center.y();

        let a = dx * dx + dy * dy;
        let b = 2.0 * (dx * x_diff + dy * y_diff);
        let c = x_diff * x_diff + y_diff * y_diff - radius * radius;

        let discriminant = b * b - 4.0 * a * c;

        if a <= EPSILON || discriminant < 0.0 {
            return false;
        }

        if discriminant == 0.0 {
            let t = -b / (2.0 * a);
            return self.contains_point(self.point_at(t));
        }

        let root = discriminant.sqrt();
        let t1 = (-b + root) / (2.0 * a);
        let t2 = (-b - root) / (2.0 * a);

        self.contains_point(self.point_at(t1)) || self.contains_point(self.point_at(t2))
    }

    fn point_at(&self, t: f64) -> Point {
        Point::new(
            self.start().x() + t * self.line.dx(),
            self.start().y() + t * self.line.dy(),
        )
    }
}

/// Wraps a coordinate back into `[0, 1)`.
#[inline]
pub fn wrap_unit(v: f64) -> f64 {
    v.rem_euclid(1.0)
}
