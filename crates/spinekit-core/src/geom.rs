use crate::error::{Result, SpineError};
use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

const PARALLEL_EPSILON: f64 = 1e-10;
const MIN_NORM: f64 = 1e-6;

/// Canvas-space coordinate: origin top-left, x right, y down.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector in the same direction; near-zero vectors divide by a tiny floor instead of zero.
    pub fn normalized(self) -> Self {
        let len = self.length();
        let len = if len == 0.0 { MIN_NORM } else { len };
        Self::new(self.x / len, self.y / len)
    }

    pub fn dot(self, other: Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// Rotated +90° in canvas space.
    pub fn perpendicular(self) -> Self {
        Self::new(-self.y, self.x)
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;

    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox2 {
    pub min: Point,
    pub max: Point,
}

impl BBox2 {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    pub fn centered(center: Point, width: f64, height: f64) -> Self {
        let half = Point::new(width / 2.0, height / 2.0);
        Self::new(center - half, center + half)
    }

    /// Inclusive on every edge.
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min.x + self.max.x) * 0.5, (self.min.y + self.max.y) * 0.5)
    }

    pub fn width(&self) -> f64 {
        (self.max.x - self.min.x).max(0.0)
    }

    pub fn height(&self) -> f64 {
        (self.max.y - self.min.y).max(0.0)
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            self.min,
            Point::new(self.max.x, self.min.y),
            self.max,
            Point::new(self.min.x, self.max.y),
        ]
    }
}

pub fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Vector from `a` to `b`.
pub fn vector(a: Point, b: Point) -> Point {
    b - a
}

pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Perpendicular distance from `pt` to the infinite line through `a` and `b`.
pub fn distance_point_to_line(pt: Point, a: Point, b: Point) -> f64 {
    let num = ((b.y - a.y) * pt.x - (b.x - a.x) * pt.y + b.x * a.y - b.y * a.x).abs();
    let den = (b.y - a.y).hypot(b.x - a.x);
    num / if den == 0.0 { MIN_NORM } else { den }
}

/// Signed direction of `a→b` in degrees, range (-180, 180].
pub fn inclination(a: Point, b: Point) -> f64 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

/// Acute angle in [0, 90] between line `a–b` and the horizontal axis.
pub fn angle_with_horizontal(a: Point, b: Point) -> f64 {
    acute(inclination(a, b).abs())
}

/// Acute angle in [0, 90] between line `a–b` and the vertical axis.
pub fn angle_with_vertical(a: Point, b: Point) -> f64 {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    acute(dx.atan2(dy).to_degrees().abs())
}

/// Angle in radians between two vectors, [0, π].
pub fn angle_between_vectors(v1: Point, v2: Point) -> f64 {
    let dot = v1.normalized().dot(v2.normalized());
    dot.clamp(-1.0, 1.0).acos()
}

/// Interior angle at vertex `b` between rays `b→a` and `b→c`, in degrees, [0, 180].
pub fn angle_abc(a: Point, b: Point, c: Point) -> f64 {
    angle_between_vectors(vector(b, a), vector(b, c)).to_degrees()
}

/// `angle_abc` folded to the acute side, [0, 90].
pub fn angle_abc_acute(a: Point, b: Point, c: Point) -> f64 {
    let angle = angle_abc(a, b, c);
    angle.min(180.0 - angle)
}

/// Opening of a wedge with hinge `b`; reflex results fold back to `360 - θ`.
pub fn wedge_angle(a: Point, b: Point, c: Point) -> f64 {
    let angle = angle_abc(a, b, c);
    if angle <= 180.0 {
        angle
    } else {
        360.0 - angle
    }
}

/// Acute angle between two lines given as point pairs, [0, 90].
pub fn cobb_angle(line1: (Point, Point), line2: (Point, Point)) -> f64 {
    let a1 = angle_with_horizontal(line1.0, line1.1);
    let a2 = angle_with_horizontal(line2.0, line2.1);
    let mut diff = (a1 - a2).abs();
    if diff > 180.0 {
        diff = 360.0 - diff;
    }
    diff.min(180.0 - diff)
}

/// Intersection of the infinite lines `p1–p2` and `p3–p4`.
pub fn line_intersection(p1: Point, p2: Point, p3: Point, p4: Point) -> Result<Point> {
    let denominator = (p1.x - p2.x) * (p3.y - p4.y) - (p1.y - p2.y) * (p3.x - p4.x);
    if denominator.abs() < PARALLEL_EPSILON {
        return Err(SpineError::DegenerateGeometry("lines are parallel or coincident"));
    }
    let t = ((p1.x - p3.x) * (p3.y - p4.y) - (p1.y - p3.y) * (p3.x - p4.x)) / denominator;
    Ok(Point::new(p1.x + t * (p2.x - p1.x), p1.y + t * (p2.y - p1.y)))
}

/// The line through `p1` and `p2` evaluated at `x`.
///
/// A vertical line has no single y; it yields the mean of the two endpoint ys.
pub fn y_at_x(p1: Point, p2: Point, x: f64) -> f64 {
    if p2.x == p1.x {
        return (p1.y + p2.y) / 2.0;
    }
    let slope = (p2.y - p1.y) / (p2.x - p1.x);
    p1.y + slope * (x - p1.x)
}

/// Side test against the directed line `a→b` (negative cross product).
pub fn is_above_line(p: Point, a: Point, b: Point) -> bool {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x) < 0.0
}

fn acute(angle: f64) -> f64 {
    if angle > 90.0 {
        180.0 - angle
    } else {
        angle
    }
}
