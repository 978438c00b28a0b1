//! Rigid rotate-and-translate maps between canvas segments.

use nalgebra::{Isometry2, Point2, Vector2};
use spinekit_core::geom::{inclination, midpoint, Point};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine {
    iso: Isometry2<f64>,
}

fn to_na(p: Point) -> Point2<f64> {
    Point2::new(p.x, p.y)
}

fn from_na(p: Point2<f64>) -> Point {
    Point::new(p.x, p.y)
}

impl Affine {
    pub fn identity() -> Self {
        Self {
            iso: Isometry2::identity(),
        }
    }

    /// Rotation by `angle` radians about `pivot`.
    pub fn rotation_about(pivot: Point, angle: f64) -> Self {
        let rotated = Isometry2::rotation(angle) * to_na(pivot);
        let t = to_na(pivot) - rotated;
        Self {
            iso: Isometry2::new(t, angle),
        }
    }

    /// Carries segment `from` onto segment `to`.
    ///
    /// The rotation is `angle(to) - angle(from)` and the midpoint of `from` lands
    /// exactly on the midpoint of `to`, lifted by `gap` along -y.
    pub fn align(from: (Point, Point), to: (Point, Point), gap: f64) -> Self {
        let angle = (inclination(to.0, to.1) - inclination(from.0, from.1)).to_radians();
        let src = to_na(midpoint(from.0, from.1));
        let dst = to_na(midpoint(to.0, to.1));
        let rotated = Isometry2::rotation(angle) * src;
        let t = dst - rotated - Vector2::new(0.0, gap);
        Self {
            iso: Isometry2::new(t, angle),
        }
    }

    /// Radians.
    pub fn rotation(&self) -> f64 {
        self.iso.rotation.angle()
    }

    pub fn translation(&self) -> Point {
        let t = self.iso.translation.vector;
        Point::new(t.x, t.y)
    }

    pub fn apply(&self, p: Point) -> Point {
        from_na(self.iso * to_na(p))
    }

    pub fn apply_inverse(&self, p: Point) -> Point {
        from_na(self.iso.inverse_transform_point(&to_na(p)))
    }
}
