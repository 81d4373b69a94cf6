use std::f64::consts::{PI, TAU};

use crate::math::{Point3, Vector3};

/// Perimeter of an ellipse with semi-axes `a` and `b` (Ramanujan's second
/// approximation, relative error below 1e-9 for axis ratios up to 5).
#[must_use]
pub fn ellipse_perimeter(a: f64, b: f64) -> f64 {
    let (a, b) = (a.abs(), b.abs());
    let sum = a + b;
    if sum <= 0.0 {
        return 0.0;
    }
    let h = ((a - b) / sum).powi(2);
    PI * sum * (1.0 + 3.0 * h / (10.0 + (4.0 - 3.0 * h).sqrt()))
}

/// A full ellipse in 3D space.
///
/// `P(t) = center + cos(t) * u_axis + sin(t) * v_axis`. The axis vectors
/// carry the semi-axis lengths and are expected to be orthogonal.
#[derive(Debug, Clone)]
pub struct Ellipse {
    center: Point3,
    u_axis: Vector3,
    v_axis: Vector3,
}

impl Ellipse {
    /// Creates a new ellipse from its centre and two semi-axis vectors.
    #[must_use]
    pub fn new(center: Point3, u_axis: Vector3, v_axis: Vector3) -> Self {
        Self {
            center,
            u_axis,
            v_axis,
        }
    }

    /// Returns the centre of the ellipse.
    #[must_use]
    pub fn center(&self) -> &Point3 {
        &self.center
    }

    /// Returns the first semi-axis vector.
    #[must_use]
    pub fn u_axis(&self) -> &Vector3 {
        &self.u_axis
    }

    /// Returns the second semi-axis vector.
    #[must_use]
    pub fn v_axis(&self) -> &Vector3 {
        &self.v_axis
    }

    /// Evaluates the ellipse at angle `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point3 {
        self.center + self.u_axis * t.cos() + self.v_axis * t.sin()
    }

    /// Perimeter of the ellipse.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        ellipse_perimeter(self.u_axis.norm(), self.v_axis.norm())
    }

    /// Closed polyline with `segments` edges; the first point is repeated last.
    #[must_use]
    pub fn to_polyline(&self, segments: usize) -> Vec<Point3> {
        let n = segments.max(3);
        let mut points = Vec::with_capacity(n + 1);
        for i in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let t = TAU * i as f64 / n as f64;
            points.push(self.point_at(t));
        }
        points.push(points[0]);
        points
    }
}
