use std::cmp::Ordering;

use crate::geometry::Plane;

use super::{Matrix3, Point3, Vector3, TOLERANCE};

/// Arithmetic mean of a point set.
#[must_use]
pub fn centroid(points: &[Point3]) -> Option<Point3> {
    if points.is_empty() {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let inv_n = 1.0 / points.len() as f64;
    let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
    Some(Point3::from(sum * inv_n))
}

/// Best-fit plane through an unordered point cloud.
///
/// The normal is the eigenvector of the covariance matrix with the smallest
/// eigenvalue. Returns `None` for fewer than three points or when the cloud is
/// degenerate in every direction.
#[must_use]
pub fn best_fit_plane(points: &[Point3]) -> Option<Plane> {
    if points.len() < 3 {
        return None;
    }
    let c = centroid(points)?;
    let mut cov = Matrix3::zeros();
    for p in points {
        let d = p - c;
        cov += d * d.transpose();
    }
    if cov.norm() < TOLERANCE {
        return None;
    }
    let eigen = cov.symmetric_eigen();
    let mut min_index = 0;
    for i in 1..3 {
        if eigen.eigenvalues[i] < eigen.eigenvalues[min_index] {
            min_index = i;
        }
    }
    let normal: Vector3 = eigen.eigenvectors.column(min_index).into_owned();
    Plane::from_normal(c, normal).ok()
}

/// Orders points by angle around their centroid in `plane` and closes the loop.
///
/// The returned polyline repeats its first point at the end.
#[must_use]
pub fn angular_loop(points: &[Point3], plane: &Plane) -> Vec<Point3> {
    let Some(c) = centroid(points) else {
        return Vec::new();
    };
    let (cu, cv) = plane.project_uv(&c);
    let mut keyed: Vec<(f64, Point3)> = points
        .iter()
        .map(|p| {
            let (u, v) = plane.project_uv(p);
            ((v - cv).atan2(u - cu), *p)
        })
        .collect();
    keyed.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
    let mut out: Vec<Point3> = keyed.into_iter().map(|(_, p)| p).collect();
    if let Some(first) = out.first().copied() {
        out.push(first);
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn unit_square() -> Vec<Point3> {
        vec![
            p(0.0, 0.0, 0.0),
            p(1.0, 0.0, 0.0),
            p(1.0, 1.0, 0.0),
            p(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn best_fit_of_tilted_circle() {
        let axis = Vector3::new(1.0, 1.0, 0.0).normalize();
        let a = Vector3::z();
        let b = axis.cross(&a);
        let pts: Vec<Point3> = (0..12)
            .map(|i| {
                let t = f64::from(i) * std::f64::consts::TAU / 12.0;
                Point3::new(2.0, 0.0, 0.0) + a * t.cos() + b * t.sin()
            })
            .collect();
        let plane = best_fit_plane(&pts).unwrap();
        assert!(plane.normal().dot(&axis).abs() > 1.0 - 1e-9);
        assert!((plane.origin() - p(2.0, 0.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn angular_loop_orders_shuffled_points() {
        let shuffled = vec![p(1.0, 1.0, 0.0), p(0.0, 0.0, 0.0), p(0.0, 1.0, 0.0), p(1.0, 0.0, 0.0)];
        let plane = Plane::from_normal(Point3::origin(), Vector3::z()).unwrap();
        let looped = angular_loop(&shuffled, &plane);
        assert_eq!(looped.len(), 5);
        assert_eq!(looped.first(), looped.last());
        // Neighbours around the loop are adjacent corners.
        assert!(looped.windows(2).all(|w| ((w[1] - w[0]).norm() - 1.0).abs() < 1e-12));
    }

    #[test]
    fn best_fit_needs_three_points() {
        assert!(best_fit_plane(&[p(0.0, 0.0, 0.0), p(1.0, 0.0, 0.0)]).is_none());
    }
}
