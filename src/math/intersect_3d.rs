use crate::geometry::Plane;

use super::{Point3, Vector3, TOLERANCE};

/// Relationship of a line with a plane.
#[derive(Debug)]
pub enum LinePlaneRelation {
    /// Line intersects the plane at a single point.
    Point { point: Point3, t: f64 },
    /// Line is parallel to the plane (does not intersect).
    Parallel,
    /// Line lies entirely on the plane.
    OnPlane,
}

/// Computes the intersection of a line `origin + t * dir` with a plane.
#[must_use]
pub fn line_plane_intersect(origin: &Point3, dir: &Vector3, plane: &Plane) -> LinePlaneRelation {
    let normal = plane.normal();
    let denom = normal.dot(dir);

    let diff = plane.origin() - origin;
    let numer = normal.dot(&diff);

    if denom.abs() < TOLERANCE {
        if numer.abs() < TOLERANCE {
            LinePlaneRelation::OnPlane
        } else {
            LinePlaneRelation::Parallel
        }
    } else {
        let t = numer / denom;
        let point = origin + dir * t;
        LinePlaneRelation::Point { point, t }
    }
}

/// Classification of a point relative to a plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointPlaneClassification {
    /// Point is on the positive side (in the direction of the normal).
    Front,
    /// Point is on the negative side (opposite the normal).
    Back,
    /// Point lies on the plane (within tolerance).
    On,
}

/// Classifies a point relative to a plane.
#[must_use]
pub fn classify_point_plane(point: &Point3, plane: &Plane) -> PointPlaneClassification {
    let dist = plane.signed_distance(point);
    if dist > TOLERANCE {
        PointPlaneClassification::Front
    } else if dist < -TOLERANCE {
        PointPlaneClassification::Back
    } else {
        PointPlaneClassification::On
    }
}

/// Interpolated zero crossing of a signed-distance pair along an edge.
///
/// Returns `None` when both distances have the same sign, or when the edge is
/// nearly parallel to the plane (`|d0 - d1| < epsilon`), since the crossing
/// parameter is then ill-conditioned.
#[must_use]
pub fn edge_crossing(a: &Point3, b: &Point3, da: f64, db: f64, epsilon: f64) -> Option<Point3> {
    if (da > 0.0) == (db > 0.0) {
        return None;
    }
    let denom = da - db;
    if denom.abs() < epsilon {
        return None;
    }
    let t = (da / denom).clamp(0.0, 1.0);
    Some(a + (b - a) * t)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn xy_plane() -> Plane {
        Plane::from_normal(Point3::origin(), Vector3::z()).unwrap()
    }

    #[test]
    fn line_hits_plane() {
        match line_plane_intersect(&p(1.0, 2.0, 3.0), &Vector3::new(0.0, 0.0, -1.0), &xy_plane()) {
            LinePlaneRelation::Point { point, t } => {
                assert!((point - p(1.0, 2.0, 0.0)).norm() < TOLERANCE);
                assert!((t - 3.0).abs() < TOLERANCE);
            }
            other => panic!("expected a point, got {other:?}"),
        }
    }

    #[test]
    fn line_parallel_and_on_plane() {
        assert!(matches!(
            line_plane_intersect(&p(0.0, 0.0, 1.0), &Vector3::x(), &xy_plane()),
            LinePlaneRelation::Parallel
        ));
        assert!(matches!(
            line_plane_intersect(&p(0.0, 0.0, 0.0), &Vector3::x(), &xy_plane()),
            LinePlaneRelation::OnPlane
        ));
    }

    #[test]
    fn classify_sides() {
        let plane = xy_plane();
        assert_eq!(classify_point_plane(&p(0.0, 0.0, 1.0), &plane), PointPlaneClassification::Front);
        assert_eq!(classify_point_plane(&p(0.0, 0.0, -1.0), &plane), PointPlaneClassification::Back);
        assert_eq!(classify_point_plane(&p(5.0, 5.0, 0.0), &plane), PointPlaneClassification::On);
    }

    #[test]
    fn crossing_interpolates_linearly() {
        let hit = edge_crossing(&p(0.0, 0.0, -1.0), &p(0.0, 0.0, 3.0), -1.0, 3.0, 1e-12).unwrap();
        assert!((hit - Point3::origin()).norm() < TOLERANCE);
    }

    #[test]
    fn crossing_rejects_same_side_and_degenerate() {
        assert!(edge_crossing(&p(0.0, 0.0, 1.0), &p(0.0, 0.0, 2.0), 1.0, 2.0, 1e-12).is_none());
        assert!(edge_crossing(&p(0.0, 0.0, 0.0), &p(1.0, 0.0, 0.0), 1e-14, -1e-14, 1e-12).is_none());
    }
}
