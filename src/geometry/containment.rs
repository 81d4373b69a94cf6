use crate::math::{Point3, TOLERANCE};

use super::solid::{
    SolidKind, CAPSULE_HALF_LENGTH, CAPSULE_RADIUS, PRISM_VERTEX_ANGLES, TORUS_MAJOR_RADIUS,
    TORUS_MINOR_RADIUS,
};

/// Classification of a point relative to a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointClassification {
    Inside,
    Outside,
    OnBoundary,
}

/// Approximate signed depth of a local point inside the unit primitive.
///
/// Positive inside, negative outside, zero on the surface. The value is exact
/// for the sphere, capsule and torus and a conservative distance for the
/// flat-sided and slanted kinds.
#[must_use]
pub fn local_depth(kind: SolidKind, p: &Point3) -> f64 {
    let radial = p.x.hypot(p.z);
    match kind {
        SolidKind::Sphere => 1.0 - p.coords.norm(),
        SolidKind::Cylinder => (1.0 - radial).min(1.0 - p.y.abs()),
        SolidKind::Cone => {
            // r(y) = (1 - y) / 2, slant normal scaled by 1 / sqrt(1 + 1/4).
            let r = 0.5 * (1.0 - p.y);
            (p.y + 1.0).min((r - radial) / 1.25f64.sqrt())
        }
        SolidKind::Capsule => {
            let y = p.y.clamp(-CAPSULE_HALF_LENGTH, CAPSULE_HALF_LENGTH);
            let d = radial.hypot(p.y - y);
            CAPSULE_RADIUS - d
        }
        SolidKind::Pyramid => {
            let w = 0.5 * (1.0 - p.y);
            let chebyshev = p.x.abs().max(p.z.abs());
            (p.y + 1.0).min((w - chebyshev) / 1.25f64.sqrt())
        }
        SolidKind::Torus => {
            let d = (radial - TORUS_MAJOR_RADIUS).hypot(p.y);
            TORUS_MINOR_RADIUS - d
        }
        SolidKind::Triangle => {
            // Edge normals point at the edge midpoints, opposite each vertex.
            let inradius = 0.5;
            let edges = PRISM_VERTEX_ANGLES
                .iter()
                .map(|a| {
                    let n = a + std::f64::consts::PI;
                    inradius - (p.x * n.cos() + p.z * n.sin())
                })
                .fold(f64::INFINITY, f64::min);
            edges.min(1.0 - p.y.abs())
        }
        SolidKind::Unknown => f64::NEG_INFINITY,
    }
}

/// Classifies a local point against the unit primitive shrunk inward by
/// `margin` local units.
#[must_use]
pub fn classify_local(kind: SolidKind, p: &Point3, margin: f64) -> PointClassification {
    let depth = local_depth(kind, p) - margin;
    if depth > TOLERANCE {
        PointClassification::Inside
    } else if depth < -TOLERANCE {
        PointClassification::Outside
    } else {
        PointClassification::OnBoundary
    }
}
