use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use crate::geometry::solid::{
    CAPSULE_HALF_LENGTH, CAPSULE_RADIUS, TORUS_MAJOR_RADIUS, TORUS_MINOR_RADIUS,
};
use crate::geometry::SolidKind;
use crate::math::Point3;

use super::{TessellationParams, TriangleMesh};

/// Tessellates the unit primitive of `kind` in its local frame.
///
/// Every kind is a surface of revolution about local `+Y`: a profile of
/// `(radius, y)` pairs swept through `segments` angular steps. The pyramid and
/// the triangular prism are the same sweep with four and three steps.
/// Returns `None` for [`SolidKind::Unknown`].
#[must_use]
pub fn tessellate_local(kind: SolidKind, params: &TessellationParams) -> Option<TriangleMesh> {
    let q = params.arc_samples.max(2);
    let mesh = match kind {
        SolidKind::Sphere => revolve(&arc(0.0, 0.0, 1.0, -FRAC_PI_2, FRAC_PI_2, 2 * q), params.segments, 0.0, false),
        SolidKind::Cylinder => revolve(&[(0.0, -1.0), (1.0, -1.0), (1.0, 1.0), (0.0, 1.0)], params.segments, 0.0, false),
        SolidKind::Cone => revolve(&[(0.0, -1.0), (1.0, -1.0), (0.0, 1.0)], params.segments, 0.0, false),
        SolidKind::Capsule => {
            let mut profile = arc(0.0, -CAPSULE_HALF_LENGTH, CAPSULE_RADIUS, -FRAC_PI_2, 0.0, q);
            profile.extend(arc(0.0, CAPSULE_HALF_LENGTH, CAPSULE_RADIUS, 0.0, FRAC_PI_2, q));
            revolve(&profile, params.segments, 0.0, false)
        }
        SolidKind::Pyramid => {
            let corner = 2f64.sqrt();
            revolve(&[(0.0, -1.0), (corner, -1.0), (0.0, 1.0)], 4, FRAC_PI_4, false)
        }
        SolidKind::Torus => {
            let mut profile = arc(TORUS_MAJOR_RADIUS, 0.0, TORUS_MINOR_RADIUS, 0.0, TAU, 4 * q);
            profile.pop();
            revolve(&profile, params.segments, 0.0, true)
        }
        SolidKind::Triangle => revolve(&[(0.0, -1.0), (1.0, -1.0), (1.0, 1.0), (0.0, 1.0)], 3, FRAC_PI_2, false),
        SolidKind::Unknown => return None,
    };
    Some(mesh)
}

/// Samples a circular arc in the `(radius, y)` profile plane, endpoints included.
fn arc(cr: f64, cy: f64, r: f64, from: f64, to: f64, samples: usize) -> Vec<(f64, f64)> {
    (0..=samples)
        .map(|i| {
            #[allow(clippy::cast_precision_loss)]
            let a = from + (to - from) * i as f64 / samples as f64;
            ((cr + r * a.cos()).max(0.0), cy + r * a.sin())
        })
        .collect()
}

/// Sweeps a profile around `+Y`. Angle `a` maps to `(r cos a, y, r sin a)`.
fn revolve(profile: &[(f64, f64)], segments: usize, phase: f64, closed: bool) -> TriangleMesh {
    let n = segments.max(3);
    let m = profile.len();
    let mut vertices = Vec::with_capacity(m * n);
    for &(r, y) in profile {
        for j in 0..n {
            #[allow(clippy::cast_precision_loss)]
            let a = phase + TAU * j as f64 / n as f64;
            vertices.push(Point3::new(r * a.cos(), y, r * a.sin()));
        }
    }

    let rows = if closed { m } else { m.saturating_sub(1) };
    let mut indices = Vec::with_capacity(rows * n * 2);
    #[allow(clippy::cast_possible_truncation)]
    let idx = |i: usize, j: usize| ((i % m) * n + (j % n)) as u32;
    for i in 0..rows {
        for j in 0..n {
            let a = idx(i, j);
            let b = idx(i, j + 1);
            let c = idx(i + 1, j + 1);
            let d = idx(i + 1, j);
            indices.push([a, b, c]);
            indices.push([a, c, d]);
        }
    }
    TriangleMesh { vertices, indices }
}
