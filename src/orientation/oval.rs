//! Starting chain for solids with an elongated cross-section.
//!
//! A round of an oval cannot start from a magic ring; it is worked around a
//! short foundation chain laid along the long axis of the first ring.

use crate::geometry::SolidFrame;
use crate::math::{polyline, Point3, Vector3, TOLERANCE};
use crate::model::{Ring, RingRole};

/// `true` when the cross-section is elongated enough to need a chain.
#[must_use]
pub fn needs_oval_start(frame: &SolidFrame, oval_ratio: f64) -> bool {
    frame.cross_section_ratio() > oval_ratio
}

/// Half-extents of `ring` along the unit directions `u` and `v` from its centre.
fn semi_axes(ring: &Ring, u: &Vector3, v: &Vector3) -> (f64, f64) {
    ring.meta
        .pristine
        .iter()
        .map(|p| p - ring.meta.center)
        .fold((0.0_f64, 0.0_f64), |(a, b), d| (a.max(d.dot(u).abs()), b.max(d.dot(v).abs())))
}

/// Straight chain through the centre of `first` along its long semi-axis.
///
/// Its length is the difference of the semi-axes, at least one `spacing`, and
/// its points are about `spacing` apart.
#[must_use]
pub fn oval_chain(frame: &SolidFrame, first: &Ring, spacing: f64) -> Option<Vec<Point3>> {
    let (cu, cv) = frame.cross_section_axes();
    let (u, v) = (cu.try_normalize(TOLERANCE)?, cv.try_normalize(TOLERANCE)?);
    let (a, b) = semi_axes(first, &u, &v);
    let (dir, long, short) = if a >= b { (u, a, b) } else { (v, b, a) };
    let length = (long - short).max(spacing);
    if length <= TOLERANCE {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let segments = (length / spacing).round().max(1.0) as usize;
    #[allow(clippy::cast_precision_loss)]
    let points = (0..=segments)
        .map(|i| first.meta.center + dir * (length * (i as f64 / segments as f64 - 0.5)))
        .collect();
    Some(points)
}

/// Wraps `chain` into a ring placed before `first`.
#[must_use]
pub fn oval_ring(first: &Ring, chain: Vec<Point3>) -> Ring {
    let length = polyline::length(&chain);
    let mut meta = first.meta.clone();
    meta.sequence = 0;
    meta.role = RingRole::OvalStart;
    meta.partial = true;
    meta.cap_normal = None;
    meta.pristine.clone_from(&chain);
    Ring {
        sort_key: first.meta.center.coords.dot(&first.meta.axis),
        polylines: vec![chain],
        object_id: first.object_id,
        object_kind: first.object_kind,
        full_circumference: length,
        full_loop: false,
        meta,
    }
}
