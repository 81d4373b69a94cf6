use std::f64::consts::PI;

use crate::math::Matrix4;

use super::solid::{
    SolidKind, CAPSULE_HALF_LENGTH, CAPSULE_RADIUS, TORUS_MAJOR_RADIUS, TORUS_MINOR_RADIUS,
};

/// Closed-form volume of the unit primitive in local units.
#[must_use]
pub fn local_volume(kind: SolidKind) -> f64 {
    match kind {
        SolidKind::Sphere => 4.0 / 3.0 * PI,
        SolidKind::Cylinder => 2.0 * PI,
        SolidKind::Cone => 2.0 * PI / 3.0,
        SolidKind::Capsule => {
            let r = CAPSULE_RADIUS;
            PI * r * r * (2.0 * CAPSULE_HALF_LENGTH) + 4.0 / 3.0 * PI * r * r * r
        }
        SolidKind::Pyramid => 8.0 / 3.0,
        SolidKind::Torus => 2.0 * PI * PI * TORUS_MAJOR_RADIUS * TORUS_MINOR_RADIUS * TORUS_MINOR_RADIUS,
        SolidKind::Triangle => 1.5 * 3f64.sqrt(),
        SolidKind::Unknown => 0.0,
    }
}

/// World volume of a primitive under `transform`.
///
/// The local volume is scaled by the absolute determinant of the linear part.
#[must_use]
pub fn world_volume(kind: SolidKind, transform: &Matrix4) -> f64 {
    let linear = transform.fixed_view::<3, 3>(0, 0).into_owned();
    local_volume(kind) * linear.determinant().abs()
}
