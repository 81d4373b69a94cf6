use nalgebra::{Rotation3, Vector4};
use serde::{Deserialize, Serialize};

use super::{Matrix4, Point3, Vector3};

/// One of the three local axes of a solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Column / component index of the axis.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// The two remaining axes, in cyclic order after `self`.
    ///
    /// For `Y` this is `(Z, X)`, so a cross-section in the `(first, second)`
    /// plane winds counter-clockwise when seen from `+self`.
    #[must_use]
    pub fn others(self) -> (Axis, Axis) {
        match self {
            Self::X => (Self::Y, Self::Z),
            Self::Y => (Self::Z, Self::X),
            Self::Z => (Self::X, Self::Y),
        }
    }

    /// Unit vector along the axis.
    #[must_use]
    pub fn unit(self) -> Vector3 {
        match self {
            Self::X => Vector3::x(),
            Self::Y => Vector3::y(),
            Self::Z => Vector3::z(),
        }
    }
}

/// Composes a world transform from a position, Euler rotation in degrees and
/// a per-axis scale.
///
/// The result is `T * Rz * Ry * Rx * S`: scale first, then rotate about X, Y
/// and Z in that order, then translate. Every component that needs a world
/// transform for a solid goes through this function.
#[must_use]
pub fn compose_pose(position: &Point3, rotation_deg: &Vector3, scale: &Vector3) -> Matrix4 {
    let rotation = Rotation3::from_euler_angles(
        rotation_deg.x.to_radians(),
        rotation_deg.y.to_radians(),
        rotation_deg.z.to_radians(),
    );
    Matrix4::new_translation(&position.coords)
        * rotation.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(scale)
}

/// Transforms a point by a 4x4 matrix (homogeneous coordinates).
#[must_use]
pub fn transform_point(matrix: &Matrix4, point: &Point3) -> Point3 {
    let v = matrix * Vector4::new(point.x, point.y, point.z, 1.0);
    Point3::new(v.x, v.y, v.z)
}

/// Transforms a direction vector by a 4x4 matrix (ignoring translation).
#[must_use]
pub fn transform_direction(matrix: &Matrix4, dir: &Vector3) -> Vector3 {
    let v = matrix * Vector4::new(dir.x, dir.y, dir.z, 0.0);
    Vector3::new(v.x, v.y, v.z)
}

/// Returns the linear column of `matrix` belonging to `axis`.
///
/// Its length is the world-space extent of one local unit along that axis.
#[must_use]
pub fn axis_column(matrix: &Matrix4, axis: Axis) -> Vector3 {
    let i = axis.index();
    Vector3::new(matrix[(0, i)], matrix[(1, i)], matrix[(2, i)])
}

/// Lengths of the three linear columns.
#[must_use]
pub fn column_lengths(matrix: &Matrix4) -> Vector3 {
    Vector3::new(
        axis_column(matrix, Axis::X).norm(),
        axis_column(matrix, Axis::Y).norm(),
        axis_column(matrix, Axis::Z).norm(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    #[test]
    fn identity_pose() {
        let m = compose_pose(&Point3::origin(), &Vector3::zeros(), &Vector3::repeat(1.0));
        assert_relative_eq!(m, Matrix4::identity(), epsilon = 1e-12);
    }

    #[test]
    fn scale_then_translate() {
        let m = compose_pose(&p(1.0, 2.0, 3.0), &Vector3::zeros(), &Vector3::new(2.0, 3.0, 4.0));
        let q = transform_point(&m, &p(1.0, 1.0, 1.0));
        assert_relative_eq!(q, p(3.0, 5.0, 7.0), epsilon = 1e-12);
    }

    #[test]
    fn rotation_about_z_by_90() {
        let m = compose_pose(&Point3::origin(), &Vector3::new(0.0, 0.0, 90.0), &Vector3::repeat(1.0));
        let q = transform_point(&m, &p(1.0, 0.0, 0.0));
        assert_relative_eq!(q, p(0.0, 1.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn x_rotation_applies_before_z() {
        // X by 90 sends +Y to +Z, Z by 90 then leaves +Z alone.
        let m = compose_pose(
            &Point3::origin(),
            &Vector3::new(90.0, 0.0, 90.0),
            &Vector3::repeat(1.0),
        );
        let q = transform_direction(&m, &Vector3::y());
        assert_relative_eq!(q, Vector3::z(), epsilon = 1e-12);
    }

    #[test]
    fn column_lengths_follow_scale_under_rotation() {
        let m = compose_pose(
            &p(5.0, 0.0, 0.0),
            &Vector3::new(30.0, 45.0, 60.0),
            &Vector3::new(1.5, 2.0, 0.5),
        );
        let lengths = column_lengths(&m);
        assert_relative_eq!(lengths, Vector3::new(1.5, 2.0, 0.5), epsilon = 1e-12);
    }

    #[test]
    fn others_are_cyclic() {
        assert_eq!(Axis::Y.others(), (Axis::Z, Axis::X));
        assert_eq!(Axis::X.others(), (Axis::Y, Axis::Z));
        assert_eq!(Axis::Z.others(), (Axis::X, Axis::Y));
    }
}
