pub mod intersect_3d;
pub mod polygon_3d;
pub mod polyline;
pub mod pose;
pub mod quadrature;

pub use pose::Axis;

/// 3D point type.
pub type Point3 = nalgebra::Point3<f64>;

/// 3D vector type.
pub type Vector3 = nalgebra::Vector3<f64>;

/// 3x3 matrix.
pub type Matrix3 = nalgebra::Matrix3<f64>;

/// 4x4 transformation matrix.
pub type Matrix4 = nalgebra::Matrix4<f64>;

/// Orientation quaternion.
pub type UnitQuaternion = nalgebra::UnitQuaternion<f64>;

/// Global geometric tolerance for floating-point comparisons.
pub const TOLERANCE: f64 = 1e-10;

/// Distance under which two polyline endpoints are considered the same point.
pub const JOIN_TOLERANCE: f64 = 1e-6;
