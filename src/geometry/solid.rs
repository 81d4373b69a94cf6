use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::pose::compose_pose;
use crate::math::{Matrix4, Point3, Vector3};

/// Caller-assigned identifier of a scene solid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SolidId(pub u64);

impl fmt::Display for SolidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Primitive solid types.
///
/// Every kind is defined in a local frame centred at the origin with its
/// profile axis along local `+Y`:
///
/// | kind       | local shape                                                        |
/// |------------|--------------------------------------------------------------------|
/// | `Sphere`   | radius 1                                                           |
/// | `Cylinder` | radius 1, `y` in `[-1, 1]`                                         |
/// | `Cone`     | base radius 1 at `y = -1`, apex at `y = 1`                         |
/// | `Capsule`  | radius 0.5, straight section `y` in `[-0.5, 0.5]`, tips at `y = ±1` |
/// | `Pyramid`  | square base of half-width 1 at `y = -1`, apex at `y = 1`           |
/// | `Torus`    | major radius 0.75, tube radius 0.25, symmetric about `Y`           |
/// | `Triangle` | equilateral prism, circumradius 1 in `XZ`, `y` in `[-1, 1]`        |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolidKind {
    Sphere,
    Cone,
    Cylinder,
    Capsule,
    Pyramid,
    Torus,
    Triangle,
    /// A type name this engine does not recognise.
    #[serde(other)]
    Unknown,
}

/// Capsule hemisphere radius.
pub const CAPSULE_RADIUS: f64 = 0.5;
/// Half-length of the capsule's straight section.
pub const CAPSULE_HALF_LENGTH: f64 = 0.5;
/// Torus major radius (axis to tube centre).
pub const TORUS_MAJOR_RADIUS: f64 = 0.75;
/// Torus tube radius.
pub const TORUS_MINOR_RADIUS: f64 = 0.25;
/// Angles (radians, measured from local `+X` towards `+Z`) of the prism's vertices.
pub const PRISM_VERTEX_ANGLES: [f64; 3] = [
    std::f64::consts::FRAC_PI_2,
    std::f64::consts::FRAC_PI_2 + 2.0 * std::f64::consts::FRAC_PI_3,
    std::f64::consts::FRAC_PI_2 + 4.0 * std::f64::consts::FRAC_PI_3,
];

impl SolidKind {
    /// Local axis-aligned bounds of the unit primitive.
    #[must_use]
    pub fn local_bounds(self) -> (Point3, Point3) {
        match self {
            Self::Torus => {
                let r = TORUS_MAJOR_RADIUS + TORUS_MINOR_RADIUS;
                (
                    Point3::new(-r, -TORUS_MINOR_RADIUS, -r),
                    Point3::new(r, TORUS_MINOR_RADIUS, r),
                )
            }
            Self::Triangle => {
                let half = 3f64.sqrt() * 0.5;
                (Point3::new(-half, -1.0, -0.5), Point3::new(half, 1.0, 1.0))
            }
            _ => (Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0)),
        }
    }
}

/// Per-solid override of the automatic priority comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityOverride {
    #[default]
    Auto,
    /// Wins every comparison against a non-strong solid.
    Strong,
    /// Loses every comparison against a non-weak solid.
    Weak,
}

/// A primitive solid placed in the scene.
///
/// Owned by the caller; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Solid {
    pub id: SolidId,
    pub kind: SolidKind,
    pub position: Point3,
    /// Euler rotation in degrees, applied X, then Y, then Z.
    pub rotation: Vector3,
    pub scale: Vector3,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub priority_override: PriorityOverride,
}

fn default_visible() -> bool {
    true
}

impl Solid {
    /// Creates a visible solid at the origin with unit scale.
    #[must_use]
    pub fn new(id: u64, kind: SolidKind) -> Self {
        Self {
            id: SolidId(id),
            kind,
            position: Point3::origin(),
            rotation: Vector3::zeros(),
            scale: Vector3::repeat(1.0),
            visible: true,
            priority_override: PriorityOverride::Auto,
        }
    }

    /// Sets the position.
    #[must_use]
    pub fn with_position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.position = Point3::new(x, y, z);
        self
    }

    /// Sets the Euler rotation in degrees.
    #[must_use]
    pub fn with_rotation(mut self, x: f64, y: f64, z: f64) -> Self {
        self.rotation = Vector3::new(x, y, z);
        self
    }

    /// Sets the per-axis scale.
    #[must_use]
    pub fn with_scale(mut self, x: f64, y: f64, z: f64) -> Self {
        self.scale = Vector3::new(x, y, z);
        self
    }

    /// Sets the priority override.
    #[must_use]
    pub fn with_priority(mut self, priority: PriorityOverride) -> Self {
        self.priority_override = priority;
        self
    }

    /// Marks the solid hidden.
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// World transform of the solid.
    #[must_use]
    pub fn transform(&self) -> Matrix4 {
        compose_pose(&self.position, &self.rotation, &self.scale)
    }
}
