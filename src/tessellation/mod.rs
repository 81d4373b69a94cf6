mod revolve;
mod slice;

pub use revolve::tessellate_local;
pub use slice::{assemble_polylines, slice_mesh};

use crate::math::Point3;

/// Parameters controlling tessellation quality.
#[derive(Debug, Clone, Copy)]
pub struct TessellationParams {
    /// Segments around the profile axis for round kinds.
    pub segments: usize,
    /// Samples per quarter-circle of a curved profile.
    pub arc_samples: usize,
}

impl Default for TessellationParams {
    fn default() -> Self {
        Self {
            segments: 64,
            arc_samples: 16,
        }
    }
}

/// A triangle mesh in the local frame of a primitive.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle indices (each triple defines a triangle).
    pub indices: Vec<[u32; 3]>,
}
