use crate::error::Result;
use crate::geometry::PlacedSolid;
use crate::math::Axis;

use super::{GeneratedRings, GenerationContext, MeshSectionGenerator, RingGenerator};

/// Triangular prism: always sliced from its tessellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct TriangleGenerator;

impl RingGenerator for TriangleGenerator {
    fn generate(&self, placed: &PlacedSolid, axis: Axis, ctx: &GenerationContext) -> Result<GeneratedRings> {
        MeshSectionGenerator.generate(placed, axis, ctx)
    }
}
