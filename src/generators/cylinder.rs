use crate::error::Result;
use crate::geometry::PlacedSolid;
use crate::math::Axis;

use super::axial::{generate_profile, Profile};
use super::meridian::Segment;
use super::section::SectionShape;
use super::{GeneratedRings, GenerationContext, RingGenerator};

/// Cylinder: bottom cap, side, top cap as one unrolled meridian.
#[derive(Debug, Clone, Copy, Default)]
pub struct CylinderGenerator;

impl RingGenerator for CylinderGenerator {
    fn generate(&self, placed: &PlacedSolid, axis: Axis, ctx: &GenerationContext) -> Result<GeneratedRings> {
        let profile = Profile {
            segments: vec![
                Segment::Line { from: [0.0, -1.0], to: [1.0, -1.0] },
                Segment::Line { from: [1.0, -1.0], to: [1.0, 1.0] },
                Segment::Line { from: [1.0, 1.0], to: [0.0, 1.0] },
            ],
            section: SectionShape::Ellipse,
            closed: false,
            numeric: false,
        };
        generate_profile(profile, placed, axis, ctx)
    }
}
