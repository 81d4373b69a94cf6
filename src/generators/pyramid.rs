use crate::error::Result;
use crate::geometry::PlacedSolid;
use crate::math::Axis;

use super::axial::{generate_profile, Profile};
use super::meridian::Segment;
use super::section::SectionShape;
use super::{GeneratedRings, GenerationContext, RingGenerator};

/// Square pyramid: the cone profile with square sections. Spacing is measured
/// along the centre line of a face.
#[derive(Debug, Clone, Copy, Default)]
pub struct PyramidGenerator;

impl RingGenerator for PyramidGenerator {
    fn generate(&self, placed: &PlacedSolid, axis: Axis, ctx: &GenerationContext) -> Result<GeneratedRings> {
        let profile = Profile {
            segments: vec![
                Segment::Line { from: [0.0, -1.0], to: [1.0, -1.0] },
                Segment::Line { from: [1.0, -1.0], to: [0.0, 1.0] },
            ],
            section: SectionShape::Square,
            closed: false,
            numeric: false,
        };
        generate_profile(profile, placed, axis, ctx)
    }
}
