use std::f64::consts::FRAC_PI_2;

use crate::error::Result;
use crate::geometry::solid::{CAPSULE_HALF_LENGTH, CAPSULE_RADIUS};
use crate::geometry::PlacedSolid;
use crate::math::Axis;

use super::axial::{generate_profile, Profile};
use super::meridian::Segment;
use super::section::SectionShape;
use super::{GeneratedRings, GenerationContext, RingGenerator};

/// Capsule: two quarter-circle ends joined by a straight side.
#[derive(Debug, Clone, Copy, Default)]
pub struct CapsuleGenerator;

impl RingGenerator for CapsuleGenerator {
    fn generate(&self, placed: &PlacedSolid, axis: Axis, ctx: &GenerationContext) -> Result<GeneratedRings> {
        let (r, h) = (CAPSULE_RADIUS, CAPSULE_HALF_LENGTH);
        let profile = Profile {
            segments: vec![
                Segment::Arc { center: [0.0, -h], radius: r, start: -FRAC_PI_2, end: 0.0 },
                Segment::Line { from: [r, -h], to: [r, h] },
                Segment::Arc { center: [0.0, h], radius: r, start: 0.0, end: FRAC_PI_2 },
            ],
            section: SectionShape::Ellipse,
            closed: false,
            numeric: false,
        };
        generate_profile(profile, placed, axis, ctx)
    }
}
