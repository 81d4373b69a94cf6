use std::f64::consts::{FRAC_PI_2, PI};

use crate::error::Result;
use crate::geometry::solid::{TORUS_MAJOR_RADIUS, TORUS_MINOR_RADIUS};
use crate::geometry::PlacedSolid;
use crate::math::Axis;

use super::axial::{generate_profile, Profile};
use super::meridian::Segment;
use super::section::SectionShape;
use super::{GeneratedRings, GenerationContext, RingGenerator};

/// Torus: rings march once around the tube, starting at its lowest point.
#[derive(Debug, Clone, Copy, Default)]
pub struct TorusGenerator;

impl RingGenerator for TorusGenerator {
    fn generate(&self, placed: &PlacedSolid, axis: Axis, ctx: &GenerationContext) -> Result<GeneratedRings> {
        let profile = Profile {
            segments: vec![Segment::Arc {
                center: [TORUS_MAJOR_RADIUS, 0.0],
                radius: TORUS_MINOR_RADIUS,
                start: -FRAC_PI_2,
                end: -FRAC_PI_2 + 2.0 * PI,
            }],
            section: SectionShape::Ellipse,
            closed: true,
            numeric: false,
        };
        generate_profile(profile, placed, axis, ctx)
    }
}
