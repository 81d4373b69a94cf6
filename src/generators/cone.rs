use crate::error::Result;
use crate::geometry::PlacedSolid;
use crate::math::Axis;

use super::axial::{generate_profile, Profile};
use super::meridian::Segment;
use super::section::SectionShape;
use super::{GeneratedRings, GenerationContext, RingGenerator};

/// Cone: inset rings over the base cap, then rings up the slant to the apex.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConeGenerator;

impl RingGenerator for ConeGenerator {
    fn generate(&self, placed: &PlacedSolid, axis: Axis, ctx: &GenerationContext) -> Result<GeneratedRings> {
        let profile = Profile {
            segments: vec![
                Segment::Line { from: [0.0, -1.0], to: [1.0, -1.0] },
                Segment::Line { from: [1.0, -1.0], to: [0.0, 1.0] },
            ],
            section: SectionShape::Ellipse,
            closed: false,
            numeric: false,
        };
        generate_profile(profile, placed, axis, ctx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::geometry::{Solid, SolidKind};
    use crate::model::RingRole;
    use crate::settings::Settings;

    #[test]
    fn base_cap_then_slant() {
        let ctx = GenerationContext::new(&Settings::default(), &mut Diagnostics::new());
        let placed = PlacedSolid::new(&Solid::new(1, SolidKind::Cone)).unwrap();
        let out = ConeGenerator.generate(&placed, Axis::Y, &ctx).unwrap();
        let caps: Vec<_> = out.rings.iter().filter(|r| r.meta.role == RingRole::Cap).collect();
        assert!(!caps.is_empty());
        // Cap rings come first, lie on the base and face down.
        assert!(out.rings[..caps.len()].iter().all(|r| r.meta.role == RingRole::Cap));
        for ring in &caps {
            assert_relative_eq!(ring.meta.center.y, -1.0, epsilon = 1e-12);
            assert_relative_eq!(ring.meta.cap_normal.unwrap().y, -1.0, epsilon = 1e-12);
        }
        // Slant arc positions continue at the same step.
        let positions: Vec<f64> = out.rings.iter().map(|r| r.meta.arc_position).collect();
        for w in positions.windows(2) {
            assert_relative_eq!(w[1] - w[0], ctx.step, epsilon = 1e-9);
        }
        assert_relative_eq!(out.markers.poles[1].position.y, 1.0, epsilon = 1e-12);
    }
}
