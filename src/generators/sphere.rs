use std::f64::consts::FRAC_PI_2;

use crate::error::Result;
use crate::geometry::PlacedSolid;
use crate::math::Axis;

use super::axial::{generate_profile, Profile};
use super::meridian::Segment;
use super::section::SectionShape;
use super::{GeneratedRings, GenerationContext, RingGenerator};

/// Arc-length-accurate rings over the unit sphere along any local axis.
///
/// The meridian is integrated numerically and inverted with Newton steps, so
/// ring spacing stays uniform when the sphere is scaled into an ellipsoid.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphereGenerator;

impl RingGenerator for SphereGenerator {
    fn generate(&self, placed: &PlacedSolid, axis: Axis, ctx: &GenerationContext) -> Result<GeneratedRings> {
        let profile = Profile {
            segments: vec![Segment::Arc {
                center: [0.0, 0.0],
                radius: 1.0,
                start: -FRAC_PI_2,
                end: FRAC_PI_2,
            }],
            section: SectionShape::Ellipse,
            closed: false,
            numeric: true,
        };
        generate_profile(profile, placed, axis, ctx)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::geometry::{Solid, SolidKind};
    use crate::math::polyline;
    use crate::model::PoleRole;
    use crate::settings::Settings;

    fn ctx() -> GenerationContext {
        GenerationContext::new(&Settings::default(), &mut Diagnostics::new())
    }

    #[test]
    fn unit_sphere_ring_count_and_poles() {
        let placed = PlacedSolid::new(&Solid::new(1, SolidKind::Sphere)).unwrap();
        let out = SphereGenerator.generate(&placed, Axis::Y, &ctx()).unwrap();
        #[allow(clippy::cast_precision_loss)]
        let count = out.rings.len() as f64;
        assert!((count - (PI / 0.12).floor()).abs() <= 1.0);
        let start = out.markers.pole(PoleRole::Start).unwrap();
        let end = out.markers.pole(PoleRole::End).unwrap();
        assert_relative_eq!(start.position.y, -1.0, epsilon = 1e-12);
        assert_relative_eq!(end.position.y, 1.0, epsilon = 1e-12);
        // Radius grows to the equator, then shrinks.
        let radii: Vec<f64> = out.rings.iter().map(|r| polyline::length(&r.polylines[0])).collect();
        let widest = radii.iter().enumerate().fold(0, |best, (i, r)| if *r > radii[best] { i } else { best });
        assert!(radii[..=widest].windows(2).all(|w| w[0] < w[1]));
        assert!(radii[widest..].windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn ellipsoid_rings_are_uniform_along_the_reference_meridian() {
        let solid = Solid::new(1, SolidKind::Sphere).with_scale(2.0, 1.0, 3.0);
        let placed = PlacedSolid::new(&solid).unwrap();
        let out = SphereGenerator.generate(&placed, Axis::Y, &ctx()).unwrap();
        // Reference meridian: (2.5 cos t, sin t).
        let arc = |a: f64, b: f64| {
            let n = 20_000;
            (0..n)
                .map(|i| {
                    let t = a + (b - a) * (f64::from(i) + 0.5) / f64::from(n);
                    (2.5 * t.sin()).hypot(t.cos())
                })
                .sum::<f64>()
                * (b - a)
                / f64::from(n)
        };
        let angles: Vec<f64> = out
            .rings
            .iter()
            .map(|r| placed.to_local(&r.meta.center).y.clamp(-1.0, 1.0).asin())
            .collect();
        for w in angles.windows(2) {
            assert_relative_eq!(arc(w[0], w[1]), 0.12, max_relative = 1e-3);
        }
    }

    #[test]
    fn slicing_along_x_puts_poles_on_x() {
        let placed = PlacedSolid::new(&Solid::new(1, SolidKind::Sphere)).unwrap();
        let out = SphereGenerator.generate(&placed, Axis::X, &ctx()).unwrap();
        assert_relative_eq!(out.markers.poles[0].position.x, -1.0, epsilon = 1e-12);
        assert!(out.rings.iter().all(|r| (r.meta.axis.x - 1.0).abs() < 1e-12));
    }
}
