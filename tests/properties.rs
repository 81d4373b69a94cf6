//! Property-based tests for ring generation and stitch spacing.

#![allow(clippy::unwrap_used)]

use std::f64::consts::TAU;

use proptest::prelude::*;

use stitchgeo::generators::marching::first_gap;
use stitchgeo::generators::{
    generate_rings, slicing_axis, strategy_for, GenerationContext, Strategy as RingStrategy, NATIVE_AXIS,
};
use stitchgeo::geometry::{PlacedSolid, SolidFrame};
use stitchgeo::math::polyline;
use stitchgeo::{Diagnostics, GenerateLayers, PlanStitches, Ring, RingRole, Settings, SliceAxis, Solid, SolidKind};

fn arb_kind() -> impl Strategy<Value = SolidKind> {
    prop_oneof![
        Just(SolidKind::Sphere),
        Just(SolidKind::Cone),
        Just(SolidKind::Cylinder),
        Just(SolidKind::Capsule),
        Just(SolidKind::Pyramid),
        Just(SolidKind::Torus),
        Just(SolidKind::Triangle),
    ]
}

fn arb_scale() -> impl Strategy<Value = (f64, f64, f64)> {
    (0.4f64..2.0, 0.4f64..2.0, 0.4f64..2.0)
}

fn arb_axis() -> impl Strategy<Value = SliceAxis> {
    prop_oneof![Just(SliceAxis::Auto), Just(SliceAxis::X), Just(SliceAxis::Y), Just(SliceAxis::Z)]
}

/// Position of a ring on the reference meridian: `(radius, axial)`.
///
/// Swept rings are measured through the cross-section columns, so every
/// vertex reports the profile radius it was built from. Mesh sections use the
/// perimeter-equivalent radius.
fn reference_point(ring: &Ring, frame: &SolidFrame, strategy: RingStrategy) -> (f64, f64) {
    let points = &ring.polylines[0];
    let axial = frame.sort_key(&points[0]);
    if strategy == RingStrategy::MeshSection {
        return (ring.total_length() / TAU, axial);
    }
    let (u, v) = frame.cross_section_axes();
    let body = &points[..points.len() - 1];
    let radius: f64 = body
        .iter()
        .map(|p| {
            let d = p - ring.meta.center;
            let (a, b) = (d.dot(&u) / u.norm_squared(), d.dot(&v) / v.norm_squared());
            if ring.object_kind == SolidKind::Pyramid {
                a.abs().max(b.abs())
            } else {
                a.hypot(b)
            }
        })
        .sum::<f64>();
    #[allow(clippy::cast_precision_loss)]
    let radius = radius / body.len() as f64;
    (radius * frame.mean_radial_scale(), axial)
}

/// Inset between two concentric cap rings, measured on the cap face.
fn cap_inset(a: &Ring, b: &Ring) -> f64 {
    let (inner, outer) = if a.total_length() < b.total_length() { (a, b) } else { (b, a) };
    inner.polylines[0]
        .iter()
        .filter_map(|p| polyline::closest_point(&outer.polylines[0], p))
        .map(|c| c.distance)
        .fold(f64::INFINITY, f64::min)
}

/// Smallest curvature radius of the scaled meridian; infinite for straight profiles.
fn min_curvature_radius(kind: SolidKind, frame: &SolidFrame) -> f64 {
    let (m, s) = (frame.mean_radial_scale(), frame.axial_scale);
    let ellipse = m.min(s).powi(2) / m.max(s);
    match kind {
        SolidKind::Sphere => ellipse,
        SolidKind::Capsule => 0.5 * ellipse,
        SolidKind::Torus => 0.25 * ellipse,
        _ => f64::INFINITY,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn repeated_runs_are_identical(kind in arb_kind(), (sx, sy, sz) in arb_scale(), rx in -90.0f64..90.0) {
        let solids = vec![Solid::new(1, kind).with_scale(sx, sy, sz).with_rotation(rx, 0.0, 0.0)];
        let settings = Settings::default();
        let a = GenerateLayers::new(&solids, &settings).execute().unwrap();
        let b = GenerateLayers::new(&solids, &settings).execute().unwrap();
        prop_assert_eq!(a.layers.len(), b.layers.len());
        for (x, y) in a.layers.iter().zip(&b.layers) {
            prop_assert_eq!(x.sort_key.to_bits(), y.sort_key.to_bits());
            prop_assert_eq!(x.point_count(), y.point_count());
        }
    }

    #[test]
    fn full_loops_are_closed(kind in arb_kind(), (sx, sy, sz) in arb_scale()) {
        let solids = vec![Solid::new(1, kind).with_scale(sx, sy, sz)];
        let out = GenerateLayers::new(&solids, &Settings::default()).execute().unwrap();
        for ring in &out.layers {
            prop_assert!(ring.satisfies_loop_invariant());
        }
    }

    #[test]
    fn neighbouring_rings_sit_one_step_apart(
        kind in arb_kind(),
        axis in arb_axis(),
        (sx, sy, sz) in (0.8f64..1.6, 0.8f64..1.6, 0.8f64..1.6),
    ) {
        let settings = Settings { slice_axis: axis, ..Settings::default() };
        let ctx = GenerationContext::new(&settings, &mut Diagnostics::new());
        let placed = PlacedSolid::new(&Solid::new(1, kind).with_scale(sx, sy, sz)).unwrap();
        let sliced = slicing_axis(kind, axis.resolve(NATIVE_AXIS));
        let strategy = strategy_for(kind, sliced).unwrap();
        let frame = SolidFrame::new(&placed, sliced).unwrap();
        let rings = generate_rings(&placed, &ctx).unwrap().rings;
        let step = ctx.step;

        // Chord between two points one step apart along a curve whose
        // curvature radius never drops below `rho`.
        let rho = min_curvature_radius(kind, &frame);
        let shortest = if rho.is_finite() { 2.0 * rho * (step / (2.0 * rho)).sin() } else { step };

        let cap_side = |r: &Ring| r.meta.cap_normal.map(|n| n.dot(&frame.axis_dir) > 0.0);
        let mut mesh_sides = Vec::new();
        let mut measured = 0;
        for w in rings.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            if a.meta.role != b.meta.role || cap_side(a) != cap_side(b) {
                continue;
            }
            let (ra, ta) = reference_point(a, &frame, strategy);
            let (rb, tb) = reference_point(b, &frame, strategy);
            let gap = match (a.meta.role, strategy) {
                (RingRole::Cap, RingStrategy::MeshSection) => cap_inset(a, b),
                (RingRole::Cap, _) => (ra - rb).abs(),
                _ => (ra - rb).hypot(ta - tb),
            };
            measured += 1;
            if a.meta.role == RingRole::Side && strategy == RingStrategy::MeshSection {
                // Sections between profile samples only approximate it.
                mesh_sides.push(gap);
            } else if a.meta.role == RingRole::Cap {
                prop_assert!((gap - step).abs() < 2e-3 * step, "{:?} cap gap {} at {}", kind, gap, a.meta.sequence);
            } else {
                prop_assert!(gap <= step * (1.0 + 1e-3), "{:?} gap {} at {}", kind, gap, a.meta.sequence);
                prop_assert!(gap >= shortest * (1.0 - 1e-3), "{:?} gap {} at {}", kind, gap, a.meta.sequence);
            }
        }
        prop_assert!(measured > 0);
        if mesh_sides.len() >= 3 {
            mesh_sides.sort_by(f64::total_cmp);
            let median = mesh_sides[mesh_sides.len() / 2];
            prop_assert!((median - step).abs() < 0.05 * step, "{:?} median gap {}", kind, median);
        }
    }

    #[test]
    fn first_gap_is_the_smallest_reaching_offset(radius in 0.2f64..3.0, fraction in 0.05f64..0.95) {
        let perimeter = |s: f64| std::f64::consts::TAU * radius * s.sin();
        let target = fraction * perimeter(std::f64::consts::FRAC_PI_2);
        let gap = first_gap(perimeter, target, std::f64::consts::FRAC_PI_2).unwrap();
        prop_assert!(perimeter(gap) >= target);
        prop_assert!(perimeter(gap * (1.0 - 1e-6)) < target);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(8))]

    #[test]
    fn edge_gap_ignores_width_multiplier(stitch in prop_oneof![Just("sc"), Just("sl"), Just("bobble"), Just("puff")]) {
        let settings = Settings {
            stitch_type: stitch.to_owned(),
            ..Settings::default()
        };
        let solids = vec![Solid::new(1, SolidKind::Cylinder)];
        let out = GenerateLayers::new(&solids, &settings).execute().unwrap();
        let plan = PlanStitches::new(&out, &settings).execute().unwrap();
        let edge_gap = settings.thresholds.edge_gap_fraction * 0.1;
        let width = stitchgeo::stitches::profile::lookup(stitch).unwrap().width_multiplier * 0.1;

        let mut checked = 0;
        for (i, ring) in out.layers.iter().enumerate() {
            if ring.meta.role != RingRole::Side || (plan.fit_per_layer[i].scale() - 1.0).abs() > 1e-12 {
                continue;
            }
            let nodes: Vec<_> = plan.layer(i).collect();
            for pair in nodes.windows(2) {
                let gap = (pair[1].position - pair[0].position).norm() - width;
                prop_assert!((gap - edge_gap).abs() < 1e-3, "gap {} on layer {}", gap, i);
            }
            checked += 1;
        }
        prop_assert!(checked > 0);
    }
}
