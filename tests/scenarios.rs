//! End-to-end scenarios through both passes.

#![allow(clippy::unwrap_used)]

use stitchgeo::generators::{generate_rings, GenerationContext};
use stitchgeo::geometry::PlacedSolid;
use stitchgeo::priority::{clip_rings, ClipParams, Decider};
use stitchgeo::stitches::{count_bounds, ScaffoldKind};
use stitchgeo::{
    DiagnosticKind, Diagnostics, GenerateLayers, PlanStitches, PoleRole, PriorityOverride, Ring, Settings, Solid,
    SolidId, SolidKind,
};

const STEP: f64 = 0.12;

/// Logs pass progress with `RUST_LOG=stitchgeo=debug cargo test`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn layers(solids: &[Solid]) -> stitchgeo::LayerOutput {
    GenerateLayers::new(solids, &Settings::default()).execute().unwrap()
}

fn rings_of(output: &stitchgeo::LayerOutput, id: u64) -> Vec<Ring> {
    output.solid_layers(SolidId(id)).cloned().collect()
}

#[test]
fn unit_sphere_at_yarn_level_four() {
    init_tracing();
    let out = layers(&[Solid::new(1, SolidKind::Sphere)]);
    let expected = (std::f64::consts::PI / STEP).floor();
    #[allow(clippy::cast_precision_loss)]
    let count = out.layers.len() as f64;
    assert!((count - expected).abs() <= 1.0, "{count} rings");

    let radii: Vec<f64> = out
        .layers
        .iter()
        .map(|r| (r.meta.pristine[0] - r.meta.center).norm())
        .collect();
    let widest = radii
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert!(radii[..=widest].windows(2).all(|w| w[0] < w[1]));
    assert!(radii[widest..].windows(2).all(|w| w[0] > w[1]));

    let markers = &out.markers[&SolidId(1)];
    assert_eq!(markers.poles.len(), 2);
    let start = markers.pole(PoleRole::Start).unwrap();
    let end = markers.pole(PoleRole::End).unwrap();
    assert!((start.position - stitchgeo::math::Point3::new(0.0, -1.0, 0.0)).norm() < 1e-9);
    assert!((end.position - stitchgeo::math::Point3::new(0.0, 1.0, 0.0)).norm() < 1e-9);
    assert!(out.layers.iter().all(|r| r.full_loop && r.satisfies_loop_invariant()));
}

#[test]
fn unit_sphere_stitch_plan() {
    let settings = Settings::default();
    let out = GenerateLayers::new(&[Solid::new(1, SolidKind::Sphere)], &settings)
        .execute()
        .unwrap();
    let plan = PlanStitches::new(&out, &settings).execute().unwrap();
    assert_eq!(plan.stitch_counts_per_layer.len(), out.layers.len());
    let misfits = plan.fit_per_layer.iter().filter(|f| !f.fits()).count();
    assert_eq!(misfits, plan.diagnostics.count(DiagnosticKind::InsufficientLength));

    // Increases towards the equator, decreases after it.
    let widest = plan
        .stitch_counts_per_layer
        .iter()
        .enumerate()
        .max_by_key(|(_, c)| **c)
        .map(|(i, _)| i)
        .unwrap();
    for t in &plan.transitions {
        let (lo, hi) = count_bounds(t.lower_count, settings.increase_factor, settings.decrease_factor);
        assert!(t.upper_count >= lo && t.upper_count <= hi);
        if t.to_layer <= widest {
            assert_eq!(t.decreases, 0);
        } else {
            assert_eq!(t.increases, 0);
        }
    }
    assert!(plan.scaffold_segments.iter().any(|s| s.kind == ScaffoldKind::Increase));
    assert!(plan.scaffold_segments.iter().any(|s| s.kind == ScaffoldKind::Decrease));
    // One connector per node below the last ring.
    let last = out.layers.len() - 1;
    let connected: usize = plan.stitch_counts_per_layer[..last].iter().sum();
    assert_eq!(plan.scaffold_segments.len(), connected);
    for node in plan.layer(0) {
        assert!((node.orientation * stitchgeo::math::Vector3::x() - node.tangent).norm() < 1e-6);
    }
}

/// One convex cutter always leaves a single arc of a circle, so the weak rings
/// here have one fragment each. `two_cutters_split_a_ring_into_fragments`
/// covers multi-fragment rings.
#[test]
fn strong_sphere_keeps_its_rings_and_weak_sphere_is_cut_into_single_arcs() {
    init_tracing();
    let strong = Solid::new(1, SolidKind::Sphere).with_priority(PriorityOverride::Strong);
    let weak = Solid::new(2, SolidKind::Sphere)
        .with_position(1.0, 0.0, 0.0)
        .with_priority(PriorityOverride::Weak);
    let alone = layers(std::slice::from_ref(&strong));
    let both = layers(&[strong, weak]);

    assert_eq!(rings_of(&both, 1), rings_of(&alone, 1));
    assert_eq!(both.ranking.cutters_of(SolidId(2)), &[SolidId(1)]);
    assert_eq!(both.ranking.pairs[0].decided_by, Decider::Override);

    let cutter = PlacedSolid::new(&Solid::new(1, SolidKind::Sphere)).unwrap();
    let margin = Settings::default().thresholds.clip_margin_fraction * 0.1 * 1.01;
    let weak_rings = rings_of(&both, 2);
    assert!(weak_rings.iter().any(|r| r.meta.partial));
    for ring in weak_rings.iter().filter(|r| r.meta.partial) {
        assert!(!ring.full_loop);
        assert_eq!(ring.polylines.len(), 1);
        for p in ring.polylines.iter().flatten() {
            assert!(!cutter.contains(p, margin));
        }
    }
    assert!(both.markers[&SolidId(1)].cut_loops.is_empty());
    assert_eq!(both.markers[&SolidId(2)].cut_loops.len(), 1);
}

#[test]
fn strong_sphere_is_not_cut_by_a_neighbour_with_more_wins() {
    init_tracing();
    let strong = Solid::new(1, SolidKind::Sphere).with_priority(PriorityOverride::Strong);
    let busy = Solid::new(2, SolidKind::Sphere).with_position(1.5, 0.0, 0.0);
    let small = |id, y| {
        Solid::new(id, SolidKind::Sphere)
            .with_position(2.6, y, 0.0)
            .with_scale(0.4, 0.4, 0.4)
    };
    let alone = layers(std::slice::from_ref(&strong));
    let out = layers(&[strong, busy, small(3, 0.6), small(4, -0.6)]);

    assert_eq!(out.ranking.order[0], SolidId(1));
    assert!(out.ranking.cutters_of(SolidId(1)).is_empty());
    assert_eq!(out.ranking.cutters_of(SolidId(2)), &[SolidId(1)]);
    let strong_rings = rings_of(&out, 1);
    assert!(strong_rings.iter().all(|r| !r.meta.partial));
    assert_eq!(strong_rings, rings_of(&alone, 1));
    assert!(rings_of(&out, 2).iter().any(|r| r.meta.partial));
}

#[test]
fn two_cutters_split_a_ring_into_fragments() {
    init_tracing();
    let weak = Solid::new(1, SolidKind::Sphere);
    let left = Solid::new(2, SolidKind::Sphere)
        .with_position(-1.0, 0.0, 0.0)
        .with_scale(0.4, 0.4, 0.4)
        .with_priority(PriorityOverride::Strong);
    let right = Solid::new(3, SolidKind::Sphere)
        .with_position(1.0, 0.0, 0.0)
        .with_scale(0.4, 0.4, 0.4)
        .with_priority(PriorityOverride::Strong);
    let out = layers(&[weak, left, right]);
    let rings = rings_of(&out, 1);
    let split: Vec<&Ring> = rings.iter().filter(|r| r.polylines.len() >= 2).collect();
    assert!(!split.is_empty());
    assert!(split.iter().all(|r| r.meta.partial && !r.full_loop));
    assert_eq!(out.markers[&SolidId(1)].cut_loops.len(), 2);
    assert_eq!(out.stats.total_line_count, out.layers.iter().map(|r| r.polylines.len()).sum::<usize>());

    // Fragmented rings still get nodes on every fragment.
    let plan = PlanStitches::new(&out, &Settings::default()).execute().unwrap();
    let index = out.layers.iter().position(|r| r.polylines.len() >= 2).unwrap();
    assert!(plan.stitch_counts_per_layer[index] >= 2);
}

#[test]
fn clipping_without_cutters_changes_nothing() {
    let settings = Settings::default();
    let ctx = GenerationContext::new(&settings, &mut Diagnostics::new());
    let params = ClipParams::new(&settings.thresholds, ctx.gauge.yarn_width, ctx.spacing, ctx.spacing);
    for kind in [SolidKind::Sphere, SolidKind::Torus, SolidKind::Pyramid] {
        let placed = PlacedSolid::new(&Solid::new(1, kind)).unwrap();
        let rings = generate_rings(&placed, &ctx).unwrap().rings;
        let out = clip_rings(rings.clone(), &[], &params);
        assert_eq!(out.rings, rings);
        assert_eq!(out.removed, 0);
    }
}

#[test]
fn clipping_accounts_for_every_ring() {
    let settings = Settings::default();
    let ctx = GenerationContext::new(&settings, &mut Diagnostics::new());
    let params = ClipParams::new(&settings.thresholds, ctx.gauge.yarn_width, ctx.spacing, ctx.spacing);
    let placed = PlacedSolid::new(&Solid::new(1, SolidKind::Capsule).with_scale(1.0, 2.0, 1.0)).unwrap();
    let cutter = PlacedSolid::new(&Solid::new(2, SolidKind::Cylinder).with_position(0.0, 1.5, 0.0)).unwrap();
    let rings = generate_rings(&placed, &ctx).unwrap().rings;
    let n = rings.len();
    let out = clip_rings(rings, &[&cutter], &params);
    assert_eq!(out.rings.len() + out.removed, n);
    assert!(out.rings.windows(2).all(|w| w[0].meta.sequence < w[1].meta.sequence));
}

#[test]
fn priority_is_deterministic_and_order_independent() {
    let solids = vec![
        Solid::new(1, SolidKind::Sphere),
        Solid::new(2, SolidKind::Cone).with_position(0.8, 0.2, 0.0),
        Solid::new(3, SolidKind::Cylinder).with_position(-0.7, 0.0, 0.3).with_scale(0.5, 1.5, 0.5),
    ];
    let a = layers(&solids);
    let b = layers(&solids);
    assert_eq!(a, b);

    let reversed: Vec<Solid> = solids.iter().rev().cloned().collect();
    let c = layers(&reversed);
    assert_eq!(a.ranking.ranks, c.ranking.ranks);
    assert_eq!(a.ranking.cutters, c.ranking.cutters);

    for pair in &a.ranking.pairs {
        assert!(pair.winner == pair.a || pair.winner == pair.b);
    }
}

#[test]
fn mirrored_equal_spheres_tie_break_by_position() {
    let settings = Settings {
        thresholds: stitchgeo::Thresholds {
            score_tie_epsilon: 0.2,
            ..stitchgeo::Thresholds::default()
        },
        ..Settings::default()
    };
    let solids = vec![
        Solid::new(7, SolidKind::Sphere).with_position(0.5, 0.0, 0.0),
        Solid::new(8, SolidKind::Sphere).with_position(-0.5, 0.0, 0.0),
    ];
    let out = GenerateLayers::new(&solids, &settings).execute().unwrap();
    assert_eq!(out.ranking.pairs[0].decided_by, Decider::Spatial);
    assert_eq!(out.ranking.order, vec![SolidId(8), SolidId(7)]);
}
