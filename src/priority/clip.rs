//! Clipping a solid's rings against the stronger solids that overlap it.

use tracing::debug;

use crate::geometry::PlacedSolid;
use crate::math::polygon_3d::{angular_loop, best_fit_plane};
use crate::math::{polyline, Point3};
use crate::model::{Ring, RingRole};
use crate::settings::Thresholds;

/// Parameters of one clipping pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClipParams {
    /// Inward margin of the cutters, in world units.
    pub margin: f64,
    /// Kept fraction of the pristine loop at or above which it is restored.
    pub coverage: f64,
    /// A missing stretch shorter than this restores the pristine loop.
    pub stitch_width: f64,
    /// Rings shorter than this may be dropped.
    pub min_ring_length: f64,
    pub min_ring_points: usize,
    pub boundary_iterations: usize,
}

impl ClipParams {
    /// Parameters for a pass with the given yarn width and stitch spacing.
    #[must_use]
    pub fn new(thresholds: &Thresholds, yarn_width: f64, stitch_width: f64, spacing: f64) -> Self {
        Self {
            margin: thresholds.clip_margin_fraction * yarn_width,
            coverage: thresholds.coverage,
            stitch_width,
            min_ring_length: thresholds.min_ring_length_factor * spacing,
            min_ring_points: thresholds.min_ring_points,
            boundary_iterations: thresholds.boundary_iterations,
        }
    }
}

/// Rings of one solid after clipping.
#[derive(Debug, Clone, Default)]
pub struct ClipOutcome {
    pub rings: Vec<Ring>,
    /// One closed loop per cutter that cut anything.
    pub cut_loops: Vec<Vec<Point3>>,
    /// Rings removed entirely or filtered as insignificant.
    pub removed: usize,
}

/// Last point outside `cutter` on the edge from `outside` to `inside`.
fn boundary_point(cutter: &PlacedSolid, margin: f64, outside: &Point3, inside: &Point3, iterations: usize) -> Point3 {
    let (mut lo, mut hi) = (*outside, *inside);
    for _ in 0..iterations {
        let mid = nalgebra::center(&lo, &hi);
        if cutter.contains(&mid, margin) {
            hi = mid;
        } else {
            lo = mid;
        }
    }
    lo
}

/// Clips `rings` against `cutters` in order.
///
/// A ring that keeps at least `coverage` of its pristine length, or loses
/// less than a stitch width, is restored to its pristine loop. Otherwise its
/// kept runs become open fragments and the ring is partial. Partial rings next
/// to a removed ring become edge arcs. Short rings are then filtered, except
/// edge arcs and the two rings at each end of the solid.
#[must_use]
pub fn clip_rings(rings: Vec<Ring>, cutters: &[&PlacedSolid], params: &ClipParams) -> ClipOutcome {
    if cutters.is_empty() {
        return ClipOutcome {
            rings,
            ..ClipOutcome::default()
        };
    }
    let last_sequence = rings.iter().map(|r| r.meta.sequence).max().unwrap_or(0);
    let mut cut_points: Vec<Vec<Point3>> = vec![Vec::new(); cutters.len()];
    let mut kept: Vec<Ring> = Vec::with_capacity(rings.len());
    let mut removed_sequences: Vec<usize> = Vec::new();

    for mut ring in rings {
        let mut touched = false;
        for (c, cutter) in cutters.iter().enumerate() {
            if !ring.polylines.iter().flatten().any(|p| cutter.bounds.contains(p)) {
                continue;
            }
            let mut next = Vec::with_capacity(ring.polylines.len());
            for points in &ring.polylines {
                let runs = polyline::split_runs(
                    points,
                    |p| !cutter.contains(p, params.margin),
                    |outside, inside| {
                        let b = boundary_point(cutter, params.margin, outside, inside, params.boundary_iterations);
                        cut_points[c].push(b);
                        b
                    },
                );
                if runs.len() != 1 || runs[0].len() != points.len() {
                    touched = true;
                }
                next.extend(runs);
            }
            ring.polylines = next;
        }
        if !touched {
            kept.push(ring);
            continue;
        }

        let length = ring.total_length();
        let missing = ring.full_circumference - length;
        if length > 0.0 && (length >= params.coverage * ring.full_circumference || missing < params.stitch_width) {
            ring.polylines = vec![ring.meta.pristine.clone()];
            ring.meta.partial = false;
            ring.full_loop = true;
            kept.push(ring);
        } else if ring.polylines.iter().all(|p| p.len() < 2) {
            removed_sequences.push(ring.meta.sequence);
        } else {
            ring.polylines.retain(|p| p.len() >= 2);
            ring.meta.partial = true;
            ring.full_loop = false;
            kept.push(ring);
        }
    }

    for ring in &mut kept {
        let s = ring.meta.sequence;
        let borders_gap = removed_sequences
            .iter()
            .any(|&r| r + 1 == s || s + 1 == r);
        if ring.meta.partial && borders_gap {
            ring.meta.role = RingRole::EdgeArc;
        }
    }

    let before = kept.len();
    kept.retain(|ring| {
        let s = ring.meta.sequence;
        let protected = ring.meta.role == RingRole::EdgeArc || s < 2 || s + 2 > last_sequence;
        protected || (ring.total_length() >= params.min_ring_length && ring.point_count() >= params.min_ring_points)
    });
    let filtered = before - kept.len();
    if filtered > 0 || !removed_sequences.is_empty() {
        debug!(removed = removed_sequences.len(), filtered, "clipped rings");
    }

    let cut_loops = cut_points
        .iter()
        .filter_map(|points| {
            let plane = best_fit_plane(points)?;
            Some(angular_loop(points, &plane))
        })
        .collect();

    ClipOutcome {
        rings: kept,
        cut_loops,
        removed: removed_sequences.len() + filtered,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::diagnostics::Diagnostics;
    use crate::generators::{generate_rings, GenerationContext};
    use crate::geometry::{Solid, SolidKind};
    use crate::settings::Settings;

    fn params() -> ClipParams {
        ClipParams::new(&Thresholds::default(), 0.1, 0.1, 0.11)
    }

    fn rings_of(solid: &Solid) -> (PlacedSolid, Vec<Ring>) {
        let ctx = GenerationContext::new(&Settings::default(), &mut Diagnostics::new());
        let placed = PlacedSolid::new(solid).unwrap();
        let rings = generate_rings(&placed, &ctx).unwrap().rings;
        (placed, rings)
    }

    #[test]
    fn no_cutters_keeps_everything() {
        let (_, rings) = rings_of(&Solid::new(1, SolidKind::Cylinder));
        let n = rings.len();
        let out = clip_rings(rings, &[], &params());
        assert_eq!(out.rings.len(), n);
        assert!(out.cut_loops.is_empty());
    }

    #[test]
    fn kept_points_stay_outside_the_cutter() {
        let (_, rings) = rings_of(&Solid::new(1, SolidKind::Cylinder).with_scale(1.0, 2.0, 1.0));
        let cutter = PlacedSolid::new(&Solid::new(2, SolidKind::Sphere).with_position(1.0, 0.0, 0.0)).unwrap();
        let p = params();
        let out = clip_rings(rings, &[&cutter], &p);
        for ring in &out.rings {
            assert!(ring.satisfies_loop_invariant());
            if ring.meta.partial {
                for point in ring.polylines.iter().flatten() {
                    assert!(!cutter.contains(point, p.margin));
                }
                assert!(ring.total_length() <= ring.full_circumference + 1e-9);
            }
        }
        assert!(out.rings.iter().any(|r| r.meta.partial));
        assert_eq!(out.cut_loops.len(), 1);
        assert!(polyline::is_closed(&out.cut_loops[0]));
    }

    #[test]
    fn high_coverage_restores_the_pristine_loop() {
        let (_, rings) = rings_of(&Solid::new(1, SolidKind::Cylinder).with_scale(2.0, 1.0, 2.0));
        // A small sphere grazing the side removes only a short arc.
        let cutter = PlacedSolid::new(
            &Solid::new(2, SolidKind::Sphere).with_position(2.1, 0.0, 0.0).with_scale(0.2, 0.2, 0.2),
        )
        .unwrap();
        let strict = ClipParams { coverage: 1.0, stitch_width: 0.0, ..params() };
        let lenient = ClipParams { coverage: 0.95, ..strict };
        let cut = clip_rings(rings.clone(), &[&cutter], &strict);
        let restored = clip_rings(rings, &[&cutter], &lenient);
        assert!(cut.rings.iter().any(|r| r.meta.partial));
        assert!(restored.rings.iter().all(|r| !r.meta.partial && r.full_loop));
    }

    #[test]
    fn rings_swallowed_by_the_cutter_are_removed() {
        let (_, rings) = rings_of(&Solid::new(1, SolidKind::Sphere).with_scale(0.5, 0.5, 0.5));
        let n = rings.len();
        // Covers everything above y = 0.
        let cutter = PlacedSolid::new(&Solid::new(2, SolidKind::Cylinder).with_position(0.0, 1.0, 0.0)).unwrap();
        let out = clip_rings(rings, &[&cutter], &params());
        assert!(out.removed > 0);
        assert_eq!(out.removed, n - out.rings.len());
        assert!(out.rings.iter().all(|r| r.meta.center.y < 0.05));
    }

    #[test]
    fn partial_rings_next_to_a_removed_stretch_become_edge_arcs() {
        let (_, rings) = rings_of(&Solid::new(1, SolidKind::Sphere).with_scale(0.5, 0.5, 0.5));
        // A tilted cap plane crosses several rings before swallowing the top.
        let cutter = PlacedSolid::new(
            &Solid::new(2, SolidKind::Cylinder)
                .with_position(0.0, 1.2, 0.0)
                .with_rotation(0.0, 0.0, 20.0)
                .with_scale(3.0, 1.0, 3.0),
        )
        .unwrap();
        let out = clip_rings(rings, &[&cutter], &params());
        let arcs: Vec<_> = out.rings.iter().filter(|r| r.meta.role == RingRole::EdgeArc).collect();
        assert!(!arcs.is_empty());
        assert!(arcs.iter().all(|r| r.meta.partial && !r.full_loop));
    }
}
