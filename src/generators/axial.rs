//! Marching along an analytic meridian profile.

use crate::diagnostics::Diagnostics;
use crate::error::Result;
use crate::geometry::{PlacedSolid, SolidFrame};
use crate::math::{polyline, Axis};

use super::marching::{march, MarchExtent};
use super::meridian::{Meridian, Segment};
use super::section::{ring_segments, SectionShape};
use super::{assemble_rings, note_march, pole_markers, GeneratedRings, GenerationContext, RingDraft};

/// A solid described by its meridian profile and cross-section.
pub(crate) struct Profile {
    pub segments: Vec<Segment>,
    pub section: SectionShape,
    /// The meridian is a closed curve (torus tube).
    pub closed: bool,
    /// Integrate arcs numerically even when they stay circular.
    pub numeric: bool,
}

/// Generates rings over `profile` revolved around `axis`.
pub(crate) fn generate_profile(
    profile: Profile,
    placed: &PlacedSolid,
    axis: Axis,
    ctx: &GenerationContext,
) -> Result<GeneratedRings> {
    let frame = SolidFrame::new(placed, axis)?;
    let (su, sv) = frame.radial_scales;
    let section = profile.section;
    let meridian = Meridian::new(
        profile.segments,
        frame.mean_radial_scale(),
        frame.axial_scale,
        profile.closed,
        profile.numeric,
    );
    let ring_at = |s: f64| {
        meridian.point_at(s).map(|p| {
            let segments = ring_segments(section.perimeter(p.radius, su, sv), ctx.spacing);
            (p, section.ring(&frame, p.radius, p.axial, segments))
        })
    };
    // Gaps are solved against the literal ring polylines, which are slightly
    // shorter than the analytic sections they sample.
    let perimeter = |s: f64| ring_at(s).map_or(0.0, |(_, ring)| polyline::length(&ring));
    let (first_peak, last_peak) = meridian.radial_peaks();
    let extent = MarchExtent {
        total: meridian.total_length(),
        first_peak,
        last_peak,
        closed: meridian.is_closed(),
    };
    let plan = march(&perimeter, &extent, ctx.step, ctx.edge_perimeter(), ctx.settings.max_rings);

    let mut diagnostics = Diagnostics::new();
    note_march(&plan, placed, ctx, &mut diagnostics);

    let drafts = plan
        .positions
        .iter()
        .filter_map(|&s| {
            let (p, ring) = ring_at(s)?;
            Some(RingDraft {
                arc_position: s,
                center: frame.world_point(0.0, 0.0, p.axial),
                loops: vec![ring],
                cap_normal: p.cap_side.map(|side| frame.axis_dir * side),
            })
        })
        .collect();
    let rings = assemble_rings(placed, &frame, drafts, &mut diagnostics);

    let (lo, hi) = meridian.axial_range();
    let markers = pole_markers(frame.world_point(0.0, 0.0, lo), frame.world_point(0.0, 0.0, hi));
    Ok(GeneratedRings {
        rings,
        markers,
        diagnostics,
    })
}
