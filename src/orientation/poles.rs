use crate::geometry::PlacedSolid;
use crate::math::polygon_3d::centroid;
use crate::math::{polyline, Point3};
use crate::model::{PoleRole, Ring, SolidMarkers};

/// Midpoint of a ring's kept points. The closing point of a loop is counted once.
#[must_use]
pub fn ring_midpoint(ring: &Ring) -> Option<Point3> {
    let points: Vec<Point3> = ring
        .polylines
        .iter()
        .flat_map(|p| {
            let end = if polyline::is_closed(p) { p.len() - 1 } else { p.len() };
            p[..end].iter().copied()
        })
        .collect();
    centroid(&points)
}

/// Tags the pole nearest the first ring as the start and flags poles lying
/// inside a cutter's bounds. The start pole is listed first.
pub fn assign_poles(markers: &mut SolidMarkers, rings: &[Ring], cutters: &[&PlacedSolid]) {
    let first = rings.iter().min_by_key(|r| r.meta.sequence).and_then(ring_midpoint);
    if let Some(mid) = first {
        let nearest = markers
            .poles
            .iter()
            .enumerate()
            .min_by(|a, b| (a.1.position - mid).norm().total_cmp(&(b.1.position - mid).norm()))
            .map(|(i, _)| i);
        if let Some(start) = nearest {
            for (i, pole) in markers.poles.iter_mut().enumerate() {
                pole.role = if i == start { PoleRole::Start } else { PoleRole::End };
            }
        }
    }
    for pole in &mut markers.poles {
        pole.intersected = cutters.iter().any(|c| c.bounds.contains(&pole.position));
    }
    markers.poles.sort_by_key(|p| p.role != PoleRole::Start);
}
