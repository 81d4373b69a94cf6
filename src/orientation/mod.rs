//! Pole roles, intersection flags and oval starting chains.

mod oval;
mod poles;

pub use oval::{needs_oval_start, oval_chain, oval_ring};
pub use poles::{assign_poles, ring_midpoint};

use tracing::debug;

use crate::geometry::{PlacedSolid, SolidFrame};
use crate::model::{Ring, SolidMarkers};

/// Final per-solid pass after clipping.
///
/// Assigns pole roles, prepends an oval starting chain when the cross-section
/// is elongated past `oval_ratio`, and records the first round in
/// `markers.ring0`.
pub fn orient(
    frame: &SolidFrame,
    rings: &mut Vec<Ring>,
    markers: &mut SolidMarkers,
    cutters: &[&PlacedSolid],
    spacing: f64,
    oval_ratio: f64,
) {
    assign_poles(markers, rings, cutters);

    let oval = if needs_oval_start(frame, oval_ratio) {
        rings.first().and_then(|first| {
            let chain = oval_chain(frame, first, spacing)?;
            Some((oval_ring(first, chain.clone()), chain))
        })
    } else {
        None
    };
    if let Some((ring, chain)) = oval {
        debug!(solid = %ring.object_id, points = chain.len(), "oval start chain");
        for r in rings.iter_mut() {
            r.meta.sequence += 1;
        }
        rings.insert(0, ring);
        markers.ring0 = Some(chain);
    } else {
        markers.ring0 = rings.first().and_then(|r| r.polylines.first().cloned());
    }
}
