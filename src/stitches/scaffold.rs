//! Increase/decrease planning and connectors between consecutive rings.

use serde::{Deserialize, Serialize};

use crate::geometry::SolidId;
use crate::math::Point3;
use crate::settings::Distribution;

use super::nodes::NodeId;

/// Fractional golden-ratio step that shifts jagged increases between layers.
const JAGGED_SHIFT: f64 = 0.618_034;

/// What a connector does to the stitch count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaffoldKind {
    /// One stitch into one stitch.
    Regular,
    /// Two or more stitches worked into this node.
    Increase,
    /// This node is worked together with a neighbour.
    Decrease,
}

/// Connector from a node to the ring above it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaffoldSegment {
    pub from: NodeId,
    /// Layer of `from`.
    pub layer: usize,
    pub start: Point3,
    /// Nearest point on the upper ring.
    pub end: Point3,
    /// Upper node this stitch is worked into.
    pub target: Option<NodeId>,
    pub kind: ScaffoldKind,
}

/// Stitch-count change between two consecutive rings of a solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub solid: SolidId,
    pub from_layer: usize,
    pub to_layer: usize,
    pub lower_count: usize,
    /// Count the upper ring holds at nominal spacing.
    pub natural_count: usize,
    /// Count after clamping by the increase and decrease factors.
    pub upper_count: usize,
    pub increases: usize,
    pub decreases: usize,
}

impl Transition {
    /// `true` when the factors moved the count off its natural value.
    #[must_use]
    pub fn clamped(&self) -> bool {
        self.upper_count != self.natural_count
    }
}

/// Allowed stitch counts of the ring above a ring of `lower` stitches.
#[must_use]
pub fn count_bounds(lower: usize, increase_factor: f64, decrease_factor: f64) -> (usize, usize) {
    #[allow(clippy::cast_precision_loss)]
    let n = lower as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let lo = (n * (1.0 - decrease_factor)).floor().max(0.0) as usize;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let hi = (n * (1.0 + increase_factor)).ceil().max(0.0) as usize;
    (lo.max(1).min(lower), hi.max(lower))
}

/// Upper ring count: the natural count clamped to the bounds of `lower`.
/// A ring with no stitches below it is unconstrained.
#[must_use]
pub fn target_count(lower: usize, natural: usize, increase_factor: f64, decrease_factor: f64) -> usize {
    if lower == 0 || natural == 0 {
        return natural;
    }
    let (lo, hi) = count_bounds(lower, increase_factor, decrease_factor);
    natural.clamp(lo, hi)
}

/// Picks `k` of `slots` indices, sorted. Indices repeat when `k > slots`.
///
/// `Even` spaces them uniformly. `Jagged` shifts the pattern by a different
/// fraction of the stride on every layer so changes do not stack.
#[must_use]
pub fn distribute(slots: usize, k: usize, mode: Distribution, layer: usize) -> Vec<usize> {
    if slots == 0 || k == 0 {
        return Vec::new();
    }
    #[allow(clippy::cast_precision_loss)]
    let stride = slots as f64 / k as f64;
    #[allow(clippy::cast_precision_loss)]
    let shift = match mode {
        Distribution::Even => 0.5 * stride,
        Distribution::Jagged => (layer as f64 * JAGGED_SHIFT).fract() * stride,
    };
    let mut out: Vec<usize> = (0..k)
        .map(|i| {
            #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let idx = (i as f64 * stride + shift).floor() as usize;
            idx % slots
        })
        .collect();
    out.sort_unstable();
    out
}

/// How one lower node connects upward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub kind: ScaffoldKind,
    /// Index of the upper stitch, counted from the one nearest lower node 0.
    pub slot: usize,
}

/// Links every one of `lower` nodes to one of `upper` stitches.
///
/// Increases give a node extra upper slots; decreases merge a node with the
/// next one into a single slot. Every upper slot receives at least one link.
#[must_use]
pub fn link_slots(lower: usize, upper: usize, mode: Distribution, layer: usize) -> Vec<Link> {
    let mut links = Vec::with_capacity(lower);
    if upper >= lower {
        let mut extra = vec![0usize; lower];
        for i in distribute(lower, upper - lower, mode, layer) {
            extra[i] += 1;
        }
        let mut slot = 0;
        for e in extra {
            let kind = if e > 0 { ScaffoldKind::Increase } else { ScaffoldKind::Regular };
            links.push(Link { kind, slot });
            slot += 1 + e;
        }
    } else {
        // Boundary b merges node b with node b + 1.
        let boundaries = lower - 1;
        let mut merged = vec![false; boundaries];
        for b in distribute(boundaries, (lower - upper).min(boundaries), mode, layer) {
            merged[b] = true;
        }
        let mut slot = 0;
        for i in 0..lower {
            let joins_next = i < boundaries && merged[i];
            let joins_prev = i > 0 && merged[i - 1];
            let kind = if joins_next || joins_prev { ScaffoldKind::Decrease } else { ScaffoldKind::Regular };
            links.push(Link { kind, slot });
            if !joins_next {
                slot += 1;
            }
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slots_used(links: &[Link]) -> usize {
        links.last().map_or(0, |l| l.slot + 1)
    }

    #[test]
    fn bounds_follow_the_factors() {
        assert_eq!(count_bounds(6, 1.0, 0.5), (3, 12));
        assert_eq!(count_bounds(5, 0.5, 0.5), (2, 8));
        assert_eq!(target_count(6, 20, 1.0, 0.5), 12);
        assert_eq!(target_count(6, 2, 1.0, 0.5), 3);
        assert_eq!(target_count(6, 9, 1.0, 0.5), 9);
        assert_eq!(target_count(0, 9, 1.0, 0.5), 9);
    }

    #[test]
    fn even_distribution_is_uniform() {
        assert_eq!(distribute(12, 3, Distribution::Even, 0), vec![2, 6, 10]);
        assert_eq!(distribute(12, 3, Distribution::Even, 7), vec![2, 6, 10]);
    }

    #[test]
    fn jagged_distribution_moves_between_layers() {
        let a = distribute(12, 3, Distribution::Jagged, 1);
        let b = distribute(12, 3, Distribution::Jagged, 2);
        assert_eq!(a.len(), 3);
        assert_ne!(a, b);
        // Still one change per stride.
        for w in a.windows(2) {
            assert_eq!(w[1] - w[0], 4);
        }
    }

    #[test]
    fn increases_fill_every_upper_slot() {
        let links = link_slots(6, 12, Distribution::Even, 0);
        assert_eq!(links.len(), 6);
        assert!(links.iter().all(|l| l.kind == ScaffoldKind::Increase));
        assert_eq!(links[5].slot, 10);

        let links = link_slots(6, 8, Distribution::Even, 0);
        let increases = links.iter().filter(|l| l.kind == ScaffoldKind::Increase).count();
        assert_eq!(increases, 2);
    }

    #[test]
    fn decreases_merge_neighbours() {
        let links = link_slots(8, 6, Distribution::Even, 0);
        assert_eq!(slots_used(&links), 6);
        let decreases = links.iter().filter(|l| l.kind == ScaffoldKind::Decrease).count();
        assert_eq!(decreases, 4);
        assert!(links.windows(2).all(|w| w[1].slot >= w[0].slot));
    }

    #[test]
    fn regular_rows_map_one_to_one() {
        let links = link_slots(5, 5, Distribution::Jagged, 3);
        assert!(links.iter().enumerate().all(|(i, l)| l.slot == i && l.kind == ScaffoldKind::Regular));
    }
}
