//! Pairwise priority between solids whose bounds overlap.
//!
//! The stronger solid of a pair keeps its rings; the weaker one is clipped.
//! Strength is decided by overrides first, then by a sampled estimate of the
//! volume each solid keeps outside the other, then by exact volume, and
//! finally by position.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geometry::{PlacedSolid, PriorityOverride, SolidId};
use crate::math::Vector3;
use crate::settings::Thresholds;

/// What settled a pairwise comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decider {
    Override,
    Sampling,
    Volume,
    Spatial,
}

/// Result of comparing two overlapping solids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairOutcome {
    pub a: SolidId,
    pub b: SolidId,
    pub winner: SolidId,
    pub decided_by: Decider,
    /// Estimated non-overlapping volume of `a` and `b`.
    pub scores: (f64, f64),
}

/// Ranks and cutters of every solid in a pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriorityRanking {
    /// 0 is the strongest.
    pub ranks: BTreeMap<SolidId, usize>,
    /// Solids that beat this one in their pair, strongest first.
    pub cutters: BTreeMap<SolidId, Vec<SolidId>>,
    /// Solids from strongest to weakest.
    pub order: Vec<SolidId>,
    pub pairs: Vec<PairOutcome>,
}

impl PriorityRanking {
    #[must_use]
    pub fn rank(&self, id: SolidId) -> Option<usize> {
        self.ranks.get(&id).copied()
    }

    /// Cutters of `id`; empty for a solid nothing cuts.
    #[must_use]
    pub fn cutters_of(&self, id: SolidId) -> &[SolidId] {
        self.cutters.get(&id).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Deterministic order used when nothing else separates two solids: lower
/// world Y first, then X, then Z, then the lower id. `Less` means `a` is
/// stronger.
#[must_use]
pub fn spatial_order(a: &PlacedSolid, b: &PlacedSolid) -> Ordering {
    let (pa, pb) = (a.solid.position, b.solid.position);
    pa.y.total_cmp(&pb.y)
        .then(pa.x.total_cmp(&pb.x))
        .then(pa.z.total_cmp(&pb.z))
        .then(a.solid.id.cmp(&b.solid.id))
}

fn override_order(a: PriorityOverride, b: PriorityOverride) -> Ordering {
    use PriorityOverride::{Strong, Weak};
    match (a, b) {
        (Strong, x) if x != Strong => Ordering::Less,
        (x, Strong) if x != Strong => Ordering::Greater,
        (Weak, x) if x != Weak => Ordering::Greater,
        (x, Weak) if x != Weak => Ordering::Less,
        _ => Ordering::Equal,
    }
}

/// Seed of the sampler for one side of one pair. Independent of argument order.
fn pair_seed(seed: u64, a: SolidId, b: SolidId, side: u64) -> u64 {
    let (lo, hi) = if a <= b { (a.0, b.0) } else { (b.0, a.0) };
    seed ^ lo.rotate_left(17) ^ hi.rotate_left(41) ^ side.wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Monte-Carlo estimate of the volume of `a` lying outside `b`.
#[must_use]
pub fn exclusive_volume(a: &PlacedSolid, b: &PlacedSolid, samples: usize, seed: u64) -> f64 {
    if samples == 0 {
        return 0.0;
    }
    let mut rng = StdRng::seed_from_u64(seed);
    let hits = (0..samples)
        .filter(|_| {
            let f = Vector3::new(rng.random::<f64>(), rng.random::<f64>(), rng.random::<f64>());
            let p = a.bounds.point_at(&f);
            a.contains(&p, 0.0) && !b.contains(&p, 0.0)
        })
        .count();
    #[allow(clippy::cast_precision_loss)]
    let fraction = hits as f64 / samples as f64;
    fraction * a.bounds.volume()
}

fn relative_difference(x: f64, y: f64) -> f64 {
    let scale = x.abs().max(y.abs());
    if scale <= 0.0 {
        0.0
    } else {
        (x - y).abs() / scale
    }
}

/// Compares two solids whose bounds overlap.
#[must_use]
pub fn compare(a: &PlacedSolid, b: &PlacedSolid, thresholds: &Thresholds, seed: u64) -> PairOutcome {
    let (ida, idb) = (a.solid.id, b.solid.id);
    let outcome = |a_wins: bool, decided_by: Decider, scores: (f64, f64)| PairOutcome {
        a: ida,
        b: idb,
        winner: if a_wins { ida } else { idb },
        decided_by,
        scores,
    };

    match override_order(a.solid.priority_override, b.solid.priority_override) {
        Ordering::Less => return outcome(true, Decider::Override, (0.0, 0.0)),
        Ordering::Greater => return outcome(false, Decider::Override, (0.0, 0.0)),
        Ordering::Equal => {}
    }

    let n = thresholds.sample_count;
    let sa = exclusive_volume(a, b, n, pair_seed(seed, ida, idb, u64::from(ida > idb)));
    let sb = exclusive_volume(b, a, n, pair_seed(seed, ida, idb, u64::from(idb > ida)));
    if relative_difference(sa, sb) >= thresholds.score_tie_epsilon {
        return outcome(sa > sb, Decider::Sampling, (sa, sb));
    }
    if relative_difference(a.volume, b.volume) >= thresholds.volume_tie_epsilon {
        return outcome(a.volume > b.volume, Decider::Volume, (sa, sb));
    }
    outcome(spatial_order(a, b) == Ordering::Less, Decider::Spatial, (sa, sb))
}

/// Strongest-first order consistent with the pairwise outcomes.
///
/// A solid is placed only after every solid that beat it. When the outcomes
/// form a cycle the solid with the most wins breaks it; remaining ties fall to
/// [`spatial_order`].
fn win_order<'a>(solids: &'a [PlacedSolid], outcomes: &[PairOutcome]) -> Vec<&'a PlacedSolid> {
    let mut wins: BTreeMap<SolidId, usize> = solids.iter().map(|s| (s.solid.id, 0)).collect();
    let mut unplaced_winners: BTreeMap<SolidId, usize> = wins.clone();
    let mut beaten: BTreeMap<SolidId, Vec<SolidId>> = BTreeMap::new();
    for o in outcomes {
        let loser = if o.winner == o.a { o.b } else { o.a };
        *wins.entry(o.winner).or_default() += 1;
        *unplaced_winners.entry(loser).or_default() += 1;
        beaten.entry(o.winner).or_default().push(loser);
    }

    let mut remaining: Vec<&PlacedSolid> = solids.iter().collect();
    let mut order = Vec::with_capacity(solids.len());
    loop {
        let Some(next) = remaining
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                let ready = |s: &PlacedSolid| unplaced_winners[&s.solid.id] == 0;
                ready(b)
                    .cmp(&ready(a))
                    .then_with(|| wins[&b.solid.id].cmp(&wins[&a.solid.id]))
                    .then_with(|| spatial_order(a, b))
            })
            .map(|(i, _)| i)
        else {
            break;
        };
        let chosen = remaining.swap_remove(next);
        for loser in beaten.get(&chosen.solid.id).into_iter().flatten() {
            if let Some(n) = unplaced_winners.get_mut(loser) {
                *n = n.saturating_sub(1);
            }
        }
        order.push(chosen);
    }
    order
}

/// Ranks `solids` from the outcomes of every pair with overlapping bounds.
///
/// Each solid is cut only by the solids that beat it. Pairs are compared in
/// parallel; the result depends only on the solids, the thresholds and `seed`.
#[must_use]
pub fn rank_solids(solids: &[PlacedSolid], thresholds: &Thresholds, seed: u64) -> PriorityRanking {
    let pairs: Vec<(usize, usize)> = (0..solids.len())
        .flat_map(|i| (i + 1..solids.len()).map(move |j| (i, j)))
        .filter(|&(i, j)| solids[i].bounds.overlaps(&solids[j].bounds))
        .collect();
    let outcomes: Vec<PairOutcome> = pairs
        .par_iter()
        .map(|&(i, j)| compare(&solids[i], &solids[j], thresholds, seed))
        .collect();
    for o in &outcomes {
        debug!(a = %o.a, b = %o.b, winner = %o.winner, decided_by = ?o.decided_by, "priority pair");
    }

    let order = win_order(solids, &outcomes);
    let ranks: BTreeMap<SolidId, usize> = order.iter().enumerate().map(|(r, s)| (s.solid.id, r)).collect();

    let mut cutters: BTreeMap<SolidId, Vec<SolidId>> = BTreeMap::new();
    for o in &outcomes {
        let loser = if o.winner == o.a { o.b } else { o.a };
        cutters.entry(loser).or_default().push(o.winner);
    }
    for list in cutters.values_mut() {
        list.sort_by_key(|id| ranks[id]);
    }

    PriorityRanking {
        ranks,
        cutters,
        order: order.iter().map(|s| s.solid.id).collect(),
        pairs: outcomes,
    }
}
