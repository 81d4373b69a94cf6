//! Priority between overlapping solids and clipping of the weaker ones.

mod clip;
mod ranking;

pub use clip::{clip_rings, ClipOutcome, ClipParams};
pub use ranking::{compare, exclusive_volume, rank_solids, spatial_order, Decider, PairOutcome, PriorityRanking};
