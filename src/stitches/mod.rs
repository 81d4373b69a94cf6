//! Stitch nodes, gauge and the scaffold between rings.

pub mod gauge;
mod nodes;
mod planner;
pub mod profile;
mod scaffold;

pub use gauge::Gauge;
pub use nodes::{orientation, place, FitResult, Node, NodeId, Placement, StitchCycle};
pub use planner::{PlanStitches, StitchPlan};
pub use profile::StitchProfile;
pub use scaffold::{
    count_bounds, distribute, link_slots, target_count, Link, ScaffoldKind, ScaffoldSegment, Transition,
};
