//! Crochet geometry for primitive solids.
//!
//! [`GenerateLayers`] slices a set of placed solids into rings (rounds) at the
//! yarn gauge's row height, resolves which solid keeps its rings where two
//! overlap, and clips the weaker ones. [`PlanStitches`] then places oriented
//! stitch nodes on every ring and plans the connectors between rounds,
//! including increases and decreases.

pub mod diagnostics;
pub mod error;
pub mod export;
pub mod generators;
pub mod geometry;
pub mod math;
pub mod model;
pub mod orientation;
pub mod pipeline;
pub mod priority;
pub mod settings;
pub mod stitches;
pub mod tessellation;

pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use error::{Result, StitchgeoError};
pub use geometry::{PriorityOverride, Solid, SolidId, SolidKind};
pub use model::{LayerStats, Pole, PoleRole, Ring, RingMeta, RingRole, SolidMarkers};
pub use pipeline::{CancelToken, GenerateLayers, LayerOutput};
pub use settings::{Distribution, Settings, SliceAxis, Thresholds};
pub use stitches::{PlanStitches, StitchPlan};
