//! Pass settings and tunable thresholds.

use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{ConfigError, Result};
use crate::math::Axis;
use crate::stitches::gauge::{MAX_YARN_LEVEL, MIN_YARN_LEVEL};
use crate::stitches::profile::DEFAULT_STITCH;

/// Local axis the rings of every solid stack along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SliceAxis {
    /// Each kind's profile axis.
    #[default]
    Auto,
    X,
    Y,
    Z,
}

impl SliceAxis {
    /// Resolves the override against a kind's native axis.
    #[must_use]
    pub fn resolve(self, native: Axis) -> Axis {
        match self {
            Self::Auto => native,
            Self::X => Axis::X,
            Self::Y => Axis::Y,
            Self::Z => Axis::Z,
        }
    }
}

/// Placement of increases and decreases around a ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    /// Evenly spaced at the same positions on every ring.
    #[default]
    Even,
    /// Evenly spaced, shifted by a per-layer offset so changes do not stack.
    Jagged,
}

/// Empirically tuned constants, each with a boundary test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    /// Fraction of the pristine circumference above which a clipped ring is
    /// restored to its closed loop.
    pub coverage: f64,
    /// Cross-section scale ratio above which a solid needs an oval start.
    pub oval_ratio: f64,
    /// Relative difference of sampled non-overlap volumes treated as a tie.
    pub score_tie_epsilon: f64,
    /// Relative difference of closed-form volumes treated as a tie.
    pub volume_tie_epsilon: f64,
    /// Sample points per side of a pairwise priority comparison.
    pub sample_count: usize,
    /// Inward cutter margin as a fraction of the base yarn width.
    pub clip_margin_fraction: f64,
    /// Rings shorter than this many stitch spacings are dropped after clipping.
    pub min_ring_length_factor: f64,
    /// Rings with fewer points are dropped after clipping.
    pub min_ring_points: usize,
    /// Gap between neighbouring stitches as a fraction of the base yarn width.
    pub edge_gap_fraction: f64,
    /// Bisection steps when locating a cutter boundary on a ring edge.
    pub boundary_iterations: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            coverage: 0.95,
            oval_ratio: 1.15,
            score_tie_epsilon: 0.02,
            volume_tie_epsilon: 1e-6,
            sample_count: 4000,
            clip_margin_fraction: 0.05,
            min_ring_length_factor: 1.0,
            min_ring_points: 3,
            edge_gap_fraction: 0.1,
            boundary_iterations: 24,
        }
    }
}

/// Settings for one generation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Yarn gauge level, 1 (finest) to 8.
    pub yarn_level: u8,
    /// Stitch key used for every node unless `stitch_pattern` is set.
    pub stitch_type: String,
    /// Repeating stitch keys for mixed rings. Empty means `stitch_type` only.
    pub stitch_pattern: Vec<String>,
    pub slice_axis: SliceAxis,
    /// Largest allowed stitch-count growth between rings, as a fraction.
    pub increase_factor: f64,
    /// Largest allowed stitch-count shrink between rings, as a fraction.
    pub decrease_factor: f64,
    pub distribution: Distribution,
    /// Ring limit per solid.
    pub max_rings: usize,
    pub cross_object_clipping: bool,
    /// Stitches on the first and last ring of a solid.
    pub edge_stitch_count: usize,
    /// Seed for priority sampling.
    pub seed: u64,
    pub thresholds: Thresholds,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            yarn_level: 4,
            stitch_type: DEFAULT_STITCH.to_owned(),
            stitch_pattern: Vec::new(),
            slice_axis: SliceAxis::Auto,
            increase_factor: 1.0,
            decrease_factor: 0.5,
            distribution: Distribution::Even,
            max_rings: 512,
            cross_object_clipping: true,
            edge_stitch_count: 6,
            seed: 0x5EED,
            thresholds: Thresholds::default(),
        }
    }
}

const MAX_INCREASE_FACTOR: f64 = 2.0;
const MAX_DECREASE_FACTOR: f64 = 0.5;
const MIN_EDGE_STITCHES: usize = 3;
const MAX_EDGE_STITCHES: usize = 24;
const MAX_RING_CAP: usize = 10_000;

impl Settings {
    /// Parses settings from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e).into())
    }

    /// Returns a copy with every out-of-range value clamped into range.
    ///
    /// Each adjustment is recorded as a [`DiagnosticKind::SettingsClamped`] entry.
    #[must_use]
    pub fn normalized(&self, diagnostics: &mut Diagnostics) -> Self {
        let mut s = self.clone();
        let defaults = Settings::default();
        let t = Thresholds::default();
        let mut note = |field: &str, from: String, to: String| {
            diagnostics.push(Diagnostic::info(
                DiagnosticKind::SettingsClamped,
                format!("{field} {from} clamped to {to}"),
            ));
        };

        let level = s.yarn_level.clamp(MIN_YARN_LEVEL, MAX_YARN_LEVEL);
        if level != s.yarn_level {
            note("yarn_level", s.yarn_level.to_string(), level.to_string());
            s.yarn_level = level;
        }
        if s.stitch_type.trim().is_empty() {
            note("stitch_type", format!("{:?}", s.stitch_type), DEFAULT_STITCH.to_owned());
            s.stitch_type = DEFAULT_STITCH.to_owned();
        }

        let mut clamp_f64 = |field: &str, value: &mut f64, lo: f64, hi: f64, fallback: f64| {
            let next = if value.is_finite() { value.clamp(lo, hi) } else { fallback };
            if (next - *value).abs() > 0.0 || !value.is_finite() {
                note(field, value.to_string(), next.to_string());
                *value = next;
            }
        };
        clamp_f64("increase_factor", &mut s.increase_factor, 0.0, MAX_INCREASE_FACTOR, defaults.increase_factor);
        clamp_f64("decrease_factor", &mut s.decrease_factor, 0.0, MAX_DECREASE_FACTOR, defaults.decrease_factor);
        let th = &mut s.thresholds;
        clamp_f64("thresholds.coverage", &mut th.coverage, 0.0, 1.0, t.coverage);
        clamp_f64("thresholds.oval_ratio", &mut th.oval_ratio, 1.0, f64::MAX, t.oval_ratio);
        clamp_f64("thresholds.score_tie_epsilon", &mut th.score_tie_epsilon, 0.0, 1.0, t.score_tie_epsilon);
        clamp_f64("thresholds.volume_tie_epsilon", &mut th.volume_tie_epsilon, 0.0, 1.0, t.volume_tie_epsilon);
        clamp_f64("thresholds.clip_margin_fraction", &mut th.clip_margin_fraction, 0.0, 1.0, t.clip_margin_fraction);
        clamp_f64("thresholds.min_ring_length_factor", &mut th.min_ring_length_factor, 0.0, 100.0, t.min_ring_length_factor);
        clamp_f64("thresholds.edge_gap_fraction", &mut th.edge_gap_fraction, 0.0, 10.0, t.edge_gap_fraction);

        let mut clamp_usize = |field: &str, value: &mut usize, lo: usize, hi: usize| {
            let next = (*value).clamp(lo, hi);
            if next != *value {
                note(field, value.to_string(), next.to_string());
                *value = next;
            }
        };
        clamp_usize("max_rings", &mut s.max_rings, 1, MAX_RING_CAP);
        clamp_usize("edge_stitch_count", &mut s.edge_stitch_count, MIN_EDGE_STITCHES, MAX_EDGE_STITCHES);
        let th = &mut s.thresholds;
        clamp_usize("thresholds.sample_count", &mut th.sample_count, 16, 1_000_000);
        clamp_usize("thresholds.min_ring_points", &mut th.min_ring_points, 2, 1_000);
        clamp_usize("thresholds.boundary_iterations", &mut th.boundary_iterations, 1, 64);
        s
    }

    /// Stitch keys in placement order around a ring.
    #[must_use]
    pub fn pattern(&self) -> Vec<&str> {
        if self.stitch_pattern.is_empty() {
            vec![self.stitch_type.as_str()]
        } else {
            self.stitch_pattern.iter().map(String::as_str).collect()
        }
    }
}
