//! Yarn gauge: maps a yarn level to world-space stitch dimensions.

use super::profile::StitchProfile;

pub const MIN_YARN_LEVEL: u8 = 1;
pub const MAX_YARN_LEVEL: u8 = 8;

/// Base yarn width at level 1, in world units.
const FINEST_YARN_WIDTH: f64 = 0.04;
/// Width added per yarn level.
const YARN_WIDTH_STEP: f64 = 0.02;
/// Round height of a single crochet stitch relative to its yarn width.
const STEP_HEIGHT_RATIO: f64 = 1.2;

/// World-space stitch dimensions for one pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gauge {
    /// Base yarn width.
    pub yarn_width: f64,
    /// Spacing between consecutive rings along the surface.
    pub step_height: f64,
    /// Gap left between neighbouring stitches.
    pub edge_gap: f64,
}

impl Gauge {
    /// Gauge for a yarn level (clamped) and the primary stitch's profile.
    #[must_use]
    pub fn new(yarn_level: u8, primary: &StitchProfile, edge_gap_fraction: f64) -> Self {
        let yarn_width = base_yarn_width(yarn_level);
        Self {
            yarn_width,
            step_height: STEP_HEIGHT_RATIO * yarn_width * primary.height_multiplier,
            edge_gap: edge_gap_fraction * yarn_width,
        }
    }

    /// Visual width of a stitch along the ring.
    #[must_use]
    pub fn visual_width(&self, profile: &StitchProfile) -> f64 {
        self.yarn_width * profile.width_multiplier
    }

    /// Centre-to-centre spacing of two neighbouring stitches of this profile.
    #[must_use]
    pub fn spacing(&self, profile: &StitchProfile) -> f64 {
        self.edge_gap + self.visual_width(profile)
    }

    /// Centre-to-centre spacing between two neighbouring stitches of
    /// different profiles: the edge gap plus half of each visual width.
    #[must_use]
    pub fn pair_spacing(&self, a: &StitchProfile, b: &StitchProfile) -> f64 {
        self.edge_gap + 0.5 * (self.visual_width(a) + self.visual_width(b))
    }
}

/// Base yarn width of a level; levels outside 1 to 8 are clamped.
#[must_use]
pub fn base_yarn_width(level: u8) -> f64 {
    let level = level.clamp(MIN_YARN_LEVEL, MAX_YARN_LEVEL);
    FINEST_YARN_WIDTH + YARN_WIDTH_STEP * f64::from(level - MIN_YARN_LEVEL)
}
