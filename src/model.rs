//! Ring and marker types shared by every stage.

use serde::{Deserialize, Serialize};

use crate::geometry::{SolidId, SolidKind};
use crate::math::{polyline, Point3, Vector3};

/// What part of a solid a ring covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RingRole {
    /// Around the solid's side.
    Side,
    /// A concentric inset ring on a flat cap.
    Cap,
    /// Synthetic starting chain of an oval cross-section.
    OvalStart,
    /// A clipped ring bordering a removed stretch; kept as a connector.
    EdgeArc,
}

/// Per-ring metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RingMeta {
    /// Order of the ring within its solid, from the start pole.
    pub sequence: usize,
    /// Arc length along the reference meridian.
    pub arc_position: f64,
    /// World centre of the slicing section.
    pub center: Point3,
    /// Unit world slicing direction.
    pub axis: Vector3,
    pub role: RingRole,
    /// Set when the ring's polylines are open fragments.
    pub partial: bool,
    /// Closed loop before clipping.
    pub pristine: Vec<Point3>,
    /// Outward normal of a cap ring's plane.
    pub cap_normal: Option<Vector3>,
}

/// One crochet round of one solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    /// Position along the slicing axis used to order layers.
    pub sort_key: f64,
    /// Closed loop, or open fragments when `meta.partial`.
    pub polylines: Vec<Vec<Point3>>,
    pub object_id: SolidId,
    pub object_kind: SolidKind,
    /// Length of the pristine loop.
    pub full_circumference: f64,
    /// `true` while the ring is a single closed loop.
    pub full_loop: bool,
    pub meta: RingMeta,
}

impl Ring {
    /// Total length of all polylines.
    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.polylines.iter().map(|p| polyline::length(p)).sum()
    }

    /// Total number of points over all polylines.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.polylines.iter().map(Vec::len).sum()
    }

    /// Checks the closed-loop invariant: a full loop has exactly one
    /// polyline whose first point equals its last, and anything else is partial.
    #[must_use]
    pub fn satisfies_loop_invariant(&self) -> bool {
        if self.meta.partial {
            return !self.full_loop;
        }
        self.polylines.len() == 1 && polyline::is_closed(&self.polylines[0])
    }
}

/// Role of a pole marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PoleRole {
    Start,
    End,
}

/// Where a solid's rounds begin or end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pole {
    pub position: Point3,
    pub role: PoleRole,
    /// Set when the pole lies inside a cutter's bounds.
    pub intersected: bool,
}

/// Markers of one solid.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SolidMarkers {
    pub poles: Vec<Pole>,
    /// The first round: the oval chain when present, else the first ring.
    pub ring0: Option<Vec<Point3>>,
    /// One closed loop per cutter along the cut boundary.
    pub cut_loops: Vec<Vec<Point3>>,
}

impl SolidMarkers {
    /// The pole tagged `role`, if any.
    #[must_use]
    pub fn pole(&self, role: PoleRole) -> Option<&Pole> {
        self.poles.iter().find(|p| p.role == role)
    }
}

/// Summary counts of a layer stack.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerStats {
    pub layer_count: usize,
    /// Polylines over all layers.
    pub total_line_count: usize,
}
