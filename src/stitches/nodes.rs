//! Stitch nodes along ring polylines.

use nalgebra::Rotation3;
use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::diagnostics::Diagnostics;
use crate::geometry::SolidId;
use crate::math::{polyline, Point3, UnitQuaternion, Vector3, TOLERANCE};
use crate::model::Ring;
use crate::settings::Settings;

use super::gauge::Gauge;
use super::profile::{self, StitchProfile};

/// Slack on length comparisons when counting nodes.
const FIT_EPSILON: f64 = 1e-9;

new_key_type! {
    /// Key of a node in a stitch plan.
    pub struct NodeId;
}

/// One stitch on a ring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// Index of the ring in the layer stack.
    pub layer: usize,
    pub solid: SolidId,
    pub position: Point3,
    /// Unit direction along the ring.
    pub tangent: Vector3,
    /// Unit direction off the surface.
    pub normal: Vector3,
    /// Rotation taking local `(x, y, z)` to `(tangent, normal, tangent x normal)`.
    pub orientation: UnitQuaternion,
    pub stitch_type: String,
    pub stitch_profile: StitchProfile,
}

/// Whether a ring's stitches fit its length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FitResult {
    /// Nominal offsets were multiplied by `scale` (1 unless stretched).
    Fits { scale: f64 },
    /// Offsets were compressed by `scale < 1` to fit `available`.
    DoesNotFit { scale: f64, required: f64, available: f64 },
}

impl FitResult {
    #[must_use]
    pub fn fits(&self) -> bool {
        matches!(self, Self::Fits { .. })
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        match *self {
            Self::Fits { scale } | Self::DoesNotFit { scale, .. } => scale,
        }
    }

    /// The more constrained of two results.
    #[must_use]
    pub fn worst(self, other: Self) -> Self {
        match (self.fits(), other.fits()) {
            (true, false) => other,
            (false, true) => self,
            _ if other.scale() < self.scale() => other,
            _ => self,
        }
    }
}

impl Default for FitResult {
    fn default() -> Self {
        Self::Fits { scale: 1.0 }
    }
}

/// The stitch pattern repeated around every ring, with its gauge.
#[derive(Debug, Clone)]
pub struct StitchCycle {
    entries: Vec<(String, StitchProfile)>,
    gauge: Gauge,
}

impl StitchCycle {
    /// Resolves the settings' stitch pattern. Unknown keys fall back to the
    /// default profile, each with a diagnostic.
    #[must_use]
    pub fn new(settings: &Settings, gauge: Gauge, diagnostics: &mut Diagnostics) -> Self {
        let mut entries: Vec<(String, StitchProfile)> =
            settings.pattern().into_iter().map(|key| profile::resolve(key, diagnostics)).collect();
        if entries.is_empty() {
            entries.push((profile::DEFAULT_STITCH.to_owned(), StitchProfile::default()));
        }
        Self { entries, gauge }
    }

    /// Stitch type and profile of node `i`.
    #[must_use]
    pub fn entry(&self, i: usize) -> (&str, &StitchProfile) {
        let (key, profile) = &self.entries[i % self.entries.len()];
        (key.as_str(), profile)
    }

    /// Spacing between nodes `i` and `j`.
    fn pair(&self, i: usize, j: usize) -> f64 {
        self.gauge.pair_spacing(self.entry(i).1, self.entry(j).1)
    }

    /// Spacing of the first stitch in the pattern.
    #[must_use]
    pub fn primary_spacing(&self) -> f64 {
        self.gauge.spacing(self.entry(0).1)
    }

    /// Length `n` nodes need along a closed or open polyline.
    #[must_use]
    pub fn required(&self, n: usize, closed: bool) -> f64 {
        if n == 0 {
            return 0.0;
        }
        let open: f64 = (1..n).map(|i| self.pair(i - 1, i)).sum();
        if closed {
            open + self.pair(n - 1, 0)
        } else {
            open
        }
    }

    /// Largest node count whose required length fits `length`.
    ///
    /// A single closed stitch of the primary type is `floor(L / spacing)`; an
    /// open polyline holds one more node than it has gaps.
    #[must_use]
    pub fn natural_count(&self, length: f64, closed: bool) -> usize {
        let limit = length + FIT_EPSILON * (1.0 + length);
        let mut best = usize::from(!closed);
        let mut open = 0.0;
        let mut n = 1;
        loop {
            if n > 1 {
                open += self.pair(n - 2, n - 1);
            }
            if open > limit {
                return best;
            }
            let needed = if closed { open + self.pair(n - 1, 0) } else { open };
            if needed <= limit {
                best = n;
            }
            n += 1;
        }
    }

    /// Nominal arc offset of every node when `n` nodes are placed.
    fn offsets(&self, n: usize) -> Vec<f64> {
        let mut out = Vec::with_capacity(n);
        let mut s = 0.0;
        for i in 0..n {
            if i > 0 {
                s += self.pair(i - 1, i);
            }
            out.push(s);
        }
        out
    }
}

/// A node position sampled on a polyline.
#[derive(Debug, Clone, Copy)]
pub struct Placement {
    pub position: Point3,
    pub tangent: Vector3,
    /// Index of the node in the cycle.
    pub index: usize,
}

/// Places `count` nodes along `points`.
///
/// Nodes sit at their nominal pattern offsets. With `stretch`, a closed
/// polyline's offsets are scaled up so the nodes cover the whole loop. When the
/// nodes need more length than the polyline has, offsets are compressed and the
/// result is [`FitResult::DoesNotFit`].
#[must_use]
pub fn place(points: &[Point3], count: usize, cycle: &StitchCycle, stretch: bool) -> (Vec<Placement>, FitResult) {
    let closed = polyline::is_closed(points);
    let cumulative = polyline::cumulative_lengths(points);
    let available = cumulative.last().copied().unwrap_or(0.0);
    let required = cycle.required(count, closed);
    if count == 0 || points.len() < 2 {
        return (Vec::new(), FitResult::default());
    }

    let fit = if required > available + FIT_EPSILON * (1.0 + available) {
        FitResult::DoesNotFit {
            scale: available / required,
            required,
            available,
        }
    } else if stretch && closed && required > TOLERANCE {
        FitResult::Fits {
            scale: available / required,
        }
    } else {
        FitResult::Fits { scale: 1.0 }
    };
    let scale = fit.scale();

    let placements = cycle
        .offsets(count)
        .into_iter()
        .enumerate()
        .filter_map(|(index, offset)| {
            let s = if closed { (offset * scale) % available.max(TOLERANCE) } else { offset * scale };
            let sample = polyline::sample_at(points, &cumulative, s)?;
            Some(Placement {
                position: sample.point,
                tangent: sample.tangent,
                index,
            })
        })
        .collect();
    (placements, fit)
}

/// Outward normal and orientation of a node on `ring`.
///
/// Cap rings use their cap normal; side rings push away from the slicing axis
/// through the ring centre. The normal is made orthogonal to the tangent.
#[must_use]
pub fn orientation(tangent: &Vector3, position: &Point3, ring: &Ring) -> (Vector3, UnitQuaternion) {
    let axis = ring.meta.axis;
    let t = tangent.try_normalize(TOLERANCE).unwrap_or_else(|| any_perpendicular(&axis));
    let radial = {
        let d = position - ring.meta.center;
        d - axis * d.dot(&axis)
    };
    let candidates = [ring.meta.cap_normal.unwrap_or(radial), radial, -axis, any_perpendicular(&t)];
    let n = candidates
        .iter()
        .find_map(|c| (c - t * c.dot(&t)).try_normalize(1e-9))
        .unwrap_or_else(|| any_perpendicular(&t));
    let b = t.cross(&n);
    let rotation = Rotation3::from_basis_unchecked(&[t, n, b]);
    (n, UnitQuaternion::from_rotation_matrix(&rotation))
}

/// A unit vector perpendicular to `v`.
fn any_perpendicular(v: &Vector3) -> Vector3 {
    let helper = if v.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    v.cross(&helper).try_normalize(TOLERANCE).unwrap_or_else(Vector3::z)
}
