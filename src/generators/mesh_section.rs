//! Rings by slicing a tessellation of the solid.
//!
//! Sections perpendicular to the slicing axis are sampled across the solid's
//! axial extent. Their perimeters define an equivalent meridian: the profile
//! `(P / 2pi, t)` a solid of revolution with the same sections would have.
//! Rings are marched along that profile by arc length, which is exact for
//! revolved shapes. An end whose first section already has a finite apothem
//! is flat: the profile's cap leg is as long as that apothem, and its rings are
//! the end section scaled toward its centroid so that neighbours sit one step
//! apart on the face.

use std::f64::consts::TAU;

use crate::diagnostics::{Diagnostic, DiagnosticKind, Diagnostics};
use crate::error::{GenerationError, Result};
use crate::geometry::{PlacedSolid, Plane, SolidFrame};
use crate::math::intersect_3d::{line_plane_intersect, LinePlaneRelation};
use crate::math::polygon_3d::centroid;
use crate::math::{polyline, Axis, Point3, JOIN_TOLERANCE, TOLERANCE};
use crate::tessellation::{assemble_polylines, slice_mesh, tessellate_local, TessellationParams, TriangleMesh};

use super::marching::{march, MarchExtent};
use super::{assemble_rings, note_march, pole_markers, GeneratedRings, GenerationContext, RingDraft, RingGenerator};

/// Inset of the end sections, relative to the axial extent.
const END_INSET: f64 = 1e-6;
/// An end section whose apothem exceeds this fraction of the extent marks a
/// flat end.
const FLAT_END_FRACTION: f64 = 1e-2;
const SAMPLES_PER_STEP: f64 = 4.0;
const MIN_SAMPLES: usize = 32;
const MAX_SAMPLES: usize = 2048;

/// Mesh-section rings for any kind with a tessellation.
#[derive(Debug, Clone, Copy, Default)]
pub struct MeshSectionGenerator;

impl RingGenerator for MeshSectionGenerator {
    fn generate(&self, placed: &PlacedSolid, axis: Axis, ctx: &GenerationContext) -> Result<GeneratedRings> {
        let kind = placed.solid.kind;
        let frame = SolidFrame::new(placed, axis)?;
        let mesh = tessellate_local(kind, &TessellationParams::default()).ok_or(GenerationError::Unsupported(kind))?;
        let slicer = Slicer::new(&mesh, &frame);
        let mut diagnostics = Diagnostics::new();

        let Some(profile) = EquivalentProfile::build(&slicer, ctx.step) else {
            diagnostics.push(
                Diagnostic::warning(DiagnosticKind::DegenerateGeometry, "solid has no extent along the slicing axis")
                    .for_solid(placed.solid.id),
            );
            return Ok(GeneratedRings {
                diagnostics,
                ..GeneratedRings::default()
            });
        };

        let (first_peak, last_peak) = profile.radial_peaks();
        let extent = MarchExtent {
            total: profile.total_length(),
            first_peak,
            last_peak,
            closed: false,
        };
        let plan = march(
            |s| profile.perimeter_at(&slicer, s),
            &extent,
            ctx.step,
            ctx.edge_perimeter(),
            ctx.settings.max_rings,
        );
        note_march(&plan, placed, ctx, &mut diagnostics);

        let drafts = plan
            .positions
            .iter()
            .filter_map(|&s| profile.draft_at(&slicer, s))
            .collect();
        let rings = assemble_rings(placed, &frame, drafts, &mut diagnostics);
        Ok(GeneratedRings {
            rings,
            markers: pole_markers(profile.start_pole, profile.end_pole),
            diagnostics,
        })
    }
}

/// Plane sections of one placed mesh.
struct Slicer<'a> {
    mesh: &'a TriangleMesh,
    frame: &'a SolidFrame,
    join: f64,
}

impl<'a> Slicer<'a> {
    fn new(mesh: &'a TriangleMesh, frame: &'a SolidFrame) -> Self {
        let (su, sv) = frame.radial_scales;
        let scale = frame.axial_scale.max(su).max(sv);
        Self {
            mesh,
            frame,
            join: JOIN_TOLERANCE * scale.max(1.0),
        }
    }

    /// Smallest and largest axial coordinate of the placed mesh.
    fn extent(&self) -> Option<(f64, f64)> {
        let (lo, hi) = self
            .mesh
            .vertices
            .iter()
            .map(|v| self.frame.sort_key(&self.frame.to_world(v)))
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), k| (lo.min(k), hi.max(k)));
        (hi - lo > TOLERANCE).then_some((lo, hi))
    }

    /// Section perpendicular to the slicing axis at axial coordinate `t`.
    fn section(&self, t: f64) -> Vec<Vec<Point3>> {
        let a = self.frame.axis_dir;
        let Ok(plane) = Plane::from_normal(Point3::from(a * t), a) else {
            return Vec::new();
        };
        assemble_polylines(&slice_mesh(self.mesh, &self.frame.transform, &plane), self.join)
            .into_iter()
            .filter(|chain| chain.len() >= 2)
            .collect()
    }
}

fn loops_length(loops: &[Vec<Point3>]) -> f64 {
    loops.iter().map(|l| polyline::length(l)).sum()
}

fn loops_centroid(loops: &[Vec<Point3>]) -> Option<Point3> {
    let body: Vec<Point3> = loops
        .iter()
        .flat_map(|l| {
            let end = if polyline::is_closed(l) { l.len() - 1 } else { l.len() };
            l[..end].iter().copied()
        })
        .collect();
    centroid(&body)
}

/// Smallest distance from `center` to the edges of `loops`.
fn section_apothem(loops: &[Vec<Point3>], center: &Point3) -> f64 {
    loops
        .iter()
        .filter_map(|l| polyline::closest_point(l, center))
        .map(|c| c.distance)
        .fold(f64::INFINITY, f64::min)
}

/// The section just inside a flat end.
struct FlatEnd {
    loops: Vec<Vec<Point3>>,
    center: Point3,
    perimeter: f64,
    /// Length of the cap leg: the inset at which the section collapses.
    apothem: f64,
    /// Profile radius at the pole end of the cap leg.
    inner_radius: f64,
    /// `-1` at the start of the axis, `+1` at its end.
    outward: f64,
}

impl FlatEnd {
    /// Scale of the end section at profile radius `radius` on the cap leg.
    fn scale_at(&self, radius: f64) -> f64 {
        ((radius - self.inner_radius) / self.apothem).clamp(0.0, 1.0)
    }
}

/// Perimeter-equivalent meridian, stored as `(radius, t, 0)` points.
struct EquivalentProfile {
    points: Vec<Point3>,
    cumulative: Vec<f64>,
    head: Option<FlatEnd>,
    tail: Option<FlatEnd>,
    start_pole: Point3,
    end_pole: Point3,
}

impl EquivalentProfile {
    fn build(slicer: &Slicer<'_>, step: f64) -> Option<Self> {
        let (t0, t1) = slicer.extent()?;
        let length = t1 - t0;
        let inset = END_INSET * length;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let samples =
            ((length / step.max(TOLERANCE) * SAMPLES_PER_STEP).ceil() as usize).clamp(MIN_SAMPLES, MAX_SAMPLES);

        let mut points = Vec::with_capacity(samples + 2);
        for i in 0..samples {
            #[allow(clippy::cast_precision_loss)]
            let t = t0 + inset + (length - 2.0 * inset) * i as f64 / (samples - 1) as f64;
            points.push(Point3::new(loops_length(&slicer.section(t)) / TAU, t, 0.0));
        }

        let flat_end = |t: f64, rim_radius: f64, outward: f64| {
            let loops = slicer.section(t);
            let perimeter = loops_length(&loops);
            let center = loops_centroid(&loops)?;
            let apothem = section_apothem(&loops, &center);
            if perimeter <= FLAT_END_FRACTION * length || apothem <= FLAT_END_FRACTION * length {
                return None;
            }
            Some(FlatEnd {
                loops,
                center,
                perimeter,
                apothem,
                inner_radius: (rim_radius - apothem).max(0.0),
                outward,
            })
        };
        let (head_rim, tail_rim) = (points.first()?.x, points.last()?.x);
        let head = flat_end(t0 + inset, head_rim, -1.0);
        let tail = flat_end(t1 - inset, tail_rim, 1.0);

        // A flat end's leg spans its apothem. Any other end closes at the rim
        // it already has, or at the axis for a pointed end.
        let end_radius = |flat: Option<&FlatEnd>, rim: f64| {
            flat.map_or(if rim > FLAT_END_FRACTION * length { rim } else { 0.0 }, |f| f.inner_radius)
        };
        points.insert(0, Point3::new(end_radius(head.as_ref(), head_rim), t0, 0.0));
        points.push(Point3::new(end_radius(tail.as_ref(), tail_rim), t1, 0.0));

        // Poles sit on the extreme planes, under the centroid of the end sections.
        let frame = slicer.frame;
        let a = frame.axis_dir;
        let pole = |t: f64, inner: f64| {
            let center = loops_centroid(&slicer.section(inner)).unwrap_or(frame.origin);
            let Ok(extreme) = Plane::from_normal(Point3::from(a * t), a) else {
                return center;
            };
            match line_plane_intersect(&center, &a, &extreme) {
                LinePlaneRelation::Point { point, .. } => point,
                LinePlaneRelation::Parallel | LinePlaneRelation::OnPlane => center,
            }
        };
        let start_pole = pole(t0, t0 + inset);
        let end_pole = pole(t1, t1 - inset);

        let cumulative = polyline::cumulative_lengths(&points);
        Some(Self {
            points,
            cumulative,
            head,
            tail,
            start_pole,
            end_pole,
        })
    }

    fn total_length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Flat end covering profile segment `segment`, if any.
    fn flat_at(&self, segment: usize) -> Option<&FlatEnd> {
        if segment == 0 {
            self.head.as_ref()
        } else if segment + 2 == self.points.len() {
            self.tail.as_ref()
        } else {
            None
        }
    }

    /// Arc positions of the first and last widest samples.
    fn radial_peaks(&self) -> (f64, f64) {
        let max = self.points.iter().map(|p| p.x).fold(0.0, f64::max);
        let tol = 1e-9 * (1.0 + max);
        let first = self.points.iter().position(|p| p.x >= max - tol).unwrap_or(0);
        let last = self.points.iter().rposition(|p| p.x >= max - tol).unwrap_or(0);
        (self.cumulative[first], self.cumulative[last])
    }

    fn perimeter_at(&self, slicer: &Slicer<'_>, s: f64) -> f64 {
        let Some(sample) = polyline::sample_at(&self.points, &self.cumulative, s) else {
            return 0.0;
        };
        if let Some(flat) = self.flat_at(sample.segment) {
            flat.perimeter * flat.scale_at(sample.point.x)
        } else {
            loops_length(&slicer.section(sample.point.y))
        }
    }

    fn draft_at(&self, slicer: &Slicer<'_>, s: f64) -> Option<RingDraft> {
        let sample = polyline::sample_at(&self.points, &self.cumulative, s)?;
        if let Some(flat) = self.flat_at(sample.segment) {
            let f = flat.scale_at(sample.point.x);
            let c = flat.center;
            let loops = flat
                .loops
                .iter()
                .map(|l| l.iter().map(|p| c + (p - c) * f).collect())
                .collect();
            return Some(RingDraft {
                arc_position: s,
                center: c,
                loops,
                cap_normal: Some(slicer.frame.axis_dir * flat.outward),
            });
        }
        let loops = slicer.section(sample.point.y);
        Some(RingDraft {
            arc_position: s,
            center: loops_centroid(&loops)?,
            loops,
            cap_normal: None,
        })
    }
}
