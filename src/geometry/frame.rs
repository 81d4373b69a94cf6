use crate::error::{GeometryError, Result};
use crate::math::pose::{axis_column, transform_point};
use crate::math::{Axis, Matrix4, Point3, Vector3, TOLERANCE};

use super::containment::{classify_local, PointClassification};
use super::volume::world_volume;
use super::{Aabb, Solid, SolidKind};

/// A solid together with everything derived from its pose for one pass.
///
/// Built once per solid per pass and shared read-only between stages.
#[derive(Debug, Clone)]
pub struct PlacedSolid {
    pub solid: Solid,
    pub transform: Matrix4,
    pub inverse: Matrix4,
    pub bounds: Aabb,
    pub volume: f64,
    /// Smallest of the three column lengths.
    pub min_scale: f64,
}

impl PlacedSolid {
    /// Places a solid, rejecting collapsed or non-invertible transforms.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::SingularTransform`] if the pose cannot be inverted
    /// or any scale axis has collapsed.
    pub fn new(solid: &Solid) -> Result<Self> {
        let transform = solid.transform();
        let min_scale = [Axis::X, Axis::Y, Axis::Z]
            .iter()
            .map(|a| axis_column(&transform, *a).norm())
            .fold(f64::INFINITY, f64::min);
        if !min_scale.is_finite() || min_scale < TOLERANCE {
            return Err(GeometryError::SingularTransform.into());
        }
        let inverse = transform
            .try_inverse()
            .ok_or(GeometryError::SingularTransform)?;
        let (lo, hi) = solid.kind.local_bounds();
        Ok(Self {
            solid: solid.clone(),
            bounds: Aabb::transformed(&lo, &hi, &transform),
            volume: world_volume(solid.kind, &transform),
            transform,
            inverse,
            min_scale,
        })
    }

    /// Maps a world point into the solid's local frame.
    #[must_use]
    pub fn to_local(&self, world: &Point3) -> Point3 {
        transform_point(&self.inverse, world)
    }

    /// Classifies a world point against the solid shrunk inward by `margin`
    /// world units.
    #[must_use]
    pub fn classify(&self, world: &Point3, margin: f64) -> PointClassification {
        classify_local(self.solid.kind, &self.to_local(world), margin / self.min_scale)
    }

    /// Returns `true` when `world` is strictly inside the shrunk solid.
    #[must_use]
    pub fn contains(&self, world: &Point3, margin: f64) -> bool {
        self.classify(world, margin) == PointClassification::Inside
    }
}

/// Orthogonal slicing frame of a placed solid along one of its local axes.
#[derive(Debug, Clone)]
pub struct SolidFrame {
    pub kind: SolidKind,
    pub transform: Matrix4,
    /// Local axis the rings stack along.
    pub axis: Axis,
    /// Unit world direction of the slicing axis.
    pub axis_dir: Vector3,
    /// World length of one local unit along the slicing axis.
    pub axial_scale: f64,
    /// World lengths of one local unit along the two cross-section axes,
    /// in [`Axis::others`] order.
    pub radial_scales: (f64, f64),
    /// World position of the local origin.
    pub origin: Point3,
}

impl SolidFrame {
    /// Builds the frame for slicing `placed` along `axis`.
    ///
    /// # Errors
    ///
    /// Returns an error if the slicing axis column has zero length.
    pub fn new(placed: &PlacedSolid, axis: Axis) -> Result<Self> {
        let transform = placed.transform;
        let column = axis_column(&transform, axis);
        let axial_scale = column.norm();
        if axial_scale < TOLERANCE {
            return Err(GeometryError::ZeroVector.into());
        }
        let (u, v) = axis.others();
        Ok(Self {
            kind: placed.solid.kind,
            transform,
            axis,
            axis_dir: column / axial_scale,
            axial_scale,
            radial_scales: (
                axis_column(&transform, u).norm(),
                axis_column(&transform, v).norm(),
            ),
            origin: transform_point(&transform, &Point3::origin()),
        })
    }

    /// Mean of the two cross-section scales; the radial scale of the
    /// reference meridian.
    #[must_use]
    pub fn mean_radial_scale(&self) -> f64 {
        0.5 * (self.radial_scales.0 + self.radial_scales.1)
    }

    /// Ratio of the larger to the smaller cross-section scale.
    #[must_use]
    pub fn cross_section_ratio(&self) -> f64 {
        let (a, b) = self.radial_scales;
        a.max(b) / a.min(b).max(TOLERANCE)
    }

    /// Builds a local point from cross-section coordinates and an axial offset.
    #[must_use]
    pub fn local_point(&self, u: f64, v: f64, axial: f64) -> Point3 {
        let (ua, va) = self.axis.others();
        let mut p = Point3::origin();
        p[ua.index()] = u;
        p[va.index()] = v;
        p[self.axis.index()] = axial;
        p
    }

    /// Maps a local point into world space.
    #[must_use]
    pub fn to_world(&self, local: &Point3) -> Point3 {
        transform_point(&self.transform, local)
    }

    /// World point from cross-section coordinates and an axial offset.
    #[must_use]
    pub fn world_point(&self, u: f64, v: f64, axial: f64) -> Point3 {
        self.to_world(&self.local_point(u, v, axial))
    }

    /// World semi-axis vectors of a unit cross-section.
    #[must_use]
    pub fn cross_section_axes(&self) -> (Vector3, Vector3) {
        let (u, v) = self.axis.others();
        (axis_column(&self.transform, u), axis_column(&self.transform, v))
    }

    /// Position of a world point along the slicing axis; used as ring sort key.
    #[must_use]
    pub fn sort_key(&self, world: &Point3) -> f64 {
        world.coords.dot(&self.axis_dir)
    }
}
