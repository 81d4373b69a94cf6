use serde::{Deserialize, Serialize};

use crate::math::pose::transform_point;
use crate::math::{Matrix4, Point3, Vector3};

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    /// Minimum corner of the bounding box.
    pub min: Point3,
    /// Maximum corner of the bounding box.
    pub max: Point3,
}

impl Aabb {
    /// Creates a box from two corners in any order.
    #[must_use]
    pub fn new(a: Point3, b: Point3) -> Self {
        Self {
            min: Point3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z)),
            max: Point3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z)),
        }
    }

    /// Smallest box containing all points, or `None` for an empty set.
    #[must_use]
    pub fn from_points<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Point3>,
    {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        Some(iter.fold(Self::new(first, first), |acc, p| acc.expanded_to(p)))
    }

    /// World bounds of a local box under `transform`, from its eight corners.
    #[must_use]
    pub fn transformed(local_min: &Point3, local_max: &Point3, transform: &Matrix4) -> Self {
        let mut corners = Vec::with_capacity(8);
        for &x in &[local_min.x, local_max.x] {
            for &y in &[local_min.y, local_max.y] {
                for &z in &[local_min.z, local_max.z] {
                    corners.push(transform_point(transform, &Point3::new(x, y, z)));
                }
            }
        }
        // Eight corners are always present.
        Self::from_points(&corners).unwrap_or(Self::new(*local_min, *local_max))
    }

    #[must_use]
    fn expanded_to(self, p: &Point3) -> Self {
        Self {
            min: Point3::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z)),
            max: Point3::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z)),
        }
    }

    /// Returns `true` if the boxes share any volume or touch.
    #[must_use]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
            && self.min.z <= other.max.z
            && self.max.z >= other.min.z
    }

    /// Returns `true` if `p` lies inside or on the box.
    #[must_use]
    pub fn contains(&self, p: &Point3) -> bool {
        (self.min.x..=self.max.x).contains(&p.x)
            && (self.min.y..=self.max.y).contains(&p.y)
            && (self.min.z..=self.max.z).contains(&p.z)
    }

    /// Edge lengths.
    #[must_use]
    pub fn extent(&self) -> Vector3 {
        self.max - self.min
    }

    /// Box volume.
    #[must_use]
    pub fn volume(&self) -> f64 {
        let e = self.extent();
        e.x * e.y * e.z
    }

    /// Box centre.
    #[must_use]
    pub fn center(&self) -> Point3 {
        nalgebra::center(&self.min, &self.max)
    }

    /// Point at fractional coordinates `f` in `[0, 1]^3`.
    #[must_use]
    pub fn point_at(&self, f: &Vector3) -> Point3 {
        self.min + self.extent().component_mul(f)
    }
}
