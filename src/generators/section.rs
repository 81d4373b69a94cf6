use crate::geometry::{ellipse_perimeter, Ellipse, SolidFrame};
use crate::math::Point3;

/// Ring points per stitch spacing along the ring.
const POINTS_PER_SPACING: f64 = 6.0;
const MIN_RING_SEGMENTS: usize = 32;
const MAX_RING_SEGMENTS: usize = 2048;

/// Cross-section of a profile-swept solid at one meridian radius.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionShape {
    /// Ellipse with semi-axes `radius * su` and `radius * sv`.
    Ellipse,
    /// Axis-aligned square of half-width `radius`, scaled per axis.
    Square,
}

impl SectionShape {
    /// World perimeter of the section at local `radius` under cross-section
    /// scales `su`, `sv`.
    #[must_use]
    pub fn perimeter(self, radius: f64, su: f64, sv: f64) -> f64 {
        match self {
            Self::Ellipse => ellipse_perimeter(radius * su, radius * sv),
            Self::Square => 4.0 * radius * (su + sv),
        }
    }

    /// Closed world polyline of the section at `radius`, `axial`.
    #[must_use]
    pub fn ring(self, frame: &SolidFrame, radius: f64, axial: f64, segments: usize) -> Vec<Point3> {
        match self {
            Self::Ellipse => {
                let (u, v) = frame.cross_section_axes();
                Ellipse::new(frame.world_point(0.0, 0.0, axial), u * radius, v * radius).to_polyline(segments)
            }
            Self::Square => {
                let r = radius;
                let corners = [(r, 0.0), (r, r), (-r, r), (-r, -r), (r, -r), (r, 0.0)];
                let per_leg = (segments / 8).max(1);
                let mut points = Vec::with_capacity(per_leg * 8 + 1);
                for (k, w) in corners.windows(2).enumerate() {
                    let ((u0, v0), (u1, v1)) = (w[0], w[1]);
                    // The first and last legs are half-length.
                    let steps = if k == 0 || k == 4 { per_leg } else { 2 * per_leg };
                    for i in 0..steps {
                        #[allow(clippy::cast_precision_loss)]
                        let t = i as f64 / steps as f64;
                        points.push(frame.world_point(u0 + (u1 - u0) * t, v0 + (v1 - v0) * t, axial));
                    }
                }
                points.push(points[0]);
                points
            }
        }
    }
}

/// Number of ring segments for a section of the given perimeter.
#[must_use]
pub fn ring_segments(perimeter: f64, spacing: f64) -> usize {
    if !(perimeter.is_finite() && spacing > 0.0) {
        return MIN_RING_SEGMENTS;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let n = (perimeter / spacing * POINTS_PER_SPACING).ceil() as usize;
    n.clamp(MIN_RING_SEGMENTS, MAX_RING_SEGMENTS)
}
