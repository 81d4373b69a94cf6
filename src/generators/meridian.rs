//! Unrolled meridian profiles measured in the scaled meridian plane.
//!
//! A profile is a chain of segments in `(radius, axial)` local coordinates.
//! Arc length is measured after scaling the radius by the mean cross-section
//! scale and the axial coordinate by the axial scale, which is the reference
//! meridian every ring spacing is measured on.

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use crate::math::quadrature::{simpson, solve_monotone};
use crate::math::TOLERANCE;

/// Simpson intervals over a full arc segment.
const QUADRATURE_INTERVALS: usize = 128;
const INVERSION_TOLERANCE: f64 = 1e-12;

/// One piece of a meridian profile, in `[radius, axial]` local coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Segment {
    Line { from: [f64; 2], to: [f64; 2] },
    /// Counter-clockwise circular arc; `start < end`, angles measured from `+radius`.
    Arc { center: [f64; 2], radius: f64, start: f64, end: f64 },
}

impl Segment {
    fn point(&self, param: f64) -> [f64; 2] {
        match *self {
            Self::Line { from, to } => [
                from[0] + (to[0] - from[0]) * param,
                from[1] + (to[1] - from[1]) * param,
            ],
            Self::Arc { center, radius, .. } => [
                center[0] + radius * param.cos(),
                center[1] + radius * param.sin(),
            ],
        }
    }

    /// Outward side of a flat (constant-axial) line: `-1` below, `+1` above.
    fn cap_side(&self) -> Option<f64> {
        match *self {
            Self::Line { from, to }
                if (to[1] - from[1]).abs() < TOLERANCE && (to[0] - from[0]).abs() > TOLERANCE =>
            {
                // Outward normal of direction (dr, dt) is (dt, -dr).
                Some(-(to[0] - from[0]).signum())
            }
            _ => None,
        }
    }

    /// Largest radius on the segment and the first and last parameters reaching it.
    fn radial_peak(&self) -> (f64, f64, f64) {
        match *self {
            Self::Line { from, to } => {
                if (from[0] - to[0]).abs() < TOLERANCE {
                    (from[0], 0.0, 1.0)
                } else if from[0] > to[0] {
                    (from[0], 0.0, 0.0)
                } else {
                    (to[0], 1.0, 1.0)
                }
            }
            Self::Arc { center, radius, start, end } => {
                let k = (start / TAU).ceil();
                let zero = k * TAU;
                if zero <= end {
                    (center[0] + radius, zero, zero)
                } else {
                    let (a, b) = (self.point(start)[0], self.point(end)[0]);
                    if a >= b {
                        (a, start, start)
                    } else {
                        (b, end, end)
                    }
                }
            }
        }
    }
}

/// A point on the meridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeridianPoint {
    /// Local profile radius.
    pub radius: f64,
    /// Local axial coordinate.
    pub axial: f64,
    /// Outward side of a flat cap, if the point lies on one.
    pub cap_side: Option<f64>,
}

/// A profile together with its scaled arc-length parameterisation.
#[derive(Debug, Clone)]
pub struct Meridian {
    segments: Vec<Segment>,
    starts: Vec<f64>,
    lengths: Vec<f64>,
    radial_scale: f64,
    axial_scale: f64,
    numeric: bool,
    closed: bool,
}

impl Meridian {
    /// Builds a meridian. With `numeric` set, arcs are always integrated
    /// numerically even when the scaled arc is circular.
    #[must_use]
    pub fn new(
        segments: Vec<Segment>,
        radial_scale: f64,
        axial_scale: f64,
        closed: bool,
        numeric: bool,
    ) -> Self {
        let mut meridian = Self {
            segments,
            starts: Vec::new(),
            lengths: Vec::new(),
            radial_scale,
            axial_scale,
            numeric,
            closed,
        };
        let mut acc = 0.0;
        for i in 0..meridian.segments.len() {
            let len = meridian.segment_length(i);
            meridian.starts.push(acc);
            meridian.lengths.push(len);
            acc += len;
        }
        meridian
    }

    #[must_use]
    pub fn total_length(&self) -> f64 {
        self.starts.last().zip(self.lengths.last()).map_or(0.0, |(s, l)| s + l)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn is_circular(&self) -> bool {
        !self.numeric
            && (self.radial_scale - self.axial_scale).abs()
                <= 1e-12 * self.radial_scale.max(self.axial_scale)
    }

    fn arc_speed(&self, radius: f64, theta: f64) -> f64 {
        radius * (self.radial_scale * theta.sin()).hypot(self.axial_scale * theta.cos())
    }

    /// Scaled arc length from the start of segment `i` to parameter `param`.
    fn length_to(&self, i: usize, param: f64) -> f64 {
        match self.segments[i] {
            Segment::Line { from, to } => {
                let d = (self.radial_scale * (to[0] - from[0])).hypot(self.axial_scale * (to[1] - from[1]));
                d * param
            }
            Segment::Arc { radius, start, end, .. } => {
                if self.is_circular() {
                    return self.radial_scale * radius * (param - start);
                }
                let span = (end - start).abs().max(TOLERANCE);
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
                let intervals = ((QUADRATURE_INTERVALS as f64) * (param - start).abs() / span).ceil() as usize;
                simpson(|t| self.arc_speed(radius, t), start, param, intervals.max(8))
            }
        }
    }

    fn segment_length(&self, i: usize) -> f64 {
        match self.segments[i] {
            Segment::Line { .. } => self.length_to(i, 1.0),
            Segment::Arc { end, .. } => self.length_to(i, end),
        }
    }

    /// Segment parameter at scaled arc length `local` from the segment start.
    fn param_at(&self, i: usize, local: f64) -> f64 {
        let len = self.lengths[i];
        match self.segments[i] {
            Segment::Line { .. } => {
                if len < TOLERANCE {
                    0.0
                } else {
                    (local / len).clamp(0.0, 1.0)
                }
            }
            Segment::Arc { radius, start, end, .. } => {
                if self.is_circular() {
                    return (start + local / (self.radial_scale * radius)).clamp(start, end);
                }
                solve_monotone(
                    |t| self.length_to(i, t),
                    |t| self.arc_speed(radius, t),
                    local,
                    start,
                    end,
                    INVERSION_TOLERANCE,
                )
            }
        }
    }

    fn segment_index(&self, s: f64) -> usize {
        match self.starts.binary_search_by(|x| x.total_cmp(&s)) {
            Ok(i) => i,
            Err(i) => i.saturating_sub(1),
        }
        .min(self.segments.len().saturating_sub(1))
    }

    /// Point at scaled arc length `s`, clamped to the meridian.
    #[must_use]
    pub fn point_at(&self, s: f64) -> Option<MeridianPoint> {
        if self.segments.is_empty() {
            return None;
        }
        let s = s.clamp(0.0, self.total_length());
        let i = self.segment_index(s);
        let segment = &self.segments[i];
        let [radius, axial] = segment.point(self.param_at(i, s - self.starts[i]));
        Some(MeridianPoint {
            radius,
            axial,
            cap_side: segment.cap_side(),
        })
    }

    /// Arc positions of the first and last points of largest radius.
    #[must_use]
    pub fn radial_peaks(&self) -> (f64, f64) {
        let peaks: Vec<(f64, f64, f64)> = (0..self.segments.len())
            .map(|i| {
                let (r, first, last) = self.segments[i].radial_peak();
                (r, self.starts[i] + self.length_to(i, first), self.starts[i] + self.length_to(i, last))
            })
            .collect();
        let max = peaks.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
        let reaching = |p: &&(f64, f64, f64)| p.0 >= max - 1e-9;
        let first = peaks.iter().find(reaching).map_or(0.0, |p| p.1);
        let last = peaks.iter().rev().find(reaching).map_or(0.0, |p| p.2);
        (first, last)
    }

    /// Smallest and largest local axial coordinates of the profile.
    #[must_use]
    pub fn axial_range(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for segment in &self.segments {
            let (a, b) = match *segment {
                Segment::Line { from, to } => (from[1].min(to[1]), from[1].max(to[1])),
                Segment::Arc { center, radius, start, end } => {
                    let (ya, yb) = (segment.point(start)[1], segment.point(end)[1]);
                    let (mut a, mut b) = (ya.min(yb), ya.max(yb));
                    // Axial extremes of a circle sit at odd multiples of a quarter turn.
                    for k in -4..=4 {
                        let theta = FRAC_PI_2 + PI * f64::from(k);
                        if theta >= start && theta <= end {
                            let y = center[1] + radius * theta.sin();
                            a = a.min(y);
                            b = b.max(y);
                        }
                    }
                    (a, b)
                }
            };
            lo = lo.min(a);
            hi = hi.max(b);
        }
        (lo, hi)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn half_circle() -> Vec<Segment> {
        vec![Segment::Arc { center: [0.0, 0.0], radius: 1.0, start: -FRAC_PI_2, end: FRAC_PI_2 }]
    }

    fn cylinder() -> Vec<Segment> {
        vec![
            Segment::Line { from: [0.0, -1.0], to: [1.0, -1.0] },
            Segment::Line { from: [1.0, -1.0], to: [1.0, 1.0] },
            Segment::Line { from: [1.0, 1.0], to: [0.0, 1.0] },
        ]
    }

    #[test]
    fn numeric_and_closed_form_agree_on_circles() {
        let closed = Meridian::new(half_circle(), 2.0, 2.0, false, false);
        let numeric = Meridian::new(half_circle(), 2.0, 2.0, false, true);
        assert_relative_eq!(closed.total_length(), 2.0 * PI, epsilon = 1e-12);
        assert_relative_eq!(numeric.total_length(), 2.0 * PI, epsilon = 1e-9);
        let a = closed.point_at(1.3).unwrap();
        let b = numeric.point_at(1.3).unwrap();
        assert_relative_eq!(a.axial, b.axial, epsilon = 1e-9);
    }

    #[test]
    fn elliptic_meridian_inverts_its_own_length() {
        let m = Meridian::new(half_circle(), 3.0, 1.0, false, true);
        let total = m.total_length();
        // Quarter-ellipse arc lengths with semi-axes 3 and 1 sum to half the perimeter.
        assert_relative_eq!(total, 0.5 * crate::geometry::ellipse_perimeter(3.0, 1.0), epsilon = 1e-6);
        for s in [0.1, 0.9, 2.0, 3.5] {
            let p = m.point_at(s).unwrap();
            let theta = p.axial.asin();
            assert_relative_eq!(m.length_to(0, theta), s, epsilon = 1e-8);
        }
    }

    #[test]
    fn cylinder_caps_and_peaks() {
        let m = Meridian::new(cylinder(), 2.0, 0.5, false, false);
        assert_relative_eq!(m.total_length(), 2.0 + 1.0 + 2.0, epsilon = 1e-12);
        let (first, last) = m.radial_peaks();
        assert_relative_eq!(first, 2.0, epsilon = 1e-12);
        assert_relative_eq!(last, 3.0, epsilon = 1e-12);
        assert_eq!(m.point_at(1.0).unwrap().cap_side, Some(-1.0));
        assert_eq!(m.point_at(2.5).unwrap().cap_side, None);
        assert_eq!(m.point_at(4.0).unwrap().cap_side, Some(1.0));
        assert_eq!(m.axial_range(), (-1.0, 1.0));
    }

    #[test]
    fn torus_tube_range_and_peak() {
        let m = Meridian::new(
            vec![Segment::Arc { center: [0.75, 0.0], radius: 0.25, start: -FRAC_PI_2, end: 3.0 * FRAC_PI_2 }],
            1.0,
            1.0,
            true,
            false,
        );
        assert!(m.is_closed());
        let (lo, hi) = m.axial_range();
        assert_relative_eq!(lo, -0.25, epsilon = 1e-12);
        assert_relative_eq!(hi, 0.25, epsilon = 1e-12);
        let (first, _) = m.radial_peaks();
        assert_relative_eq!(m.point_at(first).unwrap().radius, 1.0, epsilon = 1e-12);
    }
}
