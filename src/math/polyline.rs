//! Arc-length helpers for open and closed 3D polylines.
//!
//! A closed polyline repeats its first point as its last point; every helper
//! here relies on that convention instead of a separate flag.

use super::{Point3, Vector3, JOIN_TOLERANCE, TOLERANCE};

/// Returns `true` when the polyline's last point coincides with its first.
#[must_use]
pub fn is_closed(points: &[Point3]) -> bool {
    match (points.first(), points.last()) {
        (Some(a), Some(b)) if points.len() > 2 => (a - b).norm() <= JOIN_TOLERANCE,
        _ => false,
    }
}

/// Total length of the polyline.
#[must_use]
pub fn length(points: &[Point3]) -> f64 {
    points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}

/// Cumulative arc length at every vertex, starting at zero.
#[must_use]
pub fn cumulative_lengths(points: &[Point3]) -> Vec<f64> {
    let mut out = Vec::with_capacity(points.len());
    let mut acc = 0.0;
    for (i, p) in points.iter().enumerate() {
        if i > 0 {
            acc += (p - points[i - 1]).norm();
        }
        out.push(acc);
    }
    out
}

/// A point sampled on a polyline at a given arc length.
#[derive(Debug, Clone, Copy)]
pub struct PolylineSample {
    pub point: Point3,
    /// Unit direction of the segment containing the sample.
    pub tangent: Vector3,
    /// Index of the segment containing the sample.
    pub segment: usize,
}

/// Samples the polyline at arc length `s` using precomputed cumulative lengths.
///
/// `s` is clamped to `[0, total]`. Zero-length segments are skipped when
/// picking the tangent.
#[must_use]
pub fn sample_at(points: &[Point3], cumulative: &[f64], s: f64) -> Option<PolylineSample> {
    if points.len() < 2 || cumulative.len() != points.len() {
        return None;
    }
    let total = *cumulative.last()?;
    let s = s.clamp(0.0, total);
    let seg = match cumulative.binary_search_by(|c| c.total_cmp(&s)) {
        Ok(i) => i.min(points.len() - 2),
        Err(i) => i.saturating_sub(1).min(points.len() - 2),
    };
    let seg = first_non_degenerate(points, seg);
    let a = points[seg];
    let b = points[seg + 1];
    let len = (b - a).norm();
    let t = if len < TOLERANCE {
        0.0
    } else {
        ((s - cumulative[seg]) / len).clamp(0.0, 1.0)
    };
    let tangent = if len < TOLERANCE {
        Vector3::zeros()
    } else {
        (b - a) / len
    };
    Some(PolylineSample {
        point: a + (b - a) * t,
        tangent,
        segment: seg,
    })
}

fn first_non_degenerate(points: &[Point3], seg: usize) -> usize {
    let last = points.len() - 2;
    let mut i = seg;
    while i < last && (points[i + 1] - points[i]).norm() < TOLERANCE {
        i += 1;
    }
    if (points[i + 1] - points[i]).norm() >= TOLERANCE {
        return i;
    }
    let mut j = seg;
    while j > 0 && (points[j + 1] - points[j]).norm() < TOLERANCE {
        j -= 1;
    }
    j
}

/// Result of a closest point query against a polyline.
#[derive(Debug, Clone, Copy)]
pub struct ClosestPointResult {
    /// The closest point on the polyline.
    pub point: Point3,
    /// Arc length of the closest point from the polyline start.
    pub parameter: f64,
    /// The distance from the query point to the closest point.
    pub distance: f64,
}

/// Finds the closest point on a polyline to `query`.
#[must_use]
pub fn closest_point(points: &[Point3], query: &Point3) -> Option<ClosestPointResult> {
    match points.len() {
        0 => None,
        1 => Some(ClosestPointResult {
            point: points[0],
            parameter: 0.0,
            distance: (query - points[0]).norm(),
        }),
        _ => {
            let mut best: Option<ClosestPointResult> = None;
            let mut acc = 0.0;
            for w in points.windows(2) {
                let ab = w[1] - w[0];
                let len_sq = ab.norm_squared();
                let t = if len_sq < TOLERANCE * TOLERANCE {
                    0.0
                } else {
                    ((query - w[0]).dot(&ab) / len_sq).clamp(0.0, 1.0)
                };
                let point = w[0] + ab * t;
                let distance = (query - point).norm();
                if best.map_or(true, |b| distance < b.distance) {
                    best = Some(ClosestPointResult {
                        point,
                        parameter: acc + len_sq.sqrt() * t,
                        distance,
                    });
                }
                acc += len_sq.sqrt();
            }
            best
        }
    }
}

/// Splits a polyline into the maximal runs of points accepted by `keep`.
///
/// Where a run meets a rejected point, `boundary(accepted, rejected)` supplies
/// the run's end point on that edge. A closed polyline is walked from a
/// rejected point, so no run is broken at the seam. A polyline accepted
/// everywhere is returned whole; one rejected everywhere yields nothing.
pub fn split_runs<K, B>(points: &[Point3], keep: K, mut boundary: B) -> Vec<Vec<Point3>>
where
    K: Fn(&Point3) -> bool,
    B: FnMut(&Point3, &Point3) -> Point3,
{
    let closed = is_closed(points);
    let body = if closed { &points[..points.len() - 1] } else { points };
    let flags: Vec<bool> = body.iter().map(&keep).collect();
    let Some(first_rejected) = flags.iter().position(|&f| !f) else {
        return vec![points.to_vec()];
    };
    let n = body.len();
    let order: Vec<usize> = if closed {
        (0..=n).map(|k| (first_rejected + k) % n).collect()
    } else {
        (0..n).collect()
    };

    let mut runs = Vec::new();
    let mut current: Vec<Point3> = Vec::new();
    let mut prev: Option<usize> = None;
    for &i in &order {
        match (prev, flags[i]) {
            (Some(p), true) if !flags[p] => {
                current.push(boundary(&body[i], &body[p]));
                current.push(body[i]);
            }
            (_, true) => current.push(body[i]),
            (Some(p), false) if flags[p] => {
                current.push(boundary(&body[p], &body[i]));
                runs.push(std::mem::take(&mut current));
            }
            (_, false) => {}
        }
        prev = Some(i);
    }
    if !current.is_empty() {
        runs.push(current);
    }
    runs
}
