//! Ring positions along a meridian.
//!
//! Rings sit at `first_gap + k * step` arc length. The first gap is the
//! smallest offset whose section perimeter holds the edge stitches; the far end
//! is solved the same way from the other pole.

use crate::math::quadrature::smallest_reaching;

const GAP_SEARCH_ITERATIONS: usize = 60;

/// Shape of the meridian a march runs over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarchExtent {
    /// Total meridian arc length.
    pub total: f64,
    /// First and last arc positions of the widest section.
    pub first_peak: f64,
    pub last_peak: f64,
    /// A closed meridian (torus) has no poles and no gaps.
    pub closed: bool,
}

/// Result of a march.
#[derive(Debug, Clone, PartialEq)]
pub struct March {
    /// Arc positions of the rings, ascending.
    pub positions: Vec<f64>,
    /// `false` when no section reaches the edge-stitch perimeter.
    pub edge_fit: bool,
    /// `true` when the ring cap stopped the march.
    pub capped: bool,
}

/// Smallest arc offset in `[0, peak]` whose perimeter reaches `target`.
pub fn first_gap<F: Fn(f64) -> f64>(perimeter: F, target: f64, peak: f64) -> Option<f64> {
    smallest_reaching(perimeter, target, 0.0, peak.max(0.0), GAP_SEARCH_ITERATIONS)
}

/// Computes ring positions for a meridian.
pub fn march<F: Fn(f64) -> f64>(
    perimeter: F,
    extent: &MarchExtent,
    step: f64,
    target: f64,
    max_rings: usize,
) -> March {
    let total = extent.total;
    if !(total > 0.0 && step > 0.0) || max_rings == 0 {
        return March {
            positions: Vec::new(),
            edge_fit: true,
            capped: false,
        };
    }

    let (start, end, edge_fit) = if extent.closed {
        (0.0, total - 0.5 * step, true)
    } else {
        let head = first_gap(&perimeter, target, extent.first_peak);
        let tail = first_gap(|x| perimeter(total - x), target, total - extent.last_peak);
        let start = head.unwrap_or(extent.first_peak);
        let end = tail.map_or(extent.last_peak, |t| total - t);
        (start, end.max(start), head.is_some() && tail.is_some())
    };

    let slack = 1e-9 * total;
    let mut positions = Vec::new();
    let mut capped = false;
    let mut k = 0u32;
    loop {
        let s = start + step * f64::from(k);
        let inside = if extent.closed { s < end || k == 0 } else { s <= end + slack };
        if !inside {
            break;
        }
        if positions.len() == max_rings {
            capped = true;
            break;
        }
        positions.push(s.min(total));
        k += 1;
    }
    March {
        positions,
        edge_fit,
        capped,
    }
}

#[cfg(test)]
mod tests {
    use std::f64::consts::PI;

    use approx::assert_relative_eq;

    use super::*;

    /// Unit sphere meridian: perimeter `2 pi sin(s)` for arc length `s`.
    fn sphere() -> (impl Fn(f64) -> f64, MarchExtent) {
        (
            |s: f64| 2.0 * PI * s.sin().max(0.0),
            MarchExtent {
                total: PI,
                first_peak: PI / 2.0,
                last_peak: PI / 2.0,
                closed: false,
            },
        )
    }

    #[test]
    fn first_gap_is_the_smallest_fitting_offset() {
        let (perimeter, extent) = sphere();
        let target = 6.0 * 0.11;
        let gap = first_gap(&perimeter, target, extent.first_peak).unwrap_or(f64::NAN);
        assert!(perimeter(gap) >= target);
        assert!(perimeter(gap - 1e-9) < target);
    }

    #[test]
    fn unit_sphere_level_four() {
        let (perimeter, extent) = sphere();
        let m = march(perimeter, &extent, 0.12, 0.66, 512);
        assert!(m.edge_fit);
        assert!(!m.capped);
        let expected = (PI / 0.12).floor();
        #[allow(clippy::cast_precision_loss)]
        let count = m.positions.len() as f64;
        assert!((count - expected).abs() <= 1.0, "{count} rings");
        for w in m.positions.windows(2) {
            assert_relative_eq!(w[1] - w[0], 0.12, epsilon = 1e-12);
        }
        // Symmetric gaps.
        let head = m.positions[0];
        let tail = PI - m.positions[m.positions.len() - 1];
        assert!(tail >= head - 1e-9);
    }

    #[test]
    fn ring_cap_stops_the_march() {
        let (perimeter, extent) = sphere();
        let m = march(perimeter, &extent, 0.12, 0.66, 5);
        assert_eq!(m.positions.len(), 5);
        assert!(m.capped);
    }

    #[test]
    fn unreachable_target_uses_the_widest_section() {
        let (perimeter, extent) = sphere();
        let m = march(perimeter, &extent, 0.12, 100.0, 512);
        assert!(!m.edge_fit);
        assert_eq!(m.positions, vec![PI / 2.0]);
    }

    #[test]
    fn closed_meridian_starts_at_zero_and_stops_short_of_wrap() {
        let extent = MarchExtent {
            total: 1.0,
            first_peak: 0.0,
            last_peak: 0.0,
            closed: true,
        };
        let m = march(|_| 1.0, &extent, 0.3, 10.0, 512);
        assert_eq!(m.positions.len(), 3);
        assert_relative_eq!(m.positions[0], 0.0);
        assert!(m.edge_fit);
    }
}
