use std::collections::VecDeque;

use crate::geometry::Plane;
use crate::math::intersect_3d::{classify_point_plane, edge_crossing, PointPlaneClassification};
use crate::math::pose::transform_point;
use crate::math::{Matrix4, Point3};

use super::TriangleMesh;

/// Crossings with `|d0 - d1|` below this are rejected as ill-conditioned.
const CROSSING_EPSILON: f64 = 1e-12;

/// Intersects a local triangle mesh, placed by `transform`, with a world plane.
///
/// Returns one unordered two-point segment per triangle that the plane
/// crosses through two distinct edges. Segments are in world space.
#[must_use]
pub fn slice_mesh(mesh: &TriangleMesh, transform: &Matrix4, plane: &Plane) -> Vec<[Point3; 2]> {
    let world: Vec<Point3> = mesh
        .vertices
        .iter()
        .map(|v| transform_point(transform, v))
        .collect();
    let dist: Vec<f64> = world.iter().map(|p| plane.signed_distance(p)).collect();
    let side: Vec<PointPlaneClassification> = world.iter().map(|p| classify_point_plane(p, plane)).collect();

    let mut segments = Vec::new();
    for tri in &mesh.indices {
        let [a, b, c] = tri.map(|i| i as usize);
        // Strictly on one side: no crossings.
        if side[a] != PointPlaneClassification::On && side[a] == side[b] && side[b] == side[c] {
            continue;
        }
        let mut hits: Vec<Point3> = Vec::with_capacity(3);
        for (i, j) in [(a, b), (b, c), (c, a)] {
            if let Some(hit) = edge_crossing(&world[i], &world[j], dist[i], dist[j], CROSSING_EPSILON) {
                if hits.iter().all(|h| (h - hit).norm() > CROSSING_EPSILON) {
                    hits.push(hit);
                }
            }
        }
        if hits.len() == 2 {
            segments.push([hits[0], hits[1]]);
        }
    }
    segments
}

/// Greedily chains unordered segments into maximal polylines.
///
/// Two segments join when an endpoint of one lies within `tolerance` of a free
/// end of the chain. A chain whose two free ends meet is closed explicitly:
/// its last point is set equal to its first.
#[must_use]
pub fn assemble_polylines(segments: &[[Point3; 2]], tolerance: f64) -> Vec<Vec<Point3>> {
    let near = |a: &Point3, b: &Point3| (a - b).norm() <= tolerance;
    let mut used = vec![false; segments.len()];
    let mut chains = Vec::new();

    for start in 0..segments.len() {
        if used[start] {
            continue;
        }
        used[start] = true;
        let mut chain: VecDeque<Point3> = VecDeque::from(segments[start].to_vec());

        loop {
            let mut extended = false;
            for (k, seg) in segments.iter().enumerate() {
                if used[k] {
                    continue;
                }
                let (Some(front), Some(back)) = (chain.front().copied(), chain.back().copied()) else {
                    break;
                };
                if near(&seg[0], &back) {
                    chain.push_back(seg[1]);
                } else if near(&seg[1], &back) {
                    chain.push_back(seg[0]);
                } else if near(&seg[0], &front) {
                    chain.push_front(seg[1]);
                } else if near(&seg[1], &front) {
                    chain.push_front(seg[0]);
                } else {
                    continue;
                }
                used[k] = true;
                extended = true;
            }
            if !extended {
                break;
            }
        }

        let mut points: Vec<Point3> = chain.into_iter().collect();
        if points.len() > 3 && near(&points[0], &points[points.len() - 1]) {
            let first = points[0];
            if let Some(last) = points.last_mut() {
                *last = first;
            }
        }
        chains.push(points);
    }
    chains
}
