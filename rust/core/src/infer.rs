// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wall-graph room inference
//!
//! When a drawing carries no explicit room polygons but does have walls,
//! room boundaries are recovered by assembling the wall segments into the
//! faces of their planar arrangement: quantize endpoints into graph nodes,
//! sort each node's edge fan by angle, then trace faces keeping the
//! interior on the left. Bounded faces come out counter-clockwise; the
//! unbounded outer face comes out clockwise and is discarded along with
//! anything below the noise floor.
//!
//! Wall segments are expected to meet at (near-)shared endpoints; crossing
//! segments without a shared endpoint are not split.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::model::{Geometry, Point3, Room};
use crate::parser::MIN_ROOM_AREA;

/// Synthetic layer tag marking rooms recovered from the wall graph.
pub const INFERRED_ROOM_LAYER: &str = "INFERRED_ROOM";

/// Endpoints within this distance snap to one graph node.
const NODE_SNAP: f64 = 1.0;

#[inline]
fn node_key(x: f64, y: f64) -> (i64, i64) {
    ((x / NODE_SNAP).round() as i64, (y / NODE_SNAP).round() as i64)
}

/// Assemble closed faces from the drawing's wall segments and append them
/// to `geometry.rooms`. Producing zero faces (disconnected graph) is a
/// valid outcome, not an error.
pub fn infer_rooms_from_walls(geometry: &mut Geometry) {
    let faces = polygonize(&geometry.walls.iter().map(|w| (w.start, w.end)).collect::<Vec<_>>());
    for vertices in faces {
        let room = Room::new(vertices, INFERRED_ROOM_LAYER, 0.0);
        if room.area() > MIN_ROOM_AREA {
            geometry.rooms.push(room);
        }
    }
}

/// Trace the bounded faces of the segment arrangement. Returns one vertex
/// ring per face, counter-clockwise.
fn polygonize(segments: &[(Point3, Point3)]) -> Vec<Vec<Point3>> {
    // Node index over quantized endpoints
    fn intern(
        node_of: &mut FxHashMap<(i64, i64), usize>,
        coords: &mut Vec<(f64, f64)>,
        x: f64,
        y: f64,
    ) -> usize {
        *node_of.entry(node_key(x, y)).or_insert_with(|| {
            coords.push((x, y));
            coords.len() - 1
        })
    }
    let mut node_of: FxHashMap<(i64, i64), usize> = FxHashMap::default();
    let mut coords: Vec<(f64, f64)> = Vec::new();

    let mut edge_set: FxHashSet<(usize, usize)> = FxHashSet::default();
    // Insertion-ordered edge list keeps face tracing (and therefore room
    // order) deterministic across runs
    let mut edges: Vec<(usize, usize)> = Vec::new();
    let mut adjacency: Vec<SmallVec<[usize; 4]>> = Vec::new();

    for (start, end) in segments {
        let u = intern(&mut node_of, &mut coords, start.x, start.y);
        let v = intern(&mut node_of, &mut coords, end.x, end.y);
        adjacency.resize(coords.len(), SmallVec::new());
        // Degenerate segments collapse onto one node; drop them
        if u == v {
            continue;
        }
        if edge_set.insert((u, v)) {
            adjacency[u].push(v);
            edges.push((u, v));
        }
        if edge_set.insert((v, u)) {
            adjacency[v].push(u);
            edges.push((v, u));
        }
    }

    // Sort each node's fan counter-clockwise by outgoing angle
    for (node, fan) in adjacency.iter_mut().enumerate() {
        let (ox, oy) = coords[node];
        fan.sort_by(|&a, &b| {
            let angle_a = (coords[a].1 - oy).atan2(coords[a].0 - ox);
            let angle_b = (coords[b].1 - oy).atan2(coords[b].0 - ox);
            angle_a.partial_cmp(&angle_b).unwrap_or(std::cmp::Ordering::Equal)
        });
    }

    let mut visited: FxHashSet<(usize, usize)> = FxHashSet::default();
    let mut faces = Vec::new();

    for &(start_u, start_v) in &edges {
        if visited.contains(&(start_u, start_v)) {
            continue;
        }

        let mut ring: Vec<usize> = Vec::new();
        let (mut u, mut v) = (start_u, start_v);
        loop {
            visited.insert((u, v));
            ring.push(u);

            // Successor: the edge one step clockwise from the reversal,
            // which keeps the face interior on our left
            let fan = &adjacency[v];
            let back = match fan.iter().position(|&n| n == u) {
                Some(i) => i,
                None => break, // inconsistent graph; abandon this trace
            };
            let next = fan[(back + fan.len() - 1) % fan.len()];
            u = v;
            v = next;

            if (u, v) == (start_u, start_v) {
                break;
            }
            // Guard against pathological graphs
            if ring.len() > segments.len() * 2 + 2 {
                ring.clear();
                break;
            }
        }

        if ring.len() < 3 {
            continue;
        }

        // Counter-clockwise rings are bounded faces; the clockwise ring is
        // the unbounded outer face
        if signed_area(&ring, &coords) > 0.0 {
            faces.push(
                ring.iter()
                    .map(|&n| Point3::new(coords[n].0, coords[n].1, 0.0))
                    .collect(),
            );
        }
    }

    faces
}

fn signed_area(ring: &[usize], coords: &[(f64, f64)]) -> f64 {
    let n = ring.len();
    let mut acc = 0.0;
    for i in 0..n {
        let (ax, ay) = coords[ring[i]];
        let (bx, by) = coords[ring[(i + 1) % n]];
        acc += ax * by - bx * ay;
    }
    acc / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Wall;

    fn wall(x1: f64, y1: f64, x2: f64, y2: f64) -> Wall {
        Wall::new(Point3::new(x1, y1, 0.0), Point3::new(x2, y2, 0.0), "WALL")
    }

    #[test]
    fn test_closed_rectangle_yields_one_room() {
        let mut geometry = Geometry {
            walls: vec![
                wall(0.0, 0.0, 6000.0, 0.0),
                wall(6000.0, 0.0, 6000.0, 4000.0),
                wall(6000.0, 4000.0, 0.0, 4000.0),
                wall(0.0, 4000.0, 0.0, 0.0),
            ],
            ..Geometry::default()
        };
        infer_rooms_from_walls(&mut geometry);
        assert_eq!(geometry.rooms.len(), 1);
        let room = &geometry.rooms[0];
        assert_eq!(room.layer, INFERRED_ROOM_LAYER);
        assert!((room.area() - 24_000_000.0).abs() < 1.0);
    }

    #[test]
    fn test_shared_wall_yields_two_rooms() {
        let mut geometry = Geometry {
            walls: vec![
                wall(0.0, 0.0, 4000.0, 0.0),
                wall(4000.0, 0.0, 8000.0, 0.0),
                wall(8000.0, 0.0, 8000.0, 3000.0),
                wall(8000.0, 3000.0, 4000.0, 3000.0),
                wall(4000.0, 3000.0, 0.0, 3000.0),
                wall(0.0, 3000.0, 0.0, 0.0),
                // Party wall splitting the envelope
                wall(4000.0, 0.0, 4000.0, 3000.0),
            ],
            ..Geometry::default()
        };
        infer_rooms_from_walls(&mut geometry);
        assert_eq!(geometry.rooms.len(), 2);
        let total: f64 = geometry.rooms.iter().map(|r| r.area()).sum();
        assert!((total - 24_000_000.0).abs() < 1.0);
    }

    #[test]
    fn test_disconnected_walls_yield_no_rooms() {
        let mut geometry = Geometry {
            walls: vec![wall(0.0, 0.0, 5000.0, 0.0), wall(9000.0, 2000.0, 9000.0, 8000.0)],
            ..Geometry::default()
        };
        infer_rooms_from_walls(&mut geometry);
        assert!(geometry.rooms.is_empty());
    }

    #[test]
    fn test_degenerate_segments_ignored() {
        let mut geometry = Geometry {
            walls: vec![wall(0.0, 0.0, 0.4, 0.0)],
            ..Geometry::default()
        };
        infer_rooms_from_walls(&mut geometry);
        assert!(geometry.rooms.is_empty());
    }
}
