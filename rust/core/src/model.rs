// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Parsed drawing geometry
//!
//! All coordinates are in millimeters. A [`Geometry`] is built once per
//! run by the parser and is read-only downstream, except for the room
//! classification field which the spatial analyzer fills in.

use crate::keywords;

/// 3D point in drawing coordinates (mm).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// 2D projection.
    #[inline]
    pub fn xy(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// 3D Euclidean distance.
    pub fn distance_to(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// 2D Euclidean distance, ignoring Z.
    pub fn distance_2d(&self, other: &Point3) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Room classification assigned by the spatial analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RoomClass {
    Room,
    Hall,
    OpenArea,
}

impl RoomClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomClass::Room => "ROOM",
            RoomClass::Hall => "HALL",
            RoomClass::OpenArea => "OPEN_AREA",
        }
    }
}

/// Closed room boundary.
///
/// Vertex insertion order is the polygon winding; invariants (≥3 vertices,
/// area above the noise floor) are enforced by the parser, not here.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Room {
    pub vertices: Vec<Point3>,
    pub layer: String,
    pub floor_level: f64,
    pub ceiling_height: Option<f64>,
    pub class: Option<RoomClass>,
}

impl Room {
    pub fn new(vertices: Vec<Point3>, layer: impl Into<String>, floor_level: f64) -> Self {
        Self {
            vertices,
            layer: layer.into(),
            floor_level,
            ceiling_height: None,
            class: None,
        }
    }

    /// Vertex-average centroid. Z falls back to the floor level when the
    /// boundary carries no elevation of its own.
    pub fn centroid(&self) -> Point3 {
        if self.vertices.is_empty() {
            return Point3::new(0.0, 0.0, self.floor_level);
        }
        let n = self.vertices.len() as f64;
        let (sx, sy, sz) = self
            .vertices
            .iter()
            .fold((0.0, 0.0, 0.0), |(x, y, z), v| (x + v.x, y + v.y, z + v.z));
        let z = if sz > 0.0 { sz / n } else { self.floor_level };
        Point3::new(sx / n, sy / n, z)
    }

    /// 2D bounding box as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        if self.vertices.is_empty() {
            return (0.0, 0.0, 0.0, 0.0);
        }
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for v in &self.vertices {
            min_x = min_x.min(v.x);
            min_y = min_y.min(v.y);
            max_x = max_x.max(v.x);
            max_y = max_y.max(v.y);
        }
        (min_x, min_y, max_x, max_y)
    }

    /// Shoelace area in mm². Absolute value, so the result is invariant
    /// under winding reversal and cyclic rotation of the vertex list.
    pub fn area(&self) -> f64 {
        if self.vertices.len() < 3 {
            return 0.0;
        }
        let n = self.vertices.len();
        let mut acc = 0.0;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            acc += a.x * b.y - b.x * a.y;
        }
        acc.abs() / 2.0
    }

    /// 2D point-in-polygon test (ray casting).
    pub fn contains_point_2d(&self, point: &Point3) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }
        let (x, y) = point.xy();
        let mut inside = false;
        let (mut p1x, mut p1y) = self.vertices[0].xy();
        for i in 1..=n {
            let (p2x, p2y) = self.vertices[i % n].xy();
            if y > p1y.min(p2y) && y <= p1y.max(p2y) && x <= p1x.max(p2x) {
                let crosses = if (p1y - p2y).abs() < f64::EPSILON {
                    true
                } else {
                    let x_intersect = (y - p1y) * (p2x - p1x) / (p2y - p1y) + p1x;
                    (p1x - p2x).abs() < f64::EPSILON || x <= x_intersect
                };
                if crosses {
                    inside = !inside;
                }
            }
            p1x = p2x;
            p1y = p2y;
        }
        inside
    }

    /// Minimum 2D distance from a point to the boundary edges.
    pub fn distance_to_boundary(&self, point: &Point3) -> f64 {
        let n = self.vertices.len();
        let mut min_dist = f64::INFINITY;
        for i in 0..n {
            let a = &self.vertices[i];
            let b = &self.vertices[(i + 1) % n];
            min_dist = min_dist.min(segment_distance_2d(a, b, point));
        }
        min_dist
    }
}

/// Clamped 2D distance from `point` to segment `a`-`b`.
pub(crate) fn segment_distance_2d(a: &Point3, b: &Point3, point: &Point3) -> f64 {
    let vx = point.x - a.x;
    let vy = point.y - a.y;
    let wx = b.x - a.x;
    let wy = b.y - a.y;
    let len_sq = wx * wx + wy * wy;
    if len_sq == 0.0 {
        return (vx * vx + vy * vy).sqrt();
    }
    let t = ((vx * wx + vy * wy) / len_sq).clamp(0.0, 1.0);
    let cx = a.x + t * wx;
    let cy = a.y + t * wy;
    let dx = point.x - cx;
    let dy = point.y - cy;
    (dx * dx + dy * dy).sqrt()
}

/// Wall segment.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wall {
    pub start: Point3,
    pub end: Point3,
    pub layer: String,
    pub thickness: Option<f64>,
    pub height: Option<f64>,
}

impl Wall {
    pub fn new(start: Point3, end: Point3, layer: impl Into<String>) -> Self {
        Self {
            start,
            end,
            layer: layer.into(),
            thickness: None,
            height: None,
        }
    }

    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }

    /// Unit direction vector in the plan plane.
    pub fn direction(&self) -> (f64, f64) {
        let len = self.length();
        if len == 0.0 {
            return (1.0, 0.0);
        }
        ((self.end.x - self.start.x) / len, (self.end.y - self.start.y) / len)
    }

    /// Unit normal (direction rotated 90° counter-clockwise).
    pub fn normal(&self) -> (f64, f64) {
        let (dx, dy) = self.direction();
        (-dy, dx)
    }

    /// Perpendicular distance from a point, clamped to the segment.
    pub fn distance_to_point(&self, point: &Point3) -> f64 {
        segment_distance_2d(&self.start, &self.end, point)
    }

    /// Project a point onto the wall segment (clamped). Z is the wall base.
    pub fn project_point(&self, point: &Point3) -> Point3 {
        let wx = self.end.x - self.start.x;
        let wy = self.end.y - self.start.y;
        let len_sq = wx * wx + wy * wy;
        if len_sq == 0.0 {
            return self.start;
        }
        let t = (((point.x - self.start.x) * wx + (point.y - self.start.y) * wy) / len_sq)
            .clamp(0.0, 1.0);
        Point3::new(self.start.x + t * wx, self.start.y + t * wy, self.start.z)
    }
}

/// Which way the door leaf opens, when it can be read off the drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwingDir {
    Left,
    Right,
    #[default]
    Unknown,
}

/// Door insertion (block reference).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Door {
    pub position: Point3,
    pub rotation_deg: f64,
    pub layer: String,
    pub block_name: String,
    pub width: Option<f64>,
    pub swing_angle: Option<f64>,
    pub swing_dir: SwingDir,
}

impl Door {
    /// Sampled swing arc at `radius`, centered on the door's effective
    /// opening direction. 11 points over the swing sector.
    pub fn swing_zone(&self, radius: f64) -> Vec<Point3> {
        let swing = self.swing_angle.unwrap_or(90.0);
        let theta = self.rotation_deg.to_radians();
        let half = (swing / 2.0).to_radians();
        let (start, end) = (theta - half, theta + half);

        const STEPS: usize = 10;
        (0..=STEPS)
            .map(|i| {
                let angle = start + (end - start) * i as f64 / STEPS as f64;
                Point3::new(
                    self.position.x + radius * angle.cos(),
                    self.position.y + radius * angle.sin(),
                    self.position.z,
                )
            })
            .collect()
    }
}

/// Window insertion.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Window {
    pub position: Point3,
    pub rotation_deg: f64,
    pub layer: String,
    pub block_name: Option<String>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// Floor level derived from distinct room elevations.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FloorLevel {
    pub elevation: f64,
    pub layer: Option<String>,
    pub name: Option<String>,
}

/// Electrical component kinds placed by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ComponentKind {
    Light,
    Switch,
    Fan,
    Socket,
}

impl ComponentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Light => "LIGHT",
            ComponentKind::Switch => "SWITCH",
            ComponentKind::Fan => "FAN",
            ComponentKind::Socket => "SOCKET",
        }
    }

    /// Reusable symbol definition name in the drawing's BLOCKS section.
    pub fn block_name(&self) -> &'static str {
        match self {
            ComponentKind::Light => "LIGHT_BLOCK",
            ComponentKind::Switch => "SWITCH_BLOCK",
            ComponentKind::Fan => "FAN_BLOCK",
            ComponentKind::Socket => "SOCKET_BLOCK",
        }
    }

    /// Target layer for inserted instances.
    pub fn layer_name(&self) -> &'static str {
        match self {
            ComponentKind::Light => "ELECTRICAL_LIGHTS",
            ComponentKind::Switch => "ELECTRICAL_SWITCHES",
            ComponentKind::Fan => "ELECTRICAL_FANS",
            ComponentKind::Socket => "ELECTRICAL_SOCKETS",
        }
    }
}

/// Aggregate of everything recovered from a drawing.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Geometry {
    pub rooms: Vec<Room>,
    pub walls: Vec<Wall>,
    pub doors: Vec<Door>,
    pub windows: Vec<Window>,
    pub floor_levels: Vec<FloorLevel>,
    pub is_3d: bool,
}

impl Geometry {
    /// Bathroom heuristic used by the fan placement rule.
    pub fn is_bathroom(room: &Room) -> bool {
        keywords::matches_any(&room.layer, keywords::BATHROOM_KEYWORDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect_room() -> Room {
        Room::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(5000.0, 0.0, 0.0),
                Point3::new(5000.0, 4000.0, 0.0),
                Point3::new(0.0, 4000.0, 0.0),
            ],
            "ROOM",
            0.0,
        )
    }

    #[test]
    fn test_area_shoelace() {
        assert_relative_eq!(rect_room().area(), 20_000_000.0);
    }

    #[test]
    fn test_area_invariant_under_rotation_and_reversal() {
        let room = rect_room();
        let base = room.area();

        let mut rotated = room.vertices.clone();
        rotated.rotate_left(2);
        let rotated_room = Room::new(rotated, "ROOM", 0.0);
        assert_relative_eq!(rotated_room.area(), base);

        let mut reversed = room.vertices.clone();
        reversed.reverse();
        let reversed_room = Room::new(reversed, "ROOM", 0.0);
        assert_relative_eq!(reversed_room.area(), base);
    }

    #[test]
    fn test_centroid_inside_convex_room() {
        let room = rect_room();
        let c = room.centroid();
        assert_relative_eq!(c.x, 2500.0);
        assert_relative_eq!(c.y, 2000.0);
        assert!(room.contains_point_2d(&c));
    }

    #[test]
    fn test_contains_point_outside() {
        let room = rect_room();
        assert!(!room.contains_point_2d(&Point3::new(-100.0, 2000.0, 0.0)));
        assert!(!room.contains_point_2d(&Point3::new(2500.0, 4500.0, 0.0)));
    }

    #[test]
    fn test_boundary_distance() {
        let room = rect_room();
        assert_relative_eq!(
            room.distance_to_boundary(&Point3::new(2500.0, 300.0, 0.0)),
            300.0
        );
        // On the boundary itself
        assert_relative_eq!(
            room.distance_to_boundary(&Point3::new(2500.0, 0.0, 0.0)),
            0.0
        );
    }

    #[test]
    fn test_wall_direction_and_normal() {
        let wall = Wall::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4000.0, 0.0, 0.0), "WALL");
        assert_relative_eq!(wall.length(), 4000.0);
        let (dx, dy) = wall.direction();
        assert_relative_eq!(dx, 1.0);
        assert_relative_eq!(dy, 0.0);
        let (nx, ny) = wall.normal();
        assert_relative_eq!(nx, 0.0);
        assert_relative_eq!(ny, 1.0);
    }

    #[test]
    fn test_wall_distance_clamps_to_segment() {
        let wall = Wall::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1000.0, 0.0, 0.0), "WALL");
        // Perpendicular foot inside the segment
        assert_relative_eq!(wall.distance_to_point(&Point3::new(500.0, 200.0, 0.0)), 200.0);
        // Beyond the end: distance to the endpoint, not the infinite line
        assert_relative_eq!(
            wall.distance_to_point(&Point3::new(2000.0, 0.0, 0.0)),
            1000.0
        );
    }

    #[test]
    fn test_swing_zone_samples() {
        let door = Door {
            position: Point3::new(0.0, 0.0, 0.0),
            rotation_deg: 0.0,
            layer: "DOOR".into(),
            block_name: "D1".into(),
            width: None,
            swing_angle: None,
            swing_dir: SwingDir::Unknown,
        };
        let zone = door.swing_zone(900.0);
        assert_eq!(zone.len(), 11);
        for p in &zone {
            assert_relative_eq!(p.distance_2d(&door.position), 900.0, epsilon = 1e-9);
        }
    }
}
