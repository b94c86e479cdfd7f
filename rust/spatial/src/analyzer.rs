// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Spatial relationship queries
//!
//! The analyzer borrows a parsed geometry snapshot and answers the
//! questions placement rules ask: which room holds a point, which wall is
//! nearest, which doors and windows belong to a room, which way a door
//! opens. All queries are read-only and best-effort.

use nalgebra::Vector2;

use wireplan_core::keywords::{self, HALL_KEYWORDS, OPEN_AREA_KEYWORDS};
use wireplan_core::{Door, Geometry, Point3, Room, RoomClass, Wall, Window};

/// Standard residential ceiling height used when a room carries none (mm).
pub const DEFAULT_CEILING_HEIGHT: f64 = 2700.0;

/// Doors within this distance of a room boundary count as the room's own,
/// catching doors sitting exactly on the wall line which point-in-polygon
/// classifies as outside (mm).
const DOOR_BOUNDARY_TOLERANCE: f64 = 500.0;

/// Wall endpoints within this distance of consecutive boundary vertices
/// associate the wall with the room (mm).
const WALL_MATCH_TOLERANCE: f64 = 100.0;

/// Area at or above which an unnamed room is an open area (~80 m², mm²).
const OPEN_AREA_MIN: f64 = 80_000_000.0;

/// Bounding-box aspect ratio at or above which a room is a hall.
const HALL_ASPECT_RATIO: f64 = 3.0;

/// Classify a single room as ROOM / HALL / OPEN_AREA.
///
/// Layer keywords take precedence; otherwise the geometric heuristic:
/// very large and regular is an open area, very elongated is a hall.
pub fn classify_room_type(room: &Room) -> RoomClass {
    if keywords::matches_any(&room.layer, HALL_KEYWORDS) {
        return RoomClass::Hall;
    }
    if keywords::matches_any(&room.layer, OPEN_AREA_KEYWORDS) {
        return RoomClass::OpenArea;
    }

    let area = room.area();
    let (min_x, min_y, max_x, max_y) = room.bounds();
    let width = max_x - min_x;
    let height = max_y - min_y;
    let longer = width.max(height).max(1.0);
    let shorter = width.min(height).max(1.0);

    if area >= OPEN_AREA_MIN {
        return RoomClass::OpenArea;
    }
    if longer / shorter >= HALL_ASPECT_RATIO {
        return RoomClass::Hall;
    }
    RoomClass::Room
}

/// Fill in the classification field of every room. Classification is the
/// only post-construction mutation `Geometry` allows; everything else the
/// analyzer does is read-only.
pub fn classify_rooms(geometry: &mut Geometry) {
    for room in &mut geometry.rooms {
        room.class = Some(classify_room_type(room));
    }
}

/// Read-only spatial queries over one geometry snapshot.
pub struct SpatialAnalyzer<'a> {
    geometry: &'a Geometry,
}

impl<'a> SpatialAnalyzer<'a> {
    pub fn new(geometry: &'a Geometry) -> Self {
        Self { geometry }
    }

    pub fn geometry(&self) -> &'a Geometry {
        self.geometry
    }

    /// Index of the first room (in list order) containing the point.
    /// Polygons are assumed non-overlapping, so first match wins.
    pub fn find_room_for_point(&self, point: &Point3) -> Option<usize> {
        self.geometry
            .rooms
            .iter()
            .position(|room| room.contains_point_2d(point))
    }

    /// Nearest wall by clamped perpendicular distance. `None` without walls.
    pub fn find_nearest_wall(&self, point: &Point3) -> Option<&'a Wall> {
        self.geometry
            .walls
            .iter()
            .min_by(|a, b| {
                let da = a.distance_to_point(point);
                let db = b.distance_to_point(point);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Doors inside the room, or within the boundary tolerance of it.
    pub fn find_doors_for_room(&self, room: &Room) -> Vec<&'a Door> {
        self.geometry
            .doors
            .iter()
            .filter(|door| {
                room.contains_point_2d(&door.position)
                    || room.distance_to_boundary(&door.position) < DOOR_BOUNDARY_TOLERANCE
            })
            .collect()
    }

    /// Windows strictly inside the room polygon.
    pub fn find_windows_for_room(&self, room: &Room) -> Vec<&'a Window> {
        self.geometry
            .windows
            .iter()
            .filter(|window| room.contains_point_2d(&window.position))
            .collect()
    }

    /// Walls whose endpoints line up with consecutive boundary vertex
    /// pairs, in either traversal direction.
    pub fn find_walls_for_room(&self, room: &Room) -> Vec<&'a Wall> {
        let mut matched: Vec<&'a Wall> = Vec::new();
        let vertices = &room.vertices;
        let n = vertices.len();

        for i in 0..n {
            let v1 = &vertices[i];
            let v2 = &vertices[(i + 1) % n];
            for wall in &self.geometry.walls {
                let forward = wall.start.distance_2d(v1) < WALL_MATCH_TOLERANCE
                    && wall.end.distance_2d(v2) < WALL_MATCH_TOLERANCE;
                let reverse = wall.end.distance_2d(v1) < WALL_MATCH_TOLERANCE
                    && wall.start.distance_2d(v2) < WALL_MATCH_TOLERANCE;
                if (forward || reverse) && !matched.iter().any(|w| std::ptr::eq(*w, wall)) {
                    matched.push(wall);
                }
            }
        }
        matched
    }

    pub fn get_ceiling_height(&self, room: &Room) -> f64 {
        room.ceiling_height.unwrap_or(DEFAULT_CEILING_HEIGHT)
    }

    pub fn get_floor_level(&self, room: &Room) -> f64 {
        room.floor_level
    }

    /// Center point on the room's ceiling plane.
    pub fn get_ceiling_center(&self, room: &Room) -> Point3 {
        let centroid = room.centroid();
        Point3::new(
            centroid.x,
            centroid.y,
            self.get_floor_level(room) + self.get_ceiling_height(room),
        )
    }

    /// Fan-exclusion heuristic: rooms under `min_area` are small spaces.
    pub fn is_small_space(&self, room: &Room, min_area: f64) -> bool {
        room.area() < min_area
    }

    /// Point on the wall face: clamped parametric projection of
    /// `point_on_wall`, pushed `offset_from_wall` along the wall normal
    /// (positive = into the room), at `height` above the wall base.
    pub fn get_wall_surface_point(
        &self,
        wall: &Wall,
        point_on_wall: &Point3,
        offset_from_wall: f64,
        height: f64,
    ) -> Point3 {
        let projected = wall.project_point(point_on_wall);
        let (nx, ny) = wall.normal();
        Point3::new(
            projected.x + offset_from_wall * nx,
            projected.y + offset_from_wall * ny,
            wall.start.z + height,
        )
    }

    /// Unit vector pointing to the side of the door where the leaf opens.
    ///
    /// Resolved by testing both nearest-wall normals against the room
    /// interior; falls back to the rotation-derived perpendicular when no
    /// enclosing wall or room side can be determined.
    pub fn get_door_swing_side(&self, door: &Door, room: &Room) -> Vector2<f64> {
        let nearest_wall = match self.find_nearest_wall(&door.position) {
            Some(wall) => wall,
            None => return rotation_perpendicular(door),
        };

        let (nx, ny) = nearest_wall.normal();
        let normal = Vector2::new(nx, ny);
        let probe = |sign: f64| {
            Point3::new(
                door.position.x + sign * normal.x * 100.0,
                door.position.y + sign * normal.y * 100.0,
                door.position.z,
            )
        };

        if room.contains_point_2d(&probe(1.0)) {
            normal
        } else if room.contains_point_2d(&probe(-1.0)) {
            -normal
        } else {
            rotation_perpendicular(door)
        }
    }

    /// True when the candidate sits inside the door's swing zone: within
    /// `clearance` of the door and inside the 90° sector about the door's
    /// rotation.
    pub fn avoid_door_swing_zone(&self, door: &Door, candidate: &Point3, clearance: f64) -> bool {
        if door.position.distance_to(candidate) >= clearance {
            return false;
        }
        let angle = (candidate.y - door.position.y)
            .atan2(candidate.x - door.position.x)
            .to_degrees();
        let mut diff = (angle - door.rotation_deg).abs() % 360.0;
        if diff > 180.0 {
            diff = 360.0 - diff;
        }
        diff < 90.0
    }

    /// True when the candidate is within `clearance` of the window.
    pub fn avoid_window_zone(&self, window: &Window, candidate: &Point3, clearance: f64) -> bool {
        window.position.distance_to(candidate) < clearance
    }
}

/// Door rotation + 90°, as a unit vector. The default swing estimate when
/// wall and room context are unavailable.
fn rotation_perpendicular(door: &Door) -> Vector2<f64> {
    let theta = (door.rotation_deg + 90.0).to_radians();
    Vector2::new(theta.cos(), theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(layer: &str, w: f64, h: f64) -> Room {
        Room::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(w, 0.0, 0.0),
                Point3::new(w, h, 0.0),
                Point3::new(0.0, h, 0.0),
            ],
            layer,
            0.0,
        )
    }

    #[test]
    fn test_classification_keyword_precedence() {
        // Tiny and square, but the layer says corridor
        assert_eq!(classify_room_type(&rect("CORRIDOR_2", 2000.0, 2000.0)), RoomClass::Hall);
        assert_eq!(classify_room_type(&rect("ATRIUM", 2000.0, 2000.0)), RoomClass::OpenArea);
    }

    #[test]
    fn test_classification_geometric() {
        assert_eq!(classify_room_type(&rect("R1", 4000.0, 3500.0)), RoomClass::Room);
        // 12 m x 1.5 m: aspect 8
        assert_eq!(classify_room_type(&rect("R2", 12_000.0, 1500.0)), RoomClass::Hall);
        // 10 m x 9 m = 90 m²
        assert_eq!(classify_room_type(&rect("R3", 10_000.0, 9000.0)), RoomClass::OpenArea);
    }
}
