// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Deterministic placement rules
//!
//! Computes candidate component positions per rule category. Everything
//! here is reproducible for a given geometry: no randomness, and every
//! fallback is itself deterministic.

use wireplan_core::{Door, Geometry, Point3, Room};
use wireplan_spatial::{SpatialAnalyzer, Vector2};

/// Switch mounting height above finished floor (mm).
pub const SWITCH_HEIGHT: f64 = 1400.0;
/// Socket mounting height above finished floor (mm).
pub const SOCKET_HEIGHT: f64 = 300.0;
/// Minimum switch clearance from a window (mm).
pub const MIN_CLEARANCE_SWITCH_WINDOW: f64 = 300.0;
/// Default socket spacing along walls (mm).
pub const SOCKET_SPACING: f64 = 3000.0;
/// Rooms below this area get no fan (~10 m², mm²).
pub const MIN_ROOM_AREA_FOR_FAN: f64 = 10_000_000.0;
/// Socket keep-out radius around doors and windows (mm).
pub const SOCKET_OPENING_CLEARANCE: f64 = 500.0;
/// First switch offset from the door along the wall (mm).
const SWITCH_START_OFFSET: f64 = 200.0;
/// Pitch between multiple switches (mm).
const SWITCH_PITCH: f64 = 300.0;
/// Inset off the wall face, into the room (mm).
const WALL_FACE_INSET: f64 = 10.0;
/// Minimum cosine between switch direction and door swing side.
const SWING_ALIGNMENT_MIN: f64 = 0.3;

/// Candidate position generator. Borrows the run's geometry and analyzer;
/// owns nothing.
pub struct PlacementRules<'a> {
    geometry: &'a Geometry,
    analyzer: &'a SpatialAnalyzer<'a>,
}

impl<'a> PlacementRules<'a> {
    pub fn new(geometry: &'a Geometry, analyzer: &'a SpatialAnalyzer<'a>) -> Self {
        Self { geometry, analyzer }
    }

    /// Lights: centroid (or ceiling center when the drawing is 3D) for a
    /// single light; a centered grid with 15% margins otherwise. Grid
    /// candidates outside the room polygon are omitted, so fewer than
    /// `count` lights is accepted behavior.
    pub fn place_lights_for_room(&self, room: &Room, count: usize) -> Vec<Point3> {
        let mut placements = Vec::new();
        if count == 0 {
            return placements;
        }

        let floor_level = self.analyzer.get_floor_level(room);
        let ceiling_height = self.analyzer.get_ceiling_height(room);

        if count == 1 {
            if self.geometry.is_3d {
                placements.push(self.analyzer.get_ceiling_center(room));
            } else {
                let centroid = room.centroid();
                placements.push(Point3::new(
                    centroid.x,
                    centroid.y,
                    floor_level + ceiling_height,
                ));
            }
            return placements;
        }

        let (min_x, min_y, max_x, max_y) = room.bounds();
        let width = max_x - min_x;
        let height = max_y - min_y;

        let cols = (count as f64).sqrt().ceil() as usize;
        let rows = count.div_ceil(cols);

        let margin_x = width * 0.15;
        let margin_y = height * 0.15;
        let step_x = if cols > 1 { (width - 2.0 * margin_x) / (cols + 1) as f64 } else { 0.0 };
        let step_y = if rows > 1 { (height - 2.0 * margin_y) / (rows + 1) as f64 } else { 0.0 };

        let z = floor_level + ceiling_height;
        let mut placed = 0;
        for r in 0..rows {
            for c in 0..cols {
                if placed >= count {
                    break;
                }
                let candidate = Point3::new(
                    min_x + margin_x + (c + 1) as f64 * step_x,
                    min_y + margin_y + (r + 1) as f64 * step_y,
                    z,
                );
                if room.contains_point_2d(&candidate) {
                    placements.push(candidate);
                    placed += 1;
                }
            }
        }
        placements
    }

    /// Switches near a door, along the wall on the side where the leaf
    /// opens, 1400 mm up, inset 10 mm off the wall face. Candidates in a
    /// window clearance zone or misaligned with the swing side are
    /// rejected; an empty result degrades to a plain along-wall offset.
    pub fn place_switches_for_door(&self, door: &Door, room: &Room, count: usize) -> Vec<Point3> {
        let mut placements = Vec::new();
        if count == 0 {
            return placements;
        }

        let floor_level = self.analyzer.get_floor_level(room);
        let swing_normal = self.analyzer.get_door_swing_side(door, room);

        let nearest_wall = match self.analyzer.find_nearest_wall(&door.position) {
            Some(wall) => wall,
            None => {
                // No walls at all: offset perpendicular to the door's
                // rotation, nudged to the swing side
                let theta = door.rotation_deg.to_radians() + std::f64::consts::FRAC_PI_2;
                let wall_dir = Vector2::new(theta.cos(), theta.sin());
                for i in 0..count {
                    let along = SWITCH_START_OFFSET + i as f64 * SWITCH_PITCH;
                    placements.push(Point3::new(
                        door.position.x + wall_dir.x * along + swing_normal.x * WALL_FACE_INSET,
                        door.position.y + wall_dir.y * along + swing_normal.y * WALL_FACE_INSET,
                        floor_level + SWITCH_HEIGHT,
                    ));
                }
                return placements;
            }
        };

        let door_proj = nearest_wall.project_point(&door.position);
        let (dx, dy) = nearest_wall.direction();
        let mut wall_dir = Vector2::new(dx, dy);

        // Probe both along-wall directions and keep the one whose offset
        // from the door aligns more strongly with the swing side
        let probe = |dir: Vector2<f64>| -> f64 {
            let v = Vector2::new(
                door_proj.x + dir.x * SWITCH_START_OFFSET - door.position.x,
                door_proj.y + dir.y * SWITCH_START_OFFSET - door.position.y,
            );
            match v.try_normalize(0.0) {
                Some(unit) => unit.dot(&swing_normal),
                None => 0.0,
            }
        };
        if probe(-wall_dir).abs() > probe(wall_dir).abs() {
            wall_dir = -wall_dir;
        }

        let windows = self.analyzer.find_windows_for_room(room);

        for i in 0..count {
            let along = SWITCH_START_OFFSET + i as f64 * SWITCH_PITCH;
            let on_wall = Point3::new(
                door_proj.x + wall_dir.x * along,
                door_proj.y + wall_dir.y * along,
                0.0,
            );
            let candidate = self.analyzer.get_wall_surface_point(
                nearest_wall,
                &on_wall,
                WALL_FACE_INSET,
                SWITCH_HEIGHT,
            );

            let to_switch = Vector2::new(
                candidate.x - door.position.x,
                candidate.y - door.position.y,
            );
            let alignment = match to_switch.try_normalize(0.0) {
                Some(unit) => unit.dot(&swing_normal),
                None => 0.0,
            };
            if alignment <= SWING_ALIGNMENT_MIN {
                continue;
            }

            let near_window = windows.iter().any(|window| {
                self.analyzer
                    .avoid_window_zone(window, &candidate, MIN_CLEARANCE_SWITCH_WINDOW)
            });
            if near_window {
                continue;
            }

            placements.push(candidate);
        }

        // Aligned search found nothing: fall back to plain offsets along
        // the chosen wall direction at mounting height
        if placements.is_empty() {
            for i in 0..count {
                let along = SWITCH_START_OFFSET + i as f64 * SWITCH_PITCH;
                placements.push(Point3::new(
                    door_proj.x + wall_dir.x * along,
                    door_proj.y + wall_dir.y * along,
                    floor_level + SWITCH_HEIGHT,
                ));
            }
        }

        placements
    }

    /// Fans at the room's ceiling center. Bathrooms and small rooms are
    /// skipped entirely; extra fans are stacked at a fixed lateral offset
    /// rather than redistributed.
    pub fn place_fans_for_room(&self, room: &Room, count: usize) -> Vec<Point3> {
        let mut placements = Vec::new();
        if count == 0 {
            return placements;
        }
        if Geometry::is_bathroom(room) {
            return placements;
        }
        if self.analyzer.is_small_space(room, MIN_ROOM_AREA_FOR_FAN) {
            return placements;
        }

        if self.geometry.is_3d {
            placements.push(self.analyzer.get_ceiling_center(room));
        } else {
            let centroid = room.centroid();
            let z = self.analyzer.get_floor_level(room) + self.analyzer.get_ceiling_height(room);
            for i in 0..count {
                placements.push(Point3::new(centroid.x, centroid.y + i as f64 * 200.0, z));
            }
        }
        placements
    }

    /// Sockets along the room's walls at standard spacing, avoiding the
    /// exact endpoints and keeping clear of doors and windows.
    ///
    /// Socket count per wall is `max(1, floor(length / spacing))`, which
    /// under-covers a wall whose length is just short of a multiple of the
    /// spacing; that boundary case is deliberate observed behavior.
    pub fn place_sockets_for_room(&self, room: &Room, spacing: Option<f64>) -> Vec<Point3> {
        let spacing = spacing.unwrap_or(SOCKET_SPACING);
        let mut placements = Vec::new();

        let mut walls = self.analyzer.find_walls_for_room(room);
        if walls.is_empty() {
            walls = self.geometry.walls.iter().collect();
        }
        if walls.is_empty() {
            return placements;
        }

        let doors = self.analyzer.find_doors_for_room(room);
        let windows = self.analyzer.find_windows_for_room(room);
        let floor_level = self.analyzer.get_floor_level(room);

        for wall in walls {
            let length = wall.length();
            let count = ((length / spacing).floor() as usize).max(1);

            for i in 0..count {
                let t = (i + 1) as f64 / (count + 1) as f64;
                let candidate = Point3::new(
                    wall.start.x + t * (wall.end.x - wall.start.x),
                    wall.start.y + t * (wall.end.y - wall.start.y),
                    floor_level + SOCKET_HEIGHT,
                );

                let near_door = doors
                    .iter()
                    .any(|door| door.position.distance_to(&candidate) < SOCKET_OPENING_CLEARANCE);
                let near_window = windows
                    .iter()
                    .any(|w| w.position.distance_to(&candidate) < SOCKET_OPENING_CLEARANCE);
                if near_door || near_window {
                    continue;
                }

                placements.push(self.analyzer.get_wall_surface_point(
                    wall,
                    &candidate,
                    WALL_FACE_INSET,
                    SOCKET_HEIGHT,
                ));
            }
        }
        placements
    }
}
