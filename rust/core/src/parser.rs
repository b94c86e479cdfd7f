// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry recovery from the record stream
//!
//! Each entity family (rooms, walls, doors, windows) is recovered by an
//! independent linear scan over the record pairs. A `0` group code
//! finalizes the entity in progress under family-specific acceptance
//! rules, then resets the accumulators. Malformed numeric fields are
//! dropped per-field; no parse problem ever aborts the run.

use rustc_hash::FxHashSet;

use crate::infer;
use crate::keywords;
use crate::model::{Door, FloorLevel, Geometry, Point3, Room, SwingDir, Wall, Window};
use crate::scanner::{parse_field, Record, RecordScanner};

/// Wall segments at or below this length are treated as drawing noise.
pub const MIN_WALL_LENGTH: f64 = 100.0;

/// Noise floor for accepted room polygons in the raw scan path (0.01 m²).
pub const MIN_ROOM_AREA: f64 = 10_000.0;

/// First/last vertex gap below which an unflagged polyline counts as closed.
const CLOSE_TOLERANCE: f64 = 10.0;

/// Entity types whose presence marks the drawing as 3D.
const THREE_D_TYPES: &[&str] = &["3DFACE", "3DSOLID", "3DPOLYLINE", "SOLID", "EXTRUDED_SURFACE"];

fn is_polyline(entity: &str) -> bool {
    entity.eq_ignore_ascii_case("LWPOLYLINE") || entity.eq_ignore_ascii_case("POLYLINE")
}

/// Scanner-based geometry parser.
pub struct GeometryParser<'a> {
    scanner: RecordScanner<'a>,
}

/// Accumulator for one polyline in progress.
#[derive(Default)]
struct PolylineAcc {
    vertices: Vec<Point3>,
    pending_x: Option<f64>,
    pending_y: Option<f64>,
    pending_z: Option<f64>,
    elevation: f64,
    closed_flag: bool,
}

impl PolylineAcc {
    /// Push the pending vertex, if a complete (x, y) pair has accumulated.
    fn flush_vertex(&mut self) {
        if let (Some(x), Some(y)) = (self.pending_x, self.pending_y) {
            let z = self.pending_z.unwrap_or(self.elevation);
            self.vertices.push(Point3::new(x, y, z));
        }
        self.pending_x = None;
        self.pending_y = None;
        self.pending_z = None;
    }

    fn reset(&mut self) {
        self.vertices.clear();
        self.pending_x = None;
        self.pending_y = None;
        self.pending_z = None;
        self.elevation = 0.0;
        self.closed_flag = false;
    }

    /// Closed either by the flag bit or by a coincident first/last vertex.
    fn is_closed(&self) -> bool {
        if self.closed_flag {
            return true;
        }
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) if self.vertices.len() > 2 => {
                first.distance_2d(last) < CLOSE_TOLERANCE
            }
            _ => false,
        }
    }
}

impl<'a> GeometryParser<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            scanner: RecordScanner::new(text),
        }
    }

    /// Recover a full geometry snapshot. Never fails; a malformed drawing
    /// yields an empty (or partial) result instead.
    pub fn parse(&self) -> Geometry {
        let mut geometry = Geometry {
            is_3d: self.detect_3d(),
            ..Geometry::default()
        };

        self.scan_rooms(&mut geometry);
        self.scan_walls(&mut geometry);
        self.scan_inserts(&mut geometry);
        self.derive_floor_levels(&mut geometry);

        // Wall-graph inference only when no explicit room polygons exist.
        // Zero inferred faces is a legitimate outcome (disconnected graph);
        // placement then degrades to its door/grid fallbacks.
        if geometry.rooms.is_empty() && !geometry.walls.is_empty() {
            infer::infer_rooms_from_walls(&mut geometry);
        }

        geometry
    }

    fn records(&self) -> &[Record<'a>] {
        self.scanner.records()
    }

    fn detect_3d(&self) -> bool {
        self.records().iter().any(|r| {
            r.code == "0" && THREE_D_TYPES.iter().any(|t| r.value.eq_ignore_ascii_case(t))
        })
    }

    /// Rooms: polyline entities accepted when the layer matches room
    /// keywords, or when the polyline is closed with at least 4 vertices.
    fn scan_rooms(&self, geometry: &mut Geometry) {
        let mut entity: Option<&str> = None;
        let mut layer: Option<&str> = None;
        let mut acc = PolylineAcc::default();

        let mut finalize = |entity: Option<&str>, layer: Option<&str>, acc: &mut PolylineAcc| {
            acc.flush_vertex();
            if let Some(e) = entity {
                if is_polyline(e) {
                    let layer_name = layer.unwrap_or("");
                    let by_layer = keywords::is_room_layer(layer_name);
                    let by_shape = acc.is_closed() && acc.vertices.len() >= 4;
                    if (by_layer || by_shape) && acc.vertices.len() >= 3 {
                        let room =
                            Room::new(acc.vertices.clone(), layer_name, acc.elevation);
                        if room.area() > MIN_ROOM_AREA {
                            geometry.rooms.push(room);
                        }
                    }
                }
            }
            acc.reset();
        };

        for r in self.records() {
            match r.code {
                "0" => {
                    // VERTEX/SEQEND belong to the polyline in progress
                    let sub = r.value.eq_ignore_ascii_case("VERTEX")
                        || r.value.eq_ignore_ascii_case("SEQEND");
                    if sub && entity.map(is_polyline).unwrap_or(false) {
                        acc.flush_vertex();
                    } else {
                        finalize(entity, layer, &mut acc);
                        entity = Some(r.value);
                        layer = None;
                    }
                }
                "8" => {
                    // The polyline's own layer wins over VERTEX layers
                    if layer.is_none() {
                        layer = Some(r.value);
                    }
                }
                "38" => {
                    if let Some(e) = parse_field(r.value) {
                        acc.elevation = e;
                    }
                }
                "70" => {
                    if let Some(flags) = parse_field(r.value) {
                        acc.closed_flag = (flags as i64) & 1 != 0;
                    }
                }
                "10" => {
                    acc.flush_vertex();
                    acc.pending_x = parse_field(r.value);
                }
                "20" => acc.pending_y = parse_field(r.value),
                "30" => acc.pending_z = parse_field(r.value),
                _ => {}
            }
        }
        finalize(entity, layer, &mut acc);
    }

    /// Walls: LINE entities on wall layers, plus polyline chains on wall
    /// layers broken into individual segments. Sub-noise segments dropped.
    fn scan_walls(&self, geometry: &mut Geometry) {
        let mut entity: Option<&str> = None;
        let mut layer: Option<&str> = None;
        let mut thickness: Option<f64> = None;
        // LINE endpoints
        let mut start: Option<Point3> = None;
        let mut end: Option<Point3> = None;
        let mut pending: [Option<f64>; 3] = [None, None, None];
        let mut pending_end: [Option<f64>; 3] = [None, None, None];
        // Polyline chain
        let mut acc = PolylineAcc::default();

        let push_wall = |geometry: &mut Geometry, s: Point3, e: Point3, layer: &str, thickness: Option<f64>| {
            let mut wall = Wall::new(s, e, layer);
            wall.thickness = thickness;
            if wall.length() > MIN_WALL_LENGTH {
                geometry.walls.push(wall);
            }
        };

        let mut finalize = |entity: Option<&str>,
                            layer: Option<&str>,
                            thickness: Option<f64>,
                            start: &mut Option<Point3>,
                            end: &mut Option<Point3>,
                            pending: &mut [Option<f64>; 3],
                            pending_end: &mut [Option<f64>; 3],
                            acc: &mut PolylineAcc,
                            geometry: &mut Geometry| {
            if let (Some(x), Some(y)) = (pending[0], pending[1]) {
                *start = Some(Point3::new(x, y, pending[2].unwrap_or(0.0)));
            }
            if let (Some(x), Some(y)) = (pending_end[0], pending_end[1]) {
                *end = Some(Point3::new(x, y, pending_end[2].unwrap_or(0.0)));
            }
            let layer_name = layer.unwrap_or("");
            if keywords::is_wall_layer(layer_name) {
                match entity {
                    Some(e) if e.eq_ignore_ascii_case("LINE") => {
                        if let (Some(s), Some(e)) = (*start, *end) {
                            push_wall(geometry, s, e, layer_name, thickness);
                        }
                    }
                    Some(e) if is_polyline(e) => {
                        acc.flush_vertex();
                        for pair in acc.vertices.windows(2) {
                            push_wall(geometry, pair[0], pair[1], layer_name, thickness);
                        }
                        if acc.closed_flag && acc.vertices.len() > 2 {
                            let first = acc.vertices[0];
                            let last = *acc.vertices.last().unwrap();
                            push_wall(geometry, last, first, layer_name, thickness);
                        }
                    }
                    _ => {}
                }
            }
            *start = None;
            *end = None;
            *pending = [None, None, None];
            *pending_end = [None, None, None];
            acc.reset();
        };

        for r in self.records() {
            match r.code {
                "0" => {
                    let sub = r.value.eq_ignore_ascii_case("VERTEX")
                        || r.value.eq_ignore_ascii_case("SEQEND");
                    if sub && entity.map(is_polyline).unwrap_or(false) {
                        acc.flush_vertex();
                    } else {
                        finalize(
                            entity,
                            layer,
                            thickness,
                            &mut start,
                            &mut end,
                            &mut pending,
                            &mut pending_end,
                            &mut acc,
                            geometry,
                        );
                        entity = Some(r.value);
                        layer = None;
                        thickness = None;
                    }
                }
                "8" => {
                    if layer.is_none() {
                        layer = Some(r.value);
                    }
                }
                "39" => thickness = parse_field(r.value),
                "70" => {
                    if let Some(flags) = parse_field(r.value) {
                        acc.closed_flag = (flags as i64) & 1 != 0;
                    }
                }
                "10" => {
                    if entity.map(is_polyline).unwrap_or(false) {
                        acc.flush_vertex();
                        acc.pending_x = parse_field(r.value);
                    } else {
                        pending[0] = parse_field(r.value);
                    }
                }
                "20" => {
                    if entity.map(is_polyline).unwrap_or(false) {
                        acc.pending_y = parse_field(r.value);
                    } else {
                        pending[1] = parse_field(r.value);
                    }
                }
                "30" => {
                    if entity.map(is_polyline).unwrap_or(false) {
                        acc.pending_z = parse_field(r.value);
                    } else {
                        pending[2] = parse_field(r.value);
                    }
                }
                "11" => pending_end[0] = parse_field(r.value),
                "21" => pending_end[1] = parse_field(r.value),
                "31" => pending_end[2] = parse_field(r.value),
                _ => {}
            }
        }
        finalize(
            entity,
            layer,
            thickness,
            &mut start,
            &mut end,
            &mut pending,
            &mut pending_end,
            &mut acc,
            geometry,
        );
    }

    /// Doors and windows: INSERT entities whose layer or block name
    /// matches the respective keyword set.
    fn scan_inserts(&self, geometry: &mut Geometry) {
        let mut entity: Option<&str> = None;
        let mut layer: Option<&str> = None;
        let mut block: Option<&str> = None;
        let mut pos: [Option<f64>; 3] = [None, None, None];
        let mut rotation = 0.0;

        let mut finalize = |entity: Option<&str>,
                            layer: Option<&str>,
                            block: Option<&str>,
                            pos: &[Option<f64>; 3],
                            rotation: f64,
                            geometry: &mut Geometry| {
            if entity.map(|e| e.eq_ignore_ascii_case("INSERT")).unwrap_or(false) {
                if let (Some(x), Some(y)) = (pos[0], pos[1]) {
                    let position = Point3::new(x, y, pos[2].unwrap_or(0.0));
                    let layer_name = layer.unwrap_or("");
                    let block_name = block.unwrap_or("");
                    if keywords::is_door_insert(layer_name, block_name) {
                        geometry.doors.push(Door {
                            position,
                            rotation_deg: rotation,
                            layer: layer_name.to_string(),
                            block_name: block_name.to_string(),
                            width: None,
                            swing_angle: None,
                            swing_dir: SwingDir::Unknown,
                        });
                    } else if keywords::is_window_insert(layer_name, block_name) {
                        geometry.windows.push(Window {
                            position,
                            rotation_deg: rotation,
                            layer: layer_name.to_string(),
                            block_name: (!block_name.is_empty()).then(|| block_name.to_string()),
                            width: None,
                            height: None,
                        });
                    }
                }
            }
        };

        for r in self.records() {
            match r.code {
                "0" => {
                    finalize(entity, layer, block, &pos, rotation, geometry);
                    entity = Some(r.value);
                    layer = None;
                    block = None;
                    pos = [None, None, None];
                    rotation = 0.0;
                }
                "8" => layer = Some(r.value),
                "2" => block = Some(r.value),
                "10" => pos[0] = parse_field(r.value),
                "20" => pos[1] = parse_field(r.value),
                "30" => pos[2] = parse_field(r.value),
                "50" => {
                    if let Some(rot) = parse_field(r.value) {
                        rotation = rot;
                    }
                }
                _ => {}
            }
        }
        finalize(entity, layer, block, &pos, rotation, geometry);
    }

    /// Floor levels are derived, not scanned: distinct non-zero room
    /// elevations, with a synthesized ground level when none exist.
    fn derive_floor_levels(&self, geometry: &mut Geometry) {
        let mut seen: FxHashSet<i64> = FxHashSet::default();
        let mut elevations: Vec<f64> = Vec::new();

        for room in &geometry.rooms {
            if room.floor_level != 0.0 {
                // Quantize to 0.1 mm so float jitter does not split a level
                let key = (room.floor_level * 10.0).round() as i64;
                if seen.insert(key) {
                    elevations.push(room.floor_level);
                }
            }
        }
        elevations.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        for elevation in elevations {
            let layer = geometry
                .rooms
                .iter()
                .find(|room| {
                    room.floor_level == elevation
                        && keywords::matches_any(&room.layer, &["LEVEL", "FLOOR"])
                })
                .map(|room| room.layer.clone());
            geometry.floor_levels.push(FloorLevel {
                elevation,
                layer,
                name: None,
            });
        }

        if geometry.floor_levels.is_empty() {
            geometry.floor_levels.push(FloorLevel {
                elevation: 0.0,
                layer: None,
                name: Some("Ground Level".to_string()),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dxf(body: &str) -> String {
        format!("0\nSECTION\n2\nENTITIES\n{body}0\nENDSEC\n0\nEOF\n")
    }

    fn room_polyline(layer: &str) -> String {
        let mut s = format!("0\nLWPOLYLINE\n8\n{layer}\n90\n4\n70\n1\n");
        for (x, y) in [(0.0, 0.0), (5000.0, 0.0), (5000.0, 4000.0), (0.0, 4000.0)] {
            s.push_str(&format!("10\n{x}\n20\n{y}\n"));
        }
        s
    }

    #[test]
    fn test_room_on_room_layer() {
        let text = dxf(&room_polyline("ROOM"));
        let geometry = GeometryParser::new(&text).parse();
        assert_eq!(geometry.rooms.len(), 1);
        assert_eq!(geometry.rooms[0].vertices.len(), 4);
        assert_eq!(geometry.rooms[0].layer, "ROOM");
    }

    #[test]
    fn test_closed_polyline_accepted_without_room_layer() {
        let text = dxf(&room_polyline("A-AREA-07"));
        let geometry = GeometryParser::new(&text).parse();
        assert_eq!(geometry.rooms.len(), 1);
    }

    #[test]
    fn test_open_unnamed_polyline_rejected() {
        let body = "0\nLWPOLYLINE\n8\nSKETCH\n70\n0\n10\n0\n20\n0\n10\n9000\n20\n0\n10\n9000\n20\n7000\n";
        let text = dxf(body);
        let geometry = GeometryParser::new(&text).parse();
        assert!(geometry.rooms.is_empty());
    }

    #[test]
    fn test_tiny_polygon_is_noise() {
        // 50x50 mm square on a room layer: below the area floor
        let body = "0\nLWPOLYLINE\n8\nROOM\n70\n1\n10\n0\n20\n0\n10\n50\n20\n0\n10\n50\n20\n50\n10\n0\n20\n50\n";
        let text = dxf(body);
        let geometry = GeometryParser::new(&text).parse();
        assert!(geometry.rooms.is_empty());
    }

    #[test]
    fn test_malformed_vertex_dropped_entity_kept() {
        // Second vertex has a bad Y token; the remaining 4 still form a room
        let body = "0\nLWPOLYLINE\n8\nROOM\n70\n1\n\
            10\n0\n20\n0\n\
            10\n2500\n20\nnot-a-number\n\
            10\n5000\n20\n0\n\
            10\n5000\n20\n4000\n\
            10\n0\n20\n4000\n";
        let text = dxf(body);
        let geometry = GeometryParser::new(&text).parse();
        assert_eq!(geometry.rooms.len(), 1);
        assert_eq!(geometry.rooms[0].vertices.len(), 4);
    }

    #[test]
    fn test_wall_lines_and_noise_filter() {
        let body = "0\nLINE\n8\nWALL\n10\n0\n20\n0\n30\n0\n11\n4000\n21\n0\n31\n0\n\
            0\nLINE\n8\nWALL\n10\n0\n20\n0\n30\n0\n11\n50\n21\n0\n31\n0\n\
            0\nLINE\n8\nFURNITURE\n10\n0\n20\n0\n30\n0\n11\n4000\n21\n0\n31\n0\n";
        let text = dxf(body);
        let geometry = GeometryParser::new(&text).parse();
        assert_eq!(geometry.walls.len(), 1);
        assert_eq!(geometry.walls[0].length(), 4000.0);
    }

    #[test]
    fn test_wall_polyline_segments() {
        let body = "0\nLWPOLYLINE\n8\nWALL\n70\n0\n10\n0\n20\n0\n10\n3000\n20\n0\n10\n3000\n20\n2000\n";
        let text = dxf(body);
        let geometry = GeometryParser::new(&text).parse();
        assert_eq!(geometry.walls.len(), 2);
    }

    #[test]
    fn test_door_and_window_inserts() {
        let body = "0\nINSERT\n8\nDOOR\n2\nD-900\n10\n2500\n20\n0\n30\n0\n50\n0\n\
            0\nINSERT\n8\nARCH\n2\nFENSTER_120\n10\n1000\n20\n4000\n30\n0\n50\n180\n\
            0\nINSERT\n8\n0\n2\nSOFA\n10\n1\n20\n1\n";
        let text = dxf(body);
        let geometry = GeometryParser::new(&text).parse();
        assert_eq!(geometry.doors.len(), 1);
        assert_eq!(geometry.doors[0].block_name, "D-900");
        assert_eq!(geometry.windows.len(), 1);
        assert_eq!(geometry.windows[0].rotation_deg, 180.0);
    }

    #[test]
    fn test_floor_levels_default_ground() {
        let text = dxf(&room_polyline("ROOM"));
        let geometry = GeometryParser::new(&text).parse();
        assert_eq!(geometry.floor_levels.len(), 1);
        assert_eq!(geometry.floor_levels[0].elevation, 0.0);
        assert_eq!(geometry.floor_levels[0].name.as_deref(), Some("Ground Level"));
    }

    #[test]
    fn test_floor_levels_from_elevations() {
        let mut body = String::new();
        for (layer, elev) in [("ROOM_FLOOR_1", "3000"), ("ROOM_FLOOR_2", "6000")] {
            body.push_str(&format!("0\nLWPOLYLINE\n8\n{layer}\n38\n{elev}\n70\n1\n"));
            for (x, y) in [(0.0, 0.0), (5000.0, 0.0), (5000.0, 4000.0), (0.0, 4000.0)] {
                body.push_str(&format!("10\n{x}\n20\n{y}\n"));
            }
        }
        let text = dxf(&body);
        let geometry = GeometryParser::new(&text).parse();
        assert_eq!(geometry.floor_levels.len(), 2);
        assert_eq!(geometry.floor_levels[0].elevation, 3000.0);
        assert!(geometry.floor_levels[0].layer.is_some());
    }

    #[test]
    fn test_3d_detection() {
        let text = dxf("0\n3DFACE\n8\nWALL\n");
        assert!(GeometryParser::new(&text).parse().is_3d);
        let text = dxf(&room_polyline("ROOM"));
        assert!(!GeometryParser::new(&text).parse().is_3d);
    }
}
