// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement pipeline orchestration
//!
//! Single pass per drawing: parse geometry, classify rooms, generate
//! candidates in a fixed order (lights, switches, fans, sockets), run
//! them through the greedy validator, splice the survivors into the
//! output drawing. [`run`] is the pure text-to-text core; [`process`]
//! wraps it with file I/O.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info};

use wireplan_core::{parse_geometry, ComponentKind, Geometry, Point3};
use wireplan_spatial::{classify_rooms, SpatialAnalyzer, DEFAULT_CEILING_HEIGHT};

use crate::output::OutputAssembler;
use crate::rules::{PlacementRules, SOCKET_HEIGHT, SWITCH_HEIGHT};
use crate::types::{
    Placement, PlacementCounts, PlacementOptions, PlacementRuleTag, RoomTypeCounts, RunStats,
};
use crate::validator::PlacementValidator;

/// Grid cells per axis for the room-less light fallback.
const FALLBACK_GRID_CELLS: usize = 4;

/// Along-wall offset for the room-less switch fallback (mm).
const FALLBACK_SWITCH_OFFSET: f64 = 200.0;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/// Run the full pipeline on drawing text. Returns the output drawing and
/// the run statistics. Infallible: an unreadable or empty drawing yields
/// an unmodified (or near-unmodified) drawing and zero placements.
pub fn run(input: &str, options: &PlacementOptions) -> (String, RunStats) {
    let mut geometry = parse_geometry(input);
    classify_rooms(&mut geometry);

    info!(
        rooms = geometry.rooms.len(),
        walls = geometry.walls.len(),
        doors = geometry.doors.len(),
        windows = geometry.windows.len(),
        is_3d = geometry.is_3d,
        "geometry parsed"
    );

    let analyzer = SpatialAnalyzer::new(&geometry);
    let rules = PlacementRules::new(&geometry, &analyzer);

    let candidates = generate_candidates(&geometry, &analyzer, &rules, options);
    debug!(candidates = candidates.len(), "candidate generation done");

    let mut validator = PlacementValidator::new();
    for candidate in candidates {
        validator.submit(candidate, &geometry.rooms);
    }
    info!(
        accepted = validator.accepted().len(),
        rejected = validator.rejected_count(),
        "validation done"
    );

    let accepted = validator.into_accepted();
    let stats = compile_stats(&geometry, &accepted);

    let mut assembler = OutputAssembler::new();
    assembler.add_placements(accepted);
    let output = assembler.assemble(input);

    (output, stats)
}

/// File-to-file wrapper around [`run`].
pub fn process(input: &Path, output: &Path, options: &PlacementOptions) -> Result<RunStats> {
    let text = fs::read_to_string(input).map_err(|source| Error::Read {
        path: input.to_path_buf(),
        source,
    })?;

    let (assembled, stats) = run(&text, options);

    fs::write(output, assembled).map_err(|source| Error::Write {
        path: output.to_path_buf(),
        source,
    })?;

    info!(
        output = %output.display(),
        total = stats.total_placements,
        "output written"
    );
    Ok(stats)
}

/// All placement candidates in submission order: lights per room (or the
/// room-less fallbacks), switches per door, fans per room, sockets per
/// room. The validator's greedy acceptance depends on this order, so it
/// is fixed.
fn generate_candidates(
    geometry: &Geometry,
    analyzer: &SpatialAnalyzer<'_>,
    rules: &PlacementRules<'_>,
    options: &PlacementOptions,
) -> Vec<Placement> {
    let mut candidates = Vec::new();

    // 1) Lights. Per-room generation is independent, so it runs in
    // parallel; the indexed collect keeps room order.
    if !geometry.rooms.is_empty() {
        let per_room: Vec<Vec<Point3>> = geometry
            .rooms
            .par_iter()
            .map(|room| rules.place_lights_for_room(room, options.lights_per_room))
            .collect();

        for (index, positions) in per_room.into_iter().enumerate() {
            let room = &geometry.rooms[index];
            for position in positions {
                candidates.push(Placement {
                    position,
                    component: ComponentKind::Light,
                    room: Some(index),
                    rotation_deg: 0.0,
                    rule: PlacementRuleTag::CentroidOrGrid {
                        room_layer: room.layer.clone(),
                        room_class: room.class,
                        floor_level: room.floor_level,
                    },
                });
            }
        }
    } else {
        // No rooms: one ceiling light over each door, plus a coarse grid
        // across the wall extents
        for door in &geometry.doors {
            candidates.push(Placement {
                position: Point3::new(door.position.x, door.position.y, DEFAULT_CEILING_HEIGHT),
                component: ComponentKind::Light,
                room: None,
                rotation_deg: 0.0,
                rule: PlacementRuleTag::LightPerDoorFallback { floor_level: 0.0 },
            });
        }
        candidates.extend(fallback_grid_lights(geometry));
    }

    // 2) Switches, one group per door
    for door in &geometry.doors {
        let room_index = analyzer.find_room_for_point(&door.position).or_else(|| {
            geometry.rooms.iter().position(|room| {
                analyzer
                    .find_doors_for_room(room)
                    .iter()
                    .any(|d| std::ptr::eq(*d, door))
            })
        });

        match room_index {
            Some(index) => {
                let room = &geometry.rooms[index];
                for position in rules.place_switches_for_door(door, room, options.switches_per_door)
                {
                    candidates.push(Placement {
                        position,
                        component: ComponentKind::Switch,
                        room: Some(index),
                        rotation_deg: door.rotation_deg,
                        rule: PlacementRuleTag::NearDoorOnWall {
                            door_position: (door.position.x, door.position.y),
                            door_rotation_deg: door.rotation_deg,
                            height: SWITCH_HEIGHT,
                        },
                    });
                }
            }
            None => {
                // Offset along the rotation-derived wall direction, at
                // absolute mounting height
                let theta = (door.rotation_deg + 90.0).to_radians();
                candidates.push(Placement {
                    position: Point3::new(
                        door.position.x + theta.cos() * FALLBACK_SWITCH_OFFSET,
                        door.position.y + theta.sin() * FALLBACK_SWITCH_OFFSET,
                        SWITCH_HEIGHT,
                    ),
                    component: ComponentKind::Switch,
                    room: None,
                    rotation_deg: door.rotation_deg,
                    rule: PlacementRuleTag::DoorOffsetFallback {
                        door_position: (door.position.x, door.position.y),
                        door_rotation_deg: door.rotation_deg,
                        height: SWITCH_HEIGHT,
                    },
                });
            }
        }
    }

    // 3) Fans and sockets are room-bound; without rooms there are none
    if !geometry.rooms.is_empty() {
        for (index, room) in geometry.rooms.iter().enumerate() {
            for position in rules.place_fans_for_room(room, options.fans_per_room) {
                candidates.push(Placement {
                    position,
                    component: ComponentKind::Fan,
                    room: Some(index),
                    rotation_deg: 0.0,
                    rule: PlacementRuleTag::CeilingCenter {
                        room_layer: room.layer.clone(),
                        room_class: room.class,
                        floor_level: room.floor_level,
                    },
                });
            }
        }

        if options.sockets_enabled {
            for (index, room) in geometry.rooms.iter().enumerate() {
                for position in rules.place_sockets_for_room(room, options.socket_spacing) {
                    candidates.push(Placement {
                        position,
                        component: ComponentKind::Socket,
                        room: Some(index),
                        rotation_deg: 0.0,
                        rule: PlacementRuleTag::AlongWalls {
                            room_layer: room.layer.clone(),
                            room_class: room.class,
                            floor_level: room.floor_level,
                            height: SOCKET_HEIGHT,
                        },
                    });
                }
            }
        }
    }

    candidates
}

/// Coarse 4x4 light grid over the bounding box of all wall endpoints.
/// Empty when there are no walls or the extents are degenerate.
fn fallback_grid_lights(geometry: &Geometry) -> Vec<Placement> {
    let mut placements = Vec::new();
    if geometry.walls.is_empty() {
        return placements;
    }

    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    for wall in &geometry.walls {
        for p in [&wall.start, &wall.end] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
    }

    let step_x = (max_x - min_x) / (FALLBACK_GRID_CELLS + 1) as f64;
    let step_y = (max_y - min_y) / (FALLBACK_GRID_CELLS + 1) as f64;
    if step_x <= 0.0 || step_y <= 0.0 {
        return placements;
    }

    for i in 1..=FALLBACK_GRID_CELLS {
        for j in 1..=FALLBACK_GRID_CELLS {
            placements.push(Placement {
                position: Point3::new(
                    min_x + step_x * i as f64,
                    min_y + step_y * j as f64,
                    DEFAULT_CEILING_HEIGHT,
                ),
                component: ComponentKind::Light,
                room: None,
                rotation_deg: 0.0,
                rule: PlacementRuleTag::GridOverPlanFallback { floor_level: 0.0 },
            });
        }
    }
    placements
}

fn compile_stats(geometry: &Geometry, accepted: &[Placement]) -> RunStats {
    let mut counts = PlacementCounts::default();
    for placement in accepted {
        match placement.component {
            ComponentKind::Light => counts.lights += 1,
            ComponentKind::Switch => counts.switches += 1,
            ComponentKind::Fan => counts.fans += 1,
            ComponentKind::Socket => counts.sockets += 1,
        }
    }

    let mut room_types = RoomTypeCounts::default();
    for room in &geometry.rooms {
        match room.class {
            Some(wireplan_core::RoomClass::Room) => room_types.room += 1,
            Some(wireplan_core::RoomClass::Hall) => room_types.hall += 1,
            Some(wireplan_core::RoomClass::OpenArea) => room_types.open_area += 1,
            None => room_types.unclassified += 1,
        }
    }

    RunStats {
        rooms_detected: geometry.rooms.len(),
        walls_detected: geometry.walls.len(),
        doors_detected: geometry.doors.len(),
        windows_detected: geometry.windows.len(),
        floor_levels: geometry.floor_levels.len(),
        is_3d: geometry.is_3d,
        placements: counts,
        total_placements: accepted.len(),
        room_types,
    }
}
