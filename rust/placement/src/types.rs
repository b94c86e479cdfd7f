// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Placement records, run options and run statistics

use serde::{Deserialize, Serialize};

use wireplan_core::{ComponentKind, Point3, RoomClass};

/// Which rule produced a placement, with the informational fields that
/// rule carries. A closed set instead of a free-form metadata map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum PlacementRuleTag {
    /// Light at room centroid or in a room-spanning grid.
    CentroidOrGrid {
        room_layer: String,
        room_class: Option<RoomClass>,
        floor_level: f64,
    },
    /// One ceiling light per door when no rooms were detected.
    #[serde(rename = "one_light_per_door_fallback")]
    LightPerDoorFallback { floor_level: f64 },
    /// Coarse light grid over the wall bounding box, no rooms detected.
    #[serde(rename = "fallback_grid_over_plan")]
    GridOverPlanFallback { floor_level: f64 },
    /// Switch on the wall near a door, on the swing side.
    NearDoorOnWall {
        door_position: (f64, f64),
        door_rotation_deg: f64,
        height: f64,
    },
    /// Rotation-derived switch offset when no wall or room resolves.
    #[serde(rename = "one_switch_per_door_fallback")]
    DoorOffsetFallback {
        door_position: (f64, f64),
        door_rotation_deg: f64,
        height: f64,
    },
    /// Fan at the room's ceiling center.
    CeilingCenter {
        room_layer: String,
        room_class: Option<RoomClass>,
        floor_level: f64,
    },
    /// Sockets distributed along room walls at standard spacing.
    #[serde(rename = "along_walls_standard_spacing")]
    AlongWalls {
        room_layer: String,
        room_class: Option<RoomClass>,
        floor_level: f64,
        height: f64,
    },
}

impl PlacementRuleTag {
    pub fn name(&self) -> &'static str {
        match self {
            PlacementRuleTag::CentroidOrGrid { .. } => "centroid_or_grid",
            PlacementRuleTag::LightPerDoorFallback { .. } => "one_light_per_door_fallback",
            PlacementRuleTag::GridOverPlanFallback { .. } => "fallback_grid_over_plan",
            PlacementRuleTag::NearDoorOnWall { .. } => "near_door_on_wall",
            PlacementRuleTag::DoorOffsetFallback { .. } => "one_switch_per_door_fallback",
            PlacementRuleTag::CeilingCenter { .. } => "ceiling_center",
            PlacementRuleTag::AlongWalls { .. } => "along_walls_standard_spacing",
        }
    }
}

/// One placed electrical component.
///
/// `room` is a non-owning association: an index into the run's
/// `Geometry::rooms`, used for boundary checks and reporting only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placement {
    pub position: Point3,
    pub component: ComponentKind,
    pub room: Option<usize>,
    pub rotation_deg: f64,
    pub rule: PlacementRuleTag,
}

/// Diagnostic outcome of a single validation step. Informational only;
/// rejections never abort a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub message: String,
}

impl ValidationResult {
    pub fn valid(message: impl Into<String>) -> Self {
        Self {
            is_valid: true,
            message: message.into(),
        }
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            message: message.into(),
        }
    }
}

/// Per-run placement options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlacementOptions {
    pub lights_per_room: usize,
    pub switches_per_door: usize,
    pub fans_per_room: usize,
    pub sockets_enabled: bool,
    /// Socket spacing along walls in mm; `None` for the 3000 mm default.
    pub socket_spacing: Option<f64>,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self {
            lights_per_room: 1,
            switches_per_door: 1,
            fans_per_room: 0,
            sockets_enabled: true,
            socket_spacing: None,
        }
    }
}

/// Accepted placements per component kind.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PlacementCounts {
    pub lights: usize,
    pub switches: usize,
    pub fans: usize,
    pub sockets: usize,
}

/// Room classification counts, including rooms the heuristic left
/// unclassified.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct RoomTypeCounts {
    #[serde(rename = "ROOM")]
    pub room: usize,
    #[serde(rename = "HALL")]
    pub hall: usize,
    #[serde(rename = "OPEN_AREA")]
    pub open_area: usize,
    #[serde(rename = "UNCLASSIFIED")]
    pub unclassified: usize,
}

/// Summary statistics for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStats {
    pub rooms_detected: usize,
    pub walls_detected: usize,
    pub doors_detected: usize,
    pub windows_detected: usize,
    pub floor_levels: usize,
    pub is_3d: bool,
    pub placements: PlacementCounts,
    pub total_placements: usize,
    pub room_types: RoomTypeCounts,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_type_counts_serialize_with_report_keys() {
        let counts = RoomTypeCounts {
            room: 3,
            hall: 1,
            open_area: 0,
            unclassified: 2,
        };
        let json = serde_json::to_value(&counts).unwrap();
        assert_eq!(json["ROOM"], 3);
        assert_eq!(json["HALL"], 1);
        assert_eq!(json["OPEN_AREA"], 0);
        assert_eq!(json["UNCLASSIFIED"], 2);
    }

    #[test]
    fn test_rule_tag_names() {
        let tag = PlacementRuleTag::CentroidOrGrid {
            room_layer: "ROOM_1".into(),
            room_class: Some(RoomClass::Room),
            floor_level: 0.0,
        };
        assert_eq!(tag.name(), "centroid_or_grid");
        let json = serde_json::to_value(&tag).unwrap();
        assert_eq!(json["rule"], "centroid_or_grid");
        assert_eq!(json["room_layer"], "ROOM_1");
    }
}
