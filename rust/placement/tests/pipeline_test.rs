// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end pipeline runs over synthetic drawings.

use wireplan_placement::{run, PlacementOptions};

/// 5 m x 4 m room with four boundary walls, a door centered on the south
/// wall and a window near the north wall.
fn furnished_plan() -> String {
    let mut body = String::new();

    body.push_str("0\nLWPOLYLINE\n8\nROOM\n70\n1\n");
    for (x, y) in [(0, 0), (5000, 0), (5000, 4000), (0, 4000)] {
        body.push_str(&format!("10\n{x}\n20\n{y}\n"));
    }

    for (x1, y1, x2, y2) in [
        (0, 0, 5000, 0),
        (5000, 0, 5000, 4000),
        (5000, 4000, 0, 4000),
        (0, 4000, 0, 0),
    ] {
        body.push_str(&format!(
            "0\nLINE\n8\nWALL\n10\n{x1}\n20\n{y1}\n30\n0\n11\n{x2}\n21\n{y2}\n31\n0\n"
        ));
    }

    body.push_str("0\nINSERT\n8\nDOOR\n2\nD-900\n10\n2500\n20\n0\n30\n0\n50\n0\n");
    body.push_str("0\nINSERT\n8\nWINDOW\n2\nW-120\n10\n2000\n20\n3900\n30\n0\n50\n180\n");

    format!(
        "0\nSECTION\n2\nBLOCKS\n0\nENDSEC\n0\nSECTION\n2\nENTITIES\n{body}0\nENDSEC\n0\nEOF\n"
    )
}

#[test]
fn furnished_room_full_run() {
    let (output, stats) = run(&furnished_plan(), &PlacementOptions::default());

    assert_eq!(stats.rooms_detected, 1);
    assert_eq!(stats.walls_detected, 4);
    assert_eq!(stats.doors_detected, 1);
    assert_eq!(stats.windows_detected, 1);
    assert!(!stats.is_3d);
    assert_eq!(stats.room_types.room, 1);

    // One light at the centroid, one switch near the door, no fans by
    // default, and three sockets (the south-wall candidate sits within
    // the door clearance and is dropped)
    assert_eq!(stats.placements.lights, 1);
    assert_eq!(stats.placements.switches, 1);
    assert_eq!(stats.placements.fans, 0);
    assert_eq!(stats.placements.sockets, 3);
    assert_eq!(stats.total_placements, 5);

    // Light INSERT at the centroid, on the electrical layer
    assert!(output.contains("ELECTRICAL_LIGHTS"));
    assert!(output.contains("2500.000000"));
    assert!(output.contains("ELECTRICAL_SWITCHES"));
    assert!(output.contains("ELECTRICAL_SOCKETS"));
    // Block definitions were spliced in
    assert!(output.contains("0\nBLOCK\n2\nLIGHT_BLOCK"));
}

#[test]
fn fan_at_centroid_loses_to_light() {
    // With one light at the centroid already accepted, a fan requested at
    // the same ceiling point fails the cross-kind clearance
    let options = PlacementOptions {
        fans_per_room: 1,
        ..PlacementOptions::default()
    };
    let (_, stats) = run(&furnished_plan(), &options);
    assert_eq!(stats.placements.lights, 1);
    assert_eq!(stats.placements.fans, 0);
}

#[test]
fn rooms_inferred_from_wall_graph() {
    // Same plan but without the room polyline: the wall graph closes a
    // single rectangular face, which drives normal room-based placement
    let mut body = String::new();
    for (x1, y1, x2, y2) in [
        (0, 0, 5000, 0),
        (5000, 0, 5000, 4000),
        (5000, 4000, 0, 4000),
        (0, 4000, 0, 0),
    ] {
        body.push_str(&format!(
            "0\nLINE\n8\nWALL\n10\n{x1}\n20\n{y1}\n30\n0\n11\n{x2}\n21\n{y2}\n31\n0\n"
        ));
    }
    let text = format!(
        "0\nSECTION\n2\nBLOCKS\n0\nENDSEC\n0\nSECTION\n2\nENTITIES\n{body}0\nENDSEC\n0\nEOF\n"
    );

    let (_, stats) = run(&text, &PlacementOptions::default());
    assert_eq!(stats.rooms_detected, 1);
    assert_eq!(stats.placements.lights, 1);
    // No door blocks any wall, so every wall carries one socket
    assert_eq!(stats.placements.sockets, 4);
}

#[test]
fn reprocessing_keeps_block_definitions_unique() {
    let (first, _) = run(&furnished_plan(), &PlacementOptions::default());
    let (second, _) = run(&first, &PlacementOptions::default());

    for block in ["LIGHT_BLOCK", "SWITCH_BLOCK", "FAN_BLOCK", "SOCKET_BLOCK"] {
        let needle = format!("0\nBLOCK\n2\n{block}");
        assert_eq!(second.matches(&needle).count(), 1, "{block} duplicated");
    }
}

#[test]
fn door_only_plan_uses_fallbacks() {
    // No rooms, no walls: a ceiling light over the door and a
    // rotation-derived switch offset
    let text = "0\nSECTION\n2\nBLOCKS\n0\nENDSEC\n0\nSECTION\n2\nENTITIES\n\
        0\nINSERT\n8\nDOOR\n2\nD-900\n10\n2500\n20\n0\n30\n0\n50\n0\n\
        0\nENDSEC\n0\nEOF\n";

    let (output, stats) = run(text, &PlacementOptions::default());
    assert_eq!(stats.rooms_detected, 0);
    assert_eq!(stats.placements.lights, 1);
    assert_eq!(stats.placements.switches, 1);
    assert_eq!(stats.placements.sockets, 0);
    assert_eq!(stats.placements.fans, 0);

    // Light directly above the door at the fallback ceiling height;
    // switch 200 mm along the rotation-derived wall direction
    assert!(output.contains("2700.000000"));
    assert!(output.contains("200.000000"));
}

#[test]
fn duplicate_rooms_collapse_to_one_light() {
    // Two identical room polygons produce coincident light candidates;
    // the greedy validator keeps only the first
    let mut room = String::from("0\nLWPOLYLINE\n8\nROOM\n70\n1\n");
    for (x, y) in [(0, 0), (5000, 0), (5000, 4000), (0, 4000)] {
        room.push_str(&format!("10\n{x}\n20\n{y}\n"));
    }
    let text = format!(
        "0\nSECTION\n2\nBLOCKS\n0\nENDSEC\n0\nSECTION\n2\nENTITIES\n{room}{room}0\nENDSEC\n0\nEOF\n"
    );

    let (_, stats) = run(&text, &PlacementOptions::default());
    assert_eq!(stats.rooms_detected, 2);
    assert_eq!(stats.placements.lights, 1);
}

#[test]
fn non_drawing_input_passes_through() {
    let input = "not\na\ndrawing\n";
    let (output, stats) = run(input, &PlacementOptions::default());
    assert_eq!(output, input);
    assert_eq!(stats.total_placements, 0);
    // A synthesized ground level always exists
    assert_eq!(stats.floor_levels, 1);
}

#[test]
fn sockets_can_be_disabled() {
    let options = PlacementOptions {
        sockets_enabled: false,
        ..PlacementOptions::default()
    };
    let (_, stats) = run(&furnished_plan(), &options);
    assert_eq!(stats.placements.sockets, 0);
    assert_eq!(stats.placements.lights, 1);
}
