// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Layer and block-name keyword matching
//!
//! Plan layer naming varies by author locale, so every concept carries
//! several natural-language variants. All matching is case-insensitive
//! substring matching against the uppercased name.

/// Layer names that indicate a room boundary polyline.
pub const ROOM_KEYWORDS: &[&str] = &[
    "ROOM", "RAUM", "ZIMMER", "PIECE", "CHAMBRE", "HABITACION", "SALA", "STANZA", "KAMER",
];

/// Names that must NOT be treated as rooms even when a room keyword would
/// otherwise collide (e.g. "BADEZIMMER_WAND" contains "ZIMMER").
pub const ROOM_EXCLUSIONS: &[&str] = &[
    "DOOR", "PORTE", "PUERTA", "PORTA", "DEUR", "WINDOW", "FENSTER", "FENETRE", "VENTANA",
    "WALL", "WAND", "MUR", "PARED", "BEAM", "COLUMN", "SLAB", "STAIR",
];

/// Layer names that indicate wall segments.
pub const WALL_KEYWORDS: &[&str] = &["WALL", "WAND", "MUR", "MURO", "PARED"];

/// Layer or block names that indicate a door insertion.
pub const DOOR_KEYWORDS: &[&str] = &["DOOR", "TUER", "PORTE", "PUERTA", "PORTA", "DEUR"];

/// Layer or block names that indicate a window insertion.
pub const WINDOW_KEYWORDS: &[&str] = &[
    "WINDOW", "FENSTER", "FENETRE", "VENTANA", "FINESTRA", "RAAM",
];

/// Hall / corridor indicators for room classification.
pub const HALL_KEYWORDS: &[&str] = &[
    "HALL", "CORRIDOR", "CORR", "PASSAGE", "LOBBY", "FOYER", "LIFTL", "FLUR", "COULOIR",
];

/// Open-area indicators for room classification.
pub const OPEN_AREA_KEYWORDS: &[&str] = &["OPEN", "ATRIUM", "COURT", "VOID", "PATIO"];

/// Bathroom indicators (fan exclusion).
pub const BATHROOM_KEYWORDS: &[&str] = &["BATH", "WC", "TOILET", "BAD", "BAIN", "BANO", "DUSCHE"];

/// Case-insensitive substring match against a keyword set.
pub fn matches_any(name: &str, keywords: &[&str]) -> bool {
    let upper = name.to_ascii_uppercase();
    keywords.iter().any(|k| upper.contains(k))
}

/// True when a layer name indicates a room and is not on the exclusion list.
pub fn is_room_layer(layer: &str) -> bool {
    matches_any(layer, ROOM_KEYWORDS) && !matches_any(layer, ROOM_EXCLUSIONS)
}

/// True when a layer name indicates a wall.
pub fn is_wall_layer(layer: &str) -> bool {
    matches_any(layer, WALL_KEYWORDS)
}

/// True when an insertion's layer or block name indicates a door.
pub fn is_door_insert(layer: &str, block_name: &str) -> bool {
    matches_any(layer, DOOR_KEYWORDS) || matches_any(block_name, DOOR_KEYWORDS)
}

/// True when an insertion's layer or block name indicates a window.
pub fn is_window_insert(layer: &str, block_name: &str) -> bool {
    matches_any(layer, WINDOW_KEYWORDS) || matches_any(block_name, WINDOW_KEYWORDS)
}
