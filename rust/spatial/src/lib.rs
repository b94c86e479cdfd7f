// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wireplan Spatial Analysis
//!
//! Spatial queries over a parsed [`Geometry`](wireplan_core::Geometry):
//! room classification, point-in-room lookup, wall association, door
//! swing sides and placement exclusion zones.

pub mod analyzer;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point2, Vector2};

pub use analyzer::{classify_room_type, classify_rooms, SpatialAnalyzer, DEFAULT_CEILING_HEIGHT};
