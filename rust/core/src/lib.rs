// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Wireplan Core
//!
//! Recovery-oriented parser for the group-coded CAD exchange format.
//! Extracts rooms, walls, doors, windows and floor levels from a drawing's
//! record stream without requiring a well-formed document.
//!
//! ## Overview
//!
//! This crate provides the lowest two layers of the wireplan pipeline:
//!
//! - **Record Scanning**: tokenization of the drawing into `(code, value)`
//!   record pairs and named SECTION ranges
//! - **Geometry Recovery**: per-family linear scans that rebuild a
//!   [`Geometry`] snapshot, with wall-graph room inference when no explicit
//!   room polygons exist
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wireplan_core::{parse_geometry, RecordScanner};
//!
//! let text = std::fs::read_to_string("plan.dxf")?;
//! let geometry = parse_geometry(&text);
//! println!("rooms: {}", geometry.rooms.len());
//!
//! // Or walk the raw record stream
//! let scanner = RecordScanner::new(&text);
//! for record in scanner.records() {
//!     println!("{} = {}", record.code, record.value);
//! }
//! ```
//!
//! ## Failure policy
//!
//! Malformed numeric fields are dropped per-field, absent sections report
//! as "not present", and a structurally odd drawing still yields a
//! (possibly empty) [`Geometry`]. Only caller misuse is an error.

pub mod error;
pub mod infer;
pub mod keywords;
pub mod model;
pub mod parser;
pub mod scanner;
pub mod source;

pub use error::{Error, Result};
pub use model::{
    ComponentKind, Door, FloorLevel, Geometry, Point3, Room, RoomClass, SwingDir, Wall, Window,
};
pub use parser::GeometryParser;
pub use scanner::{Record, RecordScanner};
pub use source::{parse_geometry, GeometrySource, ScannerSource};
