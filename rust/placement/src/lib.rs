// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! # Wireplan Placement Pipeline
//!
//! Deterministic, rule-based placement of electrical components — lights,
//! switches, fans, sockets — over geometry recovered from a CAD drawing.
//!
//! The pipeline is synchronous and single-pass: parse → classify →
//! place → validate → assemble. Each invocation owns its geometry and
//! validator; nothing is shared across runs.
//!
//! ```rust,ignore
//! use wireplan_placement::{process, PlacementOptions};
//!
//! let stats = process("plan.dxf".as_ref(), "plan_out.dxf".as_ref(), &PlacementOptions::default())?;
//! println!("{} placements", stats.total_placements);
//! ```

pub mod output;
pub mod pipeline;
pub mod rules;
pub mod types;
pub mod validator;

pub use output::OutputAssembler;
pub use pipeline::{process, run, Error, Result};
pub use rules::PlacementRules;
pub use types::{
    Placement, PlacementCounts, PlacementOptions, PlacementRuleTag, RoomTypeCounts, RunStats,
    ValidationResult,
};
pub use validator::PlacementValidator;
