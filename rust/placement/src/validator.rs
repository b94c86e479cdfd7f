// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Greedy placement validation
//!
//! Placements are submitted one at a time in generation order; each is
//! checked against the already-accepted set and either kept or dropped.
//! Acceptance therefore depends on submission order, which the pipeline
//! keeps deterministic. Rejections are logged, never fatal.

use tracing::debug;

use wireplan_core::{ComponentKind, Room};

use crate::types::{Placement, ValidationResult};

/// Minimum distance between two accepted placements of the same kind (mm).
fn same_kind_clearance(kind: ComponentKind) -> f64 {
    match kind {
        ComponentKind::Switch => 200.0,
        ComponentKind::Light => 1000.0,
        ComponentKind::Fan => 1500.0,
        ComponentKind::Socket => 500.0,
    }
}

/// Minimum distance between placements of different kinds (mm).
const CROSS_KIND_CLEARANCE: f64 = 300.0;

/// Order-dependent accumulator of accepted placements.
#[derive(Debug, Default)]
pub struct PlacementValidator {
    accepted: Vec<Placement>,
    rejected: usize,
}

impl PlacementValidator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a candidate against the accepted set and keep it if clear.
    ///
    /// `rooms` is the run's room list; when the candidate carries a room
    /// index, its position must fall inside (or on the boundary of) that
    /// room's polygon.
    pub fn submit(&mut self, placement: Placement, rooms: &[Room]) -> ValidationResult {
        if let Some(index) = placement.room {
            if let Some(room) = rooms.get(index) {
                let inside = room.contains_point_2d(&placement.position)
                    || room.distance_to_boundary(&placement.position) < 1.0;
                if !inside {
                    let result = ValidationResult::invalid(format!(
                        "{} at ({:.0}, {:.0}) outside room {}",
                        placement.component.as_str(),
                        placement.position.x,
                        placement.position.y,
                        room.layer,
                    ));
                    self.reject(&result);
                    return result;
                }
            }
        }

        for existing in &self.accepted {
            let distance = existing.position.distance_to(&placement.position);
            let required = if existing.component == placement.component {
                same_kind_clearance(placement.component)
            } else {
                CROSS_KIND_CLEARANCE
            };
            if distance < required {
                let result = ValidationResult::invalid(format!(
                    "{} at ({:.0}, {:.0}) within {:.0} mm of {} (required {:.0})",
                    placement.component.as_str(),
                    placement.position.x,
                    placement.position.y,
                    distance,
                    existing.component.as_str(),
                    required,
                ));
                self.reject(&result);
                return result;
            }
        }

        let result = ValidationResult::valid(format!(
            "{} accepted at ({:.0}, {:.0})",
            placement.component.as_str(),
            placement.position.x,
            placement.position.y,
        ));
        self.accepted.push(placement);
        result
    }

    fn reject(&mut self, result: &ValidationResult) {
        self.rejected += 1;
        debug!(reason = %result.message, "placement rejected");
    }

    pub fn accepted(&self) -> &[Placement] {
        &self.accepted
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected
    }

    /// Consume the validator, yielding accepted placements in submission
    /// order.
    pub fn into_accepted(self) -> Vec<Placement> {
        self.accepted
    }
}
