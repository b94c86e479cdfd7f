// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Drawing output assembly
//!
//! Splices accepted placements back into the source drawing text:
//! component symbol definitions into the BLOCKS section (only those not
//! already present), one INSERT per placement into the ENTITIES section.
//! Everything outside those splice points passes through byte-for-byte.
//! A drawing missing either section is returned unchanged rather than
//! rejected.

use std::borrow::Cow;

use rustc_hash::FxHashSet;
use tracing::{debug, warn};

use wireplan_core::ComponentKind;

use crate::types::Placement;

/// Symbol geometry for each component kind, as flat group-code/value
/// line pairs ready to splice into BLOCKS.
const SWITCH_BLOCK_DEF: &[&str] = &[
    "0", "BLOCK", "2", "SWITCH_BLOCK", "70", "0", "10", "0", "20", "0", "30", "0", "3",
    "SWITCH_BLOCK", "1", "", //
    "0", "CIRCLE", "8", "0", "10", "0", "20", "0", "40", "50", //
    "0", "LINE", "8", "0", "10", "-30", "20", "0", "11", "30", "21", "0", //
    "0", "ENDBLK",
];

const LIGHT_BLOCK_DEF: &[&str] = &[
    "0", "BLOCK", "2", "LIGHT_BLOCK", "70", "0", "10", "0", "20", "0", "30", "0", "3",
    "LIGHT_BLOCK", "1", "", //
    "0", "CIRCLE", "8", "0", "10", "0", "20", "0", "40", "100", //
    "0", "CIRCLE", "8", "0", "10", "0", "20", "0", "40", "150", //
    "0", "ENDBLK",
];

const FAN_BLOCK_DEF: &[&str] = &[
    "0", "BLOCK", "2", "FAN_BLOCK", "70", "0", "10", "0", "20", "0", "30", "0", "3", "FAN_BLOCK",
    "1", "", //
    "0", "CIRCLE", "8", "0", "10", "0", "20", "0", "40", "300", //
    "0", "LINE", "8", "0", "10", "-300", "20", "0", "11", "300", "21", "0", //
    "0", "LINE", "8", "0", "10", "0", "20", "-300", "11", "0", "21", "300", //
    "0", "ENDBLK",
];

const SOCKET_BLOCK_DEF: &[&str] = &[
    "0", "BLOCK", "2", "SOCKET_BLOCK", "70", "0", "10", "0", "20", "0", "30", "0", "3",
    "SOCKET_BLOCK", "1", "", //
    "0", "RECTANGLE", "8", "0", "10", "-25", "20", "-15", "11", "25", "21", "15", //
    "0", "CIRCLE", "8", "0", "10", "-15", "20", "0", "40", "8", //
    "0", "CIRCLE", "8", "0", "10", "15", "20", "0", "40", "8", //
    "0", "ENDBLK",
];

fn block_definition(kind: ComponentKind) -> &'static [&'static str] {
    match kind {
        ComponentKind::Switch => SWITCH_BLOCK_DEF,
        ComponentKind::Light => LIGHT_BLOCK_DEF,
        ComponentKind::Fan => FAN_BLOCK_DEF,
        ComponentKind::Socket => SOCKET_BLOCK_DEF,
    }
}

/// Kinds in splice order. Fixed so output is stable across runs.
const ALL_KINDS: [ComponentKind; 4] = [
    ComponentKind::Switch,
    ComponentKind::Light,
    ComponentKind::Fan,
    ComponentKind::Socket,
];

/// Splices placements into a drawing's text.
#[derive(Debug, Default)]
pub struct OutputAssembler {
    placements: Vec<Placement>,
}

impl OutputAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_placement(&mut self, placement: Placement) {
        self.placements.push(placement);
    }

    pub fn add_placements(&mut self, placements: impl IntoIterator<Item = Placement>) {
        self.placements.extend(placements);
    }

    /// Produce the output drawing text. The input is never mutated; the
    /// result reuses its lines and inserts new ones at the two splice
    /// points.
    pub fn assemble(&self, input: &str) -> String {
        let mut lines: Vec<Cow<'_, str>> = input.lines().map(Cow::Borrowed).collect();

        self.ensure_block_definitions(&mut lines);
        self.insert_placements(&mut lines);

        let mut out = String::with_capacity(input.len() + self.placements.len() * 64);
        for line in &lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    /// Add missing symbol definitions before the BLOCKS ENDSEC. Names
    /// already defined (case-insensitive) are left alone, so reprocessing
    /// an already-assembled drawing does not duplicate them.
    fn ensure_block_definitions(&self, lines: &mut Vec<Cow<'_, str>>) {
        let (start, mut end) = match find_section(lines, "BLOCKS") {
            Some(range) => range,
            None => {
                warn!("no BLOCKS section, skipping symbol definitions");
                return;
            }
        };

        let mut existing: FxHashSet<String> = FxHashSet::default();
        let mut i = start;
        while i + 1 < end {
            if lines[i].trim() == "2" {
                existing.insert(lines[i + 1].trim().to_uppercase());
            }
            i += 2;
        }

        for kind in ALL_KINDS {
            if existing.contains(kind.block_name()) {
                continue;
            }
            let def = block_definition(kind);
            debug!(block = kind.block_name(), "adding symbol definition");
            lines.splice(end..end, def.iter().map(|s| Cow::Borrowed(*s)));
            end += def.len();
        }
    }

    /// Append one INSERT per placement before the ENTITIES ENDSEC, in
    /// placement order.
    fn insert_placements(&self, lines: &mut Vec<Cow<'_, str>>) {
        let (_, end) = match find_section(lines, "ENTITIES") {
            Some(range) => range,
            None => {
                if !self.placements.is_empty() {
                    warn!(
                        count = self.placements.len(),
                        "no ENTITIES section, placements not written"
                    );
                }
                return;
            }
        };

        let mut records: Vec<Cow<'_, str>> = Vec::with_capacity(self.placements.len() * 18);
        for placement in &self.placements {
            records.push(Cow::Borrowed("0"));
            records.push(Cow::Borrowed("INSERT"));
            records.push(Cow::Borrowed("8"));
            records.push(Cow::Borrowed(placement.component.layer_name()));
            records.push(Cow::Borrowed("2"));
            records.push(Cow::Borrowed(placement.component.block_name()));
            records.push(Cow::Borrowed("10"));
            records.push(Cow::Owned(format!("{:.6}", placement.position.x)));
            records.push(Cow::Borrowed("20"));
            records.push(Cow::Owned(format!("{:.6}", placement.position.y)));
            records.push(Cow::Borrowed("30"));
            records.push(Cow::Owned(format!("{:.6}", placement.position.z)));
            records.push(Cow::Borrowed("50"));
            records.push(Cow::Owned(format!("{:.6}", placement.rotation_deg)));
            records.push(Cow::Borrowed("100"));
            records.push(Cow::Borrowed("AcDbEntity"));
            records.push(Cow::Borrowed("100"));
            records.push(Cow::Borrowed("AcDbBlockReference"));
        }

        lines.splice(end..end, records);
    }
}

/// Line indices `(start, end)` of a section's body: `start` is the first
/// line after the `0 SECTION / 2 <name>` header, `end` is the line index
/// of the closing `0` of `0 ENDSEC`. `None` when the section is missing
/// or unterminated.
fn find_section(lines: &[Cow<'_, str>], name: &str) -> Option<(usize, usize)> {
    let mut start = None;
    let mut i = 0;
    while i + 1 < lines.len() {
        if start.is_none() {
            if i + 3 < lines.len()
                && lines[i].trim() == "0"
                && lines[i + 1].trim() == "SECTION"
                && lines[i + 2].trim() == "2"
                && lines[i + 3].trim() == name
            {
                start = Some(i + 4);
                i += 4;
                continue;
            }
        } else if lines[i].trim() == "0" && lines[i + 1].trim() == "ENDSEC" {
            return Some((start.unwrap_or(0), i));
        }
        i += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PlacementRuleTag;
    use wireplan_core::Point3;

    fn minimal_drawing() -> String {
        [
            "0", "SECTION", "2", "BLOCKS", "0", "ENDSEC", //
            "0", "SECTION", "2", "ENTITIES", "0", "ENDSEC", //
            "0", "EOF",
        ]
        .join("\n")
    }

    fn light_at(x: f64, y: f64) -> Placement {
        Placement {
            position: Point3::new(x, y, 2700.0),
            component: ComponentKind::Light,
            room: None,
            rotation_deg: 0.0,
            rule: PlacementRuleTag::LightPerDoorFallback { floor_level: 0.0 },
        }
    }

    #[test]
    fn test_insert_written_with_coordinates() {
        let mut assembler = OutputAssembler::new();
        assembler.add_placement(light_at(2500.0, 2000.0));
        let out = assembler.assemble(&minimal_drawing());

        assert!(out.contains("INSERT"));
        assert!(out.contains("LIGHT_BLOCK"));
        assert!(out.contains("ELECTRICAL_LIGHTS"));
        assert!(out.contains("2500.000000"));
        assert!(out.contains("AcDbBlockReference"));
        // INSERT lands inside ENTITIES, before its ENDSEC
        let entities = out.find("ENTITIES").unwrap();
        let insert = out.find("INSERT").unwrap();
        assert!(insert > entities);
    }

    #[test]
    fn test_block_definitions_added_once() {
        let mut assembler = OutputAssembler::new();
        assembler.add_placement(light_at(1000.0, 1000.0));
        let first = assembler.assemble(&minimal_drawing());
        // Name appears in the definition (codes 2 and 3) and the INSERT
        assert_eq!(first.matches("LIGHT_BLOCK").count(), 3);
        assert_eq!(first.matches("0\nBLOCK\n2\nLIGHT_BLOCK").count(), 1);

        // Reassembling the output must not duplicate definitions
        let mut second_pass = OutputAssembler::new();
        second_pass.add_placement(light_at(5000.0, 1000.0));
        let second = second_pass.assemble(&first);
        assert_eq!(second.matches("0\nBLOCK\n2\nLIGHT_BLOCK").count(), 1);
    }

    #[test]
    fn test_missing_sections_pass_through() {
        let input = "0\nSECTION\n2\nHEADER\n0\nENDSEC\n0\nEOF\n";
        let mut assembler = OutputAssembler::new();
        assembler.add_placement(light_at(0.0, 0.0));
        let out = assembler.assemble(input);
        assert_eq!(out, input);
    }

    #[test]
    fn test_no_placements_still_defines_blocks() {
        let assembler = OutputAssembler::new();
        let out = assembler.assemble(&minimal_drawing());
        assert!(out.contains("SWITCH_BLOCK"));
        assert!(out.contains("SOCKET_BLOCK"));
        assert!(!out.contains("INSERT"));
    }
}
