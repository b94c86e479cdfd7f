// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Record stream tokenization
//!
//! The exchange format is a stream of paired lines: a numeric group code
//! followed by its value. Everything above this module reasons in those
//! pairs; nothing here knows what an entity is.

use std::ops::Range;

/// One group-coded record: a code line and its value line, both trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record<'a> {
    pub code: &'a str,
    pub value: &'a str,
}

/// Low-level iterator over a drawing's record stream.
///
/// Pairs are formed eagerly so that section lookup and the per-family
/// parser passes can share one tokenization. A trailing odd line (a code
/// with no value) is tolerated and dropped.
pub struct RecordScanner<'a> {
    records: Vec<Record<'a>>,
}

impl<'a> RecordScanner<'a> {
    /// Tokenize drawing text into records.
    pub fn new(text: &'a str) -> Self {
        let mut records = Vec::with_capacity(text.len() / 16);
        let bytes = text.as_bytes();
        let mut line_start = 0usize;
        let mut pending_code: Option<&'a str> = None;

        for nl in memchr::memchr_iter(b'\n', bytes).chain(std::iter::once(bytes.len())) {
            let line = text[line_start..nl].trim();
            line_start = nl + 1;
            match pending_code.take() {
                None => {
                    // Only a trailing blank line is skipped; mid-stream
                    // blanks pair like any other line (an empty value is
                    // legal in the format)
                    if line.is_empty() && nl == bytes.len() {
                        continue;
                    }
                    pending_code = Some(line);
                }
                Some(code) => records.push(Record { code, value: line }),
            }
        }

        Self { records }
    }

    /// All records in stream order.
    pub fn records(&self) -> &[Record<'a>] {
        &self.records
    }

    /// Locate the body of a named SECTION as a half-open record range.
    ///
    /// A section opens with `0 SECTION` / `2 <name>` and closes at the next
    /// `0 ENDSEC`. Returns `None` when the section is not present; callers
    /// must tolerate absent sections (drawings without BLOCKS are common).
    pub fn section_range(&self, name: &str) -> Option<Range<usize>> {
        let records = &self.records;
        let mut body_start: Option<usize> = None;

        for i in 0..records.len() {
            let r = records[i];
            if body_start.is_none()
                && r.code == "0"
                && r.value.eq_ignore_ascii_case("SECTION")
                && i + 1 < records.len()
                && records[i + 1].code == "2"
                && records[i + 1].value.eq_ignore_ascii_case(name)
            {
                body_start = Some(i + 2);
            } else if let Some(start) = body_start {
                if r.code == "0" && r.value.eq_ignore_ascii_case("ENDSEC") {
                    return Some(start..i);
                }
            }
        }

        // Unterminated section: treat the rest of the stream as its body
        body_start.map(|start| start..records.len())
    }
}

/// Parse a numeric field, swallowing malformed tokens.
///
/// Field-level parse noise is recovered silently: a bad token yields `None`
/// and the entity in progress simply keeps that field unset.
#[inline]
pub fn parse_field(value: &str) -> Option<f64> {
    fast_float::parse::<f64, _>(value.trim()).ok()
}
