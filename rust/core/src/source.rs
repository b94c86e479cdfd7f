// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry source selection
//!
//! A richer structured parse (e.g. a full CAD library) may be attempted
//! opportunistically before the scanner path. All sources sit behind one
//! trait so callers never branch on which path actually ran.

use crate::error::Result;
use crate::model::Geometry;
use crate::parser::GeometryParser;

/// A way of recovering geometry from drawing text.
pub trait GeometrySource {
    /// Human-readable source name, for logs.
    fn name(&self) -> &'static str;

    /// Extract a geometry snapshot. An `Err` here means "this source could
    /// not handle the drawing"; the caller falls through to the next one.
    fn extract(&self, text: &str) -> Result<Geometry>;
}

/// The always-available scanner-based source. Infallible by design: a
/// malformed drawing degrades to a partial or empty [`Geometry`].
#[derive(Debug, Default)]
pub struct ScannerSource;

impl GeometrySource for ScannerSource {
    fn name(&self) -> &'static str {
        "scanner"
    }

    fn extract(&self, text: &str) -> Result<Geometry> {
        Ok(GeometryParser::new(text).parse())
    }
}

/// Run the given sources in order and take the first success.
///
/// The scanner source is always appended as the terminal fallback, so the
/// result is total: parse issues alone can never fail a run.
pub fn parse_geometry_with(sources: &[&dyn GeometrySource], text: &str) -> Geometry {
    for source in sources {
        if let Ok(geometry) = source.extract(text) {
            return geometry;
        }
    }
    // Terminal fallback; infallible
    GeometryParser::new(text).parse()
}

/// Parse with the default source chain (scanner only).
pub fn parse_geometry(text: &str) -> Geometry {
    parse_geometry_with(&[], text)
}
