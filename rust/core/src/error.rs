// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use thiserror::Error;

/// Result type for core parsing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during record scanning and geometry recovery.
///
/// Data-quality problems (bad numeric tokens, missing sections, absent
/// entity families) are deliberately NOT errors; they degrade to unset
/// fields and fallback strategies. Only source-level failures surface here.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Geometry source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Drawing could not be read: {0}")]
    UnreadableDrawing(String),
}
