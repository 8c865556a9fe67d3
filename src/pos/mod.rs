// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Super module for all positional code.

pub mod nutate;
pub mod projection;
pub mod rotation;
pub mod sphere;

use thiserror::Error;

/// The only fallible path in the positional code: setting up a screen
/// projection with nonsense geometry. The numerical pipeline itself never
/// errors under valid inputs.
#[derive(Error, Debug)]
pub enum ProjectionError {
    #[error("pixels-per-radian scale must be finite and positive, got {0}")]
    InvalidScale(f64),

    #[error("window dimensions must be finite and positive, got {width}x{height}")]
    InvalidWindow { width: f64, height: f64 },
}
