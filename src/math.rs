// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.
//!
//! Rotating unit vectors through long matrix chains leaves dot products a few
//! ulps outside [-1, 1], which turns `asin`/`acos` into NaN factories. Every
//! inverse-trig call on a computed component goes through the clamped
//! variants here.

use std::f64::consts::TAU;

/// `asin` with its argument clamped to [-1, 1].
#[inline]
pub fn asin_clamped(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).asin()
}

/// `acos` with its argument clamped to [-1, 1].
#[inline]
pub fn acos_clamped(x: f64) -> f64 {
    x.clamp(-1.0, 1.0).acos()
}

/// Normalize an angle into the range [0, 2π).
#[inline]
pub fn norm_two_pi(angle: f64) -> f64 {
    let w = angle % TAU;
    if w < 0.0 {
        w + TAU
    } else {
        w
    }
}

/// The bearing `atan2(y, x)` of a projected vector, with the degenerate
/// all-zero direction defined as 0.
#[inline]
pub fn bearing(x: f64, y: f64) -> f64 {
    if x == 0.0 && y == 0.0 {
        0.0
    } else {
        y.atan2(x)
    }
}
