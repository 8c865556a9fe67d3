// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Core code for sky-map rendering: celestial coordinate transformations,
//! Delta-T, and the azimuthal-equidistant screen projection.
//!
//! The pipeline: a render pass freezes the live [`ViewState`] into a
//! [`Frame`], which composes precession, nutation, sidereal time, latitude,
//! and the viewing direction into one view matrix; the frame's [`Projector`]
//! then maps catalog coordinates to pixels (and back).

pub mod constants;
pub mod deltat;
pub mod frame;
pub mod math;
pub mod matrix;
pub mod pos;
pub mod time;

// Re-exports.
pub use deltat::calc_delta_t;
pub use frame::{CancelToken, Frame, ViewState};
pub use matrix::{Mat3, Vec3};
pub use pos::{
    nutate::Nutation,
    projection::{PlottedPoint, Projected, Projector, SkyPoint, ViewFrame},
    rotation::{DisplayMode, Rotation},
    sphere::SphereCoords,
    ProjectionError,
};

pub use hifitime;

#[cfg(test)]
#[test]
fn hifitime_works_as_expected() {
    use hifitime::Epoch;

    let jd_utc = 2444244.5;
    let epoch = Epoch::from_jde_utc(jd_utc);
    approx::assert_abs_diff_eq!(time::julian_day_utc(epoch), jd_utc, epsilon = 1e-9);
}
