// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Time scales for the pipeline: civil UTC to Julian Day, Julian Day to
//! Julian Ephemeris Day via Delta-T, and sidereal time.

use hifitime::Epoch;

use crate::constants::{DAYSEC, DAYS_PER_CENTURY, J2000, MJD_OFFSET};
use crate::deltat::calc_delta_t;

/// Julian Day (UT) for a civil [`Epoch`].
pub fn julian_day_utc(epoch: Epoch) -> f64 {
    epoch.to_mjd_utc_days() + MJD_OFFSET
}

/// Julian Ephemeris Day: a UT Julian Day moved onto the uniform TT axis by
/// adding Delta-T.
pub fn ephemeris_day(jd_ut: f64) -> f64 {
    jd_ut + calc_delta_t(jd_ut) / DAYSEC
}

/// Greenwich mean sidereal time \[hours\] for a UT Julian Day (Meeus 12.4).
pub fn gmst_hours(jd_ut: f64) -> f64 {
    let d = jd_ut - J2000;
    let t = d / DAYS_PER_CENTURY;
    let degrees = 280.46061837 + 360.98564736629 * d + (0.000387933 - t / 38710000.0) * t * t;
    norm_24(degrees / 15.0)
}

/// Local mean sidereal time \[hours\]. East longitudes are positive.
pub fn lst_hours(jd_ut: f64, longitude_deg: f64) -> f64 {
    norm_24(gmst_hours(jd_ut) + longitude_deg / 15.0)
}

fn norm_24(hours: f64) -> f64 {
    let w = hours % 24.0;
    if w < 0.0 {
        w + 24.0
    } else {
        w
    }
}
