// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Useful constants.

use std::f64::consts::PI;

/// Julian Day of the epoch J2000.0 (2000 January 1.5 TT).
pub const J2000: f64 = 2451545.0;
/// Days in a Julian century.
pub const DAYS_PER_CENTURY: f64 = 36525.0;
/// Days in a Julian year.
pub const DAYS_PER_YEAR: f64 = 365.25;
/// Seconds per day (86400).
pub const DAYSEC: f64 = 86400.0;
/// Offset between Julian Day and Modified Julian Day.
pub const MJD_OFFSET: f64 = 2400000.5;

/// Hours of time to radians (15 / 180 * PI).
pub const DH2R: f64 = 15.0 / 180.0 * PI;
/// Arcseconds to radians.
pub const DAS2R: f64 = PI / (180.0 * 3600.0);
