// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Delta-T: the difference TT - UT in seconds.
//!
//! Inside the tabulated years the value comes from Bessel's interpolation
//! formula over yearly observations, using central differences up to fourth
//! order (Astronomical Almanac, section K). Outside the table, quadratic
//! approximations take over, faded into the table edges so the function stays
//! continuous; its derivative is not.
//!
//! The table and its difference arrays are built once, on first use, and are
//! immutable afterwards. Callers see only the pure function
//! [`calc_delta_t`].

#![allow(clippy::excessive_precision)]

use itertools::Itertools;
use lazy_static::lazy_static;
use log::warn;

use crate::constants::{DAYS_PER_YEAR, J2000};

/// First tabulated year.
const TABLE_START_YEAR: f64 = 1620.0;
/// Last tabulated year.
const TABLE_STOP_YEAR: f64 = 2013.0;
/// Years below the table start over which the historical polynomial is
/// faded into the table edge.
const BLEND_BELOW_YEARS: f64 = 20.0;
/// Year by which the fade above the table end has fully handed over to the
/// extrapolation polynomial.
const BLEND_ABOVE_STOP_YEAR: f64 = 2100.0;

/// Adopted secular acceleration of the Moon \[arcsec/century^2\].
const LUNAR_NDOT: f64 = -25.7376;
/// Tidal correction scale \[s/yr^2\], applied per unit of (ndot + 26).
const TIDAL_SCALE: f64 = -91.072e-6;
/// Table entries before this epoch are referred to pre-atomic time standards
/// and carry the tidal correction; later entries do not.
const TIDAL_EPOCH: f64 = 1955.5;

/// Observed TT - UT at the start of each year from 1620 through 2013, in
/// centiseconds.
#[rustfmt::skip]
static TABLE_CS: [i16; 394] = [
     12400,  11950,  11500,  11050,  10600,  10200,   9800,   9450,   9100,   8800,  // 1620
      8500,   8200,   7900,   7650,   7400,   7200,   7000,   6750,   6500,   6350,  // 1630
      6200,   6000,   5800,   5650,   5500,   5400,   5300,   5150,   5000,   4900,  // 1640
      4800,   4700,   4600,   4500,   4400,   4300,   4200,   4100,   4000,   3850,  // 1650
      3700,   3600,   3500,   3400,   3300,   3200,   3100,   2950,   2800,   2700,  // 1660
      2600,   2500,   2400,   2300,   2200,   2100,   2000,   1900,   1800,   1700,  // 1670
      1600,   1500,   1400,   1350,   1300,   1250,   1200,   1150,   1100,   1050,  // 1680
      1000,    950,    900,    900,    900,    900,    900,    900,    900,    900,  // 1690
       900,    900,    900,    900,    900,    900,    900,    950,   1000,   1000,  // 1700
      1000,   1000,   1000,   1000,   1000,   1000,   1000,   1050,   1100,   1100,  // 1710
      1100,   1100,   1100,   1100,   1100,   1100,   1100,   1100,   1100,   1100,  // 1720
      1100,   1150,   1200,   1200,   1200,   1200,   1200,   1200,   1200,   1200,  // 1730
      1200,   1200,   1200,   1250,   1300,   1300,   1300,   1300,   1300,   1300,  // 1740
      1300,   1350,   1400,   1400,   1400,   1400,   1400,   1450,   1500,   1500,  // 1750
      1500,   1500,   1500,   1500,   1500,   1550,   1600,   1600,   1600,   1600,  // 1760
      1600,   1600,   1600,   1600,   1600,   1650,   1700,   1700,   1700,   1700,  // 1770
      1700,   1700,   1700,   1700,   1700,   1700,   1700,   1700,   1700,   1700,  // 1780
      1700,   1650,   1600,   1600,   1600,   1550,   1500,   1450,   1400,   1385,  // 1790
      1370,   1340,   1310,   1290,   1270,   1260,   1250,   1250,   1250,   1250,  // 1800
      1250,   1250,   1250,   1250,   1250,   1250,   1250,   1240,   1230,   1215,  // 1810
      1200,   1170,   1140,   1100,   1060,   1010,    960,    910,    860,    805,  // 1820
       750,    705,    660,    630,    600,    585,    570,    565,    560,    565,  // 1830
       570,    580,    590,    605,    620,    635,    650,    665,    680,    695,  // 1840
       710,    720,    730,    740,    750,    760,    770,    775,    780,    785,  // 1850
       790,    770,    750,    695,    640,    590,    540,    415,    290,    225,  // 1860
       160,     30,   -100,   -185,   -270,   -315,   -360,   -415,   -470,   -505,  // 1870
      -540,   -530,   -520,   -535,   -550,   -555,   -560,   -570,   -580,   -585,  // 1880
      -590,   -605,   -620,   -630,   -640,   -625,   -610,   -540,   -470,   -370,  // 1890
      -270,   -135,      0,    130,    260,    400,    540,    655,    770,    910,  // 1900
      1050,   1195,   1340,   1470,   1600,   1710,   1820,   1920,   2020,   2070,  // 1910
      2120,   2180,   2240,   2295,   2350,   2370,   2390,   2410,   2430,   2415,  // 1920
      2400,   2395,   2390,   2390,   2390,   2380,   2370,   2385,   2400,   2415,  // 1930
      2430,   2480,   2530,   2575,   2620,   2675,   2730,   2775,   2820,   2865,  // 1940
      2910,   2955,   3000,   3035,   3070,   3105,   3140,   3180,   3220,   3265,  // 1950
      3310,   3355,   3400,   3450,   3500,   3575,   3650,   3740,   3830,   3925,  // 1960
      4020,   4120,   4220,   4335,   4450,   4550,   4650,   4750,   4850,   4950,  // 1970
      5050,   5135,   5220,   5300,   5380,   5435,   5490,   5535,   5580,   5635,  // 1980
      5690,   5760,   5831,   5912,   5998,   6078,   6163,   6230,   6297,   6347,  // 1990
      6383,   6409,   6430,   6447,   6457,   6469,   6485,   6515,   6546,   6578,  // 2000
      6607,   6632,   6660,   6691,                                                  // 2010
];

/// The corrected table in seconds plus its first through fourth difference
/// arrays, all derived once.
struct Table {
    values: Vec<f64>,
    d1: Vec<f64>,
    d2: Vec<f64>,
    d3: Vec<f64>,
    d4: Vec<f64>,
}

impl Table {
    fn build() -> Table {
        // The tidal adjustment must land before any differences are taken:
        // differencing the raw table and correcting afterwards would bake the
        // uncorrected curvature into the interpolation.
        let values: Vec<f64> = TABLE_CS
            .iter()
            .enumerate()
            .map(|(i, &cs)| {
                let year = TABLE_START_YEAR + i as f64;
                f64::from(cs) * 0.01 + tidal_correction(year)
            })
            .collect();
        let diff = |v: &[f64]| -> Vec<f64> { v.iter().tuple_windows().map(|(a, b)| b - a).collect() };
        let d1 = diff(&values);
        let d2 = diff(&d1);
        let d3 = diff(&d2);
        let d4 = diff(&d3);
        Table {
            values,
            d1,
            d2,
            d3,
            d4,
        }
    }
}

lazy_static! {
    static ref TABLE: Table = Table::build();
}

/// Correction for the adopted lunar secular acceleration, for years referred
/// to pre-atomic time standards.
fn tidal_correction(year: f64) -> f64 {
    if year < TIDAL_EPOCH {
        let dy = year - TIDAL_EPOCH;
        TIDAL_SCALE * (LUNAR_NDOT + 26.0) * dy * dy
    } else {
        0.0
    }
}

/// TT - UT in seconds for a Julian Day on the UT axis.
pub fn calc_delta_t(jd: f64) -> f64 {
    let year = 2000.0 + (jd - J2000) / DAYS_PER_YEAR;
    if year < -4000.0 || year > 4000.0 {
        warn!("Delta-T queried for year {year:.1}, far outside any fitted range");
    }
    if (TABLE_START_YEAR..=TABLE_STOP_YEAR).contains(&year) {
        bessel(year)
    } else if year < TABLE_START_YEAR {
        below_table(year)
    } else {
        above_table(year)
    }
}

/// Bessel's interpolation formula between the bracketing tabulated years.
///
/// With a full complement of neighbours this is quartic in the year
/// fraction; within two entries of either table edge the higher-order terms
/// drop away and the estimate degrades to quadratic, then linear.
fn bessel(year: f64) -> f64 {
    let t = &*TABLE;
    let n = t.values.len();
    let i = (year - TABLE_START_YEAR) as usize;
    if i + 1 >= n {
        return t.values[n - 1];
    }
    let u = year - (TABLE_START_YEAR + i as f64);

    let mut dt = 0.5 * (t.values[i] + t.values[i + 1]) + (u - 0.5) * t.d1[i];
    if i >= 1 && i + 2 < n {
        let b2 = 0.25 * u * (u - 1.0);
        dt += b2 * (t.d2[i - 1] + t.d2[i]);
        let b3 = 2.0 * b2 / 3.0;
        dt += (u - 0.5) * b3 * t.d3[i - 1];
        if i >= 2 && i + 3 < n {
            let b4 = 0.125 * b3 * (u + 1.0) * (u - 2.0);
            dt += b4 * (t.d4[i - 2] + t.d4[i - 1]);
        }
    }
    dt
}

/// Stephenson & Houlden quadratic for the years 948-1620, with the fade into
/// the table's low edge.
fn below_table(year: f64) -> f64 {
    if year < 948.0 {
        return ancient(year);
    }
    let dt = medieval(year);
    let blend_start = TABLE_START_YEAR - BLEND_BELOW_YEARS;
    if year >= blend_start {
        // Fade in the offset pinning the polynomial to the table edge, so
        // the hand-over at the first tabulated year is seamless.
        let frac = (year - blend_start) / BLEND_BELOW_YEARS;
        dt + frac * (TABLE.values[0] - medieval(TABLE_START_YEAR))
    } else {
        dt
    }
}

fn medieval(year: f64) -> f64 {
    let u = 0.01 * (year - 2000.0);
    (22.5 * u + 67.5) * u + 50.6
}

/// Quadratic for years before 948. The constant term is not the published
/// 2177: it is fitted so this polynomial meets [`medieval`] exactly at
/// year 948.
fn ancient(year: f64) -> f64 {
    let u = 0.01 * (year - 2000.0);
    (44.1 * u + 497.0) * u + 2178.45936
}

/// Extrapolation above the table: the future quadratic, pinned to the
/// table's high edge by an offset that fades out by 2100.
fn above_table(year: f64) -> f64 {
    let dt = future(year);
    if year <= BLEND_ABOVE_STOP_YEAR {
        let frac = (year - TABLE_STOP_YEAR) / (BLEND_ABOVE_STOP_YEAR - TABLE_STOP_YEAR);
        let edge = TABLE.values[TABLE.values.len() - 1];
        dt + (1.0 - frac) * (edge - future(TABLE_STOP_YEAR))
    } else {
        dt
    }
}

fn future(year: f64) -> f64 {
    let u = 0.01 * (year - 2000.0);
    (32.5 * u + 123.5) * u + 102.3
}
