// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Nutation, obliquity of the ecliptic, and annual aberration.
//!
//! Nutation follows the IAU 1980 theory as tabulated by Meeus (chapter 22):
//! five fundamental lunar/solar arguments and a 63-term periodic series for
//! the nutation in longitude and in obliquity. Mean obliquity is Laskar's
//! long-period polynomial. The aberration parameters are deliberately
//! lower-precision formulas; aberration itself is only a 20-arcsecond
//! effect, so sub-arcsecond solar-longitude accuracy buys nothing.

#![allow(clippy::excessive_precision)]

use crate::constants::{DAS2R, DAYS_PER_CENTURY, J2000};
use crate::math::{asin_clamped, norm_two_pi};
use crate::matrix::Mat3;
use crate::pos::sphere::SphereCoords;

/// Constant of aberration \[arcsec\].
const ABERRATION_CONST: f64 = 20.49552;

/// The IAU 1980 nutation series. Each row holds the integer multipliers of
/// the fundamental arguments (D, M, M', F, omega) and the sine/cosine
/// amplitudes with their secular parts, in units of 0.0001 arcsec (per
/// Julian century for the secular parts).
#[rustfmt::skip]
static NUTATION_TERMS: [(i8, i8, i8, i8, i8, f64, f64, f64, f64); 63] = [
    ( 0,  0,  0,  0,  1, -171996.0, -174.2, 92025.0,  8.9),
    (-2,  0,  0,  2,  2,  -13187.0,   -1.6,  5736.0, -3.1),
    ( 0,  0,  0,  2,  2,   -2274.0,   -0.2,   977.0, -0.5),
    ( 0,  0,  0,  0,  2,    2062.0,    0.2,  -895.0,  0.5),
    ( 0,  1,  0,  0,  0,    1426.0,   -3.4,    54.0, -0.1),
    ( 0,  0,  1,  0,  0,     712.0,    0.1,    -7.0,  0.0),
    (-2,  1,  0,  2,  2,    -517.0,    1.2,   224.0, -0.6),
    ( 0,  0,  0,  2,  1,    -386.0,   -0.4,   200.0,  0.0),
    ( 0,  0,  1,  2,  2,    -301.0,    0.0,   129.0, -0.1),
    (-2, -1,  0,  2,  2,     217.0,   -0.5,   -95.0,  0.3),
    (-2,  0,  1,  0,  0,    -158.0,    0.0,     0.0,  0.0),
    (-2,  0,  0,  2,  1,     129.0,    0.1,   -70.0,  0.0),
    ( 0,  0, -1,  2,  2,     123.0,    0.0,   -53.0,  0.0),
    ( 2,  0,  0,  0,  0,      63.0,    0.0,     0.0,  0.0),
    ( 0,  0,  1,  0,  1,      63.0,    0.1,   -33.0,  0.0),
    ( 2,  0, -1,  2,  2,     -59.0,    0.0,    26.0,  0.0),
    ( 0,  0, -1,  0,  1,     -58.0,   -0.1,    32.0,  0.0),
    ( 0,  0,  1,  2,  1,     -51.0,    0.0,    27.0,  0.0),
    (-2,  0,  2,  0,  0,      48.0,    0.0,     0.0,  0.0),
    ( 0,  0, -2,  2,  1,      46.0,    0.0,   -24.0,  0.0),
    ( 2,  0,  0,  2,  2,     -38.0,    0.0,    16.0,  0.0),
    ( 0,  0,  2,  2,  2,     -31.0,    0.0,    13.0,  0.0),
    ( 0,  0,  2,  0,  0,      29.0,    0.0,     0.0,  0.0),
    (-2,  0,  1,  2,  2,      29.0,    0.0,   -12.0,  0.0),
    ( 0,  0,  0,  2,  0,      26.0,    0.0,     0.0,  0.0),
    (-2,  0,  0,  2,  0,     -22.0,    0.0,     0.0,  0.0),
    ( 0,  0, -1,  2,  1,      21.0,    0.0,   -10.0,  0.0),
    ( 0,  2,  0,  0,  0,      17.0,   -0.1,     0.0,  0.0),
    ( 2,  0, -1,  0,  1,      16.0,    0.0,    -8.0,  0.0),
    (-2,  2,  0,  2,  2,     -16.0,    0.1,     7.0,  0.0),
    ( 0,  1,  0,  0,  1,     -15.0,    0.0,     9.0,  0.0),
    (-2,  0,  1,  0,  1,     -13.0,    0.0,     7.0,  0.0),
    ( 0, -1,  0,  0,  1,     -12.0,    0.0,     6.0,  0.0),
    ( 0,  0,  2, -2,  0,      11.0,    0.0,     0.0,  0.0),
    ( 2,  0, -1,  2,  1,     -10.0,    0.0,     5.0,  0.0),
    ( 2,  0,  1,  2,  2,      -8.0,    0.0,     3.0,  0.0),
    ( 0,  1,  0,  2,  2,       7.0,    0.0,    -3.0,  0.0),
    (-2,  1,  1,  0,  0,      -7.0,    0.0,     0.0,  0.0),
    ( 0, -1,  0,  2,  2,      -7.0,    0.0,     3.0,  0.0),
    ( 2,  0,  0,  2,  1,      -7.0,    0.0,     3.0,  0.0),
    ( 2,  0,  1,  0,  0,       6.0,    0.0,     0.0,  0.0),
    (-2,  0,  2,  2,  2,       6.0,    0.0,    -3.0,  0.0),
    (-2,  0,  1,  2,  1,       6.0,    0.0,    -3.0,  0.0),
    ( 2,  0, -2,  0,  1,      -6.0,    0.0,     3.0,  0.0),
    ( 2,  0,  0,  0,  1,      -6.0,    0.0,     3.0,  0.0),
    ( 0, -1,  1,  0,  0,       5.0,    0.0,     0.0,  0.0),
    (-2, -1,  0,  2,  1,      -5.0,    0.0,     3.0,  0.0),
    (-2,  0,  0,  0,  1,      -5.0,    0.0,     3.0,  0.0),
    ( 0,  0,  2,  2,  1,      -5.0,    0.0,     3.0,  0.0),
    (-2,  0,  2,  0,  1,       4.0,    0.0,     0.0,  0.0),
    (-2,  1,  0,  2,  1,       4.0,    0.0,     0.0,  0.0),
    ( 0,  0,  1, -2,  0,       4.0,    0.0,     0.0,  0.0),
    (-1,  0,  1,  0,  0,      -4.0,    0.0,     0.0,  0.0),
    (-2,  1,  0,  0,  0,      -4.0,    0.0,     0.0,  0.0),
    ( 1,  0,  0,  0,  0,      -4.0,    0.0,     0.0,  0.0),
    ( 0,  0,  1,  2,  0,       3.0,    0.0,     0.0,  0.0),
    ( 0,  0, -2,  2,  2,      -3.0,    0.0,     0.0,  0.0),
    (-1, -1,  1,  0,  0,      -3.0,    0.0,     0.0,  0.0),
    ( 0,  1,  1,  0,  0,      -3.0,    0.0,     0.0,  0.0),
    ( 0, -1,  1,  2,  2,      -3.0,    0.0,     0.0,  0.0),
    ( 2, -1, -1,  2,  2,      -3.0,    0.0,     0.0,  0.0),
    ( 0,  0,  3,  2,  2,      -3.0,    0.0,     0.0,  0.0),
    ( 2, -1,  0,  2,  2,      -3.0,    0.0,     0.0,  0.0),
];

/// Nutation and aberration state for one Julian Ephemeris Day.
///
/// All derived quantities are recomputed by [`Nutation::new`]; a value is
/// only meaningful for the day it was built for.
#[derive(Clone, Copy, Debug)]
pub struct Nutation {
    jde: f64,
    /// Nutation in longitude \[radians\]
    pub dpsi: f64,
    /// Nutation in obliquity \[radians\]
    pub deps: f64,
    /// Mean obliquity of the ecliptic \[radians\]
    pub eps0: f64,
    /// True obliquity of the ecliptic \[radians\]
    pub eps: f64,
    /// Eccentricity of Earth's orbit
    ecc: f64,
    /// Longitude of the perihelion of Earth's orbit \[radians\]
    perihelion: f64,
    /// True geometric longitude of the Sun \[radians\]
    sun_lon: f64,
    matrix: Mat3,
}

impl Nutation {
    /// Compute the full nutation/aberration state for a Julian Ephemeris
    /// Day.
    pub fn new(jde: f64) -> Nutation {
        let t = (jde - J2000) / DAYS_PER_CENTURY;

        // Fundamental arguments, degrees (Meeus 22.1): mean elongation of
        // the Moon, mean anomalies of Sun and Moon, Moon's argument of
        // latitude, longitude of the Moon's ascending node.
        let d = poly3(t, 297.85036, 445267.111480, -0.0019142, 1.0 / 189474.0).to_radians();
        let m = poly3(t, 357.52772, 35999.050340, -0.0001603, -1.0 / 300000.0).to_radians();
        let mp = poly3(t, 134.96298, 477198.867398, 0.0086972, 1.0 / 56250.0).to_radians();
        let f = poly3(t, 93.27191, 483202.017538, -0.0036825, 1.0 / 327270.0).to_radians();
        let om = poly3(t, 125.04452, -1934.136261, 0.0020708, 1.0 / 450000.0).to_radians();

        let mut dpsi = 0.0;
        let mut deps = 0.0;
        for &(kd, km, kmp, kf, kom, psi, psi_t, eps, eps_t) in NUTATION_TERMS.iter() {
            let arg = f64::from(kd) * d
                + f64::from(km) * m
                + f64::from(kmp) * mp
                + f64::from(kf) * f
                + f64::from(kom) * om;
            dpsi += (psi + psi_t * t) * arg.sin();
            deps += (eps + eps_t * t) * arg.cos();
        }
        // Series units are 0.0001 arcsec.
        let dpsi = dpsi * 1.0e-4 * DAS2R;
        let deps = deps * 1.0e-4 * DAS2R;

        let eps0 = mean_obliquity(t);
        let eps = eps0 + deps;

        // Aberration inputs (Meeus chapter 25).
        let ecc = 0.016708634 - 0.000042037 * t - 0.0000001267 * t * t;
        let perihelion = (102.93735 + 1.71946 * t + 0.00046 * t * t).to_radians();
        let l0 = 280.46646 + 36000.76983 * t + 0.0003032 * t * t;
        let ms = (357.52911 + 35999.05029 * t - 0.0001537 * t * t).to_radians();
        let centre = (1.914602 - 0.004817 * t - 0.000014 * t * t) * ms.sin()
            + (0.019993 - 0.000101 * t) * (2.0 * ms).sin()
            + 0.000289 * (3.0 * ms).sin();
        let sun_lon = norm_two_pi((l0 + centre).to_radians());

        Nutation {
            jde,
            dpsi,
            deps,
            eps0,
            eps,
            ecc,
            perihelion,
            sun_lon,
            matrix: nutation_matrix(eps0, dpsi, eps),
        }
    }

    /// The Julian Ephemeris Day this state was computed for.
    pub fn jde(&self) -> f64 {
        self.jde
    }

    /// The nutation matrix: mean equatorial of date to true equatorial of
    /// date. Returned by value; the internal copy cannot be aliased.
    pub fn matrix(&self) -> Mat3 {
        self.matrix
    }

    /// Mean ecliptic coordinates to apparent equatorial coordinates,
    /// applying the nutation in longitude directly and converting with the
    /// true obliquity. Cheaper than the matrix for a single point.
    pub fn ecliptic_to_equatorial(&self, c: SphereCoords) -> SphereCoords {
        let lon = c.lon + self.dpsi;
        let (s_lon, c_lon) = lon.sin_cos();
        let (s_eps, c_eps) = self.eps.sin_cos();
        let (s_lat, c_lat) = c.lat.sin_cos();
        let ra = (s_lon * c_eps - (s_lat / c_lat) * s_eps).atan2(c_lon);
        let dec = asin_clamped(s_lat * c_eps + c_lat * s_eps * s_lon);
        SphereCoords {
            lon: norm_two_pi(ra),
            lat: dec,
        }
    }

    /// Apparent equatorial coordinates to mean ecliptic coordinates. The
    /// exact inverse of [`Nutation::ecliptic_to_equatorial`].
    pub fn equatorial_to_ecliptic(&self, c: SphereCoords) -> SphereCoords {
        let (s_ra, c_ra) = c.lon.sin_cos();
        let (s_eps, c_eps) = self.eps.sin_cos();
        let (s_dec, c_dec) = c.lat.sin_cos();
        let lon = (s_ra * c_eps + (s_dec / c_dec) * s_eps).atan2(c_ra);
        let lat = asin_clamped(s_dec * c_eps - c_dec * s_eps * s_ra);
        SphereCoords {
            lon: norm_two_pi(lon - self.dpsi),
            lat,
        }
    }

    /// Annual aberration applied to ecliptic coordinates (Meeus 23.2).
    pub fn aberration_ecliptic(&self, c: SphereCoords) -> SphereCoords {
        let k = ABERRATION_CONST * DAS2R;
        let (s_sun, c_sun) = (self.sun_lon - c.lon).sin_cos();
        let (s_per, c_per) = (self.perihelion - c.lon).sin_cos();
        let d_lon = (-k * c_sun + self.ecc * k * c_per) / c.lat.cos();
        let d_lat = -k * c.lat.sin() * (s_sun - self.ecc * s_per);
        SphereCoords {
            lon: norm_two_pi(c.lon + d_lon),
            lat: (c.lat + d_lat).clamp(-std::f64::consts::FRAC_PI_2, std::f64::consts::FRAC_PI_2),
        }
    }

    /// Annual aberration applied to apparent equatorial coordinates,
    /// round-tripping through the ecliptic frame.
    pub fn aberration_equatorial(&self, c: SphereCoords) -> SphereCoords {
        let ecl = self.equatorial_to_ecliptic(c);
        self.ecliptic_to_equatorial(self.aberration_ecliptic(ecl))
    }
}

impl Default for Nutation {
    fn default() -> Nutation {
        Nutation::new(J2000)
    }
}

fn poly3(t: f64, c0: f64, c1: f64, c2: f64, c3: f64) -> f64 {
    ((c3 * t + c2) * t + c1) * t + c0
}

/// Laskar's polynomial for the mean obliquity of the ecliptic, in units of
/// 10,000 Julian years from J2000. Good to a fraction of an arcsecond over
/// +-10,000 years.
fn mean_obliquity(t: f64) -> f64 {
    let u = t / 100.0;
    let coeffs = [
        84381.448, -4680.93, -1.55, 1999.25, -51.38, -249.67, -39.05, 7.12, 27.87, 5.79, 2.45,
    ];
    let mut arcsec = 0.0;
    for &c in coeffs.iter().rev() {
        arcsec = arcsec * u + c;
    }
    arcsec * DAS2R
}

/// The nutation matrix as the closed-form product of three frame rotations:
/// mean equatorial to mean ecliptic (about x by eps0), the nutation in
/// longitude (about z), and mean ecliptic back to true equatorial (about x
/// by eps).
fn nutation_matrix(eps0: f64, dpsi: f64, eps: f64) -> Mat3 {
    let (s0, c0) = eps0.sin_cos();
    let (sp, cp) = dpsi.sin_cos();
    let (s1, c1) = eps.sin_cos();
    Mat3::new([
        [cp, -sp * c0, -sp * s0],
        [c1 * sp, c1 * cp * c0 + s1 * s0, c1 * cp * s0 - s1 * c0],
        [s1 * sp, s1 * cp * c0 - c1 * s0, s1 * cp * s0 + c1 * c0],
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_mean_obliquity_at_j2000() {
        // 23 deg 26' 21.448"
        let eps0 = mean_obliquity(0.0);
        assert_abs_diff_eq!(eps0.to_degrees(), 23.4392911, epsilon = 1e-7);
    }

    #[test]
    fn test_nutation_1987_april_10() {
        // Meeus, example 22.a: JDE 2446895.5.
        let n = Nutation::new(2446895.5);
        assert_abs_diff_eq!(n.dpsi / DAS2R, -3.788, epsilon = 0.5);
        assert_abs_diff_eq!(n.deps / DAS2R, 9.443, epsilon = 0.5);
        assert_abs_diff_eq!(n.eps0.to_degrees(), 23.440946, epsilon = 1e-4);
    }

    #[test]
    fn test_nutation_magnitude_stays_bounded() {
        // The dominant 18.6-year term caps the series at roughly +-17.5"
        // in longitude and +-9.5" in obliquity.
        for i in 0..40 {
            let n = Nutation::new(J2000 + f64::from(i) * 500.0);
            assert!(n.dpsi.abs() / DAS2R < 20.0);
            assert!(n.deps.abs() / DAS2R < 11.0);
        }
    }

    #[test]
    fn test_matrix_is_orthonormal() {
        let n = Nutation::new(2448976.5);
        let m = n.matrix();
        let prod = m.postmult(&m.transposed());
        assert_abs_diff_eq!(prod, Mat3::IDENTITY, epsilon = 1e-12);
        assert_abs_diff_eq!(m.determinant(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_matrix_round_trip_meeus_example() {
        // Meeus p.227 worked example: the apparent place of a star at JDE
        // 2448976.5. Un-nutate the published apparent coordinates, then
        // re-apply the forward matrix; the round trip must reproduce them.
        let n = Nutation::new(2448976.5);
        let apparent = SphereCoords::from_degrees(316.17291, -18.88801);
        let mean = apparent.rotate_to_sphere(&n.matrix().invert());
        let back = mean.rotate_to_sphere(&n.matrix());
        assert_abs_diff_eq!(back.lon.to_degrees(), 316.17291, epsilon = 0.001);
        assert_abs_diff_eq!(back.lat.to_degrees(), -18.88801, epsilon = 0.001);
    }

    #[test]
    fn test_matrix_agrees_with_direct_conversion() {
        // Applying the matrix to a mean equatorial vector and converting a
        // mean ecliptic position through the scalar path are the same
        // transformation.
        let n = Nutation::new(2455197.5);
        let mean_ecl = SphereCoords::from_degrees(147.3, 4.2);

        // Scalar path: mean ecliptic -> apparent equatorial.
        let direct = n.ecliptic_to_equatorial(mean_ecl);

        // Matrix path: mean ecliptic -> mean equatorial (rotate by -eps0
        // about x), then the nutation matrix.
        let mean_eq = mean_ecl.rotate(&Mat3::rotation_x(-n.eps0));
        let via_matrix = SphereCoords::from_vector(n.matrix().mult(mean_eq));

        assert_abs_diff_eq!(direct.lon, via_matrix.lon, epsilon = 1e-9);
        assert_abs_diff_eq!(direct.lat, via_matrix.lat, epsilon = 1e-9);
    }

    #[test]
    fn test_ecliptic_equatorial_round_trip() {
        let n = Nutation::new(2455197.5);
        for (lon, lat) in [(10.0, 0.0), (123.4, 45.6), (359.0, -67.8), (200.0, 85.0)] {
            let c = SphereCoords::from_degrees(lon, lat);
            let back = n.equatorial_to_ecliptic(n.ecliptic_to_equatorial(c));
            assert_abs_diff_eq!(back.lon, c.lon, epsilon = 1e-9);
            assert_abs_diff_eq!(back.lat, c.lat, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_aberration_displacement_is_about_kappa() {
        // A star on the ecliptic at the Sun's longitude sits 90 degrees from
        // the apex of Earth's motion and is displaced by roughly the full
        // constant of aberration; nothing anywhere exceeds it by much.
        let n = Nutation::new(2455197.5);
        let c = SphereCoords::from_radians(n.sun_lon, 0.0);
        let shifted = n.aberration_ecliptic(c);
        let sep = c.separation(shifted) / DAS2R;
        assert!(sep > 19.0 && sep < 21.5, "separation {sep} arcsec");

        let eq = SphereCoords::from_degrees(80.0, 35.0);
        let sep = eq.separation(n.aberration_equatorial(eq)) / DAS2R;
        assert!(sep > 0.0 && sep < 21.5, "separation {sep} arcsec");
    }

    #[test]
    fn test_eccentricity_at_j2000() {
        let n = Nutation::default();
        assert_abs_diff_eq!(n.ecc, 0.016708634, epsilon = 1e-9);
        // Unit direction sanity: the vector form of the state's Sun
        // longitude lies in the ecliptic plane by construction.
        let sun = SphereCoords::from_radians(n.sun_lon, 0.0).to_vector();
        assert_abs_diff_eq!(sun.length(), 1.0, epsilon = 1e-12);
    }
}
