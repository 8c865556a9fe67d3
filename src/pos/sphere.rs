// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Handle two-angle spherical coordinates.
//!
//! The same value type serves every angle pair in the pipeline: (right
//! ascension, declination), ecliptic (longitude, latitude), and (azimuth,
//! altitude). Which interpretation applies is the caller's business; the
//! conversions here only care about the geometry.
//!
//! Convention: every conversion back to spherical form returns `lon` in
//! [0, 2π) and `lat` in [-π/2, π/2]. No accessor returns (-π, π].

use crate::math::{asin_clamped, bearing, norm_two_pi};
use crate::matrix::{Mat3, Vec3};

/// A pair of spherical angles. All units are in radians.
///
/// Note that the serialised units are degrees and are automatically converted
/// when serialising/deserialising.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SphereCoords {
    /// First angle: RA, ecliptic longitude, or azimuth \[radians\]
    #[cfg_attr(feature = "serde", serde(serialize_with = "radians_to_degrees"))]
    #[cfg_attr(feature = "serde", serde(deserialize_with = "degrees_to_radians"))]
    pub lon: f64,

    /// Second angle: Dec, ecliptic latitude, or altitude \[radians\]
    #[cfg_attr(feature = "serde", serde(serialize_with = "radians_to_degrees"))]
    #[cfg_attr(feature = "serde", serde(deserialize_with = "degrees_to_radians"))]
    pub lat: f64,
}

#[cfg(feature = "serde")]
fn radians_to_degrees<S: serde::Serializer>(num: &f64, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_f64(num.to_degrees())
}

#[cfg(feature = "serde")]
fn degrees_to_radians<'de, D>(d: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let num: f64 = serde::Deserialize::deserialize(d)?;
    Ok(num.to_radians())
}

impl SphereCoords {
    /// Make a new [`SphereCoords`] struct from values in radians.
    pub fn from_radians(lon: f64, lat: f64) -> SphereCoords {
        Self { lon, lat }
    }

    /// Make a new [`SphereCoords`] struct from values in degrees.
    pub fn from_degrees(lon: f64, lat: f64) -> SphereCoords {
        Self {
            lon: lon.to_radians(),
            lat: lat.to_radians(),
        }
    }

    /// The unit rectangular vector for these angles: x at (0, 0), z at the
    /// +ve `lat` pole.
    pub fn to_vector(self) -> Vec3 {
        let (s_lon, c_lon) = self.lon.sin_cos();
        let (s_lat, c_lat) = self.lat.sin_cos();
        Vec3 {
            x: c_lon * c_lat,
            y: s_lon * c_lat,
            z: s_lat,
        }
    }

    /// Spherical angles of a unit rectangular vector.
    ///
    /// The z component is clamped to [-1, 1] before `asin` (matrix chains
    /// leave unit vectors a few ulps off), and an all-zero x/y pair maps to
    /// `lon` 0 rather than `atan2(0, 0)`.
    pub fn from_vector(v: Vec3) -> SphereCoords {
        SphereCoords {
            lon: norm_two_pi(bearing(v.x, v.y)),
            lat: asin_clamped(v.z),
        }
    }

    /// Rotate these angles by a matrix, leaving the result rectangular.
    pub fn rotate(self, m: &Mat3) -> Vec3 {
        m.mult(self.to_vector())
    }

    /// Rotate these angles by a matrix and convert back to spherical form.
    pub fn rotate_to_sphere(self, m: &Mat3) -> SphereCoords {
        SphereCoords::from_vector(self.rotate(m))
    }

    /// Angular separation to another coordinate \[radians\].
    pub fn separation(self, b: SphereCoords) -> f64 {
        // Vincenty form; stable at small separations and the antipode.
        let (s_d, c_d) = (b.lon - self.lon).sin_cos();
        let (s1, c1) = self.lat.sin_cos();
        let (s2, c2) = b.lat.sin_cos();
        let num = ((c2 * s_d).powi(2) + (c1 * s2 - s1 * c2 * c_d).powi(2)).sqrt();
        let den = s1 * s2 + c1 * c2 * c_d;
        num.atan2(den)
    }
}

impl std::fmt::Display for SphereCoords {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "({:.4}°, {:.4}°)",
            self.lon.to_degrees(),
            self.lat.to_degrees()
        )
    }
}

#[cfg(any(test, feature = "approx"))]
impl approx::AbsDiffEq for SphereCoords {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::EPSILON
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        f64::abs_diff_eq(&self.lon, &other.lon, epsilon)
            && f64::abs_diff_eq(&self.lat, &other.lat, epsilon)
    }
}
