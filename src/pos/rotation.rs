// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The view-matrix pipeline.
//!
//! A [`Rotation`] owns one elementary matrix per viewing parameter
//! (precession, nutation, local sidereal time, observer latitude, viewing
//! azimuth and altitude, field rotation) and the composites built from them.
//! Each setter rebuilds exactly one elementary matrix; [`Rotation::re_calc`]
//! must be called afterwards or the composites are stale. That is not
//! guarded: this is a low-level numerical toolkit and a missing `re_calc`
//! is a caller bug, same as feeding a singular matrix to `invert`.
//!
//! Every getter returns matrices by value, so no caller can mutate the
//! pipeline through an alias, and `Clone` is a full deep copy: a frozen
//! copy can be handed to a background render or print pass.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::constants::{DAS2R, DAYS_PER_CENTURY, DH2R, J2000};
use crate::math::{asin_clamped, bearing, norm_two_pi};
use crate::matrix::{Mat3, Vec3};
use crate::pos::nutate::Nutation;
use crate::pos::sphere::SphereCoords;

/// What the chart is centred and oriented on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DisplayMode {
    /// Chart drawn in equatorial coordinates; the viewing azimuth is
    /// interpreted as a right ascension.
    RaDec,
    /// Chart drawn in horizon coordinates for the configured latitude and
    /// sidereal time.
    AzAlt,
}

/// The composed rotation state for one view of the sky.
#[derive(Clone, Debug)]
pub struct Rotation {
    // Elementary matrices, one per setter.
    prec: Mat3,
    nut: Mat3,
    lst: Mat3,
    lat: Mat3,
    az: Mat3,
    alt: Mat3,
    fld: Mat3,

    // Composites, rebuilt by re_calc.
    falt: Mat3,
    ll: Mat3,
    unll: Mat3,
    vwop: Mat3,
    unvwop: Mat3,
    ntpr: Mat3,
    unpn: Mat3,
    view: Mat3,
    unview: Mat3,
}

impl Rotation {
    /// A rotation with every matrix at identity: the reference
    /// configuration (LST 0 h, latitude 90 deg, azimuth 0, altitude pi/2,
    /// field 0, no precession or nutation).
    pub fn new() -> Rotation {
        Rotation {
            prec: Mat3::IDENTITY,
            nut: Mat3::IDENTITY,
            lst: Mat3::IDENTITY,
            lat: Mat3::IDENTITY,
            az: Mat3::IDENTITY,
            alt: Mat3::IDENTITY,
            fld: Mat3::IDENTITY,
            falt: Mat3::IDENTITY,
            ll: Mat3::IDENTITY,
            unll: Mat3::IDENTITY,
            vwop: Mat3::IDENTITY,
            unvwop: Mat3::IDENTITY,
            ntpr: Mat3::IDENTITY,
            unpn: Mat3::IDENTITY,
            view: Mat3::IDENTITY,
            unview: Mat3::IDENTITY,
        }
    }

    /// Set the local sidereal time \[hours\]. 0 h is the identity.
    pub fn set_lst_hours(&mut self, lst: f64) {
        self.lst = Mat3::rotation_z(lst * DH2R);
    }

    /// Set the observer latitude \[degrees\]. The north pole is the
    /// identity.
    pub fn set_latitude_deg(&mut self, lat: f64) {
        self.lat = Mat3::rotation_y((90.0 - lat).to_radians());
    }

    /// Set the viewing azimuth \[radians\]. 0 is the identity.
    pub fn set_azimuth(&mut self, az: f64) {
        self.az = Mat3::rotation_z(az);
    }

    /// Set the viewing altitude \[radians\]. The zenith (pi/2) is the
    /// identity; raising the altitude rotates the z axis toward x.
    pub fn set_altitude(&mut self, alt: f64) {
        self.alt = Mat3::rotation_y(FRAC_PI_2 - alt);
    }

    /// Set the field rotation \[degrees\]. 0 is the identity.
    pub fn set_field_deg(&mut self, fld: f64) {
        self.fld = Mat3::rotation_z(fld.to_radians());
    }

    /// Build the precession matrix for a Julian Ephemeris Day: the three
    /// IAU precession angles as cubic polynomials in centuries from J2000
    /// (Meeus 21.2), composed zeta-theta-z.
    pub fn set_precession(&mut self, jde: f64) {
        let t = (jde - J2000) / DAYS_PER_CENTURY;
        let zeta = ((0.017998 * t + 0.30188) * t + 2306.2181) * t * DAS2R;
        let z = ((0.018203 * t + 1.09468) * t + 2306.2181) * t * DAS2R;
        let theta = ((-0.041833 * t - 0.42665) * t + 2004.3109) * t * DAS2R;
        self.prec = Mat3::rotation_z(-z)
            .postmult(&Mat3::rotation_y(theta))
            .postmult(&Mat3::rotation_z(-zeta));
    }

    /// Adopt the nutation matrix from a computed [`Nutation`] state.
    pub fn set_nutation(&mut self, nutation: &Nutation) {
        self.nut = nutation.matrix();
    }

    /// Rebuild every composite matrix from the elementary ones. Call after
    /// any group of setters.
    pub fn re_calc(&mut self, mode: DisplayMode) {
        self.falt = self.fld.postmult(&self.alt);
        self.ll = self.lat.postmult(&self.lst);
        self.unll = self.ll.invert();
        self.vwop = match mode {
            // Azimuth runs clockwise where right ascension runs counter-
            // clockwise; the half turn about z absorbs the difference.
            DisplayMode::RaDec => Mat3::rotation_z(PI)
                .postmult(&self.az)
                .postmult(&self.falt),
            DisplayMode::AzAlt => self.ll.postmult(&self.az).postmult(&self.falt),
        };
        self.unvwop = self.vwop.invert();
        self.ntpr = self.prec.postmult(&self.nut);
        self.unpn = self.ntpr.invert();
        self.view = self.vwop.postmult(&self.ntpr);
        self.unview = self.view.invert();
    }

    /// The full view matrix: catalog equatorial coordinates to the screen
    /// frame.
    pub fn view(&self) -> Mat3 {
        self.view
    }

    /// The inverse of the full view matrix.
    pub fn unview(&self) -> Mat3 {
        self.unview
    }

    /// The view matrix without precession or nutation, for horizon-fixed
    /// overlays that must not precess.
    pub fn view_no_precession(&self) -> Mat3 {
        self.vwop
    }

    /// The inverse of [`Rotation::view_no_precession`].
    pub fn unview_no_precession(&self) -> Mat3 {
        self.unvwop
    }

    /// The field-rotation-times-altitude product.
    pub fn fld_alt(&self) -> Mat3 {
        self.falt
    }

    /// The combined precession and nutation matrix.
    pub fn precess_nutate_matrix(&self) -> Mat3 {
        self.ntpr
    }

    /// The latitude-times-LST product: the equatorial-to-horizontal frame,
    /// independent of where the view is pointed.
    pub fn equ_to_hor_matrix(&self) -> Mat3 {
        self.ll
    }

    /// Apply precession and nutation to a catalog coordinate.
    pub fn precess_nutate(&self, c: SphereCoords) -> SphereCoords {
        c.rotate_to_sphere(&self.ntpr)
    }

    /// Remove precession and nutation from an apparent coordinate.
    pub fn un_precess_nutate(&self, c: SphereCoords) -> SphereCoords {
        c.rotate_to_sphere(&self.unpn)
    }

    /// Apparent equatorial (RA, Dec) to horizon (Az, Alt) for the current
    /// latitude and sidereal time. Azimuth comes out in [0, 2π), measured
    /// from north through east.
    pub fn rd_to_aa(&self, c: SphereCoords) -> SphereCoords {
        let v = c.rotate(&self.ll);
        SphereCoords {
            lon: norm_two_pi(PI - bearing(v.x, v.y)),
            lat: asin_clamped(v.z),
        }
    }

    /// Horizon (Az, Alt) back to apparent equatorial (RA, Dec). The exact
    /// inverse of [`Rotation::rd_to_aa`].
    pub fn aa_to_rd(&self, c: SphereCoords) -> SphereCoords {
        let (s_az, c_az) = c.lon.sin_cos();
        let (s_alt, c_alt) = c.lat.sin_cos();
        let v = Vec3 {
            x: -c_az * c_alt,
            y: s_az * c_alt,
            z: s_alt,
        };
        SphereCoords::from_vector(self.unll.mult(v))
    }
}

impl Default for Rotation {
    fn default() -> Rotation {
        Rotation::new()
    }
}
