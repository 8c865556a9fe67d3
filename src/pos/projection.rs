// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The sky-to-screen projection.
//!
//! An azimuthal-equidistant mapping: a point's pixel distance from the
//! window centre is directly proportional to its true angular distance from
//! the view centre, with the bearing preserved. That property is what lets
//! grid-drawing code clip rings by angular distance alone.
//!
//! A [`Projector`] is a frozen bundle of the composed rotation matrices
//! plus the screen geometry, built once per render pass and then applied to
//! many thousands of catalog positions.

use std::f64::consts::FRAC_PI_2;

use crate::math::{acos_clamped, bearing};
use crate::matrix::{Mat3, Vec3};
use crate::pos::rotation::Rotation;
use crate::pos::sphere::SphereCoords;
use crate::pos::ProjectionError;

/// Angular distance from the view centre beyond which the forward mapping
/// stops computing coordinates (about 90.01 degrees; just past the
/// projection's hemisphere).
const BEHIND_LIMIT: f64 = FRAC_PI_2 + 1.7453e-4;

/// Which composed matrix a projection applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewFrame {
    /// Catalog (mean) coordinates: the full view matrix, including
    /// precession and nutation.
    Catalog,
    /// Already-apparent coordinates, e.g. a horizon grid: the view matrix
    /// without precession and nutation.
    Apparent,
}

/// A sky position in either representation the projector accepts. The
/// rectangular variant skips the spherical-to-vector trig, which matters
/// when iterating a large catalog of precomputed unit vectors.
#[derive(Clone, Copy, Debug)]
pub enum SkyPoint {
    Sphere(SphereCoords),
    Vector(Vec3),
}

impl From<SphereCoords> for SkyPoint {
    fn from(c: SphereCoords) -> SkyPoint {
        SkyPoint::Sphere(c)
    }
}

impl From<Vec3> for SkyPoint {
    fn from(v: Vec3) -> SkyPoint {
        SkyPoint::Vector(v)
    }
}

/// The classified result of a forward projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Projected {
    /// Inside the visible window.
    Inside { x: f64, y: f64 },
    /// Beyond the window edge but within 90 degrees of the view centre;
    /// the coordinates are valid for paths that exit and re-enter.
    Outside { x: f64, y: f64 },
    /// More than ~90 degrees from the view centre. No coordinates were
    /// computed.
    Behind,
}

impl Projected {
    /// The pixel coordinates, if any were computed.
    pub fn xy(self) -> Option<(f64, f64)> {
        match self {
            Projected::Inside { x, y } | Projected::Outside { x, y } => Some((x, y)),
            Projected::Behind => None,
        }
    }

    pub fn is_inside(self) -> bool {
        matches!(self, Projected::Inside { .. })
    }
}

/// An unclipped projection result: always-computed pixel coordinates plus
/// the angular distance from the view centre, for callers drawing
/// continuous curves that test the distance themselves.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlottedPoint {
    pub x: f64,
    pub y: f64,
    /// Angular distance from the view centre \[radians\]
    pub dist: f64,
}

/// Sky coordinates to pixels and back, for one frozen view.
#[derive(Clone, Debug)]
pub struct Projector {
    view: Mat3,
    unview: Mat3,
    vwop: Mat3,
    unvwop: Mat3,
    ll: Mat3,
    scale: f64,
    midx: f64,
    midy: f64,
    width: f64,
    height: f64,
}

impl Projector {
    /// Freeze the composed matrices of a [`Rotation`] together with the
    /// screen geometry: `scale` in pixels per radian, window `width` and
    /// `height` in pixels.
    pub fn new(
        rotation: &Rotation,
        scale: f64,
        width: f64,
        height: f64,
    ) -> Result<Projector, ProjectionError> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(ProjectionError::InvalidScale(scale));
        }
        if !(width.is_finite() && width > 0.0 && height.is_finite() && height > 0.0) {
            return Err(ProjectionError::InvalidWindow { width, height });
        }
        Ok(Projector {
            view: rotation.view(),
            unview: rotation.unview(),
            vwop: rotation.view_no_precession(),
            unvwop: rotation.unview_no_precession(),
            ll: rotation.equ_to_hor_matrix(),
            scale,
            midx: 0.5 * width,
            midy: 0.5 * height,
            width,
            height,
        })
    }

    fn forward_matrix(&self, frame: ViewFrame) -> &Mat3 {
        match frame {
            ViewFrame::Catalog => &self.view,
            ViewFrame::Apparent => &self.vwop,
        }
    }

    fn inverse_matrix(&self, frame: ViewFrame) -> &Mat3 {
        match frame {
            ViewFrame::Catalog => &self.unview,
            ViewFrame::Apparent => &self.unvwop,
        }
    }

    /// Forward projection with visibility classification.
    pub fn project<P: Into<SkyPoint>>(&self, point: P, frame: ViewFrame) -> Projected {
        let v = self.rotated(point.into(), frame);
        let dist = acos_clamped(v.z);
        if dist > BEHIND_LIMIT {
            return Projected::Behind;
        }
        let (x, y) = self.place(dist, bearing(v.x, v.y));
        if (0.0..=self.width).contains(&x) && (0.0..=self.height).contains(&y) {
            Projected::Inside { x, y }
        } else {
            Projected::Outside { x, y }
        }
    }

    /// Forward projection with no clipping: coordinates are always
    /// computed, along with the angular distance from the view centre.
    /// Grid callers typically stop following a curve once the distance
    /// passes roughly 1.66 radians (95 degrees).
    pub fn project_unclipped<P: Into<SkyPoint>>(&self, point: P, frame: ViewFrame) -> PlottedPoint {
        let v = self.rotated(point.into(), frame);
        let dist = acos_clamped(v.z);
        let (x, y) = self.place(dist, bearing(v.x, v.y));
        PlottedPoint { x, y, dist }
    }

    /// Inverse projection: pixel coordinates back to the spherical
    /// coordinates that would project there. `None` if the pixel lies more
    /// than 90 degrees from the view centre.
    pub fn unproject(&self, x: f64, y: f64, frame: ViewFrame) -> Option<SphereCoords> {
        let v = self.unplace(x, y, frame)?;
        Some(SphereCoords::from_vector(v))
    }

    /// Inverse projection straight to horizon coordinates: the equatorial
    /// result pushed through the equatorial-to-horizontal frame, azimuth
    /// measured from north through east.
    pub fn unproject_horizontal(&self, x: f64, y: f64) -> Option<SphereCoords> {
        use crate::math::{asin_clamped, norm_two_pi};
        let v = self.unplace(x, y, ViewFrame::Catalog)?;
        let h = self.ll.mult(v);
        Some(SphereCoords {
            lon: norm_two_pi(std::f64::consts::PI - bearing(h.x, h.y)),
            lat: asin_clamped(h.z),
        })
    }

    fn rotated(&self, point: SkyPoint, frame: ViewFrame) -> Vec3 {
        let m = self.forward_matrix(frame);
        match point {
            SkyPoint::Sphere(c) => c.rotate(m),
            SkyPoint::Vector(v) => m.mult(v),
        }
    }

    /// Place a point at `dist` radians from centre along `brg`.
    fn place(&self, dist: f64, brg: f64) -> (f64, f64) {
        let (s, c) = brg.sin_cos();
        (
            self.midx + dist * s * self.scale,
            self.midy - dist * c * self.scale,
        )
    }

    /// Reconstruct the rotated-frame unit vector under a pixel and undo the
    /// view rotation. `None` beyond 90 degrees from centre.
    fn unplace(&self, x: f64, y: f64, frame: ViewFrame) -> Option<Vec3> {
        let dx = (x - self.midx) / self.scale;
        let dy = (self.midy - y) / self.scale;
        let dist = (dx * dx + dy * dy).sqrt();
        if dist > FRAC_PI_2 {
            return None;
        }
        let brg = bearing(dy, dx);
        let (s_d, c_d) = dist.sin_cos();
        let (s_b, c_b) = brg.sin_cos();
        let v = Vec3 {
            x: s_d * c_b,
            y: s_d * s_b,
            z: c_d,
        };
        Some(self.inverse_matrix(frame).mult(v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos::nutate::Nutation;
    use crate::pos::rotation::DisplayMode;
    use approx::assert_abs_diff_eq;

    /// An identity view: the centre of the projection is the +z pole
    /// (Dec 90 deg), scale 100 px/rad, a 200x200 window.
    fn identity_projector() -> Projector {
        let mut r = Rotation::new();
        r.re_calc(DisplayMode::AzAlt);
        Projector::new(&r, 100.0, 200.0, 200.0).unwrap()
    }

    fn configured_projector() -> Projector {
        let mut r = Rotation::new();
        r.set_precession(2455197.5);
        r.set_nutation(&Nutation::new(2455197.5));
        r.set_lst_hours(5.31);
        r.set_latitude_deg(-32.4);
        r.set_azimuth(2.2);
        r.set_altitude(0.9);
        r.set_field_deg(14.0);
        r.re_calc(DisplayMode::AzAlt);
        Projector::new(&r, 300.0, 640.0, 480.0).unwrap()
    }

    #[test]
    fn test_bad_geometry_is_rejected() {
        let r = Rotation::new();
        assert!(matches!(
            Projector::new(&r, 0.0, 10.0, 10.0),
            Err(ProjectionError::InvalidScale(_))
        ));
        assert!(matches!(
            Projector::new(&r, f64::NAN, 10.0, 10.0),
            Err(ProjectionError::InvalidScale(_))
        ));
        assert!(matches!(
            Projector::new(&r, 100.0, -5.0, 10.0),
            Err(ProjectionError::InvalidWindow { .. })
        ));
    }

    #[test]
    fn test_view_centre_lands_on_window_centre() {
        let p = identity_projector();
        let centre = SphereCoords::from_degrees(0.0, 90.0);
        match p.project(centre, ViewFrame::Catalog) {
            Projected::Inside { x, y } => {
                assert_abs_diff_eq!(x, 100.0, epsilon = 1e-9);
                assert_abs_diff_eq!(y, 100.0, epsilon = 1e-9);
            }
            other => panic!("centre projected to {other:?}"),
        }
    }

    #[test]
    fn test_pixel_distance_is_proportional_to_angle() {
        // Azimuthal equidistant: 30 deg from centre must land exactly
        // 30 deg * scale pixels out, and 60 deg twice as far.
        let p = identity_projector();
        for dec in [60.0_f64, 30.0] {
            let pt = p.project_unclipped(SphereCoords::from_degrees(0.0, dec), ViewFrame::Catalog);
            let expected = (90.0 - dec).to_radians();
            assert_abs_diff_eq!(pt.dist, expected, epsilon = 1e-12);
            let r = ((pt.x - 100.0).powi(2) + (pt.y - 100.0).powi(2)).sqrt();
            assert_abs_diff_eq!(r, expected * 100.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_offscreen_but_computed() {
        // 80 deg from centre at scale 100 is ~140 px out: beyond the
        // 100 px half-window, still well inside the hemisphere.
        let p = identity_projector();
        match p.project(SphereCoords::from_degrees(0.0, 10.0), ViewFrame::Catalog) {
            Projected::Outside { x, y } => {
                assert!(x.is_finite() && y.is_finite());
            }
            other => panic!("expected Outside, got {other:?}"),
        }
    }

    #[test]
    fn test_just_past_hemisphere_is_behind() {
        // 91 degrees from the view centre: classified away, no
        // coordinates.
        let p = identity_projector();
        let result = p.project(SphereCoords::from_degrees(0.0, -1.0), ViewFrame::Catalog);
        assert_eq!(result, Projected::Behind);
        assert_eq!(result.xy(), None);
    }

    #[test]
    fn test_unclipped_still_computes_past_hemisphere() {
        let p = identity_projector();
        let pt = p.project_unclipped(SphereCoords::from_degrees(0.0, -5.0), ViewFrame::Catalog);
        assert_abs_diff_eq!(pt.dist, 95.0_f64.to_radians(), epsilon = 1e-12);
        assert!(pt.x.is_finite() && pt.y.is_finite());
    }

    #[test]
    fn test_round_trip_identity_view() {
        let p = identity_projector();
        let c = SphereCoords::from_degrees(37.0, 55.0);
        let (x, y) = p.project(c, ViewFrame::Catalog).xy().unwrap();
        let back = p.unproject(x, y, ViewFrame::Catalog).unwrap();
        assert_abs_diff_eq!(back.separation(c), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_round_trip_configured_view() {
        let p = configured_projector();
        // Anything within 90 deg of the view centre must survive the
        // round trip; find such points by unprojecting window pixels.
        for (px, py) in [(320.0, 240.0), (10.0, 20.0), (600.0, 460.0), (320.0, 0.0)] {
            let c = p.unproject(px, py, ViewFrame::Catalog).unwrap();
            let (x, y) = p
                .project(c, ViewFrame::Catalog)
                .xy()
                .expect("unprojected pixel must re-project");
            assert_abs_diff_eq!(x, px, epsilon = 1e-6);
            assert_abs_diff_eq!(y, py, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_raw_vector_path_matches_spherical_path() {
        let p = configured_projector();
        let c = SphereCoords::from_degrees(123.0, -41.0);
        let a = p.project_unclipped(c, ViewFrame::Catalog);
        let b = p.project_unclipped(c.to_vector(), ViewFrame::Catalog);
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-12);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-12);
        assert_abs_diff_eq!(a.dist, b.dist, epsilon = 1e-12);
    }

    #[test]
    fn test_apparent_frame_skips_precession() {
        let p = configured_projector();
        let c = SphereCoords::from_degrees(200.0, -30.0);
        let full = p.project_unclipped(c, ViewFrame::Catalog);
        let apparent = p.project_unclipped(c, ViewFrame::Apparent);
        // A decade of precession moves things by arcminutes: the two
        // frames agree only roughly.
        assert!((full.x - apparent.x).abs() > 1e-6 || (full.y - apparent.y).abs() > 1e-6);
        assert_abs_diff_eq!(full.x, apparent.x, epsilon = 2.0);
        assert_abs_diff_eq!(full.y, apparent.y, epsilon = 2.0);
    }

    #[test]
    fn test_unproject_beyond_hemisphere_is_none() {
        let p = identity_projector();
        // 100 px/rad: a pixel 170 px from centre is ~1.7 rad > pi/2 away.
        assert!(p.unproject(270.0, 100.0, ViewFrame::Catalog).is_none());
    }

    #[test]
    fn test_unproject_horizontal_zenith() {
        // Identity rotation: the window centre is the +z pole, which the
        // horizontal frame also calls altitude pi/2.
        let p = identity_projector();
        let aa = p.unproject_horizontal(100.0, 100.0).unwrap();
        assert_abs_diff_eq!(aa.lat, FRAC_PI_2, epsilon = 1e-9);
    }

    #[test]
    fn test_degenerate_centre_bearing() {
        // Exactly at the view centre the rotated x/y are both zero; the
        // bearing is defined as 0 and the pixel is the window midpoint.
        let p = identity_projector();
        let pt = p.project_unclipped(Vec3::new(0.0, 0.0, 1.0), ViewFrame::Catalog);
        assert_abs_diff_eq!(pt.x, 100.0);
        assert_abs_diff_eq!(pt.y, 100.0);
        assert_abs_diff_eq!(pt.dist, 0.0);
    }
}
