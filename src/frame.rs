// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Render-pass state.
//!
//! A [`ViewState`] is the live, mutable observer: a ticking clock, a
//! pointing direction, screen geometry. A [`Frame`] is the immutable
//! snapshot a render pass actually draws from, frozen once at the start of
//! the pass so a clock advancing on a timer thread cannot change the sky
//! mid-draw. The snapshot is a plain owned value; nothing is shared by
//! reference across the render boundary, and `Clone` hands an identical
//! frozen copy to a background or print pass.
//!
//! Cancellation is cooperative: a [`CancelToken`] is polled between chunks
//! of work, never preemptively.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hifitime::Epoch;
use log::debug;

use crate::matrix::Vec3;
use crate::pos::nutate::Nutation;
use crate::pos::projection::{Projected, Projector, ViewFrame};
use crate::pos::rotation::{DisplayMode, Rotation};
use crate::pos::ProjectionError;
use crate::time;

/// How many catalog entries are projected between cancellation polls.
const POLL_STRIDE: usize = 512;

/// An advisory cancellation flag. Cloning shares the flag; a request takes
/// effect at the next poll point, never sooner.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }

    /// Ask any pass holding this token to stop at its next poll point.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// The live observer and screen configuration a frame is frozen from.
#[derive(Clone, Copy, Debug)]
pub struct ViewState {
    /// Civil time (UTC).
    pub epoch: Epoch,
    /// Observer longitude \[degrees, east positive\]
    pub longitude_deg: f64,
    /// Observer latitude \[degrees\]
    pub latitude_deg: f64,
    /// Viewing azimuth \[radians\]
    pub azimuth_rad: f64,
    /// Viewing altitude \[radians\]
    pub altitude_rad: f64,
    /// Field rotation \[degrees\]
    pub field_deg: f64,
    pub mode: DisplayMode,
    /// Pixels per radian.
    pub scale: f64,
    /// Window width \[pixels\]
    pub width: f64,
    /// Window height \[pixels\]
    pub height: f64,
}

impl ViewState {
    /// A zenith-pointing Az/Alt view for an observer; pointing and screen
    /// fields are public and meant to be adjusted directly.
    pub fn new(epoch: Epoch, longitude_deg: f64, latitude_deg: f64) -> ViewState {
        ViewState {
            epoch,
            longitude_deg,
            latitude_deg,
            azimuth_rad: 0.0,
            altitude_rad: std::f64::consts::FRAC_PI_2,
            field_deg: 0.0,
            mode: DisplayMode::AzAlt,
            scale: 300.0,
            width: 800.0,
            height: 600.0,
        }
    }
}

/// One render pass's frozen view of the world.
#[derive(Clone, Debug)]
pub struct Frame {
    /// The UT Julian Day the pass was frozen at.
    pub jd_ut: f64,
    /// The matching Julian Ephemeris Day (Delta-T applied).
    pub jde: f64,
    /// The frozen local sidereal time \[hours\]
    pub lst_hours: f64,
    pub nutation: Nutation,
    pub rotation: Rotation,
    pub projector: Projector,
}

impl Frame {
    /// Snapshot the live state: freeze the clock, compose the rotation
    /// pipeline once, and bundle the projector for the pass.
    pub fn freeze(state: &ViewState) -> Result<Frame, ProjectionError> {
        let jd_ut = time::julian_day_utc(state.epoch);
        let jde = time::ephemeris_day(jd_ut);
        let lst = time::lst_hours(jd_ut, state.longitude_deg);
        let nutation = Nutation::new(jde);

        let mut rotation = Rotation::new();
        rotation.set_precession(jde);
        rotation.set_nutation(&nutation);
        rotation.set_lst_hours(lst);
        rotation.set_latitude_deg(state.latitude_deg);
        rotation.set_azimuth(state.azimuth_rad);
        rotation.set_altitude(state.altitude_rad);
        rotation.set_field_deg(state.field_deg);
        rotation.re_calc(state.mode);

        let projector = Projector::new(&rotation, state.scale, state.width, state.height)?;
        debug!("froze frame at JD {jd_ut:.6} (LST {lst:.4} h)");
        Ok(Frame {
            jd_ut,
            jde,
            lst_hours: lst,
            nutation,
            rotation,
            projector,
        })
    }

    /// Project a catalog of precomputed unit vectors, polling the
    /// cancellation token between chunks. Returns `None` if the pass was
    /// cancelled; the partial work is discarded.
    pub fn project_catalog(&self, catalog: &[Vec3], cancel: &CancelToken) -> Option<Vec<Projected>> {
        let mut out = Vec::with_capacity(catalog.len());
        for chunk in catalog.chunks(POLL_STRIDE) {
            if cancel.is_cancelled() {
                return None;
            }
            out.extend(
                chunk
                    .iter()
                    .map(|&v| self.projector.project(v, ViewFrame::Catalog)),
            );
        }
        Some(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos::sphere::SphereCoords;
    use approx::assert_abs_diff_eq;

    fn test_state() -> ViewState {
        let epoch = Epoch::from_gregorian_utc_at_midnight(2010, 1, 1);
        ViewState::new(epoch, 116.67, -26.7)
    }

    #[test]
    fn test_freeze_composes_a_consistent_frame() {
        let frame = Frame::freeze(&test_state()).unwrap();
        assert_abs_diff_eq!(frame.jd_ut, 2455197.5, epsilon = 1e-6);
        assert!(frame.jde > frame.jd_ut);
        assert!((0.0..24.0).contains(&frame.lst_hours));
        // The frozen projector and rotation agree.
        let c = SphereCoords::from_degrees(83.0, -5.4);
        let via_frame = frame.projector.project_unclipped(c, ViewFrame::Catalog);
        let expected = Projector::new(&frame.rotation, 300.0, 800.0, 600.0)
            .unwrap()
            .project_unclipped(c, ViewFrame::Catalog);
        assert_abs_diff_eq!(via_frame.x, expected.x, epsilon = 1e-12);
        assert_abs_diff_eq!(via_frame.y, expected.y, epsilon = 1e-12);
    }

    #[test]
    fn test_frozen_frame_ignores_live_changes() {
        let mut state = test_state();
        let frame = Frame::freeze(&state).unwrap();
        // The live clock ticks on; the frozen pass must not move.
        state.epoch = state.epoch + hifitime::Duration::from_f64(3600.0, hifitime::Unit::Second);
        let later = Frame::freeze(&state).unwrap();
        assert!(later.lst_hours != frame.lst_hours);
        let again = frame.clone();
        assert_abs_diff_eq!(again.lst_hours, frame.lst_hours);
    }

    #[test]
    fn test_project_catalog_runs_to_completion() {
        let frame = Frame::freeze(&test_state()).unwrap();
        let catalog: Vec<Vec3> = (0..2000)
            .map(|i| {
                SphereCoords::from_degrees(f64::from(i) * 0.173, f64::from(i % 170) - 85.0)
                    .to_vector()
            })
            .collect();
        let projected = frame
            .project_catalog(&catalog, &CancelToken::new())
            .expect("no cancellation requested");
        assert_eq!(projected.len(), catalog.len());
    }

    #[test]
    fn test_project_catalog_honours_cancellation() {
        let frame = Frame::freeze(&test_state()).unwrap();
        let catalog = vec![Vec3::new(0.0, 0.0, 1.0); 4096];
        let token = CancelToken::new();
        token.cancel();
        assert!(frame.project_catalog(&catalog, &token).is_none());
    }
}
