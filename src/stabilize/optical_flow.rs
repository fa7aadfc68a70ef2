//! Dense stabilization strategy: pyramidal Lucas-Kanade tracking of
//! Shi-Tomasi corners.
//!
//! The reference rolls forward: every successfully estimated frame is
//! promoted to the new reference and its corners are re-detected, so each
//! estimate measures step-to-step motion and must be accumulated by the
//! drift state. On an insufficient-evidence frame the reference and corner
//! set are left untouched.

use nalgebra::Vector2;
use opencv::core::{Mat, Point2f, Size, TermCriteria, Vector};
use opencv::prelude::*;
use opencv::{imgproc, video};

use crate::error::Result;
use crate::stabilize::estimator::{Displacement, MotionEstimator, ShiftMode};

/// Shi-Tomasi corner detection parameters.
const MAX_CORNERS: i32 = 200;
const QUALITY_LEVEL: f64 = 0.01;
const MIN_DISTANCE: f64 = 30.0;
const BLOCK_SIZE: i32 = 7;

/// Minimum successfully tracked corners for a trusted estimate.
const MIN_TRACKED: usize = 10;

/// Lucas-Kanade window and pyramid depth.
const LK_WINDOW: i32 = 21;
const LK_MAX_LEVEL: i32 = 3;

pub struct OpticalFlowEstimator {
    reference: Option<Mat>,
    corners: Vector<Point2f>,
}

impl OpticalFlowEstimator {
    pub fn new() -> Self {
        Self {
            reference: None,
            corners: Vector::new(),
        }
    }

    fn detect_corners(frame: &Mat) -> Result<Vector<Point2f>> {
        let mut corners = Vector::new();
        imgproc::good_features_to_track(
            frame,
            &mut corners,
            MAX_CORNERS,
            QUALITY_LEVEL,
            MIN_DISTANCE,
            &Mat::default(),
            BLOCK_SIZE,
            false,
            0.04,
        )?;
        Ok(corners)
    }
}

impl Default for OpticalFlowEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl MotionEstimator for OpticalFlowEstimator {
    fn seed(&mut self, reference: &Mat) -> Result<()> {
        self.corners = Self::detect_corners(reference)?;
        self.reference = Some(reference.clone());
        Ok(())
    }

    fn estimate(&mut self, current: &Mat) -> Result<Displacement> {
        let Some(reference) = self.reference.take() else {
            self.seed(current)?;
            return Ok(Displacement::Insufficient);
        };

        // A featureless reference (uniform frame) yields no corners; LK
        // rejects an empty point set, so report the lack of evidence here.
        if self.corners.len() < MIN_TRACKED {
            self.reference = Some(reference);
            return Ok(Displacement::Insufficient);
        }

        let mut tracked = Vector::<Point2f>::new();
        let mut status = Vector::<u8>::new();
        let mut err = Vector::<f32>::new();
        let criteria = TermCriteria::new(
            opencv::core::TermCriteria_COUNT + opencv::core::TermCriteria_EPS,
            30,
            0.01,
        )?;
        video::calc_optical_flow_pyr_lk(
            &reference,
            current,
            &self.corners,
            &mut tracked,
            &mut status,
            &mut err,
            Size::new(LK_WINDOW, LK_WINDOW),
            LK_MAX_LEVEL,
            criteria,
            0,
            1e-4,
        )?;

        let mut dxs = Vec::new();
        let mut dys = Vec::new();
        for i in 0..status.len() {
            if status.get(i)? == 1 {
                let p0 = self.corners.get(i)?;
                let p1 = tracked.get(i)?;
                dxs.push(p1.x - p0.x);
                dys.push(p1.y - p0.y);
            }
        }

        if dxs.len() < MIN_TRACKED {
            // Keep the prior reference and corner set; do not refresh.
            self.reference = Some(reference);
            return Ok(Displacement::Insufficient);
        }

        // Median over per-corner displacements: robust to a minority of
        // mistracked corners without a full outlier-rejection pass.
        let shift = Vector2::new(median(&mut dxs), median(&mut dys));

        // Promote the current frame to the new reference.
        self.corners = Self::detect_corners(current)?;
        self.reference = Some(current.clone());

        Ok(Displacement::Shift(shift))
    }

    fn shift_mode(&self) -> ShiftMode {
        ShiftMode::Incremental
    }
}

fn median(values: &mut [f32]) -> f32 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        0.5 * (values[n / 2 - 1] + values[n / 2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stabilize::convert::mat_from_u8;
    use ndarray::Array2;
    use rand::{Rng, SeedableRng};

    fn textured_frame(seed: u64) -> Array2<u8> {
        let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
        Array2::from_shape_fn((128, 128), |_| rng.gen_range(0..=255u8))
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&mut [3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&mut [4.0, 1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn test_identical_frame_estimates_zero_shift() {
        let frame = mat_from_u8(&textured_frame(7)).unwrap();
        let mut estimator = OpticalFlowEstimator::new();
        estimator.seed(&frame).unwrap();
        match estimator.estimate(&frame).unwrap() {
            Displacement::Shift(s) => {
                assert!(s.x.abs() < 0.5, "dx = {}", s.x);
                assert!(s.y.abs() < 0.5, "dy = {}", s.y);
            }
            Displacement::Insufficient => panic!("textured frame must track"),
        }
    }

    #[test]
    fn test_uniform_frame_reports_insufficient_evidence() {
        let uniform = mat_from_u8(&Array2::from_elem((64, 64), 128u8)).unwrap();
        let mut estimator = OpticalFlowEstimator::new();
        estimator.seed(&uniform).unwrap();
        assert_eq!(
            estimator.estimate(&uniform).unwrap(),
            Displacement::Insufficient
        );
    }
}
