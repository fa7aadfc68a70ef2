//! Sparse stabilization strategy: ORB keypoint matching with a RANSAC
//! affine fit.
//!
//! The reference is fixed: every frame is compared against the first frame
//! of the run, so each estimate is already an absolute translation and is
//! applied directly rather than accumulated. Only the translation column of
//! the fitted affine transform is used; drift is modeled as pure
//! translation, so rotation/scale components are discarded.

use nalgebra::Vector2;
use opencv::calib3d;
use opencv::core::{KeyPoint, Mat, Point2f, Ptr, Vector};
use opencv::features2d::{BFMatcher, ORB, ORB_ScoreType};
use opencv::prelude::*;

use crate::error::Result;
use crate::stabilize::estimator::{Displacement, MotionEstimator, ShiftMode};

const MAX_FEATURES: i32 = 500;
const MIN_MATCHES: usize = 3;
const RANSAC_REPROJ_THRESHOLD: f64 = 3.0;
const RANSAC_MAX_ITERS: usize = 2000;
const RANSAC_CONFIDENCE: f64 = 0.99;

/// ORB keypoints and descriptors extracted from one grayscale frame.
struct FeatureSet {
    keypoints: Vector<KeyPoint>,
    descriptors: Mat,
}

pub struct FeatureMatchEstimator {
    orb: Ptr<ORB>,
    matcher: BFMatcher,
    reference: Option<FeatureSet>,
}

impl FeatureMatchEstimator {
    pub fn new() -> Result<Self> {
        let orb = ORB::create(
            MAX_FEATURES,
            1.2,
            8,
            31,
            0,
            2,
            ORB_ScoreType::HARRIS_SCORE,
            31,
            20,
        )?;
        let matcher = BFMatcher::new(opencv::core::NORM_HAMMING, true)?;
        Ok(Self {
            orb,
            matcher,
            reference: None,
        })
    }

    fn detect(&mut self, frame: &Mat) -> Result<FeatureSet> {
        let mut keypoints = Vector::<KeyPoint>::new();
        let mut descriptors = Mat::default();
        self.orb.detect_and_compute(
            frame,
            &Mat::default(),
            &mut keypoints,
            &mut descriptors,
            false,
        )?;
        Ok(FeatureSet {
            keypoints,
            descriptors,
        })
    }
}

impl MotionEstimator for FeatureMatchEstimator {
    fn seed(&mut self, reference: &Mat) -> Result<()> {
        self.reference = Some(self.detect(reference)?);
        Ok(())
    }

    fn estimate(&mut self, current: &Mat) -> Result<Displacement> {
        if self.reference.is_none() {
            self.seed(current)?;
            return Ok(Displacement::Insufficient);
        }

        let curr = self.detect(current)?;
        let Some(reference) = self.reference.as_ref() else {
            return Ok(Displacement::Insufficient);
        };
        if reference.descriptors.empty() || curr.descriptors.empty() {
            return Ok(Displacement::Insufficient);
        }

        // Brute-force Hamming matching with mutual cross-check.
        let mut matches = Vector::<opencv::core::DMatch>::new();
        self.matcher.train_match(
            &reference.descriptors,
            &curr.descriptors,
            &mut matches,
            &Mat::default(),
        )?;

        let mut matches = matches.to_vec();
        matches.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if matches.len() < MIN_MATCHES {
            return Ok(Displacement::Insufficient);
        }

        let mut ref_pts = Vector::<Point2f>::new();
        let mut curr_pts = Vector::<Point2f>::new();
        for m in &matches {
            ref_pts.push(reference.keypoints.get(m.query_idx as usize)?.pt());
            curr_pts.push(curr.keypoints.get(m.train_idx as usize)?.pt());
        }

        // Fit current -> reference; RANSAC rejects mismatched keypoints.
        let mut inliers = Mat::default();
        let transform = calib3d::estimate_affine_partial_2d(
            &curr_pts,
            &ref_pts,
            &mut inliers,
            calib3d::RANSAC,
            RANSAC_REPROJ_THRESHOLD,
            RANSAC_MAX_ITERS,
            RANSAC_CONFIDENCE,
            10,
        )?;
        if transform.empty() {
            return Ok(Displacement::Insufficient);
        }

        let dx = *transform.at_2d::<f64>(0, 2)?;
        let dy = *transform.at_2d::<f64>(1, 2)?;
        Ok(Displacement::Shift(Vector2::new(dx as f32, dy as f32)))
    }

    fn shift_mode(&self) -> ShiftMode {
        ShiftMode::Absolute
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
        Array2::from_shape_fn((160, 160), |_| rng.gen_range(0..=255u8))
    }

    fn shifted(frame: &Array2<u8>, dx: isize, dy: isize) -> Array2<u8> {
        let (h, w) = frame.dim();
        Array2::from_shape_fn((h, w), |(y, x)| {
            let sy = y as isize - dy;
            let sx = x as isize - dx;
            if sy >= 0 && sy < h as isize && sx >= 0 && sx < w as isize {
                frame[[sy as usize, sx as usize]]
            } else {
                0
            }
        })
    }

    #[test]
    fn test_identical_frame_estimates_zero_translation() {
        let frame = mat_from_u8(&textured_frame(11)).unwrap();
        let mut estimator = FeatureMatchEstimator::new().unwrap();
        estimator.seed(&frame).unwrap();
        match estimator.estimate(&frame).unwrap() {
            Displacement::Shift(s) => {
                assert!(s.x.abs() < 1.0, "dx = {}", s.x);
                assert!(s.y.abs() < 1.0, "dy = {}", s.y);
            }
            Displacement::Insufficient => panic!("textured frame must match"),
        }
    }

    #[test]
    fn test_known_shift_recovered_with_opposite_sign() {
        let base = textured_frame(23);
        let reference = mat_from_u8(&base).unwrap();
        let current = mat_from_u8(&shifted(&base, 8, 5)).unwrap();
        let mut estimator = FeatureMatchEstimator::new().unwrap();
        estimator.seed(&reference).unwrap();
        match estimator.estimate(&current).unwrap() {
            Displacement::Shift(s) => {
                assert!((s.x + 8.0).abs() <= 1.0, "dx = {}", s.x);
                assert!((s.y + 5.0).abs() <= 1.0, "dy = {}", s.y);
            }
            Displacement::Insufficient => panic!("shifted texture must match"),
        }
    }

    #[test]
    fn test_uniform_frame_reports_insufficient_evidence() {
        let uniform = mat_from_u8(&Array2::from_elem((64, 64), 0u8)).unwrap();
        let mut estimator = FeatureMatchEstimator::new().unwrap();
        estimator.seed(&uniform).unwrap();
        assert_eq!(
            estimator.estimate(&uniform).unwrap(),
            Displacement::Insufficient
        );
    }
}
