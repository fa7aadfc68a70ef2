//! Per-run orchestration: the single public entry point for stabilization.

use nalgebra::Vector2;
use ndarray::ArrayD;

use crate::error::{Error, Result};
use crate::stabilize::convert::{mat_from_u8, to_gray};
use crate::stabilize::drift::DriftAccumulator;
use crate::stabilize::estimator::{Displacement, MotionEstimator};
use crate::stabilize::feature_match::FeatureMatchEstimator;
use crate::stabilize::optical_flow::OpticalFlowEstimator;
use crate::stabilize::warp;
use crate::volume::{axes, normalize, Pixel};

/// Which motion estimation strategy a run uses. Selected once at
/// construction; the estimator tunables are fixed constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    OpticalFlow,
    FeatureMatch,
}

/// Drift stabilization pipeline.
///
/// The stabilizer itself is stateless across runs; all mutable run state
/// (reference frame, corner set, cumulative shift) lives inside one
/// [`stabilize`](Stabilizer::stabilize) call and is never shared.
pub struct Stabilizer {
    strategy: Strategy,
}

impl Stabilizer {
    pub fn new(strategy: Strategy) -> Self {
        Self { strategy }
    }

    /// Remove per-time-step translational drift from `volume`.
    ///
    /// `labels` names one axis per dimension from the set {T, Z, C, Y, X}
    /// and must contain exactly one 'T'. Returns a newly allocated volume of
    /// identical shape and dtype; the input is only borrowed.
    ///
    /// Frame 0 is copied through unchanged and serves as the initial
    /// reference. A frame with too little trackable evidence is passed
    /// through uncorrected and the run continues.
    pub fn stabilize<T: Pixel>(&self, volume: &ArrayD<T>, labels: &str) -> Result<ArrayD<T>> {
        if labels.chars().count() != volume.ndim() {
            return Err(Error::AxisRankMismatch {
                labels: labels.to_string(),
                rank: volume.ndim(),
            });
        }
        let t_axis = axes::time_axis(labels)?;
        if volume.ndim() < 3 {
            return Err(Error::RankTooSmall(volume.ndim()));
        }
        if volume.is_empty() {
            return Err(Error::EmptyVolume {
                shape: volume.shape().to_vec(),
            });
        }

        let frames = volume.shape()[t_axis];
        let (tracking, min, max) = normalize::to_tracking_domain(volume);
        tracing::info!(
            frames,
            strategy = ?self.strategy,
            range_min = min,
            range_max = max,
            "starting stabilization run"
        );

        let mut estimator: Box<dyn MotionEstimator> = match self.strategy {
            Strategy::OpticalFlow => Box::new(OpticalFlowEstimator::new()),
            Strategy::FeatureMatch => Box::new(FeatureMatchEstimator::new()?),
        };
        let mut drift = DriftAccumulator::new(estimator.shift_mode());
        let mut corrected = volume.to_owned();

        let reference = to_gray(&mat_from_u8(&axes::extract_frame(&tracking, t_axis, 0)?)?)?;
        estimator.seed(&reference)?;

        for t in 1..frames {
            let tracking_frame =
                to_gray(&mat_from_u8(&axes::extract_frame(&tracking, t_axis, t)?)?)?;
            let displacement = estimator.estimate(&tracking_frame)?;
            if displacement == Displacement::Insufficient {
                tracing::warn!(frame = t, "insufficient tracking evidence; frame passed through");
            }

            let applied = drift.update(displacement);
            if applied != Vector2::zeros() {
                let native = axes::extract_frame(volume, t_axis, t)?;
                let warped = warp::warp(&native.mapv(|v| v.to_f32()), applied)?;
                axes::write_frame(&mut corrected, t_axis, t, &warped.mapv(T::from_f32))?;
            }
            tracing::debug!(frame = t, dx = applied.x, dy = applied.y, "applied shift");
        }

        tracing::info!(frames, "stabilization run complete");
        Ok(corrected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::IxDyn;

    #[test]
    fn test_missing_time_axis_is_fatal() {
        let volume: ArrayD<u8> = ArrayD::zeros(IxDyn(&[2, 8, 8]));
        let result = Stabilizer::new(Strategy::OpticalFlow).stabilize(&volume, "ZYX");
        assert!(matches!(result, Err(Error::MissingTimeAxis(_))));
    }

    #[test]
    fn test_label_rank_mismatch_is_rejected() {
        let volume: ArrayD<u8> = ArrayD::zeros(IxDyn(&[2, 8, 8]));
        let result = Stabilizer::new(Strategy::OpticalFlow).stabilize(&volume, "TZYX");
        assert!(matches!(result, Err(Error::AxisRankMismatch { .. })));
    }

    #[test]
    fn test_too_few_dimensions_rejected() {
        let volume: ArrayD<u8> = ArrayD::zeros(IxDyn(&[4, 16]));
        let result = Stabilizer::new(Strategy::OpticalFlow).stabilize(&volume, "TX");
        assert!(matches!(result, Err(Error::RankTooSmall(2))));
    }

    #[test]
    fn test_empty_volume_rejected() {
        let volume: ArrayD<u8> = ArrayD::zeros(IxDyn(&[0, 8, 8]));
        let result = Stabilizer::new(Strategy::OpticalFlow).stabilize(&volume, "TYX");
        assert!(matches!(result, Err(Error::EmptyVolume { .. })));
    }
}
