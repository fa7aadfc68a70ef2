//! Motion estimation interface shared by the two stabilization strategies.

use nalgebra::Vector2;
use opencv::core::Mat;

use crate::error::Result;

/// Per-step translation estimate produced by a [`MotionEstimator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Displacement {
    /// Estimated (dx, dy) translation in pixels.
    Shift(Vector2<f32>),
    /// Too few reliable correspondences to trust an estimate. Not an error;
    /// the pipeline degrades to "no correction this frame".
    Insufficient,
}

/// How a strategy's estimates relate to the drift state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShiftMode {
    /// Estimates measure step-to-step motion against a rolling reference and
    /// must be accumulated (optical flow).
    Incremental,
    /// Estimates measure absolute translation against a fixed first-frame
    /// reference and are applied directly (feature matching).
    Absolute,
}

/// A motion estimation strategy.
///
/// Each implementation owns its [`ReferenceState`]: the grayscale frame (and
/// for optical flow, the tracked corner set) the current frame is compared
/// against, together with the policy for when that reference is refreshed.
/// One estimator instance serves exactly one stabilization run.
pub trait MotionEstimator {
    /// Install the first frame as the tracking reference.
    fn seed(&mut self, reference: &Mat) -> Result<()>;

    /// Estimate the displacement of `current` relative to the reference.
    fn estimate(&mut self, current: &Mat) -> Result<Displacement>;

    /// How this strategy's estimates feed the drift accumulator.
    fn shift_mode(&self) -> ShiftMode;
}
