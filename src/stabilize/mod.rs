//! Motion estimation and drift correction.
//!
//! Two interchangeable strategies sit behind the [`MotionEstimator`] trait:
//! - [`OpticalFlowEstimator`]: dense pyramidal Lucas-Kanade tracking with a
//!   rolling reference (incremental estimates, accumulated drift state);
//! - [`FeatureMatchEstimator`]: sparse ORB matching with a RANSAC affine fit
//!   against a fixed first-frame reference (absolute estimates, applied
//!   directly).
//!
//! The differing reference policies are a deliberate design asymmetry, not
//! something to unify: the drift accumulator knows which mode it is fed.

pub mod convert;
pub mod drift;
pub mod estimator;
pub mod feature_match;
pub mod optical_flow;
pub mod pipeline;
pub mod warp;

pub use drift::{DriftAccumulator, MAX_SHIFT_PX};
pub use estimator::{Displacement, MotionEstimator, ShiftMode};
pub use feature_match::FeatureMatchEstimator;
pub use optical_flow::OpticalFlowEstimator;
pub use pipeline::{Stabilizer, Strategy};
