//! # microstab
//!
//! Translational drift correction for time-resolved, multi-dimensional
//! microscopy stacks.
//!
//! Input is an N-dimensional intensity volume with a declared axis ordering
//! (e.g. `"TZCYX"`); output is a newly allocated volume of identical shape
//! and dtype with per-time-step drift removed. Two stabilization strategies
//! are available: dense pyramidal optical flow and sparse ORB feature
//! matching with outlier-robust affine estimation.
//!
//! ## Example
//!
//! ```rust,ignore
//! use microstab::{Stabilizer, Strategy};
//!
//! let stabilizer = Stabilizer::new(Strategy::OpticalFlow);
//! let corrected = stabilizer.stabilize(&volume, "TZYX")?;
//! assert_eq!(corrected.shape(), volume.shape());
//! ```

pub mod error;
pub mod io;
pub mod stabilize;
pub mod volume;

pub use error::{Error, Result};
pub use stabilize::{Displacement, MotionEstimator, ShiftMode, Stabilizer, Strategy};
pub use volume::Pixel;
