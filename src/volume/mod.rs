//! N-dimensional volume handling: axis addressing, frame extraction and
//! intensity normalization.
//!
//! A volume is an `ndarray::ArrayD` of native samples plus an axis label
//! string with one character per dimension from the set {T, Z, C, Y, X}.
//! Bit depth is preserved end to end; the 8-bit copy produced here exists
//! only for the tracking algorithms.

pub mod axes;
pub mod normalize;
pub mod pixel;

pub use pixel::Pixel;
