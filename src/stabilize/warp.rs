//! Translation warp with bilinear resampling.

use nalgebra::Vector2;
use ndarray::Array2;
use opencv::core::{Mat, Scalar, Size};
use opencv::imgproc;
use opencv::prelude::*;

use crate::error::Result;
use crate::stabilize::convert::{f32_from_mat, mat_from_f32};

/// Translate a frame by `shift` pixels, preserving its dimensions.
///
/// Samples falling outside the frame are filled with zero background. The
/// pipeline hands in the native-range frame converted to f32, never the
/// 8-bit tracking copy, so corrected output keeps full native precision.
pub fn warp(frame: &Array2<f32>, shift: Vector2<f32>) -> Result<Array2<f32>> {
    let (h, w) = frame.dim();
    let src = mat_from_f32(frame)?;
    let translation = Mat::from_slice_2d(&[
        [1.0f32, 0.0, shift.x],
        [0.0, 1.0, shift.y],
    ])?;

    let mut dst = Mat::default();
    imgproc::warp_affine(
        &src,
        &mut dst,
        &translation,
        Size::new(w as i32, h as i32),
        imgproc::INTER_LINEAR,
        opencv::core::BORDER_CONSTANT,
        Scalar::all(0.0),
    )?;
    f32_from_mat(&dst)
}
