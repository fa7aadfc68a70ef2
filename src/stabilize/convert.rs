//! Bridging between `ndarray` frames and OpenCV `Mat`s.

use ndarray::Array2;
use opencv::core::Mat;
use opencv::imgproc;
use opencv::prelude::*;

use crate::error::{Error, Result};

/// Copy an 8-bit frame into a single-channel `CV_8U` Mat.
pub fn mat_from_u8(frame: &Array2<u8>) -> Result<Mat> {
    let rows: Vec<Vec<u8>> = frame.outer_iter().map(|r| r.to_vec()).collect();
    Ok(Mat::from_slice_2d(&rows)?)
}

/// Copy an f32 frame into a single-channel `CV_32F` Mat.
pub fn mat_from_f32(frame: &Array2<f32>) -> Result<Mat> {
    let rows: Vec<Vec<f32>> = frame.outer_iter().map(|r| r.to_vec()).collect();
    Ok(Mat::from_slice_2d(&rows)?)
}

/// Copy a single-channel `CV_32F` Mat back into an f32 frame.
pub fn f32_from_mat(mat: &Mat) -> Result<Array2<f32>> {
    let (h, w) = (mat.rows() as usize, mat.cols() as usize);
    let mut data = Vec::with_capacity(h * w);
    for r in 0..mat.rows() {
        for c in 0..mat.cols() {
            data.push(*mat.at_2d::<f32>(r, c)?);
        }
    }
    Ok(Array2::from_shape_vec((h, w), data).expect("dimensions taken from the Mat"))
}

/// Reduce a frame to single-channel grayscale.
///
/// Projected frames are already single-channel; 3-channel frames are
/// converted with the standard BGR weighting. Anything else cannot be
/// tracked and aborts the run.
pub fn to_gray(frame: &Mat) -> Result<Mat> {
    match frame.channels() {
        1 => Ok(frame.clone()),
        3 => {
            let mut gray = Mat::default();
            imgproc::cvt_color(frame, &mut gray, imgproc::COLOR_BGR2GRAY, 0)?;
            Ok(gray)
        }
        n => Err(Error::UnsupportedFrameFormat(n)),
    }
}
