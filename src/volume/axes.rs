//! Axis-label resolution and per-time-step frame access.
//!
//! A volume is addressed through a label string with one character per
//! dimension, e.g. `"TZCYX"`. Frames are 2-D slices at a fixed time index;
//! any non-spatial dimensions left after slicing are collapsed by a
//! maximum-intensity projection, so an extracted frame is always rank 2.

use ndarray::{Array2, ArrayD, Axis, Ix2};

use crate::error::{Error, Result};
use crate::volume::pixel::Pixel;

/// Resolve a named axis label to its positional index.
pub fn axis_index(labels: &str, target: char) -> Result<usize> {
    labels
        .chars()
        .position(|c| c == target)
        .ok_or_else(|| Error::AxisNotFound {
            label: target,
            labels: labels.to_string(),
        })
}

/// Resolve the time axis, enforcing the exactly-one-'T' invariant.
pub fn time_axis(labels: &str) -> Result<usize> {
    match labels.chars().filter(|&c| c == 'T').count() {
        0 => Err(Error::MissingTimeAxis(labels.to_string())),
        1 => axis_index(labels, 'T'),
        _ => Err(Error::DuplicateTimeAxis(labels.to_string())),
    }
}

/// Extract the 2-D frame at time index `t`.
///
/// Slices the time dimension, then collapses leading non-spatial dimensions
/// via element-wise maximum until rank 2 remains.
pub fn extract_frame<T: Pixel>(volume: &ArrayD<T>, t_axis: usize, t: usize) -> Result<Array2<T>> {
    let slice = volume.index_axis(Axis(t_axis), t);
    if slice.ndim() < 2 {
        return Err(Error::RankTooSmall(volume.ndim()));
    }
    if slice.is_empty() {
        return Err(Error::EmptyVolume {
            shape: volume.shape().to_vec(),
        });
    }

    let mut frame: ArrayD<T> = slice.to_owned();
    while frame.ndim() > 2 {
        frame = frame.map_axis(Axis(0), |lane| {
            lane.iter()
                .skip(1)
                .fold(lane[0], |acc, &v| if v > acc { v } else { acc })
        });
    }

    // The collapse loop terminates at exactly rank 2.
    Ok(frame
        .into_dimensionality::<Ix2>()
        .expect("collapse invariant: frame is rank 2"))
}

/// Write a corrected 2-D frame back into the time slice at index `t`.
///
/// If the slice was collapsed from higher rank on extraction, the frame is
/// broadcast across the collapsed leading dimensions; the last two
/// dimensions are written through unchanged.
pub fn write_frame<T: Pixel>(
    volume: &mut ArrayD<T>,
    t_axis: usize,
    t: usize,
    frame: &Array2<T>,
) -> Result<()> {
    let mut slice = volume.index_axis_mut(Axis(t_axis), t);
    let rank = slice.ndim();
    if rank < 2 || slice.shape()[rank - 2..] != *frame.shape() {
        return Err(Error::FrameShapeMismatch {
            frame: frame.shape().to_vec(),
            slice: slice.shape().to_vec(),
        });
    }
    slice.assign(frame);
    Ok(())
}
