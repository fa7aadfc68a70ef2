//! Crate-wide error type.
//!
//! Only hard failures live here. A frame with too little trackable evidence
//! is *not* an error: the estimators report it through
//! [`Displacement::Insufficient`](crate::stabilize::Displacement) and the
//! pipeline degrades to "no correction this frame".

use thiserror::Error;

/// Errors that abort a stabilization run.
#[derive(Debug, Error)]
pub enum Error {
    /// The axis label string contains no time axis 'T'. Stabilization is
    /// meaningless without a time dimension.
    #[error("no time axis 'T' in axis labels {0:?}")]
    MissingTimeAxis(String),

    /// The axis label string contains more than one 'T'.
    #[error("multiple time axes in axis labels {0:?}")]
    DuplicateTimeAxis(String),

    /// A requested axis label is absent.
    #[error("axis {label:?} not found in axis labels {labels:?}")]
    AxisNotFound { label: char, labels: String },

    /// Axis label string length does not match the volume rank.
    #[error("axis labels {labels:?} describe {} dimensions but volume has rank {rank}", .labels.len())]
    AxisRankMismatch { labels: String, rank: usize },

    /// The volume has a zero-length dimension.
    #[error("volume has a zero-length dimension (shape {shape:?})")]
    EmptyVolume { shape: Vec<usize> },

    /// The volume has too few dimensions to yield 2-D frames.
    #[error("volume rank {0} too small; need a time axis plus two spatial axes")]
    RankTooSmall(usize),

    /// A projected frame is neither single-channel nor 3-channel and cannot
    /// be converted to grayscale.
    #[error("frame has {0} channel(s); expected 1 or 3")]
    UnsupportedFrameFormat(i32),

    /// A corrected frame does not match the shape of the slice it is written
    /// back into.
    #[error("frame shape {frame:?} does not match slice shape {slice:?}")]
    FrameShapeMismatch {
        frame: Vec<usize>,
        slice: Vec<usize>,
    },

    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
