//! Serialization boundary: reading and writing image stacks.
//!
//! Format conversion from proprietary acquisition files is an external
//! collaborator; the pipeline itself only ever sees in-memory volumes. This
//! module covers the plain multipage-TIFF case the binary needs.

pub mod tiff;
