//! Error types for the checked block constructors.
//!
//! The statistics and interpolation kernels themselves never fail; these
//! errors only come out of the validating constructors that callers use
//! when the inputs are not already known to be well formed.

use thiserror::Error;

/// Errors reported when building a block view, size or filter phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum BlockError {
    /// The dimensions are not one of the supported block sizes.
    #[error("Invalid block dimensions: {width}x{height}")]
    InvalidDimensions {
        /// The requested width.
        width: usize,
        /// The requested height.
        height: usize,
    },

    /// The row stride is narrower than the block.
    #[error("Stride {stride} is smaller than block width {width}")]
    StrideTooSmall {
        /// The supplied stride.
        stride: usize,
        /// The block width.
        width: usize,
    },

    /// The backing buffer does not cover the block at the given stride.
    #[error("Buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall {
        /// Bytes required from the block origin.
        needed: usize,
        /// Bytes available from the block origin.
        actual: usize,
    },

    /// A bilinear filter phase outside `0..8`.
    #[error("Invalid filter phase: {0}")]
    InvalidPhase(u8),
}
