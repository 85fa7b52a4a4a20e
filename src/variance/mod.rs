//! Block statistics and sub-pixel prediction.
//!
//! The free functions here pick the best kernels for the running CPU on every
//! call. Hot loops should hold a [`Kernels`] instead and call its methods.
//!
//! ```rust
//! use zenvariance::{variance, PixelBlock};
//!
//! let a = [0u8; 64];
//! let b = [255u8; 64];
//! let a = PixelBlock::contiguous(&a, 8, 8)?;
//! let b = PixelBlock::contiguous(&b, 8, 8)?;
//! let r = variance(&a, &b);
//! assert_eq!(r.sse, 4_161_600);
//! assert_eq!(r.variance, 0);
//! # Ok::<(), zenvariance::BlockError>(())
//! ```

pub(crate) mod engine;
pub(crate) mod subpel;
mod table;

pub use engine::{SseSum, VarianceResult};
pub use subpel::{FilterPhase, BILINEAR_FILTERS, FILTER_BITS, FILTER_WEIGHT};
pub use table::{
    BlockFns, InterpolateFn, SseFn, SseSumFn, SubpelAvgVarianceFn, SubpelVarianceFn, VarianceFn,
};

use crate::common::block::{PixelBlock, PredBlock};
use crate::kernels::Kernels;

/// Sum of squared differences between two equally sized blocks.
#[inline]
pub fn sse(a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> u32 {
    Kernels::summon().sse(a, b)
}

/// SSE and signed difference sum between two equally sized blocks.
#[inline]
pub fn sse_sum(a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> SseSum {
    Kernels::summon().sse_sum(a, b)
}

/// SSE and mean-adjusted variance between two equally sized blocks.
#[inline]
pub fn variance(a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> VarianceResult {
    Kernels::summon().variance(a, b)
}

/// SSE for 16x16, 16x8, 8x16 and 8x8 blocks.
#[inline]
pub fn mse(a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> u32 {
    Kernels::summon().mse(a, b)
}

/// Bilinear interpolation of `src` at `(xphase, yphase)` eighths of a pixel.
///
/// See [`Kernels::interpolate`] for the padding the source must carry.
#[inline]
pub fn interpolate(src: &PixelBlock<'_>, xphase: FilterPhase, yphase: FilterPhase) -> PredBlock {
    Kernels::summon().interpolate(src, xphase, yphase)
}

/// Rounding average of two equally sized blocks.
#[inline]
pub fn avg_pred(a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> PredBlock {
    Kernels::summon().avg_pred(a, b)
}

/// Variance of the interpolated `src` against `reference`.
#[inline]
pub fn sub_pixel_variance(
    src: &PixelBlock<'_>,
    xphase: FilterPhase,
    yphase: FilterPhase,
    reference: &PixelBlock<'_>,
) -> VarianceResult {
    Kernels::summon().sub_pixel_variance(src, xphase, yphase, reference)
}

/// Variance of the interpolated `src`, averaged with `second_pred`, against
/// `reference`.
#[inline]
pub fn sub_pixel_avg_variance(
    src: &PixelBlock<'_>,
    xphase: FilterPhase,
    yphase: FilterPhase,
    reference: &PixelBlock<'_>,
    second_pred: &PixelBlock<'_>,
) -> VarianceResult {
    Kernels::summon().sub_pixel_avg_variance(src, xphase, yphase, reference, second_pred)
}
