//! Per-size function table.
//!
//! One const-generic instantiation of each operation per catalogue size, so
//! every entry runs with compile-time loop bounds. [`BlockSize::fns`] is the
//! only lookup; callers that keep a `&'static BlockFns` around skip even the
//! size match.

use crate::common::block::{BlockSize, PixelBlock, PredBlock};
use crate::kernels::Kernels;
use crate::variance::engine::{sse_sized, sse_sum_sized, variance_sized, SseSum, VarianceResult};
use crate::variance::subpel::{
    interpolate_block, sub_pixel_avg_variance_sized, sub_pixel_variance_sized, FilterPhase,
};

/// SSE and signed sum of two blocks.
pub type SseSumFn = fn(&Kernels, &PixelBlock<'_>, &PixelBlock<'_>) -> SseSum;
/// SSE of two blocks.
pub type SseFn = fn(&Kernels, &PixelBlock<'_>, &PixelBlock<'_>) -> u32;
/// SSE and variance of two blocks.
pub type VarianceFn = fn(&Kernels, &PixelBlock<'_>, &PixelBlock<'_>) -> VarianceResult;
/// Sub-pixel interpolation of a padded source block.
pub type InterpolateFn = fn(&PixelBlock<'_>, FilterPhase, FilterPhase) -> PredBlock;
/// Variance of an interpolated source against a reference block.
pub type SubpelVarianceFn =
    fn(&Kernels, &PixelBlock<'_>, FilterPhase, FilterPhase, &PixelBlock<'_>) -> VarianceResult;
/// Variance of an interpolated, averaged source against a reference block.
pub type SubpelAvgVarianceFn = fn(
    &Kernels,
    &PixelBlock<'_>,
    FilterPhase,
    FilterPhase,
    &PixelBlock<'_>,
    &PixelBlock<'_>,
) -> VarianceResult;

/// Function entries for one block size.
#[derive(Clone, Copy)]
pub struct BlockFns {
    /// The size these entries are instantiated for.
    pub bsize: BlockSize,
    /// See [`Kernels::sse_sum`].
    pub sse_sum: SseSumFn,
    /// See [`Kernels::sse`].
    pub sse: SseFn,
    /// See [`Kernels::variance`].
    pub variance: VarianceFn,
    /// See [`Kernels::interpolate`].
    pub interpolate: InterpolateFn,
    /// See [`Kernels::sub_pixel_variance`].
    pub sub_pixel_variance: SubpelVarianceFn,
    /// See [`Kernels::sub_pixel_avg_variance`].
    pub sub_pixel_avg_variance: SubpelAvgVarianceFn,
    /// Present for 16x16, 16x8, 8x16 and 8x8 only.
    pub mse: Option<SseFn>,
}

impl core::fmt::Debug for BlockFns {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BlockFns")
            .field("bsize", &self.bsize)
            .field("mse", &self.mse.is_some())
            .finish()
    }
}

fn sse_sum_wh<const W: usize, const H: usize>(
    k: &Kernels,
    a: &PixelBlock<'_>,
    b: &PixelBlock<'_>,
) -> SseSum {
    sse_sum_sized(k.token(), a, b, W, H)
}

fn sse_wh<const W: usize, const H: usize>(k: &Kernels, a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> u32 {
    sse_sized(k.token(), a, b, W, H)
}

fn variance_wh<const W: usize, const H: usize>(
    k: &Kernels,
    a: &PixelBlock<'_>,
    b: &PixelBlock<'_>,
) -> VarianceResult {
    variance_sized(k.token(), a, b, W, H)
}

fn interpolate_wh<const W: usize, const H: usize>(
    src: &PixelBlock<'_>,
    xphase: FilterPhase,
    yphase: FilterPhase,
) -> PredBlock {
    interpolate_block(src, xphase, yphase, W, H)
}

fn sub_pixel_variance_wh<const W: usize, const H: usize>(
    k: &Kernels,
    src: &PixelBlock<'_>,
    xphase: FilterPhase,
    yphase: FilterPhase,
    reference: &PixelBlock<'_>,
) -> VarianceResult {
    sub_pixel_variance_sized(k.token(), src, xphase, yphase, reference, W, H)
}

fn sub_pixel_avg_variance_wh<const W: usize, const H: usize>(
    k: &Kernels,
    src: &PixelBlock<'_>,
    xphase: FilterPhase,
    yphase: FilterPhase,
    reference: &PixelBlock<'_>,
    second_pred: &PixelBlock<'_>,
) -> VarianceResult {
    sub_pixel_avg_variance_sized(k.token(), src, xphase, yphase, reference, second_pred, W, H)
}

macro_rules! block_fns {
    ($bsize:ident, $w:literal, $h:literal) => {
        block_fns!($bsize, $w, $h, None)
    };
    ($bsize:ident, $w:literal, $h:literal, mse) => {
        block_fns!($bsize, $w, $h, Some(sse_wh::<$w, $h> as SseFn))
    };
    ($bsize:ident, $w:literal, $h:literal, $mse:expr) => {
        BlockFns {
            bsize: BlockSize::$bsize,
            sse_sum: sse_sum_wh::<$w, $h>,
            sse: sse_wh::<$w, $h>,
            variance: variance_wh::<$w, $h>,
            interpolate: interpolate_wh::<$w, $h>,
            sub_pixel_variance: sub_pixel_variance_wh::<$w, $h>,
            sub_pixel_avg_variance: sub_pixel_avg_variance_wh::<$w, $h>,
            mse: $mse,
        }
    };
}

/// Indexed by [`BlockSize::index`].
static BLOCK_FNS: [BlockFns; BlockSize::COUNT] = [
    block_fns!(Block4x4, 4, 4),
    block_fns!(Block4x8, 4, 8),
    block_fns!(Block8x4, 8, 4),
    block_fns!(Block8x8, 8, 8, mse),
    block_fns!(Block8x16, 8, 16, mse),
    block_fns!(Block16x8, 16, 8, mse),
    block_fns!(Block16x16, 16, 16, mse),
    block_fns!(Block16x32, 16, 32),
    block_fns!(Block32x16, 32, 16),
    block_fns!(Block32x32, 32, 32),
    block_fns!(Block32x64, 32, 64),
    block_fns!(Block64x32, 64, 32),
    block_fns!(Block64x64, 64, 64),
];

impl BlockSize {
    /// The function entries instantiated for this size.
    #[inline]
    pub fn fns(self) -> &'static BlockFns {
        &BLOCK_FNS[self.index()]
    }
}
