//! Two-pass separable bilinear sub-pixel interpolation.
//!
//! A block is sampled at a fractional offset of `(xphase/8, yphase/8)`
//! pixels. The horizontal pass filters `height + 1` source rows into a
//! 16-bit intermediate buffer; the vertical pass filters adjacent
//! intermediate rows back to 8 bits. Each pass rounds on its own:
//! `(p0 * t0 + p1 * t1 + 64) >> 7`.
//!
//! The source view must have one readable column right of the block and one
//! readable row below it (frame border padding). An axis whose phase is 0
//! never touches that margin.

use crate::common::block::{PixelBlock, PredBlock, MAX_BLOCK_DIM};
use crate::error::BlockError;
use crate::kernels::SimdTokenType;
use crate::variance::engine::{variance_sized, VarianceResult};

/// Fixed-point precision of the filter taps.
pub const FILTER_BITS: u32 = 7;

/// Sum of the two taps of every filter.
pub const FILTER_WEIGHT: u32 = 1 << FILTER_BITS;

/// Two-tap bilinear filters indexed by eighth-pel phase.
pub const BILINEAR_FILTERS: [[u8; 2]; 8] = [
    [128, 0],
    [112, 16],
    [96, 32],
    [80, 48],
    [64, 64],
    [48, 80],
    [32, 96],
    [16, 112],
];

/// Rows in the intermediate buffer: one extra for the vertical taps.
const INTERMEDIATE_LEN: usize = (MAX_BLOCK_DIM + 1) * MAX_BLOCK_DIM;

/// A sub-pixel phase in eighths of a pixel, `0..8`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FilterPhase(u8);

impl FilterPhase {
    /// Full-pel position (identity filter).
    pub const ZERO: FilterPhase = FilterPhase(0);
    /// Half-pel position.
    pub const HALF: FilterPhase = FilterPhase(4);

    /// Validate a phase value.
    pub const fn new(phase: u8) -> Result<Self, BlockError> {
        if phase < 8 {
            Ok(FilterPhase(phase))
        } else {
            Err(BlockError::InvalidPhase(phase))
        }
    }

    /// Fractional part of an eighth-pel motion vector component.
    ///
    /// Works for negative components too: the phase is always the offset to
    /// the right of (or below) the floor integer position.
    #[inline]
    pub const fn from_mv(component: i32) -> Self {
        FilterPhase((component & 7) as u8)
    }

    /// The phase value.
    #[inline]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// The filter taps for this phase.
    #[inline]
    pub const fn taps(self) -> [u8; 2] {
        BILINEAR_FILTERS[self.0 as usize]
    }

    /// Whether this is the identity filter.
    #[inline]
    pub const fn is_full_pel(self) -> bool {
        self.0 == 0
    }
}

impl TryFrom<u8> for FilterPhase {
    type Error = BlockError;

    fn try_from(phase: u8) -> Result<Self, Self::Error> {
        FilterPhase::new(phase)
    }
}

#[inline(always)]
fn round_filter(sum: u32) -> u32 {
    (sum + (FILTER_WEIGHT >> 1)) >> FILTER_BITS
}

/// Whether `src` has the margin the given phases read.
fn has_subpel_extent(src: &PixelBlock<'_>, xphase: FilterPhase, yphase: FilterPhase) -> bool {
    let cols = src.width() + usize::from(!xphase.is_full_pel());
    let rows = src.height() + usize::from(!yphase.is_full_pel());
    src.stride() >= cols && src.data().len() >= (rows - 1) * src.stride() + cols
}

/// Horizontal pass: `rows` source rows into `width`-wide 16-bit rows.
#[inline(always)]
fn filter_first_pass(src: &PixelBlock<'_>, out: &mut [u16], width: usize, rows: usize, taps: [u8; 2]) {
    let t0 = u32::from(taps[0]);
    let t1 = u32::from(taps[1]);
    for (y, out_row) in out.chunks_exact_mut(width).take(rows).enumerate() {
        if t1 == 0 {
            let row = src.row_extended(y, width);
            for (o, &p) in out_row.iter_mut().zip(row) {
                *o = u16::from(p);
            }
        } else {
            let row = src.row_extended(y, width + 1);
            for (o, pair) in out_row.iter_mut().zip(row.windows(2)) {
                *o = round_filter(u32::from(pair[0]) * t0 + u32::from(pair[1]) * t1) as u16;
            }
        }
    }
}

/// Vertical pass: `height + 1` (or `height` at phase 0) intermediate rows
/// into the 8-bit output.
#[inline(always)]
fn filter_second_pass(inter: &[u16], dst: &mut [u8], width: usize, height: usize, taps: [u8; 2]) {
    let t0 = u32::from(taps[0]);
    let t1 = u32::from(taps[1]);
    for (y, dst_row) in dst.chunks_exact_mut(width).take(height).enumerate() {
        let cur = &inter[y * width..][..width];
        if t1 == 0 {
            for (d, &p) in dst_row.iter_mut().zip(cur) {
                *d = p as u8;
            }
        } else {
            let next = &inter[(y + 1) * width..][..width];
            for ((d, &p0), &p1) in dst_row.iter_mut().zip(cur).zip(next) {
                *d = round_filter(u32::from(p0) * t0 + u32::from(p1) * t1) as u8;
            }
        }
    }
}

/// Interpolate `src` at the given phases into a contiguous `width x height`
/// buffer.
#[inline(always)]
pub(crate) fn interpolate_sized(
    src: &PixelBlock<'_>,
    xphase: FilterPhase,
    yphase: FilterPhase,
    width: usize,
    height: usize,
    dst: &mut [u8],
) {
    debug_assert!(src.width() == width && src.height() == height);
    debug_assert!(dst.len() >= width * height);
    debug_assert!(
        has_subpel_extent(src, xphase, yphase),
        "source {:?} lacks the border padding phases ({}, {}) read",
        src,
        xphase.get(),
        yphase.get()
    );

    let mut fdata = [0u16; INTERMEDIATE_LEN];
    let rows = if yphase.is_full_pel() { height } else { height + 1 };
    let inter = &mut fdata[..rows * width];
    filter_first_pass(src, inter, width, rows, xphase.taps());
    filter_second_pass(inter, dst, width, height, yphase.taps());
}

/// Interpolate into a new [`PredBlock`].
#[inline(always)]
pub(crate) fn interpolate_block(
    src: &PixelBlock<'_>,
    xphase: FilterPhase,
    yphase: FilterPhase,
    width: usize,
    height: usize,
) -> PredBlock {
    let mut pred = PredBlock::with_dims(width, height);
    interpolate_sized(src, xphase, yphase, width, height, pred.as_mut_slice());
    pred
}

/// Replace each pixel of the contiguous `pred` by `(pred + second + 1) >> 1`.
#[inline(always)]
pub(crate) fn avg_pred_sized(
    token: SimdTokenType,
    pred: &mut [u8],
    second: &PixelBlock<'_>,
    width: usize,
    height: usize,
) {
    debug_assert!(second.width() == width && second.height() == height);
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    {
        if let Some(token) = token {
            if width % 16 == 0 {
                crate::common::simd_sse::avg_pred_sse2(token, pred, second, width, height);
                return;
            }
        }
    }
    #[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
    let _ = token;
    avg_pred_scalar(pred, second, width, height);
}

#[inline(always)]
fn avg_pred_scalar(pred: &mut [u8], second: &PixelBlock<'_>, width: usize, height: usize) {
    for (y, pred_row) in pred.chunks_exact_mut(width).take(height).enumerate() {
        for (p, &s) in pred_row.iter_mut().zip(second.row(y)) {
            *p = ((u16::from(*p) + u16::from(s) + 1) >> 1) as u8;
        }
    }
}

/// Interpolate `src`, then take the variance against `reference`.
#[inline(always)]
pub(crate) fn sub_pixel_variance_sized(
    token: SimdTokenType,
    src: &PixelBlock<'_>,
    xphase: FilterPhase,
    yphase: FilterPhase,
    reference: &PixelBlock<'_>,
    width: usize,
    height: usize,
) -> VarianceResult {
    let pred = interpolate_block(src, xphase, yphase, width, height);
    variance_sized(token, &pred.as_block(), reference, width, height)
}

/// Interpolate `src`, average with `second_pred`, then take the variance
/// against `reference`.
#[inline(always)]
#[allow(clippy::too_many_arguments)]
pub(crate) fn sub_pixel_avg_variance_sized(
    token: SimdTokenType,
    src: &PixelBlock<'_>,
    xphase: FilterPhase,
    yphase: FilterPhase,
    reference: &PixelBlock<'_>,
    second_pred: &PixelBlock<'_>,
    width: usize,
    height: usize,
) -> VarianceResult {
    let mut pred = interpolate_block(src, xphase, yphase, width, height);
    avg_pred_sized(token, pred.as_mut_slice(), second_pred, width, height);
    variance_sized(token, &pred.as_block(), reference, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(p: u8) -> FilterPhase {
        FilterPhase::new(p).unwrap()
    }

    #[test]
    fn test_filter_table() {
        for (i, taps) in BILINEAR_FILTERS.iter().enumerate() {
            assert_eq!(u32::from(taps[0]) + u32::from(taps[1]), FILTER_WEIGHT);
            assert_eq!(taps[1] as usize, i * 16);
        }
        assert_eq!(FilterPhase::HALF.taps(), [64, 64]);
    }

    #[test]
    fn test_phase_validation() {
        assert!(FilterPhase::new(7).is_ok());
        assert_eq!(FilterPhase::new(8), Err(BlockError::InvalidPhase(8)));
        assert_eq!(FilterPhase::try_from(3u8), Ok(phase(3)));
        assert_eq!(FilterPhase::from_mv(13), phase(5));
        assert_eq!(FilterPhase::from_mv(-3), phase(5));
        assert_eq!(FilterPhase::from_mv(16), FilterPhase::ZERO);
    }

    #[test]
    fn test_half_pel_ramp() {
        // Ramp 0, 16, ..., 112 plus one padding column continuing the ramp.
        let mut src = [0u8; 9 * 4];
        for y in 0..4 {
            for x in 0..9 {
                src[y * 9 + x] = (x * 16) as u8;
            }
        }
        let block = PixelBlock::new(&src, 9, 8, 4).unwrap();
        let pred = interpolate_block(&block, FilterPhase::HALF, FilterPhase::ZERO, 8, 4);
        for y in 0..4 {
            assert_eq!(
                pred.as_block().row(y),
                &[8, 24, 40, 56, 72, 88, 104, 120],
                "row {}",
                y
            );
        }
    }

    #[test]
    fn test_identity_reads_no_margin() {
        // Exactly 4x4 pixels, no padding: phase (0, 0) must not read past it.
        let src: Vec<u8> = (0..16).map(|i| (i * 7) as u8).collect();
        let block = PixelBlock::new(&src, 4, 4, 4).unwrap();
        let pred = interpolate_block(&block, FilterPhase::ZERO, FilterPhase::ZERO, 4, 4);
        assert_eq!(pred.as_slice(), &src[..]);
    }

    #[test]
    fn test_vertical_only_reads_extra_row() {
        // 4 columns exactly, 5 rows: yphase only needs the row below.
        let src: Vec<u8> = (0..20).map(|i| (i / 4 * 40) as u8).collect();
        let block = PixelBlock::new(&src, 4, 4, 4).unwrap();
        assert!(has_subpel_extent(&block, FilterPhase::ZERO, FilterPhase::HALF));
        assert!(!has_subpel_extent(&block, FilterPhase::HALF, FilterPhase::ZERO));
        let pred = interpolate_block(&block, FilterPhase::ZERO, FilterPhase::HALF, 4, 4);
        for y in 0..4 {
            let expected = (y * 40 + 20) as u8;
            assert_eq!(pred.as_block().row(y), &[expected; 4]);
        }
    }

    #[test]
    fn test_rounding_ties_round_up() {
        // (1 * 64 + 2 * 64 + 64) >> 7 = 2: 1.5 rounds to 2.
        let src = [1u8, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1, 2, 1];
        let block = PixelBlock::new(&src, 5, 4, 4).unwrap();
        let pred = interpolate_block(&block, FilterPhase::HALF, FilterPhase::ZERO, 4, 4);
        assert_eq!(pred.as_block().row(0), &[2, 2, 2, 2]);
    }

    #[test]
    fn test_two_pass_rounds_each_pass() {
        // Phase (1, 1) over a single step edge; compare with a hand-rolled
        // two-stage rounding.
        let mut src = [0u8; 5 * 5];
        for y in 0..5 {
            for x in 0..5 {
                src[y * 5 + x] = if x + y >= 4 { 255 } else { 3 };
            }
        }
        let block = PixelBlock::new(&src, 5, 4, 4).unwrap();
        let pred = interpolate_block(&block, phase(1), phase(1), 4, 4);

        let mut expected = [0u8; 16];
        for y in 0..4 {
            for x in 0..4 {
                let h = |r: usize| (u32::from(src[r * 5 + x]) * 112 + u32::from(src[r * 5 + x + 1]) * 16 + 64) >> 7;
                expected[y * 4 + x] = ((h(y) * 112 + h(y + 1) * 16 + 64) >> 7) as u8;
            }
        }
        assert_eq!(pred.as_slice(), &expected);
    }

    #[test]
    fn test_avg_pred_scalar_rounds_up() {
        let row_p = [0u8, 1, 254, 255, 10, 11, 100, 200];
        let row_s = [1u8, 1, 255, 255, 13, 10, 0, 255];
        let mut pred = [0u8; 16];
        let mut second = [0u8; 16];
        pred[..8].copy_from_slice(&row_p);
        pred[8..].copy_from_slice(&row_p);
        second[..8].copy_from_slice(&row_s);
        second[8..].copy_from_slice(&row_s);

        let second_block = PixelBlock::new(&second, 4, 4, 4).unwrap();
        avg_pred_scalar(&mut pred, &second_block, 4, 4);
        assert_eq!(&pred[..8], &[1, 1, 255, 255, 12, 11, 50, 228]);
        assert_eq!(&pred[8..], &[1, 1, 255, 255, 12, 11, 50, 228]);
    }
}
