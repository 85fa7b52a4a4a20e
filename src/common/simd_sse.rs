//! SIMD-accelerated block statistics and prediction averaging
//!
//! SSE2-class kernels for widths that are a multiple of 16. Narrower blocks
//! stay on the scalar path, which the compiler vectorizes well enough for
//! 4- and 8-wide rows.
//!
//! Uses archmage for safe SIMD intrinsics with token-based CPU feature verification.

use archmage::{arcane, X64V3Token};
use core::arch::x86_64::*;
use safe_unaligned_simd::x86_64 as simd_mem;

use super::block::PixelBlock;
use crate::variance::SseSum;

/// SSE and signed difference sum between two blocks
///
/// Differences are formed in 16-bit lanes. Squares go straight to 32-bit
/// through `madd`. The signed differences are summed per row in 16-bit lanes
/// (at most eight terms per lane on a 64-wide row) and widened into two
/// 32-bit streams, alternating by 16-column chunk, at the end of every row.
/// Keeping them in 16 bits across rows would overflow on large blocks.
#[arcane]
pub(crate) fn sse_sum_sse2(
    _token: X64V3Token,
    a: &PixelBlock<'_>,
    b: &PixelBlock<'_>,
    width: usize,
    height: usize,
) -> SseSum {
    debug_assert!(width % 16 == 0);
    let zero = _mm_setzero_si128();
    let ones = _mm_set1_epi16(1);

    let mut sse_acc = _mm_setzero_si128();
    let mut sum_acc = [_mm_setzero_si128(); 2];

    for y in 0..height {
        let a_row = &a.row(y)[..width];
        let b_row = &b.row(y)[..width];
        let mut row_sum = [zero; 2];

        for (i, (a_chunk, b_chunk)) in a_row
            .chunks_exact(16)
            .zip(b_row.chunks_exact(16))
            .enumerate()
        {
            let (Some(a16), Some(b16)) = (a_chunk.first_chunk::<16>(), b_chunk.first_chunk::<16>())
            else {
                continue;
            };
            let a_bytes = simd_mem::_mm_loadu_si128(a16);
            let b_bytes = simd_mem::_mm_loadu_si128(b16);

            // Unpack to 16-bit
            let a_lo = _mm_unpacklo_epi8(a_bytes, zero);
            let a_hi = _mm_unpackhi_epi8(a_bytes, zero);
            let b_lo = _mm_unpacklo_epi8(b_bytes, zero);
            let b_hi = _mm_unpackhi_epi8(b_bytes, zero);

            // Signed differences in [-255, 255]
            let d_lo = _mm_sub_epi16(a_lo, b_lo);
            let d_hi = _mm_sub_epi16(a_hi, b_hi);

            // Square and accumulate (pairs of i16 multiplied and summed to i32)
            sse_acc = _mm_add_epi32(sse_acc, _mm_madd_epi16(d_lo, d_lo));
            sse_acc = _mm_add_epi32(sse_acc, _mm_madd_epi16(d_hi, d_hi));

            let stream = i & 1;
            row_sum[stream] = _mm_add_epi16(row_sum[stream], _mm_add_epi16(d_lo, d_hi));
        }

        // Widen the row's 16-bit sums to 32-bit
        sum_acc[0] = _mm_add_epi32(sum_acc[0], _mm_madd_epi16(row_sum[0], ones));
        sum_acc[1] = _mm_add_epi32(sum_acc[1], _mm_madd_epi16(row_sum[1], ones));
    }

    let sum_total = _mm_add_epi32(sum_acc[0], sum_acc[1]);

    // Horizontal sums
    let sse = _mm_add_epi32(sse_acc, _mm_shuffle_epi32(sse_acc, 0b10_11_00_01)); // swap pairs
    let sse = _mm_add_epi32(sse, _mm_shuffle_epi32(sse, 0b01_00_11_10)); // swap halves
    let sum = _mm_add_epi32(sum_total, _mm_shuffle_epi32(sum_total, 0b10_11_00_01));
    let sum = _mm_add_epi32(sum, _mm_shuffle_epi32(sum, 0b01_00_11_10));

    SseSum {
        sse: _mm_cvtsi128_si32(sse) as u32,
        sum: _mm_cvtsi128_si32(sum),
    }
}

/// In-place rounding average of a contiguous prediction with a second block
///
/// `pavgb` computes `(a + b + 1) >> 1` per byte, which is exactly the
/// scalar rounding.
#[arcane]
pub(crate) fn avg_pred_sse2(
    _token: X64V3Token,
    pred: &mut [u8],
    second: &PixelBlock<'_>,
    width: usize,
    height: usize,
) {
    debug_assert!(width % 16 == 0);
    for (y, pred_row) in pred.chunks_exact_mut(width).take(height).enumerate() {
        let second_row = &second.row(y)[..width];
        for (p_chunk, s_chunk) in pred_row.chunks_exact_mut(16).zip(second_row.chunks_exact(16)) {
            let Some(s16) = s_chunk.first_chunk::<16>() else {
                continue;
            };
            let Some(p16) = p_chunk.first_chunk_mut::<16>() else {
                continue;
            };
            let p_bytes = simd_mem::_mm_loadu_si128(&*p16);
            let s_bytes = simd_mem::_mm_loadu_si128(s16);
            simd_mem::_mm_storeu_si128(p16, _mm_avg_epu8(p_bytes, s_bytes));
        }
    }
}
