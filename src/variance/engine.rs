//! Block statistics engine: sum of squared error and mean-adjusted variance.
//!
//! Every statistic is one pass over the `width * height` pixel pairs of two
//! equally sized blocks. The pass accumulates the squared differences and,
//! for the variance, the signed difference sum; the variance is then
//! `sse - sum^2 / (width * height)`, evaluated in 64-bit integers.
//!
//! ## Accumulator ranges
//!
//! The largest block is 64x64 = 4096 pixels. Each squared term is at most
//! 255^2 = 65025, so the SSE stays below 2.67e8 and fits a `u32`. The signed
//! sum reaches +-1_044_480, far outside 16 bits: any kernel that keeps
//! partial sums in 16-bit lanes has to flush them into wider accumulators
//! long before 128 terms per lane. The scalar kernel below sums in `i32` and
//! keeps the two 32-column halves of a 64-wide row in separate streams, the
//! same split the SIMD kernel uses.

use crate::common::block::PixelBlock;
use crate::kernels::SimdTokenType;

/// Raw result of the single-pass reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SseSum {
    /// Sum of squared differences.
    pub sse: u32,
    /// Signed sum of `a - b` over every pixel.
    pub sum: i32,
}

impl SseSum {
    /// Mean-adjusted variance for a block of `pixel_count` pixels.
    #[inline]
    pub fn variance(self, pixel_count: usize) -> u32 {
        variance_from_sse_sum(self.sse, self.sum, pixel_count)
    }
}

/// SSE together with the variance derived from the same pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VarianceResult {
    /// Sum of squared differences.
    pub sse: u32,
    /// `sse - sum^2 / pixel_count`.
    pub variance: u32,
}

/// `sse - (sum * sum) / pixel_count` with a 64-bit product.
///
/// `sum^2 / n <= sse` for any real difference set (Cauchy-Schwarz), so the
/// subtraction cannot underflow for values produced by the kernels.
#[inline]
pub(crate) fn variance_from_sse_sum(sse: u32, sum: i32, pixel_count: usize) -> u32 {
    debug_assert!(pixel_count > 0);
    let mean_term = (i64::from(sum) * i64::from(sum)) / pixel_count as i64;
    debug_assert!(mean_term <= i64::from(sse));
    sse - mean_term as u32
}

#[inline(always)]
fn debug_check_pair(a: &PixelBlock<'_>, b: &PixelBlock<'_>, width: usize, height: usize) {
    debug_assert!(
        a.width() == width && a.height() == height,
        "block A is {}x{}, expected {}x{}",
        a.width(),
        a.height(),
        width,
        height
    );
    debug_assert!(
        b.width() == width && b.height() == height,
        "block B is {}x{}, expected {}x{}",
        b.width(),
        b.height(),
        width,
        height
    );
}

/// SSE and signed sum, SIMD when the token and width allow it.
#[inline(always)]
pub(crate) fn sse_sum_sized(
    token: SimdTokenType,
    a: &PixelBlock<'_>,
    b: &PixelBlock<'_>,
    width: usize,
    height: usize,
) -> SseSum {
    debug_check_pair(a, b, width, height);
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    {
        if let Some(token) = token {
            if width % 16 == 0 {
                return crate::common::simd_sse::sse_sum_sse2(token, a, b, width, height);
            }
        }
    }
    #[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
    let _ = token;
    sse_sum_scalar(a, b, width, height)
}

/// SSE only.
#[inline(always)]
pub(crate) fn sse_sized(
    token: SimdTokenType,
    a: &PixelBlock<'_>,
    b: &PixelBlock<'_>,
    width: usize,
    height: usize,
) -> u32 {
    debug_check_pair(a, b, width, height);
    #[cfg(all(feature = "simd", target_arch = "x86_64"))]
    {
        if let Some(token) = token {
            if width % 16 == 0 {
                return crate::common::simd_sse::sse_sum_sse2(token, a, b, width, height).sse;
            }
        }
    }
    #[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
    let _ = token;
    sse_scalar(a, b, width, height)
}

/// SSE and variance from one reduction.
#[inline(always)]
pub(crate) fn variance_sized(
    token: SimdTokenType,
    a: &PixelBlock<'_>,
    b: &PixelBlock<'_>,
    width: usize,
    height: usize,
) -> VarianceResult {
    let SseSum { sse, sum } = sse_sum_sized(token, a, b, width, height);
    VarianceResult {
        sse,
        variance: variance_from_sse_sum(sse, sum, width * height),
    }
}

/// Scalar reduction of SSE and signed sum.
#[inline(always)]
pub(crate) fn sse_sum_scalar(
    a: &PixelBlock<'_>,
    b: &PixelBlock<'_>,
    width: usize,
    height: usize,
) -> SseSum {
    // Only 64-wide rows are split; narrower rows go entirely to stream 0.
    let split = if width > 32 { 32 } else { width };
    let mut sse = 0u32;
    let mut sums = [0i32; 2];

    for y in 0..height {
        let a_row = &a.row(y)[..width];
        let b_row = &b.row(y)[..width];
        let (a_left, a_right) = a_row.split_at(split);
        let (b_left, b_right) = b_row.split_at(split);

        for (stream, (a_half, b_half)) in [(a_left, b_left), (a_right, b_right)]
            .into_iter()
            .enumerate()
        {
            let mut row_sum = 0i32;
            for (&pa, &pb) in a_half.iter().zip(b_half) {
                let diff = i32::from(pa) - i32::from(pb);
                row_sum += diff;
                sse += (diff * diff) as u32;
            }
            sums[stream] += row_sum;
        }
    }

    SseSum {
        sse,
        sum: sums[0] + sums[1],
    }
}

/// Scalar SSE without the signed sum.
#[inline(always)]
pub(crate) fn sse_scalar(a: &PixelBlock<'_>, b: &PixelBlock<'_>, width: usize, height: usize) -> u32 {
    let mut sse = 0u32;
    for y in 0..height {
        let a_row = &a.row(y)[..width];
        let b_row = &b.row(y)[..width];
        for (&pa, &pb) in a_row.iter().zip(b_row) {
            let diff = i32::from(pa) - i32::from(pb);
            sse += (diff * diff) as u32;
        }
    }
    sse
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(data: &[u8], stride: usize, w: usize, h: usize) -> PixelBlock<'_> {
        PixelBlock::new(data, stride, w, h).unwrap()
    }

    #[test]
    fn test_uniform_shift_has_zero_variance() {
        let a = [0u8; 64];
        let b = [255u8; 64];
        let r = sse_sum_scalar(&block(&a, 8, 8, 8), &block(&b, 8, 8, 8), 8, 8);
        assert_eq!(r.sse, 64 * 255 * 255);
        assert_eq!(r.sse, 4_161_600);
        assert_eq!(r.sum, -16_320);
        assert_eq!(r.variance(64), 0);
    }

    #[test]
    fn test_worst_case_64x64_does_not_overflow() {
        let a = vec![255u8; 64 * 64];
        let b = vec![0u8; 64 * 64];
        let r = sse_sum_scalar(&block(&a, 64, 64, 64), &block(&b, 64, 64, 64), 64, 64);
        assert_eq!(r.sse, 4096 * 65025);
        assert_eq!(r.sum, 4096 * 255);
        assert_eq!(r.variance(4096), 0);
    }

    #[test]
    fn test_known_variance() {
        // Differences alternate 0 and 2: sse = 32 * 4, sum = 64, mean term = 64.
        let a: Vec<u8> = (0..64).map(|i| if i % 2 == 0 { 100 } else { 102 }).collect();
        let b = [100u8; 64];
        let r = sse_sum_scalar(&block(&a, 8, 8, 8), &block(&b, 8, 8, 8), 8, 8);
        assert_eq!(r.sse, 128);
        assert_eq!(r.sum, 64);
        assert_eq!(r.variance(64), 128 - 64);
    }

    #[test]
    fn test_truncating_mean_term() {
        // One pixel differs by 3 in a 4x4 block: 9 - 9/16 truncates to 9 - 0.
        let a = [10u8; 16];
        let mut b = [10u8; 16];
        b[5] = 7;
        let r = sse_sum_scalar(&block(&a, 4, 4, 4), &block(&b, 4, 4, 4), 4, 4);
        assert_eq!(r, SseSum { sse: 9, sum: 3 });
        assert_eq!(r.variance(16), 9);
    }

    #[test]
    fn test_strided_blocks() {
        // Block A lives in a 20-wide plane, B in a 9-wide one.
        let mut plane_a = vec![0u8; 20 * 8];
        let mut plane_b = vec![0u8; 9 * 8];
        for y in 0..8 {
            for x in 0..8 {
                plane_a[y * 20 + x] = (y * 8 + x) as u8;
                plane_b[y * 9 + x] = (y * 8 + x) as u8 + 1;
            }
            // Garbage outside the block must be ignored.
            plane_a[y * 20 + 8] = 200;
            plane_b[y * 9 + 8] = 17;
        }
        let r = sse_sum_scalar(&block(&plane_a, 20, 8, 8), &block(&plane_b, 9, 8, 8), 8, 8);
        assert_eq!(r.sse, 64);
        assert_eq!(r.sum, -64);
        assert_eq!(sse_scalar(&block(&plane_a, 20, 8, 8), &block(&plane_b, 9, 8, 8), 8, 8), 64);
    }

    #[test]
    fn test_split_streams_match_single_stream() {
        let a: Vec<u8> = (0..64 * 32).map(|i| ((i * 37 + 11) % 256) as u8).collect();
        let b: Vec<u8> = (0..64 * 32).map(|i| ((i * 91 + 3) % 256) as u8).collect();
        let r = sse_sum_scalar(&block(&a, 64, 64, 32), &block(&b, 64, 64, 32), 64, 32);

        let mut sse = 0u64;
        let mut sum = 0i64;
        for (&pa, &pb) in a.iter().zip(&b) {
            let d = i64::from(pa) - i64::from(pb);
            sse += (d * d) as u64;
            sum += d;
        }
        assert_eq!(u64::from(r.sse), sse);
        assert_eq!(i64::from(r.sum), sum);
    }
}
