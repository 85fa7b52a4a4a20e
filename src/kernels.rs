//! Runtime kernel selection.
//!
//! [`Kernels`] carries a pre-summoned SIMD token so the hot path does not
//! probe CPU features per call. Every engine operation is a method on it;
//! the crate-level free functions summon a fresh `Kernels` each call.

use core::fmt;

use crate::common::block::{PixelBlock, PredBlock};
use crate::variance::engine::{self, SseSum, VarianceResult};
use crate::variance::subpel::{self, FilterPhase};

/// SIMD capability token threaded through the kernels.
#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub(crate) type SimdTokenType = Option<archmage::X64V3Token>;

#[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
pub(crate) type SimdTokenType = Option<()>;

/// Selected kernel tier for the block statistics and interpolation.
#[derive(Clone, Copy)]
pub struct Kernels {
    token: SimdTokenType,
}

impl Kernels {
    /// Use the best kernels the running CPU supports, logging the choice.
    pub fn detect() -> Self {
        let kernels = Self::summon();
        log::debug!("zenvariance: using {} kernels", kernels.tier_name());
        kernels
    }

    /// Use the portable scalar kernels regardless of CPU support.
    pub fn scalar() -> Self {
        log::debug!("zenvariance: scalar kernels forced");
        Self { token: None }
    }

    /// Best available tier, without logging.
    #[inline]
    pub(crate) fn summon() -> Self {
        #[cfg(all(feature = "simd", target_arch = "x86_64"))]
        {
            use archmage::SimdToken;
            Self {
                token: archmage::X64V3Token::summon(),
            }
        }
        #[cfg(not(all(feature = "simd", target_arch = "x86_64")))]
        {
            Self { token: None }
        }
    }

    #[inline(always)]
    pub(crate) fn token(&self) -> SimdTokenType {
        self.token
    }

    /// Whether SIMD kernels are in use.
    #[inline]
    pub fn is_simd(&self) -> bool {
        self.token.is_some()
    }

    /// Name of the selected tier.
    pub fn tier_name(&self) -> &'static str {
        if self.is_simd() {
            "x86-64-v3"
        } else {
            "scalar"
        }
    }

    /// SSE and signed difference sum of two equally sized blocks.
    #[inline]
    pub fn sse_sum(&self, a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> SseSum {
        debug_assert!(a.same_size(b), "{:?} vs {:?}", a, b);
        match a.block_size() {
            Some(bsize) => (bsize.fns().sse_sum)(self, a, b),
            None => engine::sse_sum_sized(self.token, a, b, a.width(), a.height()),
        }
    }

    /// Sum of squared differences of two equally sized blocks.
    #[inline]
    pub fn sse(&self, a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> u32 {
        debug_assert!(a.same_size(b), "{:?} vs {:?}", a, b);
        match a.block_size() {
            Some(bsize) => (bsize.fns().sse)(self, a, b),
            None => engine::sse_sized(self.token, a, b, a.width(), a.height()),
        }
    }

    /// SSE and mean-adjusted variance of two equally sized blocks.
    #[inline]
    pub fn variance(&self, a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> VarianceResult {
        debug_assert!(a.same_size(b), "{:?} vs {:?}", a, b);
        match a.block_size() {
            Some(bsize) => (bsize.fns().variance)(self, a, b),
            None => engine::variance_sized(self.token, a, b, a.width(), a.height()),
        }
    }

    /// SSE through the dedicated MSE entries (16x16, 16x8, 8x16, 8x8).
    ///
    /// Other sizes are a caller error, checked in debug builds; release
    /// builds fall back to [`Kernels::sse`].
    #[inline]
    pub fn mse(&self, a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> u32 {
        let mse = a.block_size().and_then(|bsize| bsize.fns().mse);
        debug_assert!(mse.is_some(), "no MSE entry for {:?}", a);
        match mse {
            Some(mse) => mse(self, a, b),
            None => self.sse(a, b),
        }
    }

    /// Sample `src` at the sub-pixel offset `(xphase, yphase)` eighths.
    ///
    /// The output has `src`'s dimensions. For a non-zero `xphase` the source
    /// must have one readable column past its width, for a non-zero `yphase`
    /// one readable row past its height.
    #[inline]
    pub fn interpolate(&self, src: &PixelBlock<'_>, xphase: FilterPhase, yphase: FilterPhase) -> PredBlock {
        match src.block_size() {
            Some(bsize) => (bsize.fns().interpolate)(src, xphase, yphase),
            None => subpel::interpolate_block(src, xphase, yphase, src.width(), src.height()),
        }
    }

    /// Rounding average `(a + b + 1) >> 1` of two equally sized blocks.
    pub fn avg_pred(&self, a: &PixelBlock<'_>, b: &PixelBlock<'_>) -> PredBlock {
        debug_assert!(a.same_size(b), "{:?} vs {:?}", a, b);
        let (width, height) = (a.width(), a.height());
        let mut out = PredBlock::with_dims(width, height);
        for (dst, src) in out.as_mut_slice().chunks_exact_mut(width).zip(a.rows()) {
            dst.copy_from_slice(src);
        }
        subpel::avg_pred_sized(self.token, out.as_mut_slice(), b, width, height);
        out
    }

    /// Variance of `src` interpolated at `(xphase, yphase)` against
    /// `reference`.
    #[inline]
    pub fn sub_pixel_variance(
        &self,
        src: &PixelBlock<'_>,
        xphase: FilterPhase,
        yphase: FilterPhase,
        reference: &PixelBlock<'_>,
    ) -> VarianceResult {
        debug_assert!(src.same_size(reference), "{:?} vs {:?}", src, reference);
        match reference.block_size() {
            Some(bsize) => (bsize.fns().sub_pixel_variance)(self, src, xphase, yphase, reference),
            None => subpel::sub_pixel_variance_sized(
                self.token,
                src,
                xphase,
                yphase,
                reference,
                reference.width(),
                reference.height(),
            ),
        }
    }

    /// Like [`Kernels::sub_pixel_variance`], with the interpolated block
    /// averaged against `second_pred` before the variance.
    #[inline]
    pub fn sub_pixel_avg_variance(
        &self,
        src: &PixelBlock<'_>,
        xphase: FilterPhase,
        yphase: FilterPhase,
        reference: &PixelBlock<'_>,
        second_pred: &PixelBlock<'_>,
    ) -> VarianceResult {
        debug_assert!(src.same_size(reference), "{:?} vs {:?}", src, reference);
        debug_assert!(second_pred.same_size(reference), "{:?} vs {:?}", second_pred, reference);
        match reference.block_size() {
            Some(bsize) => (bsize.fns().sub_pixel_avg_variance)(
                self,
                src,
                xphase,
                yphase,
                reference,
                second_pred,
            ),
            None => subpel::sub_pixel_avg_variance_sized(
                self.token,
                src,
                xphase,
                yphase,
                reference,
                second_pred,
                reference.width(),
                reference.height(),
            ),
        }
    }
}

impl Default for Kernels {
    fn default() -> Self {
        Self::summon()
    }
}

impl fmt::Debug for Kernels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernels")
            .field("tier", &self.tier_name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_is_not_simd() {
        let k = Kernels::scalar();
        assert!(!k.is_simd());
        assert_eq!(k.tier_name(), "scalar");
    }

    #[test]
    #[cfg(not(feature = "simd"))]
    fn test_detect_without_simd_feature() {
        assert!(!Kernels::detect().is_simd());
    }

    #[test]
    fn test_detect_and_scalar_agree() {
        let a: Vec<u8> = (0..64 * 64).map(|i| ((i * 7 + 3) % 256) as u8).collect();
        let b: Vec<u8> = (0..64 * 64).map(|i| ((i * 13 + 100) % 256) as u8).collect();
        let ba = PixelBlock::new(&a, 64, 64, 64).unwrap();
        let bb = PixelBlock::new(&b, 64, 64, 64).unwrap();
        assert_eq!(Kernels::detect().variance(&ba, &bb), Kernels::scalar().variance(&ba, &bb));
        assert_eq!(Kernels::detect().sse_sum(&ba, &bb), Kernels::scalar().sse_sum(&ba, &bb));
    }
}
