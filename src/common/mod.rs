//! Block views and the SIMD kernels shared by the statistics and prediction code

pub mod block;

#[cfg(all(feature = "simd", target_arch = "x86_64"))]
pub(crate) mod simd_sse;
