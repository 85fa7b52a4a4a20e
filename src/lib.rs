//! Block distortion statistics and bilinear sub-pixel prediction
//!
//! This crate computes the sum of squared error and the mean-adjusted variance
//! between two 8-bit pixel blocks, and samples a reference block at
//! eighth-pixel offsets with a two-pass bilinear filter. These are the inner
//! loops of motion-estimation and rate-distortion decisions in a block-based
//! video encoder.
//!
//! # Features
//!
//! - `std` (default): Enable standard library support.
//! - `simd` (default): Enable x86_64 SIMD kernels for 16-, 32- and 64-wide blocks.
//!
//! # no_std Support
//!
//! The crate needs neither `std` nor `alloc`; every buffer is caller-owned or
//! lives on the stack:
//! ```toml
//! [dependencies]
//! zenvariance = { version = "...", default-features = false }
//! ```
//!
//! # Usage
//!
//! ```rust
//! use zenvariance::{BlockSize, FilterPhase, Kernels, PixelBlock};
//!
//! // A 16x16 reference block with one pixel of right/bottom border padding.
//! let stride = 17;
//! let plane: Vec<u8> = (0..stride * 17).map(|i| (i % 251) as u8).collect();
//! let target = vec![128u8; 16 * 16];
//!
//! let kernels = Kernels::detect();
//! let src = PixelBlock::new(&plane, stride, 16, 16)?;
//! let target = PixelBlock::contiguous(&target, 16, 16)?;
//! src.check_subpel_margin()?;
//!
//! let half = FilterPhase::HALF;
//! let r = kernels.sub_pixel_variance(&src, half, FilterPhase::ZERO, &target);
//! assert!(r.variance <= r.sse);
//!
//! // The same entry through the per-size table.
//! let fns = BlockSize::Block16x16.fns();
//! assert_eq!((fns.sub_pixel_variance)(&kernels, &src, half, FilterPhase::ZERO, &target), r);
//! # Ok::<(), zenvariance::BlockError>(())
//! ```
//!
//! # Safety
//!
//! This crate uses `#![forbid(unsafe_code)]`. With the `simd` feature, the
//! [`archmage`] crate provides the SIMD intrinsics; the `#[arcane]` proc macro
//! generates the unsafe blocks internally, and soundness relies on archmage's
//! token-based safety model.
//!
//! Without the `simd` feature, this crate contains no unsafe code whatsoever.
//!
//! [`archmage`]: https://docs.rs/archmage

#![cfg_attr(not(any(feature = "std", test)), no_std)]
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod common;
mod error;
mod kernels;
pub mod variance;

pub use common::block::{BlockSize, PixelBlock, PredBlock, MAX_BLOCK_DIM, MAX_BLOCK_PIXELS};
pub use error::BlockError;
pub use kernels::Kernels;
pub use variance::{
    avg_pred, interpolate, mse, sse, sse_sum, sub_pixel_avg_variance, sub_pixel_variance,
    variance, BlockFns, FilterPhase, SseSum, VarianceResult,
};
