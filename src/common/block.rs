//! Pixel block views and the supported block size catalogue.
//!
//! A [`PixelBlock`] is a borrowed, strided window onto a caller-owned 8-bit
//! plane. A [`PredBlock`] is the owned, contiguous block the sub-pixel
//! interpolator produces. Neither allocates.

use core::fmt;

use crate::error::BlockError;

/// Largest supported block dimension.
pub const MAX_BLOCK_DIM: usize = 64;

/// Pixel count of the largest supported block.
pub const MAX_BLOCK_PIXELS: usize = MAX_BLOCK_DIM * MAX_BLOCK_DIM;

/// The fixed catalogue of block sizes the engine is instantiated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockSize {
    /// 4x4
    Block4x4,
    /// 4x8
    Block4x8,
    /// 8x4
    Block8x4,
    /// 8x8
    Block8x8,
    /// 8x16
    Block8x16,
    /// 16x8
    Block16x8,
    /// 16x16
    Block16x16,
    /// 16x32
    Block16x32,
    /// 32x16
    Block32x16,
    /// 32x32
    Block32x32,
    /// 32x64
    Block32x64,
    /// 64x32
    Block64x32,
    /// 64x64
    Block64x64,
}

impl BlockSize {
    /// Number of catalogue entries.
    pub const COUNT: usize = 13;

    /// Every supported size, in table order.
    pub const ALL: [BlockSize; Self::COUNT] = [
        BlockSize::Block4x4,
        BlockSize::Block4x8,
        BlockSize::Block8x4,
        BlockSize::Block8x8,
        BlockSize::Block8x16,
        BlockSize::Block16x8,
        BlockSize::Block16x16,
        BlockSize::Block16x32,
        BlockSize::Block32x16,
        BlockSize::Block32x32,
        BlockSize::Block32x64,
        BlockSize::Block64x32,
        BlockSize::Block64x64,
    ];

    /// Block width in pixels.
    #[inline]
    pub const fn width(self) -> usize {
        match self {
            BlockSize::Block4x4 | BlockSize::Block4x8 => 4,
            BlockSize::Block8x4 | BlockSize::Block8x8 | BlockSize::Block8x16 => 8,
            BlockSize::Block16x8 | BlockSize::Block16x16 | BlockSize::Block16x32 => 16,
            BlockSize::Block32x16 | BlockSize::Block32x32 | BlockSize::Block32x64 => 32,
            BlockSize::Block64x32 | BlockSize::Block64x64 => 64,
        }
    }

    /// Block height in pixels.
    #[inline]
    pub const fn height(self) -> usize {
        match self {
            BlockSize::Block4x4 | BlockSize::Block8x4 => 4,
            BlockSize::Block4x8 | BlockSize::Block8x8 | BlockSize::Block16x8 => 8,
            BlockSize::Block8x16 | BlockSize::Block16x16 | BlockSize::Block32x16 => 16,
            BlockSize::Block16x32 | BlockSize::Block32x32 | BlockSize::Block64x32 => 32,
            BlockSize::Block32x64 | BlockSize::Block64x64 => 64,
        }
    }

    /// `width * height`.
    #[inline]
    pub const fn pixel_count(self) -> usize {
        self.width() * self.height()
    }

    /// Position of this size in [`BlockSize::ALL`].
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether a dedicated MSE routine exists for this size.
    #[inline]
    pub const fn has_mse(self) -> bool {
        matches!(
            self,
            BlockSize::Block16x16
                | BlockSize::Block16x8
                | BlockSize::Block8x16
                | BlockSize::Block8x8
        )
    }

    /// Look up the catalogue entry for `width x height`.
    pub fn from_dims(width: usize, height: usize) -> Result<Self, BlockError> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.width() == width && b.height() == height)
            .ok_or(BlockError::InvalidDimensions { width, height })
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width(), self.height())
    }
}

/// Whether `dim` is one of the per-dimension sizes 4, 8, 16, 32 or 64.
#[inline]
pub(crate) const fn is_valid_dim(dim: usize) -> bool {
    dim.is_power_of_two() && dim >= 4 && dim <= MAX_BLOCK_DIM
}

/// Bytes needed from the block origin to cover `height` rows of `width`.
#[inline]
const fn required_len(stride: usize, width: usize, height: usize) -> usize {
    (height - 1) * stride + width
}

/// A borrowed, strided view of an 8-bit pixel block.
///
/// `data` starts at the block's top-left pixel; row `y` begins at
/// `y * stride`. The slice may extend past the block (the rest of the frame,
/// or the border padding sub-pixel interpolation reads).
#[derive(Clone, Copy)]
pub struct PixelBlock<'a> {
    data: &'a [u8],
    stride: usize,
    width: usize,
    height: usize,
}

impl<'a> PixelBlock<'a> {
    /// Create a validated view.
    ///
    /// Width and height must each be one of 4, 8, 16, 32 or 64, the stride
    /// must be at least the width, and `data` must cover every row.
    pub fn new(
        data: &'a [u8],
        stride: usize,
        width: usize,
        height: usize,
    ) -> Result<Self, BlockError> {
        if !is_valid_dim(width) || !is_valid_dim(height) {
            return Err(BlockError::InvalidDimensions { width, height });
        }
        if stride < width {
            return Err(BlockError::StrideTooSmall { stride, width });
        }
        let needed = required_len(stride, width, height);
        if data.len() < needed {
            return Err(BlockError::BufferTooSmall {
                needed,
                actual: data.len(),
            });
        }
        Ok(Self::from_parts(data, stride, width, height))
    }

    /// Create a view of a contiguous block (`stride == width`).
    pub fn contiguous(data: &'a [u8], width: usize, height: usize) -> Result<Self, BlockError> {
        Self::new(data, width, width, height)
    }

    /// Create a view without validation.
    ///
    /// For hot paths whose inputs are already known to be well formed. The
    /// constraints of [`PixelBlock::new`] are checked in debug builds only;
    /// a violation in release builds panics on the first out of range row.
    #[inline]
    pub fn from_parts(data: &'a [u8], stride: usize, width: usize, height: usize) -> Self {
        debug_assert!(is_valid_dim(width) && is_valid_dim(height));
        debug_assert!(stride >= width);
        debug_assert!(data.len() >= required_len(stride, width, height));
        Self {
            data,
            stride,
            width,
            height,
        }
    }

    /// View of `bsize` pixels at (`x`, `y`) in a plane of the given stride.
    pub fn at(
        plane: &'a [u8],
        stride: usize,
        x: usize,
        y: usize,
        bsize: BlockSize,
    ) -> Result<Self, BlockError> {
        let origin = y * stride + x;
        let data = plane.get(origin..).ok_or(BlockError::BufferTooSmall {
            needed: origin + 1,
            actual: plane.len(),
        })?;
        Self::new(data, stride, bsize.width(), bsize.height())
    }

    /// Block width in pixels.
    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Block height in pixels.
    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Distance between rows in the backing buffer.
    #[inline]
    pub const fn stride(&self) -> usize {
        self.stride
    }

    /// Backing data, starting at the top-left pixel.
    #[inline]
    pub const fn data(&self) -> &'a [u8] {
        self.data
    }

    /// The catalogue entry matching this view, if any.
    #[inline]
    pub fn block_size(&self) -> Option<BlockSize> {
        BlockSize::from_dims(self.width, self.height).ok()
    }

    /// Row `y`, exactly `width` pixels long.
    #[inline]
    pub fn row(&self, y: usize) -> &'a [u8] {
        &self.data[y * self.stride..][..self.width]
    }

    /// Row `y` extended to `len` pixels, reaching into the right border.
    #[inline]
    pub(crate) fn row_extended(&self, y: usize, len: usize) -> &'a [u8] {
        &self.data[y * self.stride..][..len]
    }

    /// Iterate over the block's rows.
    #[inline]
    pub fn rows(&self) -> impl Iterator<Item = &'a [u8]> + 'a {
        let data = self.data;
        let stride = self.stride;
        let width = self.width;
        (0..self.height).map(move |y| &data[y * stride..][..width])
    }

    /// Whether both views have the same dimensions.
    #[inline]
    pub fn same_size(&self, other: &PixelBlock<'_>) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Check that the buffer holds the extra column and row that sub-pixel
    /// interpolation of this block reads.
    pub fn check_subpel_margin(&self) -> Result<(), BlockError> {
        if self.stride < self.width + 1 {
            return Err(BlockError::StrideTooSmall {
                stride: self.stride,
                width: self.width + 1,
            });
        }
        let needed = required_len(self.stride, self.width + 1, self.height + 1);
        if self.data.len() < needed {
            return Err(BlockError::BufferTooSmall {
                needed,
                actual: self.data.len(),
            });
        }
        Ok(())
    }
}

impl fmt::Debug for PixelBlock<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PixelBlock {{ ptr: {:?}, size: {}({})x{} }}",
            self.data.as_ptr(),
            self.width,
            self.stride,
            self.height
        )
    }
}

/// An owned, contiguous block produced by the sub-pixel interpolator.
///
/// Backed by a fixed 64x64 array so producing one never allocates.
#[derive(Clone)]
pub struct PredBlock {
    data: [u8; MAX_BLOCK_PIXELS],
    width: usize,
    height: usize,
}

impl PredBlock {
    /// A zero-filled block of the given size.
    #[inline]
    pub fn new(bsize: BlockSize) -> Self {
        Self::with_dims(bsize.width(), bsize.height())
    }

    #[inline]
    pub(crate) fn with_dims(width: usize, height: usize) -> Self {
        debug_assert!(is_valid_dim(width) && is_valid_dim(height));
        Self {
            data: [0; MAX_BLOCK_PIXELS],
            width,
            height,
        }
    }

    /// Block width in pixels.
    #[inline]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Block height in pixels.
    #[inline]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// The `width * height` pixels in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[u8] {
        &self.data[..self.width * self.height]
    }

    /// Mutable access to the `width * height` pixels.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data[..self.width * self.height]
    }

    /// Borrow as a [`PixelBlock`] with `stride == width`.
    #[inline]
    pub fn as_block(&self) -> PixelBlock<'_> {
        PixelBlock::from_parts(self.as_slice(), self.width, self.width, self.height)
    }
}

impl fmt::Debug for PredBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PredBlock {{ size: {}x{} }}", self.width, self.height)
    }
}

impl PartialEq for PredBlock {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width && self.height == other.height && self.as_slice() == other.as_slice()
    }
}

impl Eq for PredBlock {}
