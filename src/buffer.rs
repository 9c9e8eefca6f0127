//! Pixel and error buffers exchanged between loader, evaluator and pool.

use imgref::ImgVec;
use rgb::RGB;

use crate::error::{Error, Result};

/// Three-channel floating-point image, row-major.
///
/// Values are either gamma-encoded display values in `[0, 1]` (as loaded from
/// 8/16-bit files) or linear light. [`PixelBuffer::srgb_to_linear`] converts
/// the former into the latter.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelBuffer {
    pixels: ImgVec<RGB<f32>>,
}

impl PixelBuffer {
    /// Wrap row-major pixels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for zero dimensions or a pixel count
    /// that doesn't match `width * height`.
    pub fn new(pixels: Vec<RGB<f32>>, width: usize, height: usize) -> Result<Self> {
        check_dimensions(pixels.len(), width, height)?;
        Ok(Self {
            pixels: ImgVec::new(pixels, width, height),
        })
    }

    /// Buffer filled with a single color.
    pub fn filled(width: usize, height: usize, color: RGB<f32>) -> Result<Self> {
        Self::new(vec![color; width * height], width, height)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.pixels.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.pixels.height()
    }

    /// `(width, height)`.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of range.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> RGB<f32> {
        self.pixels[(x, y)]
    }

    /// All pixels in row-major order.
    pub fn pixels(&self) -> impl Iterator<Item = RGB<f32>> + '_ {
        self.pixels.pixels()
    }

    /// Row-major pixel slice.
    #[must_use]
    pub fn as_slice(&self) -> &[RGB<f32>] {
        self.pixels.buf()
    }

    /// Decode sRGB gamma in place, turning display values into linear light.
    pub fn srgb_to_linear(&mut self) {
        for p in self.pixels.buf_mut() {
            *p = RGB::new(srgb_to_linear(p.r), srgb_to_linear(p.g), srgb_to_linear(p.b));
        }
    }
}

/// Per-pixel error values produced by an evaluator.
///
/// Values are non-negative error magnitudes, normally in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorMap {
    values: ImgVec<f32>,
}

impl ErrorMap {
    /// Wrap row-major error values.
    pub fn new(values: Vec<f32>, width: usize, height: usize) -> Result<Self> {
        check_dimensions(values.len(), width, height)?;
        Ok(Self {
            values: ImgVec::new(values, width, height),
        })
    }

    /// Map where every pixel has the same error.
    pub fn filled(width: usize, height: usize, value: f32) -> Result<Self> {
        Self::new(vec![value; width * height], width, height)
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.values.width()
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.values.height()
    }

    /// Error at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is out of range.
    #[must_use]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[(x, y)]
    }

    /// Rows of error values, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[f32]> {
        self.values.rows()
    }

    /// Row-major value slice. Rows are contiguous, `width()` values each.
    #[must_use]
    pub fn as_slice(&self) -> &[f32] {
        self.values.buf()
    }
}

fn check_dimensions(len: usize, width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::invalid(format!("empty buffer {width}x{height}")));
    }
    if len != width * height {
        return Err(Error::invalid(format!(
            "buffer holds {len} values, expected {width}x{height}"
        )));
    }
    Ok(())
}

/// Apply sRGB gamma decoding to a display value in `[0, 1]`.
#[inline]
#[must_use]
pub fn srgb_to_linear(s: f32) -> f32 {
    if s <= 0.04045 {
        s / 12.92
    } else {
        ((s + 0.055) / 1.055).powf(2.4)
    }
}
