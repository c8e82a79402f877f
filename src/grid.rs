//! Fixed-size intensity grids.
//!
//! A `NormalizedGrid` is the comparable form of an input image: `width *
//! height` luma samples in row-major order. Every grid produced by one
//! normalizer has the same length, which is what makes direct positional
//! comparison valid.

use crate::util::{PrintMatchError, PrintMatchResult};

/// Owned fixed-size single-channel intensity grid.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedGrid {
    samples: Vec<u8>,
    width: u32,
    height: u32,
}

impl NormalizedGrid {
    /// Creates a grid from row-major luma samples.
    ///
    /// The sample count must equal `width * height` and both dimensions
    /// must be nonzero.
    pub fn new(samples: Vec<u8>, width: u32, height: u32) -> PrintMatchResult<Self> {
        let expected = sample_count(width, height)?;
        if samples.len() != expected {
            return Err(PrintMatchError::SampleCountMismatch {
                expected,
                got: samples.len(),
            });
        }
        Ok(Self {
            samples,
            width,
            height,
        })
    }

    /// Returns the grid width in samples.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the grid height in samples.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the sample count (`width * height`).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns true if the grid holds no samples. Grids constructed through
    /// [`NormalizedGrid::new`] are never empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Returns the row-major samples.
    pub fn samples(&self) -> &[u8] {
        &self.samples
    }
}

pub(crate) fn sample_count(width: u32, height: u32) -> PrintMatchResult<usize> {
    if width == 0 || height == 0 {
        return Err(PrintMatchError::InvalidDimensions { width, height });
    }
    (width as usize)
        .checked_mul(height as usize)
        .ok_or(PrintMatchError::InvalidDimensions { width, height })
}
