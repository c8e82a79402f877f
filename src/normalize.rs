//! Image input sources and the canonical normalizer.
//!
//! Normalization is the only lossy step of the pipeline: a supported raster
//! input is decoded, stretched to one canonical size, and reduced to luma.
//! Aspect ratio is not preserved; the downstream comparison is a coarse
//! holistic metric and accepts the distortion.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use image::imageops::FilterType;

use crate::grid::{self, NormalizedGrid};
use crate::trace::trace_span;
use crate::util::{PrintMatchError, PrintMatchResult};

/// Raw encoded image input.
///
/// `Bytes` keeps the encoded payload behind an `Arc` so registry snapshots
/// clone cheaply; `Path` defers reading to normalization time.
#[derive(Clone)]
pub enum ImageSource {
    /// Encoded image bytes held in memory.
    Bytes(Arc<[u8]>),
    /// Encoded image read from disk when normalized.
    Path(PathBuf),
}

impl ImageSource {
    /// Wraps encoded bytes.
    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Wraps a filesystem path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::Path(path.into())
    }
}

/// Converts arbitrary encoded images into comparable fixed-size grids.
///
/// Normalization is deterministic: the same input bytes always produce
/// bit-identical grids.
#[derive(Clone, Copy)]
pub struct Normalizer {
    width: u32,
    height: u32,
}

impl Normalizer {
    /// Creates a normalizer producing `width x height` grids.
    pub fn new(width: u32, height: u32) -> PrintMatchResult<Self> {
        grid::sample_count(width, height)?;
        Ok(Self { width, height })
    }

    /// Returns the canonical grid width.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the canonical grid height.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Normalizes one encoded image into a grid.
    ///
    /// A failure affects only this image: an unreadable path reports
    /// [`PrintMatchError::Io`], undecodable bytes report
    /// [`PrintMatchError::Decode`].
    pub fn normalize(&self, source: &ImageSource) -> PrintMatchResult<NormalizedGrid> {
        match source {
            ImageSource::Bytes(bytes) => self.normalize_bytes(bytes),
            ImageSource::Path(path) => {
                let bytes = fs::read(path).map_err(|err| PrintMatchError::Io {
                    path: path.clone(),
                    reason: err.to_string(),
                })?;
                self.normalize_bytes(&bytes)
            }
        }
    }

    /// Normalizes encoded bytes into a grid.
    pub fn normalize_bytes(&self, bytes: &[u8]) -> PrintMatchResult<NormalizedGrid> {
        let _span = trace_span!("normalize", width = self.width, height = self.height).entered();

        let decoded = image::load_from_memory(bytes).map_err(|err| PrintMatchError::Decode {
            reason: err.to_string(),
        })?;
        let resized = decoded.resize_exact(self.width, self.height, FilterType::Lanczos3);
        let luma = resized.to_luma8();
        NormalizedGrid::new(luma.into_raw(), self.width, self.height)
    }
}
