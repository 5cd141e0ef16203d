//! In-memory planes.
//!
//! [`MemoryPlanes`] is an [`Indexer`] over owned planes keyed by selection,
//! and [`MemoryDecoder`] is the matching decode capability with window and
//! interleave support. Useful for synthetic datasets and for data that was
//! decoded up front.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{DecodeError, PixelSourceError};
use crate::legacy::{PyramidPlane, SampleFormat};
use crate::pixel::{SampleBuffer, SampleKind};
use crate::tile::Window;

use super::contract::{DecodeOptions, DecodedRaster, DecodedSamples, Indexer, PlaneDecoder};
use super::selection::Selection;

/// Tile size reported by planes that do not set one.
pub const DEFAULT_MEMORY_TILE_SIZE: u32 = 512;

// =============================================================================
// MemoryPlane
// =============================================================================

/// One plane held as planar bands of equal kind and size.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryPlane {
    width: u32,
    height: u32,
    tile_size: u32,
    bands: Vec<SampleBuffer>,
}

impl MemoryPlane {
    /// Create a plane from `width * height` sample bands.
    pub fn new(width: u32, height: u32, bands: Vec<SampleBuffer>) -> Result<Self, DecodeError> {
        let first = bands.first().ok_or(DecodeError::MissingBand)?;
        let expected = width as usize * height as usize;

        for band in &bands {
            if band.kind() != first.kind() {
                return Err(DecodeError::SampleKindMismatch {
                    expected: first.kind(),
                    actual: band.kind(),
                });
            }
            if band.len() != expected {
                return Err(DecodeError::SampleCountMismatch {
                    expected,
                    actual: band.len(),
                });
            }
        }

        Ok(Self {
            width,
            height,
            tile_size: DEFAULT_MEMORY_TILE_SIZE,
            bands,
        })
    }

    /// Create a single-band plane.
    pub fn single(width: u32, height: u32, samples: SampleBuffer) -> Result<Self, DecodeError> {
        Self::new(width, height, vec![samples])
    }

    /// Set the tile size this plane reports to pyramid consumers.
    pub fn with_tile_size(mut self, tile_size: u32) -> Self {
        self.tile_size = tile_size;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Element kind shared by all bands.
    pub fn kind(&self) -> SampleKind {
        self.bands[0].kind()
    }

    /// Decode the requested window, planar or interleaved.
    pub fn decode(&self, options: DecodeOptions) -> Result<DecodedRaster, DecodeError> {
        let window = options
            .window
            .unwrap_or_else(|| Window::full(self.width, self.height));
        if !window.fits_within(self.width, self.height) {
            return Err(DecodeError::WindowOutOfBounds {
                x0: window.x0,
                y0: window.y0,
                x1: window.x1,
                y1: window.y1,
                width: self.width,
                height: self.height,
            });
        }

        let bands: Vec<SampleBuffer> = if window == Window::full(self.width, self.height) {
            self.bands.clone()
        } else {
            self.bands
                .iter()
                .map(|band| band.crop(self.width, window))
                .collect()
        };

        let samples = if options.interleave {
            DecodedSamples::Interleaved(SampleBuffer::interleave(&bands)?)
        } else {
            DecodedSamples::Planar(bands)
        };

        Ok(DecodedRaster {
            samples,
            width: window.width(),
            height: window.height(),
        })
    }
}

impl PyramidPlane for Arc<MemoryPlane> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn tile_size(&self) -> u32 {
        self.tile_size
    }

    fn bits_per_sample(&self) -> u16 {
        (self.kind().byte_width() * 8) as u16
    }

    fn sample_format(&self) -> SampleFormat {
        match self.kind() {
            SampleKind::Float32 => SampleFormat::Float,
            kind if kind.is_signed_integer() => SampleFormat::Signed,
            _ => SampleFormat::Unsigned,
        }
    }
}

// =============================================================================
// MemoryPlanes
// =============================================================================

/// Planes keyed by the selection that identifies them.
#[derive(Debug, Clone, Default)]
pub struct MemoryPlanes {
    planes: HashMap<Selection, Arc<MemoryPlane>>,
}

impl MemoryPlanes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, selection: Selection, plane: MemoryPlane) {
        self.planes.insert(selection, Arc::new(plane));
    }

    /// Builder form of [`MemoryPlanes::insert`].
    pub fn with_plane(mut self, selection: Selection, plane: MemoryPlane) -> Self {
        self.insert(selection, plane);
        self
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }
}

#[async_trait]
impl Indexer for MemoryPlanes {
    type Plane = Arc<MemoryPlane>;

    async fn index(&self, selection: &Selection) -> Result<Self::Plane, PixelSourceError> {
        self.planes
            .get(selection)
            .cloned()
            .ok_or_else(|| PixelSourceError::NotFound(selection.to_string()))
    }
}

/// Decode capability for [`MemoryPlane`] handles.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryDecoder;

#[async_trait]
impl PlaneDecoder for MemoryDecoder {
    type Plane = Arc<MemoryPlane>;

    async fn decode(
        &self,
        plane: &Self::Plane,
        options: DecodeOptions,
    ) -> Result<DecodedRaster, DecodeError> {
        plane.decode(options)
    }
}

// =============================================================================
// Tests
// =============================================================================
