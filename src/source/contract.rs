//! Pixel source contract and the capabilities it consumes.
//!
//! ```text
//! caller ──► PixelSource::get_tile / get_raster / get_volume
//!                 │
//!                 ▼
//!            Indexer::index(selection) ──► plane handle
//!                 │
//!                 ▼
//!            PlaneDecoder::decode(plane, window, interleave) ──► SampleBuffer
//!                 │
//!                 ▼
//!            normalize(dtype, samples) ──► PixelData
//! ```

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::dtype::Dtype;
use crate::error::{DecodeError, PixelSourceError};
use crate::pixel::{PixelData, SampleBuffer};
use crate::tile::Window;

use super::selection::{Dimensions, Selection};

// =============================================================================
// Consumed Capabilities
// =============================================================================

/// Resolves a selection to an opaque plane handle.
#[async_trait]
pub trait Indexer: Send + Sync {
    type Plane: Send + Sync;

    /// Fails with [`PixelSourceError::NotFound`] when nothing matches.
    async fn index(&self, selection: &Selection) -> Result<Self::Plane, PixelSourceError>;
}

/// Options for one decode call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Sub-window to decode; `None` decodes the whole plane
    pub window: Option<Window>,

    /// Return one pixel-major buffer instead of one buffer per band
    pub interleave: bool,
}

/// Sample layout returned by a decode.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedSamples {
    /// One buffer, samples of a pixel stored contiguously
    Interleaved(SampleBuffer),

    /// One buffer per band
    Planar(Vec<SampleBuffer>),
}

/// Output of a decode capability.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedRaster {
    pub samples: DecodedSamples,
    pub width: u32,
    pub height: u32,
}

/// Turns a plane handle into samples. Handles are never mutated.
#[async_trait]
pub trait PlaneDecoder: Send + Sync {
    type Plane: Send + Sync;

    async fn decode(
        &self,
        plane: &Self::Plane,
        options: DecodeOptions,
    ) -> Result<DecodedRaster, DecodeError>;
}

// =============================================================================
// Results
// =============================================================================

/// A 2D raster. `data.len() == width * height * bands`.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterResult {
    pub data: PixelData,
    pub width: u32,
    pub height: u32,
}

/// A z-stack assembled into one buffer. `data.len() == width * height * depth`.
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeResult {
    pub data: PixelData,
    pub width: u32,
    pub height: u32,
    pub depth: usize,
}

/// Physical size of one pixel along an axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicalSize {
    pub size: f64,
    pub unit: String,
}

/// Optional dataset metadata carried alongside a source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PixelSourceMeta {
    /// Keyed by axis label (`x`, `y`, `z`)
    #[serde(default)]
    pub physical_sizes: BTreeMap<String, PhysicalSize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photometric_interpretation: Option<String>,

    /// Format-specific metadata passed through untouched
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub extra: serde_json::Value,
}

/// Progress sink for volume assembly; receives increments summing to 1.
pub type ProgressFn<'a> = dyn Fn(f64) + Send + Sync + 'a;

// =============================================================================
// PixelSource Trait
// =============================================================================

/// Uniform access to the planes of one pyramid level.
///
/// Every call returns freshly allocated buffers; implementations hold no
/// mutable state.
#[async_trait]
pub trait PixelSource: Send + Sync {
    fn dtype(&self) -> Dtype;

    /// Edge length of a full tile in pixels.
    fn tile_size(&self) -> u32;

    fn dimensions(&self) -> &Dimensions;

    fn meta(&self) -> Option<&PixelSourceMeta> {
        None
    }

    fn shape(&self) -> &[usize] {
        self.dimensions().shape()
    }

    fn labels(&self) -> &[String] {
        self.dimensions().labels()
    }

    fn width(&self) -> u32 {
        self.dimensions().width()
    }

    fn height(&self) -> u32 {
        self.dimensions().height()
    }

    /// Decode the whole plane identified by `selection`.
    async fn get_raster(&self, selection: &Selection) -> Result<RasterResult, PixelSourceError>;

    /// Decode tile `(x, y)`; smaller than a full tile at the level edges.
    ///
    /// Yields [`PixelSourceError::Cancelled`] if `cancel` fires before the
    /// decode completes.
    async fn get_tile(
        &self,
        x: u32,
        y: u32,
        selection: &Selection,
        cancel: &CancellationToken,
    ) -> Result<RasterResult, PixelSourceError>;

    /// Assemble every `downsample`-th z slice into one volume buffer.
    async fn get_volume(
        &self,
        selection: &Selection,
        on_progress: &ProgressFn<'_>,
        downsample: usize,
    ) -> Result<VolumeResult, PixelSourceError>;
}
