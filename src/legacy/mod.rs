//! Legacy per-channel pyramid adapter.
//!
//! Predates [`crate::source::PixelSource`] and is kept for callers that
//! still hand over one ordered pyramid per channel. Behaviour is preserved
//! as-is rather than redesigned:
//!
//! - Each channel is a sequence of plane handles, index 0 = full resolution.
//! - Tiles and rasters are fetched for all channels at one level, one entry
//!   per channel.
//! - Viewer metadata (minimum zoom, base size, tile size, dtype) comes from
//!   the **first channel's full-resolution plane**. The dtype is inferred
//!   from that plane's declared bit depth and sample format; channels that
//!   declare something else are not detected.
//!
//! # Zoom Levels
//!
//! Viewers address levels by non-positive zoom: zoom `0` is level 0, zoom
//! `-1` is level 1, and so on. `min_zoom` is `-level_count`.

use futures::future::try_join_all;
use serde::Serialize;
use tracing::debug;

use crate::dtype::Dtype;
use crate::error::{DecodeError, PixelSourceError};
use crate::pixel::normalize;
use crate::source::{DecodeOptions, DecodedSamples, PlaneDecoder, RasterResult};
use crate::tile::{TileGrid, Window};

// =============================================================================
// Declared Plane Format
// =============================================================================

/// How samples are declared to be interpreted.
///
/// Values follow the TIFF `SampleFormat` tag (339).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u16)]
pub enum SampleFormat {
    Unsigned = 1,
    Signed = 2,
    Float = 3,
    Undefined = 4,
}

impl SampleFormat {
    /// Create a SampleFormat from its numeric tag value.
    ///
    /// Returns `None` for unknown values.
    pub fn from_u16(value: u16) -> Option<Self> {
        match value {
            1 => Some(SampleFormat::Unsigned),
            2 => Some(SampleFormat::Signed),
            3 => Some(SampleFormat::Float),
            4 => Some(SampleFormat::Undefined),
            _ => None,
        }
    }
}

/// A plane handle that declares its own geometry and sample format.
pub trait PyramidPlane: Send + Sync {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    fn tile_size(&self) -> u32;

    /// Declared bits per sample (TIFF tag 258).
    fn bits_per_sample(&self) -> u16;

    /// Declared sample format (TIFF tag 339).
    fn sample_format(&self) -> SampleFormat;
}

/// Map a declared bit depth and sample format to a dtype.
///
/// Signed declarations map to the unsigned dtype of the same width, which is
/// what the decoded samples get reinterpreted as.
pub fn infer_dtype(bits_per_sample: u16, format: SampleFormat) -> Result<Dtype, PixelSourceError> {
    match (bits_per_sample, format) {
        (32, SampleFormat::Float) => Ok(Dtype::Float32),
        (_, SampleFormat::Float) => Err(PixelSourceError::UnsupportedDtype(format!(
            "{}-bit float",
            bits_per_sample
        ))),
        (8, _) => Ok(Dtype::Uint8),
        (16, _) => Ok(Dtype::Uint16),
        (32, _) => Ok(Dtype::Uint32),
        (bits, format) => Err(PixelSourceError::UnsupportedDtype(format!(
            "{}-bit {:?}",
            bits, format
        ))),
    }
}

// =============================================================================
// Viewer Metadata
// =============================================================================

/// Metadata a tiled viewer needs to drive the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LegacyViewerMeta {
    /// `-level_count`
    pub min_zoom: i32,

    /// Full-resolution width of the first channel
    pub width: u32,

    /// Full-resolution height of the first channel
    pub height: u32,

    pub tile_size: u32,

    pub dtype: Dtype,
}

// =============================================================================
// LegacyPyramid
// =============================================================================

/// Per-channel pyramids read level by level.
pub struct LegacyPyramid<P, D> {
    channels: Vec<Vec<P>>,
    decoder: D,
    meta: LegacyViewerMeta,
}

impl<P, D> LegacyPyramid<P, D>
where
    P: PyramidPlane,
    D: PlaneDecoder<Plane = P>,
{
    /// Wrap ordered pyramids, one per channel.
    ///
    /// Fails if there are no channels or the first channel has no levels,
    /// or if the first plane declares an unsupported format.
    pub fn new(channels: Vec<Vec<P>>, decoder: D) -> Result<Self, PixelSourceError> {
        let base = channels
            .first()
            .and_then(|levels| levels.first())
            .ok_or_else(|| PixelSourceError::invalid_shape("pyramid has no channels or levels"))?;

        let meta = LegacyViewerMeta {
            min_zoom: -(channels[0].len() as i32),
            width: base.width(),
            height: base.height(),
            tile_size: base.tile_size(),
            dtype: infer_dtype(base.bits_per_sample(), base.sample_format())?,
        };

        debug!(
            channels = channels.len(),
            levels = channels[0].len(),
            dtype = %meta.dtype,
            "legacy pyramid opened"
        );

        Ok(Self {
            channels,
            decoder,
            meta,
        })
    }

    pub fn meta(&self) -> &LegacyViewerMeta {
        &self.meta
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Number of levels in the first channel.
    pub fn level_count(&self) -> usize {
        self.channels[0].len()
    }

    /// Level index for a viewer zoom in `(min_zoom, 0]`.
    pub fn level_for_zoom(&self, zoom: i32) -> Result<usize, PixelSourceError> {
        let min_zoom = self.meta.min_zoom;
        if zoom > 0 || zoom <= min_zoom {
            return Err(PixelSourceError::InvalidZoom { zoom, min_zoom });
        }
        Ok(zoom.unsigned_abs() as usize)
    }

    /// Tile `(x, y)` of `level` for every channel.
    pub async fn get_tile(
        &self,
        x: u32,
        y: u32,
        level: usize,
    ) -> Result<Vec<RasterResult>, PixelSourceError> {
        let requests = self
            .planes_at(level)?
            .into_iter()
            .map(|plane| {
                let grid = TileGrid::new(plane.width(), plane.height(), plane.tile_size())
                    .ok_or_else(|| {
                        PixelSourceError::invalid_shape("plane declares a zero tile size")
                    })?;
                let window = grid
                    .tile_window(x, y)
                    .ok_or_else(|| PixelSourceError::tile_out_of_range(x, y, &grid))?;
                Ok((plane, window))
            })
            .collect::<Result<Vec<_>, PixelSourceError>>()?;

        try_join_all(
            requests
                .into_iter()
                .map(|(plane, window)| self.read(plane, Some(window))),
        )
        .await
    }

    /// Whole plane at `level` for every channel.
    pub async fn get_raster(&self, level: usize) -> Result<Vec<RasterResult>, PixelSourceError> {
        let tasks = self
            .planes_at(level)?
            .into_iter()
            .map(|plane| self.read(plane, None));
        try_join_all(tasks).await
    }

    fn planes_at(&self, level: usize) -> Result<Vec<&P>, PixelSourceError> {
        self.channels
            .iter()
            .map(|levels| {
                levels.get(level).ok_or(PixelSourceError::InvalidLevel {
                    level,
                    level_count: levels.len(),
                })
            })
            .collect()
    }

    async fn read(&self, plane: &P, window: Option<Window>) -> Result<RasterResult, PixelSourceError> {
        let decoded = self
            .decoder
            .decode(
                plane,
                DecodeOptions {
                    window,
                    interleave: false,
                },
            )
            .await?;

        let samples = match decoded.samples {
            DecodedSamples::Planar(bands) => bands.into_iter().next().ok_or(DecodeError::MissingBand)?,
            DecodedSamples::Interleaved(buffer) => buffer,
        };

        Ok(RasterResult {
            data: normalize(self.meta.dtype, samples)?,
            width: decoded.width,
            height: decoded.height,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
