//! Tiled pixel source.
//!
//! Composes an [`Indexer`] and a [`PlaneDecoder`] into a [`PixelSource`]:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     TiledPixelSource                        │
//! │                                                             │
//! │  get_tile ──► TileGrid::checked_extent ──┐                  │
//! │  get_raster ─────────────────────────────┼──► read_plane    │
//! │                                          │   1. validate    │
//! │  get_volume ──► assemble_volume ─────────┘   2. index       │
//! │                  (per z slice)               3. decode      │
//! │                                              4. normalize   │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::dtype::Dtype;
use crate::error::{DecodeError, PixelSourceError};
use crate::pixel::{normalize, SampleBuffer, VolumeSample};
use crate::tile::{TileGrid, Window};

use super::contract::{
    DecodeOptions, DecodedRaster, DecodedSamples, Indexer, PixelSource, PixelSourceMeta,
    PlaneDecoder, ProgressFn, RasterResult, VolumeResult,
};
use super::selection::{Dimensions, Selection, Z_LABEL};
use super::volume::{assemble_volume, downsampled_depth};

/// Pixel source over one resolution level of a tiled pyramid.
///
/// Construction fixes dtype, tile size, shape and labels; nothing changes
/// afterwards and no results are cached.
///
/// # Example
///
/// ```
/// use pixel_pyramid::pixel::SampleBuffer;
/// use pixel_pyramid::source::{
///     MemoryDecoder, MemoryPlane, MemoryPlanes, PixelSource, Selection, TiledPixelSource,
/// };
/// use pixel_pyramid::Dtype;
/// use tokio_util::sync::CancellationToken;
///
/// #[tokio::main]
/// async fn main() {
///     let plane = MemoryPlane::single(600, 400, SampleBuffer::Uint8(vec![7; 600 * 400])).unwrap();
///     let planes = MemoryPlanes::new().with_plane(Selection::from([("z", 0)]), plane);
///
///     let source = TiledPixelSource::new(
///         planes,
///         MemoryDecoder,
///         Dtype::Uint8,
///         256,
///         vec![1, 400, 600],
///         ["z", "y", "x"],
///     )
///     .unwrap();
///
///     let tile = source
///         .get_tile(2, 1, &Selection::from([("z", 0)]), &CancellationToken::new())
///         .await
///         .unwrap();
///     assert_eq!((tile.width, tile.height), (88, 144));
/// }
/// ```
pub struct TiledPixelSource<I, D> {
    indexer: I,
    decoder: D,
    dtype: Dtype,
    dimensions: Dimensions,
    grid: TileGrid,
    meta: Option<PixelSourceMeta>,
}

impl<I, D> TiledPixelSource<I, D>
where
    I: Indexer,
    D: PlaneDecoder<Plane = I::Plane>,
{
    /// Create a source, validating shape, labels and tile size.
    pub fn new<S: Into<String>>(
        indexer: I,
        decoder: D,
        dtype: Dtype,
        tile_size: u32,
        shape: Vec<usize>,
        labels: impl IntoIterator<Item = S>,
    ) -> Result<Self, PixelSourceError> {
        let dimensions = Dimensions::new(shape, labels)?;
        let grid = TileGrid::new(dimensions.width(), dimensions.height(), tile_size)
            .ok_or_else(|| PixelSourceError::invalid_shape("tile size must be positive"))?;

        Ok(Self {
            indexer,
            decoder,
            dtype,
            dimensions,
            grid,
            meta: None,
        })
    }

    /// Attach dataset metadata.
    pub fn with_meta(mut self, meta: PixelSourceMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    /// Tile layout of this level.
    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    /// Resolve, decode and normalize one plane (or window of it).
    async fn read_plane(
        &self,
        selection: &Selection,
        window: Option<Window>,
    ) -> Result<RasterResult, PixelSourceError> {
        let plane = self.indexer.index(selection).await?;
        let options = DecodeOptions {
            window,
            interleave: self.dimensions.is_interleaved(),
        };
        let decoded = self.decoder.decode(&plane, options).await?;
        self.finish(decoded)
    }

    fn finish(&self, decoded: DecodedRaster) -> Result<RasterResult, PixelSourceError> {
        let DecodedRaster {
            samples,
            width,
            height,
        } = decoded;

        // Interleaved sources always deliver every band, whatever layout
        // the decoder chose
        let samples = match samples {
            DecodedSamples::Interleaved(buffer) => buffer,
            DecodedSamples::Planar(bands) if self.dimensions.is_interleaved() => {
                SampleBuffer::interleave(&bands)?
            }
            DecodedSamples::Planar(bands) => first_band(bands)?,
        };

        let data = normalize(self.dtype, samples)?;
        let expected = width as usize * height as usize * self.dimensions.bands();
        if data.len() != expected {
            return Err(DecodeError::SampleCountMismatch {
                expected,
                actual: data.len(),
            }
            .into());
        }

        Ok(RasterResult {
            data,
            width,
            height,
        })
    }

    /// Decode one full z slice as raw samples for volume assembly.
    async fn read_slice(&self, selection: Selection) -> Result<SampleBuffer, PixelSourceError> {
        let plane = self.indexer.index(&selection).await?;
        let decoded = self
            .decoder
            .decode(&plane, DecodeOptions::default())
            .await?;

        match decoded.samples {
            DecodedSamples::Planar(bands) => first_band(bands),
            DecodedSamples::Interleaved(buffer) => Ok(buffer),
        }
    }

    async fn assemble<T: VolumeSample>(
        &self,
        selection: &Selection,
        depth: usize,
        downsample: usize,
        on_progress: &ProgressFn<'_>,
    ) -> Result<Vec<T>, PixelSourceError> {
        let plane_len = self.dimensions.width() as usize * self.dimensions.height() as usize;
        assemble_volume::<T, _, _>(depth, downsample, plane_len, on_progress, |z| {
            self.read_slice(selection.clone().with(Z_LABEL, z))
        })
        .await
    }
}

fn first_band(bands: Vec<SampleBuffer>) -> Result<SampleBuffer, PixelSourceError> {
    bands
        .into_iter()
        .next()
        .ok_or(PixelSourceError::Decode(DecodeError::MissingBand))
}

#[async_trait]
impl<I, D> PixelSource for TiledPixelSource<I, D>
where
    I: Indexer,
    D: PlaneDecoder<Plane = I::Plane>,
{
    fn dtype(&self) -> Dtype {
        self.dtype
    }

    fn tile_size(&self) -> u32 {
        self.grid.tile_size
    }

    fn dimensions(&self) -> &Dimensions {
        &self.dimensions
    }

    fn meta(&self) -> Option<&PixelSourceMeta> {
        self.meta.as_ref()
    }

    async fn get_raster(&self, selection: &Selection) -> Result<RasterResult, PixelSourceError> {
        self.dimensions.validate(selection)?;
        debug!(%selection, "raster request");
        self.read_plane(selection, None).await
    }

    async fn get_tile(
        &self,
        x: u32,
        y: u32,
        selection: &Selection,
        cancel: &CancellationToken,
    ) -> Result<RasterResult, PixelSourceError> {
        self.dimensions.validate(selection)?;
        if cancel.is_cancelled() {
            return Err(PixelSourceError::Cancelled);
        }

        let extent = self
            .grid
            .checked_extent(x, y)
            .ok_or_else(|| PixelSourceError::tile_out_of_range(x, y, &self.grid))?;
        let window = extent
            .window()
            .ok_or_else(|| PixelSourceError::tile_out_of_range(x, y, &self.grid))?;
        debug!(
            x,
            y,
            width = extent.width,
            height = extent.height,
            %selection,
            "tile request"
        );

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PixelSourceError::Cancelled),
            result = self.read_plane(selection, Some(window)) => result,
        };

        // A decode that raced the signal is discarded
        if cancel.is_cancelled() {
            return Err(PixelSourceError::Cancelled);
        }
        result
    }

    async fn get_volume(
        &self,
        selection: &Selection,
        on_progress: &ProgressFn<'_>,
        downsample: usize,
    ) -> Result<VolumeResult, PixelSourceError> {
        self.dimensions.validate(selection)?;
        let depth = self
            .dimensions
            .extent_of(Z_LABEL)
            .ok_or_else(|| PixelSourceError::invalid_selection("source has no z axis"))?;
        if downsample == 0 {
            return Err(PixelSourceError::invalid_selection(
                "downsample factor must be at least 1",
            ));
        }

        debug!(%selection, depth, downsample, "volume request");

        let data = match self.dtype {
            Dtype::Uint8 => u8::into_pixel_data(
                self.assemble(selection, depth, downsample, on_progress)
                    .await?,
            ),
            Dtype::Uint16 => u16::into_pixel_data(
                self.assemble(selection, depth, downsample, on_progress)
                    .await?,
            ),
            Dtype::Uint32 => u32::into_pixel_data(
                self.assemble(selection, depth, downsample, on_progress)
                    .await?,
            ),
            Dtype::Float32 => f32::into_pixel_data(
                self.assemble(selection, depth, downsample, on_progress)
                    .await?,
            ),
        };

        Ok(VolumeResult {
            data,
            width: self.dimensions.width(),
            height: self.dimensions.height(),
            depth: downsampled_depth(depth, downsample),
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
