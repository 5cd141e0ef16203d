//! Legacy pyramid adapter integration tests.
//!
//! Tests verify:
//! - Viewer metadata comes from the first channel's base plane
//! - Tiles and rasters return one entry per channel
//! - Zoom to level mapping and level bounds
//! - Tile coordinates beyond a level are rejected

use std::sync::Arc;

use pixel_pyramid::source::{MemoryDecoder, MemoryPlane};
use pixel_pyramid::{
    Dtype, LegacyPyramid, PixelData, PixelSourceError, PyramidPlane, SampleBuffer, SampleFormat,
};

/// One channel: levels of size 8, 4 and 2 filled with `base + level`.
fn channel(base: i16) -> Vec<Arc<MemoryPlane>> {
    [8u32, 4, 2]
        .iter()
        .enumerate()
        .map(|(level, &size)| {
            let len = (size * size) as usize;
            let plane = MemoryPlane::single(size, size, SampleBuffer::Int16(vec![base + level as i16; len]))
                .unwrap()
                .with_tile_size(4);
            Arc::new(plane)
        })
        .collect()
}

fn two_channels() -> LegacyPyramid<Arc<MemoryPlane>, MemoryDecoder> {
    LegacyPyramid::new(vec![channel(10), channel(-20)], MemoryDecoder).unwrap()
}

#[test]
fn test_meta_from_first_plane() {
    let pyramid = two_channels();
    let meta = pyramid.meta();

    assert_eq!(meta.min_zoom, -3);
    assert_eq!((meta.width, meta.height), (8, 8));
    assert_eq!(meta.tile_size, 4);
    // 16-bit signed declaration maps to Uint16
    assert_eq!(meta.dtype, Dtype::Uint16);
    assert_eq!(pyramid.channel_count(), 2);
    assert_eq!(pyramid.level_count(), 3);
}

#[test]
fn test_meta_serializes() {
    let pyramid = two_channels();
    let json = serde_json::to_value(pyramid.meta()).unwrap();
    assert_eq!(json["min_zoom"], -3);
    assert_eq!(json["dtype"], "Uint16");
}

#[test]
fn test_level_for_zoom() {
    let pyramid = two_channels();
    assert_eq!(pyramid.level_for_zoom(0).unwrap(), 0);
    assert_eq!(pyramid.level_for_zoom(-2).unwrap(), 2);

    assert!(matches!(
        pyramid.level_for_zoom(-3),
        Err(PixelSourceError::InvalidZoom { zoom: -3, min_zoom: -3 })
    ));
}

#[test]
fn test_positive_zoom_is_not_a_missing_level() {
    let pyramid = two_channels();

    for zoom in [1, i32::MAX] {
        let error = pyramid.level_for_zoom(zoom).unwrap_err();
        assert!(matches!(
            error,
            PixelSourceError::InvalidZoom { min_zoom: -3, .. }
        ));
        assert!(!error.to_string().contains("level"));
    }
    assert!(matches!(
        pyramid.level_for_zoom(i32::MIN),
        Err(PixelSourceError::InvalidZoom { .. })
    ));
}

#[tokio::test]
async fn test_tile_per_channel() {
    let pyramid = two_channels();

    let tiles = pyramid.get_tile(1, 1, 0).await.unwrap();
    assert_eq!(tiles.len(), 2);
    assert_eq!((tiles[0].width, tiles[0].height), (4, 4));
    assert_eq!(tiles[0].data, PixelData::Uint16(vec![10; 16]));

    // -20 reinterpreted as u16
    assert_eq!(tiles[1].data, PixelData::Uint16(vec![(-20i16) as u16; 16]));
}

#[tokio::test]
async fn test_edge_tile_on_small_level() {
    let pyramid = two_channels();

    // Level 2 is 2x2 with 4px tiles: one partial tile
    let tiles = pyramid.get_tile(0, 0, 2).await.unwrap();
    assert_eq!((tiles[0].width, tiles[0].height), (2, 2));
    assert_eq!(tiles[0].data, PixelData::Uint16(vec![12; 4]));
}

#[tokio::test]
async fn test_tile_beyond_level_rejected() {
    let pyramid = two_channels();

    // Level 0 is 8x8 with 4px tiles: columns 0..=2 are addressable
    let result = pyramid.get_tile(10_000_000, 0, 0).await;
    assert!(matches!(
        result,
        Err(PixelSourceError::TileOutOfRange {
            x: 10_000_000,
            last_x: 2,
            ..
        })
    ));

    let result = pyramid.get_tile(0, u32::MAX, 2).await;
    assert!(matches!(result, Err(PixelSourceError::TileOutOfRange { .. })));
}

#[tokio::test]
async fn test_raster_per_channel() {
    let pyramid = two_channels();

    let rasters = pyramid.get_raster(1).await.unwrap();
    assert_eq!(rasters.len(), 2);
    assert!(rasters.iter().all(|r| (r.width, r.height) == (4, 4)));
    assert_eq!(rasters[0].data, PixelData::Uint16(vec![11; 16]));
}

#[tokio::test]
async fn test_missing_level() {
    let pyramid = two_channels();
    let result = pyramid.get_raster(3).await;
    assert!(matches!(result, Err(PixelSourceError::InvalidLevel { .. })));
}

#[test]
fn test_float_pyramid() {
    let plane = Arc::new(MemoryPlane::single(2, 2, SampleBuffer::Float32(vec![0.5; 4])).unwrap());
    assert_eq!(plane.sample_format(), SampleFormat::Float);

    let pyramid = LegacyPyramid::new(vec![vec![plane]], MemoryDecoder).unwrap();
    assert_eq!(pyramid.meta().dtype, Dtype::Float32);
    assert_eq!(pyramid.meta().min_zoom, -1);
}

#[test]
fn test_empty_pyramid_rejected() {
    let result = LegacyPyramid::<Arc<MemoryPlane>, _>::new(vec![], MemoryDecoder);
    assert!(matches!(result, Err(PixelSourceError::InvalidShape { .. })));

    let result = LegacyPyramid::<Arc<MemoryPlane>, _>::new(vec![vec![]], MemoryDecoder);
    assert!(matches!(result, Err(PixelSourceError::InvalidShape { .. })));
}
