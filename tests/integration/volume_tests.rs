//! Volume assembly integration tests.
//!
//! Tests verify:
//! - Downsampled depth and reversed slice placement
//! - Slice decodes are in flight together
//! - Negative samples are clamped to zero
//! - Progress increments sum to one
//! - Any slice failure discards the whole volume

use pixel_pyramid::source::{MemoryDecoder, MemoryPlane};
use pixel_pyramid::{
    DecodeError, Dtype, PixelData, PixelSource, PixelSourceError, SampleBuffer, Selection,
    TiledPixelSource,
};

use std::time::Duration;

use super::test_utils::{
    constant_stack, int16_fill, BarrierDecoder, CountingDecoder, FailingDecoder, ProgressLog,
};

const WIDTH: u32 = 6;
const HEIGHT: u32 = 4;
const PLANE: usize = (WIDTH * HEIGHT) as usize;

fn zyx(depth: usize) -> Vec<usize> {
    vec![depth, HEIGHT as usize, WIDTH as usize]
}

#[tokio::test]
async fn test_reverse_order_downsampled() {
    let decoder = CountingDecoder::new();
    let planes = constant_stack(10, WIDTH, HEIGHT, |z| SampleBuffer::Uint16(vec![z as u16; PLANE]));
    let source =
        TiledPixelSource::new(planes, decoder.clone(), Dtype::Uint16, 4, zyx(10), ["z", "y", "x"])
            .unwrap();
    let progress = ProgressLog::new();

    let volume = source
        .get_volume(&Selection::from([("z", 0)]), &|p: f64| progress.record(p), 2)
        .await
        .unwrap();

    assert_eq!(volume.depth, 5);
    assert_eq!((volume.width, volume.height), (WIDTH, HEIGHT));
    assert_eq!(volume.data.len(), PLANE * 5);
    assert_eq!(decoder.call_count(), 5);

    // Destination slice k holds source slice (5 - 1 - k) * 2
    let values = match volume.data {
        PixelData::Uint16(values) => values,
        other => panic!("Expected Uint16 volume, got {:?}", other.dtype()),
    };
    let firsts: Vec<u16> = values.chunks(PLANE).map(|slice| slice[0]).collect();
    assert_eq!(firsts, vec![8, 6, 4, 2, 0]);
    assert!(values[..PLANE].iter().all(|&v| v == 8));
    assert!(values[4 * PLANE..].iter().all(|&v| v == 0));

    // Volumes decode whole slices
    assert!(decoder.windows().iter().all(Option::is_none));
}

#[tokio::test]
async fn test_slice_decodes_overlap() {
    // Five kept slices, each decode blocked until all five have started
    let planes = constant_stack(10, WIDTH, HEIGHT, |z| SampleBuffer::Uint8(vec![z as u8; PLANE]));
    let source = TiledPixelSource::new(
        planes,
        BarrierDecoder::new(5),
        Dtype::Uint8,
        4,
        zyx(10),
        ["z", "y", "x"],
    )
    .unwrap();

    let volume = tokio::time::timeout(
        Duration::from_secs(5),
        source.get_volume(&Selection::from([("z", 0)]), &|_: f64| {}, 2),
    )
    .await
    .expect("volume slices were decoded one at a time")
    .unwrap();

    assert_eq!(volume.depth, 5);
    assert_eq!(volume.data.len(), PLANE * 5);
}

#[tokio::test]
async fn test_progress_sums_to_one() {
    let planes = constant_stack(10, WIDTH, HEIGHT, |_| SampleBuffer::Uint8(vec![1; PLANE]));
    let source =
        TiledPixelSource::new(planes, MemoryDecoder, Dtype::Uint8, 4, zyx(10), ["z", "y", "x"])
            .unwrap();
    let progress = ProgressLog::new();

    source
        .get_volume(&Selection::from([("z", 3)]), &|p: f64| progress.record(p), 2)
        .await
        .unwrap();

    let increments = progress.increments();
    assert_eq!(increments.len(), 10);
    assert!(increments.iter().all(|&p| (p - 0.1).abs() < 1e-12));
    assert!((progress.total() - 1.0).abs() < 1e-9);
}

#[tokio::test]
async fn test_negative_samples_clamped() {
    let planes = constant_stack(3, WIDTH, HEIGHT, |z| int16_fill(if z == 1 { -300 } else { 300 }, PLANE));
    let source =
        TiledPixelSource::new(planes, MemoryDecoder, Dtype::Uint16, 4, zyx(3), ["z", "y", "x"])
            .unwrap();

    let volume = source
        .get_volume(&Selection::from([("z", 0)]), &|_: f64| {}, 1)
        .await
        .unwrap();

    // Reverse order: [z=2, z=1, z=0]
    let mut expected = vec![300u16; PLANE];
    expected.extend(vec![0u16; PLANE]);
    expected.extend(vec![300u16; PLANE]);
    assert_eq!(volume.data, PixelData::Uint16(expected));
}

#[tokio::test]
async fn test_float_volume_clamps_negatives() {
    let planes = constant_stack(2, WIDTH, HEIGHT, |z| {
        SampleBuffer::Float32(vec![if z == 0 { -1.5 } else { 2.5 }; PLANE])
    });
    let source =
        TiledPixelSource::new(planes, MemoryDecoder, Dtype::Float32, 4, zyx(2), ["z", "y", "x"])
            .unwrap();

    let volume = source
        .get_volume(&Selection::from([("z", 0)]), &|_: f64| {}, 1)
        .await
        .unwrap();

    let mut expected = vec![2.5f32; PLANE];
    expected.extend(vec![0.0f32; PLANE]);
    assert_eq!(volume.data, PixelData::Float32(expected));
}

#[tokio::test]
async fn test_depth_smaller_than_factor_is_empty() {
    let planes = constant_stack(3, WIDTH, HEIGHT, |_| SampleBuffer::Uint8(vec![1; PLANE]));
    let source =
        TiledPixelSource::new(planes, MemoryDecoder, Dtype::Uint8, 4, zyx(3), ["z", "y", "x"])
            .unwrap();

    let volume = source
        .get_volume(&Selection::from([("z", 0)]), &|_: f64| {}, 4)
        .await
        .unwrap();
    assert_eq!(volume.depth, 0);
    assert!(volume.data.is_empty());
}

#[tokio::test]
async fn test_zero_factor_rejected() {
    let planes = constant_stack(3, WIDTH, HEIGHT, |_| SampleBuffer::Uint8(vec![1; PLANE]));
    let source =
        TiledPixelSource::new(planes, MemoryDecoder, Dtype::Uint8, 4, zyx(3), ["z", "y", "x"])
            .unwrap();

    let result = source
        .get_volume(&Selection::from([("z", 0)]), &|_: f64| {}, 0)
        .await;
    assert!(matches!(result, Err(PixelSourceError::InvalidSelection { .. })));
}

#[tokio::test]
async fn test_missing_slice_discards_volume() {
    // Slice 4 is absent
    let mut planes = constant_stack(4, WIDTH, HEIGHT, |_| SampleBuffer::Uint8(vec![1; PLANE]));
    planes.insert(
        Selection::from([("z", 5)]),
        MemoryPlane::single(WIDTH, HEIGHT, SampleBuffer::Uint8(vec![2; PLANE]))
            .unwrap(),
    );

    let source =
        TiledPixelSource::new(planes, MemoryDecoder, Dtype::Uint8, 4, zyx(6), ["z", "y", "x"])
            .unwrap();

    let result = source
        .get_volume(&Selection::from([("z", 0)]), &|_: f64| {}, 1)
        .await;
    match result {
        Err(PixelSourceError::NotFound(key)) => assert_eq!(key, "{z=4}"),
        other => panic!("Expected NotFound, got {:?}", other.map(|v| v.depth)),
    }
}

#[tokio::test]
async fn test_decode_failure_propagated() {
    let planes = constant_stack(2, WIDTH, HEIGHT, |_| SampleBuffer::Uint8(vec![1; PLANE]));
    let source =
        TiledPixelSource::new(planes, FailingDecoder, Dtype::Uint8, 4, zyx(2), ["z", "y", "x"])
            .unwrap();

    let result = source
        .get_volume(&Selection::from([("z", 0)]), &|_: f64| {}, 1)
        .await;
    assert!(matches!(
        result,
        Err(PixelSourceError::Decode(DecodeError::Backend(_)))
    ));
}
