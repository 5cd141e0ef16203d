//! Test utilities for integration tests.
//!
//! Synthetic plane stacks plus decoders that count, record or hold their
//! calls, so tests can observe I/O patterns, require overlapping decodes and
//! force cancellation while a decode is in flight.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Barrier, Notify};

use pixel_pyramid::source::{
    DecodeOptions, DecodedRaster, MemoryDecoder, MemoryPlane, MemoryPlanes, PlaneDecoder,
};
use pixel_pyramid::{DecodeError, SampleBuffer, Selection, Window};

// =============================================================================
// Synthetic Stacks
// =============================================================================

/// A z-stack where every sample of slice `z` equals `value(z)`.
pub fn constant_stack(
    depth: usize,
    width: u32,
    height: u32,
    value: impl Fn(usize) -> SampleBuffer,
) -> MemoryPlanes {
    let mut planes = MemoryPlanes::new();
    for z in 0..depth {
        let samples = value(z);
        let plane = MemoryPlane::single(width, height, samples).unwrap();
        planes.insert(Selection::from([("z", z)]), plane);
    }
    planes
}

/// `len` copies of `value` as 16-bit signed samples.
pub fn int16_fill(value: i16, len: usize) -> SampleBuffer {
    SampleBuffer::Int16(vec![value; len])
}

/// A single-band u16 ramp `0, 1, 2, ...` in row-major order.
pub fn ramp_plane(width: u32, height: u32) -> MemoryPlane {
    let values = (0..width * height).map(|v| (v % 65_536) as u16).collect();
    MemoryPlane::single(width, height, SampleBuffer::Uint16(values)).unwrap()
}

// =============================================================================
// Counting Decoder
// =============================================================================

/// Decoder that counts calls and records requested windows.
#[derive(Clone, Default)]
pub struct CountingDecoder {
    calls: Arc<AtomicUsize>,
    windows: Arc<Mutex<Vec<Option<Window>>>>,
}

impl CountingDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn windows(&self) -> Vec<Option<Window>> {
        self.windows.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaneDecoder for CountingDecoder {
    type Plane = Arc<MemoryPlane>;

    async fn decode(
        &self,
        plane: &Self::Plane,
        options: DecodeOptions,
    ) -> Result<DecodedRaster, DecodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.windows.lock().unwrap().push(options.window);
        MemoryDecoder.decode(plane, options).await
    }
}

// =============================================================================
// Gated Decoder
// =============================================================================

/// Decoder that signals when a decode starts and then waits to be released.
#[derive(Clone, Default)]
pub struct GatedDecoder {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

impl GatedDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves once a decode is in flight.
    pub async fn wait_started(&self) {
        self.started.notified().await;
    }

    /// Let one pending (or the next) decode finish.
    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl PlaneDecoder for GatedDecoder {
    type Plane = Arc<MemoryPlane>;

    async fn decode(
        &self,
        plane: &Self::Plane,
        options: DecodeOptions,
    ) -> Result<DecodedRaster, DecodeError> {
        self.started.notify_one();
        self.release.notified().await;
        MemoryDecoder.decode(plane, options).await
    }
}

// =============================================================================
// Barrier Decoder
// =============================================================================

/// Decoder whose calls only finish once `parties` of them are in flight.
///
/// Awaiting decodes one after another never gets past the first call.
#[derive(Clone)]
pub struct BarrierDecoder {
    barrier: Arc<Barrier>,
}

impl BarrierDecoder {
    pub fn new(parties: usize) -> Self {
        Self {
            barrier: Arc::new(Barrier::new(parties)),
        }
    }
}

#[async_trait]
impl PlaneDecoder for BarrierDecoder {
    type Plane = Arc<MemoryPlane>;

    async fn decode(
        &self,
        plane: &Self::Plane,
        options: DecodeOptions,
    ) -> Result<DecodedRaster, DecodeError> {
        self.barrier.wait().await;
        MemoryDecoder.decode(plane, options).await
    }
}

// =============================================================================
// Failing Decoder
// =============================================================================

/// Decoder that fails every call with a backend error.
#[derive(Clone, Copy, Default)]
pub struct FailingDecoder;

#[async_trait]
impl PlaneDecoder for FailingDecoder {
    type Plane = Arc<MemoryPlane>;

    async fn decode(
        &self,
        _plane: &Self::Plane,
        _options: DecodeOptions,
    ) -> Result<DecodedRaster, DecodeError> {
        Err(DecodeError::Backend("corrupt tile".to_string()))
    }
}

/// Sum of progress increments, shared with the callback.
#[derive(Clone, Default)]
pub struct ProgressLog {
    increments: Arc<Mutex<Vec<f64>>>,
}

impl ProgressLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, increment: f64) {
        self.increments.lock().unwrap().push(increment);
    }

    pub fn increments(&self) -> Vec<f64> {
        self.increments.lock().unwrap().clone()
    }

    pub fn total(&self) -> f64 {
        self.increments().iter().sum()
    }
}
