//! Sample buffers.
//!
//! Two buffer families exist:
//!
//! - [`SampleBuffer`]: what a decode capability hands back. Its variant is an
//!   explicit tag for the decoded element representation, which may be
//!   signed or otherwise unfit for GPU upload.
//! - [`PixelData`]: what a pixel source hands to callers. Its variant is
//!   always one of the registered [`Dtype`]s.
//!
//! Typed buffers are built from raw bytes through explicit per-tag factories
//! ([`SampleBuffer::from_bytes`], [`PixelData::from_bytes`]).

use std::fmt;

use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use crate::dtype::Dtype;
use crate::error::DecodeError;
use crate::tile::Window;

// =============================================================================
// Sample Kind
// =============================================================================

/// Element representation of a decoded buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SampleKind {
    Uint8,
    Int8,
    Uint16,
    Int16,
    Uint32,
    Int32,
    Float32,
}

impl SampleKind {
    /// Size of one element in bytes.
    pub const fn byte_width(self) -> usize {
        match self {
            SampleKind::Uint8 | SampleKind::Int8 => 1,
            SampleKind::Uint16 | SampleKind::Int16 => 2,
            SampleKind::Uint32 | SampleKind::Int32 | SampleKind::Float32 => 4,
        }
    }

    pub const fn is_signed_integer(self) -> bool {
        matches!(self, SampleKind::Int8 | SampleKind::Int16 | SampleKind::Int32)
    }

    /// The registered dtype with the same width and unsigned integer layout.
    pub const fn unsigned_counterpart(self) -> Option<Dtype> {
        match self {
            SampleKind::Uint8 | SampleKind::Int8 => Some(Dtype::Uint8),
            SampleKind::Uint16 | SampleKind::Int16 => Some(Dtype::Uint16),
            SampleKind::Uint32 | SampleKind::Int32 => Some(Dtype::Uint32),
            SampleKind::Float32 => None,
        }
    }
}

impl fmt::Display for SampleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SampleKind::Uint8 => "Uint8",
            SampleKind::Int8 => "Int8",
            SampleKind::Uint16 => "Uint16",
            SampleKind::Int16 => "Int16",
            SampleKind::Uint32 => "Uint32",
            SampleKind::Int32 => "Int32",
            SampleKind::Float32 => "Float32",
        };
        f.write_str(name)
    }
}

// =============================================================================
// Sample Trait
// =============================================================================

/// Element types a [`SampleBuffer`] can hold.
pub trait Sample: Pod + Send + Sync + 'static {
    const KIND: SampleKind;

    /// Borrow the buffer's elements if it holds this type.
    fn view(buffer: &SampleBuffer) -> Option<&[Self]>;

    /// Wrap owned elements in the matching variant.
    fn wrap(values: Vec<Self>) -> SampleBuffer;
}

macro_rules! impl_sample {
    ($t:ty, $variant:ident) => {
        impl Sample for $t {
            const KIND: SampleKind = SampleKind::$variant;

            #[inline]
            fn view(buffer: &SampleBuffer) -> Option<&[Self]> {
                match buffer {
                    SampleBuffer::$variant(values) => Some(values.as_slice()),
                    _ => None,
                }
            }

            #[inline]
            fn wrap(values: Vec<Self>) -> SampleBuffer {
                SampleBuffer::$variant(values)
            }
        }
    };
}

impl_sample!(u8, Uint8);
impl_sample!(i8, Int8);
impl_sample!(u16, Uint16);
impl_sample!(i16, Int16);
impl_sample!(u32, Uint32);
impl_sample!(i32, Int32);
impl_sample!(f32, Float32);

/// Bind `$t` to the element type of `$kind` and evaluate `$body`.
macro_rules! with_sample_type {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            SampleKind::Uint8 => {
                type $t = u8;
                $body
            }
            SampleKind::Int8 => {
                type $t = i8;
                $body
            }
            SampleKind::Uint16 => {
                type $t = u16;
                $body
            }
            SampleKind::Int16 => {
                type $t = i16;
                $body
            }
            SampleKind::Uint32 => {
                type $t = u32;
                $body
            }
            SampleKind::Int32 => {
                type $t = i32;
                $body
            }
            SampleKind::Float32 => {
                type $t = f32;
                $body
            }
        }
    };
}

/// Apply `$body` to the inner vector of every variant, keeping the variant.
macro_rules! map_samples {
    ($buffer:expr, $values:ident => $body:expr) => {
        match $buffer {
            SampleBuffer::Uint8($values) => SampleBuffer::Uint8($body),
            SampleBuffer::Int8($values) => SampleBuffer::Int8($body),
            SampleBuffer::Uint16($values) => SampleBuffer::Uint16($body),
            SampleBuffer::Int16($values) => SampleBuffer::Int16($body),
            SampleBuffer::Uint32($values) => SampleBuffer::Uint32($body),
            SampleBuffer::Int32($values) => SampleBuffer::Int32($body),
            SampleBuffer::Float32($values) => SampleBuffer::Float32($body),
        }
    };
}

/// Evaluate `$body` against the inner vector of any variant.
macro_rules! visit_samples {
    ($buffer:expr, $values:ident => $body:expr) => {
        match $buffer {
            SampleBuffer::Uint8($values) => $body,
            SampleBuffer::Int8($values) => $body,
            SampleBuffer::Uint16($values) => $body,
            SampleBuffer::Int16($values) => $body,
            SampleBuffer::Uint32($values) => $body,
            SampleBuffer::Int32($values) => $body,
            SampleBuffer::Float32($values) => $body,
        }
    };
}

// =============================================================================
// Sample Buffer
// =============================================================================

/// Decoded samples tagged with their element representation.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleBuffer {
    Uint8(Vec<u8>),
    Int8(Vec<i8>),
    Uint16(Vec<u16>),
    Int16(Vec<i16>),
    Uint32(Vec<u32>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
}

impl SampleBuffer {
    pub fn kind(&self) -> SampleKind {
        match self {
            SampleBuffer::Uint8(_) => SampleKind::Uint8,
            SampleBuffer::Int8(_) => SampleKind::Int8,
            SampleBuffer::Uint16(_) => SampleKind::Uint16,
            SampleBuffer::Int16(_) => SampleKind::Int16,
            SampleBuffer::Uint32(_) => SampleKind::Uint32,
            SampleBuffer::Int32(_) => SampleKind::Int32,
            SampleBuffer::Float32(_) => SampleKind::Float32,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        visit_samples!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The raw bytes backing this buffer, in native byte order.
    pub fn as_bytes(&self) -> &[u8] {
        visit_samples!(self, values => bytemuck::cast_slice(values))
    }

    pub fn byte_len(&self) -> usize {
        self.len() * self.kind().byte_width()
    }

    /// Build a buffer of `kind` from native-order bytes.
    pub fn from_bytes(kind: SampleKind, bytes: &[u8]) -> Result<Self, DecodeError> {
        with_sample_type!(kind, T => Ok(T::wrap(collect_pod::<T>(bytes)?)))
    }

    /// A zero-filled buffer of `kind`.
    pub fn zeroed(kind: SampleKind, len: usize) -> Self {
        with_sample_type!(kind, T => T::wrap(vec![T::zeroed(); len]))
    }

    /// Copy the window out of a single-band row-major plane `width` wide.
    ///
    /// The caller guarantees the window lies inside the plane.
    pub fn crop(&self, width: u32, window: Window) -> Self {
        map_samples!(self, values => crop_rows(values, width, window))
    }

    /// Interleave equally sized bands into one pixel-major buffer.
    pub fn interleave(bands: &[SampleBuffer]) -> Result<Self, DecodeError> {
        let first = bands.first().ok_or(DecodeError::MissingBand)?;
        let kind = first.kind();
        let len = first.len();

        with_sample_type!(kind, T => {
            let mut views: Vec<&[T]> = Vec::with_capacity(bands.len());
            for band in bands {
                let view = T::view(band).ok_or(DecodeError::SampleKindMismatch {
                    expected: kind,
                    actual: band.kind(),
                })?;
                if view.len() != len {
                    return Err(DecodeError::SampleCountMismatch {
                        expected: len,
                        actual: view.len(),
                    });
                }
                views.push(view);
            }

            let mut out = Vec::with_capacity(len * views.len());
            for i in 0..len {
                out.extend(views.iter().map(|view| view[i]));
            }
            Ok(T::wrap(out))
        })
    }
}

fn crop_rows<T: Copy>(values: &[T], width: u32, window: Window) -> Vec<T> {
    let width = width as usize;
    let (x0, x1) = (window.x0 as usize, window.x1 as usize);

    let mut out = Vec::with_capacity(window.len());
    for row in window.y0 as usize..window.y1 as usize {
        let start = row * width;
        out.extend_from_slice(&values[start + x0..start + x1]);
    }
    out
}

/// Copy bytes into a freshly aligned vector of `T`.
pub(crate) fn collect_pod<T: Pod>(bytes: &[u8]) -> Result<Vec<T>, DecodeError> {
    let width = std::mem::size_of::<T>();
    if bytes.len() % width != 0 {
        return Err(DecodeError::Misaligned {
            len: bytes.len(),
            width,
        });
    }
    Ok(bytemuck::allocation::pod_collect_to_vec(bytes))
}

// =============================================================================
// Pixel Data
// =============================================================================

/// GPU-safe samples, one variant per registered dtype.
#[derive(Debug, Clone, PartialEq)]
pub enum PixelData {
    Uint8(Vec<u8>),
    Uint16(Vec<u16>),
    Uint32(Vec<u32>),
    Float32(Vec<f32>),
}

macro_rules! visit_pixels {
    ($data:expr, $values:ident => $body:expr) => {
        match $data {
            PixelData::Uint8($values) => $body,
            PixelData::Uint16($values) => $body,
            PixelData::Uint32($values) => $body,
            PixelData::Float32($values) => $body,
        }
    };
}

impl PixelData {
    pub fn dtype(&self) -> Dtype {
        match self {
            PixelData::Uint8(_) => Dtype::Uint8,
            PixelData::Uint16(_) => Dtype::Uint16,
            PixelData::Uint32(_) => Dtype::Uint32,
            PixelData::Float32(_) => Dtype::Float32,
        }
    }

    pub fn len(&self) -> usize {
        visit_pixels!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes ready for texture upload, in native byte order.
    pub fn as_bytes(&self) -> &[u8] {
        visit_pixels!(self, values => bytemuck::cast_slice(values))
    }

    pub fn byte_len(&self) -> usize {
        self.len() * self.dtype().byte_width()
    }

    /// Typed view factory: build `dtype` samples from native-order bytes.
    pub fn from_bytes(dtype: Dtype, bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(match dtype {
            Dtype::Uint8 => PixelData::Uint8(bytes.to_vec()),
            Dtype::Uint16 => PixelData::Uint16(collect_pod(bytes)?),
            Dtype::Uint32 => PixelData::Uint32(collect_pod(bytes)?),
            Dtype::Float32 => PixelData::Float32(collect_pod(bytes)?),
        })
    }

    /// Sample values widened to `f64`, in buffer order.
    pub fn to_f64_vec(&self) -> Vec<f64> {
        visit_pixels!(self, values => values.iter().map(|&v| f64::from(v)).collect())
    }
}

impl From<Vec<u8>> for PixelData {
    fn from(values: Vec<u8>) -> Self {
        PixelData::Uint8(values)
    }
}

impl From<Vec<u16>> for PixelData {
    fn from(values: Vec<u16>) -> Self {
        PixelData::Uint16(values)
    }
}

impl From<Vec<u32>> for PixelData {
    fn from(values: Vec<u32>) -> Self {
        PixelData::Uint32(values)
    }
}

impl From<Vec<f32>> for PixelData {
    fn from(values: Vec<f32>) -> Self {
        PixelData::Float32(values)
    }
}

// =============================================================================
// Tests
// =============================================================================
