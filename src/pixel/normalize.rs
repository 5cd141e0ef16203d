//! Normalization of decoded samples into GPU-safe buffers.
//!
//! Decode libraries return whatever element representation the file
//! declares. Upload code only accepts the registered dtypes, so two rules
//! run right after decode:
//!
//! 1. A `Float32` source reinterprets the raw bytes as `f32`, whatever kind
//!    the decoder reported. Byte length is preserved.
//! 2. Signed integer samples under their unsigned counterpart dtype are
//!    reinterpreted bit-for-bit as unsigned of the same width.
//!
//! Both are bit-pattern reinterpretations. Volume assembly instead clamps
//! negative values to zero through [`VolumeSample`], since it writes into a
//! destination it owns.

use bytemuck::allocation::cast_vec;

use crate::dtype::Dtype;
use crate::error::DecodeError;

use super::data::{collect_pod, PixelData, SampleBuffer};

/// Turn decoded samples into a buffer of the source's logical dtype.
pub fn normalize(dtype: Dtype, samples: SampleBuffer) -> Result<PixelData, DecodeError> {
    if dtype == Dtype::Float32 {
        return Ok(PixelData::Float32(reinterpret_f32(samples)?));
    }

    let kind = samples.kind();
    let unsupported = DecodeError::UnsupportedConversion { dtype, kind };
    if kind.unsigned_counterpart() != Some(dtype) {
        return Err(unsupported);
    }

    // Widths agree from here on; signed kinds keep their bit pattern
    match samples {
        SampleBuffer::Uint8(v) => Ok(PixelData::Uint8(v)),
        SampleBuffer::Int8(v) => Ok(PixelData::Uint8(cast_vec(v))),
        SampleBuffer::Uint16(v) => Ok(PixelData::Uint16(v)),
        SampleBuffer::Int16(v) => Ok(PixelData::Uint16(cast_vec(v))),
        SampleBuffer::Uint32(v) => Ok(PixelData::Uint32(v)),
        SampleBuffer::Int32(v) => Ok(PixelData::Uint32(cast_vec(v))),
        SampleBuffer::Float32(_) => Err(unsupported),
    }
}

/// View the buffer's bytes as `f32`.
fn reinterpret_f32(samples: SampleBuffer) -> Result<Vec<f32>, DecodeError> {
    match samples {
        SampleBuffer::Float32(v) => Ok(v),
        SampleBuffer::Uint32(v) => Ok(cast_vec(v)),
        SampleBuffer::Int32(v) => Ok(cast_vec(v)),
        other => collect_pod(other.as_bytes()),
    }
}

// =============================================================================
// Volume Samples
// =============================================================================

/// Destination element types for volume assembly.
pub trait VolumeSample: bytemuck::Pod + Send + Sync {
    const DTYPE: Dtype;

    /// Write `samples` into `out`, clamping negative values to zero.
    fn write_clamped(samples: &SampleBuffer, out: &mut [Self]) -> Result<(), DecodeError>;

    fn into_pixel_data(values: Vec<Self>) -> PixelData;
}

fn check_len(expected: usize, actual: usize) -> Result<(), DecodeError> {
    if expected != actual {
        return Err(DecodeError::SampleCountMismatch { expected, actual });
    }
    Ok(())
}

macro_rules! impl_volume_sample {
    ($t:ty, $dtype:ident, $unsigned:ident, $signed:ident) => {
        impl VolumeSample for $t {
            const DTYPE: Dtype = Dtype::$dtype;

            fn write_clamped(
                samples: &SampleBuffer,
                out: &mut [Self],
            ) -> Result<(), DecodeError> {
                check_len(out.len(), samples.len())?;
                match samples {
                    SampleBuffer::$unsigned(values) => out.copy_from_slice(values),
                    SampleBuffer::$signed(values) => {
                        for (dst, &v) in out.iter_mut().zip(values.iter()) {
                            *dst = v.max(0) as $t;
                        }
                    }
                    other => {
                        return Err(DecodeError::UnsupportedConversion {
                            dtype: Self::DTYPE,
                            kind: other.kind(),
                        })
                    }
                }
                Ok(())
            }

            fn into_pixel_data(values: Vec<Self>) -> PixelData {
                PixelData::$dtype(values)
            }
        }
    };
}

impl_volume_sample!(u8, Uint8, Uint8, Int8);
impl_volume_sample!(u16, Uint16, Uint16, Int16);
impl_volume_sample!(u32, Uint32, Uint32, Int32);

impl VolumeSample for f32 {
    const DTYPE: Dtype = Dtype::Float32;

    fn write_clamped(samples: &SampleBuffer, out: &mut [Self]) -> Result<(), DecodeError> {
        let reinterpreted;
        let values: &[f32] = match samples {
            SampleBuffer::Float32(values) => values,
            other => {
                reinterpreted = reinterpret_f32(other.clone())?;
                &reinterpreted
            }
        };
        check_len(out.len(), values.len())?;
        for (dst, &v) in out.iter_mut().zip(values) {
            // NaN compares false and also lands on zero
            *dst = if v > 0.0 { v } else { 0.0 };
        }
        Ok(())
    }

    fn into_pixel_data(values: Vec<Self>) -> PixelData {
        PixelData::Float32(values)
    }
}

// =============================================================================
// Tests
// =============================================================================
