//! Sample type registry.
//!
//! Maps a logical sample-type tag to its byte width, maximum intensity and
//! the tokens GPU upload code needs to pick a texture format. The table is
//! static and never mutated.
//!
//! # Texture Formats
//!
//! Every dtype carries two token sets:
//!
//! | Dtype   | Integer textures              | Fallback                     |
//! |---------|-------------------------------|------------------------------|
//! | Uint8   | R8UI / RED_INTEGER / UBYTE    | LUMINANCE / LUMINANCE / FLOAT |
//! | Uint16  | R16UI / RED_INTEGER / USHORT  | LUMINANCE / LUMINANCE / FLOAT |
//! | Uint32  | R32UI / RED_INTEGER / UINT    | LUMINANCE / LUMINANCE / FLOAT |
//! | Float32 | R32F / RED / FLOAT            | LUMINANCE / LUMINANCE / FLOAT |
//!
//! Which set applies is decided by a [`GpuCapabilities`] value handed in by
//! the consumer, never by a process-wide flag.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::PixelSourceError;

// =============================================================================
// Dtype
// =============================================================================

/// Logical sample type of a pixel source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Dtype {
    Uint8,
    Uint16,
    Uint32,
    Float32,
}

impl Dtype {
    /// All registered dtypes, in registry order.
    pub const ALL: [Dtype; 4] = [Dtype::Uint8, Dtype::Uint16, Dtype::Uint32, Dtype::Float32];

    /// The tag used on the wire and in the registry.
    pub const fn tag(self) -> &'static str {
        match self {
            Dtype::Uint8 => "Uint8",
            Dtype::Uint16 => "Uint16",
            Dtype::Uint32 => "Uint32",
            Dtype::Float32 => "Float32",
        }
    }

    /// Registry entry for this dtype.
    pub fn descriptor(self) -> &'static DtypeDescriptor {
        &REGISTRY[self as usize]
    }

    /// Size of one sample in bytes.
    #[inline]
    pub fn byte_width(self) -> usize {
        self.descriptor().byte_width
    }
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Dtype {
    type Err = PixelSourceError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        lookup(tag).map(|descriptor| descriptor.tag)
    }
}

// =============================================================================
// GPU Format Tokens
// =============================================================================

/// Tokens describing one texture upload format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GpuFormat {
    /// Sized internal format (e.g. `R16UI`)
    pub internal_format: &'static str,

    /// Pixel data format (e.g. `RED_INTEGER`)
    pub data_format: &'static str,

    /// Pixel data type (e.g. `UNSIGNED_SHORT`)
    pub data_type: &'static str,

    /// Shader sampler type for 2D textures
    pub sampler: &'static str,
}

/// Token sets for integer-capable contexts and the float fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GpuFormatTokens {
    pub integer: GpuFormat,
    pub fallback: GpuFormat,
}

/// What the consuming graphics context can upload.
///
/// Constructed by the rendering side and passed explicitly to
/// [`DtypeDescriptor::texture_format`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GpuCapabilities {
    /// Context supports integer textures and integer samplers
    pub integer_textures: bool,
}

impl GpuCapabilities {
    /// A context with integer texture support.
    pub const fn integer() -> Self {
        Self {
            integer_textures: true,
        }
    }

    /// A context limited to float luminance textures.
    pub const fn float_only() -> Self {
        Self {
            integer_textures: false,
        }
    }
}

const FLOAT_FALLBACK: GpuFormat = GpuFormat {
    internal_format: "LUMINANCE",
    data_format: "LUMINANCE",
    data_type: "FLOAT",
    sampler: "sampler2D",
};

// =============================================================================
// Registry
// =============================================================================

/// Immutable description of one registered dtype.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DtypeDescriptor {
    pub tag: Dtype,

    /// Bytes per sample
    pub byte_width: usize,

    /// Largest representable intensity
    pub max_intensity: f64,

    pub gpu_formats: GpuFormatTokens,
}

impl DtypeDescriptor {
    /// Pick the upload format for the given context.
    pub fn texture_format(&self, capabilities: &GpuCapabilities) -> &GpuFormat {
        if capabilities.integer_textures {
            &self.gpu_formats.integer
        } else {
            &self.gpu_formats.fallback
        }
    }
}

/// Indexed by `Dtype as usize`.
static REGISTRY: [DtypeDescriptor; 4] = [
    DtypeDescriptor {
        tag: Dtype::Uint8,
        byte_width: 1,
        max_intensity: u8::MAX as f64,
        gpu_formats: GpuFormatTokens {
            integer: GpuFormat {
                internal_format: "R8UI",
                data_format: "RED_INTEGER",
                data_type: "UNSIGNED_BYTE",
                sampler: "usampler2D",
            },
            fallback: FLOAT_FALLBACK,
        },
    },
    DtypeDescriptor {
        tag: Dtype::Uint16,
        byte_width: 2,
        max_intensity: u16::MAX as f64,
        gpu_formats: GpuFormatTokens {
            integer: GpuFormat {
                internal_format: "R16UI",
                data_format: "RED_INTEGER",
                data_type: "UNSIGNED_SHORT",
                sampler: "usampler2D",
            },
            fallback: FLOAT_FALLBACK,
        },
    },
    DtypeDescriptor {
        tag: Dtype::Uint32,
        byte_width: 4,
        max_intensity: u32::MAX as f64,
        gpu_formats: GpuFormatTokens {
            integer: GpuFormat {
                internal_format: "R32UI",
                data_format: "RED_INTEGER",
                data_type: "UNSIGNED_INT",
                sampler: "usampler2D",
            },
            fallback: FLOAT_FALLBACK,
        },
    },
    DtypeDescriptor {
        tag: Dtype::Float32,
        byte_width: 4,
        max_intensity: f32::MAX as f64,
        gpu_formats: GpuFormatTokens {
            integer: GpuFormat {
                internal_format: "R32F",
                data_format: "RED",
                data_type: "FLOAT",
                sampler: "sampler2D",
            },
            fallback: FLOAT_FALLBACK,
        },
    },
];

/// Look up a dtype by tag.
///
/// Unknown tags fail with [`PixelSourceError::UnsupportedDtype`]; there is no
/// default entry.
pub fn lookup(tag: &str) -> Result<&'static DtypeDescriptor, PixelSourceError> {
    REGISTRY
        .iter()
        .find(|descriptor| descriptor.tag.tag() == tag)
        .ok_or_else(|| PixelSourceError::UnsupportedDtype(tag.to_string()))
}

/// All registry entries.
pub fn registry() -> &'static [DtypeDescriptor] {
    &REGISTRY
}

// =============================================================================
// Tests
// =============================================================================
