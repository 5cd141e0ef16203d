//! Command-line configuration for the `pixel-pyramid` tool.
//!
//! Every option can also be set through an environment variable with the
//! `PIXEL_` prefix:
//!
//! - `PIXEL_FORMAT` - Output format, `text` or `json` (default: text)
//! - `PIXEL_WIDTH` / `PIXEL_HEIGHT` - Plane size in pixels
//! - `PIXEL_TILE_SIZE` - Tile edge length (default: 512)
//! - `PIXEL_DEPTH` - Number of z slices in the synthetic stack (default: 10)
//! - `PIXEL_DOWNSAMPLE` - Volume downsample factor (default: 1)
//! - `PIXEL_DTYPE` - Sample type tag (default: Uint16)
//!
//! # Example
//!
//! ```ignore
//! use clap::Parser;
//! use pixel_pyramid::config::{Cli, Command};
//!
//! let cli = Cli::parse();
//! match cli.command {
//!     Command::Tiles(config) => println!("{} tiles", config.tile_count()),
//!     _ => {}
//! }
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::dtype::Dtype;

// =============================================================================
// Default Values
// =============================================================================

/// Default tile edge length.
pub const DEFAULT_TILE_SIZE: u32 = 512;

/// Default plane edge length for synthetic stacks.
pub const DEFAULT_PLANE_SIZE: u32 = 256;

/// Default number of z slices for synthetic stacks.
pub const DEFAULT_DEPTH: usize = 10;

/// Largest synthetic volume the CLI will allocate, in samples.
pub const MAX_VOLUME_SAMPLES: usize = 1 << 28;

// =============================================================================
// CLI Arguments
// =============================================================================

/// Pixel Pyramid - inspect tile layouts and exercise pixel sources.
#[derive(Parser, Debug, Clone)]
#[command(name = "pixel-pyramid")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging (debug level).
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Output format.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text, env = "PIXEL_FORMAT")]
    pub format: OutputFormat,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List the supported sample types and their GPU texture formats.
    Dtypes,

    /// Print the tile grid of a plane with true per-tile extents.
    Tiles(TilesConfig),

    /// Assemble a volume from a synthetic in-memory z-stack.
    Volume(VolumeConfig),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

// =============================================================================
// Tiles
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct TilesConfig {
    /// Plane width in pixels.
    #[arg(long, env = "PIXEL_WIDTH")]
    pub width: u32,

    /// Plane height in pixels.
    #[arg(long, env = "PIXEL_HEIGHT")]
    pub height: u32,

    /// Tile edge length in pixels.
    #[arg(long, default_value_t = DEFAULT_TILE_SIZE, env = "PIXEL_TILE_SIZE")]
    pub tile_size: u32,
}

impl TilesConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("width and height must be greater than 0".to_string());
        }
        if self.tile_size == 0 {
            return Err("tile_size must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn tile_count(&self) -> u64 {
        let across = u64::from(self.width.div_ceil(self.tile_size.max(1)));
        let down = u64::from(self.height.div_ceil(self.tile_size.max(1)));
        across * down
    }
}

// =============================================================================
// Volume
// =============================================================================

#[derive(Args, Debug, Clone)]
pub struct VolumeConfig {
    /// Number of z slices in the synthetic stack.
    #[arg(long, default_value_t = DEFAULT_DEPTH, env = "PIXEL_DEPTH")]
    pub depth: usize,

    /// Plane width in pixels.
    #[arg(long, default_value_t = DEFAULT_PLANE_SIZE, env = "PIXEL_WIDTH")]
    pub width: u32,

    /// Plane height in pixels.
    #[arg(long, default_value_t = DEFAULT_PLANE_SIZE, env = "PIXEL_HEIGHT")]
    pub height: u32,

    /// Keep every n-th slice.
    #[arg(long, default_value_t = 1, env = "PIXEL_DOWNSAMPLE")]
    pub downsample: usize,

    /// Sample type of the stack (Uint8, Uint16, Uint32, Float32).
    #[arg(long, default_value_t = Dtype::Uint16, env = "PIXEL_DTYPE")]
    pub dtype: Dtype,
}

impl VolumeConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.depth == 0 {
            return Err("depth must be greater than 0".to_string());
        }
        if self.width == 0 || self.height == 0 {
            return Err("width and height must be greater than 0".to_string());
        }
        if self.downsample == 0 {
            return Err("downsample must be at least 1".to_string());
        }

        let samples = (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|plane| plane.checked_mul(self.depth));
        match samples {
            Some(samples) if samples <= MAX_VOLUME_SAMPLES => Ok(()),
            _ => Err(format!(
                "volume of {}x{}x{} exceeds {} samples",
                self.width, self.height, self.depth, MAX_VOLUME_SAMPLES
            )),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
