//! Pixel Pyramid - inspect tile layouts and exercise pixel sources.
//!
//! This binary prints dtype and tile-grid information and runs volume
//! assembly over synthetic in-memory stacks.

use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use clap::Parser;
use serde::Serialize;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pixel_pyramid::{
    channel_stats,
    config::{Cli, Command, OutputFormat, TilesConfig, VolumeConfig, DEFAULT_TILE_SIZE},
    registry, Dtype, GpuCapabilities, MemoryDecoder, MemoryPlane, MemoryPlanes, PixelSource,
    SampleBuffer, Selection, TileExtent, TileGrid, TiledPixelSource,
};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Dtypes => run_dtypes(cli.format),
        Command::Tiles(config) => run_tiles(config, cli.format),
        Command::Volume(config) => run_volume(config, cli.format).await,
    }
}

/// Initialize the tracing/logging subsystem.
fn init_logging(verbose: bool) {
    let env_filter = if verbose {
        "pixel_pyramid=debug"
    } else {
        "pixel_pyramid=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| env_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Print a value as pretty JSON.
fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            ExitCode::FAILURE
        }
    }
}

// =============================================================================
// Dtypes Command
// =============================================================================

fn run_dtypes(format: OutputFormat) -> ExitCode {
    if format == OutputFormat::Json {
        return print_json(&registry());
    }

    let integer = GpuCapabilities::integer();
    let fallback = GpuCapabilities::float_only();

    println!(
        "{:<8} {:>5} {:>14}  {:<28} {}",
        "DTYPE", "BYTES", "MAX", "INTEGER TEXTURE", "FALLBACK"
    );
    for descriptor in registry() {
        let int_format = descriptor.texture_format(&integer);
        let float_format = descriptor.texture_format(&fallback);
        println!(
            "{:<8} {:>5} {:>14.6e}  {:<28} {}",
            descriptor.tag.tag(),
            descriptor.byte_width,
            descriptor.max_intensity,
            format!(
                "{}/{}/{}",
                int_format.internal_format, int_format.data_format, int_format.data_type
            ),
            format!(
                "{}/{}/{}",
                float_format.internal_format, float_format.data_format, float_format.data_type
            ),
        );
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Tiles Command
// =============================================================================

#[derive(Serialize)]
struct TileGridReport {
    width: u32,
    height: u32,
    tile_size: u32,
    tiles_x: u32,
    tiles_y: u32,
    tiles: Vec<TileExtent>,
}

fn run_tiles(config: TilesConfig, format: OutputFormat) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let Some(grid) = TileGrid::new(config.width, config.height, config.tile_size) else {
        error!("Configuration error: tile size must be positive");
        return ExitCode::FAILURE;
    };
    debug!(tiles = config.tile_count(), "computing tile grid");

    if format == OutputFormat::Json {
        return print_json(&TileGridReport {
            width: grid.width,
            height: grid.height,
            tile_size: grid.tile_size,
            tiles_x: grid.tiles_x(),
            tiles_y: grid.tiles_y(),
            tiles: grid.tiles().collect(),
        });
    }

    println!(
        "{}x{} plane, {}px tiles: {} columns x {} rows",
        grid.width,
        grid.height,
        grid.tile_size,
        grid.tiles_x(),
        grid.tiles_y()
    );
    println!();
    for tile in grid.tiles() {
        // Tiles of a validated grid always lie inside the plane
        let Some(window) = tile.window() else {
            continue;
        };
        println!(
            "  ({:>3}, {:>3})  {:>4}x{:<4}  [{}, {}) x [{}, {}){}",
            tile.x,
            tile.y,
            tile.width,
            tile.height,
            window.x0,
            window.x1,
            window.y0,
            window.y1,
            if tile.is_partial() { "  partial" } else { "" }
        );
    }

    ExitCode::SUCCESS
}

// =============================================================================
// Volume Command
// =============================================================================

#[derive(Serialize)]
struct VolumeReport {
    dtype: Dtype,
    width: u32,
    height: u32,
    depth: usize,
    source_depth: usize,
    downsample: usize,
    bytes: usize,
    elapsed_ms: u128,
    stats: Option<pixel_pyramid::ChannelStats>,
}

async fn run_volume(config: VolumeConfig, format: OutputFormat) -> ExitCode {
    if let Err(e) = config.validate() {
        error!("Configuration error: {}", e);
        return ExitCode::FAILURE;
    }

    let mut planes = MemoryPlanes::new();
    for z in 0..config.depth {
        let samples = synthetic_slice(config.dtype, config.width, config.height, z);
        match MemoryPlane::single(config.width, config.height, samples) {
            Ok(plane) => planes.insert(Selection::from([("z", z)]), plane),
            Err(e) => {
                error!("Failed to build slice {}: {}", z, e);
                return ExitCode::FAILURE;
            }
        }
    }

    let source = match TiledPixelSource::new(
        planes,
        MemoryDecoder,
        config.dtype,
        DEFAULT_TILE_SIZE,
        vec![config.depth, config.height as usize, config.width as usize],
        ["z", "y", "x"],
    ) {
        Ok(source) => source,
        Err(e) => {
            error!("Failed to create pixel source: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!(
        "Assembling {}x{}x{} {} volume (downsample {})",
        config.width, config.height, config.depth, config.dtype, config.downsample
    );

    let progress = Mutex::new(0.0_f64);
    let on_progress = |increment: f64| {
        if let Ok(mut total) = progress.lock() {
            *total += increment;
            debug!(progress = *total, "volume progress");
        }
    };

    let started = Instant::now();
    let volume = match source
        .get_volume(&Selection::from([("z", 0)]), &on_progress, config.downsample)
        .await
    {
        Ok(volume) => volume,
        Err(e) => {
            error!("Volume assembly failed: {}", e);
            return ExitCode::FAILURE;
        }
    };
    let elapsed = started.elapsed();
    info!("Volume assembled in {:?}", elapsed);

    let report = VolumeReport {
        dtype: volume.data.dtype(),
        width: volume.width,
        height: volume.height,
        depth: volume.depth,
        source_depth: config.depth,
        downsample: config.downsample,
        bytes: volume.data.byte_len(),
        elapsed_ms: elapsed.as_millis(),
        stats: channel_stats(&volume.data),
    };

    if format == OutputFormat::Json {
        return print_json(&report);
    }

    println!("Volume");
    println!("──────");
    println!("  Dtype:      {}", report.dtype);
    println!(
        "  Size:       {}x{}x{} (from {} slices, every {})",
        report.width, report.height, report.depth, report.source_depth, report.downsample
    );
    println!("  Bytes:      {}", report.bytes);
    println!("  Elapsed:    {} ms", report.elapsed_ms);
    match report.stats {
        Some(stats) => {
            println!(
                "  Domain:     [{}, {}]",
                stats.domain[0], stats.domain[1]
            );
            println!(
                "  Mean/SD:    {:.3} / {:.3}",
                stats.mean, stats.sd
            );
            println!(
                "  Quartiles:  {} / {} / {}",
                stats.q1, stats.median, stats.q3
            );
            println!(
                "  Contrast:   [{}, {}]",
                stats.contrast_limits[0], stats.contrast_limits[1]
            );
        }
        None => println!("  (empty volume)"),
    }

    ExitCode::SUCCESS
}

/// A diagonal ramp offset by slice index.
///
/// Integer dtypes are produced as their signed counterparts with a negative
/// band along the top rows, so assembly has something to clamp.
fn synthetic_slice(dtype: Dtype, width: u32, height: u32, z: usize) -> SampleBuffer {
    let ramp = (0..height).flat_map(move |y| {
        (0..width).map(move |x| {
            let value = i64::from(x) + i64::from(y) + (z as i64) * 16;
            if y < height / 8 {
                -value
            } else {
                value
            }
        })
    });

    match dtype {
        Dtype::Uint8 => SampleBuffer::Int8(ramp.map(|v| (v % 128) as i8).collect()),
        Dtype::Uint16 => SampleBuffer::Int16(ramp.map(|v| (v % 32_768) as i16).collect()),
        Dtype::Uint32 => SampleBuffer::Int32(ramp.map(|v| v as i32).collect()),
        Dtype::Float32 => SampleBuffer::Float32(ramp.map(|v| v as f32 * 0.5).collect()),
    }
}
