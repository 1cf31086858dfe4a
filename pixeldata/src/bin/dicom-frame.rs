//! A CLI tool for extracting a single frame
//! from a raw native pixel data buffer.
use clap::Parser;
use dicom_frame::{BoundsCheck, ExtractOptions, FrameExtractor};
use dicom_frame_core::{tags, InMemDataSet};
use snafu::{Report, ResultExt, Whatever};
use std::path::PathBuf;
use tracing::{info, Level};

/// Exit code for when an error emerged while reading the input file.
const ERROR_READ: i32 = -2;
/// Exit code for when an error emerged while extracting the frame.
const ERROR_EXTRACT: i32 = -3;
/// Exit code for when an error emerged while writing the frame.
const ERROR_WRITE: i32 = -4;
/// Exit code for any other error.
const ERROR_OTHER: i32 = -128;

/// Extract a frame of native pixel data from a raw byte buffer
#[derive(Debug, Parser)]
#[command(version)]
struct App {
    /// The file holding the pixel data buffer
    file: PathBuf,
    /// The output file (default is to change the extension to .frame<N>.raw)
    #[clap(short = 'o', long = "output")]
    output: Option<PathBuf>,

    /// Rows of each frame
    #[clap(long = "rows")]
    rows: u16,
    /// Columns of each frame
    #[clap(long = "cols")]
    cols: u16,
    /// Bits allocated per sample (1, 8, 12, 16 or 32)
    #[clap(long = "bits-allocated")]
    bits_allocated: u16,
    /// Samples per pixel
    #[clap(long = "samples-per-pixel", default_value_t = 1)]
    samples_per_pixel: u16,
    /// Photometric interpretation
    #[clap(long = "photometric", default_value = "MONOCHROME2")]
    photometric_interpretation: String,
    /// Byte offset of the first frame in the file
    #[clap(long = "offset", default_value_t = 0)]
    offset: usize,
    /// Index of the frame to extract, starting at 0
    #[clap(short = 'f', long = "frame", default_value_t = 0)]
    frame: u32,

    /// Only check that bit-packed frames start within the file
    #[clap(long = "start-offset-check")]
    start_offset_check: bool,

    /// Verbose mode
    #[clap(short = 'v', long = "verbose")]
    verbose: bool,
}

fn main() {
    run().unwrap_or_else(|e| {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(ERROR_OTHER);
    });
}

fn run() -> Result<(), Whatever> {
    let App {
        file,
        output,
        rows,
        cols,
        bits_allocated,
        samples_per_pixel,
        photometric_interpretation,
        offset,
        frame,
        start_offset_check,
        verbose,
    } = App::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
            .finish(),
    )
    .unwrap_or_else(|e| {
        eprintln!("{}", snafu::Report::from_error(e));
    });

    let output = output.unwrap_or_else(|| {
        let mut file = file.clone();
        file.set_extension(format!("frame{}.raw", frame));
        file
    });

    let bytes = std::fs::read(&file).unwrap_or_else(|e| {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(ERROR_READ);
    });

    let obj = InMemDataSet::new(bytes)
        .with_u16(tags::ROWS, rows)
        .with_u16(tags::COLUMNS, cols)
        .with_u16(tags::BITS_ALLOCATED, bits_allocated)
        .with_u16(tags::SAMPLES_PER_PIXEL, samples_per_pixel)
        .with_str(tags::PHOTOMETRIC_INTERPRETATION, photometric_interpretation)
        .with_element(tags::PIXEL_DATA, offset)
        .whatever_context("Pixel data offset is past the end of the file")?;

    let bounds_check = if start_offset_check {
        BoundsCheck::StartOffset
    } else {
        BoundsCheck::Full
    };
    let extractor =
        FrameExtractor::new().with_options(ExtractOptions::new().bounds_check(bounds_check));

    let extracted = extractor.extract_frame(&obj, frame).unwrap_or_else(|e| {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(ERROR_EXTRACT);
    });

    std::fs::write(&output, extracted.as_bytes()).unwrap_or_else(|e| {
        eprintln!("{}", Report::from_error(e));
        std::process::exit(ERROR_WRITE);
    });

    info!(
        "Frame #{} ({} bytes) written to {}",
        frame,
        extracted.len(),
        output.display()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::App;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }
}
