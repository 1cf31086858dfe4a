#![no_main]
use byteorder::{LittleEndian as LE, ReadBytesExt};
use dicom_frame::{BoundsCheck, ExtractOptions, FrameExtractor};
use dicom_frame_core::{tags, InMemDataSet};
use libfuzzer_sys::fuzz_target;
use std::error::Error;

fuzz_target!(|data: &[u8]| {
    let _ = fuzz(data);
});

/// Obtain a data set with native pixel data from some raw bytes
/// in a non-standard format:
/// a short header of image attributes
/// followed by the pixel data buffer.
///
/// The dimensions are kept small so that
/// the fuzzer reaches the extraction paths sooner.
fn build_data_set(data: &[u8]) -> Result<(InMemDataSet, u32, BoundsCheck), Box<dyn Error>> {
    let reader = &mut (&data[..]);

    let rows = u16::from(reader.read_u8()?);
    let cols = u16::from(reader.read_u8()?);
    let spp = u16::from(reader.read_u8()? % 4);
    let bits_allocated = match reader.read_u8()? % 6 {
        0 => 1,
        1 => 8,
        2 => 12,
        3 => 16,
        4 => 32,
        _ => 24,
    };
    let pi = if reader.read_u8()? < 0x80 {
        "MONOCHROME2"
    } else {
        "YBR_FULL_422"
    };
    let frame = u32::from(reader.read_u16::<LE>()?);
    let bounds_check = if reader.read_u8()? < 0x80 {
        BoundsCheck::Full
    } else {
        BoundsCheck::StartOffset
    };
    let offset = usize::from(reader.read_u8()?);

    let obj = InMemDataSet::new(reader.to_vec())
        .with_u16(tags::ROWS, rows)
        .with_u16(tags::COLUMNS, cols)
        .with_u16(tags::SAMPLES_PER_PIXEL, spp)
        .with_u16(tags::BITS_ALLOCATED, bits_allocated)
        .with_str(tags::PHOTOMETRIC_INTERPRETATION, pi)
        .with_element(tags::PIXEL_DATA, offset)?;

    Ok((obj, frame, bounds_check))
}

fn fuzz(data: &[u8]) -> Result<(), Box<dyn Error>> {
    let (obj, frame, bounds_check) = build_data_set(data)?;

    let extractor =
        FrameExtractor::new().with_options(ExtractOptions::new().bounds_check(bounds_check));

    let extracted = extractor.extract_frame(&obj, frame);
    let layout = extractor.layout(&obj, frame);

    match (extracted, layout) {
        (Ok(extracted), Ok(layout)) => {
            // the output length depends only on the layout
            assert_eq!(extracted.len(), layout.output_len);
        }
        (Ok(_), Err(e)) => panic!("extracted a frame without a layout: {}", e),
        _ => {}
    }

    Ok(())
}
