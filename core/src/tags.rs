//! Constant declarations of the DICOM attribute tags
//! needed to locate and interpret native pixel data.
//!
//! Names follow the attribute keywords of [DICOM PS3.6],
//! in screaming snake case.
//!
//! [DICOM PS3.6]: https://dicom.nema.org/medical/dicom/current/output/chtml/part06/ps3.6.html

use crate::header::Tag;

/// SamplesPerPixel (0028,0002) US 1
pub const SAMPLES_PER_PIXEL: Tag = Tag(0x0028, 0x0002);
/// PhotometricInterpretation (0028,0004) CS 1
pub const PHOTOMETRIC_INTERPRETATION: Tag = Tag(0x0028, 0x0004);
/// NumberOfFrames (0028,0008) IS 1
pub const NUMBER_OF_FRAMES: Tag = Tag(0x0028, 0x0008);
/// Rows (0028,0010) US 1
pub const ROWS: Tag = Tag(0x0028, 0x0010);
/// Columns (0028,0011) US 1
pub const COLUMNS: Tag = Tag(0x0028, 0x0011);
/// BitsAllocated (0028,0100) US 1
pub const BITS_ALLOCATED: Tag = Tag(0x0028, 0x0100);
/// BitsStored (0028,0101) US 1
pub const BITS_STORED: Tag = Tag(0x0028, 0x0101);
/// FloatPixelData (7FE0,0008) OF 1
pub const FLOAT_PIXEL_DATA: Tag = Tag(0x7FE0, 0x0008);
/// DoubleFloatPixelData (7FE0,0009) OD 1
pub const DOUBLE_FLOAT_PIXEL_DATA: Tag = Tag(0x7FE0, 0x0009);
/// PixelData (7FE0,0010) OB or OW 1
pub const PIXEL_DATA: Tag = Tag(0x7FE0, 0x0010);
