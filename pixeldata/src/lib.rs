//! This crate locates and extracts single frames of
//! native (uncompressed) DICOM pixel data.
//!
//! Given a parsed data set exposing the image pixel attributes
//! and the backing byte buffer through [`DataSetAccess`],
//! the [`FrameExtractor`] computes where a frame lives in the buffer,
//! checks that it is in bounds,
//! and returns an owned copy of its bytes.
//! Frames with 1 or 12 bits allocated are unpacked
//! into one byte and two bytes per sample, respectively.
//!
//! Parsing DICOM files and decoding encapsulated pixel data
//! are not handled here.
//!
//! # Examples
//! ```
//! # use std::error::Error;
//! use dicom_frame::FrameSource;
//! use dicom_frame_core::{tags, InMemDataSet};
//!
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let obj = InMemDataSet::new(vec![10, 20, 30, 40, 50, 60, 70, 80])
//!     .with_u16(tags::BITS_ALLOCATED, 8)
//!     .with_u16(tags::ROWS, 2)
//!     .with_u16(tags::COLUMNS, 2)
//!     .with_u16(tags::SAMPLES_PER_PIXEL, 1)
//!     .with_str(tags::PHOTOMETRIC_INTERPRETATION, "MONOCHROME2")
//!     .with_element(tags::PIXEL_DATA, 0)?;
//!
//! let frame = obj.extract_frame(1)?;
//! assert_eq!(frame.as_bytes(), &[50, 60, 70, 80]);
//! #   Ok(())
//! # }
//! ```

use snafu::{Backtrace, Snafu};

pub mod attribute;
pub mod frame;
pub mod layout;
pub mod unpack;

pub use attribute::{GetAttributeError, PhotometricInterpretation};
pub use dicom_frame_core::DataSetAccess;
pub use frame::{
    extract_frame, BoundsCheck, ExtractOptions, ExtractedFrame, FrameExtractor, FrameSource,
};
pub use layout::{BitsAllocated, FrameLayout};
pub use unpack::{BitUnpacker, LsbBitUnpacker};

/// The possible error conditions when extracting a frame.
///
/// Users of this type are free to handle errors based on their variant
/// or on their [kind](Error::kind),
/// but should not make decisions based on the display message,
/// since that is not considered part of the API.
#[derive(Debug, Snafu)]
#[non_exhaustive]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    /// A required image attribute is missing or invalid.
    #[snafu(display("Could not read image attributes"))]
    GetAttribute {
        #[snafu(backtrace)]
        source: GetAttributeError,
    },

    /// The value of _Bits Allocated_ has no known frame layout.
    #[snafu(display("Unsupported BitsAllocated {}", bits_allocated))]
    UnsupportedBitsAllocated {
        bits_allocated: u16,
        backtrace: Backtrace,
    },

    /// The frame's bytes are not all within the pixel data buffer.
    #[snafu(display(
        "Frame #{} at bytes {}..{} is out of range of a buffer with {} bytes",
        frame,
        offset,
        end,
        buffer_len
    ))]
    FrameOutOfRange {
        frame: u32,
        offset: usize,
        end: usize,
        buffer_len: usize,
        backtrace: Backtrace,
    },

    /// The position of the frame cannot be represented in memory.
    #[snafu(display("Position of frame #{} overflows", frame))]
    FrameOffsetOverflow { frame: u32, backtrace: Backtrace },

    /// The frame index is not lower than _Number of Frames_.
    #[snafu(display(
        "Frame #{} requested, but the data set has {} frame(s)",
        frame,
        number_of_frames
    ))]
    FrameIndexExceedsCount {
        frame: u32,
        number_of_frames: u32,
        backtrace: Backtrace,
    },
}

/// The two classes of frame extraction failure.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// The image attributes do not describe native pixel data
    /// which can be extracted.
    UnsupportedFormat,
    /// The requested frame does not lie within the pixel data.
    OutOfRange,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::GetAttribute { .. } | Error::UnsupportedBitsAllocated { .. } => {
                ErrorKind::UnsupportedFormat
            }
            Error::FrameOutOfRange { .. }
            | Error::FrameOffsetOverflow { .. }
            | Error::FrameIndexExceedsCount { .. } => ErrorKind::OutOfRange,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use dicom_frame_core::{tags, InMemDataSet};

    #[test]
    fn error_kinds() {
        let obj = InMemDataSet::new(vec![0; 4]);
        let err = extract_frame(&obj, 0).unwrap_err();
        assert!(matches!(err, Error::GetAttribute { .. }));
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);

        let obj = obj
            .with_u16(tags::BITS_ALLOCATED, 8)
            .with_u16(tags::ROWS, 2)
            .with_u16(tags::COLUMNS, 2)
            .with_u16(tags::SAMPLES_PER_PIXEL, 1)
            .with_str(tags::PHOTOMETRIC_INTERPRETATION, "MONOCHROME2")
            .with_element(tags::PIXEL_DATA, 0)
            .unwrap();
        let err = extract_frame(&obj, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
        assert_eq!(
            err.to_string(),
            "Frame #1 at bytes 4..8 is out of range of a buffer with 4 bytes"
        );
    }
}
