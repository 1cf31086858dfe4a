//! Extraction of a single frame of native pixel data.
//!
//! The entry point is [`FrameExtractor`],
//! also available through the [`FrameSource`] extension trait
//! and the [`extract_frame`] function with default options.

use crate::attribute::{self, PhotometricInterpretation};
use crate::layout::{effective_samples_per_pixel, BitsAllocated, FrameLayout};
use crate::unpack::{unpack_12bit, BitUnpacker, LsbBitUnpacker};
use crate::{
    FrameIndexExceedsCountSnafu, FrameOffsetOverflowSnafu, FrameOutOfRangeSnafu,
    GetAttributeSnafu, Result, UnsupportedBitsAllocatedSnafu,
};
use byteorder::{ByteOrder, LittleEndian};
use dicom_frame_core::DataSetAccess;
use snafu::{ensure, OptionExt, ResultExt};
use std::convert::TryFrom;
use tracing::{debug, trace};

/// How much of a bit-packed frame is checked
/// against the length of the pixel data buffer before reading.
///
/// Frames of 8, 16 or 32 bits allocated
/// are always checked in full.
#[derive(Debug, Default, Copy, Clone, Eq, Hash, PartialEq)]
pub enum BoundsCheck {
    /// Every byte of the frame must be in the buffer.
    #[default]
    Full,
    /// Only the first byte of 1-bit and 12-bit frames
    /// must be in the buffer.
    /// Samples packed in bytes past the end are read as zeros.
    StartOffset,
}

/// Custom options when extracting a frame.
#[derive(Debug, Default, Clone, PartialEq)]
#[non_exhaustive]
pub struct ExtractOptions {
    /// How bit-packed frames are checked against the buffer length.
    pub bounds_check: BoundsCheck,
    /// Whether to reject frame indices
    /// not lower than the data set's _Number of Frames_
    /// before looking at the buffer.
    /// When `false`,
    /// only the length of the buffer limits the frame index.
    pub check_number_of_frames: bool,
}

impl ExtractOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bounds check policy.
    pub fn bounds_check(mut self, bounds_check: BoundsCheck) -> Self {
        self.bounds_check = bounds_check;
        self
    }

    /// Set whether the frame index is checked against _Number of Frames_.
    pub fn check_number_of_frames(mut self, check: bool) -> Self {
        self.check_number_of_frames = check;
        self
    }
}

/// A single frame of pixel data, extracted into its own buffer.
///
/// Samples are laid out as in the source,
/// except for bit-packed samples:
/// with 1 bit allocated, each sample takes one byte (0 or 1),
/// and with 12 bits allocated,
/// each sample takes two bytes in little endian.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFrame {
    data: Vec<u8>,
    frame: u32,
    rows: u16,
    cols: u16,
    samples_per_pixel: u16,
    bits_allocated: BitsAllocated,
    photometric_interpretation: PhotometricInterpretation,
}

impl ExtractedFrame {
    /// The frame's bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Retrieve the frame's bytes, discarding the rest.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// The number of bytes in the frame.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The index of this frame in the data set, starting at 0.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn rows(&self) -> u16 {
        self.rows
    }

    pub fn columns(&self) -> u16 {
        self.cols
    }

    /// The number of samples per pixel used to lay out the frame,
    /// which is 2 for `YBR_FULL_422`.
    pub fn samples_per_pixel(&self) -> u16 {
        self.samples_per_pixel
    }

    pub fn bits_allocated(&self) -> BitsAllocated {
        self.bits_allocated
    }

    pub fn photometric_interpretation(&self) -> &PhotometricInterpretation {
        &self.photometric_interpretation
    }

    /// Read the frame as 16-bit samples in little endian.
    ///
    /// Returns `None` unless the frame was stored
    /// with 12 or 16 bits allocated.
    pub fn to_u16_samples(&self) -> Option<Vec<u16>> {
        match self.bits_allocated {
            BitsAllocated::Twelve | BitsAllocated::Sixteen => {
                let mut out = vec![0; self.data.len() / 2];
                LittleEndian::read_u16_into(&self.data[..out.len() * 2], &mut out);
                Some(out)
            }
            _ => None,
        }
    }
}

/// Image attributes which shape the extracted frame.
#[derive(Debug)]
struct FrameAttributes {
    rows: u16,
    cols: u16,
    samples_per_pixel: u16,
    photometric_interpretation: PhotometricInterpretation,
}

/// Locator and extractor of native pixel data frames.
///
/// The extractor holds no state between calls,
/// so the same one can serve any number of data sets,
/// from any number of threads.
#[derive(Debug, Default, Clone)]
pub struct FrameExtractor<U = LsbBitUnpacker> {
    options: ExtractOptions,
    unpacker: U,
}

impl FrameExtractor {
    /// Create a frame extractor with default options.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<U> FrameExtractor<U>
where
    U: BitUnpacker,
{
    /// Replace the extraction options.
    pub fn with_options(self, options: ExtractOptions) -> Self {
        FrameExtractor { options, ..self }
    }

    /// Replace the unpacker of 1-bit samples.
    pub fn with_unpacker<V: BitUnpacker>(self, unpacker: V) -> FrameExtractor<V> {
        FrameExtractor {
            options: self.options,
            unpacker,
        }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Compute where frame number `frame` (starting at 0)
    /// lives in the data set's pixel data buffer,
    /// without reading the buffer.
    pub fn layout<O>(&self, obj: &O, frame: u32) -> Result<FrameLayout>
    where
        O: DataSetAccess + ?Sized,
    {
        self.resolve(obj, frame).map(|(layout, _)| layout)
    }

    /// Extract frame number `frame` (starting at 0)
    /// from the data set's pixel data buffer.
    ///
    /// Fails without reading the buffer
    /// if the image attributes are missing or unsupported,
    /// and fails without partial output
    /// if the frame is not within the buffer.
    pub fn extract_frame<O>(&self, obj: &O, frame: u32) -> Result<ExtractedFrame>
    where
        O: DataSetAccess + ?Sized,
    {
        let (layout, attrs) = self.resolve(obj, frame)?;

        let src = obj.byte_array();
        let buffer_len = src.len();
        let offset = layout.byte_offset;
        let end = layout.byte_end().context(FrameOffsetOverflowSnafu { frame })?;

        if layout.is_packed() && self.options.bounds_check == BoundsCheck::StartOffset {
            ensure!(
                offset < buffer_len,
                FrameOutOfRangeSnafu {
                    frame,
                    offset,
                    end,
                    buffer_len,
                }
            );
        } else {
            ensure!(
                end <= buffer_len,
                FrameOutOfRangeSnafu {
                    frame,
                    offset,
                    end,
                    buffer_len,
                }
            );
        }

        let data = match layout.bits_allocated {
            BitsAllocated::Eight | BitsAllocated::Sixteen | BitsAllocated::ThirtyTwo => {
                trace!("Copying {} bytes of frame #{}", layout.byte_len, frame);
                src[offset..end].to_vec()
            }
            BitsAllocated::One => {
                trace!(
                    "Unpacking {} 1-bit samples of frame #{}",
                    layout.pixels_per_frame,
                    frame
                );
                self.unpacker.unpack(
                    &src[offset..],
                    usize::from(layout.bit_shift),
                    layout.pixels_per_frame,
                )
            }
            BitsAllocated::Twelve => {
                trace!(
                    "Unpacking {} 12-bit samples of frame #{}",
                    layout.pixels_per_frame,
                    frame
                );
                let samples = unpack_12bit(
                    &src[offset..end.min(buffer_len)],
                    layout.pixels_per_frame,
                );
                let mut data = vec![0; layout.output_len];
                LittleEndian::write_u16_into(&samples, &mut data);
                data
            }
        };
        debug_assert_eq!(data.len(), layout.output_len);

        Ok(ExtractedFrame {
            data,
            frame,
            rows: attrs.rows,
            cols: attrs.cols,
            samples_per_pixel: attrs.samples_per_pixel,
            bits_allocated: layout.bits_allocated,
            photometric_interpretation: attrs.photometric_interpretation,
        })
    }

    fn resolve<O>(&self, obj: &O, frame: u32) -> Result<(FrameLayout, FrameAttributes)>
    where
        O: DataSetAccess + ?Sized,
    {
        let bits_allocated = attribute::bits_allocated(obj).context(GetAttributeSnafu)?;
        let bits_allocated = BitsAllocated::try_from(bits_allocated)
            .ok()
            .context(UnsupportedBitsAllocatedSnafu { bits_allocated })?;

        let rows = attribute::rows(obj).context(GetAttributeSnafu)?;
        let cols = attribute::cols(obj).context(GetAttributeSnafu)?;
        let samples_per_pixel = attribute::samples_per_pixel(obj).context(GetAttributeSnafu)?;
        let photometric_interpretation =
            attribute::photometric_interpretation(obj).context(GetAttributeSnafu)?;
        let samples_per_pixel =
            effective_samples_per_pixel(samples_per_pixel, &photometric_interpretation);

        if self.options.check_number_of_frames {
            let number_of_frames = attribute::number_of_frames(obj).context(GetAttributeSnafu)?;
            ensure!(
                frame < number_of_frames,
                FrameIndexExceedsCountSnafu {
                    frame,
                    number_of_frames,
                }
            );
        }

        let pixel_data = attribute::pixel_data(obj).context(GetAttributeSnafu)?;

        let layout = FrameLayout::compute(
            bits_allocated,
            rows,
            cols,
            samples_per_pixel,
            pixel_data.data_offset,
            frame,
        )
        .context(FrameOffsetOverflowSnafu { frame })?;

        debug!(
            "Frame #{} of {}x{}x{} samples with {} bits allocated: {} bytes at offset {}",
            frame,
            rows,
            cols,
            samples_per_pixel,
            bits_allocated.bits(),
            layout.byte_len,
            layout.byte_offset
        );

        Ok((
            layout,
            FrameAttributes {
                rows,
                cols,
                samples_per_pixel,
                photometric_interpretation,
            },
        ))
    }
}

/// Extract frame number `frame` (starting at 0)
/// from a data set with default options.
pub fn extract_frame<O>(obj: &O, frame: u32) -> Result<ExtractedFrame>
where
    O: DataSetAccess + ?Sized,
{
    FrameExtractor::new().extract_frame(obj, frame)
}

/// Extension trait for extracting frames directly from a data set.
pub trait FrameSource {
    /// Extract frame number `frame` (starting at 0) with default options.
    fn extract_frame(&self, frame: u32) -> Result<ExtractedFrame>;

    /// Extract frame number `frame` (starting at 0) with the given options.
    fn extract_frame_with_options(
        &self,
        frame: u32,
        options: ExtractOptions,
    ) -> Result<ExtractedFrame>;
}

impl<T> FrameSource for T
where
    T: DataSetAccess + ?Sized,
{
    fn extract_frame(&self, frame: u32) -> Result<ExtractedFrame> {
        FrameExtractor::new().extract_frame(self, frame)
    }

    fn extract_frame_with_options(
        &self,
        frame: u32,
        options: ExtractOptions,
    ) -> Result<ExtractedFrame> {
        FrameExtractor::new()
            .with_options(options)
            .extract_frame(self, frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Error, ErrorKind};
    use dicom_frame_core::{tags, ElementLocation, InMemDataSet, Tag};
    use std::cell::RefCell;

    fn image(
        bytes: Vec<u8>,
        bits_allocated: u16,
        rows: u16,
        cols: u16,
        samples_per_pixel: u16,
        pixel_data_offset: usize,
    ) -> InMemDataSet {
        let photometric_interpretation = if samples_per_pixel == 3 {
            "RGB"
        } else {
            "MONOCHROME2"
        };
        InMemDataSet::new(bytes)
            .with_u16(tags::BITS_ALLOCATED, bits_allocated)
            .with_u16(tags::ROWS, rows)
            .with_u16(tags::COLUMNS, cols)
            .with_u16(tags::SAMPLES_PER_PIXEL, samples_per_pixel)
            .with_str(tags::PHOTOMETRIC_INTERPRETATION, photometric_interpretation)
            .with_element(tags::PIXEL_DATA, pixel_data_offset)
            .unwrap()
    }

    /// A data set which must never have its buffer read.
    struct NoBufferAccess(InMemDataSet);

    impl DataSetAccess for NoBufferAccess {
        fn uint16(&self, tag: Tag) -> Option<u16> {
            self.0.uint16(tag)
        }

        fn string(&self, tag: Tag) -> Option<&str> {
            self.0.string(tag)
        }

        fn element(&self, tag: Tag) -> Option<ElementLocation> {
            self.0.element(tag)
        }

        fn byte_array(&self) -> &[u8] {
            panic!("pixel data buffer should not be accessed")
        }
    }

    /// Records the arguments of every call, then unpacks as usual.
    #[derive(Debug, Default)]
    struct RecordingUnpacker {
        calls: RefCell<Vec<(usize, usize, usize)>>,
    }

    impl BitUnpacker for RecordingUnpacker {
        fn unpack(&self, src: &[u8], bit_offset: usize, pixel_count: usize) -> Vec<u8> {
            self.calls
                .borrow_mut()
                .push((src.len(), bit_offset, pixel_count));
            LsbBitUnpacker.unpack(src, bit_offset, pixel_count)
        }
    }

    #[test]
    fn extract_8bit() {
        let obj = image(vec![10, 20, 30, 40], 8, 2, 2, 1, 0);
        let frame = extract_frame(&obj, 0).unwrap();
        assert_eq!(frame.as_bytes(), &[10, 20, 30, 40]);
        assert_eq!(frame.frame(), 0);
        assert_eq!(frame.rows(), 2);
        assert_eq!(frame.columns(), 2);
        assert_eq!(frame.bits_allocated(), BitsAllocated::Eight);
        assert_eq!(
            frame.photometric_interpretation(),
            &PhotometricInterpretation::Monochrome2
        );
    }

    #[test]
    fn extract_16bit() {
        let obj = image(vec![0x01, 0x00, 0x02, 0x00], 16, 1, 2, 1, 0);
        let frame = extract_frame(&obj, 0).unwrap();
        assert_eq!(frame.as_bytes(), &[0x01, 0x00, 0x02, 0x00]);
        assert_eq!(frame.to_u16_samples(), Some(vec![1, 2]));
    }

    #[test]
    fn extract_32bit_second_frame() {
        let mut bytes = vec![0xEE; 3];
        bytes.extend((0..16).map(|x| x as u8));
        let obj = image(bytes, 32, 1, 2, 1, 3);
        let frame = extract_frame(&obj, 1).unwrap();
        assert_eq!(frame.as_bytes(), &[8, 9, 10, 11, 12, 13, 14, 15]);
        assert_eq!(frame.to_u16_samples(), None);
    }

    #[test]
    fn extract_12bit() {
        let obj = image(vec![0x21, 0x43, 0x65], 12, 1, 2, 1, 0);
        let frame = extract_frame(&obj, 0).unwrap();
        assert_eq!(frame.as_bytes(), &[0x21, 0x03, 0x54, 0x06]);
        assert_eq!(frame.to_u16_samples(), Some(vec![0x321, 0x654]));
    }

    #[test]
    fn extract_1bit_delegates_to_unpacker() {
        // 3x3 frames, frame 1 starts at bit 9
        let obj = image(vec![0x00, 0b0000_0010, 0b0000_0010, 0x00], 1, 3, 3, 1, 0);
        let extractor = FrameExtractor::new().with_unpacker(RecordingUnpacker::default());
        let frame = extractor.extract_frame(&obj, 1).unwrap();

        assert_eq!(frame.as_bytes(), &[1, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(*extractor.unpacker.calls.borrow(), vec![(3, 1, 9)]);
    }

    #[test]
    fn ybr_full_422_uses_two_samples_per_pixel() {
        let obj = image((0..64).collect(), 8, 2, 4, 3, 0)
            .with_str(tags::PHOTOMETRIC_INTERPRETATION, "YBR_FULL_422");
        let frame = extract_frame(&obj, 1).unwrap();
        assert_eq!(frame.len(), 2 * 4 * 2);
        assert_eq!(frame.samples_per_pixel(), 2);
        assert_eq!(frame.as_bytes()[0], 16);
    }

    #[test]
    fn unsupported_bits_allocated_does_not_touch_buffer() {
        let obj = NoBufferAccess(image(vec![], 24, 2, 2, 1, 0));
        let err = extract_frame(&obj, 0).unwrap_err();
        assert!(matches!(
            err,
            Error::UnsupportedBitsAllocated {
                bits_allocated: 24,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn layout_does_not_touch_buffer() {
        let obj = NoBufferAccess(image(vec![0; 100], 16, 3, 3, 1, 4));
        let layout = FrameExtractor::new().layout(&obj, 2).unwrap();
        assert_eq!(layout.byte_offset, 4 + 2 * 18);
        assert_eq!(layout.byte_len, 18);
    }

    #[test]
    fn missing_pixel_data() {
        let mut obj = image(vec![0; 4], 8, 2, 2, 1, 0);
        obj.remove(tags::PIXEL_DATA);
        let err = extract_frame(&obj, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn number_of_frames_check_is_opt_in() {
        let obj = image(vec![0; 8], 8, 2, 2, 1, 0).with_str(tags::NUMBER_OF_FRAMES, "1");

        // the buffer holds a second frame
        assert!(extract_frame(&obj, 1).is_ok());

        let options = ExtractOptions::new().check_number_of_frames(true);
        let err = obj.extract_frame_with_options(1, options).unwrap_err();
        assert!(matches!(
            err,
            Error::FrameIndexExceedsCount {
                frame: 1,
                number_of_frames: 1,
                ..
            }
        ));
        assert_eq!(err.kind(), ErrorKind::OutOfRange);
    }

    #[test]
    fn start_offset_check_reads_zeros_past_the_end() {
        // two 12-bit pixels but only 2 of 3 bytes available
        let obj = image(vec![0x21, 0x43], 12, 1, 2, 1, 0);
        assert!(matches!(
            extract_frame(&obj, 0).unwrap_err(),
            Error::FrameOutOfRange {
                offset: 0,
                end: 3,
                buffer_len: 2,
                ..
            }
        ));

        let options = ExtractOptions::new().bounds_check(BoundsCheck::StartOffset);
        let frame = obj.extract_frame_with_options(0, options).unwrap();
        assert_eq!(frame.to_u16_samples(), Some(vec![0x321, 0x004]));
    }
}
