//! Frame layout policies for native pixel data.
//!
//! The position and size of a frame in the pixel data buffer
//! depend on the number of bits allocated per sample.
//! Samples of 8, 16 and 32 bits are byte aligned,
//! while 1-bit samples are packed eight to a byte
//! and 12-bit samples are packed two to every three bytes.

use crate::attribute::PhotometricInterpretation;
use snafu::Snafu;
use std::convert::TryFrom;
use tracing::info;

/// A supported value of the DICOM _Bits Allocated_ attribute.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub enum BitsAllocated {
    /// 1 bit per sample, packed least significant bit first
    One,
    /// 8 bits per sample
    Eight,
    /// 12 bits per sample, two samples in three bytes
    Twelve,
    /// 16 bits per sample
    Sixteen,
    /// 32 bits per sample
    ThirtyTwo,
}

impl BitsAllocated {
    /// The number of bits which this variant stands for.
    pub fn bits(self) -> u16 {
        match self {
            BitsAllocated::One => 1,
            BitsAllocated::Eight => 8,
            BitsAllocated::Twelve => 12,
            BitsAllocated::Sixteen => 16,
            BitsAllocated::ThirtyTwo => 32,
        }
    }
}

/// Unsupported Bits Allocated value
#[derive(Debug, Copy, Clone, PartialEq, Snafu)]
#[snafu(display("Unsupported BitsAllocated {}", value))]
pub struct FromBitsAllocatedError {
    value: u16,
}

impl FromBitsAllocatedError {
    /// The value which could not be interpreted.
    pub fn value(&self) -> u16 {
        self.value
    }
}

impl TryFrom<u16> for BitsAllocated {
    type Error = FromBitsAllocatedError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BitsAllocated::One),
            8 => Ok(BitsAllocated::Eight),
            12 => Ok(BitsAllocated::Twelve),
            16 => Ok(BitsAllocated::Sixteen),
            32 => Ok(BitsAllocated::ThirtyTwo),
            value => Err(FromBitsAllocatedError { value }),
        }
    }
}

/// Determine the number of samples per pixel which
/// actually drives the stride of the pixel data.
///
/// `YBR_FULL_422` shares each pair of chrominance samples
/// between two horizontally adjacent pixels,
/// so every pixel takes the space of 2 samples
/// whatever _Samples per Pixel_ says.
pub fn effective_samples_per_pixel(
    samples_per_pixel: u16,
    photometric_interpretation: &PhotometricInterpretation,
) -> u16 {
    if *photometric_interpretation == PhotometricInterpretation::YbrFull422 {
        info!(
            "Photometric interpretation is YBR_FULL_422, using 2 samples per pixel instead of {}",
            samples_per_pixel
        );
        2
    } else {
        samples_per_pixel
    }
}

/// The position and extent of a single frame in the pixel data buffer.
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct FrameLayout {
    /// the sample layout policy
    pub bits_allocated: BitsAllocated,
    /// rows × columns × samples per pixel
    pub pixels_per_frame: usize,
    /// the offset of the first byte of the frame in the backing buffer
    pub byte_offset: usize,
    /// the number of stored bytes which the frame touches
    pub byte_len: usize,
    /// the index of the frame's first bit in its first byte
    /// (always 0 unless 1 bit is allocated per sample)
    pub bit_shift: u8,
    /// the length of the extracted frame in bytes
    pub output_len: usize,
}

impl FrameLayout {
    /// Compute the layout of frame number `frame`
    /// (starting at 0) of the pixel data starting at
    /// `pixel_data_offset` in the backing buffer.
    ///
    /// `samples_per_pixel` is expected to be the
    /// [effective](effective_samples_per_pixel) value.
    ///
    /// Returns `None` if any position overflows.
    pub fn compute(
        bits_allocated: BitsAllocated,
        rows: u16,
        cols: u16,
        samples_per_pixel: u16,
        pixel_data_offset: usize,
        frame: u32,
    ) -> Option<Self> {
        let pixels_per_frame = usize::from(rows)
            .checked_mul(usize::from(cols))?
            .checked_mul(usize::from(samples_per_pixel))?;
        let frame = usize::try_from(frame).ok()?;

        let (byte_offset, byte_len, bit_shift, output_len) = match bits_allocated {
            BitsAllocated::One => {
                // addressed in bits, frames need not start on a byte boundary
                let bit_position = pixel_data_offset
                    .checked_mul(8)?
                    .checked_add(frame.checked_mul(pixels_per_frame)?)?;
                let bit_shift = bit_position % 8;
                let byte_len = bit_shift.checked_add(pixels_per_frame)?.checked_add(7)? / 8;
                (bit_position / 8, byte_len, bit_shift as u8, pixels_per_frame)
            }
            BitsAllocated::Twelve => {
                let byte_len = pixels_per_frame.checked_mul(3)?.checked_add(1)? / 2;
                let byte_offset =
                    pixel_data_offset.checked_add(frame.checked_mul(byte_len)?)?;
                (byte_offset, byte_len, 0, pixels_per_frame.checked_mul(2)?)
            }
            BitsAllocated::Eight | BitsAllocated::Sixteen | BitsAllocated::ThirtyTwo => {
                let bytes_per_sample = usize::from(bits_allocated.bits() / 8);
                let byte_len = pixels_per_frame.checked_mul(bytes_per_sample)?;
                let byte_offset =
                    pixel_data_offset.checked_add(frame.checked_mul(byte_len)?)?;
                (byte_offset, byte_len, 0, byte_len)
            }
        };

        Some(FrameLayout {
            bits_allocated,
            pixels_per_frame,
            byte_offset,
            byte_len,
            bit_shift,
            output_len,
        })
    }

    /// The offset one past the last stored byte of the frame.
    pub fn byte_end(&self) -> Option<usize> {
        self.byte_offset.checked_add(self.byte_len)
    }

    /// Whether the samples of this frame are bit-packed
    /// and need to be unpacked rather than copied.
    pub fn is_packed(&self) -> bool {
        matches!(
            self.bits_allocated,
            BitsAllocated::One | BitsAllocated::Twelve
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bits_allocated_from_value() {
        for bits in [1, 8, 12, 16, 32] {
            assert_eq!(BitsAllocated::try_from(bits).unwrap().bits(), bits);
        }
        for bits in [0, 2, 4, 24, 64] {
            let err = BitsAllocated::try_from(bits).unwrap_err();
            assert_eq!(err.value(), bits);
            assert_eq!(err.to_string(), format!("Unsupported BitsAllocated {}", bits));
        }
    }

    #[test]
    fn ybr_full_422_uses_two_samples() {
        assert_eq!(
            effective_samples_per_pixel(3, &PhotometricInterpretation::YbrFull422),
            2
        );
        assert_eq!(
            effective_samples_per_pixel(3, &PhotometricInterpretation::YbrFull),
            3
        );
        assert_eq!(
            effective_samples_per_pixel(1, &PhotometricInterpretation::Monochrome2),
            1
        );
    }

    #[test]
    fn byte_aligned_layouts() {
        // 4x5, RGB, third frame
        let layout = FrameLayout::compute(BitsAllocated::Sixteen, 4, 5, 3, 100, 2).unwrap();
        assert_eq!(layout.pixels_per_frame, 60);
        assert_eq!(layout.byte_len, 120);
        assert_eq!(layout.byte_offset, 100 + 2 * 120);
        assert_eq!(layout.output_len, 120);
        assert_eq!(layout.byte_end(), Some(460));
        assert!(!layout.is_packed());

        let layout = FrameLayout::compute(BitsAllocated::Eight, 2, 2, 1, 0, 1).unwrap();
        assert_eq!((layout.byte_offset, layout.byte_len), (4, 4));

        let layout = FrameLayout::compute(BitsAllocated::ThirtyTwo, 2, 2, 1, 8, 1).unwrap();
        assert_eq!((layout.byte_offset, layout.byte_len), (24, 16));
    }

    #[test]
    fn one_bit_layout_is_bit_addressed() {
        // 16 pixels per frame: byte aligned
        let layout = FrameLayout::compute(BitsAllocated::One, 4, 4, 1, 10, 3).unwrap();
        assert_eq!(layout.byte_offset, 10 + 6);
        assert_eq!(layout.bit_shift, 0);
        assert_eq!(layout.byte_len, 2);
        assert_eq!(layout.output_len, 16);
        assert!(layout.is_packed());

        // 9 pixels per frame: frame 1 starts at bit 1 of byte 1
        let layout = FrameLayout::compute(BitsAllocated::One, 3, 3, 1, 0, 1).unwrap();
        assert_eq!(layout.byte_offset, 1);
        assert_eq!(layout.bit_shift, 1);
        // bits 1..10 of the stream starting at byte 1 span 2 bytes
        assert_eq!(layout.byte_len, 2);
        assert_eq!(layout.output_len, 9);

        // frame 7 starts at bit 63, which is bit 7 of byte 7
        let layout = FrameLayout::compute(BitsAllocated::One, 3, 3, 1, 0, 7).unwrap();
        assert_eq!(layout.byte_offset, 7);
        assert_eq!(layout.bit_shift, 7);
        assert_eq!(layout.byte_len, 2);
    }

    #[test]
    fn twelve_bit_layout() {
        // 2 pixels in 3 bytes
        let layout = FrameLayout::compute(BitsAllocated::Twelve, 1, 2, 1, 0, 0).unwrap();
        assert_eq!(layout.byte_len, 3);
        assert_eq!(layout.output_len, 4);

        // odd pixel count rounds up to a whole byte
        let layout = FrameLayout::compute(BitsAllocated::Twelve, 1, 3, 1, 4, 2).unwrap();
        assert_eq!(layout.byte_len, 5);
        assert_eq!(layout.byte_offset, 4 + 2 * 5);
        assert_eq!(layout.output_len, 6);
    }

    #[test]
    fn overflow_is_reported() {
        assert_eq!(
            FrameLayout::compute(
                BitsAllocated::ThirtyTwo,
                u16::MAX,
                u16::MAX,
                u16::MAX,
                0,
                u32::MAX
            ),
            None
        );
        assert_eq!(
            FrameLayout::compute(BitsAllocated::One, 1, 1, 1, usize::MAX, 0),
            None
        );
    }
}
