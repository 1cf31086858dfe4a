//! Unpacking of bit-packed pixel samples.
//!
//! Samples with 1 or 12 bits allocated do not start on byte boundaries,
//! so they cannot be sliced out of the pixel data buffer.
//! The functions here expand them into byte-aligned slots.
//! Bytes missing past the end of the input are read as zeros.

/// Trait for expanding 1-bit samples into one byte per sample.
pub trait BitUnpacker {
    /// Unpack `pixel_count` single-bit samples from `src`,
    /// starting at bit number `bit_offset` of the buffer
    /// (where bit 8 is the least significant bit of byte 1).
    ///
    /// The output always has exactly `pixel_count` bytes.
    fn unpack(&self, src: &[u8], bit_offset: usize, pixel_count: usize) -> Vec<u8>;
}

/// The standard bit unpacker for DICOM pixel data:
/// samples are read starting from the least significant bit of each byte,
/// and each output byte is either 0 or 1.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct LsbBitUnpacker;

impl BitUnpacker for LsbBitUnpacker {
    fn unpack(&self, src: &[u8], bit_offset: usize, pixel_count: usize) -> Vec<u8> {
        (bit_offset..bit_offset + pixel_count)
            .map(|bit| {
                let byte = src.get(bit / 8).copied().unwrap_or(0);
                (byte >> (bit % 8)) & 1
            })
            .collect()
    }
}

/// Unpack `pixel_count` 12-bit samples from `src`.
///
/// Every two samples are packed into three bytes `b0, b1, b2`:
/// the first is `b0 | (b1 & 0x0F) << 8`,
/// the second is `b1 >> 4 | b2 << 4`.
pub fn unpack_12bit(src: &[u8], pixel_count: usize) -> Vec<u16> {
    let mut out = Vec::with_capacity(pixel_count);
    let byte_at = |i: usize| u16::from(src.get(i).copied().unwrap_or(0));

    let mut i = 0;
    while out.len() < pixel_count {
        let b0 = byte_at(i);
        let b1 = byte_at(i + 1);
        let b2 = byte_at(i + 2);

        out.push(b0 | ((b1 & 0x0F) << 8));
        if out.len() < pixel_count {
            out.push((b1 >> 4) | (b2 << 4));
        }
        i += 3;
    }
    out
}

/// Pack 12-bit samples into three bytes for every two samples,
/// the inverse of [`unpack_12bit`].
///
/// Only the 12 least significant bits of each value are kept.
/// An odd number of samples produces a final pair of bytes.
pub fn pack_12bit(values: &[u16]) -> Vec<u8> {
    let mut out = Vec::with_capacity((values.len() * 3 + 1) / 2);
    for pair in values.chunks(2) {
        let a = pair[0] & 0x0FFF;
        out.push((a & 0xFF) as u8);
        match pair.get(1) {
            Some(&b) => {
                let b = b & 0x0FFF;
                out.push(((a >> 8) | ((b & 0x0F) << 4)) as u8);
                out.push((b >> 4) as u8);
            }
            None => out.push((a >> 8) as u8),
        }
    }
    out
}
