//! This module contains the DICOM attribute tag type,
//! used to identify data elements in a data set.

use std::fmt;

/// Idiomatic alias for a tag's group number.
pub type GroupNumber = u16;
/// Idiomatic alias for a tag's element number.
pub type ElementNumber = u16;

/// The data type for DICOM data element tags.
///
/// A tag is a `(group, element)` pair.
/// Both `(u16, u16)` and `[u16; 2]` can be
/// efficiently converted to this type as well.
#[derive(PartialEq, Eq, Hash, PartialOrd, Ord, Clone, Copy)]
pub struct Tag(pub GroupNumber, pub ElementNumber);

impl Tag {
    /// Getter for the tag's group value.
    #[inline]
    pub fn group(self) -> GroupNumber {
        self.0
    }

    /// Getter for the tag's element value.
    #[inline]
    pub fn element(self) -> ElementNumber {
        self.1
    }

    /// Whether this tag identifies one of the pixel data elements
    /// (_Pixel Data_, _Float Pixel Data_ or _Double Float Pixel Data_).
    #[inline]
    pub fn is_pixel_data(self) -> bool {
        self.0 == 0x7FE0 && matches!(self.1, 0x0008 | 0x0009 | 0x0010)
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({:#06X?}, {:#06X?})", self.0, self.1)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({:04X},{:04X})", self.0, self.1)
    }
}

impl PartialEq<(u16, u16)> for Tag {
    fn eq(&self, other: &(u16, u16)) -> bool {
        self.0 == other.0 && self.1 == other.1
    }
}

impl PartialEq<[u16; 2]> for Tag {
    fn eq(&self, other: &[u16; 2]) -> bool {
        self.0 == other[0] && self.1 == other[1]
    }
}

impl From<(u16, u16)> for Tag {
    #[inline]
    fn from(value: (u16, u16)) -> Tag {
        Tag(value.0, value.1)
    }
}

impl From<[u16; 2]> for Tag {
    #[inline]
    fn from(value: [u16; 2]) -> Tag {
        Tag(value[0], value[1])
    }
}

#[cfg(test)]
mod tests {
    use super::Tag;

    #[test]
    fn tag_display_and_debug() {
        let tag = Tag(0x7FE0, 0x0010);
        assert_eq!(tag.to_string(), "(7FE0,0010)");
        assert_eq!(format!("{:?}", tag), "Tag(0x7FE0, 0x0010)");
    }

    #[test]
    fn tag_conversions() {
        let tag = Tag(0x0028, 0x0100);
        assert_eq!(tag, (0x0028, 0x0100));
        assert_eq!(tag, [0x0028, 0x0100]);
        assert_eq!(Tag::from((0x0028, 0x0100)), tag);
        assert_eq!(Tag::from([0x0028, 0x0100]), tag);
        assert_eq!(tag.group(), 0x0028);
        assert_eq!(tag.element(), 0x0100);
    }

    #[test]
    fn pixel_data_tags() {
        assert!(Tag(0x7FE0, 0x0010).is_pixel_data());
        assert!(Tag(0x7FE0, 0x0008).is_pixel_data());
        assert!(Tag(0x7FE0, 0x0009).is_pixel_data());
        assert!(!Tag(0x7FE0, 0x0001).is_pixel_data());
        assert!(!Tag(0x0028, 0x0010).is_pixel_data());
    }
}
