//! Typed access to a parsed DICOM data set.
//!
//! Parsing the container format is not a concern of this crate.
//! Instead, a parser exposes what it found through the [`DataSetAccess`] trait:
//! typed attribute reads by tag,
//! the location of data elements in the backing byte buffer,
//! and the backing byte buffer itself.
//!
//! [`InMemDataSet`] is a simple owned implementation,
//! suitable for data sets assembled programmatically.

use crate::header::Tag;
use snafu::{ensure, Backtrace, Snafu};
use std::collections::BTreeMap;

/// Error type for assembling an in-memory data set.
#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum DataSetError {
    /// The data offset of an element lies past the end of the backing buffer.
    #[snafu(display(
        "Element {} at offset {} is out of bounds of a buffer with {} bytes",
        tag,
        data_offset,
        buffer_len
    ))]
    ElementOutOfBounds {
        /// the element's tag
        tag: Tag,
        /// the offending data offset
        data_offset: usize,
        /// the length of the backing buffer
        buffer_len: usize,
        /// the error's backtrace
        backtrace: Backtrace,
    },
}

/// Type alias for a result from this module.
pub type Result<T, E = DataSetError> = std::result::Result<T, E>;

/// The position of a data element's value in the backing buffer of a data set.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ElementLocation {
    /// The byte offset of the element's value,
    /// relative to the start of the backing buffer.
    pub data_offset: usize,
}

impl ElementLocation {
    /// Create a new element location.
    #[inline]
    pub fn new(data_offset: usize) -> Self {
        ElementLocation { data_offset }
    }
}

/// A parsed DICOM data set,
/// as seen by consumers of native pixel data.
///
/// All methods return `None` when the attribute or element is absent.
/// An attribute which is present
/// but cannot be represented with the requested type
/// is also reported as `None`.
pub trait DataSetAccess {
    /// Read an attribute as a single unsigned 16-bit integer.
    fn uint16(&self, tag: Tag) -> Option<u16>;

    /// Read an attribute as a string,
    /// which may contain trailing padding.
    fn string(&self, tag: Tag) -> Option<&str>;

    /// Look up the location of a data element's value
    /// in the backing buffer.
    fn element(&self, tag: Tag) -> Option<ElementLocation>;

    /// Obtain the whole backing buffer of the data set.
    fn byte_array(&self) -> &[u8];
}

impl<T> DataSetAccess for &T
where
    T: DataSetAccess + ?Sized,
{
    fn uint16(&self, tag: Tag) -> Option<u16> {
        (**self).uint16(tag)
    }

    fn string(&self, tag: Tag) -> Option<&str> {
        (**self).string(tag)
    }

    fn element(&self, tag: Tag) -> Option<ElementLocation> {
        (**self).element(tag)
    }

    fn byte_array(&self) -> &[u8] {
        (**self).byte_array()
    }
}

impl<T> DataSetAccess for Box<T>
where
    T: DataSetAccess + ?Sized,
{
    fn uint16(&self, tag: Tag) -> Option<u16> {
        (**self).uint16(tag)
    }

    fn string(&self, tag: Tag) -> Option<&str> {
        (**self).string(tag)
    }

    fn element(&self, tag: Tag) -> Option<ElementLocation> {
        (**self).element(tag)
    }

    fn byte_array(&self) -> &[u8] {
        (**self).byte_array()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum AttributeValue {
    U16(u16),
    Str(String),
}

/// An owned data set held entirely in memory.
///
/// Attributes are kept in typed form
/// next to the backing buffer where element values live.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InMemDataSet {
    attributes: BTreeMap<Tag, AttributeValue>,
    elements: BTreeMap<Tag, ElementLocation>,
    bytes: Vec<u8>,
}

impl InMemDataSet {
    /// Create a data set with no attributes over the given backing buffer.
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        InMemDataSet {
            attributes: BTreeMap::new(),
            elements: BTreeMap::new(),
            bytes: bytes.into(),
        }
    }

    /// Insert an unsigned 16-bit attribute,
    /// returning whether an attribute with the same tag was replaced.
    pub fn put_u16(&mut self, tag: Tag, value: u16) -> bool {
        self.attributes
            .insert(tag, AttributeValue::U16(value))
            .is_some()
    }

    /// Insert a textual attribute,
    /// returning whether an attribute with the same tag was replaced.
    pub fn put_str(&mut self, tag: Tag, value: impl Into<String>) -> bool {
        self.attributes
            .insert(tag, AttributeValue::Str(value.into()))
            .is_some()
    }

    /// Register the location of an element's value in the backing buffer.
    ///
    /// Fails if the data offset lies past the end of the buffer.
    pub fn put_element(&mut self, tag: Tag, location: ElementLocation) -> Result<()> {
        let buffer_len = self.bytes.len();
        ensure!(
            location.data_offset <= buffer_len,
            ElementOutOfBoundsSnafu {
                tag,
                data_offset: location.data_offset,
                buffer_len,
            }
        );
        self.elements.insert(tag, location);
        Ok(())
    }

    /// Builder form of [`put_u16`](Self::put_u16).
    pub fn with_u16(mut self, tag: Tag, value: u16) -> Self {
        self.put_u16(tag, value);
        self
    }

    /// Builder form of [`put_str`](Self::put_str).
    pub fn with_str(mut self, tag: Tag, value: impl Into<String>) -> Self {
        self.put_str(tag, value);
        self
    }

    /// Builder form of [`put_element`](Self::put_element).
    pub fn with_element(mut self, tag: Tag, data_offset: usize) -> Result<Self> {
        self.put_element(tag, ElementLocation::new(data_offset))?;
        Ok(self)
    }

    /// Remove an attribute or element location by tag,
    /// returning whether anything was removed.
    pub fn remove(&mut self, tag: Tag) -> bool {
        let attribute = self.attributes.remove(&tag).is_some();
        let element = self.elements.remove(&tag).is_some();
        attribute || element
    }

    /// Discard all attributes and retrieve the backing buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl DataSetAccess for InMemDataSet {
    fn uint16(&self, tag: Tag) -> Option<u16> {
        match self.attributes.get(&tag)? {
            AttributeValue::U16(v) => Some(*v),
            AttributeValue::Str(_) => None,
        }
    }

    fn string(&self, tag: Tag) -> Option<&str> {
        match self.attributes.get(&tag)? {
            AttributeValue::Str(s) => Some(s),
            AttributeValue::U16(_) => None,
        }
    }

    fn element(&self, tag: Tag) -> Option<ElementLocation> {
        self.elements.get(&tag).copied()
    }

    fn byte_array(&self) -> &[u8] {
        &self.bytes
    }
}
