//! Utility module for fetching key attributes from a DICOM data set.

use dicom_frame_core::{tags, DataSetAccess, ElementLocation, Tag};
use snafu::{ensure, Backtrace, OptionExt, Snafu};

#[derive(Debug, Snafu)]
#[non_exhaustive]
pub enum GetAttributeError {
    #[snafu(display("Missing required attribute `{}`", name))]
    MissingAttribute {
        name: &'static str,
        backtrace: Backtrace,
    },

    #[snafu(display("Semantically invalid value `{}` for attribute `{}`", value, name))]
    InvalidValue {
        name: &'static str,
        value: String,
        backtrace: Backtrace,
    },
}

pub type Result<T, E = GetAttributeError> = std::result::Result<T, E>;

/// Get the Columns from the DICOM data set
pub fn cols<O: DataSetAccess + ?Sized>(obj: &O) -> Result<u16> {
    retrieve_required_dimension(obj, tags::COLUMNS, "Columns")
}

/// Get the Rows from the DICOM data set
pub fn rows<O: DataSetAccess + ?Sized>(obj: &O) -> Result<u16> {
    retrieve_required_dimension(obj, tags::ROWS, "Rows")
}

/// Get the SamplesPerPixel from the DICOM data set
pub fn samples_per_pixel<O: DataSetAccess + ?Sized>(obj: &O) -> Result<u16> {
    retrieve_required_dimension(obj, tags::SAMPLES_PER_PIXEL, "SamplesPerPixel")
}

/// Get the BitsAllocated from the DICOM data set
pub fn bits_allocated<O: DataSetAccess + ?Sized>(obj: &O) -> Result<u16> {
    retrieve_required_u16(obj, tags::BITS_ALLOCATED, "BitsAllocated")
}

/// Get the PhotometricInterpretation from the DICOM data set
pub fn photometric_interpretation<O>(obj: &O) -> Result<PhotometricInterpretation>
where
    O: DataSetAccess + ?Sized,
{
    let value = obj
        .string(tags::PHOTOMETRIC_INTERPRETATION)
        .context(MissingAttributeSnafu {
            name: "PhotometricInterpretation",
        })?;
    Ok(PhotometricInterpretation::from(trim_padding(value)))
}

/// Get the NumberOfFrames from the DICOM data set,
/// returning 1 if it is not present
pub fn number_of_frames<O: DataSetAccess + ?Sized>(obj: &O) -> Result<u32> {
    let value = match obj.string(tags::NUMBER_OF_FRAMES) {
        Some(value) => trim_padding(value),
        None => return Ok(1),
    };

    let integer: i32 = value.parse().ok().context(InvalidValueSnafu {
        name: "NumberOfFrames",
        value,
    })?;

    ensure!(
        integer > 0,
        InvalidValueSnafu {
            name: "NumberOfFrames",
            value: integer.to_string(),
        }
    );

    Ok(integer as u32)
}

/// Get the location of the pixel data element in the backing buffer.
///
/// _Pixel Data_ is looked up first,
/// followed by _Float Pixel Data_ and _Double Float Pixel Data_.
pub fn pixel_data<O: DataSetAccess + ?Sized>(obj: &O) -> Result<ElementLocation> {
    obj.element(tags::PIXEL_DATA)
        .or_else(|| obj.element(tags::FLOAT_PIXEL_DATA))
        .or_else(|| obj.element(tags::DOUBLE_FLOAT_PIXEL_DATA))
        .context(MissingAttributeSnafu { name: "PixelData" })
}

#[inline]
fn retrieve_required_u16<O>(obj: &O, tag: Tag, name: &'static str) -> Result<u16>
where
    O: DataSetAccess + ?Sized,
{
    obj.uint16(tag).context(MissingAttributeSnafu { name })
}

#[inline]
fn retrieve_required_dimension<O>(obj: &O, tag: Tag, name: &'static str) -> Result<u16>
where
    O: DataSetAccess + ?Sized,
{
    let value = retrieve_required_u16(obj, tag, name)?;
    ensure!(
        value > 0,
        InvalidValueSnafu {
            name,
            value: value.to_string(),
        }
    );
    Ok(value)
}

/// Code strings are padded to an even length with spaces,
/// and some writers pad with NUL instead.
#[inline]
fn trim_padding(value: &str) -> &str {
    value.trim_matches(|c: char| c == ' ' || c == '\0')
}

/// An interpreted representation of the DICOM _Photometric Interpretation_ attribute.
#[derive(Debug, Clone, Eq, Hash, PartialEq)]
pub enum PhotometricInterpretation {
    /// MONOCHROME1
    Monochrome1,
    /// MONOCHROME2
    Monochrome2,
    /// PALETTE COLOR
    PaletteColor,
    /// RGB
    Rgb,
    /// YBR_FULL
    YbrFull,
    /// YBR_FULL_422: chrominance subsampled horizontally by a factor of 2
    YbrFull422,
    /// any other value, kept verbatim
    Other(String),
}

impl PhotometricInterpretation {
    /// Obtain the DICOM code string of this photometric interpretation.
    pub fn as_str(&self) -> &str {
        match self {
            PhotometricInterpretation::Monochrome1 => "MONOCHROME1",
            PhotometricInterpretation::Monochrome2 => "MONOCHROME2",
            PhotometricInterpretation::PaletteColor => "PALETTE COLOR",
            PhotometricInterpretation::Rgb => "RGB",
            PhotometricInterpretation::YbrFull => "YBR_FULL",
            PhotometricInterpretation::YbrFull422 => "YBR_FULL_422",
            PhotometricInterpretation::Other(s) => s,
        }
    }
}

impl From<&str> for PhotometricInterpretation {
    fn from(s: &str) -> Self {
        match s {
            "MONOCHROME1" => PhotometricInterpretation::Monochrome1,
            "MONOCHROME2" => PhotometricInterpretation::Monochrome2,
            "PALETTE COLOR" => PhotometricInterpretation::PaletteColor,
            "RGB" => PhotometricInterpretation::Rgb,
            "YBR_FULL" => PhotometricInterpretation::YbrFull,
            "YBR_FULL_422" => PhotometricInterpretation::YbrFull422,
            other => PhotometricInterpretation::Other(other.to_string()),
        }
    }
}

impl std::fmt::Display for PhotometricInterpretation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
