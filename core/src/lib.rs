#![crate_type = "lib"]
#![deny(trivial_numeric_casts, unsafe_code, unstable_features)]
#![warn(
    missing_debug_implementations,
    missing_docs,
    unused_qualifications,
    unused_import_braces
)]

//! This is the core library for native DICOM frame extraction,
//! containing the concepts which a parsed DICOM data set
//! must provide for its pixel data to be located.
//!
//! The current structure of this crate is as follows:
//!
//! - [`header`] contains the DICOM attribute tag type.
//! - [`tags`] maps the attribute aliases relevant to
//!   native pixel data to their DICOM tags.
//! - [`dataset`] describes typed access to a parsed data set
//!   and its backing byte buffer,
//!   and provides an in-memory implementation.
//!
//! [`dataset`]: ./dataset/index.html
//! [`header`]: ./header/index.html
//! [`tags`]: ./tags/index.html

pub mod dataset;
pub mod header;
pub mod tags;

pub use dataset::{DataSetAccess, DataSetError, ElementLocation, InMemDataSet};
pub use header::{ElementNumber, GroupNumber, Tag};

// re-export crates that are part of the public API
pub use snafu;
