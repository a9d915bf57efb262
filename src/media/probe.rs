// SPDX-License-Identifier: MPL-2.0
//! Natural image size from encoded bytes.

use crate::error::{Error, Result};
use crate::reader::ImageDimensions;
use std::io::Cursor;

/// Reads the natural size of an encoded image without decoding its pixels.
///
/// # Errors
///
/// Returns an error if the format is not recognised or the header is malformed.
pub fn probe_dimensions(bytes: &[u8]) -> Result<ImageDimensions> {
    let (width, height) = image_rs::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .into_dimensions()?;
    if width == 0 || height == 0 {
        return Err(Error::Image(format!("degenerate image {width}x{height}")));
    }
    Ok(ImageDimensions::new(width, height))
}
