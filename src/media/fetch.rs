// SPDX-License-Identifier: MPL-2.0
//! Page image download.

use super::probe::probe_dimensions;
use crate::error::{Error, Result};
use crate::reader::ImageDimensions;
use futures_util::StreamExt;
use std::sync::Arc;

/// Largest page image accepted (in bytes).
pub const MAX_PAGE_BYTES: usize = 32 * 1024 * 1024;

/// Encoded bytes of a page image and its natural size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    pub bytes: Arc<[u8]>,
    pub dimensions: ImageDimensions,
}

impl PageImage {
    /// Wraps encoded bytes, reading the natural size from the image header.
    ///
    /// # Errors
    ///
    /// Returns an error if the format is not recognised or the header is malformed.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let dimensions = probe_dimensions(&bytes)?;
        Ok(Self {
            bytes: bytes.into(),
            dimensions,
        })
    }

    #[must_use]
    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }
}

/// Downloads a page image and probes its size.
///
/// # Errors
///
/// Returns an error on network failure, a non-success status, a body larger
/// than [`MAX_PAGE_BYTES`], or an unreadable image.
pub async fn fetch_page_image(client: &reqwest::Client, url: &str) -> Result<PageImage> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Io(e.to_string()))?;

    if !response.status().is_success() {
        return Err(Error::Io(format!("HTTP status: {}", response.status())));
    }

    let expected = response
        .content_length()
        .and_then(|len| usize::try_from(len).ok())
        .unwrap_or(0);
    if expected > MAX_PAGE_BYTES {
        return Err(Error::Image(format!("page too large ({expected} bytes)")));
    }

    let mut bytes = Vec::with_capacity(expected);
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Io(e.to_string()))?;
        if bytes.len() + chunk.len() > MAX_PAGE_BYTES {
            return Err(Error::Image(format!(
                "page exceeds {MAX_PAGE_BYTES} bytes"
            )));
        }
        bytes.extend_from_slice(&chunk);
    }

    tokio::task::spawn_blocking(move || PageImage::from_bytes(bytes))
        .await
        .unwrap_or_else(|e| Err(Error::Io(format!("Probe task failed: {e}"))))
}
