// SPDX-License-Identifier: MPL-2.0
//! Page image handling for the CLI renderer.
//!
//! - [`fetch`]: Streaming download of a page image
//! - [`probe`]: Natural dimensions read from the image header
//! - [`prefetch`]: Byte-bounded LRU cache of downloaded pages

pub mod fetch;
pub mod prefetch;
pub mod probe;

pub use fetch::{fetch_page_image, PageImage, MAX_PAGE_BYTES};
pub use prefetch::{PageCacheConfig, PageCacheStats, PageImageCache};
pub use probe::probe_dimensions;
