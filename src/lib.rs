// SPDX-License-Identifier: MPL-2.0
//! `manga_lens` is the core of a manga reader client.
//!
//! It browses a remote catalog, downloads chapter page images and drives a
//! reading session (page navigation, preloading, zoom and pan) while keeping
//! preferences and reading history on disk.
//!
//! The crate is split along the same lines as the binary uses it:
//!
//! - [`reader`]: UI-agnostic reading session state machine
//! - [`domain`]: Plain value types shared across layers
//! - [`application`]: Ports implemented by adapters
//! - [`infrastructure`]: MangaDex client and query cache
//! - [`media`]: Page image download, probing and caching
//! - [`app`]: Settings, directories and the preference store

pub mod app;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod media;
pub mod reader;

#[cfg(test)]
pub(crate) mod test_utils;
