// SPDX-License-Identifier: MPL-2.0
//! Application wiring: settings file, directories and the preference store.
//!
//! The reader core in [`crate::reader`] never touches the filesystem; it is
//! handed a [`store::SharedStore`] and the relevant [`config::ReaderConfig`]
//! values by whoever composes the application.

pub mod config;
pub mod paths;
pub mod store;

pub use config::Config;
pub use store::{CborFileBackend, MemoryBackend, ReaderStore, SharedStore};
