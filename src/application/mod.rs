// SPDX-License-Identifier: MPL-2.0
//! Application layer - ports between the reader core and the outside world.
//!
//! - [`port`]: Trait definitions (interfaces) for dependency inversion
//!
//! # Dependency Rule
//!
//! - Application layer depends on domain layer (uses domain types)
//! - Infrastructure layer implements application layer ports
//! - The reader core and the CLI depend on ports, never on adapters directly

pub mod port;
