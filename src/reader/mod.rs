// SPDX-License-Identifier: MPL-2.0
//! Chapter reader core.
//!
//! ```text
//! session (orchestrator)
//!     ├── navigation - Page/chapter state machine
//!     ├── preload    - Per-page load tracking
//!     ├── zoom_pan   - Wheel zoom and clamped drag
//!     ├── geometry   - Fit page image to viewport
//!     ├── input      - Key to command mapping
//!     └── error      - User-facing reader errors
//! ```
//!
//! Nothing here depends on a UI toolkit or a runtime; the composition layer
//! feeds events in and performs the returned effects.

pub mod error;
pub mod geometry;
pub mod input;
pub mod navigation;
pub mod preload;
pub mod session;
pub mod zoom_pan;

pub use error::{ReaderError, EMPTY_CHAPTER_MESSAGE};
pub use geometry::{fit_to_container, DisplaySize, ImageDimensions, Viewport};
pub use input::{map_key, Key, ReaderCommand};
pub use navigation::{NavigationContext, NavigationState, Navigator, Transition};
pub use preload::{PageLoadState, PageLoadTracker};
pub use session::{
    ChapterContent, Effect, ImageRequest, LoadTicket, Message, ReaderSession, SessionOptions,
};
pub use zoom_pan::{PanBounds, PanOffset, Point, ZoomPanController, ZoomPanState};
