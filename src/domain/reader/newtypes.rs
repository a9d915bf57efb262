// SPDX-License-Identifier: MPL-2.0
//! Reader newtypes.
//!
//! Type-safe wrappers for reader values, guaranteed to stay within their
//! valid ranges so call sites never clamp by hand.

// =============================================================================
// Zoom Bounds
// =============================================================================

/// Zoom factor bounds (0.5× to 3.0×).
pub mod zoom_bounds {
    /// Minimum zoom factor.
    pub const MIN_FACTOR: f32 = 0.5;
    /// Maximum zoom factor.
    pub const MAX_FACTOR: f32 = 3.0;
    /// Identity zoom factor.
    pub const DEFAULT_FACTOR: f32 = 1.0;
    /// Zoom change per unit of wheel delta.
    pub const DEFAULT_SENSITIVITY: f32 = 0.002;
    /// Largest accepted zoom change per unit of wheel delta.
    pub const MAX_SENSITIVITY: f32 = 0.05;
}

// =============================================================================
// ZoomFactor
// =============================================================================

/// Zoom factor, guaranteed to be within valid range (0.5×–3.0×).
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct ZoomFactor(f32);

impl ZoomFactor {
    /// Identity zoom (1.0×).
    pub const IDENTITY: Self = Self(zoom_bounds::DEFAULT_FACTOR);

    /// Creates a new zoom factor, clamping the value to the valid range.
    ///
    /// Infinities clamp like any other out-of-range value; NaN falls back
    /// to the identity factor.
    #[must_use]
    pub fn new(factor: f32) -> Self {
        if factor.is_nan() {
            return Self::IDENTITY;
        }
        Self(factor.clamp(zoom_bounds::MIN_FACTOR, zoom_bounds::MAX_FACTOR))
    }

    /// Returns the raw multiplier.
    #[must_use]
    pub fn value(self) -> f32 {
        self.0
    }

    /// Returns the zoom as a rounded percentage (e.g., 1.5 → 150).
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn as_percent(self) -> u32 {
        // Range is [50, 300], the cast cannot truncate.
        (self.0 * 100.0).round() as u32
    }

    /// Returns whether the image is magnified (panning is allowed).
    #[must_use]
    pub fn is_magnified(self) -> bool {
        self.0 > zoom_bounds::DEFAULT_FACTOR
    }

    /// Applies a wheel delta: scrolling down (positive delta) zooms out.
    #[must_use]
    pub fn apply_wheel_delta(self, delta_y: f32, sensitivity: f32) -> Self {
        if !delta_y.is_finite() {
            return self;
        }
        Self::new(self.0 - delta_y * sensitivity)
    }
}

impl Default for ZoomFactor {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// =============================================================================
// Preload Bounds
// =============================================================================

/// Single-page preload window bounds (pages, inclusive of the current one).
pub mod preload_bounds {
    /// Minimum window: the current page only.
    pub const MIN: u32 = 1;
    /// Maximum window.
    pub const MAX: u32 = 8;
    /// Default window: the current page and the next one.
    pub const DEFAULT: u32 = 2;
}

// =============================================================================
// PreloadCount
// =============================================================================

/// Number of pages requested when a page is displayed in single mode,
/// counting the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreloadCount(u32);

impl PreloadCount {
    /// Creates a new preload count, clamping to valid range.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Self(value.clamp(preload_bounds::MIN, preload_bounds::MAX))
    }

    /// Returns the value as u32.
    #[must_use]
    pub fn value(self) -> u32 {
        self.0
    }
}

impl Default for PreloadCount {
    fn default() -> Self {
        Self(preload_bounds::DEFAULT)
    }
}

// =============================================================================
// Tests
// =============================================================================
