// SPDX-License-Identifier: MPL-2.0
//! Zoom and pan state for the single-page reader.
//!
//! The zoom factor is driven by wheel deltas and always stays within
//! [`zoom_bounds`](crate::domain::reader::newtypes::zoom_bounds). Panning is
//! only possible while the page is magnified, and the pan offset is clamped
//! per axis so the scaled image never slides past its own edge.

use super::geometry::{DisplaySize, Viewport};
use crate::domain::reader::newtypes::zoom_bounds;
use crate::domain::reader::ZoomFactor;

/// Pointer position in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Translation of the page image from its centered position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanOffset {
    pub x: f32,
    pub y: f32,
}

impl PanOffset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Zoom factor and pan offset of the displayed page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ZoomPanState {
    pub zoom: ZoomFactor,
    pub position: PanOffset,
}

impl ZoomPanState {
    /// Unzoomed, centered.
    pub const IDENTITY: Self = Self {
        zoom: ZoomFactor::IDENTITY,
        position: PanOffset::ZERO,
    };

    #[must_use]
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }
}

/// Maximum pan distance from center on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanBounds {
    pub x: f32,
    pub y: f32,
}

impl PanBounds {
    /// Bounds for a page of `display` size zoomed by `zoom` inside `container`.
    ///
    /// An axis on which the scaled image fits inside the container has a zero
    /// bound. Both bounds are zero when the page is not magnified.
    #[must_use]
    pub fn compute(display: DisplaySize, container: Viewport, zoom: ZoomFactor) -> Self {
        if !zoom.is_magnified() {
            return Self::default();
        }
        let axis = |display: f32, container: f32| -> f32 {
            let overflow = (display * zoom.value() - container) / 2.0;
            if overflow.is_finite() {
                overflow.max(0.0)
            } else {
                0.0
            }
        };
        Self {
            x: axis(display.width, container.width),
            y: axis(display.height, container.height),
        }
    }

    /// Clamps each axis of `offset` to `[-bound, bound]` independently.
    #[must_use]
    pub fn clamp(self, offset: PanOffset) -> PanOffset {
        PanOffset {
            x: offset.x.clamp(-self.x, self.x),
            y: offset.y.clamp(-self.y, self.y),
        }
    }
}

/// Zoom/pan controller for the current page.
#[derive(Debug, Clone)]
pub struct ZoomPanController {
    state: ZoomPanState,
    /// Pointer minus position at drag start; `Some` while dragging.
    drag_anchor: Option<PanOffset>,
    display: Option<DisplaySize>,
    container: Viewport,
    sensitivity: f32,
    reclamp_on_zoom: bool,
}

impl Default for ZoomPanController {
    fn default() -> Self {
        Self::new(zoom_bounds::DEFAULT_SENSITIVITY, true)
    }
}

impl ZoomPanController {
    #[must_use]
    pub fn new(sensitivity: f32, reclamp_on_zoom: bool) -> Self {
        Self {
            state: ZoomPanState::IDENTITY,
            drag_anchor: None,
            display: None,
            container: Viewport::default(),
            sensitivity,
            reclamp_on_zoom,
        }
    }

    #[must_use]
    pub fn state(&self) -> ZoomPanState {
        self.state
    }

    #[must_use]
    pub fn zoom(&self) -> ZoomFactor {
        self.state.zoom
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    /// Resets to identity and cancels any drag. Layout is kept.
    pub fn reset(&mut self) {
        self.state = ZoomPanState::IDENTITY;
        self.drag_anchor = None;
    }

    /// Updates the page layout that pan bounds are derived from.
    pub fn set_layout(&mut self, display: Option<DisplaySize>, container: Viewport) {
        self.display = display;
        self.container = container;
        if self.reclamp_on_zoom {
            self.reclamp();
        }
    }

    /// Current pan bounds, zero when no layout is known.
    #[must_use]
    pub fn bounds(&self) -> PanBounds {
        self.display
            .map(|display| PanBounds::compute(display, self.container, self.state.zoom))
            .unwrap_or_default()
    }

    /// Applies a wheel delta to the zoom factor.
    ///
    /// Returns `true` if the zoom changed.
    pub fn apply_zoom_delta(&mut self, delta_y: f32) -> bool {
        let zoom = self.state.zoom.apply_wheel_delta(delta_y, self.sensitivity);
        if zoom == self.state.zoom {
            return false;
        }
        self.state.zoom = zoom;
        if !zoom.is_magnified() {
            self.drag_anchor = None;
        }
        if self.reclamp_on_zoom {
            self.reclamp();
        }
        true
    }

    /// Starts a drag at `pointer`.
    ///
    /// Ignored unless the page is magnified. Returns `true` if a drag started.
    pub fn begin_drag(&mut self, pointer: Point) -> bool {
        if !self.state.zoom.is_magnified() {
            return false;
        }
        self.drag_anchor = Some(PanOffset {
            x: pointer.x - self.state.position.x,
            y: pointer.y - self.state.position.y,
        });
        true
    }

    /// Moves the drag to `pointer`, clamping the result to the pan bounds.
    ///
    /// Returns `true` if the position changed.
    pub fn drag_to(&mut self, pointer: Point) -> bool {
        let Some(anchor) = self.drag_anchor else {
            return false;
        };
        if !self.state.zoom.is_magnified() || self.display.is_none() {
            return false;
        }
        let candidate = PanOffset {
            x: pointer.x - anchor.x,
            y: pointer.y - anchor.y,
        };
        if !candidate.x.is_finite() || !candidate.y.is_finite() {
            return false;
        }
        let position = self.bounds().clamp(candidate);
        let changed = position != self.state.position;
        self.state.position = position;
        changed
    }

    /// Stops tracking the pointer. The position is left as is.
    pub fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    fn reclamp(&mut self) {
        self.state.position = self.bounds().clamp(self.state.position);
    }
}
