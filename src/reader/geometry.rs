// SPDX-License-Identifier: MPL-2.0
//! Image geometry: fitting a page image inside the reader viewport.
//!
//! Pure functions over plain value types, with no dependency on any
//! rendering toolkit.

/// Natural pixel size of a decoded page image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

impl ImageDimensions {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width divided by height, or `None` for a degenerate image.
    #[must_use]
    pub fn aspect_ratio(self) -> Option<f32> {
        if self.width == 0 || self.height == 0 {
            return None;
        }
        Some(self.width as f32 / self.height as f32)
    }
}

/// Space available to the page image, in logical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport for a window, minus the vertical space taken by reader chrome.
    ///
    /// The height may end up zero or negative for very small windows; layout
    /// is then skipped by [`fit_to_container`].
    #[must_use]
    pub fn from_window(width: f32, height: f32, vertical_padding: f32) -> Self {
        Self {
            width,
            height: height - vertical_padding,
        }
    }

    fn is_usable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

/// On-screen size of a page image before zoom is applied.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DisplaySize {
    pub width: f32,
    pub height: f32,
}

/// Fits an image inside a container, preserving its aspect ratio.
///
/// The image is first fitted to the container width. If the resulting height
/// overflows, it is refitted to the container height instead. The result never
/// exceeds the container on either axis and the image is never cropped.
///
/// Returns `None` when the container has no usable area or the image has an
/// unknown (zero) dimension; callers skip layout in that case.
#[must_use]
pub fn fit_to_container(natural: ImageDimensions, container: Viewport) -> Option<DisplaySize> {
    if !container.is_usable() {
        return None;
    }
    let aspect_ratio = natural.aspect_ratio()?;

    let mut width = container.width;
    let mut height = container.width / aspect_ratio;

    if height > container.height {
        height = container.height;
        width = container.height * aspect_ratio;
    }

    Some(DisplaySize { width, height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn tall_image_is_fitted_to_height() {
        let size = fit_to_container(ImageDimensions::new(800, 1200), Viewport::new(1000.0, 600.0))
            .expect("layout");
        assert_abs_diff_eq!(size.height, 600.0);
        assert_abs_diff_eq!(size.width, 400.0, epsilon = 1e-3);
    }

    #[test]
    fn wide_image_is_fitted_to_width() {
        let size = fit_to_container(ImageDimensions::new(2000, 500), Viewport::new(1000.0, 600.0))
            .expect("layout");
        assert_abs_diff_eq!(size.width, 1000.0);
        assert_abs_diff_eq!(size.height, 250.0, epsilon = 1e-3);
    }

    #[test]
    fn small_image_is_scaled_up_to_fill_one_axis() {
        let size = fit_to_container(ImageDimensions::new(100, 100), Viewport::new(500.0, 300.0))
            .expect("layout");
        assert_abs_diff_eq!(size.width, 300.0, epsilon = 1e-3);
        assert_abs_diff_eq!(size.height, 300.0, epsilon = 1e-3);
    }

    #[test]
    fn fitted_size_stays_inside_container_and_keeps_aspect_ratio() {
        let naturals = [(1, 1), (3, 4000), (4000, 3), (1080, 1920), (1920, 1080), (777, 1333)];
        let containers = [(1.0, 1.0), (320.0, 480.0), (1920.0, 980.0), (50.0, 4000.0)];

        for &(nw, nh) in &naturals {
            for &(cw, ch) in &containers {
                let natural = ImageDimensions::new(nw, nh);
                let size = fit_to_container(natural, Viewport::new(cw, ch)).expect("layout");

                assert!(size.width <= cw + 1e-3, "{nw}x{nh} in {cw}x{ch}");
                assert!(size.height <= ch + 1e-3, "{nw}x{nh} in {cw}x{ch}");
                assert_relative_eq!(
                    size.width / size.height,
                    nw as f32 / nh as f32,
                    max_relative = 1e-4
                );
            }
        }
    }

    #[test]
    fn unusable_container_skips_layout() {
        let natural = ImageDimensions::new(800, 1200);
        assert!(fit_to_container(natural, Viewport::new(1000.0, 0.0)).is_none());
        assert!(fit_to_container(natural, Viewport::new(1000.0, -50.0)).is_none());
        assert!(fit_to_container(natural, Viewport::new(0.0, 600.0)).is_none());
        assert!(fit_to_container(natural, Viewport::new(f32::NAN, 600.0)).is_none());
    }

    #[test]
    fn unknown_dimensions_skip_layout() {
        let container = Viewport::new(1000.0, 600.0);
        assert!(fit_to_container(ImageDimensions::new(0, 1200), container).is_none());
        assert!(fit_to_container(ImageDimensions::new(800, 0), container).is_none());
    }

    #[test]
    fn from_window_subtracts_vertical_padding() {
        let viewport = Viewport::from_window(1280.0, 800.0, 100.0);
        assert_abs_diff_eq!(viewport.width, 1280.0);
        assert_abs_diff_eq!(viewport.height, 700.0);

        let cramped = Viewport::from_window(1280.0, 80.0, 100.0);
        assert!(fit_to_container(ImageDimensions::new(10, 10), cramped).is_none());
    }
}
