//! Screen-space geometry: points, and the pan/zoom transform that maps
//! pointer positions onto canvas pixels.
//!
//! The transform is presentation only; nothing here touches pixel data.

use serde::{Deserialize, Serialize};

/// A position in screen units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 20.0;

/// Pan and zoom of the canvas view.
///
/// The canvas is shown as a square of `display_size × zoom` screen units
/// whose top-left corner sits at `pan`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub pan: Point,
    pub zoom: f64,
    pub display_size: f64,
}

impl ViewTransform {
    pub fn new(display_size: f64) -> Self {
        Self { pan: Point::default(), zoom: 1.0, display_size }
    }

    /// Screen units covered by one canvas pixel.
    pub fn pixel_scale(&self, grid_size: u32) -> f64 {
        self.display_size * self.zoom / grid_size.max(1) as f64
    }

    /// Canvas pixel under a screen point. May lie outside the canvas.
    pub fn screen_to_pixel(&self, point: Point, grid_size: u32) -> (i64, i64) {
        let scale = self.pixel_scale(grid_size);
        (
            ((point.x - self.pan.x) / scale).floor() as i64,
            ((point.y - self.pan.y) / scale).floor() as i64,
        )
    }

    /// Screen point at the center of a canvas pixel.
    pub fn pixel_to_screen(&self, x: i64, y: i64, grid_size: u32) -> Point {
        let scale = self.pixel_scale(grid_size);
        Point::new(
            self.pan.x + (x as f64 + 0.5) * scale,
            self.pan.y + (y as f64 + 0.5) * scale,
        )
    }

    /// Whole-pixel offset for a screen-space drag measured from its start.
    pub fn drag_offset(&self, start: Point, current: Point, grid_size: u32) -> (i64, i64) {
        let scale = self.pixel_scale(grid_size);
        (
            ((current.x - start.x) / scale).round() as i64,
            ((current.y - start.y) / scale).round() as i64,
        )
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan.x += dx;
        self.pan.y += dy;
    }

    /// Wheel zoom: scrolling down shrinks by 10%, up grows by 10%.
    pub fn wheel(&mut self, delta_y: f64) {
        let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
        self.zoom = (self.zoom * factor).clamp(MIN_ZOOM, MAX_ZOOM);
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(512.0)
    }
}
