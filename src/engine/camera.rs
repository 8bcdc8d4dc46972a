//! 2D camera and viewport math.
//!
//! The camera is a world-space position plus a zoom factor; the viewport is
//! always centered on the camera. Optional bounds clamp the camera position
//! itself, so every computation downstream sees the clamped value. Camera
//! rotation is not supported.

use crate::math::{Rect, Vec2};

const MIN_ZOOM: f32 = 0.01;

#[derive(Clone, Debug)]
pub struct Camera {
    position: Vec2,
    zoom: f32,
    bounds: Option<Rect>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            zoom: 1.0,
            bounds: None,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the camera, clamped into the configured bounds.
    pub fn set_position(&mut self, position: Vec2) {
        self.position = self.clamp(position);
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.max(MIN_ZOOM);
    }

    /// Restrict the camera position to a world rectangle. The current
    /// position is re-clamped immediately.
    pub fn set_bounds(&mut self, bounds: Option<Rect>) {
        self.bounds = bounds;
        self.position = self.clamp(self.position);
    }

    fn clamp(&self, position: Vec2) -> Vec2 {
        match self.bounds {
            Some(bounds) => Vec2::new(
                position.x.clamp(bounds.x, bounds.x + bounds.width),
                position.y.clamp(bounds.y, bounds.y + bounds.height),
            ),
            None => position,
        }
    }

    /// World rectangle visible through a screen of the given size.
    ///
    /// Dimensions shrink as zoom grows; the rectangle stays centered on the
    /// camera position.
    pub fn viewport(&self, screen_width: f32, screen_height: f32) -> Rect {
        let width = screen_width / self.zoom;
        let height = screen_height / self.zoom;
        Rect::new(
            self.position.x - width * 0.5,
            self.position.y - height * 0.5,
            width,
            height,
        )
    }
}
