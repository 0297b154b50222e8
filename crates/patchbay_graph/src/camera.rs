// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pan/zoom transform between world space and screen space.
//!
//! `world = screen / zoom + offset` and `screen = (world - offset) * zoom`.
//! Hit-testing and frame building both go through this type, so the two can
//! never disagree about where something is.

use egui::{Pos2, Rect, Vec2};

/// Default zoom limits
pub const DEFAULT_MIN_ZOOM: f32 = 0.5;
/// Default zoom limits
pub const DEFAULT_MAX_ZOOM: f32 = 2.0;

/// World-to-screen transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    /// World position shown at the screen origin
    offset: Vec2,
    /// Screen pixels per world unit
    zoom: f32,
    min_zoom: f32,
    max_zoom: f32,
}

impl Camera {
    /// Create a camera at the origin with zoom 1.0, clamped into `[min_zoom, max_zoom]`.
    ///
    /// Returns `None` unless `0 < min_zoom <= max_zoom`.
    pub fn new(min_zoom: f32, max_zoom: f32) -> Option<Self> {
        if !(min_zoom > 0.0 && min_zoom <= max_zoom) {
            return None;
        }
        Some(Self {
            offset: Vec2::ZERO,
            zoom: 1.0_f32.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
        })
    }

    /// World position shown at the screen origin
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Set the world offset directly
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Current zoom
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Zoom limits
    pub fn zoom_range(&self) -> (f32, f32) {
        (self.min_zoom, self.max_zoom)
    }

    /// Convert screen position to world position
    pub fn screen_to_world(&self, screen: Pos2) -> Pos2 {
        Pos2::new(
            screen.x / self.zoom + self.offset.x,
            screen.y / self.zoom + self.offset.y,
        )
    }

    /// Convert world position to screen position
    pub fn world_to_screen(&self, world: Pos2) -> Pos2 {
        Pos2::new(
            (world.x - self.offset.x) * self.zoom,
            (world.y - self.offset.y) * self.zoom,
        )
    }

    /// Convert a world rectangle to screen space
    pub fn world_rect_to_screen(&self, world: Rect) -> Rect {
        Rect::from_min_max(self.world_to_screen(world.min), self.world_to_screen(world.max))
    }

    /// Scale a world length to screen pixels
    pub fn scale(&self, world_length: f32) -> f32 {
        world_length * self.zoom
    }

    /// Set the zoom (clamped), keeping `pivot` (screen space) over the same world point
    pub fn zoom_to(&mut self, new_zoom: f32, pivot: Pos2) {
        let world_before = self.screen_to_world(pivot);
        self.zoom = new_zoom.clamp(self.min_zoom, self.max_zoom);
        self.offset = Vec2::new(
            world_before.x - pivot.x / self.zoom,
            world_before.y - pivot.y / self.zoom,
        );
    }

    /// Multiply the zoom by `factor` around `pivot`
    pub fn zoom_by(&mut self, factor: f32, pivot: Pos2) {
        self.zoom_to(self.zoom * factor, pivot);
    }

    /// Move the view by a screen-space delta. Content follows the pointer.
    pub fn pan_by(&mut self, screen_delta: Vec2) {
        self.offset -= screen_delta / self.zoom;
    }

    /// Back to origin at zoom 1.0
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0_f32.clamp(self.min_zoom, self.max_zoom);
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    fn assert_close(a: Pos2, b: Pos2) {
        assert!((a - b).length() < EPSILON, "{a:?} != {b:?}");
    }

    #[test]
    fn test_identity_at_default() {
        let camera = Camera::default();
        let p = Pos2::new(123.0, -45.0);
        assert_eq!(camera.screen_to_world(p), p);
        assert_eq!(camera.world_to_screen(p), p);
    }

    #[test]
    fn test_round_trip_transform() {
        let mut camera = Camera::default();
        camera.set_offset(Vec2::new(-30.0, 12.0));
        camera.zoom_to(1.7, Pos2::ZERO);
        let p = Pos2::new(250.0, 75.0);
        assert_close(camera.world_to_screen(camera.screen_to_world(p)), p);
    }

    #[test]
    fn test_zoom_keeps_pointer_world_point() {
        let mut camera = Camera::default();
        camera.set_offset(Vec2::new(40.0, -20.0));
        let pointers = [
            Pos2::new(0.0, 0.0),
            Pos2::new(400.0, 300.0),
            Pos2::new(799.0, 12.0),
        ];
        let factors = [1.1, 0.9, 1.5, 0.5, 3.0];

        for pointer in pointers {
            for factor in factors {
                let before = camera.screen_to_world(pointer);
                camera.zoom_by(factor, pointer);
                let after = camera.screen_to_world(pointer);
                assert_close(before, after);
            }
        }
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = Camera::default();
        camera.zoom_by(100.0, Pos2::new(10.0, 10.0));
        assert_eq!(camera.zoom(), DEFAULT_MAX_ZOOM);
        camera.zoom_by(0.0001, Pos2::new(10.0, 10.0));
        assert_eq!(camera.zoom(), DEFAULT_MIN_ZOOM);
    }

    #[test]
    fn test_pan_scaled_by_zoom() {
        let mut camera = Camera::default();
        camera.zoom_to(2.0, Pos2::ZERO);
        let world = Pos2::new(50.0, 50.0);
        let screen_before = camera.world_to_screen(world);

        camera.pan_by(Vec2::new(20.0, -10.0));

        assert_eq!(camera.offset(), Vec2::new(-10.0, 5.0));
        assert_close(
            camera.world_to_screen(world),
            screen_before + Vec2::new(20.0, -10.0),
        );
    }

    #[test]
    fn test_reset() {
        let mut camera = Camera::default();
        camera.pan_by(Vec2::new(5.0, 5.0));
        camera.zoom_to(1.5, Pos2::new(100.0, 100.0));
        camera.reset();
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn test_invalid_zoom_range_refused() {
        assert!(Camera::new(2.0, 1.0).is_none());
        assert!(Camera::new(0.0, 1.0).is_none());
        assert!(Camera::new(f32::NAN, 1.0).is_none());

        let camera = Camera::new(1.5, 3.0).unwrap();
        assert_eq!(camera.zoom(), 1.5);
        assert_eq!(camera.zoom_range(), (1.5, 3.0));
    }
}
