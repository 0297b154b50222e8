// SPDX-License-Identifier: MIT OR Apache-2.0
//! Draw primitives handed to a rendering backend.
//!
//! A [`Frame`] is an ordered list; later primitives paint over earlier ones.
//! Everything is in screen space, already transformed by the camera.

use egui::{Align2, Color32, Pos2, Rect, Vec2};

/// Connection visual parameters
const BEZIER_CURVATURE: f32 = 50.0;
const BEZIER_SEGMENTS: usize = 24;

/// One thing to paint
#[derive(Debug, Clone, PartialEq)]
pub enum DrawPrimitive {
    /// Filled rectangle
    Rect {
        /// Screen rectangle
        rect: Rect,
        /// Corner radius
        rounding: f32,
        /// Fill color
        color: Color32,
    },
    /// Filled disc
    Circle {
        /// Center
        center: Pos2,
        /// Radius
        radius: f32,
        /// Fill color
        color: Color32,
    },
    /// Line segment
    Line {
        /// Start point
        from: Pos2,
        /// End point
        to: Pos2,
        /// Stroke width
        width: f32,
        /// Stroke color
        color: Color32,
    },
    /// Text anchored at a point
    Label {
        /// Anchor point
        pos: Pos2,
        /// Which part of the text sits on the anchor
        align: Align2,
        /// Text
        text: String,
        /// Font size in pixels
        size: f32,
        /// Text color
        color: Color32,
    },
}

/// Ordered primitives for one frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    primitives: Vec<DrawPrimitive>,
}

impl Frame {
    /// Create an empty frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Primitives in paint order
    pub fn primitives(&self) -> &[DrawPrimitive] {
        &self.primitives
    }

    /// Take the primitives out of the frame
    pub fn into_primitives(self) -> Vec<DrawPrimitive> {
        self.primitives
    }

    /// Number of primitives
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    /// Whether nothing is drawn
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Append a filled rectangle
    pub fn rect(&mut self, rect: Rect, rounding: f32, color: Color32) {
        self.primitives.push(DrawPrimitive::Rect {
            rect,
            rounding,
            color,
        });
    }

    /// Append a filled disc
    pub fn circle(&mut self, center: Pos2, radius: f32, color: Color32) {
        self.primitives.push(DrawPrimitive::Circle {
            center,
            radius,
            color,
        });
    }

    /// Append a line segment
    pub fn line(&mut self, from: Pos2, to: Pos2, width: f32, color: Color32) {
        self.primitives.push(DrawPrimitive::Line {
            from,
            to,
            width,
            color,
        });
    }

    /// Append a text label
    pub fn label(
        &mut self,
        pos: Pos2,
        align: Align2,
        text: impl Into<String>,
        size: f32,
        color: Color32,
    ) {
        self.primitives.push(DrawPrimitive::Label {
            pos,
            align,
            text: text.into(),
            size,
            color,
        });
    }

    /// Append the four edges of a rectangle
    pub fn rect_outline(&mut self, rect: Rect, width: f32, color: Color32) {
        let corners = [rect.left_top(), rect.right_top(), rect.right_bottom(), rect.left_bottom()];
        for i in 0..corners.len() {
            self.line(corners[i], corners[(i + 1) % corners.len()], width, color);
        }
    }

    /// Append a horizontal-tangent bezier curve between two ports as line segments
    pub fn connection_curve(
        &mut self,
        from: Pos2,
        to: Pos2,
        zoom: f32,
        width: f32,
        color: Color32,
    ) {
        let distance = (to.x - from.x).abs();
        let curvature = (BEZIER_CURVATURE * zoom).min(distance * 0.5);

        let ctrl1 = from + Vec2::new(curvature, 0.0);
        let ctrl2 = to - Vec2::new(curvature, 0.0);

        let points = bezier_points(from, ctrl1, ctrl2, to, BEZIER_SEGMENTS);
        for pair in points.windows(2) {
            self.line(pair[0], pair[1], width, color);
        }
    }
}

/// Generate points along a cubic bezier curve
fn bezier_points(p0: Pos2, p1: Pos2, p2: Pos2, p3: Pos2, segments: usize) -> Vec<Pos2> {
    let mut points = Vec::with_capacity(segments + 1);
    for i in 0..=segments {
        let t = i as f32 / segments as f32;
        let mt = 1.0 - t;

        let a = mt * mt * mt;
        let b = 3.0 * mt * mt * t;
        let c = 3.0 * mt * t * t;
        let d = t * t * t;

        points.push(Pos2::new(
            a * p0.x + b * p1.x + c * p2.x + d * p3.x,
            a * p0.y + b * p1.y + c * p2.y + d * p3.y,
        ));
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_endpoints() {
        let mut frame = Frame::new();
        let from = Pos2::new(10.0, 20.0);
        let to = Pos2::new(210.0, 80.0);
        frame.connection_curve(from, to, 1.0, 2.0, Color32::WHITE);

        assert_eq!(frame.len(), BEZIER_SEGMENTS);
        let Some(DrawPrimitive::Line { from: first, .. }) = frame.primitives().first() else {
            panic!("expected a line");
        };
        let Some(DrawPrimitive::Line { to: last, .. }) = frame.primitives().last() else {
            panic!("expected a line");
        };
        assert_eq!(*first, from);
        assert!((*last - to).length() < 1e-3);
    }

    #[test]
    fn test_outline_is_closed() {
        let mut frame = Frame::new();
        let rect = Rect::from_min_max(Pos2::ZERO, Pos2::new(10.0, 5.0));
        frame.rect_outline(rect, 1.0, Color32::WHITE);

        assert_eq!(frame.len(), 4);
        let lines: Vec<_> = frame
            .primitives()
            .iter()
            .map(|p| match p {
                DrawPrimitive::Line { from, to, .. } => (*from, *to),
                other => panic!("unexpected {other:?}"),
            })
            .collect();
        for i in 0..4 {
            assert_eq!(lines[i].1, lines[(i + 1) % 4].0);
        }
    }
}
