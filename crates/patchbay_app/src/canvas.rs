// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph canvas panel.
//!
//! Translates egui input into editor events, paints the editor's frame with
//! the egui painter, and handles the save/load shortcuts.

use egui::{FontId, Pos2, Stroke, Vec2};
use patchbay_graph::{
    ConfigError, DocumentError, DrawPrimitive, EditorConfig, Frame, Graph, GraphEditorState,
    InputEvent, Key, PointerButton,
};
use std::path::PathBuf;

/// Graph document file name
pub const GRAPH_FILE_NAME: &str = "graph.ron";

/// egui points per mouse-wheel notch
const POINTS_PER_NOTCH: f32 = 50.0;

/// The node graph canvas
pub struct Canvas {
    editor: GraphEditorState,
    document_path: PathBuf,
}

impl Canvas {
    /// Create a canvas with an empty graph
    pub fn new(config: EditorConfig, document_path: PathBuf) -> Result<Self, ConfigError> {
        Ok(Self {
            editor: GraphEditorState::new(config)?,
            document_path,
        })
    }

    /// Render the canvas and process this frame's input
    pub fn ui(&mut self, ui: &mut egui::Ui) {
        let rect = ui.available_rect_before_wrap();
        let response = ui.allocate_rect(rect, egui::Sense::click_and_drag());

        let (events, scroll) = ui.input(|i| (i.events.clone(), i.raw_scroll_delta.y));
        for event in &events {
            if self.handle_shortcut(event) {
                continue;
            }
            let Some(translated) = translate_event(event, rect.min) else {
                continue;
            };
            // Presses outside the canvas belong to other widgets; releases
            // always go through so gestures can finish.
            if let InputEvent::PointerDown(_, pos) = translated {
                if !rect.contains(pos + rect.min.to_vec2()) {
                    continue;
                }
            }
            self.dispatch(translated);
        }

        if scroll != 0.0 && response.hovered() {
            self.dispatch(InputEvent::Scroll(scroll / POINTS_PER_NOTCH));
        }

        let frame = self.editor.frame(rect.size());
        paint_frame(&ui.painter_at(rect), rect.min.to_vec2(), &frame);
    }

    fn dispatch(&mut self, event: InputEvent) {
        if let Err(err) = self.editor.handle_event(event) {
            tracing::warn!("Edit rejected: {err}");
        }
    }

    fn handle_shortcut(&mut self, event: &egui::Event) -> bool {
        let egui::Event::Key {
            key,
            pressed: true,
            repeat: false,
            modifiers,
            ..
        } = event
        else {
            return false;
        };
        if !modifiers.command {
            return false;
        }

        match key {
            egui::Key::S => {
                if let Err(err) = self.save() {
                    tracing::warn!("Save failed: {err}");
                }
                true
            }
            egui::Key::O => {
                if let Err(err) = self.load() {
                    tracing::warn!("Load failed: {err}");
                }
                true
            }
            _ => false,
        }
    }

    /// Save the graph to the document path
    pub fn save(&self) -> Result<(), DocumentError> {
        self.editor.graph().save(&self.document_path)
    }

    /// Replace the graph with the document on disk.
    ///
    /// A document over the configured limits is rejected and the current
    /// graph is kept.
    pub fn load(&mut self) -> Result<(), DocumentError> {
        let graph = Graph::load(&self.document_path)?;
        self.editor.replace_graph(graph)?;
        Ok(())
    }
}

/// Convert an egui event into an editor event, relative to the canvas origin
pub fn translate_event(event: &egui::Event, origin: Pos2) -> Option<InputEvent> {
    let local = |pos: Pos2| Pos2::ZERO + (pos - origin);
    match event {
        egui::Event::PointerMoved(pos) => Some(InputEvent::PointerMove(local(*pos))),
        egui::Event::PointerButton {
            pos,
            button,
            pressed,
            ..
        } => {
            let button = translate_button(*button)?;
            if *pressed {
                Some(InputEvent::PointerDown(button, local(*pos)))
            } else {
                Some(InputEvent::PointerUp(button, local(*pos)))
            }
        }
        egui::Event::Key {
            key,
            pressed: true,
            repeat: false,
            modifiers,
            ..
        } if !modifiers.command => translate_key(*key).map(InputEvent::KeyDown),
        _ => None,
    }
}

/// Map an egui mouse button
pub fn translate_button(button: egui::PointerButton) -> Option<PointerButton> {
    match button {
        egui::PointerButton::Primary => Some(PointerButton::Primary),
        egui::PointerButton::Secondary => Some(PointerButton::Secondary),
        egui::PointerButton::Middle => Some(PointerButton::Middle),
        _ => None,
    }
}

/// Map an egui key
pub fn translate_key(key: egui::Key) -> Option<Key> {
    match key {
        egui::Key::Delete => Some(Key::Delete),
        egui::Key::Backspace => Some(Key::Backspace),
        egui::Key::Escape => Some(Key::Escape),
        egui::Key::G => Some(Key::G),
        egui::Key::Home => Some(Key::Home),
        _ => None,
    }
}

/// Paint a frame, shifting canvas coordinates by `offset`
pub fn paint_frame(painter: &egui::Painter, offset: Vec2, frame: &Frame) {
    for primitive in frame.primitives() {
        match primitive {
            DrawPrimitive::Rect {
                rect,
                rounding,
                color,
            } => {
                painter.rect_filled(rect.translate(offset), *rounding, *color);
            }
            DrawPrimitive::Circle {
                center,
                radius,
                color,
            } => {
                painter.circle_filled(*center + offset, *radius, *color);
            }
            DrawPrimitive::Line {
                from,
                to,
                width,
                color,
            } => {
                painter.line_segment([*from + offset, *to + offset], Stroke::new(*width, *color));
            }
            DrawPrimitive::Label {
                pos,
                align,
                text,
                size,
                color,
            } => {
                painter.text(*pos + offset, *align, text, FontId::proportional(*size), *color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons() {
        assert_eq!(
            translate_button(egui::PointerButton::Primary),
            Some(PointerButton::Primary)
        );
        assert_eq!(
            translate_button(egui::PointerButton::Middle),
            Some(PointerButton::Middle)
        );
        assert_eq!(translate_button(egui::PointerButton::Extra1), None);
    }

    #[test]
    fn test_keys() {
        assert_eq!(translate_key(egui::Key::Delete), Some(Key::Delete));
        assert_eq!(translate_key(egui::Key::G), Some(Key::G));
        assert_eq!(translate_key(egui::Key::A), None);
    }

    #[test]
    fn test_events_are_canvas_relative() {
        let origin = Pos2::new(10.0, 30.0);

        let moved = translate_event(&egui::Event::PointerMoved(Pos2::new(110.0, 130.0)), origin);
        assert_eq!(moved, Some(InputEvent::PointerMove(Pos2::new(100.0, 100.0))));

        let pressed = translate_event(
            &egui::Event::PointerButton {
                pos: Pos2::new(15.0, 35.0),
                button: egui::PointerButton::Secondary,
                pressed: true,
                modifiers: egui::Modifiers::NONE,
            },
            origin,
        );
        assert_eq!(
            pressed,
            Some(InputEvent::PointerDown(PointerButton::Secondary, Pos2::new(5.0, 5.0)))
        );

        let released = translate_event(
            &egui::Event::PointerButton {
                pos: Pos2::new(15.0, 35.0),
                button: egui::PointerButton::Primary,
                pressed: false,
                modifiers: egui::Modifiers::NONE,
            },
            origin,
        );
        assert_eq!(
            released,
            Some(InputEvent::PointerUp(PointerButton::Primary, Pos2::new(5.0, 5.0)))
        );
    }

    #[test]
    fn test_unrelated_events_ignored() {
        assert_eq!(translate_event(&egui::Event::PointerGone, Pos2::ZERO), None);
        assert_eq!(
            translate_event(&egui::Event::Text("x".into()), Pos2::ZERO),
            None
        );
    }

    #[test]
    fn test_save_and_load_document() {
        let path = std::env::temp_dir().join(format!(
            "patchbay-canvas-{}.ron",
            std::process::id()
        ));
        let mut canvas = Canvas::new(EditorConfig::default(), path.clone()).unwrap();
        canvas
            .editor
            .handle_event(InputEvent::PointerDown(PointerButton::Secondary, Pos2::new(40.0, 40.0)))
            .unwrap();
        canvas.save().unwrap();

        canvas.editor.replace_graph(Graph::default()).unwrap();
        assert_eq!(canvas.editor.graph().node_count(), 0);

        canvas.load().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(canvas.editor.graph().node_count(), 1);
        assert_eq!(canvas.editor.graph().node(0).unwrap().name, "Node 1");
    }

    fn key_event(key: egui::Key, repeat: bool) -> egui::Event {
        egui::Event::Key {
            key,
            physical_key: None,
            pressed: true,
            repeat,
            modifiers: egui::Modifiers::NONE,
        }
    }

    #[test]
    fn test_key_repeat_ignored() {
        assert_eq!(
            translate_event(&key_event(egui::Key::G, false), Pos2::ZERO),
            Some(InputEvent::KeyDown(Key::G))
        );
        assert_eq!(translate_event(&key_event(egui::Key::G, true), Pos2::ZERO), None);
    }

    #[test]
    fn test_oversized_document_rejected() {
        let path = std::env::temp_dir().join(format!(
            "patchbay-oversized-{}.ron",
            std::process::id()
        ));
        let mut big = Canvas::new(EditorConfig::default(), path.clone()).unwrap();
        for i in 0..3 {
            let press = Pos2::new(40.0 + i as f32 * 150.0, 40.0);
            big.dispatch(InputEvent::PointerDown(PointerButton::Secondary, press));
        }
        big.save().unwrap();

        let config = EditorConfig {
            max_nodes: 2,
            ..EditorConfig::default()
        };
        let mut small = Canvas::new(config, path.clone()).unwrap();
        let result = small.load();
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(DocumentError::Invalid(_))));
        assert_eq!(small.editor.graph().node_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = EditorConfig {
            min_zoom: 3.0,
            max_zoom: 1.0,
            ..EditorConfig::default()
        };
        assert!(Canvas::new(config, PathBuf::from(GRAPH_FILE_NAME)).is_err());
    }
}
