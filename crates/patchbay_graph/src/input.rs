// SPDX-License-Identifier: MIT OR Apache-2.0
//! Backend-independent input events.
//!
//! Positions are screen space relative to the canvas origin.

use egui::Pos2;

/// Mouse button
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Left button: select, drag, connect
    Primary,
    /// Right button: create nodes, cut connections
    Secondary,
    /// Middle button: pan
    Middle,
}

/// Keys the editor reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Delete selected node
    Delete,
    /// Delete selected node
    Backspace,
    /// Cancel the current gesture
    Escape,
    /// Toggle grid snapping
    G,
    /// Reset the camera
    Home,
}

/// One input event
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Button pressed at a position
    PointerDown(PointerButton, Pos2),
    /// Button released at a position
    PointerUp(PointerButton, Pos2),
    /// Pointer moved
    PointerMove(Pos2),
    /// Wheel scrolled, in notches. Positive zooms in.
    Scroll(f32),
    /// Key pressed
    KeyDown(Key),
}
