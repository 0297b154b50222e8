// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node graph editing model for Patchbay.
//!
//! This crate holds everything the editor knows about a graph and how the
//! user manipulates it:
//! - Nodes with input/output ports whose anchors follow the node
//! - Connections from output ports to input ports
//! - Pan/zoom camera shared by hit-testing and drawing
//! - Gesture handling for dragging, connecting and panning
//!
//! ## Architecture
//!
//! The model never talks to a window or a GPU. A frontend converts its input
//! into [`InputEvent`]s, feeds them to [`GraphEditorState::handle_event`], and
//! paints the [`Frame`] returned by [`GraphEditorState::frame`].

pub mod node;
pub mod port;
pub mod connection;
pub mod graph;
pub mod camera;
pub mod config;
pub mod input;
pub mod draw;
pub mod editor;

pub use node::{Node, NodeId};
pub use port::{Port, PortDirection, PortRef};
pub use connection::Connection;
pub use graph::{DocumentError, Graph, GraphError, GraphLimits};
pub use camera::Camera;
pub use config::{ConfigError, EditorConfig};
pub use input::{InputEvent, Key, PointerButton};
pub use draw::{DrawPrimitive, Frame};
pub use editor::{GraphEditorState, Hit, InteractionMode};
