// SPDX-License-Identifier: MIT OR Apache-2.0
//! Node definitions for the graph.

use crate::port::{port_anchor, Port, PortDirection};
use egui::{Pos2, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a node.
///
/// Graph operations address nodes by dense index; the ID survives the
/// renumbering that happens when an earlier node is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub Uuid);

impl NodeId {
    /// Create a new random node ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

/// A node instance in the graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Stable ID
    pub id: NodeId,
    /// Display name
    pub name: String,
    /// Top-left corner in world space
    position: [f32; 2],
    /// Width and height in world units
    size: [f32; 2],
    /// Height of the title bar used for dragging
    header_height: f32,
    /// Input ports
    inputs: Vec<Port>,
    /// Output ports
    outputs: Vec<Port>,
    /// Custom header color (optional)
    pub color: Option<[u8; 3]>,
}

impl Node {
    /// Create a node without ports
    pub fn new(name: impl Into<String>, position: Pos2, size: Vec2, header_height: f32) -> Self {
        Self {
            id: NodeId::new(),
            name: name.into(),
            position: [position.x, position.y],
            size: [size.x, size.y],
            header_height,
            inputs: Vec::new(),
            outputs: Vec::new(),
            color: None,
        }
    }

    /// Add an input port
    pub fn with_input(mut self, name: impl Into<String>) -> Self {
        self.inputs.push(Port::input(name));
        self.refresh_anchors();
        self
    }

    /// Add an output port
    pub fn with_output(mut self, name: impl Into<String>) -> Self {
        self.outputs.push(Port::output(name));
        self.refresh_anchors();
        self
    }

    /// Add `inputs` input ports and `outputs` output ports with generated names
    pub fn with_port_counts(mut self, inputs: usize, outputs: usize) -> Self {
        self.inputs.extend((0..inputs).map(|i| Port::input(format!("in {i}"))));
        self.outputs.extend((0..outputs).map(|i| Port::output(format!("out {i}"))));
        self.refresh_anchors();
        self
    }

    /// Top-left corner in world space
    pub fn position(&self) -> Pos2 {
        Pos2::new(self.position[0], self.position[1])
    }

    /// Move the node. Port anchors follow immediately.
    pub fn set_position(&mut self, position: Pos2) {
        self.position = [position.x, position.y];
        self.refresh_anchors();
    }

    /// Node size
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.size[0], self.size[1])
    }

    /// Header height
    pub fn header_height(&self) -> f32 {
        self.header_height
    }

    /// Bounding box in world space
    pub fn rect(&self) -> Rect {
        Rect::from_min_size(self.position(), self.size())
    }

    /// Title bar in world space
    pub fn header_rect(&self) -> Rect {
        let header = self.header_height.min(self.size[1]);
        Rect::from_min_size(self.position(), Vec2::new(self.size[0], header))
    }

    /// Input ports
    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    /// Output ports
    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Ports on one side
    pub fn ports(&self, direction: PortDirection) -> &[Port] {
        match direction {
            PortDirection::Input => &self.inputs,
            PortDirection::Output => &self.outputs,
        }
    }

    /// Get a port by direction and index
    pub fn port(&self, direction: PortDirection, index: usize) -> Option<&Port> {
        self.ports(direction).get(index)
    }

    /// World-space anchor of a port
    pub fn anchor(&self, direction: PortDirection, index: usize) -> Option<Pos2> {
        self.port(direction, index).map(Port::anchor)
    }

    /// Recompute every port anchor from position, size and header height.
    pub(crate) fn refresh_anchors(&mut self) {
        let rect = self.rect();
        let header = self.header_height;
        let count = self.inputs.len();
        for (i, port) in self.inputs.iter_mut().enumerate() {
            port.anchor = port_anchor(rect, header, PortDirection::Input, i, count);
        }
        let count = self.outputs.len();
        for (i, port) in self.outputs.iter_mut().enumerate() {
            port.anchor = port_anchor(rect, header, PortDirection::Output, i, count);
        }
    }
}
