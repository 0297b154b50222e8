// SPDX-License-Identifier: MIT OR Apache-2.0
//! Port definitions for node inputs/outputs.

use egui::{Pos2, Rect};
use serde::{Deserialize, Serialize};

/// Port direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// Input port (left edge)
    Input,
    /// Output port (right edge)
    Output,
}

impl PortDirection {
    /// The direction a connection must have on its other end
    pub fn opposite(self) -> Self {
        match self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
        }
    }
}

/// Address of one port: dense node index plus port index within one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    /// Node index in the graph
    pub node: usize,
    /// Port index within the node's inputs or outputs
    pub port: usize,
}

impl PortRef {
    /// Create a new port reference
    pub fn new(node: usize, port: usize) -> Self {
        Self { node, port }
    }
}

/// A port on a node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    /// Port name
    pub name: String,
    /// Port direction
    pub direction: PortDirection,
    /// World-space anchor, owned by the node and refreshed on every move
    #[serde(skip)]
    pub(crate) anchor: Pos2,
}

impl Port {
    /// Create a new input port
    pub fn input(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Input,
            anchor: Pos2::ZERO,
        }
    }

    /// Create a new output port
    pub fn output(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            direction: PortDirection::Output,
            anchor: Pos2::ZERO,
        }
    }

    /// World-space anchor point
    pub fn anchor(&self) -> Pos2 {
        self.anchor
    }
}

/// Anchor of port `index` out of `count` ports on one side of a node.
///
/// Inputs sit on the left edge and outputs on the right edge. Ports are spread
/// evenly over the body below the header.
pub fn port_anchor(
    node_rect: Rect,
    header_height: f32,
    direction: PortDirection,
    index: usize,
    count: usize,
) -> Pos2 {
    let body_top = node_rect.top() + header_height;
    let body_height = (node_rect.height() - header_height).max(0.0);
    let y = body_top + body_height * (index as f32 + 1.0) / (count as f32 + 1.0);
    let x = match direction {
        PortDirection::Input => node_rect.left(),
        PortDirection::Output => node_rect.right(),
    };
    Pos2::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Vec2;

    #[test]
    fn test_single_port_is_centered_in_body() {
        let rect = Rect::from_min_size(Pos2::new(100.0, 100.0), Vec2::new(100.0, 100.0));
        let input = port_anchor(rect, 20.0, PortDirection::Input, 0, 1);
        let output = port_anchor(rect, 20.0, PortDirection::Output, 0, 1);
        assert_eq!(input, Pos2::new(100.0, 160.0));
        assert_eq!(output, Pos2::new(200.0, 160.0));
    }

    #[test]
    fn test_ports_spread_evenly() {
        let rect = Rect::from_min_size(Pos2::ZERO, Vec2::new(80.0, 120.0));
        let first = port_anchor(rect, 30.0, PortDirection::Input, 0, 2);
        let second = port_anchor(rect, 30.0, PortDirection::Input, 1, 2);
        assert_eq!(first.y, 60.0);
        assert_eq!(second.y, 90.0);
    }

    #[test]
    fn test_opposite_direction() {
        assert_eq!(PortDirection::Input.opposite(), PortDirection::Output);
        assert_eq!(PortDirection::Output.opposite(), PortDirection::Input);
    }
}
