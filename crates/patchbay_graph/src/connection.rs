// SPDX-License-Identifier: MIT OR Apache-2.0
//! Connection (edge) definitions for the graph.

use crate::port::{PortDirection, PortRef};
use serde::{Deserialize, Serialize};

/// A directed connection from an output port to an input port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Connection {
    /// Source node and output port
    pub from: PortRef,
    /// Target node and input port
    pub to: PortRef,
}

impl Connection {
    /// Create a new connection
    pub fn new(from: PortRef, to: PortRef) -> Self {
        Self { from, to }
    }

    /// Check if this connection involves a specific node
    pub fn involves_node(&self, node: usize) -> bool {
        self.from.node == node || self.to.node == node
    }

    /// Check if this connection ends at the given port
    pub fn touches(&self, direction: PortDirection, port: PortRef) -> bool {
        match direction {
            PortDirection::Output => self.from == port,
            PortDirection::Input => self.to == port,
        }
    }

    /// Shift node indices after the node at `removed` has been taken out.
    pub(crate) fn shift_after_removal(&mut self, removed: usize) {
        if self.from.node > removed {
            self.from.node -= 1;
        }
        if self.to.node > removed {
            self.to.node -= 1;
        }
    }
}
