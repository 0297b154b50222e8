// SPDX-License-Identifier: MIT OR Apache-2.0
//! Graph data structure containing nodes and connections.

use crate::connection::Connection;
use crate::node::Node;
use crate::port::{PortDirection, PortRef};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Capacity limits enforced on insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphLimits {
    /// Maximum number of nodes
    pub max_nodes: usize,
    /// Maximum number of connections
    pub max_connections: usize,
}

impl Default for GraphLimits {
    fn default() -> Self {
        Self {
            max_nodes: 1005,
            max_connections: 50,
        }
    }
}

/// A node graph.
///
/// Nodes are addressed by dense index. Connections store node indices, so
/// every structural change keeps them in step with the node list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
    /// Graph name
    pub name: String,
    /// Nodes, in draw order (last is topmost)
    nodes: Vec<Node>,
    /// Connections between nodes
    connections: Vec<Connection>,
    /// Capacity limits
    #[serde(skip)]
    limits: GraphLimits,
}

impl Graph {
    /// Create a new empty graph
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
            limits: GraphLimits::default(),
        }
    }

    /// Set the capacity limits
    pub fn with_limits(mut self, limits: GraphLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Capacity limits
    pub fn limits(&self) -> GraphLimits {
        self.limits
    }

    /// Replace the capacity limits. Existing content is kept even if it exceeds them.
    pub fn set_limits(&mut self, limits: GraphLimits) {
        self.limits = limits;
    }

    /// Add a node to the graph, returning its index
    pub fn add_node(&mut self, mut node: Node) -> Result<usize> {
        if self.nodes.len() >= self.limits.max_nodes {
            return Err(GraphError::NodeCapacity {
                max: self.limits.max_nodes,
            });
        }
        node.refresh_anchors();
        self.nodes.push(node);
        let index = self.nodes.len() - 1;
        tracing::debug!(index, "node added");
        Ok(index)
    }

    /// Remove a node and every connection touching it.
    ///
    /// Nodes after `index` move down one slot and connection indices are
    /// rewritten to match, so the graph is consistent when this returns.
    pub fn remove_node(&mut self, index: usize) -> Result<Node> {
        self.check_node(index)?;

        let before = self.connections.len();
        self.connections.retain(|c| !c.involves_node(index));
        for connection in &mut self.connections {
            connection.shift_after_removal(index);
        }
        let node = self.nodes.remove(index);

        tracing::debug!(
            index,
            dropped_connections = before - self.connections.len(),
            "node removed"
        );
        Ok(node)
    }

    /// Get a node by index
    pub fn node(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Get a mutable node by index
    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    /// Get all nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Get the number of nodes
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether a connection from `from` (output) to `to` (input) would be accepted
    pub fn can_connect(&self, from: PortRef, to: PortRef) -> Result<()> {
        self.check_port(PortDirection::Output, from)?;
        self.check_port(PortDirection::Input, to)?;

        if from.node == to.node {
            return Err(GraphError::SelfConnection);
        }
        if self.connection_into(to).is_some() {
            return Err(GraphError::InputOccupied(to));
        }
        if self.connections.len() >= self.limits.max_connections {
            return Err(GraphError::ConnectionCapacity {
                max: self.limits.max_connections,
            });
        }
        Ok(())
    }

    /// Add a connection between ports, returning its index
    pub fn connect(&mut self, from: PortRef, to: PortRef) -> Result<usize> {
        self.can_connect(from, to)?;
        self.connections.push(Connection::new(from, to));
        tracing::debug!(?from, ?to, "connected");
        Ok(self.connections.len() - 1)
    }

    /// Remove a connection by index
    pub fn disconnect(&mut self, index: usize) -> Option<Connection> {
        if index < self.connections.len() {
            Some(self.connections.remove(index))
        } else {
            None
        }
    }

    /// Remove every connection touching a port, returning how many were removed
    pub fn disconnect_port(&mut self, direction: PortDirection, port: PortRef) -> usize {
        let before = self.connections.len();
        self.connections.retain(|c| !c.touches(direction, port));
        let removed = before - self.connections.len();
        if removed > 0 {
            tracing::debug!(?direction, ?port, removed, "port disconnected");
        }
        removed
    }

    /// Get all connections
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Get the number of connections
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// The connection feeding an input port, if any
    pub fn connection_into(&self, to: PortRef) -> Option<&Connection> {
        self.connections.iter().find(|c| c.to == to)
    }

    /// Get connections from a specific output port
    pub fn connections_from(&self, from: PortRef) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.from == from)
    }

    /// Get connections involving a node
    pub fn connections_for_node(&self, node: usize) -> impl Iterator<Item = &Connection> {
        self.connections.iter().filter(move |c| c.involves_node(node))
    }

    /// Whether any connection ends at the port
    pub fn is_port_connected(&self, direction: PortDirection, port: PortRef) -> bool {
        self.connections.iter().any(|c| c.touches(direction, port))
    }

    /// Check the node and connection counts against `limits`
    pub fn check_capacity(&self, limits: GraphLimits) -> Result<()> {
        if self.nodes.len() > limits.max_nodes {
            return Err(GraphError::NodeCapacity {
                max: limits.max_nodes,
            });
        }
        if self.connections.len() > limits.max_connections {
            return Err(GraphError::ConnectionCapacity {
                max: limits.max_connections,
            });
        }
        Ok(())
    }

    /// Verify every port sits on the side its direction names, every
    /// connection refers to existing ports without a self-loop, and no input
    /// has more than one incoming connection.
    ///
    /// Capacity is checked separately by [`Graph::check_capacity`].
    pub fn validate(&self) -> Result<()> {
        for (index, node) in self.nodes.iter().enumerate() {
            for direction in [PortDirection::Input, PortDirection::Output] {
                let misplaced = node
                    .ports(direction)
                    .iter()
                    .position(|p| p.direction != direction);
                if let Some(port) = misplaced {
                    return Err(GraphError::MisplacedPort(direction, PortRef::new(index, port)));
                }
            }
        }
        for (i, connection) in self.connections.iter().enumerate() {
            self.check_port(PortDirection::Output, connection.from)?;
            self.check_port(PortDirection::Input, connection.to)?;
            if connection.from.node == connection.to.node {
                return Err(GraphError::SelfConnection);
            }
            if self.connections[..i].iter().any(|c| c.to == connection.to) {
                return Err(GraphError::InputOccupied(connection.to));
            }
        }
        Ok(())
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> std::result::Result<String, DocumentError> {
        let config = ron::ser::PrettyConfig::default().struct_names(true);
        Ok(ron::ser::to_string_pretty(self, config)?)
    }

    /// Deserialize from RON format. Port anchors are rebuilt and connections validated.
    pub fn from_ron(s: &str) -> std::result::Result<Self, DocumentError> {
        let mut graph: Graph = ron::from_str(s)?;
        for node in &mut graph.nodes {
            node.refresh_anchors();
        }
        graph.validate()?;
        Ok(graph)
    }

    /// Save graph to file
    pub fn save(&self, path: &Path) -> std::result::Result<(), DocumentError> {
        std::fs::write(path, self.to_ron()?)?;
        tracing::info!("Saved graph to {}", path.display());
        Ok(())
    }

    /// Load graph from file
    pub fn load(path: &Path) -> std::result::Result<Self, DocumentError> {
        let contents = std::fs::read_to_string(path)?;
        let graph = Self::from_ron(&contents)?;
        tracing::info!("Loaded graph from {}", path.display());
        Ok(graph)
    }

    fn check_node(&self, index: usize) -> Result<&Node> {
        self.nodes.get(index).ok_or(GraphError::NodeOutOfRange {
            index,
            count: self.nodes.len(),
        })
    }

    fn check_port(&self, direction: PortDirection, port: PortRef) -> Result<()> {
        let node = self.check_node(port.node)?;
        if node.port(direction, port.port).is_none() {
            return Err(GraphError::PortOutOfRange(direction, port));
        }
        Ok(())
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new("Untitled")
    }
}

/// Rejected graph edit
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Node limit reached
    #[error("Node limit reached ({max})")]
    NodeCapacity {
        /// Configured maximum
        max: usize,
    },

    /// Connection limit reached
    #[error("Connection limit reached ({max})")]
    ConnectionCapacity {
        /// Configured maximum
        max: usize,
    },

    /// Self-loop not allowed
    #[error("Node cannot connect to itself")]
    SelfConnection,

    /// Input port is already connected
    #[error("Input port already connected: {0:?}")]
    InputOccupied(PortRef),

    /// Node index does not exist
    #[error("Node index {index} out of range ({count} nodes)")]
    NodeOutOfRange {
        /// Requested index
        index: usize,
        /// Current node count
        count: usize,
    },

    /// Port index does not exist on the node
    #[error("Port not found: {0:?} {1:?}")]
    PortOutOfRange(PortDirection, PortRef),

    /// Port listed among the node's ports of one direction but declared as the other
    #[error("Port {1:?} is listed as {0:?} but declared otherwise")]
    MisplacedPort(PortDirection, PortRef),
}

/// Result type for graph edits
pub type Result<T> = std::result::Result<T, GraphError>;

/// Error when saving or loading a graph document
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Document parsed but describes an invalid graph
    #[error("Invalid graph: {0}")]
    Invalid(#[from] GraphError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Pos2, Vec2};

    fn node_at(x: f32, y: f32) -> Node {
        Node::new("Node", Pos2::new(x, y), Vec2::new(100.0, 100.0), 20.0).with_port_counts(1, 1)
    }

    fn two_node_graph() -> Graph {
        let mut graph = Graph::new("Test");
        graph.add_node(node_at(100.0, 100.0)).unwrap();
        graph.add_node(node_at(300.0, 100.0)).unwrap();
        graph
    }

    fn assert_consistent(graph: &Graph) {
        for connection in graph.connections() {
            assert!(connection.from.node < graph.node_count());
            assert!(connection.to.node < graph.node_count());
        }
        graph.validate().unwrap();
    }

    #[test]
    fn test_connect_and_reject_occupied_input() {
        let mut graph = two_node_graph();
        graph.connect(PortRef::new(0, 0), PortRef::new(1, 0)).unwrap();
        assert_eq!(graph.connection_count(), 1);

        let err = graph.connect(PortRef::new(0, 0), PortRef::new(1, 0)).unwrap_err();
        assert_eq!(err, GraphError::InputOccupied(PortRef::new(1, 0)));
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_second_source_into_occupied_input_rejected() {
        let mut graph = two_node_graph();
        graph.add_node(node_at(500.0, 100.0)).unwrap();
        graph.connect(PortRef::new(0, 0), PortRef::new(1, 0)).unwrap();

        let err = graph.connect(PortRef::new(2, 0), PortRef::new(1, 0)).unwrap_err();
        assert!(matches!(err, GraphError::InputOccupied(_)));
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_self_connection_rejected() {
        let mut graph = two_node_graph();
        let err = graph.connect(PortRef::new(0, 0), PortRef::new(0, 0)).unwrap_err();
        assert_eq!(err, GraphError::SelfConnection);
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_missing_port_rejected() {
        let mut graph = two_node_graph();
        let err = graph.connect(PortRef::new(0, 3), PortRef::new(1, 0)).unwrap_err();
        assert_eq!(
            err,
            GraphError::PortOutOfRange(PortDirection::Output, PortRef::new(0, 3))
        );
        let err = graph.connect(PortRef::new(0, 0), PortRef::new(7, 0)).unwrap_err();
        assert_eq!(err, GraphError::NodeOutOfRange { index: 7, count: 2 });
    }

    #[test]
    fn test_node_capacity() {
        let mut graph = Graph::new("Small").with_limits(GraphLimits {
            max_nodes: 2,
            max_connections: 1,
        });
        graph.add_node(node_at(0.0, 0.0)).unwrap();
        graph.add_node(node_at(200.0, 0.0)).unwrap();

        let err = graph.add_node(node_at(400.0, 0.0)).unwrap_err();
        assert_eq!(err, GraphError::NodeCapacity { max: 2 });
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_connection_capacity() {
        let mut graph = Graph::new("Small").with_limits(GraphLimits {
            max_nodes: 10,
            max_connections: 1,
        });
        for i in 0..3 {
            graph.add_node(node_at(i as f32 * 200.0, 0.0)).unwrap();
        }
        graph.connect(PortRef::new(0, 0), PortRef::new(1, 0)).unwrap();

        let err = graph.connect(PortRef::new(1, 0), PortRef::new(2, 0)).unwrap_err();
        assert_eq!(err, GraphError::ConnectionCapacity { max: 1 });
        assert_eq!(graph.connection_count(), 1);
    }

    #[test]
    fn test_remove_node_drops_and_renumbers() {
        let mut graph = two_node_graph();
        graph.add_node(node_at(500.0, 100.0)).unwrap();
        graph.connect(PortRef::new(0, 0), PortRef::new(1, 0)).unwrap();
        graph.connect(PortRef::new(1, 0), PortRef::new(2, 0)).unwrap();
        let second_id = graph.node(1).unwrap().id;

        graph.remove_node(0).unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.node(0).unwrap().id, second_id);
        assert_eq!(
            graph.connections(),
            &[Connection::new(PortRef::new(0, 0), PortRef::new(1, 0))]
        );
        assert_consistent(&graph);
    }

    #[test]
    fn test_remove_every_node_in_turn() {
        for removed in 0..4 {
            let mut graph = Graph::new("Chain");
            for i in 0..4 {
                graph.add_node(node_at(i as f32 * 200.0, 0.0)).unwrap();
            }
            for i in 0..3 {
                graph.connect(PortRef::new(i, 0), PortRef::new(i + 1, 0)).unwrap();
            }

            graph.remove_node(removed).unwrap();
            assert_eq!(graph.node_count(), 3);
            assert_consistent(&graph);
        }
    }

    #[test]
    fn test_remove_out_of_range() {
        let mut graph = two_node_graph();
        assert!(graph.remove_node(2).is_err());
        assert_eq!(graph.node_count(), 2);
    }

    #[test]
    fn test_disconnect_port() {
        let mut graph = two_node_graph();
        graph.add_node(node_at(300.0, 300.0)).unwrap();
        graph.connect(PortRef::new(0, 0), PortRef::new(1, 0)).unwrap();
        graph.connect(PortRef::new(0, 0), PortRef::new(2, 0)).unwrap();

        assert_eq!(graph.disconnect_port(PortDirection::Input, PortRef::new(1, 0)), 1);
        assert_eq!(graph.connection_count(), 1);
        assert_eq!(graph.disconnect_port(PortDirection::Output, PortRef::new(0, 0)), 1);
        assert_eq!(graph.connection_count(), 0);
    }

    #[test]
    fn test_serialization() {
        let mut graph = two_node_graph();
        graph.connect(PortRef::new(0, 0), PortRef::new(1, 0)).unwrap();

        let ron_str = graph.to_ron().unwrap();
        let loaded = Graph::from_ron(&ron_str).unwrap();

        assert_eq!(loaded.name, "Test");
        assert_eq!(loaded.connections(), graph.connections());
        let original = graph.node(1).unwrap();
        let restored = loaded.node(1).unwrap();
        assert_eq!(restored.id, original.id);
        assert_eq!(
            restored.anchor(PortDirection::Input, 0),
            original.anchor(PortDirection::Input, 0)
        );
    }

    #[test]
    fn test_invalid_document_rejected() {
        let mut graph = two_node_graph();
        graph.connect(PortRef::new(0, 0), PortRef::new(1, 0)).unwrap();
        graph.connections.push(Connection::new(PortRef::new(1, 0), PortRef::new(1, 0)));

        let ron_str = graph.to_ron().unwrap();
        assert!(matches!(
            Graph::from_ron(&ron_str),
            Err(DocumentError::Invalid(GraphError::SelfConnection))
        ));
    }

    #[test]
    fn test_misplaced_port_rejected() {
        let ron_str = two_node_graph()
            .to_ron()
            .unwrap()
            .replacen("direction: Input", "direction: Output", 1);
        assert!(matches!(
            Graph::from_ron(&ron_str),
            Err(DocumentError::Invalid(GraphError::MisplacedPort(
                PortDirection::Input,
                PortRef { node: 0, port: 0 }
            )))
        ));
    }

    #[test]
    fn test_check_capacity() {
        let mut graph = two_node_graph();
        graph.connect(PortRef::new(0, 0), PortRef::new(1, 0)).unwrap();

        assert_eq!(graph.check_capacity(GraphLimits::default()), Ok(()));
        assert_eq!(
            graph.check_capacity(GraphLimits {
                max_nodes: 1,
                max_connections: 5,
            }),
            Err(GraphError::NodeCapacity { max: 1 })
        );
        assert_eq!(
            graph.check_capacity(GraphLimits {
                max_nodes: 5,
                max_connections: 0,
            }),
            Err(GraphError::ConnectionCapacity { max: 0 })
        );
    }
}
