// SPDX-License-Identifier: MIT OR Apache-2.0
//! Interactive editing state for a node graph.
//!
//! [`GraphEditorState`] owns the graph, the camera and the current gesture.
//! It consumes [`InputEvent`]s one at a time and builds a [`Frame`] of
//! screen-space primitives on request.
//!
//! ## Gestures
//!
//! ```text
//! Idle -> DraggingNode           (primary down on a node header)
//! Idle -> ConnectingFromOutput   (primary down on an output port)
//! Idle -> Panning                (middle down)
//!
//! DraggingNode -> Idle           (primary up)
//! ConnectingFromOutput -> Idle   (primary up; connects when over a free input)
//! Panning -> Idle                (middle up)
//! Any -> Idle                    (Escape)
//! DraggingNode, ConnectingFromOutput -> Idle   (deleting a node)
//! ```

use crate::camera::Camera;
use crate::config::{ConfigError, EditorConfig};
use crate::draw::Frame;
use crate::graph::{Graph, GraphError, Result};
use crate::input::{InputEvent, Key, PointerButton};
use crate::node::Node;
use crate::port::{PortDirection, PortRef};
use egui::{Align2, Color32, Pos2, Rect, Vec2};

const NODE_ROUNDING: f32 = 6.0;
const CONNECTION_THICKNESS: f32 = 2.5;
const TITLE_FONT_SIZE: f32 = 12.0;
const PORT_FONT_SIZE: f32 = 10.0;
const PORT_LABEL_PADDING: f32 = 10.0;
const STATUS_FONT_SIZE: f32 = 11.0;
/// Grid lines closer than this many pixels are not drawn
const MIN_GRID_SPACING_PX: f32 = 6.0;
/// Upper bound on grid lines per axis
const MAX_GRID_LINES: usize = 1024;

const GRID_COLOR: Color32 = Color32::from_rgba_premultiplied(40, 40, 40, 100);
const BODY_COLOR: Color32 = Color32::from_rgb(45, 45, 48);
const HEADER_COLOR: Color32 = Color32::from_rgb(70, 100, 130);
const SELECTION_COLOR: Color32 = Color32::from_rgb(100, 150, 255);
const INPUT_PORT_COLOR: Color32 = Color32::from_rgb(80, 200, 80);
const OUTPUT_PORT_COLOR: Color32 = Color32::from_rgb(200, 150, 80);
const CONNECTED_PORT_COLOR: Color32 = Color32::from_rgb(220, 220, 220);
const CONNECTION_COLOR: Color32 = Color32::from_rgb(200, 200, 200);
const PENDING_CONNECTION_COLOR: Color32 = Color32::from_rgb(255, 200, 100);
const TEXT_COLOR: Color32 = Color32::WHITE;
const PORT_TEXT_COLOR: Color32 = Color32::from_gray(200);
const STATUS_TEXT_COLOR: Color32 = Color32::from_gray(150);

/// Current gesture. Exactly one is active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionMode {
    /// No gesture in progress
    #[default]
    Idle,
    /// Moving a node by its header
    DraggingNode {
        /// Node index
        node: usize,
        /// Grabbed world point minus node origin
        grab_offset: Vec2,
    },
    /// Rubber-banding a connection out of an output port
    ConnectingFromOutput {
        /// Source node and output port
        from: PortRef,
        /// Source anchor in world space
        anchor: Pos2,
        /// Free end in world space
        pointer: Pos2,
    },
    /// Moving the camera
    Panning {
        /// Pointer position at the previous event (screen space)
        last_pointer: Pos2,
    },
}

/// What lies under a point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hit {
    /// A port disc
    Port {
        /// Input or output side
        direction: PortDirection,
        /// Node and port index
        port: PortRef,
    },
    /// A node's title bar
    Header(usize),
    /// A node's body below the title bar
    Body(usize),
}

/// Graph editor state
#[derive(Debug, Clone)]
pub struct GraphEditorState {
    graph: Graph,
    camera: Camera,
    mode: InteractionMode,
    config: EditorConfig,
    selected: Option<usize>,
    /// Last pointer position (screen space), used as the zoom pivot
    pointer: Pos2,
    /// Number used for the next generated node name
    next_node_number: usize,
}

impl GraphEditorState {
    /// Create an editor with an empty graph
    pub fn new(config: EditorConfig) -> std::result::Result<Self, ConfigError> {
        Self::with_graph(config, Graph::default())
    }

    /// Create an editor around an existing graph.
    ///
    /// The config is validated and its limits replace the graph's; a graph
    /// that already exceeds them is refused.
    pub fn with_graph(
        config: EditorConfig,
        mut graph: Graph,
    ) -> std::result::Result<Self, ConfigError> {
        config.validate()?;
        let camera = Camera::new(config.min_zoom, config.max_zoom).ok_or_else(|| {
            ConfigError::Invalid(format!(
                "zoom range {}..={} is empty or not positive",
                config.min_zoom, config.max_zoom
            ))
        })?;
        graph.check_capacity(config.limits())?;
        graph.set_limits(config.limits());
        Ok(Self::assemble(config, camera, graph))
    }

    fn assemble(config: EditorConfig, camera: Camera, graph: Graph) -> Self {
        let next_node_number = graph.node_count() + 1;
        Self {
            camera,
            graph,
            mode: InteractionMode::Idle,
            config,
            selected: None,
            pointer: Pos2::ZERO,
            next_node_number,
        }
    }

    /// The graph being edited
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Swap in another graph, dropping any gesture and selection.
    ///
    /// A graph with more nodes or connections than the configured limits is
    /// refused and the current graph stays in place.
    pub fn replace_graph(&mut self, mut graph: Graph) -> Result<Graph> {
        graph.check_capacity(self.config.limits())?;
        graph.set_limits(self.config.limits());
        self.mode = InteractionMode::Idle;
        self.selected = None;
        self.next_node_number = graph.node_count() + 1;
        Ok(std::mem::replace(&mut self.graph, graph))
    }

    /// Camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Mutable camera
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Current gesture
    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Configuration
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Selected node index
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Select a node, or clear the selection with `None`
    pub fn select(&mut self, node: Option<usize>) {
        self.selected = node.filter(|&i| i < self.graph.node_count());
    }

    /// Whether dragged and created nodes snap to the grid
    pub fn snap_to_grid(&self) -> bool {
        self.config.snap_to_grid
    }

    /// Turn grid snapping on or off
    pub fn set_snap_to_grid(&mut self, snap: bool) {
        self.config.snap_to_grid = snap;
    }

    /// Round each axis to the nearest grid multiple when snapping is on
    pub fn snap_position(&self, pos: Pos2) -> Pos2 {
        if self.config.snap_to_grid {
            let pitch = self.config.grid_pitch;
            Pos2::new((pos.x / pitch).round() * pitch, (pos.y / pitch).round() * pitch)
        } else {
            pos
        }
    }

    /// Add a node with the configured default geometry at a world position
    pub fn add_node_at(&mut self, world: Pos2) -> Result<usize> {
        let [width, height] = self.config.default_node_size;
        let node = Node::new(
            format!("Node {}", self.next_node_number),
            self.snap_position(world),
            Vec2::new(width, height),
            self.config.header_height,
        )
        .with_port_counts(self.config.default_inputs, self.config.default_outputs);

        let index = self.graph.add_node(node)?;
        self.next_node_number += 1;
        Ok(index)
    }

    /// Add a prepared node
    pub fn add_node(&mut self, node: Node) -> Result<usize> {
        let index = self.graph.add_node(node)?;
        self.next_node_number += 1;
        Ok(index)
    }

    /// Connect an output port to an input port
    pub fn connect(&mut self, from: PortRef, to: PortRef) -> Result<usize> {
        self.graph.connect(from, to)
    }

    /// Delete a node with its connections.
    ///
    /// Drags and pending connections are dropped first, since they hold node
    /// indices that the deletion renumbers. Panning survives.
    pub fn delete_node(&mut self, index: usize) -> Result<Node> {
        if index >= self.graph.node_count() {
            return Err(GraphError::NodeOutOfRange {
                index,
                count: self.graph.node_count(),
            });
        }
        if !matches!(self.mode, InteractionMode::Panning { .. }) {
            self.mode = InteractionMode::Idle;
        }
        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };
        self.graph.remove_node(index)
    }

    /// Find what lies under a screen point.
    ///
    /// The point is converted to world space once and compared against world
    /// geometry. Ports win over node bodies; higher indices (drawn later) win
    /// over lower ones.
    pub fn hit_test(&self, screen: Pos2) -> Option<Hit> {
        let world = self.camera.screen_to_world(screen);
        let radius = self.config.port_radius;

        for (index, node) in self.graph.nodes().iter().enumerate().rev() {
            for direction in [PortDirection::Output, PortDirection::Input] {
                for (port, p) in node.ports(direction).iter().enumerate() {
                    if p.anchor().distance(world) <= radius {
                        return Some(Hit::Port {
                            direction,
                            port: PortRef::new(index, port),
                        });
                    }
                }
            }
        }

        for (index, node) in self.graph.nodes().iter().enumerate().rev() {
            if node.header_rect().contains(world) {
                return Some(Hit::Header(index));
            }
            if node.rect().contains(world) {
                return Some(Hit::Body(index));
            }
        }

        None
    }

    /// Process one input event.
    ///
    /// Rejected edits come back as errors. The gesture state has already been
    /// updated when that happens, so the editor is ready for the next event.
    pub fn handle_event(&mut self, event: InputEvent) -> Result<()> {
        match event {
            InputEvent::PointerDown(button, pos) => {
                self.pointer = pos;
                self.pointer_down(button, pos)
            }
            InputEvent::PointerUp(button, pos) => {
                self.pointer = pos;
                self.pointer_up(button, pos)
            }
            InputEvent::PointerMove(pos) => {
                self.pointer_move(pos);
                Ok(())
            }
            InputEvent::Scroll(notches) => {
                if notches != 0.0 {
                    let factor = self.config.zoom_step.powf(notches);
                    self.camera.zoom_by(factor, self.pointer);
                    // Keep the free end under the cursor
                    if let InteractionMode::ConnectingFromOutput { from, anchor, .. } = self.mode {
                        self.mode = InteractionMode::ConnectingFromOutput {
                            from,
                            anchor,
                            pointer: self.camera.screen_to_world(self.pointer),
                        };
                    }
                }
                Ok(())
            }
            InputEvent::KeyDown(key) => self.key_down(key),
        }
    }

    fn pointer_down(&mut self, button: PointerButton, pos: Pos2) -> Result<()> {
        if self.mode != InteractionMode::Idle {
            return Ok(());
        }
        let world = self.camera.screen_to_world(pos);

        match button {
            PointerButton::Primary => match self.hit_test(pos) {
                Some(Hit::Port {
                    direction: PortDirection::Output,
                    port,
                }) => {
                    let anchor = self
                        .graph
                        .node(port.node)
                        .and_then(|n| n.anchor(PortDirection::Output, port.port))
                        .unwrap_or(world);
                    self.mode = InteractionMode::ConnectingFromOutput {
                        from: port,
                        anchor,
                        pointer: world,
                    };
                }
                Some(Hit::Port { port, .. }) => self.selected = Some(port.node),
                Some(Hit::Header(node)) => {
                    self.selected = Some(node);
                    if let Some(n) = self.graph.node(node) {
                        self.mode = InteractionMode::DraggingNode {
                            node,
                            grab_offset: world - n.position(),
                        };
                    }
                }
                Some(Hit::Body(node)) => self.selected = Some(node),
                None => self.selected = None,
            },
            PointerButton::Secondary => match self.hit_test(pos) {
                Some(Hit::Port { direction, port }) => {
                    self.graph.disconnect_port(direction, port);
                }
                Some(Hit::Header(_) | Hit::Body(_)) => {}
                None => {
                    let index = self.add_node_at(world)?;
                    self.selected = Some(index);
                }
            },
            PointerButton::Middle => {
                self.mode = InteractionMode::Panning { last_pointer: pos };
            }
        }
        Ok(())
    }

    fn pointer_up(&mut self, button: PointerButton, pos: Pos2) -> Result<()> {
        match (button, self.mode) {
            (PointerButton::Primary, InteractionMode::DraggingNode { .. })
            | (PointerButton::Middle, InteractionMode::Panning { .. }) => {
                self.mode = InteractionMode::Idle;
                Ok(())
            }
            (PointerButton::Primary, InteractionMode::ConnectingFromOutput { from, .. }) => {
                self.mode = InteractionMode::Idle;
                match self.hit_test(pos) {
                    Some(Hit::Port {
                        direction: PortDirection::Input,
                        port,
                    }) => self.graph.connect(from, port).map(|_| ()),
                    _ => Ok(()),
                }
            }
            _ => Ok(()),
        }
    }

    fn pointer_move(&mut self, pos: Pos2) {
        self.pointer = pos;
        let world = self.camera.screen_to_world(pos);

        match self.mode {
            InteractionMode::Idle => {}
            InteractionMode::DraggingNode { node, grab_offset } => {
                let origin = self.snap_position(world - grab_offset);
                if let Some(n) = self.graph.node_mut(node) {
                    n.set_position(origin);
                }
            }
            InteractionMode::ConnectingFromOutput { from, anchor, .. } => {
                self.mode = InteractionMode::ConnectingFromOutput {
                    from,
                    anchor,
                    pointer: world,
                };
            }
            InteractionMode::Panning { last_pointer } => {
                self.mode = InteractionMode::Panning { last_pointer: pos };
                self.camera.pan_by(pos - last_pointer);
            }
        }
    }

    fn key_down(&mut self, key: Key) -> Result<()> {
        match key {
            Key::Delete | Key::Backspace => {
                if let Some(index) = self.selected {
                    self.delete_node(index)?;
                }
            }
            Key::Escape => self.mode = InteractionMode::Idle,
            Key::G => {
                self.config.snap_to_grid = !self.config.snap_to_grid;
                tracing::debug!(snap = self.config.snap_to_grid, "grid snapping toggled");
            }
            Key::Home => self.camera.reset(),
        }
        Ok(())
    }

    /// Build the primitives for one frame over a canvas of `viewport` size
    pub fn frame(&self, viewport: Vec2) -> Frame {
        let mut frame = Frame::new();
        let view = Rect::from_min_size(Pos2::ZERO, viewport);

        if self.config.show_grid {
            self.draw_grid(&mut frame, view);
        }
        self.draw_connections(&mut frame);
        for (index, node) in self.graph.nodes().iter().enumerate() {
            self.draw_node(&mut frame, view, index, node);
        }
        if let InteractionMode::ConnectingFromOutput { anchor, pointer, .. } = self.mode {
            frame.connection_curve(
                self.camera.world_to_screen(anchor),
                self.camera.world_to_screen(pointer),
                self.camera.zoom(),
                self.camera.scale(CONNECTION_THICKNESS),
                PENDING_CONNECTION_COLOR,
            );
        }
        self.draw_status(&mut frame, view);

        frame
    }

    fn draw_grid(&self, frame: &mut Frame, view: Rect) {
        let pitch = self.config.grid_pitch;
        if self.camera.scale(pitch) < MIN_GRID_SPACING_PX {
            return;
        }
        let world_min = self.camera.screen_to_world(view.min);
        let world_max = self.camera.screen_to_world(view.max);

        for x in grid_lines(world_min.x, world_max.x, pitch) {
            let sx = self.camera.world_to_screen(Pos2::new(x, 0.0)).x;
            frame.line(Pos2::new(sx, view.top()), Pos2::new(sx, view.bottom()), 1.0, GRID_COLOR);
        }
        for y in grid_lines(world_min.y, world_max.y, pitch) {
            let sy = self.camera.world_to_screen(Pos2::new(0.0, y)).y;
            frame.line(Pos2::new(view.left(), sy), Pos2::new(view.right(), sy), 1.0, GRID_COLOR);
        }
    }

    fn draw_connections(&self, frame: &mut Frame) {
        for connection in self.graph.connections() {
            let from = self
                .graph
                .node(connection.from.node)
                .and_then(|n| n.anchor(PortDirection::Output, connection.from.port));
            let to = self
                .graph
                .node(connection.to.node)
                .and_then(|n| n.anchor(PortDirection::Input, connection.to.port));

            if let (Some(from), Some(to)) = (from, to) {
                frame.connection_curve(
                    self.camera.world_to_screen(from),
                    self.camera.world_to_screen(to),
                    self.camera.zoom(),
                    self.camera.scale(CONNECTION_THICKNESS),
                    CONNECTION_COLOR,
                );
            }
        }
    }

    fn draw_node(&self, frame: &mut Frame, view: Rect, index: usize, node: &Node) {
        let zoom = self.camera.zoom();
        let radius = self.camera.scale(self.config.port_radius);
        let screen_rect = self.camera.world_rect_to_screen(node.rect());
        if !screen_rect.expand(radius).intersects(view) {
            return;
        }

        frame.rect(screen_rect, NODE_ROUNDING * zoom, BODY_COLOR);

        let header_rect = self.camera.world_rect_to_screen(node.header_rect());
        let header_color = node
            .color
            .map_or(HEADER_COLOR, |[r, g, b]| Color32::from_rgb(r, g, b));
        frame.rect(header_rect, NODE_ROUNDING * zoom, header_color);
        frame.label(
            header_rect.center(),
            Align2::CENTER_CENTER,
            node.name.clone(),
            TITLE_FONT_SIZE * zoom,
            TEXT_COLOR,
        );

        for direction in [PortDirection::Input, PortDirection::Output] {
            for (i, port) in node.ports(direction).iter().enumerate() {
                let center = self.camera.world_to_screen(port.anchor());
                let connected = self
                    .graph
                    .is_port_connected(direction, PortRef::new(index, i));
                let color = match (connected, direction) {
                    (true, _) => CONNECTED_PORT_COLOR,
                    (false, PortDirection::Input) => INPUT_PORT_COLOR,
                    (false, PortDirection::Output) => OUTPUT_PORT_COLOR,
                };
                frame.circle(center, radius, color);

                let (offset, align) = match direction {
                    PortDirection::Input => (PORT_LABEL_PADDING * zoom, Align2::LEFT_CENTER),
                    PortDirection::Output => (-PORT_LABEL_PADDING * zoom, Align2::RIGHT_CENTER),
                };
                frame.label(
                    center + Vec2::new(offset, 0.0),
                    align,
                    port.name.clone(),
                    PORT_FONT_SIZE * zoom,
                    PORT_TEXT_COLOR,
                );
            }
        }

        if self.selected == Some(index) {
            frame.rect_outline(screen_rect, 2.0, SELECTION_COLOR);
        }
    }

    fn draw_status(&self, frame: &mut Frame, view: Rect) {
        frame.label(
            Pos2::new(view.left() + 5.0, view.bottom() - 10.0),
            Align2::LEFT_CENTER,
            format!(
                "Nodes: {} | Connections: {} | Zoom: {:.0}% | Snap: {}",
                self.graph.node_count(),
                self.graph.connection_count(),
                self.camera.zoom() * 100.0,
                if self.config.snap_to_grid { "on" } else { "off" },
            ),
            STATUS_FONT_SIZE,
            STATUS_TEXT_COLOR,
        );
    }
}

/// World coordinates of the grid lines in `[min, max]`, at most [`MAX_GRID_LINES`]
fn grid_lines(min: f32, max: f32, pitch: f32) -> impl Iterator<Item = f32> {
    // Integer steps, so far from the origin the walk still ends
    let first = (min / pitch).floor() as i64;
    let last = (max / pitch).floor() as i64;
    (first..=last).take(MAX_GRID_LINES).map(move |i| i as f32 * pitch)
}

impl Default for GraphEditorState {
    fn default() -> Self {
        let config = EditorConfig::default();
        let graph = Graph::default().with_limits(config.limits());
        Self::assemble(config, Camera::default(), graph)
    }
}
