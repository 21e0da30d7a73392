//! GraphEngine - the graph the force layout operates on.
//!
//! Topology lives in petgraph's StableGraph so node and edge indices stay
//! valid across removals. Positions are kept in SoA (Structure of Arrays)
//! buffers indexed by node slot so they can be handed to the renderer
//! without copying.

use std::collections::HashMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::NodeIndexable;
use petgraph::{Directed, Direction};

use super::edge::{EdgeId, EdgeState};
use super::node::{NodeId, NodeState, PinState};
use crate::error::{LayoutError, LayoutResult};
use crate::layout::{EdgeLink, LayoutGraph};

/// The graph engine.
///
/// This struct manages:
/// - Graph topology via petgraph
/// - Position buffers in SoA layout
/// - Per-node extent, optional mass, pin and visibility flags
/// - ID mapping between stable IDs and internal indices
/// - A topology version the layout uses to detect structural change
pub struct GraphEngine {
    /// Nodes store their stable NodeId, edges their state.
    graph: StableGraph<NodeId, EdgeState, Directed>,

    node_id_to_index: HashMap<NodeId, NodeIndex>,

    edge_id_to_index: HashMap<EdgeId, EdgeIndex>,

    next_node_id: u32,

    next_edge_id: u32,

    /// X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// Visual extent (diameter) per slot
    extents: Vec<f32>,

    /// Mass override per slot
    masses: Vec<Option<f32>>,

    states: Vec<NodeState>,

    /// Bumped whenever the visible node or edge set may have changed.
    topology_version: u64,
}

impl GraphEngine {
    /// Create a new empty graph engine.
    pub fn new() -> Self {
        Self::with_capacity(0, 0)
    }

    /// Create a graph engine with pre-allocated capacity.
    pub fn with_capacity(node_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableGraph::with_capacity(node_capacity, edge_capacity),
            node_id_to_index: HashMap::with_capacity(node_capacity),
            edge_id_to_index: HashMap::with_capacity(edge_capacity),
            next_node_id: 0,
            next_edge_id: 0,
            pos_x: Vec::with_capacity(node_capacity),
            pos_y: Vec::with_capacity(node_capacity),
            extents: Vec::with_capacity(node_capacity),
            masses: Vec::with_capacity(node_capacity),
            states: Vec::with_capacity(node_capacity),
            topology_version: 0,
        }
    }

    #[inline]
    fn slot(&self, id: NodeId) -> Option<usize> {
        self.node_id_to_index.get(&id).map(|index| index.index())
    }

    fn touch(&mut self) {
        self.topology_version = self.topology_version.wrapping_add(1);
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node at the specified position.
    ///
    /// NaN coordinates are accepted; the layout substitutes its start
    /// position for them.
    pub fn add_node(&mut self, x: f32, y: f32) -> NodeId {
        let id = NodeId(self.next_node_id);
        self.next_node_id += 1;

        let index = self.graph.add_node(id);
        self.node_id_to_index.insert(id, index);

        let slot = index.index();
        if slot == self.pos_x.len() {
            self.pos_x.push(x);
            self.pos_y.push(y);
            self.extents.push(0.0);
            self.masses.push(None);
            self.states.push(NodeState::new());
        } else {
            // StableGraph reuses vacated slots.
            self.pos_x[slot] = x;
            self.pos_y[slot] = y;
            self.extents[slot] = 0.0;
            self.masses[slot] = None;
            self.states[slot] = NodeState::new();
        }

        self.touch();
        id
    }

    /// Add nodes from interleaved positions [x0, y0, x1, y1, ...].
    pub fn add_nodes_from_positions(&mut self, positions: &[f32]) -> u32 {
        let count = positions.len() / 2;
        self.node_id_to_index.reserve(count);
        for pair in positions.chunks_exact(2) {
            self.add_node(pair[0], pair[1]);
        }
        count as u32
    }

    /// Remove a node and all its connected edges.
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.node_id_to_index.remove(&id) else {
            return false;
        };

        let edges: Vec<_> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|e| e.weight().id)
            .collect();
        for edge_id in edges {
            self.edge_id_to_index.remove(&edge_id);
        }

        let i = index.index();
        self.pos_x[i] = 0.0;
        self.pos_y[i] = 0.0;
        self.extents[i] = 0.0;
        self.masses[i] = None;
        self.states[i] = NodeState::new();

        self.graph.remove_node(index);
        self.touch();
        true
    }

    pub fn node_count(&self) -> u32 {
        self.graph.node_count() as u32
    }

    /// Upper bound on node slots (max index + 1). May exceed node_count()
    /// after removals.
    pub fn node_bound(&self) -> u32 {
        self.graph.node_bound() as u32
    }

    pub fn node_position(&self, id: NodeId) -> Option<[f32; 2]> {
        self.slot(id).map(|i| [self.pos_x[i], self.pos_y[i]])
    }

    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32) {
        if let Some(i) = self.slot(id) {
            self.pos_x[i] = x;
            self.pos_y[i] = y;
        }
    }

    /// Set the node's visual extent, used to keep it fully inside layout bounds.
    pub fn set_node_extent(&mut self, id: NodeId, extent: f32) -> LayoutResult<bool> {
        if !(extent.is_finite() && extent >= 0.0) {
            return Err(LayoutError::InvalidExtent(extent));
        }
        Ok(self.slot(id).map(|i| self.extents[i] = extent).is_some())
    }

    /// Override the node's simulated mass, or clear the override with `None`.
    pub fn set_node_mass(&mut self, id: NodeId, mass: Option<f32>) -> LayoutResult<bool> {
        if let Some(m) = mass {
            if !(m.is_finite() && m > 0.0) {
                return Err(LayoutError::InvalidMass(m));
            }
        }
        Ok(self.slot(id).map(|i| self.masses[i] = mass).is_some())
    }

    pub fn pin_state(&self, id: NodeId) -> Option<PinState> {
        self.slot(id).map(|i| self.states[i].pin_state())
    }

    /// Pin a node: the layout treats it as fixed and reads its position from here.
    pub fn pin_node(&mut self, id: NodeId) {
        if let Some(i) = self.slot(id) {
            self.states[i].set_pin_state(PinState::Pinned);
        }
    }

    pub fn unpin_node(&mut self, id: NodeId) {
        if let Some(i) = self.slot(id) {
            self.states[i].set_pin_state(PinState::Unpinned);
        }
    }

    pub fn is_node_pinned(&self, id: NodeId) -> bool {
        self.slot(id).is_some_and(|i| self.states[i].is_pinned())
    }

    /// Hide or show a node. Hidden nodes and their edges leave the layout.
    pub fn set_node_hidden(&mut self, id: NodeId, hidden: bool) {
        if let Some(i) = self.slot(id) {
            if self.states[i].is_hidden() != hidden {
                self.states[i].set_hidden(hidden);
                self.touch();
            }
        }
    }

    pub fn is_node_hidden(&self, id: NodeId) -> bool {
        self.slot(id).is_some_and(|i| self.states[i].is_hidden())
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge between two nodes.
    pub fn add_edge(&mut self, source: NodeId, target: NodeId) -> Option<EdgeId> {
        let source_index = *self.node_id_to_index.get(&source)?;
        let target_index = *self.node_id_to_index.get(&target)?;

        let id = EdgeId(self.next_edge_id);
        self.next_edge_id += 1;

        let index = self
            .graph
            .add_edge(source_index, target_index, EdgeState::new(id));
        self.edge_id_to_index.insert(id, index);
        self.touch();
        Some(id)
    }

    /// Add edges from pairs [src0, tgt0, src1, tgt1, ...]. Returns how many were added.
    pub fn add_edges_from_pairs(&mut self, edges: &[u32]) -> u32 {
        edges
            .chunks_exact(2)
            .filter(|pair| self.add_edge(NodeId(pair[0]), NodeId(pair[1])).is_some())
            .count() as u32
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        match self.edge_id_to_index.remove(&id) {
            Some(index) => {
                self.graph.remove_edge(index);
                self.touch();
                true
            }
            None => false,
        }
    }

    pub fn edge_count(&self) -> u32 {
        self.graph.edge_count() as u32
    }

    pub fn set_edge_hidden(&mut self, id: EdgeId, hidden: bool) {
        let Some(&index) = self.edge_id_to_index.get(&id) else {
            return;
        };
        if let Some(state) = self.graph.edge_weight_mut(index) {
            if state.hidden != hidden {
                state.hidden = hidden;
                self.touch();
            }
        }
    }

    /// Give the edge's spring its own rest length, or restore the default with `None`.
    pub fn set_edge_rest_length(&mut self, id: EdgeId, length: Option<f32>) -> LayoutResult<bool> {
        if let Some(l) = length {
            if !(l.is_finite() && l >= 0.0) {
                return Err(LayoutError::ParamOutOfRange {
                    force: "SpringForce",
                    param: "DefaultSpringLength",
                    value: l,
                    min: 0.0,
                    max: f32::MAX,
                });
            }
        }
        let Some(&index) = self.edge_id_to_index.get(&id) else {
            return Ok(false);
        };
        let Some(state) = self.graph.edge_weight_mut(index) else {
            return Ok(false);
        };
        state.rest_length = length;
        self.touch();
        Ok(true)
    }

    // =========================================================================
    // Buffer Access
    // =========================================================================

    /// X positions by node slot.
    pub fn positions_x(&self) -> &[f32] {
        &self.pos_x
    }

    /// Y positions by node slot.
    pub fn positions_y(&self) -> &[f32] {
        &self.pos_y
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Bounding box (min_x, min_y, max_x, max_y) of visible nodes.
    pub fn get_bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let mut bounds: Option<(f32, f32, f32, f32)> = None;
        for index in self.graph.node_indices() {
            let i = index.index();
            if self.states[i].is_hidden() {
                continue;
            }
            let (x, y) = (self.pos_x[i], self.pos_y[i]);
            if !(x.is_finite() && y.is_finite()) {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((min_x, min_y, max_x, max_y)) => {
                    (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
                }
            });
        }
        bounds
    }

    /// Clear all nodes and edges.
    ///
    /// ID counters keep counting, so an ID is never handed out twice.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_id_to_index.clear();
        self.edge_id_to_index.clear();
        self.pos_x.clear();
        self.pos_y.clear();
        self.extents.clear();
        self.masses.clear();
        self.states.clear();
        self.touch();
    }
}

impl Default for GraphEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutGraph for GraphEngine {
    fn visible_nodes(&self) -> Vec<NodeId> {
        self.graph
            .node_indices()
            .filter(|index| !self.states[index.index()].is_hidden())
            .map(|index| self.graph[index])
            .collect()
    }

    fn visible_edges(&self) -> Vec<EdgeLink> {
        self.graph
            .edge_indices()
            .filter_map(|index| {
                let state = self.graph.edge_weight(index)?;
                let (source, target) = self.graph.edge_endpoints(index)?;
                let visible = !state.hidden
                    && !self.states[source.index()].is_hidden()
                    && !self.states[target.index()].is_hidden();
                visible.then(|| EdgeLink {
                    source: self.graph[source],
                    target: self.graph[target],
                    rest_length: state.rest_length,
                })
            })
            .collect()
    }

    fn node_position(&self, id: NodeId) -> Option<[f32; 2]> {
        GraphEngine::node_position(self, id)
    }

    fn set_node_position(&mut self, id: NodeId, position: [f32; 2]) {
        GraphEngine::set_node_position(self, id, position[0], position[1]);
    }

    fn is_node_fixed(&self, id: NodeId) -> bool {
        self.is_node_pinned(id)
    }

    fn node_extent(&self, id: NodeId) -> f32 {
        self.slot(id).map_or(0.0, |i| self.extents[i])
    }

    fn node_mass(&self, id: NodeId) -> Option<f32> {
        self.slot(id).and_then(|i| self.masses[i])
    }

    fn topology_version(&self) -> u64 {
        self.topology_version
    }
}
