//! Heroine Graph Force - WASM Module
//!
//! A physics-based force-directed layout engine for the Heroine Graph
//! visualization library. It is compiled to WebAssembly and exposes a
//! JavaScript-friendly API via wasm-bindgen.
//!
//! # Architecture
//!
//! - `graph`: Graph data structure using petgraph's StableGraph
//! - `spatial`: Barnes-Hut quadtree, rebuilt every step
//! - `force`: Force modules (drag, gravity, circular wall, n-body, spring)
//! - `sim`: Point masses, integrators and the simulation kernel
//! - `layout`: Layout driver with animated and run-once modes

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

pub mod error;
pub mod force;
pub mod graph;
pub mod layout;
pub mod sim;
pub mod spatial;

use graph::{EdgeId, GraphEngine, NodeId};
use layout::{Bounds, ForceDirectedLayout, ForceLayoutConfig};
use sim::IntegratorKind;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Main entry point: a graph and the force layout running on it.
///
/// This struct wraps the internal GraphEngine and ForceDirectedLayout and
/// provides the public API exposed to JavaScript.
#[wasm_bindgen]
pub struct HeroineForceLayout {
    engine: GraphEngine,
    layout: ForceDirectedLayout,
}

#[wasm_bindgen]
impl HeroineForceLayout {
    /// Create an empty graph with the default layout configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            engine: GraphEngine::new(),
            layout: ForceDirectedLayout::with_defaults(),
        }
    }

    /// Create an empty graph with a layout configuration object.
    ///
    /// Missing fields take their defaults. Keys are camelCase, e.g.
    /// `{ iterations: 200, speedLimit: 2, integrator: "euler" }`.
    #[wasm_bindgen(js_name = withConfig)]
    pub fn with_config(config: JsValue) -> Result<HeroineForceLayout, JsError> {
        let config: ForceLayoutConfig = serde_wasm_bindgen::from_value(config)?;
        Ok(Self {
            engine: GraphEngine::new(),
            layout: ForceDirectedLayout::new(config)?,
        })
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node at the specified position.
    ///
    /// Returns the stable node ID.
    #[wasm_bindgen(js_name = addNode)]
    pub fn add_node(&mut self, x: f32, y: f32) -> u32 {
        self.engine.add_node(x, y).0
    }

    /// Add multiple nodes from a Float32Array of positions.
    ///
    /// The positions array should be [x0, y0, x1, y1, ...].
    /// Returns the number of nodes added.
    #[wasm_bindgen(js_name = addNodesFromPositions)]
    pub fn add_nodes_from_positions(&mut self, positions: &[f32]) -> u32 {
        self.engine.add_nodes_from_positions(positions)
    }

    /// Remove a node by ID.
    ///
    /// Returns true if the node existed and was removed.
    #[wasm_bindgen(js_name = removeNode)]
    pub fn remove_node(&mut self, node_id: u32) -> bool {
        self.engine.remove_node(NodeId(node_id))
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.engine.node_count()
    }

    /// Get the upper bound on node indices (max index + 1).
    /// May be larger than nodeCount if nodes have been removed.
    #[wasm_bindgen(js_name = nodeBound)]
    pub fn node_bound(&self) -> u32 {
        self.engine.node_bound()
    }

    #[wasm_bindgen(js_name = getNodeX)]
    pub fn get_node_x(&self, node_id: u32) -> Option<f32> {
        self.engine.node_position(NodeId(node_id)).map(|[x, _]| x)
    }

    #[wasm_bindgen(js_name = getNodeY)]
    pub fn get_node_y(&self, node_id: u32) -> Option<f32> {
        self.engine.node_position(NodeId(node_id)).map(|[_, y]| y)
    }

    #[wasm_bindgen(js_name = setNodePosition)]
    pub fn set_node_position(&mut self, node_id: u32, x: f32, y: f32) {
        self.engine.set_node_position(NodeId(node_id), x, y);
    }

    /// Pin a node. Its position is then controlled from outside.
    #[wasm_bindgen(js_name = pinNode)]
    pub fn pin_node(&mut self, node_id: u32) {
        self.engine.pin_node(NodeId(node_id));
    }

    /// Unpin a node (include in simulation).
    #[wasm_bindgen(js_name = unpinNode)]
    pub fn unpin_node(&mut self, node_id: u32) {
        self.engine.unpin_node(NodeId(node_id));
    }

    #[wasm_bindgen(js_name = isNodePinned)]
    pub fn is_node_pinned(&self, node_id: u32) -> bool {
        self.engine.is_node_pinned(NodeId(node_id))
    }

    /// Hide a node. Hidden nodes and their edges are left out of the layout.
    #[wasm_bindgen(js_name = setNodeHidden)]
    pub fn set_node_hidden(&mut self, node_id: u32, hidden: bool) {
        self.engine.set_node_hidden(NodeId(node_id), hidden);
    }

    /// Set a node's visual diameter, used for bounds clamping.
    #[wasm_bindgen(js_name = setNodeExtent)]
    pub fn set_node_extent(&mut self, node_id: u32, extent: f32) -> Result<bool, JsError> {
        Ok(self.engine.set_node_extent(NodeId(node_id), extent)?)
    }

    /// Set a node's mass, or pass `undefined` to use the default.
    #[wasm_bindgen(js_name = setNodeMass)]
    pub fn set_node_mass(&mut self, node_id: u32, mass: Option<f32>) -> Result<bool, JsError> {
        Ok(self.engine.set_node_mass(NodeId(node_id), mass)?)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge between two nodes.
    ///
    /// Returns the edge ID, or None if either node doesn't exist.
    #[wasm_bindgen(js_name = addEdge)]
    pub fn add_edge(&mut self, source: u32, target: u32) -> Option<u32> {
        self.engine
            .add_edge(NodeId(source), NodeId(target))
            .map(|id| id.0)
    }

    /// Add multiple edges from a Uint32Array of [src0, tgt0, src1, tgt1, ...].
    ///
    /// Returns the number of edges added.
    #[wasm_bindgen(js_name = addEdgesFromPairs)]
    pub fn add_edges_from_pairs(&mut self, edges: &[u32]) -> u32 {
        self.engine.add_edges_from_pairs(edges)
    }

    #[wasm_bindgen(js_name = removeEdge)]
    pub fn remove_edge(&mut self, edge_id: u32) -> bool {
        self.engine.remove_edge(EdgeId(edge_id))
    }

    #[wasm_bindgen(js_name = edgeCount)]
    pub fn edge_count(&self) -> u32 {
        self.engine.edge_count()
    }

    #[wasm_bindgen(js_name = setEdgeHidden)]
    pub fn set_edge_hidden(&mut self, edge_id: u32, hidden: bool) {
        self.engine.set_edge_hidden(EdgeId(edge_id), hidden);
    }

    /// Give an edge its own spring rest length, or pass `undefined` to use the default.
    #[wasm_bindgen(js_name = setEdgeRestLength)]
    pub fn set_edge_rest_length(&mut self, edge_id: u32, length: Option<f32>) -> Result<bool, JsError> {
        Ok(self.engine.set_edge_rest_length(EdgeId(edge_id), length)?)
    }

    // =========================================================================
    // Layout Execution
    // =========================================================================

    /// Run the annealed batch layout. Returns the total simulated time.
    #[wasm_bindgen(js_name = runOnce)]
    pub fn run_once(&mut self) -> f32 {
        self.layout.run_once(&mut self.engine)
    }

    /// Advance one animation frame. Pass `performance.now()`.
    ///
    /// Returns the timestep the simulation used.
    pub fn tick(&mut self, now_ms: f64) -> f32 {
        self.layout.tick(&mut self.engine, now_ms)
    }

    /// Advance one step with an explicit timestep.
    pub fn step(&mut self, timestep: f32) -> f32 {
        self.layout.step(&mut self.engine, timestep)
    }

    /// Forget all velocities. The next run starts from rest.
    pub fn reset(&mut self) {
        self.layout.reset();
    }

    // =========================================================================
    // Layout Configuration
    // =========================================================================

    /// Keep nodes inside the given rectangle.
    #[wasm_bindgen(js_name = setBounds)]
    pub fn set_bounds(&mut self, min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Result<(), JsError> {
        let bounds = Bounds::new(min_x, min_y, max_x, max_y)?;
        Ok(self.layout.set_bounds(Some(bounds))?)
    }

    #[wasm_bindgen(js_name = clearBounds)]
    pub fn clear_bounds(&mut self) -> Result<(), JsError> {
        Ok(self.layout.set_bounds(None)?)
    }

    #[wasm_bindgen(js_name = setSpeedLimit)]
    pub fn set_speed_limit(&mut self, limit: f32) -> Result<(), JsError> {
        Ok(self.layout.set_speed_limit(limit)?)
    }

    /// Select the integrator: `"euler"` or `"runge-kutta"`.
    #[wasm_bindgen(js_name = setIntegrator)]
    pub fn set_integrator(&mut self, name: &str) -> Result<(), JsError> {
        let kind: IntegratorKind = serde_wasm_bindgen::from_value(JsValue::from_str(name))?;
        self.layout.set_integrator(kind);
        Ok(())
    }

    /// Current layout configuration as a plain object.
    #[wasm_bindgen(js_name = getConfig)]
    pub fn get_config(&self) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(self.layout.config())?)
    }

    /// Registered forces with their parameters, for tuning UIs.
    ///
    /// Returns `[{ name, kind, params: [{ name, value, default, min, max }] }]`.
    #[wasm_bindgen(js_name = getForces)]
    pub fn get_forces(&self) -> Result<JsValue, JsError> {
        let descriptors = self.layout.simulator().system().descriptors();
        Ok(serde_wasm_bindgen::to_value(&descriptors)?)
    }

    /// Set a force parameter, e.g. `setForceParam("SpringForce", "SpringCoefficient", 2e-4)`.
    #[wasm_bindgen(js_name = setForceParam)]
    pub fn set_force_param(&mut self, force: &str, param: &str, value: f32) -> Result<(), JsError> {
        Ok(self.layout.simulator_mut().set_force_param(force, param, value)?)
    }

    /// Simulated state of a node, or `undefined` before its first run.
    #[wasm_bindgen(js_name = getPointMass)]
    pub fn get_point_mass(&self, node_id: u32) -> Result<JsValue, JsError> {
        Ok(serde_wasm_bindgen::to_value(&self.layout.point_mass(NodeId(node_id)))?)
    }

    // =========================================================================
    // Position Buffer Access (Zero-Copy)
    // =========================================================================

    /// Get a zero-copy view of X positions.
    ///
    /// # Safety
    ///
    /// The returned view is invalidated if any Rust allocation occurs.
    /// Use immediately for GPU upload, do not store.
    #[wasm_bindgen(js_name = getPositionsXView)]
    pub fn get_positions_x_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.positions_x()) }
    }

    /// Get a zero-copy view of Y positions.
    ///
    /// # Safety
    ///
    /// Same constraints as `getPositionsXView`.
    #[wasm_bindgen(js_name = getPositionsYView)]
    pub fn get_positions_y_view(&self) -> Float32Array {
        unsafe { Float32Array::view(self.engine.positions_y()) }
    }

    #[wasm_bindgen(js_name = positionsLen)]
    pub fn positions_len(&self) -> usize {
        self.engine.positions_x().len()
    }

    // =========================================================================
    // Graph Utilities
    // =========================================================================

    /// Get the bounding box of visible nodes.
    ///
    /// Returns [min_x, min_y, max_x, max_y], or None if nothing is visible.
    #[wasm_bindgen(js_name = getBounds)]
    pub fn get_bounds(&self) -> Option<Vec<f32>> {
        self.engine
            .get_bounds()
            .map(|(min_x, min_y, max_x, max_y)| vec![min_x, min_y, max_x, max_y])
    }

    /// Clear all nodes and edges, and the layout's cached state.
    pub fn clear(&mut self) {
        self.engine.clear();
        self.layout.reset();
    }
}

impl Default for HeroineForceLayout {
    fn default() -> Self {
        Self::new()
    }
}
