//! Layout driver for graph visualization.
//!
//! The driver adapts any graph implementing [`LayoutGraph`] into the
//! simulation kernel, runs it in animated or run-once mode, and writes the
//! resulting positions back.

pub mod force_directed;

pub use force_directed::{Bounds, ForceDirectedLayout, ForceLayoutConfig};

use crate::graph::NodeId;

/// A visible edge as seen by the layout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLink {
    pub source: NodeId,
    pub target: NodeId,
    /// Rest length override for this edge's spring.
    pub rest_length: Option<f32>,
}

/// The view of a graph the force layout needs.
///
/// Implementors must change [`topology_version`](LayoutGraph::topology_version)
/// whenever the visible node or edge set changes; the driver rebuilds its
/// springs only then.
pub trait LayoutGraph {
    /// Nodes taking part in the layout.
    fn visible_nodes(&self) -> Vec<NodeId>;

    /// Edges whose endpoints are both visible.
    fn visible_edges(&self) -> Vec<EdgeLink>;

    fn node_position(&self, id: NodeId) -> Option<[f32; 2]>;

    fn set_node_position(&mut self, id: NodeId, position: [f32; 2]);

    /// Whether the node is pinned and its position externally controlled.
    fn is_node_fixed(&self, id: NodeId) -> bool;

    /// Visual diameter, used when clamping into bounds.
    fn node_extent(&self, _id: NodeId) -> f32 {
        0.0
    }

    /// Mass override; `None` uses the layout's default mass.
    fn node_mass(&self, _id: NodeId) -> Option<f32> {
        None
    }

    fn topology_version(&self) -> u64;
}
