//! Graph data structures and operations.
//!
//! This module provides the graph the layout runs on, using petgraph's
//! StableGraph for stable node/edge indices, with Structure of Arrays (SoA)
//! layout for positions so they can be shared with the renderer directly.

mod edge;
mod engine;
mod node;

pub use edge::{EdgeId, EdgeState};
pub use engine::GraphEngine;
pub use node::{NodeId, NodeState, PinState};
