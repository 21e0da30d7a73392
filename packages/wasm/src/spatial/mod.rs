//! Spatial indexing for many-body force approximation.
//!
//! This module provides a Barnes-Hut quadtree that is rebuilt from current
//! positions at every simulation step and discarded afterwards.

mod quadtree;

pub use quadtree::{DEFAULT_TREE_DEPTH, Interaction, MAX_TREE_DEPTH, QuadTree};
