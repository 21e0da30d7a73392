//! Edge identity and flags.
//!
//! Every visible edge whose endpoints are both visible becomes a spring in
//! the force layout.

use std::fmt;

/// Stable edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub u32);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

/// Per-edge data stored as the petgraph edge weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeState {
    pub id: EdgeId,
    pub hidden: bool,
    /// Rest length override for this edge's spring.
    pub rest_length: Option<f32>,
}

impl EdgeState {
    #[inline]
    pub fn new(id: EdgeId) -> Self {
        Self {
            id,
            hidden: false,
            rest_length: None,
        }
    }
}
