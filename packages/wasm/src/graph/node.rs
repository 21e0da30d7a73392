//! Node identity and per-node flags.
//!
//! Each node in the graph engine carries:
//! - A stable identifier that survives removal of other nodes
//! - Position (x, y) in layout space
//! - A visual extent used when clamping into layout bounds
//! - Pin and visibility flags read by the force layout

use std::fmt;

/// Stable node identifier.
///
/// The force layout keys its cached point masses by this ID, so motion
/// state survives graph edits that do not remove the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Whether a node's position is driven by the simulation or from outside.
///
/// Transitions happen externally (for example while the user drags a node).
/// A pinned node becomes a fixed point mass in the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PinState {
    #[default]
    Unpinned,
    Pinned,
}

/// Node flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const PINNED: u8 = 0b0000_0001;
    const HIDDEN: u8 = 0b0000_0010;

    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    #[inline]
    pub fn pin_state(self) -> PinState {
        if self.flags & Self::PINNED != 0 {
            PinState::Pinned
        } else {
            PinState::Unpinned
        }
    }

    #[inline]
    pub fn set_pin_state(&mut self, state: PinState) {
        match state {
            PinState::Pinned => self.flags |= Self::PINNED,
            PinState::Unpinned => self.flags &= !Self::PINNED,
        }
    }

    #[inline]
    pub fn is_pinned(self) -> bool {
        self.pin_state() == PinState::Pinned
    }

    /// Hidden nodes take no part in the layout.
    #[inline]
    pub fn is_hidden(self) -> bool {
        self.flags & Self::HIDDEN != 0
    }

    #[inline]
    pub fn set_hidden(&mut self, hidden: bool) {
        if hidden {
            self.flags |= Self::HIDDEN;
        } else {
            self.flags &= !Self::HIDDEN;
        }
    }
}
