//! Velocity-proportional drag.

use super::{Force, ForceKind, ForceParam, SimRng};
use crate::sim::PointMass;
use crate::spatial::QuadTree;

/// Pure damping: `force -= coefficient * velocity`.
#[derive(Debug, Clone)]
pub struct DragForce {
    params: [ForceParam; 1],
}

impl DragForce {
    pub const DRAG_COEFFICIENT: &'static str = "DragCoefficient";

    /// Create a drag force with the default coefficient (0.01).
    pub fn new() -> Self {
        Self {
            params: [ForceParam::new(Self::DRAG_COEFFICIENT, 0.01, 0.0, 0.1)],
        }
    }

    /// Current drag coefficient.
    #[inline]
    pub fn coefficient(&self) -> f32 {
        self.params[0].value
    }
}

impl Default for DragForce {
    fn default() -> Self {
        Self::new()
    }
}

impl Force for DragForce {
    fn name(&self) -> &'static str {
        "DragForce"
    }

    fn kind(&self) -> ForceKind {
        ForceKind::Item
    }

    fn params(&self) -> &[ForceParam] {
        &self.params
    }

    fn params_mut(&mut self) -> &mut [ForceParam] {
        &mut self.params
    }

    fn item_force(
        &self,
        index: usize,
        items: &[PointMass],
        _tree: Option<&QuadTree>,
        _rng: &mut SimRng,
    ) -> [f32; 2] {
        let velocity = items[index].velocity;
        let c = self.coefficient();
        [-c * velocity[0], -c * velocity[1]]
    }
}
