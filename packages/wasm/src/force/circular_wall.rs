//! Circular boundary force.

use super::{Force, ForceKind, ForceParam, JITTER, SimRng, jitter};
use crate::error::{LayoutError, LayoutResult};
use crate::sim::PointMass;
use crate::spatial::QuadTree;

/// A circular wall that repels (negative constant) or attracts (positive
/// constant) point masses with strength `constant * mass / distance_to_wall²`.
///
/// The force acts along the radius through the wall's center. For a
/// repelling wall, masses inside are pushed toward the center and masses
/// outside are pushed away from it.
#[derive(Debug, Clone)]
pub struct CircularWallForce {
    params: [ForceParam; 1],
    center: [f32; 2],
    radius: f32,
}

impl CircularWallForce {
    pub const GRAVITATIONAL_CONST: &'static str = "GravitationalConstant";

    /// Create a repelling wall (constant -0.1) with the given center and radius.
    pub fn new(center: [f32; 2], radius: f32) -> LayoutResult<Self> {
        if !(radius.is_finite() && radius > 0.0) {
            return Err(LayoutError::InvalidWallRadius(radius));
        }
        if !(center[0].is_finite() && center[1].is_finite()) {
            return Err(LayoutError::InvalidBounds {
                min_x: center[0],
                min_y: center[1],
                max_x: center[0],
                max_y: center[1],
            });
        }
        Ok(Self {
            params: [ForceParam::new(Self::GRAVITATIONAL_CONST, -0.1, -1.0, 1.0)],
            center,
            radius,
        })
    }

    pub fn center(&self) -> [f32; 2] {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Force for CircularWallForce {
    fn name(&self) -> &'static str {
        "CircularWallForce"
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
        rng: &mut SimRng,
    ) -> [f32; 2] {
        let item = &items[index];
        let mut dx = self.center[0] - item.position[0];
        let mut dy = self.center[1] - item.position[1];
        let mut d = dx.hypot(dy);

        // Signed gap to the wall, positive inside. Never let it reach zero.
        let mut gap = self.radius - d;
        if gap.abs() < JITTER {
            gap = JITTER.copysign(gap);
        }
        let side = if gap > 0.0 { -1.0 } else { 1.0 };
        let v = side * self.params[0].value * item.mass / (gap * gap);

        if d == 0.0 {
            [dx, dy] = jitter(rng);
            d = JITTER;
        }
        [v * dx / d, v * dy / d]
    }
}
