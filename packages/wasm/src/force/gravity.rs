//! Constant-direction gravity.

use super::{Force, ForceKind, ForceParam, SimRng};
use crate::sim::PointMass;
use crate::spatial::QuadTree;

/// Adds `(cos θ, sin θ) * constant * mass` to every point mass, regardless of position.
#[derive(Debug, Clone)]
pub struct GravitationalForce {
    params: [ForceParam; 2],
}

impl GravitationalForce {
    pub const GRAVITATIONAL_CONST: &'static str = "GravitationalConstant";
    pub const DIRECTION: &'static str = "Direction";

    const CONST: usize = 0;
    const DIR: usize = 1;

    /// Gravity pulling toward +y (screen-down) with a constant of 1e-4.
    pub fn new() -> Self {
        Self {
            params: [
                ForceParam::new(Self::GRAVITATIONAL_CONST, 1e-4, 1e-5, 1e-3),
                ForceParam::new(
                    Self::DIRECTION,
                    std::f32::consts::FRAC_PI_2,
                    -std::f32::consts::PI,
                    std::f32::consts::PI,
                ),
            ],
        }
    }
}

impl Default for GravitationalForce {
    fn default() -> Self {
        Self::new()
    }
}

impl Force for GravitationalForce {
    fn name(&self) -> &'static str {
        "GravitationalForce"
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
        let theta = self.params[Self::DIR].value;
        let v = self.params[Self::CONST].value * items[index].mass;
        [theta.cos() * v, theta.sin() * v]
    }
}
