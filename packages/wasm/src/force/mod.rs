//! Force modules for the simulator.
//!
//! A force is either an *item force*, evaluated once per point mass, or a
//! *spring force*, evaluated once per spring and applied equal-and-opposite
//! to both endpoints. A module declares its capability through [`ForceKind`]
//! so the simulator never has to inspect concrete types.

mod circular_wall;
mod drag;
mod gravity;
mod n_body;
mod param;
mod spring;

pub use circular_wall::CircularWallForce;
pub use drag::DragForce;
pub use gravity::GravitationalForce;
pub use n_body::NBodyForce;
pub use param::ForceParam;
pub use spring::SpringForce;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use crate::error::{LayoutError, LayoutResult};
use crate::sim::{PointMass, Spring};
use crate::spatial::QuadTree;

/// Random source used to break symmetry for coincident geometry.
pub type SimRng = ChaCha8Rng;

/// Magnitude of the random offset substituted for a zero-length separation.
pub const JITTER: f32 = 0.01;

/// Which simulator passes a force takes part in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ForceKind {
    /// Evaluated once per point mass.
    Item,
    /// Evaluated once per spring.
    Spring,
    /// Evaluated in both passes.
    Both,
}

impl ForceKind {
    /// Whether the force runs in the per-point-mass pass.
    #[inline]
    pub fn is_item_force(self) -> bool {
        matches!(self, ForceKind::Item | ForceKind::Both)
    }

    /// Whether the force runs in the per-spring pass.
    #[inline]
    pub fn is_spring_force(self) -> bool {
        matches!(self, ForceKind::Spring | ForceKind::Both)
    }
}

/// Snapshot of a force's parameters, for tuning UIs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceDescriptor {
    pub name: &'static str,
    pub kind: ForceKind,
    pub params: Vec<ForceParam>,
}

/// A unit of force computation.
pub trait Force {
    /// Name used to address the force from outside.
    fn name(&self) -> &'static str;

    /// Capability of this force.
    fn kind(&self) -> ForceKind;

    /// Current parameters.
    fn params(&self) -> &[ForceParam];

    /// Mutable access to the parameters. Callers go through [`Force::set_param`].
    fn params_mut(&mut self) -> &mut [ForceParam];

    /// Whether the force reads the per-step spatial index.
    fn requires_spatial_index(&self) -> bool {
        false
    }

    /// Force contributed to `items[index]`.
    fn item_force(
        &self,
        _index: usize,
        _items: &[PointMass],
        _tree: Option<&QuadTree>,
        _rng: &mut SimRng,
    ) -> [f32; 2] {
        [0.0; 2]
    }

    /// Force on the spring's first endpoint. The second endpoint receives the negation.
    fn spring_force(&self, _spring: &Spring, _items: &[PointMass], _rng: &mut SimRng) -> [f32; 2] {
        [0.0; 2]
    }

    /// Look up a parameter value by name.
    fn param(&self, name: &str) -> Option<f32> {
        self.params().iter().find(|p| p.name == name).map(|p| p.value)
    }

    /// Set a parameter by name, validating its range.
    fn set_param(&mut self, name: &str, value: f32) -> LayoutResult<()> {
        let force = self.name();
        let param = self
            .params_mut()
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| LayoutError::UnknownParam {
                force,
                param: name.to_string(),
            })?;
        param.set(force, value)
    }

    /// Describe the force for external tuning.
    fn descriptor(&self) -> ForceDescriptor {
        ForceDescriptor {
            name: self.name(),
            kind: self.kind(),
            params: self.params().to_vec(),
        }
    }
}

/// Small random vector of length [`JITTER`] used when two points coincide.
pub(crate) fn jitter(rng: &mut SimRng) -> [f32; 2] {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    [JITTER * angle.cos(), JITTER * angle.sin()]
}
