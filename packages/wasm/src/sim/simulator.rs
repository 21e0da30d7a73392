//! Simulation kernel.
//!
//! [`ForceSystem`] owns the point masses, springs and registered forces and
//! knows how to accumulate forces. [`Simulator`] pairs it with an
//! integrator and a timestep ceiling, and performs whole steps.

use rand::SeedableRng;
use tracing::{debug, warn};

use super::integrator::{Integrator, IntegratorKind};
use super::item::{PointMass, Spring};
use crate::error::{LayoutError, LayoutResult};
use crate::force::{Force, ForceDescriptor, SimRng};
use crate::spatial::{DEFAULT_TREE_DEPTH, QuadTree};

/// Velocity ceiling used unless configured otherwise.
pub const DEFAULT_SPEED_LIMIT: f32 = 1.0;

/// Seed for the perturbation RNG unless configured otherwise.
pub const DEFAULT_SEED: u64 = 0x5eed_f0ce;

/// Point masses, springs and the forces acting on them.
pub struct ForceSystem {
    items: Vec<PointMass>,
    springs: Vec<Spring>,
    /// Registration order is evaluation order.
    forces: Vec<Box<dyn Force>>,
    speed_limit: f32,
    tree_depth: u32,
    rng: SimRng,
}

impl ForceSystem {
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            items: Vec::new(),
            springs: Vec::new(),
            forces: Vec::new(),
            speed_limit: DEFAULT_SPEED_LIMIT,
            tree_depth: DEFAULT_TREE_DEPTH,
            rng: SimRng::seed_from_u64(seed),
        }
    }

    // =========================================================================
    // Forces
    // =========================================================================

    /// Register a force. Forces of each kind run in registration order.
    pub fn add_force(&mut self, force: Box<dyn Force>) {
        debug!(force = force.name(), kind = ?force.kind(), "registered force");
        self.forces.push(force);
    }

    pub fn forces(&self) -> &[Box<dyn Force>] {
        &self.forces
    }

    /// Find a force by name.
    pub fn force(&self, name: &str) -> Option<&dyn Force> {
        self.forces.iter().find(|f| f.name() == name).map(|f| &**f)
    }

    /// Find a force by name for tuning.
    pub fn force_mut(&mut self, name: &str) -> Option<&mut (dyn Force + 'static)> {
        self.forces
            .iter_mut()
            .find(|f| f.name() == name)
            .map(|f| &mut **f)
    }

    /// Set a parameter of a registered force.
    pub fn set_force_param(&mut self, force: &str, param: &str, value: f32) -> LayoutResult<()> {
        self.force_mut(force)
            .ok_or_else(|| LayoutError::UnknownForce(force.to_string()))?
            .set_param(param, value)
    }

    /// Parameter snapshots of every registered force.
    pub fn descriptors(&self) -> Vec<ForceDescriptor> {
        self.forces.iter().map(|f| f.descriptor()).collect()
    }

    pub fn clear_forces(&mut self) {
        self.forces.clear();
    }

    // =========================================================================
    // Items and springs
    // =========================================================================

    /// Add a point mass and return its index.
    ///
    /// Non-finite coordinates are replaced by the origin so they cannot
    /// spread through many-body interactions.
    pub fn add_item(&mut self, mut item: PointMass) -> LayoutResult<usize> {
        if !(item.mass.is_finite() && item.mass > 0.0) {
            return Err(LayoutError::InvalidMass(item.mass));
        }
        if !item.position.iter().all(|c| c.is_finite()) {
            warn!(position = ?item.position, "non-finite point mass position replaced by origin");
            item.position = [0.0; 2];
        }
        if !item.velocity.iter().all(|c| c.is_finite()) {
            item.velocity = [0.0; 2];
        }
        item.force = [0.0; 2];
        self.items.push(item);
        Ok(self.items.len() - 1)
    }

    /// Add a spring between two existing point masses and return its index.
    pub fn add_spring(&mut self, spring: Spring) -> LayoutResult<usize> {
        let count = self.items.len();
        if let Some(&index) = spring.endpoints.iter().find(|&&i| i >= count) {
            return Err(LayoutError::SpringEndpointOutOfRange { index, count });
        }
        check_override("SpringCoefficient", spring.coefficient)?;
        check_override("DefaultSpringLength", spring.rest_length)?;
        self.springs.push(spring);
        Ok(self.springs.len() - 1)
    }

    pub fn items(&self) -> &[PointMass] {
        &self.items
    }

    pub fn items_mut(&mut self) -> &mut [PointMass] {
        &mut self.items
    }

    pub fn springs(&self) -> &[Spring] {
        &self.springs
    }

    /// Remove all point masses and the springs that reference them.
    pub fn clear_items(&mut self) {
        self.items.clear();
        self.springs.clear();
    }

    pub fn clear_springs(&mut self) {
        self.springs.clear();
    }

    // =========================================================================
    // Settings
    // =========================================================================

    pub fn speed_limit(&self) -> f32 {
        self.speed_limit
    }

    pub fn set_speed_limit(&mut self, limit: f32) -> LayoutResult<()> {
        if !(limit.is_finite() && limit > 0.0) {
            return Err(LayoutError::InvalidSpeedLimit(limit));
        }
        self.speed_limit = limit;
        Ok(())
    }

    pub fn tree_depth(&self) -> u32 {
        self.tree_depth
    }

    pub fn set_tree_depth(&mut self, depth: u32) -> LayoutResult<()> {
        self.tree_depth = QuadTree::validate_depth(depth)?;
        Ok(())
    }

    // =========================================================================
    // Accumulation
    // =========================================================================

    /// Recompute every point mass's force from the current state.
    ///
    /// Accumulators are zeroed first. The quadtree is built once, before the
    /// first item force that needs it, and dropped at the end.
    pub fn accumulate(&mut self) {
        for item in &mut self.items {
            item.force = [0.0; 2];
        }

        let mut tree: Option<QuadTree> = None;
        for force in self.forces.iter().filter(|f| f.kind().is_item_force()) {
            if force.requires_spatial_index() && tree.is_none() {
                tree = Some(QuadTree::build(&self.items, self.tree_depth));
            }
            for i in 0..self.items.len() {
                let f = force.item_force(i, &self.items, tree.as_ref(), &mut self.rng);
                let item = &mut self.items[i];
                item.force[0] += f[0];
                item.force[1] += f[1];
            }
        }

        for force in self.forces.iter().filter(|f| f.kind().is_spring_force()) {
            for spring in &self.springs {
                let f = force.spring_force(spring, &self.items, &mut self.rng);
                let [a, b] = spring.endpoints;
                self.items[a].force[0] += f[0];
                self.items[a].force[1] += f[1];
                self.items[b].force[0] -= f[0];
                self.items[b].force[1] -= f[1];
            }
        }
    }
}

impl Default for ForceSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn check_override(param: &'static str, value: Option<f32>) -> LayoutResult<()> {
    match value {
        Some(v) if !(v.is_finite() && v >= 0.0) => Err(LayoutError::ParamOutOfRange {
            force: "SpringForce",
            param,
            value: v,
            min: 0.0,
            max: f32::MAX,
        }),
        _ => Ok(()),
    }
}

/// The simulation kernel: a force system, an integrator and a timestep ceiling.
pub struct Simulator {
    system: ForceSystem,
    integrator: Box<dyn Integrator>,
    max_timestep: Option<f32>,
}

impl Simulator {
    /// Create an empty simulator with the Runge-Kutta integrator and no ceiling.
    pub fn new() -> Self {
        Self::with_seed(DEFAULT_SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            system: ForceSystem::with_seed(seed),
            integrator: IntegratorKind::default().build(),
            max_timestep: None,
        }
    }

    pub fn system(&self) -> &ForceSystem {
        &self.system
    }

    pub fn system_mut(&mut self) -> &mut ForceSystem {
        &mut self.system
    }

    pub fn add_force(&mut self, force: Box<dyn Force>) {
        self.system.add_force(force);
    }

    pub fn add_item(&mut self, item: PointMass) -> LayoutResult<usize> {
        self.system.add_item(item)
    }

    pub fn add_spring(&mut self, spring: Spring) -> LayoutResult<usize> {
        self.system.add_spring(spring)
    }

    pub fn items(&self) -> &[PointMass] {
        self.system.items()
    }

    pub fn items_mut(&mut self) -> &mut [PointMass] {
        self.system.items_mut()
    }

    pub fn springs(&self) -> &[Spring] {
        self.system.springs()
    }

    pub fn clear_items(&mut self) {
        self.system.clear_items();
    }

    pub fn set_force_param(&mut self, force: &str, param: &str, value: f32) -> LayoutResult<()> {
        self.system.set_force_param(force, param, value)
    }

    pub fn speed_limit(&self) -> f32 {
        self.system.speed_limit()
    }

    pub fn set_speed_limit(&mut self, limit: f32) -> LayoutResult<()> {
        self.system.set_speed_limit(limit)
    }

    pub fn integrator_name(&self) -> &'static str {
        self.integrator.name()
    }

    pub fn set_integrator(&mut self, integrator: Box<dyn Integrator>) {
        self.integrator = integrator;
    }

    /// Current timestep ceiling, if any.
    pub fn max_timestep(&self) -> Option<f32> {
        self.max_timestep
    }

    pub fn set_max_timestep(&mut self, ceiling: Option<f32>) -> LayoutResult<()> {
        if let Some(c) = ceiling {
            if !(c.is_finite() && c > 0.0) {
                return Err(LayoutError::InvalidTimestep(c));
            }
        }
        self.max_timestep = ceiling;
        Ok(())
    }

    /// Run one step: accumulate forces, then integrate.
    ///
    /// Returns the timestep actually used. A request above the ceiling runs
    /// at the ceiling. The effective value never exceeds the ceiling, so the
    /// ceiling stays where it is: it neither rises nor falls on its own and
    /// only `set_max_timestep` moves it. Negative or non-finite requests do
    /// nothing and return 0.
    pub fn run(&mut self, timestep: f32) -> f32 {
        if !(timestep.is_finite() && timestep >= 0.0) {
            warn!(timestep, "ignoring invalid timestep");
            return 0.0;
        }

        let effective = match self.max_timestep {
            Some(ceiling) if timestep > ceiling => {
                debug!(requested = timestep, ceiling, "timestep clamped");
                ceiling
            }
            _ => timestep,
        };

        self.system.accumulate();
        self.integrator.integrate(&mut self.system, effective);
        effective
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}
