//! Force-directed layout driver.
//!
//! Keeps one point mass per visible node in a side table keyed by
//! [`NodeId`], so velocity survives between invocations, and one spring per
//! visible edge. Two execution modes are offered:
//!
//! - **Animated** ([`ForceDirectedLayout::tick`]): one kernel step per call,
//!   with the timestep taken from elapsed wall-clock time and capped after a
//!   stall.
//! - **Run-once** ([`ForceDirectedLayout::run_once`]): a fixed number of
//!   steps along a geometrically shrinking annealing schedule.
//!
//! Positions are read from the graph before every run and written back
//! afterwards, clamped into the optional bounding rectangle.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{EdgeLink, LayoutGraph};
use crate::error::{LayoutError, LayoutResult};
use crate::force::{DragForce, NBodyForce, SpringForce};
use crate::graph::NodeId;
use crate::sim::{DEFAULT_SEED, DEFAULT_SPEED_LIMIT, IntegratorKind, PointMass, Simulator, Spring};

/// Axis-aligned rectangle that laid-out nodes are kept inside.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> LayoutResult<Self> {
        let bounds = Self {
            min_x,
            min_y,
            max_x,
            max_y,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> LayoutResult<()> {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        if finite && self.min_x < self.max_x && self.min_y < self.max_y {
            Ok(())
        } else {
            Err(LayoutError::InvalidBounds {
                min_x: self.min_x,
                min_y: self.min_y,
                max_x: self.max_x,
                max_y: self.max_y,
            })
        }
    }

    /// Clamp a position so a node of the given extent lies fully inside.
    ///
    /// A node wider than the rectangle is centered on that axis.
    pub fn clamp(&self, position: [f32; 2], extent: f32) -> [f32; 2] {
        let half = extent * 0.5;
        [
            clamp_axis(position[0], self.min_x + half, self.max_x - half),
            clamp_axis(position[1], self.min_y + half, self.max_y - half),
        ]
    }
}

#[inline]
fn clamp_axis(value: f32, lo: f32, hi: f32) -> f32 {
    if lo > hi {
        (lo + hi) * 0.5
    } else {
        value.clamp(lo, hi)
    }
}

/// Configuration for the force-directed layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForceLayoutConfig {
    /// Number of annealed steps taken by `run_once`.
    pub iterations: u32,
    /// Timestep of the first annealed step.
    pub anneal_start_timestep: f32,
    /// Factor applied to the timestep after every annealed step, in (0, 1].
    pub anneal_decay: f32,
    /// Cap on the timestep derived from wall-clock time in animated mode.
    pub max_timestep: f32,
    /// Timestep of the first animated step, before any elapsed time is known.
    pub first_tick_timestep: f32,
    /// Velocity ceiling for every point mass.
    pub speed_limit: f32,
    /// Mass of nodes without their own mass.
    pub default_mass: f32,
    /// Rectangle that positions are clamped into after every run.
    pub bounds: Option<Bounds>,
    /// Start position for nodes whose position is not a number.
    pub anchor: [f32; 2],
    /// Seed for the kernel's perturbation RNG.
    pub seed: u64,
    pub integrator: IntegratorKind,
}

impl Default for ForceLayoutConfig {
    fn default() -> Self {
        Self {
            iterations: 100,
            anneal_start_timestep: 100.0,
            anneal_decay: 0.97,
            max_timestep: 50.0,
            first_tick_timestep: 20.0,
            speed_limit: DEFAULT_SPEED_LIMIT,
            default_mass: 1.0,
            bounds: None,
            anchor: [0.0, 0.0],
            seed: DEFAULT_SEED,
            integrator: IntegratorKind::default(),
        }
    }
}

impl ForceLayoutConfig {
    pub fn validate(&self) -> LayoutResult<()> {
        if self.iterations == 0 {
            return Err(LayoutError::InvalidSchedule(
                "iterations must be at least 1".into(),
            ));
        }
        if !(self.anneal_start_timestep.is_finite() && self.anneal_start_timestep > 0.0) {
            return Err(LayoutError::InvalidSchedule(format!(
                "start timestep must be positive and finite, got {}",
                self.anneal_start_timestep
            )));
        }
        if !(self.anneal_decay > 0.0 && self.anneal_decay <= 1.0) {
            return Err(LayoutError::InvalidSchedule(format!(
                "decay must lie in (0, 1], got {}",
                self.anneal_decay
            )));
        }
        for timestep in [self.max_timestep, self.first_tick_timestep] {
            if !(timestep.is_finite() && timestep > 0.0) {
                return Err(LayoutError::InvalidTimestep(timestep));
            }
        }
        if !(self.speed_limit.is_finite() && self.speed_limit > 0.0) {
            return Err(LayoutError::InvalidSpeedLimit(self.speed_limit));
        }
        if !(self.default_mass.is_finite() && self.default_mass > 0.0) {
            return Err(LayoutError::InvalidMass(self.default_mass));
        }
        if let Some(bounds) = &self.bounds {
            bounds.validate()?;
        }
        if !self.anchor.iter().all(|c| c.is_finite()) {
            return Err(LayoutError::InvalidAnchor(self.anchor[0], self.anchor[1]));
        }
        Ok(())
    }

    /// Per-step timesteps of a run-once pass.
    pub fn annealing_schedule(&self) -> impl Iterator<Item = f32> + use<> {
        let decay = self.anneal_decay;
        std::iter::successors(Some(self.anneal_start_timestep), move |dt| Some(dt * decay))
            .take(self.iterations as usize)
    }
}

/// The force-directed layout driver.
pub struct ForceDirectedLayout {
    config: ForceLayoutConfig,
    simulator: Simulator,
    /// Motion state per node, kept across runs and visibility changes.
    masses: HashMap<NodeId, PointMass>,
    /// Node behind each kernel point-mass index.
    order: Vec<NodeId>,
    /// Topology version the kernel's springs were built from.
    topology: Option<u64>,
    last_tick_ms: Option<f64>,
}

impl ForceDirectedLayout {
    /// Create a layout with the default force set: many-body, drag, spring.
    pub fn new(config: ForceLayoutConfig) -> LayoutResult<Self> {
        let simulator = default_simulator(config.seed);
        Self::with_simulator(config, simulator)
    }

    /// Create a layout around a simulator with a custom force set.
    ///
    /// The configured speed limit and integrator replace the simulator's.
    pub fn with_simulator(config: ForceLayoutConfig, mut simulator: Simulator) -> LayoutResult<Self> {
        config.validate()?;
        simulator.set_speed_limit(config.speed_limit)?;
        simulator.set_integrator(config.integrator.build());
        simulator.clear_items();
        Ok(Self {
            config,
            simulator,
            masses: HashMap::new(),
            order: Vec::new(),
            topology: None,
            last_tick_ms: None,
        })
    }

    /// Create a layout with default configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: ForceLayoutConfig::default(),
            simulator: default_simulator(DEFAULT_SEED),
            masses: HashMap::new(),
            order: Vec::new(),
            topology: None,
            last_tick_ms: None,
        }
    }

    pub fn config(&self) -> &ForceLayoutConfig {
        &self.config
    }

    pub fn simulator(&self) -> &Simulator {
        &self.simulator
    }

    /// Mutable access to the kernel, for tuning forces.
    pub fn simulator_mut(&mut self) -> &mut Simulator {
        &mut self.simulator
    }

    pub fn set_bounds(&mut self, bounds: Option<Bounds>) -> LayoutResult<()> {
        if let Some(b) = &bounds {
            b.validate()?;
        }
        self.config.bounds = bounds;
        Ok(())
    }

    pub fn set_speed_limit(&mut self, limit: f32) -> LayoutResult<()> {
        self.simulator.set_speed_limit(limit)?;
        self.config.speed_limit = limit;
        Ok(())
    }

    pub fn set_integrator(&mut self, kind: IntegratorKind) {
        self.simulator.set_integrator(kind.build());
        self.config.integrator = kind;
    }

    /// Cached motion state of a node, if it has taken part in a run.
    pub fn point_mass(&self, id: NodeId) -> Option<&PointMass> {
        self.masses.get(&id)
    }

    /// Drop all cached motion state. The next run starts from rest.
    pub fn reset(&mut self) {
        self.masses.clear();
        self.order.clear();
        self.simulator.clear_items();
        self.topology = None;
        self.last_tick_ms = None;
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Run the full annealing schedule. Returns the total simulated time.
    pub fn run_once<G: LayoutGraph>(&mut self, graph: &mut G) -> f32 {
        self.sync(graph);
        info!(
            nodes = self.order.len(),
            springs = self.simulator.springs().len(),
            iterations = self.config.iterations,
            "starting run-once layout"
        );

        let mut elapsed = 0.0;
        for timestep in self.config.annealing_schedule() {
            elapsed += self.simulator.run(timestep);
        }

        self.commit(graph);
        info!(elapsed, "run-once layout finished");
        elapsed
    }

    /// Run one animated step at wall-clock time `now_ms`.
    ///
    /// The timestep is the time since the previous tick, capped at the
    /// configured maximum. Returns the timestep the kernel used.
    pub fn tick<G: LayoutGraph>(&mut self, graph: &mut G, now_ms: f64) -> f32 {
        if !now_ms.is_finite() {
            warn!(now_ms, "ignoring tick with non-finite clock");
            return 0.0;
        }
        let timestep = match self.last_tick_ms {
            None => self.config.first_tick_timestep,
            Some(previous) => {
                let elapsed = (now_ms - previous).max(0.0) as f32;
                if elapsed > self.config.max_timestep {
                    debug!(elapsed, cap = self.config.max_timestep, "capping stalled tick");
                }
                elapsed.min(self.config.max_timestep)
            }
        };
        self.last_tick_ms = Some(now_ms);
        self.step(graph, timestep)
    }

    /// Run a single step with an explicit timestep.
    pub fn step<G: LayoutGraph>(&mut self, graph: &mut G, timestep: f32) -> f32 {
        self.sync(graph);
        let effective = self.simulator.run(timestep);
        self.commit(graph);
        effective
    }

    // =========================================================================
    // Graph synchronization
    // =========================================================================

    /// Bring the kernel's point masses and springs in line with the graph.
    fn sync<G: LayoutGraph>(&mut self, graph: &G) {
        let version = graph.topology_version();
        if self.topology == Some(version) && self.refresh(graph) {
            return;
        }
        self.rebuild(graph);
        self.topology = Some(version);
    }

    /// Update positions, pins and masses in place. Returns false when a
    /// node disappeared and a rebuild is needed.
    fn refresh<G: LayoutGraph>(&mut self, graph: &G) -> bool {
        if self.simulator.items().len() != self.order.len() {
            return false;
        }
        for (i, &id) in self.order.iter().enumerate() {
            let Some(position) = graph.node_position(id) else {
                return false;
            };
            let current = self.simulator.items()[i];
            let item = self.prepare(graph, id, position, Some(current));
            self.simulator.items_mut()[i] = item;
        }
        true
    }

    fn rebuild<G: LayoutGraph>(&mut self, graph: &G) {
        self.simulator.clear_items();
        self.order.clear();
        self.masses.retain(|&id, _| graph.node_position(id).is_some());

        let mut index_of = HashMap::new();
        for id in graph.visible_nodes() {
            let Some(position) = graph.node_position(id) else {
                continue;
            };
            let cached = self.masses.get(&id).copied();
            let item = self.prepare(graph, id, position, cached);
            // `prepare` only yields valid masses.
            if let Ok(index) = self.simulator.add_item(item) {
                index_of.insert(id, index);
                self.order.push(id);
            }
        }

        for EdgeLink {
            source,
            target,
            rest_length,
        } in graph.visible_edges()
        {
            let (Some(&a), Some(&b)) = (index_of.get(&source), index_of.get(&target)) else {
                continue;
            };
            if a == b {
                continue;
            }
            let mut spring = Spring::new(a, b);
            spring.rest_length = rest_length;
            if let Err(err) = self.simulator.add_spring(spring) {
                warn!(%source, %target, %err, "skipping edge");
            }
        }

        debug!(
            nodes = self.order.len(),
            springs = self.simulator.springs().len(),
            "rebuilt layout system"
        );
    }

    /// Build the point mass for a node from the graph and its cached state.
    fn prepare<G: LayoutGraph>(
        &self,
        graph: &G,
        id: NodeId,
        position: [f32; 2],
        cached: Option<PointMass>,
    ) -> PointMass {
        let position = if position.iter().all(|c| c.is_finite()) {
            position
        } else {
            let fallback = cached
                .map(|m| m.position)
                .filter(|p| p.iter().all(|c| c.is_finite()))
                .unwrap_or(self.config.anchor);
            warn!(%id, ?fallback, "node position is not a number, substituting");
            fallback
        };

        let mass = match graph.node_mass(id) {
            Some(m) if m.is_finite() && m > 0.0 => m,
            Some(m) => {
                warn!(%id, mass = m, "invalid node mass, using default");
                self.config.default_mass
            }
            None => self.config.default_mass,
        };

        let fixed = graph.is_node_fixed(id);
        let velocity = match cached {
            Some(m) if !fixed && m.velocity.iter().all(|c| c.is_finite()) => m.velocity,
            _ => [0.0; 2],
        };

        PointMass {
            position,
            velocity,
            force: [0.0; 2],
            mass,
            fixed,
        }
    }

    /// Copy simulated positions back to the graph and into the side table.
    fn commit<G: LayoutGraph>(&mut self, graph: &mut G) {
        let bounds = self.config.bounds;
        for (i, &id) in self.order.iter().enumerate() {
            let item = &mut self.simulator.items_mut()[i];
            if let Some(bounds) = &bounds {
                if !item.fixed {
                    item.position = bounds.clamp(item.position, graph.node_extent(id));
                }
            }
            let item = *item;
            self.masses.insert(id, item);
            graph.set_node_position(id, item.position);
        }
    }
}

fn default_simulator(seed: u64) -> Simulator {
    let mut simulator = Simulator::with_seed(seed);
    simulator.add_force(Box::new(NBodyForce::new()));
    simulator.add_force(Box::new(DragForce::new()));
    simulator.add_force(Box::new(SpringForce::new()));
    simulator
}

impl Default for ForceDirectedLayout {
    fn default() -> Self {
        Self::with_defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphEngine;

    fn spring_only_layout() -> ForceDirectedLayout {
        let mut simulator = Simulator::new();
        simulator.add_force(Box::new(DragForce::new()));
        simulator.add_force(Box::new(SpringForce::new()));
        ForceDirectedLayout::with_simulator(ForceLayoutConfig::default(), simulator).unwrap()
    }

    fn distance(a: [f32; 2], b: [f32; 2]) -> f32 {
        (a[0] - b[0]).hypot(a[1] - b[1])
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ForceLayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let config = ForceLayoutConfig {
            iterations: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LayoutError::InvalidSchedule(_))));

        let config = ForceLayoutConfig {
            anneal_decay: 1.5,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LayoutError::InvalidSchedule(_))));

        let config = ForceLayoutConfig {
            speed_limit: 0.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(LayoutError::InvalidSpeedLimit(0.0)));

        let config = ForceLayoutConfig {
            default_mass: -2.0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(LayoutError::InvalidMass(-2.0)));

        let config = ForceLayoutConfig {
            bounds: Some(Bounds {
                min_x: 10.0,
                min_y: 0.0,
                max_x: 0.0,
                max_y: 10.0,
            }),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(LayoutError::InvalidBounds { .. })));
        assert!(ForceDirectedLayout::new(config).is_err());
    }

    #[test]
    fn test_annealing_schedule_shrinks_geometrically() {
        let config = ForceLayoutConfig::default();
        let schedule: Vec<f32> = config.annealing_schedule().collect();
        assert_eq!(schedule.len(), 100);
        assert_eq!(schedule[0], 100.0);
        assert!((schedule[1] - 97.0).abs() < 1e-3);
        assert!(schedule.windows(2).all(|w| w[1] < w[0]));
        assert!(schedule[99] < 6.0);
    }

    #[test]
    fn test_two_node_spring_converges_to_rest_length() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(10.0, 0.0);
        graph.add_edge(a, b);

        let mut layout = spring_only_layout();
        layout.run_once(&mut graph);

        let d = distance(graph.node_position(a).unwrap(), graph.node_position(b).unwrap());
        assert!((d - 50.0).abs() < 0.5, "separation {d}");
    }

    #[test]
    fn test_three_chain_stays_symmetric() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(10.0, 0.0);
        let c = graph.add_node(20.0, 0.0);
        graph.add_edge(a, b);
        graph.add_edge(b, c);

        let mut layout = spring_only_layout();
        layout.run_once(&mut graph);

        let pa = graph.node_position(a).unwrap();
        let pb = graph.node_position(b).unwrap();
        let pc = graph.node_position(c).unwrap();
        let ab = distance(pa, pb);
        let bc = distance(pb, pc);
        assert!((ab - bc).abs() < 0.01 * ab.max(bc), "ab {ab} bc {bc}");
        assert!((ab - 50.0).abs() < 1.0, "ab {ab}");
    }

    #[test]
    fn test_pinned_node_does_not_move() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(5.0, 5.0);
        let b = graph.add_node(6.0, 5.0);
        let c = graph.add_node(5.0, 7.0);
        graph.add_edge(a, b);
        graph.add_edge(a, c);
        graph.pin_node(a);

        let mut layout = ForceDirectedLayout::new(ForceLayoutConfig::default()).unwrap();
        layout.run_once(&mut graph);

        assert_eq!(graph.node_position(a), Some([5.0, 5.0]));
        assert_ne!(graph.node_position(b), Some([6.0, 5.0]));
        assert_eq!(layout.point_mass(a).unwrap().velocity, [0.0, 0.0]);
    }

    #[test]
    fn test_pinned_node_follows_external_position() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(30.0, 0.0);
        graph.add_edge(a, b);
        graph.pin_node(a);

        let mut layout = ForceDirectedLayout::new(ForceLayoutConfig::default()).unwrap();
        layout.step(&mut graph, 10.0);
        graph.set_node_position(a, 200.0, 100.0);
        layout.step(&mut graph, 10.0);

        assert_eq!(graph.node_position(a), Some([200.0, 100.0]));
        assert_eq!(layout.point_mass(a).unwrap().position, [200.0, 100.0]);
    }

    #[test]
    fn test_positions_clamped_into_bounds() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(-500.0, 40.0);
        let b = graph.add_node(500.0, 900.0);
        graph.set_node_extent(a, 10.0).unwrap();
        graph.set_node_extent(b, 10.0).unwrap();

        let config = ForceLayoutConfig {
            bounds: Some(Bounds::new(0.0, 0.0, 100.0, 100.0).unwrap()),
            ..Default::default()
        };
        let mut layout = ForceDirectedLayout::new(config).unwrap();
        layout.step(&mut graph, 1.0);

        for id in [a, b] {
            let [x, y] = graph.node_position(id).unwrap();
            assert!((5.0..=95.0).contains(&x), "x {x}");
            assert!((5.0..=95.0).contains(&y), "y {y}");
        }
        assert_eq!(graph.node_position(a).unwrap()[0], 5.0);
    }

    #[test]
    fn test_bounds_clamp_centers_oversized_nodes() {
        let bounds = Bounds::new(0.0, 0.0, 10.0, 100.0).unwrap();
        assert_eq!(bounds.clamp([3.0, 50.0], 40.0), [5.0, 50.0]);
        assert_eq!(bounds.clamp([-3.0, 150.0], 0.0), [0.0, 100.0]);
    }

    #[test]
    fn test_nan_position_replaced_by_anchor() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(f32::NAN, f32::NAN);
        let b = graph.add_node(40.0, 0.0);
        graph.add_edge(a, b);

        let config = ForceLayoutConfig {
            anchor: [20.0, -20.0],
            ..Default::default()
        };
        let mut layout = ForceDirectedLayout::new(config).unwrap();
        layout.step(&mut graph, 0.0);

        assert_eq!(graph.node_position(a), Some([20.0, -20.0]));
        layout.run_once(&mut graph);
        for id in [a, b] {
            let p = graph.node_position(id).unwrap();
            assert!(p[0].is_finite() && p[1].is_finite());
        }
    }

    #[test]
    fn test_nan_position_falls_back_to_cached() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(12.0, 34.0);

        let mut layout = spring_only_layout();
        layout.step(&mut graph, 0.0);
        graph.set_node_position(a, f32::NAN, 0.0);
        layout.step(&mut graph, 0.0);

        assert_eq!(graph.node_position(a), Some([12.0, 34.0]));
    }

    #[test]
    fn test_velocity_persists_between_steps() {
        let build = || {
            let mut graph = GraphEngine::new();
            let a = graph.add_node(0.0, 0.0);
            let b = graph.add_node(10.0, 0.0);
            graph.add_edge(a, b);
            (graph, a)
        };

        let (mut continuous, a) = build();
        let mut layout = spring_only_layout();
        layout.step(&mut continuous, 20.0);
        assert_ne!(layout.point_mass(a).unwrap().velocity, [0.0, 0.0]);
        layout.step(&mut continuous, 20.0);

        let (mut restarted, _) = build();
        let mut other = spring_only_layout();
        other.step(&mut restarted, 20.0);
        other.reset();
        assert!(other.point_mass(a).is_none());
        other.step(&mut restarted, 20.0);

        assert_ne!(continuous.node_position(a), restarted.node_position(a));
    }

    #[test]
    fn test_node_added_after_clear_starts_at_rest() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(10.0, 0.0);
        graph.add_edge(a, b);

        let mut layout = spring_only_layout();
        layout.step(&mut graph, 20.0);
        assert_ne!(layout.point_mass(a).unwrap().velocity, [0.0, 0.0]);

        graph.clear();
        let fresh = graph.add_node(500.0, 500.0);
        layout.step(&mut graph, 0.0);

        assert_ne!(fresh, a);
        assert!(layout.point_mass(a).is_none());
        assert_eq!(layout.point_mass(fresh).unwrap().velocity, [0.0, 0.0]);
        assert_eq!(graph.node_position(fresh), Some([500.0, 500.0]));
    }

    #[test]
    fn test_hidden_nodes_excluded() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(10.0, 0.0);
        let hidden = graph.add_node(5.0, 5.0);
        graph.add_edge(a, hidden);
        graph.add_edge(a, b);
        graph.set_node_hidden(hidden, true);

        let mut layout = ForceDirectedLayout::new(ForceLayoutConfig::default()).unwrap();
        layout.run_once(&mut graph);

        assert_eq!(graph.node_position(hidden), Some([5.0, 5.0]));
        assert!(layout.point_mass(hidden).is_none());
        assert_eq!(layout.simulator().items().len(), 2);
        assert_eq!(layout.simulator().springs().len(), 1);

        graph.set_node_hidden(hidden, false);
        layout.step(&mut graph, 1.0);
        assert_eq!(layout.simulator().items().len(), 3);
        assert_eq!(layout.simulator().springs().len(), 2);
        assert!(layout.point_mass(a).is_some());
    }

    #[test]
    fn test_removed_node_drops_cached_state() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(10.0, 0.0);
        graph.add_edge(a, b);

        let mut layout = ForceDirectedLayout::new(ForceLayoutConfig::default()).unwrap();
        layout.step(&mut graph, 5.0);
        graph.remove_node(b);
        layout.step(&mut graph, 5.0);

        assert!(layout.point_mass(b).is_none());
        assert_eq!(layout.simulator().items().len(), 1);
        assert!(layout.simulator().springs().is_empty());
    }

    #[test]
    fn test_edge_rest_length_override() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(10.0, 0.0);
        let edge = graph.add_edge(a, b).unwrap();
        graph.set_edge_rest_length(edge, Some(80.0)).unwrap();

        let mut layout = spring_only_layout();
        layout.run_once(&mut graph);

        let d = distance(graph.node_position(a).unwrap(), graph.node_position(b).unwrap());
        assert!((d - 80.0).abs() < 1.0, "separation {d}");
    }

    #[test]
    fn test_node_mass_from_graph() {
        let mut graph = GraphEngine::new();
        let a = graph.add_node(0.0, 0.0);
        let b = graph.add_node(1.0, 0.0);
        graph.set_node_mass(a, Some(4.0)).unwrap();

        let mut layout = ForceDirectedLayout::new(ForceLayoutConfig::default()).unwrap();
        layout.step(&mut graph, 1.0);

        assert_eq!(layout.point_mass(a).unwrap().mass, 4.0);
        assert_eq!(layout.point_mass(b).unwrap().mass, 1.0);
    }

    #[test]
    fn test_tick_derives_and_caps_timestep() {
        let mut graph = GraphEngine::new();
        graph.add_node(0.0, 0.0);
        graph.add_node(10.0, 0.0);

        let mut layout = ForceDirectedLayout::new(ForceLayoutConfig::default()).unwrap();
        assert_eq!(layout.tick(&mut graph, 1_000.0), 20.0);
        assert_eq!(layout.tick(&mut graph, 1_016.0), 16.0);
        assert_eq!(layout.tick(&mut graph, 60_000.0), 50.0);
        assert_eq!(layout.tick(&mut graph, 60_010.0), 10.0);
        assert_eq!(layout.tick(&mut graph, 50_000.0), 0.0);
        assert_eq!(layout.tick(&mut graph, f64::NAN), 0.0);
    }

    #[test]
    fn test_run_once_reports_simulated_time() {
        let mut graph = GraphEngine::new();
        graph.add_node(0.0, 0.0);

        let config = ForceLayoutConfig {
            iterations: 3,
            anneal_start_timestep: 10.0,
            anneal_decay: 0.5,
            ..Default::default()
        };
        let mut layout = ForceDirectedLayout::new(config).unwrap();
        assert_eq!(layout.run_once(&mut graph), 17.5);
    }

    #[test]
    fn test_setters_validate() {
        let mut layout = ForceDirectedLayout::with_defaults();
        assert!(layout.set_speed_limit(-1.0).is_err());
        assert!(layout.set_speed_limit(3.0).is_ok());
        assert_eq!(layout.simulator().speed_limit(), 3.0);

        let bad = Bounds {
            min_x: 0.0,
            min_y: 0.0,
            max_x: f32::NAN,
            max_y: 1.0,
        };
        assert!(layout.set_bounds(Some(bad)).is_err());
        assert!(layout.set_bounds(None).is_ok());

        layout.set_integrator(IntegratorKind::Euler);
        assert_eq!(layout.simulator().integrator_name(), "euler");
        assert_eq!(layout.config().integrator, IntegratorKind::Euler);
    }
}
