//! Simulation kernel: point-mass records, integrators and the step loop.
//!
//! The kernel performs one step as: zero force accumulators, run item
//! forces (building the Barnes-Hut tree once if any force needs it), run
//! spring forces, then hand the system to the integrator.

mod integrator;
mod item;
mod simulator;

pub use integrator::{EulerIntegrator, Integrator, IntegratorKind, RungeKuttaIntegrator};
pub use item::{PointMass, Spring};
pub use simulator::{DEFAULT_SEED, DEFAULT_SPEED_LIMIT, ForceSystem, Simulator};
