//! Numerical integrators.
//!
//! An integrator advances every non-fixed point mass from the forces already
//! accumulated in the [`ForceSystem`], then clamps each velocity to the
//! system's speed limit. Fixed point masses are halted and keep their
//! position.

use serde::{Deserialize, Serialize};

use super::simulator::ForceSystem;

/// Advances point-mass state by one timestep.
pub trait Integrator {
    /// Human-readable name.
    fn name(&self) -> &'static str;

    /// Advance `system` by `timestep`. Forces must already be accumulated.
    fn integrate(&mut self, system: &mut ForceSystem, timestep: f32);
}

/// Selects a built-in integrator, e.g. from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IntegratorKind {
    /// First-order explicit Euler.
    Euler,
    /// Classic fourth-order Runge-Kutta.
    #[default]
    RungeKutta,
}

impl IntegratorKind {
    /// Instantiate the integrator.
    pub fn build(self) -> Box<dyn Integrator> {
        match self {
            IntegratorKind::Euler => Box::new(EulerIntegrator),
            IntegratorKind::RungeKutta => Box::new(RungeKuttaIntegrator::default()),
        }
    }
}

/// Scale `velocity` down to `limit` if it is faster, keeping its direction.
#[inline]
pub(crate) fn clamp_speed(velocity: &mut [f32; 2], limit: f32) {
    let speed = velocity[0].hypot(velocity[1]);
    if speed > limit {
        // Shave a few ulps so the clamped speed never rounds above the limit.
        let scale = limit / speed * (1.0 - 4.0 * f32::EPSILON);
        velocity[0] *= scale;
        velocity[1] *= scale;
    }
}

/// `position += dt * velocity; velocity += dt / mass * force`.
#[derive(Debug, Clone, Copy, Default)]
pub struct EulerIntegrator;

impl Integrator for EulerIntegrator {
    fn name(&self) -> &'static str {
        "euler"
    }

    fn integrate(&mut self, system: &mut ForceSystem, timestep: f32) {
        let limit = system.speed_limit();
        for item in system.items_mut() {
            if item.fixed {
                item.halt();
                continue;
            }
            item.position[0] += timestep * item.velocity[0];
            item.position[1] += timestep * item.velocity[1];

            let coeff = timestep / item.mass;
            item.velocity[0] += coeff * item.force[0];
            item.velocity[1] += coeff * item.force[1];
            clamp_speed(&mut item.velocity, limit);
        }
    }
}

/// Fourth-order Runge-Kutta.
///
/// Re-accumulates forces at three intermediate states, so each step costs
/// four force evaluations. Intermediate velocities are clamped to the speed
/// limit as well.
#[derive(Debug, Clone, Default)]
pub struct RungeKuttaIntegrator {
    origin: Vec<([f32; 2], [f32; 2])>,
    /// Velocity samples per stage.
    k: Vec<[[f32; 2]; 4]>,
    /// Acceleration samples per stage.
    l: Vec<[[f32; 2]; 4]>,
}

impl RungeKuttaIntegrator {
    const STAGE_STEP: [f32; 3] = [0.5, 0.5, 1.0];

    fn sample(&mut self, system: &ForceSystem, stage: usize) {
        for (i, item) in system.items().iter().enumerate() {
            self.k[i][stage] = item.velocity;
            self.l[i][stage] = [item.force[0] / item.mass, item.force[1] / item.mass];
        }
    }
}

impl Integrator for RungeKuttaIntegrator {
    fn name(&self) -> &'static str {
        "runge-kutta"
    }

    fn integrate(&mut self, system: &mut ForceSystem, timestep: f32) {
        let n = system.items().len();
        let limit = system.speed_limit();

        self.origin.clear();
        self.origin
            .extend(system.items().iter().map(|item| (item.position, item.velocity)));
        self.k.resize(n, [[0.0; 2]; 4]);
        self.l.resize(n, [[0.0; 2]; 4]);

        self.sample(system, 0);
        for stage in 1..4 {
            let h = Self::STAGE_STEP[stage - 1] * timestep;
            for (i, item) in system.items_mut().iter_mut().enumerate() {
                if item.fixed {
                    continue;
                }
                let (p0, v0) = self.origin[i];
                let k = self.k[i][stage - 1];
                let l = self.l[i][stage - 1];
                item.position = [p0[0] + h * k[0], p0[1] + h * k[1]];
                item.velocity = [v0[0] + h * l[0], v0[1] + h * l[1]];
                clamp_speed(&mut item.velocity, limit);
            }
            system.accumulate();
            self.sample(system, stage);
        }

        let w = timestep / 6.0;
        for (i, item) in system.items_mut().iter_mut().enumerate() {
            let (p0, v0) = self.origin[i];
            if item.fixed {
                item.position = p0;
                item.halt();
                continue;
            }
            let [k1, k2, k3, k4] = self.k[i];
            let [l1, l2, l3, l4] = self.l[i];
            for axis in 0..2 {
                item.position[axis] =
                    p0[axis] + w * (k1[axis] + 2.0 * k2[axis] + 2.0 * k3[axis] + k4[axis]);
                item.velocity[axis] =
                    v0[axis] + w * (l1[axis] + 2.0 * l2[axis] + 2.0 * l3[axis] + l4[axis]);
            }
            clamp_speed(&mut item.velocity, limit);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::force::DragForce;
    use crate::sim::PointMass;

    fn system_with(items: &[PointMass]) -> ForceSystem {
        let mut system = ForceSystem::new();
        for &item in items {
            system.add_item(item).unwrap();
        }
        system
    }

    #[test]
    fn test_clamp_speed_preserves_direction() {
        let mut velocity = [30.0, 40.0];
        clamp_speed(&mut velocity, 1.0);
        assert!(velocity[0].hypot(velocity[1]) <= 1.0);
        assert!((velocity[0] - 0.6).abs() < 1e-5);
        assert!((velocity[1] - 0.8).abs() < 1e-5);

        let mut slow = [0.1, 0.2];
        clamp_speed(&mut slow, 1.0);
        assert_eq!(slow, [0.1, 0.2]);
    }

    #[test]
    fn test_euler_update_order() {
        let mut item = PointMass::new([0.0, 0.0], 2.0).unwrap();
        item.velocity = [0.1, 0.0];
        let mut system = system_with(&[item]);
        system.items_mut()[0].force = [0.01, 0.02];

        EulerIntegrator.integrate(&mut system, 10.0);
        let item = system.items()[0];
        // Position moves with the old velocity.
        assert!((item.position[0] - 1.0).abs() < 1e-6);
        assert!(item.position[1].abs() < 1e-9);
        // v += dt / m * F
        assert!((item.velocity[0] - 0.15).abs() < 1e-6);
        assert!((item.velocity[1] - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_euler_clamps_speed() {
        let mut system = system_with(&[PointMass::new([0.0, 0.0], 1.0).unwrap()]);
        system.set_speed_limit(0.5).unwrap();
        system.items_mut()[0].force = [100.0, -100.0];

        EulerIntegrator.integrate(&mut system, 1.0);
        assert!(system.items()[0].speed() <= 0.5);
    }

    #[test]
    fn test_fixed_items_are_halted_and_stay_put() {
        let mut fixed = PointMass::new([3.0, 4.0], 1.0).unwrap();
        fixed.fixed = true;
        fixed.velocity = [1.0, 1.0];

        for kind in [IntegratorKind::Euler, IntegratorKind::RungeKutta] {
            let mut system = system_with(&[fixed]);
            system.items_mut()[0].force = [5.0, 5.0];
            kind.build().integrate(&mut system, 10.0);

            let item = system.items()[0];
            assert_eq!(item.position, [3.0, 4.0]);
            assert_eq!(item.velocity, [0.0, 0.0]);
            assert_eq!(item.force, [0.0, 0.0]);
        }
    }

    #[test]
    fn test_runge_kutta_constant_velocity() {
        let mut item = PointMass::new([0.0, 0.0], 1.0).unwrap();
        item.velocity = [0.5, -0.25];
        let mut system = system_with(&[item]);

        RungeKuttaIntegrator::default().integrate(&mut system, 4.0);
        let item = system.items()[0];
        assert!((item.position[0] - 2.0).abs() < 1e-6);
        assert!((item.position[1] + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_runge_kutta_tracks_drag_decay() {
        // Under drag alone v(t) = v0 * exp(-c t / m).
        let mut item = PointMass::new([0.0, 0.0], 1.0).unwrap();
        item.velocity = [0.5, 0.0];
        let mut system = system_with(&[item]);
        system.add_force(Box::new(DragForce::new()));

        let mut integrator = RungeKuttaIntegrator::default();
        for _ in 0..10 {
            system.accumulate();
            integrator.integrate(&mut system, 10.0);
        }
        let expected = 0.5 * (-0.01f32 * 100.0).exp();
        assert!((system.items()[0].velocity[0] - expected).abs() < 1e-4);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(IntegratorKind::Euler.build().name(), "euler");
        assert_eq!(IntegratorKind::RungeKutta.build().name(), "runge-kutta");
        assert_eq!(IntegratorKind::default(), IntegratorKind::RungeKutta);
    }
}
