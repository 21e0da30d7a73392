//! Hooke's-law spring force.

use super::{Force, ForceKind, ForceParam, JITTER, SimRng, jitter};
use crate::sim::{PointMass, Spring};

/// Pulls spring endpoints toward the spring's rest length:
/// `coefficient * (length - rest_length)` along the line between them.
///
/// Springs without their own rest length or coefficient use this force's
/// current parameters.
#[derive(Debug, Clone)]
pub struct SpringForce {
    params: [ForceParam; 2],
}

impl SpringForce {
    pub const SPRING_COEFFICIENT: &'static str = "SpringCoefficient";
    pub const DEFAULT_LENGTH: &'static str = "DefaultSpringLength";

    const COEFF: usize = 0;
    const LENGTH: usize = 1;

    pub fn new() -> Self {
        Self {
            params: [
                ForceParam::new(Self::SPRING_COEFFICIENT, 1e-4, 0.0, 1e-3),
                ForceParam::new(Self::DEFAULT_LENGTH, 50.0, 0.0, 200.0),
            ],
        }
    }

    /// Coefficient and rest length that apply to `spring`.
    pub fn resolve(&self, spring: &Spring) -> (f32, f32) {
        (
            spring.coefficient.unwrap_or(self.params[Self::COEFF].value),
            spring.rest_length.unwrap_or(self.params[Self::LENGTH].value),
        )
    }
}

impl Default for SpringForce {
    fn default() -> Self {
        Self::new()
    }
}

impl Force for SpringForce {
    fn name(&self) -> &'static str {
        "SpringForce"
    }

    fn kind(&self) -> ForceKind {
        ForceKind::Spring
    }

    fn params(&self) -> &[ForceParam] {
        &self.params
    }

    fn params_mut(&mut self) -> &mut [ForceParam] {
        &mut self.params
    }

    fn spring_force(&self, spring: &Spring, items: &[PointMass], rng: &mut SimRng) -> [f32; 2] {
        let [a, b] = spring.endpoints;
        let p1 = items[a].position;
        let p2 = items[b].position;

        let mut dx = p2[0] - p1[0];
        let mut dy = p2[1] - p1[1];
        let mut length = dx.hypot(dy);
        if length == 0.0 {
            [dx, dy] = jitter(rng);
            length = JITTER;
        }

        let (coefficient, rest_length) = self.resolve(spring);
        let c = coefficient * (length - rest_length) / length;
        [c * dx, c * dy]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn pair(distance: f32) -> [PointMass; 2] {
        [
            PointMass::new([0.0, 0.0], 1.0).unwrap(),
            PointMass::new([distance, 0.0], 1.0).unwrap(),
        ]
    }

    #[test]
    fn test_stretched_spring_pulls_together() {
        let mut rng = SimRng::seed_from_u64(0);
        let items = pair(150.0);
        let force = SpringForce::new().spring_force(&Spring::new(0, 1), &items, &mut rng);
        // 1e-4 * (150 - 50) toward b
        assert!((force[0] - 0.01).abs() < 1e-7);
        assert_eq!(force[1], 0.0);
    }

    #[test]
    fn test_compressed_spring_pushes_apart() {
        let mut rng = SimRng::seed_from_u64(0);
        let items = pair(10.0);
        let force = SpringForce::new().spring_force(&Spring::new(0, 1), &items, &mut rng);
        assert!(force[0] < 0.0);
    }

    #[test]
    fn test_at_rest_length_is_zero() {
        let mut rng = SimRng::seed_from_u64(0);
        let items = pair(50.0);
        let force = SpringForce::new().spring_force(&Spring::new(0, 1), &items, &mut rng);
        assert_eq!(force, [0.0, 0.0]);
    }

    #[test]
    fn test_spring_overrides_take_precedence() {
        let mut rng = SimRng::seed_from_u64(0);
        let items = pair(30.0);
        let spring = Spring::new(0, 1).with_rest_length(20.0).with_coefficient(1e-3);
        let force = SpringForce::new().spring_force(&spring, &items, &mut rng);
        assert!((force[0] - 0.01).abs() < 1e-7);
    }

    #[test]
    fn test_retuning_defaults_affects_plain_springs() {
        let mut spring_force = SpringForce::new();
        spring_force.set_param(SpringForce::DEFAULT_LENGTH, 80.0).unwrap();
        assert_eq!(spring_force.resolve(&Spring::new(0, 1)), (1e-4, 80.0));
        assert!(spring_force.set_param(SpringForce::SPRING_COEFFICIENT, 0.5).is_err());
    }

    #[test]
    fn test_zero_length_is_finite() {
        let mut rng = SimRng::seed_from_u64(2);
        let items = pair(0.0);
        let force = SpringForce::new().spring_force(&Spring::new(0, 1), &items, &mut rng);
        assert!(force[0].is_finite() && force[1].is_finite());
    }
}
