//! Many-body attraction/repulsion with Barnes-Hut approximation.

use super::{Force, ForceKind, ForceParam, JITTER, SimRng, jitter};
use crate::sim::PointMass;
use crate::spatial::{Interaction, QuadTree};

/// Pairwise inverse-square force between every pair of point masses.
///
/// A negative gravitational constant repels, a positive one attracts. When
/// the simulator provides a quadtree, far-away groups are collapsed into
/// their center of mass whenever `cell size / distance < theta`; without a
/// tree every pair is evaluated exactly.
#[derive(Debug, Clone)]
pub struct NBodyForce {
    params: [ForceParam; 3],
}

impl NBodyForce {
    pub const GRAVITATIONAL_CONST: &'static str = "GravitationalConstant";
    /// Pairs farther apart than this do not interact. Negative disables the cutoff.
    pub const DISTANCE: &'static str = "Distance";
    pub const BARNES_HUT_THETA: &'static str = "BarnesHutTheta";

    const CONST: usize = 0;
    const DIST: usize = 1;
    const THETA: usize = 2;

    pub fn new() -> Self {
        Self {
            params: [
                ForceParam::new(Self::GRAVITATIONAL_CONST, -1.0, -10.0, 10.0),
                ForceParam::new(Self::DISTANCE, -1.0, -1.0, 500.0),
                ForceParam::new(Self::BARNES_HUT_THETA, 0.9, 0.0, 1.0),
            ],
        }
    }

    #[inline]
    pub fn gravitational_constant(&self) -> f32 {
        self.params[Self::CONST].value
    }

    #[inline]
    pub fn theta(&self) -> f32 {
        self.params[Self::THETA].value
    }

    /// Exact O(n) evaluation against every other point mass.
    pub fn exact_force(&self, index: usize, items: &[PointMass], rng: &mut SimRng) -> [f32; 2] {
        self.item_force(index, items, None, rng)
    }

    fn accumulate(
        &self,
        item: &PointMass,
        source: [f32; 2],
        source_mass: f32,
        rng: &mut SimRng,
        force: &mut [f32; 2],
    ) {
        let mut dx = source[0] - item.position[0];
        let mut dy = source[1] - item.position[1];
        let mut r = dx.hypot(dy);
        if !r.is_finite() {
            return;
        }
        if r == 0.0 {
            [dx, dy] = jitter(rng);
            r = JITTER;
        }

        let cutoff = self.params[Self::DIST].value;
        if cutoff > 0.0 && r > cutoff {
            return;
        }

        let v = self.gravitational_constant() * item.mass * source_mass / (r * r * r);
        force[0] += v * dx;
        force[1] += v * dy;
    }
}

impl Default for NBodyForce {
    fn default() -> Self {
        Self::new()
    }
}

impl Force for NBodyForce {
    fn name(&self) -> &'static str {
        "NBodyForce"
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

    fn requires_spatial_index(&self) -> bool {
        true
    }

    fn item_force(
        &self,
        index: usize,
        items: &[PointMass],
        tree: Option<&QuadTree>,
        rng: &mut SimRng,
    ) -> [f32; 2] {
        let mut force = [0.0; 2];
        if self.gravitational_constant() == 0.0 {
            return force;
        }
        let item = &items[index];

        match tree {
            Some(tree) => {
                tree.for_each_interaction(item.position, self.theta(), |interaction| {
                    match interaction {
                        Interaction::Body(j) if j == index => {}
                        Interaction::Body(j) => {
                            let other = &items[j];
                            self.accumulate(item, other.position, other.mass, rng, &mut force);
                        }
                        Interaction::Cluster { mass, center } => {
                            self.accumulate(item, center, mass, rng, &mut force);
                        }
                    }
                });
            }
            None => {
                for (j, other) in items.iter().enumerate() {
                    if j != index {
                        self.accumulate(item, other.position, other.mass, rng, &mut force);
                    }
                }
            }
        }
        force
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spatial::DEFAULT_TREE_DEPTH;
    use rand::{Rng, SeedableRng};

    fn cloud(count: usize, seed: u64) -> Vec<PointMass> {
        let mut rng = SimRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                let p = [rng.random_range(0.0..500.0), rng.random_range(0.0..500.0)];
                PointMass::new(p, rng.random_range(0.5..2.0)).unwrap()
            })
            .collect()
    }

    fn relative_error(force: &NBodyForce, items: &[PointMass], tree: &QuadTree) -> f32 {
        let mut rng = SimRng::seed_from_u64(0);
        let mut error = 0.0;
        let mut total = 0.0;
        for i in 0..items.len() {
            let exact = force.exact_force(i, items, &mut rng);
            let approx = force.item_force(i, items, Some(tree), &mut rng);
            error += (approx[0] - exact[0]).hypot(approx[1] - exact[1]);
            total += exact[0].hypot(exact[1]);
        }
        error / total
    }

    #[test]
    fn test_exact_pair_obeys_third_law() {
        let mut rng = SimRng::seed_from_u64(1);
        let items = [
            PointMass::new([0.0, 0.0], 1.0).unwrap(),
            PointMass::new([10.0, 5.0], 3.0).unwrap(),
        ];
        let force = NBodyForce::new();
        let on_a = force.exact_force(0, &items, &mut rng);
        let on_b = force.exact_force(1, &items, &mut rng);

        assert!((on_a[0] + on_b[0]).abs() < 1e-9);
        assert!((on_a[1] + on_b[1]).abs() < 1e-9);
        // Negative constant repels: a is pushed away from b.
        assert!(on_a[0] < 0.0 && on_a[1] < 0.0);
    }

    #[test]
    fn test_inverse_square_magnitude() {
        let mut rng = SimRng::seed_from_u64(1);
        let items = [
            PointMass::new([0.0, 0.0], 2.0).unwrap(),
            PointMass::new([4.0, 0.0], 2.0).unwrap(),
        ];
        let force = NBodyForce::new().exact_force(0, &items, &mut rng);
        // |F| = |G| m1 m2 / r^2 = 4 / 16
        assert!((force[0] + 0.25).abs() < 1e-6);
        assert!(force[1].abs() < 1e-9);
    }

    #[test]
    fn test_theta_zero_matches_exact() {
        let items = cloud(60, 5);
        let tree = QuadTree::build(&items, DEFAULT_TREE_DEPTH);
        let mut force = NBodyForce::new();
        force.set_param(NBodyForce::BARNES_HUT_THETA, 0.0).unwrap();

        let mut rng = SimRng::seed_from_u64(0);
        for i in 0..items.len() {
            let exact = force.exact_force(i, &items, &mut rng);
            let tree_force = force.item_force(i, &items, Some(&tree), &mut rng);
            let scale = exact[0].hypot(exact[1]).max(1e-12);
            let diff = (tree_force[0] - exact[0]).hypot(tree_force[1] - exact[1]);
            assert!(diff / scale < 1e-3, "body {i}: {tree_force:?} vs {exact:?}");
        }
    }

    #[test]
    fn test_approximation_error_shrinks_with_theta() {
        let items = cloud(200, 7);
        let tree = QuadTree::build(&items, DEFAULT_TREE_DEPTH);

        let mut errors = Vec::new();
        for theta in [0.9, 0.1] {
            let mut force = NBodyForce::new();
            force.set_param(NBodyForce::BARNES_HUT_THETA, theta).unwrap();
            errors.push(relative_error(&force, &items, &tree));
        }

        assert!(errors[1] < errors[0], "errors: {errors:?}");
        assert!(errors[1] < 0.01, "errors: {errors:?}");
    }

    #[test]
    fn test_coincident_pair_is_finite() {
        let items = [
            PointMass::new([3.0, 3.0], 1.0).unwrap(),
            PointMass::new([3.0, 3.0], 1.0).unwrap(),
        ];
        let tree = QuadTree::build(&items, DEFAULT_TREE_DEPTH);
        let force = NBodyForce::new();
        let mut rng = SimRng::seed_from_u64(9);

        for i in 0..2 {
            for f in [
                force.item_force(i, &items, Some(&tree), &mut rng),
                force.exact_force(i, &items, &mut rng),
            ] {
                assert!(f[0].is_finite() && f[1].is_finite());
                assert!(f[0] != 0.0 || f[1] != 0.0);
            }
        }
    }

    #[test]
    fn test_distance_cutoff() {
        let mut rng = SimRng::seed_from_u64(1);
        let items = [
            PointMass::new([0.0, 0.0], 1.0).unwrap(),
            PointMass::new([100.0, 0.0], 1.0).unwrap(),
        ];
        let mut force = NBodyForce::new();
        force.set_param(NBodyForce::DISTANCE, 50.0).unwrap();
        assert_eq!(force.exact_force(0, &items, &mut rng), [0.0, 0.0]);

        force.set_param(NBodyForce::DISTANCE, 200.0).unwrap();
        assert!(force.exact_force(0, &items, &mut rng)[0] < 0.0);
    }

    #[test]
    fn test_zero_constant_short_circuits() {
        let mut rng = SimRng::seed_from_u64(1);
        let items = [
            PointMass::new([0.0, 0.0], 1.0).unwrap(),
            PointMass::new([0.0, 0.0], 1.0).unwrap(),
        ];
        let mut force = NBodyForce::new();
        force.set_param(NBodyForce::GRAVITATIONAL_CONST, 0.0).unwrap();
        assert_eq!(force.exact_force(0, &items, &mut rng), [0.0, 0.0]);
    }
}
