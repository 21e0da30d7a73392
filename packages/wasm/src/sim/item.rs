//! Point-mass and spring records.
//!
//! Both are plain data. Every (x, y) quantity is a `[f32; 2]` so forces and
//! integrators can treat the two axes uniformly.

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};

/// Physics state for one graph node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointMass {
    /// Absolute position.
    pub position: [f32; 2],
    /// Current velocity.
    pub velocity: [f32; 2],
    /// Force accumulated during the current step.
    pub force: [f32; 2],
    /// Mass, always > 0.
    pub mass: f32,
    /// Fixed masses are never moved by the simulator.
    pub fixed: bool,
}

impl PointMass {
    /// Create a resting point mass at the given position.
    pub fn new(position: [f32; 2], mass: f32) -> LayoutResult<Self> {
        if !(mass.is_finite() && mass > 0.0) {
            return Err(LayoutError::InvalidMass(mass));
        }
        Ok(Self {
            position,
            velocity: [0.0; 2],
            force: [0.0; 2],
            mass,
            fixed: false,
        })
    }

    /// Speed (velocity magnitude).
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity[0].hypot(self.velocity[1])
    }

    /// Zero the force accumulator and velocity.
    #[inline]
    pub fn halt(&mut self) {
        self.force = [0.0; 2];
        self.velocity = [0.0; 2];
    }
}

/// A spring between two point masses, referenced by their simulator index.
///
/// `None` for the rest length or coefficient means the spring force's current
/// default parameter applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spring {
    /// Indices of the two endpoints in the simulator's point-mass list.
    pub endpoints: [usize; 2],
    /// Rest length override.
    pub rest_length: Option<f32>,
    /// Spring coefficient override.
    pub coefficient: Option<f32>,
}

impl Spring {
    /// Create a spring that uses the spring force's defaults.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            endpoints: [a, b],
            rest_length: None,
            coefficient: None,
        }
    }

    /// Override the rest length.
    pub fn with_rest_length(mut self, rest_length: f32) -> Self {
        self.rest_length = Some(rest_length);
        self
    }

    /// Override the spring coefficient.
    pub fn with_coefficient(mut self, coefficient: f32) -> Self {
        self.coefficient = Some(coefficient);
        self
    }
}
