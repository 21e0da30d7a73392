//! Error type for the layout engine.
//!
//! Every configuration mistake is reported synchronously when a value is
//! handed to the engine (constructors and setters). A simulation step never
//! fails on state that was already accepted.

use thiserror::Error;

/// Errors raised while configuring forces, the simulator, or the layout driver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    /// A force parameter was set outside its declared range.
    #[error("parameter `{param}` of {force} must lie in [{min}, {max}], got {value}")]
    ParamOutOfRange {
        force: &'static str,
        param: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },

    /// The named parameter does not exist on the force.
    #[error("{force} has no parameter named `{param}`")]
    UnknownParam { force: &'static str, param: String },

    /// No registered force carries the given name.
    #[error("no force named `{0}` is registered")]
    UnknownForce(String),

    /// Point masses must carry a positive, finite mass.
    #[error("point mass must be positive and finite, got {0}")]
    InvalidMass(f32),

    /// The quadtree depth limit is outside `1..=MAX_TREE_DEPTH`.
    #[error("quadtree depth must lie in 1..={max}, got {depth}")]
    InvalidTreeDepth { depth: u32, max: u32 },

    /// A spring references a point mass that was never added.
    #[error("spring endpoint {index} is out of range for {count} point masses")]
    SpringEndpointOutOfRange { index: usize, count: usize },

    /// The velocity ceiling must be positive and finite.
    #[error("speed limit must be positive and finite, got {0}")]
    InvalidSpeedLimit(f32),

    /// Timestep ceilings must be positive and finite.
    #[error("timestep ceiling must be positive and finite, got {0}")]
    InvalidTimestep(f32),

    /// A bounding rectangle must have finite corners with min < max.
    #[error("invalid bounds [{min_x}, {min_y}] - [{max_x}, {max_y}]")]
    InvalidBounds {
        min_x: f32,
        min_y: f32,
        max_x: f32,
        max_y: f32,
    },

    /// The fallback start position must be finite.
    #[error("anchor position must be finite, got [{0}, {1}]")]
    InvalidAnchor(f32, f32),

    /// A node's visual extent must be finite and non-negative.
    #[error("node extent must be finite and non-negative, got {0}")]
    InvalidExtent(f32),

    /// A circular wall needs a positive radius and a finite center.
    #[error("circular wall radius must be positive and finite, got {0}")]
    InvalidWallRadius(f32),

    /// The run-once annealing schedule is unusable.
    #[error("invalid annealing schedule: {0}")]
    InvalidSchedule(String),
}

/// Result type for layout engine operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_out_of_range_message() {
        let err = LayoutError::ParamOutOfRange {
            force: "DragForce",
            param: "DragCoefficient",
            value: 0.5,
            min: 0.0,
            max: 0.1,
        };
        assert_eq!(
            err.to_string(),
            "parameter `DragCoefficient` of DragForce must lie in [0, 0.1], got 0.5"
        );
    }

    #[test]
    fn test_invalid_mass_message() {
        assert_eq!(
            LayoutError::InvalidMass(-1.0).to_string(),
            "point mass must be positive and finite, got -1"
        );
    }
}
