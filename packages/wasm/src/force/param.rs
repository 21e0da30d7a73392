//! Named, bounded numeric parameters exposed by force modules.

use serde::Serialize;

use crate::error::{LayoutError, LayoutResult};

/// A tunable force parameter with its default and allowed range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForceParam {
    /// Parameter name, unique within its force.
    pub name: &'static str,
    /// Current value.
    pub value: f32,
    /// Value restored by `reset`.
    pub default: f32,
    /// Inclusive lower bound.
    pub min: f32,
    /// Inclusive upper bound.
    pub max: f32,
}

impl ForceParam {
    /// Create a parameter holding its default value.
    pub const fn new(name: &'static str, default: f32, min: f32, max: f32) -> Self {
        Self {
            name,
            value: default,
            default,
            min,
            max,
        }
    }

    /// Whether `value` lies in the parameter's range. NaN never does.
    #[inline]
    pub fn accepts(&self, value: f32) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Set the value, rejecting anything outside `[min, max]`.
    pub fn set(&mut self, force: &'static str, value: f32) -> LayoutResult<()> {
        if !self.accepts(value) {
            return Err(LayoutError::ParamOutOfRange {
                force,
                param: self.name,
                value,
                min: self.min,
                max: self.max,
            });
        }
        self.value = value;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_holds_default() {
        let param = ForceParam::new("DragCoefficient", 0.01, 0.0, 0.1);
        assert_eq!(param.value, 0.01);
        assert_eq!(param.default, 0.01);
    }

    #[test]
    fn test_set_within_range() {
        let mut param = ForceParam::new("DragCoefficient", 0.01, 0.0, 0.1);
        param.set("DragForce", 0.1).unwrap();
        assert_eq!(param.value, 0.1);
        assert_eq!(param.default, 0.01);
    }

    #[test]
    fn test_set_rejects_out_of_range_and_nan() {
        let mut param = ForceParam::new("DragCoefficient", 0.01, 0.0, 0.1);
        assert!(param.set("DragForce", 0.2).is_err());
        assert!(param.set("DragForce", -0.01).is_err());
        assert!(param.set("DragForce", f32::NAN).is_err());
        assert_eq!(param.value, 0.01);
    }
}
