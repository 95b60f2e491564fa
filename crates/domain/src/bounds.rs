//! Inclusive integer domains for bounded device attributes.

use crate::error::ValidationError;

/// An inclusive `[min, max]` domain attached to a named attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub field: &'static str,
    pub min: i64,
    pub max: i64,
}

impl Bounds {
    #[must_use]
    pub const fn new(field: &'static str, min: i64, max: i64) -> Self {
        Self { field, min, max }
    }

    #[must_use]
    pub fn contains(&self, value: i64) -> bool {
        (self.min..=self.max).contains(&value)
    }

    /// Return `value` unchanged when inside the domain.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::OutOfRange`] otherwise.
    pub fn check(&self, value: i64) -> Result<i64, ValidationError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(ValidationError::OutOfRange {
                field: self.field,
                min: self.min,
                max: self.max,
                value,
            })
        }
    }

    /// Move `value` by `delta`, saturating at the domain edges.
    #[must_use]
    pub fn step(&self, value: i64, delta: i64) -> i64 {
        value.saturating_add(delta).clamp(self.min, self.max)
    }
}
