//! Capacity growth policy
//!
//! Growth is a pure function from the current capacity to the next one so
//! it can be checked without going through the push path. Capacity grows
//! geometrically, which keeps the total cost of reallocation over N pushes
//! at O(N).

use crate::error::{Result, StackError};

/// Largest base capacity a stack may start with
pub const MAX_BASE_CAPACITY: usize = 32;

/// Base capacity used when none is configured
pub const DEFAULT_BASE_CAPACITY: usize = 32;

/// Upper bound on the multiplier applied per reallocation
pub const MAX_GROWTH_FACTOR: f64 = 8.0;

/// Geometric growth policy with a rational multiplier
///
/// The next capacity is `ceil(current * numerator / denominator)`, and
/// always at least one more than `current`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GrowthPolicy {
    numerator: usize,
    denominator: usize,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::doubling()
    }
}

impl GrowthPolicy {
    /// Multiplier of `numerator / denominator`
    ///
    /// Call [`validate`](Self::validate) before use; the constructor does
    /// not reject bad ratios so configs can be deserialized and checked
    /// in one place.
    pub const fn new(numerator: usize, denominator: usize) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// 2x per reallocation (the default)
    pub const fn doubling() -> Self {
        Self::new(2, 1)
    }

    /// 1.5x per reallocation
    pub const fn one_and_half() -> Self {
        Self::new(3, 2)
    }

    /// 4x per reallocation
    pub const fn quadrupling() -> Self {
        Self::new(4, 1)
    }

    /// The multiplier as a float
    pub fn factor(&self) -> f64 {
        if self.denominator == 0 {
            return f64::INFINITY;
        }
        self.numerator as f64 / self.denominator as f64
    }

    /// Checks the multiplier is in `(1, MAX_GROWTH_FACTOR]`
    pub fn validate(&self) -> Result<()> {
        if self.denominator == 0 {
            return Err(StackError::invalid_config(
                "growth denominator must be non-zero",
            ));
        }
        if self.numerator <= self.denominator {
            return Err(StackError::invalid_config(format!(
                "growth factor {}/{} must be greater than 1",
                self.numerator, self.denominator
            )));
        }
        if self.factor() > MAX_GROWTH_FACTOR {
            return Err(StackError::invalid_config(format!(
                "growth factor {:.2} exceeds {MAX_GROWTH_FACTOR}",
                self.factor()
            )));
        }
        Ok(())
    }

    /// Capacity to grow to from `current`
    ///
    /// An empty store grows to `base`. Returns `None` when the result does
    /// not fit in `usize`.
    pub fn next_capacity(&self, current: usize, base: usize) -> Option<usize> {
        if current == 0 {
            return Some(base.max(1));
        }

        let scaled = current
            .checked_mul(self.numerator)?
            .div_ceil(self.denominator.max(1));
        Some(scaled.max(current.checked_add(1)?))
    }
}
