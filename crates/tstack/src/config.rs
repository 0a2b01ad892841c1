//! Stack configuration

use crate::error::{Result, StackError};
use crate::growth::{DEFAULT_BASE_CAPACITY, GrowthPolicy, MAX_BASE_CAPACITY};

/// Configuration for a [`Stack`](crate::Stack)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StackConfig {
    /// Elements in the first backing array, `1..=MAX_BASE_CAPACITY`
    pub base_capacity: usize,

    /// Multiplier applied when the array is full
    pub growth: GrowthPolicy,

    /// Acquire the base array at construction instead of on first push
    pub eager_allocation: bool,
}

impl Default for StackConfig {
    fn default() -> Self {
        Self {
            base_capacity: DEFAULT_BASE_CAPACITY,
            growth: GrowthPolicy::doubling(),
            eager_allocation: false,
        }
    }
}

impl StackConfig {
    /// Small base array with 1.5x growth, for many short-lived stacks
    #[must_use]
    pub fn compact() -> Self {
        Self {
            base_capacity: 4,
            growth: GrowthPolicy::one_and_half(),
            eager_allocation: false,
        }
    }

    /// Default sizing, base array acquired at construction
    #[must_use]
    pub fn eager() -> Self {
        Self {
            eager_allocation: true,
            ..Self::default()
        }
    }

    /// Default sizing, nothing acquired until the first push
    #[must_use]
    pub fn lazy() -> Self {
        Self::default()
    }

    /// Set the base capacity
    #[must_use = "builder methods must be chained or built"]
    pub fn with_base_capacity(mut self, base_capacity: usize) -> Self {
        self.base_capacity = base_capacity;
        self
    }

    /// Set the growth policy
    #[must_use = "builder methods must be chained or built"]
    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }

    /// Choose eager or lazy base allocation
    #[must_use = "builder methods must be chained or built"]
    pub fn with_eager_allocation(mut self, eager: bool) -> Self {
        self.eager_allocation = eager;
        self
    }

    /// Check the base capacity and growth policy
    pub fn validate(&self) -> Result<()> {
        if self.base_capacity == 0 {
            return Err(StackError::invalid_config("base capacity must be non-zero"));
        }
        if self.base_capacity > MAX_BASE_CAPACITY {
            return Err(StackError::invalid_config(format!(
                "base capacity {} exceeds {MAX_BASE_CAPACITY}",
                self.base_capacity
            )));
        }
        self.growth.validate()
    }

    /// Capacity to grow to from `current` under this configuration
    pub fn next_capacity(&self, current: usize) -> Option<usize> {
        self.growth.next_capacity(current, self.base_capacity)
    }
}
