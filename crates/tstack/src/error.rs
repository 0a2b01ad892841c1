//! Error types for tstack
//!
//! Uses thiserror for clean, idiomatic Rust error definitions.

use core::alloc::Layout;
use thiserror::Error;

#[cfg(feature = "logging")]
use tracing::{error, warn};

// ============================================================================
// Main Error Types
// ============================================================================

/// Errors raised by the stack and its allocators
#[must_use = "errors should be handled"]
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StackError {
    // --- Container Errors ---
    #[error("Stack underflow: {operation} on an empty stack")]
    Underflow { operation: &'static str },

    // --- Allocation Errors ---
    #[error("Memory allocation failed: {size} bytes with {align} byte alignment")]
    AllocationFailed { size: usize, align: usize },

    #[error("Capacity overflow while growing from {capacity} elements")]
    CapacityOverflow { capacity: usize },

    #[error("Invalid memory layout: {reason}")]
    InvalidLayout { reason: String },

    #[error("Allocation exceeds maximum size: {size} bytes (max: {max_size})")]
    ExceedsMaxSize { size: usize, max_size: usize },

    // --- Configuration Errors ---
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl StackError {
    /// Get error code for categorization
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Underflow { .. } => "STACK:UNDERFLOW",
            Self::AllocationFailed { .. } => "STACK:ALLOC:FAILED",
            Self::CapacityOverflow { .. } => "STACK:ALLOC:OVERFLOW",
            Self::InvalidLayout { .. } => "STACK:ALLOC:LAYOUT",
            Self::ExceedsMaxSize { .. } => "STACK:ALLOC:MAX",
            Self::InvalidConfig { .. } => "STACK:CONFIG:INVALID",
        }
    }

    /// Whether the error came from the allocator rather than from misuse
    #[must_use]
    pub fn is_allocation_error(&self) -> bool {
        matches!(
            self,
            Self::AllocationFailed { .. }
                | Self::CapacityOverflow { .. }
                | Self::InvalidLayout { .. }
                | Self::ExceedsMaxSize { .. }
        )
    }

    /// Check if this is an underflow error
    #[must_use]
    pub fn is_underflow(&self) -> bool {
        matches!(self, Self::Underflow { .. })
    }

    // ============================================================================
    // Convenience Constructors
    // ============================================================================

    /// Create underflow error for the named operation
    #[must_use]
    pub fn underflow(operation: &'static str) -> Self {
        Self::Underflow { operation }
    }

    /// Create allocation failed error
    pub fn allocation_failed(size: usize, align: usize) -> Self {
        #[cfg(feature = "logging")]
        error!(size, align, "array allocation failed");

        Self::AllocationFailed { size, align }
    }

    /// Create allocation failed error from layout
    pub fn allocation_failed_with_layout(layout: Layout) -> Self {
        Self::allocation_failed(layout.size(), layout.align())
    }

    /// Create capacity overflow error
    pub fn capacity_overflow(capacity: usize) -> Self {
        #[cfg(feature = "logging")]
        warn!(capacity, "capacity computation overflowed");

        Self::CapacityOverflow { capacity }
    }

    /// Create invalid layout error
    pub fn invalid_layout(reason: &str) -> Self {
        Self::InvalidLayout {
            reason: reason.to_string(),
        }
    }

    /// Create allocation too large error
    #[must_use]
    pub fn allocation_too_large(size: usize, max_size: usize) -> Self {
        Self::ExceedsMaxSize { size, max_size }
    }

    /// Create invalid config error
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// Result type for stack operations
pub type Result<T> = core::result::Result<T, StackError>;

/// Aliases used by the allocator module
pub type AllocError = StackError;
pub type AllocResult<T> = Result<T>;
