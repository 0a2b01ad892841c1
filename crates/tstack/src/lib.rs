//! # tstack
//!
//! A growable last-in-first-out stack backed by a single contiguous array,
//! and the allocator plumbing needed to check how it manages that array.
//!
//! - [`Stack`]: push / pop / top over one heap array that grows
//!   geometrically when full (amortized O(1) push)
//! - [`GrowthPolicy`]: the growth rule as a pure function
//! - [`allocator`]: scalar and array-form allocator traits, the system
//!   allocator and a [`CountingAllocator`](allocator::CountingAllocator)
//!   that records every call
//!
//! ## Quick Start
//!
//! ```rust
//! use tstack::prelude::*;
//!
//! let counter = SystemAllocator::new().with_counting();
//! let mut stack = Stack::new_in(&counter);
//!
//! for i in 0..33 {
//!     stack.push(i)?;
//! }
//!
//! // base array of 32, one growth on the 33rd push
//! assert_eq!(counter.array_allocations(), 2);
//! assert_eq!(counter.array_deallocations(), 1);
//! assert_eq!(counter.scalar_calls(), 0);
//! # Ok::<(), StackError>(())
//! ```
//!
//! ## Features
//!
//! - `logging` (default): growth and allocation-failure events via `tracing`
//! - `serde`: serialize [`StackConfig`], [`GrowthPolicy`] and
//!   [`AllocatorStats`](allocator::AllocatorStats)

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod allocator;
pub mod config;
pub mod error;
pub mod growth;
pub mod stack;

pub use crate::config::StackConfig;
pub use crate::error::{Result, StackError};
pub use crate::growth::GrowthPolicy;
pub use crate::stack::Stack;

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::allocator::{
        Allocator, AllocatorStats, BulkAllocator, CountExt, CountingAllocator, SystemAllocator,
    };
    pub use crate::config::StackConfig;
    pub use crate::error::{Result, StackError};
    pub use crate::growth::{GrowthPolicy, MAX_BASE_CAPACITY, MAX_GROWTH_FACTOR};
    pub use crate::stack::Stack;
}
