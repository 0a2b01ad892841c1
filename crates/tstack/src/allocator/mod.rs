//! Injectable allocators for the stack's backing store
//!
//! The stack acquires and releases its element array only through
//! [`BulkAllocator`]. [`SystemAllocator`] is the default; wrapping any
//! allocator in a [`CountingAllocator`] makes every call observable.

mod counting;
mod stats;
mod system;
mod traits;

pub use crate::error::{AllocError, AllocResult};
pub use counting::{CountExt, CountingAllocator};
pub use stats::{AllocatorStats, AtomicAllocatorStats};
pub use system::SystemAllocator;
pub use traits::{Allocator, BulkAllocator};
pub(crate) use traits::array_layout;
