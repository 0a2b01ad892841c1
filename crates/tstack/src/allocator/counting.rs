//! Counting allocator
//!
//! Wraps another allocator and counts every acquisition and release,
//! separately for the scalar form and the array form. Test suites inject it
//! in place of the default allocator to observe how a container manages its
//! backing store.
//!
//! ## Invariants
//!
//! - Every successful acquisition is counted under the form it used
//! - Every release is counted under the form it used
//! - A release whose block was acquired through the other form, or was never
//!   acquired at all, is additionally counted as a mismatched release
//! - Failed acquisitions only bump the failure counter

use core::alloc::Layout;
use core::ptr::NonNull;
use std::collections::HashMap;

use parking_lot::Mutex;
#[cfg(feature = "logging")]
use tracing::warn;

use super::{AllocResult, Allocator, AllocatorStats, AtomicAllocatorStats, BulkAllocator};

/// Allocation form a live block was acquired with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum BlockForm {
    Scalar,
    Array,
}

/// An allocator wrapper that counts calls per allocation form
///
/// ```
/// use tstack::allocator::{CountExt, SystemAllocator};
/// use tstack::Stack;
///
/// let counter = SystemAllocator::new().with_counting();
/// let mut stack = Stack::new_in(&counter);
/// for i in 0..100 {
///     stack.push(i)?;
/// }
///
/// let stats = counter.snapshot();
/// assert_eq!(stats.scalar_allocations, 0);
/// assert_eq!(stats.array_deallocations + 1, stats.array_allocations);
/// # Ok::<(), tstack::StackError>(())
/// ```
#[derive(Debug)]
pub struct CountingAllocator<A> {
    inner: A,
    stats: AtomicAllocatorStats,
    // (address, form) -> number of live blocks; zero-sized blocks share
    // the dangling address, hence the count
    live: Mutex<HashMap<(usize, BlockForm), usize>>,
}

impl<A> CountingAllocator<A> {
    /// Creates a new CountingAllocator wrapping the provided allocator
    pub fn new(allocator: A) -> Self {
        Self {
            inner: allocator,
            stats: AtomicAllocatorStats::new(),
            live: Mutex::new(HashMap::new()),
        }
    }

    /// Gets a reference to the underlying allocator
    pub fn inner(&self) -> &A {
        &self.inner
    }

    /// Consumes the counter and returns the underlying allocator
    pub fn into_inner(self) -> A {
        self.inner
    }

    /// Number of successful array-form acquisitions
    pub fn array_allocations(&self) -> usize {
        self.stats.snapshot().array_allocations
    }

    /// Number of array-form releases
    pub fn array_deallocations(&self) -> usize {
        self.stats.snapshot().array_deallocations
    }

    /// Number of successful scalar acquisitions
    pub fn scalar_allocations(&self) -> usize {
        self.stats.snapshot().scalar_allocations
    }

    /// Scalar acquisitions and releases together
    pub fn scalar_calls(&self) -> usize {
        self.stats.snapshot().scalar_calls()
    }

    /// Releases that did not match the form of their acquisition
    pub fn mismatched_releases(&self) -> usize {
        self.stats.snapshot().mismatched_releases
    }

    /// Element count of the most recent array request
    pub fn last_array_request(&self) -> usize {
        self.stats.snapshot().last_array_request
    }

    /// Largest ratio between two consecutive array requests
    pub fn max_growth_factor(&self) -> f64 {
        self.stats.snapshot().max_growth_factor
    }

    /// Array blocks acquired through this allocator and not yet released
    pub fn outstanding_array_blocks(&self) -> usize {
        self.live
            .lock()
            .iter()
            .filter(|((_, form), _)| *form == BlockForm::Array)
            .map(|(_, live)| *live)
            .sum()
    }

    /// Check if any block acquired through this allocator is still live
    pub fn has_leaks(&self) -> bool {
        self.live.lock().values().any(|live| *live > 0)
    }

    /// Get a statistics snapshot
    pub fn snapshot(&self) -> AllocatorStats {
        self.stats.snapshot()
    }

    /// Clear the counters
    ///
    /// The live-block registry is kept, so blocks acquired before the reset
    /// can still be released without being reported as mismatched.
    pub fn reset(&self) {
        self.stats.reset();
    }

    fn register(&self, ptr: NonNull<u8>, form: BlockForm) {
        *self.live.lock().entry((ptr.as_ptr() as usize, form)).or_insert(0) += 1;
    }

    fn unregister(&self, ptr: NonNull<u8>, form: BlockForm) {
        let key = (ptr.as_ptr() as usize, form);
        let known = {
            let mut live = self.live.lock();
            match live.get(&key).copied() {
                Some(count) if count > 1 => {
                    live.insert(key, count - 1);
                    true
                }
                Some(_) => {
                    live.remove(&key);
                    true
                }
                None => false,
            }
        };

        if !known {
            self.stats.record_mismatch();
            #[cfg(feature = "logging")]
            warn!(address = key.0, form = ?form, "release does not match any live block");
        }
    }
}

// SAFETY: every call is forwarded to the inner allocator unchanged;
// counting is a side effect with no bearing on pointer validity.
unsafe impl<A: Allocator> Allocator for CountingAllocator<A> {
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        // SAFETY: forwarding with the caller's layout.
        match unsafe { self.inner.allocate(layout) } {
            Ok(ptr) => {
                self.stats.record_scalar_allocation(layout.size());
                self.register(ptr.cast(), BlockForm::Scalar);
                Ok(ptr)
            }
            Err(err) => {
                self.stats.record_allocation_failure();
                Err(err)
            }
        }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.unregister(ptr, BlockForm::Scalar);

        // SAFETY: ptr was allocated by self.inner with this layout (caller contract).
        unsafe { self.inner.deallocate(ptr, layout) };

        self.stats.record_scalar_deallocation(layout.size());
    }

    fn max_allocation_size(&self) -> usize {
        self.inner.max_allocation_size()
    }
}

// SAFETY: bulk operations are forwarded to the inner bulk allocator.
unsafe impl<A: BulkAllocator> BulkAllocator for CountingAllocator<A> {
    unsafe fn allocate_contiguous(
        &self,
        layout: Layout,
        count: usize,
    ) -> AllocResult<NonNull<[u8]>> {
        let total_size = layout.size().saturating_mul(count);

        // SAFETY: forwarding with the caller's layout and count.
        match unsafe { self.inner.allocate_contiguous(layout, count) } {
            Ok(ptr) => {
                self.stats.record_array_allocation(count, total_size);
                self.register(ptr.cast(), BlockForm::Array);
                Ok(ptr)
            }
            Err(err) => {
                self.stats.record_allocation_failure();
                Err(err)
            }
        }
    }

    unsafe fn deallocate_contiguous(&self, ptr: NonNull<u8>, layout: Layout, count: usize) {
        self.unregister(ptr, BlockForm::Array);

        // SAFETY: ptr came from self.inner.allocate_contiguous with the same
        // layout and count (caller contract).
        unsafe { self.inner.deallocate_contiguous(ptr, layout, count) };

        self.stats
            .record_array_deallocation(layout.size().saturating_mul(count));
    }
}

/// Convenience trait for wrapping an allocator with counting
pub trait CountExt: Sized {
    /// Wrap this allocator with per-form call counting
    fn with_counting(self) -> CountingAllocator<Self>;
}

impl<A> CountExt for A {
    fn with_counting(self) -> CountingAllocator<Self> {
        CountingAllocator::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::SystemAllocator;

    #[test]
    fn test_array_form_counted_separately() {
        let allocator = SystemAllocator::new().with_counting();
        let layout = Layout::new::<u64>();

        unsafe {
            let ptr = allocator.allocate_contiguous(layout, 4).unwrap();
            assert_eq!(allocator.array_allocations(), 1);
            assert_eq!(allocator.scalar_allocations(), 0);
            assert_eq!(allocator.snapshot().allocated_bytes, 32);
            assert_eq!(allocator.outstanding_array_blocks(), 1);

            allocator.deallocate_contiguous(ptr.cast(), layout, 4);
        }

        assert_eq!(allocator.array_deallocations(), 1);
        assert_eq!(allocator.snapshot().allocated_bytes, 0);
        assert!(!allocator.has_leaks());
        assert_eq!(allocator.mismatched_releases(), 0);
    }

    #[test]
    fn test_scalar_form_counted() {
        let allocator = SystemAllocator::new().with_counting();
        let layout = Layout::new::<u32>();

        unsafe {
            let ptr = allocator.allocate(layout).unwrap();
            allocator.deallocate(ptr.cast(), layout);
        }

        assert_eq!(allocator.scalar_calls(), 2);
        assert_eq!(allocator.array_allocations(), 0);
        assert_eq!(allocator.mismatched_releases(), 0);
    }

    #[test]
    fn test_array_block_released_as_scalar_is_mismatch() {
        let allocator = SystemAllocator::new().with_counting();
        let element = Layout::new::<u64>();
        let total = Layout::array::<u64>(4).unwrap();

        unsafe {
            let ptr = allocator.allocate_contiguous(element, 4).unwrap();
            allocator.deallocate(ptr.cast(), total);
        }

        assert_eq!(allocator.mismatched_releases(), 1);
        assert_eq!(allocator.outstanding_array_blocks(), 1);
    }

    #[test]
    fn test_zero_sized_blocks_share_address() {
        let allocator = SystemAllocator::new().with_counting();
        let layout = Layout::new::<()>();

        unsafe {
            let a = allocator.allocate_contiguous(layout, 8).unwrap();
            let b = allocator.allocate_contiguous(layout, 16).unwrap();
            assert_eq!(allocator.outstanding_array_blocks(), 2);

            allocator.deallocate_contiguous(a.cast(), layout, 8);
            allocator.deallocate_contiguous(b.cast(), layout, 16);
        }

        assert_eq!(allocator.mismatched_releases(), 0);
        assert!(!allocator.has_leaks());
    }

    #[test]
    fn test_growth_factor_and_last_request() {
        let allocator = SystemAllocator::new().with_counting();
        let layout = Layout::new::<u8>();

        unsafe {
            let a = allocator.allocate_contiguous(layout, 32).unwrap();
            let b = allocator.allocate_contiguous(layout, 96).unwrap();
            allocator.deallocate_contiguous(a.cast(), layout, 32);
            allocator.deallocate_contiguous(b.cast(), layout, 96);
        }

        assert_eq!(allocator.last_array_request(), 96);
        assert_eq!(allocator.max_growth_factor(), 3.0);
    }

    #[test]
    fn test_reset_keeps_live_blocks() {
        let allocator = SystemAllocator::new().with_counting();
        let layout = Layout::new::<u16>();

        unsafe {
            let ptr = allocator.allocate_contiguous(layout, 2).unwrap();
            allocator.reset();
            assert_eq!(allocator.array_allocations(), 0);

            allocator.deallocate_contiguous(ptr.cast(), layout, 2);
        }

        assert_eq!(allocator.array_deallocations(), 1);
        assert_eq!(allocator.mismatched_releases(), 0);
    }

    #[test]
    fn test_into_inner() {
        let counting = CountingAllocator::new(SystemAllocator::new());
        assert_eq!(*counting.inner(), SystemAllocator::new());
        let _system: SystemAllocator = counting.into_inner();
    }
}
