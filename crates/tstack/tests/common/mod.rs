//! Shared helpers for integration tests

#![allow(dead_code, unsafe_code)]

use core::alloc::Layout;
use core::ptr::NonNull;
use core::sync::atomic::{AtomicUsize, Ordering};

use tracing_subscriber::filter::LevelFilter;
use tstack::allocator::{AllocResult, Allocator, BulkAllocator, SystemAllocator};
use tstack::StackError;

/// Installs a test-writer subscriber once per test binary
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(LevelFilter::TRACE)
        .try_init();
}

/// One-byte element pushed by the allocation tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Item(pub u8);

/// System-backed allocator that fails once its acquisition budget is spent
/// and advertises a byte limit per request
#[derive(Debug)]
pub struct LimitedAllocator {
    acquisitions_left: AtomicUsize,
    max_bytes: usize,
}

impl LimitedAllocator {
    /// Grants `acquisitions` successful acquisitions, then fails
    pub fn with_budget(acquisitions: usize) -> Self {
        Self {
            acquisitions_left: AtomicUsize::new(acquisitions),
            max_bytes: isize::MAX as usize,
        }
    }

    /// Unlimited acquisitions of at most `max_bytes` each
    pub fn with_max_bytes(max_bytes: usize) -> Self {
        Self {
            acquisitions_left: AtomicUsize::new(usize::MAX),
            max_bytes,
        }
    }
}

// SAFETY: successful calls are forwarded to the system allocator unchanged.
unsafe impl Allocator for LimitedAllocator {
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        let granted = self
            .acquisitions_left
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |left| {
                left.checked_sub(1)
            })
            .is_ok();
        if !granted {
            return Err(StackError::allocation_failed_with_layout(layout));
        }

        // SAFETY: forwarding with the caller's layout.
        unsafe { SystemAllocator::new().allocate(layout) }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: ptr came from the system allocator with this layout.
        unsafe { SystemAllocator::new().deallocate(ptr, layout) }
    }

    fn max_allocation_size(&self) -> usize {
        self.max_bytes
    }
}

// SAFETY: the defaults route through the scalar methods above.
unsafe impl BulkAllocator for LimitedAllocator {}
