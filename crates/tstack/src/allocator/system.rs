//! System allocator implementation
//!
//! Provides an allocator that wraps the system's default memory allocator.

use core::alloc::{GlobalAlloc, Layout};
use core::ptr::NonNull;
use std::alloc::System;

use super::traits::dangling;
use super::{AllocError, AllocResult, Allocator, BulkAllocator};

/// Wrapper for the system's default allocator
///
/// Delegates all operations to [`std::alloc::System`]. Zero-sized requests
/// never reach the system allocator; they get a dangling, well-aligned
/// pointer instead.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SystemAllocator;

impl SystemAllocator {
    /// Creates a new SystemAllocator
    #[inline]
    pub const fn new() -> Self {
        SystemAllocator
    }
}

// SAFETY: pointers come straight from `System` with the caller's layout;
// zero-sized requests return a dangling pointer that is never dereferenced.
unsafe impl Allocator for SystemAllocator {
    #[inline]
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        if layout.size() == 0 {
            return Ok(dangling(layout));
        }

        // SAFETY: layout has non-zero size (checked above).
        let ptr = unsafe { System.alloc(layout) };

        match NonNull::new(ptr) {
            Some(non_null) => Ok(NonNull::slice_from_raw_parts(non_null, layout.size())),
            None => Err(AllocError::allocation_failed_with_layout(layout)),
        }
    }

    #[inline]
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }

        // SAFETY: ptr was returned by System.alloc with this layout (caller contract).
        unsafe { System.dealloc(ptr.as_ptr(), layout) };
    }
}

// No special bulk path; the trait defaults compute the total layout.
// SAFETY: default methods delegate to the sound scalar implementation above.
unsafe impl BulkAllocator for SystemAllocator {}
