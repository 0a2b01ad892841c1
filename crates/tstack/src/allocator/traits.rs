//! Allocator traits separating scalar and array-form allocation
//!
//! The system is built around two traits:
//! - `Allocator`: single-object (scalar) acquisition and release
//! - `BulkAllocator`: array-form acquisition and release of `count`
//!   contiguous elements sharing one layout
//!
//! Containers that own element arrays go through `BulkAllocator` only, so a
//! wrapping allocator can tell the two forms apart and report any mixing.
//!
//! # Safety
//!
//! All unsafe traits in this module impose strict contracts on implementors:
//! - **Allocator**: Returned pointers must be valid, aligned, and exclusive
//! - **BulkAllocator**: Contiguous allocation must prevent buffer overflows
//!
//! Blanket impls for `&T` forward every call to the underlying allocator and
//! introduce no additional unsafe operations.

use core::alloc::Layout;
use core::ptr::{self, NonNull};

use crate::error::{AllocError, AllocResult};

/// Scalar allocator
///
/// # Safety Requirements
///
/// Implementors must ensure that:
/// - Returned pointers are valid for the requested lifetime
/// - Memory is properly aligned according to the layout
/// - Deallocation only occurs for previously allocated pointers
/// - Layout information matches between allocation and deallocation
pub unsafe trait Allocator {
    /// Allocates memory with the given layout
    ///
    /// # Safety
    /// - Returned pointer must be valid for reads and writes
    /// - Pointer must be properly aligned according to layout
    /// - Memory content is uninitialized and must be initialized before use
    ///
    /// # Errors
    /// - Returns error if memory cannot be allocated
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>>;

    /// Deallocates memory at the given pointer with the specified layout
    ///
    /// # Safety
    /// - `ptr` must have been allocated by this allocator
    /// - `layout` must match the original allocation layout exactly
    /// - After this call, `ptr` becomes invalid and must not be used
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);

    /// Largest single request, in bytes, this allocator accepts
    ///
    /// Array acquisitions larger than this are rejected with
    /// `ExceedsMaxSize` before the allocator is called.
    fn max_allocation_size(&self) -> usize {
        isize::MAX as usize
    }
}

/// Array-form allocator
///
/// Allocates a single contiguous region able to hold `count` objects of
/// the given layout, and releases it with the same `layout` and `count`.
///
/// # Safety
/// Same requirements as [`Allocator`]; additionally the region returned by
/// `allocate_contiguous` must span `layout.size() * count` bytes.
pub unsafe trait BulkAllocator: Allocator {
    /// Allocates `count` contiguous blocks with the same layout
    ///
    /// # Safety
    /// - Same safety requirements as `allocate`
    /// - The resulting memory can be treated as an array of `count` elements
    ///
    /// # Returns
    /// - `Ok(ptr)`: Pointer to the beginning of the contiguous memory region
    /// - `Err(AllocError)`: If allocation fails or parameters are invalid
    unsafe fn allocate_contiguous(
        &self,
        layout: Layout,
        count: usize,
    ) -> AllocResult<NonNull<[u8]>> {
        if count == 0 {
            return Ok(dangling(layout));
        }

        let total_layout = array_layout(layout, count)?;

        // SAFETY: total_layout was built with overflow and size checks above;
        // alignment is preserved from the element layout.
        unsafe { self.allocate(total_layout) }
    }

    /// Deallocates a region returned by `allocate_contiguous`
    ///
    /// # Safety
    /// - `ptr` must have been allocated by this allocator using
    ///   `allocate_contiguous`
    /// - `layout` and `count` must match the original allocation exactly
    unsafe fn deallocate_contiguous(&self, ptr: NonNull<u8>, layout: Layout, count: usize) {
        if count == 0 {
            return;
        }

        let total_layout = array_layout(layout, count);
        debug_assert!(
            total_layout.is_ok(),
            "deallocate_contiguous with a layout and count allocate_contiguous rejects"
        );

        if let Ok(total_layout) = total_layout {
            // SAFETY: ptr came from allocate_contiguous with the same layout
            // and count, so total_layout reproduces the original request.
            unsafe { self.deallocate(ptr, total_layout) };
        }
    }
}

/// Empty region at a non-null address aligned for `layout`
pub(crate) fn dangling(layout: Layout) -> NonNull<[u8]> {
    // SAFETY: alignments are non-zero powers of two.
    let ptr = unsafe { NonNull::new_unchecked(ptr::without_provenance_mut::<u8>(layout.align())) };
    NonNull::slice_from_raw_parts(ptr, 0)
}

/// Computes the layout of `count` consecutive `layout`-shaped elements
pub(crate) fn array_layout(layout: Layout, count: usize) -> AllocResult<Layout> {
    let total_size = layout
        .size()
        .checked_mul(count)
        .ok_or_else(|| AllocError::capacity_overflow(count))?;

    if total_size > isize::MAX as usize - (layout.align() - 1) {
        return Err(AllocError::allocation_too_large(
            total_size,
            isize::MAX as usize,
        ));
    }

    Layout::from_size_align(total_size, layout.align())
        .map_err(|_| AllocError::invalid_layout("invalid array layout"))
}

// ============================================================================
// Blanket implementations for references
// ============================================================================

// SAFETY: forwards to the underlying allocator; contracts are unchanged.
unsafe impl<T: Allocator + ?Sized> Allocator for &T {
    unsafe fn allocate(&self, layout: Layout) -> AllocResult<NonNull<[u8]>> {
        // SAFETY: same contract as T::allocate
        unsafe { (**self).allocate(layout) }
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        // SAFETY: same contract as T::deallocate
        unsafe { (**self).deallocate(ptr, layout) }
    }

    fn max_allocation_size(&self) -> usize {
        (**self).max_allocation_size()
    }
}

// SAFETY: forwards to the underlying bulk allocator; contracts are unchanged.
unsafe impl<T: BulkAllocator + ?Sized> BulkAllocator for &T {
    unsafe fn allocate_contiguous(
        &self,
        layout: Layout,
        count: usize,
    ) -> AllocResult<NonNull<[u8]>> {
        // SAFETY: same contract as T::allocate_contiguous
        unsafe { (**self).allocate_contiguous(layout, count) }
    }

    unsafe fn deallocate_contiguous(&self, ptr: NonNull<u8>, layout: Layout, count: usize) {
        // SAFETY: same contract as T::deallocate_contiguous
        unsafe { (**self).deallocate_contiguous(ptr, layout, count) }
    }
}
