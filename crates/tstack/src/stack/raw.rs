//! Owned, uninitialized element array
//!
//! # Safety
//!
//! `RawArray` owns one block of `cap` elements acquired through
//! [`BulkAllocator::allocate_contiguous`] and releases it exactly once through
//! [`BulkAllocator::deallocate_contiguous`] with the same element layout and
//! count. It never reads or drops elements; the owning stack tracks which
//! slots are initialized.
//!
//! ## Invariants
//!
//! - `cap == 0` means no block is held and `ptr` is dangling
//! - `cap > 0` means `ptr` is a live block of exactly `cap` elements
//! - The block is only ever touched through the array-form calls

use core::alloc::Layout;
use core::marker::PhantomData;
use core::ptr::{self, NonNull};

use crate::allocator::{BulkAllocator, array_layout};
use crate::error::{Result, StackError};

pub(crate) struct RawArray<T, A: BulkAllocator> {
    ptr: NonNull<T>,
    cap: usize,
    alloc: A,
    _marker: PhantomData<T>,
}

impl<T, A: BulkAllocator> RawArray<T, A> {
    /// Holds no block until the first `reallocate`
    pub(crate) const fn new_in(alloc: A) -> Self {
        Self {
            ptr: NonNull::dangling(),
            cap: 0,
            alloc,
            _marker: PhantomData,
        }
    }

    /// Acquires a block of `cap` elements up front
    pub(crate) fn with_capacity_in(cap: usize, alloc: A) -> Result<Self> {
        let mut raw = Self::new_in(alloc);
        if cap > 0 {
            raw.reallocate(cap, 0)?;
        }
        Ok(raw)
    }

    #[inline]
    pub(crate) fn ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    /// Moves the first `len` elements into a new block of `new_cap` and
    /// releases the old block
    ///
    /// On error nothing changes: the old block and its elements stay valid.
    pub(crate) fn reallocate(&mut self, new_cap: usize, len: usize) -> Result<()> {
        debug_assert!(len <= self.cap && len <= new_cap);

        let new_ptr = self.acquire(new_cap)?;

        if len > 0 {
            // SAFETY: both blocks hold at least `len` elements, they are
            // distinct allocations, and the first `len` old slots are
            // initialized. The moved-from slots are released below without
            // being dropped.
            unsafe { ptr::copy_nonoverlapping(self.ptr.as_ptr(), new_ptr.as_ptr(), len) };
        }

        self.release();
        self.ptr = new_ptr;
        self.cap = new_cap;
        Ok(())
    }

    fn acquire(&self, count: usize) -> Result<NonNull<T>> {
        let element = Layout::new::<T>();
        let total = array_layout(element, count)?;

        let max_size = self.alloc.max_allocation_size();
        if total.size() > max_size {
            return Err(StackError::allocation_too_large(total.size(), max_size));
        }

        // SAFETY: the total layout was checked above; the returned block is
        // only accessed as `count` elements of T.
        let block = unsafe { self.alloc.allocate_contiguous(element, count)? };
        Ok(block.cast::<T>())
    }

    fn release(&mut self) {
        if self.cap == 0 {
            return;
        }

        // SAFETY: cap > 0 means ptr is the live block acquired by `acquire`
        // with this element layout and count.
        unsafe {
            self.alloc
                .deallocate_contiguous(self.ptr.cast(), Layout::new::<T>(), self.cap);
        }
        self.ptr = NonNull::dangling();
        self.cap = 0;
    }
}

impl<T, A: BulkAllocator> Drop for RawArray<T, A> {
    fn drop(&mut self) {
        self.release();
    }
}

// SAFETY: RawArray uniquely owns its block, like Box<[T]>.
unsafe impl<T: Send, A: BulkAllocator + Send> Send for RawArray<T, A> {}

// SAFETY: shared access only hands out raw pointers; the owning stack
// turns them into &T, which is Sync when T is.
unsafe impl<T: Sync, A: BulkAllocator + Sync> Sync for RawArray<T, A> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocator::{CountExt, SystemAllocator};

    #[test]
    fn test_new_holds_nothing() {
        let counter = SystemAllocator::new().with_counting();
        let raw: RawArray<u64, _> = RawArray::new_in(&counter);
        assert_eq!(raw.capacity(), 0);
        drop(raw);
        assert_eq!(counter.array_allocations(), 0);
        assert_eq!(counter.array_deallocations(), 0);
    }

    #[test]
    fn test_reallocate_moves_prefix() {
        let counter = SystemAllocator::new().with_counting();
        let mut raw: RawArray<u32, _> = RawArray::with_capacity_in(4, &counter).unwrap();

        unsafe {
            for i in 0..4 {
                raw.ptr().add(i).write(i as u32 * 10);
            }
        }
        raw.reallocate(8, 4).unwrap();

        assert_eq!(raw.capacity(), 8);
        let moved = unsafe { core::slice::from_raw_parts(raw.ptr(), 4) };
        assert_eq!(moved, &[0, 10, 20, 30]);
        assert_eq!(counter.array_allocations(), 2);
        assert_eq!(counter.array_deallocations(), 1);

        drop(raw);
        assert_eq!(counter.array_deallocations(), 2);
        assert_eq!(counter.scalar_calls(), 0);
        assert_eq!(counter.mismatched_releases(), 0);
    }

    #[test]
    fn test_failed_acquire_keeps_old_block() {
        let counter = SystemAllocator::new().with_counting();
        let mut raw: RawArray<u64, _> = RawArray::with_capacity_in(2, &counter).unwrap();

        let err = raw.reallocate(usize::MAX, 0).unwrap_err();
        assert!(err.is_allocation_error());
        assert_eq!(raw.capacity(), 2);
        assert_eq!(counter.array_allocations(), 1);
    }
}
