//! Growable array-backed LIFO stack
//!
//! # Safety
//!
//! The stack owns a [`RawArray`] and tracks how many of its leading slots
//! hold live values:
//!
//! ## Invariants
//!
//! - `len <= buf.capacity()`
//! - Slots `[0, len)` are initialized, slots `[len, capacity)` are not
//! - `len` is updated before values are dropped or after they are written,
//!   so a panicking destructor never leaves a dropped slot counted as live

use core::fmt;
use core::ptr;
use core::slice;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

mod raw;

use raw::RawArray;

use crate::allocator::{BulkAllocator, SystemAllocator};
use crate::config::StackConfig;
use crate::error::{Result, StackError};
use crate::growth::MAX_BASE_CAPACITY;

/// A last-in-first-out stack stored in one contiguous array
///
/// The array is acquired from `A` through the array-form allocation calls
/// only. When a push finds it full, a larger array is acquired, the live
/// elements are moved over in order and the old array is released, so the
/// stack holds exactly one array at any time.
///
/// ```
/// use tstack::Stack;
///
/// let mut stack = Stack::new();
/// stack.push(1)?;
/// stack.push(2)?;
/// assert_eq!(stack.top()?, &2);
/// assert_eq!(stack.pop()?, 2);
/// assert_eq!(stack.pop()?, 1);
/// assert!(stack.pop().is_err());
/// # Ok::<(), tstack::StackError>(())
/// ```
pub struct Stack<T, A: BulkAllocator = SystemAllocator> {
    buf: RawArray<T, A>,
    len: usize,
    config: StackConfig,
}

impl<T> Stack<T> {
    /// Empty stack on the system allocator; nothing is acquired until the
    /// first push
    pub fn new() -> Self {
        Self::new_in(SystemAllocator::new())
    }

    /// Stack on the system allocator with a custom configuration
    pub fn with_config(config: StackConfig) -> Result<Self> {
        Self::with_config_in(config, SystemAllocator::new())
    }
}

impl<T> Default for Stack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: BulkAllocator> Stack<T, A> {
    /// Empty stack using `alloc`, default configuration
    pub fn new_in(alloc: A) -> Self {
        Self {
            buf: RawArray::new_in(alloc),
            len: 0,
            config: StackConfig::default(),
        }
    }

    /// Stack using `alloc` with a validated configuration
    ///
    /// With `eager_allocation` set, the base array is acquired here.
    pub fn with_config_in(config: StackConfig, alloc: A) -> Result<Self> {
        config.validate()?;

        let buf = if config.eager_allocation {
            RawArray::with_capacity_in(config.base_capacity, alloc)?
        } else {
            RawArray::new_in(alloc)
        };

        #[cfg(feature = "logging")]
        debug!(
            base_capacity = config.base_capacity,
            growth = config.growth.factor(),
            eager = config.eager_allocation,
            "created stack"
        );

        Ok(Self {
            buf,
            len: 0,
            config,
        })
    }

    /// Stack whose first array holds exactly `capacity` elements
    ///
    /// `capacity` is bounded by [`MAX_BASE_CAPACITY`] like a configured base;
    /// zero acquires nothing. Later growth follows the default policy.
    pub fn with_capacity_in(capacity: usize, alloc: A) -> Result<Self> {
        if capacity > MAX_BASE_CAPACITY {
            return Err(StackError::invalid_config(format!(
                "first array of {capacity} elements exceeds {MAX_BASE_CAPACITY}"
            )));
        }

        Ok(Self {
            buf: RawArray::with_capacity_in(capacity, alloc)?,
            len: 0,
            config: StackConfig::default(),
        })
    }

    /// Pushes `value` on top, growing the array when it is full
    ///
    /// If growing fails the stack is unchanged and `value` is dropped.
    pub fn push(&mut self, value: T) -> Result<()> {
        if self.len == self.buf.capacity() {
            self.grow()?;
        }

        // SAFETY: len < capacity after the check above, so the slot is
        // inside the block and uninitialized.
        unsafe { self.buf.ptr().add(self.len).write(value) };
        self.len += 1;
        Ok(())
    }

    /// Removes and returns the top value
    pub fn pop(&mut self) -> Result<T> {
        if self.len == 0 {
            return Err(StackError::underflow("pop"));
        }

        self.len -= 1;
        // SAFETY: slot `len` was initialized and is no longer counted as
        // live, so it is read out exactly once.
        Ok(unsafe { ptr::read(self.buf.ptr().add(self.len)) })
    }

    /// Returns the top value without removing it
    pub fn top(&self) -> Result<&T> {
        self.as_slice()
            .last()
            .ok_or_else(|| StackError::underflow("top"))
    }

    /// Returns the top value mutably without removing it
    pub fn top_mut(&mut self) -> Result<&mut T> {
        self.as_mut_slice()
            .last_mut()
            .ok_or_else(|| StackError::underflow("top"))
    }

    /// Number of values on the stack
    #[inline]
    pub fn size(&self) -> usize {
        self.len
    }

    /// Whether the stack holds no values
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of values the current array holds before it must grow
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Configuration the stack grows by
    pub fn config(&self) -> &StackConfig {
        &self.config
    }

    /// Allocator backing the stack
    pub fn allocator(&self) -> &A {
        self.buf.allocator()
    }

    /// Drops every value, keeping the current array
    pub fn clear(&mut self) {
        let len = self.len;
        self.len = 0;
        // SAFETY: the first `len` slots were initialized and are no longer
        // counted as live.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.buf.ptr(), len)) };
    }

    /// Values from bottom to top
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: the first `len` slots are initialized; for len == 0 the
        // pointer is dangling but aligned, which from_raw_parts allows.
        unsafe { slice::from_raw_parts(self.buf.ptr(), self.len) }
    }

    fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, with unique access through &mut self.
        unsafe { slice::from_raw_parts_mut(self.buf.ptr(), self.len) }
    }

    /// Iterates from bottom to top
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Pushes every value of `iter` in order, stopping at the first error
    pub fn try_extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        for value in iter {
            self.push(value)?;
        }
        Ok(())
    }

    #[cold]
    fn grow(&mut self) -> Result<()> {
        let current = self.buf.capacity();
        let next = self
            .config
            .next_capacity(current)
            .ok_or_else(|| StackError::capacity_overflow(current))?;

        self.buf.reallocate(next, self.len)?;

        #[cfg(feature = "logging")]
        trace!(from = current, to = next, len = self.len, "grew backing array");

        Ok(())
    }
}

impl<T: Clone, A: BulkAllocator + Clone> Stack<T, A> {
    /// Copies the stack into one new array of the same capacity
    pub fn try_clone(&self) -> Result<Self> {
        // the source may have grown past the base bound, so this sizes the
        // raw array directly instead of going through `with_capacity_in`
        let mut copy = Self {
            buf: RawArray::with_capacity_in(self.capacity(), self.allocator().clone())?,
            len: 0,
            config: self.config,
        };

        for value in self.iter() {
            // SAFETY: copy.len < self.len <= copy capacity, so the slot is
            // inside the block and uninitialized.
            unsafe { copy.buf.ptr().add(copy.len).write(value.clone()) };
            copy.len += 1;
        }

        Ok(copy)
    }
}

impl<T, A: BulkAllocator> Drop for Stack<T, A> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: fmt::Debug, A: BulkAllocator> fmt::Debug for Stack<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stack")
            .field("size", &self.len)
            .field("capacity", &self.capacity())
            .field("values", &self.as_slice())
            .finish()
    }
}

impl<'a, T, A: BulkAllocator> IntoIterator for &'a Stack<T, A> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
