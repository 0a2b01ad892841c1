//! Allocation statistics
//!
//! Counters are split by allocation form so callers can check that a
//! container only ever used the array form.

use core::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Snapshot of allocation counters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AllocatorStats {
    /// Successful array-form acquisitions
    pub array_allocations: usize,
    /// Array-form releases
    pub array_deallocations: usize,
    /// Successful scalar acquisitions
    pub scalar_allocations: usize,
    /// Scalar releases
    pub scalar_deallocations: usize,
    /// Releases through the wrong form or of unknown blocks
    pub mismatched_releases: usize,
    /// Failed acquisitions of either form
    pub failed_allocations: usize,
    /// Bytes currently held
    pub allocated_bytes: usize,
    /// Highest value `allocated_bytes` reached
    pub peak_allocated_bytes: usize,
    /// Element count of the most recent array request
    pub last_array_request: usize,
    /// Byte size of the most recent array request
    pub last_array_bytes: usize,
    /// Largest ratio between two consecutive array requests
    pub max_growth_factor: f64,
}

impl AllocatorStats {
    /// Creates a new empty stats object
    pub const fn new() -> Self {
        Self {
            array_allocations: 0,
            array_deallocations: 0,
            scalar_allocations: 0,
            scalar_deallocations: 0,
            mismatched_releases: 0,
            failed_allocations: 0,
            allocated_bytes: 0,
            peak_allocated_bytes: 0,
            last_array_request: 0,
            last_array_bytes: 0,
            max_growth_factor: 0.0,
        }
    }

    /// Total scalar calls, acquisitions and releases together
    pub fn scalar_calls(&self) -> usize {
        self.scalar_allocations + self.scalar_deallocations
    }

    /// Array acquisitions minus array releases
    pub fn array_balance(&self) -> isize {
        self.array_allocations as isize - self.array_deallocations as isize
    }

    /// Check if any array or scalar block is still live
    pub fn has_active_allocations(&self) -> bool {
        self.array_allocations > self.array_deallocations
            || self.scalar_allocations > self.scalar_deallocations
    }

    /// True when no scalar call and no mismatched release was seen
    pub fn is_array_only(&self) -> bool {
        self.scalar_calls() == 0 && self.mismatched_releases == 0
    }
}

impl core::fmt::Display for AllocatorStats {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Allocator Statistics:")?;
        writeln!(f, "  Array allocations: {}", self.array_allocations)?;
        writeln!(f, "  Array deallocations: {}", self.array_deallocations)?;
        writeln!(f, "  Scalar allocations: {}", self.scalar_allocations)?;
        writeln!(f, "  Scalar deallocations: {}", self.scalar_deallocations)?;
        writeln!(f, "  Mismatched releases: {}", self.mismatched_releases)?;
        writeln!(f, "  Failed allocations: {}", self.failed_allocations)?;
        writeln!(f, "  Current allocated: {} bytes", self.allocated_bytes)?;
        writeln!(f, "  Peak allocated: {} bytes", self.peak_allocated_bytes)?;
        writeln!(
            f,
            "  Last array request: {} elements ({} bytes)",
            self.last_array_request, self.last_array_bytes
        )?;
        writeln!(f, "  Max growth factor: {:.2}x", self.max_growth_factor)
    }
}

/// Thread-safe atomic version of allocator statistics
#[derive(Debug, Default)]
pub struct AtomicAllocatorStats {
    array_allocations: AtomicUsize,
    array_deallocations: AtomicUsize,
    scalar_allocations: AtomicUsize,
    scalar_deallocations: AtomicUsize,
    mismatched_releases: AtomicUsize,
    failed_allocations: AtomicUsize,
    allocated_bytes: AtomicUsize,
    peak_allocated_bytes: AtomicUsize,
    last_array_request: AtomicUsize,
    last_array_bytes: AtomicUsize,
    // f64 bit pattern; only non-negative values are stored, whose bit
    // patterns order the same way as the floats
    max_growth_factor: AtomicU64,
}

impl AtomicAllocatorStats {
    /// Creates a new empty atomic stats object
    pub const fn new() -> Self {
        Self {
            array_allocations: AtomicUsize::new(0),
            array_deallocations: AtomicUsize::new(0),
            scalar_allocations: AtomicUsize::new(0),
            scalar_deallocations: AtomicUsize::new(0),
            mismatched_releases: AtomicUsize::new(0),
            failed_allocations: AtomicUsize::new(0),
            allocated_bytes: AtomicUsize::new(0),
            peak_allocated_bytes: AtomicUsize::new(0),
            last_array_request: AtomicUsize::new(0),
            last_array_bytes: AtomicUsize::new(0),
            max_growth_factor: AtomicU64::new(0),
        }
    }

    /// Reset all statistics to zero
    pub fn reset(&self) {
        self.array_allocations.store(0, Ordering::Relaxed);
        self.array_deallocations.store(0, Ordering::Relaxed);
        self.scalar_allocations.store(0, Ordering::Relaxed);
        self.scalar_deallocations.store(0, Ordering::Relaxed);
        self.mismatched_releases.store(0, Ordering::Relaxed);
        self.failed_allocations.store(0, Ordering::Relaxed);
        self.allocated_bytes.store(0, Ordering::Relaxed);
        self.peak_allocated_bytes.store(0, Ordering::Relaxed);
        self.last_array_request.store(0, Ordering::Relaxed);
        self.last_array_bytes.store(0, Ordering::Relaxed);
        self.max_growth_factor.store(0, Ordering::Relaxed);
    }

    /// Record a successful array-form acquisition of `count` elements
    pub fn record_array_allocation(&self, count: usize, bytes: usize) {
        self.array_allocations.fetch_add(1, Ordering::Relaxed);
        self.last_array_bytes.store(bytes, Ordering::Relaxed);

        let previous = self.last_array_request.swap(count, Ordering::Relaxed);
        if previous > 0 {
            let factor = count as f64 / previous as f64;
            self.max_growth_factor
                .fetch_max(factor.to_bits(), Ordering::Relaxed);
        }

        self.add_bytes(bytes);
    }

    /// Record an array-form release
    pub fn record_array_deallocation(&self, bytes: usize) {
        self.array_deallocations.fetch_add(1, Ordering::Relaxed);
        self.sub_bytes(bytes);
    }

    /// Record a successful scalar acquisition
    pub fn record_scalar_allocation(&self, bytes: usize) {
        self.scalar_allocations.fetch_add(1, Ordering::Relaxed);
        self.add_bytes(bytes);
    }

    /// Record a scalar release
    pub fn record_scalar_deallocation(&self, bytes: usize) {
        self.scalar_deallocations.fetch_add(1, Ordering::Relaxed);
        self.sub_bytes(bytes);
    }

    /// Record a release that did not match its acquisition
    pub fn record_mismatch(&self) {
        self.mismatched_releases.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed acquisition
    pub fn record_allocation_failure(&self) {
        self.failed_allocations.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current stats snapshot
    pub fn snapshot(&self) -> AllocatorStats {
        AllocatorStats {
            array_allocations: self.array_allocations.load(Ordering::Relaxed),
            array_deallocations: self.array_deallocations.load(Ordering::Relaxed),
            scalar_allocations: self.scalar_allocations.load(Ordering::Relaxed),
            scalar_deallocations: self.scalar_deallocations.load(Ordering::Relaxed),
            mismatched_releases: self.mismatched_releases.load(Ordering::Relaxed),
            failed_allocations: self.failed_allocations.load(Ordering::Relaxed),
            allocated_bytes: self.allocated_bytes.load(Ordering::Relaxed),
            peak_allocated_bytes: self.peak_allocated_bytes.load(Ordering::Relaxed),
            last_array_request: self.last_array_request.load(Ordering::Relaxed),
            last_array_bytes: self.last_array_bytes.load(Ordering::Relaxed),
            max_growth_factor: f64::from_bits(self.max_growth_factor.load(Ordering::Relaxed)),
        }
    }

    fn add_bytes(&self, bytes: usize) {
        let previous = self.allocated_bytes.fetch_add(bytes, Ordering::Relaxed);
        self.peak_allocated_bytes
            .fetch_max(previous.saturating_add(bytes), Ordering::Relaxed);
    }

    fn sub_bytes(&self, bytes: usize) {
        // Saturate: a mismatched release may report more than was counted
        let _ = self
            .allocated_bytes
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                Some(current.saturating_sub(bytes))
            });
    }
}
