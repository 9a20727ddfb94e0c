//! Growth configuration for sequences that reallocate on demand.

use crate::error::RivetError;

/// Decides the capacity a full sequence grows to.
///
/// The next capacity is `max(min_non_zero_capacity, factor * len)`. With
/// the defaults an empty sequence goes 0 → 1 → 2 → 4 → 8, so `n` appends
/// from empty reallocate `⌈log2 n⌉ + 1` times.
///
/// Fields are private so every policy satisfies `min_non_zero_capacity >= 1`
/// and `factor >= 2`; build custom policies with [`GrowthPolicy::new`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GrowthPolicy {
    min_non_zero_capacity: usize,
    factor: usize,
}

impl GrowthPolicy {
    /// Default first capacity.
    pub const DEFAULT_MIN_NON_ZERO_CAPACITY: usize = 1;

    /// Default growth multiplier.
    pub const DEFAULT_FACTOR: usize = 2;

    /// The policy every `Vector` grows with.
    pub const DEFAULT: Self = Self {
        min_non_zero_capacity: Self::DEFAULT_MIN_NON_ZERO_CAPACITY,
        factor: Self::DEFAULT_FACTOR,
    };

    /// A policy with the given first capacity and multiplier.
    ///
    /// Returns `None` if `min_non_zero_capacity` is 0 or `factor` is below
    /// 2, since either would let a full sequence stay full after growing.
    pub const fn new(min_non_zero_capacity: usize, factor: usize) -> Option<Self> {
        if min_non_zero_capacity == 0 || factor < 2 {
            return None;
        }
        Some(Self {
            min_non_zero_capacity,
            factor,
        })
    }

    /// Capacity used for the first allocation of an empty sequence.
    pub const fn min_non_zero_capacity(&self) -> usize {
        self.min_non_zero_capacity
    }

    /// Multiplier applied to the current length when growing.
    pub const fn factor(&self) -> usize {
        self.factor
    }

    /// Capacity to reallocate to when a sequence of `len` elements is full.
    ///
    /// Returns [`RivetError::CapacityOverflow`] if `factor * len` does not
    /// fit in a `usize`.
    pub fn next_capacity(&self, len: usize) -> Result<usize, RivetError> {
        let grown = len
            .checked_mul(self.factor)
            .ok_or(RivetError::CapacityOverflow { requested: len })?;
        Ok(grown.max(self.min_non_zero_capacity))
    }

    /// Capacity to reallocate to when a sequence of `len` elements needs
    /// room for `required` in total.
    ///
    /// Bulk appends grow at least as far as a single append would, so a
    /// run of small appends still reallocates only `O(log n)` times.
    pub fn capacity_for(&self, len: usize, required: usize) -> Result<usize, RivetError> {
        Ok(self.next_capacity(len)?.max(required))
    }
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}
