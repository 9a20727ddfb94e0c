//! Element transfer between and within raw blocks.
//!
//! Relocation always moves. A Rust move is a bitwise copy that cannot fail
//! partway, so the old block is never needed as a fallback and relocation
//! never requires `T: Clone`. Every path that relocates (growth, insert,
//! reserve) goes through these helpers so they all agree on that policy.
//!
//! None of these functions drop anything. After a relocation the source
//! slots are logically uninitialized and must only be freed, never dropped.

#![allow(unsafe_code)]

use std::mem;
use std::ptr;

/// Move `count` live elements from `src` into the uninitialized `dst`.
///
/// # Safety
///
/// `src` must hold `count` initialized values, `dst` must have room for
/// `count` values, and the two ranges must not overlap.
#[inline]
pub(crate) unsafe fn relocate<T>(src: *const T, dst: *mut T, count: usize) {
    // SAFETY: forwarded to the caller.
    unsafe { ptr::copy_nonoverlapping(src, dst, count) }
}

/// Open a hole at `index` by moving `[index, len)` to `[index + 1, len + 1)`.
///
/// The slot at `index` is left logically uninitialized.
///
/// # Safety
///
/// `base` must hold `len` initialized values, have room for `len + 1`, and
/// `index <= len`.
#[inline]
pub(crate) unsafe fn open_gap<T>(base: *mut T, index: usize, len: usize) {
    debug_assert!(index <= len);
    // SAFETY: both ranges lie within the `len + 1` slots of the block.
    unsafe { ptr::copy(base.add(index), base.add(index + 1), len - index) }
}

/// Close the hole at `index` by moving `[index + 1, len)` to `[index, len - 1)`.
///
/// The slot at `len - 1` is left logically uninitialized.
///
/// # Safety
///
/// `index < len`, slot `index` must already be vacated (read out), and
/// `[index + 1, len)` must hold initialized values.
#[inline]
pub(crate) unsafe fn close_gap<T>(base: *mut T, index: usize, len: usize) {
    debug_assert!(index < len);
    // SAFETY: both ranges lie within the first `len` slots of the block.
    unsafe { ptr::copy(base.add(index + 1), base.add(index), len - index - 1) }
}

/// Tracks values constructed into a fresh block one at a time.
///
/// If a constructor panics before [`finish`](PartialInit::finish), the
/// guard drops exactly the values written so far. The block itself is
/// released separately by its `RawMemory` owner.
pub(crate) struct PartialInit<T> {
    dst: *mut T,
    initialized: usize,
}

impl<T> PartialInit<T> {
    pub(crate) fn new(dst: *mut T) -> Self {
        Self {
            dst,
            initialized: 0,
        }
    }

    /// Write `value` into the next slot.
    ///
    /// # Safety
    ///
    /// The block behind `dst` must have room for one more value.
    #[inline]
    pub(crate) unsafe fn push(&mut self, value: T) {
        // SAFETY: room guaranteed by the caller.
        unsafe { self.dst.add(self.initialized).write(value) };
        self.initialized += 1;
    }

    /// Disarm the guard and return how many values were written.
    pub(crate) fn finish(self) -> usize {
        let initialized = self.initialized;
        mem::forget(self);
        initialized
    }
}

impl<T> Drop for PartialInit<T> {
    fn drop(&mut self) {
        // SAFETY: exactly `initialized` values were written from `dst`.
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(self.dst, self.initialized)) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::MaybeUninit;
    use std::panic::{self, AssertUnwindSafe};

    use rivet_test_utils::{LiveCounter, Tracked};

    #[test]
    fn open_then_close_gap_restores_order() {
        let mut block = [1u32, 2, 3, 4, 0];
        let base = block.as_mut_ptr();
        unsafe {
            open_gap(base, 1, 4);
            base.add(1).write(99);
        }
        assert_eq!(block, [1, 99, 2, 3, 4]);
        unsafe { close_gap(block.as_mut_ptr(), 1, 5) };
        assert_eq!(&block[..4], &[1, 2, 3, 4]);
    }

    #[test]
    fn relocate_copies_values_once() {
        let live = LiveCounter::new();
        let src = [Tracked::new(1, &live), Tracked::new(2, &live)];
        let mut dst: [MaybeUninit<Tracked>; 2] = [MaybeUninit::uninit(), MaybeUninit::uninit()];
        let src = mem::ManuallyDrop::new(src);
        unsafe { relocate(src.as_ptr(), dst.as_mut_ptr().cast::<Tracked>(), 2) };
        assert_eq!(live.live(), 2);
        let moved = unsafe { [dst[0].assume_init_read(), dst[1].assume_init_read()] };
        assert_eq!(moved[0].value(), 1);
        assert_eq!(moved[1].value(), 2);
        drop(moved);
        assert_eq!(live.live(), 0);
    }

    #[test]
    fn partial_init_drops_written_prefix_on_panic() {
        let live = LiveCounter::new();
        let mut block: [MaybeUninit<Tracked>; 4] = std::array::from_fn(|_| MaybeUninit::uninit());
        let dst = block.as_mut_ptr().cast::<Tracked>();

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            let mut init = PartialInit::new(dst);
            for i in 0..4 {
                if i == 3 {
                    panic!("constructor failed");
                }
                unsafe { init.push(Tracked::new(i, &live)) };
            }
            init.finish()
        }));

        assert!(result.is_err());
        assert_eq!(live.live(), 0);
    }

    #[test]
    fn finish_hands_ownership_back() {
        let live = LiveCounter::new();
        let mut block: [MaybeUninit<Tracked>; 2] = std::array::from_fn(|_| MaybeUninit::uninit());
        let dst = block.as_mut_ptr().cast::<Tracked>();
        let mut init = PartialInit::new(dst);
        unsafe {
            init.push(Tracked::new(7, &live));
            init.push(Tracked::new(8, &live));
        }
        assert_eq!(init.finish(), 2);
        assert_eq!(live.live(), 2);
        unsafe { ptr::drop_in_place(ptr::slice_from_raw_parts_mut(dst, 2)) };
        assert_eq!(live.live(), 0);
    }
}
