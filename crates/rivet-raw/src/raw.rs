//! The raw allocation holder.
//!
//! Every `unsafe` block here carries a `// SAFETY:` comment. Proptests are
//! gated on `not(miri)`; the unit tests are small enough to run under Miri.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;

use rivet_core::RivetError;

/// An owned block of uninitialized storage for `capacity` values of `T`.
///
/// The block is either empty (dangling pointer, capacity 0, nothing
/// allocated) or points at storage for exactly `capacity` elements. The
/// holder never constructs or drops a `T`; dropping it frees the block and
/// nothing else.
///
/// `RawMemory` is deliberately not `Clone`: a copy of raw storage with no
/// known live count has no meaning. Ownership moves with ordinary Rust
/// moves, and [`swap`](RawMemory::swap) exchanges two blocks in place.
///
/// Zero-sized `T` never touches the allocator; the capacity is recorded
/// as requested.
pub struct RawMemory<T> {
    ptr: NonNull<T>,
    capacity: usize,
    /// The block logically holds `T`s even though this type never drops them.
    _marker: PhantomData<T>,
}

// SAFETY: `RawMemory` owns its block exclusively, like `Box<[T]>`, so it is
// as thread-safe as the values it stores.
unsafe impl<T: Send> Send for RawMemory<T> {}
// SAFETY: shared access hands out `&T` only (see `slot`).
unsafe impl<T: Sync> Sync for RawMemory<T> {}

impl<T> RawMemory<T> {
    /// An empty holder. Does not allocate.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Reserve storage for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the byte size overflows `isize::MAX`. Allocator failure
    /// goes through [`alloc::handle_alloc_error`], as in `std`.
    pub fn with_capacity(capacity: usize) -> Self {
        let layout = match Self::layout(capacity) {
            Ok(layout) => layout,
            Err(err) => panic!("{err}"),
        };
        match Self::allocate(layout) {
            Some(ptr) => Self::from_parts(ptr, capacity),
            None => alloc::handle_alloc_error(layout),
        }
    }

    /// Reserve storage for exactly `capacity` elements, reporting failure.
    ///
    /// Returns [`RivetError::CapacityOverflow`] when the layout cannot be
    /// formed and [`RivetError::AllocFailed`] when the allocator returns
    /// null. Nothing is retained on error.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, RivetError> {
        let layout = Self::layout(capacity)?;
        match Self::allocate(layout) {
            Some(ptr) => Ok(Self::from_parts(ptr, capacity)),
            None => {
                log::debug!(
                    "allocation of {} bytes for {} slots failed",
                    layout.size(),
                    capacity
                );
                Err(RivetError::AllocFailed {
                    bytes: layout.size(),
                    align: layout.align(),
                })
            }
        }
    }

    /// Number of element slots in the block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Base address of the block. Dangling (but aligned) when empty.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    /// Mutable base address of the block.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Address of the slot `offset` elements from the start.
    ///
    /// `offset == capacity` is allowed (one past the end) for address
    /// arithmetic only; it must not be read or written.
    #[inline]
    pub fn offset(&mut self, offset: usize) -> *mut T {
        debug_assert!(
            offset <= self.capacity,
            "offset {offset} past capacity {}",
            self.capacity
        );
        // SAFETY: `offset <= capacity`, so the result stays within the
        // allocation or one past its end. For an empty holder the only
        // allowed offset is 0.
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Shared-access counterpart of [`offset`](RawMemory::offset).
    #[inline]
    pub fn offset_const(&self, offset: usize) -> *const T {
        debug_assert!(
            offset <= self.capacity,
            "offset {offset} past capacity {}",
            self.capacity
        );
        // SAFETY: as in `offset`.
        unsafe { self.ptr.as_ptr().add(offset) }
    }

    /// Reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// `index < capacity` and the slot must hold a constructed `T`. The
    /// holder does not know which slots are live.
    #[inline]
    pub unsafe fn slot(&self, index: usize) -> &T {
        debug_assert!(index < self.capacity, "slot {index} past capacity {}", self.capacity);
        // SAFETY: caller guarantees the slot is in range and initialized.
        unsafe { &*self.offset_const(index) }
    }

    /// Mutable reference to the value in slot `index`.
    ///
    /// # Safety
    ///
    /// Same contract as [`slot`](RawMemory::slot).
    #[inline]
    pub unsafe fn slot_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.capacity, "slot {index} past capacity {}", self.capacity);
        // SAFETY: caller guarantees the slot is in range and initialized.
        unsafe { &mut *self.offset(index) }
    }

    /// Exchange blocks and capacities with `other`.
    ///
    /// No element is constructed, moved or dropped.
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.ptr, &mut other.ptr);
        mem::swap(&mut self.capacity, &mut other.capacity);
    }

    fn from_parts(ptr: NonNull<T>, capacity: usize) -> Self {
        Self {
            ptr,
            capacity,
            _marker: PhantomData,
        }
    }

    fn layout(capacity: usize) -> Result<Layout, RivetError> {
        Layout::array::<T>(capacity).map_err(|_| RivetError::CapacityOverflow {
            requested: capacity,
        })
    }

    fn allocate(layout: Layout) -> Option<NonNull<T>> {
        if layout.size() == 0 {
            return Some(NonNull::dangling());
        }
        // SAFETY: `layout` has a non-zero size.
        let raw = unsafe { alloc::alloc(layout) };
        let ptr = NonNull::new(raw.cast::<T>())?;
        log::trace!("allocated {} bytes at {:p}", layout.size(), ptr);
        Some(ptr)
    }
}

impl<T> Drop for RawMemory<T> {
    fn drop(&mut self) {
        // The layout was valid when the block was allocated, so this only
        // fails for the empty holder (which never allocated anyway).
        let Ok(layout) = Self::layout(self.capacity) else {
            return;
        };
        if layout.size() == 0 {
            return;
        }
        log::trace!("releasing {} bytes at {:p}", layout.size(), self.ptr);
        // SAFETY: a non-zero-sized layout means `ptr` came from
        // `alloc::alloc` with this exact layout and has not been freed.
        unsafe { alloc::dealloc(self.ptr.as_ptr().cast::<u8>(), layout) }
    }
}

impl<T> Default for RawMemory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RawMemory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawMemory")
            .field("ptr", &self.ptr)
            .field("capacity", &self.capacity)
            .finish()
    }
}
