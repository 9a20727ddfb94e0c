//! The typed sequence.
//!
//! [`Vector`] layers object lifetimes on top of a [`RawMemory`] block:
//! slots `[0, len)` hold live values, slots `[len, capacity)` are
//! uninitialized. Every operation that needs more room follows the same
//! protocol:
//!
//! 1. allocate a fresh block of the target capacity,
//! 2. construct any new element directly in its final slot,
//! 3. relocate the existing elements around it,
//! 4. swap the fresh block in; the old block is freed when it drops.
//!
//! Nothing observable changes until step 4, so a panicking constructor or
//! a failed allocation leaves the vector exactly as it was.

#![allow(unsafe_code)]

use std::borrow::{Borrow, BorrowMut};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem;
use std::ops::{Deref, DerefMut};
use std::ptr;
use std::slice;

use rivet_core::{GrowthPolicy, RivetError};
use rivet_raw::RawMemory;

use crate::relocate::{self, PartialInit};

/// A contiguous growable array with value semantics.
///
/// `Vector` owns its elements and a single heap block. Cloning copies
/// every element into a block sized exactly for them; moving is O(1) and
/// leaves nothing behind. Appending is amortized O(1): a full vector grows
/// to `max(1, 2 * len)` slots (see [`GrowthPolicy`]).
///
/// Indexing, slicing and borrowing iterators come from `Deref<Target = [T]>`.
///
/// # Panic safety
///
/// Construction, `clone`, `reserve`, appends and inserts that reallocate
/// leave the vector untouched if an element constructor panics. In-place
/// `clone_from` and in-place inserts leave it valid (no leaks, no double
/// drops) but possibly partly updated.
pub struct Vector<T> {
    buf: RawMemory<T>,
    len: usize,
}

impl<T> Vector<T> {
    /// An empty vector. Does not allocate.
    pub const fn new() -> Self {
        Self {
            buf: RawMemory::new(),
            len: 0,
        }
    }

    /// An empty vector with room for exactly `capacity` elements.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: RawMemory::with_capacity(capacity),
            len: 0,
        }
    }

    /// A vector of `count` default values, with capacity exactly `count`.
    pub fn with_len(count: usize) -> Self
    where
        T: Default,
    {
        Self::from_fn_n(count, |_| T::default())
    }

    /// A vector of `count` clones of `elem`.
    pub fn from_elem(elem: T, count: usize) -> Self
    where
        T: Clone,
    {
        Self::from_fn_n(count, |_| elem.clone())
    }

    /// Build `count` elements into a fresh block, `f(i)` producing slot `i`.
    ///
    /// If `f` panics the values built so far are dropped and the block is
    /// released before the panic propagates.
    fn from_fn_n(count: usize, mut f: impl FnMut(usize) -> T) -> Self {
        let mut buf = RawMemory::with_capacity(count);
        let mut init = PartialInit::new(buf.as_mut_ptr());
        for i in 0..count {
            // SAFETY: `buf` has room for `count` values and `i < count`
            // values have been written so far.
            unsafe { init.push(f(i)) };
        }
        let len = init.finish();
        Self { buf, len }
    }

    /// Number of live elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// `true` if there are no live elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of slots backed by the current block.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// The live elements as a slice.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[0, len)` are initialized; the pointer is non-null
        // and aligned even for an empty block.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    /// The live elements as a mutable slice.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // SAFETY: as in `as_slice`, with unique access through `&mut self`.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Base address of the block.
    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.buf.as_ptr()
    }

    /// Mutable base address of the block.
    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.buf.as_mut_ptr()
    }

    /// Checked access to element `index`.
    pub fn at(&self, index: usize) -> Result<&T, RivetError> {
        let len = self.len;
        self.as_slice()
            .get(index)
            .ok_or(RivetError::IndexOutOfBounds { index, len })
    }

    /// Checked mutable access to element `index`.
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T, RivetError> {
        let len = self.len;
        self.as_mut_slice()
            .get_mut(index)
            .ok_or(RivetError::IndexOutOfBounds { index, len })
    }

    /// Exchange contents (blocks and lengths) with `other`. O(1).
    ///
    /// Named apart from the slice method `swap(a, b)`, which stays
    /// reachable through `Deref`.
    pub fn swap_with(&mut self, other: &mut Self) {
        self.buf.swap(&mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
    }

    /// Make sure at least `new_capacity` slots exist.
    ///
    /// Does nothing if the capacity is already sufficient. Otherwise the
    /// elements move to a block of exactly `new_capacity` slots.
    pub fn reserve(&mut self, new_capacity: usize) {
        if new_capacity <= self.capacity() {
            return;
        }
        self.relocate_into(RawMemory::with_capacity(new_capacity));
    }

    /// Like [`reserve`](Vector::reserve), reporting allocation failure.
    ///
    /// The vector is unchanged on error.
    pub fn try_reserve(&mut self, new_capacity: usize) -> Result<(), RivetError> {
        if new_capacity <= self.capacity() {
            return Ok(());
        }
        self.relocate_into(RawMemory::try_with_capacity(new_capacity)?);
        Ok(())
    }

    /// Shrink or grow to `new_len`, filling new slots with `T::default()`.
    pub fn resize(&mut self, new_len: usize)
    where
        T: Default,
    {
        self.resize_with(new_len, T::default);
    }

    /// Shrink or grow to `new_len`, filling new slots from `f`.
    ///
    /// Growing past the capacity reallocates to exactly `new_len` slots.
    /// If `f` panics the elements produced so far are kept.
    pub fn resize_with(&mut self, new_len: usize, mut f: impl FnMut() -> T) {
        if new_len <= self.len {
            self.truncate(new_len);
            return;
        }
        self.reserve(new_len);
        while self.len < new_len {
            let value = f();
            // SAFETY: `len < new_len <= capacity`.
            unsafe { self.buf.offset(self.len).write(value) };
            self.len += 1;
        }
    }

    /// Drop every element from `new_len` on. Capacity is unchanged.
    pub fn truncate(&mut self, new_len: usize) {
        if new_len >= self.len {
            return;
        }
        let tail = ptr::slice_from_raw_parts_mut(self.buf.offset(new_len), self.len - new_len);
        // Shorten first so a panicking destructor cannot cause a double drop.
        self.len = new_len;
        // SAFETY: the tail slots were live and are no longer reachable.
        unsafe { ptr::drop_in_place(tail) };
    }

    /// Drop every element. Capacity is unchanged.
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Append `value`, returning a reference to it in its final slot.
    pub fn push_back(&mut self, value: T) -> &mut T {
        self.emplace_back_with(|| value)
    }

    /// Append the value produced by `f`, constructed straight into its slot.
    ///
    /// When the vector is full the value is built in the new block before
    /// the old elements move over, so it is never relocated itself. A panic
    /// in `f` leaves the vector untouched.
    pub fn emplace_back_with(&mut self, f: impl FnOnce() -> T) -> &mut T {
        let index = self.len;
        if self.len == self.capacity() {
            let fresh = RawMemory::with_capacity(self.grown_capacity());
            self.insert_reallocating(fresh, index, f);
        } else {
            let value = f();
            // SAFETY: `len < capacity`, so the slot is free.
            unsafe { self.buf.offset(index).write(value) };
            self.len += 1;
        }
        // SAFETY: slot `index` was just initialized.
        unsafe { self.buf.slot_mut(index) }
    }

    /// Like [`push_back`](Vector::push_back), reporting allocation failure.
    ///
    /// On error `value` is dropped and the vector is unchanged.
    pub fn try_push_back(&mut self, value: T) -> Result<&mut T, RivetError> {
        let index = self.len;
        if self.len == self.capacity() {
            let capacity = GrowthPolicy::DEFAULT.next_capacity(self.len)?;
            let fresh = RawMemory::try_with_capacity(capacity)?;
            self.insert_reallocating(fresh, index, || value);
        } else {
            // SAFETY: `len < capacity`, so the slot is free.
            unsafe { self.buf.offset(index).write(value) };
            self.len += 1;
        }
        // SAFETY: slot `index` was just initialized.
        Ok(unsafe { self.buf.slot_mut(index) })
    }

    /// Remove and return the last element, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        // SAFETY: slot `len` was live and is no longer counted.
        Some(unsafe { ptr::read(self.buf.offset_const(self.len)) })
    }

    /// Like [`pop_back`](Vector::pop_back), reporting an empty vector as
    /// [`RivetError::Empty`].
    pub fn try_pop_back(&mut self) -> Result<T, RivetError> {
        self.pop_back().ok_or(RivetError::Empty)
    }

    /// Insert `value` at `index`, shifting later elements back.
    ///
    /// Returns the index of the inserted element.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn insert(&mut self, index: usize, value: T) -> usize {
        self.emplace_with(index, || value)
    }

    /// Insert the value produced by `f` at `index`.
    ///
    /// With spare capacity the value is produced first and the tail is
    /// shifted afterwards, so a panic in `f` changes nothing. A full vector
    /// reallocates, building the value at `index` in the new block and
    /// relocating the prefix and suffix around it.
    ///
    /// # Panics
    ///
    /// Panics if `index > len`.
    pub fn emplace_with(&mut self, index: usize, f: impl FnOnce() -> T) -> usize {
        if index > self.len {
            out_of_bounds(index, self.len);
        }
        if self.len == self.capacity() {
            let fresh = RawMemory::with_capacity(self.grown_capacity());
            self.insert_reallocating(fresh, index, f);
            return index;
        }

        let value = f();
        let len = self.len;
        let base = self.buf.as_mut_ptr();
        // SAFETY: `len < capacity`, so there is room for the shifted tail,
        // and `index <= len`. The hole at `index` is filled immediately.
        unsafe {
            if index < len {
                relocate::open_gap(base, index, len);
            }
            base.add(index).write(value);
        }
        self.len += 1;
        index
    }

    /// Remove and return the element at `index`, shifting later elements
    /// forward.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn remove(&mut self, index: usize) -> T {
        if index >= self.len {
            out_of_bounds(index, self.len);
        }
        let len = self.len;
        let base = self.buf.as_mut_ptr();
        // SAFETY: `index < len`; the value is read out before its slot is
        // overwritten by the shifted tail.
        unsafe {
            let value = ptr::read(base.add(index));
            relocate::close_gap(base, index, len);
            self.len -= 1;
            value
        }
    }

    /// Like [`remove`](Vector::remove), reporting a bad index instead of
    /// panicking.
    pub fn try_remove(&mut self, index: usize) -> Result<T, RivetError> {
        if index >= self.len {
            return Err(RivetError::IndexOutOfBounds {
                index,
                len: self.len,
            });
        }
        Ok(self.remove(index))
    }

    /// Drop the element at `index`, shifting later elements forward.
    ///
    /// Returns the index now holding the element that followed the erased
    /// one, which equals `len()` (the end) when the last element was erased.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len`.
    pub fn erase(&mut self, index: usize) -> usize {
        drop(self.remove(index));
        index
    }

    /// Make room for `additional` more elements, growing by at least the
    /// policy step so repeated bulk appends stay amortized O(1).
    fn reserve_for_append(&mut self, additional: usize) {
        let required = self.len.saturating_add(additional);
        if required <= self.capacity() {
            return;
        }
        match GrowthPolicy::DEFAULT.capacity_for(self.len, required) {
            Ok(capacity) => self.reserve(capacity),
            Err(err) => panic!("{err}"),
        }
    }

    fn grown_capacity(&self) -> usize {
        match GrowthPolicy::DEFAULT.next_capacity(self.len) {
            Ok(capacity) => capacity,
            Err(err) => panic!("{err}"),
        }
    }

    /// Build-new-then-swap insert into `fresh`, which must have room for
    /// `len + 1` elements.
    fn insert_reallocating(&mut self, mut fresh: RawMemory<T>, index: usize, f: impl FnOnce() -> T) {
        debug_assert!(fresh.capacity() > self.len);
        debug_assert!(index <= self.len);

        let slot = fresh.offset(index);
        // A panic here drops `fresh`, which holds no live values yet.
        let value = f();
        // SAFETY: `index <= len < fresh.capacity()`.
        unsafe { slot.write(value) };

        // SAFETY: the old block holds `len` live values; `fresh` has room
        // for the prefix before `index` and the suffix after it. The blocks
        // are distinct allocations.
        unsafe {
            relocate::relocate(self.buf.as_ptr(), fresh.offset(0), index);
            relocate::relocate(
                self.buf.offset_const(index),
                fresh.offset(index + 1),
                self.len - index,
            );
        }

        log::trace!(
            "vector reallocated for insert at {}: capacity {} -> {}, len {}",
            index,
            self.capacity(),
            fresh.capacity(),
            self.len + 1
        );
        self.buf.swap(&mut fresh);
        self.len += 1;
        // `fresh` now owns the old block, whose values were relocated out.
    }

    /// Move every element into `fresh` and make it the current block.
    fn relocate_into(&mut self, mut fresh: RawMemory<T>) {
        debug_assert!(fresh.capacity() >= self.len);
        // SAFETY: the old block holds `len` live values and `fresh` has room
        // for all of them. The blocks are distinct allocations.
        unsafe { relocate::relocate(self.buf.as_ptr(), fresh.offset(0), self.len) };
        log::trace!(
            "vector reallocated: capacity {} -> {}, len {}",
            self.capacity(),
            fresh.capacity(),
            self.len
        );
        self.buf.swap(&mut fresh);
    }
}

#[cold]
#[track_caller]
fn out_of_bounds(index: usize, len: usize) -> ! {
    panic!("{}", RivetError::IndexOutOfBounds { index, len })
}

impl<T> Drop for Vector<T> {
    fn drop(&mut self) {
        // SAFETY: exactly the `len` leading slots are live. `buf` releases
        // the block afterwards, even if a destructor panics.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.buf.as_mut_ptr(),
                self.len,
            ))
        }
    }
}

impl<T: Clone> Clone for Vector<T> {
    /// Copies every element into a block of capacity exactly `len`.
    ///
    /// If an element's `clone` panics, the copies made so far are dropped
    /// and `self` is untouched.
    fn clone(&self) -> Self {
        let source = self.as_slice();
        Self::from_fn_n(source.len(), |i| source[i].clone())
    }

    /// Copy assignment.
    ///
    /// If `source` does not fit in the current capacity a full copy is
    /// built first and swapped in, so a panic leaves `self` untouched.
    /// Otherwise the existing storage is reused: the common prefix is
    /// assigned element by element, then the excess tail is dropped or the
    /// missing suffix cloned into spare slots. A panic on that path leaves
    /// a valid but partly assigned vector.
    fn clone_from(&mut self, source: &Self) {
        if source.len > self.capacity() {
            let mut copy = source.clone();
            self.swap_with(&mut copy);
            return;
        }

        let common = self.len.min(source.len);
        for (dst, src) in self.as_mut_slice()[..common]
            .iter_mut()
            .zip(&source.as_slice()[..common])
        {
            dst.clone_from(src);
        }
        self.truncate(source.len);
        for item in &source.as_slice()[self.len..] {
            let value = item.clone();
            // SAFETY: `len < source.len <= capacity`.
            unsafe { self.buf.offset(self.len).write(value) };
            self.len += 1;
        }
    }
}

impl<T> Default for Vector<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for Vector<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for Vector<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for Vector<T> {
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for Vector<T> {
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> Borrow<[T]> for Vector<T> {
    fn borrow(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> BorrowMut<[T]> for Vector<T> {
    fn borrow_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T: fmt::Debug> fmt::Debug for Vector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

impl<T, U> PartialEq<Vector<U>> for Vector<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &Vector<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T, U> PartialEq<[U]> for Vector<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U> PartialEq<&[U]> for Vector<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &&[U]) -> bool {
        self.as_slice() == *other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for Vector<T>
where
    T: PartialEq<U>,
{
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == other
    }
}

impl<T: Eq> Eq for Vector<T> {}

impl<T: PartialOrd> PartialOrd for Vector<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: Ord> Ord for Vector<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_slice().cmp(other.as_slice())
    }
}

impl<T: Hash> Hash for Vector<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state);
    }
}

impl<T> Extend<T> for Vector<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        let (lower, _) = iter.size_hint();
        self.reserve_for_append(lower);
        for item in iter {
            self.push_back(item);
        }
    }
}

impl<'a, T: Copy + 'a> Extend<&'a T> for Vector<T> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T> FromIterator<T> for Vector<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut vector = Self::new();
        vector.extend(iter);
        vector
    }
}

impl<T: Clone> From<&[T]> for Vector<T> {
    fn from(items: &[T]) -> Self {
        Self::from_fn_n(items.len(), |i| items[i].clone())
    }
}

impl<T, const N: usize> From<[T; N]> for Vector<T> {
    fn from(items: [T; N]) -> Self {
        items.into_iter().collect()
    }
}

impl<'a, T> IntoIterator for &'a Vector<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}

impl<'a, T> IntoIterator for &'a mut Vector<T> {
    type Item = &'a mut T;
    type IntoIter = slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_mut_slice().iter_mut()
    }
}

impl<T> IntoIterator for Vector<T> {
    type Item = T;
    type IntoIter = crate::iter::IntoIter<T>;

    fn into_iter(mut self) -> Self::IntoIter {
        let len = mem::replace(&mut self.len, 0);
        let buf = mem::take(&mut self.buf);
        crate::iter::IntoIter::new(buf, len)
    }
}
