//! Owning iterator over a [`Vector`](crate::Vector).

#![allow(unsafe_code)]

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;
use std::slice;

use rivet_raw::RawMemory;

/// Yields the elements of a vector by value.
///
/// Takes over the vector's block. Slots `[start, end)` are the ones not yet
/// yielded; dropping the iterator drops those and frees the block.
pub struct IntoIter<T> {
    buf: RawMemory<T>,
    start: usize,
    end: usize,
}

impl<T> IntoIter<T> {
    pub(crate) fn new(buf: RawMemory<T>, len: usize) -> Self {
        debug_assert!(len <= buf.capacity());
        Self {
            buf,
            start: 0,
            end: len,
        }
    }

    /// The elements not yet yielded.
    pub fn as_slice(&self) -> &[T] {
        // SAFETY: slots `[start, end)` are live.
        unsafe { slice::from_raw_parts(self.buf.offset_const(self.start), self.end - self.start) }
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        let index = self.start;
        self.start += 1;
        // SAFETY: slot `index` was live and is now outside `[start, end)`.
        Some(unsafe { ptr::read(self.buf.offset_const(index)) })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.start;
        (remaining, Some(remaining))
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        if self.start == self.end {
            return None;
        }
        self.end -= 1;
        // SAFETY: slot `end` was live and is now outside `[start, end)`.
        Some(unsafe { ptr::read(self.buf.offset_const(self.end)) })
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {}

impl<T> FusedIterator for IntoIter<T> {}

impl<T> Drop for IntoIter<T> {
    fn drop(&mut self) {
        let remaining = ptr::slice_from_raw_parts_mut(self.buf.offset(self.start), self.end - self.start);
        // SAFETY: the unyielded slots are live and owned by the iterator.
        unsafe { ptr::drop_in_place(remaining) }
    }
}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.as_slice()).finish()
    }
}
