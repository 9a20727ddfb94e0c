//! Reusable element fixtures.
//!
//! - [`LiveCounter`] / [`Tracked`]: count constructions minus drops.
//! - [`Fuse`]: panics deterministically after N operations.
//! - [`MoveOnly`]: no `Clone`, for paths that must never copy.
//! - [`PanicOnDrop`]: destructor that panics once.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared count of live [`Tracked`] values.
///
/// Each test creates its own counter, so tests running in parallel do
/// not see each other's values.
#[derive(Clone, Debug, Default)]
pub struct LiveCounter(Arc<AtomicUsize>);

impl LiveCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values constructed (or cloned) and not yet dropped.
    pub fn live(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    fn inc(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    fn dec(&self) {
        let prev = self.0.fetch_sub(1, Ordering::SeqCst);
        assert!(prev > 0, "more drops than constructions (double drop)");
    }
}

/// Panics after a fixed number of [`burn`](Fuse::burn) calls.
///
/// Clones share the same budget. Used to make a constructor or `clone`
/// fail on exactly the N+1-th call.
#[derive(Clone, Debug)]
pub struct Fuse(Arc<AtomicUsize>);

impl Fuse {
    /// A fuse that allows `remaining` burns, then panics.
    pub fn new(remaining: usize) -> Self {
        Self(Arc::new(AtomicUsize::new(remaining)))
    }

    /// A fuse that never blows.
    pub fn unlimited() -> Self {
        Self::new(usize::MAX)
    }

    /// Use up one operation, panicking if none are left.
    pub fn burn(&self) {
        let left = self
            .0
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if left.is_err() {
            panic!("fuse blown");
        }
    }

    /// Reset the remaining budget.
    pub fn rearm(&self, remaining: usize) {
        self.0.store(remaining, Ordering::SeqCst);
    }

    pub fn remaining(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

/// An element that reports its construction and drop to a [`LiveCounter`].
///
/// `clone` burns the attached [`Fuse`] first, so a blown fuse aborts the
/// clone before anything is counted.
pub struct Tracked {
    value: u32,
    live: LiveCounter,
    fuse: Fuse,
}

impl Tracked {
    pub fn new(value: u32, live: &LiveCounter) -> Self {
        Self::with_fuse(value, live, &Fuse::unlimited())
    }

    pub fn with_fuse(value: u32, live: &LiveCounter, fuse: &Fuse) -> Self {
        live.inc();
        Self {
            value,
            live: live.clone(),
            fuse: fuse.clone(),
        }
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

impl Clone for Tracked {
    fn clone(&self) -> Self {
        self.fuse.burn();
        self.live.inc();
        Self {
            value: self.value,
            live: self.live.clone(),
            fuse: self.fuse.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        source.fuse.burn();
        self.value = source.value;
    }
}

impl Drop for Tracked {
    fn drop(&mut self) {
        self.live.dec();
    }
}

impl PartialEq for Tracked {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl fmt::Debug for Tracked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tracked({})", self.value)
    }
}

/// An element without `Clone`.
#[derive(Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MoveOnly(pub u32);

/// Panics in `drop` if armed, once.
#[derive(Debug)]
pub struct PanicOnDrop {
    armed: bool,
}

impl PanicOnDrop {
    pub fn armed() -> Self {
        Self { armed: true }
    }

    pub fn disarmed() -> Self {
        Self { armed: false }
    }
}

impl Drop for PanicOnDrop {
    fn drop(&mut self) {
        if self.armed {
            self.armed = false;
            panic!("PanicOnDrop dropped while armed");
        }
    }
}
