//! Test utilities for Rivet development.
//!
//! Provides element types that record their own lifetimes or fail on
//! demand, so container tests can check for leaks, double drops and
//! panic-safety guarantees. See [`fixtures`].

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

pub use fixtures::{Fuse, LiveCounter, MoveOnly, PanicOnDrop, Tracked};
