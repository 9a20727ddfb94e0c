//! Raw element storage for Rivet containers.
//!
//! [`RawMemory`] owns one contiguous block of uninitialized storage sized
//! for a fixed number of elements. It never constructs or drops elements;
//! tracking which slots are live is the owner's job. This crate is one of
//! two that may contain `unsafe` code (along with `rivet`), and all of it
//! lives in `raw.rs`.
//!
//! # Storage vs. object lifetime
//!
//! ```text
//! Vector<T>                (owns object lifetimes: slots [0, len) are live)
//! └── RawMemory<T>         (owns the block: capacity slots, none live to it)
//!     └── global allocator (Layout::array::<T>(capacity))
//! ```
//!
//! Dropping a `RawMemory` releases the block unconditionally, so its owner
//! must drop every live element first.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod raw;

pub use raw::RawMemory;
