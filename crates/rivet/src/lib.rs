//! Rivet: a growable contiguous array with explicit storage and object
//! lifetimes.
//!
//! Two layers, leaves first:
//!
//! ```text
//! Vector<T>            (rivet)      live count, value semantics, growth
//! └── RawMemory<T>     (rivet-raw)  one uninitialized block, no lifetimes
//! ```
//!
//! [`RawMemory`] owns storage and nothing else. [`Vector`] owns the values
//! living in the first `len` slots of that storage and implements every
//! user-visible operation on top of it. Growth always builds a new block
//! off to the side and swaps it in, so a panic mid-growth leaves the
//! vector as it was.
//!
//! # Quick start
//!
//! ```rust
//! use rivet::{vector, Vector};
//!
//! let mut v: Vector<i32> = vector![1, 2, 3];
//! v.insert(1, 99);
//! assert_eq!(v, [1, 99, 2, 3]);
//!
//! v.erase(0);
//! v.pop_back();
//! assert_eq!(v, [99, 2]);
//! ```
//!
//! # Logging
//!
//! Reallocations are reported through the [`log`] facade at `trace`
//! level and failed fallible allocations at `debug` level. The crate never
//! installs a logger.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod iter;
mod relocate;
pub mod vector;

pub use iter::IntoIter;
pub use vector::Vector;

pub use rivet_core::{GrowthPolicy, RivetError};
pub use rivet_raw::RawMemory;

/// Build a [`Vector`] from a list of elements or a repeated element.
///
/// ```rust
/// use rivet::vector;
///
/// let empty: rivet::Vector<u8> = vector![];
/// assert!(empty.is_empty());
///
/// let zeros = vector![0u8; 4];
/// assert_eq!(zeros, [0, 0, 0, 0]);
///
/// let listed = vector!["a", "b"];
/// assert_eq!(listed.capacity(), 2);
/// ```
#[macro_export]
macro_rules! vector {
    () => {
        $crate::Vector::new()
    };
    ($elem:expr; $n:expr) => {
        $crate::Vector::from_elem($elem, $n)
    };
    ($($x:expr),+ $(,)?) => {
        $crate::Vector::from([$($x),+])
    };
}

/// Commonly used types.
pub mod prelude {
    pub use crate::vector;
    pub use crate::{GrowthPolicy, RivetError, Vector};
}
