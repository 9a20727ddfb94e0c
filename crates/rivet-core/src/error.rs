//! Error types for Rivet containers.
//!
//! Two categories exist: resource exhaustion (the allocator said no, or
//! the requested element count cannot be expressed as a layout) and
//! checked-access failures from the `try_*` / `at` family. Element
//! operations that fail by panicking are not represented here; they
//! unwind through the container, which cleans up on the way out.

use std::error::Error;
use std::fmt;

/// Errors reported by the fallible container operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RivetError {
    /// The requested element count does not fit in a valid allocation
    /// layout (total size would exceed `isize::MAX` bytes).
    CapacityOverflow {
        /// Number of elements requested.
        requested: usize,
    },
    /// The global allocator could not satisfy the request.
    AllocFailed {
        /// Size of the failed request in bytes.
        bytes: usize,
        /// Alignment of the failed request in bytes.
        align: usize,
    },
    /// A checked access named a position outside the live range.
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Number of live elements at the time of the access.
        len: usize,
    },
    /// A checked removal was attempted on an empty sequence.
    Empty,
}

impl RivetError {
    /// Returns `true` for the resource-exhaustion variants.
    pub fn is_alloc_error(&self) -> bool {
        matches!(
            self,
            Self::CapacityOverflow { .. } | Self::AllocFailed { .. }
        )
    }
}

impl fmt::Display for RivetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityOverflow { requested } => {
                write!(f, "capacity overflow: {requested} elements do not fit in a layout")
            }
            Self::AllocFailed { bytes, align } => {
                write!(f, "allocation of {bytes} bytes (align {align}) failed")
            }
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} out of bounds for length {len}")
            }
            Self::Empty => write!(f, "sequence is empty"),
        }
    }
}

impl Error for RivetError {}
