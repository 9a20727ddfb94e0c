//! Core types for the Rivet container workspace.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the error type shared by the raw allocation holder and the typed
//! sequence, and the growth policy that decides how much capacity a
//! full sequence reallocates to.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;

pub use config::GrowthPolicy;
pub use error::RivetError;
