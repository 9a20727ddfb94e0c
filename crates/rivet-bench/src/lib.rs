//! Benchmark workloads for Rivet containers.
//!
//! - [`insert_positions`]: deterministic pseudo-random insert indices
//! - [`filled`]: a vector of `0..len` built by repeated appends

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rivet::Vector;

/// `count` insert positions, each valid for the length the vector has
/// when it is used (starting from `start_len` and growing by one).
///
/// Uses a fixed-seed xorshift so every run inserts at the same indices.
pub fn insert_positions(start_len: usize, count: usize, seed: u64) -> Vec<usize> {
    let mut state = seed.max(1);
    (0..count)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state % (start_len + i + 1) as u64) as usize
        })
        .collect()
}

/// A vector holding `0..len`, grown through the normal append path.
pub fn filled(len: usize) -> Vector<u64> {
    let mut v = Vector::new();
    for i in 0..len as u64 {
        v.push_back(i);
    }
    v
}
