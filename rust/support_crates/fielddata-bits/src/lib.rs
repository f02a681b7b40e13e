//! Fixed-size bit arrays used for per-document flags of a segment: the liveness
//! bitmap (set = live) and the documents-with-value set.

pub mod bit_array;

pub use bit_array::{BitArray, BitArrayIter};
