//! Test utilities for the fielddata crates.
//!
//! - [`segment`]: an in-memory segment implementing the term/postings collaborator
//!   traits, with deletions and fault injection.
//! - [`data_gen`]: seeded generation of per-document numeric values.

pub mod data_gen;
pub mod segment;

pub use segment::{MemorySegment, SegmentBuilder};
