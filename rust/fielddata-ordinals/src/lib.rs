//! Ordinal space of a numeric field within one segment.
//!
//! A sorted stream of unique terms is turned into a dense ordinal space
//! (`1..=num_ords`, with `0` reserved for "no value"), and every live document is
//! mapped to the ordinals of the terms its postings contain.
//!
//! - [`terms`]: the term/postings/segment collaborator traits consumed by the build.
//! - [`numeric_terms`]: the order-preserving prefix-coded encoding of 64-bit integers.
//! - [`builder`]: [`OrdinalsBuilder`], which accumulates the document-to-ordinal mapping
//!   while the terms are being scanned.
//! - [`ordinals`]: the immutable [`Ordinals`] produced by the builder.

pub mod builder;
pub mod numeric_terms;
pub mod ordinals;
pub mod packed;
pub mod ram_usage;
pub mod terms;

pub use builder::{OrdinalsBuilder, TermsScan};
pub use ordinals::{MultiOrdinals, Ordinals, Ords, SingleOrdinals};
pub use terms::{DocId, Ordinal, Postings, SegmentReader, Terms, TermsEnum};
