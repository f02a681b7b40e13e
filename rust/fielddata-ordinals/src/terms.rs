//! Collaborator traits over a segment's inverted index.
//!
//! The on-disk term dictionary and postings format are not owned by this crate; they
//! are consumed through these traits. Implementations report their failures as
//! `ErrorKind::Source` (see [`fielddata_common::error::Error::source`]).

use fielddata_bits::BitArray;
use fielddata_common::Result;

/// Document id within a segment, `0..max_doc`.
pub type DocId = u32;

/// Index into the unique value dictionary of a field. `0` means "no value".
pub type Ordinal = u32;

/// Postings list of a single term.
pub trait Postings {
    /// Returns the next document containing the term, or `None` once exhausted.
    ///
    /// Document ids must be strictly increasing and below the segment's `max_doc`.
    fn next_doc(&mut self) -> Result<Option<DocId>>;
}

/// Cursor over the unique terms of a field, in ascending byte order.
pub trait TermsEnum {
    /// Moves to the next term. Returns `false` when the terms are exhausted.
    fn advance(&mut self) -> Result<bool>;

    /// Raw encoding of the current term.
    ///
    /// Only valid after `advance()` returned `true`.
    fn term(&self) -> &[u8];

    /// Postings of the current term, including deleted documents.
    fn postings(&mut self) -> Result<Box<dyn Postings + '_>>;
}

impl<T: TermsEnum + ?Sized> TermsEnum for Box<T> {
    fn advance(&mut self) -> Result<bool> {
        (**self).advance()
    }

    fn term(&self) -> &[u8] {
        (**self).term()
    }

    fn postings(&mut self) -> Result<Box<dyn Postings + '_>> {
        (**self).postings()
    }
}

/// The terms of one field within a segment.
pub trait Terms {
    /// Starts a new pass over the terms.
    fn iter(&self) -> Result<Box<dyn TermsEnum + '_>>;

    /// Number of unique terms, when known upfront.
    fn size_hint(&self) -> Option<usize> {
        None
    }
}

/// Read access to one immutable segment.
pub trait SegmentReader {
    /// Identifier of the segment, unique within the index.
    fn segment_id(&self) -> u64;

    /// Total number of documents in the segment, including deleted ones.
    fn max_doc(&self) -> u32;

    /// Liveness bitmap sized to `max_doc` (bit set = live), or `None` when the segment
    /// has no deletions.
    fn live_docs(&self) -> Option<&BitArray>;

    /// Terms of the given field, or `None` when the field has no terms in the segment.
    fn terms(&self, field: &str) -> Result<Option<&dyn Terms>>;
}
