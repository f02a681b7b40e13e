//! Immutable document-to-ordinal mappings.

use fielddata_bits::BitArray;

use crate::{
    packed::PackedOrds,
    ram_usage::{NUM_BYTES_INT, NUM_BYTES_OBJECT_HEADER, array_bytes},
    terms::{DocId, Ordinal},
};

/// Mapping from every document of a segment to the ordinals of its values.
///
/// Produced once by [`OrdinalsBuilder::build`](crate::OrdinalsBuilder::build) and never
/// mutated afterwards; safe to share between threads.
#[derive(Clone, Debug)]
pub enum Ordinals {
    /// At most one ordinal per document.
    Single(SingleOrdinals),
    /// At least one document has more than one ordinal.
    Multi(MultiOrdinals),
}

impl Ordinals {
    /// Number of documents covered by the mapping (the segment's `max_doc`).
    pub fn max_doc(&self) -> u32 {
        match self {
            Ordinals::Single(ords) => ords.ords.len() as u32,
            Ordinals::Multi(ords) => (ords.offsets.len() - 1) as u32,
        }
    }

    /// Number of real ordinals (excluding the "no value" ordinal `0`).
    pub fn num_ords(&self) -> u32 {
        match self {
            Ordinals::Single(ords) => ords.num_ords,
            Ordinals::Multi(ords) => ords.num_ords,
        }
    }

    /// One past the largest ordinal, i.e. the size of the value dictionary including
    /// the reserved slot `0`.
    pub fn max_ord(&self) -> u32 {
        self.num_ords() + 1
    }

    pub fn is_multi_valued(&self) -> bool {
        matches!(self, Ordinals::Multi(_))
    }

    /// Number of documents with at least one ordinal.
    pub fn num_docs_with_value(&self) -> u32 {
        match self {
            Ordinals::Single(ords) => ords.num_docs_with_value,
            Ordinals::Multi(ords) => ords.num_docs_with_value,
        }
    }

    /// First (smallest) ordinal of `doc`, or `0` when the document has no value.
    #[inline]
    pub fn ord(&self, doc: DocId) -> Ordinal {
        match self {
            Ordinals::Single(ords) => ords.ords.get(doc as usize),
            Ordinals::Multi(ords) => {
                let (start, end) = ords.range(doc);
                if start < end { ords.ords.get(start) } else { 0 }
            }
        }
    }

    /// Ordinals of `doc` in ascending order.
    #[inline]
    pub fn ords(&self, doc: DocId) -> Ords<'_> {
        match self {
            Ordinals::Single(ords) => {
                let doc = doc as usize;
                let end = if ords.ords.get(doc) != 0 { doc + 1 } else { doc };
                Ords {
                    ords: &ords.ords,
                    pos: doc,
                    end,
                }
            }
            Ordinals::Multi(ords) => {
                let (pos, end) = ords.range(doc);
                Ords {
                    ords: &ords.ords,
                    pos,
                    end,
                }
            }
        }
    }

    /// Number of ordinals of `doc`.
    #[inline]
    pub fn value_count(&self, doc: DocId) -> usize {
        match self {
            Ordinals::Single(ords) => (ords.ords.get(doc as usize) != 0) as usize,
            Ordinals::Multi(ords) => {
                let (start, end) = ords.range(doc);
                end - start
            }
        }
    }

    /// Builds the set of documents that have at least one ordinal.
    ///
    /// Returns `None` when every document has a value, the set being implicitly full.
    pub fn docs_with_value_set(&self) -> Option<BitArray> {
        let max_doc = self.max_doc();
        if self.num_docs_with_value() == max_doc {
            return None;
        }
        let mut set = BitArray::empty(max_doc as usize);
        for doc in 0..max_doc {
            if self.value_count(doc) != 0 {
                set.set(doc as usize);
            }
        }
        Some(set)
    }

    /// Estimated memory held by the mapping, see [`crate::ram_usage`].
    pub fn estimated_memory_size_bytes(&self) -> u64 {
        let base = NUM_BYTES_OBJECT_HEADER + 2 * NUM_BYTES_INT;
        match self {
            Ordinals::Single(ords) => {
                base + array_bytes(ords.ords.len(), ords.ords.element_size())
            }
            Ordinals::Multi(ords) => {
                base + array_bytes(ords.offsets.len(), std::mem::size_of::<u32>())
                    + array_bytes(ords.ords.len(), ords.ords.element_size())
            }
        }
    }
}

/// One ordinal slot per document, `0` for documents without a value.
#[derive(Clone, Debug)]
pub struct SingleOrdinals {
    ords: PackedOrds,
    num_ords: u32,
    num_docs_with_value: u32,
}

impl SingleOrdinals {
    pub(crate) fn new(ords: PackedOrds, num_ords: u32, num_docs_with_value: u32) -> Self {
        SingleOrdinals {
            ords,
            num_ords,
            num_docs_with_value,
        }
    }
}

/// Compressed-row layout: the ordinals of document `d` are
/// `ords[offsets[d]..offsets[d + 1]]`, ascending.
#[derive(Clone, Debug)]
pub struct MultiOrdinals {
    offsets: Box<[u32]>,
    ords: PackedOrds,
    num_ords: u32,
    num_docs_with_value: u32,
}

impl MultiOrdinals {
    pub(crate) fn new(
        offsets: Box<[u32]>,
        ords: PackedOrds,
        num_ords: u32,
        num_docs_with_value: u32,
    ) -> Self {
        debug_assert!(!offsets.is_empty());
        debug_assert_eq!(offsets[offsets.len() - 1] as usize, ords.len());
        MultiOrdinals {
            offsets,
            ords,
            num_ords,
            num_docs_with_value,
        }
    }

    #[inline]
    fn range(&self, doc: DocId) -> (usize, usize) {
        let doc = doc as usize;
        (self.offsets[doc] as usize, self.offsets[doc + 1] as usize)
    }
}

/// Iterator over the ordinals of one document.
#[derive(Clone)]
pub struct Ords<'a> {
    ords: &'a PackedOrds,
    pos: usize,
    end: usize,
}

impl Iterator for Ords<'_> {
    type Item = Ordinal;

    #[inline]
    fn next(&mut self) -> Option<Ordinal> {
        if self.pos < self.end {
            let ord = self.ords.get(self.pos);
            self.pos += 1;
            Some(ord)
        } else {
            None
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.end - self.pos;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Ords<'_> {}
