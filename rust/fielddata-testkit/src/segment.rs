//! In-memory segment with a single prefix-coded numeric field.

use std::collections::BTreeMap;

use fielddata_bits::BitArray;
use fielddata_common::{Result, error::Error};
use fielddata_ordinals::{
    DocId, Postings, SegmentReader, Terms, TermsEnum, numeric_terms::encode_i64,
};
use itertools::Itertools;

/// Precision step used when none is configured.
pub const DEFAULT_PRECISION_STEP: u32 = 4;

/// Builds a [`MemorySegment`] document by document.
///
/// Every value is indexed the way a trie-encoded numeric field is: one full-precision
/// term plus one lower-precision term per `precision_step` bits.
pub struct SegmentBuilder {
    segment_id: u64,
    field: String,
    docs: Vec<Vec<i64>>,
    deleted: Vec<DocId>,
    precision_step: u32,
    min_shift: u32,
    corrupt_term: Option<usize>,
    fail_postings_at: Option<usize>,
}

impl SegmentBuilder {
    pub fn new(segment_id: u64, field: &str) -> SegmentBuilder {
        SegmentBuilder {
            segment_id,
            field: field.to_string(),
            docs: Vec::new(),
            deleted: Vec::new(),
            precision_step: DEFAULT_PRECISION_STEP,
            min_shift: 0,
            corrupt_term: None,
            fail_postings_at: None,
        }
    }

    /// Precision step of the lower-precision terms; `64` indexes full precision only.
    pub fn with_precision_step(mut self, precision_step: u32) -> SegmentBuilder {
        assert!((1..=64).contains(&precision_step));
        self.precision_step = precision_step;
        self
    }

    /// Indexes only the terms with a shift of at least `min_shift`. Any non-zero value
    /// leaves the field without full-precision terms.
    pub fn with_min_shift(mut self, min_shift: u32) -> SegmentBuilder {
        assert!(min_shift < 64);
        self.min_shift = min_shift;
        self
    }

    /// Flips the high bit of a payload byte of the `index`-th term, making it undecodable.
    pub fn with_corrupt_term(mut self, index: usize) -> SegmentBuilder {
        self.corrupt_term = Some(index);
        self
    }

    /// Makes the postings of the `index`-th term fail with a source error.
    pub fn with_postings_failure(mut self, index: usize) -> SegmentBuilder {
        self.fail_postings_at = Some(index);
        self
    }

    /// Appends a document with the given values (possibly none) and returns its id.
    pub fn add_doc(&mut self, values: &[i64]) -> DocId {
        self.docs.push(values.to_vec());
        (self.docs.len() - 1) as DocId
    }

    pub fn add_docs<'a>(&mut self, docs: impl IntoIterator<Item = &'a [i64]>) -> &mut Self {
        for values in docs {
            self.add_doc(values);
        }
        self
    }

    /// Marks a document as deleted. Its terms stay in the postings.
    pub fn delete_doc(&mut self, doc: DocId) -> &mut Self {
        assert!((doc as usize) < self.docs.len());
        self.deleted.push(doc);
        self
    }

    pub fn build(self) -> MemorySegment {
        let max_doc = self.docs.len() as u32;
        let mut postings = BTreeMap::<Vec<u8>, Vec<DocId>>::new();
        for (doc, values) in self.docs.iter().enumerate() {
            let doc = doc as DocId;
            for &value in values.iter().sorted().dedup() {
                let shifts = (0..64)
                    .step_by(self.precision_step as usize)
                    .filter(|&shift| shift >= self.min_shift);
                for shift in shifts {
                    let docs = postings.entry(encode_i64(value, shift)).or_default();
                    if docs.last() != Some(&doc) {
                        docs.push(doc);
                    }
                }
            }
        }

        let mut terms = postings.into_iter().collect::<Vec<_>>();
        if let Some(index) = self.corrupt_term {
            terms[index].0[2] |= 0x80;
        }

        let live_docs = (!self.deleted.is_empty()).then(|| {
            let mut live = BitArray::full(max_doc as usize);
            for &doc in &self.deleted {
                live.reset(doc as usize);
            }
            live
        });

        MemorySegment {
            segment_id: self.segment_id,
            max_doc,
            live_docs,
            field: self.field,
            terms: (!terms.is_empty()).then_some(MemoryTerms {
                terms,
                fail_postings_at: self.fail_postings_at,
            }),
            docs: self.docs,
        }
    }
}

/// A segment held entirely in memory.
pub struct MemorySegment {
    segment_id: u64,
    max_doc: u32,
    live_docs: Option<BitArray>,
    field: String,
    terms: Option<MemoryTerms>,
    docs: Vec<Vec<i64>>,
}

impl MemorySegment {
    /// Convenience constructor for a segment without deletions.
    pub fn from_docs(segment_id: u64, field: &str, docs: &[Vec<i64>]) -> MemorySegment {
        let mut builder = SegmentBuilder::new(segment_id, field);
        builder.add_docs(docs.iter().map(Vec::as_slice));
        builder.build()
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn is_live(&self, doc: DocId) -> bool {
        self.live_docs
            .as_ref()
            .is_none_or(|live| live.contains(doc as usize))
    }

    /// The distinct values of a live document in ascending order; empty for deleted
    /// documents.
    pub fn expected_values(&self, doc: DocId) -> Vec<i64> {
        if !self.is_live(doc) {
            return Vec::new();
        }
        self.docs[doc as usize]
            .iter()
            .copied()
            .sorted()
            .dedup()
            .collect()
    }

    /// Number of terms of the field (all precisions).
    pub fn num_terms(&self) -> usize {
        self.terms.as_ref().map_or(0, |terms| terms.terms.len())
    }
}

impl SegmentReader for MemorySegment {
    fn segment_id(&self) -> u64 {
        self.segment_id
    }

    fn max_doc(&self) -> u32 {
        self.max_doc
    }

    fn live_docs(&self) -> Option<&BitArray> {
        self.live_docs.as_ref()
    }

    fn terms(&self, field: &str) -> Result<Option<&dyn Terms>> {
        if field != self.field {
            return Ok(None);
        }
        Ok(self.terms.as_ref().map(|terms| terms as &dyn Terms))
    }
}

struct MemoryTerms {
    terms: Vec<(Vec<u8>, Vec<DocId>)>,
    fail_postings_at: Option<usize>,
}

impl Terms for MemoryTerms {
    fn iter(&self) -> Result<Box<dyn TermsEnum + '_>> {
        Ok(Box::new(MemoryTermsEnum {
            terms: self,
            current: None,
        }))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.terms.len())
    }
}

struct MemoryTermsEnum<'a> {
    terms: &'a MemoryTerms,
    current: Option<usize>,
}

impl MemoryTermsEnum<'_> {
    fn current(&self) -> usize {
        self.current.expect("advance() must be called first")
    }
}

impl TermsEnum for MemoryTermsEnum<'_> {
    fn advance(&mut self) -> Result<bool> {
        let next = self.current.map_or(0, |pos| pos + 1);
        self.current = Some(next.min(self.terms.terms.len()));
        Ok(next < self.terms.terms.len())
    }

    fn term(&self) -> &[u8] {
        &self.terms.terms[self.current()].0
    }

    fn postings(&mut self) -> Result<Box<dyn Postings + '_>> {
        let current = self.current();
        if self.terms.fail_postings_at == Some(current) {
            return Err(Error::source(
                format!("postings of term {current}"),
                std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "truncated postings"),
            ));
        }
        Ok(Box::new(MemoryPostings(self.terms.terms[current].1.iter())))
    }
}

struct MemoryPostings<'a>(std::slice::Iter<'a, DocId>);

impl Postings for MemoryPostings<'_> {
    fn next_doc(&mut self) -> Result<Option<DocId>> {
        Ok(self.0.next().copied())
    }
}
