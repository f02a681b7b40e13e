//! Accumulates the document-to-ordinal mapping during a scan of a field's terms.

use fielddata_bits::BitArray;
use fielddata_budget_tracker::{Allocation, AllocationError, Budget};
use fielddata_common::{Result, error::Error, verify_arg, verify_data};
use log::trace;

use crate::{
    ordinals::{MultiOrdinals, Ordinals, SingleOrdinals},
    packed::PackedOrds,
    terms::{DocId, Ordinal, Postings, TermsEnum},
};

/// Bytes accounted for each additional (second, third, ...) ordinal of a document.
const SPILL_ENTRY_BYTES: u64 = std::mem::size_of::<(DocId, Ordinal)>() as u64;

/// Granularity of budget reservations made while the spill buffer grows.
const SPILL_RESERVATION_SLICE: u64 = 64 * 1024;

/// Builds [`Ordinals`] for one field of one segment.
///
/// Ordinals are assigned in term order, starting at `1`: the caller (usually through
/// [`OrdinalsBuilder::build_from_terms`]) calls [`next_ordinal`](Self::next_ordinal) once per
/// term and then [`add_doc`](Self::add_doc) for every live document of that term's postings.
///
/// The builder owns two scratch buffers: the first ordinal of every document, and a spill
/// list of `(doc, ordinal)` pairs for the additional values of multi-valued documents.
/// When a [`Budget`] is supplied, both are accounted against it through an [`Allocation`],
/// which returns every byte when the builder is dropped, whatever the exit path.
pub struct OrdinalsBuilder {
    max_doc: u32,
    first_ords: Vec<Ordinal>,
    spill: Vec<(DocId, Ordinal)>,
    current_ord: Ordinal,
    num_docs_with_value: u32,
    allocation: Option<Allocation>,
}

impl OrdinalsBuilder {
    /// Creates a builder for a segment of `max_doc` documents.
    ///
    /// Fails with `BudgetExceeded` when the per-document buffer does not fit in `budget`.
    pub fn new(max_doc: u32, budget: Option<&Budget>) -> Result<OrdinalsBuilder> {
        let scratch = max_doc as u64 * std::mem::size_of::<Ordinal>() as u64;
        let allocation = match budget {
            Some(budget) => {
                let mut allocation = budget.allocate(scratch).map_err(budget_exceeded)?;
                allocation.set_reservation_slice(SPILL_RESERVATION_SLICE);
                Some(allocation)
            }
            None => None,
        };
        Ok(OrdinalsBuilder {
            max_doc,
            first_ords: vec![0; max_doc as usize],
            spill: Vec::new(),
            current_ord: 0,
            num_docs_with_value: 0,
            allocation,
        })
    }

    pub fn max_doc(&self) -> u32 {
        self.max_doc
    }

    /// Number of ordinals assigned so far.
    pub fn num_ords(&self) -> u32 {
        self.current_ord
    }

    /// Number of documents that received at least one ordinal so far.
    pub fn num_docs_with_value(&self) -> u32 {
        self.num_docs_with_value
    }

    /// `true` once any document received more than one ordinal.
    pub fn is_multi_valued(&self) -> bool {
        !self.spill.is_empty()
    }

    /// Bytes of scratch memory currently accounted against the budget.
    pub fn scratch_bytes(&self) -> u64 {
        self.allocation.as_ref().map_or(0, Allocation::amount)
    }

    /// Starts the next term and returns its ordinal.
    pub fn next_ordinal(&mut self) -> Result<Ordinal> {
        verify_data!(num_ords, self.current_ord < Ordinal::MAX);
        self.current_ord += 1;
        Ok(self.current_ord)
    }

    /// Records that `doc` contains the current term.
    pub fn add_doc(&mut self, doc: DocId) -> Result<()> {
        verify_data!(doc, doc < self.max_doc);
        verify_arg!(current_ord, self.current_ord != 0);
        let first = &mut self.first_ords[doc as usize];
        if *first == 0 {
            *first = self.current_ord;
            self.num_docs_with_value += 1;
        } else {
            if let Some(allocation) = self.allocation.as_mut() {
                allocation.grow(SPILL_ENTRY_BYTES).map_err(budget_exceeded)?;
            }
            self.spill.push((doc, self.current_ord));
        }
        Ok(())
    }

    /// Starts a pass over `terms` that assigns one ordinal per term and records the live
    /// documents of each term's postings.
    ///
    /// `live_docs` must be sized to `max_doc`; `None` means every document is live.
    pub fn build_from_terms<'a>(
        &'a mut self,
        terms: &'a mut dyn TermsEnum,
        live_docs: Option<&'a BitArray>,
    ) -> Result<TermsScan<'a>> {
        if let Some(live_docs) = live_docs {
            verify_arg!(live_docs, live_docs.len() == self.max_doc as usize);
        }
        Ok(TermsScan {
            builder: self,
            terms,
            live_docs,
        })
    }

    /// Seals the accumulated mapping.
    ///
    /// Single-valued fields keep one ordinal slot per document; otherwise the spill list
    /// is merged into a compressed-row layout. The merge buffers (offsets, write cursors
    /// and the flattened ordinals) are charged to the budget before they are allocated.
    /// The scratch buffers are released as the builder is consumed.
    pub fn build(mut self) -> Result<Ordinals> {
        let num_ords = self.current_ord;
        let num_docs_with_value = self.num_docs_with_value;
        let first_ords = std::mem::take(&mut self.first_ords);
        let spill = std::mem::take(&mut self.spill);

        if spill.is_empty() {
            return Ok(Ordinals::Single(SingleOrdinals::new(
                PackedOrds::pack(first_ords, num_ords),
                num_ords,
                num_docs_with_value,
            )));
        }

        let max_doc = self.max_doc as usize;
        if let Some(allocation) = self.allocation.as_mut() {
            let num_values = num_docs_with_value as usize + spill.len();
            let merge_bytes = (2 * max_doc + 1 + num_values) * std::mem::size_of::<u32>();
            allocation
                .grow(merge_bytes as u64)
                .map_err(budget_exceeded)?;
        }
        let mut offsets = vec![0u32; max_doc + 1];
        for (doc, &first) in first_ords.iter().enumerate() {
            offsets[doc + 1] = (first != 0) as u32;
        }
        for &(doc, _) in &spill {
            offsets[doc as usize + 1] += 1;
        }
        for doc in 0..max_doc {
            offsets[doc + 1] += offsets[doc];
        }

        // The first ordinal of a document is its smallest one, and the spill list is in
        // term order, so each document's ordinals come out ascending.
        let mut cursor = offsets[..max_doc].to_vec();
        let mut ords = vec![0; offsets[max_doc] as usize];
        for (doc, &first) in first_ords.iter().enumerate() {
            if first != 0 {
                ords[cursor[doc] as usize] = first;
                cursor[doc] += 1;
            }
        }
        for (doc, ord) in spill {
            let slot = &mut cursor[doc as usize];
            ords[*slot as usize] = ord;
            *slot += 1;
        }

        Ok(Ordinals::Multi(MultiOrdinals::new(
            offsets.into_boxed_slice(),
            PackedOrds::pack(ords, num_ords),
            num_ords,
            num_docs_with_value,
        )))
    }
}

impl Drop for OrdinalsBuilder {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.as_ref() {
            trace!(
                "releasing ordinals builder scratch: max_doc={}, ords={}, bytes={}",
                self.max_doc,
                self.current_ord,
                allocation.capacity()
            );
        }
    }
}

impl std::fmt::Debug for OrdinalsBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrdinalsBuilder")
            .field("max_doc", &self.max_doc)
            .field("num_ords", &self.current_ord)
            .field("num_docs_with_value", &self.num_docs_with_value)
            .field("spilled", &self.spill.len())
            .finish_non_exhaustive()
    }
}

/// A single pass over a field's terms, feeding an [`OrdinalsBuilder`].
///
/// Each call to [`next_term`](Self::next_term) assigns the next ordinal, consumes the
/// term's postings, and hands the term's encoding back to the caller, so that the value
/// dictionary is built in the same pass and in the same order as the ordinals.
pub struct TermsScan<'a> {
    builder: &'a mut OrdinalsBuilder,
    terms: &'a mut dyn TermsEnum,
    live_docs: Option<&'a BitArray>,
}

impl TermsScan<'_> {
    /// Advances to the next term and returns its encoding, or `None` when the terms are
    /// exhausted.
    pub fn next_term(&mut self) -> Result<Option<&[u8]>> {
        if !self.terms.advance()? {
            return Ok(None);
        }
        self.builder.next_ordinal()?;

        let mut prev: Option<DocId> = None;
        let docs = LiveDocs {
            postings: self.terms.postings()?,
            live_docs: self.live_docs,
        };
        for doc in docs {
            let doc = doc?;
            verify_data!(postings, prev.is_none_or(|prev| prev < doc));
            self.builder.add_doc(doc)?;
            prev = Some(doc);
        }

        Ok(Some(self.terms.term()))
    }

    /// Read access to the builder while the scan is in progress.
    pub fn builder(&self) -> &OrdinalsBuilder {
        self.builder
    }
}

/// Postings with the deleted documents filtered out.
struct LiveDocs<'a> {
    postings: Box<dyn Postings + 'a>,
    live_docs: Option<&'a BitArray>,
}

impl Iterator for LiveDocs<'_> {
    type Item = Result<DocId>;

    fn next(&mut self) -> Option<Result<DocId>> {
        loop {
            let doc = match self.postings.next_doc().transpose()? {
                Ok(doc) => doc,
                Err(e) => return Some(Err(e)),
            };
            match self.live_docs {
                Some(live) if (doc as usize) < live.len() && !live.contains(doc as usize) => {
                    continue;
                }
                _ => return Some(Ok(doc)),
            }
        }
    }
}

fn budget_exceeded(e: AllocationError) -> Error {
    Error::budget_exceeded(e.requested, e.remaining)
}
