//! Per-segment numeric field data.

use fielddata_bits::BitArray;
use fielddata_ordinals::{DocId, Ordinals, Ords};

use crate::{
    memory::{bitset_bytes, dictionary_bytes},
    values::ValueArray,
    width::NumericWidth,
};

/// Layout of an [`AtomicNumericFieldData`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layout {
    Empty,
    WithOrdinals,
    Single,
    SingleWithNullSet,
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Layout::Empty => "empty",
            Layout::WithOrdinals => "with_ordinals",
            Layout::Single => "single",
            Layout::SingleWithNullSet => "single_with_null_set",
        };
        f.write_str(name)
    }
}

/// The values of one numeric field in one segment, loaded for random per-document
/// access.
///
/// Immutable once built and `Send + Sync`; readers need no synchronization. The
/// storage width of the values is carried by [`ValueArray`].
#[derive(Clone, Debug)]
pub enum AtomicNumericFieldData {
    /// The field has no terms in the segment.
    Empty { num_docs: u32 },
    /// Unique value dictionary indexed by the ordinals of each document.
    WithOrdinals {
        values: ValueArray,
        ordinals: Ordinals,
    },
    /// One value per document, every document having a value.
    Single { values: ValueArray },
    /// One value slot per document; `docs_with_value` tells which slots are set.
    SingleWithNullSet {
        values: ValueArray,
        docs_with_value: BitArray,
    },
}

impl AtomicNumericFieldData {
    pub fn layout(&self) -> Layout {
        match self {
            AtomicNumericFieldData::Empty { .. } => Layout::Empty,
            AtomicNumericFieldData::WithOrdinals { .. } => Layout::WithOrdinals,
            AtomicNumericFieldData::Single { .. } => Layout::Single,
            AtomicNumericFieldData::SingleWithNullSet { .. } => Layout::SingleWithNullSet,
        }
    }

    /// Storage width of the values, `None` for an empty field.
    pub fn width(&self) -> Option<NumericWidth> {
        match self {
            AtomicNumericFieldData::Empty { .. } => None,
            AtomicNumericFieldData::WithOrdinals { values, .. }
            | AtomicNumericFieldData::Single { values }
            | AtomicNumericFieldData::SingleWithNullSet { values, .. } => Some(values.width()),
        }
    }

    pub fn num_docs(&self) -> u32 {
        match self {
            AtomicNumericFieldData::Empty { num_docs } => *num_docs,
            AtomicNumericFieldData::WithOrdinals { ordinals, .. } => ordinals.max_doc(),
            AtomicNumericFieldData::Single { values } => values.len() as u32,
            AtomicNumericFieldData::SingleWithNullSet { values, .. } => values.len() as u32,
        }
    }

    pub fn is_multi_valued(&self) -> bool {
        match self {
            AtomicNumericFieldData::WithOrdinals { ordinals, .. } => ordinals.is_multi_valued(),
            _ => false,
        }
    }

    /// Numeric field data does not guarantee that values are ordered across documents.
    pub fn is_values_ordered(&self) -> bool {
        false
    }

    /// The ordinals, for the ordinal-indirected layout.
    pub fn ordinals(&self) -> Option<&Ordinals> {
        match self {
            AtomicNumericFieldData::WithOrdinals { ordinals, .. } => Some(ordinals),
            _ => None,
        }
    }

    /// Memory held by the representation, priced with the same model used to choose
    /// the layout. `0` for an empty field.
    pub fn estimated_memory_size_bytes(&self) -> u64 {
        match self {
            AtomicNumericFieldData::Empty { .. } => 0,
            AtomicNumericFieldData::WithOrdinals { values, ordinals } => {
                dictionary_bytes(values.len(), values.width())
                    + ordinals.estimated_memory_size_bytes()
            }
            AtomicNumericFieldData::Single { values } => values.heap_size_bytes() as u64,
            AtomicNumericFieldData::SingleWithNullSet {
                values,
                docs_with_value,
            } => values.heap_size_bytes() as u64 + bitset_bytes(docs_with_value),
        }
    }

    pub fn long_values(&self) -> LongValues<'_> {
        LongValues { data: self }
    }

    pub fn double_values(&self) -> DoubleValues<'_> {
        DoubleValues {
            inner: self.long_values(),
        }
    }
}

/// Per-document access to the values as 64-bit integers.
#[derive(Clone, Copy)]
pub struct LongValues<'a> {
    data: &'a AtomicNumericFieldData,
}

impl<'a> LongValues<'a> {
    #[inline]
    pub fn has_value(&self, doc: DocId) -> bool {
        self.value_count(doc) != 0
    }

    #[inline]
    pub fn value_count(&self, doc: DocId) -> usize {
        debug_assert!(doc < self.data.num_docs());
        match self.data {
            AtomicNumericFieldData::Empty { .. } => 0,
            AtomicNumericFieldData::WithOrdinals { ordinals, .. } => ordinals.value_count(doc),
            AtomicNumericFieldData::Single { .. } => 1,
            AtomicNumericFieldData::SingleWithNullSet {
                docs_with_value, ..
            } => docs_with_value.contains(doc as usize) as usize,
        }
    }

    /// The first (smallest) value of `doc`.
    #[inline]
    pub fn value(&self, doc: DocId) -> Option<i64> {
        match self.data {
            AtomicNumericFieldData::Empty { .. } => None,
            AtomicNumericFieldData::WithOrdinals { values, ordinals } => {
                let ord = ordinals.ord(doc);
                (ord != 0).then(|| values.get(ord as usize))
            }
            AtomicNumericFieldData::Single { values } => Some(values.get(doc as usize)),
            AtomicNumericFieldData::SingleWithNullSet {
                values,
                docs_with_value,
            } => docs_with_value
                .contains(doc as usize)
                .then(|| values.get(doc as usize)),
        }
    }

    #[inline]
    pub fn value_or(&self, doc: DocId, missing: i64) -> i64 {
        self.value(doc).unwrap_or(missing)
    }

    /// The values of `doc` in ascending order.
    pub fn values(&self, doc: DocId) -> DocValues<'a> {
        match self.data {
            AtomicNumericFieldData::WithOrdinals { values, ordinals } => DocValues::Ords {
                values,
                ords: ordinals.ords(doc),
            },
            _ => DocValues::One(self.value(doc)),
        }
    }
}

/// Iterator over the values of one document.
pub enum DocValues<'a> {
    One(Option<i64>),
    Ords { values: &'a ValueArray, ords: Ords<'a> },
}

impl Iterator for DocValues<'_> {
    type Item = i64;

    #[inline]
    fn next(&mut self) -> Option<i64> {
        match self {
            DocValues::One(value) => value.take(),
            DocValues::Ords { values, ords } => ords.next().map(|ord| values.get(ord as usize)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            DocValues::One(value) => {
                let len = value.is_some() as usize;
                (len, Some(len))
            }
            DocValues::Ords { ords, .. } => ords.size_hint(),
        }
    }
}

impl ExactSizeIterator for DocValues<'_> {}

/// Per-document access to the values converted to `f64`.
#[derive(Clone, Copy)]
pub struct DoubleValues<'a> {
    inner: LongValues<'a>,
}

impl<'a> DoubleValues<'a> {
    #[inline]
    pub fn has_value(&self, doc: DocId) -> bool {
        self.inner.has_value(doc)
    }

    #[inline]
    pub fn value_count(&self, doc: DocId) -> usize {
        self.inner.value_count(doc)
    }

    #[inline]
    pub fn value(&self, doc: DocId) -> Option<f64> {
        self.inner.value(doc).map(|value| value as f64)
    }

    #[inline]
    pub fn value_or(&self, doc: DocId, missing: f64) -> f64 {
        self.value(doc).unwrap_or(missing)
    }

    pub fn values(&self, doc: DocId) -> impl ExactSizeIterator<Item = f64> + 'a {
        self.inner.values(doc).map(|value| value as f64)
    }
}
