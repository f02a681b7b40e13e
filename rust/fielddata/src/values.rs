//! Value storage at a fixed integer width.

use fielddata_ordinals::Ordinals;

use crate::width::{NumericWidth, StorageValue};

/// An immutable array of 64-bit values stored at a possibly narrower width.
///
/// Used both for the unique value dictionary (indexed by ordinal, slot `0` being
/// the "no value" sentinel) and for dense per-document values.
#[derive(Clone, PartialEq, Eq)]
pub enum ValueArray {
    I8(Box<[i8]>),
    I16(Box<[i16]>),
    I32(Box<[i32]>),
    I64(Box<[i64]>),
}

impl ValueArray {
    /// Stores `values` at `width`. Every value must fit the width.
    pub fn narrow(values: Vec<i64>, width: NumericWidth) -> ValueArray {
        match width {
            NumericWidth::I8 => ValueArray::I8(narrow(&values)),
            NumericWidth::I16 => ValueArray::I16(narrow(&values)),
            NumericWidth::I32 => ValueArray::I32(narrow(&values)),
            NumericWidth::I64 => ValueArray::I64(values.into_boxed_slice()),
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> i64 {
        match self {
            ValueArray::I8(values) => values[index].widen(),
            ValueArray::I16(values) => values[index].widen(),
            ValueArray::I32(values) => values[index].widen(),
            ValueArray::I64(values) => values[index],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ValueArray::I8(values) => values.len(),
            ValueArray::I16(values) => values.len(),
            ValueArray::I32(values) => values.len(),
            ValueArray::I64(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> NumericWidth {
        match self {
            ValueArray::I8(_) => NumericWidth::I8,
            ValueArray::I16(_) => NumericWidth::I16,
            ValueArray::I32(_) => NumericWidth::I32,
            ValueArray::I64(_) => NumericWidth::I64,
        }
    }

    pub fn heap_size_bytes(&self) -> usize {
        self.len() * self.width().bytes()
    }

    /// Resolves the first ordinal of every document through this dictionary, in
    /// document order, keeping the dictionary's width.
    ///
    /// Documents without a value receive the sentinel slot's value.
    pub fn gather(&self, ordinals: &Ordinals) -> ValueArray {
        match self {
            ValueArray::I8(dict) => ValueArray::I8(gather(dict, ordinals)),
            ValueArray::I16(dict) => ValueArray::I16(gather(dict, ordinals)),
            ValueArray::I32(dict) => ValueArray::I32(gather(dict, ordinals)),
            ValueArray::I64(dict) => ValueArray::I64(gather(dict, ordinals)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}

impl std::fmt::Debug for ValueArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValueArray")
            .field("width", &self.width())
            .field("len", &self.len())
            .finish()
    }
}

fn narrow<T: StorageValue>(values: &[i64]) -> Box<[T]> {
    values.iter().map(|&value| T::narrow(value)).collect()
}

fn gather<T: Copy>(dict: &[T], ordinals: &Ordinals) -> Box<[T]> {
    (0..ordinals.max_doc())
        .map(|doc| dict[ordinals.ord(doc) as usize])
        .collect()
}
