//! Memory cost model used to compare the candidate layouts of a single-valued field.
//!
//! Costs are estimates in bytes built from the constants of
//! [`fielddata_ordinals::ram_usage`]; what matters is that both layouts are priced
//! with the same model.

use fielddata_bits::BitArray;
use fielddata_ordinals::{
    Ordinals,
    ram_usage::NUM_BYTES_INT,
};

use crate::{values::ValueArray, width::NumericWidth};

/// Bytes of a unique value dictionary of `num_values` entries (sentinel included).
pub fn dictionary_bytes(num_values: usize, width: NumericWidth) -> u64 {
    num_values as u64 * width.bytes() as u64
}

/// Bytes of a documents-with-value bitset: its words plus the length field.
pub fn bitset_bytes(docs_with_value: &BitArray) -> u64 {
    docs_with_value.heap_size_bytes() as u64 + NUM_BYTES_INT
}

/// Bytes of a dense per-document array, plus its bitset when present.
pub fn dense_bytes(max_doc: u32, width: NumericWidth, docs_with_value: Option<&BitArray>) -> u64 {
    let values = max_doc as u64 * width.bytes() as u64;
    values + docs_with_value.map_or(0, bitset_bytes)
}

/// Estimated cost of both layouts for one field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LayoutCosts {
    /// Dictionary plus ordinals.
    pub ordinals: u64,
    /// Dense values plus optional bitset.
    pub dense: u64,
}

impl LayoutCosts {
    pub fn estimate(
        values: &ValueArray,
        ordinals: &Ordinals,
        docs_with_value: Option<&BitArray>,
    ) -> LayoutCosts {
        LayoutCosts {
            ordinals: dictionary_bytes(values.len(), values.width())
                + ordinals.estimated_memory_size_bytes(),
            dense: dense_bytes(ordinals.max_doc(), values.width(), docs_with_value),
        }
    }

    /// `true` when the dense layout is strictly cheaper; ties keep the ordinals.
    pub fn prefers_dense(&self) -> bool {
        self.dense < self.ordinals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitset_bytes_rounds_to_words() {
        let bytes = |max_doc| bitset_bytes(&BitArray::empty(max_doc));
        assert_eq!(bytes(0), NUM_BYTES_INT);
        assert_eq!(bytes(1), 8 + NUM_BYTES_INT);
        assert_eq!(bytes(64), 8 + NUM_BYTES_INT);
        assert_eq!(bytes(65), 16 + NUM_BYTES_INT);
    }

    #[test]
    fn test_dense_bytes() {
        let docs_with_value = BitArray::from_positions([0, 3], 5);
        assert_eq!(dense_bytes(5, NumericWidth::I8, None), 5);
        assert_eq!(dense_bytes(5, NumericWidth::I8, Some(&docs_with_value)), 5 + 12);
        assert_eq!(dense_bytes(100, NumericWidth::I64, None), 800);
    }

    #[test]
    fn test_tie_keeps_ordinals() {
        let costs = LayoutCosts {
            ordinals: 100,
            dense: 100,
        };
        assert!(!costs.prefers_dense());
        let costs = LayoutCosts {
            ordinals: 101,
            dense: 100,
        };
        assert!(costs.prefers_dense());
    }
}
