//! Chooses the final layout of a field from the results of the terms scan.

use fielddata_ordinals::Ordinals;

use crate::{
    atomic::{AtomicNumericFieldData, Layout},
    memory::LayoutCosts,
    settings::FieldDataSettings,
    values::ValueArray,
};

/// Layout decision for a single-valued field with the given costs.
///
/// The decision only depends on the costs and on whether some documents lack a value.
pub fn choose_layout(costs: &LayoutCosts, has_null_set: bool) -> Layout {
    if !costs.prefers_dense() {
        Layout::WithOrdinals
    } else if has_null_set {
        Layout::SingleWithNullSet
    } else {
        Layout::Single
    }
}

/// Outcome of [`select`]: the built field data and the costs it was chosen with.
#[derive(Debug)]
pub struct Selection {
    pub data: AtomicNumericFieldData,
    /// `None` when no cost comparison took place.
    pub costs: Option<LayoutCosts>,
}

/// Turns the unique value dictionary and the ordinals into the final representation.
///
/// Multi-valued fields, and all fields when `remove_ords_on_single_value` is off, keep
/// the ordinals. Otherwise the cheaper of the two layouts is built; a dense array is
/// materialized in a single pass over the documents.
pub fn select(
    values: ValueArray,
    ordinals: Ordinals,
    settings: &FieldDataSettings,
) -> Selection {
    if ordinals.is_multi_valued() || !settings.remove_ords_on_single_value {
        return Selection {
            data: AtomicNumericFieldData::WithOrdinals { values, ordinals },
            costs: None,
        };
    }

    let docs_with_value = ordinals.docs_with_value_set();
    let costs = LayoutCosts::estimate(&values, &ordinals, docs_with_value.as_ref());
    let data = match (choose_layout(&costs, docs_with_value.is_some()), docs_with_value) {
        (Layout::Single, _) => AtomicNumericFieldData::Single {
            values: values.gather(&ordinals),
        },
        (Layout::SingleWithNullSet, Some(docs_with_value)) => {
            AtomicNumericFieldData::SingleWithNullSet {
                values: values.gather(&ordinals),
                docs_with_value,
            }
        }
        _ => AtomicNumericFieldData::WithOrdinals { values, ordinals },
    };
    Selection {
        data,
        costs: Some(costs),
    }
}
