//! Builds [`AtomicNumericFieldData`] from the terms of a segment.

use fielddata_budget_tracker::Budget;
use fielddata_common::{Result, verify_data};
use fielddata_ordinals::{
    OrdinalsBuilder, SegmentReader, numeric_terms::{FullPrecisionTerms, decode_i64},
};
use log::debug;

use crate::{
    atomic::AtomicNumericFieldData,
    selector::select,
    settings::FieldDataSettings,
    values::ValueArray,
    width::{NumericWidth, ValueBounds},
};

/// Decodes the sorted unique terms of a field into the unique value dictionary.
///
/// Slot `0` of the dictionary is reserved for "no value", so the value of the term
/// with ordinal `n` lands in slot `n`.
#[derive(Debug)]
pub struct TermScanner {
    values: Vec<i64>,
    bounds: ValueBounds,
}

impl TermScanner {
    pub fn new() -> TermScanner {
        TermScanner::with_capacity(0)
    }

    /// `num_terms` is a hint of the number of terms to come.
    pub fn with_capacity(num_terms: usize) -> TermScanner {
        let mut values = Vec::with_capacity(num_terms + 1);
        values.push(0);
        TermScanner {
            values,
            bounds: ValueBounds::new(),
        }
    }

    /// Decodes the next term and appends its value.
    pub fn push_term(&mut self, term: &[u8]) -> Result<i64> {
        let value = decode_i64(term)?;
        // Terms are sorted, so the running maximum is the previous value.
        if let Some(prev) = self.bounds.max {
            verify_data!(terms, prev < value);
        }
        self.values.push(value);
        self.bounds.observe(value);
        Ok(value)
    }

    /// Number of real values, not counting the sentinel.
    pub fn num_values(&self) -> usize {
        self.values.len() - 1
    }

    pub fn bounds(&self) -> &ValueBounds {
        &self.bounds
    }

    /// Seals the dictionary at the given width.
    pub fn into_values(self, width: NumericWidth) -> ValueArray {
        ValueArray::narrow(self.values, width)
    }
}

impl Default for TermScanner {
    fn default() -> Self {
        TermScanner::new()
    }
}

/// Loads numeric field data for one segment at a time.
///
/// Each call to [`load`](Self::load) is a single-threaded pass over the field's terms;
/// distinct segments may be loaded concurrently with the same loader.
#[derive(Clone, Debug, Default)]
pub struct NumericFieldDataLoader {
    settings: FieldDataSettings,
    budget: Option<Budget>,
}

impl NumericFieldDataLoader {
    pub fn new(settings: FieldDataSettings) -> NumericFieldDataLoader {
        NumericFieldDataLoader {
            settings,
            budget: None,
        }
    }

    /// Accounts the transient build memory against `budget`.
    pub fn with_budget(mut self, budget: Budget) -> NumericFieldDataLoader {
        self.budget = Some(budget);
        self
    }

    pub fn settings(&self) -> &FieldDataSettings {
        &self.settings
    }

    pub fn budget(&self) -> Option<&Budget> {
        self.budget.as_ref()
    }

    /// Builds the field data of `field` in `segment`.
    ///
    /// A field without terms yields [`AtomicNumericFieldData::Empty`]. Any decoding or
    /// source error aborts the build; the builder's scratch memory is released on
    /// every path.
    pub fn load(
        &self,
        segment: &dyn SegmentReader,
        field: &str,
    ) -> Result<AtomicNumericFieldData> {
        let max_doc = segment.max_doc();
        let Some(terms) = segment.terms(field)? else {
            return Ok(AtomicNumericFieldData::Empty { num_docs: max_doc });
        };

        let mut scanner = TermScanner::with_capacity(terms.size_hint().unwrap_or(0));
        let mut builder = OrdinalsBuilder::new(max_doc, self.budget.as_ref())?;
        {
            let mut terms = FullPrecisionTerms::new(terms.iter()?);
            let mut scan = builder.build_from_terms(&mut terms, segment.live_docs())?;
            while let Some(term) = scan.next_term()? {
                scanner.push_term(term)?;
            }
        }
        if scanner.num_values() == 0 {
            return Ok(AtomicNumericFieldData::Empty { num_docs: max_doc });
        }

        let ordinals = builder.build()?;
        let width = if self.settings.optimize_type {
            scanner.bounds().narrowest_width()
        } else {
            NumericWidth::I64
        };
        let num_values = scanner.num_values();
        let selection = select(scanner.into_values(width), ordinals, &self.settings);

        debug!(
            "loaded field data: segment={}, field={field}, max_doc={max_doc}, values={num_values}, \
             width={width}, layout={}, costs={:?}",
            segment.segment_id(),
            selection.data.layout(),
            selection.costs,
        );
        Ok(selection.data)
    }
}
