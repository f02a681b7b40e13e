//! Index-level entry point for a numeric field.

use std::sync::Arc;

use fielddata_budget_tracker::Budget;
use fielddata_common::Result;
use fielddata_ordinals::SegmentReader;

use crate::{
    atomic::AtomicNumericFieldData,
    cache::{CacheKey, FieldDataCache},
    loader::NumericFieldDataLoader,
    settings::FieldDataSettings,
    width::NumericWidth,
};

/// Field data of a 64-bit integer field, loaded segment by segment through a cache.
pub struct IndexNumericFieldData {
    field_name: String,
    loader: NumericFieldDataLoader,
    cache: Arc<dyn FieldDataCache>,
}

impl IndexNumericFieldData {
    pub fn new(
        field_name: impl Into<String>,
        settings: FieldDataSettings,
        cache: Arc<dyn FieldDataCache>,
    ) -> IndexNumericFieldData {
        IndexNumericFieldData {
            field_name: field_name.into(),
            loader: NumericFieldDataLoader::new(settings),
            cache,
        }
    }

    pub fn with_budget(mut self, budget: Budget) -> IndexNumericFieldData {
        self.loader = self.loader.with_budget(budget);
        self
    }

    pub fn field_name(&self) -> &str {
        &self.field_name
    }

    /// Logical type of the field; storage may be narrower per segment.
    pub fn numeric_type(&self) -> NumericWidth {
        NumericWidth::I64
    }

    pub fn values_ordered(&self) -> bool {
        false
    }

    pub fn settings(&self) -> &FieldDataSettings {
        self.loader.settings()
    }

    /// Returns the field data of `segment`, building it on the first request.
    pub fn load(&self, segment: &dyn SegmentReader) -> Result<Arc<AtomicNumericFieldData>> {
        let key = CacheKey::new(segment.segment_id(), self.field_name.as_str());
        self.cache
            .load_or_build(&key, &mut || self.load_direct(segment))
    }

    /// Builds the field data of `segment`, bypassing the cache.
    pub fn load_direct(&self, segment: &dyn SegmentReader) -> Result<AtomicNumericFieldData> {
        self.loader.load(segment, &self.field_name)
    }
}

impl std::fmt::Debug for IndexNumericFieldData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexNumericFieldData")
            .field("field_name", &self.field_name)
            .field("loader", &self.loader)
            .finish_non_exhaustive()
    }
}
