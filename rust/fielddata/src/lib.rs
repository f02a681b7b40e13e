//! In-memory field data for numeric fields.
//!
//! Loading a numeric field of a segment is a single pass over its sorted unique terms:
//!
//! 1. every full-precision term is decoded into the unique value dictionary
//!    ([`loader::TermScanner`]) while an [`OrdinalsBuilder`](fielddata_ordinals::OrdinalsBuilder)
//!    maps each live document to the ordinals of its terms;
//! 2. the dictionary is stored at the narrowest integer width holding its range
//!    ([`width`]);
//! 3. single-valued fields are turned into a dense per-document array when that is
//!    cheaper than keeping the ordinals ([`selector`], [`memory`]).
//!
//! The result is an immutable [`AtomicNumericFieldData`] shared through a
//! [`FieldDataCache`].

pub mod atomic;
pub mod cache;
pub mod index;
pub mod loader;
pub mod memory;
pub mod selector;
pub mod settings;
pub mod values;
pub mod width;

pub use atomic::{AtomicNumericFieldData, DocValues, DoubleValues, Layout, LongValues};
pub use cache::{CacheKey, FieldDataCache, SegmentFieldDataCache};
pub use index::IndexNumericFieldData;
pub use loader::{NumericFieldDataLoader, TermScanner};
pub use settings::FieldDataSettings;
pub use values::ValueArray;
pub use width::NumericWidth;
