//! Error type, result alias and guard macros shared by the fielddata-* crates.

pub mod error;
pub mod result;

pub use result::Result;
