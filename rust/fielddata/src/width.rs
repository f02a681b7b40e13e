//! Storage width of the unique value dictionary.

use num_traits::{AsPrimitive, Bounded, PrimInt};
use serde::{Deserialize, Serialize};

/// Integer type the values of a field are stored as.
///
/// The logical type of a numeric field is always a 64-bit integer; narrower widths
/// are a storage optimization and widen back losslessly.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum NumericWidth {
    I8,
    I16,
    I32,
    I64,
}

impl NumericWidth {
    /// Size of one stored value in bytes.
    pub fn bytes(self) -> usize {
        match self {
            NumericWidth::I8 => 1,
            NumericWidth::I16 => 2,
            NumericWidth::I32 => 4,
            NumericWidth::I64 => 8,
        }
    }

    /// The narrowest width whose range contains `[min, max]`.
    ///
    /// An empty range (`min > max`) cannot be narrowed and yields `I64`.
    pub fn narrowest(min: i64, max: i64) -> NumericWidth {
        if min > max {
            NumericWidth::I64
        } else if i8::contains_range(min, max) {
            NumericWidth::I8
        } else if i16::contains_range(min, max) {
            NumericWidth::I16
        } else if i32::contains_range(min, max) {
            NumericWidth::I32
        } else {
            NumericWidth::I64
        }
    }
}

impl std::fmt::Display for NumericWidth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NumericWidth::I8 => "i8",
            NumericWidth::I16 => "i16",
            NumericWidth::I32 => "i32",
            NumericWidth::I64 => "i64",
        };
        f.write_str(name)
    }
}

/// A signed integer type values can be stored as.
pub trait StorageValue: PrimInt + Bounded + AsPrimitive<i64> + Send + Sync + 'static {
    const WIDTH: NumericWidth;

    /// Whether every value of `[min, max]` is representable.
    #[inline]
    fn contains_range(min: i64, max: i64) -> bool {
        min >= Self::min_value().as_() && max <= Self::max_value().as_()
    }

    /// Narrows `value`, which must be within the type's range.
    fn narrow(value: i64) -> Self;

    #[inline]
    fn widen(self) -> i64 {
        self.as_()
    }
}

macro_rules! impl_storage_value {
    ($T:ty, $width:ident) => {
        impl StorageValue for $T {
            const WIDTH: NumericWidth = NumericWidth::$width;

            #[inline]
            fn narrow(value: i64) -> Self {
                debug_assert!(Self::contains_range(value, value));
                value as $T
            }
        }
    };
}

impl_storage_value!(i8, I8);
impl_storage_value!(i16, I16);
impl_storage_value!(i32, I32);
impl_storage_value!(i64, I64);

/// Running minimum and maximum of the values seen during a scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ValueBounds {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl ValueBounds {
    pub fn new() -> ValueBounds {
        ValueBounds::default()
    }

    #[inline]
    pub fn observe(&mut self, value: i64) {
        self.min = Some(self.min.map_or(value, |min| min.min(value)));
        self.max = Some(self.max.map_or(value, |max| max.max(value)));
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none()
    }

    /// The narrowest width holding every observed value; `I64` when nothing was observed.
    pub fn narrowest_width(&self) -> NumericWidth {
        match (self.min, self.max) {
            (Some(min), Some(max)) => NumericWidth::narrowest(min, max),
            _ => NumericWidth::I64,
        }
    }
}
