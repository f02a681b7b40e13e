//! Ordinal arrays stored at the narrowest unsigned width that holds the largest ordinal.

use num_traits::AsPrimitive;

use crate::terms::Ordinal;

/// An immutable array of ordinals.
///
/// The element width is picked from the maximum ordinal of the field, independently
/// of the width used for the field's values.
#[derive(Clone, PartialEq, Eq)]
pub enum PackedOrds {
    U8(Box<[u8]>),
    U16(Box<[u16]>),
    U32(Box<[u32]>),
}

impl PackedOrds {
    /// Packs `ords`, all of which must be `<= max_ord`.
    pub fn pack(ords: Vec<Ordinal>, max_ord: Ordinal) -> PackedOrds {
        debug_assert!(ords.iter().all(|&ord| ord <= max_ord));
        if max_ord <= u8::MAX as Ordinal {
            PackedOrds::U8(narrow(&ords))
        } else if max_ord <= u16::MAX as Ordinal {
            PackedOrds::U16(narrow(&ords))
        } else {
            PackedOrds::U32(ords.into_boxed_slice())
        }
    }

    #[inline]
    pub fn get(&self, index: usize) -> Ordinal {
        match self {
            PackedOrds::U8(ords) => ords[index] as Ordinal,
            PackedOrds::U16(ords) => ords[index] as Ordinal,
            PackedOrds::U32(ords) => ords[index],
        }
    }

    pub fn len(&self) -> usize {
        match self {
            PackedOrds::U8(ords) => ords.len(),
            PackedOrds::U16(ords) => ords.len(),
            PackedOrds::U32(ords) => ords.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        match self {
            PackedOrds::U8(_) => 1,
            PackedOrds::U16(_) => 2,
            PackedOrds::U32(_) => 4,
        }
    }
}

impl std::fmt::Debug for PackedOrds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackedOrds")
            .field("len", &self.len())
            .field("element_size", &self.element_size())
            .finish()
    }
}

fn narrow<T>(ords: &[Ordinal]) -> Box<[T]>
where
    T: Copy + 'static,
    Ordinal: AsPrimitive<T>,
{
    ords.iter().map(|&ord| ord.as_()).collect()
}
