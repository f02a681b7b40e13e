//! Byte-cost constants for in-memory field data structures.
//!
//! The estimates built from these constants are a consistent cost model used to
//! compare layouts and to report sizes to the cache; they are not an exact account
//! of allocator overhead.

pub const NUM_BYTES_OBJECT_HEADER: u64 = 16;
pub const NUM_BYTES_ARRAY_HEADER: u64 = 16;
pub const NUM_BYTES_INT: u64 = 4;

/// Estimated size of an array of `len` elements, `element_size` bytes each.
#[inline]
pub fn array_bytes(len: usize, element_size: usize) -> u64 {
    NUM_BYTES_ARRAY_HEADER + (len as u64) * (element_size as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_bytes() {
        assert_eq!(array_bytes(0, 8), NUM_BYTES_ARRAY_HEADER);
        assert_eq!(array_bytes(10, 4), NUM_BYTES_ARRAY_HEADER + 40);
    }
}
