//! A fixed-size array of bits, one bit per document of a segment.

/// A fixed-size array of bits with `[u64]` storage.
///
/// # Storage Format
///
/// The bits are stored in little-endian order within an array of `u64` words:
/// - Bit 0 corresponds to the least significant bit (LSB) of the first word
/// - Bit 63 corresponds to the most significant bit (MSB) of the first word
/// - Bit 64 corresponds to the LSB of the second word, and so on
///
/// The number of words allocated is `len.div_ceil(64)`. Any bits beyond the array's
/// specified length in the final word are guaranteed to be 0, so word-level
/// operations (`count_ones`, equality) never observe garbage past the end.
///
/// A `BitArray` is never resized: its length is the segment's `max_doc`.
#[derive(Clone, PartialEq, Eq)]
pub struct BitArray {
    len: usize,
    bits: Box<[u64]>,
}

impl BitArray {
    /// Creates a new bit array with all bits set to 0.
    pub fn empty(len: usize) -> BitArray {
        BitArray {
            len,
            bits: vec![0u64; len.div_ceil(64)].into_boxed_slice(),
        }
    }

    /// Creates a new bit array with all bits set to 1.
    pub fn full(len: usize) -> BitArray {
        let mut bits = vec![u64::MAX; len.div_ceil(64)].into_boxed_slice();
        Self::mask_tail(&mut bits, len);
        BitArray { len, bits }
    }

    /// Creates a new bit array with bits set at the specified positions.
    ///
    /// # Panics
    ///
    /// Panics if any position in `positions` is >= `len`.
    pub fn from_positions(positions: impl IntoIterator<Item = usize>, len: usize) -> BitArray {
        let mut bit_array = BitArray::empty(len);
        for position in positions {
            assert!(position < len, "position {position} out of bounds (len: {len})");
            bit_array.set(position);
        }
        bit_array
    }

    /// Sets the bit at the given index to 1.
    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        self.bits[word_index] |= 1u64 << bit_position;
    }

    /// Resets the bit at the given index to 0.
    #[inline]
    pub fn reset(&mut self, index: usize) {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        self.bits[word_index] &= !(1u64 << bit_position);
    }

    /// Check if the bit at the given index is set.
    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "Index {index} out of bounds (len: {})",
            self.len
        );
        let (word_index, bit_position) = Self::bit_position(index);
        (self.bits[word_index] & (1u64 << bit_position)) != 0
    }

    /// Counts the number of set bits (1s) in the bit array.
    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|word| word.count_ones() as usize).sum()
    }

    /// Returns an iterator over the positions of set bits, in ascending order.
    pub fn iter(&self) -> BitArrayIter<'_> {
        BitArrayIter {
            words: self.bits.iter(),
            current_word: 0,
            next_word_index: 0,
            base_index: 0,
            len: self.len,
        }
    }

    /// Returns the number of bits in the array.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the bit array has zero length.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of heap-allocated bytes used by this bit array's storage.
    ///
    /// Exact for this type: `Box<[u64]>` holds exactly `len.div_ceil(64)` words.
    pub fn heap_size_bytes(&self) -> usize {
        self.bits.len() * std::mem::size_of::<u64>()
    }

    #[inline]
    fn bit_position(index: usize) -> (usize, usize) {
        (index / 64, index % 64)
    }

    /// Zeroes any bits beyond `len` in the last storage word.
    #[inline]
    fn mask_tail(bits: &mut [u64], len: usize) {
        let partial = len % 64;
        if partial == 0 {
            return;
        }
        if let Some(last) = bits.last_mut() {
            *last &= (1u64 << partial) - 1;
        }
    }
}

impl std::fmt::Debug for BitArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BitArray")
            .field("len", &self.len)
            .field("count_ones", &self.count_ones())
            .finish_non_exhaustive()
    }
}

/// An iterator over the positions of set bits in a `BitArray`.
#[derive(Clone)]
pub struct BitArrayIter<'a> {
    words: std::slice::Iter<'a, u64>,
    current_word: u64,
    next_word_index: usize,
    base_index: usize,
    len: usize,
}

impl Iterator for BitArrayIter<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.current_word != 0 {
                let index = self.base_index + self.current_word.trailing_zeros() as usize;
                if index >= self.len {
                    return None;
                }
                // Clear the lowest set bit.
                self.current_word &= self.current_word - 1;
                return Some(index);
            }

            let &word = self.words.next()?;
            self.current_word = word;
            self.base_index = self.next_word_index * 64;
            self.next_word_index += 1;
        }
    }
}
