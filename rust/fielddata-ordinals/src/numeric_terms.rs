//! Prefix-coded encoding of 64-bit integers as index terms.
//!
//! A numeric value is indexed as a family of terms: one full-precision term
//! (`shift == 0`) plus lower-precision terms with the low `shift` bits dropped,
//! which accelerate range queries. Each encoding is:
//!
//! - one byte `SHIFT_START_LONG + shift`;
//! - the sortable bits `(value ^ i64::MIN) >> shift`, big-endian, 7 bits per byte
//!   (the high bit of every payload byte is clear).
//!
//! For a given shift all encodings have the same length, and byte-wise lexicographic
//! order equals signed numeric order. Since the shift byte comes first, all
//! full-precision terms sort before any lower-precision term.

use fielddata_common::{Result, error::Error};

use crate::terms::{Postings, TermsEnum};

/// Shift byte of a full-precision term.
pub const SHIFT_START_LONG: u8 = 0x20;

/// Length of a full-precision encoding.
pub const BUF_SIZE_LONG: usize = 63 / 7 + 2;

/// Length in bytes of the encoding of a value at the given shift.
#[inline]
pub fn encoded_len(shift: u32) -> usize {
    debug_assert!(shift < 64);
    (63 - shift as usize) / 7 + 2
}

/// Encodes `value` with the low `shift` bits dropped.
///
/// # Panics
///
/// Panics if `shift > 63`.
pub fn encode_i64(value: i64, shift: u32) -> Vec<u8> {
    let mut buf = Vec::with_capacity(BUF_SIZE_LONG);
    encode_i64_into(value, shift, &mut buf);
    buf
}

/// Encodes `value` into `buf`, replacing its contents.
pub fn encode_i64_into(value: i64, shift: u32, buf: &mut Vec<u8>) {
    assert!(shift < 64, "shift {shift} out of range");
    let len = encoded_len(shift);
    buf.clear();
    buf.resize(len, 0);
    buf[0] = SHIFT_START_LONG + shift as u8;
    let mut sortable_bits = ((value ^ i64::MIN) as u64) >> shift;
    for byte in buf[1..].iter_mut().rev() {
        *byte = (sortable_bits & 0x7f) as u8;
        sortable_bits >>= 7;
    }
}

/// Returns the shift of an encoded term.
pub fn term_shift(term: &[u8]) -> Result<u32> {
    let Some(&first) = term.first() else {
        return Err(Error::codec(term, "empty term"));
    };
    let shift = first.wrapping_sub(SHIFT_START_LONG) as u32;
    if first < SHIFT_START_LONG || shift > 63 {
        return Err(Error::codec(term, format!("invalid shift byte {first:#04x}")));
    }
    Ok(shift)
}

/// Decodes an encoded term back to its (shifted) value.
///
/// For a lower-precision term the dropped low bits are zero.
pub fn decode_i64(term: &[u8]) -> Result<i64> {
    let shift = term_shift(term)?;
    let payload = &term[1..];
    let expected_len = encoded_len(shift) - 1;
    if payload.len() != expected_len {
        return Err(Error::codec(
            term,
            format!(
                "payload length {} does not match shift {shift}, expected {expected_len}",
                payload.len()
            ),
        ));
    }

    // The leading group carries fewer than 7 significant bits.
    let excess_bits = expected_len * 7 - (64 - shift as usize);
    if payload[0] >> (7 - excess_bits) != 0 {
        return Err(Error::codec(term, "value exceeds 64 bits"));
    }

    let mut sortable_bits = 0u64;
    for (i, &byte) in payload.iter().enumerate() {
        if byte & 0x80 != 0 {
            return Err(Error::codec(
                term,
                format!("invalid byte {byte:#04x} at position {}", i + 1),
            ));
        }
        sortable_bits = (sortable_bits << 7) | byte as u64;
    }
    Ok(((sortable_bits << shift) as i64) ^ i64::MIN)
}

/// Term enumeration filter that exposes only the full-precision terms of a
/// prefix-coded numeric field.
///
/// Lower-precision terms sort after every full-precision term, so enumeration stops
/// at the first term with a non-zero shift.
pub struct FullPrecisionTerms<T> {
    inner: T,
    exhausted: bool,
}

impl<T: TermsEnum> FullPrecisionTerms<T> {
    pub fn new(inner: T) -> FullPrecisionTerms<T> {
        FullPrecisionTerms {
            inner,
            exhausted: false,
        }
    }
}

impl<T: TermsEnum> TermsEnum for FullPrecisionTerms<T> {
    fn advance(&mut self) -> Result<bool> {
        if self.exhausted {
            return Ok(false);
        }
        if !self.inner.advance()? || term_shift(self.inner.term())? != 0 {
            self.exhausted = true;
            return Ok(false);
        }
        Ok(true)
    }

    fn term(&self) -> &[u8] {
        self.inner.term()
    }

    fn postings(&mut self) -> Result<Box<dyn Postings + '_>> {
        self.inner.postings()
    }
}
