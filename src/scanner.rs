//! Low-level cursor over the input byte range.
//!
//! The scanner produces field tags and primitive values, and supports
//! skip-with-rewind so that the full on-wire bytes of the most recent field
//! can be captured for unknown-field preservation. It reads from a borrowed
//! contiguous slice rather than a `Buf`: the rewind contract requires random
//! access to the range between `field_start` and the cursor.

use crate::encoding::WireType;
use crate::error::DecodeError;

/// A decoded field key: the field number and wire type read from one varint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldTag {
    pub field_number: u32,
    pub wire_type: WireType,
}

/// A mutable reader over an immutable input range.
///
/// Invariants: after a successful [`get_tag`](Scanner::get_tag),
/// `field_start <= pos`; after [`skip`](Scanner::skip), `field_end` is
/// populated and the cursor sits on it.
pub struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
    /// Cursor snapshot taken at the beginning of the most recent `get_tag`,
    /// so `skip` can replay the field and bound its raw bytes.
    field_start: usize,
    /// End of the current field, populated lazily the first time the field
    /// is skipped or its raw bytes are materialized.
    field_end: Option<usize>,
    last_wire_type: Option<WireType>,
    recursion_limit: u32,
}

impl<'a> Scanner<'a> {
    /// Creates a scanner over `data` with the default recursion limit.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_recursion_limit(data, crate::RECURSION_LIMIT)
    }

    /// Creates a scanner whose group-skipping recursion is bounded by
    /// `limit` levels.
    pub fn with_recursion_limit(data: &'a [u8], limit: u32) -> Self {
        Scanner {
            data,
            pos: 0,
            field_start: 0,
            field_end: None,
            last_wire_type: None,
            recursion_limit: limit,
        }
    }

    pub(crate) fn set_recursion_limit(&mut self, limit: u32) {
        self.recursion_limit = limit;
    }

    /// Bytes left between the cursor and the end of the input.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// The wire type of the most recently read tag.
    #[inline]
    pub fn last_wire_type(&self) -> Option<WireType> {
        self.last_wire_type
    }

    /// Reads the next field tag.
    ///
    /// Returns `Ok(None)` at clean end-of-input. Fails when the key varint
    /// encodes a value above `u32::MAX`, when the wire type bits are 6 or 7,
    /// or when the field number is zero.
    pub fn get_tag(&mut self) -> Result<Option<FieldTag>, DecodeError> {
        self.field_start = self.pos;
        self.field_end = None;
        let key = match self.read_raw_varint()? {
            Some(key) => key,
            None => return Ok(None),
        };
        if key > u64::from(u32::MAX) {
            return Err(DecodeError::malformed("invalid key value"));
        }
        let wire_type = WireType::try_from(key & 0x07)?;
        let field_number = (key as u32) >> 3;
        if field_number == 0 {
            return Err(DecodeError::malformed("invalid tag value: 0"));
        }
        self.last_wire_type = Some(wire_type);
        Ok(Some(FieldTag {
            field_number,
            wire_type,
        }))
    }

    /// Reads one raw varint of up to 10 bytes.
    ///
    /// Returns `Ok(None)` only when the input is already exhausted before
    /// the first byte. A missing continuation byte is a truncation; a 10th
    /// byte with its continuation bit still set, or a value overflowing 64
    /// bits, is malformed.
    pub fn read_raw_varint(&mut self) -> Result<Option<u64>, DecodeError> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        let mut value: u64 = 0;
        for count in 0..10 {
            let byte = match self.data.get(self.pos + count) {
                Some(&byte) => byte,
                None => return Err(DecodeError::truncated("truncated varint")),
            };
            value |= u64::from(byte & 0x7F) << (7 * count);
            if byte & 0x80 == 0 {
                // The 10th byte carries bit 63 in its low bit; anything
                // above that overflows u64.
                if count == 9 && byte > 1 {
                    return Err(DecodeError::malformed("invalid varint"));
                }
                self.pos += count + 1;
                return Ok(Some(value));
            }
        }
        Err(DecodeError::malformed("invalid varint"))
    }

    /// Reads one varint that must be present.
    pub(crate) fn read_varint(&mut self) -> Result<u64, DecodeError> {
        match self.read_raw_varint()? {
            Some(value) => Ok(value),
            None => Err(DecodeError::truncated("unexpected end of input")),
        }
    }

    /// Reads exactly 4 little-endian bytes.
    pub fn read_fixed32(&mut self) -> Result<u32, DecodeError> {
        if self.remaining() < 4 {
            return Err(DecodeError::truncated("buffer underflow"));
        }
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Reads exactly 8 little-endian bytes.
    pub fn read_fixed64(&mut self) -> Result<u64, DecodeError> {
        if self.remaining() < 8 {
            return Err(DecodeError::truncated("buffer underflow"));
        }
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&self.data[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(u64::from_le_bytes(bytes))
    }

    /// Reads a length prefix and returns the sub-slice it delimits,
    /// advancing past it.
    pub fn read_length_delimited(&mut self) -> Result<&'a [u8], DecodeError> {
        let len = self.read_varint()?;
        if len > self.remaining() as u64 {
            return Err(DecodeError::malformed("buffer underflow"));
        }
        let start = self.pos;
        self.pos += len as usize;
        Ok(&self.data[start..self.pos])
    }

    /// Advances past the current field.
    ///
    /// If the field's end is already known the cursor jumps to it;
    /// otherwise the scanner rewinds to the field start, re-reads the tag,
    /// and walks over the value.
    pub fn skip(&mut self) -> Result<(), DecodeError> {
        if let Some(end) = self.field_end {
            self.pos = end;
            return Ok(());
        }
        self.pos = self.field_start;
        let key = self.read_varint()?;
        let wire_type = WireType::try_from(key & 0x07)?;
        let field_number = (key >> 3) as u32;
        self.skip_over(field_number, wire_type, self.recursion_limit)?;
        self.field_end = Some(self.pos);
        Ok(())
    }

    /// Skips the current field and returns its complete on-wire bytes, tag
    /// included, as the half-open slice `[field_start, field_end)`.
    pub fn get_raw_field(&mut self) -> Result<&'a [u8], DecodeError> {
        self.skip()?;
        // skip() leaves the cursor on the recorded field end.
        let end = self.field_end.unwrap_or(self.pos);
        Ok(&self.data[self.field_start..end])
    }

    /// Walks over one field value of the given wire type, recursing through
    /// nested groups.
    fn skip_over(&mut self, field_number: u32, wire_type: WireType, depth: u32) -> Result<(), DecodeError> {
        match wire_type {
            WireType::Varint => {
                self.read_varint()?;
            }
            WireType::SixtyFourBit => self.advance(8)?,
            WireType::ThirtyTwoBit => self.advance(4)?,
            WireType::LengthDelimited => {
                let len = self.read_varint()?;
                if len > self.remaining() as u64 {
                    return Err(DecodeError::malformed("buffer underflow"));
                }
                self.pos += len as usize;
            }
            WireType::StartGroup => {
                if depth == 0 {
                    return Err(DecodeError::malformed("recursion limit reached"));
                }
                loop {
                    let key = self.read_varint()?;
                    let inner_wire_type = WireType::try_from(key & 0x07)?;
                    let inner_number = (key >> 3) as u32;
                    if inner_number == 0 {
                        return Err(DecodeError::malformed("invalid tag value: 0"));
                    }
                    match inner_wire_type {
                        WireType::EndGroup => {
                            if inner_number != field_number {
                                return Err(DecodeError::malformed("unexpected end group tag"));
                            }
                            break;
                        }
                        // Only genuine nesting spends recursion budget;
                        // sibling fields inside the group do not.
                        WireType::StartGroup => self.skip_over(inner_number, inner_wire_type, depth - 1)?,
                        _ => self.skip_over(inner_number, inner_wire_type, depth)?,
                    }
                }
            }
            WireType::EndGroup => return Err(DecodeError::malformed("unexpected end group tag")),
        }
        Ok(())
    }

    fn advance(&mut self, n: usize) -> Result<(), DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::truncated("buffer underflow"));
        }
        self.pos += n;
        Ok(())
    }
}
