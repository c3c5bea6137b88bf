//! Shared wire-level primitives: field key arithmetic and the recursion
//! budget threaded through nested decodes.
//!
//! The wire format is described in
//! <https://protobuf.dev/programming-guides/encoding/>.

use bytes::BufMut;

pub mod varint;
pub use varint::encode_varint;
pub use varint::encoded_len_varint;

pub mod wire_type;
pub use wire_type::WireType;

use crate::error::DecodeError;

pub const MIN_TAG: u32 = 1;
pub const MAX_TAG: u32 = (1 << 29) - 1;

/// Additional information passed to every decode function.
///
/// The context should be passed by value and can be freely cloned. When
/// passing to a function which is decoding a nested object, use
/// `enter_recursion`.
#[derive(Clone, Copy, Debug)]
pub struct DecodeContext {
    /// How many times we can recurse in the current decode stack before we
    /// hit the recursion limit.
    recurse_count: u32,
}

impl Default for DecodeContext {
    #[inline]
    fn default() -> DecodeContext {
        DecodeContext {
            recurse_count: crate::RECURSION_LIMIT,
        }
    }
}

impl DecodeContext {
    /// Creates a context with a custom recursion limit instead of the
    /// default of 100.
    #[inline]
    #[must_use]
    pub const fn with_recursion_limit(limit: u32) -> DecodeContext {
        DecodeContext { recurse_count: limit }
    }

    /// Call this function before recursively decoding.
    ///
    /// There is no `exit` function since this function creates a new
    /// `DecodeContext` to be used at the next level of recursion. Continue
    /// to use the old context at the previous level of recursion.
    #[inline]
    #[must_use]
    pub const fn enter_recursion(&self) -> DecodeContext {
        DecodeContext {
            recurse_count: self.recurse_count - 1,
        }
    }

    /// Checks whether the recursion limit has been reached in the stack of
    /// decodes described by this context.
    ///
    /// Returns `Ok(())` if it is ok to continue recursing.
    /// Returns `Err(DecodeError)` if the recursion limit has been reached.
    #[inline]
    pub fn limit_reached(&self) -> Result<(), DecodeError> {
        if self.recurse_count == 0 {
            Err(DecodeError::malformed("recursion limit reached"))
        } else {
            Ok(())
        }
    }

    #[inline]
    pub(crate) const fn depth_remaining(&self) -> u32 {
        self.recurse_count
    }
}

/// Encodes a Protobuf field key, which consists of a wire type designator
/// and the field number.
#[inline]
pub fn encode_key(field_number: u32, wire_type: WireType, buf: &mut impl BufMut) {
    debug_assert!((MIN_TAG..=MAX_TAG).contains(&field_number));
    let key = (field_number << 3) | wire_type as u32;
    encode_varint(u64::from(key), buf);
}

/// Returns the width of an encoded Protobuf field key with the given field
/// number. The returned width will be between 1 and 5 bytes (inclusive).
#[inline]
pub const fn key_len(field_number: u32) -> usize {
    encoded_len_varint((field_number << 3) as u64)
}
