//! The top-level decode driver.

use alloc::string::String;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::mem;

use crate::encoding::DecodeContext;
use crate::encoding::WireType;
use crate::error::DecodeError;
use crate::extensions::ExtensionRegistry;
use crate::field_decoder::FieldDecoder;
use crate::message::Message;
use crate::scanner::Scanner;

/// Decodes one Protobuf message from a contiguous, immutable byte range.
///
/// The decoder iterates field tags, offers each field to the message
/// handler through a [`FieldDecoder`], consults the extensions table for
/// declined fields, and accumulates whatever remains unconsumed into an
/// unknown-field buffer that is attached to the message when the decode
/// completes. The input must stay valid and unchanged for the decoder's
/// whole lifetime; string and bytes payloads are delivered as zero-copy
/// sub-slices of it.
pub struct Decoder<'a> {
    pub(crate) scanner: Scanner<'a>,
    pub(crate) unknown: Vec<u8>,
    pub(crate) extensions: Option<&'a ExtensionRegistry>,
    pub(crate) ctx: DecodeContext,
}

impl<'a> Decoder<'a> {
    /// Creates a decoder over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Decoder {
            scanner: Scanner::new(data),
            unknown: Vec::new(),
            extensions: None,
            ctx: DecodeContext::default(),
        }
    }

    /// Creates a decoder over `data` that consults `extensions` for fields
    /// the message handler declines. The registry is read-only and can be
    /// shared across decoders.
    pub fn with_extensions(data: &'a [u8], extensions: &'a ExtensionRegistry) -> Self {
        Decoder {
            extensions: Some(extensions),
            ..Decoder::new(data)
        }
    }

    /// Replaces the default nesting limit of 100. Exceeding the limit while
    /// decoding or skipping nested messages and groups is a malformed-input
    /// error.
    #[must_use]
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.ctx = DecodeContext::with_recursion_limit(limit);
        self.scanner.set_recursion_limit(limit);
        self
    }

    /// Creates a sub-decoder over the bounded payload of a nested message
    /// or map entry.
    pub(crate) fn nested_over(data: &'a [u8], extensions: Option<&'a ExtensionRegistry>, ctx: DecodeContext) -> Self {
        Decoder {
            scanner: Scanner::with_recursion_limit(data, ctx.depth_remaining()),
            unknown: Vec::new(),
            extensions,
            ctx,
        }
    }

    pub(crate) fn scanner_mut(&mut self) -> &mut Scanner<'a> {
        &mut self.scanner
    }

    /// Decodes fields until the input is exhausted, dispatching each one to
    /// `message`.
    ///
    /// On success the accumulated unknown bytes are moved into the
    /// message's unknown-field container. On failure the message is left in
    /// an unspecified partially-merged state.
    pub fn decode_full_object<M: Message>(&mut self, message: &mut M) -> Result<(), DecodeError> {
        while let Some(tag) = self.scanner.get_tag()? {
            let mut field = FieldDecoder::new(self, tag.field_number, tag.wire_type)?;
            message.decode_field(&mut field, tag.field_number)?;
            field.dispatch_extension(message)?;
            field.finish()?;
        }
        if self.scanner.remaining() != 0 {
            return Err(DecodeError::trailing_garbage());
        }
        let unknown = mem::take(&mut self.unknown);
        if !unknown.is_empty() {
            message.unknown_fields_mut().append(&unknown);
        }
        Ok(())
    }

    /// Decodes the body of a group whose start tag was just read, up to the
    /// matching end tag.
    ///
    /// Inner fields are dispatched to `message` exactly as in
    /// [`decode_full_object`](Decoder::decode_full_object); unknown bytes
    /// collected inside the group attach to the group message itself.
    pub fn decode_full_group<M: Message>(&mut self, group_number: u32, message: &mut M) -> Result<(), DecodeError> {
        debug_assert_eq!(self.scanner.last_wire_type(), Some(WireType::StartGroup));
        let outer_unknown = mem::take(&mut self.unknown);
        loop {
            let tag = match self.scanner.get_tag()? {
                Some(tag) => tag,
                None => return Err(DecodeError::truncated("unexpected end of input in group")),
            };
            if tag.field_number == group_number {
                if tag.wire_type == WireType::EndGroup {
                    break;
                }
                return Err(DecodeError::malformed("unexpected group frame tag"));
            }
            let mut field = FieldDecoder::new(self, tag.field_number, tag.wire_type)?;
            message.decode_field(&mut field, tag.field_number)?;
            field.dispatch_extension(message)?;
            field.finish()?;
        }
        let group_unknown = mem::replace(&mut self.unknown, outer_unknown);
        if !group_unknown.is_empty() {
            message.unknown_fields_mut().append(&group_unknown);
        }
        Ok(())
    }

    /// Reads a length prefix and decodes the delimited payload as a nested
    /// message.
    pub(crate) fn decode_nested<M: Message>(&mut self) -> Result<M, DecodeError> {
        self.ctx.limit_reached()?;
        let payload = self.scanner.read_length_delimited()?;
        let mut message = M::default();
        let mut sub = Decoder::nested_over(payload, self.extensions, self.ctx.enter_recursion());
        sub.decode_full_object(&mut message)?;
        Ok(message)
    }

    /// Reads one `int32` value at the cursor.
    pub fn decode_int32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.scanner.read_varint()? as i32)
    }

    /// Reads one `int64` value at the cursor.
    pub fn decode_int64(&mut self) -> Result<i64, DecodeError> {
        Ok(self.scanner.read_varint()? as i64)
    }

    /// Reads one `uint32` value at the cursor.
    pub fn decode_uint32(&mut self) -> Result<u32, DecodeError> {
        Ok(self.scanner.read_varint()? as u32)
    }

    /// Reads one `uint64` value at the cursor.
    pub fn decode_uint64(&mut self) -> Result<u64, DecodeError> {
        self.scanner.read_varint()
    }

    /// Reads one zigzag-encoded `sint32` value at the cursor.
    pub fn decode_sint32(&mut self) -> Result<i32, DecodeError> {
        let value = self.scanner.read_varint()? as u32;
        Ok(((value >> 1) as i32) ^ (-((value & 1) as i32)))
    }

    /// Reads one zigzag-encoded `sint64` value at the cursor.
    pub fn decode_sint64(&mut self) -> Result<i64, DecodeError> {
        let value = self.scanner.read_varint()?;
        Ok(((value >> 1) as i64) ^ (-((value & 1) as i64)))
    }

    /// Reads one `bool` value at the cursor.
    pub fn decode_bool(&mut self) -> Result<bool, DecodeError> {
        Ok(self.scanner.read_varint()? != 0)
    }

    /// Reads one `fixed32` value at the cursor.
    pub fn decode_fixed32(&mut self) -> Result<u32, DecodeError> {
        self.scanner.read_fixed32()
    }

    /// Reads one `fixed64` value at the cursor.
    pub fn decode_fixed64(&mut self) -> Result<u64, DecodeError> {
        self.scanner.read_fixed64()
    }

    /// Reads one `sfixed32` value at the cursor.
    pub fn decode_sfixed32(&mut self) -> Result<i32, DecodeError> {
        Ok(self.scanner.read_fixed32()? as i32)
    }

    /// Reads one `sfixed64` value at the cursor.
    pub fn decode_sfixed64(&mut self) -> Result<i64, DecodeError> {
        Ok(self.scanner.read_fixed64()? as i64)
    }

    /// Reads one `float` value at the cursor.
    pub fn decode_float(&mut self) -> Result<f32, DecodeError> {
        Ok(f32::from_bits(self.scanner.read_fixed32()?))
    }

    /// Reads one `double` value at the cursor.
    pub fn decode_double(&mut self) -> Result<f64, DecodeError> {
        Ok(f64::from_bits(self.scanner.read_fixed64()?))
    }

    /// Reads one length-delimited `string` value at the cursor, validating
    /// UTF-8.
    pub fn decode_string(&mut self) -> Result<String, DecodeError> {
        let payload = self.scanner.read_length_delimited()?;
        match core::str::from_utf8(payload) {
            Ok(value) => Ok(value.to_string()),
            Err(_) => Err(DecodeError::malformed("invalid string value: data is not UTF-8 encoded")),
        }
    }

    /// Reads one length-delimited `bytes` value at the cursor.
    pub fn decode_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        Ok(self.scanner.read_length_delimited()?.to_vec())
    }
}
