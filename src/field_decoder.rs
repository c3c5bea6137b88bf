//! Per-field adapters between the wire and a message's typed setters.
//!
//! The decoder driver constructs one `FieldDecoder` per field, selected by
//! the tag's wire type, and hands it to the message's
//! [`decode_field`](crate::Message::decode_field). The message calls the one
//! setter its schema prescribes; setters whose target type is incompatible
//! with the field's wire type decline without consuming anything, and the
//! driver then preserves the field's raw bytes as an unknown field.

use alloc::collections::BTreeMap;
use alloc::string::String;
use alloc::string::ToString;
use alloc::vec::Vec;
use core::any::TypeId;

use crate::decoder::Decoder;
use crate::encoding::WireType;
use crate::encoding::encode_key;
use crate::encoding::encode_varint;
use crate::error::DecodeError;
use crate::extensions::ExtensionValue;
use crate::map::MapKey;
use crate::map::MapValue;
use crate::message::Message;
use crate::scalar::Scalar;
use crate::scalar::ScalarRead;

/// The wire shape of the current field.
#[derive(Clone, Copy)]
enum FieldKind<'a> {
    /// Varint, fixed32, or fixed64; the value has not been read yet.
    Numeric(WireType),
    /// The bounded payload of a length-delimited field; the scanner has
    /// already advanced past it.
    LengthDelimited(&'a [u8]),
    /// A start-group frame; the group body follows on the shared scanner.
    Group,
}

/// A single field, offered to the message handler as a set of typed setters.
///
/// Exactly one successful setter call consumes the field; afterwards every
/// setter is a no-op. If no setter consumed the field by the time the
/// handler returns, the driver preserves the field's on-wire bytes.
pub struct FieldDecoder<'de, 'a> {
    decoder: &'de mut Decoder<'a>,
    field_number: u32,
    kind: FieldKind<'a>,
    consumed: bool,
    /// Replacement payload for unknown promotion, set when a packed parse
    /// refused individual values.
    unknown_override: Option<Vec<u8>>,
}

impl<'de, 'a> FieldDecoder<'de, 'a> {
    pub(crate) fn new(decoder: &'de mut Decoder<'a>, field_number: u32, wire_type: WireType) -> Result<Self, DecodeError> {
        let kind = match wire_type {
            WireType::Varint | WireType::ThirtyTwoBit | WireType::SixtyFourBit => FieldKind::Numeric(wire_type),
            WireType::LengthDelimited => FieldKind::LengthDelimited(decoder.scanner_mut().read_length_delimited()?),
            WireType::StartGroup => FieldKind::Group,
            WireType::EndGroup => return Err(DecodeError::malformed("unexpected end group tag")),
        };
        Ok(FieldDecoder {
            decoder,
            field_number,
            kind,
            consumed: false,
            unknown_override: None,
        })
    }

    /// The field number of the current field.
    pub fn field_number(&self) -> u32 {
        self.field_number
    }

    /// Whether a setter has absorbed the field.
    pub fn consumed(&self) -> bool {
        self.consumed
    }

    /// Decodes a singular scalar field.
    pub fn decode_singular<S: Scalar>(&mut self, slot: &mut S::Value) -> Result<(), DecodeError> {
        if let Some(value) = self.read_numeric::<S>()? {
            *slot = value;
        }
        Ok(())
    }

    /// Decodes an optional scalar field.
    pub fn decode_optional<S: Scalar>(&mut self, slot: &mut Option<S::Value>) -> Result<(), DecodeError> {
        if let Some(value) = self.read_numeric::<S>()? {
            *slot = Some(value);
        }
        Ok(())
    }

    /// Decodes a repeated scalar field, either as one unpacked occurrence or
    /// as a packed payload.
    ///
    /// Packed values the scalar type refuses are re-encoded into an
    /// override payload and the field stays unconsumed, so the refused
    /// values survive as a single unknown field while the accepted values
    /// are still appended.
    pub fn decode_repeated<S: Scalar>(&mut self, values: &mut Vec<S::Value>) -> Result<(), DecodeError> {
        if self.consumed {
            return Ok(());
        }
        match self.kind {
            FieldKind::Numeric(wire_type) if wire_type == S::WIRE_TYPE => {
                match S::read(self.decoder.scanner_mut())? {
                    ScalarRead::Accepted(value) => {
                        values.push(value);
                        self.consumed = true;
                    }
                    ScalarRead::Rejected(_) => {}
                }
                Ok(())
            }
            FieldKind::LengthDelimited(payload) => {
                let mut scanner = crate::scanner::Scanner::new(payload);
                let mut rejected = Vec::new();
                while scanner.remaining() > 0 {
                    match S::read(&mut scanner)? {
                        ScalarRead::Accepted(value) => values.push(value),
                        ScalarRead::Rejected(raw) => encode_varint(raw, &mut rejected),
                    }
                }
                if rejected.is_empty() {
                    self.consumed = true;
                } else {
                    self.unknown_override = Some(rejected);
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Decodes a singular string field, validating UTF-8.
    pub fn decode_string(&mut self, slot: &mut String) -> Result<(), DecodeError> {
        if let Some(value) = self.read_string()? {
            *slot = value;
        }
        Ok(())
    }

    /// Decodes an optional string field, validating UTF-8.
    pub fn decode_optional_string(&mut self, slot: &mut Option<String>) -> Result<(), DecodeError> {
        if let Some(value) = self.read_string()? {
            *slot = Some(value);
        }
        Ok(())
    }

    /// Decodes one occurrence of a repeated string field.
    pub fn decode_repeated_string(&mut self, values: &mut Vec<String>) -> Result<(), DecodeError> {
        if let Some(value) = self.read_string()? {
            values.push(value);
        }
        Ok(())
    }

    /// Decodes a singular bytes field.
    pub fn decode_bytes(&mut self, slot: &mut Vec<u8>) -> Result<(), DecodeError> {
        if let Some(payload) = self.read_bytes() {
            slot.clear();
            slot.extend_from_slice(payload);
        }
        Ok(())
    }

    /// Decodes an optional bytes field.
    pub fn decode_optional_bytes(&mut self, slot: &mut Option<Vec<u8>>) -> Result<(), DecodeError> {
        if let Some(payload) = self.read_bytes() {
            *slot = Some(payload.to_vec());
        }
        Ok(())
    }

    /// Decodes one occurrence of a repeated bytes field.
    pub fn decode_repeated_bytes(&mut self, values: &mut Vec<Vec<u8>>) -> Result<(), DecodeError> {
        if let Some(payload) = self.read_bytes() {
            values.push(payload.to_vec());
        }
        Ok(())
    }

    /// Decodes an embedded message field, constructing the default value if
    /// the slot is empty.
    pub fn decode_singular_message<M: Message>(&mut self, slot: &mut Option<M>) -> Result<(), DecodeError> {
        if self.consumed {
            return Ok(());
        }
        let payload = match self.kind {
            FieldKind::LengthDelimited(payload) => payload,
            _ => return Ok(()),
        };
        self.decoder.ctx.limit_reached()?;
        let target = slot.get_or_insert_with(M::default);
        let mut sub = Decoder::nested_over(payload, self.decoder.extensions, self.decoder.ctx.enter_recursion());
        sub.decode_full_object(target)?;
        self.consumed = true;
        Ok(())
    }

    /// Decodes one occurrence of a repeated message field.
    pub fn decode_repeated_message<M: Message>(&mut self, values: &mut Vec<M>) -> Result<(), DecodeError> {
        if self.consumed {
            return Ok(());
        }
        let payload = match self.kind {
            FieldKind::LengthDelimited(payload) => payload,
            _ => return Ok(()),
        };
        self.decoder.ctx.limit_reached()?;
        let mut message = M::default();
        let mut sub = Decoder::nested_over(payload, self.decoder.extensions, self.decoder.ctx.enter_recursion());
        sub.decode_full_object(&mut message)?;
        values.push(message);
        self.consumed = true;
        Ok(())
    }

    /// Decodes a group field, constructing the default value if the slot is
    /// empty. The group body is read from the shared scanner up to the
    /// matching end tag.
    pub fn decode_singular_group<M: Message>(&mut self, slot: &mut Option<M>) -> Result<(), DecodeError> {
        if self.consumed || !matches!(self.kind, FieldKind::Group) {
            return Ok(());
        }
        let target = slot.get_or_insert_with(M::default);
        self.decode_group_body(target)
    }

    /// Decodes one occurrence of a repeated group field.
    pub fn decode_repeated_group<M: Message>(&mut self, values: &mut Vec<M>) -> Result<(), DecodeError> {
        if self.consumed || !matches!(self.kind, FieldKind::Group) {
            return Ok(());
        }
        let mut message = M::default();
        self.decode_group_body(&mut message)?;
        values.push(message);
        Ok(())
    }

    /// Decodes a map entry field and inserts it into the map, last writer
    /// wins.
    ///
    /// The entry payload is parsed as a two-field message: field 1 is the
    /// key, field 2 the value, and any other field number is skipped. A
    /// mistyped key occurrence is declined and skipped like any other
    /// setter mismatch; an entry missing either part is malformed; an entry
    /// whose value the reader refuses (wire-type mismatch or an
    /// unrecognized closed-enum value) stays unconsumed so the raw entry
    /// bytes are preserved as an unknown field.
    pub fn decode_map<K, V>(&mut self, map: &mut BTreeMap<K::Value, V::Value>) -> Result<(), DecodeError>
    where
        K: MapKey,
        V: MapValue,
    {
        if self.consumed {
            return Ok(());
        }
        let payload = match self.kind {
            FieldKind::LengthDelimited(payload) => payload,
            _ => return Ok(()),
        };
        self.decoder.ctx.limit_reached()?;
        let mut entry = Decoder::nested_over(payload, self.decoder.extensions, self.decoder.ctx.enter_recursion());
        let mut key: Option<K::Value> = None;
        let mut value: Option<V::Value> = None;
        let mut refused = false;
        while let Some(tag) = entry.scanner_mut().get_tag()? {
            match tag.field_number {
                1 => match K::read_key(&mut entry, tag.wire_type)? {
                    Some(read) => key = Some(read),
                    None => entry.scanner_mut().skip()?,
                },
                2 => match V::read_value(&mut entry, tag.wire_type)? {
                    Some(read) => {
                        value = Some(read);
                        refused = false;
                    }
                    None => {
                        entry.scanner_mut().skip()?;
                        value = None;
                        refused = true;
                    }
                },
                _ => entry.scanner_mut().skip()?,
            }
        }
        if refused {
            return Ok(());
        }
        match (key, value) {
            (Some(key), Some(value)) => {
                map.insert(key, value);
                self.consumed = true;
                Ok(())
            }
            _ => Err(DecodeError::malformed("map entry missing key or value")),
        }
    }

    fn read_numeric<S: Scalar>(&mut self) -> Result<Option<S::Value>, DecodeError> {
        if self.consumed {
            return Ok(None);
        }
        match self.kind {
            FieldKind::Numeric(wire_type) if wire_type == S::WIRE_TYPE => match S::read(self.decoder.scanner_mut())? {
                ScalarRead::Accepted(value) => {
                    self.consumed = true;
                    Ok(Some(value))
                }
                ScalarRead::Rejected(_) => Ok(None),
            },
            _ => Ok(None),
        }
    }

    fn read_string(&mut self) -> Result<Option<String>, DecodeError> {
        if self.consumed {
            return Ok(None);
        }
        let payload = match self.kind {
            FieldKind::LengthDelimited(payload) => payload,
            _ => return Ok(None),
        };
        match core::str::from_utf8(payload) {
            Ok(value) => {
                self.consumed = true;
                Ok(Some(value.to_string()))
            }
            Err(_) => Err(DecodeError::malformed("invalid string value: data is not UTF-8 encoded")),
        }
    }

    fn read_bytes(&mut self) -> Option<&'a [u8]> {
        if self.consumed {
            return None;
        }
        match self.kind {
            FieldKind::LengthDelimited(payload) => {
                self.consumed = true;
                Some(payload)
            }
            _ => None,
        }
    }

    fn decode_group_body<M: Message>(&mut self, target: &mut M) -> Result<(), DecodeError> {
        self.decoder.ctx.limit_reached()?;
        let parent_ctx = self.decoder.ctx;
        self.decoder.ctx = parent_ctx.enter_recursion();
        let result = self.decoder.decode_full_group(self.field_number, target);
        self.decoder.ctx = parent_ctx;
        result?;
        self.consumed = true;
        Ok(())
    }

    /// Re-offers an unconsumed field to the extensions table registered for
    /// the message type.
    pub(crate) fn dispatch_extension<M: Message>(&mut self, message: &mut M) -> Result<(), DecodeError> {
        if self.consumed {
            return Ok(());
        }
        let registry = match self.decoder.extensions {
            Some(registry) => registry,
            None => return Ok(()),
        };
        let factory = match registry.find(TypeId::of::<M>(), self.field_number) {
            Some(factory) => factory,
            None => return Ok(()),
        };
        if message.extension_set_mut().is_none() {
            return Ok(());
        }
        let mut value = factory();
        value.decode_field(self)?;
        if self.consumed {
            if let Some(set) = message.extension_set_mut() {
                set.insert(self.field_number, value);
            }
        }
        Ok(())
    }

    /// Preserves the field in the decoder's unknown buffer if no setter
    /// consumed it. For packed payloads that refused values, the override
    /// payload replaces the raw bytes under a fresh length prefix.
    pub(crate) fn finish(mut self) -> Result<(), DecodeError> {
        if self.consumed {
            return Ok(());
        }
        match self.unknown_override.take() {
            Some(payload) => {
                encode_key(self.field_number, WireType::LengthDelimited, &mut self.decoder.unknown);
                encode_varint(payload.len() as u64, &mut self.decoder.unknown);
                self.decoder.unknown.extend_from_slice(&payload);
            }
            None => {
                let raw = self.decoder.scanner_mut().get_raw_field()?;
                self.decoder.unknown.extend_from_slice(raw);
            }
        }
        Ok(())
    }
}
