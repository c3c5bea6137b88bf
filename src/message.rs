//! The message handler protocol and the unknown-field container.

use alloc::vec::Vec;
use core::fmt;

use crate::decoder::Decoder;
use crate::error::DecodeError;
use crate::extensions::ExtensionRegistry;
use crate::extensions::ExtensionSet;
use crate::field_decoder::FieldDecoder;

/// A Protocol Buffers message, as seen by the decoder.
///
/// A message exposes exactly one decoding operation: given a field number
/// and the [`FieldDecoder`] framing that field, select the typed setter its
/// schema prescribes. Returning without calling a setter declines the field;
/// the driver then consults the extensions table and, failing that,
/// preserves the field's wire bytes in the message's [`UnknownFields`].
pub trait Message: Default + 'static {
    /// Dispatches one field to the appropriate typed setter on `field`.
    fn decode_field(&mut self, field: &mut FieldDecoder<'_, '_>, field_number: u32) -> Result<(), DecodeError>;

    /// The container unknown fields are attached to when a decode
    /// completes.
    fn unknown_fields_mut(&mut self) -> &mut UnknownFields;

    /// The container decoded extension values are stored in. Messages that
    /// declare no extension range keep the default `None`; fields matched
    /// in the extensions table are then preserved as unknown instead.
    fn extension_set_mut(&mut self) -> Option<&mut ExtensionSet> {
        None
    }

    /// Decodes an instance from `data`.
    fn decode(data: &[u8]) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        Decoder::new(data).decode_full_object(&mut message)?;
        Ok(message)
    }

    /// Decodes an instance from `data`, consulting `extensions` for fields
    /// outside the message's own schema.
    fn decode_with_extensions(data: &[u8], extensions: &ExtensionRegistry) -> Result<Self, DecodeError> {
        let mut message = Self::default();
        Decoder::with_extensions(data, extensions).decode_full_object(&mut message)?;
        Ok(message)
    }
}

/// The wire bytes of fields a message's schema did not recognize.
///
/// Bytes are stored exactly as they appeared on the wire (tag included,
/// fields in input order), so appending the container to a re-encoded
/// message round-trips the unrecognized fields.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct UnknownFields {
    data: Vec<u8>,
}

impl UnknownFields {
    pub fn new() -> Self {
        Self::default()
    }

    /// The preserved wire bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Consumes the container, returning the preserved bytes.
    pub fn into_vec(self) -> Vec<u8> {
        self.data
    }

    pub(crate) fn append(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }
}

impl fmt::Debug for UnknownFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnknownFields").field("len", &self.data.len()).finish()
    }
}
