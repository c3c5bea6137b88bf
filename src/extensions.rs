//! Decode-time extension dispatch.
//!
//! Extensions are fields declared out-of-line against a message. The
//! decoder cannot see them in the message's own `decode_field`, so a
//! registry maps `(message type, field number)` to a factory producing a
//! typed value; when a handler declines a field that the registry knows,
//! the field is re-offered to the factory-built value and, on success,
//! stored in the message's [`ExtensionSet`] instead of the unknown buffer.

use alloc::boxed::Box;
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::any::Any;
use core::any::TypeId;
use core::fmt;
use core::marker::PhantomData;

use crate::error::DecodeError;
use crate::field_decoder::FieldDecoder;
use crate::message::Message;
use crate::scalar::Scalar;

/// A decoded extension field value.
///
/// Implementations mirror `Message::decode_field` for a single field: the
/// value selects the one typed setter matching the extension's declared
/// type. Leaving the field unconsumed falls back to unknown-field
/// preservation.
pub trait ExtensionValue: Any {
    fn decode_field(&mut self, field: &mut FieldDecoder<'_, '_>) -> Result<(), DecodeError>;

    fn as_any(&self) -> &dyn Any;
}

/// A factory producing the empty value an extension field decodes into.
pub type ExtensionFactory = fn() -> Box<dyn ExtensionValue>;

/// A read-only table of known extensions, keyed by the extended message
/// type and field number.
///
/// One registry can be shared by reference across any number of decoders;
/// sub-decoders for nested messages, groups, and map entries inherit it.
#[derive(Default)]
pub struct ExtensionRegistry {
    entries: BTreeMap<(TypeId, u32), ExtensionFactory>,
}

impl ExtensionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an extension of message type `M` at `field_number`.
    ///
    /// A later registration for the same message type and field number
    /// replaces the earlier one.
    pub fn register<M: Message>(&mut self, field_number: u32, factory: ExtensionFactory) {
        self.entries.insert((TypeId::of::<M>(), field_number), factory);
    }

    pub(crate) fn find(&self, message: TypeId, field_number: u32) -> Option<ExtensionFactory> {
        self.entries.get(&(message, field_number)).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for ExtensionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionRegistry").field("len", &self.entries.len()).finish()
    }
}

/// Decoded extension values attached to one message, keyed by field number.
#[derive(Default)]
pub struct ExtensionSet {
    values: BTreeMap<u32, Box<dyn ExtensionValue>>,
}

impl ExtensionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the value decoded for `field_number`, downcast to its
    /// concrete extension type.
    pub fn get<T: ExtensionValue>(&self, field_number: u32) -> Option<&T> {
        self.values.get(&field_number).and_then(|value| value.as_any().downcast_ref())
    }

    pub(crate) fn insert(&mut self, field_number: u32, value: Box<dyn ExtensionValue>) {
        self.values.insert(field_number, value);
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for ExtensionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtensionSet").field("len", &self.values.len()).finish()
    }
}

/// An extension holding one optional scalar value.
pub struct ScalarExtension<S: Scalar> {
    pub value: Option<S::Value>,
    _marker: PhantomData<S>,
}

impl<S: Scalar> ScalarExtension<S> {
    pub fn boxed() -> Box<dyn ExtensionValue> {
        Box::new(ScalarExtension::<S> {
            value: None,
            _marker: PhantomData,
        })
    }
}

impl<S: Scalar> Default for ScalarExtension<S> {
    fn default() -> Self {
        ScalarExtension {
            value: None,
            _marker: PhantomData,
        }
    }
}

impl<S: Scalar> ExtensionValue for ScalarExtension<S> {
    fn decode_field(&mut self, field: &mut FieldDecoder<'_, '_>) -> Result<(), DecodeError> {
        field.decode_optional::<S>(&mut self.value)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// An extension holding a repeated scalar value, packed or unpacked.
pub struct RepeatedExtension<S: Scalar> {
    pub values: Vec<S::Value>,
    _marker: PhantomData<S>,
}

impl<S: Scalar> RepeatedExtension<S> {
    pub fn boxed() -> Box<dyn ExtensionValue> {
        Box::new(RepeatedExtension::<S> {
            values: Vec::new(),
            _marker: PhantomData,
        })
    }
}

impl<S: Scalar> Default for RepeatedExtension<S> {
    fn default() -> Self {
        RepeatedExtension {
            values: Vec::new(),
            _marker: PhantomData,
        }
    }
}

impl<S: Scalar> ExtensionValue for RepeatedExtension<S> {
    fn decode_field(&mut self, field: &mut FieldDecoder<'_, '_>) -> Result<(), DecodeError> {
        field.decode_repeated::<S>(&mut self.values)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
