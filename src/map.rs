//! Map entry key and value readers.
//!
//! A map field is encoded as a repeated entry message whose field 1 is the
//! key and field 2 is the value. The readers here are what
//! [`FieldDecoder::decode_map`](crate::FieldDecoder::decode_map) dispatches
//! those two entry fields to; keys are restricted to the protobuf-legal set
//! (integral, bool, string) while values additionally admit bytes, messages,
//! and enumerations.
//!
//! Like every other setter in the crate, the readers decline (`Ok(None)`)
//! an occurrence whose wire type does not match the declared type instead
//! of failing the decode.

use alloc::string::String;
use alloc::vec::Vec;
use core::marker::PhantomData;

use crate::decoder::Decoder;
use crate::encoding::WireType;
use crate::error::DecodeError;
use crate::error::UnknownEnumValue;
use crate::message::Message;
use crate::scalar::Enumeration;
use crate::scalar::Scalar;
use crate::scalar::ScalarRead;

/// A scalar type usable as a map key.
pub trait MapKey: 'static {
    type Value: Default + Ord + 'static;

    /// Reads the entry's key field. `Ok(None)` declines the occurrence
    /// (wire-type mismatch); the caller skips it and keeps any previously
    /// read key.
    fn read_key(decoder: &mut Decoder<'_>, wire_type: WireType) -> Result<Option<Self::Value>, DecodeError>;
}

/// A type usable as a map value.
pub trait MapValue: 'static {
    type Value: Default + 'static;

    /// Reads the entry's value field. `Ok(None)` means the value was
    /// refused (wire-type mismatch or an unrecognized closed-enum value);
    /// the caller then leaves the whole entry to unknown-field
    /// preservation.
    fn read_value(decoder: &mut Decoder<'_>, wire_type: WireType) -> Result<Option<Self::Value>, DecodeError>;
}

/// The `string` map key / map value type.
pub struct StringValue;

/// The `bytes` map value type.
pub struct BytesValue;

/// A message map value type.
pub struct MessageValue<M> {
    _marker: PhantomData<M>,
}

macro_rules! scalar_map_key {
    ($($name:ident),* $(,)?) => {
        $(
            impl MapKey for crate::scalar::$name {
                type Value = <crate::scalar::$name as Scalar>::Value;

                fn read_key(decoder: &mut Decoder<'_>, wire_type: WireType) -> Result<Option<Self::Value>, DecodeError> {
                    if wire_type != <crate::scalar::$name as Scalar>::WIRE_TYPE {
                        return Ok(None);
                    }
                    match <crate::scalar::$name as Scalar>::read(decoder.scanner_mut())? {
                        ScalarRead::Accepted(value) => Ok(Some(value)),
                        ScalarRead::Rejected(_) => Ok(None),
                    }
                }
            }
        )*
    };
}

scalar_map_key!(Bool, Int32, Int64, Uint32, Uint64, Sint32, Sint64, Fixed32, Fixed64, Sfixed32, Sfixed64);

impl MapKey for StringValue {
    type Value = String;

    fn read_key(decoder: &mut Decoder<'_>, wire_type: WireType) -> Result<Option<String>, DecodeError> {
        if wire_type != WireType::LengthDelimited {
            return Ok(None);
        }
        decoder.decode_string().map(Some)
    }
}

macro_rules! scalar_map_value {
    ($($name:ident),* $(,)?) => {
        $(
            impl MapValue for crate::scalar::$name {
                type Value = <crate::scalar::$name as Scalar>::Value;

                fn read_value(decoder: &mut Decoder<'_>, wire_type: WireType) -> Result<Option<Self::Value>, DecodeError> {
                    if wire_type != <crate::scalar::$name as Scalar>::WIRE_TYPE {
                        return Ok(None);
                    }
                    match <crate::scalar::$name as Scalar>::read(decoder.scanner_mut())? {
                        ScalarRead::Accepted(value) => Ok(Some(value)),
                        ScalarRead::Rejected(_) => Ok(None),
                    }
                }
            }
        )*
    };
}

scalar_map_value!(
    Bool, Int32, Int64, Uint32, Uint64, Sint32, Sint64, Fixed32, Fixed64, Sfixed32, Sfixed64, Float, Double,
);

impl<E> MapValue for Enumeration<E>
where
    E: TryFrom<i32, Error = UnknownEnumValue> + Default + 'static,
{
    type Value = E;

    fn read_value(decoder: &mut Decoder<'_>, wire_type: WireType) -> Result<Option<E>, DecodeError> {
        if wire_type != WireType::Varint {
            return Ok(None);
        }
        match <Enumeration<E> as Scalar>::read(decoder.scanner_mut())? {
            ScalarRead::Accepted(value) => Ok(Some(value)),
            ScalarRead::Rejected(_) => Ok(None),
        }
    }
}

impl MapValue for StringValue {
    type Value = String;

    fn read_value(decoder: &mut Decoder<'_>, wire_type: WireType) -> Result<Option<String>, DecodeError> {
        if wire_type != WireType::LengthDelimited {
            return Ok(None);
        }
        decoder.decode_string().map(Some)
    }
}

impl MapValue for BytesValue {
    type Value = Vec<u8>;

    fn read_value(decoder: &mut Decoder<'_>, wire_type: WireType) -> Result<Option<Vec<u8>>, DecodeError> {
        if wire_type != WireType::LengthDelimited {
            return Ok(None);
        }
        decoder.decode_bytes().map(Some)
    }
}

impl<M: Message> MapValue for MessageValue<M> {
    type Value = M;

    fn read_value(decoder: &mut Decoder<'_>, wire_type: WireType) -> Result<Option<M>, DecodeError> {
        if wire_type != WireType::LengthDelimited {
            return Ok(None);
        }
        decoder.decode_nested::<M>().map(Some)
    }
}
