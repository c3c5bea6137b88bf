//! Scalar field types and their read-from-scanner operations.
//!
//! Each marker type stands for one Protobuf scalar type and knows the wire
//! type it is encoded with and how to interpret one encoded value. The
//! markers are zero-sized; they are only ever named as type parameters to
//! the [`FieldDecoder`](crate::FieldDecoder) setters and the map readers.

use core::marker::PhantomData;

use crate::encoding::WireType;
use crate::error::DecodeError;
use crate::error::UnknownEnumValue;
use crate::scanner::Scanner;

/// The outcome of reading one scalar from the wire.
///
/// `Rejected` carries the raw varint of a value the type refused (an
/// unrecognized closed-enum value) so the caller can re-encode it into the
/// unknown-field buffer.
pub enum ScalarRead<T> {
    Accepted(T),
    Rejected(u64),
}

/// A Protobuf scalar field type.
pub trait Scalar: 'static {
    /// The Rust representation of a decoded value.
    type Value: Default + 'static;

    /// The wire type values of this scalar are encoded with.
    const WIRE_TYPE: WireType;

    /// Reads one encoded value from the scanner.
    fn read(scanner: &mut Scanner<'_>) -> Result<ScalarRead<Self::Value>, DecodeError>;
}

/// Macro which emits a marker type for a variable-width numeric type.
macro_rules! varint_scalar {
    ($name:ident, $ty:ty, $proto_doc:literal) => {
        varint_scalar!($name, $ty, $proto_doc, from_uint64(value) value as $ty);
    };

    ($name:ident, $ty:ty, $proto_doc:literal, from_uint64($v:ident) $from:expr) => {
        #[doc = concat!("The `", $proto_doc, "` scalar type.")]
        pub struct $name;

        impl Scalar for $name {
            type Value = $ty;
            const WIRE_TYPE: WireType = WireType::Varint;

            #[inline]
            fn read(scanner: &mut Scanner<'_>) -> Result<ScalarRead<$ty>, DecodeError> {
                let $v = scanner.read_varint()?;
                Ok(ScalarRead::Accepted($from))
            }
        }
    };
}

varint_scalar!(Bool, bool, "bool", from_uint64(value) value != 0);
varint_scalar!(Int32, i32, "int32");
varint_scalar!(Int64, i64, "int64");
varint_scalar!(Uint32, u32, "uint32");
varint_scalar!(Uint64, u64, "uint64");
varint_scalar!(Sint32, i32, "sint32", from_uint64(value) {
    let value = value as u32;
    ((value >> 1) as i32) ^ (-((value & 1) as i32))
});
varint_scalar!(Sint64, i64, "sint64", from_uint64(value) {
    ((value >> 1) as i64) ^ (-((value & 1) as i64))
});

/// Macro which emits a marker type for a fixed-width numeric type.
macro_rules! fixed_scalar {
    ($name:ident, $ty:ty, $wire_type:expr, $proto_doc:literal, $read:ident, from_bits($v:ident) $from:expr) => {
        #[doc = concat!("The `", $proto_doc, "` scalar type.")]
        pub struct $name;

        impl Scalar for $name {
            type Value = $ty;
            const WIRE_TYPE: WireType = $wire_type;

            #[inline]
            fn read(scanner: &mut Scanner<'_>) -> Result<ScalarRead<$ty>, DecodeError> {
                let $v = scanner.$read()?;
                Ok(ScalarRead::Accepted($from))
            }
        }
    };
}

fixed_scalar!(Fixed32, u32, WireType::ThirtyTwoBit, "fixed32", read_fixed32, from_bits(value) value);
fixed_scalar!(Sfixed32, i32, WireType::ThirtyTwoBit, "sfixed32", read_fixed32, from_bits(value) value as i32);
fixed_scalar!(Float, f32, WireType::ThirtyTwoBit, "float", read_fixed32, from_bits(value) f32::from_bits(value));
fixed_scalar!(Fixed64, u64, WireType::SixtyFourBit, "fixed64", read_fixed64, from_bits(value) value);
fixed_scalar!(Sfixed64, i64, WireType::SixtyFourBit, "sfixed64", read_fixed64, from_bits(value) value as i64);
fixed_scalar!(Double, f64, WireType::SixtyFourBit, "double", read_fixed64, from_bits(value) f64::from_bits(value));

/// A closed enum field type.
///
/// `E` converts from the wire representation with
/// `TryFrom<i32, Error = UnknownEnumValue>`. A conversion failure is not a
/// decode error: the reader reports the raw value as rejected and the field
/// (or, for packed payloads, the value) is preserved as an unknown field.
/// Open enums, which accept any value, are modeled by declaring the field as
/// [`Int32`] and converting after the decode.
pub struct Enumeration<E> {
    _marker: PhantomData<E>,
}

impl<E> Scalar for Enumeration<E>
where
    E: TryFrom<i32, Error = UnknownEnumValue> + Default + 'static,
{
    type Value = E;
    const WIRE_TYPE: WireType = WireType::Varint;

    #[inline]
    fn read(scanner: &mut Scanner<'_>) -> Result<ScalarRead<E>, DecodeError> {
        let raw = scanner.read_varint()?;
        match E::try_from(raw as i32) {
            Ok(value) => Ok(ScalarRead::Accepted(value)),
            Err(UnknownEnumValue(_)) => Ok(ScalarRead::Rejected(raw)),
        }
    }
}
