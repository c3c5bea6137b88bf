//! A binary decoder for the Protocol Buffers wire format (proto2 and
//! proto3).
//!
//! The decoder consumes a contiguous, immutable byte range and dispatches
//! typed field values into a caller-supplied [`Message`] handler. It
//! supports all standard wire types (varint, fixed-32, fixed-64,
//! length-delimited, legacy start-group/end-group), nested messages, packed
//! and unpacked repeated fields, map entries, extension fields, and
//! preservation of unknown fields as a re-encodable byte sequence.
//!
//! ```
//! use protodec::error::DecodeError;
//! use protodec::scalar::Int32;
//! use protodec::FieldDecoder;
//! use protodec::Message;
//! use protodec::UnknownFields;
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Test {
//!     a: i32,
//!     unknown_fields: UnknownFields,
//! }
//!
//! impl Message for Test {
//!     fn decode_field(&mut self, field: &mut FieldDecoder<'_, '_>, field_number: u32) -> Result<(), DecodeError> {
//!         match field_number {
//!             1 => field.decode_singular::<Int32>(&mut self.a),
//!             _ => Ok(()),
//!         }
//!     }
//!
//!     fn unknown_fields_mut(&mut self) -> &mut UnknownFields {
//!         &mut self.unknown_fields
//!     }
//! }
//!
//! let decoded = Test::decode(&[0x08, 0x96, 0x01]).unwrap();
//! assert_eq!(decoded.a, 150);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

extern crate alloc;

// Re-export the bytes crate: the re-encoding helpers in `encoding` write
// through its `BufMut`.
pub use bytes;

/// Default bound on nested message and group depth.
const RECURSION_LIMIT: u32 = 100;

mod decoder;
mod field_decoder;
mod message;
mod scanner;

pub mod encoding;
pub mod error;
pub mod extensions;
pub mod map;
pub mod scalar;

pub use crate::decoder::Decoder;
pub use crate::encoding::DecodeContext;
pub use crate::encoding::WireType;
pub use crate::error::DecodeError;
pub use crate::error::ErrorKind;
pub use crate::error::UnknownEnumValue;
pub use crate::extensions::ExtensionRegistry;
pub use crate::extensions::ExtensionSet;
pub use crate::extensions::ExtensionValue;
pub use crate::field_decoder::FieldDecoder;
pub use crate::message::Message;
pub use crate::message::UnknownFields;
pub use crate::scanner::FieldTag;
pub use crate::scanner::Scanner;
