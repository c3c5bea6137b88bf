use alloc::borrow::Cow;
use alloc::boxed::Box;
use core::fmt;

/// A Protobuf message decoding error.
///
/// `DecodeError` indicates that the input byte sequence was not a valid
/// Protobuf message, or that it ended before the message did. The
/// [`kind`](DecodeError::kind) accessor distinguishes structural corruption
/// from plain truncation so callers can decide whether retrying with more
/// input could ever succeed.
pub struct DecodeError {
    inner: Box<Inner>,
}

struct Inner {
    kind: ErrorKind,
    /// A 'best effort' root cause description.
    description: Cow<'static, str>,
}

/// The class of a [`DecodeError`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is structurally invalid: overlong varint, unknown wire
    /// type, mismatched group framing, length prefix exceeding the
    /// remaining input, zero field number, or similar.
    Malformed,
    /// The input ended in the middle of a value.
    Truncated,
    /// The message decoded cleanly but bytes remained afterwards.
    TrailingGarbage,
}

impl DecodeError {
    pub(crate) fn new(kind: ErrorKind, description: impl Into<Cow<'static, str>>) -> Self {
        Self {
            inner: Box::new(Inner {
                kind,
                description: description.into(),
            }),
        }
    }

    /// Creates a `Malformed` error with a root cause description.
    pub fn malformed(description: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Malformed, description)
    }

    /// Creates a `Truncated` error with a root cause description.
    pub fn truncated(description: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Truncated, description)
    }

    pub(crate) fn trailing_garbage() -> Self {
        Self::new(ErrorKind::TrailingGarbage, "bytes remaining after message")
    }

    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }
}

impl fmt::Debug for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeError")
            .field("kind", &self.inner.kind)
            .field("description", &self.inner.description)
            .finish()
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failed to decode Protobuf message: ")?;
        f.write_str(&self.inner.description)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for DecodeError {}

/// An integer value on the wire that does not match any known variant of a
/// closed enum type.
///
/// Enum types used with [`Enumeration`](crate::scalar::Enumeration) implement
/// `TryFrom<i32, Error = UnknownEnumValue>`; the decoder treats the error as
/// a refusal and routes the raw value into the unknown-field buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownEnumValue(pub i32);

impl fmt::Display for UnknownEnumValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown enumeration value {}", self.0)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for UnknownEnumValue {}
