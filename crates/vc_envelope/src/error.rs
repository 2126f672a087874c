//! Errors of the envelope protocol.
//!
//! Every failure is a deterministic function of the input bytes or of the
//! registry state, so nothing here is retryable.
//!
//! Registering the same type ID twice through
//! [`DeserializerRegistry::register`](crate::DeserializerRegistry::register)
//! is not an error value: it is a programming mistake and panics.

use alloc::boxed::Box;
use alloc::string::ToString;
use core::fmt::Display;

use thiserror::Error;

/// A type-erased error raised by a type's own encode or decode function.
pub type BoxedError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// A [`Result`](core::result::Result) defaulting to [`SerialError`].
pub type Result<T, E = SerialError> = core::result::Result<T, E>;

// -----------------------------------------------------------------------------
// SerialError

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SerialError {
    /// A length prefix claims more bytes than are available.
    #[error("buffer underflow: need {needed} bytes but only {available} available")]
    BufferUnderflow { needed: u64, available: usize },

    /// Trailing bytes remain after every well-formed element was consumed.
    #[error("residual data: {0} trailing bytes")]
    ResidualData(usize),

    /// The decoded type ID has no entry in the registry.
    #[error("unregistered type ID: {0}")]
    UnregisteredType(Box<str>),

    /// The type ID does not fit into the `u32` length prefix.
    #[error("type ID of {0} bytes does not fit a u32 length prefix")]
    TypeTagTooLong(usize),

    /// A dynamic input is neither serializable nor a recognized primitive.
    #[error("unsupported type {0}")]
    UnsupportedType(&'static str),

    /// The number of decoded values differs from the number of output slots.
    #[error("have {slots} destinations but {decoded} decoded objects")]
    CountMismatch { slots: usize, decoded: usize },

    /// A decoded value can neither be assigned nor converted to its slot.
    #[error("element {index}: expecting {expected} but decoded {actual}")]
    TypeMismatch {
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// A single decoded value is not of the requested concrete type.
    #[error("expecting {expected} but decoded {actual}")]
    UnexpectedType {
        expected: &'static str,
        actual: &'static str,
    },

    /// The element at `index` of a sequence failed.
    #[error("element {index}: {source}")]
    Element {
        index: usize,
        source: Box<SerialError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// A failure reported by a type's own encode or decode function.
    #[error("{0}")]
    Custom(BoxedError),
}

impl SerialError {
    /// Wraps an arbitrary error raised inside a type's codec.
    #[inline]
    pub fn custom<E: Into<BoxedError>>(err: E) -> Self {
        Self::Custom(err.into())
    }

    /// Builds a [`SerialError::Custom`] from a message.
    #[inline]
    pub fn msg<M: Display>(msg: M) -> Self {
        Self::Custom(msg.to_string().into())
    }

    /// Attaches the index of the failing sequence element.
    #[inline]
    pub(crate) fn at(self, index: usize) -> Self {
        Self::Element {
            index,
            source: Box::new(self),
        }
    }

    /// Returns the error below any [`SerialError::Element`] layers.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_envelope::{DeserializerRegistry, SerialError};
    ///
    /// let registry = DeserializerRegistry::new();
    /// // One element holding an envelope whose type ID was never registered.
    /// let data = [12, 0, 0, 0, 0, 0, 0, 0, 8, 0, 0, 0, b'u', b'n', b'k', b'n', b'o', b'w', b'n', b'!'];
    ///
    /// let err = registry.decode_sequence(&data).unwrap_err();
    /// assert!(matches!(err, SerialError::Element { index: 0, .. }));
    /// assert!(matches!(err.innermost(), SerialError::UnregisteredType(tag) if &**tag == "unknown!"));
    /// ```
    pub fn innermost(&self) -> &SerialError {
        let mut err = self;
        while let Self::Element { source, .. } = err {
            err = source;
        }
        err
    }

    /// Whether the innermost error is a framing error,
    /// i.e. [`BufferUnderflow`](Self::BufferUnderflow) or [`ResidualData`](Self::ResidualData).
    pub fn is_structural(&self) -> bool {
        matches!(
            self.innermost(),
            Self::BufferUnderflow { .. } | Self::ResidualData(_)
        )
    }
}

// -----------------------------------------------------------------------------
// Tests
