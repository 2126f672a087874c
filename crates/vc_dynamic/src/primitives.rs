//! Built-in wrappers of the recognized primitive shapes.
//!
//! Each wrapper is a newtype over its native Rust type, implements
//! [`Serializable`] and [`Deserializable`], and uses its own type path
//! (`vc_dynamic::Int`, ...) as type ID.
//!
//! | Wrapper | Native | Payload |
//! |---------|--------|---------|
//! | [`Bytes`] | `Vec<u8>` | raw bytes |
//! | [`Text`] | `String` | UTF-8 bytes |
//! | [`Bool`] | `bool` | one byte, `0` or `1` |
//! | [`Int`] | `isize` | `i64`, 8 bytes |
//! | [`Int32`], [`Int64`] | `i32`, `i64` | 4, 8 bytes |
//! | [`Float32`], [`Float64`] | `f32`, `f64` | IEEE bits, 4, 8 bytes |
//! | [`IntSlice`], [`Int32Slice`], [`Int64Slice`] | `Vec<isize>`, ... | concatenated elements |
//! | [`Float32Slice`], [`Float64Slice`] | `Vec<f32>`, `Vec<f64>` | concatenated elements |
//!
//! Numbers are little-endian. A scalar payload must have the exact size, a
//! slice payload a multiple of the element size.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use vc_envelope::{Deserializable, DeserializerRegistry, Result, SerialError, Serializable};

// -----------------------------------------------------------------------------
// Payload helpers

/// Reads a payload of exactly `N` bytes.
fn fixed<const N: usize>(data: &[u8]) -> Result<[u8; N]> {
    match data.split_first_chunk::<N>() {
        Some((bytes, [])) => Ok(*bytes),
        Some((_, rest)) => Err(SerialError::ResidualData(rest.len())),
        None => Err(SerialError::BufferUnderflow {
            needed: N as u64,
            available: data.len(),
        }),
    }
}

/// Splits a payload into `N`-byte elements.
fn elements<const N: usize>(data: &[u8]) -> Result<&[[u8; N]]> {
    let (chunks, rest) = data.as_chunks::<N>();
    if rest.is_empty() {
        Ok(chunks)
    } else {
        Err(SerialError::ResidualData(rest.len()))
    }
}

// -----------------------------------------------------------------------------
// Common impls

macro_rules! impl_wrapper {
    ($name:ident($native:ty)) => {
        impl Serializable for $name {
            #[inline]
            fn serialize(&self) -> Result<Vec<u8>> {
                Ok(self.encode())
            }

            #[inline]
            fn type_tag(&self) -> &str {
                <Self as Deserializable>::TYPE_TAG
            }

            #[inline]
            fn duplicate(&self) -> Option<Box<dyn Serializable>> {
                Some(Box::new(self.clone()))
            }
        }

        impl Deserializable for $name {
            const TYPE_TAG: &'static str = concat!("vc_dynamic::", stringify!($name));

            #[inline]
            fn deserialize(data: &[u8]) -> Result<Self> {
                Self::decode(data)
            }
        }

        impl From<$native> for $name {
            #[inline]
            fn from(value: $native) -> Self {
                Self(value)
            }
        }

        impl From<$name> for $native {
            #[inline]
            fn from(value: $name) -> Self {
                value.0
            }
        }

        vc_envelope::auto_register!($name);
    };
}

// -----------------------------------------------------------------------------
// Bytes & Text

/// Raw bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl Bytes {
    fn encode(&self) -> Vec<u8> {
        self.0.clone()
    }

    fn decode(data: &[u8]) -> Result<Self> {
        Ok(Self(data.to_vec()))
    }
}

impl_wrapper!(Bytes(Vec<u8>));

/// A UTF-8 string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Text(pub String);

impl Text {
    fn encode(&self) -> Vec<u8> {
        self.0.as_bytes().to_vec()
    }

    fn decode(data: &[u8]) -> Result<Self> {
        let text = core::str::from_utf8(data).map_err(SerialError::custom)?;
        Ok(Self(text.into()))
    }
}

impl_wrapper!(Text(String));

// -----------------------------------------------------------------------------
// Bool

/// A boolean, stored as a single `0` or `1` byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Bool(pub bool);

impl Bool {
    fn encode(&self) -> Vec<u8> {
        alloc::vec![u8::from(self.0)]
    }

    fn decode(data: &[u8]) -> Result<Self> {
        match fixed::<1>(data)? {
            [0] => Ok(Self(false)),
            [1] => Ok(Self(true)),
            [byte] => Err(SerialError::msg(format_args!("invalid bool byte {byte:#04x}"))),
        }
    }
}

impl_wrapper!(Bool(bool));

// -----------------------------------------------------------------------------
// Scalars

macro_rules! impl_scalar {
    ($(#[$meta:meta])* $name:ident($native:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
        pub struct $name(pub $native);

        impl $name {
            fn encode(&self) -> Vec<u8> {
                self.0.to_le_bytes().to_vec()
            }

            fn decode(data: &[u8]) -> Result<Self> {
                let bytes = fixed::<{ size_of::<$native>() }>(data)?;
                Ok(Self(<$native>::from_le_bytes(bytes)))
            }
        }

        impl_wrapper!($name($native));
    };
}

impl_scalar!(
    /// A 32-bit signed integer.
    Int32(i32)
);
impl_scalar!(
    /// A 64-bit signed integer.
    Int64(i64)
);
impl_scalar!(
    /// A 32-bit float.
    Float32(f32)
);
impl_scalar!(
    /// A 64-bit float.
    Float64(f64)
);

/// A pointer-sized integer, stored as `i64` so the payload does not depend
/// on the platform.
///
/// Decoding fails on a platform where the stored value does not fit `isize`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Int(pub isize);

impl Int {
    fn encode(&self) -> Vec<u8> {
        (self.0 as i64).to_le_bytes().to_vec()
    }

    fn decode(data: &[u8]) -> Result<Self> {
        let value = i64::from_le_bytes(fixed(data)?);
        isize::try_from(value).map(Self).map_err(SerialError::custom)
    }
}

impl_wrapper!(Int(isize));

// -----------------------------------------------------------------------------
// Slices

macro_rules! impl_slice {
    ($(#[$meta:meta])* $name:ident($elem:ty)) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq)]
        pub struct $name(pub Vec<$elem>);

        impl $name {
            fn encode(&self) -> Vec<u8> {
                self.0.iter().flat_map(|value| value.to_le_bytes()).collect()
            }

            fn decode(data: &[u8]) -> Result<Self> {
                let values = elements::<{ size_of::<$elem>() }>(data)?;
                Ok(Self(values.iter().map(|bytes| <$elem>::from_le_bytes(*bytes)).collect()))
            }
        }

        impl_wrapper!($name(Vec<$elem>));
    };
}

impl_slice!(
    /// A list of 32-bit signed integers.
    Int32Slice(i32)
);
impl_slice!(
    /// A list of 64-bit signed integers.
    Int64Slice(i64)
);
impl_slice!(
    /// A list of 32-bit floats.
    Float32Slice(f32)
);
impl_slice!(
    /// A list of 64-bit floats.
    Float64Slice(f64)
);

/// A list of pointer-sized integers, each stored as `i64`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct IntSlice(pub Vec<isize>);

impl IntSlice {
    fn encode(&self) -> Vec<u8> {
        self.0
            .iter()
            .flat_map(|value| (*value as i64).to_le_bytes())
            .collect()
    }

    fn decode(data: &[u8]) -> Result<Self> {
        elements::<8>(data)?
            .iter()
            .map(|bytes| isize::try_from(i64::from_le_bytes(*bytes)).map_err(SerialError::custom))
            .collect::<Result<_>>()
            .map(Self)
    }
}

impl_wrapper!(IntSlice(Vec<isize>));

// -----------------------------------------------------------------------------
// Registration

/// Registers every built-in wrapper that is not present in `registry` yet.
///
/// Entries already installed under a built-in type ID are kept, so this can be
/// called any number of times and does not undo deliberate replacements.
///
/// # Examples
///
/// ```
/// use vc_dynamic::{Int, register_builtins};
/// use vc_envelope::{Deserializable, DeserializerRegistry};
///
/// let registry = DeserializerRegistry::new();
/// register_builtins(&registry);
///
/// assert!(registry.contains(Int::TYPE_TAG));
/// assert_eq!(registry.len(), 13);
/// ```
pub fn register_builtins(registry: &DeserializerRegistry) {
    fn insert<T: Deserializable>(registry: &DeserializerRegistry) {
        if !registry.contains(T::TYPE_TAG) {
            registry.update_type::<T>();
        }
    }

    insert::<Bytes>(registry);
    insert::<Text>(registry);
    insert::<Bool>(registry);
    insert::<Int>(registry);
    insert::<Int32>(registry);
    insert::<Int64>(registry);
    insert::<Float32>(registry);
    insert::<Float64>(registry);
    insert::<IntSlice>(registry);
    insert::<Int32Slice>(registry);
    insert::<Int64Slice>(registry);
    insert::<Float32Slice>(registry);
    insert::<Float64Slice>(registry);
}

// -----------------------------------------------------------------------------
// Tests
