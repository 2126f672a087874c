//! Output slots of [`decode_any`](crate::decode_any()) and the conversion table.
//!
//! A decoded value is stored into a slot if it has the slot's type, or if the
//! table below converts it. Every other combination is a type mismatch.
//!
//! | Target | Accepts |
//! |--------|---------|
//! | [`Bytes`], `Vec<u8>` | `Bytes`, `Text` |
//! | [`Text`], `String` | `Text`, `Bytes` holding valid UTF-8 |
//! | [`Int`], `isize` | `Int`, `Int32`, `Int64` if it fits |
//! | [`Int64`], `i64` | `Int64`, `Int`, `Int32` |
//! | [`Float64`], `f64` | `Float64`, `Float32` |
//! | any other wrapper or native | its own wrapper only |
//! | `Option<T>` with `T: Serializable` | `T` only |
//! | `Box<dyn Serializable>` | anything |
//!
//! Conversions never lose information.

use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use vc_envelope::Serializable;

use crate::primitives::{
    Bool, Bytes, Float32, Float32Slice, Float64, Float64Slice, Int, Int32, Int32Slice, Int64,
    Int64Slice, IntSlice, Text,
};

// -----------------------------------------------------------------------------
// DecodeTarget

/// A write destination for a decoded value.
///
/// Implemented for every type implementing [`FromDecoded`].
pub trait DecodeTarget {
    /// Name of the slot type, used in [`SerialError::TypeMismatch`](vc_envelope::SerialError::TypeMismatch).
    fn expected_type(&self) -> &'static str;

    /// Stores `value` into the slot.
    ///
    /// If `value` is neither assignable nor convertible, it is handed back
    /// and the slot is left untouched.
    fn accept(&mut self, value: Box<dyn Serializable>) -> Result<(), Box<dyn Serializable>>;
}

impl<T: FromDecoded> DecodeTarget for T {
    #[inline]
    fn expected_type(&self) -> &'static str {
        core::any::type_name::<T>()
    }

    #[inline]
    fn accept(&mut self, value: Box<dyn Serializable>) -> Result<(), Box<dyn Serializable>> {
        *self = T::from_decoded(value)?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// FromDecoded

/// Extracts a typed value from a decoded one, applying the conversion table.
///
/// # Examples
///
/// ```
/// use vc_dynamic::{Bytes, FromDecoded, Int32, Text};
/// use vc_envelope::Serializable;
///
/// let value: Box<dyn Serializable> = Box::new(Bytes(b"ok".to_vec()));
/// assert_eq!(Text::from_decoded(value).unwrap(), Text("ok".into()));
///
/// let value: Box<dyn Serializable> = Box::new(Bytes(vec![0xFF]));
/// let value = String::from_decoded(value).unwrap_err();
/// assert!(value.is::<Bytes>());
///
/// let value: Box<dyn Serializable> = Box::new(Int32(-1));
/// assert_eq!(i64::from_decoded(value).unwrap(), -1);
/// ```
pub trait FromDecoded: Sized {
    /// Returns the converted value, or hands `value` back if it is not accepted.
    fn from_decoded(value: Box<dyn Serializable>) -> Result<Self, Box<dyn Serializable>>;
}

#[inline]
fn rebox<T: Serializable>(value: T) -> Box<dyn Serializable> {
    Box::new(value)
}

/// Tries each source type in order and returns the first conversion.
/// Falls through to `Err(value)` when none matches.
macro_rules! convert {
    ($value:ident; $($from:ty => $map:expr),+ $(,)?) => {{
        $(
            let $value = match $value.take::<$from>() {
                Ok(source) => return ($map)(source),
                Err(value) => value,
            };
        )+
        Err($value)
    }};
}

impl FromDecoded for Bytes {
    fn from_decoded(value: Box<dyn Serializable>) -> Result<Self, Box<dyn Serializable>> {
        convert!(value;
            Bytes => Ok,
            Text => |text: Text| Ok(Bytes(text.0.into_bytes())),
        )
    }
}

impl FromDecoded for Text {
    fn from_decoded(value: Box<dyn Serializable>) -> Result<Self, Box<dyn Serializable>> {
        convert!(value;
            Text => Ok,
            Bytes => |bytes: Bytes| String::from_utf8(bytes.0)
                .map(Text)
                .map_err(|err| rebox(Bytes(err.into_bytes()))),
        )
    }
}

impl FromDecoded for Int {
    fn from_decoded(value: Box<dyn Serializable>) -> Result<Self, Box<dyn Serializable>> {
        convert!(value;
            Int => Ok,
            Int32 => |source: Int32| isize::try_from(source.0).map(Int).map_err(|_| rebox(source)),
            Int64 => |source: Int64| isize::try_from(source.0).map(Int).map_err(|_| rebox(source)),
        )
    }
}

impl FromDecoded for Int64 {
    fn from_decoded(value: Box<dyn Serializable>) -> Result<Self, Box<dyn Serializable>> {
        convert!(value;
            Int64 => Ok,
            Int => |source: Int| i64::try_from(source.0).map(Int64).map_err(|_| rebox(source)),
            Int32 => |source: Int32| Ok(Int64(i64::from(source.0))),
        )
    }
}

impl FromDecoded for Float64 {
    fn from_decoded(value: Box<dyn Serializable>) -> Result<Self, Box<dyn Serializable>> {
        convert!(value;
            Float64 => Ok,
            Float32 => |source: Float32| Ok(Float64(f64::from(source.0))),
        )
    }
}

macro_rules! impl_exact {
    ($($name:ty),* $(,)?) => {
        $(
            impl FromDecoded for $name {
                #[inline]
                fn from_decoded(value: Box<dyn Serializable>) -> Result<Self, Box<dyn Serializable>> {
                    value.take::<$name>()
                }
            }
        )*
    };
}

impl_exact!(
    Bool,
    Int32,
    Float32,
    IntSlice,
    Int32Slice,
    Int64Slice,
    Float32Slice,
    Float64Slice,
);

/// Native types accept what their wrapper accepts.
macro_rules! impl_native {
    ($($native:ty => $wrapper:ident),* $(,)?) => {
        $(
            impl FromDecoded for $native {
                #[inline]
                fn from_decoded(value: Box<dyn Serializable>) -> Result<Self, Box<dyn Serializable>> {
                    $wrapper::from_decoded(value).map(|$wrapper(inner)| inner)
                }
            }
        )*
    };
}

impl_native!(
    Vec<u8> => Bytes,
    String => Text,
    bool => Bool,
    isize => Int,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    Vec<isize> => IntSlice,
    Vec<i32> => Int32Slice,
    Vec<i64> => Int64Slice,
    Vec<f32> => Float32Slice,
    Vec<f64> => Float64Slice,
);

// -----------------------------------------------------------------------------
// Generic slots

impl<T: Serializable> FromDecoded for Option<T> {
    #[inline]
    fn from_decoded(value: Box<dyn Serializable>) -> Result<Self, Box<dyn Serializable>> {
        value.take::<T>().map(Some)
    }
}

impl FromDecoded for Box<dyn Serializable> {
    #[inline]
    fn from_decoded(value: Box<dyn Serializable>) -> Result<Self, Box<dyn Serializable>> {
        Ok(value)
    }
}

// -----------------------------------------------------------------------------
// Tests
