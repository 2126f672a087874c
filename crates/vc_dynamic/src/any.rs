use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;
use core::any::Any;
use std::sync::Once;

use vc_envelope::{DeserializerRegistry, Result, SerialError, Serializable, encode_sequence};

use crate::primitives::{
    Bool, Bytes, Float32, Float32Slice, Float64, Float64Slice, Int, Int32, Int32Slice, Int64,
    Int64Slice, IntSlice, Text, register_builtins,
};
use crate::target::DecodeTarget;

// -----------------------------------------------------------------------------
// AnyRef

/// A borrowed input of [`encode_any`]: a serializable value or a recognized primitive shape.
///
/// Primitive shapes are wrapped into their built-in wrapper when encoded,
/// e.g. [`AnyRef::Text`] is written as a [`Text`].
///
/// Values usually come from [`From`], which is what [`encode_any!`](crate::encode_any!) uses.
/// Owned strings and vectors convert through their borrowed form
/// (`s.as_str()`, `&v[..]`), since `&T` converts only for `T: Serializable`.
/// [`AnyRef::from_any`] matches the shape at runtime instead.
#[derive(Debug, Clone, Copy)]
pub enum AnyRef<'a> {
    Object(&'a dyn Serializable),
    Text(&'a str),
    Bytes(&'a [u8]),
    Bool(bool),
    Int(isize),
    Int32(i32),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    IntSlice(&'a [isize]),
    Int32Slice(&'a [i32]),
    Int64Slice(&'a [i64]),
    Float32Slice(&'a [f32]),
    Float64Slice(&'a [f64]),
}

impl<'a, T: Serializable> From<&'a T> for AnyRef<'a> {
    #[inline]
    fn from(value: &'a T) -> Self {
        Self::Object(value)
    }
}

impl<'a> From<&'a dyn Serializable> for AnyRef<'a> {
    #[inline]
    fn from(value: &'a dyn Serializable) -> Self {
        Self::Object(value)
    }
}

macro_rules! impl_from_shape {
    ($($source:ty => $variant:ident),* $(,)?) => {
        $(
            impl<'a> From<$source> for AnyRef<'a> {
                #[inline]
                fn from(value: $source) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}

impl_from_shape!(
    &'a str => Text,
    &'a [u8] => Bytes,
    bool => Bool,
    isize => Int,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    &'a [isize] => IntSlice,
    &'a [i32] => Int32Slice,
    &'a [i64] => Int64Slice,
    &'a [f32] => Float32Slice,
    &'a [f64] => Float64Slice,
);

macro_rules! impl_from_scalar_wrapper {
    ($($wrapper:ident),* $(,)?) => {
        $(
            impl From<$wrapper> for AnyRef<'_> {
                #[inline]
                fn from(value: $wrapper) -> Self {
                    Self::$wrapper(value.0)
                }
            }
        )*
    };
}

impl_from_scalar_wrapper!(Bool, Int, Int32, Int64, Float32, Float64);

impl<'a> AnyRef<'a> {
    /// Matches the runtime shape of `value`.
    ///
    /// Recognizes the native primitive shapes (`String`, `&'static str`, `Vec<u8>`,
    /// `bool`, integers, floats and their `Vec`s), the built-in wrappers, and
    /// `Box<dyn Serializable>`. Other user types cannot be recognized through
    /// [`Any`] and must use [`From`].
    ///
    /// # Errors
    ///
    /// Returns [`SerialError::UnsupportedType`] naming `T` for any other type.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_dynamic::AnyRef;
    /// use vc_envelope::SerialError;
    ///
    /// let value = String::from("hello");
    /// assert!(matches!(AnyRef::from_any(&value), Ok(AnyRef::Text("hello"))));
    ///
    /// let err = AnyRef::from_any(&'c').unwrap_err();
    /// assert!(matches!(err, SerialError::UnsupportedType("char")));
    /// ```
    pub fn from_any<T: Any>(value: &'a T) -> Result<Self> {
        let any: &'a dyn Any = value;

        macro_rules! shapes {
            ($($ty:ty => $map:expr),* $(,)?) => {
                $(
                    if let Some(value) = any.downcast_ref::<$ty>() {
                        return Ok(($map)(value));
                    }
                )*
            };
        }

        shapes!(
            String => |v: &'a String| Self::Text(v),
            &'static str => |v: &'a &'static str| Self::Text(v),
            Vec<u8> => |v: &'a Vec<u8>| Self::Bytes(v),
            bool => |v: &'a bool| Self::Bool(*v),
            isize => |v: &'a isize| Self::Int(*v),
            i32 => |v: &'a i32| Self::Int32(*v),
            i64 => |v: &'a i64| Self::Int64(*v),
            f32 => |v: &'a f32| Self::Float32(*v),
            f64 => |v: &'a f64| Self::Float64(*v),
            Vec<isize> => |v: &'a Vec<isize>| Self::IntSlice(v),
            Vec<i32> => |v: &'a Vec<i32>| Self::Int32Slice(v),
            Vec<i64> => |v: &'a Vec<i64>| Self::Int64Slice(v),
            Vec<f32> => |v: &'a Vec<f32>| Self::Float32Slice(v),
            Vec<f64> => |v: &'a Vec<f64>| Self::Float64Slice(v),
            Box<dyn Serializable> => |v: &'a Box<dyn Serializable>| Self::Object(&**v),
        );

        shapes!(
            Bytes => |v: &'a Bytes| Self::Object(v),
            Text => |v: &'a Text| Self::Object(v),
            Bool => |v: &'a Bool| Self::Object(v),
            Int => |v: &'a Int| Self::Object(v),
            Int32 => |v: &'a Int32| Self::Object(v),
            Int64 => |v: &'a Int64| Self::Object(v),
            Float32 => |v: &'a Float32| Self::Object(v),
            Float64 => |v: &'a Float64| Self::Object(v),
            IntSlice => |v: &'a IntSlice| Self::Object(v),
            Int32Slice => |v: &'a Int32Slice| Self::Object(v),
            Int64Slice => |v: &'a Int64Slice| Self::Object(v),
            Float32Slice => |v: &'a Float32Slice| Self::Object(v),
            Float64Slice => |v: &'a Float64Slice| Self::Object(v),
        );

        Err(SerialError::UnsupportedType(core::any::type_name::<T>()))
    }

    /// Produces the value that is actually encoded.
    fn coerce(self) -> Coerced<'a> {
        fn owned<T: Serializable>(value: T) -> Coerced<'static> {
            Coerced::Owned(Box::new(value))
        }

        match self {
            Self::Object(value) => Coerced::Borrowed(value),
            Self::Text(value) => owned(Text(value.into())),
            Self::Bytes(value) => owned(Bytes(value.to_vec())),
            Self::Bool(value) => owned(Bool(value)),
            Self::Int(value) => owned(Int(value)),
            Self::Int32(value) => owned(Int32(value)),
            Self::Int64(value) => owned(Int64(value)),
            Self::Float32(value) => owned(Float32(value)),
            Self::Float64(value) => owned(Float64(value)),
            Self::IntSlice(value) => owned(IntSlice(value.to_vec())),
            Self::Int32Slice(value) => owned(Int32Slice(value.to_vec())),
            Self::Int64Slice(value) => owned(Int64Slice(value.to_vec())),
            Self::Float32Slice(value) => owned(Float32Slice(value.to_vec())),
            Self::Float64Slice(value) => owned(Float64Slice(value.to_vec())),
        }
    }
}

enum Coerced<'a> {
    Borrowed(&'a dyn Serializable),
    Owned(Box<dyn Serializable>),
}

impl Coerced<'_> {
    #[inline]
    fn as_dyn(&self) -> &dyn Serializable {
        match self {
            Self::Borrowed(value) => *value,
            Self::Owned(value) => &**value,
        }
    }
}

// -----------------------------------------------------------------------------
// Encoding

/// Encodes heterogeneous values as a sequence.
///
/// Serializable values are used as they are; primitive shapes are wrapped
/// into their built-in wrapper first.
///
/// See [`encode_any!`](crate::encode_any!) for a variadic form.
///
/// # Examples
///
/// ```
/// use vc_dynamic::{AnyRef, decode_any, encode_any};
///
/// let data = encode_any(&[AnyRef::from("hello"), AnyRef::from(42_isize), AnyRef::from(true)]).unwrap();
///
/// let (mut text, mut num, mut flag) = (String::new(), 0_isize, false);
/// decode_any(&data, &mut [&mut text, &mut num, &mut flag]).unwrap();
///
/// assert_eq!((text.as_str(), num, flag), ("hello", 42, true));
/// ```
pub fn encode_any(values: &[AnyRef<'_>]) -> Result<Vec<u8>> {
    let coerced: Vec<Coerced<'_>> = values.iter().map(|value| value.coerce()).collect();
    let objects: Vec<&dyn Serializable> = coerced.iter().map(Coerced::as_dyn).collect();
    encode_sequence(&objects)
}

// -----------------------------------------------------------------------------
// Decoding

/// The [`global`](vc_envelope::global) registry, with the built-in wrappers registered.
///
/// The built-in wrappers are added once, on the first call, and only where
/// their type IDs are still free.
pub fn global() -> &'static DeserializerRegistry {
    static BUILTINS: Once = Once::new();

    let registry = vc_envelope::global();
    BUILTINS.call_once(|| register_builtins(registry));
    registry
}

/// Decodes a sequence into `slots`, using the [`global`] registry.
///
/// See [`decode_any_with`].
#[inline]
pub fn decode_any(data: &[u8], slots: &mut [&mut dyn DecodeTarget]) -> Result<()> {
    decode_any_with(global(), data, slots)
}

/// Decodes a sequence and stores the values into `slots`, in order.
///
/// Each value is assigned to its slot directly or through the conversion
/// table of [`FromDecoded`](crate::FromDecoded).
///
/// # Errors
///
/// - Any error of [`DeserializerRegistry::decode_sequence`].
/// - [`SerialError::CountMismatch`] if the number of values differs from
///   the number of slots. No slot is written in this case.
/// - [`SerialError::TypeMismatch`] for the first value its slot cannot take.
///   Slots before it have already been written.
pub fn decode_any_with(
    registry: &DeserializerRegistry,
    data: &[u8],
    slots: &mut [&mut dyn DecodeTarget],
) -> Result<()> {
    let values = registry.decode_sequence(data)?;
    if values.len() != slots.len() {
        return Err(SerialError::CountMismatch {
            slots: slots.len(),
            decoded: values.len(),
        });
    }

    for (index, (value, slot)) in values.into_iter().zip(slots.iter_mut()).enumerate() {
        let expected = slot.expected_type();
        if let Err(value) = slot.accept(value) {
            return Err(SerialError::TypeMismatch {
                index,
                expected,
                actual: value.type_name(),
            });
        }
    }

    Ok(())
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec::Vec;

    use serde::{Deserialize, Serialize};
    use vc_envelope::{Deserializable, DeserializerRegistry, Result, SerialError, Serializable};

    use super::{AnyRef, decode_any_with, encode_any, global};
    use crate::primitives::*;

    fn registry() -> DeserializerRegistry {
        let registry = DeserializerRegistry::new();
        register_builtins(&registry);
        registry
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Player {
        name: String,
        score: u32,
    }

    impl Serializable for Player {
        fn serialize(&self) -> Result<Vec<u8>> {
            serde_json::to_vec(self).map_err(SerialError::custom)
        }

        fn type_tag(&self) -> &str {
            Self::TYPE_TAG
        }
    }

    impl Deserializable for Player {
        const TYPE_TAG: &'static str = "tests::Player";

        fn deserialize(data: &[u8]) -> Result<Self> {
            serde_json::from_slice(data).map_err(SerialError::custom)
        }
    }

    #[test]
    fn primitives_round_trip() {
        let data = encode_any(&[
            AnyRef::from("hello"),
            AnyRef::from(42_isize),
            AnyRef::from(true),
        ])
        .unwrap();

        let (mut text, mut num, mut flag) = (String::new(), 0_isize, false);
        decode_any_with(&registry(), &data, &mut [&mut text, &mut num, &mut flag]).unwrap();

        assert_eq!(text, "hello");
        assert_eq!(num, 42);
        assert!(flag);
    }

    #[test]
    fn primitives_are_wrapped() {
        let data = encode_any(&[AnyRef::from(1.5_f32), AnyRef::from(&[1_i32, 2][..])]).unwrap();
        let values = registry().decode_sequence(&data).unwrap();

        assert_eq!(values[0].type_tag(), Float32::TYPE_TAG);
        assert_eq!(values[1].type_tag(), Int32Slice::TYPE_TAG);
    }

    #[test]
    fn mismatched_slot_is_reported() {
        let data = encode_any(&[AnyRef::from("hello"), AnyRef::from(42_isize)]).unwrap();

        let (mut text, mut flag) = (String::new(), false);
        let err = decode_any_with(&registry(), &data, &mut [&mut text, &mut flag]).unwrap_err();

        match err {
            SerialError::TypeMismatch {
                index,
                expected,
                actual,
            } => {
                assert_eq!(index, 1);
                assert_eq!(expected, "bool");
                assert!(actual.ends_with("Int"), "{actual}");
            }
            err => panic!("unexpected error: {err}"),
        }
        assert_eq!(text, "hello");
    }

    #[test]
    fn count_mismatch_writes_nothing() {
        let data = encode_any(&[AnyRef::from(1_i64), AnyRef::from(2_i64)]).unwrap();

        let mut first = 0_i64;
        let err = decode_any_with(&registry(), &data, &mut [&mut first]).unwrap_err();

        assert!(matches!(err, SerialError::CountMismatch { slots: 1, decoded: 2 }));
        assert_eq!(first, 0);
    }

    #[test]
    fn generic_and_user_slots() {
        let player = Player {
            name: "ferris".into(),
            score: 7,
        };
        let data = encode_any(&[AnyRef::from(&player), AnyRef::from(&Bytes(b"raw".to_vec()))]).unwrap();

        let registry = registry();
        registry.register_type::<Player>();

        let mut decoded: Option<Player> = None;
        let mut generic: Box<dyn Serializable> = Box::new(Bool::default());
        decode_any_with(&registry, &data, &mut [&mut decoded, &mut generic]).unwrap();

        assert_eq!(decoded, Some(player));
        let generic = generic.take::<Bytes>().unwrap();
        assert_eq!(generic, Bytes(b"raw".to_vec()));
    }

    #[test]
    fn wrapper_inputs_convert_on_decode() {
        let data = encode_any(&[Int(15).into(), Float64(3.14).into(), AnyRef::from(&Bytes(b"hi".to_vec()))]).unwrap();

        let (mut num, mut float, mut text) = (Int64(0), 0.0_f64, Text::default());
        decode_any_with(&registry(), &data, &mut [&mut num, &mut float, &mut text]).unwrap();

        assert_eq!(num, Int64(15));
        assert_eq!(float, 3.14);
        assert_eq!(text, Text("hi".into()));
    }

    #[test]
    fn from_any_matches_shapes() {
        let owned: Vec<f64> = alloc::vec![1.0, 2.0];
        assert!(matches!(AnyRef::from_any(&owned), Ok(AnyRef::Float64Slice(values)) if values == [1.0, 2.0]));

        let wrapper = Int32(3);
        assert!(matches!(AnyRef::from_any(&wrapper), Ok(AnyRef::Object(_))));

        let boxed: Box<dyn Serializable> = Box::new(Bool(true));
        let value = AnyRef::from_any(&boxed).unwrap();
        assert!(matches!(value, AnyRef::Object(object) if object.type_tag() == Bool::TYPE_TAG));

        let err = AnyRef::from_any(&(1_u8, 2_u8)).unwrap_err();
        assert!(matches!(err, SerialError::UnsupportedType("(u8, u8)")));
    }

    #[test]
    fn macros_round_trip_owned_values() {
        global().update_type::<Player>();

        let name = String::from("ferris");
        let weights: Vec<f64> = alloc::vec![0.5, -1.25, 3.0];
        let player = Player {
            name: name.clone(),
            score: 12,
        };

        let data = crate::encode_any!(name.as_str(), &weights[..], &player, 7_i32).unwrap();

        let mut text = String::new();
        let mut list = Vec::<f64>::new();
        let mut decoded: Option<Player> = None;
        let mut wide = 0_i64;
        crate::decode_any!(&data, &mut text, &mut list, &mut decoded, &mut wide).unwrap();

        assert_eq!(text, name);
        assert_eq!(list, weights);
        assert_eq!(decoded, Some(player));
        assert_eq!(wide, 7);
    }

    #[test]
    fn macros_report_slot_errors() {
        let bytes: Vec<u8> = alloc::vec![0xFF, 0x00];
        let data = crate::encode_any!(&bytes[..], 1.5_f64).unwrap();

        let (mut text, mut float) = (String::from("keep"), 0.0_f64);
        let err = crate::decode_any!(&data, &mut text, &mut float).unwrap_err();
        assert!(matches!(err, SerialError::TypeMismatch { index: 0, .. }));
        assert_eq!(text, "keep");

        let mut only = Vec::<u8>::new();
        let err = crate::decode_any!(&data, &mut only).unwrap_err();
        assert!(matches!(err, SerialError::CountMismatch { slots: 1, decoded: 2 }));
    }

    #[test]
    fn empty_input_is_empty_sequence() {
        let data = encode_any(&[]).unwrap();
        assert!(data.is_empty());
        decode_any_with(&registry(), &data, &mut []).unwrap();
    }

    #[test]
    fn unregistered_element_fails() {
        let data = encode_any(&[AnyRef::from(1_i32)]).unwrap();
        let mut slot = 0_i32;

        let err = decode_any_with(&DeserializerRegistry::new(), &data, &mut [&mut slot]).unwrap_err();
        assert!(matches!(err.innermost(), SerialError::UnregisteredType(_)));
    }
}
