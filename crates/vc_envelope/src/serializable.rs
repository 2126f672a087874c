use alloc::boxed::Box;
use alloc::vec::Vec;
use core::any::Any;
use core::fmt::Debug;

use crate::error::Result;

// -----------------------------------------------------------------------------
// Serializable

/// The capability every encodable value implements.
///
/// A value produces its own payload through [`serialize`](Self::serialize)
/// and names its concrete type through [`type_tag`](Self::type_tag).
/// The type ID is persisted next to the payload and used as the decode key,
/// so it must be stable across calls and across process restarts.
///
/// Decoding is the job of a [`DeserializeFn`] registered under the same type ID.
/// Pairing the two is a contract the type author upholds: the framework does not check it.
///
/// # Examples
///
/// ```
/// use vc_envelope::{Deserializable, Serializable, SerialError, Result};
///
/// #[derive(Debug, PartialEq)]
/// struct Meters(u16);
///
/// impl Serializable for Meters {
///     fn serialize(&self) -> Result<Vec<u8>> {
///         Ok(self.0.to_le_bytes().to_vec())
///     }
///
///     fn type_tag(&self) -> &str {
///         Self::TYPE_TAG
///     }
/// }
///
/// impl Deserializable for Meters {
///     const TYPE_TAG: &'static str = "demo::Meters";
///
///     fn deserialize(data: &[u8]) -> Result<Self> {
///         let bytes: [u8; 2] = data.try_into().map_err(SerialError::custom)?;
///         Ok(Meters(u16::from_le_bytes(bytes)))
///     }
/// }
///
/// assert_eq!(Meters(7).serialize().unwrap(), [7, 0]);
/// ```
pub trait Serializable: Any + Send + Sync + Debug {
    /// Encodes this value into its payload bytes.
    ///
    /// Fails only for conditions internal to the type.
    fn serialize(&self) -> Result<Vec<u8>>;

    /// Returns the unique type ID of this type.
    fn type_tag(&self) -> &str;

    /// Produces an independent duplicate without a round trip, if the type can.
    ///
    /// Used by [`copy_value`](crate::copy_value); returning `None` falls back
    /// to encoding and decoding the value.
    #[inline]
    fn duplicate(&self) -> Option<Box<dyn Serializable>> {
        None
    }

    /// The Rust type name of the concrete value, for diagnostics.
    #[inline]
    fn type_name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// A decode function stored in the [`DeserializerRegistry`].
///
/// It receives every byte after the envelope header and must consume
/// exactly the payload its paired encoder produced.
///
/// [`DeserializerRegistry`]: crate::DeserializerRegistry
pub type DeserializeFn = fn(&[u8]) -> Result<Box<dyn Serializable>>;

// -----------------------------------------------------------------------------
// Deserializable

/// A [`Serializable`] type with a statically known type ID and decoder.
///
/// Implementing it lets the type be registered without writing a [`DeserializeFn`]
/// by hand, see [`DeserializerRegistry::register_type`] and [`auto_register!`].
///
/// [`DeserializerRegistry::register_type`]: crate::DeserializerRegistry::register_type
/// [`auto_register!`]: crate::auto_register
pub trait Deserializable: Serializable + Sized {
    /// The type ID, identical to what [`Serializable::type_tag`] returns.
    const TYPE_TAG: &'static str;

    /// Decodes a value from the payload produced by [`Serializable::serialize`].
    fn deserialize(data: &[u8]) -> Result<Self>;
}

/// The [`DeserializeFn`] of a [`Deserializable`] type.
#[inline]
pub fn deserialize_boxed<T: Deserializable>(data: &[u8]) -> Result<Box<dyn Serializable>> {
    Ok(Box::new(T::deserialize(data)?))
}

// -----------------------------------------------------------------------------
// Downcasting

impl dyn Serializable {
    /// Returns `true` if the value is of type `T`.
    #[inline]
    pub fn is<T: Any>(&self) -> bool {
        let any: &dyn Any = self;
        any.is::<T>()
    }

    /// Downcasts the value to type `T` by reference.
    #[inline]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let any: &dyn Any = self;
        any.downcast_ref::<T>()
    }

    /// Downcasts the value to type `T` by mutable reference.
    #[inline]
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        let any: &mut dyn Any = self;
        any.downcast_mut::<T>()
    }

    /// Downcasts the value to type `T`, consuming the trait object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    pub fn downcast<T: Any>(self: Box<dyn Serializable>) -> Result<Box<T>, Box<dyn Serializable>> {
        if !self.is::<T>() {
            return Err(self);
        }
        let any: Box<dyn Any> = self;
        match any.downcast::<T>() {
            Ok(value) => Ok(value),
            Err(_) => unreachable!("type is already checked"),
        }
    }

    /// Downcasts the value to type `T`, unboxing and consuming the trait object.
    ///
    /// If the underlying value is not of type `T`, returns `Err(self)`.
    ///
    /// # Examples
    ///
    /// ```
    /// # use vc_envelope::{Serializable, Result};
    /// #[derive(Debug)]
    /// struct Unit;
    ///
    /// impl Serializable for Unit {
    ///     fn serialize(&self) -> Result<Vec<u8>> { Ok(Vec::new()) }
    ///     fn type_tag(&self) -> &str { "demo::Unit" }
    /// }
    ///
    /// let value: Box<dyn Serializable> = Box::new(Unit);
    /// assert!(value.is::<Unit>());
    /// assert!(value.take::<Unit>().is_ok());
    /// ```
    #[inline]
    pub fn take<T: Any>(self: Box<dyn Serializable>) -> Result<T, Box<dyn Serializable>> {
        self.downcast::<T>().map(|value| *value)
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::vec::Vec;

    use super::{Deserializable, Serializable, deserialize_boxed};
    use crate::error::Result;

    #[derive(Debug, PartialEq)]
    struct Flag(bool);

    impl Serializable for Flag {
        fn serialize(&self) -> Result<Vec<u8>> {
            Ok(alloc::vec![self.0 as u8])
        }

        fn type_tag(&self) -> &str {
            Self::TYPE_TAG
        }
    }

    impl Deserializable for Flag {
        const TYPE_TAG: &'static str = "tests::Flag";

        fn deserialize(data: &[u8]) -> Result<Self> {
            Ok(Flag(data == [1]))
        }
    }

    #[test]
    fn downcast_round() {
        let mut value: Box<dyn Serializable> = Box::new(Flag(true));
        assert!(value.is::<Flag>());
        assert!(!value.is::<u8>());
        assert_eq!(value.downcast_ref::<Flag>(), Some(&Flag(true)));

        value.downcast_mut::<Flag>().unwrap().0 = false;

        let value = value.downcast::<u8>().unwrap_err();
        assert_eq!(value.take::<Flag>().unwrap(), Flag(false));
    }

    #[test]
    fn type_name_is_concrete() {
        let value: Box<dyn Serializable> = Box::new(Flag(true));
        assert!(value.type_name().ends_with("Flag"));
        assert!(value.duplicate().is_none());
    }

    #[test]
    fn boxed_deserializer() {
        let value = deserialize_boxed::<Flag>(&[1]).unwrap();
        assert_eq!(value.type_tag(), "tests::Flag");
        assert_eq!(value.take::<Flag>().unwrap(), Flag(true));
    }
}
