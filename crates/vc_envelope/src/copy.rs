use alloc::boxed::Box;

use crate::envelope::encode_with_type;
use crate::error::{Result, SerialError};
use crate::registry::{DeserializerRegistry, global};
use crate::serializable::Serializable;

// -----------------------------------------------------------------------------
// Copy

impl DeserializerRegistry {
    /// Produces an independent deep copy of `value`.
    ///
    /// Uses [`Serializable::duplicate`] if the type provides it, otherwise
    /// encodes the value and decodes it again through this registry.
    /// In that case the type ID of `value` must be registered.
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_envelope::{DeserializerRegistry, Deserializable, Serializable, SerialError, Result};
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Tags(Vec<u8>);
    ///
    /// impl Serializable for Tags {
    ///     fn serialize(&self) -> Result<Vec<u8>> { Ok(self.0.clone()) }
    ///     fn type_tag(&self) -> &str { Self::TYPE_TAG }
    /// }
    ///
    /// impl Deserializable for Tags {
    ///     const TYPE_TAG: &'static str = "demo::Tags";
    ///     fn deserialize(data: &[u8]) -> Result<Self> { Ok(Tags(data.to_vec())) }
    /// }
    ///
    /// let registry = DeserializerRegistry::new();
    /// let original = Tags(vec![1, 2, 3]);
    ///
    /// let err = registry.copy_value(&original).unwrap_err();
    /// assert!(matches!(err, SerialError::UnregisteredType(_)));
    ///
    /// registry.register_type::<Tags>();
    /// let mut copied = registry.copy::<Tags>(&original).unwrap();
    /// copied.0.push(4);
    ///
    /// assert_eq!(original, Tags(vec![1, 2, 3]));
    /// assert_eq!(copied, Tags(vec![1, 2, 3, 4]));
    /// ```
    pub fn copy_value(&self, value: &dyn Serializable) -> Result<Box<dyn Serializable>> {
        if let Some(copied) = value.duplicate() {
            return Ok(copied);
        }
        self.decode_with_type(&encode_with_type(value)?)
    }

    /// Like [`copy_value`](Self::copy_value), but keeps the concrete type.
    ///
    /// Fails with [`SerialError::UnexpectedType`] if the registered decode function
    /// does not produce a `T`.
    pub fn copy<T: Serializable>(&self, value: &T) -> Result<T> {
        self.copy_value(value)?
            .take::<T>()
            .map_err(|copied| SerialError::UnexpectedType {
                expected: core::any::type_name::<T>(),
                actual: copied.type_name(),
            })
    }
}

/// [`DeserializerRegistry::copy_value`] on the [`global`] registry.
#[inline]
pub fn copy_value(value: &dyn Serializable) -> Result<Box<dyn Serializable>> {
    global().copy_value(value)
}

/// [`DeserializerRegistry::copy`] on the [`global`] registry.
#[inline]
pub fn copy<T: Serializable>(value: &T) -> Result<T> {
    global().copy(value)
}

// -----------------------------------------------------------------------------
// Tests
