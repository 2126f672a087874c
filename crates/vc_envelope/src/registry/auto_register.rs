use crate::serializable::{DeserializeFn, Deserializable, deserialize_boxed};

// -----------------------------------------------------------------------------
// AutoRegistration

/// A `(type ID, decode function)` pair submitted at compile time.
///
/// Instances are created by [`auto_register!`](crate::auto_register) and collected
/// by [`DeserializerRegistry::auto_register`](crate::DeserializerRegistry::auto_register).
#[derive(Clone, Copy, Debug)]
pub struct AutoRegistration {
    type_tag: &'static str,
    func: DeserializeFn,
}

impl AutoRegistration {
    /// Pairs a type ID with its decode function.
    #[inline]
    pub const fn new(type_tag: &'static str, func: DeserializeFn) -> Self {
        Self { type_tag, func }
    }

    /// The submission of a [`Deserializable`] type.
    #[inline]
    pub const fn of<T: Deserializable>() -> Self {
        Self::new(T::TYPE_TAG, deserialize_boxed::<T>)
    }

    #[inline]
    pub const fn type_tag(&self) -> &'static str {
        self.type_tag
    }

    #[inline]
    pub const fn func(&self) -> DeserializeFn {
        self.func
    }
}

#[cfg(feature = "auto_register")]
inventory::collect!(AutoRegistration);

/// Every static submission linked into the binary.
#[cfg(feature = "auto_register")]
pub(super) fn submissions() -> impl Iterator<Item = &'static AutoRegistration> {
    inventory::iter::<AutoRegistration>.into_iter()
}
