use std::sync::LazyLock;

use super::DeserializerRegistry;
use crate::serializable::DeserializeFn;

static GLOBAL: LazyLock<DeserializerRegistry> = LazyLock::new(|| {
    let registry = DeserializerRegistry::new();
    registry.auto_register();
    registry
});

/// The process-wide default [`DeserializerRegistry`].
///
/// It is created on first use and filled with every type submitted through
/// [`auto_register!`](crate::auto_register) (with the `auto_register` feature).
/// The free codec functions such as [`decode_with_type`](crate::decode_with_type) use it.
#[inline]
pub fn global() -> &'static DeserializerRegistry {
    &GLOBAL
}

/// [`DeserializerRegistry::get`] on the [`global`] registry.
#[inline]
pub fn get_deserializer(type_tag: &str) -> Option<DeserializeFn> {
    global().get(type_tag)
}

/// [`DeserializerRegistry::update`] on the [`global`] registry.
#[inline]
pub fn update_deserializer(type_tag: &str, func: Option<DeserializeFn>) {
    global().update(type_tag, func);
}

/// [`DeserializerRegistry::register`] on the [`global`] registry.
///
/// # Panics
///
/// Panics if the type ID is already in use.
#[track_caller]
#[inline]
pub fn register_deserializer(type_tag: &str, func: DeserializeFn) {
    global().register(type_tag, func);
}

// -----------------------------------------------------------------------------
// Tests
