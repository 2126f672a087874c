//! Items referenced by exported macros. Not public API.

#[cfg(feature = "auto_register")]
pub use inventory;

pub use crate::registry::AutoRegistration;

// -----------------------------------------------------------------------------
// auto_register

/// Submits a decode function for static registration.
///
/// Every submission is installed into [`global()`](crate::global) on its first use,
/// and into any registry on which
/// [`auto_register`](crate::DeserializerRegistry::auto_register) is called.
///
/// - `auto_register!(Type)` submits a [`Deserializable`](crate::Deserializable) type.
/// - `auto_register!("type-id", decode_fn)` submits a bare [`DeserializeFn`](crate::DeserializeFn)
///   under a string literal type ID.
///
/// Without the `auto_register` feature this macro expands to nothing.
///
/// # Examples
///
/// ```
/// use vc_envelope::{Deserializable, Serializable, Result, auto_register};
///
/// #[derive(Debug)]
/// struct Ping;
///
/// impl Serializable for Ping {
///     fn serialize(&self) -> Result<Vec<u8>> { Ok(Vec::new()) }
///     fn type_tag(&self) -> &str { Self::TYPE_TAG }
/// }
///
/// impl Deserializable for Ping {
///     const TYPE_TAG: &'static str = "demo::Ping";
///     fn deserialize(_: &[u8]) -> Result<Self> { Ok(Ping) }
/// }
///
/// auto_register!(Ping);
///
/// fn main() {
///     # #[cfg(feature = "auto_register")]
///     assert!(vc_envelope::global().contains("demo::Ping"));
/// }
/// ```
#[cfg(feature = "auto_register")]
#[macro_export]
macro_rules! auto_register {
    ($type_tag:literal, $func:expr) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::__macro_exports::AutoRegistration::new($type_tag, $func)
        }
    };
    ($ty:ty) => {
        $crate::__macro_exports::inventory::submit! {
            $crate::__macro_exports::AutoRegistration::of::<$ty>()
        }
    };
}

/// Submits a decode function for static registration.
///
/// The `auto_register` feature is disabled, so this expands to nothing.
#[cfg(not(feature = "auto_register"))]
#[macro_export]
macro_rules! auto_register {
    ($($tt:tt)*) => {};
}
