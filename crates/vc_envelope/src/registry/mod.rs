//! The deserializer registry: a concurrent map from type ID to decode function.
//!
//! ## Menu
//!
//! - [`DeserializerRegistry`]: An injectable registry guarded by a read-preferring lock.
//! - [`global`]: The process-wide default instance, auto-registered on first use.
//! - [`get_deserializer`], [`update_deserializer`], [`register_deserializer`]:
//!   Shortcuts operating on [`global`].
//! - [`AutoRegistration`]: A static submission collected by [`auto_register!`].
//!
//! ## register vs update
//!
//! [`register`](DeserializerRegistry::register) is meant for first-time, static registration:
//! it panics if the type ID is already in use, so a reused ID is caught at startup
//! instead of silently shadowing another codec.
//!
//! [`update`](DeserializerRegistry::update) overwrites or, given `None`, removes an entry.
//! It is used by tests and for intentional rebinding.
//!
//! ## auto_register
//!
//! See [`DeserializerRegistry::auto_register`] .
//!
//! We use [`inventory`] crate to implement static registration,
//! not all platforms support it (although major platforms do).
//!
//! [`auto_register!`]: crate::auto_register
//! [`inventory`]: https://docs.rs/inventory

// -----------------------------------------------------------------------------
// Modules

mod auto_register;
mod deserializer_registry;
mod global;

// -----------------------------------------------------------------------------
// Exports

pub use auto_register::AutoRegistration;
pub use deserializer_registry::DeserializerRegistry;
pub use global::{get_deserializer, global, register_deserializer, update_deserializer};
