#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

// -----------------------------------------------------------------------------
// Extern Self

// The `auto_register!` macro expands to `$crate` paths, and doc tests refer
// to the crate by name, so `vc_envelope` must also resolve inside the crate.
extern crate self as vc_envelope;

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod copy;
mod envelope;
mod sequence;
mod serializable;

pub mod error;
pub mod registry;

// -----------------------------------------------------------------------------
// Top-Level exports

#[doc(hidden)]
pub mod __macro_exports;

pub use copy::{copy, copy_value};
pub use envelope::{Envelope, TYPE_TAG_PREFIX, decode_with_type, encode_with_type, write_envelope};
pub use error::{Result, SerialError};
pub use registry::{DeserializerRegistry, global};
pub use sequence::{ELEMENT_PREFIX, SequenceFrames, decode_sequence, encode_sequence};
pub use serializable::{DeserializeFn, Deserializable, Serializable, deserialize_boxed};
