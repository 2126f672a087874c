#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

extern crate alloc;

// -----------------------------------------------------------------------------
// Modules

mod any;
mod io;
mod macros;
mod target;

pub mod primitives;

// -----------------------------------------------------------------------------
// Top-Level exports

pub use any::{AnyRef, decode_any, decode_any_with, encode_any, global};
pub use io::{load_any, load_any_with, save_any};
pub use primitives::{
    Bool, Bytes, Float32, Float32Slice, Float64, Float64Slice, Int, Int32, Int32Slice, Int64,
    Int64Slice, IntSlice, Text, register_builtins,
};
pub use target::{DecodeTarget, FromDecoded};
