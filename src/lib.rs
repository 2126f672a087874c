#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use vc_dynamic as dynamic;
pub use vc_envelope as envelope;

pub use vc_envelope::{
    Deserializable, DeserializeFn, DeserializerRegistry, Envelope, Result, SerialError,
    Serializable, auto_register, copy, copy_value, decode_sequence, decode_with_type,
    encode_sequence, encode_with_type,
};

pub use vc_dynamic::{
    AnyRef, DecodeTarget, FromDecoded, decode_any, decode_any_with, encode_any, global, load_any,
    load_any_with, save_any,
};
