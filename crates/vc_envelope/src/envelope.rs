use alloc::boxed::Box;
use alloc::string::String;
use alloc::vec::Vec;

use crate::error::{Result, SerialError};
use crate::registry::{DeserializerRegistry, global};
use crate::serializable::Serializable;

/// Size of the little-endian `u32` prefix holding the type ID length.
pub const TYPE_TAG_PREFIX: usize = size_of::<u32>();

// -----------------------------------------------------------------------------
// Envelope

/// A borrowed view of an encoded envelope: `u32(len) type_id payload`.
///
/// Parsing needs no registry, which makes it possible to inspect the
/// type ID of a blob before (or without) decoding it.
///
/// # Examples
///
/// ```
/// use vc_envelope::Envelope;
///
/// let data = [3, 0, 0, 0, b'a', b'b', b'c', 0xFF];
/// let envelope = Envelope::parse(&data).unwrap();
///
/// assert_eq!(envelope.type_tag(), Some("abc"));
/// assert_eq!(envelope.payload(), [0xFF]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Envelope<'a> {
    type_tag: &'a [u8],
    payload: &'a [u8],
}

impl<'a> Envelope<'a> {
    /// Splits `data` into type ID and payload.
    ///
    /// The payload is everything after the type ID; its end is not encoded
    /// in the envelope itself.
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        let Some((len, rest)) = data.split_first_chunk::<TYPE_TAG_PREFIX>() else {
            return Err(SerialError::BufferUnderflow {
                needed: TYPE_TAG_PREFIX as u64,
                available: data.len(),
            });
        };

        let len = u32::from_le_bytes(*len);
        let Some((type_tag, payload)) = rest.split_at_checked(len as usize) else {
            return Err(SerialError::BufferUnderflow {
                needed: TYPE_TAG_PREFIX as u64 + u64::from(len),
                available: data.len(),
            });
        };

        Ok(Self { type_tag, payload })
    }

    /// The type ID, or `None` if it is not valid UTF-8.
    #[inline]
    pub fn type_tag(&self) -> Option<&'a str> {
        core::str::from_utf8(self.type_tag).ok()
    }

    /// The raw bytes of the type ID.
    #[inline]
    pub fn type_tag_bytes(&self) -> &'a [u8] {
        self.type_tag
    }

    /// The payload handed to the decode function.
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        self.payload
    }

    /// Total encoded size of the envelope.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        TYPE_TAG_PREFIX + self.type_tag.len() + self.payload.len()
    }
}

// -----------------------------------------------------------------------------
// Encoding

/// Appends the envelope of `value` to `out` and returns its length.
///
/// On error, `out` may hold a partially written envelope.
pub fn write_envelope(value: &dyn Serializable, out: &mut Vec<u8>) -> Result<usize> {
    let payload = value.serialize()?;
    let type_tag = value.type_tag().as_bytes();
    let Ok(tag_len) = u32::try_from(type_tag.len()) else {
        return Err(SerialError::TypeTagTooLong(type_tag.len()));
    };

    let len = TYPE_TAG_PREFIX + type_tag.len() + payload.len();
    out.reserve(len);

    let start = out.len();
    out.extend_from_slice(&tag_len.to_le_bytes());
    out.extend_from_slice(type_tag);
    out.extend_from_slice(&payload);

    if cfg!(feature = "debug") {
        debug_assert_eq!(out.len() - start, len, "envelope must not be padded");
    }

    Ok(len)
}

/// Encodes `value` together with its type ID.
///
/// The output is exactly `4 + len(type ID) + len(payload)` bytes.
/// Encoding never consults a registry.
///
/// This is meant to be used with [`decode_with_type`].
pub fn encode_with_type(value: &dyn Serializable) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    write_envelope(value, &mut out)?;
    Ok(out)
}

// -----------------------------------------------------------------------------
// Decoding

impl DeserializerRegistry {
    /// Decodes an envelope produced by [`encode_with_type`].
    ///
    /// The type ID is looked up in this registry and its decode function
    /// receives every byte after the header. Errors of the decode function
    /// are returned unchanged.
    pub fn decode_with_type(&self, data: &[u8]) -> Result<Box<dyn Serializable>> {
        self.decode_envelope(Envelope::parse(data)?)
    }

    /// Decodes an already parsed [`Envelope`].
    pub fn decode_envelope(&self, envelope: Envelope<'_>) -> Result<Box<dyn Serializable>> {
        let func = envelope.type_tag().and_then(|type_tag| self.get(type_tag));
        match func {
            Some(func) => func(envelope.payload()),
            None => {
                let type_tag = String::from_utf8_lossy(envelope.type_tag_bytes());
                log::warn!("no deserializer registered for type ID `{type_tag}`");
                Err(SerialError::UnregisteredType(type_tag.into()))
            }
        }
    }

    /// Decodes an envelope and downcasts the result to `T`.
    ///
    /// Fails with [`SerialError::UnexpectedType`] if the registered decode function
    /// produced another type.
    pub fn decode_as<T: Serializable>(&self, data: &[u8]) -> Result<T> {
        self.decode_with_type(data)?
            .take::<T>()
            .map_err(|value| SerialError::UnexpectedType {
                expected: core::any::type_name::<T>(),
                actual: value.type_name(),
            })
    }
}

/// [`DeserializerRegistry::decode_with_type`] on the [`global`] registry.
#[inline]
pub fn decode_with_type(data: &[u8]) -> Result<Box<dyn Serializable>> {
    global().decode_with_type(data)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::{String, ToString};
    use alloc::vec::Vec;

    use super::{Envelope, encode_with_type};
    use crate::error::{Result, SerialError};
    use crate::registry::DeserializerRegistry;
    use crate::serializable::{Deserializable, Serializable};

    #[derive(Debug, Clone, PartialEq)]
    struct Label(String);

    impl Serializable for Label {
        fn serialize(&self) -> Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }

        fn type_tag(&self) -> &str {
            Self::TYPE_TAG
        }
    }

    impl Deserializable for Label {
        const TYPE_TAG: &'static str = "tests::Label";

        fn deserialize(data: &[u8]) -> Result<Self> {
            String::from_utf8(data.to_vec())
                .map(Label)
                .map_err(SerialError::custom)
        }
    }

    #[derive(Debug)]
    struct Broken;

    impl Serializable for Broken {
        fn serialize(&self) -> Result<Vec<u8>> {
            Err(SerialError::msg("nested value is not encodable"))
        }

        fn type_tag(&self) -> &str {
            "tests::Broken"
        }
    }

    fn registry() -> DeserializerRegistry {
        let registry = DeserializerRegistry::new();
        registry.register_type::<Label>();
        registry
    }

    #[test]
    fn layout_is_exact() {
        let data = encode_with_type(&Label("hi".into())).unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(&12_u32.to_le_bytes());
        expected.extend_from_slice(b"tests::Label");
        expected.extend_from_slice(b"hi");
        assert_eq!(data, expected);
        assert_eq!(data.len(), 4 + 12 + 2);
    }

    #[test]
    fn round_trip() {
        let value = Label("hello, world".into());
        let data = encode_with_type(&value).unwrap();

        let decoded = registry().decode_with_type(&data).unwrap();
        assert_eq!(decoded.type_tag(), "tests::Label");
        assert_eq!(decoded.take::<Label>().unwrap(), value);

        assert_eq!(registry().decode_as::<Label>(&data).unwrap(), value);
    }

    #[test]
    fn empty_type_tag_and_payload() {
        let envelope = Envelope::parse(&[0, 0, 0, 0]).unwrap();
        assert_eq!(envelope.type_tag(), Some(""));
        assert!(envelope.payload().is_empty());
        assert_eq!(envelope.encoded_len(), 4);
    }

    #[test]
    fn short_header_underflows() {
        let err = Envelope::parse(&[1, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            SerialError::BufferUnderflow { needed: 4, available: 3 }
        ));
    }

    #[test]
    fn truncated_type_tag_underflows() {
        let data = encode_with_type(&Label(String::new())).unwrap();
        for cut in 0..data.len() {
            let err = registry().decode_with_type(&data[..cut]).unwrap_err();
            assert!(
                matches!(err, SerialError::BufferUnderflow { .. }),
                "cut at {cut}: {err}"
            );
        }
    }

    #[test]
    fn unregistered_then_registered() {
        let data = encode_with_type(&Label("x".into())).unwrap();
        let registry = DeserializerRegistry::new();

        let err = registry.decode_with_type(&data).unwrap_err();
        assert!(matches!(&err, SerialError::UnregisteredType(tag) if &**tag == "tests::Label"));

        registry.register_type::<Label>();
        assert!(registry.decode_with_type(&data).is_ok());
    }

    #[test]
    fn non_utf8_type_tag_is_unregistered() {
        let data = [2, 0, 0, 0, 0xFF, 0xFE];
        let err = registry().decode_with_type(&data).unwrap_err();
        assert!(matches!(err, SerialError::UnregisteredType(_)));
    }

    #[test]
    fn decode_errors_pass_through() {
        let mut data = Vec::new();
        data.extend_from_slice(&12_u32.to_le_bytes());
        data.extend_from_slice(b"tests::Label");
        data.push(0xFF);

        let err = registry().decode_with_type(&data).unwrap_err();
        assert!(matches!(err, SerialError::Custom(_)));
    }

    #[test]
    fn encode_errors_pass_through() {
        let err = encode_with_type(&Broken).unwrap_err();
        assert_eq!(err.to_string(), "nested value is not encodable");
    }

    #[test]
    fn decode_as_wrong_type() {
        fn other(_: &[u8]) -> Result<Box<dyn Serializable>> {
            Ok(Box::new(Broken))
        }

        let registry = DeserializerRegistry::new();
        registry.update("tests::Label", Some(other));

        let data = encode_with_type(&Label("x".into())).unwrap();
        let err = registry.decode_as::<Label>(&data).unwrap_err();
        assert!(matches!(err, SerialError::UnexpectedType { actual, .. } if actual.ends_with("Broken")));
        assert!(!err.to_string().contains("element"));
    }
}
