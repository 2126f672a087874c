use alloc::boxed::Box;
use alloc::vec::Vec;
use core::iter::FusedIterator;

use crate::envelope::write_envelope;
use crate::error::{Result, SerialError};
use crate::registry::{DeserializerRegistry, global};
use crate::serializable::Serializable;

/// Size of the little-endian `u64` prefix holding each envelope length.
pub const ELEMENT_PREFIX: usize = size_of::<u64>();

// -----------------------------------------------------------------------------
// SequenceFrames

/// Iterator over the raw envelopes of an encoded sequence.
///
/// Each item is the exact byte range of one envelope. The scan is forward-only:
/// a framing error is yielded once, then the iterator is exhausted.
///
/// - A length prefix larger than the remaining bytes yields [`SerialError::BufferUnderflow`].
/// - Fewer than 8 trailing bytes yield [`SerialError::ResidualData`].
///
/// # Examples
///
/// ```
/// use vc_envelope::SequenceFrames;
///
/// let data = [2, 0, 0, 0, 0, 0, 0, 0, 0xAA, 0xBB, 0, 0, 0, 0, 0, 0, 0, 0];
/// let frames: Vec<_> = SequenceFrames::new(&data).collect::<Result<_, _>>().unwrap();
///
/// let expected: [&[u8]; 2] = [&[0xAA, 0xBB], &[]];
/// assert_eq!(frames, expected);
/// ```
#[derive(Debug, Clone)]
pub struct SequenceFrames<'a> {
    remaining: &'a [u8],
    failed: bool,
}

impl<'a> SequenceFrames<'a> {
    #[inline]
    pub const fn new(data: &'a [u8]) -> Self {
        Self {
            remaining: data,
            failed: false,
        }
    }

    /// The bytes not consumed yet.
    #[inline]
    pub const fn remaining(&self) -> &'a [u8] {
        self.remaining
    }
}

impl<'a> Iterator for SequenceFrames<'a> {
    type Item = Result<&'a [u8]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.remaining.is_empty() {
            return None;
        }

        let Some((len, rest)) = self.remaining.split_first_chunk::<ELEMENT_PREFIX>() else {
            self.failed = true;
            return Some(Err(SerialError::ResidualData(self.remaining.len())));
        };

        let len = u64::from_le_bytes(*len);
        let frame = usize::try_from(len)
            .ok()
            .and_then(|len| rest.split_at_checked(len));

        match frame {
            Some((frame, rest)) => {
                self.remaining = rest;
                Some(Ok(frame))
            }
            None => {
                self.failed = true;
                Some(Err(SerialError::BufferUnderflow {
                    needed: len,
                    available: rest.len(),
                }))
            }
        }
    }
}

impl FusedIterator for SequenceFrames<'_> {}

// -----------------------------------------------------------------------------
// Encoding

/// Encodes values as consecutive envelopes, each prefixed by its length.
///
/// An empty input produces an empty output.
/// A failing element is reported as [`SerialError::Element`].
///
/// This is meant to be used with [`decode_sequence`].
pub fn encode_sequence(values: &[&dyn Serializable]) -> Result<Vec<u8>> {
    let mut out = Vec::new();

    for (index, value) in values.iter().enumerate() {
        let start = out.len();
        out.extend_from_slice(&[0; ELEMENT_PREFIX]);

        let len = write_envelope(*value, &mut out).map_err(|err| err.at(index))?;
        out[start..start + ELEMENT_PREFIX].copy_from_slice(&(len as u64).to_le_bytes());
    }

    Ok(out)
}

// -----------------------------------------------------------------------------
// Decoding

impl DeserializerRegistry {
    /// Decodes a sequence produced by [`encode_sequence`].
    ///
    /// The buffer must be consumed exactly: a truncated length prefix fails with
    /// [`SerialError::ResidualData`], a truncated envelope with [`SerialError::BufferUnderflow`].
    /// Errors of individual envelopes are reported as [`SerialError::Element`].
    ///
    /// # Examples
    ///
    /// ```
    /// use vc_envelope::{DeserializerRegistry, encode_sequence};
    ///
    /// let registry = DeserializerRegistry::new();
    /// let data = encode_sequence(&[]).unwrap();
    ///
    /// assert!(data.is_empty());
    /// assert!(registry.decode_sequence(&data).unwrap().is_empty());
    /// ```
    pub fn decode_sequence(&self, data: &[u8]) -> Result<Vec<Box<dyn Serializable>>> {
        let mut values = Vec::new();

        for (index, frame) in SequenceFrames::new(data).enumerate() {
            let value = self.decode_with_type(frame?).map_err(|err| err.at(index))?;
            values.push(value);
        }

        Ok(values)
    }
}

/// [`DeserializerRegistry::decode_sequence`] on the [`global`] registry.
#[inline]
pub fn decode_sequence(data: &[u8]) -> Result<Vec<Box<dyn Serializable>>> {
    global().decode_sequence(data)
}

// -----------------------------------------------------------------------------
// Tests
