use std::fs;
use std::path::Path;

use vc_envelope::{DeserializerRegistry, Result};

use crate::any::{AnyRef, decode_any_with, encode_any, global};
use crate::target::DecodeTarget;

/// Encodes `values` with [`encode_any`] and writes them to `path`.
///
/// The file is created or truncated. It is created with the default
/// permissions of the platform.
///
/// # Examples
///
/// ```no_run
/// use vc_dynamic::{AnyRef, load_any, save_any};
///
/// save_any("scores.bin", &[AnyRef::from("alice"), AnyRef::from(&[3.5_f64, 4.0][..])]).unwrap();
///
/// let (mut name, mut scores) = (String::new(), Vec::<f64>::new());
/// load_any("scores.bin", &mut [&mut name, &mut scores]).unwrap();
/// ```
pub fn save_any(path: impl AsRef<Path>, values: &[AnyRef<'_>]) -> Result<()> {
    let path = path.as_ref();
    let data = encode_any(values)?;
    fs::write(path, &data)?;
    log::debug!("saved {} values ({} bytes) to {}", values.len(), data.len(), path.display());
    Ok(())
}

/// Reads `path` and decodes its content into `slots` through the
/// global registry.
///
/// See [`load_any_with`].
#[inline]
pub fn load_any(path: impl AsRef<Path>, slots: &mut [&mut dyn DecodeTarget]) -> Result<()> {
    load_any_with(global(), path, slots)
}

/// Reads `path` and decodes its content into `slots` with [`decode_any_with`].
///
/// Fails with [`SerialError::Io`](vc_envelope::SerialError::Io) if the file cannot be read.
pub fn load_any_with(
    registry: &DeserializerRegistry,
    path: impl AsRef<Path>,
    slots: &mut [&mut dyn DecodeTarget],
) -> Result<()> {
    let path = path.as_ref();
    let data = fs::read(path)?;
    log::debug!("loaded {} bytes from {}", data.len(), path.display());
    decode_any_with(registry, &data, slots)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::vec::Vec;

    use vc_envelope::{DeserializerRegistry, SerialError};

    use super::{load_any_with, save_any};
    use crate::any::AnyRef;
    use crate::primitives::register_builtins;

    fn registry() -> DeserializerRegistry {
        let registry = DeserializerRegistry::new();
        register_builtins(&registry);
        registry
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.bin");

        let weights = [0.25_f32, -1.0];
        save_any(&path, &[AnyRef::from("model"), AnyRef::from(&weights[..]), AnyRef::from(3_i32)]).unwrap();

        let (mut name, mut loaded, mut epoch) = (String::new(), Vec::<f32>::new(), 0_i32);
        load_any_with(&registry(), &path, &mut [&mut name, &mut loaded, &mut epoch]).unwrap();

        assert_eq!(name, "model");
        assert_eq!(loaded, weights);
        assert_eq!(epoch, 3);
    }

    #[test]
    fn save_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("values.bin");

        save_any(&path, &[AnyRef::from("a much longer first value")]).unwrap();
        save_any(&path, &[AnyRef::from(true)]).unwrap();

        let mut flag = false;
        load_any_with(&registry(), &path, &mut [&mut flag]).unwrap();
        assert!(flag);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut flag = false;

        let err = load_any_with(&registry(), dir.path().join("missing.bin"), &mut [&mut flag]).unwrap_err();
        assert!(matches!(err, SerialError::Io(_)));
    }
}
