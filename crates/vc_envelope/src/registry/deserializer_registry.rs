use alloc::boxed::Box;
use alloc::vec::Vec;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use foldhash::fast::FixedState;
use hashbrown::HashMap;

use crate::serializable::{DeserializeFn, Deserializable, deserialize_boxed};

// -----------------------------------------------------------------------------
// DeserializerRegistry

/// A fixed hash seed, so iteration order of a registry only depends on its content.
const FIXED_HASH_STATE: FixedState = FixedState::with_seed(0x5C2E_91A7_04D3_B86F);

type DeserializerTable = HashMap<Box<str>, DeserializeFn, FixedState>;

/// A registry of decode functions, keyed by type ID.
///
/// It is the only shared mutable state of the protocol. Readers (every decode)
/// take a shared lock, writers ([`register`], [`update`]) take an exclusive one,
/// and a finished write is visible to every later read.
///
/// The registry is usually owned by the hosting application and passed by reference
/// to the codec methods ([`decode_with_type`], [`decode_sequence`], ...).
/// [`global()`](crate::global) provides a default instance for convenience call sites.
///
/// # Example
///
/// ```
/// use vc_envelope::{DeserializerRegistry, Serializable, SerialError, Result, encode_with_type};
///
/// #[derive(Debug)]
/// struct Celsius(i8);
///
/// impl Serializable for Celsius {
///     fn serialize(&self) -> Result<Vec<u8>> { Ok(vec![self.0 as u8]) }
///     fn type_tag(&self) -> &str { "demo::Celsius" }
/// }
///
/// let registry = DeserializerRegistry::new();
/// let data = encode_with_type(&Celsius(-4)).unwrap();
///
/// let err = registry.decode_with_type(&data).unwrap_err();
/// assert!(matches!(err, SerialError::UnregisteredType(_)));
///
/// registry.register("demo::Celsius", |data| match data {
///     [raw] => Ok(Box::new(Celsius(*raw as i8))),
///     _ => Err(SerialError::msg("expected a single byte")),
/// });
///
/// let value = registry.decode_with_type(&data).unwrap();
/// assert_eq!(value.downcast_ref::<Celsius>().unwrap().0, -4);
/// ```
///
/// [`register`]: Self::register
/// [`update`]: Self::update
/// [`decode_with_type`]: Self::decode_with_type
/// [`decode_sequence`]: Self::decode_sequence
pub struct DeserializerRegistry {
    table: RwLock<DeserializerTable>,
}

impl Default for DeserializerRegistry {
    /// See [`DeserializerRegistry::new`] .
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl DeserializerRegistry {
    /// Create an empty [`DeserializerRegistry`].
    ///
    /// Use [`auto_register`](Self::auto_register) to fill it with the statically submitted types.
    #[inline]
    pub fn new() -> Self {
        Self {
            table: RwLock::new(HashMap::with_hasher(FIXED_HASH_STATE)),
        }
    }

    /// Takes a read lock on the underlying table.
    ///
    /// Writers never leave the table half-updated, so a poisoned lock is still consistent.
    fn read(&self) -> RwLockReadGuard<'_, DeserializerTable> {
        self.table.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Takes a write lock on the underlying table.
    fn write(&self) -> RwLockWriteGuard<'_, DeserializerTable> {
        self.table.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the decode function currently registered for `type_tag`.
    ///
    /// If the type ID has not been registered, returns `None`.
    #[inline]
    pub fn get(&self, type_tag: &str) -> Option<DeserializeFn> {
        self.read().get(type_tag).copied()
    }

    /// Whether a decode function is registered for `type_tag`.
    #[inline]
    pub fn contains(&self, type_tag: &str) -> bool {
        self.read().contains_key(type_tag)
    }

    /// Installs, replaces or removes the entry of `type_tag`.
    ///
    /// Passing `None` removes the type ID from the table,
    /// allowing [`register`](Self::register) to be called again.
    pub fn update(&self, type_tag: &str, func: Option<DeserializeFn>) {
        let mut table = self.write();
        match func {
            Some(func) => {
                if table.insert(type_tag.into(), func).is_some() {
                    log::debug!("replaced deserializer of type ID `{type_tag}`");
                } else {
                    log::trace!("registered deserializer of type ID `{type_tag}`");
                }
            }
            None => {
                if table.remove(type_tag).is_some() {
                    log::debug!("removed deserializer of type ID `{type_tag}`");
                }
            }
        }
    }

    /// Like [`update`](Self::update), but panics if the type ID is already in use.
    ///
    /// # Panics
    ///
    /// Panics if `type_tag` is already registered. Reusing a type ID is a
    /// programming error rather than a data problem.
    #[track_caller]
    pub fn register(&self, type_tag: &str, func: DeserializeFn) {
        let mut table = self.write();
        if table.contains_key(type_tag) {
            // Release the lock first so the panic does not poison it.
            drop(table);
            duplicate_registration(type_tag);
        }
        table.insert(type_tag.into(), func);
        log::trace!("registered deserializer of type ID `{type_tag}`");
    }

    /// Registers the [`Deserializable`] type `T` under [`T::TYPE_TAG`](Deserializable::TYPE_TAG).
    ///
    /// # Panics
    ///
    /// Panics if the type ID is already in use, see [`register`](Self::register).
    #[track_caller]
    #[inline]
    pub fn register_type<T: Deserializable>(&self) {
        self.register(T::TYPE_TAG, deserialize_boxed::<T>);
    }

    /// Installs or replaces the entry of the [`Deserializable`] type `T`.
    #[inline]
    pub fn update_type<T: Deserializable>(&self) {
        self.update(T::TYPE_TAG, Some(deserialize_boxed::<T>));
    }

    /// Number of registered type IDs.
    #[inline]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Whether no type ID is registered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// A sorted snapshot of the registered type IDs.
    pub fn type_tags(&self) -> Vec<Box<str>> {
        let mut tags: Vec<Box<str>> = self.read().keys().cloned().collect();
        tags.sort_unstable();
        tags
    }

    /// Registers every type submitted through [`auto_register!`](crate::auto_register)
    /// that is not present yet.
    ///
    /// Repeated calls are cheap and will not overwrite existing entries,
    /// including entries installed by hand.
    ///
    /// ## Return Value
    ///
    /// Returns `true` if static registration is available, otherwise `false`.
    ///
    /// ## Feature Dependency
    ///
    /// This method requires the `auto_register` feature. When disabled, it does nothing and
    /// returns `false`.
    ///
    /// # Panics
    ///
    /// Panics if two static submissions share a type ID.
    pub fn auto_register(&self) -> bool {
        #[cfg(feature = "auto_register")]
        {
            let mut seen = hashbrown::HashSet::with_hasher(FIXED_HASH_STATE);
            let mut table = self.write();
            let mut added = 0_usize;

            for entry in super::auto_register::submissions() {
                if !seen.insert(entry.type_tag()) {
                    drop(table);
                    duplicate_registration(entry.type_tag());
                }
                if !table.contains_key(entry.type_tag()) {
                    table.insert(entry.type_tag().into(), entry.func());
                    added += 1;
                }
            }

            log::debug!("auto-registered {added} deserializers");
            true
        }

        #[cfg(not(feature = "auto_register"))]
        {
            false
        }
    }
}

#[cold]
#[inline(never)]
#[track_caller]
fn duplicate_registration(type_tag: &str) -> ! {
    panic!("type ID already in use: {type_tag}");
}

impl core::fmt::Debug for DeserializerRegistry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.type_tags()).finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::format;
    use alloc::vec::Vec;

    use super::DeserializerRegistry;
    use crate::error::{Result, SerialError};
    use crate::serializable::{Deserializable, Serializable};

    #[derive(Debug, PartialEq)]
    struct Marker(u8);

    impl Serializable for Marker {
        fn serialize(&self) -> Result<Vec<u8>> {
            Ok(alloc::vec![self.0])
        }

        fn type_tag(&self) -> &str {
            Self::TYPE_TAG
        }
    }

    impl Deserializable for Marker {
        const TYPE_TAG: &'static str = "tests::Marker";

        fn deserialize(data: &[u8]) -> Result<Self> {
            match data {
                [raw] => Ok(Marker(*raw)),
                _ => Err(SerialError::msg("marker is one byte")),
            }
        }
    }

    fn always_zero(_: &[u8]) -> Result<Box<dyn Serializable>> {
        Ok(Box::new(Marker(0)))
    }

    #[test]
    fn update_installs_and_removes() {
        let registry = DeserializerRegistry::new();
        assert!(registry.get("tests::Marker").is_none());
        assert!(registry.is_empty());

        registry.update_type::<Marker>();
        let func = registry.get("tests::Marker").unwrap();
        assert_eq!(func(&[9]).unwrap().take::<Marker>().unwrap(), Marker(9));

        registry.update("tests::Marker", Some(always_zero));
        let func = registry.get("tests::Marker").unwrap();
        assert_eq!(func(&[9]).unwrap().take::<Marker>().unwrap(), Marker(0));

        registry.update("tests::Marker", None);
        assert!(!registry.contains("tests::Marker"));

        // Removing frees the type ID for `register`.
        registry.register_type::<Marker>();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    #[should_panic(expected = "type ID already in use: tests::Marker")]
    fn register_twice_panics() {
        let registry = DeserializerRegistry::new();
        registry.register_type::<Marker>();
        registry.register("tests::Marker", always_zero);
    }

    #[test]
    fn registry_usable_after_duplicate_panic() {
        let registry = DeserializerRegistry::new();
        registry.register_type::<Marker>();

        let result = std::panic::catch_unwind(core::panic::AssertUnwindSafe(|| {
            registry.register_type::<Marker>();
        }));
        assert!(result.is_err());
        assert!(registry.contains("tests::Marker"));
    }

    #[test]
    fn debug_lists_sorted_tags() {
        let registry = DeserializerRegistry::new();
        registry.update("b", Some(always_zero));
        registry.update("a", Some(always_zero));
        assert_eq!(format!("{registry:?}"), r#"{"a", "b"}"#);
    }

    #[test]
    fn concurrent_get_observes_old_or_new() {
        fn one(_: &[u8]) -> Result<Box<dyn Serializable>> {
            Ok(Box::new(Marker(1)))
        }
        fn two(_: &[u8]) -> Result<Box<dyn Serializable>> {
            Ok(Box::new(Marker(2)))
        }

        let registry = DeserializerRegistry::new();
        registry.update("tests::Marker", Some(one));

        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..1_000 {
                        let func = registry.get("tests::Marker").unwrap();
                        let value = func(&[]).unwrap().take::<Marker>().unwrap();
                        assert!(value == Marker(1) || value == Marker(2));
                    }
                });
            }
            scope.spawn(|| {
                for i in 0..1_000 {
                    let func = if i % 2 == 0 { two } else { one };
                    registry.update("tests::Marker", Some(func));
                }
            });
        });

        assert_eq!(registry.len(), 1);
    }
}
