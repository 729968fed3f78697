// In: src/pointer_table.rs

//! The opaque-handle registry.
//!
//! The C ABI never hands out addresses. Every estimator and transformer lives
//! in a `PointerTable`, boxed and type-erased, under a random non-zero `Handle`.
//! Lookups restore the concrete type with a checked downcast, so a handle that
//! names a different kind of object fails with an error instead of aliasing it.
//! The table owns what it stores: removing a handle drops the object.

use hashbrown::HashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::any::{type_name, Any};

use crate::error::FeaturizerError;

pub type Handle = u64;

/// The reserved "no object" handle; never issued by `add`.
pub const INVALID_HANDLE: Handle = 0;

struct Entry {
    type_name: &'static str,
    object: Box<dyn Any + Send>,
}

pub struct PointerTable {
    entries: HashMap<Handle, Entry>,
    rng: StdRng,
}

impl PointerTable {
    /// Creates an empty table. A `seed` makes the handle sequence reproducible.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            entries: HashMap::new(),
            rng,
        }
    }

    /// Registers a type-erased object. `None` is the null reference and is rejected.
    pub fn add_raw(
        &mut self,
        object: Option<Box<dyn Any + Send>>,
        type_name: &'static str,
    ) -> Result<Handle, FeaturizerError> {
        let object = object.ok_or_else(|| {
            FeaturizerError::invalid_argument("Trying to add a null pointer to the table")
        })?;

        let handle = loop {
            let candidate: Handle = self.rng.random_range(1..=Handle::MAX);
            if !self.entries.contains_key(&candidate) {
                break candidate;
            }
        };

        self.entries.insert(handle, Entry { type_name, object });
        log_event!("event" = "handle_added", "handle" = handle, "type" = type_name);
        Ok(handle)
    }

    pub fn add<T: Any + Send>(&mut self, object: T) -> Result<Handle, FeaturizerError> {
        self.add_raw(Some(Box::new(object)), type_name::<T>())
    }

    fn entry(&self, handle: Handle) -> Result<&Entry, FeaturizerError> {
        check_non_zero(handle)?;
        self.entries.get(&handle).ok_or_else(|| not_found(handle))
    }

    pub fn get<T: Any>(&self, handle: Handle) -> Result<&T, FeaturizerError> {
        let entry = self.entry(handle)?;
        entry
            .object
            .downcast_ref::<T>()
            .ok_or_else(|| type_mismatch::<T>(handle, entry.type_name))
    }

    pub fn get_mut<T: Any>(&mut self, handle: Handle) -> Result<&mut T, FeaturizerError> {
        check_non_zero(handle)?;
        let entry = self
            .entries
            .get_mut(&handle)
            .ok_or_else(|| not_found(handle))?;
        let stored = entry.type_name;
        entry
            .object
            .downcast_mut::<T>()
            .ok_or_else(|| type_mismatch::<T>(handle, stored))
    }

    /// Erases the entry and drops the object. The handle may be reissued later.
    pub fn remove(&mut self, handle: Handle) -> Result<(), FeaturizerError> {
        check_non_zero(handle)?;
        self.entries
            .remove(&handle)
            .ok_or_else(|| not_found(handle))?;
        log_event!("event" = "handle_removed", "handle" = handle);
        Ok(())
    }

    /// Like `remove`, but checks the type first and hands the object back.
    /// On a type mismatch the entry stays registered.
    pub fn take<T: Any>(&mut self, handle: Handle) -> Result<T, FeaturizerError> {
        let entry = self.entry(handle)?;
        if !entry.object.is::<T>() {
            return Err(type_mismatch::<T>(handle, entry.type_name));
        }
        let entry = self
            .entries
            .remove(&handle)
            .ok_or_else(|| not_found(handle))?;
        entry
            .object
            .downcast::<T>()
            .map(|boxed| *boxed)
            .map_err(|_| FeaturizerError::Internal("downcast failed after type check".into()))
    }

    pub fn contains(&self, handle: Handle) -> bool {
        handle != INVALID_HANDLE && self.entries.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl std::fmt::Debug for PointerTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PointerTable")
            .field("len", &self.entries.len())
            .finish()
    }
}

fn check_non_zero(handle: Handle) -> Result<(), FeaturizerError> {
    if handle == INVALID_HANDLE {
        return Err(FeaturizerError::invalid_argument("handle cannot be zero"));
    }
    Ok(())
}

fn not_found(handle: Handle) -> FeaturizerError {
    FeaturizerError::NotFound(format!("handle not found: {}", handle))
}

fn type_mismatch<T>(handle: Handle, stored: &'static str) -> FeaturizerError {
    FeaturizerError::InvalidArgument(format!(
        "handle {} refers to a {}, not a {}",
        handle,
        stored,
        type_name::<T>()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_get_remove_round_trip() {
        let mut table = PointerTable::new(Some(1));
        let handle = table.add(String::from("estimator")).unwrap();
        assert_ne!(handle, INVALID_HANDLE);
        assert_eq!(table.get::<String>(handle).unwrap(), "estimator");

        table.get_mut::<String>(handle).unwrap().push('!');
        assert_eq!(table.get::<String>(handle).unwrap(), "estimator!");

        table.remove(handle).unwrap();
        assert!(!table.contains(handle));
        assert!(matches!(
            table.get::<String>(handle),
            Err(FeaturizerError::NotFound(_))
        ));
        assert!(matches!(table.remove(handle), Err(FeaturizerError::NotFound(_))));
    }

    #[test]
    fn test_zero_handle_is_always_rejected() {
        let mut table = PointerTable::new(Some(2));
        table.add(1u32).unwrap();
        let err = table.get::<u32>(INVALID_HANDLE).unwrap_err();
        assert!(err.to_string().contains("handle cannot be zero"));
        let err = table.remove(INVALID_HANDLE).unwrap_err();
        assert!(err.to_string().contains("handle cannot be zero"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_null_is_rejected_and_table_unchanged() {
        let mut table = PointerTable::new(Some(3));
        let err = table.add_raw(None, "nothing").unwrap_err();
        assert!(matches!(err, FeaturizerError::InvalidArgument(_)));
        assert!(err.to_string().contains("null pointer"));
        assert!(table.is_empty());
    }

    #[test]
    fn test_type_mismatch_is_checked() {
        let mut table = PointerTable::new(Some(4));
        let handle = table.add(7i64).unwrap();
        assert!(matches!(
            table.get::<u8>(handle),
            Err(FeaturizerError::InvalidArgument(_))
        ));
        assert!(table.take::<u8>(handle).is_err());
        assert!(table.contains(handle));
        assert_eq!(table.take::<i64>(handle).unwrap(), 7);
        assert!(table.is_empty());
    }

    #[test]
    fn test_handles_are_unique_and_seed_reproducible() {
        let mut a = PointerTable::new(Some(42));
        let mut b = PointerTable::new(Some(42));
        let mut seen = std::collections::HashSet::new();
        for i in 0..1000u32 {
            let ha = a.add(i).unwrap();
            let hb = b.add(i).unwrap();
            assert_eq!(ha, hb);
            assert!(seen.insert(ha));
        }
        assert_eq!(a.len(), 1000);
    }

    #[test]
    fn test_remove_drops_the_object() {
        use std::sync::atomic::{AtomicUsize, Ordering};
        use std::sync::Arc;

        struct Probe(Arc<AtomicUsize>);
        impl Drop for Probe {
            fn drop(&mut self) {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }

        let drops = Arc::new(AtomicUsize::new(0));
        let mut table = PointerTable::new(None);
        let handle = table.add(Probe(drops.clone())).unwrap();
        assert_eq!(drops.load(Ordering::SeqCst), 0);
        table.remove(handle).unwrap();
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }
}
