//! Session-scoped data object store
//!
//! Owns every live data object, tracks reference counts, and arbitrates
//! output ownership. Objects may be shared read-only across any number of
//! input parameters, but only one execution at a time may hold an object as
//! its output target; a second claim fails fast with `ObjectBusy` instead of
//! blocking.

use super::object::{DataKind, DataObject, ObjectId};
use crate::error::{Result, TellusError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Shared handle to a live data object
pub type SharedObject = Arc<Mutex<DataObject>>;

struct StoreEntry {
    object: SharedObject,
    refs: usize,
}

/// Container for the data objects of one session
#[derive(Default)]
pub struct DataStore {
    inner: Mutex<StoreInner>,
}

#[derive(Default)]
struct StoreInner {
    objects: HashMap<ObjectId, StoreEntry>,
    output_claims: HashSet<ObjectId>,
}

impl DataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh object of the given kind and take ownership of it
    pub fn create(&self, kind: DataKind) -> SharedObject {
        self.insert(DataObject::new(kind))
    }

    /// Insert an existing object, starting its reference count at one
    pub fn insert(&self, object: DataObject) -> SharedObject {
        let id = object.id();
        let shared = Arc::new(Mutex::new(object));
        let mut inner = self.lock();
        inner.objects.insert(
            id,
            StoreEntry {
                object: Arc::clone(&shared),
                refs: 1,
            },
        );
        shared
    }

    /// Look up an object by identifier
    pub fn get(&self, id: ObjectId) -> Option<SharedObject> {
        self.lock().objects.get(&id).map(|e| Arc::clone(&e.object))
    }

    /// Kind of an object, without handing out the handle
    pub fn kind_of(&self, id: ObjectId) -> Option<DataKind> {
        self.get(id)
            .and_then(|object| object.lock().ok().map(|o| o.kind()))
    }

    /// Take an additional reference
    pub fn retain(&self, id: ObjectId) -> Result<()> {
        let mut inner = self.lock();
        match inner.objects.get_mut(&id) {
            Some(entry) => {
                entry.refs += 1;
                Ok(())
            }
            None => Err(TellusError::ObjectNotFound(id.to_string())),
        }
    }

    /// Drop one reference; the object is destroyed at zero, unless an
    /// output claim still pins it
    pub fn release(&self, id: ObjectId) -> Result<()> {
        let mut inner = self.lock();
        let entry = inner
            .objects
            .get_mut(&id)
            .ok_or_else(|| TellusError::ObjectNotFound(id.to_string()))?;
        entry.refs = entry.refs.saturating_sub(1);
        if entry.refs == 0 && !inner.output_claims.contains(&id) {
            inner.objects.remove(&id);
        }
        Ok(())
    }

    /// Claim exclusive output ownership of an object
    ///
    /// Mutually exclusive across concurrent executions: an object already
    /// claimed yields `ObjectBusy` immediately.
    pub fn claim_output(&self, id: ObjectId) -> Result<()> {
        let mut inner = self.lock();
        if !inner.objects.contains_key(&id) {
            return Err(TellusError::ObjectNotFound(id.to_string()));
        }
        if !inner.output_claims.insert(id) {
            return Err(TellusError::ObjectBusy(id.to_string()));
        }
        Ok(())
    }

    /// Release an output claim taken with [`claim_output`](Self::claim_output)
    pub fn release_output(&self, id: ObjectId) {
        let mut inner = self.lock();
        inner.output_claims.remove(&id);
        let drop_it = matches!(inner.objects.get(&id), Some(entry) if entry.refs == 0);
        if drop_it {
            inner.objects.remove(&id);
        }
    }

    /// Number of live objects
    pub fn len(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().objects.is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        // Poisoning only happens if a holder panicked; the registry data
        // itself stays consistent, so keep going with the inner state.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_destroys_at_zero() {
        let store = DataStore::new();
        let object = store.create(DataKind::Grid);
        let id = object.lock().unwrap().id();

        store.retain(id).unwrap();
        store.release(id).unwrap();
        assert!(store.get(id).is_some());

        store.release(id).unwrap();
        assert!(store.get(id).is_none());
    }

    #[test]
    fn output_claim_is_exclusive() {
        let store = DataStore::new();
        let object = store.create(DataKind::Table);
        let id = object.lock().unwrap().id();

        store.claim_output(id).unwrap();
        assert!(matches!(
            store.claim_output(id),
            Err(TellusError::ObjectBusy(_))
        ));

        store.release_output(id);
        store.claim_output(id).unwrap();
    }

    #[test]
    fn claim_pins_object_until_released() {
        let store = DataStore::new();
        let object = store.create(DataKind::Shapes);
        let id = object.lock().unwrap().id();

        store.claim_output(id).unwrap();
        store.release(id).unwrap();
        // Still reachable: the output claim pins it.
        assert!(store.get(id).is_some());

        store.release_output(id);
        assert!(store.get(id).is_none());
    }

    #[test]
    fn claim_on_unknown_object_fails() {
        let store = DataStore::new();
        assert!(matches!(
            store.claim_output(ObjectId::new()),
            Err(TellusError::ObjectNotFound(_))
        ));
    }
}
