use std::collections::hash_map::Entry;

use fxhash::FxHashMap;

use super::error::EpicsError;
use super::facility::EpicsStore;
use super::record::{Record, RecordValue, Unit};

/// Dict-like view over the EPICS parameter store.
///
/// Translating every parameter up front is far too slow, so parameters are
/// decoded only when first requested and cached for the lifetime of the run.
/// The cache never evicts; EPICS values are slow-changing and treated as
/// constant within a run.
#[derive(Debug)]
pub struct EpicsDict<S: EpicsStore> {
    store: S,
    cache: FxHashMap<String, Record>,
    names: Option<Vec<String>>,
}

impl<S: EpicsStore> EpicsDict<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: FxHashMap::default(),
            names: None,
        }
    }

    /// Available EPICS names (PV names plus aliases), computed once
    pub fn keys(&mut self) -> &[String] {
        if self.names.is_none() {
            let mut names = self.store.pv_names();
            names.extend(self.store.aliases());
            self.names = Some(names);
        }
        self.names.as_deref().unwrap_or(&[])
    }

    pub fn len(&mut self) -> usize {
        self.keys().len()
    }

    pub fn is_empty(&mut self) -> bool {
        self.keys().is_empty()
    }

    /// Get-or-compute a parameter record.
    ///
    /// An unknown name fails with `KeyNotFound` and leaves the cache untouched.
    pub fn get(&mut self, name: &str) -> Result<&Record, EpicsError> {
        match self.cache.entry(name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(slot) => {
                let pv = self
                    .store
                    .fetch(name)
                    .ok_or_else(|| EpicsError::KeyNotFound(name.to_string()))?;
                Ok(slot.insert(Record::new(name, RecordValue::from(pv), Unit::Dimensionless)))
            }
        }
    }

    /// Number of parameters decoded so far
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}
