// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Modelwire-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Modelwire and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::{BTreeMap, HashMap};

use crate::protocol::TypeDescriptor;

pub const DEFAULT_TYPE_CACHE_CAPACITY: usize = 100;

#[derive(Debug, Clone)]
struct Entry {
    stamp: u64,
    descriptor: Option<TypeDescriptor>,
}

/// Bounded least-recently-used cache of type lookups, keyed by the name exactly as the
/// caller asked for it.
///
/// A `None` entry records that the host does not know the type, so repeated misses do not
/// hit the wire again.
#[derive(Debug, Clone)]
pub struct TypeCache {
    capacity: usize,
    clock: u64,
    entries: HashMap<String, Entry>,
    recency: BTreeMap<u64, String>,
}

impl Default for TypeCache {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_CACHE_CAPACITY)
    }
}

impl TypeCache {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, clock: 0, entries: HashMap::new(), recency: BTreeMap::new() }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Looks up `type_name` and marks it most recently used. The outer `None` is a cache miss.
    pub fn get(&mut self, type_name: &str) -> Option<Option<TypeDescriptor>> {
        let stamp = self.tick();
        let entry = self.entries.get_mut(type_name)?;
        self.recency.remove(&entry.stamp);
        entry.stamp = stamp;
        self.recency.insert(stamp, type_name.to_owned());
        Some(entry.descriptor.clone())
    }

    pub fn insert(&mut self, type_name: impl Into<String>, descriptor: Option<TypeDescriptor>) {
        if self.capacity == 0 {
            return;
        }
        let type_name = type_name.into();
        let stamp = self.tick();
        if let Some(previous) = self.entries.insert(type_name.clone(), Entry { stamp, descriptor }) {
            self.recency.remove(&previous.stamp);
        }
        self.recency.insert(stamp, type_name);

        while self.entries.len() > self.capacity {
            let Some((_, evicted)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&evicted);
        }
    }

    pub fn invalidate(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::TypeKind;

    fn descriptor(name: &str) -> TypeDescriptor {
        TypeDescriptor {
            metamodel_uri: "urn:test".into(),
            type_name: name.into(),
            kind: TypeKind::Class,
            is_abstract: false,
            all_supertypes: Vec::new(),
        }
    }

    #[test]
    fn evicts_the_least_recently_used_entry() {
        let mut cache = TypeCache::new(2);
        cache.insert("A", Some(descriptor("a::A")));
        cache.insert("B", Some(descriptor("a::B")));
        assert!(cache.get("A").is_some());
        cache.insert("C", None);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("B").is_none(), "B was least recently used");
        assert_eq!(cache.get("A"), Some(Some(descriptor("a::A"))));
        assert_eq!(cache.get("C"), Some(None));
    }

    #[test]
    fn reinserting_refreshes_without_growing() {
        let mut cache = TypeCache::new(2);
        cache.insert("A", None);
        cache.insert("B", None);
        cache.insert("A", Some(descriptor("a::A")));
        cache.insert("C", None);

        assert_eq!(cache.len(), 2);
        assert!(cache.get("B").is_none());
        assert_eq!(cache.get("A"), Some(Some(descriptor("a::A"))));
    }

    #[test]
    fn invalidate_drops_everything() {
        let mut cache = TypeCache::default();
        assert_eq!(cache.capacity(), DEFAULT_TYPE_CACHE_CAPACITY);
        for i in 0..150 {
            cache.insert(format!("T{i}"), None);
        }
        assert_eq!(cache.len(), DEFAULT_TYPE_CACHE_CAPACITY);
        assert!(cache.get("T0").is_none());
        assert!(cache.get("T149").is_some());

        cache.invalidate();
        assert!(cache.is_empty());
    }

    #[test]
    fn zero_capacity_caches_nothing() {
        let mut cache = TypeCache::new(0);
        cache.insert("A", None);
        assert!(cache.is_empty());
        assert!(cache.get("A").is_none());
    }
}
