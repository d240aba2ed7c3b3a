//! Key-to-type bindings for documents holding several collections.
//!
//! # Design
//! Each alias key is bound to a concrete entity type through a small
//! type-erased `Binding`. The transformer hands the binding the raw items it
//! found under the key; the binding decodes them as `Vec<T>` and boxes the
//! result. `EntityMap::get::<T>` downcasts back, so a lookup with the wrong
//! type yields `None` instead of a bad cast.

use std::any::{type_name, Any};
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::error::RestingError;
use crate::{json, xml};

/// Decodes the items of one collection into a boxed `Vec<T>`.
pub(crate) trait Binding {
    fn type_name(&self) -> &'static str;
    fn decode_json(&self, items: Vec<serde_json::Value>) -> Result<Entry, RestingError>;
    fn decode_xml(&self, fragments: &[String]) -> Result<Entry, RestingError>;
}

struct Typed<T>(PhantomData<fn() -> T>);

impl<T: DeserializeOwned + 'static> Binding for Typed<T> {
    fn type_name(&self) -> &'static str {
        type_name::<T>()
    }

    fn decode_json(&self, items: Vec<serde_json::Value>) -> Result<Entry, RestingError> {
        json::decode_items::<T>(items).map(Entry::new)
    }

    fn decode_xml(&self, fragments: &[String]) -> Result<Entry, RestingError> {
        xml::decode_fragments::<T>(fragments).map(Entry::new)
    }
}

/// Mapping from collection key to entity type.
#[derive(Default)]
pub struct Alias {
    bindings: BTreeMap<String, Box<dyn Binding>>,
}

impl Alias {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `key` to `T`, replacing any earlier binding for the key.
    pub fn insert<T: DeserializeOwned + 'static>(&mut self, key: impl Into<String>) -> &mut Self {
        self.bindings.insert(key.into(), Box::new(Typed::<T>(PhantomData)));
        self
    }

    /// Builder-style `insert`.
    pub fn bind<T: DeserializeOwned + 'static>(mut self, key: impl Into<String>) -> Self {
        self.insert::<T>(key);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.bindings.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub(crate) fn bindings(&self) -> impl Iterator<Item = (&str, &dyn Binding)> {
        self.bindings.iter().map(|(key, binding)| (key.as_str(), binding.as_ref()))
    }
}

impl fmt::Debug for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.bindings.iter().map(|(key, binding)| (key, binding.type_name())))
            .finish()
    }
}

/// One decoded collection.
pub(crate) struct Entry {
    items: Box<dyn Any>,
    len: usize,
}

impl Entry {
    fn new<T: 'static>(items: Vec<T>) -> Self {
        Self {
            len: items.len(),
            items: Box::new(items),
        }
    }
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry").field("len", &self.len).finish()
    }
}

/// Result of an alias transformation: one typed list per alias key.
#[derive(Default)]
pub struct EntityMap {
    entries: BTreeMap<String, Entry>,
}

impl EntityMap {
    pub(crate) fn insert(&mut self, key: &str, entry: Entry) {
        self.entries.insert(key.to_string(), entry);
    }

    /// Entities under `key`, if present and bound to `T`.
    pub fn get<T: 'static>(&self, key: &str) -> Option<&[T]> {
        self.entries
            .get(key)?
            .items
            .downcast_ref::<Vec<T>>()
            .map(Vec::as_slice)
    }

    /// Take the entities under `key`. Left in place when `T` does not match.
    pub fn remove<T: 'static>(&mut self, key: &str) -> Option<Vec<T>> {
        if !self.entries.get(key)?.items.is::<Vec<T>>() {
            return None;
        }
        let entry = self.entries.remove(key)?;
        entry.items.downcast::<Vec<T>>().ok().map(|items| *items)
    }

    /// Number of entities under `key`, whatever their type.
    pub fn count(&self, key: &str) -> Option<usize> {
        self.entries.get(key).map(|entry| entry.len)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for EntityMap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.entries.iter().map(|(key, entry)| (key, entry.len)))
            .finish()
    }
}
