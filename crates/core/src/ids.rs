//! Interned identities for regions and acoustics.
//!
//! Biomes, block-effect categories and ambient sounds are compared by identity,
//! never by structure. Names are interned once into dense integer handles so the
//! hot scan/aggregate/reconcile loop only ever touches small `Copy` keys.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;

/// Handle types that can be allocated by an [`Interner`].
pub trait InternedId: Copy + Eq + Ord + fmt::Debug {
    /// Build a handle from its dense index.
    fn from_index(index: u32) -> Self;
    /// Dense index of this handle.
    fn index(self) -> u32;
}

/// Identity of a biome or block-effect category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RegionId(pub u32);

/// Identity of a playable ambient sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AcousticId(pub u32);

impl InternedId for RegionId {
    fn from_index(index: u32) -> Self {
        Self(index)
    }

    fn index(self) -> u32 {
        self.0
    }
}

impl InternedId for AcousticId {
    fn from_index(index: u32) -> Self {
        Self(index)
    }

    fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

impl fmt::Display for AcousticId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "acoustic#{}", self.0)
    }
}

/// Name table that hands out sequential handles.
///
/// The same name always maps to the same handle within one interner; handles
/// from different interners must not be mixed.
#[derive(Debug, Clone)]
pub struct Interner<Id> {
    names: Vec<String>,
    lookup: HashMap<String, u32>,
    _marker: PhantomData<Id>,
}

impl<Id: InternedId> Interner<Id> {
    /// Create an empty interner.
    pub fn new() -> Self {
        Self {
            names: Vec::new(),
            lookup: HashMap::new(),
            _marker: PhantomData,
        }
    }

    /// Return the handle for `name`, allocating one on first sight.
    pub fn intern(&mut self, name: &str) -> Id {
        let name = name.trim();
        if let Some(&index) = self.lookup.get(name) {
            return Id::from_index(index);
        }
        let index = self.names.len() as u32;
        self.names.push(name.to_string());
        self.lookup.insert(name.to_string(), index);
        Id::from_index(index)
    }

    /// Look up an existing handle without allocating.
    pub fn get(&self, name: &str) -> Option<Id> {
        self.lookup.get(name.trim()).map(|&index| Id::from_index(index))
    }

    /// Name registered for `id`, if it belongs to this interner.
    pub fn name(&self, id: Id) -> Option<&str> {
        self.names.get(id.index() as usize).map(String::as_str)
    }

    /// Number of interned names.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true when nothing has been interned yet.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Iterate `(handle, name)` pairs in allocation order.
    pub fn iter(&self) -> impl Iterator<Item = (Id, &str)> + '_ {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| (Id::from_index(index as u32), name.as_str()))
    }
}

impl<Id: InternedId> Default for Interner<Id> {
    fn default() -> Self {
        Self::new()
    }
}
