//! An ordered, indexable table of values that remembers the first index of
//! each distinct value.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub struct ArraySet<T> {
    array: Vec<T>,
    set: HashMap<T, usize>,
}

impl<T> Default for ArraySet<T> {
    fn default() -> Self {
        ArraySet {
            array: Vec::new(),
            set: HashMap::new(),
        }
    }
}

impl<T: Eq + Hash + Clone> ArraySet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from `items` in order. With `allow_duplicates` every
    /// item gets its own slot; otherwise repeated items are dropped.
    pub fn from_array<I>(items: I, allow_duplicates: bool) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let mut set = ArraySet::new();
        for item in items {
            set.add(item, allow_duplicates);
        }
        set
    }

    /// Number of slots, duplicates included.
    pub fn len(&self) -> usize {
        self.array.len()
    }

    pub fn is_empty(&self) -> bool {
        self.array.is_empty()
    }

    pub fn add(&mut self, value: T, allow_duplicates: bool) {
        let is_duplicate = self.set.contains_key(&value);
        if !is_duplicate {
            self.set.insert(value.clone(), self.array.len());
        }
        if !is_duplicate || allow_duplicates {
            self.array.push(value);
        }
    }

    pub fn has<Q>(&self, value: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.set.contains_key(value)
    }

    /// The index of the first slot holding `value`.
    pub fn index_of<Q>(&self, value: &Q) -> Option<usize>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.set.get(value).copied()
    }

    pub fn at(&self, index: usize) -> Option<&T> {
        self.array.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.array.iter()
    }

    pub fn to_array(&self) -> Vec<T> {
        self.array.clone()
    }
}
