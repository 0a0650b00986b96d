#[cfg(test)]
#[path = "./table_tests.rs"]
mod tests;

use crate::alloc::{AllocError, Allocator, RawVec};
use crate::value::{Key, Value};

type TableEntry<'a> = (Key<'a>, Value<'a>);

/// How a table came to exist; decides which later definitions may extend it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum TableKind {
    /// Created as an intermediate segment of a `[a.b.c]` header, or the root.
    Implicit,
    /// Created by a dotted key such as `a.b = 1`.
    Dotted,
    /// Defined by its own `[header]` (or as an element of `[[header]]`).
    Header,
    /// Written inline as `{ ... }`; sealed once closed.
    Inline,
}

/// A TOML table: key/value entries in the order they were written.
///
/// The root of a parsed document is a `Table`, as is the value of every
/// `[section]`, dotted-key parent and inline `{ ... }` table. Keys are unique
/// within a table. Lookups are a linear scan over the entries.
///
/// Dropping a table releases every entry, recursively, back to the allocator
/// the document was parsed with.
pub struct Table<'a> {
    entries: RawVec<'a, TableEntry<'a>>,
    pub(crate) kind: TableKind,
}

impl<'a> Table<'a> {
    #[inline]
    pub(crate) fn new_in(alloc: &'a dyn Allocator, kind: TableKind) -> Self {
        Self {
            entries: RawVec::new_in(alloc),
            kind,
        }
    }

    /// Appends an entry without checking for duplicates, returning its index.
    pub(crate) fn try_insert(&mut self, key: Key<'a>, value: Value<'a>) -> Result<usize, AllocError> {
        self.entries.try_push((key, value))?;
        Ok(self.entries.len() - 1)
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, index: usize) -> &mut TableEntry<'a> {
        &mut self.entries.as_mut_slice()[index]
    }

    /// Start offset of the first key, which no other table shares.
    #[inline]
    pub(crate) fn first_key_start(&self) -> Option<u32> {
        self.entries().first().map(|(key, _)| key.span.start)
    }

    pub(crate) fn find_index(&self, name: &str) -> Option<usize> {
        self.entries().iter().position(|(key, _)| key.name == *name)
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the table has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value stored under `name`.
    pub fn get(&self, name: &str) -> Option<&Value<'a>> {
        self.get_key_value(name).map(|(_, value)| value)
    }

    /// Returns the key, with its source span, and value stored under `name`.
    pub fn get_key_value(&self, name: &str) -> Option<(&Key<'a>, &Value<'a>)> {
        let index = self.find_index(name)?;
        let (key, value) = &self.entries()[index];
        Some((key, value))
    }

    /// Returns `true` if the table contains `name`.
    #[inline]
    pub fn contains_key(&self, name: &str) -> bool {
        self.find_index(name).is_some()
    }

    /// The entries in document order.
    #[inline]
    pub fn entries(&self) -> &[TableEntry<'a>] {
        self.entries.as_slice()
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, TableEntry<'a>> {
        self.entries().iter()
    }

    /// Iterates over the keys in document order.
    pub fn keys(&self) -> impl ExactSizeIterator<Item = &Key<'a>> {
        self.entries().iter().map(|(key, _)| key)
    }

    /// Returns `true` if the table was written inline as `{ ... }`.
    #[inline]
    pub fn is_inline(&self) -> bool {
        self.kind == TableKind::Inline
    }
}

impl std::fmt::Debug for Table<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.entries() {
            map.entry(k, v);
        }
        map.finish()
    }
}

/// Tables are equal when they hold equal entries in the same order.
impl PartialEq for Table<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.entries() == other.entries()
    }
}

impl<'a, 'b> IntoIterator for &'b Table<'a> {
    type Item = &'b TableEntry<'a>;
    type IntoIter = std::slice::Iter<'b, TableEntry<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries().iter()
    }
}
