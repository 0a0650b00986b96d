#[cfg(test)]
#[path = "./array_tests.rs"]
mod tests;

use crate::alloc::{AllocError, Allocator, RawVec};
use crate::value::Value;

/// An ordered list of TOML values.
///
/// Elements may be of mixed types. Arrays written as `[[header]]` sections
/// (arrays of tables) only ever contain tables.
pub struct Array<'a> {
    values: RawVec<'a, Value<'a>>,
    of_tables: bool,
}

impl<'a> Array<'a> {
    #[inline]
    pub(crate) fn new_in(alloc: &'a dyn Allocator) -> Self {
        Self {
            values: RawVec::new_in(alloc),
            of_tables: false,
        }
    }

    /// An array that grows one table per `[[header]]`.
    #[inline]
    pub(crate) fn tables_in(alloc: &'a dyn Allocator) -> Self {
        Self {
            values: RawVec::new_in(alloc),
            of_tables: true,
        }
    }

    #[inline]
    pub(crate) fn try_push(&mut self, value: Value<'a>) -> Result<(), AllocError> {
        self.values.try_push(value)
    }

    #[inline]
    pub(crate) fn last_mut(&mut self) -> Option<&mut Value<'a>> {
        self.values.last_mut()
    }

    /// Returns `true` if this array was built from `[[header]]` sections.
    #[inline]
    pub fn is_array_of_tables(&self) -> bool {
        self.of_tables
    }

    /// Returns the number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the array contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the element at `index`, if any.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Value<'a>> {
        self.values.as_slice().get(index)
    }

    #[inline]
    pub fn iter(&self) -> std::slice::Iter<'_, Value<'a>> {
        self.values.as_slice().iter()
    }

    #[inline]
    pub fn as_slice(&self) -> &[Value<'a>] {
        self.values.as_slice()
    }
}

impl std::fmt::Debug for Array<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

impl PartialEq for Array<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<'a, 'b> IntoIterator for &'b Array<'a> {
    type Item = &'b Value<'a>;
    type IntoIter = std::slice::Iter<'b, Value<'a>>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}
