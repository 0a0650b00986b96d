//! Owned UTF-8 text whose bytes live in an [`Allocator`](crate::Allocator).

#[cfg(test)]
#[path = "./str_tests.rs"]
mod tests;

use crate::alloc::{AllocError, Allocator, RawVec};
use std::borrow::Borrow;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::{fmt, str};

/// A UTF-8 string owned by a parsed tree.
///
/// The bytes are allocated through the allocator the document was parsed
/// with and are returned to it when the `Str` is dropped. Dereferences to
/// [`str`].
pub struct Str<'a> {
    buf: RawVec<'a, u8>,
}

impl<'a> Str<'a> {
    /// Copies `text` into a buffer obtained from `alloc`.
    pub(crate) fn try_from_str(text: &str, alloc: &'a dyn Allocator) -> Result<Self, AllocError> {
        let mut buf = RawVec::new_in(alloc);
        buf.try_extend_from_slice(text.as_bytes())?;
        Ok(Self { buf })
    }

    /// # Safety
    ///
    /// `buf` must hold valid UTF-8.
    pub(crate) unsafe fn from_utf8_unchecked(buf: RawVec<'a, u8>) -> Self {
        debug_assert!(str::from_utf8(buf.as_slice()).is_ok());
        Self { buf }
    }

    /// Returns the text as a `&str`.
    #[inline]
    pub fn as_str(&self) -> &str {
        // Every constructor guarantees UTF-8 contents.
        unsafe { str::from_utf8_unchecked(self.buf.as_slice()) }
    }
}

impl Deref for Str<'_> {
    type Target = str;

    #[inline]
    fn deref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for Str<'_> {
    #[inline]
    fn as_ref(&self) -> &str {
        self
    }
}

impl Borrow<str> for Str<'_> {
    #[inline]
    fn borrow(&self) -> &str {
        self
    }
}

impl fmt::Display for Str<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self)
    }
}

impl fmt::Debug for Str<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl PartialEq for Str<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for Str<'_> {}

impl PartialOrd for Str<'_> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Str<'_> {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialEq<str> for Str<'_> {
    #[inline]
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Str<'_> {
    #[inline]
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

impl Hash for Str<'_> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_str().hash(state);
    }
}

impl From<&Str<'_>> for String {
    #[inline]
    fn from(s: &Str<'_>) -> Self {
        s.as_str().to_owned()
    }
}

impl From<Str<'_>> for String {
    #[inline]
    fn from(s: Str<'_>) -> Self {
        s.as_str().to_owned()
    }
}

impl From<Str<'_>> for Box<str> {
    #[inline]
    fn from(s: Str<'_>) -> Self {
        s.as_str().into()
    }
}
