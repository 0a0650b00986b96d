//! A TOML parser that builds an owned value tree through a caller-supplied
//! allocator.
//!
//! A document is parsed into a root [`Table`] whose entries own their
//! [`Value`]s, recursively. Every byte the tree holds, from table entry
//! buffers to string contents, is obtained from an [`Allocator`], which
//! defaults to the global heap. Dropping the root returns all of it.
//!
//! Parsing stops at the first problem and reports it as an [`Error`] carrying
//! a [`Category`], the offending byte [`Span`] and, for problems in the text
//! itself, a 1-based line and column. Nothing allocated during a failed parse
//! outlives the call.
//!
//! # Examples
//!
//! ```
//! use toml_tree::{Category, Value};
//!
//! let content = r#"
//! dev-mode = true
//!
//! [[things]]
//! name = "hammer"
//! value = 43
//!
//! [[things]]
//! name = "drill"
//! value = 300
//! color = "green"
//! "#;
//!
//! let root = toml_tree::parse(content)?;
//! let things = root.get("things").and_then(Value::as_array).unwrap();
//! assert_eq!(things.len(), 2);
//! assert_eq!(things.get(0).unwrap().get("name").and_then(Value::as_str), Some("hammer"));
//! assert_eq!(root.get("dev-mode").and_then(Value::as_bool), Some(true));
//!
//! let err = toml_tree::parse("a = 1\na = 2").unwrap_err();
//! assert_eq!(err.category(), Category::Semantic);
//! assert_eq!(err.to_string(), "duplicate key: `a` at line 2 column 1");
//! # Ok::<(), toml_tree::Error>(())
//! ```
//!
//! # Custom allocators
//!
//! [`parse_in`] and [`parse_reader_in`] take any [`Allocator`]. The tree
//! borrows the allocator, so it cannot outlive it.
//!
//! ```
//! use std::alloc::Layout;
//! use std::ptr::NonNull;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use toml_tree::{Allocator, Global};
//!
//! #[derive(Default)]
//! struct Counting {
//!     live: AtomicUsize,
//! }
//!
//! unsafe impl Allocator for Counting {
//!     fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
//!         self.live.fetch_add(1, Ordering::Relaxed);
//!         Global.allocate(layout)
//!     }
//!
//!     unsafe fn release(&self, ptr: NonNull<u8>, layout: Layout) {
//!         self.live.fetch_sub(1, Ordering::Relaxed);
//!         unsafe { Global.release(ptr, layout) }
//!     }
//! }
//!
//! let alloc = Counting::default();
//! let root = toml_tree::parse_in(b"[server]\nhost = 'localhost'", &alloc)?;
//! assert!(alloc.live.load(Ordering::Relaxed) > 0);
//! drop(root);
//! assert_eq!(alloc.live.load(Ordering::Relaxed), 0);
//! # Ok::<(), toml_tree::Error>(())
//! ```

mod alloc;
mod array;
mod error;
mod lexer;
mod options;
mod parser;
mod span;
mod str;
mod table;
mod time;
mod value;

#[cfg(feature = "serde")]
pub mod impl_serde;

pub use alloc::{AllocError, Allocator, Global};
pub use array::Array;
pub use error::{Category, Error, ErrorKind};
pub use options::Options;
pub use span::Span;
pub use str::Str;
pub use table::Table;
pub use time::{Date, LocalDatetime, OffsetDatetime, Time, TimeOffset};
pub use value::{Key, Value};

use std::io::{Read, Seek};

/// Parses a TOML document held in a string.
///
/// The tree is allocated from the global heap.
#[inline]
pub fn parse(input: &str) -> Result<Table<'static>, Error> {
    Options::new().parse(input)
}

/// Parses a TOML document held in a byte buffer, which must be UTF-8.
///
/// The buffer needs no terminator; its length bounds the document.
#[inline]
pub fn parse_bytes(input: &[u8]) -> Result<Table<'static>, Error> {
    Options::new().parse_in(input, &alloc::GLOBAL)
}

/// Parses a TOML document held in a byte buffer, allocating the tree from
/// `alloc`.
///
/// See [`Options::parse_in`].
#[inline]
pub fn parse_in<'a>(input: &[u8], alloc: &'a dyn Allocator) -> Result<Table<'a>, Error> {
    Options::new().parse_in(input, alloc)
}

/// Reads and parses a whole TOML document from a seekable stream.
///
/// The tree is allocated from the global heap. See [`Options::parse_reader_in`].
#[inline]
pub fn parse_reader<R: Read + Seek>(reader: &mut R) -> Result<Table<'static>, Error> {
    Options::new().parse_reader_in(reader, &alloc::GLOBAL)
}

/// Reads and parses a whole TOML document from a seekable stream, allocating
/// the read buffer and the tree from `alloc`.
#[inline]
pub fn parse_reader_in<'a, R: Read + Seek>(
    reader: &mut R,
    alloc: &'a dyn Allocator,
) -> Result<Table<'a>, Error> {
    Options::new().parse_reader_in(reader, alloc)
}
