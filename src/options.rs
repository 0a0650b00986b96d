use crate::alloc::{Allocator, GLOBAL, RawVec};
use crate::error::{Error, ErrorKind};
use crate::parser::Parser;
use crate::{Span, Table};
use std::io::{Read, Seek, SeekFrom};

/// Per-call parser configuration.
///
/// ```
/// use toml_tree::Options;
///
/// let opts = Options::new().max_depth(4).allow_leap_seconds(false);
/// assert!(opts.parse("a = [[[[1]]]]").is_ok());
/// assert!(opts.parse("a = [[[[[1]]]]]").is_err());
/// assert!(opts.parse("t = 23:59:60").is_err());
/// assert!(opts.parse("[a.b]\nc.d.e = 1").is_ok());
/// assert!(opts.parse("[a.b]\nc.d.e.f = 1").is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Options {
    /// Deepest allowed nesting of tables and arrays, counting header
    /// segments, dotted-key segments, arrays and inline tables alike.
    pub max_depth: u16,
    /// Whether `:60` is accepted as the seconds field of a time.
    pub allow_leap_seconds: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::new()
    }
}

impl Options {
    /// Nesting limit of 128, leap seconds accepted.
    pub const fn new() -> Self {
        Self {
            max_depth: 128,
            allow_leap_seconds: true,
        }
    }

    pub const fn max_depth(mut self, max_depth: u16) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub const fn allow_leap_seconds(mut self, allow: bool) -> Self {
        self.allow_leap_seconds = allow;
        self
    }

    /// Parses `input` into a tree allocated from the global allocator.
    pub fn parse(&self, input: &str) -> Result<Table<'static>, Error> {
        self.parse_in(input.as_bytes(), &GLOBAL)
    }

    /// Parses `input` into a tree allocated from `alloc`.
    ///
    /// The buffer needs no terminator and must be valid UTF-8. On failure
    /// every allocation made during the call has been released by the time
    /// the error is returned.
    pub fn parse_in<'a>(
        &self,
        input: &[u8],
        alloc: &'a dyn Allocator,
    ) -> Result<Table<'a>, Error> {
        if u32::try_from(input.len()).is_err() {
            return Err(Error::new(ErrorKind::FileTooLarge, Span::default()));
        }
        let text = match std::str::from_utf8(input) {
            Ok(text) => text,
            Err(err) => {
                let at = err.valid_up_to();
                let valid = std::str::from_utf8(&input[..at]).unwrap_or_default();
                let err = Error::new(ErrorKind::InvalidUtf8, Span::range(at, at + 1));
                return Err(err.locate(valid));
            }
        };
        Parser::new(text, alloc, self)
            .parse_document()
            .map_err(|err| err.locate(text))
    }

    /// Reads the whole of `reader` and parses it into a tree allocated from
    /// `alloc`.
    ///
    /// The stream is measured by seeking to its end, rewound, and read in a
    /// single pass into a buffer obtained from `alloc`. The buffer is released
    /// before returning.
    pub fn parse_reader_in<'a, R: Read + Seek>(
        &self,
        reader: &mut R,
        alloc: &'a dyn Allocator,
    ) -> Result<Table<'a>, Error> {
        let len = reader.seek(SeekFrom::End(0)).map_err(Error::io)?;
        reader.seek(SeekFrom::Start(0)).map_err(Error::io)?;
        let Ok(len) = u32::try_from(len) else {
            return Err(Error::new(ErrorKind::FileTooLarge, Span::default()));
        };

        let mut buf = RawVec::new_in(alloc);
        buf.try_zeroed(len as usize)?;
        reader.read_exact(buf.as_mut_slice()).map_err(Error::io)?;
        self.parse_in(buf.as_slice(), alloc)
    }
}
