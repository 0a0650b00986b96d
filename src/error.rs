#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;

use crate::Span;
use crate::alloc::AllocError;
use std::fmt::{self, Debug, Display};

/// The single failure value returned by every entry point.
///
/// Parsing stops at the first failure; whatever part of the tree had been
/// built is released before the error is returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// What went wrong.
    pub kind: ErrorKind,
    /// The offending bytes of the input.
    ///
    /// Empty for [`Category::Io`] and [`Category::Alloc`] failures, which have
    /// no position. Some kinds carry an additional span of their own.
    pub span: Span,
    /// 1-based line and column (in characters) of `span.start`, present for
    /// syntax and semantic errors.
    pub line_info: Option<(usize, usize)>,
}

/// Broad classification of an [`Error`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Category {
    /// The input could not be read, or is larger than 4GiB.
    Io,
    /// The allocator refused a request.
    Alloc,
    /// A malformed token or grammar violation.
    Syntax,
    /// Well-formed input that breaks a TOML rule, such as a duplicate key.
    Semantic,
}

/// The detailed reason for an [`Error`].
#[derive(Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Seeking or reading the input stream failed.
    Io(std::io::ErrorKind),

    /// The input is larger than the maximum supported size of 4GiB.
    FileTooLarge,

    /// The allocator returned no memory for a request of `size` bytes.
    OutOfMemory { size: usize },

    /// The input is not valid UTF-8.
    InvalidUtf8,

    /// End of input where a value or delimiter was still required.
    UnexpectedEof,

    /// A character not allowed in a string was found.
    InvalidCharInString(char),

    /// A control character was found in a comment.
    InvalidCharInComment(char),

    /// An invalid character was found after a backslash.
    InvalidEscape(char),

    /// A non-hex character was found in a `\u` or `\U` escape.
    InvalidHexEscape(char),

    /// A `\u` or `\U` escape named a surrogate or a value above U+10FFFF.
    InvalidEscapeValue(u32),

    /// An unexpected character was encountered.
    Unexpected(char),

    /// End of input was reached before the closing quote.
    UnterminatedString,

    /// A number is malformed, e.g. a misplaced underscore or missing digits.
    InvalidNumber,

    /// A digit that is not valid for the literal's radix.
    InvalidDigit {
        /// The offending character.
        digit: char,
        /// 2, 8, 10 or 16.
        radix: u32,
    },

    /// A decimal literal was written with a leading zero.
    LeadingZero,

    /// The number does not fit the named type.
    OutOfRange(&'static str),

    /// A date, time or datetime literal is malformed or out of range.
    InvalidDatetime,

    /// A bare word was found where a value was expected.
    UnquotedString,

    /// Multi-line strings cannot be used as keys.
    MultilineStringKey,

    /// Wanted one sort of token, but found another.
    Wanted {
        /// Expected token type.
        expected: &'static str,
        /// Actually found token type.
        found: &'static str,
    },

    /// Arrays and inline tables are nested deeper than the configured limit.
    NestingTooDeep,

    /// A `[table]` header names a table that was already defined.
    DuplicateTable {
        /// The name of the duplicate table.
        name: String,
        /// Where the table was first defined.
        first: Span,
    },

    /// A key was assigned twice in the same table.
    DuplicateKey {
        /// The duplicate key.
        key: String,
        /// Where the key was first defined.
        first: Span,
    },

    /// A `[[array]]` header names an existing table.
    RedefineAsArray,

    /// A header or dotted key tried to add to a value that cannot take new
    /// keys: a scalar, a static array or a closed inline table.
    CannotExtend {
        /// The key that named the value.
        key: String,
        /// Where that value was defined.
        first: Span,
    },
}

impl ErrorKind {
    /// The [`Category`] this kind belongs to.
    pub fn category(&self) -> Category {
        match self {
            Self::Io(_) | Self::FileTooLarge => Category::Io,
            Self::OutOfMemory { .. } => Category::Alloc,
            Self::DuplicateTable { .. }
            | Self::DuplicateKey { .. }
            | Self::RedefineAsArray
            | Self::CannotExtend { .. } => Category::Semantic,
            _ => Category::Syntax,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Io(_) => "io",
            Self::FileTooLarge => "file-too-large",
            Self::OutOfMemory { .. } => "out-of-memory",
            Self::InvalidUtf8 => "invalid-utf8",
            Self::UnexpectedEof => "unexpected-eof",
            Self::InvalidCharInString(..) => "invalid-char-in-string",
            Self::InvalidCharInComment(..) => "invalid-char-in-comment",
            Self::InvalidEscape(..) => "invalid-escape",
            Self::InvalidHexEscape(..) => "invalid-hex-escape",
            Self::InvalidEscapeValue(..) => "invalid-escape-value",
            Self::Unexpected(..) => "unexpected",
            Self::UnterminatedString => "unterminated-string",
            Self::InvalidNumber => "invalid-number",
            Self::InvalidDigit { .. } => "invalid-digit",
            Self::LeadingZero => "leading-zero",
            Self::OutOfRange(_) => "out-of-range",
            Self::InvalidDatetime => "invalid-datetime",
            Self::UnquotedString => "unquoted-string",
            Self::MultilineStringKey => "multiline-string-key",
            Self::Wanted { .. } => "wanted",
            Self::NestingTooDeep => "nesting-too-deep",
            Self::DuplicateTable { .. } => "duplicate-table",
            Self::DuplicateKey { .. } => "duplicate-key",
            Self::RedefineAsArray => "redefine-as-array",
            Self::CannotExtend { .. } => "cannot-extend",
        };
        f.write_str(text)
    }
}

impl Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

struct Escape(char);

impl Display for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        if self.0.is_whitespace() || self.0.is_control() {
            for esc in self.0.escape_default() {
                f.write_char(esc)?;
            }
            Ok(())
        } else {
            f.write_char(self.0)
        }
    }
}

fn radix_name(radix: u32) -> &'static str {
    match radix {
        2 => "binary",
        8 => "octal",
        16 => "hexadecimal",
        _ => "decimal",
    }
}

impl Error {
    #[inline]
    pub(crate) fn new(kind: ErrorKind, span: Span) -> Self {
        Self {
            kind,
            span,
            line_info: None,
        }
    }

    pub(crate) fn io(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io(err.kind()), Span::default())
    }

    /// The broad classification of this error.
    #[inline]
    pub fn category(&self) -> Category {
        self.kind.category()
    }

    /// Line (1-based) of the error, for positioned errors.
    pub fn line(&self) -> Option<usize> {
        self.line_info.map(|(line, _)| line)
    }

    /// Column (1-based, counted in characters) of the error, for positioned
    /// errors.
    pub fn column(&self) -> Option<usize> {
        self.line_info.map(|(_, column)| column)
    }

    /// Fills in `line_info` from the parsed text for syntax and semantic
    /// errors.
    pub(crate) fn locate(mut self, text: &str) -> Self {
        if matches!(self.category(), Category::Syntax | Category::Semantic) {
            self.line_info = Some(line_column(text, self.span.start as usize));
        }
        self
    }
}

/// 1-based line and character column of byte `offset` in `text`.
pub(crate) fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(text.len());
    let before = &text.as_bytes()[..offset];
    let line_start = before.iter().rposition(|&b| b == b'\n').map_or(0, |i| i + 1);
    let line = before.iter().filter(|&&b| b == b'\n').count() + 1;
    // Count characters by their leading bytes; the offset may sit inside one.
    let column = before[line_start..]
        .iter()
        .filter(|&&b| (b as i8) >= -0x40)
        .count()
        + 1;
    (line, column)
}

impl std::error::Error for Error {}

impl From<AllocError> for Error {
    fn from(err: AllocError) -> Self {
        Self::new(ErrorKind::OutOfMemory { size: err.size }, Span::default())
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io(err)
    }
}

impl From<(ErrorKind, Span)> for Error {
    fn from((kind, span): (ErrorKind, Span)) -> Self {
        Self::new(kind, span)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Io(kind) => write!(f, "error reading from input stream: {kind}")?,
            ErrorKind::FileTooLarge => f.write_str("file is too large (maximum 4GiB)")?,
            ErrorKind::OutOfMemory { size } => {
                write!(f, "memory allocation of {size} bytes failed")?
            }
            ErrorKind::InvalidUtf8 => f.write_str("input is not valid UTF-8")?,
            ErrorKind::UnexpectedEof => f.write_str("unexpected eof encountered")?,
            ErrorKind::InvalidCharInString(c) => {
                write!(f, "invalid character in string: `{}`", Escape(*c))?
            }
            ErrorKind::InvalidCharInComment(c) => {
                write!(f, "invalid character in comment: `{}`", Escape(*c))?
            }
            ErrorKind::InvalidEscape(c) => {
                write!(f, "invalid escape character in string: `{}`", Escape(*c))?
            }
            ErrorKind::InvalidHexEscape(c) => {
                write!(f, "invalid hex escape character in string: `{}`", Escape(*c))?
            }
            ErrorKind::InvalidEscapeValue(v) => write!(f, "invalid escape value: `{v:#X}`")?,
            ErrorKind::Unexpected(c) => {
                write!(f, "unexpected character found: `{}`", Escape(*c))?
            }
            ErrorKind::UnterminatedString => f.write_str("unterminated string")?,
            ErrorKind::InvalidNumber => f.write_str("invalid number")?,
            ErrorKind::InvalidDigit { digit, radix } => write!(
                f,
                "invalid digit `{}` in {} literal",
                Escape(*digit),
                radix_name(*radix)
            )?,
            ErrorKind::LeadingZero => f.write_str("leading zeros are not allowed in numbers")?,
            ErrorKind::OutOfRange(kind) => write!(f, "number is out of range of '{kind}'")?,
            ErrorKind::InvalidDatetime => f.write_str("invalid date or time")?,
            ErrorKind::UnquotedString => {
                f.write_str("invalid TOML value, did you mean to use a quoted string?")?
            }
            ErrorKind::MultilineStringKey => {
                f.write_str("multiline strings are not allowed for key")?
            }
            ErrorKind::Wanted { expected, found } => write!(f, "expected {expected}, found {found}")?,
            ErrorKind::NestingTooDeep => {
                f.write_str("arrays and inline tables are nested too deeply")?
            }
            ErrorKind::DuplicateTable { name, .. } => {
                write!(f, "redefinition of table `{name}`")?
            }
            ErrorKind::DuplicateKey { key, .. } => write!(f, "duplicate key: `{key}`")?,
            ErrorKind::RedefineAsArray => f.write_str("table redefined as array")?,
            ErrorKind::CannotExtend { key, .. } => {
                write!(f, "cannot extend `{key}`, it is not a table that accepts new keys")?
            }
        }
        if let Some((line, column)) = self.line_info {
            write!(f, " at line {line} column {column}")?;
        }
        Ok(())
    }
}

#[cfg(feature = "reporting")]
#[cfg_attr(docsrs, doc(cfg(feature = "reporting")))]
impl Error {
    /// Converts this [`Error`] into a [`codespan_reporting::diagnostic::Diagnostic`].
    pub fn to_diagnostic<FileId: Copy + PartialEq>(
        &self,
        fid: FileId,
    ) -> codespan_reporting::diagnostic::Diagnostic<FileId> {
        use codespan_reporting::diagnostic::{Diagnostic, Label};

        let diag = Diagnostic::error().with_code(self.kind.to_string());
        match &self.kind {
            ErrorKind::Io(_) | ErrorKind::FileTooLarge | ErrorKind::OutOfMemory { .. } => {
                diag.with_message(self.to_string())
            }
            ErrorKind::DuplicateKey { key, first } => diag
                .with_message(format!("duplicate key `{key}`"))
                .with_labels(vec![
                    Label::secondary(fid, *first).with_message("first key instance"),
                    Label::primary(fid, self.span).with_message("duplicate key"),
                ]),
            ErrorKind::DuplicateTable { name, first } => diag
                .with_message(format!("redefinition of table `{name}`"))
                .with_labels(vec![
                    Label::secondary(fid, *first).with_message("first table instance"),
                    Label::primary(fid, self.span).with_message("duplicate table"),
                ]),
            ErrorKind::CannotExtend { first, .. } => {
                diag.with_message(self.kind_message()).with_labels(vec![
                    Label::primary(fid, self.span).with_message("attempted to extend here"),
                    Label::secondary(fid, *first).with_message("defined here"),
                ])
            }
            ErrorKind::Wanted { expected, .. } => diag
                .with_message(self.kind_message())
                .with_labels(vec![
                    Label::primary(fid, self.span).with_message(format!("expected {expected}")),
                ]),
            ErrorKind::UnterminatedString => diag.with_message(self.kind_message()).with_labels(
                vec![Label::primary(fid, self.span).with_message("eof reached before string terminator")],
            ),
            _ => diag
                .with_message(self.kind_message())
                .with_labels(vec![Label::primary(fid, self.span)]),
        }
    }

    /// The message without the trailing position.
    fn kind_message(&self) -> String {
        Error {
            line_info: None,
            ..self.clone()
        }
        .to_string()
    }
}
