//! On-demand tokenizer for TOML source text.
//!
//! The lexer is context sensitive: the parser asks for the next token in
//! either key context (bare keys, `[[`/`]]`, `.` and `=`) or value context
//! (literals). Literal tokens are fully validated here, and string contents
//! are copied into the document's allocator with escapes resolved.

#[cfg(test)]
#[path = "./lexer_tests.rs"]
mod tests;

use crate::Span;
use crate::alloc::{Allocator, RawVec};
use crate::error::{Error, ErrorKind};
use crate::str::Str;
use crate::time::Datetime;

/// Which tokens the parser expects next.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Mode {
    Key,
    Value,
}

pub(crate) enum TokenKind<'a> {
    /// Unquoted key; its text is the token span.
    BareKey,
    String {
        value: Str<'a>,
        multiline: bool,
    },
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    Dot,
    Equals,
    Comma,
    LeftBracket,
    RightBracket,
    DoubleLeftBracket,
    DoubleRightBracket,
    LeftBrace,
    RightBrace,
    Newline,
    Eof,
}

impl TokenKind<'_> {
    /// Phrase used in "expected X, found Y" diagnostics.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            TokenKind::BareKey => "an identifier",
            TokenKind::String {
                multiline: false, ..
            } => "a string",
            TokenKind::String {
                multiline: true, ..
            } => "a multiline string",
            TokenKind::Integer(_) => "an integer",
            TokenKind::Float(_) => "a float",
            TokenKind::Boolean(_) => "a boolean",
            TokenKind::Datetime(_) => "a datetime",
            TokenKind::Dot => "a period",
            TokenKind::Equals => "an equals",
            TokenKind::Comma => "a comma",
            TokenKind::LeftBracket => "a left bracket",
            TokenKind::RightBracket => "a right bracket",
            TokenKind::DoubleLeftBracket => "`[[`",
            TokenKind::DoubleRightBracket => "`]]`",
            TokenKind::LeftBrace => "a left brace",
            TokenKind::RightBrace => "a right brace",
            TokenKind::Newline => "a newline",
            TokenKind::Eof => "eof",
        }
    }
}

pub(crate) struct Token<'a> {
    pub(crate) kind: TokenKind<'a>,
    pub(crate) span: Span,
}

#[inline]
pub(crate) fn is_keylike_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Validates a run of digits in `radix` starting at `from`, with `_` allowed
/// only between two digits. Returns the end of the run. `base` is the offset
/// of `bytes` in the document.
fn digit_run(bytes: &[u8], from: usize, radix: u32, base: usize) -> Result<usize, Error> {
    let is_digit = |b: &u8| (*b as char).is_digit(radix);
    let mut at = from;
    while let Some(&b) = bytes.get(at) {
        if b == b'_' {
            let between = at > from && bytes.get(at + 1).is_some_and(is_digit);
            if !between {
                return Err(Error::new(ErrorKind::InvalidNumber, Span::at(base + at)));
            }
        } else if !is_digit(&b) {
            break;
        }
        at += 1;
    }
    if at == from {
        // Point at the byte that should have been a digit, or at the last
        // byte of the literal when it ends early.
        let pos = if at < bytes.len() { at } else { at - 1 };
        return Err(Error::new(ErrorKind::InvalidNumber, Span::at(base + pos)));
    }
    Ok(at)
}

pub(crate) struct Lexer<'s, 'a> {
    text: &'s str,
    bytes: &'s [u8],
    cursor: usize,
    alloc: &'a dyn Allocator,
    /// Reused buffer for float literals with separators removed.
    scratch: RawVec<'a, u8>,
    leap_seconds: bool,
}

impl<'s, 'a> Lexer<'s, 'a> {
    pub(crate) fn new(text: &'s str, alloc: &'a dyn Allocator, leap_seconds: bool) -> Self {
        let mut lexer = Lexer {
            text,
            bytes: text.as_bytes(),
            cursor: 0,
            alloc,
            scratch: RawVec::new_in(alloc),
            leap_seconds,
        };
        if text.starts_with('\u{FEFF}') {
            lexer.cursor = '\u{FEFF}'.len_utf8();
        }
        lexer
    }

    /// Source text covered by `span`.
    #[inline]
    pub(crate) fn slice(&self, span: Span) -> &'s str {
        &self.text[std::ops::Range::from(span)]
    }

    #[inline]
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    #[inline]
    fn peek_at(&self, ahead: usize) -> Option<u8> {
        self.bytes.get(self.cursor + ahead).copied()
    }

    #[inline]
    fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// The character starting at byte `at`, which must be a char boundary.
    fn char_at(&self, at: usize) -> char {
        self.text[at..].chars().next().unwrap_or('\0')
    }

    fn char_span(&self, at: usize) -> Span {
        let len = self.text.get(at..).and_then(|s| s.chars().next()).map_or(0, char::len_utf8);
        Span::range(at, at + len)
    }

    fn unexpected<T>(&self, at: usize) -> Result<T, Error> {
        Err(Error::new(
            ErrorKind::Unexpected(self.char_at(at)),
            self.char_span(at),
        ))
    }

    /// Produces the next token, skipping whitespace and comments.
    pub(crate) fn next(&mut self, mode: Mode) -> Result<Token<'a>, Error> {
        self.skip_trivia()?;
        let start = self.cursor;
        let Some(b) = self.peek() else {
            return Ok(Token {
                kind: TokenKind::Eof,
                span: Span::range(start, start),
            });
        };
        let kind = match b {
            b'\n' => {
                self.cursor += 1;
                TokenKind::Newline
            }
            b'\r' if self.peek_at(1) == Some(b'\n') => {
                self.cursor += 2;
                TokenKind::Newline
            }
            b'=' => {
                self.cursor += 1;
                TokenKind::Equals
            }
            b',' => {
                self.cursor += 1;
                TokenKind::Comma
            }
            b'{' => {
                self.cursor += 1;
                TokenKind::LeftBrace
            }
            b'}' => {
                self.cursor += 1;
                TokenKind::RightBrace
            }
            b'[' => {
                self.cursor += 1;
                if mode == Mode::Key && self.eat(b'[') {
                    TokenKind::DoubleLeftBracket
                } else {
                    TokenKind::LeftBracket
                }
            }
            b']' => {
                self.cursor += 1;
                if mode == Mode::Key && self.eat(b']') {
                    TokenKind::DoubleRightBracket
                } else {
                    TokenKind::RightBracket
                }
            }
            b'.' if mode == Mode::Key => {
                self.cursor += 1;
                TokenKind::Dot
            }
            b'"' | b'\'' => self.string(b)?,
            _ if mode == Mode::Key && is_keylike_byte(b) => {
                while self.peek().is_some_and(is_keylike_byte) {
                    self.cursor += 1;
                }
                TokenKind::BareKey
            }
            _ if mode == Mode::Value && (is_keylike_byte(b) || b == b'+') => self.scalar(start)?,
            _ => return self.unexpected(start),
        };
        Ok(Token {
            kind,
            span: Span::range(start, self.cursor),
        })
    }

    fn skip_trivia(&mut self) -> Result<(), Error> {
        loop {
            match self.peek() {
                Some(b' ' | b'\t') => self.cursor += 1,
                Some(b'#') => self.comment()?,
                _ => return Ok(()),
            }
        }
    }

    /// Consumes a comment up to, not including, the line ending.
    fn comment(&mut self) -> Result<(), Error> {
        self.cursor += 1;
        while let Some(b) = self.peek() {
            match b {
                b'\n' => break,
                b'\r' if self.peek_at(1) == Some(b'\n') => break,
                b'\t' => {}
                0x00..=0x1f | 0x7f => {
                    return Err(Error::new(
                        ErrorKind::InvalidCharInComment(b as char),
                        Span::at(self.cursor),
                    ));
                }
                _ => {}
            }
            self.cursor += 1;
        }
        Ok(())
    }

    /// Lexes a string of any of the four kinds; the cursor is on the opening
    /// quote.
    fn string(&mut self, delim: u8) -> Result<TokenKind<'a>, Error> {
        let start = self.cursor;
        self.cursor += 1;
        let multiline = self.peek() == Some(delim) && self.peek_at(1) == Some(delim);
        if multiline {
            self.cursor += 2;
            if !self.eat(b'\n') && self.peek() == Some(b'\r') && self.peek_at(1) == Some(b'\n') {
                self.cursor += 2;
            }
        }
        let escapes = delim == b'"';

        let mut buf = RawVec::new_in(self.alloc);
        loop {
            let run = self.cursor;
            while let Some(b) = self.peek() {
                if b == delim || (escapes && b == b'\\') || (b < 0x20 && b != b'\t') || b == 0x7f {
                    break;
                }
                self.cursor += 1;
            }
            buf.try_extend_from_slice(&self.bytes[run..self.cursor])?;

            let at = self.cursor;
            let Some(b) = self.peek() else {
                return Err(Error::new(
                    ErrorKind::UnterminatedString,
                    Span::range(start, at),
                ));
            };
            self.cursor += 1;
            match b {
                b'\\' => self.escape(&mut buf, multiline)?,
                b'\n' if multiline => buf.try_push(b'\n')?,
                b'\r' if multiline && self.peek() == Some(b'\n') => {
                    self.cursor += 1;
                    buf.try_extend_from_slice(b"\r\n")?
                }
                _ if b == delim => {
                    if !multiline {
                        break;
                    }
                    let mut quotes = 1;
                    while quotes < 5 && self.eat(delim) {
                        quotes += 1;
                    }
                    if quotes >= 3 {
                        // Up to two quotes may sit right before the closing delimiter.
                        for _ in 3..quotes {
                            buf.try_push(delim)?;
                        }
                        break;
                    }
                    for _ in 0..quotes {
                        buf.try_push(delim)?;
                    }
                }
                _ => {
                    return Err(Error::new(
                        ErrorKind::InvalidCharInString(b as char),
                        Span::at(at),
                    ));
                }
            }
        }

        // Only whole runs of valid input and encoded chars were copied.
        let value = unsafe { Str::from_utf8_unchecked(buf) };
        Ok(TokenKind::String { value, multiline })
    }

    /// Resolves the escape after a backslash inside a basic string.
    fn escape(&mut self, buf: &mut RawVec<'a, u8>, multiline: bool) -> Result<(), Error> {
        let backslash = self.cursor - 1;
        let Some(b) = self.peek() else {
            return Err(Error::new(
                ErrorKind::UnterminatedString,
                Span::at(backslash),
            ));
        };
        let byte = match b {
            b'b' => 0x08,
            b't' => b'\t',
            b'n' => b'\n',
            b'f' => 0x0c,
            b'r' => b'\r',
            b'"' => b'"',
            b'\\' => b'\\',
            b'u' => return self.unicode_escape(buf, backslash, 4),
            b'U' => return self.unicode_escape(buf, backslash, 8),
            b' ' | b'\t' | b'\n' | b'\r' if multiline => return self.line_continuation(backslash),
            _ => {
                let c = self.char_at(self.cursor);
                let end = self.cursor + c.len_utf8();
                return Err(Error::new(
                    ErrorKind::InvalidEscape(c),
                    Span::range(backslash, end),
                ));
            }
        };
        self.cursor += 1;
        buf.try_push(byte)?;
        Ok(())
    }

    /// A backslash at the end of a line in a multi-line basic string trims
    /// the line ending and all whitespace that follows it.
    fn line_continuation(&mut self, backslash: usize) -> Result<(), Error> {
        while matches!(self.peek(), Some(b' ' | b'\t')) {
            self.cursor += 1;
        }
        if !self.eat(b'\n') {
            if self.peek() == Some(b'\r') && self.peek_at(1) == Some(b'\n') {
                self.cursor += 2;
            } else {
                let c = self.char_at(backslash + 1);
                return Err(Error::new(
                    ErrorKind::InvalidEscape(c),
                    Span::range(backslash, backslash + 2),
                ));
            }
        }
        loop {
            match self.peek() {
                Some(b' ' | b'\t' | b'\n') => self.cursor += 1,
                Some(b'\r') if self.peek_at(1) == Some(b'\n') => self.cursor += 2,
                _ => return Ok(()),
            }
        }
    }

    fn unicode_escape(
        &mut self,
        buf: &mut RawVec<'a, u8>,
        backslash: usize,
        len: usize,
    ) -> Result<(), Error> {
        // Skip the `u` or `U`.
        self.cursor += 1;
        let mut value: u32 = 0;
        for _ in 0..len {
            let at = self.cursor;
            let Some(b) = self.peek() else {
                return Err(Error::new(
                    ErrorKind::UnterminatedString,
                    Span::range(backslash, at),
                ));
            };
            let Some(digit) = (b as char).to_digit(16) else {
                return Err(Error::new(
                    ErrorKind::InvalidHexEscape(self.char_at(at)),
                    self.char_span(at),
                ));
            };
            value = value * 16 + digit;
            self.cursor += 1;
        }
        let Some(c) = char::from_u32(value) else {
            return Err(Error::new(
                ErrorKind::InvalidEscapeValue(value),
                Span::range(backslash, self.cursor),
            ));
        };
        let mut utf8 = [0; 4];
        buf.try_extend_from_slice(c.encode_utf8(&mut utf8).as_bytes())?;
        Ok(())
    }

    /// A literal must be followed by whitespace, a comment, a line ending, a
    /// separator or the end of input.
    fn expect_delimiter(&self) -> Result<(), Error> {
        match self.peek() {
            None | Some(b' ' | b'\t' | b'\n' | b'\r' | b'#' | b',' | b']' | b'}') => Ok(()),
            Some(_) => self.unexpected(self.cursor),
        }
    }

    /// Lexes a datetime, number or boolean starting at `start`.
    fn scalar(&mut self, start: usize) -> Result<TokenKind<'a>, Error> {
        let text = self.text;
        let rest = &self.bytes[start..];

        if rest[0].is_ascii_digit() {
            match Datetime::munch(rest, self.leap_seconds) {
                Ok(Some((len, datetime))) => {
                    self.cursor = start + len;
                    self.expect_delimiter()?;
                    return Ok(TokenKind::Datetime(datetime));
                }
                Ok(None) => {}
                Err(offset) => {
                    return Err(Error::new(
                        ErrorKind::InvalidDatetime,
                        self.char_span(start + offset),
                    ));
                }
            }
        }

        let len = rest
            .iter()
            .position(|&b| !(is_keylike_byte(b) || b == b'+' || b == b'.'))
            .unwrap_or(rest.len());
        let end = start + len;
        self.cursor = end;
        let word = &text[start..end];

        let kind = match word {
            "true" => TokenKind::Boolean(true),
            "false" => TokenKind::Boolean(false),
            "inf" | "+inf" => TokenKind::Float(f64::INFINITY),
            "-inf" => TokenKind::Float(f64::NEG_INFINITY),
            "nan" | "+nan" => TokenKind::Float(f64::NAN),
            "-nan" => TokenKind::Float(-f64::NAN),
            _ if matches!(word.as_bytes()[0], b'0'..=b'9' | b'+' | b'-') => {
                self.number(word.as_bytes(), start)?
            }
            _ => {
                return Err(Error::new(
                    ErrorKind::UnquotedString,
                    Span::range(start, end),
                ));
            }
        };
        self.expect_delimiter()?;
        Ok(kind)
    }

    /// Error for the byte at `at` that ended a digit run early.
    fn bad_digit(&self, bytes: &[u8], at: usize, base: usize, radix: u32) -> Error {
        let c = bytes[at] as char;
        let kind = if c.is_ascii_alphanumeric() {
            ErrorKind::InvalidDigit { digit: c, radix }
        } else {
            ErrorKind::InvalidNumber
        };
        Error::new(kind, Span::at(base + at))
    }

    /// Lexes an integer or float literal; `bytes` is the whole literal and
    /// `base` its offset in the document.
    fn number(&mut self, bytes: &[u8], base: usize) -> Result<TokenKind<'a>, Error> {
        let whole = Span::range(base, base + bytes.len());

        if let [b'0', prefix @ (b'x' | b'o' | b'b'), ..] = bytes {
            let radix = match prefix {
                b'x' => 16,
                b'o' => 8,
                _ => 2,
            };
            let end = digit_run(bytes, 2, radix, base)?;
            if end != bytes.len() {
                return Err(self.bad_digit(bytes, end, base, radix));
            }
            let magnitude = accumulate(&bytes[2..], radix)
                .ok_or_else(|| Error::new(ErrorKind::OutOfRange("i64"), whole))?;
            return i64::try_from(magnitude)
                .map(TokenKind::Integer)
                .map_err(|_| Error::new(ErrorKind::OutOfRange("i64"), whole));
        }

        let (sign_len, negative) = match bytes[0] {
            b'+' => (1, false),
            b'-' => (1, true),
            _ => (0, false),
        };
        let int_end = digit_run(bytes, sign_len, 10, base)?;
        if bytes[sign_len] == b'0' && int_end > sign_len + 1 {
            return Err(Error::new(ErrorKind::LeadingZero, Span::range(base + sign_len, base + int_end)));
        }

        let mut end = int_end;
        let mut is_float = false;
        if bytes.get(end) == Some(&b'.') {
            is_float = true;
            end = digit_run(bytes, end + 1, 10, base)?;
        }
        if matches!(bytes.get(end), Some(b'e' | b'E')) {
            is_float = true;
            let mut exponent = end + 1;
            if matches!(bytes.get(exponent), Some(b'+' | b'-')) {
                exponent += 1;
            }
            end = digit_run(bytes, exponent, 10, base)?;
        }
        if end != bytes.len() {
            return Err(self.bad_digit(bytes, end, base, 10));
        }

        if is_float {
            return self.float(bytes, whole).map(TokenKind::Float);
        }

        let magnitude = accumulate(&bytes[sign_len..], 10)
            .ok_or_else(|| Error::new(ErrorKind::OutOfRange("i64"), whole))?;
        let value = if negative {
            if magnitude > i64::MIN.unsigned_abs() {
                return Err(Error::new(ErrorKind::OutOfRange("i64"), whole));
            }
            (magnitude as i64).wrapping_neg()
        } else {
            i64::try_from(magnitude).map_err(|_| Error::new(ErrorKind::OutOfRange("i64"), whole))?
        };
        Ok(TokenKind::Integer(value))
    }

    fn float(&mut self, bytes: &[u8], whole: Span) -> Result<f64, Error> {
        self.scratch.clear();
        for &b in bytes {
            if b != b'_' {
                self.scratch.try_push(b)?;
            }
        }
        let parsed = std::str::from_utf8(self.scratch.as_slice())
            .ok()
            .and_then(|text| text.parse::<f64>().ok());
        match parsed {
            Some(value) if value.is_finite() => Ok(value),
            Some(_) => Err(Error::new(ErrorKind::OutOfRange("f64"), whole)),
            None => Err(Error::new(ErrorKind::InvalidNumber, whole)),
        }
    }
}

/// Unsigned value of validated `digits` in `radix`, skipping separators.
/// `None` on overflow.
fn accumulate(digits: &[u8], radix: u32) -> Option<u64> {
    let mut value: u64 = 0;
    for &b in digits {
        if b == b'_' {
            continue;
        }
        let digit = (b as char).to_digit(radix)? as u64;
        value = value.checked_mul(radix as u64)?.checked_add(digit)?;
    }
    Some(value)
}
