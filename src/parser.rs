//! Recursive-descent construction of the value tree.
//!
//! The parser pulls tokens from the [`Lexer`] and builds the tree bottom-up:
//! values (including nested arrays and inline tables) are built first and
//! then inserted at the position named by their key. Every node is owned by
//! its parent as soon as it is inserted, so returning early with an error
//! drops, and thereby releases, everything built so far.

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;

use crate::Span;
use crate::alloc::{AllocError, Allocator, RawVec};
use crate::array::Array;
use crate::error::{Error, ErrorKind};
use crate::lexer::{Lexer, Mode, Token, TokenKind};
use crate::options::Options;
use crate::str::Str;
use crate::table::{Table, TableKind};
use crate::value::{Key, Value};
use std::hash::BuildHasher;

/// Tables with at least this many entries use the hash index for lookups.
const INDEXED_TABLE_THRESHOLD: usize = 6;

/// Hash index over the keys of large tables, shared by every table of the
/// document.
///
/// A slot is keyed by the table's first key offset, which no two tables
/// share, and a hash of that offset with the key name. Each slot keeps the
/// first key that claimed it, so a hit must be verified and a mismatch falls
/// back to a linear scan. Slots live in an open-addressed buffer obtained
/// from the document's allocator.
struct KeyIndex<'a> {
    hasher: foldhash::fast::RandomState,
    alloc: &'a dyn Allocator,
    slots: RawVec<'a, Slot>,
    claimed: usize,
}

#[derive(Copy, Clone)]
struct Slot {
    table_id: u32,
    position: u32,
    hash: u64,
}

impl Slot {
    const VACANT: Slot = Slot {
        table_id: 0,
        position: u32::MAX,
        hash: 0,
    };

    #[inline]
    fn is_vacant(&self) -> bool {
        self.position == u32::MAX
    }
}

/// Initial slot count; always a power of two.
const MIN_SLOTS: usize = 32;

impl<'a> KeyIndex<'a> {
    fn new(alloc: &'a dyn Allocator) -> Self {
        Self {
            hasher: foldhash::fast::RandomState::default(),
            alloc,
            slots: RawVec::new_in(alloc),
            claimed: 0,
        }
    }

    #[inline]
    fn hash(&self, table_id: u32, name: &str) -> u64 {
        self.hasher.hash_one((table_id, name))
    }

    /// The slot claimed for `(table_id, hash)`, or the vacant slot that ends
    /// its probe sequence. The buffer must hold at least one vacant slot.
    fn probe(&self, table_id: u32, hash: u64) -> usize {
        let slots = self.slots.as_slice();
        let mask = slots.len() - 1;
        let mut i = hash as usize & mask;
        loop {
            let slot = &slots[i];
            if slot.is_vacant() || (slot.table_id == table_id && slot.hash == hash) {
                return i;
            }
            i = (i + 1) & mask;
        }
    }

    /// Position of `name` in `table`.
    fn find(&self, table: &Table<'_>, name: &str) -> Option<usize> {
        if table.len() < INDEXED_TABLE_THRESHOLD || self.slots.is_empty() {
            return table.find_index(name);
        }
        let table_id = table.first_key_start()?;
        let hash = self.hash(table_id, name);
        let slot = self.slots.as_slice()[self.probe(table_id, hash)];
        if slot.is_vacant() {
            return None;
        }
        let position = slot.position as usize;
        if table.entries()[position].0.name == *name {
            Some(position)
        } else {
            table.find_index(name)
        }
    }

    /// Indexes the entry just appended to `table`, or all of its entries
    /// when it has just reached the threshold.
    fn record(&mut self, table: &Table<'_>) -> Result<(), AllocError> {
        let len = table.len();
        if len < INDEXED_TABLE_THRESHOLD {
            return Ok(());
        }
        let Some(table_id) = table.first_key_start() else {
            return Ok(());
        };
        let from = if len == INDEXED_TABLE_THRESHOLD { 0 } else { len - 1 };
        for (position, (key, _)) in table.entries().iter().enumerate().skip(from) {
            let hash = self.hash(table_id, &key.name);
            self.claim(table_id, hash, position as u32)?;
        }
        Ok(())
    }

    fn claim(&mut self, table_id: u32, hash: u64, position: u32) -> Result<(), AllocError> {
        // Keep the load at or below three quarters.
        if (self.claimed + 1) * 4 > self.slots.len() * 3 {
            self.grow()?;
        }
        let i = self.probe(table_id, hash);
        let slot = &mut self.slots.as_mut_slice()[i];
        if slot.is_vacant() {
            *slot = Slot {
                table_id,
                position,
                hash,
            };
            self.claimed += 1;
        }
        Ok(())
    }

    #[cold]
    fn grow(&mut self) -> Result<(), AllocError> {
        let capacity = (self.slots.len() * 2).max(MIN_SLOTS);
        let mut slots = RawVec::new_in(self.alloc);
        slots.try_reserve(capacity)?;
        for _ in 0..capacity {
            slots.try_push(Slot::VACANT)?;
        }
        let old = std::mem::replace(&mut self.slots, slots);
        for slot in old.as_slice() {
            if !slot.is_vacant() {
                let i = self.probe(slot.table_id, slot.hash);
                self.slots.as_mut_slice()[i] = *slot;
            }
        }
        Ok(())
    }
}

/// A possibly dotted key: `a.b.c` has parents `a` and `b`.
struct DottedKey<'a> {
    parents: RawVec<'a, Key<'a>>,
    last: Key<'a>,
}

fn wanted(expected: &'static str, token: &Token<'_>) -> Error {
    Error::new(
        ErrorKind::Wanted {
            expected,
            found: token.kind.describe(),
        },
        token.span,
    )
}

fn cannot_extend(key: &Key<'_>, first: Span) -> Error {
    Error::new(
        ErrorKind::CannotExtend {
            key: key.name.to_string(),
            first,
        },
        key.span,
    )
}

pub(crate) struct Parser<'s, 'a> {
    lexer: Lexer<'s, 'a>,
    alloc: &'a dyn Allocator,
    max_depth: u16,
    depth: u16,
    index: KeyIndex<'a>,
    /// Entry positions from the root to the table that receives `key = value`
    /// lines. A step onto an array of tables continues in its last element.
    current: RawVec<'a, usize>,
}

impl<'s, 'a> Parser<'s, 'a> {
    pub(crate) fn new(text: &'s str, alloc: &'a dyn Allocator, options: &Options) -> Self {
        Parser {
            lexer: Lexer::new(text, alloc, options.allow_leap_seconds),
            alloc,
            max_depth: options.max_depth,
            depth: 0,
            index: KeyIndex::new(alloc),
            current: RawVec::new_in(alloc),
        }
    }

    pub(crate) fn parse_document(&mut self) -> Result<Table<'a>, Error> {
        let mut root = Table::new_in(self.alloc, TableKind::Implicit);
        loop {
            let token = self.lexer.next(Mode::Key)?;
            match token.kind {
                TokenKind::Eof => return Ok(root),
                TokenKind::Newline => {}
                TokenKind::LeftBracket => self.table_header(&mut root, false)?,
                TokenKind::DoubleLeftBracket => self.table_header(&mut root, true)?,
                _ => self.key_value(&mut root, token)?,
            }
        }
    }

    fn key(&mut self, token: Token<'a>) -> Result<Key<'a>, Error> {
        let name = match token.kind {
            TokenKind::BareKey => Str::try_from_str(self.lexer.slice(token.span), self.alloc)?,
            TokenKind::String {
                multiline: true, ..
            } => return Err(Error::new(ErrorKind::MultilineStringKey, token.span)),
            TokenKind::String { value, .. } => value,
            _ => return Err(wanted("a table key", &token)),
        };
        Ok(Key {
            name,
            span: token.span,
        })
    }

    /// Reads a key starting at `first`, returning it with the token that
    /// followed it.
    fn dotted_key(&mut self, first: Token<'a>) -> Result<(DottedKey<'a>, Token<'a>), Error> {
        let mut parents = RawVec::new_in(self.alloc);
        let mut last = self.key(first)?;
        loop {
            let token = self.lexer.next(Mode::Key)?;
            if !matches!(token.kind, TokenKind::Dot) {
                return Ok((DottedKey { parents, last }, token));
            }
            let token = self.lexer.next(Mode::Key)?;
            let next = self.key(token)?;
            parents.try_push(std::mem::replace(&mut last, next))?;
        }
    }

    /// Depth of the table that receives the last segment of `key`, counting
    /// from a table at depth `base`. Fails at the first segment whose table
    /// would sit deeper than `max_depth`, which also bounds the recursion of
    /// dropping the tree.
    fn key_depth(
        &self,
        base: usize,
        key: &DottedKey<'_>,
        last_is_table: bool,
    ) -> Result<u16, Error> {
        let limit = self.max_depth as usize;
        let parents = key.parents.as_slice();
        let depth = base + parents.len();
        if depth + last_is_table as usize <= limit {
            return Ok(depth as u16);
        }
        let span = match parents.get(limit.saturating_sub(base)) {
            Some(segment) => segment.span,
            None => key.last.span,
        };
        Err(Error::new(ErrorKind::NestingTooDeep, span))
    }

    fn end_of_line(&mut self) -> Result<(), Error> {
        let token = self.lexer.next(Mode::Key)?;
        match token.kind {
            TokenKind::Newline | TokenKind::Eof => Ok(()),
            _ => Err(wanted("a newline", &token)),
        }
    }

    fn key_value(&mut self, root: &mut Table<'a>, first: Token<'a>) -> Result<(), Error> {
        let (key, token) = self.dotted_key(first)?;
        if !matches!(token.kind, TokenKind::Equals) {
            return Err(wanted("an equals", &token));
        }
        self.depth = self.key_depth(self.current.len(), &key, false)?;
        let token = self.lexer.next(Mode::Value)?;
        let value = self.value(token)?;
        self.depth = 0;
        self.end_of_line()?;

        let table = current_table(root, self.current.as_slice());
        insert_dotted(table, &mut self.index, self.alloc, key, value)
    }

    /// Handles `[a.b]` or `[[a.b]]` after the opening bracket and moves the
    /// cursor to the named table.
    fn table_header(&mut self, root: &mut Table<'a>, array: bool) -> Result<(), Error> {
        let first = self.lexer.next(Mode::Key)?;
        let (key, token) = self.dotted_key(first)?;
        match token.kind {
            TokenKind::RightBracket if !array => {}
            TokenKind::DoubleRightBracket if array => {}
            _ if array => return Err(wanted("`]]`", &token)),
            _ => return Err(wanted("a right bracket", &token)),
        }
        self.key_depth(0, &key, true)?;
        self.end_of_line()?;

        let Parser {
            index,
            current,
            alloc,
            ..
        } = self;
        current.clear();
        let mut table = root;
        for parent in key.parents {
            let (position, child) = descend_header(table, index, *alloc, parent)?;
            current.try_push(position)?;
            table = child;
        }
        let position = if array {
            append_array_table(table, index, *alloc, key.last)?
        } else {
            define_table(table, index, *alloc, key.last)?
        };
        current.try_push(position)?;
        Ok(())
    }

    fn value(&mut self, token: Token<'a>) -> Result<Value<'a>, Error> {
        match token.kind {
            TokenKind::String { value, .. } => Ok(Value::String(value)),
            TokenKind::Integer(i) => Ok(Value::Integer(i)),
            TokenKind::Float(f) => Ok(Value::Float(f)),
            TokenKind::Boolean(b) => Ok(Value::Boolean(b)),
            TokenKind::Datetime(datetime) => Ok(Value::from(datetime)),
            TokenKind::LeftBracket => {
                self.enter(token.span)?;
                let array = self.array()?;
                self.depth -= 1;
                Ok(Value::Array(array))
            }
            TokenKind::LeftBrace => {
                self.enter(token.span)?;
                let table = self.inline_table()?;
                self.depth -= 1;
                Ok(Value::Table(table))
            }
            TokenKind::Eof => Err(Error::new(ErrorKind::UnexpectedEof, token.span)),
            _ => Err(wanted("a value", &token)),
        }
    }

    fn enter(&mut self, span: Span) -> Result<(), Error> {
        if self.depth >= self.max_depth {
            return Err(Error::new(ErrorKind::NestingTooDeep, span));
        }
        self.depth += 1;
        Ok(())
    }

    /// Next value-context token, skipping line endings and comments.
    fn next_in_array(&mut self) -> Result<Token<'a>, Error> {
        loop {
            let token = self.lexer.next(Mode::Value)?;
            if !matches!(token.kind, TokenKind::Newline) {
                return Ok(token);
            }
        }
    }

    /// Array elements after the opening bracket.
    fn array(&mut self) -> Result<Array<'a>, Error> {
        let mut array = Array::new_in(self.alloc);
        loop {
            let token = self.next_in_array()?;
            if matches!(token.kind, TokenKind::RightBracket) {
                return Ok(array);
            }
            let value = self.value(token)?;
            array.try_push(value)?;

            let token = self.next_in_array()?;
            match token.kind {
                TokenKind::Comma => {}
                TokenKind::RightBracket => return Ok(array),
                _ => return Err(wanted("a comma or right bracket", &token)),
            }
        }
    }

    /// Inline table entries after the opening brace. The whole table must sit
    /// on one line and may not end with a comma.
    fn inline_table(&mut self) -> Result<Table<'a>, Error> {
        let mut table = Table::new_in(self.alloc, TableKind::Inline);
        let mut token = self.lexer.next(Mode::Key)?;
        if matches!(token.kind, TokenKind::RightBrace) {
            return Ok(table);
        }
        loop {
            let (key, next) = self.dotted_key(token)?;
            if !matches!(next.kind, TokenKind::Equals) {
                return Err(wanted("an equals", &next));
            }
            let depth = self.depth;
            self.depth = self.key_depth(depth as usize, &key, false)?;
            let value_token = self.lexer.next(Mode::Value)?;
            let value = self.value(value_token)?;
            self.depth = depth;
            insert_dotted(&mut table, &mut self.index, self.alloc, key, value)?;

            let next = self.lexer.next(Mode::Key)?;
            match next.kind {
                TokenKind::Comma => token = self.lexer.next(Mode::Key)?,
                TokenKind::RightBrace => return Ok(table),
                _ => return Err(wanted("a comma or right brace", &next)),
            }
        }
    }
}

/// Follows `path` from the root to the table receiving key/value lines.
fn current_table<'t, 'a>(root: &'t mut Table<'a>, path: &[usize]) -> &'t mut Table<'a> {
    let mut table = root;
    for &position in path {
        table = match &mut table.entry_mut(position).1 {
            Value::Table(child) => child,
            Value::Array(array) => match array.last_mut() {
                Some(Value::Table(child)) => child,
                _ => unreachable!("arrays of tables only hold tables"),
            },
            _ => unreachable!("the cursor only passes through tables"),
        };
    }
    table
}

/// Appends an empty table under `key`.
fn insert_table<'t, 'a>(
    table: &'t mut Table<'a>,
    index: &mut KeyIndex<'a>,
    alloc: &'a dyn Allocator,
    key: Key<'a>,
    kind: TableKind,
) -> Result<(usize, &'t mut Table<'a>), Error> {
    let position = table.try_insert(key, Value::Table(Table::new_in(alloc, kind)))?;
    index.record(table)?;
    match &mut table.entry_mut(position).1 {
        Value::Table(child) => Ok((position, child)),
        _ => unreachable!("entry was just inserted as a table"),
    }
}

/// Steps through an intermediate segment of a header path.
fn descend_header<'t, 'a>(
    table: &'t mut Table<'a>,
    index: &mut KeyIndex<'a>,
    alloc: &'a dyn Allocator,
    key: Key<'a>,
) -> Result<(usize, &'t mut Table<'a>), Error> {
    let Some(position) = index.find(table, &key.name) else {
        return insert_table(table, index, alloc, key, TableKind::Implicit);
    };
    let (existing, value) = table.entry_mut(position);
    let child = match value {
        Value::Table(child) if child.kind != TableKind::Inline => child,
        Value::Array(array) if array.is_array_of_tables() => match array.last_mut() {
            Some(Value::Table(child)) => child,
            _ => return Err(cannot_extend(&key, existing.span)),
        },
        _ => return Err(cannot_extend(&key, existing.span)),
    };
    Ok((position, child))
}

/// Resolves the final segment of a `[table]` header.
fn define_table<'a>(
    table: &mut Table<'a>,
    index: &mut KeyIndex<'a>,
    alloc: &'a dyn Allocator,
    key: Key<'a>,
) -> Result<usize, Error> {
    let Some(position) = index.find(table, &key.name) else {
        let (position, _) = insert_table(table, index, alloc, key, TableKind::Header)?;
        return Ok(position);
    };
    let (existing, value) = table.entry_mut(position);
    let first = existing.span;
    match value {
        Value::Table(child) => match child.kind {
            TableKind::Implicit => {
                child.kind = TableKind::Header;
                Ok(position)
            }
            TableKind::Header | TableKind::Dotted => Err(Error::new(
                ErrorKind::DuplicateTable {
                    name: key.name.to_string(),
                    first,
                },
                key.span,
            )),
            TableKind::Inline => Err(cannot_extend(&key, first)),
        },
        _ => Err(Error::new(
            ErrorKind::DuplicateKey {
                key: key.name.to_string(),
                first,
            },
            key.span,
        )),
    }
}

/// Resolves the final segment of a `[[array]]` header, appending a new table.
fn append_array_table<'a>(
    table: &mut Table<'a>,
    index: &mut KeyIndex<'a>,
    alloc: &'a dyn Allocator,
    key: Key<'a>,
) -> Result<usize, Error> {
    let element = Value::Table(Table::new_in(alloc, TableKind::Header));
    let Some(position) = index.find(table, &key.name) else {
        let mut array = Array::tables_in(alloc);
        array.try_push(element)?;
        let position = table.try_insert(key, Value::Array(array))?;
        index.record(table)?;
        return Ok(position);
    };
    let (existing, value) = table.entry_mut(position);
    match value {
        Value::Array(array) if array.is_array_of_tables() => {
            array.try_push(element)?;
            Ok(position)
        }
        Value::Table(_) => Err(Error::new(ErrorKind::RedefineAsArray, key.span)),
        _ => Err(cannot_extend(&key, existing.span)),
    }
}

/// Steps through a parent segment of a dotted key.
fn descend_dotted<'t, 'a>(
    table: &'t mut Table<'a>,
    index: &mut KeyIndex<'a>,
    alloc: &'a dyn Allocator,
    key: Key<'a>,
) -> Result<&'t mut Table<'a>, Error> {
    let Some(position) = index.find(table, &key.name) else {
        let (_, child) = insert_table(table, index, alloc, key, TableKind::Dotted)?;
        return Ok(child);
    };
    let (existing, value) = table.entry_mut(position);
    match value {
        Value::Table(child) if matches!(child.kind, TableKind::Implicit | TableKind::Dotted) => {
            Ok(child)
        }
        _ => Err(cannot_extend(&key, existing.span)),
    }
}

/// Assigns `value` to a possibly dotted key relative to `table`.
fn insert_dotted<'a>(
    mut table: &mut Table<'a>,
    index: &mut KeyIndex<'a>,
    alloc: &'a dyn Allocator,
    key: DottedKey<'a>,
    value: Value<'a>,
) -> Result<(), Error> {
    for parent in key.parents {
        table = descend_dotted(table, index, alloc, parent)?;
    }
    let last = key.last;
    if let Some(position) = index.find(table, &last.name) {
        let first = table.entries()[position].0.span;
        return Err(Error::new(
            ErrorKind::DuplicateKey {
                key: last.name.to_string(),
                first,
            },
            last.span,
        ));
    }
    table.try_insert(last, value)?;
    index.record(table)?;
    Ok(())
}
