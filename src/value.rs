#[cfg(test)]
#[path = "./value_tests.rs"]
mod tests;

use crate::Span;
use crate::array::Array;
use crate::str::Str;
use crate::table::Table;
use crate::time::{Date, Datetime, LocalDatetime, OffsetDatetime, Time};
use std::fmt;

/// A node of a parsed TOML tree.
///
/// Every node exclusively owns its children; dropping the root [`Table`]
/// releases the whole tree. Use the `as_*` accessors or match on the variants
/// directly.
///
/// # Examples
///
/// ```
/// let root = toml_tree::parse("n = 10\nname = \"x\"")?;
/// match root.get("n") {
///     Some(toml_tree::Value::Integer(n)) => assert_eq!(*n, 10),
///     other => panic!("unexpected {other:?}"),
/// }
/// assert_eq!(root.get("name").and_then(|v| v.as_str()), Some("x"));
/// # Ok::<(), toml_tree::Error>(())
/// ```
#[derive(PartialEq)]
pub enum Value<'a> {
    Table(Table<'a>),
    Array(Array<'a>),
    Integer(i64),
    Float(f64),
    String(Str<'a>),
    Boolean(bool),
    /// A date and time with an offset from UTC, e.g. `1979-05-27T07:32:00Z`.
    OffsetDatetime(OffsetDatetime),
    /// A date and time without an offset, e.g. `1979-05-27T07:32:00`.
    LocalDatetime(LocalDatetime),
    /// A bare date, e.g. `1979-05-27`.
    LocalDate(Date),
    /// A bare time of day, e.g. `07:32:00`.
    LocalTime(Time),
}

impl<'a> Value<'a> {
    /// Returns the TOML type name, e.g. `"string"`, `"integer"` or `"table"`.
    pub fn type_str(&self) -> &'static str {
        match self {
            Value::Table(_) => "table",
            Value::Array(_) => "array",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Boolean(_) => "boolean",
            Value::OffsetDatetime(_) => "offset datetime",
            Value::LocalDatetime(_) => "local datetime",
            Value::LocalDate(_) => "local date",
            Value::LocalTime(_) => "local time",
        }
    }

    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the value of a float. Integers are not converted.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    pub fn as_array(&self) -> Option<&Array<'a>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    #[inline]
    pub fn as_table(&self) -> Option<&Table<'a>> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    #[inline]
    pub fn as_offset_datetime(&self) -> Option<&OffsetDatetime> {
        match self {
            Value::OffsetDatetime(dt) => Some(dt),
            _ => None,
        }
    }

    #[inline]
    pub fn as_local_datetime(&self) -> Option<&LocalDatetime> {
        match self {
            Value::LocalDatetime(dt) => Some(dt),
            _ => None,
        }
    }

    #[inline]
    pub fn as_local_date(&self) -> Option<&Date> {
        match self {
            Value::LocalDate(d) => Some(d),
            _ => None,
        }
    }

    #[inline]
    pub fn as_local_time(&self) -> Option<&Time> {
        match self {
            Value::LocalTime(t) => Some(t),
            _ => None,
        }
    }

    /// Looks up `key` if this is a table.
    pub fn get(&self, key: &str) -> Option<&Value<'a>> {
        self.as_table()?.get(key)
    }

    /// Returns the element at `index` if this is an array.
    pub fn get_index(&self, index: usize) -> Option<&Value<'a>> {
        self.as_array()?.get(index)
    }

    /// Follows a path of table keys from this value.
    ///
    /// ```
    /// let root = toml_tree::parse("[server.tls]\nport = 443")?;
    /// let tls = root.get("server").unwrap();
    /// assert_eq!(tls.pointer(&["tls", "port"]).and_then(|v| v.as_integer()), Some(443));
    /// # Ok::<(), toml_tree::Error>(())
    /// ```
    pub fn pointer(&self, path: &[&str]) -> Option<&Value<'a>> {
        path.iter().try_fold(self, |value, key| value.get(key))
    }
}

impl From<Datetime> for Value<'_> {
    fn from(dt: Datetime) -> Self {
        match dt {
            Datetime::Offset(v) => Value::OffsetDatetime(v),
            Datetime::Local(v) => Value::LocalDatetime(v),
            Datetime::Date(v) => Value::LocalDate(v),
            Datetime::Time(v) => Value::LocalTime(v),
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Table(t) => fmt::Debug::fmt(t, f),
            Value::Array(a) => fmt::Debug::fmt(a, f),
            Value::Integer(i) => fmt::Debug::fmt(i, f),
            Value::Float(v) => fmt::Debug::fmt(v, f),
            Value::String(s) => fmt::Debug::fmt(s, f),
            Value::Boolean(b) => fmt::Debug::fmt(b, f),
            Value::OffsetDatetime(dt) => fmt::Display::fmt(dt, f),
            Value::LocalDatetime(dt) => fmt::Display::fmt(dt, f),
            Value::LocalDate(d) => fmt::Display::fmt(d, f),
            Value::LocalTime(t) => fmt::Display::fmt(t, f),
        }
    }
}

/// A table key and where it was written.
///
/// Keys compare by name only.
pub struct Key<'a> {
    /// The key text, with quotes removed and escapes resolved.
    pub name: Str<'a>,
    /// Where the key was written in the source document.
    pub span: Span,
}

impl<'a> Key<'a> {
    #[inline]
    pub fn as_str(&self) -> &str {
        self.name.as_str()
    }
}

impl std::borrow::Borrow<str> for Key<'_> {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.name, f)
    }
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl PartialEq for Key<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Key<'_> {}

impl std::hash::Hash for Key<'_> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}
