#![cfg_attr(docsrs, doc(cfg(feature = "serde")))]

//! Provides [`serde::Serialize`] for parsed trees.
//!
//! Tables serialize as maps in document order and arrays as sequences. Dates
//! and times serialize as their RFC 3339 text.

use crate::{Array, Date, LocalDatetime, OffsetDatetime, Str, Table, Time, Value};
use serde::ser::{SerializeMap, SerializeSeq};

impl serde::Serialize for Value<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Value::Table(t) => t.serialize(ser),
            Value::Array(a) => a.serialize(ser),
            Value::Integer(i) => ser.serialize_i64(*i),
            Value::Float(f) => ser.serialize_f64(*f),
            Value::String(s) => ser.serialize_str(s),
            Value::Boolean(b) => ser.serialize_bool(*b),
            Value::OffsetDatetime(dt) => dt.serialize(ser),
            Value::LocalDatetime(dt) => dt.serialize(ser),
            Value::LocalDate(d) => d.serialize(ser),
            Value::LocalTime(t) => t.serialize(ser),
        }
    }
}

impl serde::Serialize for Table<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut map = ser.serialize_map(Some(self.len()))?;
        for (k, v) in self {
            map.serialize_entry(k.as_str(), v)?;
        }
        map.end()
    }
}

impl serde::Serialize for Array<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut seq = ser.serialize_seq(Some(self.len()))?;
        for element in self {
            seq.serialize_element(element)?;
        }
        seq.end()
    }
}

impl serde::Serialize for Str<'_> {
    fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        ser.serialize_str(self)
    }
}

macro_rules! serialize_as_text {
    ($($ty:ty),*) => {$(
        impl serde::Serialize for $ty {
            fn serialize<S>(&self, ser: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                ser.collect_str(self)
            }
        }
    )*};
}

serialize_as_text!(OffsetDatetime, LocalDatetime, Date, Time);
