#![no_main]

use libfuzzer_sys::fuzz_target;
use toml_tree::{ErrorKind, Options, TimeOffset, Value};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // The toml crate has no notion of leap seconds.
    let ours = Options::new().allow_leap_seconds(false).parse(text);
    let theirs = text.parse::<toml::Table>();

    match (ours, theirs) {
        (Ok(root), Ok(toml_tbl)) => {
            let toml_val = toml::Value::Table(toml_tbl);
            let ours = Value::Table(root);
            assert!(
                values_match(&ours, &toml_val),
                "values differ for input:\n{text}\nours: {ours:?}\ntoml: {toml_val:?}"
            );
        }
        (Ok(root), Err(toml_err)) => {
            panic!(
                "accepted input the toml crate rejects!\n\
                 input:\n{text}\n\
                 ours: {root:?}\n\
                 toml error: {toml_err}"
            );
        }
        (Err(err), Ok(toml_tbl)) => {
            // Nesting is capped here but not in the toml crate.
            assert!(
                err.kind == ErrorKind::NestingTooDeep,
                "rejected input the toml crate accepts!\n\
                 input:\n{text}\n\
                 toml: {toml_tbl:?}\n\
                 error: {err:?}"
            );
        }
        (Err(_), Err(_)) => {}
    }
});

fn dates_match(ours: &toml_tree::Date, theirs: Option<toml::value::Date>) -> bool {
    theirs.is_some_and(|d| {
        d.year == ours.year && d.month == ours.month && d.day == ours.day
    })
}

fn times_match(ours: &toml_tree::Time, theirs: Option<toml::value::Time>) -> bool {
    theirs.is_some_and(|t| t.hour == ours.hour && t.minute == ours.minute)
}

fn offsets_match(ours: &TimeOffset, theirs: Option<toml::value::Offset>) -> bool {
    match (ours, theirs) {
        (TimeOffset::Z, Some(toml::value::Offset::Z)) => true,
        (TimeOffset::Unknown, Some(toml::value::Offset::Custom { minutes: 0 })) => true,
        (TimeOffset::Custom { minutes }, Some(toml::value::Offset::Custom { minutes: m })) => {
            *minutes == m
        }
        _ => false,
    }
}

/// Strict recursive comparison between our tree and a `toml::Value`.
fn values_match(ours: &Value<'_>, theirs: &toml::Value) -> bool {
    match (ours, theirs) {
        (Value::String(s), toml::Value::String(t)) => &**s == t,
        (Value::Integer(a), toml::Value::Integer(b)) => a == b,
        (Value::Float(a), toml::Value::Float(b)) => (a.is_nan() && b.is_nan()) || a == b,
        (Value::Boolean(a), toml::Value::Boolean(b)) => a == b,
        (Value::OffsetDatetime(dt), toml::Value::Datetime(t)) => {
            dates_match(&dt.date, t.date)
                && times_match(&dt.time, t.time)
                && offsets_match(&dt.offset, t.offset)
        }
        (Value::LocalDatetime(dt), toml::Value::Datetime(t)) => {
            dates_match(&dt.date, t.date) && times_match(&dt.time, t.time) && t.offset.is_none()
        }
        (Value::LocalDate(d), toml::Value::Datetime(t)) => {
            dates_match(d, t.date) && t.time.is_none()
        }
        (Value::LocalTime(tm), toml::Value::Datetime(t)) => {
            t.date.is_none() && times_match(tm, t.time)
        }
        (Value::Array(sa), toml::Value::Array(ta)) => {
            sa.len() == ta.len() && sa.iter().zip(ta.iter()).all(|(s, t)| values_match(s, t))
        }
        (Value::Table(st), toml::Value::Table(tt)) => {
            st.len() == tt.len()
                && st
                    .iter()
                    .zip(tt.iter())
                    .all(|((sk, sv), (tk, tv))| sk.as_str() == tk && values_match(sv, tv))
        }
        _ => false,
    }
}
