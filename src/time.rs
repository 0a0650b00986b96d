//! RFC 3339 dates and times as they appear in TOML documents.

#[cfg(test)]
#[path = "./time_tests.rs"]
mod tests;

use std::fmt;

/// A calendar date.
///
/// Month and day are range-checked at construction, including the leap-year
/// rule for February 29th.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Date {
    /// Year, `0..=9999`.
    pub year: u16,
    /// Month, `1..=12`.
    pub month: u8,
    /// Day of month, `1..=31` depending on the month.
    pub day: u8,
}

/// A time of day with microsecond precision.
///
/// Fractional seconds written with more than six digits are truncated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Time {
    /// Hour, `0..=23`.
    pub hour: u8,
    /// Minute, `0..=59`.
    pub minute: u8,
    /// Second, `0..=59`, or `60` for a leap second.
    pub second: u8,
    /// Sub-second part, `0..=999_999`.
    pub microsecond: u32,
}

/// Offset from UTC attached to an [`OffsetDatetime`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TimeOffset {
    /// Written as `Z` (or `z`).
    Z,
    /// Written as `-00:00`: the instant is known in UTC but the local offset
    /// is not.
    Unknown,
    /// Written as `+HH:MM` or `-HH:MM`.
    Custom {
        /// Signed offset in minutes.
        minutes: i16,
    },
}

/// A date and time pinned to an offset from UTC.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct OffsetDatetime {
    pub date: Date,
    pub time: Time,
    pub offset: TimeOffset,
}

/// A date and time with no offset; it does not name an instant.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LocalDatetime {
    pub date: Date,
    pub time: Time,
}

/// Any of the four temporal literals, as recognised by the lexer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Datetime {
    Offset(OffsetDatetime),
    Local(LocalDatetime),
    Date(Date),
    Time(Time),
}

fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: u16, month: u8) -> u8 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

impl Date {
    /// Returns `None` when the month or day is out of range.
    pub fn new(year: u16, month: u8, day: u8) -> Option<Date> {
        if year > 9999 || !(1..=12).contains(&month) {
            return None;
        }
        if day == 0 || day > days_in_month(year, month) {
            return None;
        }
        Some(Date { year, month, day })
    }
}

impl Time {
    /// Returns `None` when a field is out of range. Leap seconds are rejected;
    /// see [`Options::allow_leap_seconds`](crate::Options::allow_leap_seconds)
    /// for parsed input.
    pub fn new(hour: u8, minute: u8, second: u8, microsecond: u32) -> Option<Time> {
        if hour > 23 || minute > 59 || second > 59 || microsecond > 999_999 {
            return None;
        }
        Some(Time {
            hour,
            minute,
            second,
            microsecond,
        })
    }
}

/// Reads exactly `count` ASCII digits at `at`.
fn digits(input: &[u8], at: usize, count: usize) -> Result<u32, usize> {
    let mut value = 0;
    for i in at..at + count {
        match input.get(i) {
            Some(b @ b'0'..=b'9') => value = value * 10 + (b - b'0') as u32,
            _ => return Err(i),
        }
    }
    Ok(value)
}

fn byte(input: &[u8], at: usize, expected: u8) -> Result<(), usize> {
    if input.get(at) == Some(&expected) {
        Ok(())
    } else {
        Err(at)
    }
}

/// Bounded two-digit field at `at`; errors point at the field itself.
fn field(input: &[u8], at: usize, max: u32) -> Result<u8, usize> {
    let value = digits(input, at, 2)?;
    if value > max {
        return Err(at);
    }
    Ok(value as u8)
}

fn time_of_day(input: &[u8], at: usize, leap: bool) -> Result<(usize, Time), usize> {
    let hour = field(input, at, 23)?;
    byte(input, at + 2, b':')?;
    let minute = field(input, at + 3, 59)?;
    byte(input, at + 5, b':')?;
    let second = field(input, at + 6, if leap { 60 } else { 59 })?;
    let mut end = at + 8;

    let mut microsecond = 0;
    if input.get(end) == Some(&b'.') {
        end += 1;
        let first = end;
        let mut scale = 100_000;
        while let Some(b @ b'0'..=b'9') = input.get(end) {
            microsecond += (b - b'0') as u32 * scale;
            scale /= 10;
            end += 1;
        }
        if end == first {
            return Err(first);
        }
    }

    let time = Time {
        hour,
        minute,
        second,
        microsecond,
    };
    Ok((end, time))
}

fn offset(input: &[u8], at: usize) -> Result<Option<(usize, TimeOffset)>, usize> {
    let sign = match input.get(at) {
        Some(b'Z' | b'z') => return Ok(Some((at + 1, TimeOffset::Z))),
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return Ok(None),
    };
    let hours = field(input, at + 1, 23)? as i16;
    byte(input, at + 3, b':')?;
    let minutes = field(input, at + 4, 59)? as i16;
    let offset = match sign * (hours * 60 + minutes) {
        0 if sign < 0 => TimeOffset::Unknown,
        minutes => TimeOffset::Custom { minutes },
    };
    Ok(Some((at + 6, offset)))
}

impl Datetime {
    /// Recognises a temporal literal at the start of `input`.
    ///
    /// Returns `Ok(None)` when the input does not have the shape of a date or
    /// time (so it may still be a number), the consumed length and value on
    /// success, and the offset of the first offending byte when the input
    /// starts like a date or time but is malformed.
    pub(crate) fn munch(input: &[u8], leap: bool) -> Result<Option<(usize, Datetime)>, usize> {
        let is_digit = |i: usize| input.get(i).is_some_and(u8::is_ascii_digit);

        if is_digit(0) && is_digit(1) && input.get(2) == Some(&b':') {
            let (end, time) = time_of_day(input, 0, leap)?;
            return Ok(Some((end, Datetime::Time(time))));
        }
        if !((0..4).all(is_digit) && input.get(4) == Some(&b'-')) {
            return Ok(None);
        }

        let year = digits(input, 0, 4)? as u16;
        let month = field(input, 5, 12)?;
        if month == 0 {
            return Err(5);
        }
        byte(input, 7, b'-')?;
        let day = field(input, 8, 31)?;
        if day == 0 || day > days_in_month(year, month) {
            return Err(8);
        }
        let date = Date { year, month, day };

        let time_start = match input.get(10) {
            Some(b'T' | b't') => 11,
            Some(b' ') if is_digit(11) => 11,
            _ => return Ok(Some((10, Datetime::Date(date)))),
        };
        let (end, time) = time_of_day(input, time_start, leap)?;
        match offset(input, end)? {
            Some((end, offset)) => Ok(Some((
                end,
                Datetime::Offset(OffsetDatetime { date, time, offset }),
            ))),
            None => Ok(Some((end, Datetime::Local(LocalDatetime { date, time })))),
        }
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.microsecond != 0 {
            let mut frac = self.microsecond;
            let mut width = 6;
            while frac % 10 == 0 {
                frac /= 10;
                width -= 1;
            }
            write!(f, ".{frac:0width$}")?;
        }
        Ok(())
    }
}

impl fmt::Display for TimeOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TimeOffset::Z => f.write_str("Z"),
            TimeOffset::Unknown => f.write_str("-00:00"),
            TimeOffset::Custom { minutes } => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let minutes = minutes.unsigned_abs();
                write!(f, "{sign}{:02}:{:02}", minutes / 60, minutes % 60)
            }
        }
    }
}

impl fmt::Display for OffsetDatetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}{}", self.date, self.time, self.offset)
    }
}

impl fmt::Display for LocalDatetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}T{}", self.date, self.time)
    }
}
