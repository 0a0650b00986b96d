use super::*;

fn munch(input: &str) -> Result<Option<(usize, Datetime)>, usize> {
    Datetime::munch(input.as_bytes(), true)
}

#[track_caller]
fn parse_ok(input: &str) -> (usize, Datetime) {
    match munch(input) {
        Ok(Some(found)) => found,
        other => panic!("expected datetime for {input:?}, got {other:?}"),
    }
}

#[track_caller]
fn expect_err(input: &str, offset: usize) {
    assert_eq!(munch(input), Err(offset), "input: {input}");
}

fn render(dt: Datetime) -> String {
    match dt {
        Datetime::Offset(v) => v.to_string(),
        Datetime::Local(v) => v.to_string(),
        Datetime::Date(v) => v.to_string(),
        Datetime::Time(v) => v.to_string(),
    }
}

#[test]
fn roundtrips() {
    let exact = &[
        "1979-05-27T07:32:00Z",
        "1979-05-27T07:32:00+00:00",
        "1979-05-27T00:32:00-23:00",
        "2000-12-17T00:32:00.5-07:00",
        "1979-05-27T00:32:00.999999+21:20",
        "1979-05-27T07:32:00",
        "1979-05-27T07:32:00.5",
        "2023-06-15T12:30:45.123Z",
        "2023-01-01T23:59:59",
        "1979-05-27",
        "0000-01-01",
        "9999-12-31",
        "07:32:00",
        "00:32:00.000001",
        "23:59:59.25",
    ];
    for input in exact {
        let (len, dt) = parse_ok(input);
        assert_eq!(len, input.len(), "input: {input}");
        assert_eq!(render(dt), *input);
    }
}

#[test]
fn lossy_forms_normalise() {
    let cases = &[
        ("1979-05-27 07:32:00Z", "1979-05-27T07:32:00Z"),
        ("1979-05-27t07:32:00z", "1979-05-27T07:32:00Z"),
        ("1979-05-27T07:32:00.999999999", "1979-05-27T07:32:00.999999"),
        ("1979-05-27T07:32:00.1234567-00:00", "1979-05-27T07:32:00.123456-00:00"),
        ("1979-05-27T07:32:00+00:00", "1979-05-27T07:32:00+00:00"),
        ("07:32:00.500", "07:32:00.5"),
        ("07:32:00.000", "07:32:00"),
    ];
    for (input, expected) in cases {
        let (len, dt) = parse_ok(input);
        assert_eq!(len, input.len(), "input: {input}");
        assert_eq!(render(dt), *expected, "input: {input}");
    }
}

#[test]
fn variants() {
    let (_, dt) = parse_ok("1979-05-27T07:32:00-08:00");
    let Datetime::Offset(v) = dt else {
        panic!("expected offset datetime")
    };
    assert_eq!(v.date, Date::new(1979, 5, 27).unwrap());
    assert_eq!(v.time, Time::new(7, 32, 0, 0).unwrap());
    assert_eq!(v.offset, TimeOffset::Custom { minutes: -480 });

    assert!(matches!(parse_ok("1979-05-27T07:32:00").1, Datetime::Local(_)));
    assert!(matches!(parse_ok("1979-05-27").1, Datetime::Date(_)));
    assert!(matches!(parse_ok("07:32:00").1, Datetime::Time(_)));
}

#[test]
fn not_a_datetime() {
    for input in ["", "1", "123", "1234", "12345", "1_000", "0x1F", "3.14", "1e5", "-12:00:00"] {
        assert_eq!(munch(input), Ok(None), "input: {input}");
    }
}

#[test]
fn date_followed_by_other_text() {
    // A space not followed by a digit ends the date.
    assert_eq!(parse_ok("1979-05-27 # comment").0, 10);
    assert_eq!(parse_ok("1979-05-27 ").0, 10);
    assert_eq!(parse_ok("1979-05-27,").0, 10);
    // Trailing bytes after the time are left for the caller to judge.
    assert_eq!(parse_ok("07:32:00Z").0, 8);
    assert_eq!(parse_ok("1979-05-27T07:32:00Zx").0, 20);
}

#[test]
fn calendar_validation() {
    parse_ok("2024-02-29");
    parse_ok("2000-02-29");
    expect_err("2023-02-29", 8);
    expect_err("1900-02-29", 8);
    expect_err("2023-04-31", 8);
    expect_err("2023-13-01", 5);
    expect_err("2023-00-01", 5);
    expect_err("2023-01-00", 8);
    expect_err("2023-01-32", 8);
}

#[test]
fn time_validation() {
    expect_err("24:00:00", 0);
    expect_err("23:60:00", 3);
    expect_err("23:59:61", 6);
    expect_err("1979-05-27T25:00:00", 11);
    expect_err("1979-05-27T07:32", 16);
    expect_err("07:32", 5);
    expect_err("07:32:0", 7);
    expect_err("07:32:00.", 9);
    expect_err("1979-05-27T", 11);
    expect_err("1979-05-27Tx", 11);
}

#[test]
fn offset_validation() {
    expect_err("1979-05-27T07:32:00+24:00", 20);
    expect_err("1979-05-27T07:32:00+05:60", 23);
    expect_err("1979-05-27T07:32:00+0500", 22);
    expect_err("1979-05-27T07:32:00-", 20);
}

#[test]
fn malformed_dates() {
    expect_err("1979-5-27", 6);
    expect_err("1979-05-7", 9);
    expect_err("1979-05/27", 7);
    expect_err("1979-ab-27", 5);
}

#[test]
fn leap_seconds() {
    let (_, dt) = parse_ok("1990-12-31T23:59:60Z");
    let Datetime::Offset(v) = dt else {
        panic!("expected offset datetime")
    };
    assert_eq!(v.time.second, 60);

    assert_eq!(
        Datetime::munch(b"1990-12-31T23:59:60Z", false),
        Err(17)
    );
    assert_eq!(Datetime::munch(b"23:59:60", false), Err(6));
    assert!(Time::new(23, 59, 60, 0).is_none());
}

#[test]
fn constructors() {
    assert!(Date::new(2024, 2, 29).is_some());
    assert!(Date::new(2023, 2, 29).is_none());
    assert!(Date::new(10000, 1, 1).is_none());
    assert!(Date::new(2023, 0, 1).is_none());
    assert!(Time::new(0, 0, 0, 999_999).is_some());
    assert!(Time::new(0, 0, 0, 1_000_000).is_none());
    assert!(Time::new(24, 0, 0, 0).is_none());
}

#[test]
fn offset_display() {
    assert_eq!(TimeOffset::Z.to_string(), "Z");
    assert_eq!(TimeOffset::Custom { minutes: 0 }.to_string(), "+00:00");
    assert_eq!(TimeOffset::Custom { minutes: 330 }.to_string(), "+05:30");
    assert_eq!(TimeOffset::Custom { minutes: -90 }.to_string(), "-01:30");
    assert_eq!(TimeOffset::Unknown.to_string(), "-00:00");
}

#[test]
fn negative_zero_offset_is_unknown() {
    let offset_of = |input: &str| match parse_ok(input).1 {
        Datetime::Offset(v) => v.offset,
        other => panic!("expected offset datetime, got {other:?}"),
    };
    assert_eq!(offset_of("2000-01-01T00:00:00-00:00"), TimeOffset::Unknown);
    assert_eq!(offset_of("2000-01-01T00:00:00+00:00"), TimeOffset::Custom { minutes: 0 });
    assert_eq!(offset_of("2000-01-01T00:00:00-00:01"), TimeOffset::Custom { minutes: -1 });
    assert_eq!(offset_of("2000-01-01T00:00:00Z"), TimeOffset::Z);
}

#[test]
fn leap_year_rule() {
    assert!(is_leap_year(2000));
    assert!(is_leap_year(2024));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2023));
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2023, 2), 28);
    assert_eq!(days_in_month(2023, 11), 30);
    assert_eq!(days_in_month(2023, 12), 31);
}
