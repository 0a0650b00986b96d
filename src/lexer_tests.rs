use super::{Lexer, Mode, TokenKind};
use crate::Span;
use crate::alloc::GLOBAL;
use crate::error::{Error, ErrorKind};
use crate::time::{Date, Datetime, Time};

fn describe_all(input: &str, mode: Mode) -> Vec<&'static str> {
    let mut lexer = Lexer::new(input, &GLOBAL, true);
    let mut out = Vec::new();
    loop {
        let token = lexer
            .next(mode)
            .unwrap_or_else(|e| panic!("lex failed for {input:?}: {e}"));
        if matches!(token.kind, TokenKind::Eof) {
            return out;
        }
        out.push(token.kind.describe());
    }
}

fn value(input: &str) -> TokenKind<'static> {
    let mut lexer = Lexer::new(input, &GLOBAL, true);
    match lexer.next(Mode::Value) {
        Ok(token) => token.kind,
        Err(e) => panic!("lex failed for {input:?}: {e}"),
    }
}

fn value_err(input: &str) -> Error {
    let mut lexer = Lexer::new(input, &GLOBAL, true);
    match lexer.next(Mode::Value) {
        Ok(token) => panic!("expected error for {input:?}, got {}", token.kind.describe()),
        Err(e) => e,
    }
}

#[test]
fn key_context_tokens() {
    assert_eq!(
        describe_all("[[a.b]] = ,", Mode::Key),
        ["`[[`", "an identifier", "a period", "an identifier", "`]]`", "an equals", "a comma"]
    );
    assert_eq!(
        describe_all("{ x }", Mode::Key),
        ["a left brace", "an identifier", "a right brace"]
    );
    // Digits are bare keys in key context.
    assert_eq!(describe_all("1234.5", Mode::Key), ["an identifier", "a period", "an identifier"]);
}

#[test]
fn value_context_brackets_are_single() {
    assert_eq!(
        describe_all("[[1]]", Mode::Value),
        ["a left bracket", "a left bracket", "an integer", "a right bracket", "a right bracket"]
    );
}

#[test]
fn bare_key_span_and_text() {
    let input = "  server-1_a = 1";
    let mut lexer = Lexer::new(input, &GLOBAL, true);
    let token = lexer.next(Mode::Key).unwrap();
    assert!(matches!(token.kind, TokenKind::BareKey));
    assert_eq!(token.span, Span::new(2, 12));
    assert_eq!(lexer.slice(token.span), "server-1_a");
}

#[test]
fn newlines_and_comments() {
    assert_eq!(
        describe_all("a # comment\r\n\n# only\n", Mode::Key),
        ["an identifier", "a newline", "a newline", "a newline"]
    );
    assert_eq!(describe_all("\t  # tabs\tinside", Mode::Key), Vec::<&str>::new());
}

#[test]
fn byte_order_mark_is_skipped() {
    let mut lexer = Lexer::new("\u{FEFF}a", &GLOBAL, true);
    let token = lexer.next(Mode::Key).unwrap();
    assert!(matches!(token.kind, TokenKind::BareKey));
    assert_eq!(token.span.start, 3);
}

#[test]
fn strings() {
    let cases = [
        (r#""hello""#, "hello", false),
        (r#""""#, "", false),
        (r#""tab\there""#, "tab\there", false),
        (r#""\b\f\r\n\"\\""#, "\u{8}\u{c}\r\n\"\\", false),
        (r#""\u00e9\U0001F600""#, "é😀", false),
        (r#"'C:\raw\path'"#, "C:\\raw\\path", false),
        ("\"\"\"\nfirst\nsecond\"\"\"", "first\nsecond", true),
        ("\"\"\"\r\nkeeps\r\ncrlf\"\"\"", "keeps\r\ncrlf", true),
        ("\"\"\"a \\\n    b\"\"\"", "a b", true),
        ("\"\"\"one\"\"two\"\"\"\"\"", "one\"\"two\"\"", true),
        ("'''\nliteral\\n'''", "literal\\n", true),
        ("''''quoted'''''", "'quoted''", true),
    ];
    for (input, expected, is_multiline) in cases {
        match value(input) {
            TokenKind::String { value, multiline } => {
                assert_eq!(&*value, expected, "input: {input}");
                assert_eq!(multiline, is_multiline, "input: {input}");
            }
            other => panic!("input: {input}, got {}", other.describe()),
        }
    }
}

#[test]
fn string_errors() {
    let cases = [
        (r#""abc"#, ErrorKind::UnterminatedString),
        (r#""a\qb""#, ErrorKind::InvalidEscape('q')),
        (r#""\uD800""#, ErrorKind::InvalidEscapeValue(0xD800)),
        (r#""\U00110000""#, ErrorKind::InvalidEscapeValue(0x110000)),
        (r#""\u00G1""#, ErrorKind::InvalidHexEscape('G')),
        ("\"a\u{1}\"", ErrorKind::InvalidCharInString('\u{1}')),
        ("\"a\nb\"", ErrorKind::InvalidCharInString('\n')),
        ("'a\u{7f}'", ErrorKind::InvalidCharInString('\u{7f}')),
        ("\"\"\"a\\ b\"\"\"", ErrorKind::InvalidEscape(' ')),
        ("'''never closed", ErrorKind::UnterminatedString),
    ];
    for (input, kind) in cases {
        assert_eq!(value_err(input).kind, kind, "input: {input}");
    }
}

#[test]
fn escape_error_spans() {
    let err = value_err(r#""ab\x""#);
    assert_eq!(err.span, Span::new(3, 5));
    let err = value_err("\"ab");
    assert_eq!(err.span, Span::new(0, 3));
}

#[test]
fn integers() {
    let cases = [
        ("0", 0),
        ("+17", 17),
        ("-17", -17),
        ("1_000", 1000),
        ("0xDEAD_beef", 0xDEAD_BEEF),
        ("0o755", 0o755),
        ("0b1101", 0b1101),
        ("9223372036854775807", i64::MAX),
        ("-9223372036854775808", i64::MIN),
        ("0x7FFFFFFFFFFFFFFF", i64::MAX),
    ];
    for (input, expected) in cases {
        match value(input) {
            TokenKind::Integer(i) => assert_eq!(i, expected, "input: {input}"),
            other => panic!("input: {input}, got {}", other.describe()),
        }
    }
}

#[test]
fn floats() {
    let cases = [
        ("3.14", 3.14),
        ("-0.5", -0.5),
        ("+1e3", 1000.0),
        ("6.626e-34", 6.626e-34),
        ("1E+2", 100.0),
        ("9_224.5_5", 9224.55),
        ("inf", f64::INFINITY),
        ("+inf", f64::INFINITY),
        ("-inf", f64::NEG_INFINITY),
    ];
    for (input, expected) in cases {
        match value(input) {
            TokenKind::Float(f) => assert_eq!(f, expected, "input: {input}"),
            other => panic!("input: {input}, got {}", other.describe()),
        }
    }
    for input in ["nan", "+nan", "-nan"] {
        match value(input) {
            TokenKind::Float(f) => assert!(f.is_nan(), "input: {input}"),
            other => panic!("input: {input}, got {}", other.describe()),
        }
    }
}

#[test]
fn booleans_and_bare_words() {
    assert!(matches!(value("true"), TokenKind::Boolean(true)));
    assert!(matches!(value("false,"), TokenKind::Boolean(false)));
    assert_eq!(value_err("truex").kind, ErrorKind::UnquotedString);
    assert_eq!(value_err("hello").kind, ErrorKind::UnquotedString);
    assert_eq!(value_err("_1").kind, ErrorKind::UnquotedString);
}

#[test]
fn number_errors() {
    let cases = [
        ("0b102", ErrorKind::InvalidDigit { digit: '2', radix: 2 }, 4),
        ("0o78", ErrorKind::InvalidDigit { digit: '8', radix: 8 }, 3),
        ("0xfg", ErrorKind::InvalidDigit { digit: 'g', radix: 16 }, 3),
        ("12a", ErrorKind::InvalidDigit { digit: 'a', radix: 10 }, 2),
        ("0x", ErrorKind::InvalidNumber, 1),
        ("012", ErrorKind::LeadingZero, 0),
        ("-012", ErrorKind::LeadingZero, 1),
        ("1__0", ErrorKind::InvalidNumber, 1),
        ("1_", ErrorKind::InvalidNumber, 1),
        ("1.", ErrorKind::InvalidNumber, 1),
        ("1.e5", ErrorKind::InvalidNumber, 2),
        ("1e", ErrorKind::InvalidNumber, 1),
        ("+", ErrorKind::InvalidNumber, 0),
        ("9223372036854775808", ErrorKind::OutOfRange("i64"), 0),
        ("-9223372036854775809", ErrorKind::OutOfRange("i64"), 0),
        ("0x8000000000000000", ErrorKind::OutOfRange("i64"), 0),
        ("1e999", ErrorKind::OutOfRange("f64"), 0),
    ];
    for (input, kind, start) in cases {
        let err = value_err(input);
        assert_eq!(err.kind, kind, "input: {input}");
        assert_eq!(err.span.start, start, "input: {input}");
    }
}

#[test]
fn literal_must_end_at_delimiter() {
    assert_eq!(value_err("1;").kind, ErrorKind::Unexpected(';'));
    assert_eq!(value_err("true=").kind, ErrorKind::Unexpected('='));
    for input in ["1 ", "1\n", "1\r\n", "1#c", "1,", "1]", "1}"] {
        assert!(matches!(value(input), TokenKind::Integer(1)), "input: {input:?}");
    }
}

#[test]
fn datetimes() {
    let date = Date::new(1979, 5, 27).unwrap();
    let time = Time::new(7, 32, 0, 0).unwrap();
    match value("1979-05-27") {
        TokenKind::Datetime(dt) => assert_eq!(dt, Datetime::Date(date)),
        other => panic!("got {}", other.describe()),
    }
    match value("07:32:00") {
        TokenKind::Datetime(dt) => assert_eq!(dt, Datetime::Time(time)),
        other => panic!("got {}", other.describe()),
    }
    assert!(matches!(
        value("1979-05-27T07:32:00Z"),
        TokenKind::Datetime(Datetime::Offset(_))
    ));
    assert!(matches!(
        value("1979-05-27 07:32:00"),
        TokenKind::Datetime(Datetime::Local(_))
    ));

    let err = value_err("1979-13-01");
    assert_eq!(err.kind, ErrorKind::InvalidDatetime);
    assert_eq!(err.span.start, 5);
}

#[test]
fn leap_seconds_follow_lexer_setting() {
    assert!(matches!(value("23:59:60"), TokenKind::Datetime(_)));

    let mut lexer = Lexer::new("23:59:60", &GLOBAL, false);
    let err = match lexer.next(Mode::Value) {
        Ok(token) => panic!("got {}", token.kind.describe()),
        Err(e) => e,
    };
    assert_eq!(err.kind, ErrorKind::InvalidDatetime);
}

#[test]
fn unexpected_characters() {
    let mut lexer = Lexer::new("@", &GLOBAL, true);
    let err = lexer.next(Mode::Key).err().unwrap();
    assert_eq!(err.kind, ErrorKind::Unexpected('@'));

    let mut lexer = Lexer::new("a\rb", &GLOBAL, true);
    assert!(matches!(lexer.next(Mode::Key).unwrap().kind, TokenKind::BareKey));
    let err = lexer.next(Mode::Key).err().unwrap();
    assert_eq!(err.kind, ErrorKind::Unexpected('\r'));

    // A period outside key context is not a token of its own.
    assert_eq!(value_err(".5").kind, ErrorKind::Unexpected('.'));

    let mut lexer = Lexer::new("é", &GLOBAL, true);
    let err = lexer.next(Mode::Key).err().unwrap();
    assert_eq!(err.kind, ErrorKind::Unexpected('é'));
    assert_eq!(err.span, Span::new(0, 2));
}

#[test]
fn control_characters_in_comments() {
    let mut lexer = Lexer::new("# bad \u{0} here", &GLOBAL, true);
    let err = lexer.next(Mode::Key).err().unwrap();
    assert_eq!(err.kind, ErrorKind::InvalidCharInComment('\0'));
    assert_eq!(err.span.start, 6);
}
