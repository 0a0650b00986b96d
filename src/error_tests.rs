use super::*;

#[test]
fn display_all_error_kinds() {
    let cases: Vec<(ErrorKind, &str)> = vec![
        (ErrorKind::Io(std::io::ErrorKind::NotFound), "io"),
        (ErrorKind::FileTooLarge, "file-too-large"),
        (ErrorKind::OutOfMemory { size: 64 }, "out-of-memory"),
        (ErrorKind::InvalidUtf8, "invalid-utf8"),
        (ErrorKind::UnexpectedEof, "unexpected-eof"),
        (ErrorKind::InvalidCharInString('x'), "invalid-char-in-string"),
        (ErrorKind::InvalidCharInComment('\0'), "invalid-char-in-comment"),
        (ErrorKind::InvalidEscape('z'), "invalid-escape"),
        (ErrorKind::InvalidHexEscape('g'), "invalid-hex-escape"),
        (ErrorKind::InvalidEscapeValue(0xD800), "invalid-escape-value"),
        (ErrorKind::Unexpected('!'), "unexpected"),
        (ErrorKind::UnterminatedString, "unterminated-string"),
        (ErrorKind::InvalidNumber, "invalid-number"),
        (ErrorKind::InvalidDigit { digit: '9', radix: 8 }, "invalid-digit"),
        (ErrorKind::LeadingZero, "leading-zero"),
        (ErrorKind::OutOfRange("i64"), "out-of-range"),
        (ErrorKind::InvalidDatetime, "invalid-datetime"),
        (ErrorKind::UnquotedString, "unquoted-string"),
        (ErrorKind::MultilineStringKey, "multiline-string-key"),
        (
            ErrorKind::Wanted {
                expected: "a string",
                found: "an integer",
            },
            "wanted",
        ),
        (ErrorKind::NestingTooDeep, "nesting-too-deep"),
        (
            ErrorKind::DuplicateTable {
                name: "t".into(),
                first: Span::new(0, 1),
            },
            "duplicate-table",
        ),
        (
            ErrorKind::DuplicateKey {
                key: "k".into(),
                first: Span::new(0, 1),
            },
            "duplicate-key",
        ),
        (ErrorKind::RedefineAsArray, "redefine-as-array"),
        (
            ErrorKind::CannotExtend {
                key: "k".into(),
                first: Span::new(0, 1),
            },
            "cannot-extend",
        ),
    ];
    for (kind, expected) in cases {
        assert_eq!(kind.to_string(), expected);
        assert_eq!(format!("{kind:?}"), expected);
    }
}

#[test]
fn categories() {
    let cases = [
        (ErrorKind::Io(std::io::ErrorKind::UnexpectedEof), Category::Io),
        (ErrorKind::FileTooLarge, Category::Io),
        (ErrorKind::OutOfMemory { size: 1 }, Category::Alloc),
        (ErrorKind::InvalidUtf8, Category::Syntax),
        (ErrorKind::UnexpectedEof, Category::Syntax),
        (ErrorKind::InvalidDatetime, Category::Syntax),
        (ErrorKind::NestingTooDeep, Category::Syntax),
        (ErrorKind::RedefineAsArray, Category::Semantic),
        (
            ErrorKind::DuplicateKey {
                key: "a".into(),
                first: Span::default(),
            },
            Category::Semantic,
        ),
    ];
    for (kind, category) in cases {
        assert_eq!(kind.category(), category, "kind: {kind}");
    }
}

#[test]
fn error_messages() {
    let cases = [
        (
            ErrorKind::Io(std::io::ErrorKind::NotFound),
            "error reading from input stream: entity not found",
        ),
        (
            ErrorKind::OutOfMemory { size: 128 },
            "memory allocation of 128 bytes failed",
        ),
        (
            ErrorKind::InvalidDigit {
                digit: '2',
                radix: 2,
            },
            "invalid digit `2` in binary literal",
        ),
        (
            ErrorKind::InvalidDigit {
                digit: 'a',
                radix: 10,
            },
            "invalid digit `a` in decimal literal",
        ),
        (ErrorKind::InvalidCharInString('\n'), "invalid character in string: `\\n`"),
        (ErrorKind::InvalidEscapeValue(0xD800), "invalid escape value: `0xD800`"),
        (ErrorKind::OutOfRange("i64"), "number is out of range of 'i64'"),
        (
            ErrorKind::Wanted {
                expected: "a newline",
                found: "an identifier",
            },
            "expected a newline, found an identifier",
        ),
        (
            ErrorKind::DuplicateKey {
                key: "name".into(),
                first: Span::new(0, 4),
            },
            "duplicate key: `name`",
        ),
        (
            ErrorKind::DuplicateTable {
                name: "server".into(),
                first: Span::new(1, 7),
            },
            "redefinition of table `server`",
        ),
        (
            ErrorKind::CannotExtend {
                key: "a".into(),
                first: Span::new(0, 1),
            },
            "cannot extend `a`, it is not a table that accepts new keys",
        ),
    ];
    for (kind, expected) in cases {
        assert_eq!(Error::new(kind, Span::default()).to_string(), expected);
    }
}

#[test]
fn line_column_counts_characters() {
    let text = "ab\ncé d\n\nxyz";
    assert_eq!(line_column(text, 0), (1, 1));
    assert_eq!(line_column(text, 2), (1, 3));
    assert_eq!(line_column(text, 3), (2, 1));
    // `é` is two bytes but one column.
    assert_eq!(line_column(text, 7), (2, 4));
    assert_eq!(line_column(text, 9), (3, 1));
    assert_eq!(line_column(text, 10), (4, 1));
    assert_eq!(line_column(text, 100), (4, 4));
}

#[test]
fn locate_skips_io_and_alloc() {
    let text = "a = 1\nb = 2";

    let err = Error::new(ErrorKind::UnexpectedEof, Span::new(8, 9)).locate(text);
    assert_eq!(err.line_info, Some((2, 3)));
    assert_eq!(err.to_string(), "unexpected eof encountered at line 2 column 3");

    let err = Error::from(AllocError { size: 8 }).locate(text);
    assert_eq!(err.category(), Category::Alloc);
    assert_eq!(err.line_info, None);
    assert_eq!(err.line(), None);

    let err = Error::io(std::io::Error::other("boom")).locate(text);
    assert_eq!(err.kind, ErrorKind::Io(std::io::ErrorKind::Other));
    assert_eq!(err.column(), None);
}

#[test]
fn from_kind_and_span() {
    let err = Error::from((ErrorKind::LeadingZero, Span::new(4, 6)));
    assert_eq!(err.kind, ErrorKind::LeadingZero);
    assert_eq!(err.span, Span::new(4, 6));
    assert_eq!(err.line_info, None);
}

#[cfg(feature = "reporting")]
#[test]
fn diagnostics_carry_labels() {
    let err = Error::new(
        ErrorKind::DuplicateKey {
            key: "a".into(),
            first: Span::new(0, 1),
        },
        Span::new(6, 7),
    )
    .locate("a = 1\na = 2");
    let diag = err.to_diagnostic(());
    assert_eq!(diag.code.as_deref(), Some("duplicate-key"));
    assert_eq!(diag.message, "duplicate key `a`");
    assert_eq!(diag.labels.len(), 2);

    let err = Error::new(ErrorKind::InvalidNumber, Span::new(4, 5)).locate("a = _");
    let diag = err.to_diagnostic(());
    assert_eq!(diag.message, "invalid number");
    assert_eq!(diag.labels[0].range, 4..5);
}
