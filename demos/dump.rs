//! Prints the tree parsed from a TOML file, or from stdin when no path is
//! given.
//!
//! ```text
//! cargo run --example dump -- Cargo.toml
//! cargo run --example dump --features reporting -- broken.toml
//! ```

use std::io::Read;
use std::process::ExitCode;
use toml_tree::{Error, Table, Value};

fn print_value(value: &Value<'_>, indent: usize) {
    match value {
        Value::Table(table) => {
            println!("table ({} entries)", table.len());
            print_table(table, indent + 1);
        }
        Value::Array(array) => {
            println!("array ({} elements)", array.len());
            for (i, element) in array.iter().enumerate() {
                print!("{:width$}[{i}] ", "", width = indent * 2 + 2);
                print_value(element, indent + 1);
            }
        }
        Value::String(s) => println!("string {:?}", s.as_str()),
        other => println!("{} {other:?}", other.type_str()),
    }
}

fn print_table(table: &Table<'_>, indent: usize) {
    for (key, value) in table {
        print!("{:width$}{key} = ", "", width = indent * 2);
        print_value(value, indent);
    }
}

fn report(err: &Error, name: &str, content: &str) {
    #[cfg(feature = "reporting")]
    if err.line_info.is_some() {
        use codespan_reporting::files::SimpleFiles;
        use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

        let mut files = SimpleFiles::new();
        let file_id = files.add(name, content);
        let diagnostic = err.to_diagnostic(file_id);
        let writer = StandardStream::stderr(ColorChoice::Auto);
        let config = codespan_reporting::term::Config::default();
        if codespan_reporting::term::emit_to_io_write(&mut writer.lock(), &config, &files, &diagnostic)
            .is_ok()
        {
            return;
        }
    }
    let _ = content;
    eprintln!("{name}: {:?} error: {err}", err.category());
}

fn main() -> ExitCode {
    let path = std::env::args().nth(1);
    let mut stdin_buf = Vec::new();
    let (name, result) = match &path {
        Some(path) => {
            let result = std::fs::File::open(path)
                .map_err(Error::from)
                .and_then(|mut file| toml_tree::parse_reader(&mut file));
            (path.as_str(), result)
        }
        None => {
            if let Err(err) = std::io::stdin().read_to_end(&mut stdin_buf) {
                eprintln!("<stdin>: {err}");
                return ExitCode::FAILURE;
            }
            ("<stdin>", toml_tree::parse_bytes(&stdin_buf))
        }
    };

    match result {
        Ok(root) => {
            print_table(&root, 0);
            ExitCode::SUCCESS
        }
        Err(err) => {
            let content = match &path {
                Some(path) => std::fs::read_to_string(path).unwrap_or_default(),
                None => String::from_utf8_lossy(&stdin_buf).into_owned(),
            };
            report(&err, name, &content);
            ExitCode::FAILURE
        }
    }
}
