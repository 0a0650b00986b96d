#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    match toml_tree::parse_bytes(data) {
        Ok(mut root) => {
            std::hint::black_box(&mut root);
        }
        Err(err) => {
            // Positioned errors always point inside the input.
            assert!(err.span.start as usize <= data.len(), "{err:?}");
            if let Some((line, column)) = err.line_info {
                assert!(line >= 1 && column >= 1);
            }
        }
    }
});
