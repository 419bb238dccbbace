#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|source: &str| {
    // Parsing may fail, but only ever with a syntax error
    if let Err(error) = attolisp::parse(source) {
        assert_eq!(error.kind(), "SyntaxError");
    }
});
