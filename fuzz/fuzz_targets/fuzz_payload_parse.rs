//! Fuzz the weather provider payload parser with arbitrary bytes.
//!
//! The parser must reject malformed input with an error, never panic.

#![no_main]

use libfuzzer_sys::fuzz_target;

use nightglow::adapters::darksky::parse_payload;

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = core::str::from_utf8(data) {
        let _ = parse_payload(body);
    }
});
