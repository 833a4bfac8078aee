//! Fuzz target: signature text parser.
//!
//! Invariants checked:
//! - Parsing never panics.
//! - Error offsets stay within the input.
//! - An accepted signature prints to text that parses back to the same signature.

#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.len() > 4 * 1024 {
        return;
    }
    let text = String::from_utf8_lossy(data);
    match accel_sig::parse_signature(&text) {
        Ok(signature) => {
            let printed = signature.to_string();
            let reparsed = accel_sig::parse_signature(&printed)
                .unwrap_or_else(|err| panic!("{printed:?} does not reparse: {err}"));
            assert_eq!(reparsed, signature);
        }
        Err(err) => assert!(err.offset <= text.len()),
    }
});
