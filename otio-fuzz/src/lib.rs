//! Never-panic harnesses for the otio-core decoder
//!
//! To use with cargo-fuzz, call these from `fuzz_target!` bodies:
//! 1. Install cargo-fuzz: cargo install cargo-fuzz
//! 2. Run fuzzer: cargo fuzz run fuzz_decode

use otio_core::{from_json_bytes, sanitize::sanitize_non_finite, to_json_bytes};

/// Decode arbitrary bytes; errors are fine, panics are not
pub fn fuzz_decode(data: &[u8]) {
    let _ = from_json_bytes(data);
}

/// Decode, and re-encode whatever decoded
pub fn fuzz_round_trip(data: &[u8]) {
    if let Ok(object) = from_json_bytes(data) {
        let _ = to_json_bytes(&object);
    }
}

/// Run the numeric pre-scan; a second pass must change nothing
pub fn fuzz_sanitize(data: &[u8]) {
    let patched = sanitize_non_finite(data);
    let again = sanitize_non_finite(&patched);
    assert_eq!(again.as_ref(), patched.as_ref());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fuzz_decode_empty() {
        fuzz_decode(&[]);
    }

    #[test]
    fn test_fuzz_decode_random() {
        fuzz_decode(&[0x7B, 0x22, 0xFF, 0x00, 0x5D]);
        fuzz_decode(br#"{"OTIO_SCHEMA": "Track.1", "children": [{"OTIO_SCHEMA": 5}]}"#);
    }

    #[test]
    fn test_fuzz_round_trip_nested() {
        fuzz_round_trip(
            br#"{"OTIO_SCHEMA": "Stack.1", "children": [{"OTIO_SCHEMA": "Gap.1", "source_range": null}]}"#,
        );
    }

    #[test]
    fn test_fuzz_sanitize_tokens() {
        fuzz_sanitize(b"[Infinity,-Infinity,NaN,Inf,-Inf]");
        fuzz_sanitize(&[b'"'; 64]);
        fuzz_sanitize(&[0xFF; 1024]);
    }
}
