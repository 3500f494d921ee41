//! Pre-scan for non-standard numeric literals
//!
//! Some producers write bare `Inf`, `-Inf`, `Infinity`, `-Infinity` and
//! `NaN` where a number is expected. Those tokens are rewritten to `null`
//! before standard parsing; numeric readers then treat `null` as NaN.
//! String contents are never touched.

use memchr::memchr2;
use std::borrow::Cow;

#[cfg(feature = "logging")]
use tracing::debug;

const TOKENS: [&[u8]; 5] = [b"-Infinity", b"Infinity", b"-Inf", b"Inf", b"NaN"];
const NULL: &[u8] = b"null";

/// Replace bare non-finite literals in value position with `null`
///
/// Returns the input unchanged, without copying, when it contains no
/// candidate token.
pub fn sanitize_non_finite(input: &[u8]) -> Cow<'_, [u8]> {
    if memchr2(b'I', b'N', input).is_none() {
        return Cow::Borrowed(input);
    }

    let mut out: Option<Vec<u8>> = None;
    let mut copied_to = 0;
    let mut patched = 0usize;
    let mut last_significant: Option<u8> = None;
    let mut i = 0;

    while i < input.len() {
        let byte = input[i];
        match byte {
            b'"' => {
                i = skip_string(input, i + 1);
                last_significant = Some(b'"');
                continue;
            }
            b'I' | b'N' | b'-' if in_value_position(last_significant) => {
                if let Some(len) = match_token(&input[i..]) {
                    let buf = out.get_or_insert_with(|| Vec::with_capacity(input.len()));
                    buf.extend_from_slice(&input[copied_to..i]);
                    buf.extend_from_slice(NULL);
                    i += len;
                    copied_to = i;
                    patched += 1;
                    last_significant = Some(b'l');
                    continue;
                }
            }
            _ => {}
        }
        if !byte.is_ascii_whitespace() {
            last_significant = Some(byte);
        }
        i += 1;
    }

    let Some(mut buf) = out else {
        return Cow::Borrowed(input);
    };
    buf.extend_from_slice(&input[copied_to..]);

    #[cfg(feature = "logging")]
    debug!(patched, "Rewrote non-finite numeric literals to null");
    #[cfg(not(feature = "logging"))]
    let _ = patched;

    Cow::Owned(buf)
}

/// Index just past the closing quote of a string whose body starts at `start`
fn skip_string(input: &[u8], start: usize) -> usize {
    let mut i = start;
    while let Some(offset) = memchr2(b'"', b'\\', &input[i..]) {
        let at = i + offset;
        if input[at] == b'"' {
            return at + 1;
        }
        i = at + 2;
        if i >= input.len() {
            return input.len();
        }
    }
    input.len()
}

fn in_value_position(last_significant: Option<u8>) -> bool {
    matches!(last_significant, None | Some(b':') | Some(b'[') | Some(b','))
}

fn match_token(rest: &[u8]) -> Option<usize> {
    TOKENS.iter().find_map(|token| {
        let len = token.len();
        if rest.starts_with(token) && rest.get(len).map_or(true, |b| is_delimiter(*b)) {
            Some(len)
        } else {
            None
        }
    })
}

fn is_delimiter(byte: u8) -> bool {
    byte.is_ascii_whitespace() || matches!(byte, b',' | b']' | b'}')
}
