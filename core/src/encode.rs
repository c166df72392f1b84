//! Percent encoding and whitespace normalization used by canonicalization.
//!
//! Both signature versions need a byte exact reduction of the request, a single
//! differing byte yields a different signature.

use percent_encoding::percent_decode_str;
use percent_encoding::percent_encode;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// - URI encode every byte except the unreserved characters: 'A'-'Z', 'a'-'z', '0'-'9', '-', '.', '_', and '~'.
/// - The path separator `/` is kept as is.
pub static AWS_URI_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// AsciiSet for [AWS UriEncode](https://docs.aws.amazon.com/AmazonS3/latest/API/sig-v4-header-based-auth.html)
///
/// But used in query.
pub static AWS_QUERY_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Encode a request path for signing.
///
/// The input is percent decoded first, so an already encoded path yields the
/// same output again. Every byte of the decoded path except the unreserved
/// set and `/` becomes a `%XX` triplet, multi-byte characters are encoded
/// byte by byte.
pub fn uri_encode_path(path: &str) -> String {
    let decoded: Vec<u8> = percent_decode_str(path).collect();
    percent_encode(&decoded, &AWS_URI_ENCODE_SET).to_string()
}

/// Encode a query key or value for signing.
pub fn uri_encode_query(v: &str) -> String {
    utf8_percent_encode(v, &AWS_QUERY_ENCODE_SET).to_string()
}

#[inline]
fn is_signing_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\x0b' | '\r' | '\n' | '\x0c')
}

/// Collapse every run of whitespace into one space and trim both ends.
///
/// Whitespace here means space, tab, vertical tab, carriage return, line feed
/// and form feed. Everything else passes through unchanged.
pub fn trim_all(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for word in s.split(is_signing_whitespace).filter(|w| !w.is_empty()) {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
