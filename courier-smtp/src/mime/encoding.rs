//! Content-transfer encodings used by the letter builder.

use base64::{Engine, engine::general_purpose::STANDARD};

/// Maximum encoded characters per line (RFC 2045 section 6.8).
pub const MAX_LINE_LENGTH: usize = 76;

/// Raw bytes that encode to exactly one full line.
const RAW_BYTES_PER_LINE: usize = MAX_LINE_LENGTH / 4 * 3;

const CRLF: &[u8] = b"\r\n";

/// Appends `data` to `out` as base64, hard wrapped at [`MAX_LINE_LENGTH`]
/// characters with every line, including the last, ending in CRLF.
///
/// Empty input appends nothing.
pub fn base64_wrap(out: &mut Vec<u8>, data: &[u8]) {
    let lines = data.len().div_ceil(RAW_BYTES_PER_LINE);
    out.reserve(lines * (MAX_LINE_LENGTH + CRLF.len()));

    let mut line = String::with_capacity(MAX_LINE_LENGTH);
    for chunk in data.chunks(RAW_BYTES_PER_LINE) {
        line.clear();
        STANDARD.encode_string(chunk, &mut line);
        out.extend_from_slice(line.as_bytes());
        out.extend_from_slice(CRLF);
    }
}

/// Renders `text` as an RFC 2047 `B` encoded word in UTF-8.
#[must_use]
pub fn encoded_word(text: &str) -> String {
    format!("=?UTF-8?B?{}?=", STANDARD.encode(text))
}

/// Quoted-printable encodes `text` (RFC 2045 section 6.7) with soft line
/// breaks and CRLF line endings.
#[must_use]
pub fn quoted_printable(text: &str) -> String {
    quoted_printable::encode_to_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapped(data: &[u8]) -> String {
        let mut out = Vec::new();
        base64_wrap(&mut out, data);
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_raw_bytes_per_line() {
        assert_eq!(RAW_BYTES_PER_LINE, 57);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(wrapped(b""), "");
    }

    #[test]
    fn test_short_input() {
        assert_eq!(wrapped(b"Hello World"), "SGVsbG8gV29ybGQ=\r\n");
    }

    #[test]
    fn test_line_boundaries() {
        let full = wrapped(&[0xAB; 57]);
        assert_eq!(full.len(), MAX_LINE_LENGTH + 2);
        assert!(full.ends_with("\r\n"));

        let spill = wrapped(&[0xAB; 58]);
        let lines: Vec<&str> = spill.split_terminator("\r\n").collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].len(), MAX_LINE_LENGTH);
        assert_eq!(lines[1], "qw==");
    }

    #[test]
    fn test_encoded_word() {
        assert_eq!(encoded_word("a.txt"), "=?UTF-8?B?YS50eHQ=?=");
        assert_eq!(encoded_word("报告.pdf"), "=?UTF-8?B?5oql5ZGKLnBkZg==?=");
    }

    #[test]
    fn test_quoted_printable() {
        assert_eq!(quoted_printable("plain"), "plain");
        assert_eq!(quoted_printable("a=b"), "a=3Db");
        assert_eq!(quoted_printable("café"), "caf=C3=A9");
    }
}
