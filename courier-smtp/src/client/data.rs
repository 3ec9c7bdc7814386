//! Transparency encoding of the DATA payload (RFC 5321 section 4.5.2).

/// Encodes `payload` for transmission after a 354 reply.
///
/// Bare LF becomes CRLF, a `.` at the start of a line is doubled, a final
/// line ending is added if missing, and the `.` terminator line is appended.
#[must_use]
pub fn dot_stuff(payload: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(payload.len() + payload.len() / 64 + 5);
    let mut line_start = true;
    let mut previous = None;

    for &byte in payload {
        match byte {
            b'.' if line_start => out.extend_from_slice(b".."),
            b'\n' if previous != Some(b'\r') => out.extend_from_slice(b"\r\n"),
            _ => out.push(byte),
        }
        line_start = byte == b'\n';
        previous = Some(byte);
    }

    if !line_start {
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(b".\r\n");
    out
}
