// SPDX-FileCopyrightText: 2025-2026 Zexin Yuan <aim@yzx9.xyz>
//
// SPDX-License-Identifier: Apache-2.0

//! Quoted-printable decoding for `ENCODING=QUOTED-PRINTABLE` field values.
//!
//! vCalendar writers in the wild produce sloppy quoted-printable, so decoding
//! is permissive: any `=` that does not start a valid escape is kept as-is.

/// Encoded CRLF, rewritten to an iCalendar `\n` text escape.
const ENCODED_CRLF: &str = "=0D=0A";
const TEXT_NEWLINE: &str = "\\n";

/// Decode a quoted-printable value.
///
/// `=XX` becomes the byte `0xXX`, `=` followed by CRLF is a soft line break and
/// is dropped, and `=0D=0A` becomes the two characters `\n`. Decoded bytes
/// that are not valid UTF-8 are replaced with U+FFFD.
#[must_use]
pub fn decode(input: &str) -> String {
    let input = input.replace(ENCODED_CRLF, TEXT_NEWLINE);
    let src = input.as_bytes();
    let mut buf = Vec::with_capacity(src.len());

    let mut i = 0;
    while let Some(&b) = src.get(i) {
        if b == b'=' {
            match (src.get(i + 1), src.get(i + 2)) {
                (Some(&hi), Some(&lo)) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
                    buf.push((hex_value(hi) << 4) | hex_value(lo));
                    i += 3;
                    continue;
                }
                (Some(b'\r'), Some(b'\n')) => {
                    i += 3;
                    continue;
                }
                _ => {}
            }
        }
        buf.push(b);
        i += 1;
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

const fn hex_value(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}
