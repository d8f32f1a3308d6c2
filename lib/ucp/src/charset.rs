//! Text codecs for the message field: the GSM 7-bit default alphabet in
//! its packed, hex-rendered form (IA5) and hex-rendered UCS-2.

use crate::support::{UcpError, UcpResult};
use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::Cursor;

const ESCAPE: u8 = 0x1B;

/// GSM 03.38 default alphabet, indexed by septet value.
#[rustfmt::skip]
const ALPHABET: [char; 128] = [
    '@', '£', '$', '¥', 'è', 'é', 'ù', 'ì', 'ò', 'Ç', '\n', 'Ø', 'ø', '\r', 'Å', 'å',
    'Δ', '_', 'Φ', 'Γ', 'Λ', 'Ω', 'Π', 'Ψ', 'Σ', 'Θ', 'Ξ', '\u{1b}', 'Æ', 'æ', 'ß', 'É',
    ' ', '!', '"', '#', '¤', '%', '&', '\'', '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', ':', ';', '<', '=', '>', '?',
    '¡', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', 'Ä', 'Ö', 'Ñ', 'Ü', '§',
    '¿', 'a', 'b', 'c', 'd', 'e', 'f', 'g', 'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w', 'x', 'y', 'z', 'ä', 'ö', 'ñ', 'ü', 'à',
];

/// Second table reached through the 0x1B escape.
const EXTENSION: [(u8, char); 10] = [
    (0x0A, '\u{000C}'),
    (0x14, '^'),
    (0x28, '{'),
    (0x29, '}'),
    (0x2F, '\\'),
    (0x3C, '['),
    (0x3D, '~'),
    (0x3E, ']'),
    (0x40, '|'),
    (0x65, '€'),
];

/// Packs septets into octets, low bits first.
pub fn pack_septets(septets: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(septets.len() * 7 / 8 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;

    for &septet in septets {
        acc |= u32::from(septet & 0x7F) << bits;
        bits += 7;
        while bits >= 8 {
            out.push((acc & 0xFF) as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push(acc as u8);
    }
    out
}

/// Unpacks octets into septets. Trailing fill bits shorter than a septet
/// are discarded.
pub fn unpack_septets(octets: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(octets.len() * 8 / 7 + 1);
    let mut acc: u32 = 0;
    let mut bits = 0;

    for &octet in octets {
        acc |= u32::from(octet) << bits;
        bits += 8;
        while bits >= 7 {
            out.push((acc & 0x7F) as u8);
            acc >>= 7;
            bits -= 7;
        }
    }
    out
}

/// Maps septets through the default alphabet, honoring the escape table.
pub fn decode_gsm7(septets: &[u8]) -> String {
    let mut out = String::with_capacity(septets.len());
    let mut iter = septets.iter().map(|&s| s & 0x7F);

    while let Some(septet) = iter.next() {
        if septet == ESCAPE {
            match iter.next() {
                Some(code) => out.push(extension_char(code)),
                None => break,
            }
        } else {
            out.push(ALPHABET[septet as usize]);
        }
    }
    out
}

/// Maps text into septets; characters outside both tables become `?`.
pub fn encode_gsm7(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if let Some(septet) = alphabet_septet(ch) {
            out.push(septet);
        } else if let Some(code) = extension_septet(ch) {
            out.push(ESCAPE);
            out.push(code);
        } else {
            out.push(b'?');
        }
    }
    out
}

fn extension_char(code: u8) -> char {
    EXTENSION
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, ch)| *ch)
        .unwrap_or(ALPHABET[code as usize])
}

fn alphabet_septet(ch: char) -> Option<u8> {
    ALPHABET.iter().position(|&a| a == ch).map(|idx| idx as u8)
}

fn extension_septet(ch: char) -> Option<u8> {
    EXTENSION.iter().find(|(_, c)| *c == ch).map(|(code, _)| *code)
}

/// Decodes a hex-rendered packed IA5 message field.
pub fn ia5_decode(hex_text: &[u8]) -> UcpResult<String> {
    let packed = hex::decode(hex_text)?;
    let mut septets = unpack_septets(&packed);
    // A zero septet on an exact octet boundary is unpacking fill, not `@`.
    if septets.len() % 8 == 0 && septets.last() == Some(&0) {
        septets.pop();
    }
    Ok(decode_gsm7(&septets))
}

/// Renders text as a hex-encoded packed IA5 message field.
pub fn ia5_encode(text: &str) -> Vec<u8> {
    hex::encode(pack_septets(&encode_gsm7(text))).into_bytes()
}

/// Decodes big-endian UCS-2 bytes.
pub fn decode_ucs2(raw: &[u8]) -> UcpResult<String> {
    if raw.len() % 2 != 0 {
        return Err(UcpError::Encoding);
    }

    let mut units = Vec::with_capacity(raw.len() / 2);
    let mut cursor = Cursor::new(raw);
    while let Ok(unit) = cursor.read_u16::<BigEndian>() {
        units.push(unit);
    }

    String::from_utf16(&units).map_err(|_| UcpError::Encoding)
}

/// Encodes text as big-endian UCS-2 bytes.
pub fn encode_ucs2(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() * 2);
    for unit in text.encode_utf16() {
        out.write_u16::<BigEndian>(unit).expect("Error writing ucs2 unit");
    }
    out
}

/// Originator display for the message log. Alphanumeric originators are
/// hex text carrying a length octet followed by packed septets; anything
/// that is not plausible hex is shown as-is.
pub fn originator_display(oadc: &[u8]) -> String {
    if !oadc.is_empty() && oadc.len() % 2 == 0 {
        if let Ok(decoded) = hex::decode(oadc) {
            if decoded.len() > 1 {
                return decode_gsm7(&unpack_septets(&decoded[1..]));
            }
        }
    }
    String::from_utf8_lossy(oadc).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_known_values() {
        assert_eq!(pack_septets(&encode_gsm7("hello")), b"\xE8\x32\x9B\xFD\x06".to_vec());
        assert_eq!(pack_septets(&encode_gsm7("Hello")), b"\xC8\x32\x9B\xFD\x06".to_vec());
    }

    #[test]
    fn test_unpack_inverts_pack() {
        let septets = encode_gsm7("the quick brown fox");
        assert_eq!(&unpack_septets(&pack_septets(&septets))[..septets.len()], &septets[..]);
    }

    #[test]
    fn test_ia5_known_value() {
        assert_eq!(ia5_encode("hello"), b"e8329bfd06".to_vec());
        assert_eq!(ia5_decode(b"E8329BFD06").unwrap(), "hello");
    }

    #[test]
    fn test_ia5_roundtrip_on_octet_boundary() {
        // Seven septets pack into exactly seven octets; the fill septet
        // must not surface as `@`.
        assert_eq!(ia5_decode(&ia5_encode("message")).unwrap(), "message");
    }

    #[test]
    fn test_ia5_rejects_bad_hex() {
        assert_eq!(ia5_decode(b"zz").unwrap_err(), UcpError::BadHex);
    }

    #[test]
    fn test_gsm7_escape_table() {
        let septets = encode_gsm7("a{b}c€");
        assert_eq!(decode_gsm7(&septets), "a{b}c€");
    }

    #[test]
    fn test_gsm7_unmappable_becomes_question_mark() {
        let septets = encode_gsm7("漢");
        assert_eq!(decode_gsm7(&septets), "?");
    }

    #[test]
    fn test_ucs2_roundtrip() {
        let raw = encode_ucs2("héllo 漢字");
        assert_eq!(decode_ucs2(&raw).unwrap(), "héllo 漢字");
    }

    #[test]
    fn test_ucs2_known_value() {
        assert_eq!(encode_ucs2("hi"), b"\x00\x68\x00\x69".to_vec());
        assert_eq!(decode_ucs2(b"\x00\x68\x00\x69").unwrap(), "hi");
    }

    #[test]
    fn test_ucs2_rejects_odd_length() {
        assert_eq!(decode_ucs2(b"\x00").unwrap_err(), UcpError::Encoding);
    }

    #[test]
    fn test_originator_display_alphanumeric() {
        // "acme" packed behind a length octet, as alphanumeric senders
        // arrive on the wire.
        let packed = pack_septets(&encode_gsm7("acme"));
        let mut field = vec![0x08];
        field.extend_from_slice(&packed);
        let hex_field = hex::encode(field).into_bytes();

        assert_eq!(originator_display(&hex_field), "acme");
    }

    #[test]
    fn test_originator_display_falls_back_to_raw() {
        assert_eq!(originator_display(b"1234z"), "1234z");
        assert_eq!(originator_display(b""), "");
    }
}
