//! Codepage text encoding for thermal printers
//!
//! Thermal printers render accented characters from an 8-bit codepage
//! selected with `ESC t`. PC850 covers Portuguese; WIN1252 and UTF-8 are
//! offered for printers that support them. The DOS pages are not part of
//! the Encoding Standard, so PC850 is mapped by hand; characters without a
//! PC850 slot fall back to their Latin-1 byte, then to `?`.

/// Supported character sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    Pc437,
    #[default]
    Pc850,
    Pc860,
    Pc863,
    Pc865,
    Win1252,
    Utf8,
}

impl Charset {
    /// Parse a configured charset name; unknown names fall back to PC850
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "PC437" => Self::Pc437,
            "PC850" => Self::Pc850,
            "PC860" => Self::Pc860,
            "PC863" => Self::Pc863,
            "PC865" => Self::Pc865,
            "WIN1252" => Self::Win1252,
            "UTF8" | "UTF-8" => Self::Utf8,
            _ => Self::Pc850,
        }
    }

    /// Page number for the `ESC t n` codepage select command
    ///
    /// UTF-8 printers ignore the table select, so UTF8 keeps PC850's page.
    pub fn escpos_code(self) -> u8 {
        match self {
            Self::Pc437 => 0,
            Self::Pc850 => 2,
            Self::Pc860 => 6,
            Self::Pc863 => 7,
            Self::Pc865 => 8,
            Self::Win1252 => 16,
            Self::Utf8 => 2,
        }
    }
}

/// Encode text for the target charset
///
/// - UTF8: bytes pass through unchanged
/// - WIN1252: encoded via encoding_rs (unmappable chars become `?`)
/// - DOS pages: PC850 table; unmapped chars fall back to the Latin-1 byte
///   when one exists, otherwise `?`
pub fn encode_text(s: &str, charset: Charset) -> Vec<u8> {
    match charset {
        Charset::Utf8 => s.as_bytes().to_vec(),
        Charset::Win1252 => {
            let (cow, _, _) = encoding_rs::WINDOWS_1252.encode(s);
            cow.into_owned()
        }
        _ => encode_cp850(s),
    }
}

/// Encode a string as CP850 bytes
///
/// ASCII (U+0000..U+007F) passes through unchanged.
pub fn encode_cp850(s: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(s.len());
    for ch in s.chars() {
        if (ch as u32) < 0x80 {
            out.push(ch as u8);
        } else if let Some(byte) = unicode_to_cp850(ch) {
            out.push(byte);
        } else if (ch as u32) < 0x100 {
            // Latin-1 fallback: better a close glyph than a lost line
            out.push(ch as u8);
        } else {
            out.push(b'?');
        }
    }
    out
}

/// Map a Unicode code point to its CP850 byte value (0x80..0xFF)
///
/// Reference: IBM Code Page 850 (Multilingual Latin 1).
fn unicode_to_cp850(ch: char) -> Option<u8> {
    let byte = match ch {
        // 0x80-0x8F
        'Ç' => 0x80,
        'ü' => 0x81,
        'é' => 0x82,
        'â' => 0x83,
        'ä' => 0x84,
        'à' => 0x85,
        'å' => 0x86,
        'ç' => 0x87,
        'ê' => 0x88,
        'ë' => 0x89,
        'è' => 0x8A,
        'ï' => 0x8B,
        'î' => 0x8C,
        'ì' => 0x8D,
        'Ä' => 0x8E,
        'Å' => 0x8F,

        // 0x90-0x9F
        'É' => 0x90,
        'æ' => 0x91,
        'Æ' => 0x92,
        'ô' => 0x93,
        'ö' => 0x94,
        'ò' => 0x95,
        'û' => 0x96,
        'ù' => 0x97,
        'ÿ' => 0x98,
        'Ö' => 0x99,
        'Ü' => 0x9A,
        'ø' => 0x9B,
        '£' => 0x9C,
        'Ø' => 0x9D,
        '×' => 0x9E,
        'ƒ' => 0x9F,

        // 0xA0-0xAF
        'á' => 0xA0,
        'í' => 0xA1,
        'ó' => 0xA2,
        'ú' => 0xA3,
        'ñ' => 0xA4,
        'Ñ' => 0xA5,
        'ª' => 0xA6,
        'º' => 0xA7,
        '¿' => 0xA8,
        '®' => 0xA9,
        '¬' => 0xAA,
        '½' => 0xAB,
        '¼' => 0xAC,
        '¡' => 0xAD,
        '«' => 0xAE,
        '»' => 0xAF,

        // 0xB0-0xBF (box drawing + accented uppercase)
        '░' => 0xB0,
        '▒' => 0xB1,
        '▓' => 0xB2,
        '│' => 0xB3,
        '┤' => 0xB4,
        'Á' => 0xB5,
        'Â' => 0xB6,
        'À' => 0xB7,
        '©' => 0xB8,
        '╣' => 0xB9,
        '║' => 0xBA,
        '╗' => 0xBB,
        '╝' => 0xBC,
        '¢' => 0xBD,
        '¥' => 0xBE,
        '┐' => 0xBF,

        // 0xC0-0xCF
        '└' => 0xC0,
        '┴' => 0xC1,
        '┬' => 0xC2,
        '├' => 0xC3,
        '─' => 0xC4,
        '┼' => 0xC5,
        'ã' => 0xC6,
        'Ã' => 0xC7,
        '╚' => 0xC8,
        '╔' => 0xC9,
        '╩' => 0xCA,
        '╦' => 0xCB,
        '╠' => 0xCC,
        '═' => 0xCD,
        '╬' => 0xCE,
        '¤' => 0xCF,

        // 0xD0-0xDF
        'ð' => 0xD0,
        'Ð' => 0xD1,
        'Ê' => 0xD2,
        'Ë' => 0xD3,
        'È' => 0xD4,
        'ı' => 0xD5,
        'Í' => 0xD6,
        'Î' => 0xD7,
        'Ï' => 0xD8,
        '┘' => 0xD9,
        '┌' => 0xDA,
        '█' => 0xDB,
        '▄' => 0xDC,
        '¦' => 0xDD,
        'Ì' => 0xDE,
        '▀' => 0xDF,

        // 0xE0-0xEF
        'Ó' => 0xE0,
        'ß' => 0xE1,
        'Ô' => 0xE2,
        'Ò' => 0xE3,
        'õ' => 0xE4,
        'Õ' => 0xE5,
        'µ' => 0xE6,
        'þ' => 0xE7,
        'Þ' => 0xE8,
        'Ú' => 0xE9,
        'Û' => 0xEA,
        'Ù' => 0xEB,
        'ý' => 0xEC,
        'Ý' => 0xED,
        '¯' => 0xEE,
        '´' => 0xEF,

        // 0xF0-0xFF
        '\u{00AD}' => 0xF0, // soft hyphen
        '±' => 0xF1,
        '‗' => 0xF2,
        '¾' => 0xF3,
        '¶' => 0xF4,
        '§' => 0xF5,
        '÷' => 0xF6,
        '¸' => 0xF7,
        '°' => 0xF8,
        '¨' => 0xF9,
        '·' => 0xFA,
        '¹' => 0xFB,
        '³' => 0xFC,
        '²' => 0xFD,
        '■' => 0xFE,
        '\u{00A0}' => 0xFF, // non-breaking space

        _ => return None,
    };
    Some(byte)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        assert_eq!(encode_cp850("Pedido #42"), b"Pedido #42".to_vec());
    }

    #[test]
    fn test_portuguese_accents() {
        // "pão" -> p, 0xC6 (a-tilde), o
        assert_eq!(encode_cp850("pão"), vec![b'p', 0xC6, b'o']);
        // "aça" -> a, 0x87 (c-cedilla), a
        assert_eq!(encode_cp850("aça"), vec![b'a', 0x87, b'a']);
        assert_eq!(encode_cp850("é"), vec![0x82]);
    }

    #[test]
    fn test_unmapped_falls_back() {
        // CJK has no Latin-1 byte, becomes '?'
        assert_eq!(encode_cp850("中"), vec![b'?']);
    }

    #[test]
    fn test_charset_from_name() {
        assert_eq!(Charset::from_name("PC850"), Charset::Pc850);
        assert_eq!(Charset::from_name("utf8"), Charset::Utf8);
        assert_eq!(Charset::from_name("WIN1252"), Charset::Win1252);
        // unknown name falls back to the most compatible page
        assert_eq!(Charset::from_name("KOI8-R"), Charset::Pc850);
    }

    #[test]
    fn test_escpos_codes() {
        assert_eq!(Charset::Pc437.escpos_code(), 0);
        assert_eq!(Charset::Pc850.escpos_code(), 2);
        assert_eq!(Charset::Win1252.escpos_code(), 16);
    }

    #[test]
    fn test_win1252() {
        let bytes = encode_text("café", Charset::Win1252);
        assert_eq!(bytes, vec![b'c', b'a', b'f', 0xE9]);
    }
}
