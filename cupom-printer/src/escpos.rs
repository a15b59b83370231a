//! ESC/POS command builders
//!
//! Stateless byte-buffer producers, one per command family. Out-of-range
//! numeric inputs are clamped, never rejected; callers concatenate the
//! fragments into the final document.

use crate::encoding::{Charset, encode_text};

/// ESC (0x1B) command prefix
pub const ESC: u8 = 0x1B;
/// GS (0x1D) extended command prefix
pub const GS: u8 = 0x1D;
/// LF (0x0A) line feed
pub const LF: u8 = 0x0A;

/// Text alignment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
}

impl Alignment {
    fn code(self) -> u8 {
        match self {
            Alignment::Left => 0,
            Alignment::Center => 1,
            Alignment::Right => 2,
        }
    }
}

/// Paper cut mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CutMode {
    Full,
    Partial,
}

/// ESC @ - initialize the printer (reset to power-on defaults)
pub fn init() -> Vec<u8> {
    vec![ESC, 0x40]
}

/// ESC t n - select the character code table
pub fn codepage(charset: Charset) -> Vec<u8> {
    vec![ESC, 0x74, charset.escpos_code()]
}

/// ESC 7 n1 n2 n3 - thermal head heating configuration
///
/// `level` 0..15 maps to the heating-time byte: `clamp(level*10 + 80, 0, 255)`.
/// Higher heating time prints darker.
pub fn density(level: u8) -> Vec<u8> {
    let heating = (u32::from(level) * 10 + 80).min(255) as u8;
    vec![ESC, 0x37, 7, heating, 2]
}

/// ESC a n - justification
pub fn align(alignment: Alignment) -> Vec<u8> {
    vec![ESC, 0x61, alignment.code()]
}

/// ESC E n - bold on/off
pub fn bold(on: bool) -> Vec<u8> {
    vec![ESC, 0x45, u8::from(on)]
}

/// GS ! n - character size
///
/// Width and height multipliers 1..8, encoded as a nibble pair
/// (high nibble = height, low nibble = width, zero-based).
pub fn char_size(width_mult: u8, height_mult: u8) -> Vec<u8> {
    let w = width_mult.clamp(1, 8) - 1;
    let h = height_mult.clamp(1, 8) - 1;
    vec![GS, 0x21, (h << 4) | w]
}

/// ESC 2 - default line spacing
pub fn line_spacing_default() -> Vec<u8> {
    vec![ESC, 0x32]
}

/// n raw line feeds
pub fn feed(lines: u8) -> Vec<u8> {
    vec![LF; usize::from(lines.max(1))]
}

/// ESC d n - print and feed n lines
pub fn feed_lines(n: u8) -> Vec<u8> {
    vec![ESC, 0x64, n]
}

/// Encoded text followed by a line feed
pub fn text(content: &str, charset: Charset) -> Vec<u8> {
    let mut buf = encode_text(content, charset);
    buf.push(LF);
    buf
}

/// Encoded text without a trailing line feed
pub fn text_raw(content: &str, charset: Charset) -> Vec<u8> {
    encode_text(content, charset)
}

/// Left margin as literal space columns
pub fn margin_left(cols: u8) -> Vec<u8> {
    vec![0x20; usize::from(cols)]
}

/// Separator line of `ch` repeated `width` times, plus line feed
pub fn separator(width: usize, ch: char) -> Vec<u8> {
    let mut buf = ch.to_string().repeat(width).into_bytes();
    buf.push(LF);
    buf
}

/// GS V m 0 - paper cut
pub fn cut(mode: CutMode) -> Vec<u8> {
    let m = match mode {
        CutMode::Full => 0x41,
        CutMode::Partial => 0x42,
    };
    vec![GS, 0x56, m, 0x00]
}

/// Native QR code via GS ( k
///
/// Four sub-commands (model, module size, error correction, store data)
/// followed by the print trigger. `module_size` 1..16 dots,
/// `ec_level` 1(L)..4(H).
pub fn qr_code(data: &str, module_size: u8, ec_level: u8) -> Vec<u8> {
    let payload = data.as_bytes();
    let len = payload.len() + 3;
    let p_l = (len & 0xFF) as u8;
    let p_h = ((len >> 8) & 0xFF) as u8;

    let mut buf = Vec::with_capacity(payload.len() + 40);

    // Model: select QR model 2
    buf.extend_from_slice(&[GS, 0x28, 0x6B, 4, 0, 0x31, 0x41, 0x32, 0x00]);
    // Module size in dots
    buf.extend_from_slice(&[GS, 0x28, 0x6B, 3, 0, 0x31, 0x43, module_size.clamp(1, 16)]);
    // Error correction level
    buf.extend_from_slice(&[GS, 0x28, 0x6B, 3, 0, 0x31, 0x45, ec_level.clamp(1, 4)]);
    // Store data
    buf.extend_from_slice(&[GS, 0x28, 0x6B, p_l, p_h, 0x31, 0x50, 0x30]);
    buf.extend_from_slice(payload);
    // Print
    buf.extend_from_slice(&[GS, 0x28, 0x6B, 3, 0, 0x31, 0x51, 0x30]);

    buf
}

/// Printable columns for a paper width in millimeters
///
/// 58 mm paper prints 32 columns; 80 mm (and anything unrecognized)
/// prints 48.
pub fn columns_for_width(width_mm: u16) -> usize {
    if width_mm == 58 { 32 } else { 48 }
}
