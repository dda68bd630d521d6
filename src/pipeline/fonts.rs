//! Standard-14 Helvetica metrics and WinAnsi encoding.
//!
//! The generated PDF uses the non-embedded base fonts Helvetica and
//! Helvetica-Bold, so glyph widths come from the Adobe AFM files rather than
//! from a font program. Widths are in 1/1000 em; multiply by the font size
//! and divide by 1000 for points.
//!
//! Base fonts can only show characters in their encoding. [`to_winansi`]
//! folds text into the WinAnsi repertoire up front so that the width the
//! layout engine measures is the width of exactly what gets drawn.

use serde::{Deserialize, Serialize};

/// Font weight of a drawn line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontWeight {
    Regular,
    Bold,
}

impl FontWeight {
    /// PostScript name of the base font for this weight.
    pub fn base_font(self) -> &'static str {
        match self {
            FontWeight::Regular => "Helvetica",
            FontWeight::Bold => "Helvetica-Bold",
        }
    }
}

/// Text measurement used by the layout engine.
pub trait FontMetrics {
    /// Rendered width in points of `text` at `size`.
    fn text_width(&self, text: &str, weight: FontWeight, size: f32) -> f32;
}

/// Metrics of the two Helvetica base fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardFonts;

impl FontMetrics for StandardFonts {
    fn text_width(&self, text: &str, weight: FontWeight, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| glyph_width(c, weight) as u32).sum();
        units as f32 * size / 1000.0
    }
}

// AFM widths for U+0020..=U+007E.
#[rustfmt::skip]
const HELVETICA_ASCII: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // 0..?
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // @..O
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // P.._
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // `..o
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // p..~
];

#[rustfmt::skip]
const HELVETICA_BOLD_ASCII: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// Width in 1/1000 em of one (WinAnsi-representable) character.
fn glyph_width(c: char, weight: FontWeight) -> u16 {
    let bold = weight == FontWeight::Bold;
    let code = c as u32;
    if (0x20..=0x7E).contains(&code) {
        let table = if bold {
            &HELVETICA_BOLD_ASCII
        } else {
            &HELVETICA_ASCII
        };
        return table[(code - 0x20) as usize];
    }
    match (c, bold) {
        ('\u{2018}' | '\u{2019}' | '\u{201A}', false) => 222,
        ('\u{2018}' | '\u{2019}' | '\u{201A}', true) => 278,
        ('\u{201C}' | '\u{201D}' | '\u{201E}', false) => 333,
        ('\u{201C}' | '\u{201D}' | '\u{201E}', true) => 500,
        ('\u{2013}', _) => 556,
        ('\u{2014}' | '\u{2026}' | '\u{2030}' | '\u{2122}', _) => 1000,
        ('\u{2022}', _) => 350,
        ('\u{00A0}', _) => 278,
        ('\u{00A9}' | '\u{00AE}', _) => 737,
        ('\u{00B0}', _) => 400,
        ('\u{00BF}' | '\u{00A1}', false) => 333,
        // Accented Latin-1 letters share their base letter's advance closely
        // enough for line breaking.
        (_, _) => match fold_accent(c) {
            Some(base) => glyph_width(base, weight),
            None => 556,
        },
    }
}

/// Base ASCII letter of a Latin-1 accented letter.
fn fold_accent(c: char) -> Option<char> {
    let base = match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' => 'Y',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ì'..='ï' => 'i',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}

/// WinAnsi (cp1252) byte for the 0x80–0x9F range.
fn cp1252_high(c: char) -> Option<u8> {
    let byte = match c {
        '\u{20AC}' => 0x80,
        '\u{201A}' => 0x82,
        '\u{0192}' => 0x83,
        '\u{201E}' => 0x84,
        '\u{2026}' => 0x85,
        '\u{2020}' => 0x86,
        '\u{2021}' => 0x87,
        '\u{02C6}' => 0x88,
        '\u{2030}' => 0x89,
        '\u{0160}' => 0x8A,
        '\u{2039}' => 0x8B,
        '\u{0152}' => 0x8C,
        '\u{017D}' => 0x8E,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201C}' => 0x93,
        '\u{201D}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{02DC}' => 0x98,
        '\u{2122}' => 0x99,
        '\u{0161}' => 0x9A,
        '\u{203A}' => 0x9B,
        '\u{0153}' => 0x9C,
        '\u{017E}' => 0x9E,
        '\u{0178}' => 0x9F,
        _ => return None,
    };
    Some(byte)
}

/// Encode one character as a WinAnsi byte, if representable.
pub fn winansi_byte(c: char) -> Option<u8> {
    let code = c as u32;
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as u8),
        _ => cp1252_high(c),
    }
}

/// Fold `text` into characters the base fonts can show.
///
/// Tabs become four spaces; other control characters are dropped; anything
/// outside WinAnsi becomes `?`.
pub fn to_winansi(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            c if c.is_control() => {}
            c if winansi_byte(c).is_some() => out.push(c),
            _ => out.push('?'),
        }
    }
    out
}

/// Encode already-folded text as WinAnsi bytes for a PDF string operand.
pub fn encode_winansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| winansi_byte(c).unwrap_or(b'?')).collect()
}
