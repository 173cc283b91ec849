//! Base-14 fonts
//!
//! Inserted text uses the standard Type1 faces every PDF reader carries, so
//! nothing is embedded. Widths come from the Adobe AFM files for printable
//! ASCII; other characters use the face's average width.

use lopdf::{Dictionary, Object};

use crate::document::{OperationError, Result};

/// Helvetica widths for ASCII 32..=126, in 1/1000 em
static HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '../
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0..9
    278, 278, 584, 584, 584, 556, 1015, // :..@
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, // A..Z
    278, 278, 278, 469, 556, 333, // [..`
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, 556, 556, 333,
    500, 278, 556, 500, 722, 500, 500, 500, // a..z
    334, 260, 334, 584, // {..~
];

static HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, //
    333, 333, 584, 584, 584, 611, 975, //
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, 667, 778, 722,
    667, 611, 722, 667, 944, 667, 667, 611, //
    333, 278, 333, 584, 556, 333, //
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, 611, 611, 389,
    556, 333, 611, 556, 778, 556, 556, 500, //
    389, 280, 389, 584, //
];

static TIMES_ROMAN: [u16; 95] = [
    250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, //
    500, 500, 500, 500, 500, 500, 500, 500, 500, 500, //
    278, 278, 564, 564, 564, 444, 921, //
    722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, 722, 722, 556, 722, 667,
    556, 611, 722, 722, 944, 722, 722, 611, //
    333, 278, 333, 469, 500, 333, //
    444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, 500, 500, 500, 500, 333,
    389, 278, 500, 500, 722, 500, 500, 444, //
    480, 200, 480, 541, //
];

/// The 14 standard PDF fonts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Base14 {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
    Symbol,
    ZapfDingbats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Helvetica,
    HelveticaBold,
    Times,
    Courier,
}

impl Base14 {
    const ALL: [Base14; 14] = [
        Base14::Helvetica,
        Base14::HelveticaBold,
        Base14::HelveticaOblique,
        Base14::HelveticaBoldOblique,
        Base14::TimesRoman,
        Base14::TimesBold,
        Base14::TimesItalic,
        Base14::TimesBoldItalic,
        Base14::Courier,
        Base14::CourierBold,
        Base14::CourierOblique,
        Base14::CourierBoldOblique,
        Base14::Symbol,
        Base14::ZapfDingbats,
    ];

    /// Resolve a MuPDF short name (`helv`, `tibo`, ...) or PostScript name
    pub fn from_name(name: &str) -> Result<Self> {
        let wanted = name.trim();
        Self::ALL
            .into_iter()
            .find(|font| {
                font.short_name().eq_ignore_ascii_case(wanted)
                    || font.postscript_name().eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| OperationError::malformed(format!("unknown font: {}", name)))
    }

    pub fn short_name(&self) -> &'static str {
        match self {
            Base14::Helvetica => "helv",
            Base14::HelveticaBold => "hebo",
            Base14::HelveticaOblique => "heit",
            Base14::HelveticaBoldOblique => "hebi",
            Base14::TimesRoman => "tiro",
            Base14::TimesBold => "tibo",
            Base14::TimesItalic => "tiit",
            Base14::TimesBoldItalic => "tibi",
            Base14::Courier => "cour",
            Base14::CourierBold => "cobo",
            Base14::CourierOblique => "coit",
            Base14::CourierBoldOblique => "cobi",
            Base14::Symbol => "symb",
            Base14::ZapfDingbats => "zadb",
        }
    }

    pub fn postscript_name(&self) -> &'static str {
        match self {
            Base14::Helvetica => "Helvetica",
            Base14::HelveticaBold => "Helvetica-Bold",
            Base14::HelveticaOblique => "Helvetica-Oblique",
            Base14::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Base14::TimesRoman => "Times-Roman",
            Base14::TimesBold => "Times-Bold",
            Base14::TimesItalic => "Times-Italic",
            Base14::TimesBoldItalic => "Times-BoldItalic",
            Base14::Courier => "Courier",
            Base14::CourierBold => "Courier-Bold",
            Base14::CourierOblique => "Courier-Oblique",
            Base14::CourierBoldOblique => "Courier-BoldOblique",
            Base14::Symbol => "Symbol",
            Base14::ZapfDingbats => "ZapfDingbats",
        }
    }

    fn is_symbolic(&self) -> bool {
        matches!(self, Base14::Symbol | Base14::ZapfDingbats)
    }

    // Times variants and the symbolic faces are measured with the closest
    // table available.
    fn family(&self) -> Family {
        match self {
            Base14::Helvetica | Base14::HelveticaOblique => Family::Helvetica,
            Base14::HelveticaBold | Base14::HelveticaBoldOblique => Family::HelveticaBold,
            Base14::Courier
            | Base14::CourierBold
            | Base14::CourierOblique
            | Base14::CourierBoldOblique => Family::Courier,
            Base14::Symbol | Base14::ZapfDingbats => Family::Helvetica,
            _ => Family::Times,
        }
    }

    /// Ascender in 1/1000 em
    pub fn ascender(&self) -> f32 {
        match self.family() {
            Family::Helvetica | Family::HelveticaBold => 718.0,
            Family::Times => 683.0,
            Family::Courier => 629.0,
        }
    }

    fn char_width(&self, ch: char) -> u16 {
        let (table, average) = match self.family() {
            Family::Courier => return 600,
            Family::Helvetica => (&HELVETICA, 556),
            Family::HelveticaBold => (&HELVETICA_BOLD, 556),
            Family::Times => (&TIMES_ROMAN, 500),
        };
        match ch as u32 {
            code @ 32..=126 => table[(code - 32) as usize],
            _ => average,
        }
    }

    /// Advance width of `text` at `size` points
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        let units: u32 = text.chars().map(|c| u32::from(self.char_width(c))).sum();
        units as f32 * size / 1000.0
    }

    /// Font dictionary for a non-embedded Type1 face
    pub fn dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(self.postscript_name().as_bytes().to_vec())),
        ]);
        if !self.is_symbolic() {
            dict.set("Encoding", Object::Name(b"WinAnsiEncoding".to_vec()));
        }
        dict
    }
}

/// Encode text as WinAnsi bytes; unrepresentable characters become `?`
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(win_ansi_byte).collect()
}

fn win_ansi_byte(ch: char) -> u8 {
    match ch {
        ' '..='~' => ch as u8,
        '\u{a0}'..='\u{ff}' => ch as u32 as u8,
        '\t' => b' ',
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8a,
        '‹' => 0x8b,
        'Œ' => 0x8c,
        'Ž' => 0x8e,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9a,
        '›' => 0x9b,
        'œ' => 0x9c,
        'ž' => 0x9e,
        'Ÿ' => 0x9f,
        _ => b'?',
    }
}
