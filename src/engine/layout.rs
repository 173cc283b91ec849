//! Text box layout
//!
//! Greedy word wrap over base-14 metrics. Paragraphs are split on `\n`,
//! words wider than the box are broken between characters.

use crate::document::{Point, Rect, TextAlign, TextboxFit};

use super::fonts::Base14;

/// Line height as a multiple of the font size
pub const LINE_HEIGHT_FACTOR: f32 = 1.2;

/// A wrapped line positioned inside its box
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    /// Baseline start in displayed page space
    pub origin: Point,
    /// Extra space added to each space character (`Tw`)
    pub word_spacing: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextboxLayout {
    pub lines: Vec<PlacedLine>,
    pub fit: TextboxFit,
}

struct WrappedLine {
    text: String,
    width: f32,
    ends_paragraph: bool,
}

fn wrap_paragraph(paragraph: &str, font: Base14, size: f32, max_width: f32, out: &mut Vec<WrappedLine>) {
    let space = font.text_width(" ", size);
    let mut line = String::new();
    let mut width = 0.0_f32;

    for word in paragraph.split_whitespace() {
        let word_width = font.text_width(word, size);

        if word_width > max_width {
            if !line.is_empty() {
                out.push(WrappedLine { text: std::mem::take(&mut line), width, ends_paragraph: false });
            }
            let mut chunk = String::new();
            let mut chunk_width = 0.0_f32;
            for c in word.chars() {
                let char_width = font.text_width(c.encode_utf8(&mut [0; 4]), size);
                if chunk_width + char_width > max_width && !chunk.is_empty() {
                    out.push(WrappedLine { text: std::mem::take(&mut chunk), width: chunk_width, ends_paragraph: false });
                    chunk_width = 0.0;
                }
                chunk.push(c);
                chunk_width += char_width;
            }
            line = chunk;
            width = chunk_width;
            continue;
        }

        if line.is_empty() {
            line = word.to_string();
            width = word_width;
        } else if width + space + word_width <= max_width {
            line.push(' ');
            line.push_str(word);
            width += space + word_width;
        } else {
            out.push(WrappedLine { text: std::mem::take(&mut line), width, ends_paragraph: false });
            line = word.to_string();
            width = word_width;
        }
    }

    out.push(WrappedLine { text: line, width, ends_paragraph: true });
}

/// Lay out `text` inside `rect`
///
/// The fit is negative when the wrapped lines need more height than the box
/// offers; callers draw nothing in that case.
pub fn layout_textbox(text: &str, rect: Rect, font: Base14, size: f32, align: TextAlign) -> TextboxLayout {
    let rect = rect.normalized();
    let max_width = rect.width();

    let mut wrapped = Vec::new();
    for paragraph in text.split('\n') {
        wrap_paragraph(paragraph, font, size, max_width, &mut wrapped);
    }

    let line_height = size * LINE_HEIGHT_FACTOR;
    let spare_height = rect.height() - wrapped.len() as f32 * line_height;
    let first_baseline = rect.y0 + font.ascender() * size / 1000.0;

    let lines = wrapped
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let slack = (max_width - line.width).max(0.0);
            let spaces = line.text.matches(' ').count();
            let (offset, word_spacing) = match align {
                TextAlign::Left => (0.0, 0.0),
                TextAlign::Center => (slack / 2.0, 0.0),
                TextAlign::Right => (slack, 0.0),
                TextAlign::Justify if !line.ends_paragraph && spaces > 0 => {
                    (0.0, slack / spaces as f32)
                }
                TextAlign::Justify => (0.0, 0.0),
            };
            PlacedLine {
                origin: Point::new(rect.x0 + offset, first_baseline + i as f32 * line_height),
                text: line.text,
                word_spacing,
            }
        })
        .collect();

    TextboxLayout {
        lines,
        fit: TextboxFit { spare_height },
    }
}
