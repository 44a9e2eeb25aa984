//! Glyph metrics provider used by the layouter.

use unicode_width::UnicodeWidthChar;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GlyphExtents {
    pub width: f32,
    pub height: f32,
    pub left: f32,
    pub top: f32,
}

pub trait GlyphMetrics {
    fn char_extents(&self, c: char) -> GlyphExtents;

    /// Extents of each character of `text` when shaped as one run.
    /// Providers with kerning override this; the default measures each
    /// character on its own.
    fn text_extents(&self, text: &str) -> Vec<GlyphExtents> {
        text.chars().map(|c| self.char_extents(c)).collect()
    }
}

/// Fixed-advance metrics: every terminal cell is `advance` wide.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMetrics {
    pub advance: f32,
    pub line_height: f32,
}

impl MonospaceMetrics {
    pub const fn new(advance: f32, line_height: f32) -> Self {
        Self {
            advance,
            line_height,
        }
    }
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self::new(10.0, 22.0)
    }
}

impl GlyphMetrics for MonospaceMetrics {
    fn char_extents(&self, c: char) -> GlyphExtents {
        let cells = c.width().unwrap_or(0) as f32;
        GlyphExtents {
            width: self.advance * cells,
            height: self.line_height,
            left: 0.0,
            top: 0.0,
        }
    }
}
